//! Upstream collaborator seams: vendor files and the ERP on-hand report.

use wheelsource_vendor::FileSource;

use crate::error::SourceError;

/// Rows of a vendor, mapping or price file.
///
/// Implementations resolve [`wheelsource_vendor::FileLocation::LatestInDirectory`]
/// to the most recently modified file, pruning the rest when asked. The header
/// line is not part of the returned rows.
pub trait FeedSource {
    fn fetch_rows(&self, source: &FileSource) -> Result<Vec<Vec<String>>, SourceError>;
}

/// The raw in-house on-hand report text (quoted CSV with a header line).
pub trait OnHandSource {
    fn on_hand_report(&self) -> Result<String, SourceError>;
}

impl<T: FeedSource + ?Sized> FeedSource for &T {
    fn fetch_rows(&self, source: &FileSource) -> Result<Vec<Vec<String>>, SourceError> {
        (**self).fetch_rows(source)
    }
}

impl<T: OnHandSource + ?Sized> OnHandSource for &T {
    fn on_hand_report(&self) -> Result<String, SourceError> {
        (**self).on_hand_report()
    }
}

/// Decode raw bytes with the encoding label from a vendor config.
///
/// UTF-8 (with or without a byte-order mark) and Latin-1 are understood.
pub fn decode(path: &str, encoding: &str, bytes: &[u8]) -> Result<String, SourceError> {
    let label = encoding.trim().to_ascii_lowercase().replace('_', "-");
    match label.as_str() {
        "utf-8" | "utf8" | "utf-8-sig" => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8(bytes.to_vec()).map_err(|_| SourceError::Decode {
                path: path.to_string(),
                encoding: encoding.to_string(),
            })
        }
        "latin-1" | "latin1" | "iso-8859-1" => Ok(bytes.iter().map(|&b| char::from(b)).collect()),
        _ => Err(SourceError::UnsupportedEncoding {
            path: path.to_string(),
            encoding: encoding.to_string(),
        }),
    }
}

/// Split CSV text into rows, dropping the header and any unreadable lines.
pub fn csv_rows(text: &str) -> Vec<Vec<String>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    reader
        .records()
        .filter_map(Result::ok)
        .map(|record| record.iter().map(str::to_string).collect())
        .collect()
}
