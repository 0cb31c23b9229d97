use serde::{Deserialize, Serialize};

/// Tier of the inventory a stock record lives in.
///
/// Core stock is keyed by the 9-character core and can stand in for any
/// fungible finish of that core; Finish stock is keyed by the exact part.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bucket {
    Core,
    Finish,
}

impl Bucket {
    pub const ALL: [Bucket; 2] = [Bucket::Core, Bucket::Finish];

    pub fn as_str(self) -> &'static str {
        match self {
            Bucket::Core => "Core",
            Bucket::Finish => "Finish",
        }
    }
}

impl core::fmt::Display for Bucket {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
