use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A one-hour booking unit, identified by its starting hour.
///
/// Rendered and stored as an `HH:00` label, e.g. `"14:00"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Slot(u8);

impl Slot {
    /// Creates a slot starting at `hour`. Returns `None` for hours past 23.
    pub fn new(hour: u8) -> Option<Self> {
        (hour < 24).then_some(Slot(hour))
    }

    pub fn hour(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:00", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotParseError(String);

impl fmt::Display for SlotParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid slot '{}': expected an hour label like 14:00", self.0)
    }
}

impl std::error::Error for SlotParseError {}

impl FromStr for Slot {
    type Err = SlotParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || SlotParseError(s.to_string());
        let (hour, minutes) = s.trim().split_once(':').ok_or_else(err)?;

        if minutes != "00" || hour.is_empty() || hour.len() > 2 {
            return Err(err());
        }
        if !hour.chars().all(|c| c.is_ascii_digit()) {
            return Err(err());
        }

        let hour: u8 = hour.parse().map_err(|_| err())?;
        Slot::new(hour).ok_or_else(err)
    }
}
