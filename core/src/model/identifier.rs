use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::prelude::CoreError;

/// Network/cell identity of a physical transmitter.
///
/// Two identifiers are the same tower only when all four fields match; no
/// normalization is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellIdentifier {
    pub mcc: u16,
    pub mnc: u16,
    pub lac: u32,
    pub cellid: u64,
}

impl CellIdentifier {
    pub fn new(mcc: u16, mnc: u16, lac: u32, cellid: u64) -> Self {
        Self {
            mcc,
            mnc,
            lac,
            cellid,
        }
    }
}

impl fmt::Display for CellIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}/{}", self.mcc, self.mnc, self.lac, self.cellid)
    }
}

/// Parses `mcc,mnc,lac,cellid` (commas or slashes).
impl FromStr for CellIdentifier {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split([',', '/']).map(str::trim).collect();
        if parts.len() != 4 {
            return Err(CoreError::MalformedInput(format!(
                "cell identifier `{}` needs four fields",
                s
            )));
        }

        fn field<T: FromStr>(raw: &str, name: &str) -> Result<T, CoreError> {
            raw.parse().map_err(|_| {
                CoreError::MalformedInput(format!("{} `{}` is not numeric", name, raw))
            })
        }

        Ok(Self {
            mcc: field(parts[0], "mcc")?,
            mnc: field(parts[1], "mnc")?,
            lac: field(parts[2], "lac")?,
            cellid: field(parts[3], "cellid")?,
        })
    }
}
