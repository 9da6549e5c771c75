//! Switch (datapath) identifier.

use crate::error::DiscoveryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 64-bit datapath identifier of a switch.
///
/// Orders numerically, which is the order [`IslReference`](super::IslReference)
/// relies on. Renders as eight colon separated hex octets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SwitchId(u64);

impl SwitchId {
    pub const fn new(datapath: u64) -> Self {
        Self(datapath)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SwitchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.0.to_be_bytes();
        for (idx, byte) in bytes.iter().enumerate() {
            if idx > 0 {
                write!(f, ":")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

impl FromStr for SwitchId {
    type Err = DiscoveryError;

    /// Accepts `00:00:00:00:00:00:00:0a`, `0x0a` and `0a`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let hex: String = if raw.contains(':') {
            let octets: Vec<&str> = raw.split(':').collect();
            if octets.len() != 8 || octets.iter().any(|o| o.len() != 2) {
                return Err(DiscoveryError::InvalidSwitchId(s.to_string()));
            }
            octets.concat()
        } else {
            raw.strip_prefix("0x")
                .or_else(|| raw.strip_prefix("0X"))
                .unwrap_or(raw)
                .to_string()
        };

        if hex.is_empty() || hex.len() > 16 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(DiscoveryError::InvalidSwitchId(s.to_string()));
        }

        u64::from_str_radix(&hex, 16)
            .map(SwitchId)
            .map_err(|_| DiscoveryError::InvalidSwitchId(s.to_string()))
    }
}

impl TryFrom<String> for SwitchId {
    type Error = DiscoveryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SwitchId> for String {
    fn from(value: SwitchId) -> Self {
        value.to_string()
    }
}

impl From<u64> for SwitchId {
    fn from(value: u64) -> Self {
        SwitchId(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_colon_form() {
        assert_eq!(
            SwitchId::new(0x0000_0000_0000_00ab).to_string(),
            "00:00:00:00:00:00:00:ab"
        );
        assert_eq!(
            SwitchId::new(0x1122_3344_5566_7788).to_string(),
            "11:22:33:44:55:66:77:88"
        );
    }

    #[test]
    fn test_parse_forms() {
        let expected = SwitchId::new(0x0a);
        assert_eq!("00:00:00:00:00:00:00:0a".parse::<SwitchId>().unwrap(), expected);
        assert_eq!("0x0a".parse::<SwitchId>().unwrap(), expected);
        assert_eq!("a".parse::<SwitchId>().unwrap(), expected);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!("".parse::<SwitchId>().is_err());
        assert!("00:00:0a".parse::<SwitchId>().is_err());
        assert!("zz".parse::<SwitchId>().is_err());
        assert!("11223344556677889".parse::<SwitchId>().is_err());
    }

    #[test]
    fn test_parse_rejects_sign() {
        assert!("+a".parse::<SwitchId>().is_err());
        assert!("0x+a".parse::<SwitchId>().is_err());
        assert!("+0:00:00:00:00:00:00:0a".parse::<SwitchId>().is_err());
        assert!("0x0x0a".parse::<SwitchId>().is_err());
    }

    #[test]
    fn test_numeric_ordering() {
        assert!(SwitchId::new(2) < SwitchId::new(0x10));
    }

    #[test]
    fn test_serde_as_string() {
        let id = SwitchId::new(5);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00:00:00:00:00:00:00:05\"");
        let back: SwitchId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
