//! Switch port endpoints and inter-switch link references.

use super::SwitchId;
use crate::error::{DiscoveryError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Highest non-reserved OpenFlow port number (OFPP_MAX).
pub const MAX_PORT_NUMBER: u32 = 0xffff_ff00;

/// A (switch, port) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub switch_id: SwitchId,
    pub port_number: u32,
}

impl Endpoint {
    pub fn new(switch_id: SwitchId, port_number: u32) -> Self {
        Self {
            switch_id,
            port_number,
        }
    }

    /// Builds an endpoint from a raw port number as stored in durable records.
    pub fn from_raw(switch_id: SwitchId, raw_port: i64) -> Result<Self> {
        u32::try_from(raw_port)
            .ok()
            .filter(|port| *port <= MAX_PORT_NUMBER)
            .map(|port| Self::new(switch_id, port))
            .ok_or_else(|| {
                DiscoveryError::InvalidEndpoint(format!(
                    "{} port {} is out of range",
                    switch_id, raw_port
                ))
            })
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.switch_id, self.port_number)
    }
}

/// Direction-independent reference to an inter-switch link.
///
/// The lower endpoint is always stored as `source`, so a link and its
/// reverse report map to the same reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IslReference {
    source: Endpoint,
    dest: Endpoint,
}

impl IslReference {
    pub fn new(a: Endpoint, b: Endpoint) -> Self {
        if a <= b {
            Self { source: a, dest: b }
        } else {
            Self { source: b, dest: a }
        }
    }

    pub fn source(&self) -> &Endpoint {
        &self.source
    }

    pub fn dest(&self) -> &Endpoint {
        &self.dest
    }
}

impl fmt::Display for IslReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.source, self.dest)
    }
}

/// Link facts carried by an ISL discovery report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IslFacts {
    /// Endpoint the discovery probe was sent from
    pub source: Endpoint,
    /// Endpoint the discovery probe was received on
    pub dest: Endpoint,
    pub speed: u64,
    pub available_bandwidth: u64,
}

impl IslFacts {
    pub fn new(source: Endpoint, dest: Endpoint, speed: u64, available_bandwidth: u64) -> Self {
        Self {
            source,
            dest,
            speed,
            available_bandwidth,
        }
    }

    pub fn reference(&self) -> IslReference {
        IslReference::new(self.source, self.dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(switch: u64, port: u32) -> Endpoint {
        Endpoint::new(SwitchId::new(switch), port)
    }

    #[test]
    fn test_reference_is_order_independent() {
        let pairs = [
            (ep(1, 10), ep(2, 20)),
            (ep(0xff, 1), ep(0x0f, 48)),
            (ep(7, 3), ep(7, 4)),
        ];
        for (a, b) in pairs {
            assert_eq!(IslReference::new(a, b), IslReference::new(b, a));
        }
    }

    #[test]
    fn test_reference_stores_smaller_switch_first() {
        let reference = IslReference::new(ep(9, 1), ep(3, 2));
        assert_eq!(reference.source(), &ep(3, 2));
        assert_eq!(reference.dest(), &ep(9, 1));
    }

    #[test]
    fn test_from_raw_validation() {
        let sw = SwitchId::new(1);
        assert_eq!(Endpoint::from_raw(sw, 0).unwrap(), ep(1, 0));
        assert_eq!(
            Endpoint::from_raw(sw, i64::from(MAX_PORT_NUMBER)).unwrap().port_number,
            MAX_PORT_NUMBER
        );
        assert!(Endpoint::from_raw(sw, -1).is_err());
        assert!(Endpoint::from_raw(sw, i64::from(MAX_PORT_NUMBER) + 1).is_err());
    }

    #[test]
    fn test_isl_facts_reference() {
        let facts = IslFacts::new(ep(5, 1), ep(2, 7), 10_000, 9_000);
        assert_eq!(facts.reference(), IslReference::new(ep(2, 7), ep(5, 1)));
    }

    #[test]
    fn test_endpoint_display() {
        assert_eq!(ep(1, 5).to_string(), "00:00:00:00:00:00:00:01_5");
    }
}
