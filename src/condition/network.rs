//! CIDR-based network conditions
//!
//! Not part of the default registry; opt in with
//! [`ConditionRegistry::with_network_conditions`](super::ConditionRegistry::with_network_conditions).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

use super::types::Condition;
use crate::request::Request;

/// An address block such as `192.168.1.0/24` or `fd00::/8`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct IpNetwork {
    addr: IpAddr,
    prefix: u8,
}

impl IpNetwork {
    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `ip` falls inside the block. Addresses of the other family
    /// never match.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX.checked_shl(32 - u32::from(self.prefix)).unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX.checked_shl(128 - u32::from(self.prefix)).unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

impl FromStr for IpNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .split_once('/')
            .ok_or_else(|| format!("invalid CIDR address: {}", s))?;

        let addr: IpAddr = addr
            .parse()
            .map_err(|_| format!("invalid CIDR address: {}", s))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|_| format!("invalid CIDR prefix: {}", s))?;

        let max = if addr.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return Err(format!("invalid CIDR prefix: {}", s));
        }

        Ok(Self { addr, prefix })
    }
}

impl TryFrom<String> for IpNetwork {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<IpNetwork> for String {
    fn from(network: IpNetwork) -> Self {
        network.to_string()
    }
}

impl fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix)
    }
}

fn metadata_ip(value: Option<&Value>) -> Option<IpAddr> {
    value.and_then(Value::as_str)?.parse().ok()
}

/// Meets when the metadata value is an address inside one of `networks`.
///
/// Options: `{"networks": ["10.0.0.0/8", ...]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpAllowCondition {
    #[serde(default)]
    pub networks: Vec<IpNetwork>,
}

impl Condition for IpAllowCondition {
    fn name(&self) -> &'static str {
        "ip_allow"
    }

    fn meets(&self, value: Option<&Value>, _request: &Request) -> bool {
        match metadata_ip(value) {
            Some(ip) => self.networks.iter().any(|net| net.contains(ip)),
            None => false,
        }
    }
}

/// Meets when the metadata value is an address outside every one of
/// `networks`. A missing or unparseable address never meets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IpDenyCondition {
    #[serde(default)]
    pub networks: Vec<IpNetwork>,
}

impl Condition for IpDenyCondition {
    fn name(&self) -> &'static str {
        "ip_deny"
    }

    fn meets(&self, value: Option<&Value>, _request: &Request) -> bool {
        match metadata_ip(value) {
            Some(ip) => !self.networks.iter().any(|net| net.contains(ip)),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("192.168.1.0/24", "192.168.1.77", true ; "inside v4 block")]
    #[test_case("192.168.1.0/24", "192.168.10.111", false ; "outside v4 block")]
    #[test_case("10.0.0.0/8", "10.255.0.1", true ; "wide v4 block")]
    #[test_case("0.0.0.0/0", "8.8.8.8", true ; "zero prefix")]
    #[test_case("127.0.0.1/32", "127.0.0.1", true ; "host route")]
    #[test_case("127.0.0.1/32", "127.0.0.2", false ; "host route miss")]
    #[test_case("fd00::/8", "fd12:3456::1", true ; "inside v6 block")]
    #[test_case("fd00::/8", "fe80::1", false ; "outside v6 block")]
    #[test_case("10.0.0.0/8", "::1", false ; "family mismatch")]
    fn test_network_contains(network: &str, ip: &str, expected: bool) {
        let network: IpNetwork = network.parse().unwrap();
        assert_eq!(network.contains(ip.parse().unwrap()), expected);
    }

    #[test_case("10.0.0.0" ; "missing prefix")]
    #[test_case("10.0.0.0/33" ; "v4 prefix too long")]
    #[test_case("::/129" ; "v6 prefix too long")]
    #[test_case("10.0.0/8" ; "bad address")]
    #[test_case("10.0.0.0/x" ; "bad prefix")]
    fn test_network_parse_errors(network: &str) {
        assert!(network.parse::<IpNetwork>().is_err());
    }

    #[test]
    fn test_network_serde_as_string() {
        let network: IpNetwork = serde_json::from_str("\"192.168.1.0/24\"").unwrap();
        assert_eq!(serde_json::to_string(&network).unwrap(), "\"192.168.1.0/24\"");
    }
}
