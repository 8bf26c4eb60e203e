//! Host address parsing and validation.
//!
//! Hosts may be given a plain address (`10.0.0.1`) or an address with a
//! prefix length (`10.0.0.1/8`). Only syntax is checked here; nothing is
//! verified about reachability or subnet overlap.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Errors that can occur while parsing a host address
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("invalid IP address '{0}'")]
    InvalidIp(String),

    #[error("invalid prefix length '{0}'")]
    InvalidPrefix(String),

    #[error("prefix length {len} exceeds {max} for {ip}")]
    PrefixTooLong { ip: IpAddr, len: u8, max: u8 },
}

/// A host's network address with optional prefix length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HostAddress {
    ip: IpAddr,
    prefix_len: Option<u8>,
}

impl HostAddress {
    pub fn new(ip: IpAddr, prefix_len: Option<u8>) -> Result<Self, AddressError> {
        if let Some(len) = prefix_len {
            let max = max_prefix_len(&ip);
            if len > max {
                return Err(AddressError::PrefixTooLong { ip, len, max });
            }
        }
        Ok(Self { ip, prefix_len })
    }

    pub fn ip(&self) -> IpAddr {
        self.ip
    }

    pub fn prefix_len(&self) -> Option<u8> {
        self.prefix_len
    }
}

impl FromStr for HostAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AddressError::Empty);
        }

        let (ip_part, prefix_part) = match s.split_once('/') {
            Some((ip, prefix)) => (ip, Some(prefix)),
            None => (s, None),
        };

        let ip = ip_part
            .parse::<IpAddr>()
            .map_err(|_| AddressError::InvalidIp(ip_part.to_string()))?;

        let prefix_len = match prefix_part {
            Some(p) => Some(
                p.parse::<u8>()
                    .map_err(|_| AddressError::InvalidPrefix(p.to_string()))?,
            ),
            None => None,
        };

        HostAddress::new(ip, prefix_len)
    }
}

impl fmt::Display for HostAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.prefix_len {
            Some(len) => write!(f, "{}/{}", self.ip, len),
            None => write!(f, "{}", self.ip),
        }
    }
}

impl Serialize for HostAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HostAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Largest prefix length allowed for the address family of `ip`
pub fn max_prefix_len(ip: &IpAddr) -> u8 {
    match ip {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    }
}
