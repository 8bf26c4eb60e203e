//! Controller references.
//!
//! The emulated switches are attached to a controller that this crate never
//! talks to directly; it only tells the runtime where the controller lives.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// Default OpenFlow controller port
pub const DEFAULT_CONTROLLER_PORT: u16 = 6653;

/// Host used for a remote controller when none is given
pub const DEFAULT_CONTROLLER_HOST: &str = "127.0.0.1";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerParseError {
    #[error("controller reference is empty")]
    Empty,

    #[error("invalid controller port '{0}'")]
    InvalidPort(String),

    #[error("invalid controller host '{0}'")]
    InvalidHost(String),
}

/// Where the materialized network's switches get their control plane
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerRef {
    /// A controller started by the runtime alongside the network
    Local,
    /// An already running controller reachable at `host:port`
    Remote { host: String, port: u16 },
}

impl ControllerRef {
    pub fn remote(host: impl Into<String>, port: u16) -> Self {
        Self::Remote {
            host: host.into(),
            port,
        }
    }

    pub fn is_local(&self) -> bool {
        matches!(self, Self::Local)
    }
}

impl Default for ControllerRef {
    fn default() -> Self {
        Self::remote(DEFAULT_CONTROLLER_HOST, DEFAULT_CONTROLLER_PORT)
    }
}

impl fmt::Display for ControllerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => f.write_str("local"),
            Self::Remote { host, port } if host.contains(':') => write!(f, "[{}]:{}", host, port),
            Self::Remote { host, port } => write!(f, "{}:{}", host, port),
        }
    }
}

impl FromStr for ControllerRef {
    type Err = ControllerParseError;

    /// Accepts `local`, `host`, `host:port`, `[v6]:port` and bare IPv6 addresses.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ControllerParseError::Empty);
        }
        if s.eq_ignore_ascii_case("local") {
            return Ok(Self::Local);
        }

        // Bracketed IPv6 with optional port
        if let Some(rest) = s.strip_prefix('[') {
            let (host, tail) = rest
                .split_once(']')
                .ok_or_else(|| ControllerParseError::InvalidHost(s.to_string()))?;
            host.parse::<IpAddr>()
                .map_err(|_| ControllerParseError::InvalidHost(host.to_string()))?;
            let port = match tail.strip_prefix(':') {
                Some(port) => parse_port(port)?,
                None if tail.is_empty() => DEFAULT_CONTROLLER_PORT,
                None => return Err(ControllerParseError::InvalidHost(s.to_string())),
            };
            return Ok(Self::remote(host, port));
        }

        // Bare IPv6 address, no port
        if s.matches(':').count() > 1 {
            let ip = s
                .parse::<IpAddr>()
                .map_err(|_| ControllerParseError::InvalidHost(s.to_string()))?;
            return Ok(Self::remote(ip.to_string(), DEFAULT_CONTROLLER_PORT));
        }

        let (host, port) = match s.split_once(':') {
            Some((host, port)) => (host, parse_port(port)?),
            None => (s, DEFAULT_CONTROLLER_PORT),
        };
        if host.is_empty() || host.chars().any(char::is_whitespace) {
            return Err(ControllerParseError::InvalidHost(host.to_string()));
        }
        Ok(Self::remote(host, port))
    }
}

fn parse_port(raw: &str) -> Result<u16, ControllerParseError> {
    match raw.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(ControllerParseError::InvalidPort(raw.to_string())),
    }
}

impl Serialize for ControllerRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ControllerRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_local() {
        assert_eq!("local".parse::<ControllerRef>(), Ok(ControllerRef::Local));
        assert_eq!("LOCAL".parse::<ControllerRef>(), Ok(ControllerRef::Local));
    }

    #[test]
    fn test_parse_remote_forms() {
        assert_eq!(
            "10.1.2.3:6633".parse::<ControllerRef>(),
            Ok(ControllerRef::remote("10.1.2.3", 6633))
        );
        assert_eq!(
            "pox.lab".parse::<ControllerRef>(),
            Ok(ControllerRef::remote("pox.lab", DEFAULT_CONTROLLER_PORT))
        );
        assert_eq!(
            "[fd00::1]:6633".parse::<ControllerRef>(),
            Ok(ControllerRef::remote("fd00::1", 6633))
        );
        assert_eq!(
            "fd00::1".parse::<ControllerRef>(),
            Ok(ControllerRef::remote("fd00::1", DEFAULT_CONTROLLER_PORT))
        );
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<ControllerRef>(), Err(ControllerParseError::Empty));
        assert!(matches!("host:0".parse::<ControllerRef>(), Err(ControllerParseError::InvalidPort(_))));
        assert!(matches!("host:99999".parse::<ControllerRef>(), Err(ControllerParseError::InvalidPort(_))));
        assert!(matches!(":6653".parse::<ControllerRef>(), Err(ControllerParseError::InvalidHost(_))));
        assert!(matches!("[nope]:1".parse::<ControllerRef>(), Err(ControllerParseError::InvalidHost(_))));
    }

    #[test]
    fn test_display_round_trips() {
        for raw in ["local", "127.0.0.1:6653", "[fd00::1]:6633"] {
            let parsed: ControllerRef = raw.parse().unwrap();
            assert_eq!(parsed.to_string(), raw);
        }
        assert_eq!(ControllerRef::default().to_string(), "127.0.0.1:6653");
    }
}
