use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A `"<nodeId>.<portName>"` endpoint of an SSA edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortRef {
    pub node_id: String,
    pub port_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortRefError {
    #[error("port reference '{0}' has no '.' separator")]
    MissingSeparator(String),
    #[error("port reference '{0}' has more than one '.' separator")]
    TooManySeparators(String),
    #[error("port reference '{0}' has an empty node id")]
    EmptyNodeId(String),
    #[error("port reference '{0}' has an empty port name")]
    EmptyPortName(String),
}

impl PortRef {
    pub fn new(node_id: &str, port_name: &str) -> Self {
        Self { node_id: node_id.to_string(), port_name: port_name.to_string() }
    }

    pub fn parse(raw: &str) -> Result<Self, PortRefError> {
        let (node_id, port_name) = raw
            .split_once('.')
            .ok_or_else(|| PortRefError::MissingSeparator(raw.to_string()))?;
        if port_name.contains('.') {
            return Err(PortRefError::TooManySeparators(raw.to_string()));
        }
        if node_id.is_empty() {
            return Err(PortRefError::EmptyNodeId(raw.to_string()));
        }
        if port_name.is_empty() {
            return Err(PortRefError::EmptyPortName(raw.to_string()));
        }
        Ok(Self::new(node_id, port_name))
    }
}

impl FromStr for PortRef {
    type Err = PortRefError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.node_id, self.port_name)
    }
}
