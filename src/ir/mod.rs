pub mod graph;
pub mod port;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub use port::{PortRef, PortRefError};

/// IR version the guardrail accepts verbatim and the compiler lowers.
pub const SUPPORTED_IR_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RezonicIR {
    pub id: String,
    pub version: String,
    pub nodes: Vec<RezonicNode>,
    #[serde(default)]
    pub edges: Vec<(String, String)>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_hints: Option<ExecutionHints>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RezonicNode {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// `null` marks an input that an edge is expected to supply.
    #[serde(default)]
    pub inputs: IndexMap<String, serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_requirement: Option<WorkerRequirement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NodeMetadata>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkerRequirement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_vram: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NodeMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionHints {
    #[serde(default)]
    pub compiler_flags: CompilerFlags,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct CompilerFlags {
    #[serde(default)]
    pub prune_dead_nodes: bool,
    #[serde(default)]
    pub auto_insert_save: bool,
}

impl RezonicNode {
    pub fn new(id: &str, kind: &str) -> Self {
        Self {
            id: id.to_string(),
            kind: kind.to_string(),
            inputs: IndexMap::new(),
            output_type: None,
            worker_requirement: None,
            metadata: None,
        }
    }

    pub fn produces_image(&self) -> bool {
        self.output_type.as_deref() == Some("image")
    }

    /// Sink-eligible for dead code elimination.
    pub fn is_terminal(&self) -> bool {
        self.kind == "SaveImage" || self.produces_image()
    }

    pub fn min_vram(&self) -> Option<f64> {
        self.worker_requirement.as_ref().and_then(|r| r.min_vram)
    }
}

impl RezonicIR {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn compiler_flags(&self) -> CompilerFlags {
        self.execution_hints
            .as_ref()
            .map(|h| h.compiler_flags)
            .unwrap_or_default()
    }

    pub fn node(&self, id: &str) -> Option<&RezonicNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Ids declared more than once, each reported once in first-seen order.
    pub fn duplicate_node_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups: Vec<&str> = Vec::new();
        for node in &self.nodes {
            if !seen.insert(node.id.as_str()) && !dups.contains(&node.id.as_str()) {
                dups.push(&node.id);
            }
        }
        dups
    }
}

/// Splits a dotted version into its numeric major and minor components.
pub fn major_minor(version: &str) -> Option<(u64, u64)> {
    let mut parts = version.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}
