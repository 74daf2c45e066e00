use crate::manifest::SlotLookup;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Worker-ready job description keyed by node id, in lowering order.
pub type BytecodeMap = IndexMap<String, BytecodeNode>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct BytecodeNode {
    pub class_type: String,
    pub inputs: IndexMap<String, InputValue>,
}

/// An input is either a literal or a `[sourceNodeId, slotIndex]` link.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum InputValue {
    Link(String, usize),
    Literal(serde_json::Value),
}

impl InputValue {
    pub fn link(node_id: &str, slot: usize) -> Self {
        InputValue::Link(node_id.to_string(), slot)
    }
}

impl BytecodeNode {
    pub fn new(class_type: &str) -> Self {
        Self { class_type: class_type.to_string(), inputs: IndexMap::new() }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Malformed,
    Orphaned,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SkippedEdge {
    pub index: usize,
    pub source: String,
    pub target: String,
    pub reason: SkipReason,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SlotFallback {
    pub source: String,
    pub node_type: String,
    pub port: String,
    pub unknown_type: bool,
}

impl SlotFallback {
    pub fn new(source: &str, node_type: &str, port: &str, lookup: SlotLookup) -> Self {
        Self {
            source: source.to_string(),
            node_type: node_type.to_string(),
            port: port.to_string(),
            unknown_type: lookup == SlotLookup::UnknownType,
        }
    }
}

/// What the lowering passes did besides emitting bytecode.
#[derive(Debug, Serialize, Clone, PartialEq, Eq, Default)]
pub struct CompileReport {
    pub pruned: Vec<String>,
    pub skipped_edges: Vec<SkippedEdge>,
    pub slot_fallbacks: Vec<SlotFallback>,
    pub synthesized_save: Option<String>,
}

pub fn to_json(bytecode: &BytecodeMap) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(bytecode)?)
}
