use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Capability descriptor published by a worker-discovery service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkerManifest {
    pub id: String,
    #[serde(default)]
    pub available_nodes: Vec<String>,
    #[serde(default)]
    pub node_registry: Vec<NodeDefinition>,
    #[serde(default)]
    pub vram_capacity: f64,
    #[serde(default)]
    pub vram_used: f64,
}

/// Port schema of one node type. Key order of `outputs` is the slot order.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct NodeDefinition {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub inputs: IndexMap<String, serde_json::Value>,
    #[serde(default)]
    pub outputs: IndexMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotLookup {
    Resolved(usize),
    UnknownType,
    UnknownPort,
}

impl SlotLookup {
    /// Slot handed to the worker; misses fall back to the first output.
    pub fn slot(self) -> usize {
        match self {
            SlotLookup::Resolved(slot) => slot,
            SlotLookup::UnknownType | SlotLookup::UnknownPort => 0,
        }
    }
}

impl NodeDefinition {
    pub fn output_slot(&self, port: &str) -> Option<usize> {
        let wanted = port.to_lowercase();
        self.outputs.keys().position(|name| name.to_lowercase() == wanted)
    }

    pub fn has_input(&self, port: &str) -> bool {
        self.inputs.contains_key(port)
    }
}

impl WorkerManifest {
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn free_vram(&self) -> f64 {
        self.vram_capacity - self.vram_used
    }

    pub fn registry(&self) -> NodeRegistry<'_> {
        NodeRegistry::new(self)
    }
}

/// Type-tag keyed lookup table over a manifest.
#[derive(Debug, Clone)]
pub struct NodeRegistry<'a> {
    available: HashSet<&'a str>,
    definitions: HashMap<&'a str, &'a NodeDefinition>,
}

impl<'a> NodeRegistry<'a> {
    pub fn new(manifest: &'a WorkerManifest) -> Self {
        let available = manifest.available_nodes.iter().map(String::as_str).collect();
        let mut definitions = HashMap::new();
        for def in &manifest.node_registry {
            definitions.entry(def.kind.as_str()).or_insert(def);
        }
        Self { available, definitions }
    }

    pub fn is_available(&self, kind: &str) -> bool {
        self.available.contains(kind)
    }

    pub fn definition(&self, kind: &str) -> Option<&'a NodeDefinition> {
        self.definitions.get(kind).copied()
    }

    pub fn resolve_output_slot(&self, kind: &str, port: &str) -> SlotLookup {
        match self.definition(kind) {
            None => SlotLookup::UnknownType,
            Some(def) => def.output_slot(port).map_or(SlotLookup::UnknownPort, SlotLookup::Resolved),
        }
    }
}
