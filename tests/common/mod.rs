#![allow(dead_code)]

use rezonic::{RezonicIR, WorkerManifest};
use serde_json::{Value, json};

pub fn ir(value: Value) -> RezonicIR {
    serde_json::from_value(value).expect("fixture IR must deserialize")
}

pub fn manifest(value: Value) -> WorkerManifest {
    serde_json::from_value(value).expect("fixture manifest must deserialize")
}

/// KSampler -> VAEDecode pipeline worker.
pub fn two_node_manifest() -> WorkerManifest {
    manifest(json!({
        "id": "worker-1",
        "availableNodes": ["KSampler", "VAEDecode", "SaveImage"],
        "nodeRegistry": [
            {"type": "KSampler", "inputs": {"model": {}, "seed": {}}, "outputs": {"LATENT": {}}},
            {"type": "VAEDecode", "inputs": {"samples": {}, "vae": {}}, "outputs": {"IMAGE": {}}},
            {"type": "SaveImage", "inputs": {"images": {}, "filename_prefix": {}}, "outputs": {}}
        ],
        "vramCapacity": 24,
        "vramUsed": 8
    }))
}

pub fn sampler_decode_ir() -> RezonicIR {
    ir(json!({
        "id": "ir-1",
        "version": "1.0.0",
        "nodes": [
            {"id": "1", "type": "KSampler", "inputs": {}},
            {"id": "2", "type": "VAEDecode", "inputs": {}}
        ],
        "edges": [["1.LATENT", "2.samples"]]
    }))
}
