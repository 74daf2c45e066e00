mod common;

use common::{ir, manifest, sampler_decode_ir, two_node_manifest};
use rezonic::compiler::bytecode::{SkipReason, to_json};
use rezonic::compiler::{CompileError, InputValue};
use rezonic::{compile, compile_with_report};
use serde_json::json;

#[test]
fn lowers_the_reference_scenario() {
    let code = compile(&sampler_decode_ir(), Some(&two_node_manifest())).unwrap();
    assert_eq!(
        serde_json::to_value(&code).unwrap(),
        json!({
            "1": {"class_type": "KSampler", "inputs": {}},
            "2": {"class_type": "VAEDecode", "inputs": {"samples": ["1", 0]}}
        })
    );
    assert_eq!(code.keys().collect::<Vec<_>>(), vec!["1", "2"]);
}

#[test]
fn resolves_named_output_to_its_position() {
    let worker = manifest(json!({
        "id": "w", "availableNodes": ["Noise", "Mix"],
        "nodeRegistry": [{"type": "Noise", "inputs": {}, "outputs": {"LATENT": {}, "NOISE": {}}}],
        "vramCapacity": 8, "vramUsed": 0
    }));
    let graph = ir(json!({
        "id": "slots", "version": "1.0.0",
        "nodes": [{"id": "a", "type": "Noise", "inputs": {}}, {"id": "b", "type": "Mix", "inputs": {}}],
        "edges": [["a.NOISE", "b.noise"], ["a.latent", "b.latent"]]
    }));
    let (code, report) = compile_with_report(&graph, Some(&worker)).unwrap();
    assert_eq!(code["b"].inputs["noise"], InputValue::link("a", 1));
    assert_eq!(code["b"].inputs["latent"], InputValue::link("a", 0));
    assert!(report.slot_fallbacks.is_empty());
}

#[test]
fn unmatched_output_falls_back_to_slot_zero_and_is_reported() {
    let graph = ir(json!({
        "id": "fb", "version": "1.0.0",
        "nodes": [{"id": "1", "type": "KSampler", "inputs": {}}, {"id": "2", "type": "Mystery", "inputs": {}}, {"id": "3", "type": "VAEDecode", "inputs": {}}],
        "edges": [["1.MASK", "3.samples"], ["2.OUT", "3.vae"]]
    }));
    let (code, report) = compile_with_report(&graph, Some(&two_node_manifest())).unwrap();
    assert_eq!(code["3"].inputs["samples"], InputValue::link("1", 0));
    assert_eq!(code["3"].inputs["vae"], InputValue::link("2", 0));
    assert_eq!(report.slot_fallbacks.len(), 2);
    assert!(!report.slot_fallbacks[0].unknown_type);
    assert!(report.slot_fallbacks[1].unknown_type);

    let (_, quiet) = compile_with_report(&graph, None).unwrap();
    assert!(quiet.slot_fallbacks.is_empty());
}

#[test]
fn edges_overwrite_literal_defaults_and_nulls_are_dropped() {
    let graph = ir(json!({
        "id": "lit", "version": "1.0.0",
        "nodes": [
            {"id": "1", "type": "KSampler", "inputs": {"seed": 42, "cfg": 7.5, "model": null}},
            {"id": "2", "type": "VAEDecode", "inputs": {"samples": "placeholder", "tile": 512}}
        ],
        "edges": [["1.LATENT", "2.samples"]]
    }));
    let code = compile(&graph, None).unwrap();
    assert_eq!(serde_json::to_value(&code["1"].inputs).unwrap(), json!({"seed": 42, "cfg": 7.5}));
    assert_eq!(serde_json::to_value(&code["2"].inputs).unwrap(), json!({"samples": ["1", 0], "tile": 512}));
}

#[test]
fn malformed_and_orphaned_edges_are_skipped() {
    let graph = ir(json!({
        "id": "skip", "version": "1.0.0",
        "nodes": [{"id": "1", "type": "KSampler", "inputs": {}}, {"id": "2", "type": "VAEDecode", "inputs": {}}],
        "edges": [["1LATENT", "2.samples"], ["9.LATENT", "2.samples"], ["1.LATENT", "2.a.b"], ["1.LATENT", "2.samples"]]
    }));
    let (code, report) = compile_with_report(&graph, None).unwrap();
    assert_eq!(code["2"].inputs.len(), 1);
    let reasons: Vec<_> = report.skipped_edges.iter().map(|e| (e.index, e.reason)).collect();
    assert_eq!(reasons, vec![(0, SkipReason::Malformed), (1, SkipReason::Orphaned), (2, SkipReason::Malformed)]);
}

#[test]
fn dce_drops_nodes_without_a_path_to_a_sink() {
    let graph = ir(json!({
        "id": "dce", "version": "1.0.0",
        "nodes": [
            {"id": "1", "type": "KSampler", "inputs": {}},
            {"id": "2", "type": "VAEDecode", "inputs": {}, "outputType": "image"},
            {"id": "3", "type": "CLIPTextEncode", "inputs": {}},
            {"id": "4", "type": "Orphan", "inputs": {}}
        ],
        "edges": [["1.LATENT", "2.samples"], ["3.CONDITIONING", "4.cond"]],
        "executionHints": {"compilerFlags": {"pruneDeadNodes": true}}
    }));
    let (code, report) = compile_with_report(&graph, None).unwrap();
    assert_eq!(code.keys().collect::<Vec<_>>(), vec!["1", "2"]);
    assert_eq!(report.pruned, vec!["3".to_string(), "4".to_string()]);
    assert_eq!(report.skipped_edges.len(), 1);
    assert_eq!(report.skipped_edges[0].reason, SkipReason::Orphaned);
}

#[test]
fn dce_without_sinks_empties_the_graph() {
    let mut graph = sampler_decode_ir();
    graph.execution_hints = serde_json::from_value(json!({"compilerFlags": {"pruneDeadNodes": true}})).unwrap();
    assert!(compile(&graph, None).unwrap().is_empty());
}

#[test]
fn dce_keeps_save_image_ancestry() {
    let graph = ir(json!({
        "id": "save", "version": "1.0.0",
        "nodes": [
            {"id": "1", "type": "KSampler", "inputs": {}},
            {"id": "2", "type": "VAEDecode", "inputs": {}},
            {"id": "3", "type": "SaveImage", "inputs": {"filename_prefix": "out"}}
        ],
        "edges": [["1.LATENT", "2.samples"], ["2.IMAGE", "3.images"]],
        "executionHints": {"compilerFlags": {"pruneDeadNodes": true, "autoInsertSave": true}}
    }));
    let (code, report) = compile_with_report(&graph, Some(&two_node_manifest())).unwrap();
    assert_eq!(code.len(), 3);
    assert!(report.pruned.is_empty());
    assert_eq!(report.synthesized_save, None);
    assert_eq!(code["3"].inputs["images"], InputValue::link("2", 0));
}

#[test]
fn auto_save_wires_the_first_image_node() {
    let graph = ir(json!({
        "id": "auto", "version": "1.0.0",
        "nodes": [
            {"id": "1", "type": "KSampler", "inputs": {}},
            {"id": "2", "type": "VAEDecode", "inputs": {}, "outputType": "image"}
        ],
        "edges": [["1.LATENT", "2.samples"]],
        "executionHints": {"compilerFlags": {"autoInsertSave": true}}
    }));
    let (code, report) = compile_with_report(&graph, None).unwrap();
    assert_eq!(report.synthesized_save.as_deref(), Some("999"));
    let save = &code["999"];
    assert_eq!(save.class_type, "SaveImage");
    assert_eq!(save.inputs["images"], InputValue::link("2", 0));
    assert_eq!(save.inputs["filename_prefix"], InputValue::Literal(json!("Rezonic")));
    assert_eq!(code.keys().last().map(String::as_str), Some("999"));
}

#[test]
fn auto_save_skips_a_taken_reserved_id() {
    let graph = ir(json!({
        "id": "taken", "version": "1.0.0",
        "nodes": [{"id": "999", "type": "VAEDecode", "inputs": {}, "outputType": "image"}],
        "edges": [],
        "executionHints": {"compilerFlags": {"autoInsertSave": true}}
    }));
    let code = compile(&graph, None).unwrap();
    assert_eq!(code["999"].class_type, "VAEDecode");
    assert_eq!(code["1000"].inputs["images"], InputValue::link("999", 0));
}

#[test]
fn auto_save_never_invents_a_source() {
    let mut graph = sampler_decode_ir();
    graph.execution_hints = serde_json::from_value(json!({"compilerFlags": {"autoInsertSave": true}})).unwrap();
    let (code, report) = compile_with_report(&graph, None).unwrap();
    assert_eq!(code.len(), 2);
    assert_eq!(report.synthesized_save, None);
}

#[test]
fn rejects_other_major_or_minor_versions() {
    let mut graph = sampler_decode_ir();
    graph.version = "1.0.7".into();
    assert!(compile(&graph, None).is_ok());

    for version in ["1.1.0", "2.0.0", "latest"] {
        graph.version = version.into();
        assert_eq!(
            compile(&graph, None),
            Err(CompileError::UnsupportedVersion { found: version.into(), supported: "1.0.0".into() })
        );
    }
}

#[test]
fn compiling_twice_is_byte_identical() {
    let worker = two_node_manifest();
    let graph = sampler_decode_ir();
    let first = to_json(&compile(&graph, Some(&worker)).unwrap()).unwrap();
    let second = to_json(&compile(&graph, Some(&worker)).unwrap()).unwrap();
    assert_eq!(first, second);
}

#[test]
fn does_not_touch_the_input_ir() {
    let graph = ir(json!({
        "id": "pure", "version": "1.0.0",
        "nodes": [{"id": "1", "type": "KSampler", "inputs": {"seed": 1}}, {"id": "2", "type": "X", "inputs": {}}],
        "edges": [["1.LATENT", "2.samples"]],
        "executionHints": {"compilerFlags": {"pruneDeadNodes": true, "autoInsertSave": true}}
    }));
    let before = graph.clone();
    let _ = compile(&graph, None);
    assert_eq!(graph, before);
}
