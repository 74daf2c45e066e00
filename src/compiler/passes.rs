use crate::compiler::bytecode::{BytecodeNode, InputValue, SkipReason, SkippedEdge, SlotFallback};
use crate::compiler::{LoweringContext, Pass};
use crate::manifest::SlotLookup;
use std::collections::HashSet;

/// Reserved id of the synthesized sink; bumped while taken.
pub const SAVE_NODE_ID: u64 = 999;
pub const SAVE_FILENAME_PREFIX: &str = "Rezonic";

pub struct DeadCodeElimination;

impl Pass for DeadCodeElimination {
    fn name(&self) -> &str {
        "Dead Code Elimination"
    }

    fn run(&self, ctx: &mut LoweringContext<'_>) {
        if !ctx.flags.prune_dead_nodes {
            return;
        }

        let seeds: Vec<_> = ctx
            .nodes
            .iter()
            .filter(|n| n.is_terminal())
            .filter_map(|n| ctx.graph.index_of(&n.id))
            .collect();
        let keep = ctx.graph.ancestors(seeds);

        let graph = &ctx.graph;
        let (live, dead): (Vec<_>, Vec<_>) = ctx
            .nodes
            .iter()
            .copied()
            .partition(|n| graph.index_of(&n.id).is_some_and(|idx| keep.contains(&idx)));

        ctx.report.pruned = dead.iter().map(|n| n.id.clone()).collect();
        tracing::debug!(kept = live.len(), pruned = dead.len(), "dead nodes removed");
        ctx.nodes = live;
    }
}

/// Copies each surviving node's literal inputs; `null` placeholders are left out.
pub struct NodeInstantiation;

impl Pass for NodeInstantiation {
    fn name(&self) -> &str {
        "Node Instantiation"
    }

    fn run(&self, ctx: &mut LoweringContext<'_>) {
        for node in &ctx.nodes {
            let mut entry = BytecodeNode::new(&node.kind);
            for (name, value) in &node.inputs {
                if !value.is_null() {
                    entry.inputs.insert(name.clone(), InputValue::Literal(value.clone()));
                }
            }
            ctx.bytecode.insert(node.id.clone(), entry);
        }
    }
}

pub struct EdgeLowering;

impl Pass for EdgeLowering {
    fn name(&self) -> &str {
        "SSA Edge Lowering"
    }

    fn run(&self, ctx: &mut LoweringContext<'_>) {
        let ir = ctx.ir;
        for (index, (edge, endpoints)) in ir.edges.iter().zip(&ctx.graph.endpoints).enumerate() {
            let skip = |reason| SkippedEdge {
                index,
                source: edge.0.clone(),
                target: edge.1.clone(),
                reason,
            };

            let (Ok(src), Ok(dst)) = endpoints else {
                tracing::debug!(source = %edge.0, target = %edge.1, "skipping malformed edge");
                ctx.report.skipped_edges.push(skip(SkipReason::Malformed));
                continue;
            };
            let Some(source_type) = ctx.bytecode.get(&src.node_id).map(|n| n.class_type.clone())
            else {
                ctx.report.skipped_edges.push(skip(SkipReason::Orphaned));
                continue;
            };
            if !ctx.bytecode.contains_key(&dst.node_id) {
                ctx.report.skipped_edges.push(skip(SkipReason::Orphaned));
                continue;
            }

            let slot = match &ctx.registry {
                None => 0,
                Some(registry) => {
                    let lookup = registry.resolve_output_slot(&source_type, &src.port_name);
                    if !matches!(lookup, SlotLookup::Resolved(_)) {
                        tracing::warn!(
                            source = %src,
                            node_type = %source_type,
                            "output port not found in worker registry, falling back to slot 0"
                        );
                        ctx.report.slot_fallbacks.push(SlotFallback::new(
                            &edge.0,
                            &source_type,
                            &src.port_name,
                            lookup,
                        ));
                    }
                    lookup.slot()
                }
            };

            if let Some(target) = ctx.bytecode.get_mut(&dst.node_id) {
                target
                    .inputs
                    .insert(dst.port_name.clone(), InputValue::link(&src.node_id, slot));
            }
        }
    }
}

pub struct CfgCompletion;

impl Pass for CfgCompletion {
    fn name(&self) -> &str {
        "CFG Completion"
    }

    fn run(&self, ctx: &mut LoweringContext<'_>) {
        if !ctx.flags.auto_insert_save {
            return;
        }
        if ctx.bytecode.values().any(|n| n.class_type == "SaveImage") {
            return;
        }
        let Some(image) = ctx.nodes.iter().find(|n| n.produces_image()) else {
            return;
        };

        let taken: HashSet<&str> = ctx.bytecode.keys().map(String::as_str).collect();
        let save_id = (SAVE_NODE_ID..)
            .map(|n| n.to_string())
            .find(|id| !taken.contains(id.as_str()))
            .unwrap_or_else(|| SAVE_NODE_ID.to_string());

        let mut save = BytecodeNode::new("SaveImage");
        save.inputs.insert("images".to_string(), InputValue::link(&image.id, 0));
        save.inputs.insert(
            "filename_prefix".to_string(),
            InputValue::Literal(SAVE_FILENAME_PREFIX.into()),
        );

        tracing::debug!(save_id = %save_id, source = %image.id, "synthesized SaveImage sink");
        ctx.report.synthesized_save = Some(save_id.clone());
        ctx.bytecode.insert(save_id, save);
    }
}
