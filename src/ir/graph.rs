// src/ir/graph.rs
//! Graph utilities: CFG construction from the procedure, dominator-tree
//! construction, and dominance-frontier computation (base spec §2 component
//! 1 and §6 External Interfaces). These are the one concrete implementation
//! the driver depends on; the `ControlFlowGraphView`/`DominatorTreeView`
//! traits mirror the `CFG/Graph` and `DominatorTree`/`dominator_graph`
//! interfaces base §6 describes, so an alternate backend could be swapped
//! in without touching `ssa::*`.
//!
//! The dominator-tree algorithm is Cooper, Harvey & Kennedy's "A Simple,
//! Fast Dominance Algorithm", the same one the teacher repository's
//! `ir/dominance.rs` implements, generalized from `petgraph::NodeIndex` to
//! this crate's `BlockId`.

use super::block::BlockId;
use super::procedure::Procedure;
use crate::error::GraphError;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use petgraph::Direction;

fn node_index(block: BlockId) -> NodeIndex {
    NodeIndex::new(block.index())
}

fn block_id(node: NodeIndex) -> BlockId {
    BlockId(node.index())
}

/// The control-flow graph of a procedure: one node per block, one edge per
/// successor relation named by a block's terminating instruction. Block 0
/// is always the entry.
#[derive(Debug, Clone)]
pub struct Cfg {
    graph: DiGraph<(), ()>,
    entry: BlockId,
}

impl PartialEq for Cfg {
    fn eq(&self, other: &Self) -> bool {
        self.entry == other.entry
            && self.graph.node_count() == other.graph.node_count()
            && self.graph.raw_edges().iter().map(|e| (e.source(), e.target())).eq(
                other.graph.raw_edges().iter().map(|e| (e.source(), e.target())),
            )
    }
}

impl Cfg {
    /// Builds the CFG by reading every block's terminator-derived successors,
    /// plus one edge per try/catch from its protected block to its handler
    /// (base spec §4.4 step 6 talks about "a block B [that] has an outgoing
    /// CFG edge to a handler H", so the exceptional transfer has to be a real
    /// graph edge for the dominator tree to ever find a handler strictly
    /// dominated by its protected block).
    ///
    /// # Errors
    /// Returns [`GraphError::NoEntryBlock`] if the procedure has no blocks.
    pub fn build(procedure: &Procedure) -> Result<Self, GraphError> {
        if procedure.block_count() == 0 {
            return Err(GraphError::NoEntryBlock);
        }
        let mut graph = DiGraph::new();
        for _ in 0..procedure.block_count() {
            graph.add_node(());
        }
        for block in procedure.blocks() {
            for succ in block.successors() {
                graph.add_edge(node_index(block.index()), node_index(succ), ());
            }
            for &tc_id in &block.try_catches {
                let handler = procedure.try_catch(tc_id).handler;
                graph.update_edge(node_index(block.index()), node_index(handler), ());
            }
        }
        Ok(Self { graph, entry: BlockId(0) })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.entry
    }

    #[must_use]
    pub fn outgoing_edges(&self, block: BlockId) -> Vec<BlockId> {
        self.graph.neighbors_directed(node_index(block), Direction::Outgoing).map(block_id).collect()
    }

    #[must_use]
    pub fn incoming_edges(&self, block: BlockId) -> Vec<BlockId> {
        self.graph.neighbors_directed(node_index(block), Direction::Incoming).map(block_id).collect()
    }

    /// Reverse post-order over blocks reachable from the entry, used to
    /// order the dominator-computation worklist.
    #[must_use]
    pub fn reverse_post_order(&self) -> Vec<BlockId> {
        let mut dfs = Dfs::new(&self.graph, node_index(self.entry));
        let mut post_order = Vec::with_capacity(self.graph.node_count());
        while let Some(node) = dfs.next(&self.graph) {
            post_order.push(block_id(node));
        }
        post_order.reverse();
        post_order
    }
}

/// Queried by the renamer to decide whether a use is validly reached and
/// whether a try/catch's handler is strictly dominated by its protected
/// block (base spec §4.6).
pub trait DominatorTreeView {
    fn dominates(&self, a: BlockId, b: BlockId) -> bool;
}

/// Queried by the renamer's pre-order dominator-tree walk.
pub trait DomGraphView {
    fn children(&self, node: BlockId) -> &[BlockId];
}

/// Dominator tree plus dominance frontiers for every block, computed in one
/// pass over a [`Cfg`].
#[derive(Debug, Clone)]
pub struct BasicDominatorTree {
    entry: BlockId,
    idom: Vec<Option<BlockId>>,
    children: Vec<Vec<BlockId>>,
    frontiers: Vec<Vec<BlockId>>,
}

impl BasicDominatorTree {
    /// Computes immediate dominators, dominator-tree children, and
    /// dominance frontiers for every block in `cfg`.
    #[must_use]
    pub fn compute(cfg: &Cfg) -> Self {
        let idom = compute_immediate_dominators(cfg);
        let children = build_children(cfg, &idom);
        let frontiers = compute_dominance_frontiers(cfg, &idom);
        Self { entry: cfg.entry(), idom, children, frontiers }
    }

    #[must_use]
    pub const fn entry(&self) -> BlockId {
        self.entry
    }

    #[must_use]
    pub fn immediate_dominator(&self, block: BlockId) -> Option<BlockId> {
        self.idom[block.index()]
    }

    #[must_use]
    pub fn frontier(&self, block: BlockId) -> &[BlockId] {
        self.frontiers.get(block.index()).map_or(&[], Vec::as_slice)
    }
}

impl DominatorTreeView for BasicDominatorTree {
    fn dominates(&self, a: BlockId, b: BlockId) -> bool {
        let mut current = b;
        loop {
            if current == a {
                return true;
            }
            match self.idom[current.index()] {
                Some(idom) if idom != current => current = idom,
                _ => return current == a,
            }
        }
    }
}

impl DomGraphView for BasicDominatorTree {
    fn children(&self, node: BlockId) -> &[BlockId] {
        self.children.get(node.index()).map_or(&[], Vec::as_slice)
    }
}

/// Cooper/Harvey/Kennedy iterative dominator computation. `idom[entry]` is
/// set to `entry` itself (a block is its own dominator); every other
/// reachable block's slot converges to its true immediate dominator.
/// Unreachable blocks (no predecessor chain from `entry`) are left `None`.
fn compute_immediate_dominators(cfg: &Cfg) -> Vec<Option<BlockId>> {
    let entry = cfg.entry();
    let mut idom = vec![None; cfg.size()];
    idom[entry.index()] = Some(entry);

    let rpo = cfg.reverse_post_order();
    let rpo_number: Vec<usize> = {
        let mut order = vec![usize::MAX; cfg.size()];
        for (i, &b) in rpo.iter().enumerate() {
            order[b.index()] = i;
        }
        order
    };
    let worklist: Vec<BlockId> = rpo.iter().copied().filter(|&b| b != entry).collect();

    let intersect = |idom: &[Option<BlockId>], mut a: BlockId, mut b: BlockId| -> BlockId {
        loop {
            match a.cmp(&b) {
                std::cmp::Ordering::Equal => return a,
                _ => {
                    while rpo_number[a.index()] > rpo_number[b.index()] {
                        a = idom[a.index()].expect("processed predecessor has an immediate dominator");
                    }
                    while rpo_number[b.index()] > rpo_number[a.index()] {
                        b = idom[b.index()].expect("processed predecessor has an immediate dominator");
                    }
                }
            }
        }
    };

    let mut changed = true;
    while changed {
        changed = false;
        for &node in &worklist {
            let preds = cfg.incoming_edges(node);
            let mut new_idom = None;
            for pred in preds {
                if idom[pred.index()].is_none() {
                    continue;
                }
                new_idom = Some(match new_idom {
                    None => pred,
                    Some(current) => intersect(&idom, current, pred),
                });
            }
            if new_idom.is_some() && idom[node.index()] != new_idom {
                idom[node.index()] = new_idom;
                changed = true;
            }
        }
    }
    idom
}

fn build_children(cfg: &Cfg, idom: &[Option<BlockId>]) -> Vec<Vec<BlockId>> {
    let mut children = vec![Vec::new(); cfg.size()];
    for node in 0..cfg.size() {
        let node = BlockId(node);
        if let Some(parent) = idom[node.index()]
            && parent != node
        {
            children[parent.index()].push(node);
        }
    }
    children
}

/// Standard dominance-frontier computation: for every join point `b` (more
/// than one predecessor), walk each predecessor up its dominator-tree chain
/// until reaching a block that dominates `b`, recording `b` in every
/// block's frontier passed along the way.
fn compute_dominance_frontiers(cfg: &Cfg, idom: &[Option<BlockId>]) -> Vec<Vec<BlockId>> {
    let mut frontiers: Vec<Vec<BlockId>> = vec![Vec::new(); cfg.size()];
    for node in 0..cfg.size() {
        let b = BlockId(node);
        let preds = cfg.incoming_edges(b);
        if preds.len() < 2 {
            continue;
        }
        let Some(idom_b) = idom[b.index()] else { continue };
        for pred in preds {
            if idom[pred.index()].is_none() {
                continue;
            }
            let mut runner = pred;
            while runner != idom_b {
                let frontier = &mut frontiers[runner.index()];
                if !frontier.contains(&b) {
                    frontier.push(b);
                }
                let Some(next) = idom[runner.index()] else { break };
                if next == runner {
                    break;
                }
                runner = next;
            }
        }
    }
    frontiers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::instruction::Instruction;

    fn diamond() -> Procedure {
        let mut proc = Procedure::new();
        let entry = proc.push_block();
        let left = proc.push_block();
        let right = proc.push_block();
        let merge = proc.push_block();
        let v0 = proc.create_variable();

        proc.block_at_mut(entry).instructions.push(Instruction::BranchUnary {
            condition: crate::ir::instruction::UnaryCondition::IsNonZero,
            operand: v0,
            consequent: left,
            alternative: right,
        });
        proc.block_at_mut(left).instructions.push(Instruction::Jump { target: merge });
        proc.block_at_mut(right).instructions.push(Instruction::Jump { target: merge });
        proc.block_at_mut(merge).instructions.push(Instruction::Exit { value: None });
        proc
    }

    #[test]
    fn dominance_frontier_of_diamond_arms_is_merge() {
        let proc = diamond();
        let cfg = Cfg::build(&proc).unwrap();
        let dom = BasicDominatorTree::compute(&cfg);

        let entry = BlockId(0);
        let left = BlockId(1);
        let right = BlockId(2);
        let merge = BlockId(3);

        assert_eq!(dom.immediate_dominator(left), Some(entry));
        assert_eq!(dom.immediate_dominator(right), Some(entry));
        assert_eq!(dom.immediate_dominator(merge), Some(entry));
        assert!(dom.dominates(entry, merge));
        assert!(!dom.dominates(left, merge));

        assert_eq!(dom.frontier(left), &[merge]);
        assert_eq!(dom.frontier(right), &[merge]);
        assert!(dom.frontier(merge).is_empty());
    }

    #[test]
    fn reverse_post_order_starts_at_entry() {
        let proc = diamond();
        let cfg = Cfg::build(&proc).unwrap();
        let rpo = cfg.reverse_post_order();
        assert_eq!(rpo[0], BlockId(0));
    }

    #[test]
    fn empty_procedure_has_no_entry_block() {
        let proc = Procedure::new();
        assert_eq!(Cfg::build(&proc), Err(GraphError::NoEntryBlock));
    }

    #[test]
    fn try_catch_contributes_a_cfg_edge_from_protected_to_handler() {
        let mut proc = Procedure::new();
        let protected = proc.push_block();
        let handler = proc.push_block();
        proc.block_at_mut(protected).instructions.push(Instruction::Exit { value: None });
        proc.block_at_mut(handler).instructions.push(Instruction::Exit { value: None });
        proc.add_try_catch(protected, handler);

        let cfg = Cfg::build(&proc).unwrap();
        let dom = BasicDominatorTree::compute(&cfg);
        assert!(dom.dominates(protected, handler));
        assert_ne!(protected, handler);
    }
}
