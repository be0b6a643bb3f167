// src/ssa/placement.rs
//! φ placement (base spec §4.3): the iterated-dominance-frontier worklist
//! that decides, for every original variable, which blocks need a
//! synthesized phi before renaming can begin.

use super::extractor::definitions_in_block;
use crate::ir::block::BlockId;
use crate::ir::graph::BasicDominatorTree;
use crate::ir::procedure::Procedure;
use crate::ir::variable::VarId;
use std::collections::HashMap;

/// A phi this pass is synthesizing, kept separate from a block's real
/// `phis` list until renaming finishes (base spec §4.3: synthesized phis
/// are "kept separate... until renaming completes, so that the pass can
/// tell its own synthesized phis apart from ones the input procedure
/// already had").
///
/// `receiver` starts `None` and is filled in exactly once, when the block
/// this phi lives in is visited during renaming (base spec §4.4 step 2).
#[derive(Debug, Clone)]
pub struct SynthPhi {
    pub original: VarId,
    pub receiver: Option<VarId>,
    pub incoming: Vec<(BlockId, VarId)>,
}

impl SynthPhi {
    const fn new(original: VarId) -> Self {
        Self { original, receiver: None, incoming: Vec::new() }
    }
}

/// Runs the iterated-dominance-frontier worklist for every variable with at
/// least one definition site, returning the synthesized phis indexed by the
/// block they're placed in. Variables defined exactly once never reach a
/// join point whose frontier calculation matters, so the worklist for them
/// terminates immediately without placing anything.
#[must_use]
pub fn place_phis(procedure: &Procedure, dom: &BasicDominatorTree, block_count: usize) -> Vec<Vec<SynthPhi>> {
    let mut def_sites: HashMap<VarId, Vec<BlockId>> = HashMap::new();
    for i in 0..block_count {
        let block = BlockId(i);
        for var in definitions_in_block(procedure, block) {
            def_sites.entry(var).or_default().push(block);
        }
    }

    let mut synth_phis: Vec<Vec<SynthPhi>> = vec![Vec::new(); block_count];
    let mut phi_index: Vec<HashMap<VarId, usize>> = vec![HashMap::new(); block_count];

    for (&var, sites) in &def_sites {
        let mut worklist: Vec<BlockId> = sites.clone();

        while let Some(x) = worklist.pop() {
            for &f in dom.frontier(x) {
                let already_synthesized = phi_index[f.index()].contains_key(&var);
                let already_preexisting = procedure
                    .block_at(f)
                    .phis
                    .iter()
                    .any(|phi| phi.incoming.iter().any(|&(src, v)| src == x && v == var));
                if already_synthesized || already_preexisting {
                    continue;
                }

                let slot = synth_phis[f.index()].len();
                synth_phis[f.index()].push(SynthPhi::new(var));
                phi_index[f.index()].insert(var, slot);
                worklist.push(f);
            }
        }
    }

    synth_phis
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::graph::Cfg;
    use crate::ir::instruction::{Instruction, UnaryCondition};

    fn diamond_with_def_in_both_arms() -> (Procedure, VarId) {
        let mut proc = Procedure::new();
        let entry = proc.push_block();
        let left = proc.push_block();
        let right = proc.push_block();
        let merge = proc.push_block();
        let cond = proc.create_variable();
        let v = proc.create_variable();

        proc.block_at_mut(entry).instructions.push(Instruction::BranchUnary {
            condition: UnaryCondition::IsNonZero,
            operand: cond,
            consequent: left,
            alternative: right,
        });
        proc.block_at_mut(left).instructions.push(Instruction::IntConstant { value: 1, receiver: v });
        proc.block_at_mut(left).instructions.push(Instruction::Jump { target: merge });
        proc.block_at_mut(right).instructions.push(Instruction::IntConstant { value: 2, receiver: v });
        proc.block_at_mut(right).instructions.push(Instruction::Jump { target: merge });
        proc.block_at_mut(merge).instructions.push(Instruction::Exit { value: Some(v) });

        (proc, v)
    }

    #[test]
    fn places_phi_exactly_at_merge_block() {
        let (proc, v) = diamond_with_def_in_both_arms();
        let cfg = Cfg::build(&proc).unwrap();
        let dom = BasicDominatorTree::compute(&cfg);

        let synth = place_phis(&proc, &dom, proc.block_count());
        let merge = BlockId(3);

        assert!(synth[0].is_empty());
        assert!(synth[1].is_empty());
        assert!(synth[2].is_empty());
        assert_eq!(synth[merge.index()].len(), 1);
        assert_eq!(synth[merge.index()][0].original, v);
        assert!(synth[merge.index()][0].receiver.is_none());
    }

    #[test]
    fn single_definition_site_places_nothing() {
        let mut proc = Procedure::new();
        let entry = proc.push_block();
        let v = proc.create_variable();
        proc.block_at_mut(entry).instructions.push(Instruction::IntConstant { value: 1, receiver: v });
        proc.block_at_mut(entry).instructions.push(Instruction::Exit { value: Some(v) });

        let cfg = Cfg::build(&proc).unwrap();
        let dom = BasicDominatorTree::compute(&cfg);
        let synth = place_phis(&proc, &dom, proc.block_count());
        assert!(synth.iter().all(Vec::is_empty));
    }
}
