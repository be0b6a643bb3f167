// src/ir/procedure.rs
//! The mutable container the SSA pass rewrites in place (base spec §3).

use super::block::{BasicBlock, BlockId};
use super::try_catch::{TryCatch, TryCatchId};
use super::variable::{VarId, VariableData};
use std::fmt;

/// A procedure: its basic blocks, indexed `0..block_count()`, its variables,
/// indexed `0..variable_count()` and extendable via [`Procedure::create_variable`],
/// and the try/catch relations between its blocks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Procedure {
    blocks: Vec<BasicBlock>,
    variables: Vec<VariableData>,
    try_catches: Vec<TryCatch>,
}

impl Procedure {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn block_at(&self, index: BlockId) -> &BasicBlock {
        &self.blocks[index.index()]
    }

    pub fn block_at_mut(&mut self, index: BlockId) -> &mut BasicBlock {
        &mut self.blocks[index.index()]
    }

    #[must_use]
    pub fn blocks(&self) -> impl Iterator<Item = &BasicBlock> {
        self.blocks.iter()
    }

    /// Appends a fresh, empty block and returns its index.
    pub fn push_block(&mut self) -> BlockId {
        let id = BlockId(self.blocks.len());
        self.blocks.push(BasicBlock::new(id));
        id
    }

    /// Allocates a fresh variable with no debug names, growing
    /// `variable_count()` by one.
    pub fn create_variable(&mut self) -> VarId {
        let id = VarId(self.variables.len());
        self.variables.push(VariableData::default());
        id
    }

    /// Allocates `count` fresh variables, e.g. for a procedure's formal
    /// parameters, in index order.
    pub fn create_variables(&mut self, count: usize) -> Vec<VarId> {
        (0..count).map(|_| self.create_variable()).collect()
    }

    #[must_use]
    pub fn variable_data(&self, var: VarId) -> &VariableData {
        &self.variables[var.index()]
    }

    pub fn variable_data_mut(&mut self, var: VarId) -> &mut VariableData {
        &mut self.variables[var.index()]
    }

    pub fn add_debug_name(&mut self, var: VarId, name: impl Into<String>) {
        self.variable_data_mut(var).add_debug_name(name);
    }

    /// Unions `src`'s debug names into `dst`'s, satisfying the
    /// debug-name-monotonicity invariant (base spec §3) whenever a fresh
    /// variable `dst` stands in for `src` on some path.
    pub fn merge_debug_names(&mut self, dst: VarId, src: VarId) {
        if dst == src {
            return;
        }
        let src_names = self.variable_data(src).clone();
        self.variable_data_mut(dst).merge_from(&src_names);
    }

    pub fn push_try_catch(&mut self, try_catch: TryCatch) -> TryCatchId {
        let id = TryCatchId(self.try_catches.len());
        self.try_catches.push(try_catch);
        id
    }

    /// Convenience over [`Procedure::push_try_catch`] that also registers the
    /// new try/catch on its own protected block, keeping the invariant that
    /// `block.try_catches` lists exactly the try/catches for which that block
    /// is `protected` (base spec §3: "a list of try/catch blocks it is
    /// protected by").
    pub fn add_try_catch(&mut self, protected: BlockId, handler: BlockId) -> TryCatchId {
        let id = self.push_try_catch(TryCatch::new(protected, handler));
        self.block_at_mut(protected).try_catches.push(id);
        id
    }

    #[must_use]
    pub fn try_catch(&self, id: TryCatchId) -> &TryCatch {
        &self.try_catches[id.0]
    }

    pub fn try_catch_mut(&mut self, id: TryCatchId) -> &mut TryCatch {
        &mut self.try_catches[id.0]
    }

    #[must_use]
    pub fn try_catch_count(&self) -> usize {
        self.try_catches.len()
    }

    #[must_use]
    pub fn try_catch_ids(&self) -> impl Iterator<Item = TryCatchId> {
        (0..self.try_catches.len()).map(TryCatchId)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for block in &self.blocks {
            write!(f, "{block}")?;
        }
        for id in self.try_catch_ids() {
            let tc = self.try_catch(id);
            writeln!(f, "try {} -> catch {}:", tc.protected, tc.handler)?;
            for joint in &tc.joints {
                writeln!(f, "  {joint}")?;
            }
        }
        Ok(())
    }
}
