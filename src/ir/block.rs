// src/ir/block.rs
//! Basic blocks and phi-functions.

use super::instruction::Instruction;
use super::try_catch::TryCatchId;
use super::variable::VarId;
use std::fmt;

/// Index of a basic block within a [`super::procedure::Procedure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockId(pub usize);

impl BlockId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bb{}", self.0)
    }
}

/// A phi-function: a receiver variable and one incoming value per
/// contributing predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhiNode {
    pub receiver: VarId,
    pub incoming: Vec<(BlockId, VarId)>,
}

impl PhiNode {
    #[must_use]
    pub const fn new(receiver: VarId) -> Self {
        Self { receiver, incoming: Vec::new() }
    }
}

impl fmt::Display for PhiNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let incoming = self.incoming.iter().map(|(b, v)| format!("[{v}, {b}]")).collect::<Vec<_>>().join(", ");
        write!(f, "{} = phi {incoming}", self.receiver)
    }
}

/// A basic block: pre-existing phis (carried over from whatever produced the
/// IR, merged with — not replaced by — phis this pass synthesizes),
/// instructions in program order, and the try/catch blocks this block is
/// protected by.
///
/// Successors/predecessors are not stored explicitly; they are derivable
/// from the terminating instruction (base spec §3) and are exposed through
/// [`super::graph::Cfg`] instead, to keep a single source of truth.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    index: BlockId,
    pub phis: Vec<PhiNode>,
    pub instructions: Vec<Instruction>,
    pub try_catches: Vec<TryCatchId>,
    pub exception_variable: Option<VarId>,
}

impl BasicBlock {
    #[must_use]
    pub const fn new(index: BlockId) -> Self {
        Self { index, phis: Vec::new(), instructions: Vec::new(), try_catches: Vec::new(), exception_variable: None }
    }

    #[must_use]
    pub const fn index(&self) -> BlockId {
        self.index
    }

    /// Successors named by this block's terminating instruction, or none if
    /// the block is empty (never valid in a well-formed procedure, but the
    /// pass never needs to assert that itself — see base spec §4.1).
    #[must_use]
    pub fn successors(&self) -> Vec<BlockId> {
        self.instructions.last().map(Instruction::successors).unwrap_or_default()
    }
}

impl fmt::Display for BasicBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.index)?;
        if let Some(exc) = self.exception_variable {
            writeln!(f, "  {exc} = catch")?;
        }
        for phi in &self.phis {
            writeln!(f, "  {phi}")?;
        }
        for inst in &self.instructions {
            writeln!(f, "  {inst}")?;
        }
        Ok(())
    }
}
