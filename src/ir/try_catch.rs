// src/ir/try_catch.rs
//! Try/catch blocks and the joint nodes that merge exception-flow reaching
//! definitions (base spec §4.6).

use super::block::BlockId;
use super::variable::VarId;
use std::fmt;

/// Index of a [`TryCatch`] within a [`super::procedure::Procedure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TryCatchId(pub usize);

/// A merge node analogous to a phi, but whose incoming edges correspond to
/// potential exception throw points inside a protected region rather than
/// to CFG edges. `sources` accumulates during renaming; `receiver` starts
/// out as the original variable it merges and is replaced by a fresh
/// variable exactly when its owning try/catch is rewritten (see
/// [`TryCatch::protected`] and base spec §4.6).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Joint {
    pub receiver: VarId,
    pub sources: Vec<VarId>,
}

impl Joint {
    #[must_use]
    pub const fn new(receiver: VarId) -> Self {
        Self { receiver, sources: Vec::new() }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sources = self.sources.iter().map(VarId::to_string).collect::<Vec<_>>().join(", ");
        write!(f, "{} = joint [{sources}]", self.receiver)
    }
}

/// Associates a single protected block with a handler block. `protected` is
/// both the block guarded by this try/catch and the block used for the
/// strict-dominance test in base spec §4.6; it is the only block that lists
/// this `TryCatch`'s id in its own [`super::block::BasicBlock::try_catches`]
/// (see [`super::procedure::Procedure::add_try_catch`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TryCatch {
    pub protected: BlockId,
    pub handler: BlockId,
    pub joints: Vec<Joint>,
}

impl TryCatch {
    #[must_use]
    pub const fn new(protected: BlockId, handler: BlockId) -> Self {
        Self { protected, handler, joints: Vec::new() }
    }
}
