// src/error.rs
//! Error types for the graph-utility layer (base spec §6). The SSA pass
//! itself has no recoverable error path — see `ssa::rename` — so this is
//! the only fallible surface in the crate.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("control-flow graph has no entry block")]
    NoEntryBlock,
}
