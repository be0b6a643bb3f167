// src/lib.rs
//! # ssa-joints
//!
//! Converts a three-address intermediate representation of a procedure into
//! SSA form: every variable is given a single definition site, and
//! phi-functions are inserted at the dominance frontiers where control-flow
//! merges require one. A second class of merge node — try/catch joints — is
//! maintained alongside the phis for values that may be live at an exception
//! handler's entry.
//!
//! ## Modules
//! * `ir` - the procedure/CFG data model the pass operates on
//! * `ssa` - the construction pass itself: definition extraction, phi
//!   placement, dominator-tree-ordered renaming, and joint handling
pub mod error;
pub mod ir;
pub mod ssa;
