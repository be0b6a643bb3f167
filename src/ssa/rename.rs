// src/ssa/rename.rs
//! Dominator-tree-ordered renaming (base spec §4.4) and the try/catch joint
//! handling interleaved into the same walk (base spec §4.6).
//!
//! The traversal is a recursive pre-order walk of the dominator tree rather
//! than an explicit two-variant task stack (`BlockTask`/`TryCatchTask`):
//! base spec §9 permits re-expressing it this way as long as sibling order
//! stays unconstrained, and a `Vec<Option<VarId>>` snapshot cloned once per
//! recursive call plays the same role as a stack of per-path maps.

use super::placement::SynthPhi;
use crate::ir::block::BlockId;
use crate::ir::graph::{BasicDominatorTree, Cfg, DomGraphView, DominatorTreeView};
use crate::ir::procedure::Procedure;
use crate::ir::try_catch::TryCatchId;
use crate::ir::variable::VarId;

/// `current[v.index()]` is the reaching SSA definition for original
/// variable `v` on the path from the dominator-tree root to whichever block
/// is currently being visited; `None` means no definition has reached this
/// point yet on this path.
type CurrentMap = Vec<Option<VarId>>;

struct RenameCtx<'a> {
    procedure: &'a mut Procedure,
    cfg: &'a Cfg,
    dom: &'a BasicDominatorTree,
    synth_phis: Vec<Vec<SynthPhi>>,
    used_as_receiver: Vec<bool>,
}

impl RenameCtx<'_> {
    /// `introduce(v)`: the first time a variable's original index is used
    /// as a receiver, it keeps its own name; every later use allocates a
    /// brand-new variable and carries `v`'s debug names onto it (base spec
    /// §4.4, debug-name monotonicity in §3).
    fn introduce(&mut self, v: VarId) -> VarId {
        if self.used_as_receiver[v.index()] {
            let w = self.procedure.create_variable();
            self.procedure.merge_debug_names(w, v);
            if w.index() >= self.used_as_receiver.len() {
                self.used_as_receiver.resize(w.index() + 1, false);
            }
            self.used_as_receiver[w.index()] = true;
            w
        } else {
            self.used_as_receiver[v.index()] = true;
            v
        }
    }

    /// `define(v)`: allocate a fresh version of original variable `v`,
    /// propagate the transition into any try/catch joint watching `v` at
    /// this block, and install it as the new reaching definition.
    fn define(&mut self, current: &mut CurrentMap, v: VarId, block: BlockId) -> VarId {
        let old = current[v.index()];
        let w = self.introduce(v);
        self.propagate(block, v, w, old);
        current[v.index()] = Some(w);
        w
    }

    /// `use(v)`: look up the reaching definition. A miss means a use isn't
    /// dominated by any definition on this path — a malformed input
    /// procedure, not a recoverable runtime condition (base spec §7), so
    /// this panics like the rest of the crate's internal invariants.
    fn use_var(current: &CurrentMap, v: VarId) -> VarId {
        current[v.index()].unwrap_or_else(|| panic!("use of {v} has no reaching definition on this path"))
    }

    /// Appends `w` (and, the first time, `old`) to the source list of every
    /// joint at `block` still keyed by original variable `v` (base spec
    /// §4.6). A joint whose receiver is the handler's own exception
    /// variable is skipped: that variable is defined at the handler, not
    /// merged from the protected region.
    fn propagate(&mut self, block: BlockId, v: VarId, w: VarId, old: Option<VarId>) {
        let tc_ids = self.procedure.block_at(block).try_catches.clone();
        for tc_id in tc_ids {
            let handler = self.procedure.try_catch(tc_id).handler;
            let handler_exc = self.procedure.block_at(handler).exception_variable;
            for joint in &mut self.procedure.try_catch_mut(tc_id).joints {
                if joint.receiver != v || Some(joint.receiver) == handler_exc {
                    continue;
                }
                if joint.sources.is_empty() {
                    if let Some(old) = old {
                        joint.sources.push(old);
                    }
                }
                joint.sources.push(w);
            }
        }
    }

    /// Finalizes every joint on the try/catches for which `block` is
    /// `protected`, once it strictly dominates its handler (base spec
    /// §4.6): the receiver becomes a fresh variable via the same naming
    /// scheme as any other definition, and the current map is updated so
    /// dominator-tree descendants see it as `v`'s reaching definition —
    /// this is `define` without a second `propagate` call, since the
    /// joint's own resolution isn't itself a redefinition event other
    /// joints at this block should observe.
    fn rename_joints(&mut self, tc_id: TryCatchId, current: &mut CurrentMap, block: BlockId) {
        let handler = self.procedure.try_catch(tc_id).handler;
        let handler_exc = self.procedure.block_at(handler).exception_variable;
        let mut joints = std::mem::take(&mut self.procedure.try_catch_mut(tc_id).joints);
        for joint in &mut joints {
            if Some(joint.receiver) == handler_exc {
                continue;
            }
            let original = joint.receiver;
            let w = self.introduce(original);
            current[original.index()] = Some(w);
            joint.receiver = w;
        }
        self.procedure.try_catch_mut(tc_id).joints = joints;
        let _ = block;
    }

    fn visit_block(&mut self, block: BlockId, mut current: CurrentMap) {
        // A handler's exception variable is defined on entry (base spec §3,
        // §8 point 1) but is never renamed (base spec §1 Non-goals): it
        // keeps its own name, without going through `introduce`/`define`,
        // while still becoming a reaching definition for uses inside this
        // block and its dominator-tree descendants.
        if let Some(exc) = self.procedure.block_at(block).exception_variable {
            self.used_as_receiver[exc.index()] = true;
            current[exc.index()] = Some(exc);
        }

        // Step 2: synthesized phis get their fresh receiver first, so uses
        // inside this same block see them as the reaching definition.
        let mut phis = std::mem::take(&mut self.synth_phis[block.index()]);
        for phi in &mut phis {
            let w = self.define(&mut current, phi.original, block);
            phi.receiver = Some(w);
            let incoming = phi.incoming.clone();
            for (_, cv) in incoming {
                self.procedure.merge_debug_names(w, cv);
            }
        }
        self.synth_phis[block.index()] = phis;

        // Step 3: phis the input procedure already had are renamed in place.
        let mut existing_phis = std::mem::take(&mut self.procedure.block_at_mut(block).phis);
        for phi in &mut existing_phis {
            phi.receiver = self.define(&mut current, phi.receiver, block);
        }
        self.procedure.block_at_mut(block).phis = existing_phis;

        // Step 4: instructions, uses before the receiver so a single
        // instruction never observes its own fresh definition as a use.
        let mut instructions = std::mem::take(&mut self.procedure.block_at_mut(block).instructions);
        for inst in &mut instructions {
            inst.for_each_use_mut(|u| *u = Self::use_var(&current, *u));
            if let Some(r) = inst.receiver_mut() {
                *r = self.define(&mut current, *r, block);
            }
        }
        self.procedure.block_at_mut(block).instructions = instructions;

        // Step 5: fill in this block's contribution to every CFG
        // successor's still-pending synthesized phis.
        for succ in self.cfg.outgoing_edges(block) {
            let count = self.synth_phis[succ.index()].len();
            for i in 0..count {
                let original = self.synth_phis[succ.index()][i].original;
                let Some(cv) = current[original.index()] else { continue };
                self.synth_phis[succ.index()][i].incoming.push((block, cv));
                if let Some(r) = self.synth_phis[succ.index()][i].receiver {
                    self.procedure.merge_debug_names(r, cv);
                }
            }
        }

        // Try/catch joint handling: this block is `protected` for every id
        // in its own `try_catches` list (base spec §3, §4.6). Only a
        // try/catch whose protected block strictly dominates its handler
        // gets its joints renamed here; the rest stay pending forever,
        // matching the "joints for try/catches whose protected block does
        // not strictly dominate the handler are never renamed" edge case.
        let tc_ids = self.procedure.block_at(block).try_catches.clone();
        for tc_id in tc_ids {
            let handler = self.procedure.try_catch(tc_id).handler;
            if block != handler && self.dom.dominates(block, handler) {
                self.rename_joints(tc_id, &mut current, block);
            }
        }

        for child in self.dom.children(block).to_vec() {
            self.visit_block(child, current.clone());
        }
    }

    fn finalize(&mut self) {
        let synth_phis = std::mem::take(&mut self.synth_phis);
        for (i, phis) in synth_phis.into_iter().enumerate() {
            let block = BlockId(i);
            for phi in phis {
                let Some(receiver) = phi.receiver else { continue };
                if phi.incoming.is_empty() {
                    continue;
                }
                self.procedure
                    .block_at_mut(block)
                    .phis
                    .push(crate::ir::block::PhiNode { receiver, incoming: phi.incoming });
            }
        }
    }
}

/// Runs renaming over the whole procedure, starting from `arguments` as the
/// incoming reaching definitions at the dominator-tree root (base spec
/// §4.4: "Seeding: formal parameters are pre-defined at the entry, each as
/// its own original variable").
pub fn rename(
    procedure: &mut Procedure,
    cfg: &Cfg,
    dom: &BasicDominatorTree,
    arguments: &[VarId],
    synth_phis: Vec<Vec<SynthPhi>>,
) {
    let var_count = procedure.variable_count();
    let mut used_as_receiver = vec![false; var_count];
    let mut initial: CurrentMap = vec![None; var_count];
    for &arg in arguments {
        used_as_receiver[arg.index()] = true;
        initial[arg.index()] = Some(arg);
    }

    let mut ctx = RenameCtx { procedure, cfg, dom, synth_phis, used_as_receiver };
    ctx.visit_block(dom.entry(), initial);
    ctx.finalize();
}
