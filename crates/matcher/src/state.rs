//! Explicit scan state.
//!
//! Matcher definitions in the arena are immutable for the lifetime of a run;
//! everything a match accumulates lives here, in a value the caller owns and
//! threads through each call. A fresh state and a reset state are the same
//! thing, so per-document isolation is a matter of construction rather than
//! a cleanup obligation on every exit path.

use crate::arena::{MatcherArena, NodeId, NodeKind};
use crate::text::{prune, TextState};

/// Accumulated match state for one arena, one scan.
#[derive(Debug, Clone)]
pub struct ScanState {
    slots: Vec<Slot>,
    line_serial: u64,
}

#[derive(Debug, Clone)]
enum Slot {
    Text(TextState),
    Latch(bool),
    Inert,
}

impl ScanState {
    /// Return to the exact post-construction state.
    pub fn reset(&mut self) {
        self.line_serial = 0;
        for slot in &mut self.slots {
            match slot {
                Slot::Text(text) => *text = TextState::default(),
                Slot::Latch(matched) => *matched = false,
                Slot::Inert => {}
            }
        }
    }
}

impl MatcherArena {
    /// A fresh state sized for this arena.
    pub fn new_state(&self) -> ScanState {
        let slots = self
            .nodes
            .iter()
            .map(|node| match &node.kind {
                NodeKind::Text(_) => Slot::Text(TextState::default()),
                NodeKind::Phrases(_) | NodeKind::Copyright(_) | NodeKind::Spdx(_) => {
                    Slot::Latch(false)
                }
                _ => Slot::Inert,
            })
            .collect();
        ScanState {
            slots,
            line_serial: 0,
        }
    }

    /// Feed one line to the subtree under `root` and report whether its
    /// cumulative state now satisfies it. Once satisfied, a node stays
    /// satisfied until the state is reset.
    pub fn feed_line(&self, root: NodeId, state: &mut ScanState, line: &str) -> bool {
        self.first_match(&[root], state, line).is_some()
    }

    /// Feed one line to several candidate subtrees and return the position
    /// of the first satisfied one, if any.
    ///
    /// All candidates see the line before the check, and a node shared
    /// between candidates (through a reference) sees it exactly once, so the
    /// outcome does not depend on how the candidate list is split.
    pub fn first_match(
        &self,
        roots: &[NodeId],
        state: &mut ScanState,
        line: &str,
    ) -> Option<usize> {
        state.line_serial += 1;
        let pruned = prune(line);
        for root in roots {
            self.update(*root, state, line, &pruned);
        }
        roots
            .iter()
            .position(|root| self.satisfied(*root, state))
    }

    /// Whether the subtree under `root` is satisfied by the lines fed so far.
    pub fn is_satisfied(&self, root: NodeId, state: &ScanState) -> bool {
        self.satisfied(root, state)
    }

    fn update(&self, id: NodeId, state: &mut ScanState, line: &str, pruned: &str) {
        match &self.nodes[id.index()].kind {
            NodeKind::Text(text) => {
                if let Slot::Text(slot) = &mut state.slots[id.index()] {
                    if slot.line < state.line_serial {
                        slot.line = state.line_serial;
                        text.step(slot, pruned);
                    }
                }
            }
            NodeKind::Phrases(set) => {
                if let Slot::Latch(matched) = &mut state.slots[id.index()] {
                    if !*matched && set.check(line) {
                        *matched = true;
                    }
                }
            }
            NodeKind::Copyright(pattern) => {
                if let Slot::Latch(matched) = &mut state.slots[id.index()] {
                    if !*matched && pattern.check(line) {
                        *matched = true;
                    }
                }
            }
            NodeKind::Spdx(tag) => {
                if let Slot::Latch(matched) = &mut state.slots[id.index()] {
                    if !*matched && tag.check(line) {
                        *matched = true;
                    }
                }
            }
            NodeKind::And(children) | NodeKind::Or(children) => {
                for child in children {
                    self.update(*child, state, line, pruned);
                }
            }
            NodeKind::Not(child) => self.update(*child, state, line, pruned),
            NodeKind::Licensed { operand, .. } => self.update(*operand, state, line, pruned),
            NodeKind::Reference(_) => {}
        }
    }

    fn satisfied(&self, id: NodeId, state: &ScanState) -> bool {
        match &self.nodes[id.index()].kind {
            NodeKind::Text(_) => match &state.slots[id.index()] {
                Slot::Text(slot) => slot.matched,
                _ => false,
            },
            NodeKind::Phrases(_) | NodeKind::Copyright(_) | NodeKind::Spdx(_) => {
                matches!(state.slots[id.index()], Slot::Latch(true))
            }
            NodeKind::And(children) => children.iter().all(|child| self.satisfied(*child, state)),
            NodeKind::Or(children) => children.iter().any(|child| self.satisfied(*child, state)),
            NodeKind::Not(child) => !self.satisfied(*child, state),
            NodeKind::Licensed { operand, .. } => self.satisfied(*operand, state),
            NodeKind::Reference(_) => false,
        }
    }
}
