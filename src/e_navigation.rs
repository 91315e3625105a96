//! Prev/next "jump to problem" cursor over one diagnostic tree.
//!
//! The cursor walks the tree in pre-order, continuations included, and
//! clamps at both ends. It holds a node handle rather than an index so that
//! continuations appended while a run is still streaming do not shift it.

use crate::e_diagnostics::{DiagnosticTree, NodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorState {
    #[default]
    Empty,
    Positioned(NodeId),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationCursor {
    state: CursorState,
}

impl NavigationCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.state, CursorState::Positioned(_))
    }

    pub fn current(&self) -> Option<NodeId> {
        match self.state {
            CursorState::Positioned(node) => Some(node),
            CursorState::Empty => None,
        }
    }

    /// Pre-order index of the current node.
    pub fn index(&self, tree: &DiagnosticTree) -> Option<usize> {
        self.current().and_then(|node| tree.position(node))
    }

    /// Moves to the first node if the cursor is empty and the tree is not.
    /// Returns whether the cursor moved.
    pub fn initialize(&mut self, tree: &DiagnosticTree) -> bool {
        if self.is_valid() {
            return false;
        }
        match tree.at_position(0) {
            Some(first) => {
                self.state = CursorState::Positioned(first);
                true
            }
            None => false,
        }
    }

    /// Steps forward. `None` at the last node or while empty.
    pub fn next(&mut self, tree: &DiagnosticTree) -> Option<NodeId> {
        let index = self.index(tree)?;
        self.move_to(tree, index.checked_add(1)?)
    }

    /// Steps back. `None` at the first node or while empty.
    pub fn previous(&mut self, tree: &DiagnosticTree) -> Option<NodeId> {
        let index = self.index(tree)?;
        self.move_to(tree, index.checked_sub(1)?)
    }

    /// Moves straight to `node`. `false` if the node is not in `tree`.
    pub fn place(&mut self, tree: &DiagnosticTree, node: NodeId) -> bool {
        if tree.get(node).is_none() {
            return false;
        }
        self.state = CursorState::Positioned(node);
        true
    }

    pub fn reset(&mut self) {
        self.state = CursorState::Empty;
    }

    fn move_to(&mut self, tree: &DiagnosticTree, index: usize) -> Option<NodeId> {
        let node = tree.at_position(index)?;
        self.state = CursorState::Positioned(node);
        Some(node)
    }
}
