//! Errors and Warnings trees.
//!
//! Each tree is an arena of owned records. Root records are errors or
//! warnings; their children are Extension continuations. Node handles are
//! only valid until the tree is cleared.

use once_cell::unsync::OnceCell;
use serde::Serialize;
use std::fmt;

/// Which of the two diagnostic trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TreeKind {
    Errors,
    Warnings,
}

impl fmt::Display for TreeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TreeKind::Errors => write!(f, "Errors"),
            TreeKind::Warnings => write!(f, "Warnings"),
        }
    }
}

/// Opaque handle to a node of one tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// A node in a specific tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticRef {
    pub tree: TreeKind,
    pub node: NodeId,
}

/// One structured error, warning or continuation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticRecord {
    /// Message Log row the record came from.
    pub source_row: Option<usize>,
    /// Absolute directory the file path is relative to.
    pub directory: String,
    pub file_path: String,
    /// 1-based, 0 when unknown.
    pub line: u32,
    /// 1-based, 0 when unknown.
    pub column: u32,
    pub message: String,
}

impl DiagnosticRecord {
    /// `file:line:col: message` style one-liner.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        if !self.file_path.is_empty() {
            out.push_str(&self.file_path);
            if self.line > 0 {
                out.push_str(&format!(":{}", self.line));
                if self.column > 0 {
                    out.push_str(&format!(":{}", self.column));
                }
            }
            if !self.message.is_empty() {
                out.push_str(": ");
            }
        }
        out.push_str(&self.message);
        out
    }
}

#[derive(Debug, Clone)]
struct Node {
    record: DiagnosticRecord,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Record with its children, for serialization.
#[derive(Debug, Clone, Serialize)]
pub struct NestedRecord<'a> {
    #[serde(flatten)]
    pub record: &'a DiagnosticRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NestedRecord<'a>>,
}

/// Pre-order walk flattened once, dropped on every mutation.
#[derive(Debug, Clone)]
struct PreOrder {
    order: Vec<usize>,
    positions: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct DiagnosticTree {
    kind: TreeKind,
    nodes: Vec<Node>,
    roots: Vec<usize>,
    generation: u32,
    preorder: OnceCell<PreOrder>,
}

impl DiagnosticTree {
    pub fn new(kind: TreeKind) -> Self {
        DiagnosticTree {
            kind,
            nodes: Vec::new(),
            roots: Vec::new(),
            generation: 0,
            preorder: OnceCell::new(),
        }
    }

    pub fn kind(&self) -> TreeKind {
        self.kind
    }

    pub fn insert_root(&mut self, record: DiagnosticRecord) -> NodeId {
        let index = self.push_node(record, None);
        self.roots.push(index);
        self.id(index)
    }

    /// Appends `record` under `parent`. `None` if the handle is stale.
    pub fn append_child(&mut self, parent: NodeId, record: DiagnosticRecord) -> Option<NodeId> {
        let parent_index = self.index_of(parent)?;
        let index = self.push_node(record, Some(parent_index));
        self.nodes[parent_index].children.push(index);
        Some(self.id(index))
    }

    /// Number of root diagnostics, continuations excluded.
    pub fn count(&self) -> usize {
        self.roots.len()
    }

    /// Number of records including continuations.
    pub fn total(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drops every record and invalidates every handle handed out so far.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.roots.clear();
        self.preorder.take();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn get(&self, id: NodeId) -> Option<&DiagnosticRecord> {
        self.index_of(id).map(|i| &self.nodes[i].record)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        let index = self.index_of(id)?;
        self.nodes[index].parent.map(|p| self.id(p))
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.index_of(id)
            .map(|i| self.nodes[i].children.iter().map(|c| self.id(*c)).collect())
            .unwrap_or_default()
    }

    pub fn roots(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.roots.iter().map(|i| self.id(*i))
    }

    /// Pre-order walk: each root followed by its continuations.
    pub fn iter_depth_first(&self) -> DepthFirst<'_> {
        DepthFirst {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// Position of `id` in the pre-order walk.
    pub fn position(&self, id: NodeId) -> Option<usize> {
        let index = self.index_of(id)?;
        Some(self.preorder().positions[index])
    }

    /// Node at `position` in the pre-order walk.
    pub fn at_position(&self, position: usize) -> Option<NodeId> {
        self.preorder().order.get(position).map(|i| self.id(*i))
    }

    pub fn nested(&self) -> Vec<NestedRecord<'_>> {
        self.roots.iter().map(|i| self.nest(*i)).collect()
    }

    fn nest(&self, index: usize) -> NestedRecord<'_> {
        let node = &self.nodes[index];
        NestedRecord {
            record: &node.record,
            children: node.children.iter().map(|c| self.nest(*c)).collect(),
        }
    }

    fn preorder(&self) -> &PreOrder {
        self.preorder.get_or_init(|| {
            let order: Vec<usize> = self.iter_depth_first().map(|(id, _)| id.index).collect();
            let mut positions = vec![0; self.nodes.len()];
            for (position, index) in order.iter().enumerate() {
                positions[*index] = position;
            }
            PreOrder { order, positions }
        })
    }

    fn push_node(&mut self, record: DiagnosticRecord, parent: Option<usize>) -> usize {
        self.preorder.take();
        self.nodes.push(Node {
            record,
            parent,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    fn id(&self, index: usize) -> NodeId {
        NodeId {
            index,
            generation: self.generation,
        }
    }

    fn index_of(&self, id: NodeId) -> Option<usize> {
        (id.generation == self.generation && id.index < self.nodes.len()).then_some(id.index)
    }
}

/// Lazy pre-order iterator over a [`DiagnosticTree`].
pub struct DepthFirst<'a> {
    tree: &'a DiagnosticTree,
    stack: Vec<usize>,
}

impl<'a> Iterator for DepthFirst<'a> {
    type Item = (NodeId, &'a DiagnosticRecord);

    fn next(&mut self) -> Option<Self::Item> {
        let index = self.stack.pop()?;
        let node = &self.tree.nodes[index];
        self.stack.extend(node.children.iter().rev().copied());
        Some((self.tree.id(index), &node.record))
    }
}
