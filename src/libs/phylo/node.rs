/// NodeId is an index into the Tree's node vector.
/// It is lightweight (Copy) and safe (no pointers).
pub type NodeId = usize;

#[derive(Debug, Clone)]
pub struct Node {
    /// Unique identifier for the node (index in the arena)
    pub id: NodeId,

    /// Parent node ID (None for root)
    pub parent: Option<NodeId>,

    /// List of child node IDs
    pub children: Vec<NodeId>,

    // --- Payload ---
    /// Node name/label (e.g., "human", "internal_1")
    pub name: Option<String>,

    /// Branch length to parent
    /// In rooted trees, edge length is an attribute of the child node.
    pub length: Option<f64>,

    /// Edge token of the branch to parent.
    /// On a backbone tree this is the global edge number; on a tree read from
    /// a jplace document it is the document's local `{n}` edge number.
    /// `None` marks an edge that has no single counterpart in the backbone.
    pub token: Option<usize>,

    /// Soft deletion flag.
    /// If true, this node is considered removed.
    /// Use Tree::compact() to permanently remove deleted nodes and reclaim memory.
    pub deleted: bool,
}

impl Node {
    /// Create a new empty node with a specific ID
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            parent: None,
            children: Vec::new(),
            name: None,
            length: None,
            token: None,
            deleted: false,
        }
    }

    /// Set the name of the node
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
    }

    /// Branch length to parent, missing lengths count as zero
    pub fn edge_length(&self) -> f64 {
        self.length.unwrap_or(0.0)
    }

    /// Check if the node is a leaf (no children)
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}
