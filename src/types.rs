//! Core data types and structures for the infrastructure board.
//!
//! This module defines the fundamental data structures used throughout the
//! application: placeable items, canvas nodes (item placements and groups),
//! edges between nodes, incremental change sets, and the minimal persisted
//! projection of the board.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an infrastructure item, owned by the item source.
pub type ItemId = String;

/// Unique identifier for a canvas node. Item placements reuse the item's id,
/// so nodes and items share one id namespace.
pub type NodeId = String;

/// Unique identifier for an edge between two nodes.
pub type EdgeId = String;

/// Category of a placeable infrastructure item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Object storage bucket
    Storage,
    /// Managed database
    Database,
    /// Compute instance
    Instance,
}

impl ItemKind {
    /// Short human-readable label used on cards and in the toolkit list.
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Storage => "Storage",
            ItemKind::Database => "Database",
            ItemKind::Instance => "Instance",
        }
    }
}

/// A placeable infrastructure reference, fetched from the external item
/// source. The board never mutates an item; it only references it by id and
/// carries its payload around for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    /// Opaque unique identifier owned by the item source
    pub id: ItemId,
    /// Category discriminator
    pub kind: ItemKind,
    /// User-displayable name
    pub display_name: String,
    /// Provisioning status reported by the item source (e.g. "running")
    pub status: String,
    /// Opaque provider metadata blob; carried through untouched
    pub provider_metadata: serde_json::Value,
}

/// The variant-specific payload of a canvas node.
///
/// Every consumption site matches exhaustively on this, so adding a variant
/// is a compile-time sweep of the codebase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum NodeKind {
    /// A placed item, carrying the full item payload while in memory
    Item {
        /// The referenced item's live payload
        item: Item,
        /// Owning group node id, if this placement is clustered
        parent: Option<NodeId>,
    },
    /// A colored cluster of items laid out as a vertical column
    Group {
        /// User-editable title
        title: String,
        /// Palette index; rendering maps it to an actual color
        color: usize,
        /// Ordered member item ids; member positions derive from this order
        child_item_ids: Vec<ItemId>,
    },
}

/// A canvas-placed entity: an item placement or a group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Unique id; equals the item id for item placements
    pub id: NodeId,
    /// World-space top-left corner
    pub position: (f32, f32),
    /// Variant payload
    pub kind: NodeKind,
}

impl Node {
    /// Creates an item placement node at the given position.
    ///
    /// The node's id is the item's id: placing an item and the item itself
    /// are the same identity on the board.
    pub fn new_item(item: Item, position: (f32, f32)) -> Self {
        Self {
            id: item.id.clone(),
            position,
            kind: NodeKind::Item { item, parent: None },
        }
    }

    /// Creates an empty group node with a fresh generated id.
    pub fn new_group(title: String, color: usize, position: (f32, f32)) -> Self {
        Self {
            id: format!("group-{}", Uuid::new_v4()),
            position,
            kind: NodeKind::Group {
                title,
                color,
                child_item_ids: Vec::new(),
            },
        }
    }

    /// Returns the node's current width and height in world units.
    ///
    /// Item cards are fixed-size. A group grows vertically to fit
    /// `max(child_count, 1)` child slots so an empty group still presents a
    /// drop area.
    pub fn size(&self) -> (f32, f32) {
        match &self.kind {
            NodeKind::Item { .. } => (
                crate::constants::ITEM_NODE_WIDTH,
                crate::constants::ITEM_NODE_HEIGHT,
            ),
            NodeKind::Group { child_item_ids, .. } => {
                let slots = child_item_ids.len().max(1) as f32;
                let height = crate::constants::GROUP_CHILD_Y_GAP
                    + crate::constants::GROUP_HEADER_INSET
                    + slots
                        * (crate::constants::ITEM_NODE_HEIGHT + crate::constants::GROUP_CHILD_GAP);
                (crate::constants::GROUP_NODE_WIDTH, height)
            }
        }
    }

    /// Returns the node's center point, derived from position and size.
    pub fn center(&self) -> (f32, f32) {
        let (w, h) = self.size();
        (self.position.0 + w / 2.0, self.position.1 + h / 2.0)
    }

    /// True if this node is a group.
    pub fn is_group(&self) -> bool {
        matches!(self.kind, NodeKind::Group { .. })
    }

    /// The owning group id for a clustered item placement, if any.
    pub fn parent(&self) -> Option<&NodeId> {
        match &self.kind {
            NodeKind::Item { parent, .. } => parent.as_ref(),
            NodeKind::Group { .. } => None,
        }
    }

    /// The item payload for an item placement, if this node is one.
    pub fn item(&self) -> Option<&Item> {
        match &self.kind {
            NodeKind::Item { item, .. } => Some(item),
            NodeKind::Group { .. } => None,
        }
    }
}

/// A proposed connection between two nodes, each endpoint tagged with a
/// connector handle identifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Connection {
    /// Source node id
    pub source: NodeId,
    /// Target node id
    pub target: NodeId,
    /// Handle identifier on the source node
    pub source_handle: String,
    /// Handle identifier on the target node
    pub target_handle: String,
}

/// A connection between two canvas nodes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Edge {
    /// Unique generated id
    pub id: EdgeId,
    /// Source node id
    pub source: NodeId,
    /// Target node id
    pub target: NodeId,
    /// Handle identifier on the source node
    pub source_handle: String,
    /// Handle identifier on the target node
    pub target_handle: String,
}

impl Edge {
    /// Creates an edge from a proposed connection, assigning a fresh id.
    pub fn from_connection(connection: Connection) -> Self {
        Self {
            id: format!("edge-{}", Uuid::new_v4()),
            source: connection.source,
            target: connection.target,
            source_handle: connection.source_handle,
            target_handle: connection.target_handle,
        }
    }
}

/// An incremental node mutation, in the standard diagramming change-set shape.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeChange {
    /// Add a node to the board
    Add(Node),
    /// Remove the node with the given id (cascades per store rules)
    Remove(NodeId),
    /// Move the node with the given id to a new world position
    Position {
        /// Node to move
        id: NodeId,
        /// New world-space top-left corner
        position: (f32, f32),
    },
}

/// An incremental edge mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum EdgeChange {
    /// Add an edge
    Add(Edge),
    /// Remove the edge with the given id
    Remove(EdgeId),
}

/// The minimal persisted form of a node: position, type, and membership.
///
/// Item placements persist only the item id; the payload is re-attached from
/// the item registry on load.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PersistedNode {
    /// A placed item, by id only
    Item {
        /// Item (and node) id
        id: NodeId,
        /// World-space top-left corner
        position: (f32, f32),
        /// Owning group id, if clustered
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent: Option<NodeId>,
    },
    /// A group and its ordered membership
    Group {
        /// Group node id
        id: NodeId,
        /// World-space top-left corner
        position: (f32, f32),
        /// User-editable title
        title: String,
        /// Palette index
        color: usize,
        /// Ordered member item ids
        child_item_ids: Vec<ItemId>,
    },
}

impl PersistedNode {
    /// The persisted node's id, regardless of variant.
    pub fn id(&self) -> &NodeId {
        match self {
            PersistedNode::Item { id, .. } | PersistedNode::Group { id, .. } => id,
        }
    }
}

/// The serialized board document exchanged with the persistence endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PersistedGraph {
    /// Minimal node projections
    pub nodes: Vec<PersistedNode>,
    /// Edges, persisted as-is
    pub edges: Vec<Edge>,
}

impl PersistedGraph {
    /// Serialize the document to a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(id: &str) -> Item {
        Item {
            id: id.to_string(),
            kind: ItemKind::Database,
            display_name: format!("db-{id}"),
            status: "running".to_string(),
            provider_metadata: json!({"region": "eu-west-1"}),
        }
    }

    #[test]
    fn item_node_shares_the_item_id() {
        let node = Node::new_item(item("db-1"), (10.0, 20.0));
        assert_eq!(node.id, "db-1");
        assert_eq!(node.position, (10.0, 20.0));
        assert!(node.parent().is_none());
        assert!(!node.is_group());
    }

    #[test]
    fn group_node_gets_generated_id() {
        let a = Node::new_group("Group 1".to_string(), 0, (0.0, 0.0));
        let b = Node::new_group("Group 2".to_string(), 1, (0.0, 0.0));
        assert!(a.id.starts_with("group-"));
        assert_ne!(a.id, b.id);
        assert!(a.is_group());
    }

    #[test]
    fn group_height_grows_with_children() {
        let mut group = Node::new_group("G".to_string(), 0, (0.0, 0.0));
        let empty_height = group.size().1;

        if let NodeKind::Group { child_item_ids, .. } = &mut group.kind {
            child_item_ids.push("a".to_string());
        }
        // One child occupies the slot an empty group already reserves
        assert_eq!(group.size().1, empty_height);

        if let NodeKind::Group { child_item_ids, .. } = &mut group.kind {
            child_item_ids.push("b".to_string());
            child_item_ids.push("c".to_string());
        }
        let three_height = group.size().1;
        let slot = crate::constants::ITEM_NODE_HEIGHT + crate::constants::GROUP_CHILD_GAP;
        assert!((three_height - empty_height - 2.0 * slot).abs() < f32::EPSILON);
    }

    #[test]
    fn node_center_derives_from_size() {
        let node = Node::new_item(item("x"), (100.0, 200.0));
        let (w, h) = node.size();
        assert_eq!(node.center(), (100.0 + w / 2.0, 200.0 + h / 2.0));
    }

    #[test]
    fn edge_from_connection_keeps_handles() {
        let edge = Edge::from_connection(Connection {
            source: "a".to_string(),
            target: "b".to_string(),
            source_handle: "out".to_string(),
            target_handle: "in".to_string(),
        });
        assert!(edge.id.starts_with("edge-"));
        assert_eq!(edge.source, "a");
        assert_eq!(edge.target, "b");
        assert_eq!(edge.source_handle, "out");
        assert_eq!(edge.target_handle, "in");
    }

    #[test]
    fn persisted_item_node_carries_no_payload() {
        let doc = PersistedGraph {
            nodes: vec![PersistedNode::Item {
                id: "db-1".to_string(),
                position: (5.0, 6.0),
                parent: None,
            }],
            edges: Vec::new(),
        };
        let json = doc.to_json().unwrap();
        assert!(json.contains("db-1"));
        assert!(!json.contains("display_name"));
        assert!(!json.contains("provider_metadata"));
        assert!(!json.contains("region"));
    }

    #[test]
    fn persisted_document_roundtrip() {
        let doc = PersistedGraph {
            nodes: vec![
                PersistedNode::Group {
                    id: "group-1".to_string(),
                    position: (0.0, 0.0),
                    title: "Prod".to_string(),
                    color: 2,
                    child_item_ids: vec!["db-1".to_string()],
                },
                PersistedNode::Item {
                    id: "db-1".to_string(),
                    position: (20.0, 36.0),
                    parent: Some("group-1".to_string()),
                },
            ],
            edges: vec![Edge::from_connection(Connection {
                source: "group-1".to_string(),
                target: "db-1".to_string(),
                source_handle: "out".to_string(),
                target_handle: "in".to_string(),
            })],
        };

        let restored = PersistedGraph::from_json(&doc.to_json().unwrap()).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn persisted_node_type_tags_are_stable() {
        let group = PersistedNode::Group {
            id: "group-1".to_string(),
            position: (0.0, 0.0),
            title: "G".to_string(),
            color: 0,
            child_item_ids: Vec::new(),
        };
        let json = serde_json::to_string(&group).unwrap();
        assert!(json.contains("\"type\":\"group\""));

        let item = PersistedNode::Item {
            id: "i".to_string(),
            position: (0.0, 0.0),
            parent: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"type\":\"item\""));
        // Absent parent is omitted entirely rather than serialized as null
        assert!(!json.contains("parent"));
    }
}
