//! The canonical in-memory board state.
//!
//! `GraphStore` owns the node and edge collections, the item registry
//! mirror, and the toolkit of unplaced items. Every mutation goes through
//! the operations here so the conservation invariant holds: each item id is
//! in exactly one of the toolkit, a top-level placement, or a group's child
//! list — never duplicated, never lost. A revision counter is bumped on
//! every successful mutation; the persistence synchronizer watches it.

use std::collections::{HashMap, HashSet};

use crate::registry::{ItemRegistry, Toolkit};
use crate::types::{
    Connection, Edge, EdgeChange, Item, ItemId, Node, NodeChange, NodeId, NodeKind, PersistedGraph,
    PersistedNode,
};

/// World-space offset of a group child slot relative to the group's
/// top-left corner. Children stack in a single vertical column so insertion
/// order stays visually stable.
pub fn group_child_offset(index: usize) -> (f32, f32) {
    (
        crate::constants::GROUP_CHILD_X_GAP,
        crate::constants::GROUP_CHILD_Y_GAP
            + crate::constants::GROUP_HEADER_INSET
            + index as f32
                * (crate::constants::ITEM_NODE_HEIGHT + crate::constants::GROUP_CHILD_GAP),
    )
}

/// What `resolve_drop` decided for a settled drag gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropOutcome {
    /// The dragged item joined the given group
    JoinedGroup(NodeId),
    /// The dragged item left the given group and is now top-level
    LeftGroup(NodeId),
    /// No membership change
    Unchanged,
}

/// The single source of truth for board state.
#[derive(Debug, Default)]
pub struct GraphStore {
    registry: ItemRegistry,
    toolkit: Toolkit,
    nodes: HashMap<NodeId, Node>,
    edges: Vec<Edge>,
    revision: u64,
}

impl GraphStore {
    /// Creates a store over the given registry, staging every item in the
    /// toolkit.
    pub fn new(registry: ItemRegistry) -> Self {
        let mut toolkit = Toolkit::default();
        toolkit.add_items(registry.items().to_vec());
        Self {
            registry,
            toolkit,
            nodes: HashMap::new(),
            edges: Vec::new(),
            revision: 0,
        }
    }

    /// The placed nodes, keyed by id.
    pub fn nodes(&self) -> &HashMap<NodeId, Node> {
        &self.nodes
    }

    /// Looks up a single node.
    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// The current edges.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// The staging set of unplaced items.
    pub fn toolkit(&self) -> &Toolkit {
        &self.toolkit
    }

    /// The authoritative item registry.
    pub fn registry(&self) -> &ItemRegistry {
        &self.registry
    }

    /// Monotonic mutation counter observed by the persistence synchronizer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision += 1;
    }

    /// Looks up an item in the authoritative list merged with the toolkit.
    ///
    /// Returns `None` for unknown ids; callers abort the operation they were
    /// attempting rather than crash.
    pub fn find_item(&self, id: &str) -> Option<&Item> {
        self.registry
            .find(id)
            .or_else(|| self.toolkit.entries().iter().find(|item| item.id == id))
    }

    /// Replaces the registry with a fresh fetch from the item source.
    ///
    /// Toolkit entries whose items disappeared are dropped; newly appeared
    /// items that are not placed anywhere are staged.
    pub fn replace_registry(&mut self, items: Vec<Item>) {
        self.registry.replace(items);
        self.reconcile_toolkit();
        self.touch();
    }

    /// Replaces the whole node collection and reconciles the toolkit in the
    /// same call, so there is no observable state where an item is in
    /// neither place. Edges left dangling by the replacement are dropped.
    pub fn set_nodes(&mut self, nodes: Vec<Node>) {
        self.nodes = nodes.into_iter().map(|node| (node.id.clone(), node)).collect();
        self.reconcile_toolkit();
        self.prune_dangling_edges();
        self.touch();
    }

    /// Replaces the edge collection, silently filtering edges whose
    /// endpoints are not on the board.
    pub fn set_edges(&mut self, edges: Vec<Edge>) {
        self.edges = edges
            .into_iter()
            .filter(|edge| {
                let ok = self.nodes.contains_key(&edge.source)
                    && self.nodes.contains_key(&edge.target);
                if !ok {
                    log::debug!("dropping edge {} with missing endpoint", edge.id);
                }
                ok
            })
            .collect();
        self.touch();
    }

    /// Applies an incremental list of node mutations.
    pub fn apply_node_changes(&mut self, changes: Vec<NodeChange>) {
        let mut changed = false;
        for change in changes {
            match change {
                NodeChange::Add(node) => changed |= self.insert_node(node),
                NodeChange::Remove(id) => changed |= self.remove_node_inner(&id),
                NodeChange::Position { id, position } => {
                    changed |= self.move_node(&id, position)
                }
            }
        }
        if changed {
            self.touch();
        }
    }

    /// Applies an incremental list of edge mutations.
    pub fn apply_edge_changes(&mut self, changes: Vec<EdgeChange>) {
        let mut changed = false;
        for change in changes {
            match change {
                EdgeChange::Add(edge) => {
                    if self.nodes.contains_key(&edge.source)
                        && self.nodes.contains_key(&edge.target)
                    {
                        self.edges.push(edge);
                        changed = true;
                    }
                }
                EdgeChange::Remove(id) => {
                    let before = self.edges.len();
                    self.edges.retain(|edge| edge.id != id);
                    changed |= self.edges.len() != before;
                }
            }
        }
        if changed {
            self.touch();
        }
    }

    /// Appends a new edge for the proposed connection if both endpoints are
    /// on the board. No self-loop policy is imposed here.
    ///
    /// # Returns
    ///
    /// `true` if the edge was created.
    pub fn connect(&mut self, connection: Connection) -> bool {
        if !self.nodes.contains_key(&connection.source)
            || !self.nodes.contains_key(&connection.target)
        {
            return false;
        }
        self.edges.push(Edge::from_connection(connection));
        self.touch();
        true
    }

    /// Lifts an item out of the toolkit and places it on the board.
    ///
    /// # Arguments
    ///
    /// * `item_id` - The toolkit entry to place
    /// * `position` - World-space top-left corner for the new node
    ///
    /// # Returns
    ///
    /// The new node's id, or `None` if the item is not staged in the toolkit
    /// (the operation is aborted, nothing changes).
    pub fn place_item(&mut self, item_id: &str, position: (f32, f32)) -> Option<NodeId> {
        if self.nodes.contains_key(item_id) {
            log::warn!("item {item_id} is already placed; ignoring");
            return None;
        }
        let item = self.toolkit.remove_by_id(item_id)?;
        let node = Node::new_item(item, position);
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.touch();
        Some(id)
    }

    /// Reorders the toolkit's staged entries.
    ///
    /// Toolkit order is a presentation preference, not part of the persisted
    /// graph document, so this does not advance the revision counter.
    pub fn reorder_toolkit(&mut self, from: usize, to: usize) {
        self.toolkit.reorder(from, to);
    }

    /// Creates an empty group node at the given position.
    ///
    /// The color is assigned by cycling the palette with the current group
    /// count, so consecutive groups read as distinct clusters.
    pub fn create_group(&mut self, title: String, position: (f32, f32)) -> NodeId {
        let color =
            self.nodes.values().filter(|n| n.is_group()).count() % crate::constants::GROUP_COLOR_COUNT;
        let node = Node::new_group(title, color, position);
        let id = node.id.clone();
        self.nodes.insert(id.clone(), node);
        self.touch();
        id
    }

    /// Renames a group in place.
    pub fn rename_group(&mut self, id: &str, new_title: String) {
        if let Some(Node {
            kind: NodeKind::Group { title, .. },
            ..
        }) = self.nodes.get_mut(id)
        {
            *title = new_title;
            self.touch();
        }
    }

    /// Advances a group's color to the next palette entry.
    pub fn cycle_group_color(&mut self, id: &str) {
        if let Some(Node {
            kind: NodeKind::Group { color, .. },
            ..
        }) = self.nodes.get_mut(id)
        {
            *color = (*color + 1) % crate::constants::GROUP_COLOR_COUNT;
            self.touch();
        }
    }

    /// Removes a node from the board.
    ///
    /// Removing an item placement returns its item to the toolkit and prunes
    /// it from any owning group. Removing a group cascades: every child item
    /// returns to the toolkit, never silently deleted. Edges touching any
    /// removed node are dropped.
    ///
    /// # Returns
    ///
    /// `true` if the node existed and was removed.
    pub fn remove_node(&mut self, id: &str) -> bool {
        let removed = self.remove_node_inner(id);
        if removed {
            self.touch();
        }
        removed
    }

    fn remove_node_inner(&mut self, id: &str) -> bool {
        let Some(node) = self.nodes.remove(id) else {
            return false;
        };

        let mut removed_ids: HashSet<NodeId> = HashSet::new();
        removed_ids.insert(node.id.clone());

        match node.kind {
            NodeKind::Group { child_item_ids, .. } => {
                let mut returned: Vec<Item> = Vec::new();
                for child_id in child_item_ids {
                    let payload = match self.nodes.remove(&child_id) {
                        Some(Node {
                            kind: NodeKind::Item { item, .. },
                            ..
                        }) => Some(item),
                        Some(other) => {
                            // Unexpected shape; put it back rather than lose it
                            self.nodes.insert(other.id.clone(), other);
                            None
                        }
                        None => self.registry.find(&child_id).cloned(),
                    };
                    match payload {
                        Some(item) => {
                            removed_ids.insert(child_id);
                            returned.push(item);
                        }
                        None => {
                            log::warn!("group child {child_id} unknown to the registry; dropped");
                        }
                    }
                }
                self.toolkit.add_items(returned);
            }
            NodeKind::Item { item, parent } => {
                if let Some(parent_id) = parent {
                    self.detach_child(&parent_id, &item.id);
                    self.layout_group(&parent_id);
                }
                self.toolkit.add_items(vec![item]);
            }
        }

        self.edges
            .retain(|edge| !removed_ids.contains(&edge.source) && !removed_ids.contains(&edge.target));
        true
    }

    /// Moves a node to a new world position. Moving a group translates its
    /// children by the same delta so the column stays attached.
    fn move_node(&mut self, id: &str, position: (f32, f32)) -> bool {
        let Some(node) = self.nodes.get_mut(id) else {
            return false;
        };
        let delta = (position.0 - node.position.0, position.1 - node.position.1);
        node.position = position;
        let children: Vec<NodeId> = match &node.kind {
            NodeKind::Group { child_item_ids, .. } => child_item_ids.clone(),
            NodeKind::Item { .. } => Vec::new(),
        };

        for child_id in children {
            if let Some(child) = self.nodes.get_mut(&child_id) {
                child.position.0 += delta.0;
                child.position.1 += delta.1;
            }
        }
        true
    }

    /// Settles a finished drag gesture for the given node: the
    /// group-membership transition algorithm.
    ///
    /// The dragged node's center is hit-tested against every other node's
    /// bounding box; when several boxes contain it, the smallest area wins
    /// (the innermost target). An unparented item dropped on a group joins
    /// it; a parented item dropped outside any target leaves its group and
    /// keeps its last absolute position so it does not jump.
    pub fn resolve_drop(&mut self, node_id: &str) -> DropOutcome {
        let Some(node) = self.nodes.get(node_id) else {
            return DropOutcome::Unchanged;
        };
        let center = node.center();
        let parent = node.parent().cloned();
        let is_item = !node.is_group();

        let target = self.find_drop_target(center, node_id);

        match (target, parent) {
            (Some(target_id), None) if is_item => {
                let joined = {
                    if let Some(Node {
                        kind: NodeKind::Group { child_item_ids, .. },
                        ..
                    }) = self.nodes.get_mut(&target_id)
                    {
                        if !child_item_ids.contains(&node_id.to_string()) {
                            child_item_ids.push(node_id.to_string());
                        }
                        true
                    } else {
                        false
                    }
                };
                if !joined {
                    return DropOutcome::Unchanged;
                }
                if let Some(Node {
                    kind: NodeKind::Item { parent, .. },
                    ..
                }) = self.nodes.get_mut(node_id)
                {
                    *parent = Some(target_id.clone());
                }
                self.layout_group(&target_id);
                self.touch();
                DropOutcome::JoinedGroup(target_id)
            }
            (None, Some(parent_id)) => {
                self.detach_child(&parent_id, node_id);
                if let Some(Node {
                    kind: NodeKind::Item { parent, .. },
                    ..
                }) = self.nodes.get_mut(node_id)
                {
                    *parent = None;
                }
                self.layout_group(&parent_id);
                self.touch();
                DropOutcome::LeftGroup(parent_id)
            }
            (_, Some(parent_id)) => {
                // Still over some target while parented: snap back into the column
                self.layout_group(&parent_id);
                self.touch();
                DropOutcome::Unchanged
            }
            _ => DropOutcome::Unchanged,
        }
    }

    /// The group a drag over the given center point would join, used by the
    /// UI to highlight the prospective target live during the gesture.
    pub fn hover_target(&self, node_id: &str) -> Option<NodeId> {
        let node = self.nodes.get(node_id)?;
        if node.is_group() || node.parent().is_some() {
            return None;
        }
        let target_id = self.find_drop_target(node.center(), node_id)?;
        self.nodes.get(&target_id).filter(|n| n.is_group()).map(|n| n.id.clone())
    }

    /// Axis-aligned hit test of `center` against every node except
    /// `exclude`; ties are broken by smallest bounding-box area.
    fn find_drop_target(&self, center: (f32, f32), exclude: &str) -> Option<NodeId> {
        let mut best: Option<(NodeId, f32)> = None;
        for (id, node) in &self.nodes {
            if id == exclude {
                continue;
            }
            let (w, h) = node.size();
            let (x, y) = node.position;
            let contains = center.0 >= x && center.0 <= x + w && center.1 >= y && center.1 <= y + h;
            if !contains {
                continue;
            }
            let area = w * h;
            match &best {
                Some((_, best_area)) if *best_area <= area => {}
                _ => best = Some((id.clone(), area)),
            }
        }
        best.map(|(id, _)| id)
    }

    /// Recomputes the derived positions of a group's children as a vertical
    /// column anchored at the group's origin.
    pub fn layout_group(&mut self, group_id: &str) {
        let Some(Node {
            position: group_pos,
            kind: NodeKind::Group { child_item_ids, .. },
            ..
        }) = self.nodes.get(group_id)
        else {
            return;
        };
        let group_pos = *group_pos;
        let children = child_item_ids.clone();

        for (index, child_id) in children.iter().enumerate() {
            let offset = group_child_offset(index);
            if let Some(child) = self.nodes.get_mut(child_id) {
                child.position = (group_pos.0 + offset.0, group_pos.1 + offset.1);
            }
        }
    }

    /// Serializes the board to its minimal persisted projection, stripping
    /// item payloads. Output order is deterministic: groups first, then
    /// items, each sorted by id.
    pub fn to_persisted(&self) -> PersistedGraph {
        let mut nodes: Vec<&Node> = self.nodes.values().collect();
        nodes.sort_by(|a, b| b.is_group().cmp(&a.is_group()).then(a.id.cmp(&b.id)));

        let nodes = nodes
            .into_iter()
            .map(|node| match &node.kind {
                NodeKind::Item { parent, .. } => PersistedNode::Item {
                    id: node.id.clone(),
                    position: node.position,
                    parent: parent.clone(),
                },
                NodeKind::Group {
                    title,
                    color,
                    child_item_ids,
                } => PersistedNode::Group {
                    id: node.id.clone(),
                    position: node.position,
                    title: title.clone(),
                    color: *color,
                    child_item_ids: child_item_ids.clone(),
                },
            })
            .collect();

        PersistedGraph {
            nodes,
            edges: self.edges.clone(),
        }
    }

    /// Rebuilds the board from a persisted document, re-attaching live item
    /// data from the registry.
    ///
    /// Stale references are discarded, not errored: persisted items unknown
    /// to the registry vanish, group child lists are filtered to surviving
    /// members, parent references not backed by a group's child list are
    /// cleared, and dangling edges are dropped. Group columns are laid out
    /// fresh so child positions derive from membership order.
    pub fn hydrate(&mut self, document: PersistedGraph) {
        let mut nodes: Vec<Node> = Vec::new();
        let mut item_ids: HashSet<ItemId> = HashSet::new();

        for persisted in &document.nodes {
            if let PersistedNode::Item { id, position, parent } = persisted {
                match self.registry.find(id) {
                    Some(item) => {
                        nodes.push(Node {
                            id: id.clone(),
                            position: *position,
                            kind: NodeKind::Item {
                                item: item.clone(),
                                parent: parent.clone(),
                            },
                        });
                        item_ids.insert(id.clone());
                    }
                    None => {
                        log::debug!("persisted item {id} no longer exists; dropped");
                    }
                }
            }
        }

        // Membership source of truth is the group's child list; filter it to
        // items that survived, then re-point survivors' parent references.
        let mut claimed: HashMap<ItemId, NodeId> = HashMap::new();
        for persisted in &document.nodes {
            if let PersistedNode::Group {
                id,
                position,
                title,
                color,
                child_item_ids,
            } = persisted
            {
                let children: Vec<ItemId> = child_item_ids
                    .iter()
                    .filter(|child| item_ids.contains(*child) && !claimed.contains_key(*child))
                    .cloned()
                    .collect();
                for child in &children {
                    claimed.insert(child.clone(), id.clone());
                }
                nodes.push(Node {
                    id: id.clone(),
                    position: *position,
                    kind: NodeKind::Group {
                        title: title.clone(),
                        color: *color,
                        child_item_ids: children,
                    },
                });
            }
        }

        for node in &mut nodes {
            if let NodeKind::Item { parent, .. } = &mut node.kind {
                *parent = claimed.get(&node.id).cloned();
            }
        }

        let group_ids: Vec<NodeId> = nodes
            .iter()
            .filter(|n| n.is_group())
            .map(|n| n.id.clone())
            .collect();

        self.set_nodes(nodes);
        self.set_edges(document.edges);
        for group_id in group_ids {
            self.layout_group(&group_id);
        }
    }

    /// Inserts a node, unstaging its item from the toolkit when placing one.
    fn insert_node(&mut self, node: Node) -> bool {
        if self.nodes.contains_key(&node.id) {
            log::warn!("node {} already exists; ignoring add", node.id);
            return false;
        }
        if !node.is_group() {
            self.toolkit.remove_by_id(&node.id);
        }
        self.nodes.insert(node.id.clone(), node);
        true
    }

    fn detach_child(&mut self, group_id: &str, child_id: &str) {
        if let Some(Node {
            kind: NodeKind::Group { child_item_ids, .. },
            ..
        }) = self.nodes.get_mut(group_id)
        {
            child_item_ids.retain(|id| id != child_id);
        }
    }

    /// Rebuilds toolkit membership from the node collection: placed items
    /// leave the toolkit, unplaced registry items (re)enter it. Entries
    /// already staged keep their user-chosen order; returners are appended.
    fn reconcile_toolkit(&mut self) {
        let mut placed: HashSet<ItemId> = HashSet::new();
        for node in self.nodes.values() {
            match &node.kind {
                NodeKind::Item { item, .. } => {
                    placed.insert(item.id.clone());
                }
                NodeKind::Group { child_item_ids, .. } => {
                    placed.extend(child_item_ids.iter().cloned());
                }
            }
        }

        let known: HashSet<ItemId> =
            self.registry.items().iter().map(|item| item.id.clone()).collect();
        self.toolkit
            .remove_where(|item| placed.contains(&item.id) || !known.contains(&item.id));

        let missing: Vec<Item> = self
            .registry
            .items()
            .iter()
            .filter(|item| !placed.contains(&item.id) && !self.toolkit.contains(&item.id))
            .cloned()
            .collect();
        self.toolkit.add_items(missing);
    }

    fn prune_dangling_edges(&mut self) {
        let nodes = &self.nodes;
        self.edges
            .retain(|edge| nodes.contains_key(&edge.source) && nodes.contains_key(&edge.target));
    }
}
