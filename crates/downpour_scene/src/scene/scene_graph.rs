//! Scene: flat node storage, hierarchy mutation and transform propagation
//!
//! Nodes live in a slot-reused array addressed by generational
//! [`NodeHandle`]s. Parent/child links are handles too, so no node owns
//! another and a stale handle is always detectable.
//!
//! World transforms are lazy: mutations mark nodes dirty and
//! [`Scene::update_transforms`] recomputes them breadth-first. Reading a world
//! transform between a mutation and the next update yields the old value.

use crate::foundation::math::{Frustum, Mat4};
use crate::scene::render_queue::RenderQueue;
use crate::scene::{NodeHandle, RenderBatch, SceneNode, SlotAllocator};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_SCENE_ID: AtomicU32 = AtomicU32::new(1);

/// Owner of one node hierarchy
#[derive(Debug)]
pub struct Scene {
    id: u32,
    name: String,

    nodes: Vec<Option<SceneNode>>,
    slots: SlotAllocator,

    root_nodes: Vec<NodeHandle>,
    active_nodes: Vec<NodeHandle>,
    name_to_handle: HashMap<String, NodeHandle>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_slots(name, SlotAllocator::new())
    }

    /// Create an empty scene holding at most `limit` live nodes
    ///
    /// Node creation beyond the limit returns [`NodeHandle::INVALID`].
    pub fn with_node_limit(name: impl Into<String>, limit: u32) -> Self {
        Self::with_slots(name, SlotAllocator::with_slot_limit(limit))
    }

    fn with_slots(name: impl Into<String>, slots: SlotAllocator) -> Self {
        Self {
            id: NEXT_SCENE_ID.fetch_add(1, Ordering::Relaxed),
            name: name.into(),
            nodes: Vec::new(),
            slots,
            root_nodes: Vec::new(),
            active_nodes: Vec::new(),
            name_to_handle: HashMap::new(),
        }
    }

    /// Process-unique scene id
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    // ---- Node lifecycle ----

    /// Create a root node with identity transform
    ///
    /// The node is registered under `name`, shadowing any earlier node with
    /// the same name for [`Scene::find_node`]. Returns [`NodeHandle::INVALID`]
    /// if the slot space is exhausted.
    pub fn create_node(&mut self, name: &str) -> NodeHandle {
        self.insert_node(name, NodeHandle::INVALID)
    }

    /// Create a node and attach it under `parent`
    ///
    /// The new leaf is linked directly, so building a chain of any depth costs
    /// constant time per node. If `parent` is stale the node is left as a root.
    pub fn create_child_node(&mut self, name: &str, parent: NodeHandle) -> NodeHandle {
        self.insert_node(name, parent)
    }

    fn insert_node(&mut self, name: &str, parent: NodeHandle) -> NodeHandle {
        let handle = self.slots.allocate();
        if !handle.is_valid() {
            log::error!("Scene '{}': no free node slot for '{}'", self.name, name);
            return handle;
        }

        let mut node = SceneNode::new(name);
        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(handle);
            node.parent = parent;
        } else {
            if parent.is_valid() {
                log::debug!("Scene '{}': '{}' created with stale parent {}", self.name, name, parent);
            }
            self.root_nodes.push(handle);
        }

        let slot = handle.index() as usize;
        if slot == self.nodes.len() {
            self.nodes.push(None);
        }
        self.nodes[slot] = Some(node);

        self.active_nodes.push(handle);
        self.name_to_handle.insert(name.to_string(), handle);
        handle
    }

    /// Destroy a node and its whole subtree
    ///
    /// Descendants are freed before their ancestors. Every handle into the
    /// subtree becomes permanently stale.
    pub fn destroy_node(&mut self, handle: NodeHandle) {
        if !self.is_valid(handle) {
            log::debug!("Scene '{}': destroy_node on stale handle {}", self.name, handle);
            return;
        }

        self.detach(handle);

        // Pre-order walk; reversed it visits every child before its parent
        let mut subtree = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.node(current) {
                subtree.push(current);
                stack.extend(node.children.iter().copied());
            }
        }

        let removed: HashSet<NodeHandle> = subtree.iter().copied().collect();
        for &doomed in subtree.iter().rev() {
            let slot = doomed.index() as usize;
            if let Some(node) = self.nodes[slot].take() {
                if self.name_to_handle.get(node.name()) == Some(&doomed) {
                    self.name_to_handle.remove(node.name());
                }
            }
            self.slots.free(doomed.index());
        }

        self.active_nodes.retain(|h| !removed.contains(h));
        self.root_nodes.retain(|h| !removed.contains(h));
    }

    /// Drop every node and reset slot generations
    ///
    /// Handles issued before this call must not be used afterwards: slot
    /// generations restart, so they may alias new nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.slots.clear();
        self.root_nodes.clear();
        self.active_nodes.clear();
        self.name_to_handle.clear();
    }

    // ---- Lookup ----

    /// True if `handle` refers to a live node of this scene
    pub fn is_valid(&self, handle: NodeHandle) -> bool {
        self.slots.is_valid(handle)
    }

    /// Resolve a handle; `None` when stale
    pub fn node(&self, handle: NodeHandle) -> Option<&SceneNode> {
        if !self.slots.is_valid(handle) {
            return None;
        }
        self.nodes.get(handle.index() as usize)?.as_ref()
    }

    /// Resolve a handle mutably; `None` when stale
    pub fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut SceneNode> {
        if !self.slots.is_valid(handle) {
            return None;
        }
        self.nodes.get_mut(handle.index() as usize)?.as_mut()
    }

    /// Most recently created live node with this name
    pub fn find_node(&self, name: &str) -> NodeHandle {
        self.name_to_handle
            .get(name)
            .copied()
            .filter(|&h| self.is_valid(h))
            .unwrap_or(NodeHandle::INVALID)
    }

    /// Every named node whose name starts with `prefix`, ordered by slot index
    pub fn find_nodes_with_prefix(&self, prefix: &str) -> Vec<NodeHandle> {
        let mut found: Vec<NodeHandle> = self
            .name_to_handle
            .iter()
            .filter(|&(name, &h)| name.starts_with(prefix) && self.is_valid(h))
            .map(|(_, &h)| h)
            .collect();
        found.sort_unstable();
        found
    }

    /// Nodes without a parent, in attachment order
    pub fn root_nodes(&self) -> &[NodeHandle] {
        &self.root_nodes
    }

    /// Every live node, in creation order
    pub fn active_nodes(&self) -> &[NodeHandle] {
        &self.active_nodes
    }

    /// Iterate live nodes with their handles
    pub fn iter(&self) -> impl Iterator<Item = (NodeHandle, &SceneNode)> + '_ {
        self.active_nodes
            .iter()
            .filter_map(move |&h| self.node(h).map(|node| (h, node)))
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.active_nodes.len()
    }

    // ---- Hierarchy ----

    /// Move `child` under `parent`, or make it a root when `parent` is [`NodeHandle::INVALID`]
    ///
    /// The child's whole subtree is marked dirty. Requests that would create
    /// a cycle, or that name a stale parent, are ignored.
    pub fn set_parent(&mut self, child: NodeHandle, parent: NodeHandle) {
        if !self.is_valid(child) {
            log::debug!("Scene '{}': set_parent on stale child {}", self.name, child);
            return;
        }
        if parent.is_valid() {
            if !self.is_valid(parent) {
                log::debug!("Scene '{}': set_parent with stale parent {}", self.name, parent);
                return;
            }
            // A leaf can only be its own ancestor
            let is_leaf = self.node(child).is_some_and(|n| n.children.is_empty());
            let creates_cycle = if is_leaf {
                child == parent
            } else {
                self.is_ancestor_or_self(child, parent)
            };
            if creates_cycle {
                log::debug!(
                    "Scene '{}': refusing to parent {} under its own subtree ({})",
                    self.name,
                    child,
                    parent
                );
                return;
            }
        }

        self.detach(child);

        if let Some(parent_node) = self.node_mut(parent) {
            parent_node.children.push(child);
            if let Some(child_node) = self.node_mut(child) {
                child_node.parent = parent;
            }
        } else {
            self.root_nodes.push(child);
        }

        self.mark_subtree_dirty(child);
    }

    /// Detach `child` from its parent and make it a root
    pub fn remove_parent(&mut self, child: NodeHandle) {
        self.set_parent(child, NodeHandle::INVALID);
    }

    /// Unlink a live node from its parent's children or from the root list
    fn detach(&mut self, handle: NodeHandle) {
        let Some(node) = self.node_mut(handle) else {
            return;
        };
        let old_parent = std::mem::replace(&mut node.parent, NodeHandle::INVALID);

        if let Some(parent_node) = self.node_mut(old_parent) {
            parent_node.children.retain(|&c| c != handle);
        } else {
            self.root_nodes.retain(|&r| r != handle);
        }
    }

    /// True if `ancestor` is `node` or one of its ancestors
    fn is_ancestor_or_self(&self, ancestor: NodeHandle, node: NodeHandle) -> bool {
        let mut current = node;
        while let Some(entry) = self.node(current) {
            if current == ancestor {
                return true;
            }
            current = entry.parent;
        }
        false
    }

    // ---- Transforms ----

    /// Mark a single node's world transform stale
    pub fn mark_dirty(&mut self, handle: NodeHandle) {
        if let Some(node) = self.node_mut(handle) {
            node.is_dirty = true;
        }
    }

    /// Mark a node and every descendant stale
    pub fn mark_subtree_dirty(&mut self, handle: NodeHandle) {
        let mut queue = VecDeque::from([handle]);
        while let Some(current) = queue.pop_front() {
            if let Some(node) = self.node_mut(current) {
                node.is_dirty = true;
                queue.extend(node.children.iter().copied());
            }
        }
    }

    /// Recompute world transforms breadth-first from every root
    ///
    /// A node that is static and already clean is skipped together with its
    /// whole subtree.
    pub fn update_transforms(&mut self) {
        let mut queue: VecDeque<(NodeHandle, Mat4)> = self
            .root_nodes
            .iter()
            .map(|&root| (root, Mat4::identity()))
            .collect();

        while let Some((handle, parent_world)) = queue.pop_front() {
            let Some(node) = self.node_mut(handle) else {
                continue;
            };
            if node.is_static() && !node.is_dirty {
                continue;
            }

            let world = parent_world * node.local_transform();
            node.world_transform = world;
            node.is_dirty = false;
            queue.extend(node.children.iter().map(|&child| (child, world)));
        }
    }

    // ---- Rendering queries ----

    /// Group visible nodes with render data by (model, transparency)
    ///
    /// Opaque batches come first. Batches appear in the order their first node
    /// was created, and nodes keep creation order within a batch.
    pub fn render_batches(&self) -> Vec<RenderBatch> {
        let mut queue = RenderQueue::new();
        for (handle, node) in self.iter() {
            if let Some(render_data) = node.render_data().filter(|r| r.is_visible) {
                queue.push(render_data.model, render_data.is_transparent, handle);
            }
        }
        queue.into_batches()
    }

    /// Visible nodes with render data that survive frustum culling
    ///
    /// Nodes with bounds are tested in world space against `view_proj`; nodes
    /// without bounds are always kept. Uses cached world transforms.
    pub fn collect_visible_nodes(&self, view_proj: &Mat4) -> Vec<NodeHandle> {
        let frustum = Frustum::from_matrix(view_proj);
        self.iter()
            .filter(|(_, node)| node.is_renderable())
            .filter(|(_, node)| {
                node.bounds().map_or(true, |bounds| {
                    frustum.intersects_aabb(&bounds.transformed(node.world_transform()))
                })
            })
            .map(|(handle, _)| handle)
            .collect()
    }
}
