//! Dynamic AABB tree broadphase.
//!
//! A Box2D-style balanced binary tree of fattened proxy boxes, grounded on
//! the original engine's `Tree`/`AllocateNode`/`CreateProxy`/`InsertLeaf`
//! free-list-threaded node pool: instead of threading free nodes through a
//! reused `parent` field with a magic height sentinel, free slots are
//! tracked with a plain `Vec<u32>` stack (the same recycling idiom as
//! [`crate::utils::slot_allocator::SlotAllocator`]), and proxy-to-node
//! lookup for [`DynamicTree::move_proxy`]/[`DynamicTree::destroy_proxy`] is
//! O(1) via a reverse [`rustc_hash::FxHashMap`] rather than a linear walk,
//! the same "flat array + reverse map" storage idiom `scene::OctreeSceneIndex`
//! uses for its own spatial index.

use rustc_hash::FxHashMap;

use crate::math::Box;

/// A stable handle to one proxy (leaf) in the tree.
pub type ProxyId = u32;

const FAT_MARGIN: f32 = 0.1;
const DISPLACEMENT_MULTIPLIER: f32 = 2.0;
const NULL_NODE: u32 = u32::MAX;

struct Node<T> {
    box_: Box,
    parent: u32,
    left: u32,
    right: u32,
    height: i32,
    object: Option<T>,
    moved: bool,
}

impl<T> Node<T> {
    fn is_leaf(&self) -> bool {
        self.left == NULL_NODE
    }
}

/// A balanced dynamic AABB tree over fattened proxy boxes.
pub struct DynamicTree<T> {
    nodes: Vec<Node<T>>,
    free_list: Vec<u32>,
    root: u32,
    node_of_proxy: FxHashMap<ProxyId, u32>,
    proxy_of_node: FxHashMap<u32, ProxyId>,
    next_proxy_id: ProxyId,
    moved_proxies: Vec<ProxyId>,
}

impl<T: Clone> DynamicTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free_list: Vec::new(),
            root: NULL_NODE,
            node_of_proxy: FxHashMap::default(),
            proxy_of_node: FxHashMap::default(),
            next_proxy_id: 0,
            moved_proxies: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.node_of_proxy.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_of_proxy.is_empty()
    }

    fn allocate_node(&mut self) -> u32 {
        if let Some(index) = self.free_list.pop() {
            return index;
        }
        self.nodes.push(Node {
            box_: Box::empty(),
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
            height: -1,
            object: None,
            moved: false,
        });
        (self.nodes.len() - 1) as u32
    }

    fn free_node(&mut self, index: u32) {
        self.nodes[index as usize].height = -1;
        self.free_list.push(index);
    }

    /// Allocate a node, fatten `object_box`, and insert it as a leaf.
    /// Returns a stable proxy id.
    pub fn create_proxy(&mut self, object_box: Box, object: T) -> ProxyId {
        let node = self.allocate_node();
        self.nodes[node as usize] = Node {
            box_: object_box.fattened(FAT_MARGIN),
            parent: NULL_NODE,
            left: NULL_NODE,
            right: NULL_NODE,
            height: 0,
            object: Some(object),
            moved: true,
        };
        self.insert_leaf(node);

        let proxy = self.next_proxy_id;
        self.next_proxy_id += 1;
        self.node_of_proxy.insert(proxy, node);
        self.proxy_of_node.insert(node, proxy);
        self.moved_proxies.push(proxy);
        proxy
    }

    pub fn destroy_proxy(&mut self, proxy: ProxyId) {
        if let Some(node) = self.node_of_proxy.remove(&proxy) {
            self.proxy_of_node.remove(&node);
            self.remove_leaf(node);
            self.free_node(node);
            self.moved_proxies.retain(|p| *p != proxy);
        }
    }

    /// Returns `true` (and re-inserts) when the new box no longer fits the
    /// current fat box; otherwise leaves the tree untouched.
    pub fn move_proxy(&mut self, proxy: ProxyId, new_box: Box, displacement: crate::math::Vector2) -> bool {
        let Some(&node) = self.node_of_proxy.get(&proxy) else {
            return false;
        };
        if self.nodes[node as usize].box_.contains(&new_box) {
            return false;
        }

        self.remove_leaf(node);
        let fat = new_box.fattened_with_displacement(FAT_MARGIN, displacement, DISPLACEMENT_MULTIPLIER);
        self.nodes[node as usize].box_ = fat;
        self.insert_leaf(node);
        self.nodes[node as usize].moved = true;
        self.moved_proxies.push(proxy);
        true
    }

    pub fn fat_box(&self, proxy: ProxyId) -> Option<Box> {
        self.node_of_proxy.get(&proxy).map(|&n| self.nodes[n as usize].box_)
    }

    pub fn object(&self, proxy: ProxyId) -> Option<&T> {
        let node = *self.node_of_proxy.get(&proxy)?;
        self.nodes[node as usize].object.as_ref()
    }

    fn insert_leaf(&mut self, leaf: u32) {
        if self.root == NULL_NODE {
            self.root = leaf;
            self.nodes[leaf as usize].parent = NULL_NODE;
            return;
        }

        let leaf_box = self.nodes[leaf as usize].box_;
        let mut index = self.root;
        while !self.nodes[index as usize].is_leaf() {
            let left = self.nodes[index as usize].left;
            let right = self.nodes[index as usize].right;
            let combined = self.nodes[index as usize].box_.combine(&leaf_box);
            let area = self.nodes[index as usize].box_.area();
            let combined_area = combined.area();

            let cost = 2.0 * combined_area;
            let inheritance_cost = 2.0 * (combined_area - area);

            let cost_of = |tree: &Self, child: u32| -> f32 {
                let child_combined = tree.nodes[child as usize].box_.combine(&leaf_box);
                if tree.nodes[child as usize].is_leaf() {
                    child_combined.area() + inheritance_cost
                } else {
                    let old_area = tree.nodes[child as usize].box_.area();
                    (child_combined.area() - old_area) + inheritance_cost
                }
            };

            let cost_left = cost_of(self, left);
            let cost_right = cost_of(self, right);

            if cost < cost_left && cost < cost_right {
                break;
            }
            index = if cost_left < cost_right { left } else { right };
        }

        let sibling = index;
        let old_parent = self.nodes[sibling as usize].parent;
        let new_parent = self.allocate_node();
        self.nodes[new_parent as usize].parent = old_parent;
        self.nodes[new_parent as usize].box_ = self.nodes[sibling as usize].box_.combine(&leaf_box);
        self.nodes[new_parent as usize].height = self.nodes[sibling as usize].height + 1;

        if old_parent != NULL_NODE {
            if self.nodes[old_parent as usize].left == sibling {
                self.nodes[old_parent as usize].left = new_parent;
            } else {
                self.nodes[old_parent as usize].right = new_parent;
            }
            self.nodes[new_parent as usize].left = sibling;
            self.nodes[new_parent as usize].right = leaf;
            self.nodes[sibling as usize].parent = new_parent;
            self.nodes[leaf as usize].parent = new_parent;
        } else {
            self.nodes[new_parent as usize].left = sibling;
            self.nodes[new_parent as usize].right = leaf;
            self.nodes[sibling as usize].parent = new_parent;
            self.nodes[leaf as usize].parent = new_parent;
            self.root = new_parent;
        }

        self.refresh_upward(self.nodes[leaf as usize].parent);
    }

    fn remove_leaf(&mut self, leaf: u32) {
        if leaf == self.root {
            self.root = NULL_NODE;
            return;
        }

        let parent = self.nodes[leaf as usize].parent;
        let grandparent = self.nodes[parent as usize].parent;
        let sibling = if self.nodes[parent as usize].left == leaf {
            self.nodes[parent as usize].right
        } else {
            self.nodes[parent as usize].left
        };

        if grandparent != NULL_NODE {
            if self.nodes[grandparent as usize].left == parent {
                self.nodes[grandparent as usize].left = sibling;
            } else {
                self.nodes[grandparent as usize].right = sibling;
            }
            self.nodes[sibling as usize].parent = grandparent;
            self.free_node(parent);
            self.refresh_upward(grandparent);
        } else {
            self.root = sibling;
            self.nodes[sibling as usize].parent = NULL_NODE;
            self.free_node(parent);
        }
    }

    /// Refit boxes/heights and rebalance from `start` up to the root.
    fn refresh_upward(&mut self, start: u32) {
        let mut index = start;
        while index != NULL_NODE {
            index = self.balance(index);

            let left = self.nodes[index as usize].left;
            let right = self.nodes[index as usize].right;
            self.nodes[index as usize].height = 1 + self.nodes[left as usize].height.max(self.nodes[right as usize].height);
            self.nodes[index as usize].box_ = self.nodes[left as usize].box_.combine(&self.nodes[right as usize].box_);

            index = self.nodes[index as usize].parent;
        }
    }

    /// Rotate by promoting the taller grandchild if the subtree rooted at
    /// `a` is unbalanced by more than one level. Returns the new local root.
    fn balance(&mut self, a: u32) -> u32 {
        if self.nodes[a as usize].is_leaf() || self.nodes[a as usize].height < 2 {
            return a;
        }

        let b = self.nodes[a as usize].left;
        let c = self.nodes[a as usize].right;
        let balance = self.nodes[c as usize].height - self.nodes[b as usize].height;

        if balance > 1 {
            self.rotate(a, c, b)
        } else if balance < -1 {
            self.rotate(a, b, c)
        } else {
            a
        }
    }

    /// Promote `heavy` (the taller child) above `a`, demoting `light`.
    fn rotate(&mut self, a: u32, heavy: u32, light: u32) -> u32 {
        let f = self.nodes[heavy as usize].left;
        let g = self.nodes[heavy as usize].right;

        self.nodes[heavy as usize].left = a;
        self.nodes[heavy as usize].parent = self.nodes[a as usize].parent;
        self.nodes[a as usize].parent = heavy;

        let old_parent = self.nodes[heavy as usize].parent;
        if old_parent != NULL_NODE {
            if self.nodes[old_parent as usize].left == a {
                self.nodes[old_parent as usize].left = heavy;
            } else {
                self.nodes[old_parent as usize].right = heavy;
            }
        } else {
            self.root = heavy;
        }

        // Swap in the taller of heavy's own children to keep depth balanced.
        if self.nodes[f as usize].height > self.nodes[g as usize].height {
            self.nodes[heavy as usize].right = f;
            self.nodes[a as usize].right = g;
            self.nodes[g as usize].parent = a;
        } else {
            self.nodes[heavy as usize].right = g;
            self.nodes[a as usize].right = f;
            self.nodes[f as usize].parent = a;
        }
        let _ = light;

        let al = self.nodes[a as usize].left;
        let ar = self.nodes[a as usize].right;
        self.nodes[a as usize].height = 1 + self.nodes[al as usize].height.max(self.nodes[ar as usize].height);
        self.nodes[a as usize].box_ = self.nodes[al as usize].box_.combine(&self.nodes[ar as usize].box_);

        let hl = self.nodes[heavy as usize].left;
        let hr = self.nodes[heavy as usize].right;
        self.nodes[heavy as usize].height = 1 + self.nodes[hl as usize].height.max(self.nodes[hr as usize].height);
        self.nodes[heavy as usize].box_ = self.nodes[hl as usize].box_.combine(&self.nodes[hr as usize].box_);

        heavy
    }

    /// Stack-based descent, invoking `visit` for every leaf whose fat box
    /// overlaps `query_box`.
    pub fn query(&self, query_box: Box, mut visit: impl FnMut(ProxyId, &T)) {
        if self.root == NULL_NODE {
            return;
        }
        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            if !self.nodes[index as usize].box_.overlaps(&query_box) {
                continue;
            }
            let node = &self.nodes[index as usize];
            if node.is_leaf() {
                if let (Some(obj), Some(&proxy)) = (&node.object, self.proxy_of_node.get(&index)) {
                    visit(proxy, obj);
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    /// Proxies moved since the last [`DynamicTree::take_moved_proxies`] call.
    pub fn take_moved_proxies(&mut self) -> Vec<ProxyId> {
        let moved = std::mem::take(&mut self.moved_proxies);
        for &proxy in &moved {
            if let Some(&node) = self.node_of_proxy.get(&proxy) {
                self.nodes[node as usize].moved = false;
            }
        }
        moved
    }

    /// Deduplicated, order-normalized `(min(a,b), max(a,b))` candidate pairs
    /// among proxies moved since the last call, excluding same-proxy pairs.
    pub fn generate_pairs(&mut self) -> Vec<(ProxyId, ProxyId)> {
        let moved = self.take_moved_proxies();
        let mut pairs = std::collections::BTreeSet::new();
        for &a in &moved {
            let Some(fat_box) = self.fat_box(a) else { continue };
            self.query(fat_box, |b, _| {
                if a != b {
                    pairs.insert((a.min(b), a.max(b)));
                }
            });
        }
        pairs.into_iter().collect()
    }

    /// Cast a segment from `p1` to `p2` against every proxy's fat box.
    ///
    /// `visit` is called, in tree traversal order (not hit-distance order),
    /// for every leaf whose fat box the segment intersects; it is passed the
    /// fraction along `p1..p2` the segment currently extends to and returns
    /// the new fraction to continue the cast with. Returning the same value
    /// leaves the segment unchanged; returning a smaller one shortens it for
    /// the rest of the traversal (the standard way to implement
    /// closest-hit: shrink to the hit's own fraction once narrowphase
    /// confirms it). Returning a fraction `<= 0.0` stops the cast early.
    pub fn ray_cast(&self, p1: crate::math::Vector2, p2: crate::math::Vector2, max_fraction: f32, mut visit: impl FnMut(ProxyId, &T, f32) -> f32) {
        if self.root == NULL_NODE || max_fraction <= 0.0 {
            return;
        }

        let delta = p2 - p1;
        let mut fraction = max_fraction;
        let mut seg_end = p1 + delta * fraction;

        let mut stack = vec![self.root];
        while let Some(index) = stack.pop() {
            if !segment_intersects_box(p1, seg_end, &self.nodes[index as usize].box_) {
                continue;
            }

            let node = &self.nodes[index as usize];
            if node.is_leaf() {
                if let (Some(obj), Some(&proxy)) = (&node.object, self.proxy_of_node.get(&index)) {
                    let new_fraction = visit(proxy, obj, fraction);
                    if new_fraction <= 0.0 {
                        return;
                    }
                    if new_fraction < fraction {
                        fraction = new_fraction;
                        seg_end = p1 + delta * fraction;
                    }
                }
            } else {
                stack.push(node.left);
                stack.push(node.right);
            }
        }
    }

    /// Tree height, for the `height <= 2*log2(n) + const` invariant.
    pub fn height(&self) -> i32 {
        if self.root == NULL_NODE {
            0
        } else {
            self.nodes[self.root as usize].height
        }
    }
}

impl<T: Clone> Default for DynamicTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Slab-method segment/AABB test (the same one `b2RayCastAABB` uses): walks
/// each axis independently, narrowing `[t_min, t_max]` to the sub-range of
/// `p1..p2` inside that axis's slab, and rejects as soon as the running
/// interval is empty or the segment is parallel to an axis and starts
/// outside the box on it.
fn segment_intersects_box(p1: crate::math::Vector2, p2: crate::math::Vector2, b: &Box) -> bool {
    let d = p2 - p1;
    let mut t_min = f32::NEG_INFINITY;
    let mut t_max = f32::INFINITY;

    if d.x.abs() < f32::EPSILON {
        if p1.x < b.x_min || b.x_max < p1.x {
            return false;
        }
    } else {
        let inv_d = 1.0 / d.x;
        let (mut t1, mut t2) = ((b.x_min - p1.x) * inv_d, (b.x_max - p1.x) * inv_d);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return false;
        }
    }

    if d.y.abs() < f32::EPSILON {
        if p1.y < b.y_min || b.y_max < p1.y {
            return false;
        }
    } else {
        let inv_d = 1.0 / d.y;
        let (mut t1, mut t2) = ((b.y_min - p1.y) * inv_d, (b.y_max - p1.y) * inv_d);
        if t1 > t2 {
            std::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return false;
        }
    }

    t_max >= 0.0 && t_min <= 1.0
}

#[cfg(test)]
#[path = "broadphase_tests.rs"]
mod tests;
