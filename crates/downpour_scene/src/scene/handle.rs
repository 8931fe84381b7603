//! Generational node handles and the slot allocator behind them
//!
//! A [`NodeHandle`] pairs a slot index with the generation the slot had when
//! the handle was issued. Freeing a slot bumps its generation, so every handle
//! issued before the free stays detectably stale, even after the slot is
//! reused for an unrelated node.

use std::fmt;

/// Stable reference to a scene node (slot index + generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle {
    index: u32,
    generation: u32,
}

impl NodeHandle {
    /// Index value reserved for "no node"
    pub const INVALID_INDEX: u32 = u32::MAX;

    /// The canonical "no node" handle
    pub const INVALID: Self = Self {
        index: Self::INVALID_INDEX,
        generation: 0,
    };

    /// Create a handle from raw parts
    pub const fn new(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// Slot index this handle points at
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation of the slot when this handle was issued
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// True unless this is the [`NodeHandle::INVALID`] sentinel
    ///
    /// This does not check liveness; only the owning `Scene` can do that.
    pub const fn is_valid(&self) -> bool {
        self.index != Self::INVALID_INDEX
    }
}

impl Default for NodeHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "#{}v{}", self.index, self.generation)
        } else {
            write!(f, "#invalid")
        }
    }
}

/// Index allocator with per-slot generations and a LIFO free list
#[derive(Debug, Clone)]
pub struct SlotAllocator {
    generations: Vec<u32>,
    occupied: Vec<bool>,
    free_list: Vec<u32>,
    slot_limit: u32,
}

impl Default for SlotAllocator {
    fn default() -> Self {
        Self {
            generations: Vec::new(),
            occupied: Vec::new(),
            free_list: Vec::new(),
            slot_limit: NodeHandle::INVALID_INDEX,
        }
    }
}

impl SlotAllocator {
    /// Create an empty allocator
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an allocator that never hands out more than `limit` slots
    ///
    /// The limit is capped below [`NodeHandle::INVALID_INDEX`].
    pub fn with_slot_limit(limit: u32) -> Self {
        Self {
            slot_limit: limit.min(NodeHandle::INVALID_INDEX),
            ..Self::default()
        }
    }

    /// Allocate a slot, reusing the most recently freed index first
    ///
    /// The returned handle carries the slot's current generation. When every
    /// slot up to the limit is live, returns [`NodeHandle::INVALID`].
    pub fn allocate(&mut self) -> NodeHandle {
        if let Some(index) = self.free_list.pop() {
            let slot = index as usize;
            self.occupied[slot] = true;
            return NodeHandle::new(index, self.generations[slot]);
        }

        let Some(index) = u32::try_from(self.generations.len())
            .ok()
            .filter(|&i| i < self.slot_limit)
        else {
            return NodeHandle::INVALID;
        };
        self.generations.push(0);
        self.occupied.push(true);
        NodeHandle::new(index, 0)
    }

    /// Free a slot, invalidating every handle previously issued for it
    ///
    /// Returns false (and changes nothing) if the index is out of range or
    /// already free.
    pub fn free(&mut self, index: u32) -> bool {
        let slot = index as usize;
        if slot >= self.generations.len() || !self.occupied[slot] {
            return false;
        }

        self.generations[slot] = self.generations[slot].wrapping_add(1);
        self.occupied[slot] = false;
        self.free_list.push(index);
        true
    }

    /// Check whether a handle refers to a currently live slot
    pub fn is_valid(&self, handle: NodeHandle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        let slot = handle.index() as usize;
        slot < self.generations.len()
            && self.occupied[slot]
            && self.generations[slot] == handle.generation()
    }

    /// Current generation of a slot, if the index is in range
    pub fn generation(&self, index: u32) -> Option<u32> {
        self.generations.get(index as usize).copied()
    }

    /// Number of slots ever allocated (live + free)
    pub fn len(&self) -> usize {
        self.generations.len()
    }

    /// True if no slot was ever allocated
    pub fn is_empty(&self) -> bool {
        self.generations.is_empty()
    }

    /// Number of slots currently on the free list
    pub fn free_count(&self) -> usize {
        self.free_list.len()
    }

    /// Number of live slots
    pub fn live_count(&self) -> usize {
        self.len() - self.free_count()
    }

    /// Forget every slot and generation
    pub fn clear(&mut self) {
        self.generations.clear();
        self.occupied.clear();
        self.free_list.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_handle_is_default() {
        assert_eq!(NodeHandle::default(), NodeHandle::INVALID);
        assert!(!NodeHandle::INVALID.is_valid());
        assert!(NodeHandle::new(0, 0).is_valid());
    }

    #[test]
    fn test_allocate_appends_fresh_slots() {
        let mut slots = SlotAllocator::new();
        let a = slots.allocate();
        let b = slots.allocate();

        assert_eq!(a, NodeHandle::new(0, 0));
        assert_eq!(b, NodeHandle::new(1, 0));
        assert_eq!(slots.live_count(), 2);
    }

    #[test]
    fn test_free_bumps_generation_and_reuses_lifo() {
        let mut slots = SlotAllocator::new();
        let a = slots.allocate();
        let b = slots.allocate();

        assert!(slots.free(a.index()));
        assert!(slots.free(b.index()));
        assert!(!slots.is_valid(a));
        assert!(!slots.is_valid(b));

        // Last freed comes back first
        let reused = slots.allocate();
        assert_eq!(reused, NodeHandle::new(1, 1));
        assert!(slots.is_valid(reused));
        assert!(!slots.is_valid(b));
    }

    #[test]
    fn test_double_free_is_ignored() {
        let mut slots = SlotAllocator::new();
        let a = slots.allocate();

        assert!(slots.free(a.index()));
        assert!(!slots.free(a.index()));
        assert_eq!(slots.generation(a.index()), Some(1));
        assert_eq!(slots.free_count(), 1);
        assert!(!slots.free(42));
    }

    #[test]
    fn test_out_of_range_handle_is_invalid() {
        let slots = SlotAllocator::new();
        assert!(!slots.is_valid(NodeHandle::new(3, 0)));
        assert!(!slots.is_valid(NodeHandle::INVALID));
    }

    #[test]
    fn test_exhausted_allocator_returns_invalid() {
        let mut slots = SlotAllocator::with_slot_limit(2);
        let a = slots.allocate();
        slots.allocate();

        assert_eq!(slots.allocate(), NodeHandle::INVALID);
        assert_eq!(slots.len(), 2);

        // Freed slots are still reusable at the limit
        assert!(slots.free(a.index()));
        assert_eq!(slots.allocate(), NodeHandle::new(0, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(NodeHandle::new(3, 2).to_string(), "#3v2");
        assert_eq!(NodeHandle::INVALID.to_string(), "#invalid");
    }
}
