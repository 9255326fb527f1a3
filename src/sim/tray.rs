//! Collection tray: fixed slots, match detection, clears and returns
//!
//! Matching uses the occurrence-count policy: every kind with at least
//! `threshold` occurrences anywhere in the tray matches, adjacency not
//! required, and all matching groups clear together. The scan is a stable
//! left-to-right pass so identical contents always produce identical groups.

use super::item::ItemKind;
use crate::scene::Node;

/// What a filled slot holds: the item's kind plus the retained original
/// visual, exclusively owned by the slot until cleared or returned
#[derive(Debug)]
pub struct SlotContent {
    pub kind: ItemKind,
    pub visual: Node,
}

/// A group of slots holding the same kind, due to be cleared together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub kind: ItemKind,
    pub slots: Vec<usize>,
}

/// Fixed-size ordered tray of collection slots
pub struct CollectionTray {
    slots: Vec<Option<SlotContent>>,
    threshold: usize,
}

impl CollectionTray {
    pub fn new(size: usize, threshold: usize) -> Self {
        Self {
            slots: (0..size).map(|_| None).collect(),
            threshold,
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn empty_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    pub fn filled_count(&self) -> usize {
        self.slots.len() - self.empty_count()
    }

    pub fn is_full(&self) -> bool {
        self.empty_count() == 0
    }

    pub fn kind_at(&self, index: usize) -> Option<ItemKind> {
        self.slots.get(index)?.as_ref().map(|content| content.kind)
    }

    /// Fill the first empty slot, scanning left to right. On a full tray the
    /// content comes back to the caller, which must re-insert the item into
    /// the simulation rather than drop it.
    pub fn place(&mut self, kind: ItemKind, visual: Node) -> Result<usize, SlotContent> {
        match self.slots.iter().position(|slot| slot.is_none()) {
            Some(index) => {
                self.slots[index] = Some(SlotContent { kind, visual });
                Ok(index)
            }
            None => Err(SlotContent { kind, visual }),
        }
    }

    /// Every kind with at least `threshold` occurrences, groups in
    /// first-occurrence order, slot indices ascending
    pub fn check_matches(&self) -> Vec<MatchGroup> {
        let mut occurrences: Vec<(ItemKind, Vec<usize>)> = Vec::new();
        for (index, slot) in self.slots.iter().enumerate() {
            let Some(content) = slot else { continue };
            match occurrences.iter_mut().find(|(kind, _)| *kind == content.kind) {
                Some((_, positions)) => positions.push(index),
                None => occurrences.push((content.kind, vec![index])),
            }
        }
        occurrences
            .into_iter()
            .filter(|(_, positions)| positions.len() >= self.threshold)
            .map(|(kind, slots)| MatchGroup { kind, slots })
            .collect()
    }

    /// Empty the slots of a match group, releasing their visuals
    pub fn clear(&mut self, group: &MatchGroup) -> Vec<Node> {
        let mut released = Vec::with_capacity(group.slots.len());
        for &index in &group.slots {
            if let Some(content) = self.slots.get_mut(index).and_then(Option::take) {
                released.push(content.visual);
            }
        }
        released
    }

    /// Empty one slot, handing back its content for return-to-bowl
    pub fn take(&mut self, index: usize) -> Option<SlotContent> {
        self.slots.get_mut(index)?.take()
    }

    /// Empty every slot (restart/teardown)
    pub fn clear_all(&mut self) -> Vec<Node> {
        self.slots
            .iter_mut()
            .filter_map(Option::take)
            .map(|content| content.visual)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use proptest::prelude::*;

    fn visual() -> Node {
        Node::new(Vec3::ZERO, 0.3)
    }

    fn tray_with(kinds: &[Option<ItemKind>], threshold: usize) -> CollectionTray {
        let mut tray = CollectionTray::new(kinds.len(), threshold);
        for (index, kind) in kinds.iter().enumerate() {
            if let Some(kind) = kind {
                tray.slots[index] = Some(SlotContent {
                    kind: *kind,
                    visual: visual(),
                });
            }
        }
        tray
    }

    #[test]
    fn test_place_fills_first_empty_slot() {
        let mut tray = CollectionTray::new(5, 3);
        let before = tray.empty_count();
        let index = tray.place(ItemKind::Apple, visual()).unwrap();
        assert_eq!(index, 0);
        assert_eq!(tray.kind_at(0), Some(ItemKind::Apple));
        assert_eq!(tray.empty_count(), before - 1);

        tray.take(0);
        tray.place(ItemKind::Tomato, visual()).unwrap();
        tray.place(ItemKind::Apple, visual()).unwrap();
        assert_eq!(tray.kind_at(0), Some(ItemKind::Tomato));
        assert_eq!(tray.kind_at(1), Some(ItemKind::Apple));
    }

    #[test]
    fn test_full_tray_returns_content() {
        let mut tray = CollectionTray::new(2, 3);
        tray.place(ItemKind::Apple, visual()).unwrap();
        tray.place(ItemKind::Apple, visual()).unwrap();
        let rejected = tray.place(ItemKind::Tomato, visual()).unwrap_err();
        assert_eq!(rejected.kind, ItemKind::Tomato);
        assert_eq!(tray.filled_count(), 2);
    }

    #[test]
    fn test_three_adjacent_apples_match() {
        let mut tray = CollectionTray::new(5, 3);
        for _ in 0..3 {
            tray.place(ItemKind::Apple, visual()).unwrap();
        }
        let groups = tray.check_matches();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, ItemKind::Apple);
        assert_eq!(groups[0].slots, vec![0, 1, 2]);

        let released = tray.clear(&groups[0]);
        assert_eq!(released.len(), 3);
        assert_eq!(tray.empty_count(), 5);
        for index in 0..3 {
            assert_eq!(tray.kind_at(index), None);
        }
    }

    #[test]
    fn test_scattered_occurrences_match() {
        // Occurrence counting does not require adjacency
        let tray = tray_with(
            &[
                Some(ItemKind::Apple),
                Some(ItemKind::Tomato),
                Some(ItemKind::Apple),
                Some(ItemKind::Tomato),
                Some(ItemKind::Apple),
            ],
            3,
        );
        let groups = tray.check_matches();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].kind, ItemKind::Apple);
        assert_eq!(groups[0].slots, vec![0, 2, 4]);
    }

    #[test]
    fn test_two_kinds_clear_together() {
        let tray = tray_with(
            &[
                Some(ItemKind::Apple),
                Some(ItemKind::Tomato),
                Some(ItemKind::Apple),
                Some(ItemKind::Tomato),
                Some(ItemKind::Apple),
                Some(ItemKind::Tomato),
            ],
            3,
        );
        let groups = tray.check_matches();
        assert_eq!(groups.len(), 2);
        // First-occurrence order: apple was placed at slot 0
        assert_eq!(groups[0].kind, ItemKind::Apple);
        assert_eq!(groups[1].kind, ItemKind::Tomato);
    }

    #[test]
    fn test_below_threshold_is_quiet() {
        let tray = tray_with(&[Some(ItemKind::Apple), Some(ItemKind::Apple), None], 3);
        assert!(tray.check_matches().is_empty());
    }

    #[test]
    fn test_take_empties_one_slot() {
        let mut tray = CollectionTray::new(5, 3);
        tray.place(ItemKind::Watermelon, visual()).unwrap();
        let content = tray.take(0).unwrap();
        assert_eq!(content.kind, ItemKind::Watermelon);
        assert_eq!(tray.empty_count(), 5);
        assert!(tray.take(0).is_none());
    }

    fn kind_from(raw: u8) -> Option<ItemKind> {
        match raw {
            0 => Some(ItemKind::Apple),
            1 => Some(ItemKind::Pineapple),
            2 => Some(ItemKind::Tomato),
            3 => Some(ItemKind::Watermelon),
            _ => None,
        }
    }

    proptest! {
        #[test]
        fn prop_check_matches_deterministic(raw in proptest::collection::vec(0u8..5, 1..9)) {
            let kinds: Vec<Option<ItemKind>> = raw.iter().map(|&r| kind_from(r)).collect();
            let tray = tray_with(&kinds, 3);
            prop_assert_eq!(tray.check_matches(), tray.check_matches());
        }

        #[test]
        fn prop_groups_meet_threshold_and_are_disjoint(
            raw in proptest::collection::vec(0u8..5, 1..9)
        ) {
            let kinds: Vec<Option<ItemKind>> = raw.iter().map(|&r| kind_from(r)).collect();
            let tray = tray_with(&kinds, 3);
            let groups = tray.check_matches();
            let mut seen = std::collections::HashSet::new();
            for group in &groups {
                prop_assert!(group.slots.len() >= 3);
                for &slot in &group.slots {
                    prop_assert_eq!(tray.kind_at(slot), Some(group.kind));
                    prop_assert!(seen.insert(slot), "groups must be disjoint");
                }
            }
        }

        #[test]
        fn prop_place_decrements_empty_by_one(raw in proptest::collection::vec(0u8..4, 0..7)) {
            let kinds: Vec<Option<ItemKind>> = raw.iter().map(|&r| kind_from(r)).collect();
            let mut tray = tray_with(&kinds, 3);
            let before = tray.empty_count();
            match tray.place(ItemKind::Apple, Node::new(glam::Vec3::ZERO, 0.3)) {
                Ok(index) => {
                    prop_assert_eq!(tray.empty_count(), before - 1);
                    prop_assert_eq!(tray.kind_at(index), Some(ItemKind::Apple));
                }
                Err(_) => prop_assert_eq!(before, 0),
            }
        }
    }
}
