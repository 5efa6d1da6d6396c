//! Sorted in-memory interaction list.
//!
//! The editor's single source of truth. Always ordered by `trigger_time`;
//! equal times keep insertion order so re-sorting after a drag never shuffles
//! siblings that did not move.

use super::interaction::{Interaction, InteractionId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionList {
    items: Vec<Interaction>,
}

impl InteractionList {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build from whatever order the read path delivered.
    pub fn from_unsorted(items: Vec<Interaction>) -> Self {
        let mut list = Self { items };
        list.resort();
        list
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Interaction> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Interaction] {
        &self.items
    }

    /// Insert keeping sort order. Returns the index it landed at
    /// (after all existing items with the same trigger time).
    pub fn insert_sorted(&mut self, interaction: Interaction) -> usize {
        let idx = self
            .items
            .partition_point(|i| i.trigger_time <= interaction.trigger_time);
        self.items.insert(idx, interaction);
        idx
    }

    pub fn position(&self, id: &InteractionId) -> Option<usize> {
        self.items.iter().position(|i| i.id.as_ref() == Some(id))
    }

    pub fn get(&self, id: &InteractionId) -> Option<&Interaction> {
        self.items.iter().find(|i| i.id.as_ref() == Some(id))
    }

    pub fn get_mut(&mut self, id: &InteractionId) -> Option<&mut Interaction> {
        self.items.iter_mut().find(|i| i.id.as_ref() == Some(id))
    }

    pub fn contains(&self, id: &InteractionId) -> bool {
        self.position(id).is_some()
    }

    /// Replace the item with the same id and re-sort. Returns false if absent.
    pub fn replace(&mut self, interaction: Interaction) -> bool {
        let Some(id) = interaction.id.clone() else {
            return false;
        };
        match self.get_mut(&id) {
            Some(slot) => {
                *slot = interaction;
                self.resort();
                true
            }
            None => false,
        }
    }

    /// Remove by id, returning the original index and the item.
    pub fn remove(&mut self, id: &InteractionId) -> Option<(usize, Interaction)> {
        let idx = self.position(id)?;
        Some((idx, self.items.remove(idx)))
    }

    /// Put a removed item back where it was. The index is clamped, then
    /// the list is re-sorted in case neighbours moved in the meantime.
    pub fn reinsert_at(&mut self, index: usize, interaction: Interaction) {
        let idx = index.min(self.items.len());
        self.items.insert(idx, interaction);
        self.resort();
    }

    /// Stable sort by trigger time.
    pub fn resort(&mut self) {
        self.items
            .sort_by(|a, b| a.trigger_time.total_cmp(&b.trigger_time));
    }

    /// Interactions that should be on screen at `t` (enabled only).
    pub fn active_at(&self, t: f64) -> impl Iterator<Item = &Interaction> {
        self.items.iter().filter(move |i| i.is_visible_at(t))
    }

    /// Interactions whose trigger time lies in `[start, end]`.
    pub fn in_range(&self, start: f64, end: f64) -> impl Iterator<Item = &Interaction> {
        self.items
            .iter()
            .filter(move |i| i.trigger_time >= start && i.trigger_time <= end)
    }

    /// Ids in list order (persisted items only).
    pub fn ids(&self) -> Vec<InteractionId> {
        self.items.iter().filter_map(|i| i.id.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::interaction::{InteractionConfig, InteractionKind};

    fn tip(id: &str, t: f64) -> Interaction {
        let mut i = Interaction::draft(InteractionConfig::default_for(InteractionKind::Tip), t, id);
        i.id = Some(id.into());
        i
    }

    #[test]
    fn test_from_unsorted_orders_by_time() {
        let list = InteractionList::from_unsorted(vec![tip("c", 90.0), tip("a", 10.0), tip("b", 45.0)]);
        let ids: Vec<_> = list.ids().into_iter().map(|i| i.0).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_insert_sorted_after_equal_times() {
        let mut list = InteractionList::from_unsorted(vec![tip("a", 10.0), tip("b", 30.0), tip("c", 60.0)]);
        let idx = list.insert_sorted(tip("d", 30.0));
        assert_eq!(idx, 2);
        assert_eq!(list.as_slice()[1].title, "b");
        assert_eq!(list.as_slice()[2].title, "d");
    }

    #[test]
    fn test_remove_and_reinsert_restores_position() {
        let mut list = InteractionList::from_unsorted(vec![tip("a", 10.0), tip("b", 30.0), tip("c", 60.0)]);
        let (idx, item) = list.remove(&"b".into()).unwrap();
        assert_eq!(idx, 1);
        assert_eq!(list.len(), 2);
        list.reinsert_at(idx, item);
        let ids: Vec<_> = list.ids().into_iter().map(|i| i.0).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_replace_resorts() {
        let mut list = InteractionList::from_unsorted(vec![tip("a", 10.0), tip("b", 30.0)]);
        let mut moved = list.get(&"a".into()).unwrap().clone();
        moved.trigger_time = 40.0;
        assert!(list.replace(moved));
        assert_eq!(list.as_slice()[1].title, "a");
        assert!(!list.replace(tip("zz", 1.0)));
    }

    #[test]
    fn test_active_excludes_disabled() {
        let mut list = InteractionList::from_unsorted(vec![tip("a", 10.0), tip("b", 20.0)]);
        list.get_mut(&"b".into()).unwrap().enabled = false;
        let active: Vec<_> = list.active_at(25.0).map(|i| i.title.clone()).collect();
        assert_eq!(active, vec!["a"]);
        assert_eq!(list.len(), 2);
    }
}
