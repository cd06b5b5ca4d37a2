//! Selection synchronization across the views of a workspace
//!
//! The [`SelectionEngine`] is the only writer of a workspace's selection set.
//! Every mutation is broadcast to the subscribed view adapters before the
//! mutating call returns, always with the complete set rather than a delta.

use std::sync::{Arc, Weak};

use ahash::AHashSet;
use tracing::debug;

use crate::settings::StyleSettings;
use crate::state::WorkspaceId;

/// Feature indices highlighted across all views of one workspace
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSet {
    indices: AHashSet<usize>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    /// Indices in ascending order
    pub fn sorted(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.indices.iter().copied().collect();
        indices.sort_unstable();
        indices
    }
}

impl FromIterator<usize> for SelectionSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self {
            indices: iter.into_iter().collect(),
        }
    }
}

/// What caused a selection notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionChange {
    /// A single index was flipped by a direct interaction
    Toggled { index: usize, selected: bool },
    /// The whole set was replaced
    Replaced,
    Cleared,
    /// Unchanged set re-sent after adapters were (re)attached
    Resync,
}

/// Everything an adapter needs to redraw, passed explicitly with each notification
#[derive(Debug, Clone, Copy)]
pub struct SelectionContext<'a> {
    pub workspace: WorkspaceId,
    pub selection: &'a SelectionSet,
    pub change: SelectionChange,
    pub settings: &'a StyleSettings,
}

/// Trait for view adapters that mirror the selection
pub trait SelectionSubscriber: Send + Sync {
    /// Called synchronously after every selection mutation
    fn on_selection_changed(&self, ctx: &SelectionContext<'_>);
}

/// Selection authority of a single workspace
pub struct SelectionEngine {
    workspace: WorkspaceId,
    selection: SelectionSet,
    /// Length of the workspace dataset; every selected index is below it
    bound: usize,
    subscribers: Vec<Weak<dyn SelectionSubscriber>>,
}

impl SelectionEngine {
    pub fn new(workspace: WorkspaceId) -> Self {
        Self {
            workspace,
            selection: SelectionSet::new(),
            bound: 0,
            subscribers: Vec::new(),
        }
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn is_selected(&self, index: usize) -> bool {
        self.selection.contains(index)
    }

    /// Flip the membership of `index`. Out-of-range indices are ignored.
    ///
    /// Returns whether the selection changed.
    pub fn toggle(&mut self, index: usize, settings: &StyleSettings) -> bool {
        if index >= self.bound {
            debug!(
                workspace = %self.workspace,
                index,
                bound = self.bound,
                "Ignoring toggle of out-of-range index"
            );
            return false;
        }

        let selected = if self.selection.indices.remove(&index) {
            false
        } else {
            self.selection.indices.insert(index);
            true
        };

        self.notify(SelectionChange::Toggled { index, selected }, settings);
        true
    }

    /// Replace the whole selection, silently dropping out-of-range indices
    pub fn set_selection(
        &mut self,
        indices: impl IntoIterator<Item = usize>,
        settings: &StyleSettings,
    ) {
        let bound = self.bound;
        let mut dropped = 0usize;
        self.selection = indices
            .into_iter()
            .filter(|&i| {
                let valid = i < bound;
                dropped += usize::from(!valid);
                valid
            })
            .collect();

        if dropped > 0 {
            debug!(
                workspace = %self.workspace,
                dropped,
                "Dropped out-of-range indices from selection"
            );
        }

        self.notify(SelectionChange::Replaced, settings);
    }

    /// Empty the selection
    pub fn clear(&mut self, settings: &StyleSettings) {
        self.selection.indices.clear();
        self.notify(SelectionChange::Cleared, settings);
    }

    /// Re-broadcast the current selection without changing it
    pub fn resync(&self, settings: &StyleSettings) {
        self.notify(SelectionChange::Resync, settings);
    }

    /// Adopt a new dataset length; the old selection no longer applies
    pub(crate) fn reset(&mut self, bound: usize, settings: &StyleSettings) {
        self.bound = bound;
        self.clear(settings);
    }

    /// Register an adapter. The engine keeps only a weak reference.
    pub fn subscribe<S: SelectionSubscriber + 'static>(&mut self, subscriber: &Arc<S>) {
        let weak: Weak<S> = Arc::downgrade(subscriber);
        self.subscribers.push(weak);
    }

    /// Drop every subscription, e.g. when the workspace's views are torn down
    pub fn detach_all(&mut self) {
        self.subscribers.clear();
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.iter().filter(|w| w.strong_count() > 0).count()
    }

    fn notify(&self, change: SelectionChange, settings: &StyleSettings) {
        let ctx = SelectionContext {
            workspace: self.workspace,
            selection: &self.selection,
            change,
            settings,
        };

        for weak in &self.subscribers {
            if let Some(subscriber) = weak.upgrade() {
                subscriber.on_selection_changed(&ctx);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(Vec<usize>, SelectionChange)>>,
    }

    impl SelectionSubscriber for Recorder {
        fn on_selection_changed(&self, ctx: &SelectionContext<'_>) {
            self.seen.lock().push((ctx.selection.sorted(), ctx.change));
        }
    }

    fn engine(bound: usize) -> SelectionEngine {
        let mut engine = SelectionEngine::new(WorkspaceId(1));
        engine.bound = bound;
        engine
    }

    #[test]
    fn test_toggle_notifies_full_set() {
        let settings = StyleSettings::default();
        let recorder = Arc::new(Recorder::default());
        let mut engine = engine(5);
        engine.subscribe(&recorder);

        assert!(engine.toggle(1, &settings));
        assert!(engine.toggle(3, &settings));
        assert!(engine.toggle(1, &settings));

        let seen = recorder.seen.lock();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1], (vec![1, 3], SelectionChange::Toggled { index: 3, selected: true }));
        assert_eq!(seen[2], (vec![3], SelectionChange::Toggled { index: 1, selected: false }));
    }

    #[test]
    fn test_out_of_range_toggle_is_silent() {
        let settings = StyleSettings::default();
        let recorder = Arc::new(Recorder::default());
        let mut engine = engine(2);
        engine.subscribe(&recorder);

        assert!(!engine.toggle(2, &settings));
        assert!(engine.selection().is_empty());
        assert!(recorder.seen.lock().is_empty());
    }

    #[test]
    fn test_set_selection_drops_invalid_indices() {
        let settings = StyleSettings::default();
        let mut engine = engine(4);
        engine.set_selection([0, 3, 4, 99], &settings);

        assert_eq!(engine.selection().sorted(), vec![0, 3]);
        assert!(engine.is_selected(3));
        assert!(!engine.is_selected(4));
    }

    #[test]
    fn test_reset_clears_and_rebounds() {
        let settings = StyleSettings::default();
        let recorder = Arc::new(Recorder::default());
        let mut engine = engine(4);
        engine.subscribe(&recorder);
        engine.set_selection([1, 2], &settings);

        engine.reset(10, &settings);
        assert!(engine.selection().is_empty());
        assert_eq!(recorder.seen.lock().last().map(|s| s.1), Some(SelectionChange::Cleared));
        assert!(engine.toggle(9, &settings));
    }

    #[test]
    fn test_dropped_subscriber_is_skipped() {
        let settings = StyleSettings::default();
        let mut engine = engine(3);
        let recorder = Arc::new(Recorder::default());
        engine.subscribe(&recorder);
        assert_eq!(engine.subscriber_count(), 1);

        drop(recorder);
        assert_eq!(engine.subscriber_count(), 0);
        assert!(engine.toggle(0, &settings));
    }

    #[test]
    fn test_detach_all() {
        let settings = StyleSettings::default();
        let recorder = Arc::new(Recorder::default());
        let mut engine = engine(3);
        engine.subscribe(&recorder);
        engine.detach_all();

        engine.toggle(0, &settings);
        assert!(recorder.seen.lock().is_empty());
    }

    proptest! {
        #[test]
        fn toggle_twice_restores_selection(
            initial in proptest::collection::vec(0usize..20, 0..10),
            index in 0usize..25,
        ) {
            let settings = StyleSettings::default();
            let mut engine = engine(20);
            engine.set_selection(initial, &settings);
            let before = engine.selection().clone();

            engine.toggle(index, &settings);
            engine.toggle(index, &settings);
            prop_assert_eq!(engine.selection(), &before);
        }

        #[test]
        fn set_selection_is_immediately_visible(
            indices in proptest::collection::hash_set(0usize..30, 0..15),
        ) {
            let settings = StyleSettings::default();
            let mut engine = engine(30);
            engine.set_selection(indices.iter().copied(), &settings);
            for i in 0..30 {
                prop_assert_eq!(engine.is_selected(i), indices.contains(&i));
            }
        }
    }
}
