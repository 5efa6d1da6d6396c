//! Optimistic sync pipeline.
//!
//! Every mutation is applied to the caller's [`InteractionList`] first, then a
//! store call is queued on the [`JobRunner`]. Completions come back over a
//! crossbeam channel and are applied on the UI thread by [`SyncPipeline::poll`].
//!
//! # Per-operation contract
//!
//! | Op      | Local effect          | On failure                         |
//! |---------|-----------------------|------------------------------------|
//! | create  | none until stored     | draft dropped                      |
//! | update  | replace immediately   | pre-mutation snapshot restored     |
//! | toggle  | flip `enabled`        | flipped back                       |
//! | move    | every drag sample     | optimistic position kept           |
//! | delete  | removed immediately   | re-inserted at its old index       |
//!
//! Moves are debounced per id ([`DebouncedWriter`]), so a drag produces one
//! PATCH carrying the final time.
//!
//! # Revisions
//!
//! Each dispatched write for an id gets a fresh revision. A completion older
//! than the newest revision dispatched for its id is stale: it neither
//! reconciles nor rolls back. Last write wins.
//!
//! # Ordering
//!
//! The runner may be a multi-thread pool, so writes for one id are sent one at
//! a time: while a call for an id is on the wire, later calls for it wait in a
//! per-id FIFO and are released by `poll` once the earlier completion has been
//! applied. The store therefore sees writes in the order they were made.

use crate::core::debounced_writer::{DEFAULT_DEBOUNCE_MS, DebouncedWriter};
use crate::core::workers::JobRunner;
use crate::entities::{Interaction, InteractionId, InteractionList, InteractionPatch};
use crate::sync::store::{InteractionStore, StoreError};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, trace, warn};
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

/// Kind of persistence call, for notifications and events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncOp {
    Load,
    Create,
    Update,
    Toggle,
    Move,
    Delete,
}

impl SyncOp {
    pub fn verb(&self) -> &'static str {
        match self {
            SyncOp::Load => "load interactions",
            SyncOp::Create => "create interaction",
            SyncOp::Update => "save interaction",
            SyncOp::Toggle => "toggle interaction",
            SyncOp::Move => "move interaction",
            SyncOp::Delete => "delete interaction",
        }
    }
}

/// What to do locally if the call fails.
#[derive(Debug, Clone)]
enum Rollback {
    None,
    Restore(Interaction),
    Enabled(bool),
    Reinsert { index: usize, item: Interaction },
}

#[derive(Debug)]
enum Payload {
    Loaded(Vec<Interaction>),
    Stored(Interaction),
    Deleted(InteractionId),
}

/// Worker -> UI thread message.
#[derive(Debug)]
struct Completion {
    op: SyncOp,
    id: Option<InteractionId>,
    draft_key: Option<Uuid>,
    revision: u64,
    rollback: Rollback,
    result: Result<Payload, StoreError>,
}

type StoreCallFn = Box<dyn FnOnce(&dyn InteractionStore) -> Result<Payload, StoreError> + Send>;

/// A call waiting for an earlier write on the same id to complete.
struct QueuedCall {
    op: SyncOp,
    id: Option<InteractionId>,
    draft_key: Option<Uuid>,
    revision: u64,
    rollback: Rollback,
    call: StoreCallFn,
}

/// Result of applying one completion, reported to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    Loaded { count: usize },
    Created { draft_key: Uuid, id: InteractionId, index: usize },
    Saved { op: SyncOp, id: InteractionId },
    Deleted { id: InteractionId },
    Failed {
        op: SyncOp,
        id: Option<InteractionId>,
        error: StoreError,
        rolled_back: bool,
    },
    /// Superseded by a newer write for the same id; ignored.
    Stale { op: SyncOp, id: InteractionId },
}

impl SyncOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SyncOutcome::Failed { .. })
    }
}

pub struct SyncPipeline {
    store: Arc<dyn InteractionStore>,
    runner: Arc<dyn JobRunner>,
    tx: Sender<Completion>,
    rx: Receiver<Completion>,
    moves: DebouncedWriter<InteractionId, f64>,
    /// Newest revision dispatched per id
    revisions: HashMap<InteractionId, u64>,
    next_revision: u64,
    /// Ids with a call on the wire
    busy: HashSet<InteractionId>,
    /// Calls held behind the busy one, per id
    queued: HashMap<InteractionId, VecDeque<QueuedCall>>,
    in_flight: usize,
}

impl SyncPipeline {
    pub fn new(store: Arc<dyn InteractionStore>, runner: Arc<dyn JobRunner>) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self {
            store,
            runner,
            tx,
            rx,
            moves: DebouncedWriter::new(DEFAULT_DEBOUNCE_MS),
            revisions: HashMap::new(),
            next_revision: 0,
            busy: HashSet::new(),
            queued: HashMap::new(),
            in_flight: 0,
        }
    }

    pub fn with_debounce(mut self, delay_ms: u64) -> Self {
        self.moves.set_delay(delay_ms);
        self
    }

    pub fn set_debounce_ms(&mut self, delay_ms: u64) {
        self.moves.set_delay(delay_ms);
    }

    pub fn debounce_ms(&self) -> u64 {
        self.moves.delay_ms()
    }

    /// Calls dispatched but not yet applied by `poll`, including ones held
    /// behind an earlier write for the same id.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn has_pending_moves(&self) -> bool {
        !self.moves.is_empty()
    }

    pub fn is_move_pending(&self, id: &InteractionId) -> bool {
        self.moves.is_pending(id)
    }

    pub fn next_move_deadline(&self) -> Option<Instant> {
        self.moves.next_deadline()
    }

    /// Nothing queued, nothing on the wire.
    pub fn is_idle(&self) -> bool {
        self.in_flight == 0 && self.moves.is_empty()
    }

    fn bump_revision(&mut self, id: &InteractionId) -> u64 {
        self.next_revision += 1;
        self.revisions.insert(id.clone(), self.next_revision);
        self.next_revision
    }

    fn is_stale(&self, id: &InteractionId, revision: u64) -> bool {
        self.revisions.get(id).is_some_and(|newest| revision < *newest)
    }

    /// Queue a store call. `call` runs on the runner; its result is sent back.
    /// If a call for the same id is still on the wire this one waits for it.
    fn dispatch<F>(
        &mut self,
        op: SyncOp,
        id: Option<InteractionId>,
        draft_key: Option<Uuid>,
        rollback: Rollback,
        call: F,
    ) where
        F: FnOnce(&dyn InteractionStore) -> Result<Payload, StoreError> + Send + 'static,
    {
        let revision = match &id {
            Some(id) => self.bump_revision(id),
            None => 0,
        };
        debug!("Dispatch {:?} {:?} rev {}", op, id, revision);
        self.in_flight += 1;

        let queued = QueuedCall {
            op,
            id,
            draft_key,
            revision,
            rollback,
            call: Box::new(call),
        };
        if let Some(id) = queued.id.clone() {
            if self.busy.contains(&id) {
                trace!("{:?} for {} held behind an earlier write", op, id);
                self.queued.entry(id).or_default().push_back(queued);
                return;
            }
            self.busy.insert(id);
        }
        self.submit(queued);
    }

    fn submit(&self, queued: QueuedCall) {
        let QueuedCall {
            op,
            id,
            draft_key,
            revision,
            rollback,
            call,
        } = queued;
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        self.runner.run(Box::new(move || {
            let result = call(store.as_ref());
            let completion = Completion {
                op,
                id,
                draft_key,
                revision,
                rollback,
                result,
            };
            if tx.send(completion).is_err() {
                trace!("Pipeline dropped before {:?} completed", op);
            }
        }));
    }

    // ===== Operations =====

    /// Fetch the initial list. The list is replaced when the result is polled.
    pub fn load(&mut self) {
        self.dispatch(SyncOp::Load, None, None, Rollback::None, |store| {
            store.list().map(Payload::Loaded)
        });
    }

    /// Persist a draft. Nothing is added locally until the store returns the
    /// record with its id. Returns the key the outcome is reported under.
    pub fn create(&mut self, mut draft: Interaction) -> Uuid {
        draft.id = None;
        let key = Uuid::new_v4();
        self.dispatch(SyncOp::Create, None, Some(key), Rollback::None, move |store| {
            store.create(&draft).map(Payload::Stored)
        });
        key
    }

    /// Replace a persisted interaction locally and PUT it.
    /// Returns false if it is not in the list.
    pub fn update(&mut self, list: &mut InteractionList, interaction: Interaction) -> bool {
        let Some(id) = interaction.id.clone() else {
            return false;
        };
        let Some(before) = list.get(&id).cloned() else {
            return false;
        };
        // A full save supersedes any queued move for the same item
        self.moves.cancel(&id);
        list.replace(interaction.clone());

        let call_id = id.clone();
        self.dispatch(
            SyncOp::Update,
            Some(id),
            None,
            Rollback::Restore(before),
            move |store| store.update(&call_id, &interaction).map(Payload::Stored),
        );
        true
    }

    /// Flip `enabled` locally and PATCH it. Returns the new value.
    pub fn toggle_enabled(&mut self, list: &mut InteractionList, id: &InteractionId) -> Option<bool> {
        let item = list.get_mut(id)?;
        let previous = item.enabled;
        item.enabled = !previous;
        let enabled = item.enabled;

        let call_id = id.clone();
        self.dispatch(
            SyncOp::Toggle,
            Some(id.clone()),
            None,
            Rollback::Enabled(previous),
            move |store| {
                store
                    .patch(&call_id, &InteractionPatch::enabled(enabled))
                    .map(Payload::Stored)
            },
        );
        Some(enabled)
    }

    /// One drag sample: move locally now, persist after the quiet period.
    pub fn move_local(
        &mut self,
        list: &mut InteractionList,
        id: &InteractionId,
        time: f64,
        now: Instant,
    ) -> bool {
        let Some(item) = list.get_mut(id) else {
            return false;
        };
        item.trigger_time = time;
        list.resort();
        self.moves.schedule(id.clone(), time, now);
        true
    }

    /// Send moves whose debounce window has elapsed at `now`.
    pub fn tick(&mut self, now: Instant) -> usize {
        let due = self.moves.due(now);
        let n = due.len();
        for (id, time) in due {
            self.dispatch_move(id, time);
        }
        n
    }

    /// Send every pending move immediately (shutdown, tests).
    pub fn flush_moves(&mut self) -> usize {
        let due = self.moves.flush();
        let n = due.len();
        for (id, time) in due {
            self.dispatch_move(id, time);
        }
        n
    }

    fn dispatch_move(&mut self, id: InteractionId, time: f64) {
        let call_id = id.clone();
        self.dispatch(SyncOp::Move, Some(id), None, Rollback::None, move |store| {
            store
                .patch(&call_id, &InteractionPatch::trigger_time(time))
                .map(Payload::Stored)
        });
    }

    /// Remove locally and DELETE. Any queued move for the id is dropped.
    /// Confirmation is the caller's job.
    pub fn delete(&mut self, list: &mut InteractionList, id: &InteractionId) -> bool {
        let Some((index, item)) = list.remove(id) else {
            return false;
        };
        if self.moves.cancel(id).is_some() {
            debug!("Dropped pending move for deleted {}", id);
        }
        let call_id = id.clone();
        self.dispatch(
            SyncOp::Delete,
            Some(id.clone()),
            None,
            Rollback::Reinsert { index, item },
            move |store| store.delete(&call_id).map(|_| Payload::Deleted(call_id)),
        );
        true
    }

    // ===== Completions =====

    /// Apply every completion that has arrived. Call once per frame.
    pub fn poll(&mut self, list: &mut InteractionList) -> Vec<SyncOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(completion) = self.rx.try_recv() {
            self.in_flight = self.in_flight.saturating_sub(1);
            let id = completion.id.clone();
            outcomes.push(self.apply(list, completion));
            if let Some(id) = id {
                self.release(&id);
            }
        }
        outcomes
    }

    /// The call for `id` has landed: send the next held one, if any.
    fn release(&mut self, id: &InteractionId) {
        let next = self.queued.get_mut(id).and_then(|q| q.pop_front());
        match next {
            Some(next) => {
                if self.queued.get(id).is_some_and(|q| q.is_empty()) {
                    self.queued.remove(id);
                }
                trace!("Releasing held {:?} for {}", next.op, id);
                self.submit(next);
            }
            None => {
                self.busy.remove(id);
            }
        }
    }

    fn apply(&mut self, list: &mut InteractionList, c: Completion) -> SyncOutcome {
        if let Some(id) = &c.id
            && self.is_stale(id, c.revision)
        {
            debug!("Stale {:?} for {} (rev {}), ignored", c.op, id, c.revision);
            return SyncOutcome::Stale { op: c.op, id: id.clone() };
        }

        match c.result {
            Ok(payload) => self.apply_success(list, c.op, c.id, c.draft_key, payload),
            Err(error) => {
                warn!("Failed to {}: {}", c.op.verb(), error);
                let rolled_back = Self::roll_back(list, c.op, c.id.as_ref(), c.rollback);
                SyncOutcome::Failed {
                    op: c.op,
                    id: c.id,
                    error,
                    rolled_back,
                }
            }
        }
    }

    fn apply_success(
        &mut self,
        list: &mut InteractionList,
        op: SyncOp,
        id: Option<InteractionId>,
        draft_key: Option<Uuid>,
        payload: Payload,
    ) -> SyncOutcome {
        match payload {
            Payload::Loaded(items) => {
                let count = items.len();
                *list = InteractionList::from_unsorted(items);
                self.revisions.clear();
                SyncOutcome::Loaded { count }
            }
            Payload::Stored(record) => {
                let Some(stored_id) = record.id.clone() else {
                    return SyncOutcome::Failed {
                        op,
                        id,
                        error: StoreError::Decode("stored interaction has no id".into()),
                        rolled_back: false,
                    };
                };
                if op == SyncOp::Create {
                    let index = list.insert_sorted(record);
                    debug!("Created {} at index {}", stored_id, index);
                    return SyncOutcome::Created {
                        draft_key: draft_key.unwrap_or_else(Uuid::nil),
                        id: stored_id,
                        index,
                    };
                }
                self.reconcile(list, record);
                SyncOutcome::Saved { op, id: stored_id }
            }
            Payload::Deleted(id) => {
                self.revisions.remove(&id);
                SyncOutcome::Deleted { id }
            }
        }
    }

    /// Adopt the server's record, keeping a local position that is still
    /// waiting to be sent.
    fn reconcile(&self, list: &mut InteractionList, mut record: Interaction) {
        let Some(id) = record.id.clone() else { return };
        let Some(local) = list.get(&id) else {
            debug!("Late completion for {} which is gone, ignored", id);
            return;
        };
        if self.moves.is_pending(&id) {
            record.trigger_time = local.trigger_time;
        }
        list.replace(record);
    }

    /// Undo the optimistic change for a failed call. Returns true if local
    /// state was changed back.
    fn roll_back(
        list: &mut InteractionList,
        op: SyncOp,
        id: Option<&InteractionId>,
        rollback: Rollback,
    ) -> bool {
        match rollback {
            Rollback::None => false,
            Rollback::Restore(before) => list.replace(before),
            Rollback::Enabled(previous) => match id.and_then(|id| list.get_mut(id)) {
                Some(item) => {
                    item.enabled = previous;
                    true
                }
                None => false,
            },
            Rollback::Reinsert { index, item } => {
                if id.is_some_and(|id| list.contains(id)) {
                    return false;
                }
                debug!("Restoring {:?} at index {} after failed {:?}", id, index, op);
                list.reinsert_at(index, item);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::workers::InlineRunner;
    use crate::entities::{InteractionConfig, InteractionKind, PollConfig};
    use crate::sync::store::{MemoryStore, StoreCall};
    use std::time::Duration;

    fn tip(title: &str, t: f64) -> Interaction {
        Interaction::draft(InteractionConfig::default_for(InteractionKind::Tip), t, title)
    }

    fn setup(items: Vec<Interaction>) -> (Arc<MemoryStore>, SyncPipeline, InteractionList) {
        let store = Arc::new(MemoryStore::with_items(items));
        let mut pipeline = SyncPipeline::new(store.clone(), Arc::new(InlineRunner));
        let mut list = InteractionList::new();
        pipeline.load();
        pipeline.poll(&mut list);
        store.clear_calls();
        (store, pipeline, list)
    }

    fn id(s: &str) -> InteractionId {
        s.into()
    }

    #[test]
    fn test_load_sorts() {
        let (_, _, list) = setup(vec![tip("late", 90.0), tip("early", 10.0)]);
        let titles: Vec<_> = list.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["early", "late"]);
    }

    #[test]
    fn test_create_is_not_optimistic() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0), tip("c", 60.0)]);
        let mut poll = Interaction::draft(
            InteractionConfig::Poll(PollConfig {
                options: vec!["A".into(), "B".into()],
                allow_multiple: false,
            }),
            30.0,
            "Quick check",
        );
        poll.id = Some(id("bogus"));
        p.create(poll);
        // InlineRunner already ran the call, but nothing changes before poll
        assert_eq!(list.len(), 2);

        let out = p.poll(&mut list);
        let SyncOutcome::Created { id: new_id, index, .. } = &out[0] else {
            panic!("expected create, got {:?}", out);
        };
        assert_eq!(*index, 1);
        assert_eq!(list.as_slice()[1].title, "Quick check");
        assert_eq!(new_id, &id("3"));
        assert_eq!(store.calls(), vec![StoreCall::Create("Quick check".into())]);
    }

    #[test]
    fn test_create_failure_adds_nothing() {
        let (store, mut p, mut list) = setup(vec![]);
        store.fail_next(StoreError::Http { status: 500, message: None });
        p.create(tip("x", 1.0));
        let out = p.poll(&mut list);
        assert!(out[0].is_failure());
        assert!(list.is_empty());
    }

    #[test]
    fn test_drag_burst_single_write() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        let t0 = Instant::now();

        p.move_local(&mut list, &a, 12.0, t0);
        p.move_local(&mut list, &a, 15.0, t0 + Duration::from_millis(200));
        assert_eq!(list.get(&a).unwrap().trigger_time, 15.0);

        assert_eq!(p.tick(t0 + Duration::from_millis(400)), 0);
        assert!(store.calls().is_empty());

        assert_eq!(p.tick(t0 + Duration::from_millis(750)), 1);
        p.poll(&mut list);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Patch(a.clone(), InteractionPatch::trigger_time(15.0))]
        );
        assert_eq!(store.get(&a).unwrap().trigger_time, 15.0);
        assert!(p.is_idle());
    }

    #[test]
    fn test_move_failure_keeps_position() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        store.set_offline(true);
        p.move_local(&mut list, &a, 42.0, Instant::now());
        p.flush_moves();
        let out = p.poll(&mut list);
        assert!(matches!(out[0], SyncOutcome::Failed { op: SyncOp::Move, rolled_back: false, .. }));
        assert_eq!(list.get(&a).unwrap().trigger_time, 42.0);
    }

    #[test]
    fn test_toggle_rollback() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        store.fail_next(StoreError::Http { status: 503, message: None });
        assert_eq!(p.toggle_enabled(&mut list, &a), Some(false));
        assert!(!list.get(&a).unwrap().enabled);

        let out = p.poll(&mut list);
        assert!(matches!(out[0], SyncOutcome::Failed { op: SyncOp::Toggle, rolled_back: true, .. }));
        assert!(list.get(&a).unwrap().enabled);
    }

    #[test]
    fn test_update_rollback_restores_snapshot() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0), tip("b", 20.0)]);
        let a = id("1");
        let mut edited = list.get(&a).unwrap().clone();
        edited.title = "renamed".into();
        edited.trigger_time = 30.0;

        store.fail_next(StoreError::Transport("timeout".into()));
        assert!(p.update(&mut list, edited));
        assert_eq!(list.as_slice()[1].title, "renamed");

        p.poll(&mut list);
        let restored = list.get(&a).unwrap();
        assert_eq!(restored.title, "a");
        assert_eq!(restored.trigger_time, 10.0);
        assert_eq!(list.position(&a), Some(0));
    }

    #[test]
    fn test_delete_failure_reinserts_at_index() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0), tip("b", 20.0), tip("c", 30.0)]);
        let b = id("2");
        store.fail_next(StoreError::Http { status: 500, message: Some("nope".into()) });
        assert!(p.delete(&mut list, &b));
        assert_eq!(list.len(), 2);

        let out = p.poll(&mut list);
        assert!(matches!(out[0], SyncOutcome::Failed { op: SyncOp::Delete, rolled_back: true, .. }));
        assert_eq!(list.position(&b), Some(1));
    }

    #[test]
    fn test_delete_cancels_pending_move() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        p.move_local(&mut list, &a, 50.0, Instant::now());
        p.delete(&mut list, &a);
        assert_eq!(p.flush_moves(), 0);
        p.poll(&mut list);
        assert_eq!(store.calls(), vec![StoreCall::Delete(a)]);
    }

    #[test]
    fn test_late_move_completion_after_delete_is_noop() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        p.move_local(&mut list, &a, 50.0, Instant::now());
        p.flush_moves();
        // Move is on the wire; the user deletes before it lands
        p.delete(&mut list, &a);
        let out = p.poll(&mut list);
        assert_eq!(out[0], SyncOutcome::Stale { op: SyncOp::Move, id: a.clone() });
        assert_eq!(out[1], SyncOutcome::Deleted { id: a });
        assert!(list.is_empty());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_stale_failure_does_not_roll_back_newer_write() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        store.fail_next(StoreError::Http { status: 500, message: None });
        p.toggle_enabled(&mut list, &a); // fails, rev 1
        let mut edited = list.get(&a).unwrap().clone();
        edited.title = "newer".into();
        p.update(&mut list, edited); // succeeds, rev 2

        let out = p.poll(&mut list);
        assert!(matches!(out[0], SyncOutcome::Stale { op: SyncOp::Toggle, .. }));
        assert!(matches!(out[1], SyncOutcome::Saved { op: SyncOp::Update, .. }));
        let item = list.get(&a).unwrap();
        assert_eq!(item.title, "newer");
        assert!(!item.enabled);
    }

    /// Stalls the first PATCH so a later one would overtake it on a pool.
    struct SlowFirstPatch {
        inner: MemoryStore,
        first: std::sync::atomic::AtomicBool,
    }

    impl InteractionStore for SlowFirstPatch {
        fn list(&self) -> Result<Vec<Interaction>, StoreError> {
            self.inner.list()
        }

        fn create(&self, draft: &Interaction) -> Result<Interaction, StoreError> {
            self.inner.create(draft)
        }

        fn update(&self, id: &InteractionId, interaction: &Interaction) -> Result<Interaction, StoreError> {
            self.inner.update(id, interaction)
        }

        fn patch(&self, id: &InteractionId, patch: &InteractionPatch) -> Result<Interaction, StoreError> {
            if self.first.swap(false, std::sync::atomic::Ordering::SeqCst) {
                std::thread::sleep(Duration::from_millis(300));
            }
            self.inner.patch(id, patch)
        }

        fn delete(&self, id: &InteractionId) -> Result<(), StoreError> {
            self.inner.delete(id)
        }
    }

    fn poll_until_idle(p: &mut SyncPipeline, list: &mut InteractionList) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while !p.is_idle() {
            assert!(Instant::now() < deadline, "pipeline never went idle");
            p.poll(list);
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_writes_for_one_id_reach_store_in_order() {
        use crate::core::workers::Workers;

        let store = Arc::new(SlowFirstPatch {
            inner: MemoryStore::with_items(vec![tip("a", 10.0)]),
            first: std::sync::atomic::AtomicBool::new(true),
        });
        let mut p = SyncPipeline::new(store.clone(), Arc::new(Workers::new(4)));
        let mut list = InteractionList::new();
        p.load();
        poll_until_idle(&mut p, &mut list);
        store.inner.clear_calls();

        let a = id("1");
        assert_eq!(p.toggle_enabled(&mut list, &a), Some(false));
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(p.toggle_enabled(&mut list, &a), Some(true));
        poll_until_idle(&mut p, &mut list);

        assert!(list.get(&a).unwrap().enabled);
        assert!(store.inner.get(&a).unwrap().enabled);
        assert_eq!(
            store.inner.calls(),
            vec![
                StoreCall::Patch(a.clone(), InteractionPatch::enabled(false)),
                StoreCall::Patch(a, InteractionPatch::enabled(true)),
            ]
        );
    }

    #[test]
    fn test_held_write_waits_for_poll() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0), tip("b", 20.0)]);
        let a = id("1");
        let b = id("2");
        p.toggle_enabled(&mut list, &a);
        p.toggle_enabled(&mut list, &a);
        p.toggle_enabled(&mut list, &b);
        // Second toggle of `a` is held until the first completion is applied
        assert_eq!(store.calls().len(), 2);
        assert_eq!(p.in_flight(), 3);

        p.poll(&mut list);
        assert_eq!(store.calls().len(), 3);
        assert!(p.is_idle());
        assert!(store.get(&a).unwrap().enabled);
        assert!(!store.get(&b).unwrap().enabled);
    }

    #[test]
    fn test_update_cancels_pending_move() {
        let (store, mut p, mut list) = setup(vec![tip("a", 10.0)]);
        let a = id("1");
        p.move_local(&mut list, &a, 20.0, Instant::now());
        let mut edited = list.get(&a).unwrap().clone();
        edited.title = "t".into();
        p.update(&mut list, edited);
        assert!(!p.has_pending_moves());
        p.poll(&mut list);
        assert_eq!(store.get(&a).unwrap().trigger_time, 20.0);
        assert_eq!(store.calls(), vec![StoreCall::Update(a)]);
    }
}
