//! Pub/Sub event bus between the egui layer and the editor.
//!
//! - `subscribe()` callbacks fire synchronously inside `emit()`
//! - every emitted event is also queued; `poll()` drains the queue once per frame
//!
//! Widgets hold an [`EventEmitter`] and never touch editor state directly.
//! Callback order is FIFO within one event type; nothing is promised across types.

use log::warn;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

/// Queue length at which the oldest half is dropped
const MAX_QUEUE_SIZE: usize = 1000;

/// Marker trait for events. Events must be Send + Sync + 'static.
pub trait Event: Any + Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Send + Sync + 'static> Event for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn type_name(&self) -> &'static str {
        std::any::type_name::<T>()
    }
}

type Callback = Arc<dyn Fn(&dyn Any) + Send + Sync>;
type Subscribers = Arc<RwLock<HashMap<TypeId, Vec<Callback>>>>;
type Queue = Arc<Mutex<Vec<BoxedEvent>>>;

pub type BoxedEvent = Box<dyn Event>;

/// Notify subscribers of `type_id`, then queue the event.
fn deliver(subscribers: &Subscribers, queue: &Queue, type_id: TypeId, event: BoxedEvent) {
    if let Some(cbs) = subscribers.read().unwrap_or_else(|e| e.into_inner()).get(&type_id) {
        // Deref to dyn Event so as_any() sees the concrete type, not the Box
        for cb in cbs {
            cb((*event).as_any());
        }
    }

    let mut queue = queue.lock().unwrap_or_else(|e| e.into_inner());
    if queue.len() >= MAX_QUEUE_SIZE {
        let evict_count = queue.len() / 2;
        warn!("Event queue full ({} events), evicting oldest {}", queue.len(), evict_count);
        queue.drain(0..evict_count);
    }
    queue.push(event);
}

#[derive(Clone)]
pub struct EventBus {
    subscribers: Subscribers,
    queue: Queue,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            subscribers: Arc::new(RwLock::new(HashMap::new())),
            queue: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Subscribe to events of type E. The callback runs inside `emit()`.
    ///
    /// # Example
    /// ```ignore
    /// let failures = Arc::new(AtomicUsize::new(0));
    /// let f = Arc::clone(&failures);
    /// bus.subscribe::<SyncFailedEvent, _>(move |_| {
    ///     f.fetch_add(1, Ordering::SeqCst);
    /// });
    /// ```
    pub fn subscribe<E, F>(&self, callback: F)
    where
        E: Event,
        F: Fn(&E) + Send + Sync + 'static,
    {
        let wrapped: Callback = Arc::new(move |any: &dyn Any| {
            if let Some(event) = any.downcast_ref::<E>() {
                callback(event);
            }
        });
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .entry(TypeId::of::<E>())
            .or_default()
            .push(wrapped);
    }

    pub fn emit<E: Event>(&self, event: E) {
        deliver(&self.subscribers, &self.queue, TypeId::of::<E>(), Box::new(event));
    }

    /// Emit an already boxed event (what widgets hand to `dispatch`).
    pub fn emit_boxed(&self, event: BoxedEvent) {
        let type_id = (*event).type_id();
        deliver(&self.subscribers, &self.queue, type_id, event);
    }

    /// Drain events emitted since the last poll.
    pub fn poll(&self) -> Vec<BoxedEvent> {
        std::mem::take(&mut *self.queue.lock().unwrap_or_else(|e| e.into_inner()))
    }

    /// Handle for widgets.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter {
            subscribers: Arc::clone(&self.subscribers),
            queue: Arc::clone(&self.queue),
        }
    }

    pub fn unsubscribe_all<E: Event>(&self) {
        self.subscribers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&TypeId::of::<E>());
    }

    pub fn has_subscribers<E: Event>(&self) -> bool {
        self.subscribers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&TypeId::of::<E>())
            .is_some_and(|v| !v.is_empty())
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

/// Cloneable emit-only handle.
#[derive(Clone)]
pub struct EventEmitter {
    subscribers: Subscribers,
    queue: Queue,
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("queue_len", &self.queue.lock().map(|q| q.len()).unwrap_or(0))
            .finish()
    }
}

impl EventEmitter {
    pub fn emit<E: Event>(&self, event: E) {
        deliver(&self.subscribers, &self.queue, TypeId::of::<E>(), Box::new(event));
    }

    pub fn emit_boxed(&self, event: BoxedEvent) {
        let type_id = (*event).type_id();
        deliver(&self.subscribers, &self.queue, type_id, event);
    }
}

/// Downcast a queued event.
///
/// Must deref to `dyn Event` before `as_any()`: the blanket impl also covers
/// `Box<dyn Event>` and would hand back the box itself.
#[inline]
pub fn downcast_event<E: Event>(event: &BoxedEvent) -> Option<&E> {
    (**event).as_any().downcast_ref::<E>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI32, Ordering};

    #[derive(Clone, Debug)]
    struct Nudge {
        by: i32,
    }

    #[derive(Clone, Debug)]
    struct Note;

    #[test]
    fn test_callbacks_fire_and_events_queue() {
        let bus = EventBus::new();
        let total = Arc::new(AtomicI32::new(0));
        let t = Arc::clone(&total);
        bus.subscribe::<Nudge, _>(move |e| {
            t.fetch_add(e.by, Ordering::SeqCst);
        });

        bus.emit(Nudge { by: 3 });
        bus.emitter().emit(Nudge { by: 4 });
        bus.emit(Note);
        assert_eq!(total.load(Ordering::SeqCst), 7);

        let events = bus.poll();
        assert_eq!(events.len(), 3);
        assert_eq!(downcast_event::<Nudge>(&events[1]).map(|e| e.by), Some(4));
        assert!(downcast_event::<Nudge>(&events[2]).is_none());
        assert_eq!(bus.queue_len(), 0);
    }

    #[test]
    fn test_boxed_events_reach_typed_subscribers() {
        let bus = EventBus::new();
        let total = Arc::new(AtomicI32::new(0));
        let t = Arc::clone(&total);
        bus.subscribe::<Nudge, _>(move |e| {
            t.fetch_add(e.by, Ordering::SeqCst);
        });

        let boxed: BoxedEvent = Box::new(Nudge { by: 5 });
        bus.emit_boxed(boxed);
        bus.emitter().emit_boxed(Box::new(Nudge { by: 1 }));
        assert_eq!(total.load(Ordering::SeqCst), 6);
        assert_eq!(bus.poll().len(), 2);
    }

    #[test]
    fn test_unsubscribe_keeps_queueing() {
        let bus = EventBus::new();
        bus.subscribe::<Note, _>(|_| {});
        assert!(bus.has_subscribers::<Note>());
        bus.unsubscribe_all::<Note>();
        assert!(!bus.has_subscribers::<Note>());
        bus.emit(Note);
        assert_eq!(bus.poll().len(), 1);
    }

    #[test]
    fn test_queue_eviction() {
        let bus = EventBus::new();
        for i in 0..(MAX_QUEUE_SIZE as i32 + 1) {
            bus.emit(Nudge { by: i });
        }
        let events = bus.poll();
        assert_eq!(events.len(), MAX_QUEUE_SIZE / 2 + 1);
        assert_eq!(downcast_event::<Nudge>(&events[0]).map(|e| e.by), Some(500));
    }
}
