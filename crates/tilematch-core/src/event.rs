//! Typed game events with a pre-allocated ring buffer.
//!
//! Components emit events into the bus while they run; the owner delivers
//! them to listeners in batch once the current step has finished mutating
//! state. Delivery preserves emission order across all event kinds.
//!
//! # Subscriptions
//!
//! Listeners register for a single [`EventKind`] and receive a
//! [`SubscriptionId`] that deregisters them via [`EventBus::unsubscribe`].
//! Listeners are read-only: they observe outcomes, they never feed back into
//! the step that produced them.
//!
//! # Suppression
//!
//! Event kinds can be suppressed via [`EventBus::suppress`]; suppressed
//! events are never buffered.

use crate::id::{SubscriptionId, TileId};

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// A tile finished its face-up flip.
    TileRevealed { tile: TileId, position: u16 },
    /// A pair finished evaluation.
    PairEvaluated {
        first: TileId,
        second: TileId,
        is_match: bool,
    },
    /// The entry sequence finished; the board accepts input.
    LevelReady,
    /// Every tile is matched and the worker has drained.
    LevelCompleted,
    CoinsChanged { coins: u32 },
    ProgressChanged { matches: u32, attempts: u32 },
    ComboChanged { multiplier: u32 },
}

/// Discriminant tag for event types, used for subscription and suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    TileRevealed,
    PairEvaluated,
    LevelReady,
    LevelCompleted,
    CoinsChanged,
    ProgressChanged,
    ComboChanged,
}

const EVENT_KIND_COUNT: usize = 7;

/// Smallest bus capacity that holds everything one timer can emit before
/// delivery. A verdict emits at most four events (PairEvaluated,
/// CoinsChanged, ComboChanged, ProgressChanged); the rest is headroom.
pub const MIN_EVENT_CAPACITY: usize = 8;

impl EventKind {
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::TileRevealed,
        EventKind::PairEvaluated,
        EventKind::LevelReady,
        EventKind::LevelCompleted,
        EventKind::CoinsChanged,
        EventKind::ProgressChanged,
        EventKind::ComboChanged,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl GameEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            GameEvent::TileRevealed { .. } => EventKind::TileRevealed,
            GameEvent::PairEvaluated { .. } => EventKind::PairEvaluated,
            GameEvent::LevelReady => EventKind::LevelReady,
            GameEvent::LevelCompleted => EventKind::LevelCompleted,
            GameEvent::CoinsChanged { .. } => EventKind::CoinsChanged,
            GameEvent::ProgressChanged { .. } => EventKind::ProgressChanged,
            GameEvent::ComboChanged { .. } => EventKind::ComboChanged,
        }
    }
}

// ---------------------------------------------------------------------------
// EventBuffer — pre-allocated ring buffer
// ---------------------------------------------------------------------------

/// A pre-allocated ring buffer for events. Fixed capacity; when full, the
/// oldest events are dropped.
#[derive(Debug)]
pub struct EventBuffer {
    events: Vec<Option<GameEvent>>,
    /// Write position (wraps around).
    head: usize,
    len: usize,
    /// Total events ever written (including dropped).
    total_written: u64,
    dropped: u64,
}

impl EventBuffer {
    /// A capacity of 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            events: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_written: 0,
            dropped: 0,
        }
    }

    /// Push an event. If full, the oldest event is dropped.
    pub fn push(&mut self, event: GameEvent) {
        self.events[self.head] = Some(event);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        } else {
            self.dropped += 1;
        }
        self.total_written += 1;
    }

    pub fn capacity(&self) -> usize {
        self.events.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Number of events overwritten before they were drained.
    pub fn dropped_count(&self) -> u64 {
        self.dropped
    }

    /// Remove every stored event, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        let start = if self.len < self.capacity() {
            0
        } else {
            // head is the next write slot, which holds the oldest entry
            self.head
        };
        let capacity = self.capacity();
        let mut out = Vec::with_capacity(self.len);
        for offset in 0..self.len {
            if let Some(event) = self.events[(start + offset) % capacity].take() {
                out.push(event);
            }
        }
        self.head = 0;
        self.len = 0;
        out
    }

    /// Iterate stored events from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> + '_ {
        let start = if self.len < self.capacity() { 0 } else { self.head };
        let capacity = self.capacity();
        (0..self.len).filter_map(move |offset| self.events[(start + offset) % capacity].as_ref())
    }

    pub fn clear(&mut self) {
        for slot in &mut self.events {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// A listener receives events read-only.
pub type Listener = Box<dyn FnMut(&GameEvent)>;

struct Subscription {
    id: SubscriptionId,
    listener: Listener,
}

/// The event bus: one ordered ring buffer, per-kind subscriber lists and
/// suppression flags.
pub struct EventBus {
    buffer: EventBuffer,
    suppressed: [bool; EVENT_KIND_COUNT],
    subscribers: [Vec<Subscription>; EVENT_KIND_COUNT],
    emitted: [u64; EVENT_KIND_COUNT],
    next_subscription: u64,
    reported_drops: u64,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("buffer", &self.buffer)
            .field("suppressed", &self.suppressed)
            .field("emitted", &self.emitted)
            .finish_non_exhaustive()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl EventBus {
    /// Create a bus whose buffer holds `capacity` undelivered events,
    /// raised to [`MIN_EVENT_CAPACITY`] if smaller.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: EventBuffer::new(capacity.max(MIN_EVENT_CAPACITY)),
            suppressed: [false; EVENT_KIND_COUNT],
            subscribers: Default::default(),
            emitted: [0; EVENT_KIND_COUNT],
            next_subscription: 0,
            reported_drops: 0,
        }
    }

    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn unsuppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = false;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    /// Buffer an event for the next delivery. No-op if its kind is suppressed.
    pub fn emit(&mut self, event: GameEvent) {
        let idx = event.kind().index();
        if self.suppressed[idx] {
            return;
        }
        self.emitted[idx] += 1;
        self.buffer.push(event);
    }

    /// Register a listener for `kind`. Listeners of the same kind are called
    /// in registration order.
    pub fn subscribe(&mut self, kind: EventKind, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers[kind.index()].push(Subscription { id, listener });
        id
    }

    /// Deregister a listener. Returns false if the id was unknown.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        for list in &mut self.subscribers {
            if let Some(pos) = list.iter().position(|s| s.id == id) {
                list.remove(pos);
                return true;
            }
        }
        false
    }

    pub fn subscriber_count(&self, kind: EventKind) -> usize {
        self.subscribers[kind.index()].len()
    }

    /// Deliver every buffered event, oldest first, then empty the buffer.
    pub fn deliver(&mut self) {
        if self.buffer.is_empty() {
            return;
        }
        let dropped = self.buffer.dropped_count();
        if dropped > self.reported_drops {
            log::warn!(
                "event buffer overflowed; {} events lost",
                dropped - self.reported_drops
            );
            self.reported_drops = dropped;
        }
        for event in self.buffer.drain() {
            for sub in &mut self.subscribers[event.kind().index()] {
                (sub.listener)(&event);
            }
        }
    }

    /// Discard undelivered events.
    pub fn discard_pending(&mut self) {
        self.buffer.clear();
    }

    /// Undelivered events, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &GameEvent> + '_ {
        self.buffer.iter()
    }

    pub fn pending_count(&self) -> usize {
        self.buffer.len()
    }

    /// Events of `kind` emitted since creation (suppressed ones excluded).
    pub fn total_emitted(&self, kind: EventKind) -> u64 {
        self.emitted[kind.index()]
    }
}
