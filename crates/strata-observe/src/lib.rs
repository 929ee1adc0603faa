//! strata-observe: progress notifications for graph construction and search.
//!
//! The index depends only on the [`Observer`] trait and the [`IndexEvent`]
//! type. What happens to an event (logging, a UI redraw, a test assertion) is
//! decided by whoever attached the observer.
//!
//! Emission is fire-and-forget: `emit` takes `&self`, returns nothing, and
//! must not block the index.

mod queue;

pub use queue::{EventQueue, DEFAULT_QUEUE_CAPACITY};

use std::sync::Arc;

/// Node id as seen by observers. Matches the index's dense id type.
pub type NodeId = u32;

/// Typed events emitted by the index, in completion order.
#[non_exhaustive]
#[derive(Clone, Debug, PartialEq)]
pub enum IndexEvent {
    /// A node finished inserting, edges and all.
    NodeAdded { id: NodeId, layer: usize },
    /// A newly inserted node became the entry point.
    EntryPointPromoted { id: NodeId, layer: usize },
    /// Incremental build progress.
    BuildProgress { inserted: usize, total: usize },
    /// A build (batch or incremental) finished; `count` is the node total.
    BuildComplete { count: usize },
    /// A nearest-neighbor query finished.
    SearchComplete { node: NodeId, distance: f32 },
    /// A greedy path trace finished.
    PathTraced {
        terminal: NodeId,
        distance: f32,
        hops: usize,
    },
    /// The index was cleared.
    Reset,
}

/// Receives index events.
pub trait Observer: Send + Sync {
    fn emit(&self, event: IndexEvent);
}

impl<T: Observer + ?Sized> Observer for Arc<T> {
    fn emit(&self, event: IndexEvent) {
        (**self).emit(event)
    }
}

/// A do-nothing observer for tests and callers who don't care.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {
    fn emit(&self, _event: IndexEvent) {}
}

/// Forwards events to `tracing`: per-node events at DEBUG, the rest at INFO.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
    fn emit(&self, event: IndexEvent) {
        match event {
            IndexEvent::NodeAdded { id, layer } => {
                tracing::debug!(id, layer, "node added");
            }
            IndexEvent::EntryPointPromoted { id, layer } => {
                tracing::info!(id, layer, "entry point promoted");
            }
            IndexEvent::BuildProgress { inserted, total } => {
                tracing::info!("Added node {}/{}", inserted, total);
            }
            IndexEvent::BuildComplete { count } => {
                tracing::info!(count, "construction complete");
            }
            IndexEvent::SearchComplete { node, distance } => {
                tracing::info!("Search complete! Closest node: {}, Distance: {:.2}", node, distance);
            }
            IndexEvent::PathTraced {
                terminal,
                distance,
                hops,
            } => {
                tracing::info!(
                    hops,
                    "Closest node: {}, Distance: {:.2}",
                    terminal,
                    distance
                );
            }
            IndexEvent::Reset => tracing::info!("index reset"),
        }
    }
}

/// Broadcasts each event to several observers in registration order.
#[derive(Default)]
pub struct Fanout {
    observers: Vec<Arc<dyn Observer>>,
}

impl Fanout {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an observer; returns `self` for chaining.
    pub fn with(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl Observer for Fanout {
    fn emit(&self, event: IndexEvent) {
        for observer in &self.observers {
            observer.emit(event.clone());
        }
    }
}
