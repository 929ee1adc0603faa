//! Headless build-and-query session.
//!
//! Samples a planar point cloud, inserts it one step at a time, then runs
//! random queries and path traces and compares every answer with an exact
//! scan.

use crate::config::StrataConfig;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use strata_hnsw::{BuildStep, HnswIndex, IncrementalBuild};
use strata_metric::{planar_points, BruteForce, DistanceFunction};
use strata_observe::{EventQueue, Fanout, IndexEvent, Observer, TracingObserver};

/// What one session produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub nodes: usize,
    pub edges: usize,
    pub max_layer: usize,
    pub entry_point: Option<u32>,
    pub queries: usize,
    /// Queries whose approximate answer matched the exact nearest distance.
    pub exact_hits: usize,
    /// Mean number of moves over all path traces.
    pub mean_hops: f64,
    /// Events the session queue had to evict.
    pub dropped_events: u64,
}

impl RunSummary {
    pub fn recall(&self) -> f64 {
        if self.queries == 0 {
            return 1.0;
        }
        self.exact_hits as f64 / self.queries as f64
    }
}

pub struct Session {
    config: StrataConfig,
    index: HnswIndex<StdRng, DistanceFunction>,
    events: Arc<EventQueue>,
}

impl Session {
    pub fn new(config: StrataConfig) -> strata_hnsw::Result<Self> {
        let events = Arc::new(EventQueue::new());
        let observer: Arc<dyn Observer> = Arc::new(
            Fanout::new()
                .with(Arc::new(TracingObserver))
                .with(events.clone()),
        );

        let index = HnswIndex::new(
            2,
            config.metric,
            config.index.clone(),
            StdRng::seed_from_u64(config.seed),
        )?
        .with_observer(observer);

        Ok(Self {
            config,
            index,
            events,
        })
    }

    pub fn index(&self) -> &HnswIndex<StdRng, DistanceFunction> {
        &self.index
    }

    /// Build, query and trace; returns the summary.
    pub fn run(&mut self) -> strata_hnsw::Result<RunSummary> {
        // sampling stream, separate from the index's level draws
        let mut sampler = StdRng::seed_from_u64(self.config.seed.wrapping_add(1));
        let canvas = &self.config.canvas;
        let points = planar_points(&mut sampler, self.config.points, canvas.width, canvas.height);
        let targets = planar_points(&mut sampler, self.config.queries, canvas.width, canvas.height);

        self.build(&points)?;

        let exact = BruteForce::new(2, self.config.metric);
        let mut exact_hits = 0;
        let mut total_hops = 0;

        for target in &targets {
            let Some(hit) = self.index.query(target)? else {
                continue;
            };
            let truth = exact.nearest(&points, target)?;
            if truth.is_some_and(|m| hit.distance <= m.distance) {
                exact_hits += 1;
            } else {
                tracing::debug!(node = hit.node, distance = hit.distance, "approximate miss");
            }

            if let Some(trace) = self.index.trace_path(target)? {
                total_hops += trace.hops();
                self.index.apply_trace(&trace)?;
            }
        }

        let snapshot = self.index.snapshot();
        let summary = RunSummary {
            nodes: snapshot.node_count(),
            edges: snapshot.edge_count(),
            max_layer: self.index.max_assigned_layer(),
            entry_point: snapshot.entry_point,
            queries: targets.len(),
            exact_hits,
            mean_hops: if targets.is_empty() {
                0.0
            } else {
                total_hops as f64 / targets.len() as f64
            },
            dropped_events: self.events.dropped(),
        };
        Ok(summary)
    }

    fn build(&mut self, points: &[Vec<f32>]) -> strata_hnsw::Result<()> {
        let mut build = IncrementalBuild::new(points.iter().cloned());
        loop {
            match build.step(&mut self.index)? {
                BuildStep::Inserted(_) => {
                    // one step per frame in an interactive front end
                    for event in self.events.drain() {
                        if let IndexEvent::EntryPointPromoted { id, layer } = event {
                            tracing::debug!(id, layer, "new top layer");
                        }
                    }
                }
                BuildStep::Complete(count) => {
                    tracing::info!(count, layers = self.index.max_assigned_layer() + 1, "index built");
                    return Ok(());
                }
            }
        }
    }
}
