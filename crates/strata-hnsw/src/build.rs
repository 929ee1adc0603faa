//! Step-wise construction.
//!
//! A renderer wants to redraw after every insertion. [`IncrementalBuild`]
//! holds the points still to insert and hands them to the index one per
//! [`step`](IncrementalBuild::step), so the caller decides the pacing (a
//! timer tick, a key press, a tight loop).

use crate::graph::NodeId;
use crate::index::HnswIndex;
use crate::Result;
use rand::Rng;
use std::collections::VecDeque;
use strata_metric::Metric;
use strata_observe::IndexEvent;

/// Outcome of one build step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStep {
    /// One point was inserted under this id.
    Inserted(NodeId),
    /// Nothing left to insert; carries the index's node count.
    Complete(usize),
}

/// A queue of points inserted one step at a time.
#[derive(Debug, Clone)]
pub struct IncrementalBuild {
    pending: VecDeque<Vec<f32>>,
    total: usize,
    inserted: usize,
    finished: bool,
}

impl IncrementalBuild {
    pub fn new<I, P>(points: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Vec<f32>>,
    {
        let pending: VecDeque<Vec<f32>> = points.into_iter().map(Into::into).collect();
        Self {
            total: pending.len(),
            pending,
            inserted: 0,
            finished: false,
        }
    }

    /// Insert the next point.
    ///
    /// Emits `BuildProgress` every `progress_interval` insertions and after
    /// the last queued point (inserted or rejected), and `BuildComplete` the first time the queue is found empty.
    ///
    /// # Errors
    ///
    /// A point the index rejects is dropped from the queue and its error
    /// returned; the next step continues with the following point.
    pub fn step<R: Rng, D: Metric>(&mut self, index: &mut HnswIndex<R, D>) -> Result<BuildStep> {
        let Some(point) = self.pending.pop_front() else {
            let count = index.len();
            if !self.finished {
                self.finished = true;
                tracing::debug!(count, inserted = self.inserted, "incremental build complete");
                index.emit(IndexEvent::BuildComplete { count });
            }
            return Ok(BuildStep::Complete(count));
        };

        let result = index.insert(&point);
        if result.is_ok() {
            self.inserted += 1;
        }

        // the closing progress event fires even when the last point is rejected
        let interval = index.config().progress_interval;
        let on_interval = result.is_ok() && self.inserted % interval == 0;
        if on_interval || self.pending.is_empty() {
            index.emit(IndexEvent::BuildProgress {
                inserted: self.inserted,
                total: self.total,
            });
        }
        result.map(BuildStep::Inserted)
    }

    /// Step until the queue is exhausted and return the node count.
    ///
    /// Stops at the first rejected point.
    pub fn run_to_completion<R: Rng, D: Metric>(
        &mut self,
        index: &mut HnswIndex<R, D>,
    ) -> Result<usize> {
        loop {
            if let BuildStep::Complete(count) = self.step(index)? {
                return Ok(count);
            }
        }
    }

    /// True once `step` has reported completion.
    pub fn is_complete(&self) -> bool {
        self.finished
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Points successfully inserted so far.
    pub fn inserted(&self) -> usize {
        self.inserted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HnswConfig;
    use crate::HnswError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use strata_metric::DistanceFunction;
    use strata_observe::EventQueue;

    fn index_with(config: HnswConfig, queue: Arc<EventQueue>) -> HnswIndex<StdRng> {
        HnswIndex::new(
            2,
            DistanceFunction::Euclidean,
            config,
            StdRng::seed_from_u64(17),
        )
        .unwrap()
        .with_observer(queue)
    }

    fn points(n: usize) -> Vec<Vec<f32>> {
        (0..n).map(|i| vec![i as f32, (i * i % 7) as f32]).collect()
    }

    #[test]
    fn test_steps_then_complete() {
        let queue = Arc::new(EventQueue::new());
        let mut index = index_with(HnswConfig::default(), queue);
        let mut build = IncrementalBuild::new(points(3));
        assert_eq!(build.total(), 3);

        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Inserted(0));
        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Inserted(1));
        assert_eq!(build.remaining(), 1);
        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Inserted(2));
        assert!(!build.is_complete());

        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Complete(3));
        assert!(build.is_complete());
        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Complete(3));
    }

    #[test]
    fn test_progress_and_single_completion_event() {
        let queue = Arc::new(EventQueue::new());
        let config = HnswConfig::default().with_progress_interval(4);
        let mut index = index_with(config, queue.clone());
        let mut build = IncrementalBuild::new(points(10));

        assert_eq!(build.run_to_completion(&mut index).unwrap(), 10);
        build.step(&mut index).unwrap();

        let events = queue.drain();
        let progress: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                IndexEvent::BuildProgress { inserted, total } => Some((*inserted, *total)),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![(4, 10), (8, 10), (10, 10)]);

        let completions = events
            .iter()
            .filter(|e| matches!(e, IndexEvent::BuildComplete { .. }))
            .count();
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_rejected_point_is_skipped() {
        let queue = Arc::new(EventQueue::new());
        let mut index = index_with(HnswConfig::default(), queue);
        let mut build = IncrementalBuild::new(vec![vec![0.0, 0.0], vec![1.0], vec![2.0, 2.0]]);

        build.step(&mut index).unwrap();
        assert!(matches!(
            build.step(&mut index),
            Err(HnswError::DimensionMismatch { .. })
        ));
        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Inserted(1));
        assert_eq!(build.inserted(), 2);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_rejected_last_point_still_reports_progress() {
        let queue = Arc::new(EventQueue::new());
        let config = HnswConfig::default().with_progress_interval(4);
        let mut index = index_with(config, queue.clone());
        let mut build = IncrementalBuild::new(vec![vec![0.0, 0.0], vec![1.0, 3.0], vec![f32::NAN, 0.0]]);

        build.step(&mut index).unwrap();
        build.step(&mut index).unwrap();
        assert!(matches!(build.step(&mut index), Err(HnswError::InvalidPoint(_))));
        assert_eq!(build.step(&mut index).unwrap(), BuildStep::Complete(2));

        let tail: Vec<_> = queue
            .drain()
            .into_iter()
            .filter(|e| {
                matches!(
                    e,
                    IndexEvent::BuildProgress { .. } | IndexEvent::BuildComplete { .. }
                )
            })
            .collect();
        assert_eq!(
            tail,
            vec![
                IndexEvent::BuildProgress { inserted: 2, total: 3 },
                IndexEvent::BuildComplete { count: 2 },
            ]
        );
    }

    #[test]
    fn test_empty_build() {
        let queue = Arc::new(EventQueue::new());
        let mut index = index_with(HnswConfig::default(), queue);
        let mut build = IncrementalBuild::new(Vec::<Vec<f32>>::new());
        assert_eq!(build.run_to_completion(&mut index).unwrap(), 0);
        assert!(build.is_complete());
    }
}
