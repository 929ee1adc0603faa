//! Recall measurement against an exact scan.

use strata_metric::{BruteForce, Metric};

/// Summary of how often an approximate answerer found the true nearest point.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RecallReport {
    pub queries: usize,
    /// Answers whose distance equals the exact nearest distance.
    pub hits: usize,
    /// Mean of `answer distance - exact distance` over answered queries.
    pub mean_excess: f32,
    /// Queries the answerer returned nothing for.
    pub unanswered: usize,
}

impl RecallReport {
    /// Fraction of queries answered with an exact nearest point (1.0 when no
    /// queries were run).
    pub fn recall(&self) -> f64 {
        if self.queries == 0 {
            return 1.0;
        }
        self.hits as f64 / self.queries as f64
    }
}

/// Ground truth for one point set.
pub struct RecallOracle<'a, D> {
    exact: BruteForce<D>,
    metric: D,
    points: &'a [Vec<f32>],
}

impl<'a, D: Metric + Clone> RecallOracle<'a, D> {
    pub fn new(dimensions: usize, metric: D, points: &'a [Vec<f32>]) -> Self {
        Self {
            exact: BruteForce::new(dimensions, metric.clone()),
            metric,
            points,
        }
    }

    /// Run `answer` on every query and compare with the exact scan.
    ///
    /// `answer` returns the position (in the oracle's point slice) of its
    /// chosen point. A hit is scored on distance, so equidistant points all
    /// count.
    pub fn measure<F>(&self, queries: &[Vec<f32>], mut answer: F) -> RecallReport
    where
        F: FnMut(&[f32]) -> Option<usize>,
    {
        let mut report = RecallReport::default();
        let mut excess_sum = 0.0f32;

        for query in queries {
            report.queries += 1;
            let exact = match self.exact.nearest(self.points, query) {
                Ok(Some(m)) => m,
                _ => continue,
            };

            let Some(point) = answer(query).and_then(|i| self.points.get(i)) else {
                report.unanswered += 1;
                continue;
            };

            let distance = self.metric.distance(point, query);
            if distance <= exact.distance {
                report.hits += 1;
            }
            excess_sum += (distance - exact.distance).max(0.0);
        }

        let answered = report.queries - report.unanswered;
        if answered > 0 {
            report.mean_excess = excess_sum / answered as f32;
        }
        report
    }
}
