//! Run statistics and the best-cost repeat test.

use super::acceptance::Decision;

/// Move counters and convergence bookkeeping.
///
/// The repeat counter follows ASA's cost-repeat test: it is sampled once
/// per reannealing period rather than on every step, so a run is not
/// stopped by a short unlucky streak while temperatures are still high.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnnealStats {
    /// Calls to `step()` that consumed a candidate.
    pub steps: usize,
    /// Candidates no worse than the current point.
    pub num_improved: usize,
    /// Candidates worse than the current point.
    pub num_worse: usize,
    /// Worse candidates accepted by the Metropolis draw.
    pub num_worse_accepted: usize,
    /// Consecutive periods without a significant improvement of the best cost.
    pub f_x_best_repeat_count: usize,
    /// Completed reannealing events.
    pub num_reanneals: usize,
    period_generated: usize,
    period_accepted: usize,
    period_improved_best: bool,
}

impl AnnealStats {
    /// Counts one acceptance decision.
    pub fn record(&mut self, decision: Decision) {
        self.steps += 1;
        self.period_generated += 1;
        match decision {
            Decision::Improved => self.num_improved += 1,
            Decision::WorseAccepted => {
                self.num_worse += 1;
                self.num_worse_accepted += 1;
            }
            Decision::WorseRejected => self.num_worse += 1,
        }
        if decision.accepted() {
            self.period_accepted += 1;
        }
    }

    /// Notes an improvement of the best cost larger than the cost precision.
    pub fn record_best_improvement(&mut self) {
        self.f_x_best_repeat_count = 0;
        self.period_improved_best = true;
    }

    /// Closes a reannealing period, bumping the repeat counter if the
    /// period did not improve the best cost.
    pub fn close_period(&mut self) {
        if !self.period_improved_best {
            self.f_x_best_repeat_count += 1;
        }
        self.period_improved_best = false;
    }

    /// Accepted-to-generated ratio since the last reanneal.
    ///
    /// `None` when nothing was generated.
    pub fn period_acceptance_ratio(&self) -> Option<f64> {
        (self.period_generated > 0)
            .then(|| self.period_accepted as f64 / self.period_generated as f64)
    }

    /// Starts a new acceptance window after a reanneal.
    pub fn record_reanneal(&mut self) {
        self.num_reanneals += 1;
        self.period_generated = 0;
        self.period_accepted = 0;
    }

    /// All accepted candidates.
    pub fn num_accepted(&self) -> usize {
        self.num_improved + self.num_worse_accepted
    }

    /// Fraction of worse candidates that were accepted.
    pub fn acceptance_rate(&self) -> Option<f64> {
        (self.num_worse > 0).then(|| self.num_worse_accepted as f64 / self.num_worse as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_classification() {
        let mut stats = AnnealStats::default();
        stats.record(Decision::Improved);
        stats.record(Decision::WorseAccepted);
        stats.record(Decision::WorseRejected);
        stats.record(Decision::WorseRejected);
        assert_eq!(stats.steps, 4);
        assert_eq!(stats.num_improved, 1);
        assert_eq!(stats.num_worse, 3);
        assert_eq!(stats.num_worse_accepted, 1);
        assert_eq!(stats.num_accepted(), 2);
        assert_eq!(stats.acceptance_rate(), Some(1.0 / 3.0));
        assert_eq!(stats.period_acceptance_ratio(), Some(0.5));
    }

    #[test]
    fn test_empty_rates() {
        let stats = AnnealStats::default();
        assert_eq!(stats.acceptance_rate(), None);
        assert_eq!(stats.period_acceptance_ratio(), None);
    }

    #[test]
    fn test_repeat_counter_per_period() {
        let mut stats = AnnealStats::default();
        stats.close_period();
        stats.close_period();
        assert_eq!(stats.f_x_best_repeat_count, 2);

        stats.record_best_improvement();
        assert_eq!(stats.f_x_best_repeat_count, 0);
        stats.close_period();
        assert_eq!(stats.f_x_best_repeat_count, 0);
        stats.close_period();
        assert_eq!(stats.f_x_best_repeat_count, 1);
    }

    #[test]
    fn test_reanneal_resets_window_only() {
        let mut stats = AnnealStats::default();
        stats.record(Decision::WorseRejected);
        stats.record_reanneal();
        assert_eq!(stats.num_reanneals, 1);
        assert_eq!(stats.period_acceptance_ratio(), None);
        assert_eq!(stats.num_worse, 1);
    }
}
