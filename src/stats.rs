//! Statistics over recorded solves.
//!
//! Everything here is a pure function of the input slice: no I/O, no hidden
//! state, identical output for identical input. Times are milliseconds as
//! `f64`; rounding only happens when a value is formatted for display.
//!
//! Callers pass solves in chronological (ascending) order. Rolling averages
//! treat the tail of the slice as the most recent attempts.

use crate::format::format_time;
use crate::solve::Solve;
use crate::util::{mean, median, trimmed_mean};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HISTOGRAM_BINS: usize = 10;

/// A snapshot derived from a solve sequence. Absent values mean "unavailable".
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Statistics {
    pub total_solves: usize,
    pub best_time: Option<f64>,
    pub worst_time: Option<f64>,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub ao5: Option<f64>,
    pub ao12: Option<f64>,
    pub ao100: Option<f64>,
    pub current_ao5: Option<f64>,
    pub current_ao12: Option<f64>,
    pub current_ao100: Option<f64>,
}

/// Effective times of every non-DNF solve, in input order.
pub fn valid_times(solves: &[Solve]) -> Vec<f64> {
    solves.iter().filter_map(Solve::effective_time).collect()
}

pub fn compute_statistics(solves: &[Solve]) -> Statistics {
    let times = valid_times(solves);

    let ao5 = average_of(&times, 5);
    let ao12 = average_of(&times, 12);
    let ao100 = average_of(&times, 100);

    Statistics {
        total_solves: solves.len(),
        best_time: times.iter().copied().reduce(f64::min),
        worst_time: times.iter().copied().reduce(f64::max),
        mean: mean(&times),
        median: median(&times),
        ao5,
        ao12,
        ao100,
        current_ao5: ao5,
        current_ao12: ao12,
        current_ao100: ao100,
    }
}

/// Number of times dropped from each end of an average of `count`.
///
/// Ao5 drops exactly one from each end. Everything else drops
/// `floor(count * 5%)`, which is zero below 20 (Ao12 is a plain mean).
pub fn trim_count(count: usize) -> usize {
    if count == 5 {
        1
    } else {
        count / 20
    }
}

/// Trimmed average of the last `count` times, or `None` with fewer than `count`.
pub fn average_of(times: &[f64], count: usize) -> Option<f64> {
    if count == 0 || times.len() < count {
        return None;
    }

    let window = &times[times.len() - count..];
    trimmed_mean(window, trim_count(count))
}

/// How the top edge of the last histogram bin is treated.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinEdge {
    /// Every bin is half-open `[start, end)`, so the slowest time is never counted.
    Exclusive,
    /// The last bin is closed `[start, max]`.
    #[default]
    Inclusive,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionBin {
    pub range_label: String,
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

pub fn time_distribution(solves: &[Solve], bins: usize, edge: BinEdge) -> Vec<DistributionBin> {
    let times = valid_times(solves);
    if times.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = (max - min) / bins as f64;

    (0..bins)
        .map(|i| {
            let start = min + i as f64 * width;
            let is_last = i + 1 == bins;
            let end = if is_last && edge == BinEdge::Inclusive {
                max
            } else {
                min + (i + 1) as f64 * width
            };

            let count = times
                .iter()
                .filter(|&&t| {
                    t >= start && (t < end || (is_last && edge == BinEdge::Inclusive && t <= end))
                })
                .count();

            DistributionBin {
                range_label: format!("{} - {}", format_time(start), format_time(end)),
                start,
                end,
                count,
            }
        })
        .collect()
}

/// Chart points `(solve number, effective time)` in timestamp order.
/// DNFs keep their solve number but produce no point.
pub fn time_series(solves: &[Solve]) -> Vec<(f64, f64)> {
    let mut ordered: Vec<&Solve> = solves.iter().collect();
    ordered.sort_by_key(|s| s.timestamp);

    ordered
        .into_iter()
        .enumerate()
        .filter_map(|(idx, s)| s.effective_time().map(|t| ((idx + 1) as f64, t)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solve::{solve_fixture, Penalty};
    use chrono::{Duration, Local};

    fn solves_from(times: &[u64]) -> Vec<Solve> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| solve_fixture(i as i64 + 1, t, None))
            .collect()
    }

    #[test]
    fn test_empty_input_is_all_absent() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats, Statistics::default());
        assert_eq!(stats.total_solves, 0);
    }

    #[test]
    fn test_all_dnf_counts_but_has_no_numbers() {
        let solves = vec![
            solve_fixture(1, 10_000, Some(Penalty::Dnf)),
            solve_fixture(2, 12_000, Some(Penalty::Dnf)),
        ];
        let stats = compute_statistics(&solves);
        assert_eq!(stats.total_solves, 2);
        assert_eq!(stats.best_time, None);
        assert_eq!(stats.worst_time, None);
        assert_eq!(stats.mean, None);
        assert_eq!(stats.median, None);
        assert_eq!(stats.ao5, None);
    }

    #[test]
    fn test_ao5_drops_best_and_worst() {
        let stats = compute_statistics(&solves_from(&[10, 20, 30, 40, 50]));
        assert_eq!(stats.ao5, Some(30.0));
        assert_eq!(stats.current_ao5, Some(30.0));
    }

    #[test]
    fn test_ao5_uses_trailing_window() {
        // the slow first solve falls outside the last five
        let stats = compute_statistics(&solves_from(&[90_000, 10, 20, 30, 40, 50]));
        assert_eq!(stats.ao5, Some(30.0));
        assert_eq!(stats.worst_time, Some(90_000.0));
    }

    #[test]
    fn test_four_solves_have_no_ao5() {
        let stats = compute_statistics(&solves_from(&[10, 20, 30, 40]));
        assert_eq!(stats.ao5, None);
        assert_eq!(stats.best_time, Some(10.0));
        assert_eq!(stats.worst_time, Some(40.0));
        assert_eq!(stats.mean, Some(25.0));
        assert_eq!(stats.median, Some(25.0));
    }

    #[test]
    fn test_ao12_is_untrimmed_mean_of_window() {
        let times: Vec<u64> = vec![
            9_000, 11_000, 13_500, 8_200, 30_000, 10_100, 12_700, 9_900, 11_100, 10_400, 14_000,
            7_000,
        ];
        let stats = compute_statistics(&solves_from(&times));
        assert_eq!(stats.ao12, stats.mean);
        assert_eq!(trim_count(12), 0);
    }

    #[test]
    fn test_ao100_trims_five_each_end() {
        assert_eq!(trim_count(100), 5);
        let times: Vec<f64> = (1..=100).map(|t| t as f64).collect();
        // drops 1..=5 and 96..=100, leaving 6..=95
        assert_eq!(average_of(&times, 100), Some(50.5));
    }

    #[test]
    fn test_average_of_zero_count() {
        assert_eq!(average_of(&[1.0, 2.0], 0), None);
    }

    #[test]
    fn test_plus_two_adds_two_seconds_everywhere() {
        let mut solves = solves_from(&[10_000, 11_000, 12_000, 13_000, 14_000]);
        let before = compute_statistics(&solves);
        solves[4].penalty = Some(Penalty::PlusTwo);
        let after = compute_statistics(&solves);

        assert_eq!(after.worst_time, Some(16_000.0));
        assert_eq!(after.mean, before.mean.map(|m| m + 400.0));
        assert_eq!(after.total_solves, before.total_solves);
    }

    #[test]
    fn test_dnf_removes_time_but_keeps_count() {
        let mut solves = solves_from(&[10_000, 11_000, 12_000, 13_000, 14_000]);
        solves[0].penalty = Some(Penalty::Dnf);
        let stats = compute_statistics(&solves);

        assert_eq!(stats.total_solves, 5);
        assert_eq!(stats.best_time, Some(11_000.0));
        assert_eq!(stats.ao5, None);
        assert_eq!(valid_times(&solves).len(), 4);
    }

    #[test]
    fn test_ordering_bounds_hold() {
        let stats = compute_statistics(&solves_from(&[7_654, 12_001, 9_999, 30_500, 8_888, 15_000]));
        let (best, worst) = (stats.best_time.unwrap(), stats.worst_time.unwrap());
        assert!(best <= stats.mean.unwrap() && stats.mean.unwrap() <= worst);
        assert!(best <= stats.median.unwrap() && stats.median.unwrap() <= worst);
    }

    #[test]
    fn test_compute_is_idempotent() {
        let solves = solves_from(&[5_000, 6_000, 7_000, 8_000, 9_000, 10_000]);
        assert_eq!(compute_statistics(&solves), compute_statistics(&solves));
    }

    #[test]
    fn test_distribution_empty() {
        assert!(time_distribution(&[], 10, BinEdge::Inclusive).is_empty());
        assert!(time_distribution(&solves_from(&[1_000]), 0, BinEdge::Inclusive).is_empty());
    }

    #[test]
    fn test_distribution_inclusive_counts_every_time() {
        let solves = solves_from(&[10_000, 12_000, 14_000, 16_000, 20_000]);
        let bins = time_distribution(&solves, 5, BinEdge::Inclusive);

        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[4].count, 1);
        assert_eq!(bins[0].range_label, "10.00 - 12.00");
    }

    #[test]
    fn test_distribution_exclusive_drops_maximum() {
        let solves = solves_from(&[10_000, 12_000, 14_000, 16_000, 20_000]);
        let bins = time_distribution(&solves, 5, BinEdge::Exclusive);

        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 4);
        assert_eq!(bins[4].count, 0);
    }

    #[test]
    fn test_distribution_identical_times() {
        let solves = solves_from(&[9_000, 9_000, 9_000]);
        let inclusive = time_distribution(&solves, 4, BinEdge::Inclusive);
        assert_eq!(inclusive[3].count, 3);
        assert_eq!(inclusive.iter().map(|b| b.count).sum::<usize>(), 3);

        let exclusive = time_distribution(&solves, 4, BinEdge::Exclusive);
        assert_eq!(exclusive.iter().map(|b| b.count).sum::<usize>(), 0);
    }

    #[test]
    fn test_distribution_ignores_dnf() {
        let mut solves = solves_from(&[10_000, 60_000]);
        solves[1].penalty = Some(Penalty::Dnf);
        let bins = time_distribution(&solves, 2, BinEdge::Inclusive);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 1);
    }

    #[test]
    fn test_time_series_orders_by_timestamp_and_skips_dnf() {
        let now = Local::now();
        let mut solves = solves_from(&[3_000, 1_000, 2_000]);
        solves[0].timestamp = now;
        solves[1].timestamp = now - Duration::seconds(20);
        solves[2].timestamp = now - Duration::seconds(10);
        solves[2].penalty = Some(Penalty::Dnf);

        assert_eq!(time_series(&solves), vec![(1.0, 1_000.0), (3.0, 3_000.0)]);
    }
}
