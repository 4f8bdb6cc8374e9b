//! Usage aggregation over scoped samples.
//!
//! Each sample stands for one sampling interval of focus. Totals are raw
//! sample counts multiplied by the interval, and all merging happens at the
//! seconds level before a single decomposition into [`Duration`].

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::category::CategoryTable;
use crate::duration::Duration;
use crate::sample::Sample;
use crate::scope::{Calendar, Scope};

/// Per-category usage, ordered by category name.
pub type CategoryUsage = BTreeMap<String, Duration>;

/// Configuration for usage aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationConfig {
    /// Seconds of focus represented by one sample.
    /// Default: 1.
    pub sample_interval_secs: u32,

    /// Places samples on calendar dates.
    /// Default: UTC.
    pub calendar: Calendar,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            sample_interval_secs: 1,
            calendar: Calendar::utc(),
        }
    }
}

impl AggregationConfig {
    fn seconds_for(&self, count: u64) -> u64 {
        count.saturating_mul(u64::from(self.sample_interval_secs))
    }
}

/// Usage attributed to one application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApplicationUsage {
    pub application: String,
    pub usage: Duration,
}

/// Samples whose calendar date falls inside `scope`.
fn scoped<'a>(
    samples: &'a [Sample],
    scope: Scope,
    calendar: Calendar,
) -> impl Iterator<Item = &'a Sample> {
    samples
        .iter()
        .filter(move |sample| scope.contains(sample.date_in(calendar)))
}

/// Sample counts per application, in order of first appearance.
fn application_counts<'a>(
    samples: &'a [Sample],
    scope: &Scope,
    config: &AggregationConfig,
) -> Vec<(&'a str, u64)> {
    let mut counts: Vec<(&str, u64)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sample in scoped(samples, *scope, config.calendar) {
        let name = sample.application_name.as_str();
        match index.get(name) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(name, counts.len());
                counts.push((name, 1));
            }
        }
    }

    counts
}

/// Total focus time in scope, or `None` when no sample falls inside it.
pub fn total_usage(
    samples: &[Sample],
    scope: &Scope,
    config: &AggregationConfig,
) -> Option<Duration> {
    let count = scoped(samples, *scope, config.calendar).count() as u64;
    (count > 0).then(|| Duration::from_secs(config.seconds_for(count)))
}

/// Focus time per application, in order of first appearance.
pub fn per_application_usage(
    samples: &[Sample],
    scope: &Scope,
    config: &AggregationConfig,
) -> Vec<ApplicationUsage> {
    application_counts(samples, scope, config)
        .into_iter()
        .map(|(application, count)| ApplicationUsage {
            application: application.to_string(),
            usage: Duration::from_secs(config.seconds_for(count)),
        })
        .collect()
}

/// The application with the most samples in scope.
///
/// Ties go to the application that appears first in the input.
pub fn most_used_application(
    samples: &[Sample],
    scope: &Scope,
    config: &AggregationConfig,
) -> Option<ApplicationUsage> {
    let mut best: Option<(&str, u64)> = None;
    for (application, count) in application_counts(samples, scope, config) {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((application, count));
        }
    }

    best.map(|(application, count)| ApplicationUsage {
        application: application.to_string(),
        usage: Duration::from_secs(config.seconds_for(count)),
    })
}

/// Focus time per category across an inclusive date range.
///
/// Application subtotals are accumulated into category buckets as seconds
/// and each bucket is decomposed once. An inverted range yields an empty map.
pub fn category_usage_by_range(
    samples: &[Sample],
    scope: &Scope,
    categories: &CategoryTable,
    config: &AggregationConfig,
) -> CategoryUsage {
    let mut seconds: BTreeMap<&str, u64> = BTreeMap::new();
    for (application, count) in application_counts(samples, scope, config) {
        let bucket = seconds.entry(categories.classify(application)).or_insert(0);
        *bucket = bucket.saturating_add(config.seconds_for(count));
    }

    seconds
        .into_iter()
        .map(|(category, total)| (category.to_string(), Duration::from_secs(total)))
        .collect()
}
