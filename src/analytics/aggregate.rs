//! The aggregate catalog. Every operation is pure over a [`View`] and
//! defines its empty-input result instead of failing: sums are `0`, means,
//! maxima, modes and percentages are `None`, ranked results are empty.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use crate::data::filter::View;
use crate::data::model::{Record, Value};
use crate::error::ConfigurationError;

/// One bucket of a grouped result.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket<V> {
    pub key: Value,
    pub value: V,
}

impl<V> Bucket<V> {
    pub fn new(key: Value, value: V) -> Self {
        Self { key, value }
    }
}

/// Round half to even, like pandas' `round`.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round_ties_even() / factor
}

#[derive(Debug, Default, Clone, Copy)]
struct MeanAcc {
    sum: f64,
    count: usize,
}

impl MeanAcc {
    fn push(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

fn numbers<'v>(view: &'v View<'_>, column: usize) -> impl Iterator<Item = f64> + 'v {
    view.values(column).filter_map(Value::as_f64)
}

/// Per-group maximum of a numeric column, keyed by group value. Missing group
/// keys and missing values are skipped.
fn group_max<'a>(
    view: &View<'a>,
    group: usize,
    value: usize,
) -> BTreeMap<&'a Value, f64> {
    let mut maxima: BTreeMap<&Value, f64> = BTreeMap::new();
    for record in view.records() {
        let key = record.get(group);
        let Some(v) = record.get(value).as_f64() else {
            continue;
        };
        if key.is_missing() {
            continue;
        }
        maxima
            .entry(key)
            .and_modify(|m| *m = m.max(v))
            .or_insert(v);
    }
    maxima
}

// ---------------------------------------------------------------------------
// Scalar aggregates
// ---------------------------------------------------------------------------

/// Number of distinct non-missing values.
pub fn count_distinct(view: &View<'_>, column: &str) -> Result<usize, ConfigurationError> {
    let idx = view.dataset().column(column)?;
    Ok(view
        .values(idx)
        .filter(|v| !v.is_missing())
        .collect::<HashSet<_>>()
        .len())
}

/// Arithmetic mean; missing cells count in neither numerator nor denominator.
pub fn mean(view: &View<'_>, column: &str) -> Result<Option<f64>, ConfigurationError> {
    let idx = view.dataset().numeric_column(column)?;
    let mut acc = MeanAcc::default();
    numbers(view, idx).for_each(|v| acc.push(v));
    Ok(acc.mean())
}

pub fn mean_rounded(
    view: &View<'_>,
    column: &str,
    decimals: u32,
) -> Result<Option<f64>, ConfigurationError> {
    Ok(mean(view, column)?.map(|m| round_to(m, decimals)))
}

pub fn max(view: &View<'_>, column: &str) -> Result<Option<f64>, ConfigurationError> {
    let idx = view.dataset().numeric_column(column)?;
    Ok(numbers(view, idx).reduce(f64::max))
}

/// Most frequent non-missing value. Ties go to the value seen first in view
/// row order.
pub fn mode(view: &View<'_>, column: &str) -> Result<Option<Value>, ConfigurationError> {
    let idx = view.dataset().column(column)?;
    // value -> (count, first position)
    let mut counts: HashMap<&Value, (usize, usize)> = HashMap::new();
    for (pos, v) in view.values(idx).enumerate() {
        if v.is_missing() {
            continue;
        }
        counts.entry(v).or_insert((0, pos)).0 += 1;
    }
    Ok(counts
        .into_iter()
        .max_by(|(_, (ca, pa)), (_, (cb, pb))| ca.cmp(cb).then(pb.cmp(pa)))
        .map(|(v, _)| v.clone()))
}

/// Share of rows satisfying `predicate`, in percent, rounded to 2 decimals.
/// `None` for an empty view.
pub fn percentage<F>(view: &View<'_>, predicate: F) -> Option<f64>
where
    F: Fn(&Record) -> bool,
{
    if view.is_empty() {
        return None;
    }
    let hits = view.records().filter(|r| predicate(r)).count();
    Some(round_to(hits as f64 * 100.0 / view.len() as f64, 2))
}

/// Per-group maximum of `value`, summed over groups. `0` for an empty view.
pub fn sum_of_group_max(
    view: &View<'_>,
    group: &str,
    value: &str,
) -> Result<f64, ConfigurationError> {
    let ds = view.dataset();
    let (g, v) = (ds.column(group)?, ds.numeric_column(value)?);
    Ok(group_max(view, g, v).values().sum())
}

// ---------------------------------------------------------------------------
// Grouped aggregates
// ---------------------------------------------------------------------------

/// Mean of `value` per group, reindexed onto `order`. Groups absent from the
/// view, or with only missing values, come back as `None`. Groups not named in
/// `order` are dropped.
pub fn grouped_mean<S: AsRef<str>>(
    view: &View<'_>,
    group: &str,
    value: &str,
    order: &[S],
) -> Result<Vec<Bucket<Option<f64>>>, ConfigurationError> {
    let by_key = grouped_mean_by_key(view, group, value)?;
    Ok(order
        .iter()
        .map(|label| {
            let key = Value::from(label.as_ref());
            let mean = by_key
                .iter()
                .find(|b| b.key == key)
                .and_then(|b| b.value);
            Bucket::new(key, mean)
        })
        .collect())
}

/// Mean of `value` per non-missing group key, in key order.
pub fn grouped_mean_by_key(
    view: &View<'_>,
    group: &str,
    value: &str,
) -> Result<Vec<Bucket<Option<f64>>>, ConfigurationError> {
    let ds = view.dataset();
    let (g, v) = (ds.column(group)?, ds.numeric_column(value)?);
    let mut groups: BTreeMap<&Value, MeanAcc> = BTreeMap::new();
    for record in view.records() {
        let key = record.get(g);
        if key.is_missing() {
            continue;
        }
        let acc = groups.entry(key).or_default();
        if let Some(x) = record.get(v).as_f64() {
            acc.push(x);
        }
    }
    Ok(groups
        .into_iter()
        .map(|(k, acc)| Bucket::new(k.clone(), acc.mean()))
        .collect())
}

/// Distinct `id` count per non-missing group key, in key order.
pub fn grouped_count_distinct(
    view: &View<'_>,
    group: &str,
    id: &str,
) -> Result<Vec<Bucket<usize>>, ConfigurationError> {
    let ds = view.dataset();
    let (g, i) = (ds.column(group)?, ds.column(id)?);
    let mut groups: BTreeMap<&Value, BTreeSet<&Value>> = BTreeMap::new();
    for record in view.records() {
        let (key, id) = (record.get(g), record.get(i));
        if key.is_missing() {
            continue;
        }
        let ids = groups.entry(key).or_default();
        if !id.is_missing() {
            ids.insert(id);
        }
    }
    Ok(groups
        .into_iter()
        .map(|(k, ids)| Bucket::new(k.clone(), ids.len()))
        .collect())
}

/// Row count per distinct non-missing value, in key order.
pub fn value_counts(view: &View<'_>, column: &str) -> Result<Vec<Bucket<usize>>, ConfigurationError> {
    let idx = view.dataset().column(column)?;
    let mut counts: BTreeMap<&Value, usize> = BTreeMap::new();
    for v in view.values(idx).filter(|v| !v.is_missing()) {
        *counts.entry(v).or_default() += 1;
    }
    Ok(counts
        .into_iter()
        .map(|(k, n)| Bucket::new(k.clone(), n))
        .collect())
}

/// Per-group maximum of `value`, then the `n` largest groups, descending. Ties
/// go to the smaller group key. Fewer groups than `n` are returned as-is.
pub fn top_n(
    view: &View<'_>,
    group: &str,
    value: &str,
    n: usize,
) -> Result<Vec<Bucket<f64>>, ConfigurationError> {
    let ds = view.dataset();
    let (g, v) = (ds.column(group)?, ds.numeric_column(value)?);
    let mut ranked: Vec<Bucket<f64>> = group_max(view, g, v)
        .into_iter()
        .map(|(k, m)| Bucket::new(k.clone(), m))
        .collect();
    ranked.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key)));
    ranked.truncate(n);
    Ok(ranked)
}

/// Sort buckets by value, largest first; `None` sorts last. Stable.
pub fn sort_descending<V: PartialOrd>(buckets: &mut [Bucket<V>]) {
    buckets.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
