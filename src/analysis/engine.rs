//! Grouping and reduction over a filtered row subset.
//!
//! Every function here is a pure function of the dataset and the row
//! indices it is given; summary tables are built fresh per call and are
//! immutable afterwards.

use std::collections::BTreeMap;

use crate::analysis::{
    dataset::{Column, Dataset},
    AnalyticsError, GroupKey, Key, Result, StatValue,
};
use crate::helpers::stat_helpers;

/// Key tuple for one row, in the requested field order.
///
/// `Ok(None)` means the row cannot form a group because a key value is
/// missing; such rows are left out of the grouping.
pub fn row_key(ds: &Dataset, key_columns: &[&str], row: usize) -> Result<Option<GroupKey>> {
    let mut parts = Vec::with_capacity(key_columns.len());
    for name in key_columns {
        let col = ds.get_col(name)?;
        let part = match col {
            Column::Number(_) => col.number_at(row).map(Key::Num),
            Column::Text(_) => col.text_at(row).map(|s| Key::Text(s.to_string())),
        };
        match part {
            Some(key) => parts.push(key),
            None => return Ok(None),
        }
    }
    Ok(Some(GroupKey(parts)))
}

/// Ordered mapping from group key to one computed statistic.
///
/// Entries are held in ascending key order so repeated runs over the same
/// data produce identical tables.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryTable {
    entries: Vec<(GroupKey, StatValue)>,
}

impl SummaryTable {
    fn from_map(map: BTreeMap<GroupKey, StatValue>) -> Self {
        SummaryTable {
            entries: map.into_iter().collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(GroupKey, StatValue)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn get(&self, key: &GroupKey) -> Option<StatValue> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|&(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all present statistic values; the grand total for a count
    /// table.
    pub fn total(&self) -> f64 {
        self.entries
            .iter()
            .filter_map(|(_, v)| v.as_f64())
            .sum()
    }

    /// Share of a reference table, key by key, as a percentage.
    ///
    /// Keys come from the reference table. A key absent from `self`
    /// contributes 0; a zero (or missing) reference value yields 0 rather
    /// than an undefined ratio, so the table stays renderable.
    pub fn percentage_of(&self, reference: &SummaryTable) -> SummaryTable {
        let entries = reference
            .iter()
            .map(|(key, ref_value)| {
                let reference_total = ref_value.as_f64().unwrap_or(0.0);
                let subset = self.get(key).and_then(|v| v.as_f64()).unwrap_or(0.0);
                let pct = if reference_total > 0.0 {
                    subset / reference_total * 100.0
                } else {
                    0.0
                };
                (key.clone(), StatValue::Float(pct))
            })
            .collect();
        SummaryTable { entries }
    }

    /// The `k` entries with the largest values, descending. The sort is
    /// stable, so ties keep the table's key order; `Missing` entries are
    /// not ranked.
    pub fn top_k(&self, k: usize) -> Vec<(GroupKey, f64)> {
        let mut ranked: Vec<(GroupKey, f64)> = self
            .entries
            .iter()
            .filter_map(|(key, v)| v.as_f64().map(|v| (key.clone(), v)))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(k);
        ranked
    }

    /// The `k` entries with the smallest values, ascending; same tie and
    /// missing-value rules as [`SummaryTable::top_k`].
    pub fn bottom_k(&self, k: usize) -> Vec<(GroupKey, f64)> {
        let mut ranked: Vec<(GroupKey, f64)> = self
            .entries
            .iter()
            .filter_map(|(key, v)| v.as_f64().map(|v| (key.clone(), v)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(k);
        ranked
    }
}

impl<'a> IntoIterator for &'a SummaryTable {
    type Item = &'a (GroupKey, StatValue);
    type IntoIter = std::slice::Iter<'a, (GroupKey, StatValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Number of rows per group. Rows missing a key value are excluded; every
/// other row counts exactly once.
pub fn group_count(ds: &Dataset, rows: &[usize], key_columns: &[&str]) -> Result<SummaryTable> {
    let mut counts: BTreeMap<GroupKey, i64> = BTreeMap::new();
    for &row in rows {
        if let Some(key) = row_key(ds, key_columns, row)? {
            *counts.entry(key).or_insert(0) += 1;
        }
    }
    Ok(SummaryTable::from_map(
        counts
            .into_iter()
            .map(|(k, n)| (k, StatValue::Int(n)))
            .collect(),
    ))
}

/// Mean of a numeric column per group, over present values only.
///
/// A group whose every value is missing gets `StatValue::Missing`, never
/// 0; consumers must handle it.
pub fn group_mean(
    ds: &Dataset,
    rows: &[usize],
    key_columns: &[&str],
    value_column: &str,
) -> Result<SummaryTable> {
    let values = ds.get_col(value_column)?;
    if values.column_type() != super::dataset::ColumnType::Number {
        return Err(AnalyticsError::TypeMismatch(value_column.to_string()));
    }

    let mut groups: BTreeMap<GroupKey, Vec<f64>> = BTreeMap::new();
    for &row in rows {
        if let Some(key) = row_key(ds, key_columns, row)? {
            let bucket = groups.entry(key).or_default();
            if let Some(v) = values.number_at(row) {
                bucket.push(v);
            }
        }
    }

    Ok(SummaryTable::from_map(
        groups
            .into_iter()
            .map(|(key, present)| {
                let stat = match stat_helpers::mean(&present) {
                    Some(m) => StatValue::Float(m),
                    None => StatValue::Missing,
                };
                (key, stat)
            })
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dataset::Column;

    fn gender_year_dataset() -> Dataset {
        Dataset::from_columns(vec![
            (
                "enrollment_year",
                Column::Number(vec![
                    Some(2019.0),
                    Some(2019.0),
                    Some(2019.0),
                    Some(2020.0),
                ]),
            ),
            (
                "gender",
                Column::Text(vec![
                    Some("F".into()),
                    Some("M".into()),
                    Some("F".into()),
                    Some("M".into()),
                ]),
            ),
        ])
        .unwrap()
    }

    fn all_rows(ds: &Dataset) -> Vec<usize> {
        (0..ds.row_count()).collect()
    }

    #[test]
    fn test_group_count_partitions_every_row() {
        let ds = gender_year_dataset();
        let rows = all_rows(&ds);
        let table = group_count(&ds, &rows, &["enrollment_year"]).unwrap();
        assert_eq!(table.get(&GroupKey::year(2019)), Some(StatValue::Int(3)));
        assert_eq!(table.get(&GroupKey::year(2020)), Some(StatValue::Int(1)));
        // per-key counts add back up to the filtered set
        assert_eq!(table.total(), rows.len() as f64);
    }

    #[test]
    fn test_group_count_multi_key_tuple_order() {
        let ds = gender_year_dataset();
        let rows = all_rows(&ds);
        let table = group_count(&ds, &rows, &["enrollment_year", "gender"]).unwrap();
        let key = GroupKey(vec![Key::Num(2019.0), Key::Text("F".into())]);
        assert_eq!(table.get(&key), Some(StatValue::Int(2)));
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_percentage_of_reference_keys_and_zero_fill() {
        let ds = gender_year_dataset();
        let rows = all_rows(&ds);
        let totals = group_count(&ds, &rows, &["enrollment_year"]).unwrap();

        let female: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&r| ds.get_col("gender").unwrap().text_at(r) == Some("F"))
            .collect();
        let female_by_year = group_count(&ds, &female, &["enrollment_year"]).unwrap();
        let share = female_by_year.percentage_of(&totals);

        let y2019 = share.get(&GroupKey::year(2019)).unwrap().as_f64().unwrap();
        let y2020 = share.get(&GroupKey::year(2020)).unwrap().as_f64().unwrap();
        assert!((y2019 - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(y2020, 0.0);
    }

    #[test]
    fn test_percentage_zero_reference_is_zero() {
        let subset = SummaryTable {
            entries: vec![(GroupKey::year(2019), StatValue::Int(2))],
        };
        let reference = SummaryTable {
            entries: vec![(GroupKey::year(2019), StatValue::Int(0))],
        };
        let share = subset.percentage_of(&reference);
        assert_eq!(
            share.get(&GroupKey::year(2019)),
            Some(StatValue::Float(0.0))
        );
    }

    #[test]
    fn test_group_mean_skips_missing_values() {
        let ds = Dataset::from_columns(vec![
            (
                "modality",
                Column::Text(vec![
                    Some("PRESENCIAL".into()),
                    Some("PRESENCIAL".into()),
                    Some("A DISTANCIA".into()),
                ]),
            ),
            ("age", Column::Number(vec![Some(20.0), None, None])),
        ])
        .unwrap();
        let table = group_mean(&ds, &[0, 1, 2], &["modality"], "age").unwrap();
        assert_eq!(
            table.get(&GroupKey::text("PRESENCIAL")),
            Some(StatValue::Float(20.0))
        );
        // all values missing: the mean is missing, not zero
        assert_eq!(
            table.get(&GroupKey::text("A DISTANCIA")),
            Some(StatValue::Missing)
        );
    }

    #[test]
    fn test_group_mean_requires_numeric_column() {
        let ds = gender_year_dataset();
        let err = group_mean(&ds, &[0, 1], &["enrollment_year"], "gender").unwrap_err();
        assert!(matches!(err, AnalyticsError::TypeMismatch(_)));
    }

    #[test]
    fn test_rows_with_missing_key_are_excluded() {
        let ds = Dataset::from_columns(vec![(
            "enrollment_year",
            Column::Number(vec![Some(2019.0), None, Some(2020.0)]),
        )])
        .unwrap();
        let table = group_count(&ds, &[0, 1, 2], &["enrollment_year"]).unwrap();
        assert_eq!(table.total(), 2.0);
    }

    #[test]
    fn test_top_k_stable_ties_and_size() {
        let table = SummaryTable {
            entries: vec![
                (GroupKey::text("a"), StatValue::Float(10.0)),
                (GroupKey::text("b"), StatValue::Float(30.0)),
                (GroupKey::text("c"), StatValue::Float(30.0)),
                (GroupKey::text("d"), StatValue::Missing),
            ],
        };
        let top = table.top_k(2);
        // ties keep key order: b before c
        assert_eq!(top[0].0, GroupKey::text("b"));
        assert_eq!(top[1].0, GroupKey::text("c"));

        // k larger than distinct rankable keys
        assert_eq!(table.top_k(10).len(), 3);

        let bottom = table.bottom_k(1);
        assert_eq!(bottom[0].0, GroupKey::text("a"));
    }

    #[test]
    fn test_missing_key_column_is_an_error_not_a_panic() {
        let ds = gender_year_dataset();
        let err = group_count(&ds, &[0], &["campus_commune"]).unwrap_err();
        assert!(matches!(err, AnalyticsError::MissingColumn(_)));
    }
}
