//! Declarative row filters.
//!
//! Each filter maps (dataset, input rows) to an order-preserving subset
//! of those rows. Filters compose by sequential application; predicates
//! commute, but `MinGroupCount` counts over its own input, so counting
//! happens before its semi-join and after whatever filters precede it in
//! the chain.

use std::collections::HashMap;

use crate::analysis::{
    dataset::{Column, Dataset},
    engine::row_key,
    normalize::KeywordMatcher,
    AnalyticsError, GroupKey, Result,
};

#[derive(Debug, Clone)]
pub enum RowFilter {
    /// Keep rows whose numeric value is exactly an integer (discrete year
    /// buckets).
    IntegralYear { column: String },
    /// Keep rows with `value >= threshold`.
    AtLeast { column: String, threshold: f64 },
    /// Keep rows with `value < threshold`.
    Before { column: String, threshold: f64 },
    /// Keep rows whose value is a member of the allowed set.
    OneOf { column: String, values: Vec<f64> },
    /// Keep rows with a present value in every listed column.
    NonNull { columns: Vec<String> },
    /// Keep rows whose text value contains one of the matcher's keywords.
    KeywordAny {
        column: String,
        matcher: KeywordMatcher,
    },
    /// Two-pass minimum group size: count rows per key tuple over this
    /// filter's input, then keep only rows whose tuple reached `min`.
    MinGroupCount { key_columns: Vec<String>, min: usize },
}

impl RowFilter {
    pub fn keyword(column: &str, matcher: KeywordMatcher) -> Self {
        RowFilter::KeywordAny {
            column: column.to_string(),
            matcher,
        }
    }

    pub fn non_null(columns: &[&str]) -> Self {
        RowFilter::NonNull {
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// Apply the filter, returning the retained subsequence of `rows`.
    pub fn apply(&self, ds: &Dataset, rows: &[usize]) -> Result<Vec<usize>> {
        match self {
            RowFilter::IntegralYear { column } => {
                let col = numeric_col(ds, column)?;
                Ok(retain(rows, |row| {
                    col.number_at(row)
                        .is_some_and(|v| v.is_finite() && v.fract() == 0.0)
                }))
            }

            RowFilter::AtLeast { column, threshold } => {
                let col = numeric_col(ds, column)?;
                Ok(retain(rows, |row| {
                    col.number_at(row).is_some_and(|v| v >= *threshold)
                }))
            }

            RowFilter::Before { column, threshold } => {
                let col = numeric_col(ds, column)?;
                Ok(retain(rows, |row| {
                    col.number_at(row).is_some_and(|v| v < *threshold)
                }))
            }

            RowFilter::OneOf { column, values } => {
                let col = numeric_col(ds, column)?;
                Ok(retain(rows, |row| {
                    col.number_at(row)
                        .is_some_and(|v| values.iter().any(|&allowed| allowed == v))
                }))
            }

            RowFilter::NonNull { columns } => {
                let cols: Vec<&Column> = columns
                    .iter()
                    .map(|name| ds.get_col(name))
                    .collect::<Result<_>>()?;
                Ok(retain(rows, |row| {
                    cols.iter().all(|col| match col {
                        Column::Number(_) => col.number_at(row).is_some(),
                        Column::Text(_) => col.text_at(row).is_some(),
                    })
                }))
            }

            RowFilter::KeywordAny { column, matcher } => {
                let col = ds.get_col(column)?;
                match col {
                    Column::Text(_) => {
                        Ok(retain(rows, |row| matcher.matches(col.text_at(row))))
                    }
                    Column::Number(_) => Err(AnalyticsError::TypeMismatch(column.clone())),
                }
            }

            RowFilter::MinGroupCount { key_columns, min } => {
                let key_refs: Vec<&str> = key_columns.iter().map(|s| s.as_str()).collect();

                // first pass: counts over the input rows
                let mut counts: HashMap<GroupKey, usize> = HashMap::new();
                for &row in rows {
                    if let Some(key) = row_key(ds, &key_refs, row)? {
                        *counts.entry(key).or_insert(0) += 1;
                    }
                }

                // second pass: semi-join against qualifying keys
                let mut out = Vec::new();
                for &row in rows {
                    if let Some(key) = row_key(ds, &key_refs, row)? {
                        if counts.get(&key).copied().unwrap_or(0) >= *min {
                            out.push(row);
                        }
                    }
                }
                Ok(out)
            }
        }
    }
}

/// All row indices of a dataset, the identity input for a filter chain.
pub fn all_rows(ds: &Dataset) -> Vec<usize> {
    (0..ds.row_count()).collect()
}

fn numeric_col<'a>(ds: &'a Dataset, name: &str) -> Result<&'a Column> {
    let col = ds.get_col(name)?;
    match col {
        Column::Number(_) => Ok(col),
        Column::Text(_) => Err(AnalyticsError::TypeMismatch(name.to_string())),
    }
}

fn retain(rows: &[usize], mut keep: impl FnMut(usize) -> bool) -> Vec<usize> {
    rows.iter().copied().filter(|&row| keep(row)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dataset::Column;
    use crate::analysis::normalize;

    fn year_program_dataset() -> Dataset {
        let years: Vec<Option<f64>> = vec![
            Some(2009.0),
            Some(2010.5),
            Some(2012.0),
            Some(2012.0),
            Some(2020.0),
            None,
        ];
        let programs: Vec<Option<String>> = vec![
            Some("Enfermería".into()),
            Some("Agronomía".into()),
            Some("Enfermería".into()),
            Some("Enfermería".into()),
            Some("Derecho".into()),
            Some("Derecho".into()),
        ];
        Dataset::from_columns(vec![
            ("enrollment_year", Column::Number(years)),
            ("program_name", Column::Text(programs)),
        ])
        .unwrap()
    }

    #[test]
    fn test_integral_year_rejects_fractional_and_missing() {
        let ds = year_program_dataset();
        let filter = RowFilter::IntegralYear {
            column: "enrollment_year".into(),
        };
        let rows = filter.apply(&ds, &all_rows(&ds)).unwrap();
        assert_eq!(rows, vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_year_floor() {
        let ds = year_program_dataset();
        let filter = RowFilter::AtLeast {
            column: "enrollment_year".into(),
            threshold: 2010.0,
        };
        assert_eq!(filter.apply(&ds, &all_rows(&ds)).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_value_set_membership() {
        let ds = year_program_dataset();
        let filter = RowFilter::OneOf {
            column: "enrollment_year".into(),
            values: vec![2020.0, 2021.0],
        };
        assert_eq!(filter.apply(&ds, &all_rows(&ds)).unwrap(), vec![4]);
    }

    #[test]
    fn test_non_null_multi_column() {
        let ds = year_program_dataset();
        let filter = RowFilter::non_null(&["enrollment_year", "program_name"]);
        assert_eq!(
            filter.apply(&ds, &all_rows(&ds)).unwrap(),
            vec![0, 1, 2, 3, 4]
        );
    }

    #[test]
    fn test_keyword_filter_folds_diacritics() {
        let ds = year_program_dataset();
        let filter = RowFilter::keyword("program_name", normalize::health_programs());
        assert_eq!(filter.apply(&ds, &all_rows(&ds)).unwrap(), vec![0, 2, 3]);
    }

    #[test]
    fn test_min_group_count_counts_before_semi_join() {
        let ds = year_program_dataset();
        let min_group = RowFilter::MinGroupCount {
            key_columns: vec!["enrollment_year".into(), "program_name".into()],
            min: 2,
        };
        // only (2012, Enfermería) reaches two rows
        let rows = min_group.apply(&ds, &all_rows(&ds)).unwrap();
        assert_eq!(rows, vec![2, 3]);

        // counting happens on the filter's own input: shrink the input so
        // the pair no longer qualifies
        let rows = min_group.apply(&ds, &[2, 4]).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_filters_commute() {
        let ds = year_program_dataset();
        let a = RowFilter::IntegralYear {
            column: "enrollment_year".into(),
        };
        let b = RowFilter::AtLeast {
            column: "enrollment_year".into(),
            threshold: 2010.0,
        };
        let ab = b.apply(&ds, &a.apply(&ds, &all_rows(&ds)).unwrap()).unwrap();
        let ba = a.apply(&ds, &b.apply(&ds, &all_rows(&ds)).unwrap()).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_missing_column_surfaces_as_error() {
        let ds = year_program_dataset();
        let filter = RowFilter::AtLeast {
            column: "age".into(),
            threshold: 18.0,
        };
        assert!(matches!(
            filter.apply(&ds, &all_rows(&ds)),
            Err(AnalyticsError::MissingColumn(_))
        ));
    }
}
