//! Chainable filter / group / reduce pipeline over a dataset.

use crate::analysis::{
    dataset::Dataset,
    engine::{self, SummaryTable},
    filter::{all_rows, RowFilter},
    Result,
};

/// One analysis over a dataset: a filter chain, optional group keys, and
/// a terminal reducer. Each terminal call recomputes from the dataset;
/// results are never cached.
///
/// # Examples
///
/// ```rust
/// # use enrollment_analytics::analysis::{dataset::Dataset, filter::RowFilter};
/// # fn demo(ds: &Dataset) -> enrollment_analytics::analysis::Result<()> {
/// let by_year = ds
///     .analyze()
///     .filter(RowFilter::IntegralYear { column: "enrollment_year".into() })
///     .group_by(&["enrollment_year"])
///     .count()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Analysis<'a> {
    dataset: &'a Dataset,
    filters: Vec<RowFilter>,
    group_columns: Vec<String>,
}

impl<'a> Analysis<'a> {
    pub fn over(dataset: &'a Dataset) -> Self {
        Analysis {
            dataset,
            filters: Vec::new(),
            group_columns: Vec::new(),
        }
    }

    /// Add a filter; filters apply in order and AND together.
    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Set the grouping key columns (tuple order is the field order).
    pub fn group_by(mut self, columns: &[&str]) -> Self {
        self.group_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    /// Row indices surviving the filter chain, in dataset order.
    pub fn rows(&self) -> Result<Vec<usize>> {
        let mut rows = all_rows(self.dataset);
        for filter in &self.filters {
            rows = filter.apply(self.dataset, &rows)?;
        }
        Ok(rows)
    }

    /// Count of rows per group.
    pub fn count(&self) -> Result<SummaryTable> {
        let rows = self.rows()?;
        engine::group_count(self.dataset, &rows, &self.group_refs())
    }

    /// Mean of a numeric column per group, over present values.
    pub fn mean(&self, value_column: &str) -> Result<SummaryTable> {
        let rows = self.rows()?;
        engine::group_mean(self.dataset, &rows, &self.group_refs(), value_column)
    }

    fn group_refs(&self) -> Vec<&str> {
        self.group_columns.iter().map(|s| s.as_str()).collect()
    }
}
