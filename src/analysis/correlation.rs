//! Pairwise Pearson correlation over numeric columns.

use crate::analysis::{
    dataset::{Column, Dataset},
    Result,
};
use crate::helpers::stat_helpers;

/// Pearson correlation between two numeric columns over the rows where
/// both values are present. `Ok(None)` means the coefficient is undefined
/// (too few pairs or zero variance); a missing column is an error the
/// caller can turn into a skipped analysis.
pub fn field_correlation(
    ds: &Dataset,
    rows: &[usize],
    a: &str,
    b: &str,
) -> Result<Option<f64>> {
    let col_a = ds.get_col(a)?;
    let col_b = ds.get_col(b)?;
    Ok(paired_correlation(col_a, col_b, rows))
}

fn paired_correlation(a: &Column, b: &Column, rows: &[usize]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = rows
        .iter()
        .filter_map(|&row| match (a.number_at(row), b.number_at(row)) {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .collect();
    stat_helpers::pearson(&pairs)
}

/// Symmetric field-by-field correlation matrix.
///
/// Fields absent from the dataset (or non-numeric) still get a row and a
/// column, filled with NaN, so one bad field never aborts the profile.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    fields: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn compute(ds: &Dataset, rows: &[usize], fields: &[&str]) -> Self {
        let columns: Vec<Option<&Column>> = fields
            .iter()
            .map(|name| match ds.get_col(name) {
                Ok(col @ Column::Number(_)) => Some(col),
                _ => None,
            })
            .collect();

        let n = fields.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = match (columns[i], columns[j]) {
                    (Some(a), Some(b)) => {
                        paired_correlation(a, b, rows).unwrap_or(f64::NAN)
                    }
                    _ => f64::NAN,
                };
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        CorrelationMatrix {
            fields: fields.iter().map(|f| f.to_string()).collect(),
            values,
        }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Coefficient for a field pair; `None` when either field is not part
    /// of the matrix. An undefined coefficient comes back as NaN.
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.fields.iter().position(|f| f == a)?;
        let j = self.fields.iter().position(|f| f == b)?;
        Some(self.values[i][j])
    }

    /// Every unordered pair of distinct fields, exactly once, whose
    /// absolute coefficient exceeds `threshold`. NaN entries are skipped.
    pub fn strong_pairs(&self, threshold: f64) -> Vec<(String, String, f64)> {
        let mut out = Vec::new();
        for i in 0..self.fields.len() {
            for j in (i + 1)..self.fields.len() {
                let r = self.values[i][j];
                if r.is_finite() && r.abs() > threshold {
                    out.push((self.fields[i].clone(), self.fields[j].clone(), r));
                }
            }
        }
        out
    }
}
