use memchr::memchr_iter;
use memmap2::Mmap;
use std::{fs::File, path::Path};

use crate::analysis::{builder::Analysis, AnalyticsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Number,
    Text,
}

/// A single named column. Every cell is optional: empty or unconvertible
/// fields become `None` and stay out of numeric aggregations.
#[derive(Debug, Clone)]
pub enum Column {
    Number(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Number(v) => v.len(),
            Column::Text(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Column::Number(_) => ColumnType::Number,
            Column::Text(_) => ColumnType::Text,
        }
    }

    /// Numeric value at `row`; `None` for missing cells and text columns.
    pub fn number_at(&self, row: usize) -> Option<f64> {
        match self {
            Column::Number(v) => v.get(row).copied().flatten(),
            Column::Text(_) => None,
        }
    }

    /// Text value at `row`; `None` for missing cells and numeric columns.
    pub fn text_at(&self, row: usize) -> Option<&str> {
        match self {
            Column::Text(v) => v.get(row).and_then(|c| c.as_deref()),
            Column::Number(_) => None,
        }
    }
}

/// Outcome of a CSV load: rows kept plus lines dropped for bad arity.
#[derive(Debug)]
pub struct LoadReport {
    pub rows_loaded: usize,
    pub lines_skipped: usize,
}

/// In-memory tabular dataset: named columns over a fixed row count.
///
/// # Examples
///
/// ```rust,no_run
/// # use enrollment_analytics::analysis::dataset::Dataset;
/// let mut ds = Dataset::new();
/// ds.load_csv("enrollment.csv".as_ref()).unwrap();
/// println!("{} records", ds.row_count());
/// ```
#[derive(Debug, Default)]
pub struct Dataset {
    headers: Vec<String>,
    columns: Vec<Column>,
    row_count: usize,
}

impl Dataset {
    /// Create an empty dataset
    pub fn new() -> Self {
        Dataset {
            headers: Vec::new(),
            columns: Vec::new(),
            row_count: 0,
        }
    }

    /// Build a dataset from pre-parsed columns. All columns must share the
    /// same length.
    pub fn from_columns(columns: Vec<(&str, Column)>) -> Result<Self> {
        let row_count = columns.first().map(|(_, c)| c.len()).unwrap_or(0);
        for (name, col) in &columns {
            if col.len() != row_count {
                return Err(AnalyticsError::Parse(format!(
                    "column {} has {} rows, expected {}",
                    name,
                    col.len(),
                    row_count
                )));
            }
        }
        Ok(Dataset {
            headers: columns.iter().map(|(n, _)| n.to_string()).collect(),
            columns: columns.into_iter().map(|(_, c)| c).collect(),
            row_count,
        })
    }

    /// Loads a CSV file into memory using memory mapping.
    ///
    /// Column types are inferred from the first non-empty value of each
    /// column (a field `fast-float` can parse makes the column numeric).
    /// Empty and unconvertible numeric fields become missing values; they
    /// never abort the load. Lines with the wrong field count are dropped
    /// and counted in the [`LoadReport`].
    pub fn load_csv(&mut self, path: &Path) -> Result<LoadReport> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };
        let buf: &[u8] = &mmap[..];

        // Parse header
        let header_end = buf
            .iter()
            .position(|&b| b == b'\n')
            .ok_or_else(|| AnalyticsError::Parse("missing header line".into()))?;
        let header_line = strip_cr(&buf[..header_end]);
        let headers: Vec<String> = header_line
            .split(|&b| b == b',')
            .map(|s| String::from_utf8_lossy(s).trim().to_string())
            .collect();
        let num_cols = headers.len();

        let data = &buf[header_end + 1..];
        let schema = Self::infer_schema(data, num_cols);

        let mut columns: Vec<Column> = schema
            .iter()
            .map(|ty| match ty {
                ColumnType::Number => Column::Number(Vec::new()),
                ColumnType::Text => Column::Text(Vec::new()),
            })
            .collect();

        let mut rows_loaded = 0;
        let mut lines_skipped = 0;
        let mut fields: Vec<&[u8]> = Vec::with_capacity(num_cols);

        for line in iter_lines(data) {
            let line = strip_cr(line);
            if line.is_empty() {
                continue;
            }

            split_fields(line, &mut fields);
            if fields.len() != num_cols {
                lines_skipped += 1;
                continue;
            }

            for (col, field) in columns.iter_mut().zip(&fields) {
                match col {
                    Column::Number(values) => {
                        values.push(parse_number(field));
                    }
                    Column::Text(values) => {
                        let text = String::from_utf8_lossy(field);
                        let text = text.trim();
                        values.push(if text.is_empty() {
                            None
                        } else {
                            Some(text.to_string())
                        });
                    }
                }
            }
            rows_loaded += 1;
        }

        tracing::debug!(rows_loaded, lines_skipped, columns = num_cols, "csv loaded");

        self.headers = headers;
        self.columns = columns;
        self.row_count = rows_loaded;

        Ok(LoadReport {
            rows_loaded,
            lines_skipped,
        })
    }

    /// One column type per header: numeric when the first non-empty field
    /// in that column parses as a float, text otherwise (or when the
    /// column never has a value).
    fn infer_schema(data: &[u8], num_cols: usize) -> Vec<ColumnType> {
        let mut schema: Vec<Option<ColumnType>> = vec![None; num_cols];
        let mut unresolved = num_cols;
        let mut fields: Vec<&[u8]> = Vec::with_capacity(num_cols);

        for line in iter_lines(data) {
            let line = strip_cr(line);
            if line.is_empty() {
                continue;
            }
            split_fields(line, &mut fields);
            if fields.len() != num_cols {
                continue;
            }
            for (slot, field) in schema.iter_mut().zip(&fields) {
                if slot.is_some() || field.is_empty() {
                    continue;
                }
                *slot = Some(if parse_number(field).is_some() {
                    ColumnType::Number
                } else {
                    ColumnType::Text
                });
                unresolved -= 1;
            }
            if unresolved == 0 {
                break;
            }
        }

        schema
            .into_iter()
            .map(|ty| ty.unwrap_or(ColumnType::Text))
            .collect()
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h == name)
    }

    pub fn get_col(&self, name: &str) -> Result<&Column> {
        let pos = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))?;
        self.columns
            .get(pos)
            .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))
    }

    /// Add a text column computed cell-by-cell from an existing one.
    /// The transform sees `None` for missing cells and its output must not
    /// depend on anything but the input value.
    pub fn derive_text(
        &mut self,
        new_name: &str,
        source: &str,
        f: impl Fn(Option<&str>) -> Option<String>,
    ) -> Result<()> {
        let src = self.get_col(source)?;
        let derived: Vec<Option<String>> = match src {
            Column::Text(values) => values.iter().map(|v| f(v.as_deref())).collect(),
            Column::Number(_) => {
                return Err(AnalyticsError::TypeMismatch(source.to_string()));
            }
        };
        self.headers.push(new_name.to_string());
        self.columns.push(Column::Text(derived));
        Ok(())
    }

    /// Rewrite a text column in place with a pure per-cell transform;
    /// missing cells stay missing.
    pub fn canonicalize_text(&mut self, name: &str, f: impl Fn(&str) -> String) -> Result<()> {
        let pos = self
            .headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalyticsError::MissingColumn(name.to_string()))?;
        match &mut self.columns[pos] {
            Column::Text(values) => {
                for value in values.iter_mut() {
                    if let Some(v) = value {
                        *value = Some(f(v));
                    }
                }
                Ok(())
            }
            Column::Number(_) => Err(AnalyticsError::TypeMismatch(name.to_string())),
        }
    }

    /// Start a filter/group/reduce chain over this dataset.
    pub fn analyze(&self) -> Analysis<'_> {
        Analysis::over(self)
    }
}

/// Numeric coercion used everywhere a number is expected: empty or
/// unparsable fields are missing, never an error.
fn parse_number(field: &[u8]) -> Option<f64> {
    let field = trim_bytes(field);
    if field.is_empty() {
        return None;
    }
    fast_float::parse::<f64, _>(field).ok()
}

fn trim_bytes(mut field: &[u8]) -> &[u8] {
    while let [b' ' | b'\t', rest @ ..] = field {
        field = rest;
    }
    while let [rest @ .., b' ' | b'\t'] = field {
        field = rest;
    }
    field
}

fn strip_cr(line: &[u8]) -> &[u8] {
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn split_fields<'a>(line: &'a [u8], fields: &mut Vec<&'a [u8]>) {
    fields.clear();
    let mut start = 0;
    for comma_pos in memchr_iter(b',', line) {
        fields.push(&line[start..comma_pos]);
        start = comma_pos + 1;
    }
    fields.push(&line[start..]);
}

fn iter_lines(data: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut start = 0;
    let mut done = false;
    let mut newlines = memchr_iter(b'\n', data);
    std::iter::from_fn(move || {
        if done {
            return None;
        }
        match newlines.next() {
            Some(pos) => {
                let line = &data[start..pos];
                start = pos + 1;
                Some(line)
            }
            None => {
                done = true;
                if start < data.len() {
                    Some(&data[start..])
                } else {
                    None
                }
            }
        }
    })
}
