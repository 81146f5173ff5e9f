use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::hash::Hasher;
use thiserror::Error;

pub mod builder;
pub mod correlation;
pub mod dataset;
pub mod engine;
pub mod filter;
pub mod normalize;
pub mod schema;
pub mod suite;

/// Error type used across the crate
#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("UTF8 error: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("malformed table: {0}")]
    Parse(String),

    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("column {0} has the wrong type for this operation")]
    TypeMismatch(String),
}

pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// One component of a group key.
///
/// Numbers compare by total order (NaN sorts last within numbers) so keys
/// can live in ordered tables; equality and hashing go through the bit
/// pattern.
#[derive(Debug, Clone)]
pub enum Key {
    Num(f64),
    Text(String),
}

impl PartialEq for Key {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Key::Num(a), Key::Num(b)) => a.to_bits() == b.to_bits(),
            (Key::Text(a), Key::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Key {}

impl Hash for Key {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Key::Num(v) => v.to_bits().hash(state),
            Key::Text(s) => s.hash(state),
        }
    }
}

impl Ord for Key {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Key::Num(a), Key::Num(b)) => a.total_cmp(b),
            (Key::Text(a), Key::Text(b)) => a.cmp(b),
            (Key::Num(_), Key::Text(_)) => Ordering::Less,
            (Key::Text(_), Key::Num(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for Key {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Num(v) if v.fract() == 0.0 && v.is_finite() => write!(f, "{}", *v as i64),
            Key::Num(v) => write!(f, "{v}"),
            Key::Text(s) => write!(f, "{s}"),
        }
    }
}

/// Group key: the tuple of key-column values in the requested field order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GroupKey(pub Vec<Key>);

impl GroupKey {
    pub fn single(key: Key) -> Self {
        GroupKey(vec![key])
    }

    pub fn year(year: i64) -> Self {
        GroupKey::single(Key::Num(year as f64))
    }

    pub fn text(value: &str) -> Self {
        GroupKey::single(Key::Text(value.to_string()))
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " / ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// One computed statistic inside a summary table.
///
/// `Missing` marks a group whose statistic is undefined (e.g. a mean over
/// zero present values); it is deliberately distinct from 0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Int(i64),
    Float(f64),
    Missing,
}

impl StatValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            StatValue::Int(v) => Some(*v as f64),
            StatValue::Float(v) => Some(*v),
            StatValue::Missing => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Int(v) => write!(f, "{v}"),
            StatValue::Float(v) => write!(f, "{v:.1}"),
            StatValue::Missing => write!(f, "-"),
        }
    }
}
