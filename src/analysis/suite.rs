//! The exploratory analyses run over an enrollment dataset.
//!
//! Each function is a pure read of the dataset and returns `Err` when a
//! required column is absent; the caller decides whether that skips the
//! analysis (the binary does) or fails a test. None of these functions
//! mutate the dataset except [`prepare`].

use crate::analysis::{
    correlation::{self, CorrelationMatrix},
    dataset::Dataset,
    engine::SummaryTable,
    filter::RowFilter,
    normalize::{self, KeywordMatcher},
    schema, GroupKey, Result,
};

/// Derive the columns the analyses expect: the folded program name and
/// the canonical (trimmed, upper-cased) gender. Safe to call on datasets
/// lacking either source column.
pub fn prepare(ds: &mut Dataset) -> Result<()> {
    if ds.has_column(schema::PROGRAM_NAME) && !ds.has_column(schema::NORMALIZED_PROGRAM_NAME) {
        ds.derive_text(schema::NORMALIZED_PROGRAM_NAME, schema::PROGRAM_NAME, |v| {
            Some(normalize::fold_text(v))
        })?;
    }
    if ds.has_column(schema::GENDER) {
        ds.canonicalize_text(schema::GENDER, normalize::canon_category)?;
    }
    Ok(())
}

fn year_floor() -> RowFilter {
    RowFilter::AtLeast {
        column: schema::ENROLLMENT_YEAR.into(),
        threshold: schema::YEAR_FLOOR,
    }
}

fn integral_year() -> RowFilter {
    RowFilter::IntegralYear {
        column: schema::ENROLLMENT_YEAR.into(),
    }
}

fn program_keyword(matcher: KeywordMatcher) -> RowFilter {
    RowFilter::keyword(schema::NORMALIZED_PROGRAM_NAME, matcher)
}

fn female_rows() -> RowFilter {
    RowFilter::keyword(schema::GENDER, normalize::female_markers())
}

/// Enrollment counts per discrete year (fractional year values dropped).
pub fn enrollment_by_year(ds: &Dataset) -> Result<SummaryTable> {
    ds.analyze()
        .filter(integral_year())
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()
}

/// Per-year counts of a keyword-defined program subset plus the subset's
/// percentage of each year's total enrollment.
#[derive(Debug)]
pub struct KeywordTrend {
    pub counts: SummaryTable,
    pub share: SummaryTable,
}

pub fn keyword_trend(ds: &Dataset, matcher: KeywordMatcher) -> Result<KeywordTrend> {
    let counts = ds
        .analyze()
        .filter(program_keyword(matcher))
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()?;
    let totals = ds.analyze().group_by(&[schema::ENROLLMENT_YEAR]).count()?;
    let share = counts.percentage_of(&totals);
    Ok(KeywordTrend { counts, share })
}

/// Per-year counts of the keyword subset restricted to one gender.
pub fn gender_keyword_trend(
    ds: &Dataset,
    program_matcher: KeywordMatcher,
    gender_matcher: KeywordMatcher,
) -> Result<SummaryTable> {
    ds.analyze()
        .filter(program_keyword(program_matcher))
        .filter(RowFilter::keyword(schema::GENDER, gender_matcher))
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()
}

/// Keyword-subset enrollment per year, split into the years before the
/// pandemic and the 2020/2021 pandemic period.
#[derive(Debug)]
pub struct PandemicSplit {
    pub before: SummaryTable,
    pub during: SummaryTable,
}

pub fn pandemic_comparison(ds: &Dataset, matcher: KeywordMatcher) -> Result<PandemicSplit> {
    let subset = ds
        .analyze()
        .filter(integral_year())
        .filter(program_keyword(matcher));
    let before = subset
        .clone()
        .filter(RowFilter::Before {
            column: schema::ENROLLMENT_YEAR.into(),
            threshold: schema::PANDEMIC_YEARS[0],
        })
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()?;
    let during = subset
        .filter(RowFilter::OneOf {
            column: schema::ENROLLMENT_YEAR.into(),
            values: schema::PANDEMIC_YEARS.to_vec(),
        })
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()?;
    Ok(PandemicSplit { before, during })
}

/// Record counts per canonical gender value.
pub fn gender_distribution(ds: &Dataset) -> Result<SummaryTable> {
    ds.analyze().group_by(&[schema::GENDER]).count()
}

/// Percentage of women per enrollment year, restricted to years from the
/// floor onward and to (year, program) pairs with at least the minimum
/// enrollment.
pub fn female_share_by_year(ds: &Dataset) -> Result<SummaryTable> {
    let base = ds.analyze().filter(year_floor()).filter(RowFilter::MinGroupCount {
        key_columns: vec![schema::ENROLLMENT_YEAR.into(), schema::PROGRAM_NAME.into()],
        min: schema::MIN_PROGRAM_YEAR_ENROLLMENT,
    });
    let totals = base
        .clone()
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()?;
    let women = base
        .filter(female_rows())
        .group_by(&[schema::ENROLLMENT_YEAR])
        .count()?;
    Ok(women.percentage_of(&totals))
}

/// A category ranked by its number of women, with the women's share of
/// the category's own total.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryPresence {
    pub category: GroupKey,
    pub women: i64,
    pub share_of_category: f64,
}

/// Top `k` values of a categorical column by female enrollment.
pub fn female_presence_by(
    ds: &Dataset,
    category_column: &str,
    k: usize,
) -> Result<Vec<CategoryPresence>> {
    let totals = ds.analyze().group_by(&[category_column]).count()?;
    let women = ds
        .analyze()
        .filter(female_rows())
        .group_by(&[category_column])
        .count()?;

    let presence = women
        .top_k(k)
        .into_iter()
        .map(|(category, women_count)| {
            let total = totals
                .get(&category)
                .and_then(|v| v.as_f64())
                .unwrap_or(0.0);
            let share = if total > 0.0 {
                women_count / total * 100.0
            } else {
                0.0
            };
            CategoryPresence {
                category,
                women: women_count as i64,
                share_of_category: share,
            }
        })
        .collect();
    Ok(presence)
}

/// Programs with the highest and lowest female share.
#[derive(Debug)]
pub struct ShareExtremes {
    pub highest: Vec<(GroupKey, f64)>,
    pub lowest: Vec<(GroupKey, f64)>,
}

pub fn female_share_extremes(ds: &Dataset, k: usize) -> Result<ShareExtremes> {
    let totals = ds.analyze().group_by(&[schema::PROGRAM_NAME]).count()?;
    let women = ds
        .analyze()
        .filter(female_rows())
        .group_by(&[schema::PROGRAM_NAME])
        .count()?;
    let share = women.percentage_of(&totals);
    Ok(ShareExtremes {
        highest: share.top_k(k),
        lowest: share.bottom_k(k),
    })
}

/// Per-group totals, female counts, and female share; the three tables
/// share the reference table's keys.
#[derive(Debug)]
pub struct GenderBreakdown {
    pub totals: SummaryTable,
    pub women: SummaryTable,
    pub share: SummaryTable,
}

/// Gender breakdown by institution type.
pub fn institution_gender_breakdown(ds: &Dataset) -> Result<GenderBreakdown> {
    gender_breakdown_by(ds, schema::INSTITUTION_TYPE)
}

pub fn gender_breakdown_by(ds: &Dataset, category_column: &str) -> Result<GenderBreakdown> {
    let totals = ds.analyze().group_by(&[category_column]).count()?;
    let women = ds
        .analyze()
        .filter(female_rows())
        .group_by(&[category_column])
        .count()?;
    let share = women.percentage_of(&totals);
    Ok(GenderBreakdown {
        totals,
        women,
        share,
    })
}

/// Mean of a numeric column per key tuple, with the shared year floor
/// applied when the year column exists.
pub fn mean_by(ds: &Dataset, value_column: &str, key_columns: &[&str]) -> Result<SummaryTable> {
    let mut analysis = ds.analyze();
    if ds.has_column(schema::ENROLLMENT_YEAR) {
        analysis = analysis.filter(year_floor());
    }
    analysis.group_by(key_columns).mean(value_column)
}

/// Count per key tuple with the shared year floor, for the multi-field
/// crosses.
pub fn count_by(ds: &Dataset, key_columns: &[&str]) -> Result<SummaryTable> {
    let mut analysis = ds.analyze();
    if ds.has_column(schema::ENROLLMENT_YEAR) {
        analysis = analysis.filter(year_floor());
    }
    analysis.group_by(key_columns).count()
}

/// Correlation matrix over the standard numeric fields plus the strong
/// (|r| > 0.5) pairs. Fields missing from the dataset appear as NaN
/// entries; this never fails.
pub fn numeric_profile(ds: &Dataset) -> (CorrelationMatrix, Vec<(String, String, f64)>) {
    let rows = profile_rows(ds);
    let matrix = CorrelationMatrix::compute(ds, &rows, &schema::NUMERIC_PROFILE_FIELDS);
    let strong = matrix.strong_pairs(0.5);
    (matrix, strong)
}

/// Pearson correlation between two named numeric fields over rows where
/// both are present.
pub fn numeric_pair_correlation(ds: &Dataset, a: &str, b: &str) -> Result<Option<f64>> {
    let rows = profile_rows(ds);
    correlation::field_correlation(ds, &rows, a, b)
}

fn profile_rows(ds: &Dataset) -> Vec<usize> {
    if ds.has_column(schema::ENROLLMENT_YEAR) {
        ds.analyze()
            .filter(year_floor())
            .rows()
            .unwrap_or_else(|_| crate::analysis::filter::all_rows(ds))
    } else {
        crate::analysis::filter::all_rows(ds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::dataset::Column;
    use crate::analysis::StatValue;

    fn sample_dataset() -> Dataset {
        let years = vec![2019.0, 2019.0, 2019.0, 2020.0, 2020.0, 2021.0]
            .into_iter()
            .map(Some)
            .collect();
        let programs = [
            "Enfermería",
            "Enfermería",
            "Agronomía",
            "Enfermería",
            "Derecho",
            "Medicina",
        ]
        .iter()
        .map(|s| Some(s.to_string()))
        .collect();
        let genders = [" femenino", "MASCULINO", "FEMENINO", "Mujer", "MASCULINO", "FEMENINO"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        let mut ds = Dataset::from_columns(vec![
            ("enrollment_year", Column::Number(years)),
            ("program_name", Column::Text(programs)),
            ("gender", Column::Text(genders)),
        ])
        .unwrap();
        prepare(&mut ds).unwrap();
        ds
    }

    #[test]
    fn test_prepare_derives_and_canonicalizes() {
        let ds = sample_dataset();
        let normalized = ds.get_col(schema::NORMALIZED_PROGRAM_NAME).unwrap();
        assert_eq!(normalized.text_at(0), Some("enfermeria"));
        let gender = ds.get_col(schema::GENDER).unwrap();
        assert_eq!(gender.text_at(0), Some("FEMENINO"));
    }

    #[test]
    fn test_enrollment_by_year() {
        let ds = sample_dataset();
        let table = enrollment_by_year(&ds).unwrap();
        assert_eq!(table.get(&GroupKey::year(2019)), Some(StatValue::Int(3)));
        assert_eq!(table.get(&GroupKey::year(2020)), Some(StatValue::Int(2)));
        assert_eq!(table.total(), 6.0);
    }

    #[test]
    fn test_health_trend_share_uses_yearly_totals() {
        let ds = sample_dataset();
        let trend = keyword_trend(&ds, normalize::health_programs()).unwrap();
        // 2019: two of three records are health programs
        assert_eq!(
            trend.counts.get(&GroupKey::year(2019)),
            Some(StatValue::Int(2))
        );
        let share_2019 = trend
            .share
            .get(&GroupKey::year(2019))
            .unwrap()
            .as_f64()
            .unwrap();
        assert!((share_2019 - 200.0 / 3.0).abs() < 1e-9);
        // share table keeps every year of the reference, zero-filled
        assert_eq!(trend.share.len(), 3);
    }

    #[test]
    fn test_gender_keyword_trend() {
        let ds = sample_dataset();
        let women_in_health = gender_keyword_trend(
            &ds,
            normalize::health_programs(),
            normalize::female_markers(),
        )
        .unwrap();
        assert_eq!(
            women_in_health.get(&GroupKey::year(2019)),
            Some(StatValue::Int(1))
        );
        assert_eq!(
            women_in_health.get(&GroupKey::year(2020)),
            Some(StatValue::Int(1))
        );
    }

    #[test]
    fn test_pandemic_comparison_periods() {
        let ds = sample_dataset();
        let split = pandemic_comparison(&ds, normalize::health_programs()).unwrap();
        assert_eq!(split.before.get(&GroupKey::year(2019)), Some(StatValue::Int(2)));
        assert!(split.before.get(&GroupKey::year(2020)).is_none());
        assert_eq!(split.during.get(&GroupKey::year(2020)), Some(StatValue::Int(1)));
        assert_eq!(split.during.get(&GroupKey::year(2021)), Some(StatValue::Int(1)));
    }

    #[test]
    fn test_female_presence_ranking() {
        let ds = sample_dataset();
        let ranking = female_presence_by(&ds, schema::PROGRAM_NAME, 2).unwrap();
        assert_eq!(ranking.len(), 2);
        assert_eq!(ranking[0].category, GroupKey::text("Enfermería"));
        assert_eq!(ranking[0].women, 2);
        // two women out of three enrollment records
        assert!((ranking[0].share_of_category - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_female_share_extremes() {
        let ds = sample_dataset();
        let extremes = female_share_extremes(&ds, 1).unwrap();
        // Agronomía and Medicina are fully female; ties keep key order
        assert_eq!(extremes.highest[0].0, GroupKey::text("Agronomía"));
        assert_eq!(extremes.highest[0].1, 100.0);
        assert_eq!(extremes.lowest[0].0, GroupKey::text("Derecho"));
        assert_eq!(extremes.lowest[0].1, 0.0);
    }

    #[test]
    fn test_missing_column_analyses_are_independent() {
        // no gender column: gender analyses fail, year analysis still runs
        let mut ds = Dataset::from_columns(vec![
            (
                "enrollment_year",
                Column::Number(vec![Some(2019.0), Some(2020.0)]),
            ),
            (
                "program_name",
                Column::Text(vec![Some("Derecho".into()), Some("Medicina".into())]),
            ),
        ])
        .unwrap();
        prepare(&mut ds).unwrap();

        assert!(gender_distribution(&ds).is_err());
        assert!(female_share_by_year(&ds).is_err());
        assert_eq!(enrollment_by_year(&ds).unwrap().total(), 2.0);
        let trend = keyword_trend(&ds, normalize::health_programs()).unwrap();
        assert_eq!(trend.counts.total(), 1.0);
    }

    #[test]
    fn test_numeric_profile_survives_absent_fields() {
        let ds = sample_dataset();
        let (matrix, strong) = numeric_profile(&ds);
        assert_eq!(matrix.fields().len(), schema::NUMERIC_PROFILE_FIELDS.len());
        // no numeric field exists in this dataset, so nothing is strong
        assert!(strong.is_empty());
        assert!(matrix
            .get(schema::AGE, schema::TUITION_VALUE)
            .unwrap()
            .is_nan());
    }
}
