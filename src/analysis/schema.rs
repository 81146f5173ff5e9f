//! Canonical column names of the enrollment table.
//!
//! Analyses refer to columns through these constants; a dataset missing
//! one of them simply causes the dependent analyses to be skipped.

pub const ENROLLMENT_YEAR: &str = "enrollment_year";
pub const PROGRAM_NAME: &str = "program_name";
/// Derived by [`crate::analysis::suite::prepare`]: `PROGRAM_NAME` folded
/// with [`crate::analysis::normalize::fold_text`].
pub const NORMALIZED_PROGRAM_NAME: &str = "normalized_program_name";
pub const GENDER: &str = "gender";
pub const KNOWLEDGE_AREA: &str = "knowledge_area";
pub const INSTITUTION_TYPE: &str = "institution_type";
pub const MODALITY: &str = "modality";
pub const SCHEDULE: &str = "schedule";
pub const ADMISSION_REQUIREMENT: &str = "admission_requirement";
pub const CAMPUS_COMMUNE: &str = "campus_commune";
pub const STUDY_LEVEL: &str = "study_level";

pub const AGE: &str = "age";
pub const TUITION_VALUE: &str = "tuition_value";
pub const ENROLLMENT_FEE_VALUE: &str = "enrollment_fee_value";
pub const STUDY_DURATION_SEMESTERS: &str = "study_duration_semesters";
pub const DEGREE_PROCESS_DURATION_SEMESTERS: &str = "degree_process_duration_semesters";
pub const TOTAL_DURATION_SEMESTERS: &str = "total_duration_semesters";
pub const ACCREDITATION_YEARS: &str = "accreditation_years";

/// Numeric fields entering the full correlation profile, in report order.
pub const NUMERIC_PROFILE_FIELDS: [&str; 7] = [
    AGE,
    STUDY_DURATION_SEMESTERS,
    DEGREE_PROCESS_DURATION_SEMESTERS,
    TOTAL_DURATION_SEMESTERS,
    ENROLLMENT_FEE_VALUE,
    TUITION_VALUE,
    ACCREDITATION_YEARS,
];

/// Year floor shared by the trend analyses.
pub const YEAR_FLOOR: f64 = 2010.0;
/// Minimum (year, program) enrollment for a program-year to count.
pub const MIN_PROGRAM_YEAR_ENROLLMENT: usize = 15;
/// Pandemic-period years isolated by the comparison analyses.
pub const PANDEMIC_YEARS: [f64; 2] = [2020.0, 2021.0];
