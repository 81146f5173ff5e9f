use std::path::Path;
use std::process::ExitCode;

use enrollment_analytics::analysis::{
    dataset::Dataset, engine::SummaryTable, normalize, schema, suite, Result,
};

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = match std::env::args().nth(1) {
        Some(p) => p,
        None => {
            eprintln!("usage: enrollment-analytics <enrollment.csv>");
            return ExitCode::FAILURE;
        }
    };

    let mut ds = Dataset::new();
    match ds.load_csv(Path::new(&path)) {
        Ok(report) => {
            println!(
                "Loaded {} records from {path} ({} malformed lines skipped)",
                report.rows_loaded, report.lines_skipped
            );
        }
        Err(e) => {
            eprintln!("cannot load {path}: {e}");
            return ExitCode::FAILURE;
        }
    }
    if let Err(e) = suite::prepare(&mut ds) {
        eprintln!("cannot prepare dataset: {e}");
        return ExitCode::FAILURE;
    }

    run_report(&ds);
    ExitCode::SUCCESS
}

/// Run every analysis; one missing column skips that analysis, never the
/// rest of the report.
fn run_report(ds: &Dataset) {
    if let Some(table) = run("enrollment by year", suite::enrollment_by_year(ds)) {
        print_table("Enrollment per year (integral years only)", &table);
    }

    if let Some(table) = run("gender distribution", suite::gender_distribution(ds)) {
        let total = table.total();
        println!("\nGender distribution:");
        for (gender, count) in &table {
            let n = count.as_f64().unwrap_or(0.0);
            let pct = if total > 0.0 { n / total * 100.0 } else { 0.0 };
            println!("  {gender}: {count} ({pct:.1}%)");
        }
    }

    if let Some(trend) = run(
        "health program trend",
        suite::keyword_trend(ds, normalize::health_programs()),
    ) {
        print_table("Health-program enrollment per year", &trend.counts);
        print_table("Health-program share of yearly enrollment (%)", &trend.share);
    }

    for (label, markers) in [
        ("women", normalize::female_markers()),
        ("men", normalize::male_markers()),
    ] {
        if let Some(table) = run(
            "health program gender trend",
            suite::gender_keyword_trend(ds, normalize::health_programs(), markers),
        ) {
            print_table(&format!("Health-program {label} per year"), &table);
        }
    }

    if let Some(trend) = run(
        "agriculture program trend",
        suite::keyword_trend(ds, normalize::agriculture_programs()),
    ) {
        print_table("Agriculture-program enrollment per year", &trend.counts);
        print_table(
            "Agriculture-program share of yearly enrollment (%)",
            &trend.share,
        );
    }

    if let Some(split) = run(
        "pandemic comparison",
        suite::pandemic_comparison(ds, normalize::health_programs()),
    ) {
        print_table("Health-program enrollment before 2020", &split.before);
        print_table("Health-program enrollment 2020-2021", &split.during);
    }

    if let Some(table) = run("female share by year", suite::female_share_by_year(ds)) {
        print_table("Share of women per year (%)", &table);
    }

    for (title, column) in [
        ("programs", schema::PROGRAM_NAME),
        ("knowledge areas", schema::KNOWLEDGE_AREA),
    ] {
        if let Some(ranking) = run(
            "female presence ranking",
            suite::female_presence_by(ds, column, 10),
        ) {
            println!("\nTop {title} by female enrollment:");
            for (i, entry) in ranking.iter().enumerate() {
                println!(
                    "{:2}. {}: {} women ({:.1}% of the {})",
                    i + 1,
                    entry.category,
                    entry.women,
                    entry.share_of_category,
                    title.trim_end_matches('s')
                );
            }
        }
    }

    if let Some(extremes) = run("female share extremes", suite::female_share_extremes(ds, 5)) {
        println!("\nPrograms with the highest female share:");
        for (i, (program, share)) in extremes.highest.iter().enumerate() {
            println!("{:2}. {program}: {share:.1}%", i + 1);
        }
        println!("\nPrograms with the lowest female share:");
        for (i, (program, share)) in extremes.lowest.iter().enumerate() {
            println!("{:2}. {program}: {share:.1}%", i + 1);
        }
    }

    if let Some(breakdown) = run(
        "institution gender breakdown",
        suite::institution_gender_breakdown(ds),
    ) {
        println!("\nGender breakdown by institution type:");
        for (institution, total) in &breakdown.totals {
            let women = breakdown
                .women
                .get(institution)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "0".into());
            let share = breakdown
                .share
                .get(institution)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".into());
            println!("  {institution}: {total} students, {women} women ({share}%)");
        }
    }

    // mean crosses over two and three fields
    let mean_crosses: [(&str, &str, &[&str]); 9] = [
        (
            "Mean plan duration by institution type (semesters)",
            schema::STUDY_DURATION_SEMESTERS,
            &[schema::INSTITUTION_TYPE],
        ),
        (
            "Mean tuition by knowledge area",
            schema::TUITION_VALUE,
            &[schema::KNOWLEDGE_AREA],
        ),
        ("Mean age by modality", schema::AGE, &[schema::MODALITY]),
        (
            "Mean tuition by enrollment year",
            schema::TUITION_VALUE,
            &[schema::ENROLLMENT_YEAR],
        ),
        (
            "Mean plan duration by study level (semesters)",
            schema::STUDY_DURATION_SEMESTERS,
            &[schema::STUDY_LEVEL],
        ),
        (
            "Mean age by admission requirement",
            schema::AGE,
            &[schema::ADMISSION_REQUIREMENT],
        ),
        (
            "Mean plan duration by schedule (semesters)",
            schema::STUDY_DURATION_SEMESTERS,
            &[schema::SCHEDULE],
        ),
        (
            "Mean plan duration by gender and institution type (semesters)",
            schema::STUDY_DURATION_SEMESTERS,
            &[schema::GENDER, schema::INSTITUTION_TYPE],
        ),
        (
            "Mean tuition by knowledge area and modality",
            schema::TUITION_VALUE,
            &[schema::KNOWLEDGE_AREA, schema::MODALITY],
        ),
    ];
    for (title, value, keys) in mean_crosses {
        if let Some(table) = run(title, suite::mean_by(ds, value, keys)) {
            print_table(title, &table);
        }
    }

    if let Some(table) = run(
        "mean total duration by commune",
        suite::mean_by(ds, schema::TOTAL_DURATION_SEMESTERS, &[schema::CAMPUS_COMMUNE]),
    ) {
        println!("\nLongest mean total duration by commune (top 10, semesters):");
        for (i, (commune, mean)) in table.top_k(10).iter().enumerate() {
            println!("{:2}. {commune}: {mean:.1}", i + 1);
        }
    }

    if let Some(table) = run(
        "enrollment by year, gender and knowledge area",
        suite::count_by(
            ds,
            &[schema::ENROLLMENT_YEAR, schema::GENDER, schema::KNOWLEDGE_AREA],
        ),
    ) {
        println!("\nLargest year / gender / knowledge-area groups (top 10):");
        for (i, (key, count)) in table.top_k(10).iter().enumerate() {
            println!("{:2}. {key}: {count:.0}", i + 1);
        }
    }

    for (title, a, b) in [
        ("age and plan duration", schema::AGE, schema::STUDY_DURATION_SEMESTERS),
        ("age and tuition", schema::AGE, schema::TUITION_VALUE),
        (
            "total duration and accreditation years",
            schema::TOTAL_DURATION_SEMESTERS,
            schema::ACCREDITATION_YEARS,
        ),
    ] {
        if let Some(r) = run(title, suite::numeric_pair_correlation(ds, a, b)) {
            match r {
                Some(r) => println!("\nCorrelation between {title}: {r:.2}"),
                None => println!("\nCorrelation between {title}: undefined"),
            }
        }
    }

    let (matrix, strong) = suite::numeric_profile(ds);
    println!("\nCorrelation matrix over numeric fields:");
    print!("{:>34}", "");
    for field in matrix.fields() {
        print!(" {:>12.12}", field);
    }
    println!();
    for a in matrix.fields() {
        print!("{:>34.34}", a);
        for b in matrix.fields() {
            match matrix.get(a, b) {
                Some(r) if r.is_finite() => print!(" {:>12.2}", r),
                _ => print!(" {:>12}", "-"),
            }
        }
        println!();
    }

    println!("\nStrong correlations (|r| > 0.5):");
    if strong.is_empty() {
        println!("  none");
    }
    for (a, b, r) in strong {
        println!("  {a} vs {b}: {r:.2}");
    }
}

fn run<T>(name: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(analysis = name, error = %e, "analysis skipped");
            None
        }
    }
}

fn print_table(title: &str, table: &SummaryTable) {
    println!("\n{title}:");
    if table.is_empty() {
        println!("  (no data)");
        return;
    }
    for (key, value) in table {
        println!("  {key}: {value}");
    }
}
