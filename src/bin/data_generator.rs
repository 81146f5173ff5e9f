use rand::Rng;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Generates a synthetic enrollment CSV for manual runs and profiling.
fn main() {
    let path = "data/enrollment_sample.csv";
    std::fs::create_dir_all("data").unwrap();
    let file = File::create(path).unwrap();
    let mut writer = BufWriter::new(file);

    writeln!(
        writer,
        "enrollment_year,program_name,gender,knowledge_area,institution_type,modality,age,tuition_value,study_duration_semesters"
    )
    .unwrap();

    let programs = [
        "Enfermería",
        "Medicina",
        "Agronomía",
        "Ingeniería Civil",
        "Derecho",
        "Psicología",
        "Medicina Veterinaria",
        "Pedagogía en Educación Física",
    ];
    let genders = ["FEMENINO", "MASCULINO", "Mujer", "hombre"];
    let areas = ["Salud", "Tecnología", "Agropecuaria", "Derecho", "Educación"];
    let institutions = ["Universidad", "Instituto Profesional", "Centro de Formación Técnica"];
    let modalities = ["Presencial", "A Distancia"];

    let mut rng = rand::rng();
    for _ in 0..100_000 {
        let year = rng.random_range(2005..=2023);
        let program = programs[rng.random_range(0..programs.len())];
        let gender = genders[rng.random_range(0..genders.len())];
        let area = areas[rng.random_range(0..areas.len())];
        let institution = institutions[rng.random_range(0..institutions.len())];
        let modality = modalities[rng.random_range(0..modalities.len())];
        let age = rng.random_range(17..45);
        let tuition = rng.random_range(80_000..4_500_000);
        let duration = rng.random_range(4..14);

        // leave some cells empty to exercise missing-value handling
        if rng.random_range(0..20) == 0 {
            writeln!(
                writer,
                "{year},{program},{gender},{area},{institution},{modality},,{tuition},"
            )
            .unwrap();
        } else {
            writeln!(
                writer,
                "{year},{program},{gender},{area},{institution},{modality},{age},{tuition},{duration}"
            )
            .unwrap();
        }
    }

    println!("Sample CSV generated: {}", path);
}
