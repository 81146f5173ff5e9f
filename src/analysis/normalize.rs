//! Text canonicalization used before keyword matching.
//!
//! Two distinct rules exist on purpose: program names are folded
//! (lower-case, diacritics stripped) while category values such as gender
//! are upper-cased and trimmed. Keyword tests against gender run a plain
//! case-insensitive substring search, never the diacritic fold.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Canonical fold for free-text fields: lower-case, NFD decomposition,
/// non-spacing combining marks removed. A missing value folds to the
/// empty string; this never fails.
pub fn fold_text(raw: Option<&str>) -> String {
    match raw {
        None => String::new(),
        Some(s) => s
            .to_lowercase()
            .nfd()
            .filter(|c| !is_combining_mark(*c))
            .collect(),
    }
}

/// Canonical form for categorical values (gender): trim + upper-case.
pub fn canon_category(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A configured set of substrings defining a category.
///
/// Matching is containment, not equality: the source data records the
/// same category under many free-form spellings.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keywords: Vec<String>,
    fold_diacritics: bool,
}

impl KeywordMatcher {
    /// Matcher that folds the haystack with [`fold_text`] before the
    /// containment test. Keywords are folded once at construction.
    pub fn folded(keywords: &[&str]) -> Self {
        KeywordMatcher {
            keywords: keywords.iter().map(|k| fold_text(Some(k))).collect(),
            fold_diacritics: true,
        }
    }

    /// Matcher with plain case-insensitive containment; diacritics in the
    /// haystack are kept as-is.
    pub fn case_insensitive(keywords: &[&str]) -> Self {
        KeywordMatcher {
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
            fold_diacritics: false,
        }
    }

    /// True when the value contains at least one keyword. A missing value
    /// never matches.
    pub fn matches(&self, raw: Option<&str>) -> bool {
        let Some(raw) = raw else {
            return false;
        };
        let haystack = if self.fold_diacritics {
            fold_text(Some(raw))
        } else {
            raw.to_lowercase()
        };
        self.keywords.iter().any(|k| haystack.contains(k.as_str()))
    }
}

/// Program keywords for the health-sciences subset.
pub fn health_programs() -> KeywordMatcher {
    KeywordMatcher::folded(&[
        "salud",
        "enfermeria",
        "medicina",
        "kinesiologia",
        "nutricion",
        "odontologia",
        "tecnologia medica",
        "fisioterapia",
        "terapia",
        "quimica y farmacia",
        "bioquimica",
        "obstetricia",
        "matroneria",
        "fonoaudiologia",
        "psicologia",
        "laboratorio clinico",
        "paramedico",
        "tecnico en enfermeria",
        "tecnico en salud",
    ])
}

/// Program keywords for the agriculture / rural subset.
pub fn agriculture_programs() -> KeywordMatcher {
    KeywordMatcher::folded(&[
        "agro",
        "veterinaria",
        "agricultura",
        "forestal",
        "pecuaria",
        "zootecnia",
        "alimentos",
        "plantas",
        "bosque",
        "rural",
        "lecheria",
        "fruticultura",
        "horticultura",
    ])
}

/// Substrings marking a gender value as female.
pub fn female_markers() -> KeywordMatcher {
    KeywordMatcher::case_insensitive(&["femenino", "mujer", "f"])
}

/// Substrings marking a gender value as male.
pub fn male_markers() -> KeywordMatcher {
    KeywordMatcher::case_insensitive(&["masculino", "hombre", "m"])
}
