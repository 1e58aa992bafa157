//! Filter clauses appended to a generated query.
//!
//! Clauses are plain PubMed syntax joined onto the base query string; PubMed
//! does the actual filtering.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DateFilter {
    #[default]
    Any,
    /// Published from `current_year - n` onwards
    LastYears(u32),
    /// Applied only when both bounds are set
    Custom { from: String, to: String },
}

impl DateFilter {
    /// Any → 1 → 5 → 10 years → Any. A custom range also steps back to Any.
    pub fn cycle(&self) -> Self {
        match self {
            DateFilter::Any => DateFilter::LastYears(1),
            DateFilter::LastYears(1) => DateFilter::LastYears(5),
            DateFilter::LastYears(5) => DateFilter::LastYears(10),
            _ => DateFilter::Any,
        }
    }

    pub fn label(&self) -> String {
        match self {
            DateFilter::Any => "any date".to_string(),
            DateFilter::LastYears(1) => "last year".to_string(),
            DateFilter::LastYears(n) => format!("last {} years", n),
            DateFilter::Custom { from, to } => format!("{}-{}", from, to),
        }
    }
}

pub const ARTICLE_TYPES: &[&str] = &[
    "Clinical Trial[pt]",
    "Randomized Controlled Trial[pt]",
    "Meta-Analysis[pt]",
    "Systematic Review[pt]",
    "Case Reports[pt]",
];

pub const LANGUAGES: &[&str] = &["English[lang]", "Spanish[lang]", "French[lang]", "German[lang]"];

pub const SPECIES: &[&str] = &["Humans[MeSH Terms]", "Animals[MeSH Terms]"];

pub const AGES: &[&str] = &[
    "Child[MeSH Terms]",
    "Adolescent[MeSH Terms]",
    "Adult[MeSH Terms]",
    "Aged[MeSH Terms]",
];

/// None → first option → ... → last option → None.
pub fn cycle_option(current: Option<&str>, options: &[&str]) -> Option<String> {
    let next = match current {
        None => options.first(),
        Some(value) => options
            .iter()
            .position(|o| *o == value)
            .and_then(|i| options.get(i + 1)),
    };
    next.map(|s| s.to_string())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilters {
    pub date: DateFilter,
    pub free_full_text: bool,
    pub reviews_only: bool,
    pub associated_data: bool,
    pub exclude_preprints: bool,
    pub article_type: Option<String>,
    pub language: Option<String>,
    pub species: Option<String>,
    pub age: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The filter suffix, in a fixed order, each clause with its leading
    /// ` AND ` / ` NOT `.
    pub fn clauses(&self, current_year: i32) -> String {
        let mut f = String::new();

        match &self.date {
            DateFilter::Any => {}
            DateFilter::LastYears(n) => {
                let from = current_year - *n as i32;
                f.push_str(&format!(
                    " AND (\"{}\"[Date - Publication] : \"3000\"[Date - Publication])",
                    from
                ));
            }
            DateFilter::Custom { from, to } => {
                if !from.trim().is_empty() && !to.trim().is_empty() {
                    f.push_str(&format!(
                        " AND (\"{}\"[Date - Publication] : \"{}\"[Date - Publication])",
                        from.trim(),
                        to.trim()
                    ));
                }
            }
        }

        if self.free_full_text {
            f.push_str(" AND free full text[filter]");
        }
        if self.reviews_only {
            f.push_str(" AND (Meta-Analysis[pt] OR Systematic Review[pt] OR Review[pt])");
        }
        if self.associated_data {
            f.push_str(" AND associated data[filter]");
        }
        if self.exclude_preprints {
            f.push_str(" NOT preprint[filter]");
        }

        for clause in [&self.article_type, &self.language, &self.species, &self.age]
            .into_iter()
            .flatten()
        {
            if !clause.trim().is_empty() {
                f.push_str(" AND ");
                f.push_str(clause);
            }
        }

        f
    }

    pub fn apply(&self, base: &str, current_year: i32) -> String {
        format!("{}{}", base, self.clauses(current_year))
    }

    /// Short description for a status line, e.g. `last 5 years, free`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if self.date != DateFilter::Any {
            parts.push(self.date.label());
        }
        if self.free_full_text {
            parts.push("free".to_string());
        }
        if self.reviews_only {
            parts.push("reviews".to_string());
        }
        if self.associated_data {
            parts.push("data".to_string());
        }
        if self.exclude_preprints {
            parts.push("no preprints".to_string());
        }
        for clause in [&self.article_type, &self.language, &self.species, &self.age]
            .into_iter()
            .flatten()
        {
            parts.push(clause.clone());
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(", ")
        }
    }
}
