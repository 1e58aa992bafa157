//! Structured PubMed query builder
//!
//! Field-tagged terms joined by boolean operators, followed by date range,
//! publication types, species, language and access filters. Used for direct
//! (non-AI) searches and the bundled example presets.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
    #[default]
    AllFields,
    Title,
    TitleAbstract,
    Abstract,
    Author,
    Journal,
    MeshTerms,
    Affiliation,
    Pmid,
    PublicationType,
}

impl SearchField {
    pub const ALL: [SearchField; 10] = [
        SearchField::AllFields,
        SearchField::Title,
        SearchField::TitleAbstract,
        SearchField::Abstract,
        SearchField::Author,
        SearchField::Journal,
        SearchField::MeshTerms,
        SearchField::Affiliation,
        SearchField::Pmid,
        SearchField::PublicationType,
    ];

    pub fn tag(&self) -> &'static str {
        match self {
            SearchField::AllFields => "",
            SearchField::Title => "[Title]",
            SearchField::TitleAbstract => "[Title/Abstract]",
            SearchField::Abstract => "[Abstract]",
            SearchField::Author => "[Author]",
            SearchField::Journal => "[Journal]",
            SearchField::MeshTerms => "[MeSH Terms]",
            SearchField::Affiliation => "[Affiliation]",
            SearchField::Pmid => "[PMID]",
            SearchField::PublicationType => "[Publication Type]",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SearchField::AllFields => "All Fields",
            SearchField::Title => "Title",
            SearchField::TitleAbstract => "Title/Abstract",
            SearchField::Abstract => "Abstract",
            SearchField::Author => "Author",
            SearchField::Journal => "Journal",
            SearchField::MeshTerms => "MeSH Terms",
            SearchField::Affiliation => "Affiliation",
            SearchField::Pmid => "PMID",
            SearchField::PublicationType => "Publication Type",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoolOp {
    #[default]
    And,
    Or,
    Not,
}

impl BoolOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
            BoolOp::Not => "NOT",
        }
    }
}

/// One term. `operator` joins it to the previous non-blank term and is
/// ignored on the first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryTerm {
    pub text: String,
    pub field: SearchField,
    pub operator: BoolOp,
}

impl QueryTerm {
    pub fn new(text: impl Into<String>, field: SearchField, operator: BoolOp) -> Self {
        Self { text: text.into(), field, operator }
    }

    fn render(&self) -> String {
        let text = self.text.trim();
        if text.contains(' ') && !text.starts_with('"') {
            format!("\"{}\"{}", text, self.field.tag())
        } else {
            format!("{}{}", text, self.field.tag())
        }
    }
}

pub const PUBLICATION_TYPES: &[&str] = &[
    "Clinical Trial",
    "Meta-Analysis",
    "Randomized Controlled Trial",
    "Review",
    "Systematic Review",
    "Case Reports",
    "Comparative Study",
    "Letter",
    "Editorial",
];

pub const LANGUAGES: &[&str] = &["English", "Spanish", "French", "German", "Italian", "Japanese", "Chinese"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryBuilder {
    pub terms: Vec<QueryTerm>,
    /// `YYYY/MM/DD`; a missing bound defaults to 1900/01/01 or 3000/12/31
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub publication_types: Vec<String>,
    pub species: Option<String>,
    pub language: Option<String>,
    pub free_full_text: bool,
    pub open_access: bool,
    pub has_abstract: bool,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl QueryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn term(mut self, text: impl Into<String>, field: SearchField, operator: BoolOp) -> Self {
        self.terms.push(QueryTerm::new(text, field, operator));
        self
    }

    /// The terms alone, without filters.
    pub fn terms_query(&self) -> String {
        let mut query = String::new();
        for (i, term) in self.terms.iter().filter(|t| !t.text.trim().is_empty()).enumerate() {
            if i > 0 {
                query.push(' ');
                query.push_str(term.operator.as_str());
                query.push(' ');
            }
            query.push_str(&term.render());
        }
        query
    }

    /// Full query, or `None` when nothing was specified.
    pub fn build(&self) -> Option<String> {
        let mut parts: Vec<String> = Vec::new();

        let terms = self.terms_query();
        if !terms.is_empty() {
            parts.push(terms);
        }

        let from = non_blank(&self.date_from);
        let to = non_blank(&self.date_to);
        if from.is_some() || to.is_some() {
            parts.push(format!(
                "(\"{}\"[Date - Publication] : \"{}\"[Date - Publication])",
                from.unwrap_or("1900/01/01"),
                to.unwrap_or("3000/12/31")
            ));
        }

        if !self.publication_types.is_empty() {
            let types = self
                .publication_types
                .iter()
                .map(|t| format!("\"{}\"[Publication Type]", t))
                .collect::<Vec<_>>()
                .join(" OR ");
            parts.push(format!("({})", types));
        }

        if let Some(species) = non_blank(&self.species) {
            parts.push(format!("\"{}\"[MeSH Terms]", species));
        }
        if let Some(language) = non_blank(&self.language) {
            parts.push(format!("{}[Language]", language.to_lowercase()));
        }
        if self.free_full_text {
            parts.push("free full text[filter]".to_string());
        }
        if self.open_access {
            parts.push("open access[filter]".to_string());
        }
        if self.has_abstract {
            parts.push("hasabstract[text]".to_string());
        }

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" AND "))
        }
    }
}

#[derive(Debug, Clone)]
pub struct Preset {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub builder: QueryBuilder,
}

/// Ready-made example searches.
pub fn presets() -> Vec<Preset> {
    use BoolOp::*;
    use SearchField::*;

    let english = Some("English".to_string());
    let humans = Some("Humans".to_string());

    vec![
        Preset {
            key: "breast-cancer",
            title: "Breast cancer chemotherapy",
            description: "Basic search on breast cancer and chemotherapy treatment",
            builder: QueryBuilder {
                language: english.clone(),
                has_abstract: true,
                ..QueryBuilder::new()
                    .term("breast cancer", TitleAbstract, And)
                    .term("chemotherapy", TitleAbstract, And)
            },
        },
        Preset {
            key: "diabetes-meta",
            title: "Diabetes meta-analyses",
            description: "Meta-analyses and systematic reviews on diabetes",
            builder: QueryBuilder {
                species: humans.clone(),
                language: english.clone(),
                publication_types: vec!["Meta-Analysis".into(), "Systematic Review".into()],
                free_full_text: true,
                has_abstract: true,
                ..QueryBuilder::new().term("diabetes", TitleAbstract, And)
            },
        },
        Preset {
            key: "alzheimer",
            title: "Alzheimer disease in humans",
            description: "Alzheimer articles on humans, published in English",
            builder: QueryBuilder {
                species: humans.clone(),
                language: english.clone(),
                ..QueryBuilder::new()
                    .term("Alzheimer Disease", MeshTerms, And)
                    .term("Humans", MeshTerms, And)
            },
        },
        Preset {
            key: "covid-vaccine",
            title: "COVID-19 vaccine trials",
            description: "Clinical trials on COVID-19 and vaccines with free full text",
            builder: QueryBuilder {
                species: humans.clone(),
                language: english.clone(),
                publication_types: vec!["Clinical Trial".into()],
                free_full_text: true,
                has_abstract: true,
                ..QueryBuilder::new()
                    .term("COVID-19", TitleAbstract, And)
                    .term("vaccine", TitleAbstract, Or)
                    .term("vaccination", TitleAbstract, And)
            },
        },
        Preset {
            key: "lung-cancer",
            title: "Lung cancer genetics in mice",
            description: "Genetic studies on lung cancer in mice",
            builder: QueryBuilder {
                species: Some("Mice".to_string()),
                language: english.clone(),
                has_abstract: true,
                ..QueryBuilder::new()
                    .term("lung cancer", TitleAbstract, And)
                    .term("genetic", TitleAbstract, Or)
                    .term("mutation", TitleAbstract, And)
                    .term("Mice", MeshTerms, And)
            },
        },
        Preset {
            key: "exercise-mental",
            title: "Exercise and mental health",
            description: "Reviews on exercise and depression or anxiety",
            builder: QueryBuilder {
                species: humans,
                language: english,
                publication_types: vec!["Review".into()],
                open_access: true,
                has_abstract: true,
                ..QueryBuilder::new()
                    .term("exercise", TitleAbstract, And)
                    .term("depression", TitleAbstract, Or)
                    .term("anxiety", TitleAbstract, And)
                    .term("Review", PublicationType, And)
            },
        },
    ]
}
