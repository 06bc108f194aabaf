// src/extractors/tables.rs
//
// Declarative table extraction: each page section (Upstream Regulation,
// Downstream Regulation) is described by a TableRule value holding its header
// label and field rules, so the extraction logic can be exercised against
// static HTML fixtures without any network access.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));
static HEADER_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th").expect("Failed to compile HEADER_CELL_SELECTOR"));
static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));
static CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to compile CELL_SELECTOR"));

// PubMed ID: first run of at least 7 digits anywhere in the reference cell.
static PUBMED_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{7,}").expect("Failed to compile PUBMED_ID_RE"));

/// How a label is compared against cell text (both sides trimmed + lowercased).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMatch {
    Exact,
    Substring,
}

impl LabelMatch {
    fn matches(self, haystack: &str, label: &str) -> bool {
        match self {
            Self::Exact => haystack == label,
            Self::Substring => haystack.contains(label),
        }
    }
}

/// Which value pattern applies to a field's cell text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValuePattern {
    /// `NAME (human|mouse) (refs)`, repeated.
    QualifiedEntity,
    /// `phrase (refs)`, repeated; no organism group.
    EffectPhrase,
}

/// Which regulation direction a section's rows belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upstream,
    Downstream,
}

/// One key/value field inside a section table.
#[derive(Debug, Clone)]
pub struct FieldRule {
    /// Output key the cell value is stored under.
    pub key: String,
    /// Lowercase label matched against the row's first cell.
    pub label: String,
    pub mode: LabelMatch,
    pub pattern: ValuePattern,
}

impl FieldRule {
    fn new(key: impl Into<String>, label: impl Into<String>, mode: LabelMatch, pattern: ValuePattern) -> Self {
        Self { key: key.into(), label: label.into(), mode, pattern }
    }
}

/// Declarative description of one section table.
#[derive(Debug, Clone)]
pub struct TableRule {
    /// Lowercase label matched against the table's header cells.
    pub section_label: String,
    pub section_mode: LabelMatch,
    pub direction: Direction,
    /// Trim a trailing colon off the first cell before matching field labels.
    pub trim_field_colon: bool,
    /// Fields in page order; this order also drives row emission downstream.
    pub fields: Vec<FieldRule>,
}

/// Ruleset for the Upstream Regulation section.
pub fn upstream_rule() -> TableRule {
    use LabelMatch::Substring;
    use ValuePattern::QualifiedEntity;
    TableRule {
        section_label: "upstream regulation".to_string(),
        section_mode: Substring,
        direction: Direction::Upstream,
        trim_field_colon: false,
        fields: vec![
            FieldRule::new("Regulatory protein", "regulatory protein", Substring, QualifiedEntity),
            FieldRule::new("Putative in vivo kinases", "putative in vivo kinases", Substring, QualifiedEntity),
            FieldRule::new("Kinases in vitro", "kinases, in vitro", Substring, QualifiedEntity),
            FieldRule::new("Phosphatases in vitro", "phosphatases, in vitro", Substring, QualifiedEntity),
        ],
    }
}

/// Ruleset for the Downstream Regulation section, parameterized by the protein
/// name taken from the page header.
pub fn downstream_rule(protein_name: &str) -> TableRule {
    use LabelMatch::{Exact, Substring};
    use ValuePattern::{EffectPhrase, QualifiedEntity};
    TableRule {
        section_label: "downstream regulation".to_string(),
        section_mode: Substring,
        direction: Direction::Downstream,
        trim_field_colon: true,
        fields: vec![
            FieldRule::new(
                format!("Effects of modification on {}", protein_name),
                format!("effects of modification on {}", protein_name.to_lowercase()),
                Exact,
                EffectPhrase,
            ),
            FieldRule::new(
                "Effects of modification on biological processes",
                "effects of modification on biological processes",
                Exact,
                EffectPhrase,
            ),
            FieldRule::new("Induce interaction with:", "induce interaction with", Substring, QualifiedEntity),
            FieldRule::new("Inhibit interaction with:", "inhibit interaction with", Substring, QualifiedEntity),
        ],
    }
}

/// One row of the page's References table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub reference_number: String,
    pub pubmed_id: Option<String>,
}

fn cell_text(cell: ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Scans every table on the page and returns the first whose any header cell
/// matches the section label. Later matching tables are ignored; the page is
/// assumed to carry one table per section.
fn find_section_table<'a>(document: &'a Html, label: &str, mode: LabelMatch) -> Option<ElementRef<'a>> {
    for table in document.select(&TABLE_SELECTOR) {
        for th in table.select(&HEADER_CELL_SELECTOR) {
            let th_text = cell_text(th).to_lowercase();
            if mode.matches(&th_text, label) {
                return Some(table);
            }
        }
    }
    None
}

/// Extracts a section's two-column fields according to its rule.
///
/// Every field key is present in the result; a missing table or missing rows
/// leave the affected values empty. Rows with fewer than two cells are
/// skipped. Never fails.
pub fn extract_section_fields(document: &Html, rule: &TableRule) -> BTreeMap<String, String> {
    let mut result: BTreeMap<String, String> = rule
        .fields
        .iter()
        .map(|f| (f.key.clone(), String::new()))
        .collect();

    let Some(table) = find_section_table(document, &rule.section_label, rule.section_mode) else {
        tracing::debug!("No table matched section label '{}'", rule.section_label);
        return result;
    };

    for row in table.select(&ROW_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < 2 {
            continue;
        }
        let mut field_text = cell_text(cells[0]).to_lowercase();
        if rule.trim_field_colon {
            field_text = field_text.trim_end_matches(':').trim().to_string();
        }
        if let Some(field) = rule.fields.iter().find(|f| f.mode.matches(&field_text, &f.label)) {
            let value = cell_text(cells[1]);
            tracing::trace!("Matched field '{}' with {} chars of text", field.key, value.len());
            result.insert(field.key.clone(), value);
        }
    }

    result
}

/// Walks the References table and returns one row per reference.
///
/// The reference number is the first cell's trimmed text; the PubMed ID is the
/// first run of 7+ digits anywhere in the second cell, when present. A missing
/// table yields an empty list.
pub fn extract_references(document: &Html) -> Vec<ReferenceRow> {
    let mut results = Vec::new();

    let Some(table) = find_section_table(document, "references", LabelMatch::Exact) else {
        tracing::debug!("No references table found on page");
        return results;
    };

    for row in table.select(&ROW_SELECTOR) {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        if cells.len() < 2 {
            continue;
        }
        let reference_number = cell_text(cells[0]);
        let citation = cells[1].text().collect::<String>();
        let pubmed_id = PUBMED_ID_RE.find(&citation).map(|m| m.as_str().to_string());
        results.push(ReferenceRow { reference_number, pubmed_id });
    }

    results
}
