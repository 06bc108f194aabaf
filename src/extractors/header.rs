// src/extractors/header.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};

// --- CSS Selectors (Lazy Static) ---
static HEADER_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("#titleMainHeader").expect("Failed to compile HEADER_SELECTOR")
});

// --- Regex Patterns (Lazy Static) ---
// Example header: "Phosphorylation Site Page: > Thr160 - CDK2 (human)"
static SITE_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r">\s*([A-Za-z0-9]+)\s*-\s*([A-Za-z0-9_\-]+)\s*\(human\)")
        .expect("Failed to compile SITE_HEADER_RE")
});

static HUMAN_MARKER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(human\)").expect("Failed to compile HUMAN_MARKER_RE")
});

/// Extracts the amino-acid code and protein name from the page title header.
///
/// Returns `(None, None)` when the header element is absent. A header whose
/// text does not match the expected pattern falls back to the raw header text
/// for both values; the protein name is always stripped of any "(human)"
/// marker and parentheses. Never fails.
pub fn parse_site_header(document: &Html) -> (Option<String>, Option<String>) {
    let Some(header) = document.select(&HEADER_SELECTOR).next() else {
        tracing::warn!("Header element #titleMainHeader not found on page");
        return (None, None);
    };

    let header_text = header.text().collect::<String>();
    let header_text = header_text.trim();

    let (amino_acid, protein_raw) = match SITE_HEADER_RE.captures(header_text) {
        Some(caps) => (caps[1].to_string(), caps[2].to_string()),
        None => {
            tracing::debug!("Header text did not match site pattern: '{}'", header_text);
            (header_text.to_string(), header_text.to_string())
        }
    };

    let protein = HUMAN_MARKER_RE
        .replace_all(&protein_raw, "")
        .replace(['(', ')'], "")
        .trim()
        .to_string();

    (Some(amino_acid), Some(protein))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><body>{}</body></html>", body))
    }

    #[test]
    fn test_header_parse_site_and_protein() {
        let document = doc(
            r#"<div id="titleMainHeader">Phosphorylation Site Page: > Thr160 - CDK2 (human)</div>"#,
        );
        let (amino_acid, protein) = parse_site_header(&document);
        assert_eq!(amino_acid.as_deref(), Some("Thr160"));
        assert_eq!(protein.as_deref(), Some("CDK2"));
    }

    #[test]
    fn test_header_fallback_on_nonmatching_text() {
        let document = doc(r#"<div id="titleMainHeader">Unexpected layout (human)</div>"#);
        let (amino_acid, protein) = parse_site_header(&document);
        // Both fall back to the raw header text; the protein keeps getting cleaned.
        assert_eq!(amino_acid.as_deref(), Some("Unexpected layout (human)"));
        assert_eq!(protein.as_deref(), Some("Unexpected layout"));
    }

    #[test]
    fn test_header_missing_element() {
        let document = doc("<p>no header here</p>");
        assert_eq!(parse_site_header(&document), (None, None));
    }

    #[test]
    fn test_protein_never_contains_markers() {
        let document = doc(
            r#"<div id="titleMainHeader">Phosphorylation Site Page: > Ser15 - TP53_alt (human)</div>"#,
        );
        let (_, protein) = parse_site_header(&document);
        let protein = protein.unwrap();
        assert!(!protein.to_lowercase().contains("(human)"));
        assert!(!protein.contains('(') && !protein.contains(')'));
        assert_eq!(protein, "TP53_alt");
    }
}
