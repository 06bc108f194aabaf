// src/extractors/entities.rs
//
// Regex-driven extraction of regulatory relationships from the raw cell text
// collected by the table locators. Each field value yields zero or more rows.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::extractors::tables::{Direction, TableRule, ValuePattern};

// --- Regex Patterns (Lazy Static) ---
// Matches `NAME (human|mouse) (ref, ref, ...)`, repeated within one cell.
static QUALIFIED_ENTITY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z0-9\-_,\[\] ]+?)\s*\((human|mouse)\)\s*\(([^\)]+)\)")
        .expect("Failed to compile QUALIFIED_ENTITY_RE")
});

// Matches `phrase (ref, ref, ...)`, repeated; no organism group.
static EFFECT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([^\(]+?)\s*\(([^\)]+)\)").expect("Failed to compile EFFECT_RE")
});

/// One regulatory relationship instance pulled out of a section field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegulationRow {
    /// Upstream regulator acting on the phosphorylation site.
    Upstream {
        field: String,
        protein: String,
        organism: String,
        references: Vec<i64>,
    },
    /// Downstream interaction partner (induced or inhibited).
    Interaction {
        field: String,
        protein: String,
        organism: String,
        references: Vec<i64>,
    },
    /// Downstream effect phrase with no named partner.
    Effect {
        field: String,
        activity: String,
        references: Vec<i64>,
    },
}

impl RegulationRow {
    pub fn references(&self) -> &[i64] {
        match self {
            Self::Upstream { references, .. }
            | Self::Interaction { references, .. }
            | Self::Effect { references, .. } => references,
        }
    }
}

/// Parses a comma-separated reference list, silently dropping non-digit tokens.
fn parse_reference_list(raw: &str) -> Vec<i64> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .filter_map(|t| t.parse().ok())
        .collect()
}

/// Strips leading commas/spaces left over from pattern boundaries.
fn clean_name(raw: &str) -> String {
    raw.trim_start_matches([',', ' ']).trim().to_string()
}

/// Applies each field's value pattern to its extracted text and tags the
/// resulting rows with the rule's regulation direction. Fields are processed
/// in rule order, matches in text order. Zero matches yield zero rows.
pub fn extract_regulation_rows(
    rule: &TableRule,
    fields: &BTreeMap<String, String>,
) -> Vec<RegulationRow> {
    let mut rows = Vec::new();

    for field in &rule.fields {
        let Some(value) = fields.get(&field.key) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        tracing::debug!("Extracting entities from field '{}'", field.key);

        match field.pattern {
            ValuePattern::QualifiedEntity => {
                for caps in QUALIFIED_ENTITY_RE.captures_iter(value) {
                    let protein = clean_name(&caps[1]);
                    let organism = caps[2].trim().to_string();
                    let references = parse_reference_list(&caps[3]);
                    rows.push(match rule.direction {
                        Direction::Upstream => RegulationRow::Upstream {
                            field: field.key.clone(),
                            protein,
                            organism,
                            references,
                        },
                        Direction::Downstream => RegulationRow::Interaction {
                            field: field.key.clone(),
                            protein,
                            organism,
                            references,
                        },
                    });
                }
            }
            ValuePattern::EffectPhrase => {
                for caps in EFFECT_RE.captures_iter(value) {
                    rows.push(RegulationRow::Effect {
                        field: field.key.clone(),
                        activity: clean_name(&caps[1]),
                        references: parse_reference_list(&caps[2]),
                    });
                }
            }
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::tables::{downstream_rule, upstream_rule};

    fn upstream_fields(key: &str, value: &str) -> BTreeMap<String, String> {
        let mut fields = BTreeMap::new();
        fields.insert(key.to_string(), value.to_string());
        fields
    }

    #[test]
    fn test_two_qualified_entities_in_one_cell() {
        let rule = upstream_rule();
        let fields = upstream_fields(
            "Regulatory protein",
            "CDK1 (human) (123, 456), CCNE1 (human) (789)",
        );
        let rows = extract_regulation_rows(&rule, &fields);

        assert_eq!(
            rows,
            vec![
                RegulationRow::Upstream {
                    field: "Regulatory protein".to_string(),
                    protein: "CDK1".to_string(),
                    organism: "human".to_string(),
                    references: vec![123, 456],
                },
                RegulationRow::Upstream {
                    field: "Regulatory protein".to_string(),
                    protein: "CCNE1".to_string(),
                    organism: "human".to_string(),
                    references: vec![789],
                },
            ]
        );
    }

    #[test]
    fn test_no_qualifying_text_yields_no_rows() {
        let rule = upstream_rule();
        let fields = upstream_fields("Kinases in vitro", "free text without any entity markers");
        assert!(extract_regulation_rows(&rule, &fields).is_empty());
    }

    #[test]
    fn test_non_digit_reference_tokens_are_dropped() {
        let rule = upstream_rule();
        let fields = upstream_fields("Regulatory protein", "ABL1 (mouse) (12, review, 34)");
        let rows = extract_regulation_rows(&rule, &fields);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].references(), &[12, 34]);
    }

    #[test]
    fn test_effect_fields_use_phrase_pattern() {
        let rule = downstream_rule("CDK2");
        let mut fields = BTreeMap::new();
        fields.insert(
            "Effects of modification on CDK2".to_string(),
            "enzymatic activity, induced (5, 6)".to_string(),
        );
        let rows = extract_regulation_rows(&rule, &fields);

        assert_eq!(
            rows,
            vec![RegulationRow::Effect {
                field: "Effects of modification on CDK2".to_string(),
                activity: "enzymatic activity, induced".to_string(),
                references: vec![5, 6],
            }]
        );
    }

    #[test]
    fn test_interaction_fields_are_tagged_downstream() {
        let rule = downstream_rule("CDK2");
        let mut fields = BTreeMap::new();
        fields.insert(
            "Induce interaction with:".to_string(),
            "CCNA2 (human) (8)".to_string(),
        );
        let rows = extract_regulation_rows(&rule, &fields);

        assert_eq!(
            rows,
            vec![RegulationRow::Interaction {
                field: "Induce interaction with:".to_string(),
                protein: "CCNA2".to_string(),
                organism: "human".to_string(),
                references: vec![8],
            }]
        );
    }

    #[test]
    fn test_leading_comma_is_stripped_from_names() {
        let rule = downstream_rule("CDK2");
        let mut fields = BTreeMap::new();
        fields.insert(
            "Inhibit interaction with:".to_string(),
            "KAP (human) (9), p21 [CDKN1A] (human) (10)".to_string(),
        );
        let rows = extract_regulation_rows(&rule, &fields);

        assert_eq!(rows.len(), 2);
        match &rows[1] {
            RegulationRow::Interaction { protein, .. } => {
                assert_eq!(protein, "p21 [CDKN1A]");
            }
            other => panic!("expected interaction row, got {:?}", other),
        }
    }

    #[test]
    fn test_fields_processed_in_rule_order() {
        let rule = downstream_rule("CDK2");
        let mut fields = BTreeMap::new();
        // BTreeMap would order these alphabetically; rule order must win.
        fields.insert(
            "Induce interaction with:".to_string(),
            "CCNA2 (human) (8)".to_string(),
        );
        fields.insert(
            "Effects of modification on biological processes".to_string(),
            "cell cycle regulation (7)".to_string(),
        );
        let rows = extract_regulation_rows(&rule, &fields);

        assert_eq!(rows.len(), 2);
        assert!(matches!(rows[0], RegulationRow::Effect { .. }));
        assert!(matches!(rows[1], RegulationRow::Interaction { .. }));
    }
}
