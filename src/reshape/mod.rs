// src/reshape/mod.rs
//
// Turns tagged regulation rows into the final merged table: column alignment
// across the two regulation directions, reference-list explosion (one row per
// reference number), and the left join attaching PubMed IDs.

use std::collections::BTreeMap;

use crate::extractors::entities::RegulationRow;
use crate::extractors::tables::ReferenceRow;
use crate::phosphosite::models::SiteRecord;

/// Output column order for the merged CSV.
pub const OUTPUT_COLUMNS: [&str; 10] = [
    "Downstream regulation",
    "Downstream protein",
    "Upstream regulation",
    "Upstream protein",
    "Organism",
    "Reference Number",
    "Amino Acid",
    "Protein",
    "Activity",
    "PubMed ID",
];

/// One fully-aligned output row. Every field is optional so both regulation
/// directions and the all-null placeholder row share a single shape; missing
/// values render as the literal text "nan" in the CSV.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergedRow {
    pub downstream_regulation: Option<String>,
    pub downstream_protein: Option<String>,
    pub upstream_regulation: Option<String>,
    pub upstream_protein: Option<String>,
    pub organism: Option<String>,
    pub reference_number: Option<String>,
    pub amino_acid: Option<String>,
    pub protein: Option<String>,
    pub activity: Option<String>,
    pub pubmed_id: Option<String>,
}

impl MergedRow {
    /// Column values in [`OUTPUT_COLUMNS`] order, `None` rendered as "nan".
    pub fn to_record(&self) -> Vec<String> {
        let nan = || "nan".to_string();
        [
            &self.downstream_regulation,
            &self.downstream_protein,
            &self.upstream_regulation,
            &self.upstream_protein,
            &self.organism,
            &self.reference_number,
            &self.amino_acid,
            &self.protein,
            &self.activity,
            &self.pubmed_id,
        ]
        .into_iter()
        .map(|v| v.clone().unwrap_or_else(nan))
        .collect()
    }
}

fn some_nonempty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Converts one tagged regulation row into an aligned row template plus its
/// un-exploded reference list.
fn stage(site: &SiteRecord, row: &RegulationRow) -> (MergedRow, Vec<i64>) {
    let mut merged = MergedRow {
        amino_acid: site.amino_acid.clone(),
        protein: site.protein.clone(),
        ..MergedRow::default()
    };
    let references = match row {
        RegulationRow::Upstream { field, protein, organism, references } => {
            merged.upstream_regulation = Some(field.clone());
            merged.upstream_protein = Some(protein.clone());
            merged.organism = Some(organism.clone());
            references.clone()
        }
        RegulationRow::Interaction { field, protein, organism, references } => {
            merged.downstream_regulation = Some(field.clone());
            merged.downstream_protein = some_nonempty(protein.clone());
            merged.organism = some_nonempty(organism.clone());
            references.clone()
        }
        RegulationRow::Effect { field, activity, references } => {
            merged.downstream_regulation = Some(field.clone());
            merged.activity = some_nonempty(activity.clone());
            references.clone()
        }
    };
    (merged, references)
}

/// Builds the column-aligned row set, downstream first then upstream, each
/// side's row order preserved. When no downstream rows were extracted at all,
/// a single all-null placeholder row stands in so the downstream side of the
/// output is never empty.
pub fn align_rows(
    site: &SiteRecord,
    downstream: &[RegulationRow],
    upstream: &[RegulationRow],
) -> Vec<(MergedRow, Vec<i64>)> {
    let mut staged = Vec::with_capacity(downstream.len() + upstream.len());

    if downstream.is_empty() {
        tracing::debug!("No downstream rows extracted; emitting placeholder row");
        staged.push((MergedRow::default(), Vec::new()));
    } else {
        for row in downstream {
            staged.push(stage(site, row));
        }
    }
    for row in upstream {
        staged.push(stage(site, row));
    }

    staged
}

/// Explodes each reference list so every reference number occupies its own
/// row, duplicating all other fields. A row with no references survives as
/// exactly one row with a null reference number; no row is ever dropped.
pub fn explode_references(staged: Vec<(MergedRow, Vec<i64>)>) -> Vec<MergedRow> {
    let mut rows = Vec::with_capacity(staged.len());
    for (template, references) in staged {
        if references.is_empty() {
            rows.push(template);
        } else {
            for reference in references {
                let mut row = template.clone();
                row.reference_number = Some(reference.to_string());
                rows.push(row);
            }
        }
    }
    rows
}

/// Left-joins the exploded rows to the references table on reference number,
/// compared as text. Every row is retained; rows without a matching reference
/// keep a null PubMed ID. Duplicate reference numbers keep their first PubMed
/// ID and are logged; the page is assumed to number references uniquely.
pub fn attach_pubmed_ids(rows: &mut [MergedRow], references: &[ReferenceRow]) {
    let mut by_number: BTreeMap<&str, Option<&str>> = BTreeMap::new();
    for reference in references {
        if by_number.contains_key(reference.reference_number.as_str()) {
            tracing::warn!(
                "Duplicate reference number '{}' in references table; keeping the first",
                reference.reference_number
            );
            continue;
        }
        by_number.insert(reference.reference_number.as_str(), reference.pubmed_id.as_deref());
    }

    for row in rows.iter_mut() {
        row.pubmed_id = row
            .reference_number
            .as_deref()
            .and_then(|number| by_number.get(number).copied())
            .flatten()
            .map(str::to_string);
    }
}
