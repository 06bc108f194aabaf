// src/phosphosite/models.rs
use serde::{Deserialize, Serialize};

/// One phosphorylation site as identified from the page header.
///
/// `amino_acid` and `protein` are `None` when the header element is missing
/// entirely; when the header text does not match the expected shape, both hold
/// the raw header text instead (degenerate but deterministic fallback).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteRecord {
    pub site_id: u64,
    pub amino_acid: Option<String>,
    pub protein: Option<String>,
}

impl SiteRecord {
    pub fn new(site_id: u64, amino_acid: Option<String>, protein: Option<String>) -> Self {
        Self { site_id, amino_acid, protein }
    }
}
