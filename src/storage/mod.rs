// src/storage/mod.rs
use std::fs;
use std::path::{Path, PathBuf};

use crate::phosphosite::models::SiteRecord;
use crate::reshape::{MergedRow, OUTPUT_COLUMNS};
use crate::utils::error::StorageError;

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// Output directory for one site: `<base_dir>/<protein_name>/`.
    /// Errors when the site identity is too incomplete to name a folder.
    fn site_dir(&self, site: &SiteRecord) -> Result<PathBuf, StorageError> {
        let protein = site
            .protein
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(StorageError::IncompleteSite)?;
        Ok(self.base_dir.join(protein))
    }

    fn file_stem(&self, site: &SiteRecord) -> Result<String, StorageError> {
        let amino_acid = site
            .amino_acid
            .as_deref()
            .filter(|a| !a.is_empty())
            .ok_or(StorageError::IncompleteSite)?;
        let protein = site
            .protein
            .as_deref()
            .filter(|p| !p.is_empty())
            .ok_or(StorageError::IncompleteSite)?;
        Ok(format!("{}_{}", amino_acid, protein))
    }

    /// Writes the merged table as `<protein>/<amino_acid>_<protein>.csv`,
    /// one row per (entity, reference) pair, nulls rendered as "nan".
    pub fn save_merged_csv(
        &self,
        site: &SiteRecord,
        rows: &[MergedRow],
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.site_dir(site)?;
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let file_path = target_dir.join(format!("{}.csv", self.file_stem(site)?));

        let mut writer = csv::Writer::from_path(&file_path)?;
        writer.write_record(OUTPUT_COLUMNS)?;
        for row in rows {
            writer.write_record(row.to_record())?;
        }
        writer.flush().map_err(StorageError::IoError)?;

        tracing::info!("Saved merged table to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves metadata about the extraction in JSON format next to the CSV.
    pub fn save_site_metadata(
        &self,
        site: &SiteRecord,
        row_count: usize,
    ) -> Result<PathBuf, StorageError> {
        let target_dir = self.site_dir(site)?;
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let file_path = target_dir.join(format!("{}_meta.json", self.file_stem(site)?));

        let metadata = serde_json::json!({
            "site_id": site.site_id,
            "amino_acid": site.amino_acid,
            "protein": site.protein,
            "row_count": row_count,
            "extraction_timestamp": chrono::Utc::now().to_rfc3339(),
        });

        let metadata_str = serde_json::to_string_pretty(&metadata)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        fs::write(&file_path, metadata_str).map_err(StorageError::IoError)?;

        tracing::info!("Saved metadata to {}", file_path.display());

        Ok(file_path)
    }

    /// Saves the raw fetched page HTML for debugging.
    pub fn save_raw_page(&self, site: &SiteRecord, html: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.site_dir(site)?;
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }

        let file_path = target_dir.join(format!("{}_raw.html", self.file_stem(site)?));
        fs::write(&file_path, html).map_err(StorageError::IoError)?;

        Ok(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_site_identity_is_rejected() {
        let storage = StorageManager { base_dir: PathBuf::from(".") };
        let site = SiteRecord::new(1, None, None);
        assert!(matches!(
            storage.site_dir(&site),
            Err(StorageError::IncompleteSite)
        ));
        assert!(matches!(
            storage.file_stem(&site),
            Err(StorageError::IncompleteSite)
        ));
    }

    #[test]
    fn test_file_stem_joins_amino_acid_and_protein() {
        let storage = StorageManager { base_dir: PathBuf::from("out") };
        let site = SiteRecord::new(2559, Some("Thr160".to_string()), Some("CDK2".to_string()));
        assert_eq!(storage.file_stem(&site).unwrap(), "Thr160_CDK2");
        assert_eq!(storage.site_dir(&site).unwrap(), PathBuf::from("out/CDK2"));
    }
}
