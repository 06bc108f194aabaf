// src/main.rs
mod extractors;
mod phosphosite;
mod reshape;
mod storage;
mod utils;

use clap::Parser;
use scraper::Html;

use extractors::{entities, header, tables};
use phosphosite::client;
use phosphosite::models::SiteRecord;
use storage::StorageManager;
use utils::AppError;

/// Command Line Interface for the PhosphoSitePlus site extractor
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Numeric PhosphoSitePlus site id (e.g. 2559)
    site_id: u64,

    /// Output directory for extracted content
    #[arg(short, long, default_value = ".")]
    output_dir: String,

    /// Extract and reshape, but skip writing any files
    #[arg(long)]
    dry_run: bool,

    /// Debug mode - save the raw fetched HTML next to the CSV
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging();

    // 2. Parse CLI Arguments (a non-integer site id fails here, before any network activity)
    let args = Args::parse();
    tracing::info!("Starting extraction for args: {:?}", args);

    // 3. Fetch the site page and parse the DOM once; all extraction below is offline
    let html = client::fetch_site_page(args.site_id).await?;
    tracing::info!("Downloaded site page ({} bytes)", html.len());
    let document = Html::parse_document(&html);

    // 4. Header: amino-acid code + protein name
    let (amino_acid, protein) = header::parse_site_header(&document);
    if amino_acid.is_none() {
        tracing::warn!("Site header missing; continuing with empty site identity");
    }
    let site = SiteRecord::new(args.site_id, amino_acid, protein);
    tracing::info!(
        "Site identity: amino acid {:?}, protein {:?}",
        site.amino_acid,
        site.protein
    );

    // 5. Locate the section tables and pull their fields
    let upstream_rule = tables::upstream_rule();
    let downstream_rule = tables::downstream_rule(site.protein.as_deref().unwrap_or_default());

    let upstream_fields = tables::extract_section_fields(&document, &upstream_rule);
    let downstream_fields = tables::extract_section_fields(&document, &downstream_rule);
    let references = tables::extract_references(&document);
    tracing::info!("Extracted {} reference rows", references.len());

    // 6. Entity extraction per field
    let upstream_rows = entities::extract_regulation_rows(&upstream_rule, &upstream_fields);
    let downstream_rows = entities::extract_regulation_rows(&downstream_rule, &downstream_fields);
    tracing::info!(
        "Extracted {} upstream and {} downstream regulation rows",
        upstream_rows.len(),
        downstream_rows.len()
    );

    // 7. Reshape: align, explode references, attach PubMed IDs
    let staged = reshape::align_rows(&site, &downstream_rows, &upstream_rows);
    let mut rows = reshape::explode_references(staged);
    reshape::attach_pubmed_ids(&mut rows, &references);
    tracing::info!("Merged table holds {} rows", rows.len());

    // 8. Output
    if args.dry_run {
        tracing::info!("Dry run requested; skipping file output");
        return Ok(());
    }

    let storage = StorageManager::new(&args.output_dir)?;

    if args.debug {
        match storage.save_raw_page(&site, &html) {
            Ok(path) => tracing::info!("Saved raw page HTML to {}", path.display()),
            Err(e) => tracing::warn!("Failed to save raw page HTML: {}", e),
        }
    }

    let csv_path = storage.save_merged_csv(&site, &rows)?;
    tracing::info!("Saved {} rows to {}", rows.len(), csv_path.display());

    match storage.save_site_metadata(&site, rows.len()) {
        Ok(path) => tracing::info!("Saved extraction metadata to {}", path.display()),
        Err(e) => tracing::error!("Failed to save extraction metadata: {}", e),
    }

    Ok(())
}
