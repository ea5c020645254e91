use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use chrono::Utc;

use crate::catalog::Catalog;
use crate::record::League;
use crate::{dictionary, enrich, merge, normalize, store};

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub dictionary_path: Option<PathBuf>,
    pub catalog: Catalog,
}

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub db_path: PathBuf,
    pub input_rows: Vec<(League, usize)>,
    pub output_rows: usize,
    pub described_columns: usize,
    pub catalog_version: u32,
}

/// One full batch run: normalize all five extracts, merge, enrich, replace the
/// stored extract, record the audit row. All five extracts are normalized
/// before anything is written, so a SchemaMismatch aborts with no partial
/// output published. Re-running is idempotent by total replacement.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let started_at = Utc::now().to_rfc3339();

    let mut extracts = Vec::with_capacity(config.catalog.sources.len());
    for source in &config.catalog.sources {
        let league = League::from_code(&source.code)
            .ok_or_else(|| anyhow!("unknown league code {} in catalog", source.code))?;
        let path = config.data_dir.join(&source.file);
        extracts.push(normalize::normalize_file(&path, league, &config.catalog)?);
    }

    let (rows, merge_summary) = merge::union(extracts);
    let enriched = rows.into_iter().map(enrich::enrich).collect::<Vec<_>>();

    let dict = match &config.dictionary_path {
        Some(path) => dictionary::read_dictionary(path)?,
        None => Vec::new(),
    };

    let mut conn = store::open_db(&config.db_path)?;
    store::replace_extract(&mut conn, &enriched).context("replace flat extract")?;
    let described_columns = store::write_column_catalog(&conn, &config.catalog, &dict)
        .context("write column catalog")?;
    let finished_at = Utc::now().to_rfc3339();
    store::record_run(
        &conn,
        &merge_summary,
        config.catalog.version,
        &started_at,
        &finished_at,
    )?;

    Ok(RunSummary {
        db_path: config.db_path.clone(),
        input_rows: merge_summary.input_rows,
        output_rows: merge_summary.output_rows,
        described_columns,
        catalog_version: config.catalog.version,
    })
}
