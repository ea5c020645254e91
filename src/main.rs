use std::path::PathBuf;

use anyhow::{Context, Result};

use europa_odds::catalog::Catalog;
use europa_odds::pipeline::{self, RunConfig};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::dotenv();

    let data_dir = arg_value("--data-dir")
        .map(PathBuf::from)
        .or_else(|| env_path("EUROPA_DATA_DIR"))
        .unwrap_or_else(|| PathBuf::from("data"));
    let db_path = arg_value("--db")
        .map(PathBuf::from)
        .or_else(|| env_path("EUROPA_DB"))
        .unwrap_or_else(|| PathBuf::from("europa.sqlite"));
    let dictionary_path = arg_value("--dict")
        .map(PathBuf::from)
        .or_else(|| env_path("EUROPA_DICT"));
    let catalog = match arg_value("--catalog") {
        Some(path) => {
            Catalog::load(PathBuf::from(path).as_path()).context("load catalog override")?
        }
        None => Catalog::builtin(),
    };

    let config = RunConfig {
        data_dir,
        db_path,
        dictionary_path,
        catalog,
    };
    let summary = pipeline::run(&config)?;

    println!("Flat extract rebuild complete");
    println!("DB: {}", summary.db_path.display());
    for (league, rows) in &summary.input_rows {
        println!("{} ({}): {} rows", league.country(), league.code(), rows);
    }
    println!("Merged rows: {}", summary.output_rows);
    println!("Described columns: {}", summary.described_columns);
    println!("Catalog version: {}", summary.catalog_version);

    Ok(())
}

fn arg_value(flag: &str) -> Option<String> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg.strip_prefix(&format!("{flag}="))
            && !value.trim().is_empty()
        {
            return Some(value.trim().to_string());
        }
        if arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = std::env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(PathBuf::from(trimmed))
    }
}
