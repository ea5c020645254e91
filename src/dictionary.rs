use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Parses the companion plain-text data dictionary that ships with the source
/// files. Entries are `Name = Description` lines; everything else (prose,
/// section headings, blank lines) is ignored. The dictionary describes a
/// superset of the fields actually present in the extracts, so no attempt is
/// made here to validate names against the canonical schema.
pub fn parse_dictionary(raw: &str) -> Vec<(String, String)> {
    raw.lines()
        .filter_map(|line| {
            let (name, description) = line.split_once('=')?;
            let name = name.trim();
            let description = description.trim();
            if name.is_empty() || description.is_empty() {
                return None;
            }
            Some((name.to_string(), description.to_string()))
        })
        .collect()
}

pub fn read_dictionary(path: &Path) -> Result<Vec<(String, String)>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("read data dictionary {}", path.display()))?;
    Ok(parse_dictionary(&raw))
}
