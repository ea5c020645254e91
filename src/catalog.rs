use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

pub const CATALOG_VERSION: u32 = 1;

/// Canonical column set shared by all five extracts after normalization.
/// Names are post-rename: no SQL keywords, no whitespace, no `.`/`<`/`>`.
pub const CANONICAL_COLUMNS: [&str; 64] = [
    "League",
    "DateMatch",
    "TimeMatch",
    "HomeTeam",
    "AwayTeam",
    "FTHG",
    "FTAG",
    "FTR",
    "HTHG",
    "HTAG",
    "HTR",
    "HS",
    "ASS",
    "HST",
    "AST",
    "HF",
    "AF",
    "HC",
    "AC",
    "HY",
    "AY",
    "HR",
    "AR",
    "B365H",
    "B365D",
    "B365A",
    "BWH",
    "BWD",
    "BWA",
    "IWH",
    "IWD",
    "IWA",
    "PSH",
    "PSD",
    "PSA",
    "WHH",
    "WHD",
    "WHA",
    "VCH",
    "VCD",
    "VCA",
    "MaxH",
    "MaxD",
    "MaxA",
    "AvgH",
    "AvgD",
    "AvgA",
    "B365O25",
    "B365U25",
    "PO25",
    "PU25",
    "MaxO25",
    "MaxU25",
    "AvgO25",
    "AvgU25",
    "AHh",
    "B365AHH",
    "B365AHA",
    "PAHH",
    "PAHA",
    "MaxAHH",
    "MaxAHA",
    "AvgAHH",
    "AvgAHA",
];

/// Columns computed by the enrichment steps, with the descriptions registered
/// in the stored column catalog.
pub const DERIVED_COLUMNS: [(&str, &str); 14] = [
    ("MaxBooksH", "Maximum home win odds over the six quoted bookmakers"),
    ("MaxBooksD", "Maximum draw odds over the six quoted bookmakers"),
    ("MaxBooksA", "Maximum away win odds over the six quoted bookmakers"),
    ("AvgBooksH", "Mean home win odds over the six quoted bookmakers (nulls ignored)"),
    ("AvgBooksD", "Mean draw odds over the six quoted bookmakers (nulls ignored)"),
    ("AvgBooksA", "Mean away win odds over the six quoted bookmakers (nulls ignored)"),
    ("ImpliedH", "Implied home win probability, percent (100 / AvgBooksH)"),
    ("ImpliedD", "Implied draw probability, percent (100 / AvgBooksD)"),
    ("ImpliedA", "Implied away win probability, percent (100 / AvgBooksA)"),
    ("NormProbH", "Home win probability normalized so the three outcomes sum to 100"),
    ("NormProbD", "Draw probability normalized so the three outcomes sum to 100"),
    ("NormProbA", "Away win probability normalized so the three outcomes sum to 100"),
    ("MarketPick", "Outcome with the lowest mean odds (H/D/A), ties home > draw > away"),
    ("NormProbResult", "Normalized probability of the outcome that actually occurred"),
];

static CANONICAL_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| CANONICAL_COLUMNS.into_iter().collect());

pub fn is_canonical(name: &str) -> bool {
    CANONICAL_SET.contains(name)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rename {
    pub from: String,
    pub to: String,
}

/// One per-league source file and the division code it carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSpec {
    pub code: String,
    pub file: String,
}

/// Versioned catalog of column renames and league sources, passed explicitly
/// into the normalizer. Overridable from a JSON file for non-default layouts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub version: u32,
    pub renames: Vec<Rename>,
    pub sources: Vec<SourceSpec>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let renames = [
            // Reserved words and ambiguous identifiers.
            ("Div", "League"),
            ("Date", "DateMatch"),
            ("Time", "TimeMatch"),
            ("AS", "ASS"),
            // Data-dictionary labels with embedded whitespace.
            ("FTHG and HG", "FTHG"),
            ("FTAG and AG", "FTAG"),
            ("FTR and Res", "FTR"),
            // Forbidden characters in over/under column names.
            ("B365>2.5", "B365O25"),
            ("B365<2.5", "B365U25"),
            ("P>2.5", "PO25"),
            ("P<2.5", "PU25"),
            ("Max>2.5", "MaxO25"),
            ("Max<2.5", "MaxU25"),
            ("Avg>2.5", "AvgO25"),
            ("Avg<2.5", "AvgU25"),
        ];
        let sources = [
            ("E0", "PL23.csv"),
            ("SP1", "LaLiga23.csv"),
            ("D1", "Bundesliga23.csv"),
            ("I1", "SerieA23.csv"),
            ("F1", "Ligue1.csv"),
        ];
        Catalog {
            version: CATALOG_VERSION,
            renames: renames
                .into_iter()
                .map(|(from, to)| Rename {
                    from: from.to_string(),
                    to: to.to_string(),
                })
                .collect(),
            sources: sources
                .into_iter()
                .map(|(code, file)| SourceSpec {
                    code: code.to_string(),
                    file: file.to_string(),
                })
                .collect(),
        }
    }

    /// The canonical identifier for a raw source column: the renamed form if
    /// the catalog has an entry, otherwise the name as-is.
    pub fn canonical_name<'a>(&'a self, raw: &'a str) -> &'a str {
        self.renames
            .iter()
            .find(|r| r.from == raw)
            .map(|r| r.to.as_str())
            .unwrap_or(raw)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("read catalog {}", path.display()))?;
        serde_json::from_str(&raw).context("parse catalog json")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let tmp = path.with_extension("json.tmp");
        let json = serde_json::to_string_pretty(self).context("serialize catalog")?;
        fs::write(&tmp, json).context("write catalog")?;
        fs::rename(&tmp, path).context("swap catalog")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::League;

    #[test]
    fn builtin_covers_all_five_leagues() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.sources.len(), 5);
        for source in &catalog.sources {
            assert!(League::from_code(&source.code).is_some(), "{}", source.code);
        }
    }

    #[test]
    fn rename_targets_are_canonical() {
        let catalog = Catalog::builtin();
        for rename in &catalog.renames {
            assert!(is_canonical(&rename.to), "{} -> {}", rename.from, rename.to);
        }
    }

    #[test]
    fn canonical_name_applies_rename_or_passes_through() {
        let catalog = Catalog::builtin();
        assert_eq!(catalog.canonical_name("AS"), "ASS");
        assert_eq!(catalog.canonical_name("B365>2.5"), "B365O25");
        assert_eq!(catalog.canonical_name("HomeTeam"), "HomeTeam");
        assert_eq!(catalog.canonical_name("Referee"), "Referee");
        assert!(!is_canonical("Referee"));
    }

    #[test]
    fn catalog_round_trips_through_json() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let back: Catalog = serde_json::from_str(&json).unwrap();
        assert_eq!(back.version, catalog.version);
        assert_eq!(back.renames.len(), catalog.renames.len());
        assert_eq!(back.sources.len(), catalog.sources.len());
    }
}
