use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveTime};
use csv::{ReaderBuilder, StringRecord};

use crate::catalog::{CANONICAL_COLUMNS, Catalog};
use crate::error::PipelineError;
use crate::record::{League, MatchRecord, OddsTriple, Outcome};

/// One normalized per-league extract, prior to merging.
#[derive(Debug, Clone)]
pub struct Extract {
    pub league: League,
    pub name: String,
    pub rows: Vec<MatchRecord>,
}

pub fn normalize_file(path: &Path, league: League, catalog: &Catalog) -> Result<Extract> {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let file =
        File::open(path).with_context(|| format!("open extract {}", path.display()))?;
    normalize_extract(&name, league, file, catalog)
}

/// Aligns one raw extract onto the canonical schema: renames columns per the
/// catalog, drops everything non-canonical (the English file's Referee column
/// included), and parses fields to their canonical types. A field that fails
/// typed parsing becomes None; a missing canonical column is fatal.
pub fn normalize_extract(
    name: &str,
    league: League,
    input: impl Read,
    catalog: &Catalog,
) -> Result<Extract> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader
        .headers()
        .with_context(|| format!("read header of {name}"))?
        .clone();

    // Position of each canonical column in this extract's header, after the
    // rename catalog is applied. Non-canonical columns simply never land here.
    let mut index: HashMap<&'static str, usize> = HashMap::new();
    for (pos, raw) in headers.iter().enumerate() {
        let canonical = catalog.canonical_name(raw.trim());
        if let Some(col) = CANONICAL_COLUMNS.iter().find(|c| **c == canonical) {
            index.entry(col).or_insert(pos);
        }
    }

    let missing = CANONICAL_COLUMNS
        .iter()
        .filter(|col| !index.contains_key(*col))
        .map(|col| col.to_string())
        .collect::<Vec<_>>();
    if !missing.is_empty() {
        return Err(PipelineError::SchemaMismatch {
            extract: name.to_string(),
            columns: missing,
        }
        .into());
    }

    let mut rows = Vec::new();
    for (pos, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read {name} line {}", pos + 2))?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        rows.push(parse_row(league, &record, &index));
    }

    Ok(Extract {
        league,
        name: name.to_string(),
        rows,
    })
}

fn parse_row(
    league: League,
    record: &StringRecord,
    index: &HashMap<&'static str, usize>,
) -> MatchRecord {
    let field = |name: &str| -> Option<&str> {
        let value = record.get(*index.get(name)?)?.trim();
        if value.is_empty() { None } else { Some(value) }
    };
    let int = |name: &str| field(name).and_then(|v| v.parse::<i32>().ok());
    let num = |name: &str| field(name).and_then(|v| v.parse::<f64>().ok());
    let result = |name: &str| field(name).and_then(Outcome::from_code);
    let triple = |h: &str, d: &str, a: &str| OddsTriple {
        home: num(h),
        draw: num(d),
        away: num(a),
    };

    MatchRecord {
        league,
        date: field("DateMatch").and_then(parse_date),
        kickoff: field("TimeMatch").and_then(parse_time),
        home_team: field("HomeTeam").unwrap_or_default().to_string(),
        away_team: field("AwayTeam").unwrap_or_default().to_string(),

        ft_home_goals: int("FTHG"),
        ft_away_goals: int("FTAG"),
        ft_result: result("FTR"),
        ht_home_goals: int("HTHG"),
        ht_away_goals: int("HTAG"),
        ht_result: result("HTR"),

        home_shots: int("HS"),
        away_shots: int("ASS"),
        home_shots_on_target: int("HST"),
        away_shots_on_target: int("AST"),
        home_fouls: int("HF"),
        away_fouls: int("AF"),
        home_corners: int("HC"),
        away_corners: int("AC"),
        home_yellow: int("HY"),
        away_yellow: int("AY"),
        home_red: int("HR"),
        away_red: int("AR"),

        b365: triple("B365H", "B365D", "B365A"),
        bw: triple("BWH", "BWD", "BWA"),
        iw: triple("IWH", "IWD", "IWA"),
        ps: triple("PSH", "PSD", "PSA"),
        wh: triple("WHH", "WHD", "WHA"),
        vc: triple("VCH", "VCD", "VCA"),

        src_max: triple("MaxH", "MaxD", "MaxA"),
        src_avg: triple("AvgH", "AvgD", "AvgA"),

        b365_over25: num("B365O25"),
        b365_under25: num("B365U25"),
        p_over25: num("PO25"),
        p_under25: num("PU25"),
        max_over25: num("MaxO25"),
        max_under25: num("MaxU25"),
        avg_over25: num("AvgO25"),
        avg_under25: num("AvgU25"),

        ah_line: num("AHh"),
        b365_ah_home: num("B365AHH"),
        b365_ah_away: num("B365AHA"),
        p_ah_home: num("PAHH"),
        p_ah_away: num("PAHA"),
        max_ah_home: num("MaxAHH"),
        max_ah_away: num("MaxAHA"),
        avg_ah_home: num("AvgAHH"),
        avg_ah_away: num("AvgAHA"),
    }
}

// Source dates are day-month-year; both two- and four-digit years appear in
// football-data files. %y must be tried first: it rejects four-digit years
// (trailing input), while %Y would swallow "04/05/24" as year 24.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%d/%m/%y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%d/%m/%Y"))
        .ok()
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Div,Date,Time,HomeTeam,AwayTeam,FTHG,FTAG,FTR,HTHG,HTAG,HTR,\
HS,AS,HST,AST,HF,AF,HC,AC,HY,AY,HR,AR,\
B365H,B365D,B365A,BWH,BWD,BWA,IWH,IWD,IWA,PSH,PSD,PSA,WHH,WHD,WHA,VCH,VCD,VCA,\
MaxH,MaxD,MaxA,AvgH,AvgD,AvgA,\
B365>2.5,B365<2.5,P>2.5,P<2.5,Max>2.5,Max<2.5,Avg>2.5,Avg<2.5,\
AHh,B365AHH,B365AHA,PAHH,PAHA,MaxAHH,MaxAHA,AvgAHH,AvgAHA";

    const ROW: &str = "F1,04/05/2024,16:00,Lyon,Monaco,3,2,H,2,1,H,\
14,9,7,4,11,13,5,3,2,1,0,0,\
2.30,3.60,3.00,2.35,3.50,2.95,2.30,3.55,2.90,2.38,3.62,3.05,2.25,3.50,3.00,2.40,3.60,2.88,\
2.45,3.70,3.10,2.33,3.56,2.96,\
1.62,2.30,1.65,2.36,1.68,2.40,1.63,2.31,\
-0.25,1.93,1.97,1.95,1.98,1.98,2.02,1.94,1.96";

    fn normalize_one(csv: &str) -> Extract {
        normalize_extract("test.csv", League::France, csv.as_bytes(), &Catalog::builtin())
            .expect("extract should normalize")
    }

    #[test]
    fn parses_typed_fields_from_textual_row() {
        let extract = normalize_one(&format!("{HEADER}\n{ROW}\n"));
        assert_eq!(extract.rows.len(), 1);
        let row = &extract.rows[0];
        assert_eq!(row.home_team, "Lyon");
        assert_eq!(row.away_team, "Monaco");
        assert_eq!(row.date, NaiveDate::from_ymd_opt(2024, 5, 4));
        assert_eq!(row.kickoff, NaiveTime::from_hms_opt(16, 0, 0));
        assert_eq!(row.ft_home_goals, Some(3));
        assert_eq!(row.ft_result, Some(Outcome::Home));
        assert_eq!(row.away_shots, Some(9)); // from the renamed AS column
        assert_eq!(row.b365.home, Some(2.30));
        assert_eq!(row.vc.away, Some(2.88));
        assert_eq!(row.src_max.draw, Some(3.70));
        assert_eq!(row.ah_line, Some(-0.25));
        assert_eq!(row.avg_under25, Some(2.31));
    }

    #[test]
    fn two_digit_years_parse() {
        let row = ROW.replace("04/05/2024", "04/05/24");
        let extract = normalize_one(&format!("{HEADER}\n{row}\n"));
        assert_eq!(extract.rows[0].date, NaiveDate::from_ymd_opt(2024, 5, 4));
    }

    #[test]
    fn both_year_widths_yield_the_same_date() {
        // A two-digit year must land in the 2000s, not literal year 24.
        let expected = NaiveDate::from_ymd_opt(2024, 5, 4);
        assert_eq!(parse_date("04/05/2024"), expected);
        assert_eq!(parse_date("04/05/24"), expected);
    }

    #[test]
    fn parse_failure_yields_null_not_error() {
        let row = ROW
            .replace("04/05/2024", "not-a-date")
            .replace(",14,9,", ",n/a,9,");
        let extract = normalize_one(&format!("{HEADER}\n{row}\n"));
        let parsed = &extract.rows[0];
        assert_eq!(parsed.date, None);
        assert_eq!(parsed.home_shots, None);
        // The rest of the record survives with reduced fidelity.
        assert_eq!(parsed.ft_home_goals, Some(3));
    }

    #[test]
    fn referee_column_is_dropped() {
        let header = HEADER.replace(",HS,AS,", ",Referee,HS,AS,");
        let row = ROW.replace(",14,9,", ",M Oliver,14,9,");
        let extract = normalize_one(&format!("{header}\n{row}\n"));
        let parsed = &extract.rows[0];
        assert_eq!(parsed.home_shots, Some(14));
        assert_eq!(parsed.away_shots, Some(9));
    }

    #[test]
    fn missing_required_column_is_schema_mismatch() {
        let header = HEADER.replace("HomeTeam,AwayTeam", "HomeTeam");
        let err = normalize_extract(
            "broken.csv",
            League::France,
            format!("{header}\n").as_bytes(),
            &Catalog::builtin(),
        )
        .expect_err("missing AwayTeam must fail");
        let mismatch = err
            .downcast_ref::<PipelineError>()
            .expect("typed schema error");
        let PipelineError::SchemaMismatch { extract, columns } = mismatch;
        assert_eq!(extract, "broken.csv");
        assert_eq!(columns, &["AwayTeam".to_string()]);
    }

    #[test]
    fn blank_lines_are_skipped() {
        let extract = normalize_one(&format!("{HEADER}\n{ROW}\n,,,,\n"));
        assert_eq!(extract.rows.len(), 1);
    }
}
