use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::Value;
use rusqlite::{Connection, params, params_from_iter};

use crate::catalog::{CANONICAL_COLUMNS, Catalog, DERIVED_COLUMNS, is_canonical};
use crate::merge::MergeSummary;
use crate::record::{EnrichedMatch, Outcome};

pub const TABLE: &str = "europa";
const STAGING: &str = "europa_staging";

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_meta_schema(&conn)?;
    Ok(conn)
}

pub fn init_meta_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS pipeline_runs (
            run_id INTEGER PRIMARY KEY AUTOINCREMENT,
            started_at TEXT NOT NULL,
            finished_at TEXT NOT NULL,
            catalog_version INTEGER NOT NULL,
            input_rows_json TEXT NOT NULL,
            output_rows INTEGER NOT NULL
        );
        CREATE TABLE IF NOT EXISTS column_catalog (
            name TEXT PRIMARY KEY,
            description TEXT NOT NULL,
            catalog_version INTEGER NOT NULL
        );
        "#,
    )
    .context("create meta schema")?;
    Ok(())
}

/// Replaces the stored flat extract with the given rows. The write goes to a
/// staging table first; the drop of the previous table and the rename happen
/// inside the same transaction, so readers never observe a partial extract.
pub fn replace_extract(conn: &mut Connection, rows: &[EnrichedMatch]) -> Result<usize> {
    let columns = schema_columns();
    let column_defs = columns
        .iter()
        .map(|(name, ty)| format!("{name} {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    let names = columns
        .iter()
        .map(|(name, _)| *name)
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = (1..=columns.len())
        .map(|i| format!("?{i}"))
        .collect::<Vec<_>>()
        .join(", ");

    let tx = conn.transaction().context("begin replace transaction")?;
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {STAGING}; CREATE TABLE {STAGING} ({column_defs});"
    ))
    .context("create staging table")?;
    {
        let mut stmt = tx
            .prepare(&format!(
                "INSERT INTO {STAGING} ({names}) VALUES ({placeholders})"
            ))
            .context("prepare match insert")?;
        for row in rows {
            stmt.execute(params_from_iter(row_values(row)))
                .context("insert match row")?;
        }
    }
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {TABLE};
         ALTER TABLE {STAGING} RENAME TO {TABLE};
         CREATE INDEX IF NOT EXISTS idx_europa_league ON {TABLE}(League);
         CREATE INDEX IF NOT EXISTS idx_europa_date ON {TABLE}(DateMatch);"
    ))
    .context("swap staging table into place")?;
    tx.commit().context("commit replace transaction")?;
    Ok(rows.len())
}

/// Registers column descriptions: dictionary entries mapped through the rename
/// catalog for the base columns (described-but-absent fields are skipped),
/// plus built-in descriptions for the derived columns.
pub fn write_column_catalog(
    conn: &Connection,
    catalog: &Catalog,
    dictionary: &[(String, String)],
) -> Result<usize> {
    conn.execute("DELETE FROM column_catalog", [])
        .context("clear column catalog")?;
    let mut stmt = conn
        .prepare(
            "INSERT OR REPLACE INTO column_catalog(name, description, catalog_version)
             VALUES (?1, ?2, ?3)",
        )
        .context("prepare column catalog insert")?;
    let mut count = 0usize;
    for (raw, description) in dictionary {
        let canonical = catalog.canonical_name(raw);
        if !is_canonical(canonical) {
            continue;
        }
        stmt.execute(params![canonical, description, catalog.version])
            .context("insert column description")?;
        count += 1;
    }
    for (name, description) in DERIVED_COLUMNS {
        stmt.execute(params![name, description, catalog.version])
            .context("insert derived column description")?;
        count += 1;
    }
    Ok(count)
}

pub fn record_run(
    conn: &Connection,
    summary: &MergeSummary,
    catalog_version: u32,
    started_at: &str,
    finished_at: &str,
) -> Result<()> {
    let mut input_rows = serde_json::Map::new();
    for (league, rows) in &summary.input_rows {
        input_rows.insert(league.country().to_string(), (*rows).into());
    }
    let input_rows_json = serde_json::Value::Object(input_rows).to_string();
    conn.execute(
        "INSERT INTO pipeline_runs(started_at, finished_at, catalog_version, input_rows_json, output_rows)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            started_at,
            finished_at,
            catalog_version as i64,
            input_rows_json,
            summary.output_rows as i64
        ],
    )
    .context("insert pipeline run")?;
    Ok(())
}

pub fn table_exists(conn: &Connection) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            params![TABLE],
            |row| row.get(0),
        )
        .context("query sqlite_master")?;
    Ok(count > 0)
}

pub fn row_count(conn: &Connection) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE}"), [], |row| {
        row.get(0)
    })
    .context("count extract rows")
}

pub fn league_row_counts(conn: &Connection) -> Result<Vec<(String, i64)>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT League, COUNT(*) FROM {TABLE} GROUP BY League ORDER BY League"
        ))
        .context("prepare league counts")?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
        .context("query league counts")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode league count")?);
    }
    Ok(out)
}

/// Every stored row, in insertion order, as raw SQL values. Used to compare
/// whole extracts (idempotence checks) without caring about column types.
pub fn dump_rows(conn: &Connection) -> Result<Vec<Vec<Value>>> {
    let mut stmt = conn
        .prepare(&format!("SELECT * FROM {TABLE} ORDER BY rowid"))
        .context("prepare extract dump")?;
    let column_count = stmt.column_count();
    let rows = stmt
        .query_map([], |row| {
            let mut out = Vec::with_capacity(column_count);
            for idx in 0..column_count {
                out.push(row.get::<_, Value>(idx)?);
            }
            Ok(out)
        })
        .context("query extract dump")?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.context("decode extract row")?);
    }
    Ok(out)
}

fn schema_columns() -> Vec<(&'static str, &'static str)> {
    CANONICAL_COLUMNS
        .into_iter()
        .chain(DERIVED_COLUMNS.into_iter().map(|(name, _)| name))
        .map(|name| (name, column_type(name)))
        .collect()
}

fn column_type(name: &str) -> &'static str {
    match name {
        "League" | "HomeTeam" | "AwayTeam" => "TEXT NOT NULL",
        "DateMatch" | "TimeMatch" | "FTR" | "HTR" | "MarketPick" => "TEXT NULL",
        "FTHG" | "FTAG" | "HTHG" | "HTAG" | "HS" | "ASS" | "HST" | "AST" | "HF" | "AF"
        | "HC" | "AC" | "HY" | "AY" | "HR" | "AR" => "INTEGER NULL",
        _ => "REAL NULL",
    }
}

// Values in the exact order of schema_columns().
fn row_values(row: &EnrichedMatch) -> Vec<Value> {
    let r = &row.record;
    let m = &row.metrics;
    let mut values = Vec::with_capacity(CANONICAL_COLUMNS.len() + DERIVED_COLUMNS.len());

    values.push(Value::Text(r.league.country().to_string()));
    values.push(opt_text(r.date.map(|d| d.format("%Y-%m-%d").to_string())));
    values.push(opt_text(r.kickoff.map(|t| t.format("%H:%M").to_string())));
    values.push(Value::Text(r.home_team.clone()));
    values.push(Value::Text(r.away_team.clone()));

    values.push(opt_int(r.ft_home_goals));
    values.push(opt_int(r.ft_away_goals));
    values.push(opt_outcome(r.ft_result));
    values.push(opt_int(r.ht_home_goals));
    values.push(opt_int(r.ht_away_goals));
    values.push(opt_outcome(r.ht_result));

    for stat in [
        r.home_shots,
        r.away_shots,
        r.home_shots_on_target,
        r.away_shots_on_target,
        r.home_fouls,
        r.away_fouls,
        r.home_corners,
        r.away_corners,
        r.home_yellow,
        r.away_yellow,
        r.home_red,
        r.away_red,
    ] {
        values.push(opt_int(stat));
    }

    for triple in [&r.b365, &r.bw, &r.iw, &r.ps, &r.wh, &r.vc, &r.src_max, &r.src_avg] {
        values.push(opt_real(triple.home));
        values.push(opt_real(triple.draw));
        values.push(opt_real(triple.away));
    }

    for odds in [
        r.b365_over25,
        r.b365_under25,
        r.p_over25,
        r.p_under25,
        r.max_over25,
        r.max_under25,
        r.avg_over25,
        r.avg_under25,
        r.ah_line,
        r.b365_ah_home,
        r.b365_ah_away,
        r.p_ah_home,
        r.p_ah_away,
        r.max_ah_home,
        r.max_ah_away,
        r.avg_ah_home,
        r.avg_ah_away,
    ] {
        values.push(opt_real(odds));
    }

    for triple in [&m.max_books, &m.avg_books] {
        values.push(opt_real(triple.home));
        values.push(opt_real(triple.draw));
        values.push(opt_real(triple.away));
    }
    for probs in [&m.implied, &m.normalized] {
        values.push(opt_real(probs.home));
        values.push(opt_real(probs.draw));
        values.push(opt_real(probs.away));
    }
    values.push(opt_outcome(m.market_pick));
    values.push(opt_real(m.realized_prob));

    values
}

fn opt_int(value: Option<i32>) -> Value {
    value.map_or(Value::Null, |v| Value::Integer(i64::from(v)))
}

fn opt_real(value: Option<f64>) -> Value {
    value.map_or(Value::Null, Value::Real)
}

fn opt_text(value: Option<String>) -> Value {
    value.map_or(Value::Null, Value::Text)
}

fn opt_outcome(value: Option<Outcome>) -> Value {
    value.map_or(Value::Null, |o| Value::Text(o.code().to_string()))
}
