use thiserror::Error;

/// Extract-level failures. These abort the run before anything is published;
/// per-field parse failures and undefined ratios are absorbed as nulls instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extract {extract} is missing required column(s): {}", .columns.join(", "))]
    SchemaMismatch {
        extract: String,
        columns: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_mismatch_names_extract_and_columns() {
        let err = PipelineError::SchemaMismatch {
            extract: "PL23.csv".to_string(),
            columns: vec!["AwayTeam".to_string(), "FTR".to_string()],
        };
        let msg = err.to_string();
        assert!(msg.contains("PL23.csv"));
        assert!(msg.contains("AwayTeam"));
        assert!(msg.contains("FTR"));
    }
}
