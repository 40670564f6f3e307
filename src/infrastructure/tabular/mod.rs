//! Tabular file codec for bulk user transfer
//!
//! The exchange format is a two-column CSV with header
//! `internalID,email`. Import tolerates arbitrary additional columns and
//! carries them through verbatim; export produces a header-only template.

use std::collections::BTreeMap;

use thiserror::Error;

pub const COLUMN_INTERNAL_ID: &str = "internalID";
pub const COLUMN_EMAIL: &str = "email";

#[derive(Debug, Error)]
pub enum TabularError {
    #[error("File is empty")]
    Empty,

    #[error("Column error in file: missing {0}")]
    MissingColumns(String),

    #[error("Malformed file: {0}")]
    Csv(#[from] csv::Error),
}

/// One data row of an uploaded user file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRow {
    pub internal_id: String,
    pub email: String,
    /// Columns other than `internalID`/`email`, passed through verbatim
    pub extra: BTreeMap<String, String>,
}

/// Produce the downloadable template: a header row and nothing else.
pub fn write_template() -> Result<Vec<u8>, TabularError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([COLUMN_INTERNAL_ID, COLUMN_EMAIL])?;
    writer.flush().map_err(csv::Error::from)?;

    writer
        .into_inner()
        .map_err(|e| TabularError::Csv(csv::Error::from(e.into_error())))
}

/// Parse an uploaded file into user rows.
///
/// Fails when the file is empty or the header row lacks the
/// `internalID` or `email` column. Blank lines are skipped.
pub fn read_rows(bytes: &[u8]) -> Result<Vec<UserRow>, TabularError> {
    if bytes.is_empty() {
        return Err(TabularError::Empty);
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(bytes);

    let headers = reader.headers()?.clone();

    let missing: Vec<&str> = [COLUMN_INTERNAL_ID, COLUMN_EMAIL]
        .into_iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .collect();
    if !missing.is_empty() {
        return Err(TabularError::MissingColumns(missing.join(", ")));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;

        let mut internal_id = String::new();
        let mut email = String::new();
        let mut extra = BTreeMap::new();

        for (header, value) in headers.iter().zip(record.iter()) {
            match header {
                COLUMN_INTERNAL_ID => internal_id = value.to_string(),
                COLUMN_EMAIL => email = value.to_string(),
                _ if !value.is_empty() => {
                    extra.insert(header.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        if internal_id.is_empty() && email.is_empty() {
            continue;
        }

        rows.push(UserRow {
            internal_id,
            email,
            extra,
        });
    }

    Ok(rows)
}

// ── Tests ──────────────────────────────────────────────────────
