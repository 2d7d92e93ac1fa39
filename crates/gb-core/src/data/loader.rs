//! Tab-separated review table loader.

use std::io::Read;
use std::path::Path;

use gb_common::{Error, Result};

/// Source column holding the reviewer's gender.
pub const REVIEWER_COLUMN: &str = "rev_gender_updated";
/// Source column holding the author's gender.
pub const AUTHOR_COLUMN: &str = "author_gender";
/// Source column holding the raw grade.
pub const GRADE_COLUMN: &str = "grades";

/// Tokens read as missing values, compared after trimming whitespace.
pub const NA_TOKENS: [&str; 13] = [
    "", "NA", "N/A", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A", "n/a", "-nan", "-NaN",
];

/// One retained review: both genders present, grade coerced to an integer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Observation {
    pub reviewer: String,
    pub author: String,
    pub grade: i64,
    /// 1-based data row in the source table (header excluded).
    pub row: usize,
}

/// Retained observations plus bookkeeping about the source.
#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    pub observations: Vec<Observation>,
    /// Rows discarded for a missing reviewer or author gender.
    pub dropped: usize,
    pub source: String,
}

impl DataTable {
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Rows read from the source before dropping.
    pub fn total_rows(&self) -> usize {
        self.observations.len() + self.dropped
    }

    /// Build a table directly from `(reviewer, author, grade)` triples.
    pub fn from_rows<I, S>(rows: I) -> Self
    where
        I: IntoIterator<Item = (S, S, i64)>,
        S: Into<String>,
    {
        let observations = rows
            .into_iter()
            .enumerate()
            .map(|(i, (reviewer, author, grade))| Observation {
                reviewer: reviewer.into(),
                author: author.into(),
                grade,
                row: i + 1,
            })
            .collect();
        DataTable {
            observations,
            dropped: 0,
            source: "<memory>".to_string(),
        }
    }
}

pub fn is_na(field: &str) -> bool {
    NA_TOKENS.contains(&field.trim())
}

/// Parse integer text or integral float text (`"4"`, `"4.0"`).
fn parse_grade(field: &str) -> Option<i64> {
    let text = field.trim();
    if let Ok(v) = text.parse::<i64>() {
        return Some(v);
    }
    let v = text.parse::<f64>().ok()?;
    if !v.is_finite() || v.fract() != 0.0 || v.abs() > i64::MAX as f64 {
        return None;
    }
    Some(v as i64)
}

/// Read the review table at `path`.
pub fn load_observations(path: &Path) -> Result<DataTable> {
    let file = std::fs::File::open(path)
        .map_err(|e| Error::DataRead(format!("{}: {}", path.display(), e)))?;
    load_observations_from_reader(file, &path.display().to_string())
}

/// Read a review table from any reader; `source` names it in errors.
pub fn load_observations_from_reader<R: Read>(reader: R, source: &str) -> Result<DataTable> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::DataRead(format!("{source}: header: {e}")))?
        .clone();

    let column = |name: &str| -> Result<usize> {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                path: source.to_string(),
            })
    };
    let reviewer_idx = column(REVIEWER_COLUMN)?;
    let author_idx = column(AUTHOR_COLUMN)?;
    let grade_idx = column(GRADE_COLUMN)?;

    let mut observations = Vec::new();
    let mut dropped = 0;
    for (i, record) in reader.records().enumerate() {
        let row = i + 1;
        let record = record.map_err(|e| Error::DataRead(format!("{source}: data row {row}: {e}")))?;
        let field = |idx: usize| record.get(idx).unwrap_or("");

        let reviewer = field(reviewer_idx);
        let author = field(author_idx);
        if is_na(reviewer) || is_na(author) {
            dropped += 1;
            continue;
        }

        let raw_grade = field(grade_idx);
        let grade = parse_grade(raw_grade).ok_or_else(|| Error::TypeConversion {
            row,
            column: GRADE_COLUMN.to_string(),
            value: raw_grade.to_string(),
        })?;

        observations.push(Observation {
            reviewer: reviewer.to_string(),
            author: author.to_string(),
            grade,
            row,
        });
    }

    Ok(DataTable {
        observations,
        dropped,
        source: source.to_string(),
    })
}
