//! Covariate encoding for the gender regression.
//!
//! Female/female is the reference cell; every other cell is an offset from it.

use gb_common::{Error, Result};

use crate::data::{DataTable, AUTHOR_COLUMN, REVIEWER_COLUMN};

pub const MALE: f64 = 1.0;
pub const FEMALE: f64 = 0.0;

/// Number of linear-predictor coefficients per parameter: intercept, author,
/// reviewer, interaction.
pub const DESIGN_WIDTH: usize = 4;

/// Indicator for a gender label, case-insensitive after trimming.
pub fn encode_gender(value: &str) -> Option<f64> {
    match value.trim().to_ascii_lowercase().as_str() {
        "male" => Some(MALE),
        "female" => Some(FEMALE),
        _ => None,
    }
}

/// Design vector `[1, author, reviewer, author·reviewer]`.
pub fn design_row(author: f64, reviewer: f64) -> [f64; DESIGN_WIDTH] {
    [1.0, author, reviewer, author * reviewer]
}

/// Immutable per-observation covariate arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Covariates {
    author: Vec<f64>,
    reviewer: Vec<f64>,
}

impl Covariates {
    /// Build from explicit arrays; lengths must agree and values be finite.
    pub fn new(author: Vec<f64>, reviewer: Vec<f64>) -> Result<Self> {
        if author.len() != reviewer.len() {
            return Err(Error::CovariateShape {
                name: "reviewer".to_string(),
                expected: author.len(),
                actual: reviewer.len(),
            });
        }
        for (name, values) in [("author", &author), ("reviewer", &reviewer)] {
            if let Some(i) = values.iter().position(|x| !x.is_finite()) {
                return Err(Error::ModelDefinition(format!(
                    "{name} covariate entry {i} is not finite"
                )));
            }
        }
        Ok(Self { author, reviewer })
    }

    /// Encode the gender columns of a loaded table.
    pub fn from_table(table: &DataTable) -> Result<Self> {
        let mut author = Vec::with_capacity(table.len());
        let mut reviewer = Vec::with_capacity(table.len());
        for obs in &table.observations {
            let encode = |value: &str, column: &str| {
                encode_gender(value).ok_or_else(|| Error::UnknownCategory {
                    row: obs.row,
                    column: column.to_string(),
                    value: value.to_string(),
                })
            };
            reviewer.push(encode(&obs.reviewer, REVIEWER_COLUMN)?);
            author.push(encode(&obs.author, AUTHOR_COLUMN)?);
        }
        Self::new(author, reviewer)
    }

    /// All-zero covariates: every observation in the reference cell.
    pub fn intercept_only(len: usize) -> Self {
        Self {
            author: vec![FEMALE; len],
            reviewer: vec![FEMALE; len],
        }
    }

    pub fn len(&self) -> usize {
        self.author.len()
    }

    pub fn is_empty(&self) -> bool {
        self.author.is_empty()
    }

    pub fn author(&self) -> &[f64] {
        &self.author
    }

    pub fn reviewer(&self) -> &[f64] {
        &self.reviewer
    }

    pub fn design_row(&self, i: usize) -> [f64; DESIGN_WIDTH] {
        design_row(self.author[i], self.reviewer[i])
    }
}
