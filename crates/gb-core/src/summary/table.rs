//! Posterior summary table.

use std::fmt;
use std::path::Path;

use gb_common::{Error, Result};
use gb_config::SummaryConfig;
use gb_math::describe::{hdi, mean, std_dev};
use serde::Serialize;

use super::diagnostics::{ess_bulk, ess_tail, mcse_mean, mcse_sd, rhat};
use crate::inference::InferenceData;

/// Summary statistics of one scalar parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryRow {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
    pub hdi_lower: f64,
    pub hdi_upper: f64,
    pub mcse_mean: f64,
    pub mcse_sd: f64,
    pub ess_bulk: f64,
    pub ess_tail: f64,
    pub r_hat: f64,
}

impl SummaryRow {
    /// Summarize one parameter given its per-chain traces.
    pub fn from_chains(name: &str, chains: &[Vec<f64>], hdi_prob: f64) -> Self {
        let pooled: Vec<f64> = chains.iter().flatten().copied().collect();
        let interval = hdi(&pooled, hdi_prob);
        Self {
            name: name.to_string(),
            mean: mean(&pooled),
            sd: std_dev(&pooled, 1),
            hdi_lower: interval.map_or(f64::NAN, |i| i.lower),
            hdi_upper: interval.map_or(f64::NAN, |i| i.upper),
            mcse_mean: mcse_mean(chains),
            mcse_sd: mcse_sd(chains),
            ess_bulk: ess_bulk(chains),
            ess_tail: ess_tail(chains),
            r_hat: rhat(chains),
        }
    }

    /// Cells after rounding, in column order.
    fn cells(&self, round_to: usize) -> [String; 9] {
        [
            fixed(self.mean, round_to),
            fixed(self.sd, round_to),
            fixed(self.hdi_lower, round_to),
            fixed(self.hdi_upper, round_to),
            fixed(self.mcse_mean, round_to),
            fixed(self.mcse_sd, round_to),
            fixed(self.ess_bulk, 0),
            fixed(self.ess_tail, 0),
            fixed(self.r_hat, 2),
        ]
    }
}

/// Fixed-point text without a negative sign on values that round to zero.
fn fixed(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let text = format!("{:.*}", decimals, value);
    if text.starts_with('-') && text[1..].chars().all(|c| c == '0' || c == '.') {
        text[1..].to_string()
    } else {
        text
    }
}

/// One row per declared parameter, in declaration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryTable {
    pub rows: Vec<SummaryRow>,
    /// Column labels for the HDI bounds, e.g. `hdi_3%` / `hdi_97%`.
    pub hdi_labels: (String, String),
    pub round_to: usize,
}

impl SummaryTable {
    pub fn header(&self) -> [String; 9] {
        [
            "mean".to_string(),
            "sd".to_string(),
            self.hdi_labels.0.clone(),
            self.hdi_labels.1.clone(),
            "mcse_mean".to_string(),
            "mcse_sd".to_string(),
            "ess_bulk".to_string(),
            "ess_tail".to_string(),
            "r_hat".to_string(),
        ]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn row(&self, name: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Largest R-hat across parameters, ignoring undefined values.
    pub fn max_rhat(&self) -> Option<f64> {
        self.rows
            .iter()
            .map(|r| r.r_hat)
            .filter(|r| !r.is_nan())
            .reduce(f64::max)
    }

    /// Comma-separated table; the name column has an empty header cell.
    pub fn to_csv_string(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        self.write_records(&mut writer)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::CsvWrite(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| Error::CsvWrite(e.to_string()))
    }

    /// Write the table to `path`, replacing any existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut writer = csv::Writer::from_path(path)
            .map_err(|e| Error::CsvWrite(format!("{}: {}", path.display(), e)))?;
        self.write_records(&mut writer)?;
        writer.flush()?;
        Ok(())
    }

    fn write_records<W: std::io::Write>(&self, writer: &mut csv::Writer<W>) -> Result<()> {
        let csv_err = |e: csv::Error| Error::CsvWrite(e.to_string());
        let mut header = vec![String::new()];
        header.extend(self.header());
        writer.write_record(&header).map_err(csv_err)?;
        for row in &self.rows {
            let mut record = vec![row.name.clone()];
            record.extend(row.cells(self.round_to));
            writer.write_record(&record).map_err(csv_err)?;
        }
        Ok(())
    }
}

impl fmt::Display for SummaryTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let header = self.header();
        let body: Vec<(String, [String; 9])> = self
            .rows
            .iter()
            .map(|r| (r.name.clone(), r.cells(self.round_to)))
            .collect();

        let name_width = body.iter().map(|(n, _)| n.len()).max().unwrap_or(0);
        let mut widths: Vec<usize> = header.iter().map(|h| h.len()).collect();
        for (_, cells) in &body {
            for (w, c) in widths.iter_mut().zip(cells) {
                *w = (*w).max(c.len());
            }
        }

        write!(f, "{:name_width$}", "")?;
        for (h, w) in header.iter().zip(&widths) {
            write!(f, "  {:>w$}", h, w = *w)?;
        }
        writeln!(f)?;
        for (name, cells) in &body {
            write!(f, "{:<name_width$}", name)?;
            for (c, w) in cells.iter().zip(&widths) {
                write!(f, "  {:>w$}", c, w = *w)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Summarize every posterior parameter.
pub fn summarize(idata: &InferenceData, config: &SummaryConfig) -> Result<SummaryTable> {
    let posterior = idata.posterior()?;
    let rows = posterior
        .param_names
        .iter()
        .enumerate()
        .map(|(i, name)| SummaryRow::from_chains(name, &posterior.chains_of(i), config.hdi_prob))
        .collect();
    Ok(SummaryTable {
        rows,
        hdi_labels: config.hdi_labels(),
        round_to: config.round_to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inference::PosteriorGroup;

    fn idata(n_draws: usize) -> InferenceData {
        let names = ["mu_0", "p_0", "author_mu"];
        let draws = (0..2)
            .map(|c| {
                (0..n_draws)
                    .map(|d| {
                        let x = ((d * 37 + c * 11) % 53) as f64 / 53.0;
                        vec![2.5 + x, x - 0.5, -x]
                    })
                    .collect()
            })
            .collect();
        let posterior = PosteriorGroup {
            param_names: names.iter().map(|s| s.to_string()).collect(),
            draws,
            stats: Vec::new(),
            tuning: Vec::new(),
        };
        InferenceData::new(vec![0, 1], 5, 0).with_posterior(posterior)
    }

    #[test]
    fn one_row_per_parameter_regardless_of_draws() {
        let config = SummaryConfig::default();
        for n in [1, 5, 100] {
            let table = summarize(&idata(n), &config).unwrap();
            assert_eq!(table.len(), 3);
            assert_eq!(table.rows[0].name, "mu_0");
        }
    }

    #[test]
    fn statistics_are_sensible() {
        let table = summarize(&idata(200), &SummaryConfig::default()).unwrap();
        let row = table.row("mu_0").unwrap();
        assert!(row.mean > 2.5 && row.mean < 3.5);
        assert!(row.hdi_lower < row.mean && row.mean < row.hdi_upper);
        assert!(row.sd > 0.0);
        assert!(row.ess_bulk > 0.0);
        assert!(row.mcse_mean > 0.0);
    }

    #[test]
    fn max_rhat_skips_undefined_values() {
        let mut table = summarize(&idata(50), &SummaryConfig::default()).unwrap();
        table.rows[0].r_hat = 1.3;
        table.rows[1].r_hat = f64::NAN;
        table.rows[2].r_hat = 1.1;
        assert_eq!(table.max_rhat(), Some(1.3));

        let single = summarize(&idata(1), &SummaryConfig::default()).unwrap();
        assert!(single.rows.iter().all(|r| r.r_hat.is_nan()));
        assert_eq!(single.max_rhat(), None);
    }

    #[test]
    fn csv_has_blank_first_header_cell() {
        let table = summarize(&idata(50), &SummaryConfig::default()).unwrap();
        let csv = table.to_csv_string().unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            ",mean,sd,hdi_3%,hdi_97%,mcse_mean,mcse_sd,ess_bulk,ess_tail,r_hat"
        );
        let first = lines.next().unwrap();
        assert!(first.starts_with("mu_0,"));
        let cells: Vec<&str> = first.split(',').collect();
        assert_eq!(cells.len(), 10);
        // 3 decimals, integer ESS, 2-decimal R-hat.
        assert_eq!(cells[1].split('.').nth(1).map(str::len), Some(3));
        assert!(!cells[7].contains('.'));
        assert_eq!(cells[9].split('.').nth(1).map(str::len), Some(2));
        assert_eq!(csv.lines().count(), 4);
    }

    #[test]
    fn write_csv_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        std::fs::write(&path, "stale").unwrap();
        let table = summarize(&idata(20), &SummaryConfig::default()).unwrap();
        table.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with(",mean,"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn display_aligns_columns() {
        let table = summarize(&idata(50), &SummaryConfig::default()).unwrap();
        let text = table.to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("hdi_97%"));
        assert!(lines.iter().all(|l| l.len() == lines[0].len()));
    }

    #[test]
    fn negative_zero_is_not_printed() {
        assert_eq!(fixed(-0.0001, 3), "0.000");
        assert_eq!(fixed(-0.5, 1), "-0.5");
        assert_eq!(fixed(f64::NAN, 3), "NaN");
        assert_eq!(fixed(1234.6, 0), "1235");
    }

    #[test]
    fn requires_posterior() {
        let empty = InferenceData::new(vec![0], 5, 0);
        assert!(matches!(
            summarize(&empty, &SummaryConfig::default()),
            Err(Error::PosteriorMissing)
        ));
    }
}
