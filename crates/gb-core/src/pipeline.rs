//! The fixed analysis, top to bottom: load, model, sample, predict,
//! summarize, plot.
//!
//! Progress text and the summary table go to `out`; logs go to the tracing
//! subscriber. Every stage fails fast.

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use gb_common::{Error, Result};
use gb_config::{ConfigSnapshot, RunConfig, ValidationError};
use tracing::info_span;

use crate::data::load_observations;
use crate::inference::{sample_posterior, sample_posterior_predictive};
use crate::log_event;
use crate::logging::{event_names, LogContext, Stage};
use crate::model::BetaBinomialModel;
use crate::plot::render_all;
use crate::summary::{summarize, SummaryTable};

const SUMMARY_BANNER: &str = "\n-----------------\nParameter Summary\n-----------------\n";

/// What a successful run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Master seed actually used.
    pub seed: u64,
    pub summary: SummaryTable,
    /// Files written, in order.
    pub outputs: Vec<PathBuf>,
}

fn snapshot_error(err: ValidationError) -> Error {
    match err {
        ValidationError::IoError(msg) => Error::Io(std::io::Error::other(msg)),
        other => Error::Config(other.to_string()),
    }
}

/// Run the whole analysis described by `config`.
pub fn run_pipeline<W: Write>(
    config: &RunConfig,
    ctx: &LogContext,
    out: &mut W,
) -> Result<RunOutcome> {
    let run_span = info_span!("run", run_id = %ctx.run_id, host_id = %ctx.host_id);
    let _run = run_span.enter();
    let started = Instant::now();
    let data = config.data_path.display().to_string();
    log_event!(
        ctx,
        INFO,
        event_names::RUN_STARTED,
        Stage::Init,
        "starting run",
        data = data.as_str()
    );

    writeln!(out, "Preprocessing data...")?;
    let model = {
        let _stage = info_span!("stage", stage = %Stage::Load).entered();
        let table = load_observations(&config.data_path)?;
        log_event!(
            ctx,
            INFO,
            event_names::LOAD_FINISHED,
            Stage::Load,
            "table loaded",
            rows = table.len() as u64,
            total_rows = table.total_rows() as u64
        );
        if table.dropped > 0 {
            log_event!(
                ctx,
                WARN,
                event_names::LOAD_ROWS_DROPPED,
                Stage::Load,
                "dropped rows with a missing gender",
                dropped = table.dropped as u64
            );
        }

        let model = BetaBinomialModel::new(&table, &config.model)?;
        log_event!(
            ctx,
            INFO,
            event_names::MODEL_BUILT,
            Stage::Model,
            "model built",
            observations = model.n_obs() as u64,
            cells = model.n_cells() as u64,
            params = model.n_params() as u64
        );
        model
    };

    writeln!(out, "Sampling posterior...")?;
    let mut idata = {
        let _stage = info_span!("stage", stage = %Stage::Sample).entered();
        sample_posterior(&model, &config.sampling)?
    };
    let seed = idata.seed;

    writeln!(out, "Sampling posterior predictive...")?;
    {
        let _stage = info_span!("stage", stage = %Stage::Predict).entered();
        sample_posterior_predictive(&model, &mut idata, seed)?;
    }

    let summary = {
        let _stage = info_span!("stage", stage = %Stage::Summarize).entered();
        summarize(&idata, &config.summary)?
    };
    write!(out, "{SUMMARY_BANNER}")?;
    writeln!(out, "{summary}")?;

    writeln!(out, "Creating output directories...")?;
    let output = &config.output;
    std::fs::create_dir_all(&output.results_dir)?;
    std::fs::create_dir_all(&output.figures_dir)?;

    let mut outputs = Vec::with_capacity(5);
    {
        let _stage = info_span!("stage", stage = %Stage::Summarize).entered();
        let summary_path = output.summary_path();
        summary.write_csv(&summary_path)?;
        let path = summary_path.display().to_string();
        log_event!(
            ctx,
            INFO,
            event_names::SUMMARY_WRITTEN,
            Stage::Summarize,
            "summary table written",
            path = path.as_str(),
            rows = summary.len() as u64,
            max_r_hat = summary.max_rhat().unwrap_or(f64::NAN)
        );
        outputs.push(summary_path);

        let snapshot_path = output.snapshot_path();
        ConfigSnapshot::new(config, seed, Some(ctx.run_id.as_str()))
            .write_to(&snapshot_path)
            .map_err(snapshot_error)?;
        let path = snapshot_path.display().to_string();
        log_event!(
            ctx,
            INFO,
            event_names::CONFIG_SNAPSHOT_WRITTEN,
            Stage::Summarize,
            "config snapshot written",
            path = path.as_str(),
            seed = seed
        );
        outputs.push(snapshot_path);
    }

    writeln!(out, "Producing figures...")?;
    {
        let _stage = info_span!("stage", stage = %Stage::Plot).entered();
        outputs.extend(render_all(
            &idata,
            output,
            &config.plot,
            &config.summary,
            seed,
        )?);
    }

    writeln!(out, "DONE")?;
    log_event!(
        ctx,
        INFO,
        event_names::RUN_FINISHED,
        Stage::Plot,
        "run finished",
        elapsed_ms = started.elapsed().as_millis() as u64,
        outputs = outputs.len() as u64
    );

    Ok(RunOutcome {
        seed,
        summary,
        outputs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_io_failures_stay_io_errors() {
        let err = snapshot_error(ValidationError::IoError("disk full".into()));
        assert!(matches!(err, Error::Io(_)));
        let err = snapshot_error(ValidationError::ParseError("bad".into()));
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn missing_data_file_fails_before_any_output() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = RunConfig::default();
        config.data_path = dir.path().join("absent.tsv");
        config.output.results_dir = dir.path().join("results");
        config.output.figures_dir = dir.path().join("figures");

        let mut out = Vec::new();
        let err = run_pipeline(&config, &LogContext::new("run-test", "host-test"), &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::DataRead(_)));
        assert_eq!(String::from_utf8(out).unwrap(), "Preprocessing data...\n");
        assert!(!config.output.results_dir.exists());
    }
}
