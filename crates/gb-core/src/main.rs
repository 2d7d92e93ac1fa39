//! Grade-bias regression CLI
//!
//! Runs the fixed analysis end to end. With no flags every setting takes its
//! default; `--config` loads a JSON run configuration and the remaining
//! flags override individual values on top of it.

use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;

use clap::Parser;
use gb_common::{format_error_human, Error, Result};
use gb_config::{validate_run_config, RunConfig};
use gb_core::exit_codes::ExitCode;
use gb_core::logging::{
    event_names, generate_run_id, get_host_id, init_logging, LogConfig, LogContext, LogFormat,
    LogLevel, Stage,
};
use gb_core::{log_event, run_pipeline};

/// Hierarchical Beta-Binomial regression of grades on reviewer and author gender
#[derive(Parser, Debug)]
#[command(name = "gb-core")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON run configuration; missing keys keep their defaults
    #[arg(long, env = "GB_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Tab-separated review table
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Master seed for every random stream
    #[arg(long)]
    seed: Option<u64>,

    /// Independent posterior chains
    #[arg(long)]
    chains: Option<usize>,

    /// Warm-up iterations per chain
    #[arg(long)]
    tune: Option<usize>,

    /// Retained draws per chain
    #[arg(long)]
    draws: Option<usize>,

    /// Directory for the summary table and config snapshot
    #[arg(long, value_name = "DIR")]
    results_dir: Option<PathBuf>,

    /// Directory for figures
    #[arg(long, value_name = "DIR")]
    figures_dir: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output and all logs below error
    #[arg(short, long)]
    quiet: bool,

    /// Log line format on stderr
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    /// Disable colored error output
    #[arg(long)]
    no_color: bool,
}

impl Cli {
    fn run_config(&self) -> Result<RunConfig> {
        let mut config = match &self.config {
            Some(path) => RunConfig::from_file(path).map_err(|e| Error::Config(e.to_string()))?,
            None => RunConfig::default(),
        };

        if let Some(data) = &self.data {
            config.data_path = data.clone();
        }
        if let Some(seed) = self.seed {
            config.sampling.seed = Some(seed);
        }
        if let Some(chains) = self.chains {
            config.sampling.chains = chains;
        }
        if let Some(tune) = self.tune {
            config.sampling.tune = tune;
        }
        if let Some(draws) = self.draws {
            config.sampling.draws = draws;
        }
        if let Some(dir) = &self.results_dir {
            config.output.results_dir = dir.clone();
        }
        if let Some(dir) = &self.figures_dir {
            config.output.figures_dir = dir.clone();
        }

        validate_run_config(&config).map_err(|e| Error::Config(e.to_string()))?;
        Ok(config)
    }
}

fn run(cli: &Cli, ctx: &LogContext) -> Result<()> {
    let config = cli.run_config()?;
    let source = cli
        .config
        .as_ref()
        .map_or_else(|| "defaults".to_string(), |p| p.display().to_string());
    log_event!(
        ctx,
        DEBUG,
        event_names::CONFIG_LOADED,
        Stage::Init,
        "configuration resolved",
        source = source.as_str()
    );

    let mut out: Box<dyn Write> = if cli.quiet {
        Box::new(io::sink())
    } else {
        Box::new(io::stdout().lock())
    };
    run_pipeline(&config, ctx, &mut out)?;
    out.flush()?;
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.verbose, cli.quiet),
        cli.log_format,
    );
    init_logging(&log_config);
    let ctx = LogContext::new(generate_run_id(), get_host_id());

    let exit_code = match run(&cli, &ctx) {
        Ok(()) => ExitCode::Success,
        Err(err) => {
            let code = ExitCode::for_error(&err);
            log_event!(
                ctx,
                ERROR,
                event_names::RUN_FAILED,
                Stage::Init,
                "run failed",
                error_code = err.code(),
                exit_code = code.as_i32()
            );
            let use_color = !cli.no_color && io::stderr().is_terminal();
            eprintln!("{}", format_error_human(&err, use_color));
            code
        }
    };

    std::process::exit(exit_code.as_i32());
}
