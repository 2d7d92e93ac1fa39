//! Figure rendering: the three PNGs land under their fixed names, at the
//! configured resolution.

use std::fs;
use std::path::Path;

use gb_config::{OutputConfig, PlotConfig, RunConfig, SamplingConfig, SummaryConfig, PARAMETER_NAMES};
use gb_core::inference::{InferenceData, PosteriorGroup, PredictiveGroup};
use gb_core::logging::LogContext;
use gb_core::plot::render_all;
use gb_core::run_pipeline;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Width and height from the IHDR chunk, which always comes first.
fn png_dimensions(path: &Path) -> (u32, u32) {
    let bytes = fs::read(path).expect("read png");
    assert!(bytes.len() > 24, "{} is truncated", path.display());
    assert_eq!(bytes[..8], PNG_SIGNATURE, "{} is not a PNG", path.display());
    assert_eq!(&bytes[12..16], b"IHDR");
    let word = |at: usize| u32::from_be_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]);
    (word(16), word(20))
}

fn synthetic_idata() -> InferenceData {
    let n_draws = 60;
    let draws = (0..2)
        .map(|c| {
            (0..n_draws)
                .map(|d| {
                    let wobble = ((d * 17 + c * 5) % 23) as f64 / 23.0 - 0.5;
                    PARAMETER_NAMES
                        .iter()
                        .enumerate()
                        .map(|(i, _)| if i == 0 { 2.5 + 0.2 * wobble } else { 0.1 * wobble * (i as f64) })
                        .collect()
                })
                .collect()
        })
        .collect();
    let posterior = PosteriorGroup {
        param_names: PARAMETER_NAMES.iter().map(|s| s.to_string()).collect(),
        draws,
        stats: Vec::new(),
        tuning: Vec::new(),
    };

    let observed: Vec<u64> = (0..40).map(|i| (i * 7 % 6) as u64).collect();
    let predictive = PredictiveGroup {
        draws: (0..2)
            .map(|c| {
                (0..n_draws)
                    .map(|d| {
                        (0..observed.len())
                            .map(|i| ((i + d + c) % 6) as u64)
                            .collect()
                    })
                    .collect()
            })
            .collect(),
    };

    let mut idata = InferenceData::new(observed, 5, 3).with_posterior(posterior);
    idata.attach_predictive(predictive).expect("attach predictive");
    idata
}

fn output_in(dir: &Path) -> OutputConfig {
    OutputConfig {
        results_dir: dir.join("results"),
        figures_dir: dir.join("figures"),
        ..OutputConfig::default()
    }
}

#[test]
fn renders_three_figures_at_configured_resolution() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = output_in(dir.path());
    fs::create_dir_all(&output.figures_dir).expect("figures dir");
    let plot = PlotConfig::default();

    let written = render_all(&synthetic_idata(), &output, &plot, &SummaryConfig::default(), 3)
        .expect("render");

    let names: Vec<String> = written
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        ["p_effects_forest.png", "mu_effects_forest.png", "posterior_predictive.png"]
    );

    let expected_width = plot.in_to_px(plot.width_in);
    assert_eq!(expected_width, 1920);
    for path in &written {
        assert!(path.starts_with(&output.figures_dir));
        let (width, height) = png_dimensions(path);
        assert_eq!(width, expected_width, "{}", path.display());
        assert!(height > 0);
    }

    // Forests grow with rows; both have three effects over two chains.
    assert_eq!(png_dimensions(&written[0]), png_dimensions(&written[1]));
    // The predictive check keeps a 4:3 aspect.
    assert_eq!(png_dimensions(&written[2]).1, plot.in_to_px(plot.width_in * 0.75));
}

#[test]
fn lower_dpi_shrinks_every_figure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = output_in(dir.path());
    fs::create_dir_all(&output.figures_dir).expect("figures dir");
    let plot = PlotConfig {
        dpi: 100,
        ..PlotConfig::default()
    };

    let written = render_all(&synthetic_idata(), &output, &plot, &SummaryConfig::default(), 3)
        .expect("render");
    for path in &written {
        assert_eq!(png_dimensions(path).0, 640);
    }
}

#[test]
fn render_needs_a_posterior() {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = output_in(dir.path());
    let idata = InferenceData::new(vec![0, 1], 5, 0);
    assert!(render_all(&idata, &output, &PlotConfig::default(), &SummaryConfig::default(), 0).is_err());
    assert!(!output.figures_dir.exists());
}

#[test]
fn full_run_creates_output_directories_and_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let data = dir.path().join("reviews.tsv");
    let genders = ["male", "female"];
    let mut table = String::from("rev_gender_updated\tauthor_gender\tgrades\n");
    for i in 0..120usize {
        let grade = 1 + (i * 7 + i / 3) % 6;
        table.push_str(&format!("{}\t{}\t{}\n", genders[i % 2], genders[(i / 2) % 2], grade));
    }
    fs::write(&data, table).expect("write table");

    let mut config = RunConfig::default();
    config.data_path = data;
    config.output = output_in(dir.path());
    config.sampling = SamplingConfig {
        chains: 2,
        tune: 300,
        draws: 200,
        seed: Some(21),
        ..SamplingConfig::default()
    };
    config.plot.dpi = 100;

    let mut out = Vec::new();
    let outcome = run_pipeline(&config, &LogContext::new("run-figures", "host-figures"), &mut out)
        .expect("pipeline");

    assert_eq!(outcome.seed, 21);
    assert_eq!(outcome.summary.len(), 8);
    assert_eq!(outcome.outputs.len(), 5);
    for path in &outcome.outputs {
        assert!(path.is_file(), "{} missing", path.display());
    }
    assert!(config.output.summary_path().is_file());
    assert!(config.output.snapshot_path().is_file());
    assert_eq!(png_dimensions(&config.output.ppc_path()).0, 640);

    let text = String::from_utf8(out).expect("utf8");
    assert!(text.starts_with("Preprocessing data...\n"));
    assert!(text.contains("Parameter Summary"));
    assert!(text.trim_end().ends_with("DONE"));
}
