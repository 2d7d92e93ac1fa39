//! Raster figures: effect forest plots and the posterior-predictive check.

pub mod forest;
pub mod layout;
pub mod ppc;

use std::path::PathBuf;

use gb_common::{Error, Result};
use gb_config::{OutputConfig, PlotConfig, SummaryConfig};
use plotters::style::RGBColor;
use tracing::info;

use crate::inference::InferenceData;
use crate::logging::event_names;

pub use forest::{filter_params, forest_rows, render_forest, ForestRow, MU_FILTER, P_FILTER};
pub use layout::Layout;
pub use ppc::{ppc_curves, render_ppc, PpcCurves};

/// Per-chain colors, cycled.
pub(crate) const CHAIN_COLORS: [RGBColor; 4] = [
    RGBColor(31, 119, 180),
    RGBColor(255, 127, 14),
    RGBColor(44, 160, 44),
    RGBColor(214, 39, 40),
];

pub(crate) fn plot_error<E: std::fmt::Display>(figure: &str) -> impl Fn(E) -> Error + '_ {
    move |e| Error::Plot {
        figure: figure.to_string(),
        message: e.to_string(),
    }
}

/// Render all three figures in order; returns the written paths.
///
/// The output directory must already exist. A failure leaves earlier figures in place.
pub fn render_all(
    idata: &InferenceData,
    output: &OutputConfig,
    plot: &PlotConfig,
    summary: &SummaryConfig,
    seed: u64,
) -> Result<Vec<PathBuf>> {
    let posterior = idata.posterior()?;
    let mut written = Vec::with_capacity(3);

    for (pattern, path) in [
        (P_FILTER, output.p_forest_path()),
        (MU_FILTER, output.mu_forest_path()),
    ] {
        let rows = forest_rows(posterior, pattern, summary.hdi_prob)?;
        render_forest(&rows, &path, plot, summary.hdi_prob)?;
        info!(
            target: event_names::PLOT_WRITTEN,
            path = %path.display(),
            rows = rows.len() as u64,
            "figure written"
        );
        written.push(path);
    }

    let path = output.ppc_path();
    let curves = ppc_curves(idata, plot.ppc_draws, seed)?;
    render_ppc(&curves, &path, plot)?;
    info!(
        target: event_names::PLOT_WRITTEN,
        path = %path.display(),
        draws = curves.draws.len() as u64,
        "figure written"
    );
    written.push(path);

    Ok(written)
}
