//! Posterior-predictive check: observed outcome frequencies against
//! frequencies in simulated data sets.

use std::path::Path;

use gb_common::{Error, Result};
use gb_config::PlotConfig;
use plotters::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::layout::Layout;
use super::plot_error;
use crate::inference::InferenceData;
use crate::model::outcome_frequencies;

const DRAW_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEAN_COLOR: RGBColor = RGBColor(255, 127, 14);
const LEGEND_ENTRIES: usize = 3;

/// Frequency curves over outcomes `0..=n`.
#[derive(Debug, Clone, PartialEq)]
pub struct PpcCurves {
    pub observed: Vec<f64>,
    /// One curve per overlaid predictive draw.
    pub draws: Vec<Vec<f64>>,
    /// Mean over every predictive draw, not just the overlaid ones.
    pub mean: Vec<f64>,
}

impl PpcCurves {
    pub fn n_outcomes(&self) -> usize {
        self.observed.len()
    }

    /// Largest frequency on any curve.
    pub fn y_max(&self) -> f64 {
        self.draws
            .iter()
            .flatten()
            .chain(&self.observed)
            .chain(&self.mean)
            .copied()
            .fold(0.0, f64::max)
    }
}

/// Curves for `n_overlay` predictive draws chosen with `seed`.
pub fn ppc_curves(idata: &InferenceData, n_overlay: usize, seed: u64) -> Result<PpcCurves> {
    let predictive = idata.posterior_predictive().ok_or_else(|| Error::Plot {
        figure: "posterior_predictive".to_string(),
        message: "posterior predictive group has not been sampled".to_string(),
    })?;
    let trials = idata.trials;
    let all: Vec<&Vec<u64>> = predictive.draws.iter().flatten().collect();

    let width = trials as usize + 1;
    let mut mean = vec![0.0; width];
    for draw in &all {
        for (m, f) in mean.iter_mut().zip(outcome_frequencies(draw, trials)) {
            *m += f;
        }
    }
    let total = all.len().max(1) as f64;
    mean.iter_mut().for_each(|m| *m /= total);

    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, all.len(), n_overlay.min(all.len())).into_vec();
    picked.sort_unstable();
    let draws = picked
        .into_iter()
        .map(|i| outcome_frequencies(all[i], trials))
        .collect();

    Ok(PpcCurves {
        observed: outcome_frequencies(&idata.observed, trials),
        draws,
        mean,
    })
}

/// Top of the y axis such that every value up to `data_max` sits below a
/// band of `reserved_px` pixels at the top of an `area_px`-tall data area.
pub fn y_limit(data_max: f64, reserved_px: u32, area_px: u32) -> f64 {
    let reserved = if area_px == 0 {
        0.0
    } else {
        (reserved_px as f64 / area_px as f64).min(0.5)
    };
    (data_max * 1.05 / (1.0 - reserved)).max(1e-3)
}

/// Render the posterior-predictive check to a PNG at `path`.
///
/// The legend sits in the upper-right corner, in headroom kept free of curves.
pub fn render_ppc(curves: &PpcCurves, path: &Path, plot: &PlotConfig) -> Result<()> {
    let figure = path.display().to_string();
    let err = plot_error(&figure);

    let layout = Layout::ppc(4, plot);
    let font = plot.font_family.as_str();
    let font_px = layout.font_px;
    let x_max = curves.n_outcomes().saturating_sub(1) as f64;
    let y_max = y_limit(
        curves.y_max(),
        layout.legend_height(LEGEND_ENTRIES),
        layout.plot_area().1,
    );

    let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(layout.margin)
        .x_label_area_size(layout.x_axis_height)
        .y_label_area_size(layout.label_gutter)
        .build_cartesian_2d(-0.25..x_max + 0.25, 0.0..y_max)
        .map_err(&err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(curves.n_outcomes())
        .x_label_formatter(&|x| format!("{:.0}", x))
        .y_labels(5)
        .y_label_formatter(&|y| format!("{:.2}", y))
        .x_desc("outcome")
        .label_style((font, font_px))
        .axis_desc_style((font, font_px))
        .draw()
        .map_err(&err)?;

    let thin = (font_px / 12.0).max(1.0) as u32;
    let swatch = (2.0 * font_px) as i32;
    let points = |freq: &[f64]| -> Vec<(f64, f64)> {
        freq.iter().enumerate().map(|(k, f)| (k as f64, *f)).collect()
    };

    for (i, draw) in curves.draws.iter().enumerate() {
        let series = chart
            .draw_series(LineSeries::new(points(draw), DRAW_COLOR.mix(0.2).stroke_width(thin)))
            .map_err(&err)?;
        if i == 0 {
            series
                .label("Posterior predictive")
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + swatch, y)], DRAW_COLOR.stroke_width(thin))
                });
        }
    }

    chart
        .draw_series(LineSeries::new(
            points(&curves.observed),
            BLACK.stroke_width(2 * thin),
        ))
        .map_err(&err)?
        .label("Observed")
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + swatch, y)], BLACK.stroke_width(2 * thin)));

    chart
        .draw_series(DashedLineSeries::new(
            points(&curves.mean),
            (12 * thin) as i32,
            (6 * thin) as i32,
            MEAN_COLOR.stroke_width(2 * thin),
        ))
        .map_err(&err)?
        .label("Posterior predictive mean")
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + swatch, y)], MEAN_COLOR.stroke_width(2 * thin))
        });

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .margin(layout.margin)
        .legend_area_size(swatch as u32 + layout.margin)
        .label_font((font, font_px))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(&err)?;

    root.present().map_err(&err)?;
    Ok(())
}
