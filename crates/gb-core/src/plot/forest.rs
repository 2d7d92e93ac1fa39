//! Forest plots of effect parameters, one row per (parameter, chain).

use std::path::Path;

use gb_common::{Error, Result};
use gb_config::PlotConfig;
use gb_math::describe::{hdi, quantile_sorted, Interval};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use super::layout::Layout;
use super::{plot_error, CHAIN_COLORS};
use crate::inference::PosteriorGroup;

/// Shape-effect parameters.
pub const P_FILTER: &str = "_p";
/// Mean-effect parameters.
pub const MU_FILTER: &str = "_mu";

/// Indices of parameters whose name contains `pattern`.
pub fn filter_params(names: &[String], pattern: &str) -> Vec<usize> {
    names
        .iter()
        .enumerate()
        .filter(|(_, n)| n.contains(pattern))
        .map(|(i, _)| i)
        .collect()
}

/// Interval summary of one chain of one parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ForestRow {
    pub param: String,
    pub chain: usize,
    pub hdi: Interval,
    /// 25%–75% quantiles.
    pub iqr: Interval,
    pub median: f64,
}

/// Rows for every parameter matching `pattern`, in declaration order.
pub fn forest_rows(
    posterior: &PosteriorGroup,
    pattern: &str,
    hdi_prob: f64,
) -> Result<Vec<ForestRow>> {
    let params = filter_params(&posterior.param_names, pattern);
    if params.is_empty() {
        return Err(Error::Plot {
            figure: format!("forest[{pattern}]"),
            message: format!("no parameter name contains {pattern:?}"),
        });
    }

    let mut rows = Vec::new();
    for &i in &params {
        for (chain, trace) in posterior.chains_of(i).into_iter().enumerate() {
            let mut sorted = trace.clone();
            sorted.sort_by(|a, b| a.total_cmp(b));
            let interval = hdi(&trace, hdi_prob).unwrap_or(Interval {
                lower: sorted[0],
                upper: sorted[sorted.len() - 1],
            });
            rows.push(ForestRow {
                param: posterior.param_names[i].clone(),
                chain,
                hdi: interval,
                iqr: Interval {
                    lower: quantile_sorted(&sorted, 0.25),
                    upper: quantile_sorted(&sorted, 0.75),
                },
                median: quantile_sorted(&sorted, 0.5),
            });
        }
    }
    Ok(rows)
}

/// Data range covering every interval and zero, padded by 5%.
pub fn x_range(rows: &[ForestRow]) -> (f64, f64) {
    let lo = rows.iter().map(|r| r.hdi.lower).fold(0.0, f64::min);
    let hi = rows.iter().map(|r| r.hdi.upper).fold(0.0, f64::max);
    let pad = ((hi - lo) * 0.05).max(1e-3);
    (lo - pad, hi + pad)
}

/// Distinct parameter names in row order.
fn group_labels(rows: &[ForestRow]) -> Vec<&str> {
    let mut labels: Vec<&str> = Vec::new();
    for row in rows {
        if labels.last() != Some(&row.param.as_str()) {
            labels.push(&row.param);
        }
    }
    labels
}

/// Render `rows` to a PNG at `path`.
pub fn render_forest(
    rows: &[ForestRow],
    path: &Path,
    plot: &PlotConfig,
    hdi_prob: f64,
) -> Result<()> {
    let figure = path.display().to_string();
    let err = plot_error(&figure);

    let labels = group_labels(rows);
    let layout = Layout::forest(&labels, rows.len(), plot);
    let font = plot.font_family.as_str();
    let font_px = layout.font_px;

    let root = BitMapBackend::new(path, (layout.width, layout.height)).into_drawing_area();
    root.fill(&WHITE).map_err(&err)?;

    let (x_lo, x_hi) = x_range(rows);
    let n_rows = rows.len() as f64;
    let mut chart = ChartBuilder::on(&root)
        .margin(layout.margin)
        .caption(format!("{:.1}% HDI", hdi_prob * 100.0), (font, font_px))
        .x_label_area_size(layout.x_axis_height)
        .y_label_area_size(layout.label_gutter)
        .build_cartesian_2d(x_lo..x_hi, 0.0..n_rows)
        .map_err(&err)?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .disable_y_axis()
        .x_labels(6)
        .label_style((font, font_px))
        .draw()
        .map_err(&err)?;

    // Row 0 at the top.
    let y_of = |r: usize| n_rows - r as f64 - 0.5;

    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(0.0, 0.0), (0.0, n_rows)],
            BLACK.mix(0.6).stroke_width(1),
        )))
        .map_err(&err)?;

    let thin = (layout.font_px / 10.0).max(1.0) as u32;
    let thick = 3 * thin;
    let marker = (layout.font_px / 4.0).max(2.0) as u32;
    for (r, row) in rows.iter().enumerate() {
        let y = y_of(r);
        let color = CHAIN_COLORS[row.chain % CHAIN_COLORS.len()];
        chart
            .draw_series([
                PathElement::new(
                    vec![(row.hdi.lower, y), (row.hdi.upper, y)],
                    color.stroke_width(thin),
                ),
                PathElement::new(
                    vec![(row.iqr.lower, y), (row.iqr.upper, y)],
                    color.stroke_width(thick),
                ),
            ])
            .map_err(&err)?;
        chart
            .draw_series(std::iter::once(Circle::new(
                (row.median, y),
                marker,
                WHITE.filled(),
            )))
            .map_err(&err)?;
        chart
            .draw_series(std::iter::once(Circle::new(
                (row.median, y),
                marker,
                color.stroke_width(thin),
            )))
            .map_err(&err)?;
    }

    // Parameter labels, centered on each group of chain rows.
    let label_style = TextStyle::from((font, font_px))
        .color(&BLACK)
        .pos(Pos::new(HPos::Right, VPos::Center));
    let mut start = 0;
    for label in &labels {
        let count = rows[start..]
            .iter()
            .take_while(|r| r.param == *label)
            .count();
        let center = n_rows - start as f64 - count as f64 / 2.0;
        let (x_px, y_px) = chart.backend_coord(&(x_lo, center));
        let x_px = x_px - (layout.font_px / 2.0) as i32;
        root.draw(&Text::new(label.to_string(), (x_px, y_px), label_style.clone()))
            .map_err(&err)?;
        start += count;
    }

    root.present().map_err(&err)?;
    Ok(())
}
