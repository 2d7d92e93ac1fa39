//! Figure geometry, computed before anything is drawn.
//!
//! Text extents are estimated from the character count and font size
//! (sans-serif glyphs average a little over half an em), so gutters and
//! margins are known up front and labels never overlap the data area.

use gb_config::PlotConfig;

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.6;
/// Vertical space of one text line as a multiple of the font size.
const LINE_HEIGHT: f64 = 1.3;
/// Gap plotters leaves between a corner legend and the data-area edge.
const LEGEND_OFFSET: u32 = 5;

/// Estimated rendered width of `text` in pixels.
pub fn text_width_px(text: &str, font_px: f64) -> f64 {
    text.chars().count() as f64 * GLYPH_ADVANCE * font_px
}

/// Pixel geometry of one figure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub font_px: f64,
    /// Blank border on every side.
    pub margin: u32,
    /// Space left of the data area for row or tick labels.
    pub label_gutter: u32,
    /// Space below the data area for tick labels and the axis title.
    pub x_axis_height: u32,
    /// Space above the data area for the caption.
    pub caption_height: u32,
    /// Height of one forest row; zero for figures without rows.
    pub row_height: u32,
}

impl Layout {
    /// Forest plot with `rows` rows, labelled by `labels`.
    pub fn forest(labels: &[&str], rows: usize, plot: &PlotConfig) -> Self {
        let font_px = plot.pt_to_px(plot.font_pt);
        let line = (LINE_HEIGHT * font_px).ceil() as u32;
        let margin = (0.5 * font_px).ceil() as u32;
        let longest = labels
            .iter()
            .map(|l| text_width_px(l, font_px))
            .fold(0.0, f64::max);
        let label_gutter = (longest + font_px).ceil() as u32;
        let x_axis_height = 2 * line;
        let caption_height = line + margin;
        let row_height = plot.in_to_px(0.25).max(line);
        let height =
            2 * margin + caption_height + x_axis_height + row_height * rows.max(1) as u32;
        Self {
            width: plot.in_to_px(plot.width_in),
            height,
            font_px,
            margin,
            label_gutter,
            x_axis_height,
            caption_height,
            row_height,
        }
    }

    /// Posterior-predictive figure: fixed 4:3 aspect, tick labels of up to
    /// `y_label_chars` characters.
    pub fn ppc(y_label_chars: usize, plot: &PlotConfig) -> Self {
        let font_px = plot.pt_to_px(plot.font_pt);
        let line = (LINE_HEIGHT * font_px).ceil() as u32;
        let margin = (0.5 * font_px).ceil() as u32;
        // Tick labels plus a rotated axis title.
        let label_gutter = (y_label_chars as f64 * GLYPH_ADVANCE * font_px + font_px).ceil()
            as u32
            + line;
        Self {
            width: plot.in_to_px(plot.width_in),
            height: plot.in_to_px(plot.width_in * 0.75),
            font_px,
            margin,
            label_gutter,
            x_axis_height: 2 * line,
            caption_height: margin,
            row_height: 0,
        }
    }

    /// Height of a legend box with `entries` lines, including its offset
    /// from the top of the data area.
    pub fn legend_height(&self, entries: usize) -> u32 {
        let line = (LINE_HEIGHT * self.font_px).ceil() as u32;
        LEGEND_OFFSET + 2 * self.margin + line * entries as u32
    }

    /// Width and height of the data area.
    pub fn plot_area(&self) -> (u32, u32) {
        let w = self
            .width
            .saturating_sub(2 * self.margin + self.label_gutter);
        let h = self
            .height
            .saturating_sub(2 * self.margin + self.caption_height + self.x_axis_height);
        (w, h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plot() -> PlotConfig {
        PlotConfig::default()
    }

    #[test]
    fn width_follows_dpi() {
        let layout = Layout::forest(&["author_p"], 12, &plot());
        assert_eq!(layout.width, (6.4f64 * 300.0).round() as u32);
    }

    #[test]
    fn gutter_fits_longest_label() {
        let labels = ["author_p", "interaction_p"];
        let layout = Layout::forest(&labels, 12, &plot());
        let needed = text_width_px("interaction_p", layout.font_px);
        assert!(layout.label_gutter as f64 > needed);
    }

    #[test]
    fn rows_fit_a_line_of_text() {
        let layout = Layout::forest(&["a"], 12, &plot());
        assert!(layout.row_height as f64 >= layout.font_px * LINE_HEIGHT - 1.0);
        let (_, h) = layout.plot_area();
        assert_eq!(h, layout.row_height * 12);
    }

    #[test]
    fn more_rows_mean_taller_figures() {
        let short = Layout::forest(&["a"], 4, &plot());
        let tall = Layout::forest(&["a"], 16, &plot());
        assert!(tall.height > short.height);
        assert_eq!(short.width, tall.width);
    }

    #[test]
    fn ppc_area_is_positive() {
        let layout = Layout::ppc(5, &plot());
        let (w, h) = layout.plot_area();
        assert!(w > 0 && h > 0);
        assert_eq!(layout.height, (4.8f64 * 300.0).round() as u32);
    }

    #[test]
    fn legend_grows_with_entries() {
        let layout = Layout::ppc(4, &plot());
        let one = layout.legend_height(1);
        let three = layout.legend_height(3);
        assert!(one as f64 > layout.font_px);
        assert!(three > one);
        assert!(three < layout.plot_area().1 / 2);
    }

    #[test]
    fn font_scales_with_dpi() {
        let low = PlotConfig {
            dpi: 100,
            ..plot()
        };
        let a = Layout::forest(&["a"], 1, &low);
        let b = Layout::forest(&["a"], 1, &plot());
        assert!(b.font_px > 2.9 * a.font_px);
    }
}
