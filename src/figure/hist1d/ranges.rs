use super::Hist1D;
use crate::naming::fixed_digits;
use crate::plot_opt::{StackType, YAxisType};
use crate::render::colors::Rgba;
use crate::render::scene::{Drawable, LineStyle};

impl Hist1D {
    pub(super) fn n_legend_entries(&self) -> usize {
        self.components.len() + usize::from(self.this_opt.display_lumi_entry())
    }

    /// Highest drawn point below `max_bound` over every component.
    pub fn max_draw(&self, max_bound: f64) -> f64 {
        let show_bkg_error = self.this_opt.show_background_error;
        let backgrounds = self
            .components
            .backgrounds
            .iter()
            .map(|c| c.scaled.max_content(max_bound, show_bkg_error, false));
        let signals = self
            .components
            .signals
            .iter()
            .map(|c| c.scaled.max_content(max_bound, false, false));
        let datas = self
            .components
            .datas
            .iter()
            .map(|c| c.scaled.max_content(max_bound, true, false));
        backgrounds
            .chain(signals)
            .chain(datas)
            .filter(|&m| m < max_bound)
            .fold(f64::NEG_INFINITY, f64::max)
    }

    /// Lowest drawn point above `min_bound` over every component.
    pub fn min_draw(&self, min_bound: f64) -> f64 {
        let show_bkg_error = self.this_opt.show_background_error;
        let backgrounds = self
            .components
            .backgrounds
            .iter()
            .map(|c| c.scaled.min_content(min_bound, show_bkg_error, false));
        let signals = self
            .components
            .signals
            .iter()
            .map(|c| c.scaled.min_content(min_bound, false, false));
        let datas = self
            .components
            .datas
            .iter()
            .map(|c| c.scaled.min_content(min_bound, true, false));
        backgrounds
            .chain(signals)
            .chain(datas)
            .filter(|&m| m > min_bound)
            .fold(f64::INFINITY, f64::min)
    }

    fn log_floor(&self, the_min: f64) -> f64 {
        if the_min > self.this_opt.log_minimum {
            the_min
        } else {
            self.this_opt.log_minimum
        }
    }

    /// Vertical range of the top pad, grown to leave room for the legend.
    pub fn y_range(&self) -> (f64, f64) {
        let ratio = self.this_opt.legend_ratio(self.n_legend_entries());
        let zoom = if self.yaxis_zoom > 0.0 { self.yaxis_zoom } else { 1.0 };
        let the_max = self.max_draw(f64::INFINITY) / zoom;

        match self.this_opt.y_axis {
            YAxisType::Linear => {
                let the_min = self.min_draw(f64::NEG_INFINITY);
                let bottom = if the_min.is_finite() && the_min < 0.0 { the_min } else { 0.0 };
                if !the_max.is_finite() || the_max <= bottom {
                    return (bottom, bottom + 1.0);
                }
                (bottom, bottom + ratio * (the_max - bottom))
            }
            YAxisType::Log => {
                let mut bottom = self.log_floor(self.min_draw(0.0));
                if !bottom.is_finite() || bottom <= 0.0 {
                    // nothing positive to anchor on
                    bottom = if the_max.is_finite() && the_max > 0.0 { 1e-3 * the_max } else { 0.1 };
                }
                if !the_max.is_finite() || the_max <= bottom {
                    return (bottom, bottom * 10.0);
                }
                let top = (bottom.ln() + ratio * (the_max.ln() - bottom.ln())).exp();
                (bottom, top)
            }
        }
    }

    pub fn y_axis_title(&self) -> String {
        let width = fixed_digits(self.xaxis.avg_bin_width(), 2);
        let per_bin = if self.xaxis.units.is_empty() {
            width
        } else {
            format!("{width} {}", self.xaxis.units)
        };
        match self.this_opt.stack {
            StackType::Shapes => format!("% entries/({per_bin})"),
            _ => format!("Events/({per_bin})"),
        }
    }

    /// Offset of the y title so tick labels never overlap it.
    pub fn y_title_offset(&self, top: f64) -> f64 {
        if !self.this_opt.auto_y_axis {
            return self.this_opt.y_title_offset;
        }
        if self.this_opt.y_axis == YAxisType::Log {
            return 1.5;
        }
        let digits = if top > 0.0 && top.is_finite() {
            ((top.log10().floor() - 1.0).abs() + 2.0) as i32
        } else {
            2
        };
        0.6 + 0.25 * f64::from(digits.clamp(2, 6))
    }

    /// Dashed lines at the soft cuts and dash-dotted lines at the hard cuts,
    /// running from `y_min` to `y_max`.
    pub fn cut_lines(&self, y_min: f64, y_max: f64) -> Vec<Drawable> {
        let soft = self.xaxis.cut_vals.iter().map(|&x| (x, LineStyle::Dashed));
        let hard = self.xaxis.hard_cut_vals.iter().map(|&x| (x, LineStyle::DashDot));
        soft.chain(hard)
            .map(|(x, style)| Drawable::Line {
                x1: x,
                y1: y_min,
                x2: x,
                y2: y_max,
                color: Rgba::BLACK,
                width: 3.0,
                style,
            })
            .collect()
    }

    /// Uncertainty band of the total (first) background.
    pub fn background_error(&self) -> Option<Drawable> {
        let first = self.components.backgrounds.first()?;
        let h = &first.scaled;
        let n = h.nbins();
        Some(Drawable::Band {
            name: format!("{}_error", h.name),
            edges: h.edges().to_vec(),
            low: (1..=n).map(|b| h.content(b) - h.error_low(b)).collect(),
            high: (1..=n).map(|b| h.content(b) + h.error_up(b)).collect(),
            color: first.process.style.color.with_alpha(0.2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{axis, events, filled};
    use super::*;
    use crate::event::NamedFunc;
    use crate::figure::test_support::process;
    use crate::naming::NameCounter;
    use crate::plot_opt::PlotOpt;
    use crate::process::ProcessType;

    fn figure() -> Hist1D {
        let procs = vec![
            process("data", ProcessType::Data, events(&[9, 16, 4])),
            process("a", ProcessType::Background, events(&[10, 12, 3])),
        ];
        let mut figure = Hist1D::new(axis(), NamedFunc::default(), &procs, Vec::new());
        filled(&mut figure);
        figure
    }

    #[test]
    fn linear_range_starts_at_zero() {
        let mut fig = figure();
        let opt = PlotOpt::default();
        fig.refresh(1.0, &opt, &NameCounter::new());
        let (bottom, top) = fig.y_range();
        assert_eq!(bottom, 0.0);
        // data 16 plus its Poisson upper error sets the maximum
        let the_max = 16.0 + fig.components.datas[0].scaled.error_up(2);
        let ratio = opt.legend_ratio(3);
        assert!((top - ratio * the_max).abs() < 1e-9);
    }

    #[test]
    fn log_range_respects_minimum() {
        let mut fig = figure();
        let opt = PlotOpt {
            y_axis: YAxisType::Log,
            log_minimum: 1.0,
            ..PlotOpt::default()
        };
        fig.refresh(1.0, &opt, &NameCounter::new());
        let (bottom, top) = fig.y_range();
        // the background error bar reaches lowest
        let bkg_min = 3.0 - fig.components.backgrounds[0].scaled.error_low(3);
        assert!(bkg_min > 1.0);
        assert!((bottom - bkg_min).abs() < 1e-9);
        assert!(top > 16.0);
        assert_eq!(fig.y_title_offset(top), 1.5);
    }

    #[test]
    fn zoom_divides_maximum() {
        let mut fig = figure().yaxis_zoom(2.0);
        fig.refresh(1.0, &PlotOpt::default(), &NameCounter::new());
        let (_, zoomed) = fig.y_range();
        fig.yaxis_zoom = 1.0;
        let (_, full) = fig.y_range();
        assert!((full - 2.0 * zoomed).abs() < 1e-9);
    }

    #[test]
    fn titles_and_offsets() {
        let mut fig = figure();
        fig.xaxis = fig.xaxis.clone().units("GeV");
        fig.refresh(1.0, &PlotOpt::default(), &NameCounter::new());
        assert_eq!(fig.y_axis_title(), "Events/(1.0 GeV)");
        assert!((fig.y_title_offset(40.0) - 1.1).abs() < 1e-12);
        assert!((fig.y_title_offset(1e9) - 2.1).abs() < 1e-12);
    }

    #[test]
    fn cut_lines_use_dash_styles() {
        let mut fig = figure();
        fig.xaxis = fig.xaxis.clone().cut_vals(vec![1.0]).hard_cut_vals(vec![2.0]);
        let lines = fig.cut_lines(0.0, 10.0);
        assert_eq!(lines.len(), 2);
        let Drawable::Line { style, x1, .. } = &lines[1] else {
            panic!("expected a line");
        };
        assert_eq!(*style, LineStyle::DashDot);
        assert_eq!(*x1, 2.0);
    }
}
