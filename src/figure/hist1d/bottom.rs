use std::sync::Arc;

use super::Hist1D;
use crate::error::HepError;
use crate::histoer::Histogram;
use crate::naming::NameCounter;
use crate::plot_opt::BottomType;
use crate::process::{Process, ProcessType};
use crate::render::colors::Rgba;

/// Derived histograms drawn in the lower pad.
#[derive(Debug, Clone)]
pub struct BottomPanel {
    /// Transformed histograms with the process they came from.
    pub plots: Vec<(Histogram, Arc<Process>)>,
    /// Transformed copy of the first entry, drawn as an error band.
    pub band: Histogram,
    pub band_color: Rgba,
    pub y_range: (f64, f64),
    pub title: String,
    /// Height of the dashed reference line, if any.
    pub reference: Option<f64>,
}

/// Normalized signal over square root of normalized background for a cut at
/// every bin edge. With `upper` the cut keeps everything at or below the bin,
/// otherwise everything at or above it.
pub fn significance_scan(signal: &Histogram, background: &Histogram, upper: bool) -> Histogram {
    let last = signal.nbins() + 1;
    let floor = |x: f64| if x < 1e-10 { 1.0 } else { x };
    let total_b = floor(background.integral(0, last));
    let total_s = floor(signal.integral(0, last));

    let mut out = signal.clone();
    out.enable_sumw2();
    for bin in 0..=last {
        let (first, end) = if upper { (0, bin) } else { (bin, last) };
        let b = background.integral(first, end) / total_b;
        if b < 1e-10 {
            out.set_content(bin, 0.0);
            out.set_error(bin, 0.0);
            continue;
        }
        let sqrt_b = b.sqrt();
        let error = (first..=end)
            .map(|i| signal.error(i).powi(2))
            .sum::<f64>()
            .sqrt();
        out.set_content(bin, signal.integral(first, end) / total_s / sqrt_b);
        out.set_error(bin, error / sqrt_b / total_s);
    }
    out
}

impl Hist1D {
    fn denominator(&self) -> Result<Histogram, HepError> {
        let first = self
            .components
            .backgrounds
            .first()
            .or_else(|| self.components.datas.first())
            .or_else(|| self.components.signals.first())
            .ok_or_else(|| HepError::EmptyBottomPlot(self.xaxis.var.name().to_owned()))?;
        let mut denom = first.scaled.clone();
        denom.zero_errors();
        Ok(denom)
    }

    fn bottom_title(&self) -> String {
        let has_data = !self.components.datas.is_empty();
        match self.this_opt.bottom {
            BottomType::Ratio => {
                let mut num = self.ratio_numerator.clone();
                let mut den = self.ratio_denominator.clone();
                if has_data {
                    if num.is_empty() {
                        num = "Data".to_owned();
                    }
                    if den.is_empty() {
                        den = "MC".to_owned();
                    }
                } else {
                    if num.is_empty() {
                        num = "MC".to_owned();
                    }
                    if den.is_empty() {
                        den = self
                            .components
                            .backgrounds
                            .first()
                            .map(|b| b.process.name.clone())
                            .unwrap_or_default();
                    }
                }
                format!("#frac{{{num}}}{{{den}}}")
            }
            BottomType::Diff if has_data => "Data-MC".to_owned(),
            BottomType::Sorb if !self.components.signals.is_empty() => {
                "#frac{#varepsilon_{S}}{#sqrt{#varepsilon_{B}}} (lower cut)".to_owned()
            }
            BottomType::SorbCutUpper if !self.components.signals.is_empty() => {
                "#frac{#varepsilon_{S}}{#sqrt{#varepsilon_{B}}} (upper cut)".to_owned()
            }
            _ => String::new(),
        }
    }

    /// Histograms for the lower pad, or `None` when there is no lower pad or
    /// nothing to put in it.
    pub fn bottom_panel(&self, names: &NameCounter) -> Result<Option<BottomPanel>, HepError> {
        let mode = self.this_opt.bottom;
        if mode == BottomType::Off {
            return Ok(None);
        }
        let denom = self.denominator()?;

        let stacked = self.this_opt.backgrounds_stacked();
        let mut entries: Vec<(Histogram, Arc<Process>)> = Vec::new();
        let mut push = |h: &Histogram, process: &Arc<Process>, tag: &str| {
            let mut copy = h.clone();
            copy.name = names.next_name(&format!("bot_plot_{tag}_{}", process.name));
            entries.push((copy, Arc::clone(process)));
        };
        let backgrounds = &self.components.backgrounds;
        if stacked && let Some(first) = backgrounds.first() {
            push(&first.scaled, &first.process, "bkg");
        } else {
            for b in backgrounds {
                push(&b.scaled, &b.process, "bkg");
            }
        }
        for d in &self.components.datas {
            push(&d.scaled, &d.process, "data");
        }
        if !stacked || mode.is_sorb() {
            for s in &self.components.signals {
                push(&s.scaled, &s.process, "sig");
            }
        }
        if entries.is_empty() {
            return Ok(None);
        }

        // the first entry becomes the band and moves behind the others
        entries.rotate_left(1);
        let band_color = backgrounds
            .first()
            .map(|b| b.process.style.color)
            .or_else(|| entries.last().map(|(_, p)| p.style.color))
            .unwrap_or(Rgba::GRAY)
            .with_alpha(0.2);

        for (h, _) in &mut entries {
            match mode {
                BottomType::Ratio => h.divide(&denom),
                BottomType::Diff => h.subtract(&denom),
                BottomType::Sorb => *h = significance_scan(h, &denom, false),
                BottomType::SorbCutUpper => *h = significance_scan(h, &denom, true),
                BottomType::Off => {}
            }
        }

        let mut the_min = f64::INFINITY;
        let mut the_max = f64::NEG_INFINITY;
        for (h, _) in &entries {
            for bin in 1..=h.nbins() {
                let hi = h.content(bin) + h.error_up(bin);
                let lo = h.content(bin) - h.error_low(bin).abs();
                if hi.is_finite() && hi > the_max {
                    the_max = hi;
                }
                if lo.is_finite() && lo < the_min {
                    the_min = lo;
                }
            }
        }
        let y_range = match mode {
            BottomType::Ratio => (self.this_opt.ratio_minimum, self.this_opt.ratio_maximum),
            BottomType::Sorb | BottomType::SorbCutUpper => {
                (0.0, if 1.2 * the_max > 1.0 { 1.2 * the_max } else { 1.0 })
            }
            _ if the_min.is_finite() && the_max.is_finite() && the_max > the_min => (the_min, the_max),
            _ => (-1.0, 1.0),
        };
        let reference = match mode {
            BottomType::Ratio => Some(1.0),
            BottomType::Diff | BottomType::Off => Some(0.0),
            BottomType::Sorb | BottomType::SorbCutUpper => None,
        };

        let Some((mut band, _)) = entries.pop() else {
            return Ok(None);
        };
        band.name = names.next_name("bot_plot_band");
        Ok(Some(BottomPanel {
            plots: entries,
            band,
            band_color,
            y_range,
            title: self.bottom_title(),
            reference,
        }))
    }

    /// Kind of the process behind a lower pad entry, for styling.
    pub(super) fn draws_as_points(process: &Process) -> bool {
        process.kind == ProcessType::Data
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{axis, events, filled};
    use super::*;
    use crate::axis::Axis;
    use crate::event::NamedFunc;
    use crate::figure::test_support::process;
    use crate::plot_opt::{PlotOpt, StackType};

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn figure(procs: Vec<Arc<Process>>) -> Hist1D {
        let mut figure = Hist1D::new(axis(), NamedFunc::default(), &procs, Vec::new());
        filled(&mut figure);
        figure
    }

    #[test]
    fn flat_significance_scan() {
        let five_bins = Axis::uniform(5, 0.0, 5.0, NamedFunc::scalar_field("x"), "x").unwrap();
        let procs = vec![
            process("bkg", ProcessType::Background, events(&[4, 4, 4, 4, 4])),
            process("sig", ProcessType::Signal, events(&[1, 1, 1, 1, 1])),
        ];
        let mut fig = Hist1D::new(five_bins, NamedFunc::default(), &procs, Vec::new());
        filled(&mut fig);
        let opt = PlotOpt::default().bottom(BottomType::Sorb);
        fig.refresh(1.0, &opt, &NameCounter::new());
        let panel = fig.bottom_panel(&NameCounter::new()).unwrap().unwrap();
        assert_eq!(panel.plots.len(), 1);
        let sorb = &panel.plots[0].0;
        assert!(close(sorb.content(0), 1.0));
        assert!(close(sorb.content(1), 1.0));
        assert!((sorb.content(5) - 0.447_213_595).abs() < 1e-6);
        // the first bin carries the largest error bar, sqrt(5) / 5
        let top = 1.2 * (1.0 + 5f64.sqrt() / 5.0);
        assert_eq!(panel.y_range.0, 0.0);
        assert!((panel.y_range.1 - top).abs() < 1e-9);
        assert_eq!(panel.reference, None);
    }

    #[test]
    fn upper_cut_scan_mirrors_lower() {
        let mut s = Histogram::new("s", &[0.0, 1.0, 2.0, 3.0]);
        let mut b = Histogram::new("b", &[0.0, 1.0, 2.0, 3.0]);
        for x in [0.5, 1.5, 2.5] {
            s.fill(x, 1.0);
            b.fill(x, 4.0);
        }
        let upper = significance_scan(&s, &b, true);
        // keeping bins 0..=1: S = 1/3, B = 4/12
        assert!((upper.content(1) - (1.0 / 3.0) / (1.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!(close(upper.content(4), 1.0));
        // nothing below the underflow
        assert_eq!(upper.content(0), 0.0);
    }

    #[test]
    fn ratio_to_total_background() {
        let fig_procs = vec![
            process("data", ProcessType::Data, events(&[4, 0, 6])),
            process("a", ProcessType::Background, events(&[1, 0, 2])),
            process("b", ProcessType::Background, events(&[1, 0, 1])),
        ];
        let mut fig = figure(fig_procs);
        let opt = PlotOpt::default().bottom(BottomType::Ratio);
        fig.refresh(1.0, &opt, &NameCounter::new());
        let panel = fig.bottom_panel(&NameCounter::new()).unwrap().unwrap();
        assert_eq!(panel.plots.len(), 1);
        let (ratio, process) = &panel.plots[0];
        assert_eq!(process.name, "data");
        assert!(close(ratio.content(1), 2.0));
        assert!(ratio.content(2).is_nan());
        assert!(close(ratio.content(3), 2.0));
        // band is the background over itself
        assert!(close(panel.band.content(1), 1.0));
        assert_eq!(panel.title, "#frac{Data}{MC}");
        assert_eq!(panel.y_range, (0.1, 1.9));
        assert_eq!(panel.reference, Some(1.0));
    }

    #[test]
    fn unstacked_diff_lists_every_background() {
        let fig_procs = vec![
            process("a", ProcessType::Background, events(&[2, 2, 2])),
            process("b", ProcessType::Background, events(&[1, 3, 1])),
            process("s", ProcessType::Signal, events(&[0, 1, 0])),
        ];
        let mut fig = figure(fig_procs);
        let opt = PlotOpt::default()
            .bottom(BottomType::Diff)
            .stack(StackType::LumiShapes);
        fig.refresh(1.0, &opt, &NameCounter::new());
        let panel = fig.bottom_panel(&NameCounter::new()).unwrap().unwrap();
        let names: Vec<&str> = panel.plots.iter().map(|(_, p)| p.name.as_str()).collect();
        assert_eq!(names, vec!["b", "s"]);
        assert!(close(panel.plots[0].0.content(2), 1.0));
        assert!(close(panel.band.content(2), 0.0));
        assert_eq!(panel.title, "");
    }

    #[test]
    fn bottom_panel_needs_components() {
        let mut fig = figure(Vec::new());
        let opt = PlotOpt::default().bottom(BottomType::Ratio);
        fig.refresh(1.0, &opt, &NameCounter::new());
        assert!(matches!(
            fig.bottom_panel(&NameCounter::new()),
            Err(HepError::EmptyBottomPlot(_))
        ));
        let opt = PlotOpt::default();
        fig.refresh(1.0, &opt, &NameCounter::new());
        assert!(fig.bottom_panel(&NameCounter::new()).unwrap().is_none());
    }
}
