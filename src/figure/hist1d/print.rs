use std::path::PathBuf;

use super::{BottomPanel, Hist1D};
use crate::error::HepError;
use crate::figure::Figure;
use crate::histoer::Histogram;
use crate::naming::{NameCounter, fixed_digits};
use crate::plot_opt::{BottomType, YAxisType};
use crate::process::Process;
use crate::render::RenderContext;
use crate::render::colors::Rgba;
use crate::render::scene::{Drawable, LineStyle, Pad, Scene};

fn visible(h: &Histogram) -> Vec<f64> {
    (1..=h.nbins()).map(|bin| h.content(bin)).collect()
}

fn hist_drawable(h: &Histogram, process: &Process, filled: bool) -> Drawable {
    let style = &process.style;
    Drawable::Hist {
        name: h.name.clone(),
        edges: h.edges().to_vec(),
        contents: visible(h),
        fill: filled.then_some(style.color),
        line: if filled { Rgba::BLACK } else { style.color },
        line_width: if filled { 1.0 } else { style.line_width },
        line_style: style.line_style,
    }
}

/// Markers with asymmetric errors; bins without a finite value are left out.
fn points_drawable(h: &Histogram, process: &Process) -> Drawable {
    let bins: Vec<usize> = (1..=h.nbins()).filter(|&b| h.content(b).is_finite()).collect();
    Drawable::Points {
        name: h.name.clone(),
        x: bins.iter().map(|&b| h.bin_center(b)).collect(),
        y: bins.iter().map(|&b| h.content(b)).collect(),
        err_low: bins.iter().map(|&b| h.error_low(b)).collect(),
        err_high: bins.iter().map(|&b| h.error_up(b)).collect(),
        color: process.style.color,
        marker_size: process.style.marker_size.max(0.8),
    }
}

fn band_drawable(h: &Histogram, color: Rgba) -> Drawable {
    let n = h.nbins();
    Drawable::Band {
        name: h.name.clone(),
        edges: h.edges().to_vec(),
        low: (1..=n).map(|b| h.content(b) - h.error_low(b)).collect(),
        high: (1..=n).map(|b| h.content(b) + h.error_up(b)).collect(),
        color,
    }
}

impl Hist1D {
    pub(super) fn print_all(
        &mut self,
        luminosity: f64,
        subdir: &str,
        ctx: &RenderContext,
    ) -> Result<Vec<PathBuf>, HepError> {
        if !self.draw_plot {
            return Ok(Vec::new());
        }
        let options = self.plot_options.clone();
        let suffix_styles = options.len() > 1;

        let mut written = Vec::new();
        for opt in &options {
            self.refresh(luminosity, opt, &ctx.names);
            let bottom = self.bottom_panel(&ctx.names)?;
            let scene = self.scene(bottom.as_ref(), &ctx.names);
            if self.this_opt.print_vals
                && let Some(panel) = &bottom
            {
                self.print_values(panel);
            }
            let base = match self.tag.strip_prefix("FixName:") {
                Some(fixed) => ctx.output_base(subdir, fixed)?,
                None => {
                    let mut name = self.name();
                    if suffix_styles {
                        name.push_str("__");
                        name.push_str(&self.this_opt.type_string());
                    }
                    ctx.output_base(subdir, &name)?
                }
            };
            written.extend(ctx.save(&scene, &base, &self.this_opt.file_extensions)?);
        }
        Ok(written)
    }

    /// Builds the canvas for the options of the last refresh.
    pub fn scene(&self, bottom: Option<&BottomPanel>, names: &NameCounter) -> Scene {
        let opt = &self.this_opt;
        let x_range = (self.xaxis.low(), self.xaxis.high());
        let (y_min, y_max) = self.y_range();

        let mut top = Pad::new(&names.next_name("top"), opt.top_pad_margins());
        top.x_range = x_range;
        top.y_range = (y_min, y_max);
        top.log_y = opt.y_axis == YAxisType::Log;
        top.x_title = if bottom.is_none() { self.xaxis.full_title() } else { String::new() };
        top.y_title = self.y_axis_title();
        top.y_title_offset = self.y_title_offset(y_max);
        top.n_divisions = opt.n_divisions;

        let stacked = opt.backgrounds_stacked();
        for b in &self.components.backgrounds {
            top.items.push(hist_drawable(&b.scaled, &b.process, stacked));
        }
        if stacked
            && opt.show_background_error
            && let Some(band) = self.background_error()
        {
            top.items.push(band);
        }
        for s in &self.components.signals {
            top.items.push(hist_drawable(&s.scaled, &s.process, false));
        }
        for d in &self.components.datas {
            top.items.push(points_drawable(&d.scaled, &d.process));
        }
        top.items.extend(self.cut_lines(y_min, y_max));
        top.legends = self.legends();

        let mut pads = vec![top];
        if let Some(panel) = bottom {
            pads.push(self.bottom_pad(panel, names));
        }

        let mut texts = self.title_texts();
        texts.extend(self.label_texts());
        Scene {
            name: self.name(),
            width: opt.canvas_width,
            height: opt.canvas_height,
            pads,
            texts,
        }
    }

    fn bottom_pad(&self, panel: &BottomPanel, names: &NameCounter) -> Pad {
        let opt = &self.this_opt;
        let x_range = (self.xaxis.low(), self.xaxis.high());
        let mut pad = Pad::new(&names.next_name("bottom"), opt.bottom_pad_margins());
        pad.x_range = x_range;
        pad.y_range = panel.y_range;
        pad.x_title = self.xaxis.full_title();
        pad.y_title = panel.title.clone();
        pad.y_title_offset = opt.y_title_offset;
        pad.n_divisions = opt.n_divisions_bottom;

        pad.items.push(band_drawable(&panel.band, panel.band_color));
        for (h, process) in &panel.plots {
            let item = if Self::draws_as_points(process) {
                points_drawable(h, process)
            } else {
                hist_drawable(h, process, false)
            };
            pad.items.push(item);
        }
        if let Some(y) = panel.reference {
            pad.items.push(Drawable::Line {
                x1: x_range.0,
                y1: y,
                x2: x_range.1,
                y2: y,
                color: Rgba::BLACK,
                width: 1.0,
                style: LineStyle::Dashed,
            });
        }
        pad.items.extend(self.cut_lines(panel.y_range.0, panel.y_range.1));
        pad
    }

    /// Logs data, total background and the lower pad value for every bin.
    fn print_values(&self, panel: &BottomPanel) {
        let (Some(data), Some(mc)) = (
            self.components.datas.first(),
            self.components.backgrounds.first(),
        ) else {
            return;
        };
        let Some((ratio, _)) = panel.plots.first() else {
            return;
        };
        let label = match self.this_opt.bottom {
            BottomType::Diff => "Data-MC",
            BottomType::Ratio => "Data/MC",
            _ => "Bottom",
        };
        log::info!("Values for {}", self.name());
        for bin in 1..=data.scaled.nbins() {
            log::info!(
                "Bin {bin} [{}, {}): Data = {} +- {}, MC = {} +- {}, {label} = {} +- {}",
                fixed_digits(data.scaled.low_edge(bin), 3),
                fixed_digits(data.scaled.low_edge(bin + 1), 3),
                fixed_digits(data.scaled.content(bin), 3),
                fixed_digits(data.scaled.error(bin), 3),
                fixed_digits(mc.scaled.content(bin), 3),
                fixed_digits(mc.scaled.error(bin), 3),
                fixed_digits(ratio.content(bin), 3),
                fixed_digits(ratio.error(bin), 3),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::super::tests::{axis, events, filled};
    use super::*;
    use crate::event::NamedFunc;
    use crate::figure::test_support::process;
    use crate::plot_opt::{PlotOpt, StackType, TitleType};
    use crate::process::ProcessType;
    use crate::render::RecordingSink;
    use crate::render::scene::Marker;

    fn figure(options: Vec<PlotOpt>) -> Hist1D {
        let procs = vec![
            process("data", ProcessType::Data, events(&[4, 6, 2])),
            process("tt", ProcessType::Background, events(&[3, 3, 1])),
            process("dy", ProcessType::Background, events(&[1, 2, 1])),
            process("sig", ProcessType::Signal, events(&[0, 1, 1])),
        ];
        let mut figure = Hist1D::new(axis(), NamedFunc::default(), &procs, options);
        filled(&mut figure);
        figure
    }

    fn context() -> (RecordingSink, RenderContext) {
        let sink = RecordingSink::new();
        let ctx = RenderContext::with_sink(Path::new("plots"), Box::new(sink.clone()));
        (sink, ctx)
    }

    #[test]
    fn one_file_per_style_and_extension() {
        let options = vec![
            PlotOpt::default().file_extension("json"),
            PlotOpt::default().y_axis(YAxisType::Log),
        ];
        let mut fig = figure(options);
        let (sink, ctx) = context();
        let written = fig.print(1.0, "zg", &ctx).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.contains(&PathBuf::from("plots/zg/x__lumi_nonorm_lin.json")));
        assert!(written.contains(&PathBuf::from("plots/zg/x__lumi_nonorm_log.png")));
        assert_eq!(sink.scenes().len(), 2);
    }

    #[test]
    fn single_style_keeps_plain_name() {
        let mut fig = figure(vec![PlotOpt::default()]);
        let (_, ctx) = context();
        let written = fig.print(1.0, "", &ctx).unwrap();
        assert_eq!(written, vec![PathBuf::from("plots/x.png")]);

        let mut fixed = figure(vec![PlotOpt::default()]).tag("FixName:out/fixed");
        let written = fixed.print(1.0, "zg", &ctx).unwrap();
        assert_eq!(written, vec![PathBuf::from("plots/zg/out/fixed.png")]);
    }

    #[test]
    fn no_styles_print_nothing() {
        let mut fig = figure(Vec::new());
        let (sink, ctx) = context();
        assert!(fig.print(1.0, "zg", &ctx).unwrap().is_empty());
        assert!(sink.scenes().is_empty());
    }

    #[test]
    fn stacked_scene_contents() {
        let opt = PlotOpt::default().bottom(BottomType::Ratio);
        let mut fig = figure(vec![opt]);
        let (sink, ctx) = context();
        fig.print(2.0, "", &ctx).unwrap();
        let scenes = sink.scenes();
        let (_, scene) = &scenes[0];
        assert_eq!(scene.pads.len(), 2);

        let top = &scene.pads[0];
        // two filled backgrounds, the band, one signal line, data points
        assert_eq!(top.items.len(), 5);
        let Drawable::Hist { fill, contents, .. } = &top.items[0] else {
            panic!("expected a histogram");
        };
        assert!(fill.is_some());
        assert_eq!(contents, &vec![8.0, 10.0, 4.0]);
        assert!(matches!(top.items[2], Drawable::Band { .. }));
        assert!(matches!(top.items[4], Drawable::Points { .. }));
        assert!(top.x_title.is_empty());

        let bottom = &scene.pads[1];
        assert_eq!(bottom.y_title, "#frac{Data}{MC}");
        assert_eq!(bottom.x_title, "x");
        assert!(bottom.items.iter().any(|item| matches!(
            item,
            Drawable::Line { style: LineStyle::Dashed, y1, .. } if *y1 == 1.0
        )));

        let entries: Vec<_> = top.legends.iter().flat_map(|l| l.entries.iter()).collect();
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].marker, Marker::Points);
        assert_eq!(entries[1].marker, Marker::Fill);
        assert_eq!(entries[3].marker, Marker::Line);
    }

    #[test]
    fn skipped_when_not_drawn() {
        let mut fig = figure(vec![PlotOpt::default()]).draw_plot(false);
        let (sink, ctx) = context();
        assert!(fig.print(1.0, "", &ctx).unwrap().is_empty());
        assert!(sink.scenes().is_empty());
    }

    #[test]
    fn cms_styles_carry_labels() {
        let opt = PlotOpt::default()
            .title(TitleType::Simulation)
            .stack(StackType::Shapes)
            .print_vals(true);
        let mut fig = figure(vec![opt]).left_label(vec!["ee".to_owned()]);
        let (sink, ctx) = context();
        fig.print(1.0, "", &ctx).unwrap();
        let scenes = sink.scenes();
        let texts = &scenes[0].1.texts;
        assert_eq!(texts.len(), 3);
        assert_eq!(texts[1].text, "13 TeV");
        assert_eq!(texts[2].text, "ee");
        // shapes draw backgrounds as lines
        let Drawable::Hist { fill, .. } = &scenes[0].1.pads[0].items[0] else {
            panic!("expected a histogram");
        };
        assert!(fill.is_none());
    }
}
