use std::path::PathBuf;

use super::{Hist2D, SingleHist2D};
use crate::error::HepError;
use crate::figure::Figure;
use crate::histoer::Histogram2D;
use crate::naming::fixed_digits;
use crate::plot_opt::{TitleType, YAxisType};
use crate::process::ProcessType;
use crate::render::RenderContext;
use crate::render::colormaps::ColorMap;
use crate::render::colors::Rgba;
use crate::render::scene::{
    Drawable, Legend, LegendEntry, LineStyle, Margins, Marker, Pad, Scene, ScatterPoint,
};

const LEGEND_TEXT_SIZE: f64 = 0.05;
const UNSTACKED_RIGHT_MARGIN: f64 = 0.05;

impl Hist2D {
    pub(super) fn print_all(
        &mut self,
        luminosity: f64,
        subdir: &str,
        ctx: &RenderContext,
    ) -> Result<Vec<PathBuf>, HepError> {
        self.luminosity = luminosity;
        let options = self.plot_options.clone();
        let mut written = Vec::new();
        for opt in options {
            self.this_opt = opt.make_sane();
            let scene = self.scene(&ctx.names.next_name("canvas"));
            let base = match self.tag.strip_prefix("FixName:") {
                Some(fixed) => ctx.output_base(subdir, fixed)?,
                None => {
                    let name = format!("{}__{}", self.name(), self.this_opt.type_string());
                    ctx.output_base(subdir, &name)?
                }
            };
            written.extend(ctx.save(&scene, &base, &self.this_opt.file_extensions)?);
        }
        Ok(written)
    }

    fn background_is_hist(&self) -> bool {
        self.this_opt.backgrounds_stacked()
    }

    /// Sum of the luminosity-scaled backgrounds.
    pub fn background_histogram(&self) -> Histogram2D {
        let mut total = self.template();
        total.name = "backgrounds".to_owned();
        for b in &self.components.backgrounds {
            total.add(&b.clusterizer.histogram(self.luminosity));
        }
        total
    }

    fn show_correlation(&self, component: &SingleHist2D) -> bool {
        if component.process.kind == ProcessType::Signal {
            return false;
        }
        self.this_opt.title == TitleType::Info || self.this_opt.title.is_simulation()
    }

    fn entry_label(&self, component: &SingleHist2D) -> String {
        let mut label = component.process.name.clone();
        if self.show_correlation(component) {
            let rho = component.clusterizer.histogram(1.0).correlation_factor();
            label.push_str(&format!(" [#rho={}]", fixed_digits(rho, 1)));
        }
        label
    }

    /// One-row legend, one box per entry, across the top margin.
    pub fn legends(&self) -> Vec<Legend> {
        let opt = &self.this_opt;
        let hist = self.background_is_hist();
        let mut entries = Vec::new();
        let backgrounds: &[SingleHist2D] = if hist { &[] } else { &self.components.backgrounds };
        for component in self
            .components
            .datas
            .iter()
            .chain(backgrounds)
            .chain(&self.components.signals)
        {
            entries.push(LegendEntry {
                label: self.entry_label(component),
                marker: Marker::Points,
                color: component.process.style.color,
            });
        }
        if entries.is_empty() {
            return Vec::new();
        }
        let (x1, x2) = if hist {
            (opt.left_margin, 1.0 - opt.right_margin)
        } else {
            (opt.left_margin - 0.05, 1.0 - UNSTACKED_RIGHT_MARGIN)
        };
        let width = (x2 - x1) / entries.len() as f64;
        entries
            .into_iter()
            .enumerate()
            .map(|(i, entry)| Legend {
                x1: x1 + i as f64 * width,
                y1: 1.0 - opt.top_margin,
                x2: x1 + (i + 1) as f64 * width,
                y2: 1.0,
                text_size: LEGEND_TEXT_SIZE,
                entries: vec![entry],
            })
            .collect()
    }

    /// Dashed lines at the cut values of both axes.
    pub fn cut_lines(&self) -> Vec<Drawable> {
        let (x_low, x_high) = (self.xaxis.low(), self.xaxis.high());
        let (y_low, y_high) = (self.yaxis.low(), self.yaxis.high());
        let vertical = self.xaxis.cut_vals.iter().map(|&x| (x, y_low, x, y_high));
        let horizontal = self.yaxis.cut_vals.iter().map(|&y| (x_low, y, x_high, y));
        vertical
            .chain(horizontal)
            .map(|(x1, y1, x2, y2)| Drawable::Line {
                x1,
                y1,
                x2,
                y2,
                color: Rgba::BLACK,
                width: 4.0,
                style: LineStyle::Dashed,
            })
            .collect()
    }

    fn scatter(&self, component: &SingleHist2D, luminosity: f64) -> Drawable {
        let points: Vec<ScatterPoint> = component.clusterizer.graph(luminosity);
        Drawable::Scatter {
            name: component.process.name.clone(),
            points,
            color: component.process.style.color,
            marker_size: component.process.style.marker_size.max(0.6),
        }
    }

    pub fn scene(&self, pad_name: &str) -> Scene {
        let opt = &self.this_opt;
        let hist = self.background_is_hist();
        let margins = Margins {
            left: opt.left_margin,
            right: if hist { opt.right_margin } else { UNSTACKED_RIGHT_MARGIN },
            bottom: opt.bottom_margin,
            top: opt.top_margin,
        };
        let mut pad = Pad::new(pad_name, margins);
        pad.x_range = (self.xaxis.low(), self.xaxis.high());
        pad.y_range = (self.yaxis.low(), self.yaxis.high());
        pad.x_title = self.xaxis.full_title();
        pad.y_title = self.yaxis.full_title();
        pad.y_title_offset = opt.y_title_offset;
        pad.n_divisions = opt.n_divisions;

        let log_z = opt.y_axis == YAxisType::Log;
        if hist {
            let total = self.background_histogram();
            let (z_min, z_max) = total.z_range(log_z);
            let z_min = if log_z { z_min.max(opt.log_minimum) } else { opt.log_minimum.min(z_min) };
            pad.items.push(Drawable::Heatmap {
                name: total.name.clone(),
                x_edges: total.x_edges().to_vec(),
                y_edges: total.y_edges().to_vec(),
                values: total.visible_values(),
                colormap: ColorMap::Pastel,
                z_range: (z_min, z_max),
                log_z,
            });
        } else {
            for b in &self.components.backgrounds {
                pad.items.push(self.scatter(b, self.luminosity));
            }
        }
        pad.items.extend(self.cut_lines());
        for d in &self.components.datas {
            pad.items.push(self.scatter(d, 1.0));
        }
        for s in &self.components.signals {
            pad.items.push(self.scatter(s, self.luminosity));
        }
        pad.legends = self.legends();

        Scene {
            name: self.name(),
            width: opt.canvas_width,
            height: opt.canvas_height,
            pads: vec![pad],
            texts: Vec::new(),
        }
    }
}
