//! One dimensional stacked histograms with an optional bottom panel.

mod bottom;
mod legend;
mod pipeline;
mod print;
mod ranges;

use std::path::PathBuf;
use std::sync::Arc;

pub use bottom::{BottomPanel, significance_scan};

use super::fill::fill_event;
use super::{ComponentGroups, Figure, FigureComponent};
use crate::axis::Axis;
use crate::error::HepError;
use crate::event::{Baby, NamedFunc};
use crate::histoer::Histogram;
use crate::naming::code_to_plain_text;
use crate::plot_opt::PlotOpt;
use crate::process::Process;
use crate::render::RenderContext;

/// Raw and scaled histogram of one process.
#[derive(Debug, Clone)]
pub struct SingleHist1D {
    process: Arc<Process>,
    cut: NamedFunc,
    weight: NamedFunc,
    var: NamedFunc,
    pub raw: Histogram,
    pub scaled: Histogram,
}

impl SingleHist1D {
    fn new(process: &Arc<Process>, cut: &NamedFunc, weight: &NamedFunc, xaxis: &Axis) -> Self {
        let raw = Histogram::new(&process.name, xaxis.bins());
        SingleHist1D {
            process: Arc::clone(process),
            cut: cut.and(&process.cut),
            weight: weight.clone(),
            var: xaxis.var.clone(),
            scaled: raw.clone(),
            raw,
        }
    }
}

impl FigureComponent for SingleHist1D {
    fn process(&self) -> &Arc<Process> {
        &self.process
    }

    fn record_event(&mut self, baby: &dyn Baby) {
        let raw = &mut self.raw;
        fill_event(&self.cut, &self.weight, &[&self.var], baby, |v, w| {
            raw.fill(v[0], w);
        });
    }
}

#[derive(Debug)]
pub struct Hist1D {
    pub xaxis: Axis,
    pub cut: NamedFunc,
    weight: NamedFunc,
    pub tag: String,
    pub luminosity_tag: String,
    pub left_label: Vec<String>,
    pub right_label: Vec<String>,
    pub yaxis_zoom: f64,
    ratio_numerator: String,
    ratio_denominator: String,
    pub plot_options: Vec<PlotOpt>,
    pub draw_plot: bool,
    pub components: ComponentGroups<SingleHist1D>,
    this_opt: PlotOpt,
    luminosity: f64,
    mc_scale: f64,
    mc_scale_error: f64,
}

impl Hist1D {
    pub fn new(
        xaxis: Axis,
        cut: NamedFunc,
        processes: &[Arc<Process>],
        plot_options: Vec<PlotOpt>,
    ) -> Self {
        let weight = NamedFunc::scalar_field("weight");
        let components =
            ComponentGroups::build(processes, |p| SingleHist1D::new(p, &cut, &weight, &xaxis));
        Hist1D {
            xaxis,
            cut,
            weight,
            tag: String::new(),
            luminosity_tag: String::new(),
            left_label: Vec::new(),
            right_label: Vec::new(),
            yaxis_zoom: 1.0,
            ratio_numerator: String::new(),
            ratio_denominator: String::new(),
            this_opt: plot_options.first().cloned().unwrap_or_default(),
            plot_options,
            draw_plot: true,
            components,
            luminosity: 1.0,
            mc_scale: 1.0,
            mc_scale_error: 1.0,
        }
    }

    /// Replaces the event weight of every component. Call before filling.
    pub fn weight(mut self, weight: NamedFunc) -> Self {
        for component in self.components.iter_mut() {
            component.weight = weight.clone();
        }
        self.weight = weight;
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = tag.to_owned();
        self
    }

    pub fn luminosity_tag(mut self, tag: &str) -> Self {
        self.luminosity_tag = tag.to_owned();
        self
    }

    pub fn left_label(mut self, label: Vec<String>) -> Self {
        self.left_label = label;
        self
    }

    pub fn right_label(mut self, label: Vec<String>) -> Self {
        self.right_label = label;
        self
    }

    pub fn yaxis_zoom(mut self, zoom: f64) -> Self {
        self.yaxis_zoom = zoom;
        self
    }

    pub fn ratio_title(mut self, numerator: &str, denominator: &str) -> Self {
        self.ratio_numerator = numerator.to_owned();
        self.ratio_denominator = denominator.to_owned();
        self
    }

    pub fn draw_plot(mut self, draw_plot: bool) -> Self {
        self.draw_plot = draw_plot;
        self
    }

    pub fn weight_func(&self) -> &NamedFunc {
        &self.weight
    }

    pub fn mc_scale(&self) -> f64 {
        self.mc_scale
    }

    pub fn mc_scale_error(&self) -> f64 {
        self.mc_scale_error
    }

    /// Options of the most recent refresh.
    pub fn this_opt(&self) -> &PlotOpt {
        &self.this_opt
    }

    fn has_default_weight(&self) -> bool {
        self.weight.name() == "weight"
    }

    /// Cut and weight description used as the info title.
    pub fn title(&self) -> String {
        let tex = crate::naming::code_to_tex;
        let cut = !self.cut.name().is_empty() && !self.cut.is_trivial();
        let weight = !self.has_default_weight();
        match (cut, weight) {
            (true, true) => format!(
                "{} (weight={})",
                tex(self.cut.name()),
                tex(self.weight.name())
            ),
            (true, false) => tex(self.cut.name()),
            (false, true) => tex(&format!("weight={}", self.weight.name())),
            (false, false) => String::new(),
        }
    }
}

impl Figure for Hist1D {
    fn name(&self) -> String {
        if let Some(short) = self.tag.strip_prefix("ShortName:") {
            return code_to_plain_text(short);
        }
        if !self.tag.is_empty() {
            return self.tag.clone();
        }
        let mut name = self.xaxis.var.name().to_owned();
        if !self.cut.is_trivial() {
            name.push_str("__");
            name.push_str(self.cut.name());
        }
        if !self.has_default_weight() {
            name.push_str("__");
            name.push_str(self.weight.name());
        }
        code_to_plain_text(&name)
    }

    fn processes(&self) -> Vec<Arc<Process>> {
        self.components.processes()
    }

    fn component_mut(&mut self, process: &Arc<Process>) -> Option<&mut dyn FigureComponent> {
        self.components
            .find_mut(process)
            .map(|c| c as &mut dyn FigureComponent)
    }

    fn components_mut(&mut self) -> Vec<&mut dyn FigureComponent> {
        self.components
            .iter_mut()
            .map(|c| c as &mut dyn FigureComponent)
            .collect()
    }

    fn print(
        &mut self,
        luminosity: f64,
        subdir: &str,
        ctx: &RenderContext,
    ) -> Result<Vec<PathBuf>, HepError> {
        self.print_all(luminosity, subdir, ctx)
    }
}
