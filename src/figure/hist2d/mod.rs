//! Two dimensional figures: backgrounds as a heatmap or scatters, data and
//! signals as scatters.

mod print;

use std::path::PathBuf;
use std::sync::Arc;

use super::fill::fill_event;
use super::{ComponentGroups, Figure, FigureComponent};
use crate::axis::Axis;
use crate::error::HepError;
use crate::event::{Baby, NamedFunc};
use crate::histoer::{Clusterizer, Histogram2D};
use crate::naming::code_to_plain_text;
use crate::plot_opt::PlotOpt;
use crate::process::Process;
use crate::render::RenderContext;

pub const DEFAULT_MAX_POINTS: usize = 10_000;

#[derive(Debug, Clone)]
pub struct SingleHist2D {
    process: Arc<Process>,
    cut: NamedFunc,
    weight: NamedFunc,
    xvar: NamedFunc,
    yvar: NamedFunc,
    pub clusterizer: Clusterizer,
}

impl SingleHist2D {
    fn new(
        process: &Arc<Process>,
        cut: &NamedFunc,
        weight: &NamedFunc,
        template: &Histogram2D,
        axes: (&Axis, &Axis),
        max_points: usize,
    ) -> Self {
        let mut template = template.clone();
        template.name.clone_from(&process.name);
        SingleHist2D {
            process: Arc::clone(process),
            cut: cut.and(&process.cut),
            weight: weight.clone(),
            xvar: axes.0.var.clone(),
            yvar: axes.1.var.clone(),
            clusterizer: Clusterizer::new(template, max_points),
        }
    }
}

impl FigureComponent for SingleHist2D {
    fn process(&self) -> &Arc<Process> {
        &self.process
    }

    fn record_event(&mut self, baby: &dyn Baby) {
        let clusterizer = &mut self.clusterizer;
        fill_event(
            &self.cut,
            &self.weight,
            &[&self.xvar, &self.yvar],
            baby,
            |v, w| clusterizer.add_point(v[0], v[1], w),
        );
    }
}

#[derive(Debug)]
pub struct Hist2D {
    pub xaxis: Axis,
    pub yaxis: Axis,
    pub cut: NamedFunc,
    weight: NamedFunc,
    pub tag: String,
    pub luminosity_tag: String,
    pub plot_options: Vec<PlotOpt>,
    pub components: ComponentGroups<SingleHist2D>,
    processes: Vec<Arc<Process>>,
    max_points: usize,
    this_opt: PlotOpt,
    luminosity: f64,
}

impl Hist2D {
    pub fn new(
        xaxis: Axis,
        yaxis: Axis,
        cut: NamedFunc,
        processes: &[Arc<Process>],
        plot_options: Vec<PlotOpt>,
    ) -> Self {
        let weight = NamedFunc::scalar_field("weight");
        let mut figure = Hist2D {
            xaxis,
            yaxis,
            cut,
            weight,
            tag: String::new(),
            luminosity_tag: String::new(),
            this_opt: plot_options.first().cloned().unwrap_or_default(),
            plot_options,
            components: ComponentGroups::default(),
            processes: processes.to_vec(),
            max_points: DEFAULT_MAX_POINTS,
            luminosity: 1.0,
        };
        figure.rebuild_components();
        figure
    }

    fn template(&self) -> Histogram2D {
        Histogram2D::new("", self.xaxis.bins(), self.yaxis.bins())
    }

    // Drops anything filled so far.
    fn rebuild_components(&mut self) {
        let template = self.template();
        let (cut, weight, max_points) = (&self.cut, &self.weight, self.max_points);
        let axes = (&self.xaxis, &self.yaxis);
        self.components = ComponentGroups::build(&self.processes, |p| {
            SingleHist2D::new(p, cut, weight, &template, axes, max_points)
        });
    }

    /// Replaces the event weight. Call before filling.
    pub fn weight(mut self, weight: NamedFunc) -> Self {
        self.weight = weight;
        self.rebuild_components();
        self
    }

    /// Point budget of each component before points are merged. Call before
    /// filling.
    pub fn max_points(mut self, max_points: usize) -> Self {
        self.max_points = max_points;
        self.rebuild_components();
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

    pub fn weight_func(&self) -> &NamedFunc {
        &self.weight
    }
}

impl Figure for Hist2D {
    fn name(&self) -> String {
        if let Some(short) = self.tag.strip_prefix("ShortName:") {
            return code_to_plain_text(short);
        }
        if !self.tag.is_empty() {
            return self.tag.clone();
        }
        let mut name = format!("{}__{}", self.yaxis.var.name(), self.xaxis.var.name());
        if !self.cut.is_trivial() {
            name.push_str("__");
            name.push_str(self.cut.name());
        }
        if self.weight.name() != "weight" {
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

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::MapBaby;
    use crate::figure::test_support::process;
    use crate::process::ProcessType;

    pub fn axes() -> (Axis, Axis) {
        (
            Axis::uniform(2, 0.0, 2.0, NamedFunc::scalar_field("x"), "x").unwrap(),
            Axis::uniform(2, 0.0, 2.0, NamedFunc::scalar_field("y"), "y").unwrap(),
        )
    }

    pub fn point(x: f64, y: f64, weight: f64) -> MapBaby {
        MapBaby::new()
            .with_scalar("x", x)
            .with_scalar("y", y)
            .with_scalar("weight", weight)
    }

    pub fn filled(figure: &mut Hist2D) {
        for p in figure.processes() {
            let Some(component) = figure.component_mut(&p) else {
                continue;
            };
            p.source()
                .for_each_event(&mut |baby| component.record_event(baby))
                .unwrap();
        }
    }

    #[test]
    fn points_reach_clusterizer() {
        let procs = vec![process(
            "tt",
            ProcessType::Background,
            vec![point(0.5, 0.5, 1.0), point(1.5, 0.5, 2.0)],
        )];
        let (x, y) = axes();
        let mut fig = Hist2D::new(x, y, NamedFunc::default(), &procs, Vec::new());
        filled(&mut fig);
        let h = fig.components.backgrounds[0].clusterizer.histogram(1.0);
        assert_eq!(h.content(1, 1), 1.0);
        assert_eq!(h.content(2, 1), 2.0);
        assert_eq!(h.content(1, 2), 0.0);
    }

    #[test]
    fn names_put_y_first() {
        let procs = vec![process("tt", ProcessType::Background, Vec::new())];
        let (x, y) = axes();
        let fig = Hist2D::new(x.clone(), y.clone(), NamedFunc::default(), &procs, Vec::new());
        assert_eq!(fig.name(), "y__x");
        let weighted = Hist2D::new(x.clone(), y.clone(), NamedFunc::default(), &procs, Vec::new())
            .weight(NamedFunc::scalar_field("w_year"));
        assert_eq!(weighted.name(), "y__x__w_year");
        let short = Hist2D::new(x, y, NamedFunc::default(), &procs, Vec::new()).tag("ShortName:y.x");
        assert_eq!(short.name(), "ypx");
    }

    #[test]
    fn max_points_resets_components() {
        let procs = vec![process("tt", ProcessType::Background, Vec::new())];
        let (x, y) = axes();
        let mut fig = Hist2D::new(x, y, NamedFunc::default(), &procs, Vec::new()).max_points(4);
        let component = &mut fig.components.backgrounds[0];
        for i in 0..10 {
            let v = f64::from(i) * 0.15;
            component.record_event(&point(v, v, 1.0));
        }
        assert!(component.clusterizer.is_clustered());
        let h = component.clusterizer.histogram(1.0);
        let total: f64 = h.visible_values().iter().sum();
        assert!((total - 10.0).abs() < 1e-12);
    }
}
