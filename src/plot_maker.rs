use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::error::HepError;
use crate::figure::{Figure, FigureComponent};
use crate::process::Process;
use crate::render::RenderContext;

type ProcessWork<'a> = (Arc<Process>, Vec<&'a mut dyn FigureComponent>);

/// Owns the figures of a job, reads every process once and prints the
/// results.
pub struct PlotMaker {
    pub figures: Vec<Box<dyn Figure>>,
    pub min_print: bool,
    ctx: RenderContext,
}

impl PlotMaker {
    pub fn new(ctx: RenderContext) -> Self {
        PlotMaker {
            figures: Vec::new(),
            min_print: false,
            ctx,
        }
    }

    pub fn push<F: Figure + 'static>(&mut self, figure: F) -> &mut Self {
        self.figures.push(Box::new(figure));
        self
    }

    pub fn context(&self) -> &RenderContext {
        &self.ctx
    }

    /// Fills every figure and prints them. Returns the files written.
    pub fn make_plots(&mut self, luminosity: f64, subdir: &str) -> Result<Vec<PathBuf>, HepError> {
        let start = Instant::now();
        self.fill_histograms()?;
        log::info!(
            "Filled {} figures in {:.2} s",
            self.figures.len(),
            start.elapsed().as_secs_f64()
        );

        let ctx = &self.ctx;
        let results: Vec<Result<Vec<PathBuf>, HepError>> = self
            .figures
            .par_iter_mut()
            .map(|figure| figure.print(luminosity, subdir, ctx))
            .collect();

        let mut written = Vec::new();
        for result in results {
            written.extend(result?);
        }
        log::info!(
            "Wrote {} files in {:.2} s",
            written.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(written)
    }

    /// Components grouped by the process they read, in first-seen order.
    fn gather(figures: &mut [Box<dyn Figure>]) -> Vec<ProcessWork<'_>> {
        let mut work: Vec<ProcessWork<'_>> = Vec::new();
        for figure in figures {
            for component in figure.components_mut() {
                let process = Arc::clone(component.process());
                match work.iter_mut().find(|(p, _)| Arc::ptr_eq(p, &process)) {
                    Some((_, components)) => components.push(component),
                    None => work.push((process, vec![component])),
                }
            }
        }
        work
    }

    fn progress_bar(min_print: bool, len: usize) -> ProgressBar {
        if min_print {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new(len as u64);
        bar.set_message("Filling");
        match ProgressStyle::default_bar()
            .template("{msg} [{elapsed}] {wide_bar:.cyan/blue} {pos:>7}/{len:7} {eta}")
        {
            Ok(style) => bar.set_style(style),
            Err(err) => log::warn!("Progress bar template rejected: {err}"),
        }
        bar
    }

    // Each process is read once; its components are disjoint, so processes
    // fill in parallel.
    fn fill_histograms(&mut self) -> Result<(), HepError> {
        let min_print = self.min_print;
        let work = Self::gather(&mut self.figures);
        let bar = Self::progress_bar(min_print, work.len());

        let results: Vec<Result<(), HepError>> = work
            .into_par_iter()
            .map(|(process, mut components)| {
                let start = Instant::now();
                let n_events = process.source().for_each_event(&mut |baby| {
                    for component in &mut components {
                        component.record_event(baby);
                    }
                })?;
                if !min_print {
                    log::info!(
                        "{}: {} events into {} components in {:.2} s",
                        process.name,
                        n_events,
                        components.len(),
                        start.elapsed().as_secs_f64()
                    );
                }
                bar.inc(1);
                Ok(())
            })
            .collect();
        bar.finish_and_clear();

        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::axis::Axis;
    use crate::event::{MapBaby, NamedFunc};
    use crate::figure::test_support::{event, process};
    use crate::figure::{Hist1D, Hist2D, Table, TableRow};
    use crate::plot_opt::PlotOpt;
    use crate::process::ProcessType;
    use crate::render::RecordingSink;

    fn axis(var: &str) -> Axis {
        Axis::uniform(2, 0.0, 2.0, NamedFunc::scalar_field(var), var).unwrap()
    }

    fn with_y(x: f64, y: f64) -> MapBaby {
        event(x, 1.0).with_scalar("y", y)
    }

    #[test]
    fn shared_processes_fill_every_figure() {
        let tt = process("tt", ProcessType::Background, vec![with_y(0.5, 1.5), with_y(1.5, 0.5)]);
        let data = process("data", ProcessType::Data, vec![with_y(0.5, 0.5)]);
        let procs = vec![Arc::clone(&tt), Arc::clone(&data)];

        let sink = RecordingSink::new();
        let ctx = RenderContext::with_sink(Path::new("plots"), Box::new(sink.clone()));
        let mut maker = PlotMaker::new(ctx);
        maker.min_print = true;
        maker
            .push(Hist1D::new(axis("x"), NamedFunc::default(), &procs, vec![PlotOpt::default()]))
            .push(Hist1D::new(axis("y"), NamedFunc::default(), &procs, vec![PlotOpt::default()]))
            .push(Hist2D::new(axis("x"), axis("y"), NamedFunc::default(), &procs, vec![PlotOpt::default()]));

        let work = PlotMaker::gather(&mut maker.figures);
        assert_eq!(work.len(), 2);
        assert_eq!(work[0].1.len(), 3);
        drop(work);

        let written = maker.make_plots(1.0, "").unwrap();
        assert_eq!(written.len(), 3);
        assert!(written.contains(&PathBuf::from("plots/y__x__lumi_nonorm_lin.png")));
        assert_eq!(sink.scenes().len(), 3);
    }

    #[test]
    fn first_print_error_is_returned() {
        let sig = process("sig", ProcessType::Signal, vec![event(0.5, 1.0)]);
        let dir = std::env::temp_dir().join(format!("hepplot_maker_{}", std::process::id()));
        // a file where the table directory should be
        std::fs::write(&dir, "").unwrap();

        let ctx = RenderContext::with_sink(Path::new("plots"), Box::new(RecordingSink::new()))
            .table_dir(&dir);
        let mut maker = PlotMaker::new(ctx);
        maker.min_print = true;
        maker.push(Table::new(
            "cutflow",
            vec![TableRow::new("all", NamedFunc::default())],
            &[sig],
        ));
        let result = maker.make_plots(1.0, "");
        std::fs::remove_file(&dir).unwrap();
        assert!(matches!(result, Err(HepError::File(_))));
    }
}
