//! YAML job files: processes, plot styles and figures for one run.
//!
//! ```yaml
//! luminosity: 41.5
//! subdir: zg
//! styles_file: plot_styles.txt
//! styles:
//!   - preset: CMSPaper
//!     overrides: { BottomType: ratio }
//! processes:
//!   - { name: DY, type: background, color: "#ffcc00", files: [dy.parquet] }
//! figures:
//!   - kind: hist1d
//!     x: { var: mllg, nbins: 40, low: 100, high: 180, title: "m_{ll#gamma}", units: GeV }
//! ```

use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::axis::Axis;
use crate::error::HepError;
use crate::event::{EventSource, EventTable, FieldSchema, NamedFunc, parse_cut, parse_value};
use crate::figure::{Hist1D, Hist2D, Table, TableRow};
use crate::plot_maker::PlotMaker;
use crate::plot_opt::PlotOpt;
use crate::process::{Process, ProcessType};
use crate::render::RenderContext;
use crate::render::colors::Rgba;

fn default_luminosity() -> f64 {
    1.0
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("plots")
}

fn default_table_dir() -> PathBuf {
    PathBuf::from("tables")
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct Job {
    #[serde(default = "default_luminosity")]
    pub luminosity: f64,
    #[serde(default)]
    pub subdir: String,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_table_dir")]
    pub table_dir: PathBuf,
    #[serde(default)]
    pub min_print: bool,
    /// Option file the style presets are read from.
    #[serde(default)]
    pub styles_file: Option<PathBuf>,
    #[serde(default)]
    pub styles: Vec<StyleSpec>,
    pub processes: Vec<ProcessSpec>,
    #[serde(default)]
    pub figures: Vec<FigureSpec>,
}

#[derive(Debug, Clone, Default, serde::Deserialize, serde::Serialize)]
pub struct StyleSpec {
    #[serde(default)]
    pub preset: Option<String>,
    /// Option file keys applied after the preset.
    #[serde(default)]
    pub overrides: BTreeMap<String, String>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct ProcessSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ProcessType,
    #[serde(default)]
    pub color: Option<String>,
    pub files: Vec<PathBuf>,
    #[serde(default)]
    pub cut: String,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct AxisSpec {
    pub var: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub units: String,
    #[serde(default)]
    pub nbins: Option<usize>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    /// Explicit bin edges, used instead of `nbins`/`low`/`high`.
    #[serde(default)]
    pub edges: Option<Vec<f64>>,
    #[serde(default)]
    pub cut_vals: Vec<f64>,
    #[serde(default)]
    pub hard_cut_vals: Vec<f64>,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct RowSpec {
    pub label: String,
    #[serde(default)]
    pub cut: String,
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub lines_before: usize,
    #[serde(default)]
    pub lines_after: usize,
}

#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FigureSpec {
    Hist1d {
        x: AxisSpec,
        #[serde(default)]
        cut: String,
        #[serde(default)]
        weight: Option<String>,
        #[serde(default)]
        tag: String,
        #[serde(default)]
        left_label: Vec<String>,
        #[serde(default)]
        right_label: Vec<String>,
    },
    Hist2d {
        x: AxisSpec,
        y: AxisSpec,
        #[serde(default)]
        cut: String,
        #[serde(default)]
        weight: Option<String>,
        #[serde(default)]
        tag: String,
        #[serde(default)]
        max_points: Option<usize>,
    },
    Table {
        name: String,
        rows: Vec<RowSpec>,
    },
}

impl AxisSpec {
    fn build(&self, schema: &FieldSchema) -> Result<Axis, HepError> {
        let var = parse_value(&self.var, schema)?;
        let title = self.title.as_deref().unwrap_or(&self.var);
        let axis = match (&self.edges, self.nbins, self.low, self.high) {
            (Some(edges), _, _, _) => Axis::variable(edges.clone(), var, title)?,
            (None, Some(nbins), Some(low), Some(high)) => Axis::uniform(nbins, low, high, var, title)?,
            _ => {
                return Err(HepError::InvalidAxis(format!(
                    "axis for {} needs edges or nbins, low and high",
                    self.var
                )));
            }
        };
        Ok(axis
            .units(&self.units)
            .cut_vals(self.cut_vals.clone())
            .hard_cut_vals(self.hard_cut_vals.clone()))
    }
}

fn weight_func(weight: Option<&str>, schema: &FieldSchema) -> Result<Option<NamedFunc>, HepError> {
    weight.map(|w| parse_value(w, schema)).transpose()
}

impl Job {
    pub fn load(path: &Path) -> Result<Self, HepError> {
        let file = File::open(path)?;
        let job: Job = serde_yaml::from_reader(BufReader::new(file))?;
        if job.processes.is_empty() {
            return Err(HepError::Job(format!("{} defines no processes", path.display())));
        }
        Ok(job)
    }

    /// Plot styles in job order; the default style when none are listed.
    pub fn plot_options(&self) -> Result<Vec<PlotOpt>, HepError> {
        if self.styles.is_empty() {
            return Ok(vec![PlotOpt::default()]);
        }
        self.styles
            .iter()
            .map(|style| {
                let mut opt = match (&style.preset, &self.styles_file) {
                    (Some(preset), Some(file)) => PlotOpt::load(file, preset)?,
                    (Some(preset), None) => {
                        return Err(HepError::Job(format!(
                            "style preset {preset} given without a styles_file"
                        )));
                    }
                    (None, _) => PlotOpt::default(),
                };
                for (key, value) in &style.overrides {
                    opt.set_property(key, value)?;
                }
                Ok(opt)
            })
            .collect()
    }

    /// Loads each process's event files and builds the processes. The
    /// returned schema covers the fields of every process.
    pub fn load_processes(&self) -> Result<(Vec<Arc<Process>>, FieldSchema), HepError> {
        let mut tables = Vec::with_capacity(self.processes.len());
        let mut schema = FieldSchema::new();
        for spec in &self.processes {
            let table = EventTable::from_parquet(&spec.files, None)?;
            log::info!("{}: {} events from {} files", spec.name, table.height(), spec.files.len());
            schema.merge(&table.schema());
            tables.push(Arc::new(table));
        }
        let processes = self
            .processes
            .iter()
            .zip(tables)
            .map(|(spec, table)| Self::process(spec, table, &schema))
            .collect::<Result<Vec<_>, _>>()?;
        Ok((processes, schema))
    }

    fn process(
        spec: &ProcessSpec,
        source: Arc<dyn EventSource>,
        schema: &FieldSchema,
    ) -> Result<Arc<Process>, HepError> {
        let color = match &spec.color {
            Some(name) => Rgba::from_name(name)
                .ok_or_else(|| HepError::Job(format!("unknown color {name} for {}", spec.name)))?,
            None => Rgba::BLACK,
        };
        let cut = parse_cut(&spec.cut, schema)?;
        Ok(Process::new(&spec.name, spec.kind, color, source, cut))
    }

    /// Fills a plot maker with the job's figures.
    pub fn build(
        &self,
        processes: &[Arc<Process>],
        schema: &FieldSchema,
        ctx: RenderContext,
    ) -> Result<PlotMaker, HepError> {
        let options = self.plot_options()?;
        let mut maker = PlotMaker::new(ctx);
        maker.min_print = self.min_print;
        for figure in &self.figures {
            match figure {
                FigureSpec::Hist1d {
                    x,
                    cut,
                    weight,
                    tag,
                    left_label,
                    right_label,
                } => {
                    let mut hist = Hist1D::new(x.build(schema)?, parse_cut(cut, schema)?, processes, options.clone())
                        .tag(tag)
                        .left_label(left_label.clone())
                        .right_label(right_label.clone());
                    if let Some(w) = weight_func(weight.as_deref(), schema)? {
                        hist = hist.weight(w);
                    }
                    maker.push(hist);
                }
                FigureSpec::Hist2d {
                    x,
                    y,
                    cut,
                    weight,
                    tag,
                    max_points,
                } => {
                    let mut hist = Hist2D::new(
                        x.build(schema)?,
                        y.build(schema)?,
                        parse_cut(cut, schema)?,
                        processes,
                        options.clone(),
                    )
                    .tag(tag);
                    if let Some(w) = weight_func(weight.as_deref(), schema)? {
                        hist = hist.weight(w);
                    }
                    if let Some(n) = max_points {
                        hist = hist.max_points(*n);
                    }
                    maker.push(hist);
                }
                FigureSpec::Table { name, rows } => {
                    let rows = rows
                        .iter()
                        .map(|row| {
                            let mut table_row = TableRow::new(&row.label, parse_cut(&row.cut, schema)?)
                                .lines(row.lines_before, row.lines_after);
                            if let Some(w) = weight_func(row.weight.as_deref(), schema)? {
                                table_row = table_row.weight(w);
                            }
                            Ok(table_row)
                        })
                        .collect::<Result<Vec<_>, HepError>>()?;
                    maker.push(Table::new(name, rows, processes));
                }
            }
        }
        Ok(maker)
    }

    /// Loads the events, fills every figure and writes the outputs.
    pub fn run(&self) -> Result<Vec<PathBuf>, HepError> {
        let (processes, schema) = self.load_processes()?;
        let ctx = RenderContext::new(&self.output_dir).table_dir(&self.table_dir);
        let mut maker = self.build(&processes, &schema, ctx)?;
        maker.make_plots(self.luminosity, &self.subdir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{FieldKind, MapBaby};
    use crate::plot_opt::{BottomType, StackType};
    use crate::render::RecordingSink;

    const JOB: &str = r##"
luminosity: 41.5
subdir: zg
styles:
  - overrides: { BottomType: ratio, StackType: data_norm }
  - {}
processes:
  - { name: DY, type: background, color: "#ffcc00", files: [dy.parquet] }
  - { name: data, type: data, files: [data.parquet], cut: "nphoton>0" }
figures:
  - kind: hist1d
    x: { var: mllg, nbins: 4, low: 100, high: 180, units: GeV, cut_vals: [120] }
    cut: "mllg>100"
  - kind: hist2d
    x: { var: mllg, edges: [100, 140, 180] }
    y: { var: "photon_pt", nbins: 2, low: 0, high: 100 }
    max_points: 50
  - kind: table
    name: cutflow
    rows:
      - { label: All }
      - { label: Photon, cut: "nphoton>0", lines_after: 1 }
"##;

    fn schema() -> FieldSchema {
        FieldSchema::new()
            .with_field("mllg", FieldKind::Scalar)
            .with_field("nphoton", FieldKind::Scalar)
            .with_field("photon_pt", FieldKind::Vector)
    }

    #[test]
    fn parses_job_file() {
        let job: Job = serde_yaml::from_str(JOB).unwrap();
        assert_eq!(job.luminosity, 41.5);
        assert_eq!(job.output_dir, PathBuf::from("plots"));
        assert_eq!(job.processes[0].kind, ProcessType::Background);
        assert_eq!(job.figures.len(), 3);
        assert!(matches!(job.figures[2], FigureSpec::Table { .. }));

        let options = job.plot_options().unwrap();
        assert_eq!(options.len(), 2);
        assert_eq!(options[0].bottom, BottomType::Ratio);
        assert_eq!(options[0].stack, StackType::DataNorm);
        assert_eq!(options[1].bottom, BottomType::Off);
    }

    #[test]
    fn builds_figures_from_specs() {
        let job: Job = serde_yaml::from_str(JOB).unwrap();
        let events = vec![
            MapBaby::new()
                .with_scalar("mllg", 125.0)
                .with_scalar("nphoton", 1.0)
                .with_vector("photon_pt", vec![30.0])
                .with_scalar("weight", 1.0),
        ];
        let source: Arc<dyn EventSource> = Arc::new(events);
        let processes: Vec<Arc<Process>> = job
            .processes
            .iter()
            .map(|spec| Job::process(spec, Arc::clone(&source), &schema()).unwrap())
            .collect();
        assert_eq!(processes[0].style.color, Rgba::rgb(255, 204, 0));

        let sink = RecordingSink::new();
        let ctx = RenderContext::with_sink(Path::new("plots"), Box::new(sink.clone()))
            .table_dir(&std::env::temp_dir().join(format!("hepplot_job_{}", std::process::id())));
        let maker = job.build(&processes, &schema(), ctx).unwrap();
        assert_eq!(maker.figures.len(), 3);
        assert_eq!(maker.figures[0].name(), "mllg__mllgGT100");
        assert_eq!(maker.figures[1].name(), "photon_pt__mllg");
    }

    #[test]
    fn bad_axis_and_preset_are_errors() {
        let spec = AxisSpec {
            var: "mllg".to_owned(),
            title: None,
            units: String::new(),
            nbins: Some(4),
            low: None,
            high: None,
            edges: None,
            cut_vals: Vec::new(),
            hard_cut_vals: Vec::new(),
        };
        assert!(matches!(spec.build(&schema()), Err(HepError::InvalidAxis(_))));

        let mut job: Job = serde_yaml::from_str(JOB).unwrap();
        job.styles = vec![StyleSpec {
            preset: Some("CMSPaper".to_owned()),
            overrides: BTreeMap::new(),
        }];
        assert!(matches!(job.plot_options(), Err(HepError::Job(_))));
    }
}
