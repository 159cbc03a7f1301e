//! Cutflow tables: weighted yields per selection row and process, written as
//! LaTeX.

use std::path::PathBuf;
use std::sync::Arc;

use super::fill::fill_event;
use super::{ComponentGroups, Figure, FigureComponent};
use crate::error::HepError;
use crate::event::{Baby, NamedFunc};
use crate::process::{Process, ProcessType};
use crate::render::RenderContext;

/// Escapes LaTeX special characters. Balanced `$...$` spans are kept as
/// math.
pub fn escape_latex(text: &str) -> String {
    let keep_math = text.matches('$').count() % 2 == 0;
    let mut out = String::with_capacity(text.len());
    let mut in_math = false;
    for c in text.chars() {
        if c == '$' && keep_math {
            in_math = !in_math;
            out.push(c);
            continue;
        }
        if in_math {
            out.push(c);
            continue;
        }
        match c {
            '\\' => out.push_str("\\textbackslash{}"),
            '~' => out.push_str("\\textasciitilde{}"),
            '^' => out.push_str("\\textasciicircum{}"),
            '&' | '%' | '$' | '#' | '_' | '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct TableRow {
    pub label: String,
    pub cut: NamedFunc,
    pub weight: NamedFunc,
    /// Horizontal rules drawn above the row.
    pub lines_before: usize,
    /// Horizontal rules drawn below the row.
    pub lines_after: usize,
}

impl TableRow {
    pub fn new(label: &str, cut: NamedFunc) -> Self {
        TableRow {
            label: label.to_owned(),
            cut,
            weight: NamedFunc::scalar_field("weight"),
            lines_before: 0,
            lines_after: 0,
        }
    }

    pub fn weight(mut self, weight: NamedFunc) -> Self {
        self.weight = weight;
        self
    }

    pub fn lines(mut self, before: usize, after: usize) -> Self {
        self.lines_before = before;
        self.lines_after = after;
        self
    }
}

/// Sum of weights and of squared weights per row for one process.
#[derive(Debug, Clone)]
pub struct TableColumn {
    process: Arc<Process>,
    cuts: Vec<(NamedFunc, NamedFunc)>,
    pub sumw: Vec<f64>,
    pub sumw2: Vec<f64>,
}

impl TableColumn {
    fn new(process: &Arc<Process>, rows: &[TableRow]) -> Self {
        TableColumn {
            process: Arc::clone(process),
            cuts: rows
                .iter()
                .map(|row| (row.cut.and(&process.cut), row.weight.clone()))
                .collect(),
            sumw: vec![0.0; rows.len()],
            sumw2: vec![0.0; rows.len()],
        }
    }

    /// Yield and its uncertainty for `row`, scaled by `factor`.
    pub fn yield_at(&self, row: usize, factor: f64) -> (f64, f64) {
        (self.sumw[row] * factor, self.sumw2[row].sqrt() * factor)
    }
}

impl FigureComponent for TableColumn {
    fn process(&self) -> &Arc<Process> {
        &self.process
    }

    fn record_event(&mut self, baby: &dyn Baby) {
        for (row, (cut, weight)) in self.cuts.iter().enumerate() {
            let (sumw, sumw2) = (&mut self.sumw[row], &mut self.sumw2[row]);
            fill_event(cut, weight, &[], baby, |_, w| {
                *sumw += w;
                *sumw2 += w * w;
            });
        }
    }
}

#[derive(Debug)]
pub struct Table {
    name: String,
    pub rows: Vec<TableRow>,
    pub components: ComponentGroups<TableColumn>,
}

impl Table {
    pub fn new(name: &str, rows: Vec<TableRow>, processes: &[Arc<Process>]) -> Self {
        let components = ComponentGroups::build(processes, |p| TableColumn::new(p, &rows));
        Table {
            name: name.to_owned(),
            rows,
            components,
        }
    }

    /// Yields of one process type for `row`, unscaled.
    pub fn raw_yields(&self, kind: ProcessType, row: usize) -> Vec<f64> {
        self.components
            .group(kind)
            .iter()
            .map(|c| c.sumw[row])
            .collect()
    }

    /// Total background yield and uncertainty for `row`.
    pub fn background_total(&self, row: usize, luminosity: f64) -> (f64, f64) {
        let (sum, var) = self
            .components
            .backgrounds
            .iter()
            .map(|c| c.yield_at(row, luminosity))
            .fold((0.0, 0.0), |(s, v), (y, e)| (s + y, v + e * e));
        (sum, var.sqrt())
    }

    fn header(&self) -> String {
        let name = |c: &TableColumn| escape_latex(&c.process.name);
        let mut columns = vec!["Cut".to_owned()];
        columns.extend(self.components.backgrounds.iter().map(name));
        if !self.components.backgrounds.is_empty() {
            columns.push("SM bkg.".to_owned());
        }
        columns.extend(self.components.signals.iter().map(name));
        columns.extend(self.components.datas.iter().map(name));
        columns.join(" & ")
    }

    pub fn to_latex(&self, luminosity: f64) -> String {
        let mc = |(y, e): (f64, f64)| format!("${y:.2}\\pm{e:.2}$");
        let n_columns = self.components.len() + usize::from(!self.components.backgrounds.is_empty());

        let mut out = String::new();
        out.push_str("\\documentclass[10pt,landscape]{article}\n");
        out.push_str("\\usepackage{amsmath}\n");
        out.push_str("\\usepackage[margin=0.5in]{geometry}\n\n");
        out.push_str("\\begin{document}\n\\begin{table}\n\\centering\n");
        out.push_str(&format!("\\begin{{tabular}}{{l{}}}\n", "r".repeat(n_columns)));
        out.push_str("\\hline\\hline\n");
        out.push_str(&format!("{} \\\\\n", self.header()));
        out.push_str("\\hline\n");

        for (i, row) in self.rows.iter().enumerate() {
            out.push_str(&"\\hline\n".repeat(row.lines_before));
            let mut cells = vec![escape_latex(&row.label)];
            cells.extend(
                self.components
                    .backgrounds
                    .iter()
                    .map(|c| mc(c.yield_at(i, luminosity))),
            );
            if !self.components.backgrounds.is_empty() {
                cells.push(mc(self.background_total(i, luminosity)));
            }
            cells.extend(
                self.components
                    .signals
                    .iter()
                    .map(|c| mc(c.yield_at(i, luminosity))),
            );
            cells.extend(
                self.components
                    .datas
                    .iter()
                    .map(|c| format!("{:.0}", c.yield_at(i, 1.0).0)),
            );
            out.push_str(&format!("{} \\\\\n", cells.join(" & ")));
            out.push_str(&"\\hline\n".repeat(row.lines_after));
        }

        out.push_str("\\hline\\hline\n\\end{tabular}\n\\end{table}\n\\end{document}\n");
        out
    }
}

impl Figure for Table {
    fn name(&self) -> String {
        self.name.clone()
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
        let mut path = ctx.table_dir.clone();
        if !subdir.is_empty() {
            path.push(subdir);
        }
        std::fs::create_dir_all(&path)?;
        path.push(format!("{}.tex", self.name));
        std::fs::write(&path, self.to_latex(luminosity))?;
        log::info!("open {}", path.display());
        Ok(vec![path])
    }
}
