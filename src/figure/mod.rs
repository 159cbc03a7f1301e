//! Figures own one component per process and turn the filled components
//! into printed output.

pub mod fill;
pub mod hist1d;
pub mod hist2d;
pub mod table;

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::HepError;
use crate::event::Baby;
use crate::process::{Process, ProcessType};
use crate::render::RenderContext;

pub use hist1d::{Hist1D, SingleHist1D};
pub use hist2d::{Hist2D, SingleHist2D};
pub use table::{Table, TableRow};

/// Per process accumulator owned by a figure.
pub trait FigureComponent: Send {
    fn process(&self) -> &Arc<Process>;

    /// Feeds one event into the raw accumulator.
    fn record_event(&mut self, baby: &dyn Baby);
}

pub trait Figure: Send {
    fn name(&self) -> String;

    /// Processes with a component in this figure.
    fn processes(&self) -> Vec<Arc<Process>>;

    fn component_mut(&mut self, process: &Arc<Process>) -> Option<&mut dyn FigureComponent>;

    /// Every component, each borrowed once.
    fn components_mut(&mut self) -> Vec<&mut dyn FigureComponent>;

    /// Writes the figure once per configured style and returns the files
    /// written.
    fn print(
        &mut self,
        luminosity: f64,
        subdir: &str,
        ctx: &RenderContext,
    ) -> Result<Vec<PathBuf>, HepError>;
}

/// Components split by process type. Order inside each group follows the
/// order processes were given in.
#[derive(Debug, Clone)]
pub struct ComponentGroups<T> {
    pub backgrounds: Vec<T>,
    pub signals: Vec<T>,
    pub datas: Vec<T>,
}

impl<T> Default for ComponentGroups<T> {
    fn default() -> Self {
        ComponentGroups {
            backgrounds: Vec::new(),
            signals: Vec::new(),
            datas: Vec::new(),
        }
    }
}

impl<T: FigureComponent> ComponentGroups<T> {
    pub fn build(processes: &[Arc<Process>], mut make: impl FnMut(&Arc<Process>) -> T) -> Self {
        let mut groups = ComponentGroups::default();
        for process in processes {
            groups.group_mut(process.kind).push(make(process));
        }
        groups
    }

    pub fn group(&self, kind: ProcessType) -> &[T] {
        match kind {
            ProcessType::Background => &self.backgrounds,
            ProcessType::Signal => &self.signals,
            ProcessType::Data => &self.datas,
        }
    }

    pub fn group_mut(&mut self, kind: ProcessType) -> &mut Vec<T> {
        match kind {
            ProcessType::Background => &mut self.backgrounds,
            ProcessType::Signal => &mut self.signals,
            ProcessType::Data => &mut self.datas,
        }
    }

    /// Backgrounds, then signals, then data.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.backgrounds.iter().chain(&self.signals).chain(&self.datas)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.backgrounds
            .iter_mut()
            .chain(&mut self.signals)
            .chain(&mut self.datas)
    }

    pub fn len(&self) -> usize {
        self.backgrounds.len() + self.signals.len() + self.datas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn processes(&self) -> Vec<Arc<Process>> {
        self.iter().map(|c| Arc::clone(c.process())).collect()
    }

    pub fn find_mut(&mut self, process: &Arc<Process>) -> Option<&mut T> {
        self.group_mut(process.kind)
            .iter_mut()
            .find(|c| Arc::ptr_eq(c.process(), process))
    }
}
