use std::fmt;
use std::sync::Arc;

use crate::error::HepError;
use crate::event::{EventSource, NamedFunc};
use crate::render::colors::Rgba;
use crate::render::scene::LineStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessType {
    Background,
    Signal,
    Data,
}

impl std::str::FromStr for ProcessType {
    type Err = HepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "background" | "bkg" => Ok(ProcessType::Background),
            "signal" | "sig" => Ok(ProcessType::Signal),
            "data" => Ok(ProcessType::Data),
            _ => Err(HepError::UnknownEnum {
                kind: "process type",
                value: s.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProcessStyle {
    pub color: Rgba,
    pub fill: bool,
    pub line_width: f64,
    pub line_style: LineStyle,
    pub marker_size: f64,
}

impl ProcessStyle {
    // Backgrounds are filled, signals are thick lines, data are markers.
    pub fn for_type(kind: ProcessType, color: Rgba) -> Self {
        match kind {
            ProcessType::Background => ProcessStyle {
                color,
                fill: true,
                line_width: 0.0,
                line_style: LineStyle::Solid,
                marker_size: 0.0,
            },
            ProcessType::Signal => ProcessStyle {
                color,
                fill: false,
                line_width: 5.0,
                line_style: LineStyle::Solid,
                marker_size: 0.0,
            },
            ProcessType::Data => ProcessStyle {
                color,
                fill: false,
                line_width: 2.0,
                line_style: LineStyle::Solid,
                marker_size: 1.2,
            },
        }
    }
}

/// A named sample of events with a fixed role in every figure.
pub struct Process {
    pub name: String,
    pub kind: ProcessType,
    pub style: ProcessStyle,
    pub cut: NamedFunc,
    source: Arc<dyn EventSource>,
}

impl Process {
    pub fn new(
        name: &str,
        kind: ProcessType,
        color: Rgba,
        source: Arc<dyn EventSource>,
        cut: NamedFunc,
    ) -> Arc<Self> {
        Arc::new(Process {
            name: name.to_owned(),
            kind,
            style: ProcessStyle::for_type(kind, color),
            cut,
            source,
        })
    }

    pub fn with_style(
        name: &str,
        kind: ProcessType,
        style: ProcessStyle,
        source: Arc<dyn EventSource>,
        cut: NamedFunc,
    ) -> Arc<Self> {
        Arc::new(Process {
            name: name.to_owned(),
            kind,
            style,
            cut,
            source,
        })
    }

    pub fn source(&self) -> &dyn EventSource {
        self.source.as_ref()
    }
}

impl fmt::Debug for Process {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Process")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("cut", &self.cut.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MapBaby;

    #[test]
    fn process_types_parse() {
        assert_eq!("bkg".parse::<ProcessType>().unwrap(), ProcessType::Background);
        assert_eq!("Signal".parse::<ProcessType>().unwrap(), ProcessType::Signal);
        assert!("mc".parse::<ProcessType>().is_err());
    }

    #[test]
    fn source_is_replayed() {
        let events: Vec<MapBaby> = vec![MapBaby::new(), MapBaby::new()];
        let proc = Process::new(
            "ttbar",
            ProcessType::Background,
            Rgba::rgb(86, 180, 233),
            Arc::new(events),
            NamedFunc::default(),
        );
        let n = proc.source().for_each_event(&mut |_| {}).unwrap();
        assert_eq!(n, 2);
        assert!(proc.style.fill);
    }
}
