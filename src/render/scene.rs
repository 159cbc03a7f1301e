//! Backend neutral description of one output canvas.
//!
//! Coordinates follow the usual plotting convention: pads and texts are
//! placed in normalized device coordinates (0..1, y pointing up) and
//! drawables live in the data coordinates of their pad.

use super::colormaps::ColorMap;
use super::colors::Rgba;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum LineStyle {
    #[default]
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Margins {
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Text {
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub size: f64,
    pub align: Align,
    pub font: i32,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Marker {
    Fill,
    Line,
    Points,
    Empty,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LegendEntry {
    pub label: String,
    pub marker: Marker,
    pub color: Rgba,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Legend {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub text_size: f64,
    pub entries: Vec<LegendEntry>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Drawable {
    /// Step histogram, optionally filled down to the pad minimum.
    Hist {
        name: String,
        edges: Vec<f64>,
        contents: Vec<f64>,
        fill: Option<Rgba>,
        line: Rgba,
        line_width: f64,
        line_style: LineStyle,
    },
    /// Markers at bin centers with asymmetric vertical error bars.
    Points {
        name: String,
        x: Vec<f64>,
        y: Vec<f64>,
        err_low: Vec<f64>,
        err_high: Vec<f64>,
        color: Rgba,
        marker_size: f64,
    },
    /// Shaded error band between `low` and `high` per bin.
    Band {
        name: String,
        edges: Vec<f64>,
        low: Vec<f64>,
        high: Vec<f64>,
        color: Rgba,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        color: Rgba,
        width: f64,
        style: LineStyle,
    },
    Heatmap {
        name: String,
        x_edges: Vec<f64>,
        y_edges: Vec<f64>,
        /// Row-major, `x_edges.len() - 1` values per row.
        values: Vec<f64>,
        colormap: ColorMap,
        z_range: (f64, f64),
        log_z: bool,
    },
    Scatter {
        name: String,
        points: Vec<ScatterPoint>,
        color: Rgba,
        marker_size: f64,
    },
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pad {
    pub name: String,
    /// Region of the canvas covered by the pad.
    pub x_low: f64,
    pub y_low: f64,
    pub x_high: f64,
    pub y_high: f64,
    pub margins: Margins,
    pub x_range: (f64, f64),
    pub y_range: (f64, f64),
    pub log_y: bool,
    pub x_title: String,
    pub y_title: String,
    pub y_title_offset: f64,
    pub n_divisions: i32,
    pub items: Vec<Drawable>,
    pub legends: Vec<Legend>,
}

impl Pad {
    pub fn new(name: &str, margins: Margins) -> Self {
        Pad {
            name: name.to_owned(),
            x_low: 0.0,
            y_low: 0.0,
            x_high: 1.0,
            y_high: 1.0,
            margins,
            x_range: (0.0, 1.0),
            y_range: (0.0, 1.0),
            log_y: false,
            x_title: String::new(),
            y_title: String::new(),
            y_title_offset: 1.0,
            n_divisions: 606,
            items: Vec::new(),
            legends: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Scene {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub pads: Vec<Pad>,
    pub texts: Vec<Text>,
}
