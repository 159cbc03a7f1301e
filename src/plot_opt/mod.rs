//! Rendering, layout and normalization options for one output style.
//!
//! A [`PlotOpt`] is a plain value: derive variants with struct update syntax
//! (`PlotOpt { stack: StackType::Shapes, ..base.clone() }`) or the consuming
//! builders below. Figures print once per option set they are given.

pub mod layout;
pub mod loader;
pub mod types;

use std::collections::BTreeSet;

pub use layout::legend_index;
pub use types::{BottomType, OptionEnum, OverflowType, StackType, TitleType, YAxisType};

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PlotOpt {
    pub bottom: BottomType,
    pub y_axis: YAxisType,
    pub title: TitleType,
    pub stack: StackType,
    pub overflow: OverflowType,
    pub file_extensions: BTreeSet<String>,

    pub title_size: f64,
    pub extra_label_size: f64,
    pub label_size: f64,
    pub x_title_offset: f64,
    pub y_title_offset: f64,
    pub z_title_offset: f64,
    pub auto_y_axis: bool,
    pub error_on_zero_data: bool,
    pub title_in_frame: bool,

    pub canvas_width: u32,
    pub canvas_height: u32,
    pub left_margin: f64,
    pub right_margin: f64,
    pub bottom_margin: f64,
    pub top_margin: f64,
    pub bottom_height: f64,

    pub legend_columns: usize,
    pub legend_entry_height: f64,
    pub legend_max_height: f64,
    pub legend_marker_width: f64,
    pub legend_pad: f64,
    pub legend_density: f64,
    pub legend_left_pad: f64,
    pub legend_left_column_offset: f64,

    pub log_minimum: f64,
    pub ratio_minimum: f64,
    pub ratio_maximum: f64,
    pub n_divisions: i32,
    pub n_divisions_bottom: i32,
    pub font: i32,
    pub show_background_error: bool,
    pub use_cmyk: bool,
    pub print_vals: bool,
}

impl Default for PlotOpt {
    fn default() -> Self {
        PlotOpt {
            bottom: BottomType::Off,
            y_axis: YAxisType::Linear,
            title: TitleType::Info,
            stack: StackType::SignalOverlay,
            overflow: OverflowType::Both,
            file_extensions: BTreeSet::from(["png".to_owned()]),
            title_size: 0.045,
            extra_label_size: 0.045,
            label_size: 0.04,
            x_title_offset: 1.0,
            y_title_offset: 2.2,
            z_title_offset: 1.0,
            auto_y_axis: true,
            error_on_zero_data: false,
            title_in_frame: false,
            canvas_width: 600,
            canvas_height: 600,
            left_margin: 0.19,
            right_margin: 0.055,
            bottom_margin: 0.12,
            top_margin: 0.07,
            bottom_height: 0.33,
            legend_columns: 2,
            legend_entry_height: 0.038,
            legend_max_height: 0.28,
            legend_marker_width: 0.12,
            legend_pad: 0.028,
            legend_density: 1.0,
            legend_left_pad: 0.0,
            legend_left_column_offset: 0.0,
            log_minimum: 0.0,
            ratio_minimum: 0.1,
            ratio_maximum: 1.9,
            n_divisions: 606,
            n_divisions_bottom: 606,
            font: 42,
            show_background_error: true,
            use_cmyk: true,
            print_vals: false,
        }
    }
}

impl PlotOpt {
    pub fn bottom(mut self, bottom: BottomType) -> Self {
        self.bottom = bottom;
        self
    }

    pub fn y_axis(mut self, y_axis: YAxisType) -> Self {
        self.y_axis = y_axis;
        self
    }

    pub fn title(mut self, title: TitleType) -> Self {
        self.title = title;
        self
    }

    pub fn stack(mut self, stack: StackType) -> Self {
        self.stack = stack;
        self
    }

    pub fn overflow(mut self, overflow: OverflowType) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn file_extension(mut self, extension: &str) -> Self {
        self.file_extensions.insert(extension.to_owned());
        self
    }

    pub fn file_extensions<I: IntoIterator<Item = String>>(mut self, extensions: I) -> Self {
        self.file_extensions = extensions.into_iter().collect();
        self
    }

    pub fn canvas_size(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    pub fn legend_columns(mut self, columns: usize) -> Self {
        self.legend_columns = columns;
        self
    }

    pub fn print_vals(mut self, print_vals: bool) -> Self {
        self.print_vals = print_vals;
        self
    }

    pub fn error_on_zero_data(mut self, error_on_zero_data: bool) -> Self {
        self.error_on_zero_data = error_on_zero_data;
        self
    }

    pub fn show_background_error(mut self, show: bool) -> Self {
        self.show_background_error = show;
        self
    }

    pub fn backgrounds_stacked(&self) -> bool {
        matches!(
            self.stack,
            StackType::SignalOverlay | StackType::SignalOnTop | StackType::DataNorm
        )
    }

    pub fn display_lumi_entry(&self) -> bool {
        self.title == TitleType::Info && self.backgrounds_stacked()
    }

    /// Resolves option combinations that cannot be drawn.
    pub fn make_sane(mut self) -> Self {
        if !self.backgrounds_stacked() {
            self.show_background_error = false;
        }
        if self.legend_columns == 0 {
            self.legend_columns = 1;
        }
        self
    }

    /// Short tag describing stacking and y axis, used in file names.
    pub fn type_string(&self) -> String {
        let stack = match self.stack {
            StackType::SignalOverlay => "lumi_nonorm",
            StackType::SignalOnTop => "sigontop",
            StackType::DataNorm => "lumi",
            StackType::LumiShapes => "lumi_shapes",
            StackType::Shapes => "shapes",
        };
        let axis = match self.y_axis {
            YAxisType::Linear => "lin",
            YAxisType::Log => "log",
        };
        format!("{stack}_{axis}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn functional_update_leaves_original() {
        let base = PlotOpt::default();
        let log = PlotOpt {
            y_axis: YAxisType::Log,
            ..base.clone()
        };
        let shapes = base.clone().stack(StackType::Shapes).bottom(BottomType::Ratio);
        assert_eq!(base.y_axis, YAxisType::Linear);
        assert_eq!(log.y_axis, YAxisType::Log);
        assert_eq!(shapes.stack, StackType::Shapes);
        assert_eq!(base.stack, StackType::SignalOverlay);
    }

    #[test]
    fn stacking_modes() {
        let opt = PlotOpt::default();
        assert!(opt.backgrounds_stacked());
        assert!(opt.display_lumi_entry());
        let shapes = opt.clone().stack(StackType::LumiShapes);
        assert!(!shapes.backgrounds_stacked());
        assert!(!shapes.clone().make_sane().show_background_error);
        assert!(!opt.title(TitleType::Preliminary).display_lumi_entry());
    }

    #[test]
    fn type_strings() {
        let opt = PlotOpt::default().stack(StackType::DataNorm).y_axis(YAxisType::Log);
        assert_eq!(opt.type_string(), "lumi_log");
        assert_eq!(PlotOpt::default().type_string(), "lumi_nonorm_lin");
    }
}
