use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use super::PlotOpt;
use super::types::{BottomType, OptionEnum, OverflowType, StackType, TitleType, YAxisType};
use crate::error::HepError;

static SECTION_RE: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^\[(?P<name>[^\[\]]*)\]$"));

fn number<T: FromStr>(key: &str, value: &str) -> Result<T, HepError> {
    value.parse().map_err(|_| HepError::OptionValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}

fn flag(key: &str, value: &str) -> Result<bool, HepError> {
    match value.to_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => number::<i64>(key, value).map(|v| v != 0),
    }
}

impl PlotOpt {
    /// Loads preset `preset` from an option file on top of the defaults.
    pub fn load(path: &Path, preset: &str) -> Result<Self, HepError> {
        PlotOpt::default().load_options(path, preset)
    }

    pub fn load_options(self, path: &Path, preset: &str) -> Result<Self, HepError> {
        let text = std::fs::read_to_string(path)?;
        log::info!("Loading plot style [{preset}] from {}", path.display());
        self.parse_options(&text, preset)
    }

    /// Applies the `key=value` lines of section `[preset]`.
    ///
    /// Whitespace is ignored everywhere and `#` starts a comment. Unknown keys
    /// and malformed section headers are reported and skipped; values that do
    /// not parse are errors.
    pub fn parse_options(mut self, text: &str, preset: &str) -> Result<Self, HepError> {
        let section_re = SECTION_RE
            .as_ref()
            .map_err(|e| HepError::Expression(e.to_string()))?;

        let mut current: Option<String> = None;
        let mut found = false;
        for (number, raw) in text.lines().enumerate() {
            let line: String = raw
                .split('#')
                .next()
                .unwrap_or_default()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if line.is_empty() {
                continue;
            }

            if line.contains('[') || line.contains(']') {
                if let Some(caps) = section_re.captures(&line) {
                    let name = caps["name"].to_owned();
                    found |= name == preset;
                    current = Some(name);
                } else {
                    log::warn!("Unmatched brace on line {}: '{}'", number + 1, raw.trim());
                }
                continue;
            }

            if current.as_deref() != Some(preset) {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => self.set_property(key, value)?,
                None => log::warn!("Ignoring line {} without '=': '{}'", number + 1, raw.trim()),
            }
        }

        if !found {
            log::warn!("Could not find plot style [{preset}]");
        }
        Ok(self)
    }

    /// Names of every `[section]` in an option file, in order.
    pub fn preset_names(text: &str) -> Vec<String> {
        text.lines()
            .map(|l| l.split('#').next().unwrap_or_default().trim())
            .filter_map(|l| l.strip_prefix('[').and_then(|l| l.strip_suffix(']')))
            .map(|l| l.trim().to_owned())
            .collect()
    }

    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), HepError> {
        match key {
            "BottomType" => self.bottom = BottomType::parse(value)?,
            "YAxisType" => self.y_axis = YAxisType::parse(value)?,
            "TitleType" => self.title = TitleType::parse(value)?,
            "StackType" => self.stack = StackType::parse(value)?,
            "OverflowType" => self.overflow = OverflowType::parse(value)?,
            "FileExtensions" => {
                self.file_extensions.insert(value.to_owned());
            }
            "TitleSize" => self.title_size = number(key, value)?,
            "ExtraLabelSize" => self.extra_label_size = number(key, value)?,
            "LabelSize" => self.label_size = number(key, value)?,
            "xTitleOffset" | "XTitleOffset" => self.x_title_offset = number(key, value)?,
            "yTitleOffset" | "YTitleOffset" => self.y_title_offset = number(key, value)?,
            "zTitleOffset" | "ZTitleOffset" => self.z_title_offset = number(key, value)?,
            "AutoYAxis" => self.auto_y_axis = flag(key, value)?,
            "ErrorOnZeroData" => self.error_on_zero_data = flag(key, value)?,
            "TitleInFrame" => self.title_in_frame = flag(key, value)?,
            "CanvasWidth" | "CanvasW" => self.canvas_width = number(key, value)?,
            "CanvasHeight" | "CanvasH" => self.canvas_height = number(key, value)?,
            "PadLeftMargin" => self.left_margin = number(key, value)?,
            "PadRightMargin" => self.right_margin = number(key, value)?,
            "PadBottomMargin" => self.bottom_margin = number(key, value)?,
            "PadTopMargin" => self.top_margin = number(key, value)?,
            "BottomPlotHeight" => self.bottom_height = number(key, value)?,
            "LegendColumns" => self.legend_columns = number(key, value)?,
            "LegendEntrySize" | "LegendSize" => self.legend_entry_height = number(key, value)?,
            "LegendMaxSize" => self.legend_max_height = number(key, value)?,
            "LegendMarkerWidth" => self.legend_marker_width = number(key, value)?,
            "LegendPad" => self.legend_pad = number(key, value)?,
            "LegendDensity" => self.legend_density = number(key, value)?,
            "LegendLeftPad" => self.legend_left_pad = number(key, value)?,
            "LegendLeftColumnOffset" => self.legend_left_column_offset = number(key, value)?,
            "LogMinimum" => self.log_minimum = number(key, value)?,
            "RatioMinimum" => self.ratio_minimum = number(key, value)?,
            "RatioMaximum" => self.ratio_maximum = number(key, value)?,
            "nDivisions" | "NDivisions" => self.n_divisions = number(key, value)?,
            "nDivisionsBottom" | "NDivisionsBottom" => {
                self.n_divisions_bottom = number(key, value)?;
            }
            "Font" => self.font = number(key, value)?,
            "ShowBackgroundError" => self.show_background_error = flag(key, value)?,
            "UseCMYK" => self.use_cmyk = flag(key, value)?,
            "PrintVals" => self.print_vals = flag(key, value)?,
            _ => log::warn!("Did not understand plot option {key}={value}"),
        }
        Ok(())
    }
}
