use crate::error::HepError;

/// Enumerated plot options. They can be given in option files either as
/// their integer code (position in `VARIANTS`) or by name.
pub trait OptionEnum: Sized + Copy + 'static {
    const KIND: &'static str;
    const VARIANTS: &'static [(Self, &'static str)];

    fn from_code(code: i64) -> Result<Self, HepError> {
        usize::try_from(code)
            .ok()
            .and_then(|i| Self::VARIANTS.get(i))
            .map(|(v, _)| *v)
            .ok_or(HepError::UnknownEnum {
                kind: Self::KIND,
                value: code.to_string(),
            })
    }

    fn parse(text: &str) -> Result<Self, HepError> {
        if let Ok(code) = text.parse::<i64>() {
            return Self::from_code(code);
        }
        let lowered = text.to_lowercase();
        Self::VARIANTS
            .iter()
            .find(|(_, name)| *name == lowered)
            .map(|(v, _)| *v)
            .ok_or(HepError::UnknownEnum {
                kind: Self::KIND,
                value: text.to_owned(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BottomType {
    #[default]
    Off,
    Ratio,
    Diff,
    Sorb,
    SorbCutUpper,
}

impl OptionEnum for BottomType {
    const KIND: &'static str = "bottom plot type";
    const VARIANTS: &'static [(Self, &'static str)] = &[
        (BottomType::Off, "off"),
        (BottomType::Ratio, "ratio"),
        (BottomType::Diff, "diff"),
        (BottomType::Sorb, "sorb"),
        (BottomType::SorbCutUpper, "sorb_cut_upper"),
    ];
}

impl BottomType {
    pub fn is_sorb(self) -> bool {
        matches!(self, BottomType::Sorb | BottomType::SorbCutUpper)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YAxisType {
    #[default]
    Linear,
    Log,
}

impl OptionEnum for YAxisType {
    const KIND: &'static str = "y axis type";
    const VARIANTS: &'static [(Self, &'static str)] =
        &[(YAxisType::Linear, "linear"), (YAxisType::Log, "log")];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleType {
    #[default]
    Info,
    Preliminary,
    Simulation,
    SimulationPreliminary,
    SimulationSupplementary,
    Supplementary,
    Data,
}

impl OptionEnum for TitleType {
    const KIND: &'static str = "title type";
    const VARIANTS: &'static [(Self, &'static str)] = &[
        (TitleType::Info, "info"),
        (TitleType::Preliminary, "preliminary"),
        (TitleType::Simulation, "simulation"),
        (TitleType::SimulationPreliminary, "simulation_preliminary"),
        (TitleType::SimulationSupplementary, "simulation_supplementary"),
        (TitleType::Supplementary, "supplementary"),
        (TitleType::Data, "data"),
    ];
}

impl TitleType {
    /// Text shown after the experiment name.
    pub fn extra_label(self) -> &'static str {
        match self {
            TitleType::Info | TitleType::Data => "",
            TitleType::Preliminary => "Preliminary",
            TitleType::Simulation => "Simulation",
            TitleType::SimulationPreliminary => "Simulation Preliminary",
            TitleType::SimulationSupplementary => "Simulation Supplementary",
            TitleType::Supplementary => "Supplementary",
        }
    }

    pub fn is_simulation(self) -> bool {
        matches!(
            self,
            TitleType::Simulation
                | TitleType::SimulationPreliminary
                | TitleType::SimulationSupplementary
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StackType {
    #[default]
    SignalOverlay,
    SignalOnTop,
    DataNorm,
    LumiShapes,
    Shapes,
}

impl OptionEnum for StackType {
    const KIND: &'static str = "stack type";
    const VARIANTS: &'static [(Self, &'static str)] = &[
        (StackType::SignalOverlay, "signal_overlay"),
        (StackType::SignalOnTop, "signal_on_top"),
        (StackType::DataNorm, "data_norm"),
        (StackType::LumiShapes, "lumi_shapes"),
        (StackType::Shapes, "shapes"),
    ];
}

impl StackType {
    pub fn is_shapes(self) -> bool {
        matches!(self, StackType::LumiShapes | StackType::Shapes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowType {
    None,
    Underflow,
    Overflow,
    #[default]
    Both,
}

impl OptionEnum for OverflowType {
    const KIND: &'static str = "overflow type";
    const VARIANTS: &'static [(Self, &'static str)] = &[
        (OverflowType::None, "none"),
        (OverflowType::Underflow, "underflow"),
        (OverflowType::Overflow, "overflow"),
        (OverflowType::Both, "both"),
    ];
}

impl OverflowType {
    pub fn merges_underflow(self) -> bool {
        matches!(self, OverflowType::Underflow | OverflowType::Both)
    }

    pub fn merges_overflow(self) -> bool {
        matches!(self, OverflowType::Overflow | OverflowType::Both)
    }
}
