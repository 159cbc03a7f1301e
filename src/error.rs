use polars::error::PolarsError;
use std::error::Error;
use std::fmt::Display;

#[derive(Debug)]
pub enum HepError {
    File(std::io::Error),
    DataFrame(PolarsError),
    Yaml(serde_yaml::Error),
    Json(serde_json::Error),
    Image(image::ImageError),
    OptionValue { key: String, value: String },
    UnknownEnum { kind: &'static str, value: String },
    InvalidAxis(String),
    Expression(String),
    UnknownField(String),
    EmptyBottomPlot(String),
    Job(String),
}

impl From<std::io::Error> for HepError {
    fn from(err: std::io::Error) -> HepError {
        HepError::File(err)
    }
}

impl From<PolarsError> for HepError {
    fn from(err: PolarsError) -> HepError {
        HepError::DataFrame(err)
    }
}

impl From<serde_yaml::Error> for HepError {
    fn from(err: serde_yaml::Error) -> HepError {
        HepError::Yaml(err)
    }
}

impl From<serde_json::Error> for HepError {
    fn from(err: serde_json::Error) -> Self {
        HepError::Json(err)
    }
}

impl From<image::ImageError> for HepError {
    fn from(err: image::ImageError) -> Self {
        HepError::Image(err)
    }
}

impl Display for HepError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HepError::File(x) => write!(f, "File I/O error: {x}"),
            HepError::DataFrame(x) => write!(f, "Error reading events with polars: {x}"),
            HepError::Yaml(x) => write!(f, "Error parsing yaml: {x}"),
            HepError::Json(x) => write!(f, "Error writing json: {x}"),
            HepError::Image(x) => write!(f, "Error writing image: {x}"),
            HepError::OptionValue { key, value } => {
                write!(f, "Could not parse value '{value}' for plot option {key}")
            }
            HepError::UnknownEnum { kind, value } => {
                write!(f, "Unrecognized {kind} '{value}'")
            }
            HepError::InvalidAxis(x) => write!(f, "Invalid axis: {x}"),
            HepError::Expression(x) => write!(f, "Could not parse expression: {x}"),
            HepError::UnknownField(x) => write!(f, "No event field named '{x}'"),
            HepError::EmptyBottomPlot(x) => {
                write!(f, "No histograms available to draw bottom plot for {x}")
            }
            HepError::Job(x) => write!(f, "Invalid job description: {x}"),
        }
    }
}

impl Error for HepError {}
