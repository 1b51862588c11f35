//! Error handling for link geometry and bus configuration

use std::io;

/// Unified error to report failures while building or loading the arm configuration.
#[derive(Debug)]
pub enum ParameterError {
    IoError(io::Error),
    ParseError(String),
    MissingField(String),
    NonPositiveLength { name: &'static str, value: f64 },
    UnknownEndEffector(String),
    InvalidBusSetting(String),
}

impl std::fmt::Display for ParameterError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            ParameterError::IoError(ref err) =>
                write!(f, "IO Error: {}", err),
            ParameterError::ParseError(ref msg) =>
                write!(f, "Parse Error: {}", msg),
            ParameterError::MissingField(ref field) =>
                write!(f, "Missing Field: {}", field),
            ParameterError::NonPositiveLength { name, value } =>
                write!(f, "Link length {} must be positive and finite, got {}", name, value),
            ParameterError::UnknownEndEffector(ref name) =>
                write!(f, "Unknown end effector '{}', expected 'claw' or 'pump'", name),
            ParameterError::InvalidBusSetting(ref msg) =>
                write!(f, "Invalid bus setting: {}", msg),
        }
    }
}

impl std::error::Error for ParameterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParameterError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParameterError {
    fn from(err: io::Error) -> Self {
        ParameterError::IoError(err)
    }
}
