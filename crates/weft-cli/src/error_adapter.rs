//! Error adapter for converting [`WeftError`] to miette diagnostics.
//!
//! This module provides the bridge between the library's standard error types
//! and miette's rich diagnostic formatting used in the CLI.

use std::fmt;

use miette::{Diagnostic as MietteDiagnostic, LabeledSpan};

use weft::{DiagramError, WeftError};

/// Adapter giving a [`WeftError`] a diagnostic code and, where one helps, a hint.
pub struct ErrorAdapter<'a>(pub &'a WeftError);

impl fmt::Debug for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.0, f)
    }
}

impl fmt::Display for ErrorAdapter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::error::Error for ErrorAdapter<'_> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.0.source()
    }
}

impl MietteDiagnostic for ErrorAdapter<'_> {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match &self.0 {
            WeftError::Io(_) => "weft::io",
            WeftError::Diagram(_) => "weft::diagram",
            WeftError::Config(_) => "weft::config",
            WeftError::Input(_) => "weft::input",
            WeftError::Export(_) => "weft::export",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let help = match &self.0 {
            WeftError::Diagram(DiagramError::NoPort { .. }) => {
                "port indexes start at 0; check the block kind or its declared ports"
            }
            WeftError::Diagram(DiagramError::IncompatiblePorts { .. }) => {
                "wires run from an output port to an input port of another block"
            }
            WeftError::Config(_) => "colors accept CSS names and hex values such as \"#1e90ff\"",
            _ => return None,
        };
        Some(Box::new(help))
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        None
    }
}

/// Convert a [`WeftError`] into a reportable diagnostic.
pub fn to_reportable(err: &WeftError) -> ErrorAdapter<'_> {
    ErrorAdapter(err)
}
