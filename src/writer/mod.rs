//! Output format abstraction layer
//!
//! Writers consume the renderer-agnostic [`Figure`] description and produce
//! a textual artifact. The engine never calls a rendering backend directly.

use crate::plot::Figure;
use crate::{DbplotError, Result};

pub mod json;

#[cfg(feature = "plotters")]
pub mod svg;

pub use json::JsonWriter;

#[cfg(feature = "plotters")]
pub use svg::SvgWriter;

/// Trait for figure writers.
pub trait Writer {
    /// Render a figure to its output format.
    fn write(&self, figure: &Figure) -> Result<String>;

    /// Conventional file extension for the format.
    fn extension(&self) -> &'static str;
}

/// Instantiate a writer by name.
pub fn open(name: &str) -> Result<Box<dyn Writer>> {
    match name {
        "json" => Ok(Box::new(JsonWriter)),
        "svg" => {
            #[cfg(feature = "plotters")]
            {
                return Ok(Box::new(SvgWriter::default()));
            }
            #[cfg(not(feature = "plotters"))]
            Err(DbplotError::Writer(
                "svg writer not compiled in; rebuild with --features plotters".to_string(),
            ))
        }
        other => Err(DbplotError::Writer(format!(
            "unknown writer '{}'; available: json, svg",
            other
        ))),
    }
}
