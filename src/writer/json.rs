//! JSON writer
//!
//! Serializes the figure description as-is. This is the stable machine
//! boundary for downstream renderers and for tests.

use crate::plot::Figure;
use crate::{DbplotError, Result};

pub struct JsonWriter;

impl super::Writer for JsonWriter {
    fn write(&self, figure: &Figure) -> Result<String> {
        serde_json::to_string_pretty(figure).map_err(|e| DbplotError::Writer(e.to_string()))
    }

    fn extension(&self) -> &'static str {
        "json"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plot::{Bar, Mark, SeriesDesc};
    use crate::writer::Writer;

    #[test]
    fn test_round_trips_through_serde_json() {
        let mut figure = Figure::new("title", "x", "y");
        figure.series.push(SeriesDesc {
            label: "Fe".to_string(),
            style: crate::style::resolve("Fe"),
            mark: Mark::Bars {
                bars: vec![Bar {
                    x: 0.0,
                    width: 1.0,
                    height: 2.5,
                    multiplicity: 3,
                }],
            },
        });
        figure.build_legend();

        let out = JsonWriter.write(&figure).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["title"], "title");
        assert_eq!(parsed["series"][0]["label"], "Fe");
        assert_eq!(parsed["series"][0]["style"]["color"], "darkred");
        assert_eq!(parsed["series"][0]["mark"]["kind"], "bars");
        assert_eq!(parsed["series"][0]["mark"]["bars"][0]["height"], 2.5);
        assert_eq!(parsed["legend"][0]["label"], "Fe");
    }
}
