//! Deterministic label → style resolution
//!
//! Associates every legend label with a consistent (line pattern, color,
//! marker) triple. Resolution is a pure function: exact table hit first, then
//! a retry with the label stripped to its leading segment, then a
//! deterministic pseudo-index into the table. No randomness, no cache, so
//! identical labels render identically within and across runs.

use serde::Serialize;

/// Line pattern for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinePattern {
    Solid,
    Dashed,
    Dotted,
    DashDot,
}

/// Point marker for a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Circle,
    X,
    Plus,
    Star,
}

/// Visual style of one series. Colors are CSS color names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Style {
    pub pattern: LinePattern,
    pub color: &'static str,
    pub marker: Marker,
}

impl Style {
    const fn new(pattern: LinePattern, color: &'static str, marker: Marker) -> Self {
        Style {
            pattern,
            color,
            marker,
        }
    }

    /// RGB components of the style's color.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match csscolorparser::parse(self.color) {
            Ok(c) => {
                let [r, g, b, _] = c.to_rgba8();
                (r, g, b)
            }
            Err(_) => (0, 0, 0),
        }
    }
}

use LinePattern::{DashDot, Dashed, Dotted, Solid};
use Marker::{Circle, Plus, Star, X};

/// Fixed style table: chemical element symbols, small molecules, functionals,
/// job kinds, crystal structures, pseudopotential families.
#[rustfmt::skip]
static STYLE_TABLE: &[(&str, Style)] = &[
    ("H", Style::new(Solid, "black", Circle)),
    ("Li", Style::new(Solid, "purple", Circle)),
    ("Be", Style::new(Solid, "mediumaquamarine", Circle)),
    ("B", Style::new(Solid, "pink", Circle)),
    ("C", Style::new(Dashed, "grey", Circle)),
    ("N", Style::new(Solid, "blue", Circle)),
    ("O", Style::new(Solid, "red", Circle)),
    ("F", Style::new(Dotted, "forestgreen", Circle)),
    ("Na", Style::new(Dotted, "purple", Circle)),
    ("Mg", Style::new(Solid, "lightcoral", X)),
    ("Al", Style::new(Solid, "firebrick", Circle)),
    ("Si", Style::new(Solid, "palevioletred", Circle)),
    ("P", Style::new(Solid, "orange", Circle)),
    ("S", Style::new(Solid, "red", X)),
    ("Cl", Style::new(DashDot, "green", Circle)),
    ("K", Style::new(Solid, "purple", Star)),
    ("Ca", Style::new(Solid, "lightsalmon", Circle)),
    ("Sc", Style::new(Dotted, "grey", Circle)),
    ("Ti", Style::new(Solid, "grey", Plus)),
    ("V", Style::new(Dotted, "blue", Circle)),
    ("Cr", Style::new(Solid, "cyan", Circle)),
    ("Mn", Style::new(DashDot, "purple", X)),
    ("Fe", Style::new(Solid, "darkred", Circle)),
    ("Co", Style::new(Solid, "pink", X)),
    ("Ni", Style::new(Dashed, "green", Circle)),
    ("Cu", Style::new(Dotted, "brown", Circle)),
    ("Zn", Style::new(Solid, "indigo", X)),
    ("Ga", Style::new(Solid, "pink", Circle)),
    ("Ge", Style::new(Dashed, "lightblue", Circle)),
    ("As", Style::new(Solid, "fuchsia", Plus)),
    ("Se", Style::new(Solid, "turquoise", Circle)),
    ("Br", Style::new(Solid, "azure", Circle)),
    ("Rb", Style::new(Solid, "black", Circle)),
    ("Sr", Style::new(Solid, "olive", Circle)),
    ("Y", Style::new(Solid, "plum", Circle)),
    ("Zr", Style::new(Solid, "palevioletred", Circle)),
    ("Nb", Style::new(Solid, "aqua", Circle)),
    ("Mo", Style::new(Solid, "khaki", Circle)),
    ("Tc", Style::new(Solid, "green", Circle)),
    ("Ru", Style::new(Solid, "lime", Circle)),
    ("Rh", Style::new(Solid, "teal", Circle)),
    ("Pd", Style::new(Solid, "grey", Circle)),
    ("Ag", Style::new(Solid, "silver", Circle)),
    ("Cd", Style::new(Solid, "purple", Circle)),
    ("In", Style::new(Solid, "blue", Circle)),
    ("Sn", Style::new(DashDot, "green", Circle)),
    ("Sb", Style::new(Solid, "red", Circle)),
    ("Te", Style::new(Solid, "plum", Circle)),
    ("I", Style::new(Solid, "red", Circle)),
    ("Cs", Style::new(Solid, "orange", Circle)),
    ("Ba", Style::new(Solid, "tan", Circle)),
    ("Os", Style::new(Solid, "pink", Circle)),
    ("Ir", Style::new(Solid, "green", Circle)),
    ("Pt", Style::new(Solid, "blue", Circle)),
    ("Au", Style::new(Solid, "gold", Circle)),
    ("Pb", Style::new(Dotted, "brown", Circle)),
    ("H2", Style::new(Solid, "black", Circle)),
    ("O2", Style::new(Solid, "red", Circle)),
    ("N2", Style::new(Solid, "green", Circle)),
    ("F2", Style::new(Solid, "purple", Circle)),
    ("Br2", Style::new(Solid, "brown", Circle)),
    ("CH4", Style::new(Solid, "blue", Circle)),
    ("Cl2", Style::new(Solid, "pink", Circle)),
    ("H2O", Style::new(Dotted, "blue", X)),
    ("CO2", Style::new(Dotted, "brown", X)),
    ("CO", Style::new(Dotted, "red", X)),
    ("mBEEF", Style::new(Solid, "black", Circle)),
    ("PBE", Style::new(Solid, "red", Circle)),
    ("BEEF", Style::new(Solid, "blue", Circle)),
    ("RPBE", Style::new(Solid, "green", Circle)),
    ("bulkmod", Style::new(Solid, "red", Circle)),
    ("relax", Style::new(Solid, "blue", Circle)),
    ("latticeopt", Style::new(Solid, "black", Circle)),
    ("vib", Style::new(Solid, "green", Circle)),
    ("vcrelax", Style::new(Solid, "purple", Circle)),
    ("hexagonal", Style::new(Solid, "black", Circle)),
    ("fcc", Style::new(Solid, "red", Circle)),
    ("bcc", Style::new(Solid, "blue", Circle)),
    ("diamond", Style::new(Solid, "green", Circle)),
    ("sg15", Style::new(Solid, "black", Circle)),
    ("paw", Style::new(Solid, "red", Circle)),
    ("gbrv15pbe", Style::new(Solid, "blue", Circle)),
    ("H_PBE", Style::new(Solid, "black", Circle)),
    ("H_LDA", Style::new(Dotted, "black", Circle)),
    ("O_PBE", Style::new(Solid, "red", Circle)),
    ("O_LDA", Style::new(Dotted, "red", Circle)),
    ("N_PBE", Style::new(Solid, "blue", Circle)),
    ("N_LDA", Style::new(Dotted, "blue", Circle)),
    ("", Style::new(Solid, "red", Circle)),
];

fn table_get(key: &str) -> Option<Style> {
    STYLE_TABLE
        .iter()
        .find(|(label, _)| *label == key)
        .map(|(_, style)| *style)
}

/// Sum of the unique character codes of a label.
fn label_code(label: &str) -> usize {
    let mut seen: Vec<char> = Vec::new();
    let mut total = 0usize;
    for ch in label.chars() {
        if !seen.contains(&ch) {
            seen.push(ch);
            total += ch as usize;
        }
    }
    total
}

/// Resolve a legend label to a consistent style.
///
/// Exact table hit, else the label stripped to its first `_`/`-` segment,
/// else a deterministic pseudo-index into the table.
pub fn resolve(label: &str) -> Style {
    if let Some(style) = table_get(label) {
        return style;
    }
    let stripped = label
        .split('_')
        .next()
        .unwrap_or("")
        .split('-')
        .next()
        .unwrap_or("");
    if let Some(style) = table_get(stripped) {
        return style;
    }
    STYLE_TABLE[label_code(label) % STYLE_TABLE.len()].1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_table_hit() {
        let style = resolve("Fe");
        assert_eq!(style.color, "darkred");
        assert_eq!(style.pattern, LinePattern::Solid);
        assert_eq!(style.marker, Marker::Circle);
    }

    #[test]
    fn test_prefix_strip_retries_table() {
        assert_eq!(resolve("Fe_bcc_surface"), resolve("Fe"));
        assert_eq!(resolve("Li-bcc_1,1,0"), resolve("Li"));
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let a = resolve("completely unknown label");
        let b = resolve("completely unknown label");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_label_has_style() {
        assert_eq!(resolve("").color, "red");
    }

    #[test]
    fn test_unique_char_codes() {
        // repeated characters count once
        assert_eq!(label_code("aa"), 'a' as usize);
        assert_eq!(label_code("ab"), 'a' as usize + 'b' as usize);
    }

    #[test]
    fn test_all_table_colors_parse() {
        for (_, style) in STYLE_TABLE {
            assert!(
                csscolorparser::parse(style.color).is_ok(),
                "bad color name {}",
                style.color
            );
        }
    }
}
