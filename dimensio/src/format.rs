//! Text rendering for quantities and dimension lists
//!
//! The formatter is configured explicitly through [`FormatOptions`]; the
//! arrangement of factors is one of the closed [`Layout`] variants.

use crate::algebra::{Dimension, Quantity};
use crate::corpus::Corpus;
use serde::{Deserialize, Serialize};

/// How units are named
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Naming {
    /// `km`, `h`
    #[default]
    Symbol,
    /// `kilometre`, `hour`
    Name,
}

/// How factors are arranged
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Layout {
    /// `km·h⁻¹`
    #[default]
    Product,
    /// `km/h`, `kg/(m·s²)`
    Quotient,
    /// `km h⁻¹`
    Spaced,
}

/// Formatter configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    pub naming: Naming,
    pub layout: Layout,
    /// Use `*` and `^n` instead of `·` and superscripts
    pub ascii_only: bool,
    /// Print `^1` powers too
    pub show_all_powers: bool,
    /// Fixed number of decimals for the value
    pub decimal_places: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions {
            naming: Naming::Symbol,
            layout: Layout::Product,
            ascii_only: false,
            show_all_powers: false,
            decimal_places: None,
        }
    }
}

impl FormatOptions {
    /// Plain ASCII symbols, as used in error messages
    pub fn ascii() -> Self {
        FormatOptions { ascii_only: true, ..Self::default() }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    pub fn with_decimals(mut self, places: usize) -> Self {
        self.decimal_places = Some(places);
        self
    }
}

/// Renders quantities against a corpus
#[derive(Debug, Clone)]
pub struct QuantityFormatter<'a> {
    corpus: &'a Corpus,
    options: FormatOptions,
}

impl<'a> QuantityFormatter<'a> {
    pub fn new(corpus: &'a Corpus, options: FormatOptions) -> Self {
        QuantityFormatter { corpus, options }
    }

    #[inline]
    pub fn options(&self) -> &FormatOptions {
        &self.options
    }

    /// Value followed by its units, e.g. `36 km·h⁻¹`
    pub fn format(&self, quantity: &Quantity) -> String {
        let value = match self.options.decimal_places {
            Some(places) => format!("{:.*}", places, quantity.value()),
            None => quantity.value().to_string(),
        };
        if quantity.is_dimensionless() {
            value
        } else {
            format!("{} {}", value, self.format_dimensions(quantity.dimensions()))
        }
    }

    /// Units only; an empty list renders as `1`
    pub fn format_dimensions(&self, dimensions: &[Dimension]) -> String {
        if dimensions.is_empty() {
            return "1".to_string();
        }

        match self.options.layout {
            Layout::Product => self.join(dimensions.iter().copied()),
            Layout::Spaced => dimensions
                .iter()
                .map(|d| self.format_dimension(d))
                .collect::<Vec<_>>()
                .join(" "),
            Layout::Quotient => {
                let numerator: Vec<Dimension> =
                    dimensions.iter().copied().filter(|d| d.power > 0).collect();
                let denominator: Vec<Dimension> = dimensions
                    .iter()
                    .filter(|d| d.power < 0)
                    .map(|d| d.with_power(d.power.saturating_neg()))
                    .collect();

                let top = if numerator.is_empty() {
                    "1".to_string()
                } else {
                    self.join(numerator)
                };
                match denominator.len() {
                    0 => top,
                    1 => format!("{}/{}", top, self.join(denominator)),
                    _ => format!("{}/({})", top, self.join(denominator)),
                }
            }
        }
    }

    /// One factor, e.g. `km²` or `kilometre^2`
    pub fn format_dimension(&self, dimension: &Dimension) -> String {
        let unit = self.corpus.unit(dimension.unit);
        let prefix = dimension.prefix.map(|p| self.corpus.prefix(p));
        let mut text = match self.options.naming {
            Naming::Symbol => {
                format!("{}{}", prefix.map_or("", |p| p.symbol.as_str()), unit.symbol)
            }
            Naming::Name => {
                format!("{}{}", prefix.map_or("", |p| p.key.as_str()), unit.display_name())
            }
        };

        if dimension.power != 1 || self.options.show_all_powers {
            if self.options.ascii_only {
                text.push('^');
                text.push_str(&dimension.power.to_string());
            } else {
                text.push_str(&superscript(dimension.power));
            }
        }
        text
    }

    fn join(&self, dimensions: impl IntoIterator<Item = Dimension>) -> String {
        let separator = if self.options.ascii_only { "*" } else { "·" };
        dimensions
            .into_iter()
            .map(|d| self.format_dimension(&d))
            .collect::<Vec<_>>()
            .join(separator)
    }
}

/// ASCII rendering of a dimension list for diagnostics
pub fn describe(dimensions: &[Dimension], corpus: &Corpus) -> String {
    QuantityFormatter::new(corpus, FormatOptions::ascii()).format_dimensions(dimensions)
}

/// Convert integer to superscript string
fn superscript(n: i32) -> String {
    let digits: String = n
        .unsigned_abs()
        .to_string()
        .chars()
        .map(|d| match d {
            '0' => '⁰',
            '1' => '¹',
            '2' => '²',
            '3' => '³',
            '4' => '⁴',
            '5' => '⁵',
            '6' => '⁶',
            '7' => '⁷',
            '8' => '⁸',
            '9' => '⁹',
            _ => d,
        })
        .collect();

    if n < 0 { format!("⁻{digits}") } else { digits }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn q(value: f64, ids: &[&str], corpus: &Corpus) -> Quantity {
        Quantity::parse(value, ids, corpus).unwrap()
    }

    #[test]
    fn test_superscript() {
        assert_eq!(superscript(2), "²");
        assert_eq!(superscript(-12), "⁻¹²");
        assert_eq!(superscript(i32::MIN), "⁻²¹⁴⁷⁴⁸³⁶⁴⁸");
    }

    #[test]
    fn test_product_layout() {
        let corpus = Corpus::bootstrap().unwrap();
        let formatter = QuantityFormatter::new(&corpus, FormatOptions::default());
        assert_eq!(formatter.format(&q(36.0, &["km", "h^-1"], &corpus)), "36 km·h⁻¹");
        assert_eq!(formatter.format(&Quantity::dimensionless(2.5)), "2.5");
    }

    #[test]
    fn test_quotient_layout() {
        let corpus = Corpus::bootstrap().unwrap();
        let formatter = QuantityFormatter::new(
            &corpus,
            FormatOptions::default().with_layout(Layout::Quotient),
        );
        let dims = |ids: &[&str]| q(1.0, ids, &corpus).dimensions().to_vec();
        assert_eq!(formatter.format_dimensions(&dims(&["km", "h^-1"])), "km/h");
        assert_eq!(formatter.format_dimensions(&dims(&["kg", "m^-1", "s^-2"])), "kg/(m·s²)");
        assert_eq!(formatter.format_dimensions(&dims(&["s^-1"])), "1/s");
    }

    #[test]
    fn test_names_and_decimals() {
        let corpus = Corpus::bootstrap().unwrap();
        let options = FormatOptions::default()
            .with_naming(Naming::Name)
            .with_layout(Layout::Spaced)
            .with_decimals(2);
        let formatter = QuantityFormatter::new(&corpus, options);
        assert_eq!(
            formatter.format(&q(1.0 / 3.0, &["km", "h^-1"], &corpus)),
            "0.33 kilometre hour⁻¹"
        );
    }

    #[test]
    fn test_describe_ascii() {
        let corpus = Corpus::bootstrap().unwrap();
        let dims = q(1.0, &["km", "h^-1"], &corpus).dimensions().to_vec();
        assert_eq!(describe(&dims, &corpus), "km*h^-1");
        assert_eq!(describe(&[], &corpus), "1");
    }

    #[test]
    fn test_show_all_powers() {
        let corpus = Corpus::bootstrap().unwrap();
        let options = FormatOptions { show_all_powers: true, ..FormatOptions::ascii() };
        let formatter = QuantityFormatter::new(&corpus, options);
        let dims = q(1.0, &["m"], &corpus).dimensions().to_vec();
        assert_eq!(formatter.format_dimensions(&dims), "m^1");
    }
}
