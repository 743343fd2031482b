//! Shopping-list export conversion.
//!
//! Cart line items are translated into the third-party shopping-list
//! format: the unit must come from the provider's compatible set (anything
//! else degrades to `each`), quantities are floored at 1 and rounded to two
//! decimals, and a display string is pre-composed for the provider UI.

use larder_api_types::instacart::LineItem;
use thiserror::Error;

/// Units the shopping-list provider accepts as-is.
pub const COMPATIBLE_UNITS: &[&str] = &[
    "oz", "lb", "cup", "tsp", "tbsp", "g", "kg", "ml", "l", "each",
];

const FALLBACK_UNIT: &str = "each";

/// An aggregated cart ingredient ready for export.
#[derive(Debug, Clone, PartialEq)]
pub struct CartIngredient {
    pub name: String,
    pub total_quantity: f64,
    pub units: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("no valid ingredients to export")]
pub struct EmptyExport;

fn normalize_unit(unit: &str) -> String {
    let lowered = unit.trim().to_lowercase();
    if COMPATIBLE_UNITS.contains(&lowered.as_str()) {
        lowered
    } else {
        FALLBACK_UNIT.to_owned()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quantity for display: integers render bare, fractions keep at most two
/// decimals.
fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        let text = format!("{value:.2}");
        text.trim_end_matches('0').trim_end_matches('.').to_owned()
    }
}

/// Convert one ingredient into a provider line item.
pub fn to_line_item(ingredient: &CartIngredient) -> LineItem {
    let quantity = if ingredient.total_quantity.is_finite() {
        ingredient.total_quantity.max(1.0)
    } else {
        1.0
    };
    let quantity = round2(quantity);
    let unit = normalize_unit(&ingredient.units);
    let display_text = format!(
        "{} {} {}",
        ingredient.name,
        format_quantity(quantity),
        unit
    );
    LineItem {
        name: ingredient.name.clone(),
        display_text,
        quantity,
        unit,
    }
}

/// Convert a cart's ingredients, skipping nameless rows. An empty result is
/// a validation failure: there is nothing to export.
pub fn to_line_items(ingredients: &[CartIngredient]) -> Result<Vec<LineItem>, EmptyExport> {
    let items: Vec<LineItem> = ingredients
        .iter()
        .filter(|ing| !ing.name.trim().is_empty())
        .map(to_line_item)
        .collect();
    if items.is_empty() {
        return Err(EmptyExport);
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(name: &str, quantity: f64, units: &str) -> CartIngredient {
        CartIngredient {
            name: name.to_owned(),
            total_quantity: quantity,
            units: units.to_owned(),
        }
    }

    #[test]
    fn unrecognized_unit_falls_back_to_each() {
        let item = to_line_item(&ingredient("Flour", 2.567, "cups"));
        assert_eq!(item.name, "Flour");
        assert_eq!(item.quantity, 2.57);
        assert_eq!(item.unit, "each");
        assert_eq!(item.display_text, "Flour 2.57 each");
    }

    #[test]
    fn compatible_units_pass_through_lowercased() {
        let item = to_line_item(&ingredient("Milk", 2.0, "Cup"));
        assert_eq!(item.unit, "cup");
        assert_eq!(item.display_text, "Milk 2 cup");
    }

    #[test]
    fn quantity_floors_at_one() {
        let item = to_line_item(&ingredient("Vanilla", 0.25, "tsp"));
        assert_eq!(item.quantity, 1.0);
        assert_eq!(item.display_text, "Vanilla 1 tsp");
    }

    #[test]
    fn non_finite_quantity_becomes_one() {
        let item = to_line_item(&ingredient("Salt", f64::NAN, "g"));
        assert_eq!(item.quantity, 1.0);
    }

    #[test]
    fn fractional_display_trims_trailing_zeros() {
        let item = to_line_item(&ingredient("Butter", 2.5, "lb"));
        assert_eq!(item.quantity, 2.5);
        assert_eq!(item.display_text, "Butter 2.5 lb");
    }

    #[test]
    fn nameless_rows_are_skipped() {
        let items = to_line_items(&[
            ingredient("", 2.0, "cup"),
            ingredient("Eggs", 12.0, "each"),
        ])
        .expect("one valid row");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "Eggs");
    }

    #[test]
    fn empty_export_is_an_error() {
        assert_eq!(to_line_items(&[]), Err(EmptyExport));
        assert_eq!(
            to_line_items(&[ingredient("  ", 1.0, "each")]),
            Err(EmptyExport)
        );
    }
}
