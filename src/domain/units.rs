//! Store and unit tables for the catalog and recipe pickers.
//!
//! Units fall into three backend-supported categories (volume, weight,
//! count); the backend owns all cross-unit conversion within a category.
//! The conversion-factor table is carried for display purposes only.

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// Stores a purchase option can be attributed to.
pub const SUPPORTED_STORES: &[&str] = &[
    "LMF Bulk",
    "Wegmans",
    "Market Basket",
    "BJ's",
    "Wee",
    "Costco",
    "Trader Joes",
    "Whole Foods",
    "Shaws",
    "Star Market",
    "Target",
    "Sam's Club",
    "Kroger",
];

/// A canonical unit value with its picker label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitOption {
    pub value: &'static str,
    pub label: &'static str,
}

pub const VOLUME_UNITS: &[UnitOption] = &[
    UnitOption { value: "tsp", label: "tsp (teaspoon)" },
    UnitOption { value: "tbsp", label: "tbsp (table spoon)" },
    UnitOption { value: "cup", label: "cup" },
    UnitOption { value: "fl oz", label: "fl oz (fluid ounce)" },
    UnitOption { value: "pt", label: "pt (pint)" },
    UnitOption { value: "qt", label: "qt (quart)" },
    UnitOption { value: "gal", label: "gal (gallon)" },
    UnitOption { value: "ml", label: "ml (milliliter)" },
    UnitOption { value: "l", label: "l (liter)" },
];

pub const WEIGHT_UNITS: &[UnitOption] = &[
    UnitOption { value: "oz", label: "oz (ounce)" },
    UnitOption { value: "lb", label: "lb (pound)" },
    UnitOption { value: "g", label: "g (gram)" },
    UnitOption { value: "kg", label: "kg (kilogram)" },
];

/// Countables, including package-style units the backend treats as 1 each.
pub const COUNT_UNITS: &[UnitOption] = &[
    UnitOption { value: "each", label: "each" },
    UnitOption { value: "dozen", label: "dozen" },
    UnitOption { value: "package", label: "package" },
    UnitOption { value: "bag", label: "bag" },
    UnitOption { value: "box", label: "box" },
    UnitOption { value: "can", label: "can" },
    UnitOption { value: "bottle", label: "bottle" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitCategory {
    Volume,
    Weight,
    Count,
}

impl UnitCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Volume => "volume",
            Self::Weight => "weight",
            Self::Count => "count",
        }
    }
}

/// Conversion factors to the category's base unit (ml for volume, g for
/// weight, 1 for countables).
static CONVERSION_FACTORS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("tsp", 4.928_92),
        ("tbsp", 14.786_8),
        ("cup", 236.588),
        ("fl oz", 29.573_5),
        ("pt", 473.176),
        ("qt", 946.353),
        ("gal", 3785.41),
        ("ml", 1.0),
        ("l", 1000.0),
        ("oz", 28.349_5),
        ("lb", 453.592),
        ("g", 1.0),
        ("kg", 1000.0),
        ("each", 1.0),
        ("dozen", 12.0),
        ("package", 1.0),
        ("bag", 1.0),
        ("box", 1.0),
        ("can", 1.0),
        ("bottle", 1.0),
    ])
});

static CATEGORIES: Lazy<HashMap<&'static str, UnitCategory>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for unit in VOLUME_UNITS {
        map.insert(unit.value, UnitCategory::Volume);
    }
    for unit in WEIGHT_UNITS {
        map.insert(unit.value, UnitCategory::Weight);
    }
    for unit in COUNT_UNITS {
        map.insert(unit.value, UnitCategory::Count);
    }
    map
});

/// Older data and user-entered labels map back onto canonical units.
static ALIASES: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("teaspoon", "tsp"),
        ("teaspoons", "tsp"),
        ("tbspn", "tbsp"),
        ("tablespoon", "tbsp"),
        ("tablespoons", "tbsp"),
        ("pint", "pt"),
        ("pints", "pt"),
        ("quart", "qt"),
        ("quarts", "qt"),
        ("gallon", "gal"),
        ("gallons", "gal"),
        ("liter", "l"),
        ("litres", "l"),
        ("liters", "l"),
        ("milliliter", "ml"),
        ("millilitre", "ml"),
        ("milliliters", "ml"),
        ("millilitres", "ml"),
        ("ounce", "oz"),
        ("ounces", "oz"),
        ("pound", "lb"),
        ("pounds", "lb"),
    ])
});

/// Normalize a raw unit string to its canonical form, if known.
pub fn canonical_unit(unit: &str) -> Option<&'static str> {
    let raw = unit.trim().to_lowercase();
    if let Some(&canonical) = ALIASES.get(raw.as_str()) {
        return Some(canonical);
    }
    CATEGORIES.get_key_value(raw.as_str()).map(|(&key, _)| key)
}

/// Category for a unit string, through alias normalization.
pub fn unit_category(unit: &str) -> Option<UnitCategory> {
    canonical_unit(unit).and_then(|c| CATEGORIES.get(c).copied())
}

/// Conversion factor to the category base unit, through alias
/// normalization.
pub fn conversion_factor(unit: &str) -> Option<f64> {
    canonical_unit(unit).and_then(|c| CONVERSION_FACTORS.get(c).copied())
}

/// The unit values a recipe ingredient may use once its category is known.
pub fn allowed_units(category: UnitCategory) -> Vec<&'static str> {
    let table = match category {
        UnitCategory::Volume => VOLUME_UNITS,
        UnitCategory::Weight => WEIGHT_UNITS,
        UnitCategory::Count => COUNT_UNITS,
    };
    table.iter().map(|unit| unit.value).collect()
}

pub fn is_volume_unit(unit: &str) -> bool {
    unit_category(unit) == Some(UnitCategory::Volume)
}

pub fn is_weight_unit(unit: &str) -> bool {
    unit_category(unit) == Some(UnitCategory::Weight)
}

pub fn is_count_unit(unit: &str) -> bool {
    unit_category(unit) == Some(UnitCategory::Count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_normalize_to_canonical_units() {
        assert_eq!(canonical_unit("Tablespoons"), Some("tbsp"));
        assert_eq!(canonical_unit(" pounds "), Some("lb"));
        assert_eq!(canonical_unit("cup"), Some("cup"));
        assert_eq!(canonical_unit("fathoms"), None);
    }

    #[test]
    fn categories_cover_every_canonical_unit() {
        for unit in VOLUME_UNITS.iter().chain(WEIGHT_UNITS).chain(COUNT_UNITS) {
            assert!(
                unit_category(unit.value).is_some(),
                "no category for {}",
                unit.value
            );
            assert!(
                conversion_factor(unit.value).is_some(),
                "no conversion factor for {}",
                unit.value
            );
        }
    }

    #[test]
    fn category_predicates() {
        assert!(is_volume_unit("gallons"));
        assert!(is_weight_unit("KG"));
        assert!(is_count_unit("dozen"));
        assert!(!is_count_unit("ml"));
    }

    #[test]
    fn allowed_units_match_category_tables() {
        assert!(allowed_units(UnitCategory::Volume).contains(&"fl oz"));
        assert!(allowed_units(UnitCategory::Count).contains(&"bottle"));
        assert!(!allowed_units(UnitCategory::Weight).contains(&"cup"));
    }
}
