//! Shopping list aggregation and export.
//!
//! The raw grocery list collects ingredient strings from several recipes,
//! e.g. `"500g Mehl"` and `"1,5 kg Mehl"`. For display the strings are parsed
//! into quantity, unit and name, units and common plurals are normalized,
//! and quantities with the same (name, unit) are summed.

use std::collections::HashMap;
use std::fmt;

use crate::models::{GroceryItem, Placeholder};

/// Header of the exported list.
pub const EXPORT_TITLE: &str = "🎄 Weihnachts-Einkaufsliste";

/// Categories understood by the categorize lookup, in display order.
pub const CATEGORIES: [(&str, &str); 6] = [
    ("Obst & Gemüse", "🍎 Obst & Gemüse"),
    ("Kühlregal", "🥛 Kühlregal"),
    ("Fleisch & Fisch", "🥩 Fleisch & Fisch"),
    ("Vorratsschrank", "🍝 Vorratsschrank"),
    ("Getränke", "🥤 Getränke"),
    ("Haushalt & Sonstiges", "🏠 Haushalt & Sonstiges"),
];

/// An ingredient string split into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedIngredient {
    pub quantity: Option<f64>,
    pub unit: String,
    pub name: String,
}

impl ParsedIngredient {
    /// Parse `"<quantity><unit> <name>"`. Quantity and unit are optional;
    /// a decimal comma is accepted.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        match split_quantity(text) {
            Some((quantity, unit, name)) => Self {
                quantity: parse_quantity(quantity),
                unit: normalize_unit(unit),
                name: normalize_name(name),
            },
            None => Self {
                quantity: None,
                unit: String::new(),
                name: normalize_name(text),
            },
        }
    }

    fn key(&self) -> String {
        format!("{}|{}", self.name.to_lowercase(), self.unit.to_lowercase())
    }
}

impl fmt::Display for ParsedIngredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.quantity {
            Some(quantity) => {
                write!(f, "{}", format_quantity(quantity))?;
                if !self.unit.is_empty() {
                    write!(f, " {}", self.unit)?;
                }
                write!(f, " {}", self.name)
            }
            None => f.write_str(&self.name),
        }
    }
}

/// One line of the aggregated shopping list.
#[derive(Debug, Clone, PartialEq)]
pub enum ShoppingLine {
    Ingredient(ParsedIngredient),
    Placeholder(Placeholder),
}

impl ShoppingLine {
    pub fn text(&self) -> String {
        match self {
            ShoppingLine::Ingredient(i) => i.to_string(),
            ShoppingLine::Placeholder(p) => p.text.clone(),
        }
    }
}

fn is_unit_char(c: char) -> bool {
    c.is_ascii_alphabetic() || "äöüÄÖÜß./".contains(c)
}

/// Split off a leading quantity and optional unit. Returns `None` when the
/// text does not start with a quantity followed by a name.
fn split_quantity(text: &str) -> Option<(&str, &str, &str)> {
    let quantity_end = text
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .unwrap_or(text.len());
    if quantity_end == 0 {
        return None;
    }
    let quantity = &text[..quantity_end];
    let rest = &text[quantity_end..];

    // "500g Mehl", "2 Stk. Eier"
    let unit_start = rest.len() - rest.trim_start().len();
    let after_ws = &rest[unit_start..];
    let unit_len = after_ws
        .find(|c: char| !is_unit_char(c))
        .unwrap_or(after_ws.len());
    let (unit, tail) = after_ws.split_at(unit_len);
    if tail.starts_with(char::is_whitespace) {
        let name = tail.trim_start();
        if !name.is_empty() {
            return Some((quantity, unit, name));
        }
    }

    // "2 Eier": no unit, the word after the quantity is the name.
    if unit_start > 0 && !after_ws.is_empty() {
        return Some((quantity, "", after_ws));
    }
    None
}

fn parse_quantity(raw: &str) -> Option<f64> {
    let normalized = raw.replacen(',', ".", 1);
    let mut dots = 0;
    let numeric: String = normalized
        .chars()
        .take_while(|c| {
            if *c == '.' {
                dots += 1;
            }
            c.is_ascii_digit() || (*c == '.' && dots <= 1)
        })
        .collect();
    numeric.parse::<f64>().ok()
}

fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 100.0).round() / 100.0;
    rounded.to_string()
}

/// Map German unit spellings onto one canonical form. Piece counts have no
/// unit. Unknown units are returned unchanged.
pub fn normalize_unit(unit: &str) -> String {
    if unit.is_empty() {
        return String::new();
    }
    let key = unit.to_lowercase().replacen('.', "", 1);
    let canonical = match key.trim() {
        "stk" | "stück" | "st" => "",
        "g" | "gramm" => "g",
        "kg" | "kilogramm" => "kg",
        "ml" | "milliliter" => "ml",
        "l" | "liter" => "l",
        "el" | "esslöffel" => "EL",
        "tl" | "teelöffel" => "TL",
        "pck" | "packung" | "päckchen" => "Pck",
        "dose" | "dosen" => "Dose",
        "glas" | "gläser" => "Glas",
        "bund" => "Bund",
        _ => return unit.to_string(),
    };
    canonical.to_string()
}

/// Collapse common singular/plural variants onto one name.
pub fn normalize_name(name: &str) -> String {
    let name = name.trim();
    let canonical = match name.to_lowercase().as_str() {
        "eier" | "ei" => "Ei",
        "zwiebeln" | "zwiebel" => "Zwiebel",
        "kartoffeln" | "kartoffel" => "Kartoffel",
        "karotten" | "karotte" | "möhren" => "Möhren",
        "tomaten" | "tomate" => "Tomate",
        "äpfel" | "apfel" => "Apfel",
        _ => return name.to_string(),
    };
    canonical.to_string()
}

/// Aggregate the raw grocery list into display lines.
///
/// Ingredients with the same normalized (name, unit) are combined and their
/// quantities summed. Placeholders are kept as they are. The result is
/// sorted by display text.
pub fn aggregate(items: &[GroceryItem]) -> Vec<ShoppingLine> {
    let mut order: Vec<String> = Vec::new();
    let mut merged: HashMap<String, ParsedIngredient> = HashMap::new();
    let mut lines = Vec::new();

    for item in items {
        let text = match item {
            GroceryItem::Placeholder(p) => {
                lines.push(ShoppingLine::Placeholder(p.clone()));
                continue;
            }
            GroceryItem::Text(text) => text,
        };

        let parsed = ParsedIngredient::parse(text);
        if parsed.name.is_empty() {
            continue;
        }

        let key = parsed.key();
        match merged.get_mut(&key) {
            Some(existing) => {
                if let Some(quantity) = parsed.quantity {
                    existing.quantity = Some(existing.quantity.unwrap_or(0.0) + quantity);
                }
            }
            None => {
                order.push(key.clone());
                merged.insert(key, parsed);
            }
        }
    }

    lines.extend(
        order
            .iter()
            .filter_map(|key| merged.remove(key))
            .map(ShoppingLine::Ingredient),
    );
    lines.sort_by_key(|line| line.text().to_lowercase());
    lines
}

/// Render the shopping list grouped by category.
///
/// `categories` maps category names to item texts as returned by the
/// categorize lookup. When it yields no items the flat list is used.
pub fn format_export(lines: &[ShoppingLine], categories: &HashMap<String, Vec<String>>) -> String {
    let mut out = String::from(EXPORT_TITLE);
    out.push('\n');
    let mut any = false;

    for (category, header) in CATEGORIES {
        let Some(items) = categories.get(category).filter(|i| !i.is_empty()) else {
            continue;
        };
        out.push_str(&format!("\n{}\n", header));
        for item in items {
            out.push_str(&format!("• {}\n", item));
            any = true;
        }
    }

    if !any {
        return format_flat(lines);
    }
    out.trim().to_string()
}

/// Plain bullet list, used when categorization is unavailable.
pub fn format_flat(lines: &[ShoppingLine]) -> String {
    lines
        .iter()
        .map(|line| format!("• {}", line.text()))
        .collect::<Vec<_>>()
        .join("\n")
}
