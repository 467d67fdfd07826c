//! Drug categories and their display colors.

use serde::{Deserialize, Serialize};

/// A drug category.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub description: String,
}

impl Category {
    pub fn new(id: u32, name: &str, description: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    /// Categories seeded into an empty store.
    pub fn defaults() -> Vec<Category> {
        vec![
            Category::new(1, "Other", "Miscellaneous preparations"),
            Category::new(2, "Analgesics", "Pain relief"),
            Category::new(3, "Antibiotics", "Antibacterial preparations"),
            Category::new(4, "Cardiovascular", "Heart and blood vessel preparations"),
            Category::new(5, "Gastrointestinal", "Digestive tract preparations"),
            Category::new(6, "Antiviral", "Antiviral preparations"),
            Category::new(7, "Antihistamines", "Anti-allergy preparations"),
            Category::new(8, "Neurological", "Nervous system preparations"),
            Category::new(9, "Vitamins", "Vitamins and dietary supplements"),
        ]
    }

    pub fn color(&self) -> Rgb {
        category_color(self.id)
    }
}

/// An sRGB display color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb::new(0xFF, 0xFF, 0xFF);
    pub const LIGHT_GRAY: Rgb = Rgb::new(0xD3, 0xD3, 0xD3);
    pub const LIGHT_BLUE: Rgb = Rgb::new(0xAD, 0xD8, 0xE6);
    pub const LIGHT_CORAL: Rgb = Rgb::new(0xF0, 0x80, 0x80);
    pub const LIGHT_GREEN: Rgb = Rgb::new(0x90, 0xEE, 0x90);
    pub const LIGHT_YELLOW: Rgb = Rgb::new(0xFF, 0xFF, 0xE0);
    pub const LIGHT_PINK: Rgb = Rgb::new(0xFF, 0xB6, 0xC1);
    pub const LIGHT_CYAN: Rgb = Rgb::new(0xE0, 0xFF, 0xFF);
    pub const PALE_GOLDENROD: Rgb = Rgb::new(0xEE, 0xE8, 0xAA);
    pub const PALE_TURQUOISE: Rgb = Rgb::new(0xAF, 0xEE, 0xEE);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// `#RRGGBB` form.
    pub fn to_hex(&self) -> String {
        format!("#{}", hex::encode_upper([self.r, self.g, self.b]))
    }
}

/// Fixed color table keyed by category id. Unknown ids render white.
pub fn category_color(category_id: u32) -> Rgb {
    match category_id {
        1 => Rgb::LIGHT_GRAY,
        2 => Rgb::LIGHT_BLUE,
        3 => Rgb::LIGHT_CORAL,
        4 => Rgb::LIGHT_GREEN,
        5 => Rgb::LIGHT_YELLOW,
        6 => Rgb::LIGHT_PINK,
        7 => Rgb::LIGHT_CYAN,
        8 => Rgb::PALE_GOLDENROD,
        9 => Rgb::PALE_TURQUOISE,
        _ => Rgb::WHITE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_have_sequential_ids() {
        let ids: Vec<u32> = Category::defaults().iter().map(|c| c.id).collect();
        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_color_table() {
        assert_eq!(category_color(1), Rgb::LIGHT_GRAY);
        assert_eq!(category_color(9), Rgb::PALE_TURQUOISE);
        assert_eq!(category_color(0), Rgb::WHITE);
        assert_eq!(category_color(42), Rgb::WHITE);
    }

    #[test]
    fn test_hex() {
        assert_eq!(Rgb::LIGHT_CORAL.to_hex(), "#F08080");
        assert_eq!(Rgb::WHITE.to_hex(), "#FFFFFF");
    }
}
