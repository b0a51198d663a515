use serde::{Deserialize, Serialize};

use crate::geometry::{Bounded, Rect};

pub type AnnotationId = i64;
pub type CategoryId = i64;

/// Stroke color for annotations whose category cannot be resolved.
pub const DEFAULT_COLOR: &str = "#007bff";
pub const UNCATEGORIZED: &str = "uncategorized";

// ── Data Model ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub category_id: CategoryId,
    pub category_name: String,
    pub id: AnnotationId,
}

impl Annotation {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.x = rect.x;
        self.y = rect.y;
        self.width = rect.width;
        self.height = rect.height;
    }
}

impl Bounded for Annotation {
    fn bounds(&self) -> Rect {
        self.rect()
    }
}

/// An annotation before the store has assigned its id.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotationDraft {
    pub rect: Rect,
    pub category_id: CategoryId,
    pub category_name: String,
}

impl AnnotationDraft {
    pub fn into_annotation(self, id: AnnotationId) -> Annotation {
        Annotation {
            x: self.rect.x,
            y: self.rect.y,
            width: self.rect.width,
            height: self.rect.height,
            category_id: self.category_id,
            category_name: self.category_name,
            id,
        }
    }
}

/// Positional fields of an annotation that may change after creation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct AnnotationPatch {
    pub x: Option<f32>,
    pub y: Option<f32>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl AnnotationPatch {
    pub fn geometry(rect: Rect) -> Self {
        Self {
            x: Some(rect.x),
            y: Some(rect.y),
            width: Some(rect.width),
            height: Some(rect.height),
        }
    }

    pub fn apply(&self, annotation: &mut Annotation) {
        if let Some(x) = self.x {
            annotation.x = x;
        }
        if let Some(y) = self.y {
            annotation.y = y;
        }
        if let Some(width) = self.width {
            annotation.width = width;
        }
        if let Some(height) = self.height {
            annotation.height = height;
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: usize,
    /// Stable key used to address the image from the editor and the store.
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

impl Image {
    pub fn new(id: usize, path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            path: path.into(),
            name: name.into(),
            annotations: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
}

// ── Color ───────────────────────────────────────────────────────────────────

/// Parse `#rrggbb` or `#rgb`.
pub fn parse_hex_color(hex: &str) -> Option<egui::Color32> {
    let digits = hex.trim().strip_prefix('#')?;
    if !digits.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match digits.len() {
        6 => Some(egui::Color32::from_rgb(
            channel(&digits[0..2])?,
            channel(&digits[2..4])?,
            channel(&digits[4..6])?,
        )),
        3 => {
            let expand = |i: usize| channel(&digits[i..i + 1]).map(|v| v * 17);
            Some(egui::Color32::from_rgb(expand(0)?, expand(1)?, expand(2)?))
        }
        _ => None,
    }
}

pub fn color_to_hex(color: egui::Color32) -> String {
    format!("#{:02x}{:02x}{:02x}", color.r(), color.g(), color.b())
}

pub fn default_color() -> egui::Color32 {
    egui::Color32::from_rgb(0x00, 0x7b, 0xff)
}

/// Display label and color for a category reference.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCategory {
    pub name: String,
    pub color: egui::Color32,
}

/// Unknown or deleted categories degrade to the default color and the
/// "uncategorized" label.
pub fn resolve_category(categories: &[Category], id: CategoryId) -> ResolvedCategory {
    match categories.iter().find(|c| c.id == id) {
        Some(category) => ResolvedCategory {
            name: category.name.clone(),
            color: parse_hex_color(&category.color).unwrap_or_else(default_color),
        },
        None => ResolvedCategory {
            name: UNCATEGORIZED.to_owned(),
            color: default_color(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_long_and_short_hex() {
        assert_eq!(
            parse_hex_color("#ff0000"),
            Some(egui::Color32::from_rgb(255, 0, 0))
        );
        assert_eq!(
            parse_hex_color("#0f8"),
            Some(egui::Color32::from_rgb(0, 255, 136))
        );
        assert_eq!(parse_hex_color("ff0000"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
        assert_eq!(parse_hex_color("#12345"), None);
    }

    #[test]
    fn hex_round_trips_through_color32() {
        let c = parse_hex_color("#28a745").unwrap();
        assert_eq!(color_to_hex(c), "#28a745");
        assert_eq!(parse_hex_color(DEFAULT_COLOR), Some(default_color()));
    }

    #[test]
    fn unknown_category_resolves_to_uncategorized() {
        let categories = vec![Category {
            id: 1,
            name: "Car".into(),
            color: "#ff0000".into(),
        }];
        let car = resolve_category(&categories, 1);
        assert_eq!(car.name, "Car");
        assert_eq!(car.color, egui::Color32::from_rgb(255, 0, 0));

        let missing = resolve_category(&categories, 99);
        assert_eq!(missing.name, UNCATEGORIZED);
        assert_eq!(missing.color, default_color());
    }

    #[test]
    fn bad_category_color_falls_back_to_default() {
        let categories = vec![Category {
            id: 7,
            name: "Tree".into(),
            color: "green".into(),
        }];
        assert_eq!(resolve_category(&categories, 7).color, default_color());
    }

    #[test]
    fn patch_only_touches_given_fields() {
        let mut a = AnnotationDraft {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
            category_id: 5,
            category_name: "Dog".into(),
        }
        .into_annotation(42);
        AnnotationPatch {
            width: Some(30.0),
            ..Default::default()
        }
        .apply(&mut a);
        assert_eq!(a.rect(), Rect::new(1.0, 2.0, 30.0, 4.0));
        assert_eq!(a.id, 42);
        assert_eq!(a.category_id, 5);
    }
}
