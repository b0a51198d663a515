//! Category picker shown after a rectangle is drawn.

use crate::model::{default_color, parse_hex_color, Category, CategoryId};

pub const EMPTY_MESSAGE: &str = "Add categories on the Categories page first";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModalOutcome {
    Chosen(CategoryId),
    Cancelled,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModalChoice {
    pub id: CategoryId,
    pub name: String,
    pub color: egui::Color32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ModalContent {
    /// No categories exist; Cancel is the only way out.
    Empty { message: &'static str },
    Choices(Vec<ModalChoice>),
}

impl ModalContent {
    pub fn from_categories(categories: &[Category]) -> Self {
        if categories.is_empty() {
            return Self::Empty {
                message: EMPTY_MESSAGE,
            };
        }
        Self::Choices(
            categories
                .iter()
                .map(|c| ModalChoice {
                    id: c.id,
                    name: c.name.clone(),
                    color: parse_hex_color(&c.color).unwrap_or_else(default_color),
                })
                .collect(),
        )
    }

    pub fn choices(&self) -> &[ModalChoice] {
        match self {
            Self::Empty { .. } => &[],
            Self::Choices(choices) => choices,
        }
    }
}

/// Draw the modal; returns the user's decision once one is made.
///
/// Escape and clicks on the backdrop count as Cancel.
pub fn show(ctx: &egui::Context, categories: &[Category]) -> Option<ModalOutcome> {
    let content = ModalContent::from_categories(categories);

    let response = egui::Modal::new(egui::Id::new("category_modal")).show(ctx, |ui| {
        let mut outcome = None;
        ui.set_max_width(400.0);
        ui.vertical_centered(|ui| ui.heading("Choose a category"));
        ui.add_space(12.0);

        match &content {
            ModalContent::Empty { message } => {
                ui.vertical_centered(|ui| {
                    ui.label(egui::RichText::new(*message).color(egui::Color32::GRAY));
                });
            }
            ModalContent::Choices(choices) => {
                ui.horizontal_wrapped(|ui| {
                    for choice in choices {
                        ui.horizontal(|ui| {
                            let (swatch, _) =
                                ui.allocate_exact_size(egui::vec2(16.0, 16.0), egui::Sense::hover());
                            ui.painter().rect_filled(swatch, 3.0, choice.color);
                            let button = egui::Button::new(choice.name.as_str())
                                .min_size(egui::vec2(120.0, 32.0))
                                .stroke(egui::Stroke::new(2.0, choice.color));
                            if ui.add(button).clicked() {
                                outcome = Some(ModalOutcome::Chosen(choice.id));
                            }
                        });
                    }
                });
            }
        }

        ui.add_space(12.0);
        ui.vertical_centered(|ui| {
            if ui.button("Cancel").clicked() {
                outcome = Some(ModalOutcome::Cancelled);
            }
        });
        outcome
    });

    match response.inner {
        Some(outcome) => Some(outcome),
        None if response.should_close() => Some(ModalOutcome::Cancelled),
        None => None,
    }
}
