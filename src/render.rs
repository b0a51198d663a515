//! Canvas painting.
//!
//! [`build`] turns the current image and editor state into a flat display
//! list in layer order; [`paint`] hands that list to egui. The canvas is
//! cleared and redrawn in full on every repaint.

use egui::{Color32, Pos2};

use crate::geometry::{Handle, Rect};
use crate::model::{resolve_category, Annotation, Category};

pub const STROKE_WIDTH: f32 = 2.0;
pub const SELECTED_STROKE_WIDTH: f32 = 3.0;
pub const HANDLE_RADIUS: f32 = 4.0;
pub const LABEL_HEIGHT: f32 = 18.0;
pub const LABEL_PADDING: f32 = 8.0;
pub const LABEL_FONT_SIZE: f32 = 12.0;
/// Gap between the label baseline and the rectangle's top edge.
pub const LABEL_BASELINE_INSET: f32 = 4.0;
/// On/off lengths of the dashed draft outline.
pub const DASH: f32 = 5.0;
pub const DRAFT_COLOR: Color32 = Color32::from_rgb(255, 0, 0);

#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    StrokeRect {
        rect: Rect,
        color: Color32,
        width: f32,
        dashed: bool,
    },
    FillRect {
        rect: Rect,
        color: Color32,
    },
    /// `pos` is the left end of the text baseline.
    Text {
        pos: Pos2,
        text: String,
        color: Color32,
    },
    Handle {
        center: Pos2,
        fill: Color32,
    },
}

/// Width of label text as it will be painted.
pub trait TextMeasure {
    fn text_width(&self, text: &str) -> f32;
}

impl TextMeasure for egui::Painter {
    fn text_width(&self, text: &str) -> f32 {
        self.layout_no_wrap(
            text.to_owned(),
            egui::FontId::proportional(LABEL_FONT_SIZE),
            Color32::WHITE,
        )
        .size()
        .x
    }
}

/// Everything visible on the canvas for one image.
#[derive(Clone, Copy, Debug, Default)]
pub struct Scene<'a> {
    pub annotations: &'a [Annotation],
    pub categories: &'a [Category],
    /// Working copy of the selected annotation; may differ from the
    /// committed geometry while it is being dragged.
    pub selected: Option<&'a Annotation>,
    pub drawing: Option<Rect>,
    pub pending: Option<Rect>,
    pub optimistic: Option<&'a Annotation>,
}

pub fn build(scene: &Scene<'_>, measure: &dyn TextMeasure) -> Vec<DrawCommand> {
    let mut out = Vec::new();
    let selected_id = scene.selected.map(|s| s.id);

    for annotation in scene.annotations {
        match scene.selected {
            Some(selected) if selected.id == annotation.id => {
                annotation_commands(&mut out, selected, scene.categories, true, measure);
            }
            _ => annotation_commands(&mut out, annotation, scene.categories, false, measure),
        }
    }

    for draft in [scene.drawing, scene.pending].into_iter().flatten() {
        out.push(DrawCommand::StrokeRect {
            rect: draft,
            color: DRAFT_COLOR,
            width: STROKE_WIDTH,
            dashed: true,
        });
    }

    if let Some(optimistic) = scene.optimistic {
        let is_selected = selected_id == Some(optimistic.id);
        let shown = match scene.selected {
            Some(selected) if is_selected => selected,
            _ => optimistic,
        };
        annotation_commands(&mut out, shown, scene.categories, is_selected, measure);
    }

    out
}

fn annotation_commands(
    out: &mut Vec<DrawCommand>,
    annotation: &Annotation,
    categories: &[Category],
    selected: bool,
    measure: &dyn TextMeasure,
) {
    let category = resolve_category(categories, annotation.category_id);
    let rect = annotation.rect();

    out.push(DrawCommand::StrokeRect {
        rect,
        color: category.color,
        width: if selected {
            SELECTED_STROKE_WIDTH
        } else {
            STROKE_WIDTH
        },
        dashed: false,
    });

    let text_width = measure.text_width(&category.name);
    out.push(DrawCommand::FillRect {
        rect: Rect::new(
            rect.x,
            (rect.y - LABEL_HEIGHT).max(0.0),
            text_width + LABEL_PADDING,
            LABEL_HEIGHT,
        ),
        color: category.color,
    });
    out.push(DrawCommand::Text {
        pos: egui::pos2(
            rect.x + LABEL_PADDING / 2.0,
            (rect.y - LABEL_BASELINE_INSET).max(LABEL_FONT_SIZE),
        ),
        text: category.name,
        color: Color32::WHITE,
    });

    if selected {
        for handle in Handle::ALL {
            out.push(DrawCommand::Handle {
                center: rect.corner(handle),
                fill: category.color,
            });
        }
    }
}

pub fn paint(painter: &egui::Painter, origin: Pos2, commands: &[DrawCommand]) {
    for command in commands {
        match command {
            DrawCommand::StrokeRect {
                rect,
                color,
                width,
                dashed: false,
            } => {
                painter.rect_stroke(
                    rect.to_egui(origin),
                    0.0,
                    egui::Stroke::new(*width, *color),
                    egui::StrokeKind::Middle,
                );
            }
            DrawCommand::StrokeRect {
                rect,
                color,
                width,
                dashed: true,
            } => {
                let r = rect.to_egui(origin);
                let outline = vec![
                    r.left_top(),
                    r.right_top(),
                    r.right_bottom(),
                    r.left_bottom(),
                    r.left_top(),
                ];
                painter.extend(egui::Shape::dashed_line(
                    &outline,
                    egui::Stroke::new(*width, *color),
                    DASH,
                    DASH,
                ));
            }
            DrawCommand::FillRect { rect, color } => {
                painter.rect_filled(rect.to_egui(origin), 0.0, *color);
            }
            DrawCommand::Text { pos, text, color } => {
                painter.text(
                    origin + pos.to_vec2(),
                    egui::Align2::LEFT_BOTTOM,
                    text,
                    egui::FontId::proportional(LABEL_FONT_SIZE),
                    *color,
                );
            }
            DrawCommand::Handle { center, fill } => {
                painter.circle(
                    origin + center.to_vec2(),
                    HANDLE_RADIUS,
                    *fill,
                    egui::Stroke::new(1.0, Color32::WHITE),
                );
            }
        }
    }
}

/// Grey stand-in for an image that failed to load.
pub fn paint_placeholder(painter: &egui::Painter, rect: egui::Rect) {
    painter.rect_filled(rect, 0.0, Color32::from_gray(240));
    painter.text(
        rect.center(),
        egui::Align2::CENTER_CENTER,
        "Unable to load image",
        egui::FontId::proportional(16.0),
        Color32::from_gray(153),
    );
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Every glyph is `advance` pixels wide.
    pub(crate) struct FixedAdvance(pub f32);

    impl TextMeasure for FixedAdvance {
        fn text_width(&self, text: &str) -> f32 {
            text.chars().count() as f32 * self.0
        }
    }

    fn car() -> Category {
        Category {
            id: 1,
            name: "Car".into(),
            color: "#ff0000".into(),
        }
    }

    fn ann(id: i64, category_id: i64, rect: Rect) -> Annotation {
        Annotation {
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
            category_id,
            category_name: "stale".into(),
            id,
        }
    }

    fn handles(commands: &[DrawCommand]) -> usize {
        commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Handle { .. }))
            .count()
    }

    #[test]
    fn committed_annotation_has_outline_label_and_text() {
        let categories = [car()];
        let anns = [ann(5, 1, Rect::new(10.0, 30.0, 100.0, 70.0))];
        let scene = Scene {
            annotations: &anns,
            categories: &categories,
            ..Default::default()
        };
        let out = build(&scene, &FixedAdvance(6.0));
        let red = Color32::from_rgb(255, 0, 0);
        assert_eq!(
            out,
            vec![
                DrawCommand::StrokeRect {
                    rect: Rect::new(10.0, 30.0, 100.0, 70.0),
                    color: red,
                    width: STROKE_WIDTH,
                    dashed: false,
                },
                DrawCommand::FillRect {
                    rect: Rect::new(10.0, 12.0, 26.0, LABEL_HEIGHT),
                    color: red,
                },
                DrawCommand::Text {
                    pos: egui::pos2(14.0, 30.0 - LABEL_BASELINE_INSET),
                    text: "Car".into(),
                    color: Color32::WHITE,
                },
            ]
        );
    }

    #[test]
    fn label_is_clamped_to_the_top_edge() {
        let categories = [car()];
        let anns = [ann(5, 1, Rect::new(0.0, 4.0, 50.0, 50.0))];
        let scene = Scene {
            annotations: &anns,
            categories: &categories,
            ..Default::default()
        };
        let out = build(&scene, &FixedAdvance(6.0));
        assert!(matches!(
            out[1],
            DrawCommand::FillRect { rect, .. } if rect.y == 0.0
        ));
        assert!(matches!(
            &out[2],
            DrawCommand::Text { pos, .. } if pos.y == LABEL_FONT_SIZE
        ));
    }

    #[test]
    fn unknown_category_renders_uncategorized_in_default_color() {
        let anns = [ann(5, 42, Rect::new(10.0, 30.0, 10.0, 10.0))];
        let scene = Scene {
            annotations: &anns,
            ..Default::default()
        };
        let out = build(&scene, &FixedAdvance(6.0));
        assert!(matches!(
            &out[0],
            DrawCommand::StrokeRect { color, .. } if *color == crate::model::default_color()
        ));
        assert!(matches!(
            &out[2],
            DrawCommand::Text { text, .. } if text == "uncategorized"
        ));
    }

    #[test]
    fn selected_annotation_uses_working_copy_and_handles() {
        let categories = [car()];
        let anns = [
            ann(5, 1, Rect::new(10.0, 30.0, 100.0, 70.0)),
            ann(6, 1, Rect::new(200.0, 200.0, 10.0, 10.0)),
        ];
        let dragged = ann(5, 1, Rect::new(20.0, 40.0, 100.0, 70.0));
        let scene = Scene {
            annotations: &anns,
            categories: &categories,
            selected: Some(&dragged),
            ..Default::default()
        };
        let out = build(&scene, &FixedAdvance(6.0));
        assert!(matches!(
            out[0],
            DrawCommand::StrokeRect { rect, width, .. }
                if rect == dragged.rect() && width == SELECTED_STROKE_WIDTH
        ));
        assert_eq!(handles(&out), 4);
        assert!(out.contains(&DrawCommand::Handle {
            center: egui::pos2(120.0, 110.0),
            fill: Color32::from_rgb(255, 0, 0),
        }));
    }

    #[test]
    fn layers_are_committed_then_drafts_then_optimistic() {
        let categories = [car()];
        let anns = [ann(5, 1, Rect::new(10.0, 30.0, 10.0, 10.0))];
        let optimistic = ann(-1, 1, Rect::new(300.0, 300.0, 20.0, 20.0));
        let scene = Scene {
            annotations: &anns,
            categories: &categories,
            drawing: Some(Rect::new(50.0, 50.0, -20.0, 30.0)),
            pending: Some(Rect::new(60.0, 60.0, 20.0, 20.0)),
            optimistic: Some(&optimistic),
            ..Default::default()
        };
        let out = build(&scene, &FixedAdvance(6.0));
        assert_eq!(out.len(), 3 + 2 + 3);
        assert!(matches!(
            out[3],
            DrawCommand::StrokeRect { dashed: true, color, .. } if color == DRAFT_COLOR
        ));
        assert!(matches!(
            out[4],
            DrawCommand::StrokeRect { dashed: true, rect, .. } if rect.x == 60.0
        ));
        assert!(matches!(
            out[5],
            DrawCommand::StrokeRect { dashed: false, rect, .. } if rect == optimistic.rect()
        ));
    }

    #[test]
    fn empty_scene_draws_nothing() {
        assert!(build(&Scene::default(), &FixedAdvance(6.0)).is_empty());
    }
}
