//! Pointer and keyboard handling for the annotation canvas.
//!
//! The [`Editor`] never mutates images directly. It queues
//! [`StoreCommand`]s that the host applies on a later turn, and shows a
//! freshly created annotation as an optimistic overlay until the store's
//! annotation count catches up (see [`Editor::sync`]).

use egui::{Pos2, Vec2};
use tracing::debug;

use crate::geometry::{self, Handle, Rect};
use crate::model::{
    resolve_category, Annotation, AnnotationDraft, AnnotationId, AnnotationPatch, Category,
    CategoryId, Image,
};
use crate::render::Scene;
use crate::store::StoreCommand;

/// Id carried by an annotation the store has not confirmed yet.
pub const PROVISIONAL_ID: AnnotationId = -1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EditorSettings {
    pub double_click_secs: f64,
    pub min_draw_size: f32,
    pub handle_tolerance: f32,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            double_click_secs: 0.3,
            min_draw_size: 5.0,
            handle_tolerance: geometry::HANDLE_TOLERANCE,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DragMode {
    Move,
    Resize(Handle),
}

#[derive(Clone, Debug, PartialEq)]
enum Gesture {
    Idle,
    /// Extents are signed until the pointer is released.
    Drawing { rect: Rect },
    Dragging {
        mode: DragMode,
        original: Rect,
        start: Pos2,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorKey {
    Escape,
    Delete,
    Backspace,
}

#[derive(Clone, Debug)]
struct Optimistic {
    annotation: Annotation,
    expected_count: usize,
}

#[derive(Debug)]
pub struct Editor {
    settings: EditorSettings,
    image_path: Option<String>,
    gesture: Gesture,
    selected: Option<Annotation>,
    pending: Option<Rect>,
    optimistic: Option<Optimistic>,
    pending_delete: Option<AnnotationId>,
    last_pointer_down: Option<f64>,
    outbox: Vec<StoreCommand>,
    needs_repaint: bool,
}

impl Editor {
    pub fn new(settings: EditorSettings) -> Self {
        Self {
            settings,
            image_path: None,
            gesture: Gesture::Idle,
            selected: None,
            pending: None,
            optimistic: None,
            pending_delete: None,
            last_pointer_down: None,
            outbox: Vec::new(),
            needs_repaint: true,
        }
    }

    /// Point the editor at another image, dropping all transient state.
    pub fn set_image(&mut self, path: Option<&str>) {
        if self.image_path.as_deref() == path {
            return;
        }
        debug!(?path, "editor image changed");
        self.image_path = path.map(str::to_owned);
        self.gesture = Gesture::Idle;
        self.selected = None;
        self.pending = None;
        self.optimistic = None;
        self.pending_delete = None;
        self.last_pointer_down = None;
        self.needs_repaint = true;
    }

    pub fn image_path(&self) -> Option<&str> {
        self.image_path.as_deref()
    }

    pub fn selected(&self) -> Option<&Annotation> {
        self.selected.as_ref()
    }

    pub fn pending(&self) -> Option<Rect> {
        self.pending
    }

    /// The category modal is shown while a drawn rectangle awaits a category.
    pub fn modal_open(&self) -> bool {
        self.pending.is_some()
    }

    pub fn optimistic(&self) -> Option<&Annotation> {
        self.optimistic.as_ref().map(|o| &o.annotation)
    }

    /// Annotation waiting for the user to confirm its deletion.
    pub fn pending_delete(&self) -> Option<AnnotationId> {
        self.pending_delete
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.gesture, Gesture::Drawing { .. })
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        match self.gesture {
            Gesture::Dragging { mode, .. } => Some(mode),
            _ => None,
        }
    }

    /// Drain queued store mutations.
    pub fn take_commands(&mut self) -> Vec<StoreCommand> {
        std::mem::take(&mut self.outbox)
    }

    /// Whether anything visible changed since the last call.
    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.needs_repaint)
    }

    pub fn scene<'a>(&'a self, image: &'a Image, categories: &'a [Category]) -> Scene<'a> {
        Scene {
            annotations: &image.annotations,
            categories,
            selected: self.selected.as_ref(),
            drawing: match &self.gesture {
                Gesture::Drawing { rect } => Some(*rect),
                _ => None,
            },
            pending: self.pending,
            optimistic: self.optimistic(),
        }
    }

    // ── Pointer ────────────────────────────────────────────────────────────

    /// `time` is in seconds on a monotonic clock.
    pub fn pointer_down(&mut self, image: &Image, pos: Pos2, time: f64) {
        if self.modal_open() {
            return;
        }

        if let Some(prev) = self.last_pointer_down {
            if time - prev < self.settings.double_click_secs {
                self.selected = geometry::hit_test(&image.annotations, pos).cloned();
                debug!(selected = ?self.selected.as_ref().map(|a| a.id), "double-click");
                self.last_pointer_down = None;
                self.gesture = Gesture::Idle;
                self.needs_repaint = true;
                return;
            }
        }
        self.last_pointer_down = Some(time);

        let mode = self.selected.as_ref().and_then(|selected| {
            let rect = selected.rect();
            match geometry::corner_handle_at(pos, rect, self.settings.handle_tolerance) {
                Some(handle) => Some(DragMode::Resize(handle)),
                None if geometry::contains_point(rect, pos) => Some(DragMode::Move),
                None => None,
            }
        });

        self.gesture = match (mode, &self.selected) {
            (Some(mode), Some(selected)) => Gesture::Dragging {
                mode,
                original: selected.rect(),
                start: pos,
            },
            _ => Gesture::Drawing {
                rect: Rect::at(pos),
            },
        };
        self.needs_repaint = true;
    }

    pub fn pointer_move(&mut self, pos: Pos2) {
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Drawing { rect } => {
                rect.width = pos.x - rect.x;
                rect.height = pos.y - rect.y;
                self.needs_repaint = true;
            }
            Gesture::Dragging {
                mode,
                original,
                start,
            } => {
                let delta: Vec2 = pos - *start;
                let moved = match mode {
                    DragMode::Move => geometry::translate(*original, delta),
                    DragMode::Resize(handle) => geometry::resize(*original, *handle, delta),
                };
                if let Some(selected) = &mut self.selected {
                    selected.set_rect(moved);
                }
                self.needs_repaint = true;
            }
        }
    }

    pub fn pointer_up(&mut self, pos: Pos2) {
        self.pointer_move(pos);
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => {}
            Gesture::Drawing { rect } => {
                let rect = geometry::normalize(rect);
                let min = self.settings.min_draw_size;
                if rect.width > min && rect.height > min {
                    debug!(?rect, "draw finished, awaiting category");
                    self.pending = Some(rect);
                    self.last_pointer_down = None;
                }
                self.needs_repaint = true;
            }
            Gesture::Dragging { original, .. } => {
                let Some(selected) = &mut self.selected else {
                    return;
                };
                let rect = geometry::normalize(selected.rect());
                selected.set_rect(rect);
                if rect != original {
                    if let Some(image_path) = &self.image_path {
                        self.outbox.push(StoreCommand::Update {
                            image_path: image_path.clone(),
                            annotation_id: selected.id,
                            patch: AnnotationPatch::geometry(rect),
                        });
                    }
                    self.last_pointer_down = None;
                }
                self.needs_repaint = true;
            }
        }
    }

    // ── Category modal ─────────────────────────────────────────────────────

    pub fn choose_category(&mut self, image: &Image, categories: &[Category], id: CategoryId) {
        let Some(rect) = self.pending.take() else {
            return;
        };
        let Some(image_path) = self.image_path.clone() else {
            return;
        };
        let draft = AnnotationDraft {
            rect,
            category_id: id,
            category_name: resolve_category(categories, id).name,
        };
        let annotation = draft.clone().into_annotation(PROVISIONAL_ID);
        debug!(category = id, ?rect, "annotation created");

        self.optimistic = Some(Optimistic {
            annotation: annotation.clone(),
            expected_count: image.annotations.len() + 1,
        });
        self.selected = Some(annotation);
        self.outbox.push(StoreCommand::Add { image_path, draft });
        self.needs_repaint = true;
    }

    pub fn cancel_category(&mut self) {
        if self.pending.take().is_some() {
            self.needs_repaint = true;
        }
    }

    /// Reconcile local state with the authoritative copy of the image.
    ///
    /// Call once per turn after queued commands have been applied.
    pub fn sync(&mut self, image: &Image) {
        if let Some(optimistic) = &self.optimistic {
            if image.annotations.len() >= optimistic.expected_count {
                self.optimistic = None;
                if self.selected.as_ref().map(|s| s.id) == Some(PROVISIONAL_ID) {
                    self.selected = image.annotations.last().cloned();
                }
                self.needs_repaint = true;
            }
        }

        let dragging = matches!(self.gesture, Gesture::Dragging { .. });
        if let Some(selected) = &self.selected {
            if selected.id == PROVISIONAL_ID || dragging {
                return;
            }
            match image.annotations.iter().find(|a| a.id == selected.id) {
                Some(committed) if committed != selected => {
                    self.selected = Some(committed.clone());
                    self.needs_repaint = true;
                }
                Some(_) => {}
                None => {
                    self.selected = None;
                    self.needs_repaint = true;
                }
            }
        }
    }

    // ── Deletion / keys ────────────────────────────────────────────────────

    /// Ask to delete the selected annotation; nothing happens until confirmed.
    /// No-op while a drag is in progress.
    pub fn request_delete(&mut self) {
        if matches!(self.gesture, Gesture::Dragging { .. }) {
            return;
        }
        if let Some(selected) = &self.selected {
            self.pending_delete = Some(selected.id);
        }
    }

    pub fn request_delete_of(&mut self, id: AnnotationId) {
        self.pending_delete = Some(id);
    }

    pub fn resolve_delete(&mut self, confirmed: bool) {
        let Some(id) = self.pending_delete.take() else {
            return;
        };
        if !confirmed {
            return;
        }
        if let Some(image_path) = &self.image_path {
            self.outbox.push(StoreCommand::Delete {
                image_path: image_path.clone(),
                annotation_id: id,
            });
        }
        if self.selected.as_ref().map(|s| s.id) == Some(id) {
            self.selected = None;
            self.gesture = Gesture::Idle;
        }
        self.needs_repaint = true;
    }

    pub fn key(&mut self, key: EditorKey) {
        match key {
            EditorKey::Escape => {
                if self.selected.take().is_some() {
                    self.gesture = Gesture::Idle;
                    self.needs_repaint = true;
                }
            }
            EditorKey::Delete | EditorKey::Backspace => self.request_delete(),
        }
    }
}
