use eframe::egui;
use egui_extras::{Column, TableBuilder};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

use crate::categories::{CategoryStore, PRESET_COLORS};
use crate::config::AppConfig;
use crate::editor::{Editor, EditorKey};
use crate::model::{color_to_hex, parse_hex_color, resolve_category, CategoryId, Image};
use crate::modal::{self, ModalOutcome};
use crate::store::ImageStore;
use crate::{export, import, render};

// ── Page / Image State ──────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
enum Page {
    Annotate,
    Categories,
}

enum Picture {
    Ready {
        texture: egui::TextureHandle,
        size: egui::Vec2,
    },
    /// Broken reference; the canvas stays inert until another image loads.
    Failed,
}

struct LoadedPicture {
    path: String,
    picture: Picture,
}

#[derive(Default)]
struct CategoryForm {
    name: String,
    color: [f32; 3],
    editing: Option<(CategoryId, String, [f32; 3])>,
}

fn rgb_to_hex(rgb: [f32; 3]) -> String {
    color_to_hex(egui::Color32::from_rgb(
        (rgb[0] * 255.0).round() as u8,
        (rgb[1] * 255.0).round() as u8,
        (rgb[2] * 255.0).round() as u8,
    ))
}

fn hex_to_rgb(hex: &str) -> [f32; 3] {
    let c = parse_hex_color(hex).unwrap_or_else(crate::model::default_color);
    [
        c.r() as f32 / 255.0,
        c.g() as f32 / 255.0,
        c.b() as f32 / 255.0,
    ]
}

fn confirm(title: &str, description: &str) -> bool {
    rfd::MessageDialog::new()
        .set_level(rfd::MessageLevel::Warning)
        .set_title(title)
        .set_description(description)
        .set_buttons(rfd::MessageButtons::YesNo)
        .show()
        == rfd::MessageDialogResult::Yes
}

// ── App ─────────────────────────────────────────────────────────────────────

pub struct LabelerApp {
    config: AppConfig,
    store: ImageStore,
    categories: CategoryStore,
    editor: Editor,

    page: Page,
    active_path: Option<String>,
    picture: Option<LoadedPicture>,
    /// Primary button went down on the canvas and has not been released.
    canvas_grab: bool,

    category_form: CategoryForm,
    status: Option<String>,
}

impl LabelerApp {
    pub fn new(config: AppConfig, categories: CategoryStore, image_list: Option<PathBuf>) -> Self {
        let mut app = Self {
            editor: Editor::new(config.editor_settings()),
            config,
            store: ImageStore::default(),
            categories,
            page: Page::Annotate,
            active_path: None,
            picture: None,
            canvas_grab: false,
            category_form: CategoryForm {
                color: hex_to_rgb(PRESET_COLORS[0]),
                ..Default::default()
            },
            status: None,
        };
        if let Some(path) = image_list {
            app.import_list(&path);
        }
        app
    }

    fn active_image(&self) -> Option<&Image> {
        self.active_path.as_deref().and_then(|p| self.store.image(p))
    }

    fn select_image(&mut self, path: Option<String>) {
        self.editor.set_image(path.as_deref());
        self.active_path = path;
        self.canvas_grab = false;
    }

    fn import_list(&mut self, path: &Path) {
        match import::read_image_list(path) {
            Ok(images) => {
                self.status = Some(format!("Loaded {} images", images.len()));
                self.store.replace_images(images);
                self.select_image(None);
                self.config.last_image_list = Some(path.to_path_buf());
                self.config.save();
            }
            Err(e) => {
                warn!("Image list import failed: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn export_active(&mut self) {
        let Some(image) = self.active_image() else {
            return;
        };
        let Some(target) = rfd::FileDialog::new()
            .add_filter("JSON", &["json"])
            .set_file_name(export::export_file_name(&image.name))
            .save_file()
        else {
            return;
        };
        let written = export::write_annotations(&target, &image.annotations, self.categories.all());
        self.status = Some(match written {
            Ok(()) => format!("Exported to {}", target.display()),
            Err(e) => {
                error!("{}", e);
                e.to_string()
            }
        });
    }

    /// Apply the editor's queued mutations, then let it reconcile.
    fn flush_store_commands(&mut self) {
        for command in self.editor.take_commands() {
            self.store.apply(command);
        }
        if let Some(image) = self
            .active_path
            .as_deref()
            .and_then(|p| self.store.image(p))
        {
            self.editor.sync(image);
        }
    }

    fn ensure_picture(&mut self, ctx: &egui::Context) {
        let Some(path) = self.active_path.clone() else {
            self.picture = None;
            return;
        };
        if self.picture.as_ref().is_some_and(|p| p.path == path) {
            return;
        }
        let picture = match image::open(&path) {
            Ok(img) => {
                let rgba = img.to_rgba8();
                let size = [rgba.width() as usize, rgba.height() as usize];
                let pixels = rgba.as_flat_samples();
                let color_image = egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice());
                info!("Loaded image {} ({}x{})", path, size[0], size[1]);
                Picture::Ready {
                    texture: ctx.load_texture(&path, color_image, egui::TextureOptions::LINEAR),
                    size: egui::vec2(size[0] as f32, size[1] as f32),
                }
            }
            Err(e) => {
                warn!("Failed to load image {}: {}", path, e);
                Picture::Failed
            }
        };
        self.picture = Some(LoadedPicture { path, picture });
        ctx.request_repaint();
    }

    fn resolve_pending_delete(&mut self) {
        if self.editor.pending_delete().is_some() {
            let confirmed = confirm("Delete annotation", "Delete this annotation?");
            self.editor.resolve_delete(confirmed);
        }
    }

    // ── Panels ──────────────────────────────────────────────────────────────

    fn toolbar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.selectable_value(&mut self.page, Page::Annotate, "Annotate");
            ui.selectable_value(&mut self.page, Page::Categories, "Categories");
            ui.separator();
            if ui.button("Load image list…").clicked() {
                let picked = rfd::FileDialog::new()
                    .add_filter("JSON", &["json"])
                    .pick_file();
                if let Some(path) = picked {
                    self.import_list(&path);
                }
            }
            let can_export = self.active_image().is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export annotations"))
                .clicked()
            {
                self.export_active();
            }
            if let Some(status) = &self.status {
                ui.separator();
                ui.label(status.as_str());
            }
        });
    }

    fn image_list(&mut self, ui: &mut egui::Ui) {
        let images = self.store.images();
        if images.is_empty() {
            ui.centered_and_justified(|ui| ui.weak("Load an image list first"));
            return;
        }
        ui.heading(format!("Images ({})", images.len()));
        ui.separator();
        let mut clicked = None;
        egui::ScrollArea::vertical().show(ui, |ui| {
            for image in images {
                let active = self.active_path.as_deref() == Some(image.path.as_str());
                ui.horizontal(|ui| {
                    if ui.selectable_label(active, image.path.as_str()).clicked() {
                        clicked = Some(image.path.clone());
                    }
                    if !image.annotations.is_empty() {
                        ui.label(
                            egui::RichText::new(image.annotations.len().to_string())
                                .strong()
                                .color(egui::Color32::WHITE)
                                .background_color(egui::Color32::from_rgb(0x28, 0xa7, 0x45)),
                        );
                    }
                });
            }
        });
        if let Some(path) = clicked {
            self.select_image(Some(path));
        }
    }

    fn annotation_list(&mut self, ui: &mut egui::Ui) {
        let Some(image) = self.active_image() else {
            ui.heading("Annotations");
            ui.weak("Select an image from the list");
            return;
        };
        ui.heading(format!("Annotations ({})", image.annotations.len()));
        ui.separator();
        if image.annotations.is_empty() {
            ui.weak("No annotations yet");
            return;
        }

        let categories = self.categories.all();
        let mut delete = None;
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Category");
                });
                header.col(|ui| {
                    ui.strong("Geometry");
                });
                header.col(|_| {});
            })
            .body(|mut body| {
                for ann in &image.annotations {
                    let category = resolve_category(categories, ann.category_id);
                    body.row(36.0, |mut row| {
                        row.col(|ui| {
                            ui.label(egui::RichText::new("■").color(category.color));
                            ui.label(category.name.as_str());
                        });
                        row.col(|ui| {
                            ui.label(format!(
                                "({}, {})  {} × {}",
                                ann.x.round(),
                                ann.y.round(),
                                ann.width.round(),
                                ann.height.round()
                            ));
                        });
                        row.col(|ui| {
                            if ui.small_button("Delete").clicked() {
                                delete = Some(ann.id);
                            }
                        });
                    });
                }
            });

        if let Some(id) = delete {
            self.editor.request_delete_of(id);
        }
    }

    fn canvas(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let Some(image) = self.active_path.as_deref().and_then(|p| self.store.image(p)) else {
            ui.centered_and_justified(|ui| ui.weak("Select an image from the list"));
            return;
        };
        ui.heading(image.name.as_str());
        ui.separator();

        let Some(loaded) = &self.picture else {
            return;
        };
        let (texture, natural) = match &loaded.picture {
            Picture::Ready { texture, size } => (texture, *size),
            Picture::Failed => {
                let (rect, _) = ui.allocate_exact_size(
                    egui::vec2(ui.available_width(), 400.0),
                    egui::Sense::hover(),
                );
                render::paint_placeholder(ui.painter(), rect);
                return;
            }
        };

        egui::ScrollArea::both().show(ui, |ui| {
            // Fit to the available width, never upscale.
            let scale = (ui.available_width() / natural.x).min(1.0);
            let (response, painter) =
                ui.allocate_painter(natural * scale, egui::Sense::click_and_drag());
            let canvas_rect = response.rect;
            let origin = canvas_rect.min;

            painter.image(
                texture.id(),
                canvas_rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );

            // Pointer → editor, in canvas-local coordinates
            if !self.editor.modal_open() {
                let (pressed, released, latest, time) = ctx.input(|i| {
                    (
                        i.pointer.primary_pressed(),
                        i.pointer.primary_released(),
                        i.pointer.latest_pos(),
                        i.time,
                    )
                });
                if let Some(pos) = latest {
                    let local = (pos - origin).to_pos2();
                    if pressed && response.hovered() {
                        self.editor.pointer_down(image, local, time);
                        self.canvas_grab = true;
                    } else if self.canvas_grab && !released {
                        self.editor.pointer_move(local);
                    }
                    if released && self.canvas_grab {
                        self.editor.pointer_up(local);
                        self.canvas_grab = false;
                    }
                }
            }

            let scene = self.editor.scene(image, self.categories.all());
            let commands = render::build(&scene, &painter);
            render::paint(&painter, origin, &commands);

            if response.hovered() {
                ctx.set_cursor_icon(egui::CursorIcon::Crosshair);
            }
        });
    }

    fn category_page(&mut self, ui: &mut egui::Ui) {
        ui.heading("Categories");
        ui.label("Manage annotation categories and their colors");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Name:");
            ui.text_edit_singleline(&mut self.category_form.name);
            ui.color_edit_button_rgb(&mut self.category_form.color);
            if ui.button("Add").clicked() {
                let color = rgb_to_hex(self.category_form.color);
                match self.categories.add(&self.category_form.name, Some(&color)) {
                    Ok(_) => {
                        self.category_form.name.clear();
                        self.category_form.color = hex_to_rgb(PRESET_COLORS[0]);
                    }
                    Err(e) => self.status = Some(e.to_string()),
                }
            }
        });
        ui.horizontal(|ui| {
            for preset in PRESET_COLORS {
                let swatch = egui::Button::new("")
                    .fill(parse_hex_color(preset).unwrap_or_default())
                    .min_size(egui::vec2(20.0, 20.0));
                if ui.add(swatch).clicked() {
                    self.category_form.color = hex_to_rgb(preset);
                }
            }
        });
        ui.separator();

        if self.categories.all().is_empty() {
            ui.weak("No categories yet");
            return;
        }

        let mut edit_start = None;
        let mut delete = None;
        let mut save = false;
        let mut cancel = false;
        let editing = &mut self.category_form.editing;
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::remainder())
            .column(Column::auto())
            .header(20.0, |mut header| {
                header.col(|ui| {
                    ui.strong("Color");
                });
                header.col(|ui| {
                    ui.strong("Name");
                });
                header.col(|_| {});
            })
            .body(|mut body| {
                for category in self.categories.all() {
                    body.row(28.0, |mut row| match editing {
                        Some((id, name, color)) if *id == category.id => {
                            row.col(|ui| {
                                ui.color_edit_button_rgb(color);
                            });
                            row.col(|ui| {
                                ui.text_edit_singleline(name);
                            });
                            row.col(|ui| {
                                save = ui.small_button("Save").clicked();
                                cancel = ui.small_button("Cancel").clicked();
                            });
                        }
                        _ => {
                            row.col(|ui| {
                                let c = parse_hex_color(&category.color).unwrap_or_default();
                                ui.label(egui::RichText::new("■").color(c));
                            });
                            row.col(|ui| {
                                ui.label(category.name.as_str());
                            });
                            row.col(|ui| {
                                if ui.small_button("Edit").clicked() {
                                    edit_start = Some(category.clone());
                                }
                                if ui.small_button("Delete").clicked() {
                                    delete = Some(category.id);
                                }
                            });
                        }
                    });
                }
            });

        if let Some(category) = edit_start {
            self.category_form.editing =
                Some((category.id, category.name, hex_to_rgb(&category.color)));
        }
        if cancel {
            self.category_form.editing = None;
        } else if save {
            if let Some((id, name, color)) = self.category_form.editing.take() {
                if let Err(e) = self.categories.update(id, &name, &rgb_to_hex(color)) {
                    self.status = Some(e.to_string());
                }
            }
        }
        if let Some(id) = delete {
            if confirm("Delete category", "Delete this category?") {
                if let Err(e) = self.categories.delete(id) {
                    self.status = Some(e.to_string());
                }
            }
        }
    }
}

// ── eframe App impl ────────────────────────────────────────────────────────

impl eframe::App for LabelerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.flush_store_commands();
        self.ensure_picture(ctx);

        // Keyboard shortcuts
        if self.page == Page::Annotate && !self.editor.modal_open() && !ctx.wants_keyboard_input()
        {
            ctx.input(|i| {
                if i.key_pressed(egui::Key::Escape) {
                    self.editor.key(EditorKey::Escape);
                }
                if i.key_pressed(egui::Key::Delete) {
                    self.editor.key(EditorKey::Delete);
                }
                if i.key_pressed(egui::Key::Backspace) {
                    self.editor.key(EditorKey::Backspace);
                }
            });
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| self.toolbar(ui));

        match self.page {
            Page::Annotate => {
                egui::SidePanel::left("images")
                    .resizable(true)
                    .default_width(260.0)
                    .show(ctx, |ui| self.image_list(ui));
                egui::SidePanel::right("annotations")
                    .resizable(true)
                    .default_width(300.0)
                    .show(ctx, |ui| self.annotation_list(ui));
                egui::CentralPanel::default().show(ctx, |ui| self.canvas(ui, ctx));
            }
            Page::Categories => {
                egui::CentralPanel::default().show(ctx, |ui| self.category_page(ui));
            }
        }

        if self.editor.modal_open() {
            match modal::show(ctx, self.categories.all()) {
                Some(ModalOutcome::Chosen(id)) => {
                    if let Some(image) = self
                        .active_path
                        .as_deref()
                        .and_then(|p| self.store.image(p))
                    {
                        self.editor.choose_category(image, self.categories.all(), id);
                    }
                }
                Some(ModalOutcome::Cancelled) => self.editor.cancel_category(),
                None => {}
            }
        }

        self.resolve_pending_delete();

        if self.editor.take_repaint() {
            ctx.request_repaint();
        }
    }
}
