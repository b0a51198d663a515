//! The authoritative list of images and their annotations.
//!
//! Every image is addressed by its `path`; list positions shift when the
//! visible list is filtered, so they are never used as keys.

use tracing::debug;

use crate::model::{AnnotationDraft, AnnotationId, AnnotationPatch, Image};

/// Hands out strictly increasing ids seeded from the wall clock.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn next_id(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last = now.max(self.last.saturating_add(1));
        self.last
    }

    /// Make sure future ids never collide with `id`.
    pub fn observe(&mut self, id: i64) {
        self.last = self.last.max(id);
    }
}

/// A mutation requested by the editor, applied by the host on a later turn.
#[derive(Clone, Debug, PartialEq)]
pub enum StoreCommand {
    Add {
        image_path: String,
        draft: AnnotationDraft,
    },
    Update {
        image_path: String,
        annotation_id: AnnotationId,
        patch: AnnotationPatch,
    },
    Delete {
        image_path: String,
        annotation_id: AnnotationId,
    },
}

#[derive(Debug, Default)]
pub struct ImageStore {
    images: Vec<Image>,
    ids: IdGenerator,
}

impl ImageStore {
    pub fn new(images: Vec<Image>) -> Self {
        let mut store = Self::default();
        store.replace_images(images);
        store
    }

    pub fn replace_images(&mut self, images: Vec<Image>) {
        for ann in images.iter().flat_map(|img| &img.annotations) {
            self.ids.observe(ann.id);
        }
        self.images = images;
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    pub fn image(&self, path: &str) -> Option<&Image> {
        self.images.iter().find(|img| img.path == path)
    }

    fn image_mut(&mut self, path: &str) -> Option<&mut Image> {
        self.images.iter_mut().find(|img| img.path == path)
    }

    /// Append an annotation; the store picks its id.
    pub fn add_annotation(&mut self, path: &str, draft: AnnotationDraft) -> Option<AnnotationId> {
        let id = self.ids.next_id();
        let Some(image) = self.image_mut(path) else {
            debug!(path, "add ignored: unknown image");
            return None;
        };
        image.annotations.push(draft.into_annotation(id));
        debug!(path, id, "annotation added");
        Some(id)
    }

    pub fn update_annotation(&mut self, path: &str, id: AnnotationId, patch: AnnotationPatch) {
        let Some(annotation) = self
            .image_mut(path)
            .and_then(|img| img.annotations.iter_mut().find(|a| a.id == id))
        else {
            debug!(path, id, "update ignored: unknown annotation");
            return;
        };
        patch.apply(annotation);
        debug!(path, id, "annotation updated");
    }

    pub fn delete_annotation(&mut self, path: &str, id: AnnotationId) {
        if let Some(image) = self.image_mut(path) {
            let before = image.annotations.len();
            image.annotations.retain(|a| a.id != id);
            if image.annotations.len() != before {
                debug!(path, id, "annotation deleted");
            }
        }
    }

    pub fn apply(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::Add { image_path, draft } => {
                self.add_annotation(&image_path, draft);
            }
            StoreCommand::Update {
                image_path,
                annotation_id,
                patch,
            } => self.update_annotation(&image_path, annotation_id, patch),
            StoreCommand::Delete {
                image_path,
                annotation_id,
            } => self.delete_annotation(&image_path, annotation_id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;

    fn draft(x: f32) -> AnnotationDraft {
        AnnotationDraft {
            rect: Rect::new(x, 0.0, 10.0, 10.0),
            category_id: 1,
            category_name: "Car".into(),
        }
    }

    fn store() -> ImageStore {
        ImageStore::new(vec![
            Image::new(0, "a/one.png", "one.png"),
            Image::new(1, "b/two.png", "two.png"),
        ])
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let mut ids = IdGenerator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert!(a < b && b < c);
        ids.observe(c + 1000);
        assert!(ids.next_id() > c + 1000);
    }

    #[test]
    fn next_id_saturates_after_the_largest_id() {
        let mut ids = IdGenerator::default();
        ids.observe(i64::MAX);
        assert_eq!(ids.next_id(), i64::MAX);
    }

    #[test]
    fn add_appends_to_the_addressed_image_only() {
        let mut s = store();
        let first = s.add_annotation("b/two.png", draft(1.0)).unwrap();
        let second = s.add_annotation("b/two.png", draft(2.0)).unwrap();
        assert_ne!(first, second);

        let two = s.image("b/two.png").unwrap();
        assert_eq!(two.annotations.len(), 2);
        assert_eq!(two.annotations[0].x, 1.0);
        assert_eq!(two.annotations[1].x, 2.0);
        assert!(s.image("a/one.png").unwrap().annotations.is_empty());
        assert_eq!(s.add_annotation("missing.png", draft(0.0)), None);
    }

    #[test]
    fn update_merges_geometry_and_ignores_unknown_ids() {
        let mut s = store();
        let id = s.add_annotation("a/one.png", draft(1.0)).unwrap();
        s.update_annotation(
            "a/one.png",
            id,
            AnnotationPatch::geometry(Rect::new(5.0, 6.0, 7.0, 8.0)),
        );
        s.update_annotation("a/one.png", id + 1, AnnotationPatch::geometry(Rect::default()));
        let ann = &s.image("a/one.png").unwrap().annotations[0];
        assert_eq!(ann.rect(), Rect::new(5.0, 6.0, 7.0, 8.0));
        assert_eq!(ann.category_name, "Car");
    }

    #[test]
    fn delete_removes_only_the_matching_annotation() {
        let mut s = store();
        let keep = s.add_annotation("a/one.png", draft(1.0)).unwrap();
        let gone = s.add_annotation("a/one.png", draft(2.0)).unwrap();
        s.apply(StoreCommand::Delete {
            image_path: "a/one.png".into(),
            annotation_id: gone,
        });
        s.delete_annotation("a/one.png", 123);
        let anns = &s.image("a/one.png").unwrap().annotations;
        assert_eq!(anns.len(), 1);
        assert_eq!(anns[0].id, keep);
    }

    #[test]
    fn replace_images_keeps_ids_ahead_of_loaded_annotations() {
        let mut image = Image::new(0, "x.png", "x.png");
        image.annotations.push(draft(0.0).into_annotation(i64::MAX / 2));
        let mut s = ImageStore::new(vec![image]);
        let id = s.add_annotation("x.png", draft(1.0)).unwrap();
        assert!(id > i64::MAX / 2);
    }
}
