//! User-defined categories, persisted as a JSON list.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::error::StorageError;
use crate::model::{Category, CategoryId, DEFAULT_COLOR};
use crate::store::IdGenerator;

pub const PRESET_COLORS: [&str; 10] = [
    "#007bff", "#28a745", "#dc3545", "#ffc107", "#17a2b8", "#6f42c1", "#e83e8c", "#fd7e14",
    "#20c997", "#6c757d",
];

#[derive(Debug, Default)]
pub struct CategoryStore {
    categories: Vec<Category>,
    ids: IdGenerator,
    /// Where mutations are written back; `None` keeps the list in memory.
    file: Option<PathBuf>,
}

impl CategoryStore {
    pub fn in_memory(categories: Vec<Category>) -> Self {
        let mut store = Self::default();
        store.set_categories(categories);
        store
    }

    /// Load from `file`; a missing or corrupted file yields an empty list.
    pub fn open(file: PathBuf) -> Self {
        let categories = if file.exists() {
            match read_categories(&file) {
                Ok(categories) => {
                    info!("Loaded {} categories from {:?}", categories.len(), file);
                    categories
                }
                Err(e) => {
                    warn!("Starting with no categories: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };
        let mut store = Self::in_memory(categories);
        store.file = Some(file);
        store
    }

    pub fn all(&self) -> &[Category] {
        &self.categories
    }

    pub fn set_categories(&mut self, categories: Vec<Category>) {
        for c in &categories {
            self.ids.observe(c.id);
        }
        self.categories = categories;
    }

    pub fn add(&mut self, name: &str, color: Option<&str>) -> Result<CategoryId, StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyCategoryName);
        }
        let id = self.ids.next_id();
        self.categories.push(Category {
            id,
            name: name.to_owned(),
            color: color.unwrap_or(DEFAULT_COLOR).to_owned(),
        });
        debug!(id, name, "category added");
        self.persist()?;
        Ok(id)
    }

    pub fn update(&mut self, id: CategoryId, name: &str, color: &str) -> Result<(), StorageError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StorageError::EmptyCategoryName);
        }
        let category = self
            .categories
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(StorageError::UnknownCategory(id))?;
        category.name = name.to_owned();
        category.color = color.to_owned();
        debug!(id, name, "category updated");
        self.persist()
    }

    /// Annotations that still point at the deleted id render as uncategorized.
    pub fn delete(&mut self, id: CategoryId) -> Result<(), StorageError> {
        self.categories.retain(|c| c.id != id);
        debug!(id, "category deleted");
        self.persist()
    }

    fn persist(&self) -> Result<(), StorageError> {
        match &self.file {
            Some(path) => write_categories(path, &self.categories),
            None => Ok(()),
        }
    }
}

pub fn read_categories(path: &Path) -> Result<Vec<Category>, StorageError> {
    let json = std::fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&json).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_categories(path: &Path, categories: &[Category]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    let json = serde_json::to_string_pretty(categories).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn add_trims_and_defaults_color() {
        let mut store = CategoryStore::default();
        let id = store.add("  Car  ", None).unwrap();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].id, id);
        assert_eq!(store.all()[0].name, "Car");
        assert_eq!(store.all()[0].color, DEFAULT_COLOR);
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut store = CategoryStore::default();
        assert!(matches!(
            store.add("   ", Some("#ff0000")),
            Err(StorageError::EmptyCategoryName)
        ));
        assert!(store.all().is_empty());
    }

    #[test]
    fn update_and_delete() {
        let mut store = CategoryStore::default();
        let car = store.add("Car", Some("#ff0000")).unwrap();
        let bus = store.add("Bus", Some("#00ff00")).unwrap();
        store.update(car, "Truck", "#0000ff").unwrap();
        assert_eq!(store.all()[0].name, "Truck");
        assert_eq!(store.all()[0].color, "#0000ff");
        assert!(matches!(
            store.update(12, "x", "#000000"),
            Err(StorageError::UnknownCategory(12))
        ));

        store.delete(car).unwrap();
        assert_eq!(store.all().len(), 1);
        assert_eq!(store.all()[0].id, bus);
    }

    #[test]
    fn add_after_the_largest_possible_id_does_not_overflow() {
        let mut store = CategoryStore::in_memory(vec![Category {
            id: i64::MAX,
            name: "Car".into(),
            color: DEFAULT_COLOR.into(),
        }]);
        assert!(store.add("Bus", None).is_ok());
        assert_eq!(store.all().len(), 2);
    }

    #[test]
    fn mutations_are_written_back_to_disk() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("image-labeler").join("categories.json");

        let mut store = CategoryStore::open(file.clone());
        store.add("Person", Some("#e83e8c")).unwrap();

        let reopened = CategoryStore::open(file);
        assert_eq!(reopened.all(), store.all());
    }

    #[test]
    fn corrupted_file_opens_empty() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("categories.json");
        std::fs::write(&file, "[{").unwrap();
        assert!(CategoryStore::open(file).all().is_empty());
    }
}
