use std::path::Path;
use tracing::info;

use crate::error::ExportError;
use crate::model::{resolve_category, Annotation, Category};

pub fn export_file_name(image_name: &str) -> String {
    format!("{image_name}_annotations.json")
}

/// Pretty-printed array; each object lists x, y, width, height, categoryId,
/// categoryName, id in that order. Names come from the current category
/// list, so deleted categories export as "uncategorized".
pub fn annotations_json(
    annotations: &[Annotation],
    categories: &[Category],
) -> Result<String, ExportError> {
    let resolved: Vec<Annotation> = annotations
        .iter()
        .map(|a| Annotation {
            category_name: resolve_category(categories, a.category_id).name,
            ..a.clone()
        })
        .collect();
    Ok(serde_json::to_string_pretty(&resolved)?)
}

pub fn write_annotations(
    path: &Path,
    annotations: &[Annotation],
    categories: &[Category],
) -> Result<(), ExportError> {
    let json = annotations_json(annotations, categories)?;
    std::fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Exported {} annotations to {}", annotations.len(), path.display());
    Ok(())
}
