//! Turning an image-list JSON document into [`Image`] records.

use serde_json::Value;
use std::path::Path;
use tracing::info;

use crate::error::ImportError;
use crate::model::Image;

pub fn read_image_list(path: &Path) -> Result<Vec<Image>, ImportError> {
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return Err(ImportError::NotJson(path.to_path_buf()));
    }
    let text = std::fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let images = parse_image_list(&text)?;
    info!("Imported {} images from {:?}", images.len(), path);
    Ok(images)
}

/// Accepted shapes: `[..paths]`, `{"images": [..]}`, `{"paths": [..]}`, or an
/// object whose string values ending in `.png` are taken as paths.
pub fn parse_image_list(json: &str) -> Result<Vec<Image>, ImportError> {
    let value: Value = serde_json::from_str(json)?;
    let paths: Vec<String> = match &value {
        Value::Array(items) => strings(items),
        Value::Object(map) => match (map.get("images"), map.get("paths")) {
            (Some(Value::Array(items)), _) => strings(items),
            (_, Some(Value::Array(items))) => strings(items),
            _ => map
                .values()
                .filter_map(Value::as_str)
                .filter(|s| s.to_lowercase().ends_with(".png"))
                .map(str::to_owned)
                .collect(),
        },
        _ => Vec::new(),
    };

    if paths.is_empty() {
        return Err(ImportError::NoImagePaths);
    }

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(index, path)| {
            let name = display_name(&path, index);
            Image::new(index, path, name)
        })
        .collect())
}

fn strings(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_owned)
        .collect()
}

fn display_name(path: &str, index: usize) -> String {
    match path.rsplit(['/', '\\']).next() {
        Some(last) if !last.is_empty() => last.to_owned(),
        _ => format!("image_{index}"),
    }
}
