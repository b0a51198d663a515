//! Rectangle annotation of image lists with user-defined categories.

pub mod app;
pub mod categories;
pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod geometry;
pub mod import;
pub mod modal;
pub mod model;
pub mod paths;
pub mod render;
pub mod store;

pub use app::LabelerApp;
