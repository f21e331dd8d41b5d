//! Render module for report generation

pub mod assets;
pub mod report;
pub mod templates;

pub use assets::AssetPublisher;
pub use report::ReportRenderer;
pub use templates::TemplateSet;
