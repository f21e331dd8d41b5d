//! Tally: Combined HTML report builder for parallel test runs
//!
//! This library collects per-run metadata records into a shared
//! `combined.json` dataset and renders the dataset into a standalone
//! HTML report via literal-marker substitution.

pub mod options;
pub mod render;
pub mod snapshot;
pub mod store;

#[cfg(test)]
pub(crate) mod testlog;

use std::path::Path;

/// One run's metadata record, an arbitrary JSON object with keys kept
/// in insertion order.
pub type MetaData = serde_json::Map<String, serde_json::Value>;

/// Public API: append one run's metadata to the combined dataset and
/// re-render the report into `target_dir`. Used by reporter hooks at the
/// end of every run.
///
/// * `meta` - the finished run's metadata record
/// * `target_dir` - report output directory holding `combined.json`
/// * `options` - render options, typically from [`options::load_options`]
///
/// Never raises. Storage and render failures are logged where they occur
/// and the pass keeps whatever artifacts it could produce.
pub fn aggregate_and_render(meta: MetaData, target_dir: &Path, options: &options::RenderOptions) {
    let dataset = store::CombinedStore::new(target_dir).append(meta);

    let renderer = match &options.template_dir {
        Some(dir) => render::ReportRenderer::with_template_dir(dir),
        None => render::ReportRenderer::new(),
    };
    renderer.render(&dataset, target_dir, options);
}
