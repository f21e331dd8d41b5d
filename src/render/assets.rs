//! Embedded-vs-external resolution for partials and bundled assets

use super::templates::{TemplateSet, DEFAULT_STYLESHEET};
use crate::options::RenderOptions;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Decides, for one render pass, whether each partial template is inlined
/// into the shell or published beside it, and publishes bundled assets.
pub struct AssetPublisher<'a> {
    templates: &'a TemplateSet,
    target_dir: &'a Path,
    use_ajax: bool,
}

impl<'a> AssetPublisher<'a> {
    pub fn new(templates: &'a TemplateSet, target_dir: &'a Path, options: &RenderOptions) -> Self {
        Self {
            templates,
            target_dir,
            use_ajax: options.use_ajax(),
        }
    }

    /// Resolve one partial: `Some(text)` to inline, or `None` after the
    /// partial has been published as a standalone file. Exactly one of the
    /// two happens per call.
    pub fn resolve_partial(&self, name: &str) -> Result<Option<String>> {
        if self.use_ajax {
            self.publish(name)?;
            Ok(None)
        } else {
            Ok(Some(self.templates.resolve(name)?))
        }
    }

    /// Publish the bundled default stylesheet under the target directory.
    pub fn publish_assets(&self) -> Result<()> {
        self.publish(DEFAULT_STYLESHEET)
    }

    fn publish(&self, name: &str) -> Result<()> {
        let text = self.templates.resolve(name)?;
        let dest = self.target_dir.join(name);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&dest, text).with_context(|| format!("Failed to write {}", dest.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::templates::PARTIALS;

    fn options_with_ajax(use_ajax: bool) -> RenderOptions {
        let mut options = RenderOptions::default();
        if use_ajax {
            options
                .client_defaults
                .insert("useAjax".to_string(), serde_json::Value::Bool(true));
        }
        options
    }

    #[test]
    fn inline_mode_returns_text_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_ajax(false);
        let templates = TemplateSet::Builtin;
        let publisher = AssetPublisher::new(&templates, dir.path(), &options);

        let resolved = publisher.resolve_partial("screenshot-modal.html").unwrap();
        assert!(resolved.unwrap().contains("screenshot-modal"));
        assert!(!dir.path().join("screenshot-modal.html").exists());
    }

    #[test]
    fn ajax_mode_publishes_file_and_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_ajax(true);
        let templates = TemplateSet::Builtin;
        let publisher = AssetPublisher::new(&templates, dir.path(), &options);

        for partial in PARTIALS {
            assert!(publisher.resolve_partial(partial).unwrap().is_none());
            assert!(dir.path().join(partial).exists());
        }
    }

    #[test]
    fn publish_assets_writes_the_default_stylesheet() {
        let dir = tempfile::tempdir().unwrap();
        let options = options_with_ajax(false);
        let templates = TemplateSet::Builtin;
        let publisher = AssetPublisher::new(&templates, dir.path(), &options);

        publisher.publish_assets().unwrap();

        let css = fs::read_to_string(dir.path().join("assets/tally.css")).unwrap();
        assert!(css.contains(":root"));
    }

    #[test]
    fn ajax_mode_copies_from_a_template_directory() {
        let template_dir = tempfile::tempdir().unwrap();
        fs::write(
            template_dir.path().join("screenshot-modal.html"),
            "<div id=\"screenshot-modal\"></div>",
        )
        .unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let options = options_with_ajax(true);
        let templates = TemplateSet::Dir(template_dir.path().to_path_buf());
        let publisher = AssetPublisher::new(&templates, out_dir.path(), &options);

        assert!(publisher
            .resolve_partial("screenshot-modal.html")
            .unwrap()
            .is_none());
        assert_eq!(
            fs::read_to_string(out_dir.path().join("screenshot-modal.html")).unwrap(),
            "<div id=\"screenshot-modal\"></div>"
        );
    }

    #[test]
    fn publish_failure_surfaces_as_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // Occupy the assets path with a file so the directory cannot be made.
        fs::write(dir.path().join("assets"), "").unwrap();
        let options = options_with_ajax(false);
        let templates = TemplateSet::Builtin;
        let publisher = AssetPublisher::new(&templates, dir.path(), &options);

        assert!(publisher.publish_assets().is_err());
    }
}
