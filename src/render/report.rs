//! One render pass: markers in, artifacts out

use super::assets::AssetPublisher;
use super::templates::{TemplateSet, DEFAULT_STYLESHEET, PARTIALS, SCRIPT_TEMPLATE, SHELL_TEMPLATE};
use crate::options::{JsSource, RenderOptions};
use crate::MetaData;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const CSS_MARKER: &str = "<!-- Here will be CSS placed -->";
const TITLE_MARKER: &str = "<!-- Here goes title -->";
const INCLUDES_MARKER: &str = "<!-- Here will be templates placed -->";
const RESULTS_MARKER: &str = "[];//'<Results Replacement>';";
const SORT_MARKER: &str = "defaultSortFunction/*<Sort Function Replacement>*/";
const CLIENT_DEFAULTS_MARKER: &str = "{};//'<Client Defaults Replacement>';";

/// Renders the combined dataset and options into the report artifacts.
pub struct ReportRenderer {
    templates: TemplateSet,
}

impl ReportRenderer {
    /// Renderer over the templates compiled into the binary.
    pub fn new() -> Self {
        Self {
            templates: TemplateSet::Builtin,
        }
    }

    /// Renderer over templates read from `dir` on every pass.
    pub fn with_template_dir(dir: &Path) -> Self {
        Self {
            templates: TemplateSet::Dir(dir.to_path_buf()),
        }
    }

    /// Render one pass into `target_dir`: the HTML shell under the
    /// configured document name, the script as `app.js`, and the bundled
    /// assets when requested.
    ///
    /// Never fails. Each artifact is guarded separately, so one failed
    /// write leaves the rest of the pass intact; failures go to the log
    /// channel, one entry each.
    pub fn render(&self, dataset: &[MetaData], target_dir: &Path, options: &RenderOptions) {
        if let Err(e) = fs::create_dir_all(target_dir) {
            tracing::error!(
                "report directory {} not created: {}",
                target_dir.display(),
                e
            );
        }

        let publisher = AssetPublisher::new(&self.templates, target_dir, options);

        match self.render_shell(&publisher, options) {
            Ok(shell) => write_artifact(&target_dir.join(&options.doc_name), &shell),
            Err(e) => tracing::error!("report shell not rendered: {:#}", e),
        }

        match self.render_script(dataset, options) {
            Ok(script) => write_artifact(&target_dir.join(SCRIPT_TEMPLATE), &script),
            Err(e) => tracing::error!("report script not rendered: {:#}", e),
        }

        if options.prepare_assets {
            if let Err(e) = publisher.publish_assets() {
                tracing::error!("bundled assets not published: {:#}", e);
            }
        }
    }

    fn render_shell(&self, publisher: &AssetPublisher, options: &RenderOptions) -> Result<String> {
        let mut shell = self.templates.resolve(SHELL_TEMPLATE)?;

        let css_target = options
            .css_override_file
            .as_deref()
            .unwrap_or(DEFAULT_STYLESHEET);
        let css_link = format!("<link rel=\"stylesheet\" href=\"{}\">", css_target);
        shell = shell.replace(CSS_MARKER, &css_link);

        shell = shell.replace(TITLE_MARKER, options.doc_title.as_deref().unwrap_or(""));

        let mut includes = String::new();
        for partial in PARTIALS {
            if let Some(text) = publisher.resolve_partial(partial)? {
                includes.push_str(&text);
            }
        }
        shell = shell.replace(INCLUDES_MARKER, &includes);

        Ok(shell)
    }

    fn render_script(&self, dataset: &[MetaData], options: &RenderOptions) -> Result<String> {
        let mut script = self.templates.resolve(SCRIPT_TEMPLATE)?;

        let results = if options.use_ajax() {
            "[];".to_string()
        } else {
            let mut json =
                serde_json::to_string(dataset).context("Failed to serialize the dataset")?;
            json.push(';');
            json
        };
        script = script.replace(RESULTS_MARKER, &results);

        let sort = options
            .sort_function
            .as_ref()
            .map(JsSource::as_str)
            .unwrap_or("defaultSortFunction");
        script = script.replace(SORT_MARKER, sort);

        let mut defaults = serde_json::to_string(&options.client_defaults)
            .context("Failed to serialize client defaults")?;
        defaults.push(';');
        script = script.replace(CLIENT_DEFAULTS_MARKER, &defaults);

        Ok(script)
    }
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn write_artifact(dest: &Path, contents: &str) {
    if let Err(e) = fs::write(dest, contents) {
        tracing::error!("report artifact write failed for {}: {}", dest.display(), e);
    }
}
