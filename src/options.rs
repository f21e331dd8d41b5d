//! Render options and their JSON config file

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

pub const OPTIONS_FILENAME: &str = ".tallyrc.json";

/// Verbatim JavaScript source text spliced into the rendered script.
///
/// Unlike every other option this is code, not data: it is substituted
/// exactly as supplied, with no quoting or serialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct JsSource(pub String);

impl JsSource {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for JsSource {
    fn from(src: &str) -> Self {
        Self(src.to_string())
    }
}

/// Options for one render pass
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    /// Output file name for the HTML shell
    #[serde(default = "default_doc_name")]
    pub doc_name: String,

    /// Report title substituted into the shell
    #[serde(default)]
    pub doc_title: Option<String>,

    /// Two-argument JS ordering function applied to results before display
    #[serde(default)]
    pub sort_function: Option<JsSource>,

    /// Stylesheet link target; the bundled default stylesheet when absent
    #[serde(default)]
    pub css_override_file: Option<String>,

    /// Presentation settings serialized verbatim into the script.
    /// `useAjax: true` switches the report to fetch-on-demand delivery.
    #[serde(default)]
    pub client_defaults: Map<String, Value>,

    /// Publish the bundled stylesheet into the output directory
    #[serde(default)]
    pub prepare_assets: bool,

    /// Read templates from this directory instead of the bundled copies
    #[serde(default)]
    pub template_dir: Option<PathBuf>,
}

fn default_doc_name() -> String {
    "report.html".to_string()
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            doc_name: default_doc_name(),
            doc_title: None,
            sort_function: None,
            css_override_file: None,
            client_defaults: Map::new(),
            prepare_assets: false,
            template_dir: None,
        }
    }
}

impl RenderOptions {
    /// True when the report should fetch `combined.json` at view time
    /// instead of embedding the dataset
    pub fn use_ajax(&self) -> bool {
        self.client_defaults
            .get("useAjax")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// Merge CLI overrides into options. CLI values take precedence.
    #[allow(clippy::too_many_arguments)]
    pub fn merge_with_cli(
        mut self,
        doc_name: Option<String>,
        doc_title: Option<String>,
        css_override_file: Option<String>,
        sort_function: Option<String>,
        use_ajax: bool,
        prepare_assets: bool,
        template_dir: Option<PathBuf>,
    ) -> Self {
        if let Some(name) = doc_name {
            self.doc_name = name;
        }
        if let Some(title) = doc_title {
            self.doc_title = Some(title);
        }
        if let Some(css) = css_override_file {
            self.css_override_file = Some(css);
        }
        if let Some(js) = sort_function {
            self.sort_function = Some(JsSource(js));
        }
        if use_ajax {
            self.client_defaults
                .insert("useAjax".to_string(), Value::Bool(true));
        }
        if prepare_assets {
            self.prepare_assets = true;
        }
        if let Some(dir) = template_dir {
            self.template_dir = Some(dir);
        }
        self
    }
}

/// Load render options. An explicit path must exist; otherwise
/// `.tallyrc.json` in the working directory is used when present,
/// defaults when not.
pub fn load_options(work_dir: &Path, custom_path: Option<&Path>) -> Result<RenderOptions> {
    let path = if let Some(p) = custom_path {
        let path = if p.is_absolute() {
            p.to_path_buf()
        } else {
            work_dir.join(p)
        };
        if !path.exists() {
            anyhow::bail!("Options file not found: {}", path.display());
        }
        Some(path)
    } else {
        let candidate = work_dir.join(OPTIONS_FILENAME);
        candidate.exists().then_some(candidate)
    };

    match path {
        Some(path) => {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read options: {}", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("Invalid JSON in options: {}", path.display()))
        }
        None => Ok(RenderOptions::default()),
    }
}
