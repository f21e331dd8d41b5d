//! Template resources: the bundled copies or an override directory

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

pub const SHELL_TEMPLATE: &str = "index.html";
pub const SCRIPT_TEMPLATE: &str = "app.js";
pub const DEFAULT_STYLESHEET: &str = "assets/tally.css";

/// Partial templates inlined into or copied beside the shell, in the order
/// they are inlined.
pub const PARTIALS: [&str; 2] = ["screenshot-modal.html", "stack-modal.html"];

const BUILTIN_SHELL: &str = include_str!("../../templates/index.html");
const BUILTIN_SCRIPT: &str = include_str!("../../templates/app.js");
const BUILTIN_SCREENSHOT_MODAL: &str = include_str!("../../templates/screenshot-modal.html");
const BUILTIN_STACK_MODAL: &str = include_str!("../../templates/stack-modal.html");
const BUILTIN_STYLESHEET: &str = include_str!("../../templates/assets/tally.css");

/// Where template text comes from: the copies compiled into the binary, or
/// a directory read on every call so edits show up in the next render pass.
pub enum TemplateSet {
    Builtin,
    Dir(PathBuf),
}

impl TemplateSet {
    /// Raw text of the named template resource.
    pub fn resolve(&self, name: &str) -> Result<String> {
        match self {
            TemplateSet::Builtin => builtin(name),
            TemplateSet::Dir(dir) => {
                let path = dir.join(name);
                fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read template {}", path.display()))
            }
        }
    }
}

fn builtin(name: &str) -> Result<String> {
    let text = match name {
        SHELL_TEMPLATE => BUILTIN_SHELL,
        SCRIPT_TEMPLATE => BUILTIN_SCRIPT,
        "screenshot-modal.html" => BUILTIN_SCREENSHOT_MODAL,
        "stack-modal.html" => BUILTIN_STACK_MODAL,
        DEFAULT_STYLESHEET => BUILTIN_STYLESHEET,
        _ => anyhow::bail!("Unknown template: {}", name),
    };
    Ok(text.to_string())
}
