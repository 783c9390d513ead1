//! Renderer configuration.
//!
//! JSON shape (every field optional):
//! {
//!   "renderer": "widget",          // or "document" ("jsdom" accepted)
//!   "theme": "light",              // "dark" | "current"
//!   "defaults": {"width": 640},    // top-level plot options applied to every plot
//!   "debug": false,                // widget only
//!   "assets": {"plot": "...", "d3": "...", "arrow": "..."}
//! }
//!
//! Validation happens when a config is built, and again when a renderer
//! receives it (a bare `Deserialize` skips the builders).

use crate::error::{Error, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Top-level plot options accepted in `defaults`.
pub const ALLOWED_DEFAULTS: &[&str] = &[
    "width",
    "height",
    "style",
    "className",
    "caption",
    "aspectRatio",
    "margin",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    "inset",
    "insetTop",
    "insetRight",
    "insetBottom",
    "insetLeft",
    "grid",
    "label",
    "ariaLabel",
    "ariaDescription",
    "clip",
    "figure",
    "title",
    "subtitle",
];

pub type Defaults = serde_json::Map<String, serde_json::Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Renderer {
    /// Live view driven by synchronized widget state.
    #[default]
    Widget,
    /// Static, self-contained HTML document.
    #[serde(alias = "jsdom")]
    Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
    /// Inherit colors from the host page.
    Current,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Assets {
    pub plot: String,
    pub d3: String,
    pub arrow: String,
}

impl Default for Assets {
    fn default() -> Self {
        Self {
            plot: "https://cdn.jsdelivr.net/npm/@observablehq/plot@0.6/+esm".to_string(),
            d3: "https://cdn.jsdelivr.net/npm/d3@7/+esm".to_string(),
            arrow: "https://cdn.jsdelivr.net/npm/apache-arrow@17/+esm".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    renderer: Renderer,
    theme: Theme,
    defaults: Defaults,
    debug: bool,
    assets: Assets,
}

impl Config {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            renderer,
            ..Self::default()
        }
    }

    pub fn renderer(&self) -> Renderer {
        self.renderer
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn defaults(&self) -> &Defaults {
        &self.defaults
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn assets(&self) -> &Assets {
        &self.assets
    }

    pub fn with_renderer(mut self, renderer: Renderer) -> Result<Self> {
        self.renderer = renderer;
        self.validate()?;
        Ok(self)
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_assets(mut self, assets: Assets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> Result<Self> {
        self.defaults = defaults;
        self.validate()?;
        Ok(self)
    }

    /// Set one default option, e.g. from a command-line flag.
    pub fn with_default(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Result<Self> {
        self.defaults.insert(key.into(), value.into());
        self.validate()?;
        Ok(self)
    }

    pub fn with_debug(mut self, debug: bool) -> Result<Self> {
        self.debug = debug;
        self.validate()?;
        Ok(self)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)
            .map_err(|e| Error::config(format!("invalid config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Reject unknown default options and debug on the document renderer.
    pub fn validate(&self) -> Result<()> {
        let mut unknown: Vec<&str> = self
            .defaults
            .keys()
            .map(String::as_str)
            .filter(|k| !ALLOWED_DEFAULTS.contains(k))
            .collect();
        if !unknown.is_empty() {
            unknown.sort_unstable();
            return Err(Error::config(format!(
                "unsupported default option(s): {} (allowed: {})",
                unknown.join(", "),
                ALLOWED_DEFAULTS.join(", ")
            )));
        }

        if self.debug && self.renderer == Renderer::Document {
            return Err(Error::config("debug is only available with the widget renderer"));
        }

        debug!(
            renderer = %self.renderer,
            theme = %self.theme,
            defaults = self.defaults.len(),
            "config validated"
        );
        Ok(())
    }
}

impl Renderer {
    pub fn as_str(self) -> &'static str {
        match self {
            Renderer::Widget => "widget",
            Renderer::Document => "document",
        }
    }
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Current => "current",
        }
    }
}

impl fmt::Display for Renderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Renderer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "widget" => Ok(Renderer::Widget),
            "document" | "jsdom" => Ok(Renderer::Document),
            other => Err(Error::config(format!(
                "unknown renderer {other:?} (expected widget or document)"
            ))),
        }
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            "current" => Ok(Theme::Current),
            other => Err(Error::config(format!(
                "unknown theme {other:?} (expected light, dark or current)"
            ))),
        }
    }
}
