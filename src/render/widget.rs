//! Embedded-widget state.
//!
//! The host UI toolkit synchronizes one piece of state; every spec mutation
//! re-normalizes and bumps the revision so the transport re-sends it.

use crate::config::{Config, Defaults, Theme};
use crate::error::Result;
use crate::render::check_spec;
use crate::spec::{SpecNode, normalize};
use crate::value::Value;

use serde::Serialize;
use tracing::debug;

/// State shared with the front end, as JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WidgetState {
    pub spec: SpecNode,
    pub theme: Theme,
    pub defaults: Defaults,
    pub debug: bool,
}

#[derive(Debug, Clone)]
pub struct Widget {
    state: WidgetState,
    revision: u64,
}

impl Widget {
    pub fn new(spec: &Value, config: &Config) -> Result<Self> {
        config.validate()?;
        check_spec(spec)?;
        let state = WidgetState {
            spec: normalize(spec)?,
            theme: config.theme(),
            defaults: config.defaults().clone(),
            debug: config.debug(),
        };
        Ok(Self { state, revision: 0 })
    }

    /// Replace the spec. On error the previous state is kept.
    pub fn set_spec(&mut self, spec: &Value) -> Result<&WidgetState> {
        check_spec(spec)?;
        self.state.spec = normalize(spec)?;
        self.revision += 1;
        debug!(revision = self.revision, "widget spec updated");
        Ok(&self.state)
    }

    pub fn spec(&self) -> &SpecNode {
        &self.state.spec
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn state(&self) -> &WidgetState {
        &self.state
    }

    pub fn state_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(&self.state)?)
    }
}
