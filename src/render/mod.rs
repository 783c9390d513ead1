//! Rendering surfaces: the embedded widget state and the static document.
//!
//! Both take a normalized spec plus a validated `Config`. `Obsplot` is the
//! front object that picks one according to `Config::renderer`.

pub mod html;
pub mod widget;

pub use html::{render_document, write_document};
pub use widget::{Widget, WidgetState};

use crate::call::Arguments;
use crate::config::{Config, Renderer};
use crate::error::{Error, Result};
use crate::spec::{Tagged, normalize};
use crate::value::Value;

use std::io::Write;
use tracing::info;

#[derive(Debug, Clone)]
pub struct Obsplot {
    config: Config,
}

#[derive(Debug)]
pub enum Output {
    Widget(Widget),
    Document(String),
}

impl Obsplot {
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Render a spec given either as one positional value or as named plot
    /// options (a single named `spec` is taken as the spec itself).
    pub fn render(&self, args: impl Into<Arguments>) -> Result<Output> {
        let spec = spec_from_args(args.into())?;
        match self.config.renderer() {
            Renderer::Widget => Ok(Output::Widget(Widget::new(&spec, &self.config)?)),
            Renderer::Document => {
                check_spec(&spec)?;
                Ok(Output::Document(render_document(&normalize(&spec)?, &self.config)?))
            }
        }
    }

    /// Render to a sink. Only the document renderer produces a file.
    pub fn render_to<W: Write>(&self, args: impl Into<Arguments>, sink: &mut W) -> Result<()> {
        if self.config.renderer() != Renderer::Document {
            return Err(Error::config("writing to a sink requires the document renderer"));
        }
        let spec = spec_from_args(args.into())?;
        check_spec(&spec)?;
        write_document(&normalize(&spec)?, &self.config, sink)?;
        info!("document written");
        Ok(())
    }
}

fn spec_from_args(args: Arguments) -> Result<Value> {
    let Arguments {
        mut positional,
        mut named,
    } = args;
    if named.is_empty() && positional.len() == 1 {
        return Ok(positional.remove(0));
    }
    if positional.is_empty() && named.len() == 1 && named[0].0 == "spec" {
        return Ok(named.remove(0).1);
    }
    if positional.is_empty() && !named.is_empty() {
        return Ok(Value::mapping(named));
    }
    Err(Error::config(
        "expected either a single spec or named plot options",
    ))
}

/// A spec is a mapping of plot options or an invoked call returning a mark,
/// either built in code or already tagged (as read from JSON).
/// An explicit `Plot.plot(...)` call is refused: the renderer makes that call.
pub(crate) fn check_spec(spec: &Value) -> Result<()> {
    let wraps_plot = match spec {
        Value::Mapping(_) => false,
        Value::Call(call) => call.is("Plot", "plot"),
        Value::Tagged(Tagged::Function(d)) => d.module == "Plot" && d.method == "plot",
        other => {
            return Err(Error::config(format!(
                "a spec must be a mapping of plot options or a Plot call, got {}",
                other.kind_name()
            )));
        }
    };
    if wraps_plot {
        return Err(Error::config(
            "Plot.plot(...) must not be passed as a spec; pass its options instead",
        ));
    }
    Ok(())
}
