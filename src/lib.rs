//! Declarative plot specs for a JavaScript plotting library.
//!
//! Specs are composed from native values (`Value`), deferred calls into
//! library namespaces (`call::plot()`, `call::d3()`, ...) and raw target-runtime
//! expressions (`raw`). `normalize` lowers them into a tagged JSON tree
//! (`SpecNode`) that the rendering side interprets; `render` hands that tree to
//! a widget or a static document.

pub mod call;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod js;
pub mod render;
pub mod spec;
pub mod table;
pub mod value;

pub use call::{Arguments, Call, FunctionRef, Module, d3, math, plot};
pub use config::{Assets, Config, Renderer, Theme};
pub use error::{Error, Result};
pub use js::raw;
pub use render::{Obsplot, Output, Widget, WidgetState};
pub use spec::{CallDescriptor, Kind, SpecNode, Tagged, normalize};
pub use table::{Column, DataFrame, Table, encode_table};
pub use value::Value;
