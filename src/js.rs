use crate::spec::Tagged;
use crate::value::Value;

/// Embed a target-runtime expression verbatim, e.g. `raw("d => d.x")`.
///
/// The text is not inspected; the rendering side evaluates it as-is.
pub fn raw(text: impl Into<String>) -> Value {
    Value::Tagged(Tagged::Js { value: text.into() })
}
