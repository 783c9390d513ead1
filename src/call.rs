//! Deferred calls into plotting-library namespaces.
//!
//! A `Module` is bound to a namespace name (`Plot`, `d3`, `Math`, ...) and
//! builds call descriptors instead of executing anything: the rendering side
//! replays them as `module.method(...args)` in its own runtime. Arguments are
//! positional only; `args` is always a plain array on the wire.

use crate::error::{Error, Result};
use crate::spec::{CallDescriptor, SpecNode};
use crate::value::Value;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Module {
    name: String,
}

/// The `Plot` namespace of the plotting library.
pub fn plot() -> Module {
    Module::new("Plot")
}

pub fn d3() -> Module {
    Module::new("d3")
}

/// The target runtime's `Math` namespace.
pub fn math() -> Module {
    Module::new("Math")
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Capture `module.method(args)` as data. Fails if any named argument
    /// was supplied.
    pub fn invoke(&self, method: &str, args: impl Into<Arguments>) -> Result<Value> {
        let args = args.into();
        if !args.named.is_empty() {
            return Err(Error::Argument {
                module: self.name.clone(),
                method: method.to_string(),
                names: args.named.into_iter().map(|(name, _)| name).collect(),
            });
        }
        Ok(Value::Call(Call {
            module: self.name.clone(),
            method: method.to_string(),
            args: args.positional,
        }))
    }

    /// The function itself, not a call of it (e.g. `d3.utcDay` as an interval).
    pub fn reference(&self, method: &str) -> FunctionRef {
        FunctionRef {
            module: self.name.clone(),
            method: method.to_string(),
            bound: Vec::new(),
        }
    }
}

/// An invoked call. Arguments are kept exactly as given.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub module: String,
    pub method: String,
    pub args: Vec<Value>,
}

impl Call {
    pub fn is(&self, module: &str, method: &str) -> bool {
        self.module == module && self.method == method
    }
}

/// A function reference, optionally with leading arguments already bound.
/// Bound arguments must already be in tagged form.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionRef {
    module: String,
    method: String,
    bound: Vec<SpecNode>,
}

impl FunctionRef {
    pub fn bind(mut self, args: impl IntoIterator<Item = SpecNode>) -> Self {
        self.bound.extend(args);
        self
    }

    /// Invoke with no further arguments, yielding the `function` descriptor.
    pub fn call(&self) -> CallDescriptor {
        CallDescriptor {
            module: self.module.clone(),
            method: self.method.clone(),
            args: self.bound.clone(),
        }
    }
}

/// Call arguments as a caller supplies them: positional values and, possibly,
/// named ones (which deferred calls reject).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    pub(crate) positional: Vec<Value>,
    pub(crate) named: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arg(mut self, value: impl Into<Value>) -> Self {
        self.positional.push(value.into());
        self
    }

    pub fn named(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.named.push((name.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.named.is_empty()
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(positional: Vec<Value>) -> Self {
        Self {
            positional,
            named: Vec::new(),
        }
    }
}

impl From<Value> for Arguments {
    fn from(value: Value) -> Self {
        Self::from(vec![value])
    }
}

impl<const N: usize> From<[Value; N]> for Arguments {
    fn from(positional: [Value; N]) -> Self {
        Self::from(Vec::from(positional))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn invoke_captures_positional_args() {
        let call = plot()
            .invoke("lineY", [Value::from(1), Value::from(2)])
            .unwrap();
        assert_eq!(
            call,
            Value::Call(Call {
                module: "Plot".into(),
                method: "lineY".into(),
                args: vec![Value::Int(1), Value::Int(2)],
            })
        );
    }

    #[test]
    fn named_args_are_rejected() {
        let err = plot()
            .invoke("dot", Arguments::new().arg(1).named("x", 1))
            .unwrap_err();
        match err {
            Error::Argument {
                module,
                method,
                names,
            } => {
                assert_eq!(module, "Plot");
                assert_eq!(method, "dot");
                assert_eq!(names, vec!["x".to_string()]);
            }
            other => panic!("expected argument error, got {other:?}"),
        }
    }

    #[test]
    fn error_message_names_the_call() {
        let err = d3()
            .invoke("format", Arguments::new().named("specifier", ".2f"))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "named arguments must not be passed to d3.format: specifier"
        );
    }

    #[test]
    fn reference_calls_with_bound_args() {
        let f = math()
            .reference("max")
            .bind([SpecNode::Number(3i64.into())]);
        assert_eq!(
            f.call(),
            CallDescriptor {
                module: "Math".into(),
                method: "max".into(),
                args: vec![SpecNode::Number(3i64.into())],
            }
        );
        assert!(d3().reference("utcDay").call().args.is_empty());
    }
}
