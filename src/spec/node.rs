//! Spec node: the tagged, JSON-serializable tree handed to the rendering side.
//!
//! JSON shape of a tagged node:
//! {
//!   "ipyobsplot-type": "DataFrame",   // one of the six kinds below
//!   "value": "<base64 Arrow IPC>"     // payload depends on the kind
//! }
//!
//! `function` and `function-object` nodes carry `module`, `method` and `args`
//! instead of `value`.

use crate::error::{Error, Result};

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Discriminant key carried by every tagged node.
pub const TAG_KEY: &str = "ipyobsplot-type";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SpecNode {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Sequence(Vec<SpecNode>),
    Mapping(BTreeMap<String, SpecNode>),
    Tagged(Tagged),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "ipyobsplot-type")]
pub enum Tagged {
    DataFrame {
        #[serde(with = "base64_bytes")]
        value: Vec<u8>,
    },
    GeoJson {
        value: serde_json::Map<String, serde_json::Value>,
    },
    #[serde(rename = "datetime")]
    Datetime { value: String },
    #[serde(rename = "function")]
    Function(CallDescriptor),
    #[serde(rename = "function-object")]
    FunctionObject(CallDescriptor),
    #[serde(rename = "js")]
    Js { value: String },
}

/// A call replayed by the rendering side as `module.method(...args)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallDescriptor {
    pub module: String,
    pub method: String,
    pub args: Vec<SpecNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    DataFrame,
    GeoJson,
    Datetime,
    Function,
    FunctionObject,
    Js,
}

impl Kind {
    pub const ALL: [Kind; 6] = [
        Kind::DataFrame,
        Kind::GeoJson,
        Kind::Datetime,
        Kind::Function,
        Kind::FunctionObject,
        Kind::Js,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Kind::DataFrame => "DataFrame",
            Kind::GeoJson => "GeoJson",
            Kind::Datetime => "datetime",
            Kind::Function => "function",
            Kind::FunctionObject => "function-object",
            Kind::Js => "js",
        }
    }

    pub fn parse(tag: &str) -> Option<Kind> {
        Kind::ALL.into_iter().find(|k| k.as_str() == tag)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Tagged {
    pub fn kind(&self) -> Kind {
        match self {
            Tagged::DataFrame { .. } => Kind::DataFrame,
            Tagged::GeoJson { .. } => Kind::GeoJson,
            Tagged::Datetime { .. } => Kind::Datetime,
            Tagged::Function(_) => Kind::Function,
            Tagged::FunctionObject(_) => Kind::FunctionObject,
            Tagged::Js { .. } => Kind::Js,
        }
    }

    /// Parse a JSON object carrying the tag key. Unknown discriminants are
    /// rejected rather than passed through as plain mappings.
    pub fn from_json(map: serde_json::Map<String, serde_json::Value>) -> Result<Self> {
        let tag = match map.get(TAG_KEY) {
            Some(serde_json::Value::String(tag)) => tag.clone(),
            Some(other) => return Err(Error::UnknownTag(other.to_string())),
            None => return Err(Error::UnknownTag(String::new())),
        };
        if Kind::parse(&tag).is_none() {
            return Err(Error::UnknownTag(tag));
        }
        Ok(serde_json::from_value(serde_json::Value::Object(map))?)
    }
}

impl SpecNode {
    pub fn tag(&self) -> Option<Kind> {
        match self {
            SpecNode::Tagged(t) => Some(t.kind()),
            _ => None,
        }
    }

    /// Look up a key of a mapping node.
    pub fn get(&self, key: &str) -> Option<&SpecNode> {
        match self {
            SpecNode::Mapping(map) => map.get(key),
            _ => None,
        }
    }

    /// Look up an element of a sequence node.
    pub fn at(&self, index: usize) -> Option<&SpecNode> {
        match self {
            SpecNode::Sequence(items) => items.get(index),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl TryFrom<serde_json::Value> for SpecNode {
    type Error = Error;

    fn try_from(value: serde_json::Value) -> Result<Self> {
        use serde_json::Value as J;

        Ok(match value {
            J::Null => SpecNode::Null,
            J::Bool(b) => SpecNode::Bool(b),
            J::Number(n) => SpecNode::Number(n),
            J::String(s) => SpecNode::String(s),
            J::Array(items) => SpecNode::Sequence(
                items
                    .into_iter()
                    .map(SpecNode::try_from)
                    .collect::<Result<_>>()?,
            ),
            J::Object(map) if map.contains_key(TAG_KEY) => {
                SpecNode::Tagged(Tagged::from_json(map)?)
            }
            J::Object(map) => SpecNode::Mapping(
                map.into_iter()
                    .map(|(k, v)| Ok((k, SpecNode::try_from(v)?)))
                    .collect::<Result<_>>()?,
            ),
        })
    }
}

impl<'de> Deserialize<'de> for SpecNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        SpecNode::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl From<Tagged> for SpecNode {
    fn from(tagged: Tagged) -> Self {
        SpecNode::Tagged(tagged)
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}
