//! Recursive spec normalizer.
//!
//! Lowers a `Value` into a `SpecNode`. Dispatch is an ordered chain over the
//! closed set of input kinds; the first matching arm wins:
//!
//! 1) null
//! 2) sequences (element-wise, order kept)
//! 3) FeatureCollection mappings -> GeoJson (before generic mappings)
//! 4) generic mappings (value-wise, keys untouched) and invoked calls;
//!    a mapping that carries the tag key must parse as a known tagged node
//! 5) tables -> DataFrame
//! 6) dates and date-times -> datetime
//! 7) function references -> function-object
//! 8) everything else passes through (scalars, already-tagged nodes)

use crate::call::Call;
use crate::error::{Error, Result};
use crate::spec::node::{CallDescriptor, SpecNode, TAG_KEY, Tagged};
use crate::table::encode_table;
use crate::value::{Value, finite};

use chrono::SecondsFormat;
use std::collections::BTreeMap;

/// Deepest nesting accepted before normalization gives up.
pub const MAX_DEPTH: usize = 256;

pub fn normalize(value: &Value) -> Result<SpecNode> {
    normalize_at(value, 0)
}

fn normalize_at(value: &Value, depth: usize) -> Result<SpecNode> {
    if depth > MAX_DEPTH {
        return Err(Error::TooDeep { limit: MAX_DEPTH });
    }
    let depth = depth + 1;

    let node = match value {
        Value::Null => SpecNode::Null,

        Value::Sequence(items) => SpecNode::Sequence(
            items
                .iter()
                .map(|v| normalize_at(v, depth))
                .collect::<Result<_>>()?,
        ),

        Value::Mapping(map) if is_feature_collection(map) => SpecNode::Tagged(Tagged::GeoJson {
            value: plain_object(map, depth)?,
        }),

        Value::Mapping(map) if map.contains_key(TAG_KEY) => {
            SpecNode::Tagged(Tagged::from_json(plain_object(map, depth)?)?)
        }

        Value::Mapping(map) => SpecNode::Mapping(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), normalize_at(v, depth)?)))
                .collect::<Result<_>>()?,
        ),

        // An invoked call is a plain mapping on the wire, so its arguments
        // are normalized like any mapping value.
        Value::Call(call) => SpecNode::Tagged(Tagged::Function(call_descriptor(call, depth)?)),

        Value::Table(table) => SpecNode::Tagged(Tagged::DataFrame {
            value: encode_table(table)?,
        }),

        Value::Date(d) => datetime(d.format("%Y-%m-%d").to_string()),
        Value::DateTime(dt) => datetime(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string()),
        Value::ZonedDateTime(dt) => datetime(dt.to_rfc3339_opts(SecondsFormat::AutoSi, false)),

        // Bound arguments are already tagged; they are not walked again.
        Value::Function(f) => SpecNode::Tagged(Tagged::FunctionObject(f.call())),

        Value::Tagged(tagged) => SpecNode::Tagged(tagged.clone()),
        Value::Bool(b) => SpecNode::Bool(*b),
        Value::Int(i) => SpecNode::Number((*i).into()),
        Value::Float(f) => SpecNode::Number(finite(*f)?),
        Value::Number(n) => SpecNode::Number(n.clone()),
        Value::String(s) => SpecNode::String(s.clone()),
    };
    Ok(node)
}

fn is_feature_collection(map: &BTreeMap<String, Value>) -> bool {
    matches!(map.get("type"), Some(Value::String(t)) if t == "FeatureCollection")
}

fn plain_object(
    map: &BTreeMap<String, Value>,
    depth: usize,
) -> Result<serde_json::Map<String, serde_json::Value>> {
    map.iter()
        .map(|(k, v)| Ok((k.clone(), v.plain_json_at(depth)?)))
        .collect()
}

fn call_descriptor(call: &Call, depth: usize) -> Result<CallDescriptor> {
    Ok(CallDescriptor {
        module: call.module.clone(),
        method: call.method.clone(),
        args: call
            .args
            .iter()
            .map(|v| normalize_at(v, depth))
            .collect::<Result<_>>()?,
    })
}

fn datetime(value: String) -> SpecNode {
    SpecNode::Tagged(Tagged::Datetime { value })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::call::{d3, plot};
    use crate::js::raw;
    use crate::spec::Kind;
    use crate::table::{Column, DataFrame, encode_table};
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn json_of(value: Value) -> serde_json::Value {
        normalize(&value).unwrap().to_json().unwrap()
    }

    #[test]
    fn null_and_scalars_pass_through() {
        assert_eq!(normalize(&Value::Null).unwrap(), SpecNode::Null);
        assert_eq!(json_of(Value::from("x")), json!("x"));
        assert_eq!(json_of(Value::from(2.5)), json!(2.5));
        assert_eq!(json_of(Value::from(true)), json!(true));
    }

    #[test]
    fn absent_values_are_kept_in_place() {
        assert_eq!(
            json_of(Value::mapping([("a", Value::Null)])),
            json!({"a": null})
        );
        assert_eq!(
            json_of(Value::from(vec![Value::Null, Value::from(1)])),
            json!([null, 1])
        );
    }

    #[test]
    fn empty_containers() {
        assert_eq!(json_of(Value::Sequence(vec![])), json!([]));
        assert_eq!(json_of(Value::Mapping(BTreeMap::new())), json!({}));
    }

    #[test]
    fn sequences_normalize_element_wise() {
        let day = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let items = vec![Value::from(3), Value::from(day), raw("d => d")];
        let expected: Vec<SpecNode> = items.iter().map(|v| normalize(v).unwrap()).collect();
        assert_eq!(
            normalize(&Value::Sequence(items)).unwrap(),
            SpecNode::Sequence(expected)
        );
    }

    #[test]
    fn feature_collection_is_tagged_whole() {
        let geo = Value::mapping([
            ("type", Value::from("FeatureCollection")),
            (
                "features",
                Value::from(vec![Value::mapping([
                    ("type", Value::from("Feature")),
                    ("properties", Value::mapping([("name", Value::from("x"))])),
                ])]),
            ),
        ]);
        assert_eq!(
            json_of(geo),
            json!({
                "ipyobsplot-type": "GeoJson",
                "value": {
                    "type": "FeatureCollection",
                    "features": [{"type": "Feature", "properties": {"name": "x"}}]
                }
            })
        );
    }

    #[test]
    fn other_type_values_are_plain_mappings() {
        let feature = Value::mapping([("type", Value::from("Feature"))]);
        assert_eq!(json_of(feature), json!({"type": "Feature"}));
    }

    #[test]
    fn dates_become_iso_strings() {
        let day = NaiveDate::from_ymd_opt(2023, 3, 5).unwrap();
        assert_eq!(
            json_of(Value::from(day)),
            json!({"ipyobsplot-type": "datetime", "value": "2023-03-05"})
        );

        let naive = day.and_hms_milli_opt(14, 7, 9, 250).unwrap();
        assert_eq!(
            json_of(Value::from(naive)),
            json!({"ipyobsplot-type": "datetime", "value": "2023-03-05T14:07:09.250"})
        );

        let zoned = FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2023, 3, 5, 14, 7, 9)
            .unwrap();
        assert_eq!(
            json_of(Value::from(zoned)),
            json!({"ipyobsplot-type": "datetime", "value": "2023-03-05T14:07:09+02:00"})
        );
    }

    #[test]
    fn tables_are_encoded_not_walked() {
        let frame = DataFrame::new(vec![("x", Column::from(vec![1i64, 2]))]).unwrap();
        let expected = encode_table(&frame.clone().into()).unwrap();
        assert_eq!(
            normalize(&Value::from(frame)).unwrap(),
            SpecNode::Tagged(Tagged::DataFrame { value: expected })
        );
    }

    #[test]
    fn function_reference_becomes_function_object() {
        assert_eq!(
            json_of(Value::from(d3().reference("utcDay"))),
            json!({
                "ipyobsplot-type": "function-object",
                "module": "d3",
                "method": "utcDay",
                "args": []
            })
        );
    }

    #[test]
    fn invoked_call_arguments_are_normalized() {
        let day = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        let call = plot()
            .invoke("ruleX", [Value::from(vec![Value::from(day)])])
            .unwrap();
        assert_eq!(
            json_of(call),
            json!({
                "ipyobsplot-type": "function",
                "module": "Plot",
                "method": "ruleX",
                "args": [[{"ipyobsplot-type": "datetime", "value": "2020-02-29"}]]
            })
        );
    }

    #[test]
    fn tagged_nodes_are_terminal() {
        let once = normalize(&Value::mapping([
            ("marks", plot().invoke("lineY", [Value::from(vec![1, 2])]).unwrap()),
            ("x", Value::mapping([("interval", Value::from(d3().reference("utcMonth")))])),
            ("tip", raw("d => d.x")),
        ]))
        .unwrap();
        let again = Value::from_json(once.to_json().unwrap()).unwrap();
        assert_eq!(normalize(&again).unwrap(), once);

        let tagged = raw("Math.PI");
        assert_eq!(normalize(&tagged).unwrap().tag(), Some(Kind::Js));
    }

    #[test]
    fn tag_key_mappings_must_be_known_tags() {
        let unknown = Value::mapping([("ipyobsplot-type", "Widget"), ("value", "x")]);
        let err = normalize(&unknown).unwrap_err();
        assert!(matches!(err, Error::UnknownTag(ref t) if t == "Widget"));

        let nested = Value::mapping([("marks", Value::from(vec![unknown]))]);
        assert!(matches!(normalize(&nested), Err(Error::UnknownTag(_))));

        let known = Value::mapping([("ipyobsplot-type", "js"), ("value", "d => d")]);
        let node = normalize(&known).unwrap();
        assert_eq!(node, normalize(&raw("d => d")).unwrap());
        assert_eq!(SpecNode::try_from(node.to_json().unwrap()).unwrap(), node);
    }

    #[test]
    fn large_integers_pass_through_exactly() {
        let value = Value::from_json(json!({"n": u64::MAX})).unwrap();
        assert_eq!(json_of(value), json!({"n": u64::MAX}));
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let err = normalize(&Value::from(vec![Value::Float(f64::NAN)])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));
    }

    #[test]
    fn nesting_limit_is_enforced() {
        let mut deep = Value::from(1);
        for _ in 0..(MAX_DEPTH + 1) {
            deep = Value::Sequence(vec![deep]);
        }
        let err = normalize(&deep).unwrap_err();
        assert!(matches!(err, Error::TooDeep { limit: MAX_DEPTH }));

        let mut ok = Value::from(1);
        for _ in 0..MAX_DEPTH {
            ok = Value::Sequence(vec![ok]);
        }
        assert!(normalize(&ok).is_ok());
    }

    #[test]
    fn nesting_limit_covers_geojson_payloads() {
        let mut deep = Value::from(1);
        for _ in 0..(MAX_DEPTH + 44) {
            deep = Value::Sequence(vec![deep]);
        }
        let geo = Value::mapping([
            ("type", Value::from("FeatureCollection")),
            ("features", deep),
        ]);
        let err = normalize(&geo).unwrap_err();
        assert!(matches!(err, Error::TooDeep { limit: MAX_DEPTH }));
    }
}
