use super::{EncodeError, FLOAT_TAG, PAYLOAD_KEY, TAG_KEY};
use crate::ds::{Number, Value};
use crate::registry;
use serde::ser::{Error, Serialize, SerializeMap, SerializeSeq, Serializer};

/// Serializes a [`Value`] tree as tagged JSON.
///
/// Plain values map straight onto JSON. Records and foreign values look their serializer up in
/// the registry, encode to a payload, and write the serializer's tag under [`TAG_KEY`]; a payload
/// that is not itself a map is wrapped under [`PAYLOAD_KEY`] first. A record or foreign value
/// with no registry entry fails serialization.
pub(crate) struct AsJson<'a>(pub &'a Value);

impl<'a> Serialize for AsJson<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(v) => serializer.serialize_bool(*v),
            Value::Num(Number::Uint(v)) => serializer.serialize_u128(*v),
            Value::Num(Number::Int(v)) => serializer.serialize_i128(*v),
            Value::Num(Number::Float(v)) if v.is_finite() => serializer.serialize_f64(*v),
            Value::Num(Number::Float(v)) => {
                // JSON has no literal for these; carry the name under the reserved float tag
                let name = if v.is_nan() {
                    "NaN"
                } else if *v > 0.0 {
                    "Infinity"
                } else {
                    "-Infinity"
                };
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(PAYLOAD_KEY, name)?;
                map.serialize_entry(TAG_KEY, FLOAT_TAG)?;
                map.end()
            }
            Value::Str(v) => serializer.serialize_str(v),
            Value::Seq(v) => {
                let mut seq = serializer.serialize_seq(Some(v.len()))?;
                for element in v {
                    seq.serialize_element(&AsJson(element))?;
                }
                seq.end()
            }
            Value::Map(v) => {
                let mut map = serializer.serialize_map(Some(v.len()))?;
                for (name, value) in v.iter() {
                    map.serialize_entry(name, &AsJson(value))?;
                }
                map.end()
            }
            tagged @ (Value::Record(_) | Value::Other(_)) => {
                let entry = registry::serializer_for(tagged)
                    .ok_or_else(|| S::Error::custom(EncodeError::Unregistered(describe(tagged))))?;
                let payload = entry.encode(tagged).map_err(S::Error::custom)?;
                match payload {
                    Value::Map(fields) => {
                        let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                        for (name, value) in fields.iter() {
                            map.serialize_entry(name, &AsJson(value))?;
                        }
                        // tag goes last, after the payload's own entries
                        map.serialize_entry(TAG_KEY, entry.tag())?;
                        map.end()
                    }
                    other => {
                        let mut map = serializer.serialize_map(Some(2))?;
                        map.serialize_entry(PAYLOAD_KEY, &AsJson(&other))?;
                        map.serialize_entry(TAG_KEY, entry.tag())?;
                        map.end()
                    }
                }
            }
        }
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Record(record) => format!("record '{}'", record.schema().tag()),
        other => format!("{:?}", other),
    }
}
