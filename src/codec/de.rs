use super::{DecodeError, FLOAT_TAG, PAYLOAD_KEY, TAG_KEY};
use crate::ds::{Fields, Number, Value};
use crate::registry;

/// Revive a parsed JSON tree into a [`Value`], bottom-up.
///
/// Numbers revive as unsigned when they fit `u64`, signed when they fit `i64`, floating
/// otherwise. Objects revive their entries first, then inspect the result: an object carrying
/// [`TAG_KEY`] is handed to the tag's registered serializer (the payload being the value under
/// [`PAYLOAD_KEY`] when present, the remaining map otherwise), and passed through as that payload
/// when the tag is unknown. Untagged objects become plain maps, or whatever `hook` makes of them.
pub(crate) fn revive(
    json: serde_json::Value,
    hook: Option<&dyn Fn(Fields) -> Value>,
) -> Result<Value, DecodeError> {
    let value = match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(v),
        serde_json::Value::Number(n) => Value::Num(revive_num(&n)),
        serde_json::Value::String(s) => Value::Str(s),
        serde_json::Value::Array(elements) => {
            let mut seq = Vec::with_capacity(elements.len());
            for element in elements {
                seq.push(revive(element, hook)?);
            }
            Value::Seq(seq)
        }
        serde_json::Value::Object(entries) => {
            let mut fields = Fields::with_capacity(entries.len());
            for (name, value) in entries {
                fields.insert(name, revive(value, hook)?);
            }
            return revive_map(fields, hook);
        }
    };
    Ok(value)
}

fn revive_num(n: &serde_json::Number) -> Number {
    if let Some(u) = n.as_u64() {
        Number::Uint(u as u128)
    } else if let Some(i) = n.as_i64() {
        Number::Int(i as i128)
    } else {
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

fn revive_map(
    mut fields: Fields,
    hook: Option<&dyn Fn(Fields) -> Value>,
) -> Result<Value, DecodeError> {
    let tag = match fields.remove(TAG_KEY) {
        Some(tag) => tag,
        None => {
            return Ok(match hook {
                Some(hook) => hook(fields),
                None => Value::Map(fields),
            });
        }
    };
    let payload = match fields.remove(PAYLOAD_KEY) {
        Some(payload) => payload,
        None => Value::Map(fields),
    };
    if tag.str() == Some(FLOAT_TAG) {
        return revive_float(payload);
    }
    // a tag that is not a string, or was never registered, passes the payload through untouched
    match tag.str().and_then(registry::get_serializer) {
        Some(serializer) => serializer.decode(payload),
        None => Ok(payload),
    }
}

fn revive_float(payload: Value) -> Result<Value, DecodeError> {
    let float = match payload.str() {
        Some("NaN") => f64::NAN,
        Some("Infinity") => f64::INFINITY,
        Some("-Infinity") => f64::NEG_INFINITY,
        _ => {
            return Err(DecodeError::Message(format!(
                "unrecognized float payload: {}",
                payload
            )))
        }
    };
    Ok(Value::Num(Number::Float(float)))
}
