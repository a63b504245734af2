use serde_json::{Number, Value};
use tokio_postgres::types::Type;

/// Converts one text-format column value into JSON using the column's type.
///
/// Integers and floating/numeric types become JSON numbers and booleans become
/// JSON booleans. `json`/`jsonb` are embedded as parsed JSON. Everything else,
/// including dates, timestamps and uuids, stays in its PostgreSQL text form.
/// Text that does not parse as its declared type is kept as a string.
pub fn encode_text_value(ty: &Type, text: Option<&str>) -> Value {
    let Some(text) = text else {
        return Value::Null;
    };

    match *ty {
        Type::INT2 | Type::INT4 | Type::INT8 | Type::OID => text
            .parse::<i64>()
            .map(Value::from)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        Type::FLOAT4 | Type::FLOAT8 | Type::NUMERIC => text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(text.to_string())),
        Type::BOOL => match text {
            "t" => Value::Bool(true),
            "f" => Value::Bool(false),
            other => Value::String(other.to_string()),
        },
        Type::JSON | Type::JSONB => {
            serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
        }
        _ => Value::String(text.to_string()),
    }
}
