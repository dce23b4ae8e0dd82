use zbus::zvariant::{Str, Value};

#[must_use]
/// Converts a [`Value`] into [`Str`], looking through one level of variant
/// nesting, or return [`None`] if it's not `str`.
pub fn extract_str<'a, 'b>(v: &'a Value<'b>) -> Option<&'a Str<'b>> {
    match v {
        Value::Str(v) => Some(v),
        Value::Value(v) => extract_str(v),
        _ => None,
    }
}

#[must_use]
/// Collects the string elements of an array [`Value`], skipping everything
/// else. A non-array value yields an empty vector.
pub fn extract_str_array(v: &Value<'_>) -> Vec<String> {
    match v {
        Value::Array(a) => a
            .iter()
            .filter_map(extract_str)
            .map(ToString::to_string)
            .collect(),
        Value::Value(v) => extract_str_array(v),
        _ => Vec::new(),
    }
}
