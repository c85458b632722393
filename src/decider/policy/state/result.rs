//! Node result assignments
//!
//! A node's `result` attribute is a comma-separated list of `key=value`
//! pairs, e.g. `approved=true, tier="gold", limit=500`.

use super::bag::VariableBag;
use super::value::Value;

/// Apply a result assignment string to the variable bag
///
/// Pairs without `=` are skipped. Later pairs overwrite earlier ones.
pub fn apply_result(result: &str, vars: &mut VariableBag) {
    let result = result.trim();
    if result.is_empty() {
        return;
    }

    for pair in result.split(',') {
        if let Some((key, value)) = parse_pair(pair) {
            vars.set(key, coerce_value(value));
        }
    }
}

fn parse_pair(pair: &str) -> Option<(&str, &str)> {
    let (key, value) = pair.trim().split_once('=')?;
    let value = value.trim();
    let value = value.strip_prefix('"').unwrap_or(value);
    let value = value.strip_suffix('"').unwrap_or(value);
    Some((key.trim(), value))
}

/// Coerce a raw assignment value: boolean first, then number, then string
pub fn coerce_value(raw: &str) -> Value {
    match raw {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    match raw.parse::<f64>() {
        // `inf`/`nan` spellings and overflowing literals stay strings
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::String(raw.to_string()),
    }
}
