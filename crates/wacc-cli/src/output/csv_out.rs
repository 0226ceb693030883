use serde_json::Value;
use std::io;

/// Write the result as two-column `field,value` CSV to stdout.
///
/// Nested objects are flattened to dotted paths, e.g.
/// `costs.equity.cost` or `weights_market.bank_loan`.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let _ = wtr.write_record(["field", "value"]);
    for (field, val) in flatten(result) {
        let _ = wtr.write_record([field.as_str(), val.as_str()]);
    }
    let _ = wtr.flush();
}

fn flatten(value: &Value) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    flatten_into("", value, &mut rows);
    rows
}

fn flatten_into(prefix: &str, value: &Value, rows: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        }
    };
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                flatten_into(&join(key), val, rows);
            }
        }
        Value::Array(arr) => {
            for (i, val) in arr.iter().enumerate() {
                flatten_into(&join(&i.to_string()), val, rows);
            }
        }
        scalar => rows.push((prefix.to_string(), format_csv_value(scalar))),
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_result() {
        let rows = flatten(&json!({
            "costs": {"equity": {"status": "computed", "cost": "0.1"}},
            "weights": ["0.4", "0.6"],
            "wacc_book": null
        }));
        assert!(rows.contains(&("costs.equity.cost".to_string(), "0.1".to_string())));
        assert!(rows.contains(&("weights.1".to_string(), "0.6".to_string())));
        assert!(rows.contains(&("wacc_book".to_string(), String::new())));
    }
}
