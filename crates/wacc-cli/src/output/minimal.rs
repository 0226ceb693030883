use serde_json::Value;

/// Keys tried in order when reducing a result to one line.
const PRIORITY_KEYS: [&str; 6] = [
    "wacc_market",
    "wacc_book",
    "solved_cost",
    "cost",
    "report_path",
    "weights",
];

/// Print just the key answer value from the output.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    if let Value::Object(map) = result_obj {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }
        // Unsolvable forensic results carry only a status.
        if let Some(Value::String(status)) = map.get("status") {
            return status.clone();
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result_obj)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => arr.iter().map(format_minimal).collect::<Vec<_>>().join(","),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_market_wacc() {
        let v = json!({"result": {"wacc_book": "0.08", "wacc_market": "0.094"}});
        assert_eq!(minimal_line(&v), "0.094");
    }

    #[test]
    fn test_falls_back_to_book_when_market_missing() {
        let v = json!({"result": {"wacc_book": "0.08", "wacc_market": null}});
        assert_eq!(minimal_line(&v), "0.08");
    }

    #[test]
    fn test_unsolvable_status() {
        let v = json!({"result": {"status": "zero_weight_unsolvable", "instrument": "bank_loan"}});
        assert_eq!(minimal_line(&v), "zero_weight_unsolvable");
    }

    #[test]
    fn test_weights_list() {
        let v = json!({"result": {"total": "100", "weights": ["0.5", "0.5"]}});
        assert_eq!(minimal_line(&v), "0.5,0.5");
    }
}
