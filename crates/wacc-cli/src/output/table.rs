use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use wacc_core::Instrument;

/// Format output as tables using the tabled crate.
///
/// Pipeline results get a per-instrument cost/weight table; anything else is
/// shown as flattened field/value pairs.
pub fn print_table(value: &Value) {
    print!("{}", render_table(value));
}

fn render_table(value: &Value) -> String {
    let mut out = String::new();
    let envelope = value.as_object();
    let result = envelope.and_then(|m| m.get("result")).unwrap_or(value);

    match result {
        Value::Object(res) if res.contains_key("costs") && res.contains_key("weights_book") => {
            out.push_str(&wacc_table(res));
        }
        Value::Object(res) => {
            out.push_str(&field_table(res));
        }
        other => {
            out.push_str(&format_value(other));
            out.push('\n');
        }
    }

    if let Some(env) = envelope {
        if let Some(Value::Array(warnings)) = env.get("warnings") {
            if !warnings.is_empty() {
                out.push_str("\nWarnings:\n");
                for w in warnings.iter().filter_map(Value::as_str) {
                    out.push_str(&format!("  - {w}\n"));
                }
            }
        }
        if let Some(Value::String(meth)) = env.get("methodology") {
            out.push_str(&format!("\nMethodology: {meth}\n"));
        }
    }
    out
}

fn wacc_table(res: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Source", "Cost (%)", "Weight (Book)", "Weight (Market)"]);
    for instrument in Instrument::ALL {
        let key = instrument.key();
        let cost = res
            .get("costs")
            .and_then(|c| c.get(key))
            .and_then(|c| c.get("cost"))
            .and_then(as_decimal)
            .map(|c| round(c * dec!(100), 2))
            .unwrap_or_else(|| "n/a".into());
        let weight = |basis: &str| {
            res.get(basis)
                .and_then(|w| w.get(key))
                .and_then(as_decimal)
                .map(|w| round(w, 4))
                .unwrap_or_else(|| "n/a".into())
        };
        builder.push_record([
            instrument.label().to_string(),
            cost,
            weight("weights_book"),
            weight("weights_market"),
        ]);
    }

    let mut out = format!("{}\n", Table::from(builder));
    for (label, key) in [("Book", "wacc_book"), ("Market", "wacc_market")] {
        let wacc = res
            .get(key)
            .and_then(as_decimal)
            .map(|w| format!("{}%", round(w * dec!(100), 2)))
            .unwrap_or_else(|| "n/a".into());
        out.push_str(&format!("WACC based on {label} Values: {wacc}\n"));
    }

    if let Some(Value::Object(forensic)) = res.get("forensic") {
        let result = forensic.get("result");
        let instrument = result
            .and_then(|r| r.get("instrument"))
            .map(format_value)
            .unwrap_or_default();
        match result.and_then(|r| r.get("solved_cost")).and_then(as_decimal) {
            Some(cost) => out.push_str(&format!(
                "Forensic: implied cost of {instrument} = {}%\n",
                round(cost * dec!(100), 2)
            )),
            None => out.push_str(&format!("Forensic: cannot solve for {instrument}\n")),
        }
    }
    out
}

fn field_table(res: &Map<String, Value>) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in res {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    format!("{}\n", Table::from(builder))
}

fn as_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => s.parse().ok(),
        Value::Number(n) => n.to_string().parse().ok(),
        _ => None,
    }
}

fn round(value: Decimal, dp: u32) -> String {
    let r = value.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero);
    format!("{r:.prec$}", prec = dp as usize)
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
