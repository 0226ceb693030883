//! Company name lookup from a side file carrying a `Company` field.
//!
//! CSV: the first non-empty value under a `Company` column.
//! JSON: a top-level `Company` string, or the first object in a top-level
//! array that has one. Header and key matching ignores ASCII case.

use serde_json::Value;
use std::fs;
use std::path::Path;

use super::file::resolve_path;

const FIELD: &str = "Company";

/// Read the company name from `path`; `Ok(None)` when the field is absent.
pub fn read_company_name(path: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let canonical = resolve_path(path)?;
    let name = if is_csv(&canonical) {
        let mut reader = csv::Reader::from_path(&canonical)
            .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
        company_from_csv(&mut reader)?
    } else {
        let contents = fs::read_to_string(&canonical)
            .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
        let value: Value = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?;
        company_from_json(&value)
    };
    Ok(name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()))
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
}

fn company_from_csv<R: std::io::Read>(
    reader: &mut csv::Reader<R>,
) -> Result<Option<String>, csv::Error> {
    let column = match reader
        .headers()?
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(FIELD))
    {
        Some(column) => column,
        None => return Ok(None),
    };
    for record in reader.records() {
        if let Some(name) = record?.get(column).filter(|v| !v.trim().is_empty()) {
            return Ok(Some(name.to_string()));
        }
    }
    Ok(None)
}

fn company_from_json(value: &Value) -> Option<String> {
    match value {
        Value::Object(map) => map
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(FIELD))
            .and_then(|(_, v)| v.as_str())
            .map(str::to_string),
        Value::Array(items) => items.iter().find_map(company_from_json),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_company_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("company.csv");
        fs::write(&path, "Ticker,Company\nABC,\nABC, Acme Holdings \n").unwrap();

        let name = read_company_name(path.to_str().unwrap()).unwrap();
        assert_eq!(name.as_deref(), Some("Acme Holdings"));
    }

    #[test]
    fn test_csv_without_company_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prices.csv");
        fs::write(&path, "Ticker,Price\nABC,4.17\n").unwrap();

        assert_eq!(read_company_name(path.to_str().unwrap()).unwrap(), None);
    }

    #[test]
    fn test_json_object_and_array() {
        let dir = tempfile::tempdir().unwrap();
        let object = dir.path().join("one.json");
        fs::write(&object, r#"{"company": "Globex", "sector": "Energy"}"#).unwrap();
        assert_eq!(
            read_company_name(object.to_str().unwrap()).unwrap().as_deref(),
            Some("Globex")
        );

        let array = dir.path().join("many.json");
        fs::write(&array, r#"[{"Ticker": "X"}, {"Company": "Initech"}]"#).unwrap();
        assert_eq!(
            read_company_name(array.to_str().unwrap()).unwrap().as_deref(),
            Some("Initech")
        );
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{ not json").unwrap();
        let err = read_company_name(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));
    }
}
