use serde_json::Value;

/// Headline figures, looked up in order of priority inside the result.
const PRIORITY_POINTERS: [&str; 3] = [
    "/riskMetrics/successProbability",
    "/statistics/portfolio/median",
    "/assets/pension/expectedReturn",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls
/// back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    for pointer in PRIORITY_POINTERS {
        if let Some(val) = result_obj.pointer(pointer) {
            if !val.is_null() {
                return format_minimal(val);
            }
        }
    }

    if let Value::Object(map) = result_obj {
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
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_probability_wins() {
        let value = json!({
            "result": {
                "simulations": 10,
                "riskMetrics": { "successProbability": 0.8 },
                "statistics": { "portfolio": { "median": 5.0 } },
            }
        });
        assert_eq!(minimal_line(&value), "0.8");
    }

    #[test]
    fn test_falls_back_to_first_field() {
        assert_eq!(minimal_line(&json!({ "alpha": 1 })), "alpha: 1");
        assert_eq!(minimal_line(&json!(3)), "3");
    }
}
