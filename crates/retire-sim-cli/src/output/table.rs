use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

const DISTRIBUTION_COLUMNS: [&str; 9] =
    ["mean", "median", "stdDev", "min", "p10", "p25", "p75", "p90", "max"];

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else if map.contains_key("assets") && map.contains_key("scenarios") {
                print_parameter_tables(map);
            } else {
                print_flat_object(map);
            }
        }
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res) if res.contains_key("riskMetrics") => print_simulation(res),
        Value::Object(res) => print_flat_object(res),
        _ => println!("{}", result),
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_simulation(res: &Map<String, Value>) {
    println!(
        "Simulations: {}  Projection years: {}  Seed: {}\n",
        format_value(res.get("simulations").unwrap_or(&Value::Null)),
        format_value(res.get("projectionYears").unwrap_or(&Value::Null)),
        format_value(res.get("seed").unwrap_or(&Value::Null)),
    );

    if let Some(Value::Object(risk)) = res.get("riskMetrics") {
        print_flat_object(risk);
    }

    if let Some(Value::Object(stats)) = res.get("statistics") {
        let mut builder = Builder::default();
        let mut header = vec!["Outcome".to_string()];
        header.extend(DISTRIBUTION_COLUMNS.iter().map(|c| c.to_string()));
        builder.push_record(header);
        for (name, dist) in stats {
            let mut row = vec![name.clone()];
            row.extend(
                DISTRIBUTION_COLUMNS
                    .iter()
                    .map(|c| dist.get(*c).map(format_value).unwrap_or_default()),
            );
            builder.push_record(row);
        }
        println!("\n{}", Table::from(builder));
    }

    if let Some(Value::Object(scenarios)) = res.get("scenarios") {
        let mut builder = Builder::default();
        builder.push_record(["Regime", "Occurrences", "Frequency", "Avg value", "Avg growth"]);
        for (regime, s) in scenarios {
            let field = |k: &str| s.get(k).map(format_value).unwrap_or_default();
            builder.push_record([
                regime.clone(),
                field("occurrences"),
                field("frequency"),
                field("averageReturn"),
                field("averageGrowthReturn"),
            ]);
        }
        println!("\n{}", Table::from(builder));
    }

    if let Some(Value::Array(recs)) = res.get("recommendations") {
        for rec in recs {
            let text = |k: &str| rec.get(k).map(format_value).unwrap_or_default();
            println!("\n[{}] {}", text("priority"), text("title"));
            println!("  {}", text("description"));
            if let Some(Value::Array(actions)) = rec.get("actions") {
                for action in actions {
                    println!("  - {}", format_value(action));
                }
            }
        }
    }
}

fn print_parameter_tables(map: &Map<String, Value>) {
    if let Some(Value::Object(assets)) = map.get("assets") {
        let mut builder = Builder::default();
        builder.push_record(["Asset", "Expected return %", "Volatility %", "Law"]);
        for (name, params) in assets {
            if params.get("expectedReturn").is_some() {
                push_asset_row(&mut builder, name, params);
            } else if let Value::Object(parts) = params {
                // composite: one row per sub-model
                for (part, sub) in parts {
                    push_asset_row(&mut builder, &format!("{name}.{part}"), sub);
                }
            }
        }
        println!("{}", Table::from(builder));
    }

    if let Some(Value::Object(scenarios)) = map.get("scenarios") {
        let columns = [
            "probability",
            "stockReturnMultiplier",
            "bondReturnMultiplier",
            "realEstateReturnMultiplier",
            "inflationMultiplier",
            "duration",
        ];
        let mut builder = Builder::default();
        builder.push_record(["Regime", "Prob", "Stock x", "Bond x", "Real estate x", "Inflation x", "Duration"]);
        for (regime, s) in scenarios {
            let mut row = vec![regime.clone()];
            row.extend(columns.iter().map(|c| s.get(*c).map(format_value).unwrap_or_default()));
            builder.push_record(row);
        }
        println!("\n{}", Table::from(builder));
    }
}

fn push_asset_row(builder: &mut Builder, name: &str, params: &Value) {
    let field = |k: &str| params.get(k).map(format_value).unwrap_or_default();
    builder.push_record([
        name.to_string(),
        field("expectedReturn"),
        field("volatility"),
        field("distribution"),
    ]);
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => format!("{:.4}", f),
            _ => n.to_string(),
        },
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
