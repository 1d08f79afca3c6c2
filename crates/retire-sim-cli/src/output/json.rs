use colored::Colorize;
use serde_json::Value;

/// Pretty-print JSON to stdout. Serialization failures go to stderr.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("{}: JSON serialization failed: {}", "error".red().bold(), e),
    }
}
