//! Output formatting for module results.
//!
//! JSON output is the Ansible result document. Text output is a short
//! coloured summary with object payloads rendered as key/value tables.

use colored::Colorize;
use serde_json::Value;
use std::fmt::Write;
use tabled::{Table, Tabled};

use crate::modules::{to_ansible_json, ModuleResult};

use super::commands::OutputFormat;

/// Output formatter for CLI.
#[derive(Debug)]
pub struct OutputFormatter {
    /// Output format.
    format: OutputFormat,
}

/// Field row for table display.
#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Value")]
    value: String,
}

impl OutputFormatter {
    /// Creates a new output formatter.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats a module result for stdout.
    #[must_use]
    pub fn format_result(&self, module: &str, result: &ModuleResult) -> String {
        match self.format {
            OutputFormat::Json => to_ansible_json(result).to_string(),
            OutputFormat::Text => Self::format_result_text(module, result),
        }
    }

    fn format_result_text(module: &str, result: &ModuleResult) -> String {
        let mut output = String::new();

        match result {
            Ok(outcome) => {
                let state = if outcome.changed {
                    "changed".yellow()
                } else {
                    "ok".green()
                };
                let _ = writeln!(output, "{} {module}: {state}", "✓".green());

                if let Some(msg) = &outcome.msg {
                    for line in msg.lines() {
                        let _ = writeln!(output, "   {line}");
                    }
                }

                for (key, value) in &outcome.data {
                    let _ = writeln!(output, "\n{}", key.bold());
                    output.push_str(&Self::format_value(value));
                    output.push('\n');
                }
            }
            Err(error) => {
                let _ = writeln!(output, "{} {module}: {}", "✗".red(), "failed".red());
                for line in error.to_string().lines() {
                    let _ = writeln!(output, "   {line}");
                }
            }
        }

        output
    }

    /// Renders an object as a field/value table, anything else as JSON.
    fn format_value(value: &Value) -> String {
        let Value::Object(fields) = value else {
            return value.to_string();
        };

        let rows: Vec<FieldRow> = fields
            .iter()
            .map(|(field, value)| FieldRow {
                field: field.clone(),
                value: Self::truncate(&Self::scalar(value), 60),
            })
            .collect();

        Table::new(rows).to_string()
    }

    fn scalar(value: &Value) -> String {
        match value {
            Value::String(s) => s.clone(),
            Value::Null => "-".to_string(),
            other => other.to_string(),
        }
    }

    /// Truncates a string to a maximum number of characters.
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let head: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{head}...")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleError;
    use crate::modules::ModuleOutcome;
    use serde_json::json;

    #[test]
    fn test_json_output_is_ansible_document() {
        let formatter = OutputFormatter::new(OutputFormat::Json);
        let result: ModuleResult = Ok(ModuleOutcome::with_changed(true).with_msg("rebooted"));

        let parsed: Value =
            serde_json::from_str(&formatter.format_result("ovh_vps_reboot", &result)).unwrap();
        assert_eq!(parsed, json!({"changed": true, "msg": "rebooted"}));
    }

    #[test]
    fn test_text_output_renders_table() {
        colored::control::set_override(false);
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let result: ModuleResult = Ok(ModuleOutcome::unchanged()
            .with_data("vps_info", json!({"name": "vps1.ovh.net", "netbootMode": "local"})));

        let text = formatter.format_result("ovh_vps_info", &result);
        assert!(text.contains("ovh_vps_info: ok"));
        assert!(text.contains("netbootMode"));
        assert!(text.contains("vps1.ovh.net"));
    }

    #[test]
    fn test_text_output_failure() {
        colored::control::set_override(false);
        let formatter = OutputFormatter::new(OutputFormat::Text);
        let result: ModuleResult = Err(ModuleError::Internal("ovh_vps_reboot"));

        let text = formatter.format_result("ovh_vps_reboot", &result);
        assert!(text.contains("failed"));
        assert!(text.contains("Internal ovh_vps_reboot module error"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(OutputFormatter::truncate("short", 10), "short");
        assert_eq!(OutputFormatter::truncate("a long value here", 10), "a long ...");
    }
}
