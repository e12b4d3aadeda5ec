// Output formatting for CLI

use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Self {
        match s {
            "json" => OutputFormat::Json,
            "yaml" => OutputFormat::Yaml,
            _ => OutputFormat::Text,
        }
    }

    /// Render `value` for the structured formats; `None` for text
    pub fn format_value<T: Serialize>(&self, value: &T) -> Result<Option<String>> {
        Ok(match self {
            OutputFormat::Json => Some(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Some(serde_yaml::to_string(value)?),
            // Text format is handled by each command
            OutputFormat::Text => None,
        })
    }

    pub fn print_value<T: Serialize>(&self, value: &T) -> Result<()> {
        if let Some(text) = self.format_value(value)? {
            println!("{}", text);
        }
        Ok(())
    }

    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Text)
    }
}

/// Print a simple key-value pair for text output
pub fn print_field(label: &str, value: &str) {
    println!("{:<14} {}", format!("{}:", label), value);
}

/// Print a table header
pub fn print_table_header(columns: &[(&str, usize)]) {
    let header: String = columns
        .iter()
        .map(|(name, width)| format!("{:<width$}", name, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", header);
}

/// Print a table row, truncating cells that overflow their column
pub fn print_table_row(values: &[(&str, usize)]) {
    let row: String = values
        .iter()
        .map(|(val, width)| format!("{:<width$}", truncate(val, *width), width = width))
        .collect::<Vec<_>>()
        .join("  ");
    println!("{}", row);
}

fn truncate(value: &str, width: usize) -> String {
    if value.chars().count() <= width || width < 3 {
        return value.to_string();
    }
    let kept: String = value.chars().take(width - 3).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!(OutputFormat::from_str("json"), OutputFormat::Json);
        assert_eq!(OutputFormat::from_str("yaml"), OutputFormat::Yaml);
        assert_eq!(OutputFormat::from_str("text"), OutputFormat::Text);
    }

    #[test]
    fn test_format_value() {
        let value = serde_json::json!({ "leader": "X" });

        assert_eq!(OutputFormat::Text.format_value(&value).unwrap(), None);
        assert_eq!(
            OutputFormat::Yaml.format_value(&value).unwrap().as_deref(),
            Some("leader: X\n")
        );
        assert!(OutputFormat::Json
            .format_value(&value)
            .unwrap()
            .unwrap()
            .contains("\"leader\": \"X\""));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Claude 3.7 Sonnet", 10), "Claude ...");
        assert_eq!(truncate("GPT-4o", 10), "GPT-4o");
    }
}
