//! Snapshot formatting for stdout.

use anyhow::Result;
use clap::ValueEnum;
use envchain::{Snapshot, Value};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single-line JSON object
    #[default]
    Json,
    /// Indented JSON object
    Pretty,
    /// NAME=value lines
    Dotenv,
}

pub fn format_snapshot(snapshot: &Snapshot, format: OutputFormat) -> Result<String> {
    Ok(match format {
        OutputFormat::Json => serde_json::to_string(snapshot)?,
        OutputFormat::Pretty => serde_json::to_string_pretty(snapshot)?,
        OutputFormat::Dotenv => snapshot
            .iter()
            .map(|(name, value)| format!("{}={}", name, dotenv_value(value)))
            .collect::<Vec<_>>()
            .join("\n"),
    })
}

/// Plain text form of a single value: strings unquoted, `null` empty, the rest as JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn dotenv_value(value: &Value) -> String {
    let raw = display_value(value);
    let needs_quotes = raw
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '#' | '"' | '\'' | '\\' | '$'));
    if needs_quotes {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use envchain::{EnvChain, EnvSource, MapEnv, ValueSource};
    use std::sync::Arc;

    fn snapshot() -> Snapshot {
        let env: Arc<dyn EnvSource> = Arc::new(MapEnv::new());
        let chain = EnvChain::with_source(env);
        chain
            .add("HOST", "localhost")
            .add("GREETING", "hello world")
            .add("UNSET", ValueSource::None);
        chain.render().unwrap()
    }

    #[test]
    fn test_json_output_keeps_order() {
        let out = format_snapshot(&snapshot(), OutputFormat::Json).unwrap();
        assert_eq!(
            out,
            r#"{"HOST":"localhost","GREETING":"hello world","UNSET":null}"#
        );
    }

    #[test]
    fn test_dotenv_output_quotes_when_needed() {
        let out = format_snapshot(&snapshot(), OutputFormat::Dotenv).unwrap();
        assert_eq!(out, "HOST=localhost\nGREETING=\"hello world\"\nUNSET=");
    }

    #[test]
    fn test_display_value() {
        assert_eq!(display_value(&Value::from("x")), "x");
        assert_eq!(display_value(&Value::from(10)), "10");
        assert_eq!(display_value(&Value::Null), "");
    }
}
