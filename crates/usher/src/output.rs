//! Rendering for `--output`.
//!
//! Tokens, verdicts and schedule slots go through one of five formats:
//! a `tabled` grid, serde JSON (pretty or compact), YAML, or bare lines
//! for shell pipelines.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

// ── Color helpers ────────────────────────────────────────────────────

/// `--color auto` colors only an interactive stdout and honors `NO_COLOR`.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// Green for an accepted verdict, red otherwise.
pub fn verdict(text: &str, accepted: bool, color: bool) -> String {
    match (color, accepted) {
        (false, _) => text.to_owned(),
        (true, true) => text.green().bold().to_string(),
        (true, false) => text.red().bold().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serializable items in the chosen format.
///
/// - `table`: maps each item through `to_row` and builds a rounded table
/// - `json` / `json-compact` / `yaml`: serializes the original data
/// - `plain`: calls `id_fn` on each item to emit one line per item
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
        structured => render_structured(structured, data),
    }
}

/// Render a single serializable item in the chosen format.
///
/// Table rendering uses `detail_fn`, which returns a pre-formatted block.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Plain => Ok(id_fn(data)),
        structured => render_structured(structured, data),
    }
}

/// Write to stdout unless `-q` was given.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_structured<T: Serialize + ?Sized>(
    format: OutputFormat,
    data: &T,
) -> Result<String, CliError> {
    Ok(match format {
        OutputFormat::JsonCompact => serde_json::to_string(data)?,
        OutputFormat::Yaml => serde_yaml::to_string(data)?.trim_end().to_owned(),
        _ => serde_json::to_string_pretty(data)?,
    })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[derive(Tabled)]
    struct Row {
        #[tabled(rename = "Name")]
        name: String,
    }

    #[test]
    fn list_formats() {
        let data = vec![json!({"name": "a"}), json!({"name": "b"})];
        let row = |v: &serde_json::Value| Row {
            name: v["name"].as_str().unwrap_or_default().to_owned(),
        };
        let id = |v: &serde_json::Value| v["name"].as_str().unwrap_or_default().to_owned();

        let plain = render_list(OutputFormat::Plain, &data, row, id).ok();
        assert_eq!(plain.as_deref(), Some("a\nb"));

        let compact = render_list(OutputFormat::JsonCompact, &data, row, id).ok();
        assert_eq!(compact.as_deref(), Some(r#"[{"name":"a"},{"name":"b"}]"#));

        let table = render_list(OutputFormat::Table, &data, row, id).unwrap_or_default();
        assert!(table.contains("Name") && table.contains('╭'));
    }

    #[test]
    fn single_yaml_has_no_trailing_newline() {
        let out = render_single(OutputFormat::Yaml, &json!({"k": 1}), |_| String::new(), |_| String::new());
        assert_eq!(out.ok().as_deref(), Some("k: 1"));
    }

    #[test]
    fn verdicts_are_plain_without_color() {
        assert_eq!(verdict("VALID", true, false), "VALID");
        assert_ne!(verdict("EXPIRED", false, true), "EXPIRED");
    }
}
