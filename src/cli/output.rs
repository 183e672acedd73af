//! Output rendering
//!
//! Every byte a command prints goes through [`Output`], so `--output <file>`,
//! `--json`, `--quiet` and the format selection apply uniformly. The
//! configuration is derived once from the parsed arguments and is read-only
//! afterwards.

use crate::cli::args::ParsedArguments;
use clap::ValueEnum;
use console::style;
use serde_json::Value;
use std::fmt;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Column width cap for tables
pub const COLUMN_CAP: usize = 60;
/// Column width cap for tables in wide mode
pub const WIDE_COLUMN_CAP: usize = 120;

const ELLIPSIS: char = '…';
const FILLED_BLOCK: char = '█';
const EMPTY_BLOCK: char = '░';

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// Human-readable table output
    #[default]
    Table,
    /// CSV output
    Csv,
    /// Tab-separated output
    Tsv,
    /// YAML output
    Yaml,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Tsv => write!(f, "tsv"),
            OutputFormat::Yaml => write!(f, "yaml"),
        }
    }
}

/// Output formatting errors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("YAML serialization error: {0}")]
    YamlError(#[from] serde_yml::Error),
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Cannot write output file {}: {source}", path.display())]
    OutputFile { path: PathBuf, source: io::Error },
}

impl From<OutputError> for crate::domain::error::MemctlError {
    fn from(err: OutputError) -> Self {
        Self::Output(err.to_string())
    }
}

/// Process-wide rendering settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputConfig {
    pub json_mode: bool,
    pub quiet: bool,
    pub pretty: bool,
    pub format: OutputFormat,
    /// 0 means unlimited
    pub truncate_width: usize,
    pub output_file: Option<PathBuf>,
    pub field_selector: Option<String>,
    pub wide: bool,
    pub color: bool,
}

impl OutputConfig {
    /// Derive the rendering settings from parsed arguments.
    pub fn from_args(args: &ParsedArguments) -> Self {
        let field_selector = args
            .value("field")
            .filter(|field| !field.is_empty())
            .map(str::to_string);

        let format = match args.value("format") {
            Some(name) => <OutputFormat as ValueEnum>::from_str(name, true).unwrap_or_else(|_| {
                warn!("Unknown output format '{}', using table", name);
                OutputFormat::Table
            }),
            None => OutputFormat::Table,
        };

        let truncate_width = if args.enabled("noTruncate") {
            0
        } else {
            args.value("truncate")
                .and_then(|width| width.trim().parse::<usize>().ok())
                .unwrap_or(0)
        };

        Self {
            json_mode: args.enabled("json") || field_selector.is_some(),
            quiet: args.enabled("quiet"),
            pretty: args.enabled("pretty"),
            format,
            truncate_width,
            output_file: args
                .value("output")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            field_selector,
            wide: args.enabled("wide"),
            color: !args.enabled("noColor"),
        }
    }

    /// Whether output is meant for machines (`--json` or `--format json`)
    pub fn is_json(&self) -> bool {
        self.json_mode || self.format == OutputFormat::Json
    }
}

/// Data handed to [`Output::render`]
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Structured(Value),
    Text(String),
}

impl Payload {
    fn into_value(self) -> Value {
        match self {
            Payload::Structured(value) => value,
            Payload::Text(text) => Value::String(text),
        }
    }
}

impl From<Value> for Payload {
    fn from(value: Value) -> Self {
        Payload::Structured(value)
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

/// Where rendered text ends up
pub trait OutputSink: Send + Sync {
    /// Write one chunk of primary output followed by a newline
    fn write_out(&self, text: &str) -> io::Result<()>;
    /// Write one chunk of diagnostic output followed by a newline
    fn write_err(&self, text: &str) -> io::Result<()>;

    /// Whether ANSI styling may be emitted
    fn supports_style(&self) -> bool {
        false
    }

    fn clear_screen(&self) -> io::Result<()> {
        Ok(())
    }
}

impl<S: OutputSink + ?Sized> OutputSink for Arc<S> {
    fn write_out(&self, text: &str) -> io::Result<()> {
        (**self).write_out(text)
    }

    fn write_err(&self, text: &str) -> io::Result<()> {
        (**self).write_err(text)
    }

    fn supports_style(&self) -> bool {
        (**self).supports_style()
    }

    fn clear_screen(&self) -> io::Result<()> {
        (**self).clear_screen()
    }
}

/// Standard output / standard error
pub struct ConsoleSink;

impl OutputSink for ConsoleSink {
    fn write_out(&self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", text)?;
        stdout.flush()
    }

    fn write_err(&self, text: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        writeln!(stderr, "{}", text)
    }

    fn supports_style(&self) -> bool {
        console::colors_enabled()
    }

    fn clear_screen(&self) -> io::Result<()> {
        use crossterm::cursor::MoveTo;
        use crossterm::terminal::{Clear, ClearType};

        crossterm::execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))
    }
}

/// Output file, truncated on creation and appended to afterwards.
///
/// Diagnostic lines are written to the file and mirrored to stderr.
pub struct FileSink {
    path: PathBuf,
    file: Mutex<File>,
}

impl FileSink {
    pub fn create(path: &Path) -> Result<Self, OutputError> {
        let file = File::create(path).map_err(|source| OutputError::OutputFile {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, text: &str) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "output file lock poisoned"))?;
        writeln!(file, "{}", text)?;
        file.flush()
    }
}

impl OutputSink for FileSink {
    fn write_out(&self, text: &str) -> io::Result<()> {
        self.append(text)
    }

    fn write_err(&self, text: &str) -> io::Result<()> {
        self.append(text)?;
        ConsoleSink.write_err(text)
    }
}

/// In-memory capture of everything written
#[derive(Debug, Default)]
pub struct MemorySink {
    out: Mutex<String>,
    err: Mutex<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything written to the primary stream
    pub fn stdout(&self) -> String {
        self.out.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Everything written to the diagnostic stream
    pub fn stderr(&self) -> String {
        self.err.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn stdout_lines(&self) -> Vec<String> {
        self.stdout().lines().map(str::to_string).collect()
    }

    fn push(buffer: &Mutex<String>, text: &str) -> io::Result<()> {
        let mut buffer = buffer
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "capture buffer poisoned"))?;
        buffer.push_str(text);
        buffer.push('\n');
        Ok(())
    }
}

impl OutputSink for MemorySink {
    fn write_out(&self, text: &str) -> io::Result<()> {
        Self::push(&self.out, text)
    }

    fn write_err(&self, text: &str) -> io::Result<()> {
        Self::push(&self.err, text)
    }
}

/// Table column description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub key: String,
    pub label: String,
    pub width: Option<usize>,
}

impl Column {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            width: None,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }
}

/// Per-call table options
#[derive(Debug, Clone, Copy, Default)]
pub struct TableOptions {
    /// Raise the column width cap to [`WIDE_COLUMN_CAP`]
    pub wide: bool,
}

/// The renderer: configuration plus the sink it writes to
pub struct Output {
    config: OutputConfig,
    sink: Box<dyn OutputSink>,
}

impl Output {
    /// Build the renderer from parsed arguments.
    ///
    /// When an output file is requested it is created (truncated) right away,
    /// so an unwritable path fails here rather than on first write.
    pub fn configure(args: &ParsedArguments) -> Result<Self, OutputError> {
        Self::from_config(OutputConfig::from_args(args))
    }

    pub fn from_config(config: OutputConfig) -> Result<Self, OutputError> {
        let sink: Box<dyn OutputSink> = match &config.output_file {
            Some(path) => Box::new(FileSink::create(path)?),
            None => Box::new(ConsoleSink),
        };
        Ok(Self { config, sink })
    }

    pub fn with_sink(config: OutputConfig, sink: impl OutputSink + 'static) -> Self {
        Self {
            config,
            sink: Box::new(sink),
        }
    }

    pub fn config(&self) -> &OutputConfig {
        &self.config
    }

    pub fn is_json(&self) -> bool {
        self.config.is_json()
    }

    /// Render a response payload in the configured format.
    pub fn render(&self, payload: impl Into<Payload>) -> Result<(), OutputError> {
        let payload = payload.into();

        if let Some(selector) = &self.config.field_selector {
            let value = payload.into_value();
            return match select_field(&value, selector) {
                Some(found @ (Value::Object(_) | Value::Array(_))) => {
                    let text = self.json_text(found)?;
                    self.emit(&text)
                }
                Some(Value::String(text)) => self.emit(text),
                Some(other) => self.emit(&other.to_string()),
                None => Ok(()),
            };
        }

        if self.config.is_json() {
            let text = self.json_text(&payload.into_value())?;
            return self.emit(&text);
        }

        match self.config.format {
            OutputFormat::Yaml => {
                let text = serde_yml::to_string(&payload.into_value())?;
                self.emit(text.trim_end_matches('\n'))
            }
            OutputFormat::Csv | OutputFormat::Tsv => self.render_delimited(payload),
            OutputFormat::Table | OutputFormat::Json => match payload {
                Payload::Text(text) | Payload::Structured(Value::String(text)) => {
                    self.emit(&text)
                }
                Payload::Structured(value) => {
                    let text = serde_json::to_string_pretty(&value)?;
                    self.emit(&text)
                }
            },
        }
    }

    /// Render records as an aligned table. No rows means no output, in
    /// every format.
    ///
    /// With a machine format active the rows are handed to [`Output::render`]
    /// instead.
    pub fn table(
        &self,
        rows: &[Value],
        columns: Option<&[Column]>,
        options: TableOptions,
    ) -> Result<(), OutputError> {
        let Some(first) = rows.first() else {
            return Ok(());
        };
        if self.config.is_json() || self.config.format != OutputFormat::Table {
            return self.render(Value::Array(rows.to_vec()));
        }

        let derived;
        let columns = match columns {
            Some(columns) => columns,
            None => {
                derived = derive_columns(first);
                &derived
            }
        };

        let cap = if options.wide || self.config.wide {
            WIDE_COLUMN_CAP
        } else {
            COLUMN_CAP
        };
        let widths: Vec<usize> = columns
            .iter()
            .map(|column| {
                column
                    .width
                    .unwrap_or_else(|| natural_width(column, rows).min(cap))
            })
            .collect();

        let mut lines = Vec::with_capacity(rows.len() + 2);

        let header = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| fit(&column.label, *width))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(if self.styled() {
            style(header).bold().force_styling(true).to_string()
        } else {
            header
        });

        lines.push(
            widths
                .iter()
                .map(|width| "─".repeat(*width))
                .collect::<Vec<_>>()
                .join("──"),
        );

        for row in rows {
            lines.push(
                columns
                    .iter()
                    .zip(&widths)
                    .map(|(column, width)| fit(&cell_text(row.get(&column.key)), *width))
                    .collect::<Vec<_>>()
                    .join("  "),
            );
        }

        self.emit(&lines.join("\n"))
    }

    /// Truncate to the configured `--truncate` width
    pub fn clip(&self, text: &str) -> String {
        truncate(text, self.config.truncate_width)
    }

    /// Confirmation line; hidden by `--quiet` and in JSON mode
    pub fn success(&self, message: &str) -> Result<(), OutputError> {
        if self.suppress_chatter() {
            return Ok(());
        }
        let mark = if self.styled() {
            style("✓").green().force_styling(true).to_string()
        } else {
            "✓".to_string()
        };
        self.emit(&format!("{} {}", mark, message))
    }

    /// Informational line; hidden by `--quiet` and in JSON mode
    pub fn info(&self, message: &str) -> Result<(), OutputError> {
        if self.suppress_chatter() {
            return Ok(());
        }
        self.emit(message)
    }

    /// Warning on the diagnostic stream; hidden by `--quiet`
    pub fn warn(&self, message: &str) -> Result<(), OutputError> {
        if self.config.quiet {
            return Ok(());
        }
        self.sink.write_err(&format!("Warning: {}", message))?;
        Ok(())
    }

    /// Error on the diagnostic stream; never suppressed
    pub fn error(&self, message: &str) -> Result<(), OutputError> {
        let text = if self.config.is_json() {
            serde_json::json!({ "error": message }).to_string()
        } else {
            format!("Error: {}", message)
        };
        self.sink.write_err(&text)?;
        Ok(())
    }

    /// Progress bar line; hidden like [`Output::info`]
    pub fn progress(&self, current: u64, total: u64) -> Result<(), OutputError> {
        self.info(&progress_bar(current, total, 30))
    }

    /// Clear the terminal before a watch-mode redraw
    pub fn clear_screen(&self) -> Result<(), OutputError> {
        if self.config.is_json() {
            return Ok(());
        }
        self.sink.clear_screen()?;
        Ok(())
    }

    fn suppress_chatter(&self) -> bool {
        self.config.quiet || self.config.is_json()
    }

    fn styled(&self) -> bool {
        self.config.color && self.sink.supports_style()
    }

    fn json_text(&self, value: &Value) -> Result<String, OutputError> {
        Ok(if self.config.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        })
    }

    fn render_delimited(&self, payload: Payload) -> Result<(), OutputError> {
        match payload {
            Payload::Text(text) | Payload::Structured(Value::String(text)) => self.emit(&text),
            Payload::Structured(Value::Array(records)) if records.iter().all(Value::is_object) => {
                if records.is_empty() {
                    return Ok(());
                }
                let text = if self.config.format == OutputFormat::Tsv {
                    to_tsv(&records)
                } else {
                    to_csv(&records)
                };
                self.emit(&text)
            }
            Payload::Structured(value) => {
                let text = serde_json::to_string_pretty(&value)?;
                self.emit(&text)
            }
        }
    }

    fn emit(&self, text: &str) -> Result<(), OutputError> {
        self.sink.write_out(text)?;
        Ok(())
    }
}

/// Shorten `text` to exactly `width` characters, the last being an ellipsis.
/// A width of 0 means unlimited.
pub fn truncate(text: &str, width: usize) -> String {
    if width == 0 || text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width - 1).collect();
    out.push(ELLIPSIS);
    out
}

/// `█████░░░░░ 5/10`; the bar caps at full even when `current > total`.
pub fn progress_bar(current: u64, total: u64, width: usize) -> String {
    let fraction = if total == 0 {
        if current > 0 {
            1.0
        } else {
            0.0
        }
    } else {
        (current as f64 / total as f64).min(1.0)
    };
    let filled = ((fraction * width as f64).round() as usize).min(width);

    let mut bar = String::with_capacity(width * 3 + 16);
    bar.extend(std::iter::repeat(FILLED_BLOCK).take(filled));
    bar.extend(std::iter::repeat(EMPTY_BLOCK).take(width - filled));
    format!("{} {}/{}", bar, current, total)
}

/// Walk a dot-separated path into `value`. Numeric segments index arrays.
pub fn select_field<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment
            .parse::<usize>()
            .ok()
            .and_then(|index| items.get(index)),
        _ => None,
    })
}

/// Stringify a cell: strings verbatim, null/missing empty, the rest as JSON.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

/// Records as CSV: header from the first record's keys, RFC 4180 quoting.
pub fn to_csv(records: &[Value]) -> String {
    join_records(records, ",", escape_csv)
}

/// Records as TSV: tabs and newlines inside a field become spaces.
pub fn to_tsv(records: &[Value]) -> String {
    join_records(records, "\t", escape_tsv)
}

/// Quote a CSV field when it holds a comma, quote or line break
pub fn escape_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn escape_tsv(field: &str) -> String {
    field.replace(['\t', '\n', '\r'], " ")
}

fn join_records(records: &[Value], separator: &str, escape: fn(&str) -> String) -> String {
    let keys: Vec<&String> = match records.first() {
        Some(Value::Object(first)) => first.keys().collect(),
        _ => return String::new(),
    };

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(
        keys.iter()
            .map(|key| escape(key))
            .collect::<Vec<_>>()
            .join(separator),
    );
    for record in records {
        lines.push(
            keys.iter()
                .map(|key| escape(&cell_text(record.get(key.as_str()))))
                .collect::<Vec<_>>()
                .join(separator),
        );
    }
    lines.join("\n")
}

fn derive_columns(first: &Value) -> Vec<Column> {
    match first {
        Value::Object(map) => map
            .keys()
            .map(|key| Column::new(key.clone(), key.to_uppercase()))
            .collect(),
        _ => Vec::new(),
    }
}

fn natural_width(column: &Column, rows: &[Value]) -> usize {
    rows.iter()
        .map(|row| cell_text(row.get(&column.key)).chars().count())
        .fold(column.label.chars().count(), usize::max)
}

/// Truncate then right-pad to exactly `width` characters
fn fit(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let len = text.chars().count();
    if len >= width {
        return text;
    }
    let mut padded = text;
    padded.extend(std::iter::repeat(' ').take(width - len));
    padded
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn capture(flags: &[&str]) -> (Output, Arc<MemorySink>) {
        let args = ParsedArguments::parse(flags);
        let sink = Arc::new(MemorySink::new());
        let output = Output::with_sink(OutputConfig::from_args(&args), Arc::clone(&sink));
        (output, sink)
    }

    #[test]
    fn test_config_defaults() {
        let config = OutputConfig::from_args(&ParsedArguments::parse::<&str>(&[]));

        assert!(!config.json_mode);
        assert!(!config.quiet);
        assert_eq!(config.format, OutputFormat::Table);
        assert_eq!(config.truncate_width, 0);
        assert!(config.output_file.is_none());
        assert!(config.color);
    }

    #[test]
    fn test_field_selector_forces_json_mode() {
        let config = OutputConfig::from_args(&ParsedArguments::parse(&["--field", "memory.id"]));

        assert!(config.json_mode);
        assert_eq!(config.field_selector.as_deref(), Some("memory.id"));
    }

    #[test]
    fn test_no_truncate_wins() {
        let config = OutputConfig::from_args(&ParsedArguments::parse(&[
            "--truncate",
            "40",
            "--no-truncate",
        ]));
        assert_eq!(config.truncate_width, 0);

        let config = OutputConfig::from_args(&ParsedArguments::parse(&["--truncate", "40"]));
        assert_eq!(config.truncate_width, 40);
    }

    #[test]
    fn test_format_parsing() {
        let config = OutputConfig::from_args(&ParsedArguments::parse(&["-f", "YAML"]));
        assert_eq!(config.format, OutputFormat::Yaml);

        let config = OutputConfig::from_args(&ParsedArguments::parse(&["--format", "xml"]));
        assert_eq!(config.format, OutputFormat::Table);

        let config = OutputConfig::from_args(&ParsedArguments::parse(&["--format", "json"]));
        assert!(!config.json_mode);
        assert!(config.is_json());
    }

    #[test]
    fn test_configure_is_repeatable() {
        let args = ParsedArguments::parse(&["--json", "--pretty", "--truncate", "10"]);
        assert_eq!(OutputConfig::from_args(&args), OutputConfig::from_args(&args));
    }

    #[test]
    fn test_field_selector_prints_nested_array() {
        let (output, sink) = capture(&["--field", "memory.tags"]);

        output
            .render(json!({"memory": {"tags": ["x", "y"]}}))
            .unwrap();

        assert_eq!(sink.stdout(), "[\"x\",\"y\"]\n");
    }

    #[test]
    fn test_field_selector_scalar_and_missing() {
        let (output, sink) = capture(&["--field", "memory.id"]);

        output.render(json!({"memory": {"id": "m-1"}})).unwrap();
        output.render(json!({"other": {}})).unwrap();
        output.render(json!({"memory": null})).unwrap();

        assert_eq!(sink.stdout(), "m-1\n");
    }

    #[test]
    fn test_field_selector_indexes_arrays() {
        let (output, sink) = capture(&["--field", "results.1.score"]);

        output
            .render(json!({"results": [{"score": 0.5}, {"score": 0.25}]}))
            .unwrap();

        assert_eq!(sink.stdout(), "0.25\n");
    }

    #[test]
    fn test_json_compact_and_pretty() {
        let (output, sink) = capture(&["--json"]);
        output.render(json!({"a": 1})).unwrap();
        assert_eq!(sink.stdout(), "{\"a\":1}\n");

        let (output, sink) = capture(&["-jp"]);
        output.render(json!({"a": 1})).unwrap();
        assert_eq!(sink.stdout(), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_json_mode_encodes_text() {
        let (output, sink) = capture(&["--json"]);
        output.render("plain").unwrap();
        assert_eq!(sink.stdout(), "\"plain\"\n");
    }

    #[test]
    fn test_yaml_output() {
        let (output, sink) = capture(&["--format", "yaml"]);

        output.render(json!({"id": "m-1", "importance": 0.5})).unwrap();

        let text = sink.stdout();
        assert!(text.contains("id: m-1"));
        assert!(text.contains("importance: 0.5"));
        assert!(!text.ends_with("\n\n"));
    }

    #[test]
    fn test_csv_output_with_escaping() {
        let (output, sink) = capture(&["--format", "csv"]);

        output
            .render(json!([
                {"id": "m1", "content": "plain", "score": 1},
                {"id": "m2", "content": "a, \"quoted\" one", "score": null}
            ]))
            .unwrap();

        assert_eq!(
            sink.stdout_lines(),
            vec![
                "id,content,score",
                "m1,plain,1",
                "m2,\"a, \"\"quoted\"\" one\",",
            ]
        );
    }

    #[test]
    fn test_tsv_output_flattens_whitespace() {
        let (output, sink) = capture(&["--format", "tsv"]);

        output
            .render(json!([{"id": "m1", "content": "tab\there\nnewline"}]))
            .unwrap();

        assert_eq!(
            sink.stdout_lines(),
            vec!["id\tcontent", "m1\ttab here newline"]
        );
    }

    #[test]
    fn test_delimited_empty_and_fallbacks() {
        let (output, sink) = capture(&["--format", "csv"]);

        output.render(json!([])).unwrap();
        assert_eq!(sink.stdout(), "");

        output.render("raw text").unwrap();
        output.render(json!({"a": 1})).unwrap();
        assert_eq!(sink.stdout(), "raw text\n{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_table_format_fallbacks() {
        let (output, sink) = capture(&[]);

        output.render("hello").unwrap();
        output.render(json!("quoted?")).unwrap();
        output.render(json!([1, 2])).unwrap();

        assert_eq!(sink.stdout(), "hello\nquoted?\n[\n  1,\n  2\n]\n");
    }

    #[test]
    fn test_table_layout() {
        let (output, sink) = capture(&[]);

        output
            .table(
                &[
                    json!({"id": "a1", "content": "hello"}),
                    json!({"id": "b22", "content": "a much longer piece"}),
                ],
                None,
                TableOptions::default(),
            )
            .unwrap();

        assert_eq!(
            sink.stdout_lines(),
            vec![
                format!("ID   {:<19}", "CONTENT"),
                format!("{}──{}", "─".repeat(3), "─".repeat(19)),
                format!("a1   {:<19}", "hello"),
                "b22  a much longer piece".to_string(),
            ]
        );
    }

    #[test]
    fn test_table_explicit_columns_truncate_cells() {
        let (output, sink) = capture(&[]);
        let columns = [
            Column::new("content", "TEXT").with_width(5),
            Column::new("tags", "TAGS"),
        ];

        output
            .table(
                &[json!({"content": "hello world", "tags": ["a"]})],
                Some(&columns),
                TableOptions::default(),
            )
            .unwrap();

        let lines = sink.stdout_lines();
        assert_eq!(lines[0], "TEXT   TAGS ");
        assert_eq!(lines[2], "hell…  [\"a\"]");
    }

    #[test]
    fn test_table_width_caps() {
        let long = "x".repeat(200);
        let row = json!({"content": long});

        let (output, sink) = capture(&[]);
        output
            .table(&[row.clone()], None, TableOptions::default())
            .unwrap();
        assert_eq!(sink.stdout_lines()[2].chars().count(), COLUMN_CAP);

        let (output, sink) = capture(&[]);
        output
            .table(&[row.clone()], None, TableOptions { wide: true })
            .unwrap();
        assert_eq!(sink.stdout_lines()[2].chars().count(), WIDE_COLUMN_CAP);

        let (output, sink) = capture(&["--wide"]);
        output.table(&[row], None, TableOptions::default()).unwrap();
        assert_eq!(sink.stdout_lines()[2].chars().count(), WIDE_COLUMN_CAP);
    }

    #[test]
    fn test_empty_table_prints_nothing() {
        for flags in [&[][..], &["--json"][..], &["-f", "csv"][..], &["--format=yaml"][..]] {
            let (output, sink) = capture(flags);
            output.table(&[], None, TableOptions::default()).unwrap();
            assert_eq!(sink.stdout(), "", "{:?}", flags);
        }
    }

    #[test]
    fn test_table_delegates_for_machine_formats() {
        let rows = [json!({"id": "m1"})];

        let (output, sink) = capture(&["--json"]);
        output.table(&rows, None, TableOptions::default()).unwrap();
        assert_eq!(sink.stdout(), "[{\"id\":\"m1\"}]\n");

        let (output, sink) = capture(&["--format", "csv"]);
        output.table(&rows, None, TableOptions::default()).unwrap();
        assert_eq!(sink.stdout(), "id\nm1\n");
    }

    #[test]
    fn test_quiet_and_json_suppress_chatter_not_errors() {
        let (output, sink) = capture(&["--quiet"]);
        output.success("stored").unwrap();
        output.info("note").unwrap();
        output.warn("careful").unwrap();
        output.progress(1, 2).unwrap();
        output.error("boom").unwrap();
        assert_eq!(sink.stdout(), "");
        assert_eq!(sink.stderr(), "Error: boom\n");

        let (output, sink) = capture(&["--json"]);
        output.success("stored").unwrap();
        output.info("note").unwrap();
        output.warn("careful").unwrap();
        output.render(json!({"ok": true})).unwrap();
        output.error("boom").unwrap();
        assert_eq!(sink.stdout(), "{\"ok\":true}\n");
        assert_eq!(sink.stderr(), "Warning: careful\n{\"error\":\"boom\"}\n");
    }

    #[test]
    fn test_success_and_info_lines() {
        let (output, sink) = capture(&[]);
        output.success("Stored memory m-1").unwrap();
        output.info("2 results").unwrap();
        assert_eq!(sink.stdout(), "✓ Stored memory m-1\n2 results\n");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("hello", 0), "hello");
        assert_eq!(truncate("hello", 5), "hello");
        assert_eq!(truncate("hello world", 5), "hell…");
        assert_eq!(truncate("hello", 1), "…");
        assert_eq!(truncate("héllo wörld", 4), "hél…");

        let once = truncate("a longer sentence", 7);
        assert_eq!(once.chars().count(), 7);
        assert_eq!(truncate(&once, 7), once);
    }

    #[test]
    fn test_clip_uses_configured_width() {
        let (output, _) = capture(&["--truncate", "4"]);
        assert_eq!(output.clip("abcdef"), "abc…");

        let (output, _) = capture(&[]);
        assert_eq!(output.clip("abcdef"), "abcdef");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(5, 10, 10), "█████░░░░░ 5/10");
        assert_eq!(progress_bar(0, 4, 4), "░░░░ 0/4");
        assert_eq!(progress_bar(15, 10, 4), "████ 15/10");
        assert_eq!(progress_bar(0, 0, 3), "░░░ 0/0");
        assert_eq!(progress_bar(1, 3, 30).chars().filter(|c| *c == '█').count(), 10);
    }

    #[test]
    fn test_unwritable_output_file_fails_fast() {
        let args = ParsedArguments::parse(&["--output", "/nonexistent-dir/memctl/out.json"]);
        let result = Output::configure(&args);
        assert!(matches!(result, Err(OutputError::OutputFile { .. })));
    }
}
