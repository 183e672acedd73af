use crate::cli::args::{camel_to_kebab, FlagValue, ParsedArguments};
use crate::cli::output::{Column, Output, OutputFormat, TableOptions};
use crate::cli::validate;
use crate::domain::config::MemctlConfig;
use crate::domain::error::{MemctlError, MemctlResult};
use crate::domain::memory::{
    ConsolidateRequest, MemoryUpdate, NewMemory, RelationRequest, SearchRequest,
};
use crate::infrastructure::config::ConfigManager;
use crate::infrastructure::http::ApiClient;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tabled::{Table, Tabled};
use tokio::io::AsyncReadExt;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, warn};

const DEFAULT_SEARCH_LIMIT: u32 = 10;
const DEFAULT_LIST_LIMIT: u32 = 20;
const DEFAULT_IMPORT_CONCURRENCY: usize = 4;
const MAX_IMPORT_CONCURRENCY: usize = 32;
const DEFAULT_WATCH_INTERVAL_SECS: u64 = 5;

const USAGE: &str = "\
Usage: memctl <command> [arguments] [flags]

Commands:
  store <content>          Store a memory (use - to read stdin)
  recall <query>           Semantic search (alias: search)
  get <id>                 Show one memory
  list                     List memories
  update <id>              Change content, importance or tags
  delete <id> --yes        Delete a memory (alias: forget)
  relate <from> <to>       Link two memories (--type, --weight)
  relations <id>           Show links of a memory
  namespaces               List namespaces
  stats [--watch]          Service statistics
  consolidate [--dry-run]  Ask the service to consolidate memories
  export                   Dump memories (combine with --output)
  import <file>            Store memories from a JSON / JSON-lines file
  health                   Check the API
  config show|path|init    Inspect or create configuration
  version                  Print version

Flags:
  -n, --namespace <ns>   -l, --limit <n>   -t, --tags <a,b>   -i, --importance <0..1>
  -j, --json  -p, --pretty  -q, --quiet  -f, --format <table|json|yaml|csv|tsv>
  -o, --output <file>  --field <path>  --truncate <n>  --no-truncate  -w, --wide
  --api-url <url>  --api-key <key>  --timeout <ms>  -c, --config <file>  -v, --verbose";

/// Everything a command handler needs
pub struct CommandContext<'a> {
    pub args: &'a ParsedArguments,
    pub config: &'a MemctlConfig,
    pub config_manager: &'a ConfigManager,
    pub output: &'a Output,
}

impl<'a> CommandContext<'a> {
    /// Value of an optional flag; given without a value is an error
    fn opt(&self, name: &str) -> MemctlResult<Option<&'a str>> {
        match self.args.flag(name) {
            FlagValue::Present(value) => Ok(Some(value.as_str())),
            FlagValue::Flag => Err(MemctlError::InvalidInput(format!(
                "--{} requires a value",
                camel_to_kebab(name)
            ))),
            FlagValue::Absent => Ok(None),
        }
    }

    fn positional(&self, index: usize, usage: &str) -> MemctlResult<&'a str> {
        self.args
            .positional(index)
            .ok_or_else(|| MemctlError::InvalidInput(format!("Usage: memctl {}", usage)))
    }

    fn namespace(&self) -> MemctlResult<Option<String>> {
        Ok(self.opt("namespace")?.map(str::to_string))
    }

    fn namespace_query(&self) -> MemctlResult<Vec<(&'static str, String)>> {
        Ok(self
            .namespace()?
            .map(|namespace| vec![("namespace", namespace)])
            .unwrap_or_default())
    }

    /// API client from config, with `--api-url`, `--api-key` and `--timeout` applied
    fn client(&self) -> MemctlResult<ApiClient> {
        let mut api = self.config.api.clone();
        if let Some(url) = self.opt("apiUrl")? {
            api.url = url.to_string();
        }
        if let Some(key) = self.opt("apiKey")? {
            api.key = Some(key.to_string());
        }
        if let Some(timeout) = self.opt("timeout")? {
            api.timeout_ms = match timeout.trim().parse::<u64>() {
                Ok(ms) if ms > 0 => ms,
                _ => {
                    return Err(MemctlError::validation(format!(
                        "Timeout must be a positive number of milliseconds, got '{}'",
                        timeout
                    )))
                }
            };
        }
        debug!("Using API at {}", api.url);
        ApiClient::from_config(&api, &self.config.payment)
    }

    fn table_options(&self) -> TableOptions {
        TableOptions {
            wide: self.output.config().wide,
        }
    }
}

/// Execute CLI command
pub async fn execute_command(ctx: &CommandContext<'_>) -> MemctlResult<()> {
    if ctx.args.enabled("version") {
        return version(ctx);
    }
    let command = match ctx.args.command() {
        Some(command) if !ctx.args.enabled("help") => command,
        _ => return help(ctx),
    };

    match command {
        "help" => help(ctx),
        "version" => version(ctx),
        "config" => config(ctx),
        "store" | "remember" => store(ctx, &ctx.client()?).await,
        "recall" | "search" => recall(ctx, &ctx.client()?).await,
        "get" | "show" => get(ctx, &ctx.client()?).await,
        "list" | "ls" => list(ctx, &ctx.client()?).await,
        "update" => update(ctx, &ctx.client()?).await,
        "delete" | "forget" => delete(ctx, &ctx.client()?).await,
        "relate" => relate(ctx, &ctx.client()?).await,
        "relations" => relations(ctx, &ctx.client()?).await,
        "namespaces" => namespaces(ctx, &ctx.client()?).await,
        "stats" => stats(ctx, &ctx.client()?).await,
        "consolidate" => consolidate(ctx, &ctx.client()?).await,
        "export" => export(ctx, &ctx.client()?).await,
        "import" => import(ctx, &ctx.client()?).await,
        "health" => health(ctx, &ctx.client()?).await,
        other => Err(MemctlError::UnknownCommand(other.to_string())),
    }
}

fn help(ctx: &CommandContext<'_>) -> MemctlResult<()> {
    ctx.output.render(USAGE)?;
    Ok(())
}

fn version(ctx: &CommandContext<'_>) -> MemctlResult<()> {
    if ctx.output.is_json() {
        ctx.output
            .render(json!({ "version": env!("CARGO_PKG_VERSION") }))?;
    } else {
        ctx.output
            .render(format!("memctl {}", env!("CARGO_PKG_VERSION")))?;
    }
    Ok(())
}

async fn store(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let raw = ctx.positional(1, "store <content>")?;
    let content = if raw == "-" {
        let mut buffer = String::new();
        tokio::io::stdin().read_to_string(&mut buffer).await?;
        buffer.trim_end().to_string()
    } else {
        raw.to_string()
    };
    validate::content(&content)?;

    let metadata = match ctx.opt("metadata")? {
        Some(raw) => Some(serde_json::from_str(raw).map_err(|e| {
            MemctlError::InvalidInput(format!("--metadata must be valid JSON: {}", e))
        })?),
        None => None,
    };

    let memory = NewMemory {
        content,
        namespace: ctx.namespace()?,
        importance: ctx.opt("importance")?.map(validate::importance).transpose()?,
        tags: ctx.opt("tags")?.map(validate::tags).unwrap_or_default(),
        kind: ctx.opt("type")?.map(str::to_string),
        metadata,
    };

    let response = client.post(&["v1", "memories"], &memory).await?;
    if machine_readable(ctx.output) {
        ctx.output.render(response)?;
    } else {
        ctx.output
            .success(&format!("Stored memory {}", memory_id(&response)))?;
    }
    Ok(())
}

async fn recall(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let query = ctx.args.positionals().get(1..).unwrap_or_default().join(" ");
    if query.trim().is_empty() {
        return Err(MemctlError::InvalidInput(
            "Usage: memctl recall <query>".to_string(),
        ));
    }

    let request = SearchRequest {
        query,
        namespace: ctx.namespace()?,
        limit: ctx
            .opt("limit")?
            .map(validate::limit)
            .transpose()?
            .unwrap_or(DEFAULT_SEARCH_LIMIT),
        min_score: ctx.opt("minScore")?.map(validate::min_score).transpose()?,
        tags: ctx.opt("tags")?.map(validate::tags).unwrap_or_default(),
    };

    let response = client.post(&["v1", "memories", "search"], &request).await?;
    let columns = [
        Column::new("id", "ID"),
        Column::new("score", "SCORE"),
        Column::new("content", "CONTENT"),
        Column::new("tags", "TAGS"),
    ];
    emit_records(ctx, &response, "results", &columns, |record| {
        let memory = record.get("memory").unwrap_or(record);
        json!({
            "id": memory.get("id").cloned().unwrap_or(Value::Null),
            "score": record
                .get("score")
                .and_then(Value::as_f64)
                .map(|score| format!("{:.3}", score)),
            "content": ctx.output.clip(&text_field(memory, "content")),
            "tags": join_tags(memory.get("tags")),
        })
    })
}

async fn get(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let id = ctx.positional(1, "get <id>")?;
    let response = client.get(&["v1", "memories", id], &[]).await?;
    ctx.output.render(response)?;
    Ok(())
}

async fn list(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let limit = ctx
        .opt("limit")?
        .map(validate::limit)
        .transpose()?
        .unwrap_or(DEFAULT_LIST_LIMIT);

    let mut query = ctx.namespace_query()?;
    query.push(("limit", limit.to_string()));
    if let Some(offset) = ctx.opt("offset")? {
        query.push(("offset", validate::offset(offset)?.to_string()));
    }
    if let Some(tags) = ctx.opt("tags")? {
        for tag in validate::tags(tags) {
            query.push(("tag", tag));
        }
    }

    let response = client.get(&["v1", "memories"], &query).await?;
    let columns = [
        Column::new("id", "ID"),
        Column::new("content", "CONTENT"),
        Column::new("importance", "IMPORTANCE"),
        Column::new("tags", "TAGS"),
        Column::new("createdAt", "CREATED"),
    ];
    emit_records(ctx, &response, "memories", &columns, |memory| {
        json!({
            "id": memory.get("id").cloned().unwrap_or(Value::Null),
            "content": ctx.output.clip(&text_field(memory, "content")),
            "importance": memory.get("importance").cloned().unwrap_or(Value::Null),
            "tags": join_tags(memory.get("tags")),
            "createdAt": memory.get("createdAt").cloned().unwrap_or(Value::Null),
        })
    })
}

async fn update(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let id = ctx.positional(1, "update <id> [--content <text>] [--importance <n>] [--tags <a,b>]")?;

    let update = MemoryUpdate {
        content: ctx
            .opt("content")?
            .map(|content| validate::content(content).map(str::to_string))
            .transpose()?,
        importance: ctx.opt("importance")?.map(validate::importance).transpose()?,
        tags: ctx.opt("tags")?.map(validate::tags),
    };
    if update.is_empty() {
        return Err(MemctlError::InvalidInput(
            "Nothing to update; pass --content, --importance or --tags".to_string(),
        ));
    }

    let response = client.patch(&["v1", "memories", id], &update).await?;
    if machine_readable(ctx.output) {
        ctx.output.render(response)?;
    } else {
        ctx.output.success(&format!("Updated memory {}", id))?;
    }
    Ok(())
}

async fn delete(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let id = ctx.positional(1, "delete <id> --yes")?;
    if !ctx.args.enabled("yes") && !ctx.args.enabled("force") {
        return Err(MemctlError::InvalidInput(format!(
            "Refusing to delete {} without --yes",
            id
        )));
    }

    let response = client.delete(&["v1", "memories", id]).await?;
    if machine_readable(ctx.output) {
        let body = if response.is_null() {
            json!({ "deleted": id })
        } else {
            response
        };
        ctx.output.render(body)?;
    } else {
        ctx.output.success(&format!("Deleted memory {}", id))?;
    }
    Ok(())
}

async fn relate(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let usage = "relate <from> <to> [--type <relation>] [--weight <0..1>]";
    let from = ctx.positional(1, usage)?;
    let to = ctx.positional(2, usage)?;
    let relation = validate::relation_type(ctx.opt("type")?.unwrap_or("related_to"))?;

    let request = RelationRequest {
        target_id: to.to_string(),
        relation: relation.to_string(),
        weight: ctx.opt("weight")?.map(validate::weight).transpose()?,
    };

    let response = client
        .post(&["v1", "memories", from, "relations"], &request)
        .await?;
    if machine_readable(ctx.output) {
        ctx.output.render(response)?;
    } else {
        ctx.output
            .success(&format!("Linked {} -[{}]-> {}", from, relation, to))?;
    }
    Ok(())
}

async fn relations(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let id = ctx.positional(1, "relations <id>")?;
    let response = client
        .get(&["v1", "memories", id, "relations"], &[])
        .await?;

    let columns = [
        Column::new("type", "TYPE"),
        Column::new("targetId", "TARGET"),
        Column::new("weight", "WEIGHT"),
    ];
    emit_records(ctx, &response, "relations", &columns, Value::clone)
}

async fn namespaces(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let response = client.get(&["v1", "namespaces"], &[]).await?;
    let columns = [
        Column::new("name", "NAMESPACE"),
        Column::new("count", "MEMORIES"),
    ];
    emit_records(ctx, &response, "namespaces", &columns, |record| match record {
        Value::String(name) => json!({ "name": name }),
        other => other.clone(),
    })
}

async fn stats(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let query = ctx.namespace_query()?;
    if !ctx.args.enabled("watch") {
        let response = client.get(&["v1", "stats"], &query).await?;
        return show_stats(ctx, &response);
    }

    let interval = ctx
        .opt("interval")?
        .map(validate::interval)
        .transpose()?
        .unwrap_or(DEFAULT_WATCH_INTERVAL_SECS);

    let interrupted = tokio::signal::ctrl_c();
    tokio::pin!(interrupted);

    loop {
        tokio::select! {
            response = client.get(&["v1", "stats"], &query) => {
                let response = response?;
                ctx.output.clear_screen()?;
                show_stats(ctx, &response)?;
            }
            _ = &mut interrupted => break,
        }
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(interval)) => {}
            _ = &mut interrupted => break,
        }
    }
    Ok(())
}

fn show_stats(ctx: &CommandContext<'_>, response: &Value) -> MemctlResult<()> {
    if machine_readable(ctx.output) {
        ctx.output.render(response.clone())?;
        return Ok(());
    }

    let mut rows = Vec::new();
    flatten_stats("", response, &mut rows);
    let columns = [
        Column::new("metric", "METRIC"),
        Column::new("value", "VALUE"),
    ];
    ctx.output
        .table(&rows, Some(&columns[..]), ctx.table_options())?;
    Ok(())
}

async fn consolidate(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let request = ConsolidateRequest {
        namespace: ctx.namespace()?,
        dry_run: ctx.args.enabled("dryRun"),
    };
    let response = client.post(&["v1", "consolidate"], &request).await?;

    if !machine_readable(ctx.output) {
        let label = if request.dry_run {
            "Consolidation dry run finished"
        } else {
            "Consolidation finished"
        };
        ctx.output.success(label)?;
    }
    if !response.is_null() {
        ctx.output.render(response)?;
    }
    Ok(())
}

async fn export(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let query = ctx.namespace_query()?;
    let response = client.get(&["v1", "export"], &query).await?;

    if matches!(
        ctx.output.config().format,
        OutputFormat::Csv | OutputFormat::Tsv
    ) && !ctx.output.is_json()
    {
        ctx.output.render(Value::Array(records(&response, "memories")))?;
    } else {
        ctx.output.render(response)?;
    }
    Ok(())
}

async fn import(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let path = ctx.positional(1, "import <file> [--concurrency <n>]")?;
    let concurrency = match ctx.opt("concurrency")? {
        Some(raw) => match raw.trim().parse::<usize>() {
            Ok(n) if (1..=MAX_IMPORT_CONCURRENCY).contains(&n) => n,
            _ => {
                return Err(MemctlError::validation(format!(
                    "Concurrency must be between 1 and {}, got '{}'",
                    MAX_IMPORT_CONCURRENCY, raw
                )))
            }
        },
        None => DEFAULT_IMPORT_CONCURRENCY,
    };

    let text = tokio::fs::read_to_string(path).await.map_err(|e| {
        MemctlError::InvalidInput(format!("Cannot read import file {}: {}", path, e))
    })?;
    let entries = parse_import(&text);
    let namespace = ctx.namespace()?;

    let total = entries.len() as u64;
    let step = (total / 20).max(1);
    let semaphore = Arc::new(Semaphore::new(concurrency));
    let mut tasks = JoinSet::new();
    let mut failures = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let mut memory = match entry {
            Ok(memory) => memory,
            Err(e) => {
                failures.push(json!({ "index": index, "error": e }));
                continue;
            }
        };
        if let Err(e) = validate::content(&memory.content) {
            failures.push(json!({ "index": index, "error": e.to_string() }));
            continue;
        }
        if memory.namespace.is_none() {
            memory.namespace = namespace.clone();
        }

        let client = client.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await;
            (index, client.post(&["v1", "memories"], &memory).await)
        });
    }

    let mut done = failures.len() as u64;
    let mut imported = 0u64;
    while let Some(joined) = tasks.join_next().await {
        done += 1;
        match joined {
            Ok((_, Ok(_))) => imported += 1,
            Ok((index, Err(e))) => {
                warn!("Import of entry {} failed: {}", index, e);
                failures.push(json!({ "index": index, "error": e.to_string() }));
            }
            Err(e) => failures.push(json!({ "index": Value::Null, "error": e.to_string() })),
        }
        if done % step == 0 || done == total {
            ctx.output.progress(done, total)?;
        }
    }

    if machine_readable(ctx.output) {
        ctx.output.render(json!({
            "imported": imported,
            "failed": failures.len(),
            "errors": failures,
        }))?;
        return Ok(());
    }

    for failure in &failures {
        ctx.output.warn(&format!(
            "entry {}: {}",
            failure["index"],
            failure["error"].as_str().unwrap_or_default()
        ))?;
    }
    ctx.output
        .success(&format!("Imported {} of {} memories", imported, total))?;
    Ok(())
}

async fn health(ctx: &CommandContext<'_>, client: &ApiClient) -> MemctlResult<()> {
    let response = client.get(&["v1", "health"], &[]).await?;

    match response.get("status").and_then(Value::as_str) {
        Some(status) if !machine_readable(ctx.output) => {
            ctx.output
                .success(&format!("{} is {}", client.base_url(), status))?;
        }
        _ => ctx.output.render(response)?,
    }
    Ok(())
}

/// Row for `config show`
#[derive(Tabled)]
struct ConfigRow {
    key: String,
    value: String,
}

fn config(ctx: &CommandContext<'_>) -> MemctlResult<()> {
    match ctx.args.positional(1).unwrap_or("show") {
        "show" => {
            let mut shown = ctx.config.clone();
            if shown.api.key.is_some() {
                shown.api.key = Some(mask_secret(shown.api.key.as_deref().unwrap_or_default()));
            }
            if shown.payment.token.is_some() {
                shown.payment.token = Some(mask_secret(
                    shown.payment.token.as_deref().unwrap_or_default(),
                ));
            }
            let value = serde_json::to_value(&shown)?;

            if machine_readable(ctx.output) {
                ctx.output.render(value)?;
            } else {
                let mut rows = Vec::new();
                flatten_stats("", &value, &mut rows);
                let rows: Vec<ConfigRow> = rows
                    .iter()
                    .map(|row| ConfigRow {
                        key: row["metric"].as_str().unwrap_or_default().to_string(),
                        value: crate::cli::output::cell_text(row.get("value")),
                    })
                    .collect();
                ctx.output.render(Table::new(rows).to_string())?;
            }
            Ok(())
        }
        "path" => {
            let global = ctx
                .config_manager
                .global_config_path()
                .map(|path| path.display().to_string());
            let project = ctx
                .config_manager
                .project_config_path()
                .map(|path| path.display().to_string());

            if ctx.output.is_json() {
                ctx.output
                    .render(json!({ "global": global, "project": project }))?;
            } else {
                ctx.output.render(format!(
                    "global:  {}\nproject: {}",
                    global.as_deref().unwrap_or("-"),
                    project.as_deref().unwrap_or("-")
                ))?;
            }
            Ok(())
        }
        "init" => {
            let dir = std::env::current_dir()?;
            let path = ctx.config_manager.init_project_config(&dir)?;
            ctx.output
                .success(&format!("Project configuration initialized at {}", path.display()))?;
            Ok(())
        }
        other => Err(MemctlError::UnknownCommand(format!("config {}", other))),
    }
}

/// Anything other than the human table view
fn machine_readable(output: &Output) -> bool {
    output.is_json() || output.config().format != OutputFormat::Table
}

/// Render a list response: full JSON in JSON mode, a table of `display` rows
/// for humans, the raw records for csv/tsv/yaml.
fn emit_records<F>(
    ctx: &CommandContext<'_>,
    response: &Value,
    key: &str,
    columns: &[Column],
    display: F,
) -> MemctlResult<()>
where
    F: Fn(&Value) -> Value,
{
    if ctx.output.is_json() {
        ctx.output.render(response.clone())?;
        return Ok(());
    }

    let records = records(response, key);
    if ctx.output.config().format != OutputFormat::Table {
        ctx.output.table(&records, None, ctx.table_options())?;
        return Ok(());
    }

    if records.is_empty() {
        ctx.output.info("No results")?;
        return Ok(());
    }
    let rows: Vec<Value> = records.iter().map(display).collect();
    ctx.output
        .table(&rows, Some(columns), ctx.table_options())?;
    ctx.output.info(&format!("{} result(s)", rows.len()))?;
    Ok(())
}

/// The list inside a response: the response itself if it is an array,
/// otherwise the array under `key`.
fn records(response: &Value, key: &str) -> Vec<Value> {
    match response {
        Value::Array(items) => items.clone(),
        other => other
            .get(key)
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default(),
    }
}

fn memory_id(response: &Value) -> &str {
    response
        .get("id")
        .or_else(|| response.get("memory").and_then(|memory| memory.get("id")))
        .and_then(Value::as_str)
        .unwrap_or("(unknown id)")
}

fn text_field(value: &Value, key: &str) -> String {
    value
        .get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .replace(['\n', '\r'], " ")
}

fn join_tags(tags: Option<&Value>) -> String {
    match tags {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .collect::<Vec<_>>()
            .join(", "),
        Some(Value::String(tags)) => tags.clone(),
        _ => String::new(),
    }
}

/// Flatten nested objects into `{metric, value}` rows with dotted names
fn flatten_stats(prefix: &str, value: &Value, rows: &mut Vec<Value>) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let name = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_stats(&name, inner, rows);
            }
        }
        other => rows.push(json!({ "metric": prefix, "value": other })),
    }
}

/// Import entries in file order. An entry that does not decode keeps its
/// slot and carries the decode error.
fn parse_import(text: &str) -> Vec<Result<NewMemory, String>> {
    let trimmed = text.trim_start();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        if let Ok(document) = serde_json::from_str::<Value>(trimmed) {
            let items = records(&document, "memories");
            if !items.is_empty() || document.is_array() {
                return items
                    .into_iter()
                    .map(|item| serde_json::from_value(item).map_err(|e| e.to_string()))
                    .collect();
            }
        }
    }

    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| {
            serde_json::from_str(line).map_err(|e| format!("Line {}: {}", number + 1, e))
        })
        .collect()
}

fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{}****", visible)
}
