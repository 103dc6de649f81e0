use std::ffi::OsString;
use std::sync::Arc;

use clap::{CommandFactory, FromArgMatches};
use tracing::info;

use crate::args::{Command, TesterArgs};
use crate::config::{RunSettings, load_config, resolve_settings};
use crate::curl::parse_curl_command;
use crate::error::AppResult;
use crate::http::ReqwestTransport;
use crate::logger::init_logging;
use crate::mapping::scaffold_mapping;
use crate::runner::{RunParams, execute_load_test};
use crate::source::{DocumentSource, JsonStore};
use crate::summary::render_summary;

pub(crate) fn run() -> AppResult<()> {
    let Some(args) = parse_args()? else {
        return Ok(());
    };

    init_logging(args.verbose, args.no_color);

    let config = load_config(args.config.as_deref())?;
    let settings = resolve_settings(&args, config)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args.command, settings))
}

fn parse_args() -> AppResult<Option<TesterArgs>> {
    let mut cmd = TesterArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    Ok(Some(TesterArgs::from_arg_matches(&matches)?))
}

/// Bare invocations print help unless a default config file exists.
fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    treat_as_empty
        && !["mapload.toml", "mapload.json"]
            .iter()
            .any(|name| std::path::Path::new(name).exists())
}

async fn run_async(command: Option<Command>, settings: RunSettings) -> AppResult<()> {
    match command {
        Some(Command::Fields(fields)) => list_fields(&settings, fields.max_depth).await,
        Some(Command::Init(init)) => print_scaffold(&settings, init.match_fields).await,
        None => run_load_test(&settings).await,
    }
}

async fn run_load_test(settings: &RunSettings) -> AppResult<()> {
    let template = parse_curl_command(settings.curl_command()?)?;
    let collection = settings.collection_ref()?;
    let store = Arc::new(JsonStore::connect(settings.store_path()?).await?);
    let transport = Arc::new(ReqwestTransport::new(settings.request_timeout)?);

    let params = RunParams {
        num_requests: settings.requests.get(),
        concurrency: settings.concurrency.get(),
        collection,
        request_timeout: settings.request_timeout,
        jwt_secret: settings.jwt_secret.clone(),
    };
    let outcome = execute_load_test(
        &template,
        &settings.mapping,
        Arc::clone(&store) as Arc<dyn DocumentSource>,
        transport,
        &params,
    )
    .await;
    store.disconnect().await;

    let result = outcome?;
    println!("{}", render_summary(&result, settings.output_format)?);
    Ok(())
}

async fn list_fields(settings: &RunSettings, max_depth: usize) -> AppResult<()> {
    let store = JsonStore::connect(settings.store_path()?).await?;
    let listing = list_store_level(&store, settings, max_depth).await;
    store.disconnect().await;

    for line in listing? {
        println!("{}", line);
    }
    Ok(())
}

/// Databases without `--database`, collections without `--collection`,
/// otherwise the field paths of the collection's sample document.
async fn list_store_level(
    store: &JsonStore,
    settings: &RunSettings,
    max_depth: usize,
) -> AppResult<Vec<String>> {
    match (settings.database.as_deref(), settings.collection.as_deref()) {
        (None, _) => Ok(store.list_databases().await?),
        (Some(database), None) => Ok(store.list_collections(database).await?),
        (Some(_), Some(_)) => Ok(store
            .list_field_paths(&settings.collection_ref()?, max_depth)
            .await?),
    }
}

async fn print_scaffold(settings: &RunSettings, match_fields: bool) -> AppResult<()> {
    let template = parse_curl_command(settings.curl_command()?)?;
    let field_paths = if match_fields {
        let collection = settings.collection_ref()?;
        let store = JsonStore::connect(settings.store_path()?).await?;
        let fields = store
            .list_field_paths(&collection, crate::mapping::DEFAULT_MAX_FIELD_DEPTH)
            .await;
        store.disconnect().await;
        fields?
    } else {
        Vec::new()
    };

    let mapping = scaffold_mapping(&template, &field_paths);
    info!(
        "Scaffolded mapping for {} {} ({} field paths matched against)",
        template.method,
        template.url,
        field_paths.len()
    );
    println!("{}", serde_json::to_string_pretty(&mapping)?);
    Ok(())
}
