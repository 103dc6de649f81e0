use clap::{Args, Parser, Subcommand};
use std::time::Duration;

use crate::mapping::DEFAULT_MAX_FIELD_DEPTH;

use super::parsers::{parse_duration_arg, parse_positive_usize};
use super::types::{OutputFormat, PositiveUsize};

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List databases, a database's collections, or the field paths of a collection's sample document
    Fields(FieldsArgs),
    /// Print a starting field mapping for the curl command as JSON
    Init(InitArgs),
}

#[derive(Debug, Args, Clone)]
pub struct FieldsArgs {
    /// Maximum nesting depth to explore
    #[arg(long = "max-depth", default_value_t = DEFAULT_MAX_FIELD_DEPTH)]
    pub max_depth: usize,
}

#[derive(Debug, Args, Clone)]
pub struct InitArgs {
    /// Bind template fields whose names match collection field paths (needs --store)
    #[arg(long = "match-fields")]
    pub match_fields: bool,
}

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "Document-driven HTTP load tester - replays a curl request with fields mapped from stored documents, at bounded concurrency."
)]
pub struct TesterArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to config file (TOML/JSON). Defaults to ./mapload.toml or ./mapload.json if present.
    #[arg(long)]
    pub config: Option<String>,

    /// Curl command used as the request template
    #[arg(long)]
    pub curl: Option<String>,

    /// Number of iterations to run (default: 1)
    #[arg(long = "requests", short = 'n', value_parser = parse_positive_usize)]
    pub requests: Option<PositiveUsize>,

    /// Max number of iterations in flight (default: 1)
    #[arg(long = "concurrency", short = 'c', value_parser = parse_positive_usize)]
    pub concurrency: Option<PositiveUsize>,

    /// Per-request timeout (supports ms/s/m/h)
    #[arg(long = "timeout", value_parser = parse_duration_arg)]
    pub request_timeout: Option<Duration>,

    /// JSON document store file
    #[arg(long)]
    pub store: Option<String>,

    /// Database holding the collection
    #[arg(long)]
    pub database: Option<String>,

    /// Collection sampled for every iteration
    #[arg(long)]
    pub collection: Option<String>,

    /// Default HS256 secret for jwt special fields
    #[arg(long = "jwt-secret", env = "MAPLOAD_JWT_SECRET", hide_env_values = true)]
    pub jwt_secret: Option<String>,

    /// Summary output format
    #[arg(long = "output-format", value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Enable verbose logging (sets log level to debug unless overridden by MAPLOAD_LOG/RUST_LOG)
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable colored log output
    #[arg(long = "no-color")]
    pub no_color: bool,
}
