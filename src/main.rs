mod args;
mod config;
mod curl;
mod entry;
mod error;
mod executor;
mod http;
mod logger;
mod mapping;
mod runner;
mod source;
mod summary;

use error::AppResult;

fn main() -> AppResult<()> {
    entry::run()
}
