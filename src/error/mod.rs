mod app;
mod config;
mod curl;
mod executor;
mod http;
mod mapping;
mod source;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use curl::CurlError;
pub use executor::ExecutorError;
pub use http::HttpError;
pub use mapping::MappingError;
pub use source::SourceError;
pub use validation::ValidationError;
