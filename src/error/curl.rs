use thiserror::Error;

#[derive(Debug, Error)]
pub enum CurlError {
    #[error("Curl command was empty.")]
    Empty,
    #[error("Command must start with 'curl', found '{found}'.")]
    NotCurl { found: String },
    #[error("Curl command has no URL.")]
    MissingUrl,
    #[error("Flag '{flag}' requires a value.")]
    MissingFlagValue { flag: String },
    #[error("Unterminated {quote} quote in curl command.")]
    UnterminatedQuote { quote: char },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid HTTP method '{method}'.")]
    InvalidMethod { method: String },
}
