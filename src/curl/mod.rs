//! Curl command parsing into request templates.
mod parser;
mod tokenize;


pub use parser::parse_curl_command;
