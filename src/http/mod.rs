//! Request templates, materialization, and the HTTP transport.
mod materialize;
mod template;
mod transport;


pub use materialize::{MaterializedRequest, materialize, merge_headers, merge_query, render_value};
pub use template::RequestTemplate;
pub use transport::{HttpTransport, ReqwestTransport, TransportResponse};
