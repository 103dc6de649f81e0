//! Field mapping: bindings from template fields to source-record values.
mod discovery;
mod encoding;
mod path;
mod resolver;
mod scaffold;
mod types;

#[cfg(test)]
mod tests;

pub use discovery::{DEFAULT_MAX_FIELD_DEPTH, list_field_paths};
pub use encoding::decode_special_payload;
pub use path::FieldPath;
pub use resolver::{MappingPlan, resolve};
pub use scaffold::scaffold_mapping;
pub use types::{
    FieldBinding, FieldMappingConfig, PayloadEncoding, PayloadEntry, ResolvedFields, Section,
    SpecialField,
};
