//! Shared OTLP ingestion helpers used by all three signal types.

pub(crate) mod builder_helpers;
pub mod codec;
pub mod context;
pub mod field_names;
pub mod format;
pub(crate) mod json_normalizer;

pub use codec::{Attributes, UNKNOWN_SERVICE_NAME};
pub use context::{ResourceContext, ScopeContext};
pub use format::OtlpSignalRequest;
