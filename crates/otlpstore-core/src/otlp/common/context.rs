// Resource- and scope-level fields shared by every row produced beneath them.
//
// Built once per ResourceX / ScopeX and shared through `Arc` so attribute maps are
// not rebuilt for each span, log record or data point.

use std::sync::Arc;

use otlpstore_proto::opentelemetry::proto::common::v1::InstrumentationScope;
use otlpstore_proto::opentelemetry::proto::resource::v1::Resource;

use super::codec::{attributes_to_map, service_name, Attributes};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceContext {
    pub service_name: String,
    pub attributes: Attributes,
    pub schema_url: String,
}

impl ResourceContext {
    pub(crate) fn extract(resource: Option<&Resource>, schema_url: &str) -> Arc<Self> {
        Arc::new(Self {
            service_name: service_name(resource),
            attributes: resource
                .map(|r| attributes_to_map(&r.attributes))
                .unwrap_or_default(),
            schema_url: schema_url.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScopeContext {
    pub name: String,
    pub version: String,
    pub attributes: Attributes,
    pub schema_url: String,
}

impl ScopeContext {
    pub(crate) fn extract(scope: Option<&InstrumentationScope>, schema_url: &str) -> Arc<Self> {
        Arc::new(match scope {
            Some(s) => Self {
                name: s.name.clone(),
                version: s.version.clone(),
                attributes: attributes_to_map(&s.attributes),
                schema_url: schema_url.to_string(),
            },
            None => Self {
                schema_url: schema_url.to_string(),
                ..Self::default()
            },
        })
    }
}
