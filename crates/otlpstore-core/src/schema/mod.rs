//! Arrow schemas for the three row families.
//!
//! Column order is fixed per schema; builders and scans address columns by index.

pub mod logs;
pub mod metrics;
pub mod traces;

use std::collections::HashMap;
use std::sync::Arc;

use arrow::datatypes::{DataType, Field, Fields, TimeUnit};

use crate::signal::SignalKind;

pub use logs::logs_schema;
pub use metrics::{metric_table_projection, metrics_schema};
pub use traces::traces_schema;

/// Version stamped into every schema's metadata.
pub const SCHEMA_VERSION: &str = "1.0.0";

pub(crate) const SCHEMA_VERSION_KEY: &str = "otlpstore.schema_version";
pub(crate) const SCHEMA_SIGNAL_KEY: &str = "otlpstore.signal";

/// Field names `MapBuilder` uses when none are supplied.
const MAP_ENTRIES: &str = "entries";
const MAP_KEYS: &str = "keys";
const MAP_VALUES: &str = "values";
const LIST_ITEM: &str = "item";

/// Timestamp type with a UTC zone.
pub(crate) fn utc_timestamp(unit: TimeUnit) -> DataType {
    DataType::Timestamp(unit, Some("UTC".into()))
}

/// `Map<Utf8, Utf8>` laid out exactly as an unnamed `MapBuilder` produces it.
pub fn attribute_map_type() -> DataType {
    let entries = Fields::from(vec![
        Field::new(MAP_KEYS, DataType::Utf8, false),
        Field::new(MAP_VALUES, DataType::Utf8, true),
    ]);
    DataType::Map(
        Arc::new(Field::new(MAP_ENTRIES, DataType::Struct(entries), false)),
        false,
    )
}

/// List element field; builders take it from the schema via `with_field`.
pub(crate) fn list_item(data_type: DataType) -> Arc<Field> {
    Arc::new(Field::new(LIST_ITEM, data_type, true))
}

pub(crate) fn list_of(data_type: DataType) -> DataType {
    DataType::List(list_item(data_type))
}

pub(crate) fn schema_metadata(signal: SignalKind) -> HashMap<String, String> {
    HashMap::from([
        (SCHEMA_VERSION_KEY.to_string(), SCHEMA_VERSION.to_string()),
        (SCHEMA_SIGNAL_KEY.to_string(), signal.as_str().to_string()),
    ])
}

/// Element field of a list column, as declared in the schema.
pub(crate) fn list_element(field: &Field) -> Arc<Field> {
    match field.data_type() {
        DataType::List(item) => Arc::clone(item),
        other => list_item(other.clone()),
    }
}
