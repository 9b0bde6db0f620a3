// Arrow builder construction helpers shared by the row builders.

use arrow::array::{MapBuilder, StringBuilder};
use arrow::error::ArrowError;

use super::codec::Attributes;

/// Builder for `Map<Utf8, Utf8>` attribute columns; matches `schema::attribute_map_type`.
pub(crate) type AttributeMapBuilder = MapBuilder<StringBuilder, StringBuilder>;

pub(crate) fn attribute_map_builder() -> AttributeMapBuilder {
    MapBuilder::new(None, StringBuilder::new(), StringBuilder::new())
}

/// Append one map entry holding every attribute.
pub(crate) fn append_attributes(
    builder: &mut AttributeMapBuilder,
    attributes: &Attributes,
) -> Result<(), ArrowError> {
    for (key, value) in attributes {
        builder.keys().append_value(key);
        builder.values().append_value(value);
    }
    builder.append(true)
}
