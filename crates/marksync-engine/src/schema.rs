use marksync_model::{Attrs, Mark, MarkSet, ModelError, NodeKind, Schema, SchemaBuilder};
use serde_json::{Value, json};

/// Block attribute holding the marks of a block that became empty
pub const REMEMBERED_MARKS: &str = "remembered-marks";

/// Mark type carrying the font size in its `value` attribute
pub const FONT_SIZE: &str = "font_size";
pub const FONT_SIZE_VALUE: &str = "value";

fn attrs(pairs: &[(&str, Value)]) -> Attrs {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

/// The editor's document schema: paragraphs (the default block), headings
/// and blockquotes, with font size, strong and em marks. Both textblock
/// types carry the remembered-marks attribute.
pub fn editor_schema() -> Result<Schema, ModelError> {
    SchemaBuilder::new()
        .node("doc", NodeKind::Doc, Attrs::new())
        .node(
            "paragraph",
            NodeKind::Textblock,
            attrs(&[(REMEMBERED_MARKS, Value::Null)]),
        )
        .node(
            "heading",
            NodeKind::Textblock,
            attrs(&[("level", json!(1)), (REMEMBERED_MARKS, Value::Null)]),
        )
        .node("blockquote", NodeKind::Container, Attrs::new())
        .node("text", NodeKind::Text, Attrs::new())
        .mark(FONT_SIZE, attrs(&[(FONT_SIZE_VALUE, Value::Null)]))
        .mark("strong", Attrs::new())
        .mark("em", Attrs::new())
        .build()
}

pub fn font_size_mark(schema: &Schema, size: u32) -> Result<Mark, ModelError> {
    schema.mark(FONT_SIZE, attrs(&[(FONT_SIZE_VALUE, json!(size))]))
}

/// Font size carried by a mark set, if any
pub fn font_size_of(marks: &MarkSet) -> Option<u32> {
    marks
        .get(FONT_SIZE)?
        .attr(FONT_SIZE_VALUE)?
        .as_u64()
        .and_then(|size| u32::try_from(size).ok())
}
