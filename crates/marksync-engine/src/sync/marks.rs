//! Conversion between mark sets and the JSON object stored in the
//! remembered-marks attribute.

use log::trace;
use marksync_model::{Attrs, Mark, MarkSet, Node, Schema};
use serde_json::{Map, Value};

use crate::schema::REMEMBERED_MARKS;

/// Mark name to mark attributes, as stored on a block
pub type FlatMarks = Map<String, Value>;

/// Convert marks to a `name -> attrs` object. A later mark with the same
/// name overwrites an earlier one.
pub fn flatten<'a, I>(marks: I) -> FlatMarks
where
    I: IntoIterator<Item = &'a Mark>,
{
    marks
        .into_iter()
        .map(|mark| {
            let attrs: Map<String, Value> = mark
                .attrs()
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            (mark.name().to_string(), Value::Object(attrs))
        })
        .collect()
}

/// Inverse of [`flatten`]. Names the schema does not know are dropped.
pub fn unflatten(schema: &Schema, flat: &FlatMarks) -> MarkSet {
    flat.iter()
        .filter_map(|(name, attrs)| {
            let attrs: Attrs = attrs
                .as_object()
                .map(|object| {
                    object
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default();
            match schema.mark(name, attrs) {
                Ok(mark) => Some(mark),
                Err(err) => {
                    trace!("dropping remembered mark: {err}");
                    None
                }
            }
        })
        .collect()
}

pub fn same_set(a: &MarkSet, b: &MarkSet) -> bool {
    a == b
}

/// The remembered marks of a block, `None` when the attribute is unset
pub fn remembered_marks(schema: &Schema, node: &Node) -> Option<MarkSet> {
    node.attr(REMEMBERED_MARKS)
        .and_then(Value::as_object)
        .map(|flat| unflatten(schema, flat))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{editor_schema, font_size_mark};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_flatten_last_wins() {
        let schema = editor_schema().unwrap();
        let marks = [
            font_size_mark(&schema, 12).unwrap(),
            schema.mark("strong", Attrs::new()).unwrap(),
            font_size_mark(&schema, 18).unwrap(),
        ];

        let flat = flatten(&marks);

        assert_eq!(
            Value::Object(flat),
            json!({"font_size": {"value": 18}, "strong": {}})
        );
    }

    #[test]
    fn test_round_trip_with_known_names() {
        let schema = editor_schema().unwrap();
        let marks = MarkSet::from_marks([
            font_size_mark(&schema, 24).unwrap(),
            schema.mark("em", Attrs::new()).unwrap(),
        ]);

        assert!(same_set(&unflatten(&schema, &flatten(&marks)), &marks));
    }

    #[test]
    fn test_unflatten_drops_unknown_names() {
        let schema = editor_schema().unwrap();
        let flat = json!({"blink": {}, "font_size": {"value": 10}});
        let Value::Object(flat) = flat else {
            unreachable!()
        };

        let marks = unflatten(&schema, &flat);

        assert_eq!(marks.len(), 1);
        assert!(marks.contains(&font_size_mark(&schema, 10).unwrap()));
    }

    #[test]
    fn test_remembered_marks_absent_when_null() {
        let schema = editor_schema().unwrap();
        let block = schema.empty_textblock();

        assert_eq!(remembered_marks(&schema, &block), None);
    }
}
