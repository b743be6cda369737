use crate::error::ModelError;
use crate::mark::{Attrs, Mark, MarkSet};
use crate::node::{Fragment, Node, NodeKind, TEXT_NODE};
use crate::replace::check_content;

/// Declaration of a node type and the defaults of its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    pub attrs: Attrs,
}

/// Declaration of a mark type and the defaults of its attributes
#[derive(Debug, Clone, PartialEq)]
pub struct MarkSpec {
    pub name: String,
    pub attrs: Attrs,
}

/// Builder for a [`Schema`]; node types keep their declaration order
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(mut self, name: &str, kind: NodeKind, attrs: Attrs) -> Self {
        self.nodes.push(NodeSpec {
            name: name.to_string(),
            kind,
            attrs,
        });
        self
    }

    pub fn mark(mut self, name: &str, attrs: Attrs) -> Self {
        self.marks.push(MarkSpec {
            name: name.to_string(),
            attrs,
        });
        self
    }

    /// Check the declarations: names must be unique, exactly one doc type
    /// and a `text` type must exist, and at least one textblock type.
    pub fn build(self) -> Result<Schema, ModelError> {
        for (i, spec) in self.nodes.iter().enumerate() {
            if self.nodes[..i].iter().any(|other| other.name == spec.name) {
                return Err(ModelError::InvalidSchema(format!(
                    "duplicate node type {}",
                    spec.name
                )));
            }
        }
        for (i, spec) in self.marks.iter().enumerate() {
            if self.marks[..i].iter().any(|other| other.name == spec.name) {
                return Err(ModelError::InvalidSchema(format!(
                    "duplicate mark type {}",
                    spec.name
                )));
            }
        }

        let docs: Vec<_> = self
            .nodes
            .iter()
            .filter(|spec| spec.kind == NodeKind::Doc)
            .collect();
        let [doc] = docs.as_slice() else {
            return Err(ModelError::InvalidSchema(
                "exactly one doc node type is required".to_string(),
            ));
        };
        let doc = doc.name.clone();

        let has_text = self
            .nodes
            .iter()
            .any(|spec| spec.name == TEXT_NODE && spec.kind == NodeKind::Text);
        if !has_text {
            return Err(ModelError::InvalidSchema(format!(
                "a `{TEXT_NODE}` node type is required"
            )));
        }

        let default_textblock = self
            .nodes
            .iter()
            .position(|spec| spec.kind == NodeKind::Textblock)
            .ok_or_else(|| {
                ModelError::InvalidSchema("at least one textblock type is required".to_string())
            })?;

        Ok(Schema {
            nodes: self.nodes,
            marks: self.marks,
            doc,
            default_textblock,
        })
    }
}

/// The closed catalog of node and mark types a document may use
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    nodes: Vec<NodeSpec>,
    marks: Vec<MarkSpec>,
    doc: String,
    default_textblock: usize,
}

impl Schema {
    pub fn node_spec(&self, name: &str) -> Option<&NodeSpec> {
        self.nodes.iter().find(|spec| spec.name == name)
    }

    pub fn mark_spec(&self, name: &str) -> Option<&MarkSpec> {
        self.marks.iter().find(|spec| spec.name == name)
    }

    pub fn has_mark(&self, name: &str) -> bool {
        self.mark_spec(name).is_some()
    }

    pub fn mark_names(&self) -> impl Iterator<Item = &str> {
        self.marks.iter().map(|spec| spec.name.as_str())
    }

    /// The textblock type used for new blocks, the first one declared
    pub fn default_textblock(&self) -> &NodeSpec {
        &self.nodes[self.default_textblock]
    }

    pub fn doc_type(&self) -> &str {
        &self.doc
    }

    /// Create an element node, filling in attribute defaults and validating
    /// its content. Attributes the type does not declare are dropped.
    pub fn node(&self, name: &str, attrs: Attrs, content: Fragment) -> Result<Node, ModelError> {
        let spec = self
            .node_spec(name)
            .ok_or_else(|| ModelError::UnknownNodeType(name.to_string()))?;
        if spec.kind == NodeKind::Text {
            return Err(ModelError::InvalidContent {
                node: name.to_string(),
                reason: "text nodes are created with Schema::text".to_string(),
            });
        }
        let node = Node::element(spec.kind, name, compute_attrs(&spec.attrs, &attrs), content);
        check_content(&node, node.content())?;
        Ok(node)
    }

    /// An empty block of the default textblock type
    pub fn empty_textblock(&self) -> Node {
        let spec = self.default_textblock();
        Node::element(spec.kind, spec.name.clone(), spec.attrs.clone(), Fragment::empty())
    }

    /// A document holding one empty default textblock
    pub fn empty_doc(&self) -> Node {
        Node::element(
            NodeKind::Doc,
            self.doc.clone(),
            Attrs::new(),
            Fragment::from_node(self.empty_textblock()),
        )
    }

    pub fn text(&self, text: &str, marks: MarkSet) -> Node {
        Node::text(text, marks)
    }

    /// Create a mark, filling in attribute defaults
    pub fn mark(&self, name: &str, attrs: Attrs) -> Result<Mark, ModelError> {
        let spec = self
            .mark_spec(name)
            .ok_or_else(|| ModelError::UnknownMarkType(name.to_string()))?;
        Ok(Mark::new(name, compute_attrs(&spec.attrs, &attrs)))
    }
}

fn compute_attrs(defaults: &Attrs, given: &Attrs) -> Attrs {
    defaults
        .iter()
        .map(|(key, default)| {
            let value = given.get(key).unwrap_or(default);
            (key.clone(), value.clone())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};

    fn attrs(pairs: &[(&str, Value)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn schema() -> Schema {
        SchemaBuilder::new()
            .node("doc", NodeKind::Doc, Attrs::new())
            .node("heading", NodeKind::Textblock, attrs(&[("level", json!(1))]))
            .node("paragraph", NodeKind::Textblock, Attrs::new())
            .node("text", NodeKind::Text, Attrs::new())
            .mark("size", attrs(&[("value", Value::Null)]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_node_fills_defaults_and_drops_unknown_attrs() {
        let s = schema();
        let node = s
            .node(
                "heading",
                attrs(&[("bogus", json!(true))]),
                Fragment::empty(),
            )
            .unwrap();

        assert_eq!(node.attrs(), &attrs(&[("level", json!(1))]));
    }

    #[test]
    fn test_default_textblock_is_first_declared() {
        let s = schema();
        assert_eq!(s.default_textblock().name, "heading");
        assert_eq!(s.empty_doc().child(0).type_name(), "heading");
    }

    #[test]
    fn test_unknown_types() {
        let s = schema();

        assert_eq!(
            s.node("quote", Attrs::new(), Fragment::empty()).err(),
            Some(ModelError::UnknownNodeType("quote".to_string()))
        );
        assert_eq!(
            s.mark("strong", Attrs::new()).err(),
            Some(ModelError::UnknownMarkType("strong".to_string()))
        );
    }

    #[test]
    fn test_mark_defaults() {
        let s = schema();
        let mark = s.mark("size", Attrs::new()).unwrap();

        assert_eq!(mark.attrs(), &attrs(&[("value", Value::Null)]));
        assert_eq!(mark.attr("value"), None);
    }

    #[test]
    fn test_doc_content_is_validated() {
        let s = schema();
        assert!(matches!(
            s.node("doc", Attrs::new(), Fragment::empty()),
            Err(ModelError::InvalidContent { .. })
        ));
    }

    #[test]
    fn test_build_requires_text_and_doc() {
        let missing_text = SchemaBuilder::new()
            .node("doc", NodeKind::Doc, Attrs::new())
            .node("paragraph", NodeKind::Textblock, Attrs::new())
            .build();
        assert!(matches!(missing_text, Err(ModelError::InvalidSchema(_))));

        let missing_doc = SchemaBuilder::new()
            .node("paragraph", NodeKind::Textblock, Attrs::new())
            .node("text", NodeKind::Text, Attrs::new())
            .build();
        assert!(matches!(missing_doc, Err(ModelError::InvalidSchema(_))));
    }
}
