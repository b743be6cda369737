//! JSON form of documents.
//!
//! Nodes serialize to the conventional `{"type", "attrs", "content", "text",
//! "marks"}` shape. Attributes whose value is `null` are omitted, so an unset
//! optional attribute is absent from the output rather than present as null.

use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelError;
use crate::mark::{Attrs, Mark, MarkSet};
use crate::node::{Fragment, Node, TEXT_NODE};
use crate::schema::Schema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeJson {
    #[serde(rename = "type")]
    pub node_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<NodeJson>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub marks: Vec<MarkJson>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarkJson {
    #[serde(rename = "type")]
    pub mark_type: String,
    #[serde(default, skip_serializing_if = "Attrs::is_empty")]
    pub attrs: Attrs,
}

fn non_null(attrs: &Attrs) -> Attrs {
    attrs
        .iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

impl From<&Mark> for MarkJson {
    fn from(mark: &Mark) -> Self {
        MarkJson {
            mark_type: mark.name().to_string(),
            attrs: non_null(mark.attrs()),
        }
    }
}

impl From<&Node> for NodeJson {
    fn from(node: &Node) -> Self {
        NodeJson {
            node_type: node.type_name().to_string(),
            attrs: non_null(node.attrs()),
            content: node.content().iter().map(NodeJson::from).collect(),
            text: node.text_str().map(str::to_string),
            marks: node.marks().iter().map(MarkJson::from).collect(),
        }
    }
}

impl Node {
    pub fn to_json(&self) -> NodeJson {
        NodeJson::from(self)
    }

    pub fn to_json_value(&self) -> Result<Value, ModelError> {
        Ok(serde_json::to_value(self.to_json())?)
    }
}

impl Schema {
    /// Build a node from its JSON form. Unknown node types are an error;
    /// unknown marks are dropped.
    pub fn node_from_json(&self, json: &NodeJson) -> Result<Node, ModelError> {
        if json.node_type == TEXT_NODE {
            let text = json.text.as_deref().unwrap_or_default();
            return Ok(self.text(text, self.marks_from_json(&json.marks)?));
        }
        let content = json
            .content
            .iter()
            .map(|child| self.node_from_json(child))
            .collect::<Result<Vec<_>, _>>()?;
        self.node(&json.node_type, json.attrs.clone(), Fragment::from_vec(content))
    }

    pub fn node_from_value(&self, value: Value) -> Result<Node, ModelError> {
        let json: NodeJson = serde_json::from_value(value)?;
        self.node_from_json(&json)
    }

    pub fn node_from_str(&self, input: &str) -> Result<Node, ModelError> {
        let json: NodeJson = serde_json::from_str(input)?;
        self.node_from_json(&json)
    }

    fn marks_from_json(&self, marks: &[MarkJson]) -> Result<MarkSet, ModelError> {
        let mut set = MarkSet::empty();
        for mark in marks {
            if !self.has_mark(&mark.mark_type) {
                warn!("dropping unknown mark type {}", mark.mark_type);
                continue;
            }
            set = set.add(self.mark(&mark.mark_type, mark.attrs.clone())?);
        }
        Ok(set)
    }
}
