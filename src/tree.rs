//! Token-tree node type and path lookup.
//!
//! Tokens are stored as raw JSON objects rather than a rigid struct. Trees
//! round-trip through files produced by other tools, and loosely-shaped
//! tokens inside a structurally valid array are accepted as-is; accessors
//! read the fields defensively instead of rejecting at parse time.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// One node in the generation tree.
///
/// Carries at least display `text` and a stable `id`; any other fields are
/// preserved untouched. Children live under the `children` key as an array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(Value);

impl Token {
    /// Build a leaf token with the given id and display text.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Token(json!({ "id": id.into(), "text": text.into() }))
    }

    /// Attach children, replacing any existing ones.
    pub fn with_children(mut self, children: Vec<Token>) -> Self {
        let kids: Vec<Value> = children.into_iter().map(|t| t.0).collect();
        if let Some(obj) = self.0.as_object_mut() {
            obj.insert("children".into(), Value::Array(kids));
        }
        self
    }

    /// Wrap an already-parsed JSON value without validating its shape.
    pub fn from_value(value: Value) -> Self {
        Token(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    /// Stable node id, if the token has one.
    pub fn id(&self) -> Option<&str> {
        self.0.get("id").and_then(Value::as_str)
    }

    /// Display text; empty for tokens that carry none.
    pub fn text(&self) -> &str {
        self.0.get("text").and_then(Value::as_str).unwrap_or("")
    }

    /// Iterate this token's children in order. Tokens without a `children`
    /// array (or with a non-array one) yield nothing.
    pub fn children(&self) -> impl Iterator<Item = Token> + '_ {
        self.0
            .get("children")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .map(|v| Token(v.clone()))
    }
}

/// Root-to-node path (inclusive) for the node with the given id, or `None`
/// if no node in the forest has that id.
pub fn path_to_node(node_id: &str, roots: &[Token]) -> Option<Vec<Token>> {
    fn dfs(node_id: &str, node: &Token, path: &mut Vec<Token>) -> bool {
        path.push(node.clone());
        if node.id() == Some(node_id) {
            return true;
        }
        for child in node.children() {
            if dfs(node_id, &child, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    let mut path = Vec::new();
    for root in roots {
        if dfs(node_id, root, &mut path) {
            return Some(path);
        }
    }
    None
}
