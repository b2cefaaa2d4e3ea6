//! Component tree types
//!
//! A page description is a tree of [`ComponentNode`]s. Property values are a
//! tagged union ([`PropValue`]) so type checks are an exhaustive match rather
//! than a runtime probe.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Reserved component type for named slot nodes
pub const SLOT_TYPE: &str = "JSSlot";

/// Marker type for serialized function references (`{"type": "JSFunction", "value": ...}`)
pub const FUNCTION_TYPE: &str = "JSFunction";

/// Primitive kind a contract declares for a property or slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    /// Any non-null object value, arrays included
    Object,
    Array,
    Function,
    /// Declared type outside the known set; always matches
    #[serde(other)]
    Any,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Number => "number",
            ValueType::Boolean => "boolean",
            ValueType::Object => "object",
            ValueType::Array => "array",
            ValueType::Function => "function",
            ValueType::Any => "any",
        }
    }

    /// Whether a runtime value satisfies this declared type
    pub fn matches(&self, value: &PropValue) -> bool {
        match self {
            ValueType::String => matches!(value, PropValue::String(_)),
            ValueType::Number => matches!(value, PropValue::Number(_)),
            ValueType::Boolean => matches!(value, PropValue::Bool(_)),
            ValueType::Object => matches!(value, PropValue::Object(_) | PropValue::Array(_)),
            ValueType::Array => matches!(value, PropValue::Array(_)),
            ValueType::Function | ValueType::Any => true,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A runtime property value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum PropValue {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<PropValue>),
    Object(BTreeMap<String, PropValue>),
    /// Reference to a callable, carried as its source text
    Function(String),
}

impl PropValue {
    /// Name of the runtime kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            PropValue::Null => "null",
            PropValue::Bool(_) => "boolean",
            PropValue::Number(_) => "number",
            PropValue::String(_) => "string",
            PropValue::Array(_) => "array",
            PropValue::Object(_) => "object",
            PropValue::Function(_) => "function",
        }
    }

    /// Loose truthiness: null, false, zero, NaN and the empty string are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            PropValue::Null => false,
            PropValue::Bool(b) => *b,
            PropValue::Number(n) => n.as_f64().map(|v| v != 0.0 && !v.is_nan()).unwrap_or(true),
            PropValue::String(s) => !s.is_empty(),
            PropValue::Array(_) | PropValue::Object(_) | PropValue::Function(_) => true,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            PropValue::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<Value> for PropValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => PropValue::Null,
            Value::Bool(b) => PropValue::Bool(b),
            Value::Number(n) => PropValue::Number(n),
            Value::String(s) => PropValue::String(s),
            Value::Array(items) => {
                PropValue::Array(items.into_iter().map(PropValue::from).collect())
            }
            Value::Object(map) => {
                let is_function = map.get("type").and_then(Value::as_str) == Some(FUNCTION_TYPE);
                match (is_function, map.get("value").and_then(Value::as_str)) {
                    (true, Some(source)) => PropValue::Function(source.to_string()),
                    _ => PropValue::Object(
                        map.into_iter().map(|(k, v)| (k, PropValue::from(v))).collect(),
                    ),
                }
            }
        }
    }
}

impl From<PropValue> for Value {
    fn from(value: PropValue) -> Self {
        match value {
            PropValue::Null => Value::Null,
            PropValue::Bool(b) => Value::Bool(b),
            PropValue::Number(n) => Value::Number(n),
            PropValue::String(s) => Value::String(s),
            PropValue::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            PropValue::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
            PropValue::Function(source) => {
                let mut map = Map::new();
                map.insert("type".to_string(), Value::String(FUNCTION_TYPE.to_string()));
                map.insert("value".to_string(), Value::String(source));
                Value::Object(map)
            }
        }
    }
}

impl From<&str> for PropValue {
    fn from(s: &str) -> Self {
        PropValue::String(s.to_string())
    }
}

impl From<String> for PropValue {
    fn from(s: String) -> Self {
        PropValue::String(s)
    }
}

impl From<bool> for PropValue {
    fn from(b: bool) -> Self {
        PropValue::Bool(b)
    }
}

impl From<i32> for PropValue {
    fn from(n: i32) -> Self {
        PropValue::Number(n.into())
    }
}

impl From<i64> for PropValue {
    fn from(n: i64) -> Self {
        PropValue::Number(n.into())
    }
}

impl From<f64> for PropValue {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(PropValue::Number).unwrap_or(PropValue::Null)
    }
}

impl From<Vec<PropValue>> for PropValue {
    fn from(items: Vec<PropValue>) -> Self {
        PropValue::Array(items)
    }
}

/// A single node of a page description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentNode {
    /// Component type name, looked up in the component registry
    #[serde(rename = "type")]
    pub component_type: String,
    /// Property values, kept sorted by key
    #[serde(default, alias = "props", skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<String, PropValue>,
    /// Child nodes, in render order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ComponentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Slot name; only meaningful on [`SLOT_TYPE`] nodes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ComponentNode {
    pub fn new(component_type: impl Into<String>) -> Self {
        Self {
            component_type: component_type.into(),
            properties: BTreeMap::new(),
            children: Vec::new(),
            id: None,
            name: None,
        }
    }

    /// Create a slot node with the given name and content
    pub fn slot(name: impl Into<String>, children: Vec<ComponentNode>) -> Self {
        Self {
            name: Some(name.into()),
            children,
            ..Self::new(SLOT_TYPE)
        }
    }

    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: ComponentNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn is_slot(&self) -> bool {
        self.component_type == SLOT_TYPE
    }

    /// Total number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ComponentNode::node_count).sum::<usize>()
    }

    /// JSON form of the subtree with object keys sorted; same shape as the
    /// serde serialization, built without a fallible serializer
    pub fn canonical_json(&self) -> Value {
        let mut map = Map::new();
        map.insert("type".to_string(), Value::String(self.component_type.clone()));
        if !self.properties.is_empty() {
            let properties = self
                .properties
                .iter()
                .map(|(k, v)| (k.clone(), Value::from(v.clone())))
                .collect();
            map.insert("properties".to_string(), Value::Object(properties));
        }
        if !self.children.is_empty() {
            let children = self.children.iter().map(ComponentNode::canonical_json).collect();
            map.insert("children".to_string(), Value::Array(children));
        }
        if let Some(id) = &self.id {
            map.insert("id".to_string(), Value::String(id.clone()));
        }
        if let Some(name) = &self.name {
            map.insert("name".to_string(), Value::String(name.clone()));
        }
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_props_alias() {
        let node: ComponentNode = serde_json::from_value(json!({
            "type": "Card",
            "props": { "title": "Hello", "bordered": true }
        }))
        .unwrap();

        assert_eq!(node.component_type, "Card");
        assert_eq!(node.properties.get("title"), Some(&PropValue::from("Hello")));
        assert_eq!(node.properties.get("bordered"), Some(&PropValue::Bool(true)));
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_function_reference() {
        let value = PropValue::from(json!({ "type": "JSFunction", "value": "function() {}" }));
        assert_eq!(value, PropValue::Function("function() {}".to_string()));
        assert_eq!(value.kind_name(), "function");

        // Without a source string it stays a plain object
        let value = PropValue::from(json!({ "type": "JSFunction" }));
        assert_eq!(value.kind_name(), "object");
    }

    #[test]
    fn test_value_type_matching() {
        let array = PropValue::Array(vec![]);
        let object = PropValue::Object(BTreeMap::new());

        assert!(ValueType::Object.matches(&object));
        assert!(ValueType::Object.matches(&array));
        assert!(!ValueType::Object.matches(&PropValue::Null));
        assert!(ValueType::Array.matches(&array));
        assert!(!ValueType::Array.matches(&object));
        assert!(!ValueType::String.matches(&PropValue::from(123)));
        assert!(ValueType::Function.matches(&PropValue::Null));
    }

    #[test]
    fn test_unknown_declared_type_is_any() {
        let ty: ValueType = serde_json::from_value(json!("JSX")).unwrap();
        assert_eq!(ty, ValueType::Any);
        assert!(ty.matches(&PropValue::from(1)));
    }

    #[test]
    fn test_truthiness() {
        assert!(!PropValue::Null.is_truthy());
        assert!(!PropValue::from("").is_truthy());
        assert!(!PropValue::from(0).is_truthy());
        assert!(!PropValue::from(false).is_truthy());
        assert!(PropValue::from("x").is_truthy());
        assert!(PropValue::Array(vec![]).is_truthy());
    }

    #[test]
    fn test_canonical_json_matches_serde_form() {
        let tree = ComponentNode::new("Layout")
            .with_id("root")
            .with_prop("gap", 8)
            .with_child(ComponentNode::slot("content", vec![ComponentNode::new("Card")
                .with_prop("title", "x")
                .with_prop("onOpen", PropValue::Function("() => {}".to_string()))]));

        assert_eq!(tree.canonical_json(), serde_json::to_value(&tree).unwrap());
        assert_eq!(ComponentNode::new("Card").canonical_json(), json!({ "type": "Card" }));
    }

    #[test]
    fn test_missing_properties_key_is_empty() {
        let node: ComponentNode = serde_json::from_str(r#"{"type":"Card"}"#).unwrap();
        assert!(node.properties.is_empty());
        assert!(node.children.is_empty());
    }

    #[test]
    fn test_node_count() {
        let tree = ComponentNode::new("Layout")
            .with_child(ComponentNode::new("Card"))
            .with_child(ComponentNode::slot("content", vec![ComponentNode::new("Card")]));
        assert_eq!(tree.node_count(), 4);
    }
}
