//! Output values produced by translation.

use indexmap::IndexMap;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::Colors;

/// Self-contained output value.
///
/// `Object` keeps keys in insertion order. A matched construct that yields
/// nothing at all (a bare literal, `end`) is represented by the absence of a
/// value (`Option<Value>::None`), never by a variant here.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
}

impl Value {
    /// Empty array, the value of a repetition that matched nothing.
    pub fn empty_array() -> Self {
        Value::Array(Vec::new())
    }

    /// Single-entry object `{key: value}`.
    pub fn singleton(key: impl Into<String>, value: Value) -> Self {
        let mut map = IndexMap::with_capacity(1);
        map.insert(key.into(), value);
        Value::Object(map)
    }

    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this value is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|map| map.get(key))
    }

    /// Shallow-merge `other`'s entries into this object.
    ///
    /// Existing keys are overwritten in place, new keys are appended.
    /// Returns `false` (and leaves `self` untouched) unless both are objects.
    pub fn merge_object(&mut self, other: Value) -> bool {
        match (self, other) {
            (Value::Object(into), Value::Object(from)) => {
                into.extend(from);
                true
            }
            _ => false,
        }
    }

    /// Convert into a `serde_json::Value`.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
        }
    }

    /// Format value as colored JSON.
    ///
    /// Color scheme (jq-inspired):
    /// - Keys: Blue
    /// - String values: Green
    /// - Numbers, booleans: Normal
    /// - null: Dim
    /// - Structure `{}[]:,`: Dim
    pub fn format(&self, pretty: bool, colors: Colors) -> String {
        let mut out = String::new();
        format_value(&mut out, self, &colors, pretty, 0);
        out
    }
}

impl Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Number(n) => n.serialize(serializer),
            Value::String(s) => serializer.serialize_str(s),
            Value::Array(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Object(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (key, value) in fields {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

fn format_value(out: &mut String, value: &Value, c: &Colors, pretty: bool, indent: usize) {
    match value {
        Value::Null => {
            out.push_str(c.dim);
            out.push_str("null");
            out.push_str(c.reset);
        }
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::String(s) => {
            out.push_str(c.green);
            out.push('"');
            out.push_str(&escape_json_string(s));
            out.push('"');
            out.push_str(c.reset);
        }
        Value::Array(items) => format_array(out, items, c, pretty, indent),
        Value::Object(fields) => format_object(out, fields, c, pretty, indent),
    }
}

fn format_array(out: &mut String, items: &[Value], c: &Colors, pretty: bool, indent: usize) {
    push_dim(out, c, '[');

    if items.is_empty() {
        push_dim(out, c, ']');
        return;
    }

    let elem_indent = if pretty { indent + 2 } else { 0 };

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            push_dim(out, c, ',');
        }
        if pretty {
            out.push('\n');
            out.push_str(&" ".repeat(elem_indent));
        }
        format_value(out, item, c, pretty, elem_indent);
    }

    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
    push_dim(out, c, ']');
}

fn format_object(
    out: &mut String,
    fields: &IndexMap<String, Value>,
    c: &Colors,
    pretty: bool,
    indent: usize,
) {
    push_dim(out, c, '{');

    if fields.is_empty() {
        push_dim(out, c, '}');
        return;
    }

    let field_indent = if pretty { indent + 2 } else { 0 };

    for (i, (key, value)) in fields.iter().enumerate() {
        if i > 0 {
            push_dim(out, c, ',');
        }
        if pretty {
            out.push('\n');
            out.push_str(&" ".repeat(field_indent));
        }

        out.push_str(c.blue);
        out.push('"');
        out.push_str(&escape_json_string(key));
        out.push('"');
        out.push_str(c.reset);

        push_dim(out, c, ':');
        if pretty {
            out.push(' ');
        }

        format_value(out, value, c, pretty, field_indent);
    }

    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
    push_dim(out, c, '}');
}

fn push_dim(out: &mut String, c: &Colors, ch: char) {
    out.push_str(c.dim);
    out.push(ch);
    out.push_str(c.reset);
}

fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => {
                result.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}
