//! Detailed JSON schema for ledger data.
//!
//! The schema used by node tooling and chain indexers:
//!
//! ```text
//! {"constructor": 0, "fields": [...]}
//! {"bytes": "4d79"}
//! {"int": 42}
//! {"list": [...]}
//! ```
//!
//! Integers outside the signed/unsigned 64-bit range are written as decimal
//! strings, and strings are accepted back for any integer. Maps are not part
//! of this data model and are rejected.

use crate::data::{BinaryNode, DataError, Integer, MAX_DEPTH};
use serde_json::{Map, Value, json};

impl BinaryNode {
    /// Renders the node in the detailed JSON schema.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Bytes(bytes) => json!({ "bytes": hex::encode(bytes) }),
            Self::Integer(value) => json!({ "int": integer_to_json(value) }),
            Self::List(items) => json!({ "list": items.iter().map(Self::to_json).collect::<Vec<_>>() }),
            Self::Constructor { index, fields } => json!({
                "constructor": index,
                "fields": fields.iter().map(Self::to_json).collect::<Vec<_>>(),
            }),
        }
    }

    /// Parses a node from the detailed JSON schema.
    ///
    /// Fails with `InvalidNode` on any value that is not one of the four
    /// recognized shapes.
    pub fn from_json(value: &Value) -> Result<Self, DataError> {
        node_from_json(value, 0)
    }
}

fn integer_to_json(value: &Integer) -> Value {
    if let Some(v) = value.to_u64() {
        Value::from(v)
    } else if let Some(v) = value.to_i64() {
        Value::from(v)
    } else {
        Value::String(value.to_string())
    }
}

fn node_from_json(value: &Value, depth: usize) -> Result<BinaryNode, DataError> {
    if depth > MAX_DEPTH {
        return Err(DataError::InvalidNode(format!(
            "nesting exceeds {} levels",
            MAX_DEPTH
        )));
    }

    let object = value
        .as_object()
        .ok_or_else(|| DataError::InvalidNode(format!("expected object, found {}", value)))?;

    if let Some(bytes) = single_key(object, "bytes") {
        let s = bytes
            .as_str()
            .ok_or_else(|| DataError::InvalidNode("\"bytes\" must be a hex string".to_string()))?;
        let bytes = hex::decode(s)
            .map_err(|e| DataError::InvalidNode(format!("\"bytes\" is not hex: {}", e)))?;
        return Ok(BinaryNode::Bytes(bytes));
    }

    if let Some(int) = single_key(object, "int") {
        return Ok(BinaryNode::Integer(integer_from_json(int)?));
    }

    if let Some(list) = single_key(object, "list") {
        let items = list
            .as_array()
            .ok_or_else(|| DataError::InvalidNode("\"list\" must be an array".to_string()))?;
        let items = items
            .iter()
            .map(|item| node_from_json(item, depth + 1))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(BinaryNode::List(items));
    }

    if object.len() == 2 {
        if let (Some(index), Some(fields)) = (object.get("constructor"), object.get("fields")) {
            let index = index.as_u64().ok_or_else(|| {
                DataError::InvalidNode("\"constructor\" must be a non-negative integer".to_string())
            })?;
            let fields = fields
                .as_array()
                .ok_or_else(|| DataError::InvalidNode("\"fields\" must be an array".to_string()))?;
            let fields = fields
                .iter()
                .map(|field| node_from_json(field, depth + 1))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(BinaryNode::Constructor { index, fields });
        }
    }

    if object.contains_key("map") {
        return Err(DataError::InvalidNode("maps are not supported".to_string()));
    }

    let keys: Vec<&str> = object.keys().map(String::as_str).collect();
    Err(DataError::InvalidNode(format!(
        "unrecognized object with keys {:?}",
        keys
    )))
}

fn single_key<'a>(object: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    if object.len() == 1 { object.get(key) } else { None }
}

fn integer_from_json(value: &Value) -> Result<Integer, DataError> {
    if let Some(v) = value.as_u64() {
        return Ok(Integer::from(v));
    }
    if let Some(v) = value.as_i64() {
        return Ok(Integer::from(v));
    }
    if let Some(s) = value.as_str() {
        return s
            .parse()
            .map_err(|_| DataError::InvalidNode(format!("\"int\" string {:?} is not decimal", s)));
    }
    Err(DataError::InvalidNode(format!(
        "\"int\" must be an integer or a decimal string, found {}",
        value
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BinaryNode {
        BinaryNode::constructor(
            0,
            vec![
                BinaryNode::bytes(vec![0x4d, 0x79]),
                BinaryNode::integer(-3i64),
                BinaryNode::list(vec![BinaryNode::integer(33_000_000u64)]),
            ],
        )
    }

    #[test]
    fn renders_detailed_schema() {
        assert_eq!(
            sample().to_json(),
            json!({
                "constructor": 0,
                "fields": [
                    { "bytes": "4d79" },
                    { "int": -3 },
                    { "list": [ { "int": 33000000 } ] }
                ]
            })
        );
    }

    #[test]
    fn parses_what_it_renders() {
        let node = sample();
        assert_eq!(BinaryNode::from_json(&node.to_json()).unwrap(), node);
    }

    #[test]
    fn big_integers_use_strings() {
        let big: Integer = "-18446744073709551617".parse().unwrap();
        let node = BinaryNode::Integer(big.clone());
        assert_eq!(node.to_json(), json!({ "int": "-18446744073709551617" }));
        assert_eq!(BinaryNode::from_json(&node.to_json()).unwrap(), node);
    }

    #[test]
    fn rejects_maps() {
        let value = json!({ "map": [] });
        assert!(matches!(
            BinaryNode::from_json(&value),
            Err(DataError::InvalidNode(_))
        ));
    }

    #[test]
    fn rejects_unknown_shapes() {
        for value in [
            json!(42),
            json!({ "text": "hello" }),
            json!({ "bytes": "4d79", "int": 1 }),
            json!({ "constructor": -1, "fields": [] }),
            json!({ "list": {} }),
            json!({ "int": 1.5 }),
        ] {
            assert!(
                matches!(BinaryNode::from_json(&value), Err(DataError::InvalidNode(_))),
                "accepted {}",
                value
            );
        }
    }

    #[test]
    fn rejects_bad_hex_without_partial_output() {
        let value = json!({ "list": [ { "bytes": "00" }, { "bytes": "xyz" } ] });
        assert!(matches!(
            BinaryNode::from_json(&value),
            Err(DataError::InvalidNode(_))
        ));
        let value = json!({ "int": "12x" });
        assert!(matches!(
            BinaryNode::from_json(&value),
            Err(DataError::InvalidNode(_))
        ));
    }
}
