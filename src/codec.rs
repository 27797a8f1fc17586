//! (De)serialization of rule trees to the persisted JSON form.
//!
//! The wire shape keeps the historical loose layout — rules carry `value`,
//! `valueStart` and `valueEnd` keys and groups are recognized by the
//! presence of a `rules` array — while the in-memory model uses the tagged
//! `Operand` / `RuleNode` types. Null and absent leaves never survive
//! serialization.

use anyhow::{bail, Context};
use serde_json::{json, Map, Value as JsonValue};

use crate::field::{FieldKind, RuleField};
use crate::operator::{OperatorFamily, RuleOperator};
use crate::rule::{Group, GroupJoin, Operand, Rule, RuleNode};
use crate::value::{format_number, parse_loose_date, Value};

pub fn serialize_group(group: &Group) -> JsonValue {
    let mut map = Map::new();
    if let Some(name) = &group.name {
        map.insert("name".to_string(), json!(name));
    }
    map.insert("join".to_string(), json!(group.join.as_str()));
    map.insert(
        "rules".to_string(),
        JsonValue::Array(group.rules.iter().map(serialize_node).collect()),
    );
    JsonValue::Object(map)
}

fn serialize_node(node: &RuleNode) -> JsonValue {
    match node {
        RuleNode::Group(group) => serialize_group(group),
        RuleNode::Rule(rule) => serialize_rule(rule),
    }
}

fn serialize_rule(rule: &Rule) -> JsonValue {
    let mut map = Map::new();
    // Unit enums serialize to their wire-name strings.
    map.insert(
        "field".to_string(),
        serde_json::to_value(rule.field).unwrap_or(JsonValue::Null),
    );
    map.insert(
        "operator".to_string(),
        serde_json::to_value(rule.operator).unwrap_or(JsonValue::Null),
    );
    match &rule.operand {
        Operand::None => {}
        Operand::Scalar(v) => {
            insert_pruned(&mut map, "value", value_to_json(v));
        }
        Operand::Range(start, end) => {
            insert_pruned(&mut map, "valueStart", value_to_json(start));
            insert_pruned(&mut map, "valueEnd", value_to_json(end));
        }
        Operand::Set(values) => {
            let items: Vec<JsonValue> = values
                .iter()
                .map(value_to_json)
                .filter(|v| !v.is_null())
                .collect();
            map.insert("value".to_string(), JsonValue::Array(items));
        }
    }
    JsonValue::Object(map)
}

/// Null prunes to an absent key rather than a `null` leaf.
fn insert_pruned(map: &mut Map<String, JsonValue>, key: &str, value: JsonValue) {
    if !value.is_null() {
        map.insert(key.to_string(), value);
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::Null => JsonValue::Null,
        // ISO day precision; JSON has no richer date representation.
        Value::Date(d) => json!(d.format("%Y-%m-%d").to_string()),
        Value::Number(n) => serde_json::Number::from_f64(*n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Text(s) => json!(s),
        Value::List(items) => JsonValue::Array(
            items
                .iter()
                .map(value_to_json)
                .filter(|v| !v.is_null())
                .collect(),
        ),
    }
}

/// Decode a persisted rule tree. Operand strings are parsed according to
/// the field descriptor's kind (dates become `Value::Date`, numeric fields
/// numeric), with unparsable operands degrading to Null rather than
/// failing the whole tree. Unknown field or operator names are decode
/// errors surfaced to the caller.
pub fn deserialize_group(json: &JsonValue) -> anyhow::Result<Group> {
    let obj = match json.as_object() {
        Some(obj) => obj,
        None => bail!("rule group must be a JSON object, got: {json}"),
    };
    let name = obj.get("name").and_then(JsonValue::as_str).map(String::from);
    let join = GroupJoin::from_wire(obj.get("join").and_then(JsonValue::as_str));
    let mut rules = Vec::new();
    if let Some(children) = obj.get("rules") {
        let children = children
            .as_array()
            .with_context(|| format!("'rules' must be an array, got: {children}"))?;
        for child in children {
            rules.push(deserialize_node(child)?);
        }
    }
    Ok(Group { name, join, rules })
}

fn deserialize_node(json: &JsonValue) -> anyhow::Result<RuleNode> {
    match json.as_object() {
        // A child with a `rules` list is a nested group, otherwise a rule.
        Some(obj) if obj.contains_key("rules") => {
            Ok(RuleNode::Group(deserialize_group(json)?))
        }
        Some(_) => Ok(RuleNode::Rule(deserialize_rule(json)?)),
        None => bail!("rule node must be a JSON object, got: {json}"),
    }
}

fn deserialize_rule(json: &JsonValue) -> anyhow::Result<Rule> {
    let field_json = json.get("field").cloned().unwrap_or(JsonValue::Null);
    let field: RuleField = serde_json::from_value(field_json.clone())
        .with_context(|| format!("unknown rule field: {field_json}"))?;

    let operator_json = json.get("operator").cloned().unwrap_or(JsonValue::Null);
    let operator: RuleOperator = serde_json::from_value(operator_json.clone())
        .with_context(|| format!("unknown rule operator: {operator_json}"))?;

    let kind = field.descriptor().kind;
    let operand = match operator {
        RuleOperator::IsEmpty | RuleOperator::IsNotEmpty => Operand::None,
        RuleOperator::InBetween => Operand::Range(
            parse_operand(json.get("valueStart"), kind),
            parse_operand(json.get("valueEnd"), kind),
        ),
        _ if operator.family() == OperatorFamily::MultiValue => {
            Operand::Set(parse_operand_list(json.get("value"), kind))
        }
        // Scalar operators tolerate a list-shaped value left behind by an
        // operator switch in the editor.
        _ => match json.get("value") {
            Some(JsonValue::Array(_)) => {
                Operand::Set(parse_operand_list(json.get("value"), kind))
            }
            v => Operand::Scalar(parse_operand(v, kind)),
        },
    };

    Ok(Rule {
        field,
        operator,
        operand,
    })
}

fn parse_operand_list(json: Option<&JsonValue>, kind: FieldKind) -> Vec<Value> {
    match json {
        Some(JsonValue::Array(items)) => items
            .iter()
            .map(|item| parse_operand(Some(item), kind))
            .collect(),
        Some(JsonValue::Null) | None => Vec::new(),
        Some(single) => vec![parse_operand(Some(single), kind)],
    }
}

fn parse_operand(json: Option<&JsonValue>, kind: FieldKind) -> Value {
    let json = match json {
        Some(JsonValue::Null) | None => return Value::Null,
        Some(v) => v,
    };
    match kind {
        FieldKind::Number | FieldKind::Decimal => match json {
            JsonValue::Number(n) => n.as_f64().map(Value::Number).unwrap_or(Value::Null),
            JsonValue::String(s) => s
                .trim()
                .parse::<f64>()
                .map(Value::Number)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        },
        FieldKind::Date => match json.as_str().and_then(parse_loose_date) {
            Some(date) => Value::Date(date),
            None => Value::Null,
        },
        FieldKind::Text | FieldKind::Untyped => match json {
            JsonValue::String(s) => Value::Text(s.clone()),
            JsonValue::Number(n) => n
                .as_f64()
                .map(|f| Value::Text(format_number(f)))
                .unwrap_or(Value::Null),
            JsonValue::Bool(b) => Value::Text(b.to_string()),
            _ => Value::Null,
        },
    }
}
