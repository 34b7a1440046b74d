//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了多态关系的类型解析。
//!
//! 多态关系的关联记录类型不由模式固定，需要随ID一起携带类型标签。
//! 线上标签使用 snake_case（`{"type": "yellow_minion", "id": 12}`），
//! 模型层标签使用 camelCase（`{"type": "yellowMinion", "id": 12}`）。

use crate::record::Record;
use crate::schema::{RelationshipDescriptor, RelationshipKind};
use crate::utils::Inflector;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

const TYPE_FIELD: &str = "type";
const ID_FIELD: &str = "id";

/// 模型层的类型标签
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypedRef {
    #[serde(rename = "type")]
    pub type_key: String,
    pub id: Value,
}

/// 多态类型解析器
///
/// 两个方向都先检查关系描述的多态标记，非多态关系原样通过。
#[derive(Clone, Debug)]
pub struct PolymorphicResolver {
    inflector: Arc<Inflector>,
}

impl PolymorphicResolver {
    pub fn new(inflector: Arc<Inflector>) -> Self {
        Self { inflector }
    }

    /// `yellow_minion` / `yellow_minions` -> `yellowMinion`
    pub fn type_for_wire(&self, wire: &str) -> String {
        self.inflector.singularize(&self.inflector.camelize(wire))
    }

    /// `yellowMinion` -> `yellow_minion`
    pub fn wire_type(&self, type_key: &str) -> String {
        self.inflector.underscore(type_key)
    }

    /// `yellowMinion` -> `YellowMinion`，用于 `*_type` 字段
    pub fn class_name(&self, type_key: &str) -> String {
        self.inflector.classify(type_key)
    }

    /// 记录的运行时类型引用
    pub fn reference_for(&self, record: &Record) -> TypedRef {
        TypedRef {
            type_key: record.type_key().to_string(),
            id: record.id().map(Value::from).unwrap_or(Value::Null),
        }
    }

    pub fn to_wire(&self, reference: &TypedRef) -> Value {
        let mut tag = Map::new();
        tag.insert(
            TYPE_FIELD.to_string(),
            Value::String(self.wire_type(&reference.type_key)),
        );
        tag.insert(ID_FIELD.to_string(), reference.id.clone());
        Value::Object(tag)
    }

    /// 规范化关系载荷
    ///
    /// 缺失的载荷变为 `null`，空数组保持为空数组。
    pub fn normalize(&self, relationship: &RelationshipDescriptor, payload: Option<Value>) -> Value {
        let Some(payload) = payload else {
            return Value::Null;
        };
        if !relationship.polymorphic {
            return payload;
        }
        self.convert(relationship.kind, payload)
    }

    fn convert(&self, kind: RelationshipKind, value: Value) -> Value {
        match (kind, value) {
            (RelationshipKind::BelongsTo, Value::Object(tag)) => Value::Object(self.canonical_tag(tag)),
            (RelationshipKind::HasMany, Value::Array(tags)) => Value::Array(
                tags.into_iter()
                    .map(|tag| match tag {
                        Value::Object(tag) => Value::Object(self.canonical_tag(tag)),
                        other => other,
                    })
                    .collect(),
            ),
            (_, other) => other,
        }
    }

    fn canonical_tag(&self, mut tag: Map<String, Value>) -> Map<String, Value> {
        let canonical = tag
            .get(TYPE_FIELD)
            .and_then(Value::as_str)
            .map(|wire| self.type_for_wire(wire));
        if let Some(canonical) = canonical {
            tag.insert(TYPE_FIELD.to_string(), Value::String(canonical));
        }
        tag
    }
}
