//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了内存中的记录对象图。

use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// 关系的值
#[derive(Debug, Clone, PartialEq)]
pub enum RelationshipValue {
    BelongsTo(Option<Arc<Record>>),
    HasMany(Vec<Arc<Record>>),
}

/// 记录
///
/// 序列化器只读取记录，从不修改它。
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_key: String,
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
    relationships: BTreeMap<String, RelationshipValue>,
}

impl Record {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            id: None,
            attributes: BTreeMap::new(),
            relationships: BTreeMap::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_belongs_to(mut self, key: impl Into<String>, related: impl Into<Arc<Record>>) -> Self {
        self.relationships
            .insert(key.into(), RelationshipValue::BelongsTo(Some(related.into())));
        self
    }

    /// 显式设置为空的 belongsTo 关系
    pub fn without_belongs_to(mut self, key: impl Into<String>) -> Self {
        self.relationships
            .insert(key.into(), RelationshipValue::BelongsTo(None));
        self
    }

    pub fn with_has_many<I, R>(mut self, key: impl Into<String>, related: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<Arc<Record>>,
    {
        let records = related.into_iter().map(Into::into).collect();
        self.relationships
            .insert(key.into(), RelationshipValue::HasMany(records));
        self
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn belongs_to(&self, key: &str) -> Option<&Arc<Record>> {
        match self.relationships.get(key) {
            Some(RelationshipValue::BelongsTo(related)) => related.as_ref(),
            _ => None,
        }
    }

    pub fn has_many(&self, key: &str) -> &[Arc<Record>] {
        match self.relationships.get(key) {
            Some(RelationshipValue::HasMany(related)) => related.as_slice(),
            _ => &[],
        }
    }
}
