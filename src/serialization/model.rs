//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了组合序列化器：默认行为加可选的嵌入行为。

use super::embedded::append_extracted;
use super::{
    ArrayDocument, DefaultSerializer, EmbeddedRecords, SerializeOptions, SingleDocument, ID_KEY,
    META_KEY,
};
use crate::error::{ModelError, Result};
use crate::manager::SerializerManager;
use crate::record::Record;
use crate::schema::{RelationshipDescriptor, RelationshipKind};
use crate::utils::coerce_id;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// 组合序列化器
///
/// 嵌入逻辑优先执行，未处理的关系显式回退到默认行为。
#[derive(Clone)]
pub struct ModelSerializer {
    base: Arc<dyn DefaultSerializer>,
    embedded: Option<EmbeddedRecords>,
}

impl ModelSerializer {
    pub fn new(base: Arc<dyn DefaultSerializer>) -> Self {
        Self {
            base,
            embedded: None,
        }
    }

    pub fn with_embedded(mut self, embedded: EmbeddedRecords) -> Self {
        self.embedded = Some(embedded);
        self
    }

    pub fn base(&self) -> &dyn DefaultSerializer {
        self.base.as_ref()
    }

    pub fn embedded(&self) -> Option<&EmbeddedRecords> {
        self.embedded.as_ref()
    }

    /// 序列化记录为线上格式
    pub fn serialize(
        &self,
        manager: &SerializerManager,
        record: &Record,
        options: SerializeOptions,
    ) -> Result<Map<String, Value>> {
        let model = manager.schema().model_for(record.type_key())?;
        let mut json = Map::new();

        if options.include_id {
            if let Some(id) = record.id() {
                json.insert(self.base.primary_key().to_string(), Value::from(id));
            }
        }

        for attribute in model.attributes() {
            self.base.serialize_attribute(record, &mut json, attribute);
        }

        for relationship in model.relationships() {
            match relationship.kind {
                RelationshipKind::BelongsTo => {
                    self.serialize_belongs_to(manager, record, &mut json, relationship)?
                }
                RelationshipKind::HasMany => {
                    self.base
                        .serialize_has_many(manager.schema(), record, &mut json, relationship)
                }
            }
        }

        Ok(json)
    }

    pub fn serialize_belongs_to(
        &self,
        manager: &SerializerManager,
        record: &Record,
        json: &mut Map<String, Value>,
        relationship: &RelationshipDescriptor,
    ) -> Result<()> {
        if let Some(embedded) = &self.embedded {
            if embedded.serialize_belongs_to(manager, self.base(), record, json, relationship)? {
                return Ok(());
            }
        }
        self.base.serialize_belongs_to(record, json, relationship);
        Ok(())
    }

    /// 以根键包装序列化结果：`{"home_planet": {...}}`
    pub fn serialize_into_hash(
        &self,
        manager: &SerializerManager,
        hash: &mut Map<String, Value>,
        record: &Record,
        options: SerializeOptions,
    ) -> Result<()> {
        let root = self.base.root_for_type(record.type_key());
        let json = self.serialize(manager, record, options)?;
        hash.insert(root, Value::Object(json));
        Ok(())
    }

    /// 规范化单条线上记录
    pub fn normalize(
        &self,
        manager: &SerializerManager,
        type_key: &str,
        hash: Map<String, Value>,
    ) -> Result<Map<String, Value>> {
        let model = manager.schema().model_for(type_key)?;
        Ok(self.base.normalize(model, hash))
    }

    /// 从单记录载荷中提取主记录和侧载记录
    ///
    /// 主类型数组中ID等于 `record_id` 的记录（未指定时为第一条）成为主记录。
    #[instrument(skip(self, manager, payload), level = "debug")]
    pub fn extract_single(
        &self,
        manager: &SerializerManager,
        type_key: &str,
        payload: Value,
        record_id: Option<&str>,
    ) -> Result<SingleDocument> {
        let model = manager.schema().model_for(type_key)?;
        let mut payload = into_object(payload)?;

        let mut document = SingleDocument::new(None);
        document.meta = payload.remove(META_KEY);
        self.flatten_embedded(manager, model.type_key(), &mut payload);

        for (prop, value) in payload {
            let Some((type_name, forced_secondary)) = self.resolve_root(manager, &prop) else {
                continue;
            };
            let is_primary = !forced_secondary && type_name == model.type_key();
            let serializer = manager.serializer_for(&type_name);

            match value {
                Value::Object(hash) => {
                    let hash = serializer.normalize(manager, &type_name, hash)?;
                    if is_primary {
                        document.primary = Some(hash);
                    } else {
                        document.push(&type_name, hash);
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        let Value::Object(hash) = item else {
                            continue;
                        };
                        let hash = serializer.normalize(manager, &type_name, hash)?;
                        let is_first = is_primary && record_id.is_none() && document.primary.is_none();
                        let is_requested = is_primary
                            && record_id.is_some()
                            && hash.get(ID_KEY).and_then(coerce_id).as_deref() == record_id;
                        if is_first || is_requested {
                            document.primary = Some(hash);
                        } else {
                            document.push(&type_name, hash);
                        }
                    }
                }
                _ => debug!("Skipping non-record value under '{}'", prop),
            }
        }

        Ok(document)
    }

    /// 从数组载荷中提取主记录列表和侧载记录
    #[instrument(skip(self, manager, payload), level = "debug")]
    pub fn extract_array(
        &self,
        manager: &SerializerManager,
        type_key: &str,
        payload: Value,
    ) -> Result<ArrayDocument> {
        let model = manager.schema().model_for(type_key)?;
        let mut payload = into_object(payload)?;

        let mut document = ArrayDocument::new(Vec::new());
        document.meta = payload.remove(META_KEY);
        self.flatten_embedded(manager, model.type_key(), &mut payload);

        for (prop, value) in payload {
            let Some((type_name, forced_secondary)) = self.resolve_root(manager, &prop) else {
                continue;
            };
            let is_primary = !forced_secondary && type_name == model.type_key();
            let serializer = manager.serializer_for(&type_name);

            let items = match value {
                Value::Array(items) => items,
                Value::Object(hash) => vec![Value::Object(hash)],
                _ => {
                    debug!("Skipping non-record value under '{}'", prop);
                    continue;
                }
            };

            for item in items {
                let Value::Object(hash) = item else {
                    continue;
                };
                let hash = serializer.normalize(manager, &type_name, hash)?;
                if is_primary {
                    document.primary.push(hash);
                } else {
                    document.push(&type_name, hash);
                }
            }
        }

        Ok(document)
    }

    /// 在通用规范化之前展开所有根键下的嵌入记录
    ///
    /// 每个根键使用其类型自己的序列化器配置；所有节点收集完后再统一追加，
    /// 已经移到顶层的节点不会被再次展开。
    fn flatten_embedded(
        &self,
        manager: &SerializerManager,
        primary_type: &str,
        payload: &mut Map<String, Value>,
    ) {
        let mut extracted = Vec::new();
        let roots: Vec<String> = payload.keys().cloned().collect();

        for prop in roots {
            let Some((type_name, forced_secondary)) = self.root_type(manager, &prop) else {
                continue;
            };
            let serializer = if !forced_secondary && type_name == primary_type {
                self
            } else {
                manager.serializer_for(&type_name)
            };
            let (Some(embedded), Some(model)) =
                (serializer.embedded(), manager.schema().get(&type_name))
            else {
                continue;
            };
            if let Some(value) = payload.get_mut(&prop) {
                embedded.extract_value(manager, serializer.base(), model, value, &mut extracted);
            }
        }

        append_extracted(payload, extracted, primary_type);
    }

    /// 根键 -> (模型类型, 是否强制为侧载)；`_` 前缀的键总是侧载
    fn root_type(&self, manager: &SerializerManager, prop: &str) -> Option<(String, bool)> {
        let (key, forced_secondary) = match prop.strip_prefix('_') {
            Some(stripped) => (stripped, true),
            None => (prop, false),
        };
        let type_name = self.base.type_for_root(key);
        manager
            .schema()
            .get(&type_name)
            .map(|_| (type_name, forced_secondary))
    }

    fn resolve_root(&self, manager: &SerializerManager, prop: &str) -> Option<(String, bool)> {
        let resolved = self.root_type(manager, prop);
        if resolved.is_none() {
            warn!("No model found for root key '{}'", prop);
        }
        resolved
    }
}

fn into_object(payload: Value) -> Result<Map<String, Value>> {
    match payload {
        Value::Object(map) => Ok(map),
        other => Err(ModelError::InvalidPayload(format!(
            "expected a JSON object at the document root, found {}",
            kind_of(&other)
        ))),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
