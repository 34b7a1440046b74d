//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了嵌入记录的序列化和规范化。
//!
//! 配置为嵌入的 `belongsTo` 关系在序列化时把关联记录内联到父记录中：
//!
//! ```json
//! {"post": {"id": "1", "title": "Rails is omakase", "author": {"id": "2", "name": "dhh"}}}
//! ```
//!
//! 读取时再把内联记录移到侧载集合，父记录只保留外键：
//!
//! ```json
//! {
//!   "post": {"id": "1", "title": "Rails is omakase", "author_id": "2"},
//!   "authors": [{"id": "2", "name": "dhh", "post_id": "1"}]
//! }
//! ```
//!
//! 目前只支持 `belongsTo`，嵌入的 `hasMany` 会被忽略。

use super::{DefaultSerializer, SerializeOptions, TypedRef};
use crate::config::{EmbeddedMode, EmbeddingConfig};
use crate::error::Result;
use crate::manager::SerializerManager;
use crate::record::Record;
use crate::schema::{ModelSchema, RelationshipDescriptor, RelationshipKind};
use crate::utils::coerce_id;
use serde_json::{Map, Value};
use tracing::{debug, warn};

const TYPE_FIELD: &str = "type";

/// 从父记录中移出的嵌入节点
pub(crate) struct ExtractedNode {
    type_key: String,
    collection: String,
    primary_key: String,
    node: Map<String, Value>,
}

/// 嵌入记录行为
#[derive(Clone, Debug, Default)]
pub struct EmbeddedRecords {
    attrs: EmbeddingConfig,
}

impl EmbeddedRecords {
    pub fn new(attrs: EmbeddingConfig) -> Self {
        Self { attrs }
    }

    /// 关系的嵌入模式，`always` 与 `load` 都会触发嵌入
    pub fn mode_for(&self, key: &str) -> Option<EmbeddedMode> {
        self.attrs.mode_for(key)
    }

    /// 序列化嵌入的 `belongsTo` 关系
    ///
    /// 返回 `false` 表示该关系未配置嵌入，调用方应回退到默认行为。
    pub fn serialize_belongs_to(
        &self,
        manager: &SerializerManager,
        base: &dyn DefaultSerializer,
        record: &Record,
        json: &mut Map<String, Value>,
        relationship: &RelationshipDescriptor,
    ) -> Result<bool> {
        if self.mode_for(&relationship.key).is_none() {
            return Ok(false);
        }

        let key = base.key_for_attribute(&relationship.key);
        let Some(related) = record.belongs_to(&relationship.key) else {
            json.insert(key, Value::Null);
            return Ok(true);
        };

        let serializer = manager.serializer_for(related.type_key());
        let mut embedded = serializer.serialize(manager, related, SerializeOptions::default())?;
        if let Some(id) = related.id() {
            embedded.insert(serializer.base().primary_key().to_string(), Value::from(id));
        }

        // 去掉指回父记录的外键，避免循环
        let parent_key = base.key_for_attribute(&relationship.parent_type);
        if !parent_key.is_empty() {
            embedded.remove(&format!("{parent_key}_id"));
            embedded.remove(&parent_key);
        }

        if relationship.polymorphic {
            let wire_type = base.polymorphic().wire_type(related.type_key());
            embedded.insert(TYPE_FIELD.to_string(), Value::String(wire_type));
        }

        json.insert(key, Value::Object(embedded));
        Ok(true)
    }

    /// 在通用规范化之前，把 `payload[root]` 中的嵌入记录移到侧载集合
    ///
    /// `root` 可以指向单条记录，也可以指向记录数组。没有嵌入配置时不做任何修改。
    pub fn update_payload(
        &self,
        manager: &SerializerManager,
        base: &dyn DefaultSerializer,
        model: &ModelSchema,
        payload: &mut Map<String, Value>,
        root: &str,
    ) {
        if self.attrs.is_empty() {
            return;
        }

        let mut extracted = Vec::new();
        if let Some(value) = payload.get_mut(root) {
            self.extract_value(manager, base, model, value, &mut extracted);
        }
        append_extracted(payload, extracted, model.type_key());
    }

    /// 展开根键下的单条记录或记录数组，移出的节点收集到 `extracted`
    pub(crate) fn extract_value(
        &self,
        manager: &SerializerManager,
        base: &dyn DefaultSerializer,
        model: &ModelSchema,
        value: &mut Value,
        extracted: &mut Vec<ExtractedNode>,
    ) {
        match value {
            Value::Object(partial) => self.extract_embedded(manager, base, model, partial, extracted),
            Value::Array(partials) => {
                for partial in partials.iter_mut() {
                    if let Value::Object(partial) = partial {
                        self.extract_embedded(manager, base, model, partial, extracted);
                    }
                }
            }
            _ => {}
        }
    }

    fn extract_embedded(
        &self,
        manager: &SerializerManager,
        base: &dyn DefaultSerializer,
        model: &ModelSchema,
        partial: &mut Map<String, Value>,
        extracted: &mut Vec<ExtractedNode>,
    ) {
        for relationship in model.relationships() {
            if self.mode_for(&relationship.key).is_none() {
                continue;
            }
            if relationship.kind == RelationshipKind::HasMany {
                debug!(
                    "Embedded hasMany '{}.{}' is not extracted",
                    model.type_key(),
                    relationship.key
                );
                continue;
            }

            let related_serializer = manager.serializer_for(&relationship.related_type);
            let attribute = related_serializer.base().key_for_attribute(&relationship.key);
            let mut node = match partial.remove(&attribute) {
                Some(Value::Object(node)) => node,
                Some(other) => {
                    partial.insert(attribute, other);
                    continue;
                }
                None => continue,
            };

            let resolver = base.polymorphic();
            let runtime_type = if relationship.polymorphic {
                node.remove(TYPE_FIELD)
                    .as_ref()
                    .and_then(Value::as_str)
                    .map(|wire| resolver.type_for_wire(wire))
                    .unwrap_or_else(|| relationship.related_type.clone())
            } else {
                relationship.related_type.clone()
            };

            let runtime_serializer = manager.serializer_for(&runtime_type);
            let primary_key = runtime_serializer.base().primary_key().to_string();
            let child_id = node.get(&primary_key).cloned().unwrap_or(Value::Null);

            if relationship.polymorphic {
                let reference = TypedRef {
                    type_key: runtime_type.clone(),
                    id: child_id,
                };
                partial.insert(attribute, resolver.to_wire(&reference));
            } else {
                let expanded_key = related_serializer
                    .base()
                    .key_for_relationship(&relationship.key, RelationshipKind::BelongsTo);
                partial.insert(expanded_key, child_id);
            }

            // 子记录需要指回父记录，使关系两端都能解析
            if let Some(parent_id) = partial.get(base.primary_key()).filter(|id| !id.is_null()) {
                let back_reference = format!("{}_id", base.key_for_attribute(&relationship.parent_type));
                node.insert(back_reference, parent_id.clone());
            }

            match (
                runtime_serializer.embedded(),
                manager.schema().get(&runtime_type),
            ) {
                (Some(embedded), Some(runtime_model)) => embedded.extract_embedded(
                    manager,
                    runtime_serializer.base(),
                    runtime_model,
                    &mut node,
                    extracted,
                ),
                (Some(_), None) => warn!("No model registered for embedded type '{}'", runtime_type),
                _ => {}
            }

            debug!(
                "Extracted embedded '{}.{}' as '{}'",
                model.type_key(),
                relationship.key,
                runtime_type
            );
            extracted.push(ExtractedNode {
                collection: runtime_serializer.base().collection_for_type(&runtime_type),
                type_key: runtime_type,
                primary_key,
                node,
            });
        }
    }
}

/// 把移出的节点追加到各自的顶层集合
///
/// 与主类型相同的节点（自引用关系）放入 `_` 前缀的集合，始终作为侧载记录。
pub(crate) fn append_extracted(
    payload: &mut Map<String, Value>,
    extracted: Vec<ExtractedNode>,
    primary_type: &str,
) {
    for ExtractedNode {
        type_key,
        collection,
        primary_key,
        node,
    } in extracted
    {
        let collection = if type_key == primary_type {
            format!("_{collection}")
        } else {
            collection
        };
        append_to_collection(payload, &collection, &primary_key, node);
    }
}

/// 把节点追加到顶层集合；集合不是数组时先包装成数组，ID相同的节点被替换
fn append_to_collection(
    payload: &mut Map<String, Value>,
    collection: &str,
    primary_key: &str,
    node: Map<String, Value>,
) {
    let entry = payload
        .entry(collection.to_string())
        .or_insert_with(|| Value::Array(Vec::new()));
    if !entry.is_array() {
        let existing = entry.take();
        *entry = Value::Array(if existing.is_null() {
            Vec::new()
        } else {
            vec![existing]
        });
    }
    let Value::Array(records) = entry else {
        return;
    };

    let id = node.get(primary_key).and_then(coerce_id);
    let existing = id.as_ref().and_then(|id| {
        records.iter().position(|record| {
            record.get(primary_key).and_then(coerce_id).as_ref() == Some(id)
        })
    });
    match existing {
        Some(index) => records[index] = Value::Object(node),
        None => records.push(Value::Object(node)),
    }
}
