//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了线上JSON与内存记录之间的序列化机制。
//!
//! 序列化器由两部分显式组合而成：默认（非嵌入）行为 [`DefaultSerializer`]，
//! 以及可选的嵌入行为 [`EmbeddedRecords`]。调用方先尝试嵌入逻辑，未处理时回退到默认行为。

pub mod active_model;
pub mod document;
pub mod embedded;
pub mod model;
pub mod polymorphic;

use crate::record::Record;
use crate::schema::{ModelSchema, RelationshipDescriptor, RelationshipKind, RelationshipType, Schema};
use crate::utils::Inflector;
use serde_json::{Map, Value};

pub use active_model::ActiveModelSerializer;
pub use document::{ArrayDocument, CanonicalDocument, SingleDocument};
pub use embedded::EmbeddedRecords;
pub use model::ModelSerializer;
pub use polymorphic::{PolymorphicResolver, TypedRef};

/// 规范化后记录的ID字段
pub const ID_KEY: &str = "id";
/// 载荷中的元数据键
pub const META_KEY: &str = "meta";
/// 记录中的链接键
pub const LINKS_KEY: &str = "links";

/// 键映射特征
///
/// 提供线上格式的字段名，序列化核心本身不定义命名规则。
pub trait KeyMapping: Send + Sync {
    /// 属性的线上字段名
    fn key_for_attribute(&self, name: &str) -> String;

    /// 关系的线上外键字段名
    fn key_for_relationship(&self, name: &str, kind: RelationshipKind) -> String;

    /// 线上主键字段名
    fn primary_key(&self) -> &str;
}

/// 序列化选项
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// 是否写入记录ID
    pub include_id: bool,
}

impl SerializeOptions {
    pub fn with_id() -> Self {
        Self { include_id: true }
    }
}

/// 默认（非嵌入）序列化行为
///
/// 各方法的默认实现只依赖 [`KeyMapping`]，实现者通常只需提供键映射。
pub trait DefaultSerializer: KeyMapping {
    fn inflector(&self) -> &Inflector;

    fn polymorphic(&self) -> &PolymorphicResolver;

    /// 根键 -> 模型类型：`super_villains` -> `superVillain`
    fn type_for_root(&self, root: &str) -> String {
        self.polymorphic().type_for_wire(root)
    }

    /// 单条记录的根键：`homePlanet` -> `home_planet`
    fn root_for_type(&self, type_key: &str) -> String {
        self.key_for_attribute(type_key)
    }

    /// 侧载集合的键：`homePlanet` -> `home_planets`
    fn collection_for_type(&self, type_key: &str) -> String {
        self.key_for_attribute(&self.inflector().pluralize(type_key))
    }

    /// 序列化属性，未设置的属性不写出
    fn serialize_attribute(&self, record: &Record, json: &mut Map<String, Value>, attribute: &str) {
        if let Some(value) = record.attribute(attribute) {
            json.insert(self.key_for_attribute(attribute), value.clone());
        }
    }

    fn serialize_belongs_to(
        &self,
        record: &Record,
        json: &mut Map<String, Value>,
        relationship: &RelationshipDescriptor,
    ) {
        let key = self.key_for_relationship(&relationship.key, RelationshipKind::BelongsTo);
        let id = record
            .belongs_to(&relationship.key)
            .and_then(|related| related.id())
            .map(Value::from)
            .unwrap_or(Value::Null);
        json.insert(key, id);

        if relationship.polymorphic {
            self.serialize_polymorphic_type(record, json, relationship);
        }
    }

    /// 写出 `<key>_type` 字段，值为关联记录运行时类型的类名
    fn serialize_polymorphic_type(
        &self,
        record: &Record,
        json: &mut Map<String, Value>,
        relationship: &RelationshipDescriptor,
    ) {
        let key = format!("{}_type", self.key_for_attribute(&relationship.key));
        let value = record
            .belongs_to(&relationship.key)
            .map(|related| Value::String(self.polymorphic().class_name(related.type_key())))
            .unwrap_or(Value::Null);
        json.insert(key, value);
    }

    /// 只有多对无、多对多关系会写出ID列表，多对一由另一端的外键表达
    fn serialize_has_many(
        &self,
        schema: &Schema,
        record: &Record,
        json: &mut Map<String, Value>,
        relationship: &RelationshipDescriptor,
    ) {
        match schema.relationship_type(relationship) {
            RelationshipType::ManyToNone | RelationshipType::ManyToMany => {}
            _ => return,
        }

        let related = record.has_many(&relationship.key);
        if relationship.polymorphic {
            let resolver = self.polymorphic();
            let tags = related
                .iter()
                .map(|record| resolver.to_wire(&resolver.reference_for(record)))
                .collect();
            json.insert(self.key_for_attribute(&relationship.key), Value::Array(tags));
        } else {
            let ids = related
                .iter()
                .filter_map(|record| record.id())
                .map(Value::from)
                .collect();
            json.insert(
                self.key_for_relationship(&relationship.key, RelationshipKind::HasMany),
                Value::Array(ids),
            );
        }
    }

    /// 把单条线上记录规范化为模型层命名
    fn normalize(&self, model: &ModelSchema, mut hash: Map<String, Value>) -> Map<String, Value> {
        self.normalize_id(&mut hash);
        self.normalize_attributes(model, &mut hash);
        self.normalize_relationships(model, &mut hash);
        self.normalize_links(&mut hash);
        hash
    }

    fn normalize_id(&self, hash: &mut Map<String, Value>) {
        let primary_key = self.primary_key();
        if primary_key == ID_KEY {
            return;
        }
        if let Some(id) = hash.remove(primary_key) {
            hash.insert(ID_KEY.to_string(), id);
        }
    }

    fn normalize_attributes(&self, model: &ModelSchema, hash: &mut Map<String, Value>) {
        for attribute in model.attributes() {
            let payload_key = self.key_for_attribute(attribute);
            if payload_key == *attribute {
                continue;
            }
            if let Some(value) = hash.remove(&payload_key) {
                hash.insert(attribute.clone(), value);
            }
        }
    }

    /// 关系键总会出现在结果中，缺失时为 `null`
    fn normalize_relationships(&self, model: &ModelSchema, hash: &mut Map<String, Value>) {
        for relationship in model.relationships() {
            let payload_key = if relationship.polymorphic {
                self.key_for_attribute(&relationship.key)
            } else {
                self.key_for_relationship(&relationship.key, relationship.kind)
            };
            let payload = hash
                .remove(&payload_key)
                .or_else(|| hash.remove(&relationship.key));
            let value = self.polymorphic().normalize(relationship, payload);
            hash.insert(relationship.key.clone(), value);
        }
    }

    fn normalize_links(&self, hash: &mut Map<String, Value>) {
        if let Some(Value::Object(links)) = hash.get_mut(LINKS_KEY) {
            let camelized = std::mem::take(links)
                .into_iter()
                .map(|(key, value)| (self.inflector().camelize(&key), value))
                .collect();
            *links = camelized;
        }
    }
}
