//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了测试的通用工具函数和模型夹具。

#![allow(dead_code)]

use oxembed::config::{EmbeddedMode, EmbeddingConfig};
use oxembed::serialization::{ActiveModelSerializer, EmbeddedRecords, ModelSerializer};
use oxembed::{ModelSchema, Schema, SerializerManager};
use serde_json::{Map, Value};
use std::sync::Arc;

pub use oxembed::utils::setup_logging;

/// 反派模型夹具
///
/// superVillain、homePlanet、evilMinion（及子类型 yellowMinion）、
/// 带多态 belongsTo 的 doomsdayDevice 和带多态 hasMany 的 mediocreVillain。
pub fn villain_schema() -> Schema {
    let mut schema = Schema::new();
    let models = [
        ModelSchema::new("superVillain")
            .attribute("firstName")
            .attribute("lastName")
            .belongs_to("homePlanet", "homePlanet")
            .has_many("evilMinions", "evilMinion"),
        ModelSchema::new("homePlanet")
            .attribute("name")
            .has_many("superVillains", "superVillain"),
        ModelSchema::new("evilMinion")
            .attribute("name")
            .belongs_to("superVillain", "superVillain"),
        ModelSchema::new("yellowMinion").extends("evilMinion"),
        ModelSchema::new("doomsdayDevice")
            .attribute("name")
            .belongs_to("evilMinion", "evilMinion")
            .polymorphic(),
        ModelSchema::new("mediocreVillain")
            .attribute("name")
            .has_many("evilMinions", "evilMinion")
            .polymorphic(),
    ];
    for model in models {
        schema.register(model).expect("model registration failed");
    }
    schema
}

/// 博客模型夹具：post 属于 author，author 属于 post，comment 属于 post
pub fn blog_schema() -> Schema {
    let mut schema = Schema::new();
    let models = [
        ModelSchema::new("post")
            .attribute("title")
            .attribute("body")
            .belongs_to("author", "author")
            .has_many("comments", "comment"),
        ModelSchema::new("author")
            .attribute("name")
            .belongs_to("post", "post")
            .belongs_to("agency", "agency"),
        ModelSchema::new("agency").attribute("name"),
        ModelSchema::new("comment")
            .attribute("body")
            .belongs_to("post", "post"),
    ];
    for model in models {
        schema.register(model).expect("model registration failed");
    }
    schema
}

/// 为指定关系配置嵌入的序列化器
pub fn embedding_serializer(embedded: &[(&str, EmbeddedMode)]) -> ModelSerializer {
    let attrs = embedded
        .iter()
        .fold(EmbeddingConfig::new(), |attrs, (key, mode)| attrs.with(*key, *mode));
    ModelSerializer::new(Arc::new(ActiveModelSerializer::default()))
        .with_embedded(EmbeddedRecords::new(attrs))
}

/// 创建 post 嵌入 author 的管理器
pub fn blog_manager() -> SerializerManager {
    SerializerManager::new(blog_schema())
        .with_serializer("post", embedding_serializer(&[("author", EmbeddedMode::Always)]))
}

/// 把 `json!` 对象转换为 `Map`
pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}
