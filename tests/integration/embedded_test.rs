//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 嵌入记录集成测试

#[path = "../common/mod.rs"]
mod common;

use common::{blog_manager, blog_schema, embedding_serializer, object, villain_schema};
use oxembed::config::EmbeddedMode;
use oxembed::serialization::EmbeddedRecords;
use oxembed::{ModelSchema, Record, Schema, SerializeOptions, SerializerManager};
use serde_json::{json, Value};

fn dhh() -> Record {
    Record::new("author")
        .with_id("2")
        .with_attribute("name", "dhh")
}

/// 测试序列化时内联嵌入的 belongsTo 记录
///
/// 验证父记录不再写出外键，嵌入记录去掉指回父记录的外键
#[test]
fn test_serialize_embedded_belongs_to() {
    common::setup_logging();
    let manager = blog_manager();
    let post = Record::new("post")
        .with_id("1")
        .with_attribute("title", "Rails is omakase")
        .with_belongs_to("author", dhh().with_belongs_to("post", Record::new("post").with_id("1")));

    let json = manager.serialize(&post).unwrap();

    assert_eq!(
        Value::Object(json),
        json!({
            "title": "Rails is omakase",
            "author": {
                "id": "2",
                "name": "dhh",
                "agency_id": null
            }
        })
    );
}

/// 测试嵌入关系为空时写出 null
#[test]
fn test_serialize_embedded_without_related_writes_null() {
    let manager = blog_manager();
    let post = Record::new("post").with_attribute("title", "Draft");

    let json = manager.serialize(&post).unwrap();

    assert_eq!(json["author"], Value::Null);
    assert!(!json.contains_key("author_id"));
}

/// 测试未配置嵌入的关系回退到默认行为
#[test]
fn test_serialize_falls_back_without_embedding() {
    let manager = SerializerManager::new(blog_schema());
    let post = Record::new("post")
        .with_attribute("title", "Rails is omakase")
        .with_belongs_to("author", dhh());

    let json = manager.serialize(&post).unwrap();

    assert_eq!(json["author_id"], json!("2"));
    assert!(!json.contains_key("author"));
}

/// 测试 `load` 模式与 `always` 行为一致
#[test]
fn test_load_mode_embeds_like_always() {
    let manager = SerializerManager::new(blog_schema())
        .with_serializer("post", embedding_serializer(&[("author", EmbeddedMode::Load)]));
    let post = Record::new("post").with_belongs_to("author", dhh());

    let json = manager.serialize(&post).unwrap();

    assert_eq!(json["author"]["name"], json!("dhh"));
}

/// 测试规范化前置步骤把嵌入记录移到侧载集合
#[test]
fn test_update_payload_moves_embedded_record() {
    let manager = blog_manager();
    let model = manager.schema().model_for("post").unwrap();
    let serializer = manager.serializer_for("post");
    let mut payload = object(json!({
        "post": {"id": "1", "title": "T", "author": {"id": "2", "name": "dhh"}}
    }));

    serializer.embedded().unwrap().update_payload(
        &manager,
        serializer.base(),
        model,
        &mut payload,
        "post",
    );

    assert_eq!(
        Value::Object(payload),
        json!({
            "post": {"id": "1", "title": "T", "author_id": "2"},
            "authors": [{"id": "2", "name": "dhh", "post_id": "1"}]
        })
    );
}

/// 测试没有嵌入配置时载荷保持不变
#[test]
fn test_update_payload_without_configuration_is_identity() {
    let manager = SerializerManager::new(blog_schema());
    let model = manager.schema().model_for("post").unwrap();
    let raw = json!({
        "post": {"id": "1", "title": "T", "author": {"id": "2", "name": "dhh"}}
    });
    let mut payload = object(raw.clone());

    EmbeddedRecords::default().update_payload(
        &manager,
        manager.serializer_for("post").base(),
        model,
        &mut payload,
        "post",
    );

    assert_eq!(Value::Object(payload), raw);
}

/// 测试提取嵌入记录得到完整的侧载文档
#[test]
fn test_extract_single_with_embedded_author() {
    let manager = blog_manager();
    let payload = json!({
        "post": {"id": "1", "title": "T", "author": {"id": "2", "name": "dhh"}}
    });

    let document = manager.extract_single("post", payload, None).unwrap();

    let post = document.primary.as_ref().unwrap();
    assert_eq!(post["author"], json!("2"));
    assert_eq!(post["title"], json!("T"));
    assert_eq!(
        Value::Array(document.sideloaded("author").iter().cloned().map(Value::Object).collect()),
        json!([{"id": "2", "name": "dhh", "post": "1", "agency": null}])
    );
}

/// 测试缺失的嵌入关系不是错误
#[test]
fn test_extract_single_without_embedded_author() {
    let manager = blog_manager();
    let payload = json!({"post": {"id": "1", "title": "T", "author": null}});

    let document = manager.extract_single("post", payload, None).unwrap();

    assert_eq!(document.primary.as_ref().unwrap()["author"], Value::Null);
    assert!(document.sideloaded("author").is_empty());
}

/// 测试嵌入记录与已有的侧载记录合并为一条
#[test]
fn test_embedded_record_is_not_duplicated() {
    let manager = blog_manager();
    let payload = json!({
        "post": {"id": "1", "author": {"id": "2", "name": "dhh"}},
        "authors": [{"id": "2", "name": "stale"}, {"id": "3", "name": "wycats"}]
    });

    let document = manager.extract_single("post", payload, None).unwrap();

    let authors = document.sideloaded("author");
    assert_eq!(authors.len(), 2);
    assert_eq!(authors[0]["name"], json!("dhh"));
}

/// 测试序列化后再规范化能恢复关联记录的ID
#[test]
fn test_serialize_then_normalize_round_trip() {
    let manager = blog_manager();
    let post = Record::new("post")
        .with_id("1")
        .with_attribute("title", "Rails is omakase")
        .with_belongs_to("author", dhh());

    let json = manager
        .serialize_with(&post, SerializeOptions::with_id())
        .unwrap();
    let document = manager
        .extract_single("post", json!({ "post": Value::Object(json) }), Some("1"))
        .unwrap();

    assert_eq!(document.primary.as_ref().unwrap()["author"], json!("2"));
    assert_eq!(document.sideloaded("author")[0]["post"], json!("1"));
}

/// 测试嵌入的 hasMany 不会被提取
#[test]
fn test_embedded_has_many_is_not_extracted() {
    let manager = SerializerManager::new(blog_schema())
        .with_serializer("post", embedding_serializer(&[("comments", EmbeddedMode::Always)]));
    let payload = json!({
        "post": {"id": "1", "comment_ids": ["5"], "comments": [{"id": "5", "body": "first"}]}
    });

    let document = manager.extract_single("post", payload, None).unwrap();

    assert_eq!(document.primary.as_ref().unwrap()["comments"], json!(["5"]));
    assert!(document.sideloaded("comment").is_empty());
}

/// 测试多层嵌入被完全展开
#[test]
fn test_nested_embedding_is_flattened() {
    let manager = blog_manager().with_serializer(
        "author",
        embedding_serializer(&[("agency", EmbeddedMode::Always)]),
    );
    let payload = json!({
        "post": {
            "id": "1",
            "author": {"id": "2", "name": "dhh", "agency": {"id": "9", "name": "37signals"}}
        }
    });

    let document = manager.extract_single("post", payload, None).unwrap();

    assert_eq!(document.primary.as_ref().unwrap()["author"], json!("2"));
    let author = &document.sideloaded("author")[0];
    assert_eq!(author["agency"], json!("9"));
    assert_eq!(author["post"], json!("1"));
    assert_eq!(document.sideloaded("agency")[0]["name"], json!("37signals"));
}

/// 测试数组载荷中每条主记录的嵌入记录都被提取
#[test]
fn test_extract_array_with_embedded_authors() {
    let manager = blog_manager();
    let payload = json!({
        "posts": [
            {"id": "1", "author": {"id": "2", "name": "dhh"}},
            {"id": "3", "author": {"id": "4", "name": "tomdale"}}
        ]
    });

    let document = manager.extract_array("post", payload).unwrap();

    assert_eq!(document.primary.len(), 2);
    assert_eq!(document.primary[1]["author"], json!("4"));
    let authors = document.sideloaded("author");
    assert_eq!(authors.len(), 2);
    assert!(authors.iter().any(|author| author["post"] == json!("3")));
}

/// 测试多态嵌入记录按运行时类型侧载
#[test]
fn test_embedded_polymorphic_uses_runtime_type() {
    let manager = SerializerManager::new(villain_schema()).with_serializer(
        "doomsdayDevice",
        embedding_serializer(&[("evilMinion", EmbeddedMode::Always)]),
    );
    let payload = json!({
        "doomsday_device": {
            "id": 1,
            "name": "DeathRay",
            "evil_minion": {"type": "yellow_minion", "id": 12, "name": "Alex"}
        }
    });

    let document = manager.extract_single("doomsdayDevice", payload, None).unwrap();

    assert_eq!(
        document.primary.clone().map(Value::Object),
        Some(json!({
            "id": 1,
            "name": "DeathRay",
            "evilMinion": {"type": "yellowMinion", "id": 12}
        }))
    );
    let minions = document.sideloaded("yellowMinion");
    assert_eq!(minions.len(), 1);
    assert_eq!(minions[0]["name"], json!("Alex"));
    assert_eq!(minions[0]["doomsday_device_id"], json!(1));
}

/// 测试多态嵌入记录序列化时携带类型标签
#[test]
fn test_serialize_embedded_polymorphic_carries_type() {
    let manager = SerializerManager::new(villain_schema()).with_serializer(
        "doomsdayDevice",
        embedding_serializer(&[("evilMinion", EmbeddedMode::Always)]),
    );
    let ray = Record::new("doomsdayDevice")
        .with_attribute("name", "DeathRay")
        .with_belongs_to(
            "evilMinion",
            Record::new("yellowMinion").with_id("124").with_attribute("name", "Alex"),
        );

    let json = manager.serialize(&ray).unwrap();

    assert_eq!(
        json["evil_minion"],
        json!({"type": "yellow_minion", "id": "124", "name": "Alex", "super_villain_id": null})
    );
    assert!(!json.contains_key("evil_minion_id"));
}

/// 测试侧载集合中的嵌入记录按其类型的配置展开
#[test]
fn test_sideloaded_records_are_flattened() {
    let manager = blog_manager().with_serializer(
        "author",
        embedding_serializer(&[("agency", EmbeddedMode::Always)]),
    );
    let payload = json!({
        "post": {"id": "1", "title": "T", "author_id": "2"},
        "authors": [{"id": "2", "name": "dhh", "agency": {"id": "9", "name": "37signals"}}]
    });

    let document = manager.extract_single("post", payload, None).unwrap();

    assert_eq!(document.primary.as_ref().unwrap()["author"], json!("2"));
    assert_eq!(document.sideloaded("author")[0]["agency"], json!("9"));
    let agencies = document.sideloaded("agency");
    assert_eq!(agencies.len(), 1);
    assert_eq!(agencies[0]["name"], json!("37signals"));
    assert_eq!(agencies[0]["author_id"], json!("2"));
}

/// 测试单记录响应使用复数根键时嵌入记录同样被展开
#[test]
fn test_extract_single_flattens_plural_root() {
    let manager = blog_manager();
    let payload = json!({
        "posts": [
            {"id": "1", "title": "T", "author": {"id": "2", "name": "dhh"}},
            {"id": "3", "title": "U", "author": {"id": "4", "name": "tomdale"}}
        ]
    });

    let document = manager.extract_single("post", payload, Some("1")).unwrap();

    let post = document.primary.as_ref().unwrap();
    assert_eq!(post["id"], json!("1"));
    assert_eq!(post["author"], json!("2"));
    assert_eq!(document.sideloaded("post")[0]["author"], json!("4"));
    assert_eq!(document.sideloaded("author").len(), 2);
}

/// 测试自引用的嵌入记录只作为侧载记录出现
#[test]
fn test_self_referential_embedded_record_is_sideloaded() {
    let schema = Schema::new()
        .with_model(
            ModelSchema::new("comment")
                .attribute("body")
                .belongs_to("parent", "comment"),
        )
        .unwrap();
    let manager = SerializerManager::new(schema)
        .with_serializer("comment", embedding_serializer(&[("parent", EmbeddedMode::Always)]));
    let payload = json!({
        "comments": [{"id": "2", "body": "reply", "parent": {"id": "1", "body": "root"}}]
    });

    let document = manager.extract_array("comment", payload).unwrap();

    assert_eq!(document.primary.len(), 1);
    assert_eq!(document.primary[0]["id"], json!("2"));
    assert_eq!(document.primary[0]["parent"], json!("1"));
    let parents = document.sideloaded("comment");
    assert_eq!(parents.len(), 1);
    assert_eq!(parents[0]["body"], json!("root"));
    assert_eq!(parents[0]["comment_id"], json!("2"));
}
