//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了规范化后的侧载文档。

use super::ID_KEY;
use crate::utils::coerce_id;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// 规范化文档
///
/// 每个关联记录只出现一次，位于其类型对应的侧载集合中。
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct CanonicalDocument<P> {
    /// 主记录（单条或列表）
    pub primary: P,
    /// 模型类型 -> 已规范化的记录
    pub sideloaded: BTreeMap<String, Vec<Map<String, Value>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

/// `extract_single` 的结果
pub type SingleDocument = CanonicalDocument<Option<Map<String, Value>>>;

/// `extract_array` 的结果
pub type ArrayDocument = CanonicalDocument<Vec<Map<String, Value>>>;

impl<P> CanonicalDocument<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            sideloaded: BTreeMap::new(),
            meta: None,
        }
    }

    /// 加入侧载记录，ID相同的记录被后来者替换
    pub fn push(&mut self, type_key: &str, hash: Map<String, Value>) {
        let records = self.sideloaded.entry(type_key.to_string()).or_default();
        let id = hash.get(ID_KEY).and_then(coerce_id);
        let existing = id.as_ref().and_then(|id| {
            records
                .iter()
                .position(|record| record.get(ID_KEY).and_then(coerce_id).as_ref() == Some(id))
        });
        match existing {
            Some(index) => records[index] = hash,
            None => records.push(hash),
        }
    }

    pub fn sideloaded(&self, type_key: &str) -> &[Map<String, Value>] {
        self.sideloaded
            .get(type_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
