//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了ActiveModel风格的默认序列化器。

use super::{DefaultSerializer, KeyMapping, PolymorphicResolver};
use crate::schema::RelationshipKind;
use crate::utils::Inflector;
use std::sync::Arc;

/// ActiveModel序列化器
///
/// 线上字段使用 snake_case，`belongsTo` 外键为 `<key>_id`，
/// `hasMany` 外键为 `<单数key>_ids`。
#[derive(Clone, Debug)]
pub struct ActiveModelSerializer {
    primary_key: String,
    inflector: Arc<Inflector>,
    polymorphic: PolymorphicResolver,
}

impl ActiveModelSerializer {
    /// 创建新的ActiveModel序列化器
    pub fn new(inflector: Arc<Inflector>) -> Self {
        Self {
            primary_key: "id".to_string(),
            polymorphic: PolymorphicResolver::new(inflector.clone()),
            inflector,
        }
    }

    /// 使用自定义主键字段（如 `_id`）
    pub fn with_primary_key(mut self, primary_key: impl Into<String>) -> Self {
        self.primary_key = primary_key.into();
        self
    }
}

impl Default for ActiveModelSerializer {
    fn default() -> Self {
        Self::new(Arc::new(Inflector::new()))
    }
}

impl KeyMapping for ActiveModelSerializer {
    fn key_for_attribute(&self, name: &str) -> String {
        self.inflector.underscore(name)
    }

    fn key_for_relationship(&self, name: &str, kind: RelationshipKind) -> String {
        match kind {
            RelationshipKind::BelongsTo => format!("{}_id", self.inflector.underscore(name)),
            RelationshipKind::HasMany => {
                let singular = self.inflector.singularize(name);
                format!("{}_ids", self.inflector.underscore(&singular))
            }
        }
    }

    fn primary_key(&self) -> &str {
        &self.primary_key
    }
}

impl DefaultSerializer for ActiveModelSerializer {
    fn inflector(&self) -> &Inflector {
        &self.inflector
    }

    fn polymorphic(&self) -> &PolymorphicResolver {
        &self.polymorphic
    }
}
