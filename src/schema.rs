//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了模型模式：每个类型声明的属性和关系，以及关系的反向查找。

use crate::config::Config;
use crate::error::{ModelError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::debug;

/// 关系种类
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    BelongsTo,
    HasMany,
}

/// 关系描述
///
/// 由模式派生，创建后不可变。`parent_type` 是声明该关系的模型。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RelationshipDescriptor {
    pub key: String,
    pub kind: RelationshipKind,
    pub related_type: String,
    pub polymorphic: bool,
    pub parent_type: String,
}

impl RelationshipDescriptor {
    pub fn belongs_to(
        parent_type: impl Into<String>,
        key: impl Into<String>,
        related_type: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: RelationshipKind::BelongsTo,
            related_type: related_type.into(),
            polymorphic: false,
            parent_type: parent_type.into(),
        }
    }

    pub fn has_many(
        parent_type: impl Into<String>,
        key: impl Into<String>,
        related_type: impl Into<String>,
    ) -> Self {
        Self {
            kind: RelationshipKind::HasMany,
            ..Self::belongs_to(parent_type, key, related_type)
        }
    }

    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }
}

/// 关系的基数，由关系种类和反向关系共同决定
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelationshipType {
    OneToNone,
    OneToOne,
    OneToMany,
    ManyToNone,
    ManyToOne,
    ManyToMany,
}

/// 单个模型的模式
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModelSchema {
    type_key: String,
    extends: Option<String>,
    attributes: Vec<String>,
    relationships: Vec<RelationshipDescriptor>,
}

impl ModelSchema {
    pub fn new(type_key: impl Into<String>) -> Self {
        Self {
            type_key: type_key.into(),
            extends: None,
            attributes: Vec::new(),
            relationships: Vec::new(),
        }
    }

    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.extends = Some(parent.into());
        self
    }

    pub fn attribute(mut self, name: impl Into<String>) -> Self {
        self.attributes.push(name.into());
        self
    }

    pub fn belongs_to(mut self, key: impl Into<String>, related_type: impl Into<String>) -> Self {
        let descriptor = RelationshipDescriptor::belongs_to(self.type_key.clone(), key, related_type);
        self.relationships.push(descriptor);
        self
    }

    pub fn has_many(mut self, key: impl Into<String>, related_type: impl Into<String>) -> Self {
        let descriptor = RelationshipDescriptor::has_many(self.type_key.clone(), key, related_type);
        self.relationships.push(descriptor);
        self
    }

    /// 把最后声明的关系标记为多态
    pub fn polymorphic(mut self) -> Self {
        if let Some(last) = self.relationships.pop() {
            self.relationships.push(last.polymorphic());
        }
        self
    }

    pub fn type_key(&self) -> &str {
        &self.type_key
    }

    pub fn parent(&self) -> Option<&str> {
        self.extends.as_deref()
    }

    /// 属性列表，包含继承的属性
    pub fn attributes(&self) -> &[String] {
        &self.attributes
    }

    /// 关系列表，包含继承的关系
    pub fn relationships(&self) -> &[RelationshipDescriptor] {
        &self.relationships
    }

    pub fn relationship(&self, key: &str) -> Option<&RelationshipDescriptor> {
        self.relationships.iter().find(|rel| rel.key == key)
    }
}

/// 模式注册表
#[derive(Clone, Debug, Default)]
pub struct Schema {
    models: BTreeMap<String, ModelSchema>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册模型
    ///
    /// 带 `extends` 的模型需要在父模型之后注册，注册时会展开父模型的属性和关系。
    pub fn register(&mut self, model: ModelSchema) -> Result<()> {
        let flattened = match model.extends.clone() {
            Some(parent) => {
                let parent = self.model_for(&parent)?;
                let mut attributes = parent.attributes.clone();
                attributes.extend(model.attributes.iter().cloned());
                let mut relationships = parent.relationships.clone();
                relationships.extend(model.relationships.iter().cloned());
                ModelSchema {
                    attributes,
                    relationships,
                    ..model
                }
            }
            None => model,
        };
        debug!(
            "Registered model '{}' ({} attributes, {} relationships)",
            flattened.type_key,
            flattened.attributes.len(),
            flattened.relationships.len()
        );
        self.models.insert(flattened.type_key.clone(), flattened);
        Ok(())
    }

    pub fn with_model(mut self, model: ModelSchema) -> Result<Self> {
        self.register(model)?;
        Ok(self)
    }

    /// 根据配置构建模式
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate().map_err(ModelError::ConfigError)?;

        let mut schema = Schema::new();
        let mut pending: Vec<&String> = config.models.keys().collect();

        // 父模型先注册
        while !pending.is_empty() {
            let before = pending.len();
            let mut remaining = Vec::new();
            for name in pending {
                let model_config = &config.models[name];
                let ready = model_config
                    .extends
                    .as_ref()
                    .map_or(true, |parent| schema.models.contains_key(parent));
                if !ready {
                    remaining.push(name);
                    continue;
                }

                let mut model = ModelSchema::new(name.clone());
                model.extends = model_config.extends.clone();
                model.attributes = model_config.attributes.clone();
                model.relationships = model_config
                    .relationships
                    .iter()
                    .map(|(key, rel)| RelationshipDescriptor {
                        key: key.clone(),
                        kind: rel.kind,
                        related_type: rel.related_type.clone(),
                        polymorphic: rel.polymorphic,
                        parent_type: name.clone(),
                    })
                    .collect();
                schema.register(model)?;
            }
            if remaining.len() == before {
                return Err(ModelError::ConfigError(
                    "Unable to resolve model extends chain".to_string(),
                ));
            }
            pending = remaining;
        }

        Ok(schema)
    }

    pub fn get(&self, type_key: &str) -> Option<&ModelSchema> {
        self.models.get(type_key)
    }

    pub fn model_for(&self, type_key: &str) -> Result<&ModelSchema> {
        self.models
            .get(type_key)
            .ok_or_else(|| ModelError::UnknownModel(type_key.to_string()))
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.values()
    }

    /// `type_key` 是否是 `ancestor` 本身或其子类型
    pub fn is_subtype_of(&self, type_key: &str, ancestor: &str) -> bool {
        let mut current = Some(type_key);
        let mut depth = 0;
        while let Some(name) = current {
            if name == ancestor {
                return true;
            }
            depth += 1;
            if depth > self.models.len() {
                return false;
            }
            current = self.models.get(name).and_then(|model| model.parent());
        }
        false
    }

    /// 查找关系在关联模型上的反向关系
    ///
    /// 有多个候选时无法确定，返回 `None`。
    pub fn inverse_for(&self, relationship: &RelationshipDescriptor) -> Option<&RelationshipDescriptor> {
        let related = self.get(&relationship.related_type)?;
        let mut candidates = related.relationships().iter().filter(|candidate| {
            self.is_subtype_of(&relationship.parent_type, &candidate.related_type)
        });
        let inverse = candidates.next()?;
        if candidates.next().is_some() {
            debug!(
                "Ambiguous inverse for '{}.{}'",
                relationship.parent_type, relationship.key
            );
            return None;
        }
        Some(inverse)
    }

    pub fn relationship_type(&self, relationship: &RelationshipDescriptor) -> RelationshipType {
        let inverse = self.inverse_for(relationship).map(|inverse| inverse.kind);
        match (relationship.kind, inverse) {
            (RelationshipKind::BelongsTo, None) => RelationshipType::OneToNone,
            (RelationshipKind::BelongsTo, Some(RelationshipKind::BelongsTo)) => {
                RelationshipType::OneToOne
            }
            (RelationshipKind::BelongsTo, Some(RelationshipKind::HasMany)) => {
                RelationshipType::OneToMany
            }
            (RelationshipKind::HasMany, None) => RelationshipType::ManyToNone,
            (RelationshipKind::HasMany, Some(RelationshipKind::BelongsTo)) => {
                RelationshipType::ManyToOne
            }
            (RelationshipKind::HasMany, Some(RelationshipKind::HasMany)) => {
                RelationshipType::ManyToMany
            }
        }
    }
}
