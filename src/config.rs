//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了序列化系统的配置结构和解析逻辑。

use crate::error::{ModelError, Result};
use crate::schema::RelationshipKind;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

pub const CONFIG_VERSION: u32 = 1;

/// 应用级默认序列化器的配置键
pub const APPLICATION_SERIALIZER: &str = "application";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_version: Option<u32>,
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub inflections: InflectionConfig,
    #[serde(default)]
    pub models: BTreeMap<String, ModelConfig>,
    #[serde(default)]
    pub serializers: BTreeMap<String, SerializerConfig>,
}

/// 全局配置
///
/// 定义适用于所有序列化器的默认配置
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct GlobalConfig {
    /// 线上格式的主键字段名
    pub primary_key: String,
    /// 序列化时是否默认写入记录ID
    pub include_id: bool,
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            primary_key: "id".to_string(),
            include_id: false,
        }
    }
}

/// 词形变化配置
///
/// 补充内置的不规则复数和不可数名词表
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct InflectionConfig {
    /// 单数 -> 复数
    pub irregular: BTreeMap<String, String>,
    /// 单复数同形的名词
    pub uncountable: Vec<String>,
}

/// 模型配置
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct ModelConfig {
    /// 父模型，继承其属性和关系
    pub extends: Option<String>,
    /// 属性名列表（模型层命名，camelCase）
    pub attributes: Vec<String>,
    /// 关系声明
    pub relationships: BTreeMap<String, RelationshipConfig>,
}

/// 关系声明
#[derive(Deserialize, Clone, Debug)]
pub struct RelationshipConfig {
    pub kind: RelationshipKind,
    /// 关联模型类型
    #[serde(rename = "type")]
    pub related_type: String,
    #[serde(default)]
    pub polymorphic: bool,
}

/// 单个类型的序列化器配置
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(default)]
pub struct SerializerConfig {
    /// 覆盖全局主键字段名
    pub primary_key: Option<String>,
    /// 按关系键配置的嵌入选项
    pub attrs: EmbeddingConfig,
}

/// 嵌入模式
///
/// `load` 与 `always` 目前行为一致，保留区分以便日后只在读取方向生效。
#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddedMode {
    /// 序列化和规范化都嵌入
    Always,
    /// 只在读取时嵌入
    Load,
}

/// 单个关系的选项
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AttrOptions {
    pub embedded: Option<EmbeddedMode>,
}

impl AttrOptions {
    pub fn embedded(mode: EmbeddedMode) -> Self {
        Self {
            embedded: Some(mode),
        }
    }
}

/// 嵌入配置：关系键 -> 选项
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct EmbeddingConfig(BTreeMap<String, AttrOptions>);

impl EmbeddingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, mode: EmbeddedMode) -> Self {
        self.0.insert(key.into(), AttrOptions::embedded(mode));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// 查找关系的嵌入模式
    ///
    /// 先按原样查找，再按 camelCase 形式查找，便于配置里写线上命名。
    pub fn mode_for(&self, key: &str) -> Option<EmbeddedMode> {
        self.0
            .get(key)
            .and_then(|options| options.embedded)
            .or_else(|| {
                self.0
                    .iter()
                    .find(|(name, _)| heck::AsLowerCamelCase(name.as_str()).to_string() == key)
                    .and_then(|(_, options)| options.embedded)
            })
    }
}

impl Config {
    /// 从TOML字符串加载配置
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: Config = toml::from_str(input)?;
        config.validate().map_err(ModelError::ConfigError)?;
        Ok(config)
    }

    /// 从TOML文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 某个类型的线上主键
    ///
    /// 依次查找该类型的序列化器、`application` 序列化器和全局配置。
    pub fn primary_key_for(&self, type_key: &str) -> &str {
        self.serializers
            .get(type_key)
            .and_then(|serializer| serializer.primary_key.as_deref())
            .or_else(|| {
                self.serializers
                    .get(APPLICATION_SERIALIZER)
                    .and_then(|serializer| serializer.primary_key.as_deref())
            })
            .unwrap_or(&self.global.primary_key)
    }

    /// 验证配置
    ///
    /// 检查模型引用、继承链和嵌入配置是否一致
    pub fn validate(&self) -> std::result::Result<(), String> {
        // 验证配置版本
        if let Some(version) = &self.config_version {
            if *version > CONFIG_VERSION {
                return Err(format!(
                    "Configuration version {} is not supported. Current version is {}.",
                    version, CONFIG_VERSION
                ));
            }
        }

        if self.global.primary_key.is_empty() {
            return Err("Global primary_key cannot be empty".to_string());
        }

        for (name, model) in &self.models {
            if name.is_empty() {
                return Err("Model name cannot be empty".to_string());
            }

            if let Some(parent) = &model.extends {
                if !self.models.contains_key(parent) {
                    return Err(format!(
                        "Model '{}' extends unknown model '{}'",
                        name, parent
                    ));
                }
            }

            for (key, relationship) in &model.relationships {
                if !self.models.contains_key(&relationship.related_type) {
                    return Err(format!(
                        "Model '{}' relationship '{}' refers to unknown model '{}'",
                        name, key, relationship.related_type
                    ));
                }
                if model.attributes.iter().any(|attribute| attribute == key) {
                    return Err(format!(
                        "Model '{}' declares '{}' as both attribute and relationship",
                        name, key
                    ));
                }
            }

            // 继承链不能成环
            let mut seen = HashSet::new();
            let mut current = Some(name.as_str());
            while let Some(type_key) = current {
                if !seen.insert(type_key) {
                    return Err(format!("Model '{}' has a cyclic extends chain", name));
                }
                current = self
                    .models
                    .get(type_key)
                    .and_then(|model| model.extends.as_deref());
            }
        }

        for (name, serializer) in &self.serializers {
            if let Some(primary_key) = &serializer.primary_key {
                if primary_key.is_empty() {
                    return Err(format!("Serializer '{}' primary_key cannot be empty", name));
                }
            }

            if name == APPLICATION_SERIALIZER {
                continue;
            }

            if !self.models.contains_key(name) {
                return Err(format!("Serializer '{}' has no matching model", name));
            }

            for key in serializer.attrs.keys() {
                if !self.declares_relationship(name, key) {
                    return Err(format!(
                        "Serializer '{}' embeds '{}', which is not a relationship of the model",
                        name, key
                    ));
                }
            }
        }

        Ok(())
    }

    fn declares_relationship(&self, type_key: &str, key: &str) -> bool {
        let camelized = heck::AsLowerCamelCase(key).to_string();
        let mut seen = HashSet::new();
        let mut current = Some(type_key);
        while let Some(name) = current {
            if !seen.insert(name) {
                return false;
            }
            let Some(model) = self.models.get(name) else {
                return false;
            };
            if model.relationships.contains_key(key) || model.relationships.contains_key(&camelized)
            {
                return true;
            }
            current = model.extends.as_deref();
        }
        false
    }
}
