//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了序列化器管理器，负责持有模式并按类型查找序列化器。
//!
//! 管理器在构建后只读，显式传入每次转换调用，可以放在 `Arc` 中跨线程共享。

use crate::config::{Config, APPLICATION_SERIALIZER};
use crate::error::Result;
use crate::record::Record;
use crate::schema::Schema;
use crate::serialization::{
    ActiveModelSerializer, ArrayDocument, EmbeddedRecords, ModelSerializer, SerializeOptions,
    SingleDocument,
};
use crate::utils::Inflector;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, instrument};

/// 序列化器管理器
#[derive(Clone)]
pub struct SerializerManager {
    schema: Schema,
    serializers: BTreeMap<String, ModelSerializer>,
    application: ModelSerializer,
    options: SerializeOptions,
}

impl SerializerManager {
    /// 创建管理器，所有类型都使用默认的ActiveModel序列化器
    pub fn new(schema: Schema) -> Self {
        Self {
            schema,
            serializers: BTreeMap::new(),
            application: ModelSerializer::new(Arc::new(ActiveModelSerializer::default())),
            options: SerializeOptions::default(),
        }
    }

    /// 根据配置初始化管理器
    ///
    /// # 参数
    ///
    /// * `config` - 序列化系统配置
    ///
    /// # 返回值
    ///
    /// 返回管理器，配置无效时返回相应的错误
    #[instrument(skip(config), level = "info", fields(model_count = config.models.len()))]
    pub fn from_config(config: &Config) -> Result<Self> {
        let schema = Schema::from_config(config)?;
        let inflector = Arc::new(Inflector::from_config(&config.inflections));

        let build = |name: &str| {
            let serializer_config = config.serializers.get(name);
            let base = ActiveModelSerializer::new(inflector.clone())
                .with_primary_key(config.primary_key_for(name));
            let serializer = ModelSerializer::new(Arc::new(base));
            match serializer_config {
                Some(c) if !c.attrs.is_empty() => {
                    serializer.with_embedded(EmbeddedRecords::new(c.attrs.clone()))
                }
                _ => serializer,
            }
        };

        let application = build(APPLICATION_SERIALIZER);
        let serializers = config
            .serializers
            .keys()
            .filter(|name| name.as_str() != APPLICATION_SERIALIZER)
            .map(|name| (name.clone(), build(name)))
            .collect::<BTreeMap<_, _>>();

        info!(
            "Initialized SerializerManager with {} models and {} serializers",
            config.models.len(),
            serializers.len()
        );

        Ok(Self {
            schema,
            serializers,
            application,
            options: SerializeOptions {
                include_id: config.global.include_id,
            },
        })
    }

    /// 替换应用级默认序列化器
    pub fn with_application(mut self, serializer: ModelSerializer) -> Self {
        self.application = serializer;
        self
    }

    pub fn with_serializer(mut self, type_key: impl Into<String>, serializer: ModelSerializer) -> Self {
        self.register(type_key, serializer);
        self
    }

    pub fn register(&mut self, type_key: impl Into<String>, serializer: ModelSerializer) {
        self.serializers.insert(type_key.into(), serializer);
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// 默认序列化选项
    pub fn options(&self) -> SerializeOptions {
        self.options
    }

    /// 查找类型的序列化器，未注册时回退到应用级序列化器
    pub fn serializer_for(&self, type_key: &str) -> &ModelSerializer {
        self.serializers.get(type_key).unwrap_or(&self.application)
    }

    pub fn serialize(&self, record: &Record) -> Result<Map<String, Value>> {
        self.serialize_with(record, self.options)
    }

    pub fn serialize_with(&self, record: &Record, options: SerializeOptions) -> Result<Map<String, Value>> {
        self.serializer_for(record.type_key())
            .serialize(self, record, options)
    }

    pub fn serialize_into_hash(&self, hash: &mut Map<String, Value>, record: &Record) -> Result<()> {
        self.serializer_for(record.type_key())
            .serialize_into_hash(self, hash, record, self.options)
    }

    pub fn normalize(&self, type_key: &str, hash: Map<String, Value>) -> Result<Map<String, Value>> {
        self.serializer_for(type_key).normalize(self, type_key, hash)
    }

    pub fn extract_single(
        &self,
        type_key: &str,
        payload: Value,
        record_id: Option<&str>,
    ) -> Result<SingleDocument> {
        self.serializer_for(type_key)
            .extract_single(self, type_key, payload, record_id)
    }

    pub fn extract_array(&self, type_key: &str, payload: Value) -> Result<ArrayDocument> {
        self.serializer_for(type_key)
            .extract_array(self, type_key, payload)
    }
}
