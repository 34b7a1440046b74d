//! Copyright (c) 2025, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了序列化系统的错误类型和处理机制。

use thiserror::Error;

/// 序列化系统错误类型枚举
///
/// 载荷中缺失的关系、ID或配置不会产生错误，只会被视为"关系不存在"。
/// 这里只列出调用方无法忽略的失败。
#[derive(Error, Debug)]
pub enum ModelError {
    /// 配置错误
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// 未在模式中注册的模型类型
    #[error("Unknown model type: {0}")]
    UnknownModel(String),

    /// 载荷结构无效（例如根节点不是对象）
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    /// IO错误
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// TOML解析错误
    #[error("TOML parse error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// JSON解析错误
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// 操作结果类型别名
pub type Result<T> = std::result::Result<T, ModelError>;
