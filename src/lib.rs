//! oxembed - 线上JSON载荷规范化库
//!
//! 在服务端的线上约定（snake_case 字段、嵌入与侧载关系、多态类型标签）
//! 与内存中的记录对象图之间双向转换。

#![doc(html_root_url = "https://docs.rs/oxembed/0.1.0")]

pub use serde_json;

pub mod cli;
pub mod config;
pub mod error;
pub mod manager;
pub mod record;
pub mod response;
pub mod schema;
pub mod serialization;
pub mod telemetry;
pub mod utils;

// Re-export commonly used items
pub use config::Config;
pub use error::{ModelError, Result};
pub use manager::SerializerManager;
pub use record::Record;
pub use schema::{ModelSchema, RelationshipDescriptor, RelationshipKind, Schema};
pub use serialization::{
    ArrayDocument, CanonicalDocument, DefaultSerializer, KeyMapping, SerializeOptions,
    SingleDocument,
};

/// oxembed 版本号
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
