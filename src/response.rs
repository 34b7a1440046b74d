//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块负责解析服务端的错误响应。

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;

/// 422 Unprocessable Entity
pub const STATUS_UNPROCESSABLE: u16 = 422;
/// 404 Not Found
pub const STATUS_NOT_FOUND: u16 = 404;

/// 校验错误：模型层字段名 -> 错误信息
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InvalidError {
    pub errors: BTreeMap<String, Value>,
}

impl InvalidError {
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.errors.get(name)
    }
}

/// 解析错误响应
///
/// 422 响应体中的 `errors` 对象按 camelCase 字段名返回；
/// 404 返回 `{"404": "Not Found"}`；其他状态码返回 `None`，由调用方按一般错误处理。
pub fn parse_error_response(status: u16, body: &str) -> Result<Option<InvalidError>> {
    match status {
        STATUS_UNPROCESSABLE => {
            let body: Value = serde_json::from_str(body)?;
            let errors = match body.get("errors") {
                Some(Value::Object(errors)) => errors
                    .iter()
                    .map(|(key, value)| (heck::AsLowerCamelCase(key).to_string(), value.clone()))
                    .collect(),
                _ => BTreeMap::new(),
            };
            Ok(Some(InvalidError { errors }))
        }
        STATUS_NOT_FOUND => {
            let mut errors = BTreeMap::new();
            errors.insert(
                STATUS_NOT_FOUND.to_string(),
                Value::String("Not Found".to_string()),
            );
            Ok(Some(InvalidError { errors }))
        }
        _ => Ok(None),
    }
}
