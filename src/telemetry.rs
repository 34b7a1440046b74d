//! Copyright (c) 2025-2026, Kirky.X
//!
//! MIT License
//!
//! 该模块定义了日志初始化。

use tracing_subscriber::EnvFilter;

/// 初始化 tracing 日志
///
/// 此函数应该在应用程序启动时调用一次。`RUST_LOG` 环境变量优先于 `default_filter`。
///
/// # 参数
///
/// * `default_filter` - 默认过滤规则 (例如 "info" 或 "oxembed=debug")
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    // 注意：库中可能已有其他 subscriber，重复初始化时忽略错误
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
