//! # 基础设施组合层
//!
//! 负责加载注入器配置、初始化日志，并把注册表、作用域跟踪器和其他注入模块
//! 组装成一个可用的模块链。
//!
//! ## 主要功能
//!
//! - **注入器构建器**: 使用构建者模式组装模块链
//! - **配置源管理**: 叠加配置文件与环境变量
//! - **日志初始化**: 基于 `tracing-subscriber`
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use infrastructure_composition::{InjectorBuilder, LoggingConfig};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let chain = InjectorBuilder::new()
//!         .add_optional_config_file("config/injector.toml")
//!         .add_config_env_vars("LORN_DI")
//!         .with_logging(LoggingConfig::development())
//!         .configure(|registry| {
//!             registry.bind::<u16>(Some("port"))?.to_instance(Arc::new(8080));
//!             Ok(())
//!         })
//!         .build()?;
//!
//!     let port = chain.registry().get::<u16>(Some("port"))?;
//!     println!("端口: {:?}", port);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config_sources;

#[cfg(test)]
#[path = "tests/integration_tests.rs"]
mod integration_tests;

// 重新导出主要类型
pub use builder::{init_logging, InjectorBuilder, LoggingConfig};
pub use config_sources::{
    ConfigSourceDescriptor, InjectorConfigLoader, DEFAULT_ENV_PREFIX, ENV_SEPARATOR,
};

// 重新导出错误类型
pub use infrastructure_common::InfrastructureError;
