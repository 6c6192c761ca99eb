//! # Infrastructure Common
//!
//! 这个 crate 提供了 Lorn ADSP 控制反转运行时的公共类型和工具。
//!
//! ## 核心内容
//!
//! - [`TypeKey`] / [`BindingKey`] - 类型标识与绑定键
//! - [`ProvidedInstance`] - 类型擦除后的实例及其释放能力
//! - [`Disposable`] - 可释放能力
//! - [`InjectorConfig`] - 注入器配置
//! - [`MethodConvention`] - 注入方法命名约定
//! - [`DependencyError`] - 依赖注入错误

pub mod configuration;
pub mod conventions;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use configuration::*;
pub use conventions::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;
