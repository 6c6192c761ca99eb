//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义依赖解析和对象注入的核心接口。
//!
//! ## 核心接口
//!
//! - [`ComponentResolver`] - 依赖解析器接口
//! - [`Injectable`] - 可注入组件（构造函数描述）
//! - [`InjectionTarget`] - 注入目标（注入方法、复合对象、作用域能力）
//! - [`ContextScope`] / [`ScopeHandle`] - 上下文作用域
//! - [`InjectionModule`] - 注入模块

pub mod factory;
pub mod module;
pub mod resolver;
pub mod scope;
pub mod target;

pub use factory::*;
pub use module::*;
pub use resolver::*;
pub use scope::*;
pub use target::*;
