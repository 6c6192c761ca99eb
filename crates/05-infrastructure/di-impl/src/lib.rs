//! # 依赖注入具体实现
//!
//! 提供绑定注册表、提供者状态机、上下文作用域跟踪器和注入模块链。
//!
//! ## 使用示例
//!
//! ```rust
//! use di_impl::BindingRegistry;
//! use std::sync::Arc;
//!
//! trait Logger: Send + Sync {
//!     fn name(&self) -> &str;
//! }
//!
//! struct ConsoleLogger;
//!
//! impl Logger for ConsoleLogger {
//!     fn name(&self) -> &str {
//!         "console"
//!     }
//! }
//!
//! let registry = BindingRegistry::new("app");
//! registry
//!     .bind::<dyn Logger>(None)?
//!     .to_func(|_| Ok(Arc::new(ConsoleLogger) as Arc<dyn Logger>), true);
//!
//! let first = registry.get::<dyn Logger>(None)?.unwrap();
//! let second = registry.get::<dyn Logger>(None)?.unwrap();
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(first.name(), "console");
//! # Ok::<(), infrastructure_common::DependencyError>(())
//! ```

pub mod aggregation;
pub mod binding;
pub mod composite;
pub mod method_cache;
pub mod module_chain;
pub mod parameters;
pub mod provider;
pub mod registry;
pub mod scope_tracker;

pub use aggregation::AggregationWalk;
pub use binding::{Binding, BindingEntry};
pub use composite::expand_composite;
pub use method_cache::MethodCache;
pub use module_chain::ModuleChain;
pub use parameters::{construct, resolve_arguments};
pub use provider::{FactoryFn, Provider};
pub use registry::BindingRegistry;
pub use scope_tracker::{InjectionHost, ScopeTracker};
