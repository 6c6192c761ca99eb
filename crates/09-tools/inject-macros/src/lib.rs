//! # Inject Macros
//!
//! 这个 crate 提供了生成构造函数描述和注入方法描述的过程宏，
//! 代替运行时反射完成构造函数发现与参数标识符标记。
//!
//! ## 核心宏
//!
//! - [`Injectable`] - 为结构体生成 `Injectable` 实现，每个字段对应一个构造参数
//! - [`macro@injection_target`] - 为固有 impl 块生成 `InjectionTarget` 实现
//!
//! ## 使用示例
//!
//! ```rust,ignore
//! use inject_macros::{injection_target, Injectable};
//! use std::sync::Arc;
//!
//! #[derive(Injectable)]
//! pub struct RetryingClient {
//!     #[inject(id = "retries", default = 3)]
//!     retries: u32,
//!     logger: Option<Arc<dyn Logger>>,
//! }
//!
//! #[injection_target]
//! impl Widget {
//!     fn inject_logger(&self, #[inject(id = "console")] logger: Option<Arc<dyn Logger>>) {
//!         // ...
//!     }
//! }
//! ```

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput, ItemImpl};

mod injectable;
mod target;
mod utils;

/// 生成 `Injectable` 实现
///
/// 每个字段都是构造函数的一个参数，字段类型需实现 `FromArgument`
/// （`Option<Arc<T>>` 或基础值类型）。
///
/// # 参数
///
/// - 字段上 `#[inject(id = "name")]` - 标识符标记，可以重复，解析时取第一个
/// - 字段上 `#[inject(default = expr)]` - 无法解析时使用的默认值
/// - 字段上 `#[inject(skip)]` - 不作为参数，使用 `Default::default()`
/// - 结构体上 `#[inject(disposable)]` - 类型实现了 `Disposable`，释放绑定时调用
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    injectable::derive_injectable_impl(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

/// 生成 `InjectionTarget` 实现
///
/// impl 块中所有不带泛型参数的同步 `&self` 方法都会作为候选注入方法，
/// 是否调用由注册表的命名约定决定。方法参数可以使用 `#[inject(id = ..)]`
/// 和 `#[inject(default = ..)]`，方法本身可以使用 `#[inject(skip)]` 排除。
///
/// # 参数
///
/// - `composite` - 类型实现了 `CompositeObject`
/// - `scope_aware` - 类型实现了 `ScopeAware`
#[proc_macro_attribute]
pub fn injection_target(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut target_args = target::TargetArgs::default();
    let parser = syn::meta::parser(|meta| target_args.parse(meta));
    parse_macro_input!(args with parser);
    let item = parse_macro_input!(input as ItemImpl);
    target::injection_target_impl(target_args, item)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
