//! 宏工具函数

use syn::{Attribute, Expr, LitStr, Result};

/// `#[inject(...)]` 参数
#[derive(Default)]
pub struct InjectArgs {
    /// 标识符标记，按声明顺序
    pub identifiers: Vec<LitStr>,
    /// 默认值表达式
    pub default: Option<Expr>,
    /// 是否跳过
    pub skip: bool,
}

/// 解析并收集 `#[inject(...)]` 参数
///
/// 支持 `id = "..."`（可重复）、`default = expr` 和 `skip`。
pub fn parse_inject_attrs(attrs: &[Attribute]) -> Result<InjectArgs> {
    let mut args = InjectArgs::default();
    for attr in attrs.iter().filter(|attr| is_inject_attr(attr)) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("id") {
                args.identifiers.push(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("default") {
                args.default = Some(meta.value()?.parse()?);
                Ok(())
            } else if meta.path.is_ident("skip") {
                args.skip = true;
                Ok(())
            } else {
                Err(meta.error("不支持的 inject 参数, 可用: id = \"...\", default = <表达式>, skip"))
            }
        })?;
    }
    Ok(args)
}

/// 是否为 `#[inject(...)]` 属性
pub fn is_inject_attr(attr: &Attribute) -> bool {
    attr.path().is_ident("inject")
}

/// 移除 `#[inject(...)]` 属性
pub fn strip_inject_attrs(attrs: &mut Vec<Attribute>) {
    attrs.retain(|attr| !is_inject_attr(attr));
}
