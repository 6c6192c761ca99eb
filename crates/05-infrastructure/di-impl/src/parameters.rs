//! 构造函数与注入方法共用的参数解析规则
//!
//! 每个参数最多读取一个标识符标记（多于一个时记录错误并使用第一个）；
//! 能解析出值则使用该值，否则使用声明的默认值，再否则记录警告并以空值代替。
//! 查找未命中不会中断构造，但循环依赖等解析错误会直接向上传播。

use di_abstractions::{Arguments, ComponentResolver, Injectable, ParameterInfo};
use infrastructure_common::{DependencyError, DependencyResult, Instance, LookupOptions};
use tracing::{error, warn};

/// 解析参数列表
pub fn resolve_arguments(
    resolver: &dyn ComponentResolver,
    parameters: &[ParameterInfo],
    owner: &str,
) -> DependencyResult<Arguments> {
    let mut values = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        values.push(resolve_parameter(resolver, parameter, owner)?);
    }
    Ok(Arguments::new(values))
}

fn resolve_parameter(
    resolver: &dyn ComponentResolver,
    parameter: &ParameterInfo,
    owner: &str,
) -> DependencyResult<Option<Instance>> {
    let identifiers = parameter.identifiers();
    if identifiers.len() > 1 {
        error!(
            "{} 的参数 {} 声明了多个标识符标记 {:?}, 使用第一个",
            owner,
            parameter.name(),
            identifiers
        );
    }
    let identifier = identifiers.first().map(String::as_str);
    let type_key = parameter.type_key();
    let options = LookupOptions::default();

    if resolver.can_resolve(type_key, identifier, options) {
        // 绑定存在但尚未配置时解析为空，继续回落到默认值
        if let Some(value) = resolver.resolve_erased(type_key, identifier, options)? {
            return Ok(Some(value));
        }
    }
    if let Some(default) = parameter.default_value() {
        return Ok(Some(default));
    }
    warn!(
        "无法解析 {} 的参数 {}: {}{}, 使用空值",
        owner,
        parameter.name(),
        type_key,
        identifier.map(|id| format!("[\"{id}\"]")).unwrap_or_default()
    );
    Ok(None)
}

/// 按索引选择构造函数，解析其参数并直接调用，结果不会自动注册
pub fn construct<C: Injectable>(resolver: &dyn ComponentResolver, index: usize) -> DependencyResult<C> {
    let type_name = std::any::type_name::<C>();
    let constructors = C::constructors();
    let available = constructors.len();
    let constructor = constructors
        .into_iter()
        .nth(index)
        .ok_or_else(|| DependencyError::ConstructorNotFound {
            type_name: type_name.to_string(),
            index,
            available,
        })?;
    let arguments = resolve_arguments(resolver, constructor.parameters(), type_name)?;
    Ok(constructor.invoke(&arguments))
}
