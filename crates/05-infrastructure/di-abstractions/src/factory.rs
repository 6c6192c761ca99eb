//! 组件构造抽象
//!
//! 构造函数与注入方法共用的参数描述、实参列表，以及可注入类型 trait

use infrastructure_common::{downcast_instance, erase, Disposable, Instance, TypeKey};
use std::fmt;
use std::sync::Arc;

/// 参数默认值函数
pub type DefaultValueFn = Arc<dyn Fn() -> Instance + Send + Sync>;

/// 参数描述
///
/// 对应构造函数或注入方法上的一个参数：参数类型、标识符标记以及声明的默认值。
/// 标识符标记可以声明多个，解析时只取第一个。
#[derive(Clone)]
pub struct ParameterInfo {
    name: &'static str,
    type_key: TypeKey,
    identifiers: Vec<String>,
    default: Option<DefaultValueFn>,
}

impl ParameterInfo {
    /// 创建指定类型的参数描述
    pub fn of<T: ?Sized + 'static>(name: &'static str) -> Self {
        Self {
            name,
            type_key: TypeKey::of::<T>(),
            identifiers: Vec::new(),
            default: None,
        }
    }

    /// 添加标识符标记
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifiers.push(identifier.into());
        self
    }

    /// 声明默认值
    pub fn with_default<V, F>(mut self, default: F) -> Self
    where
        V: Send + Sync + 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        self.default = Some(Arc::new(move || erase(Arc::new(default()))));
        self
    }

    /// 参数名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 参数类型
    pub fn type_key(&self) -> TypeKey {
        self.type_key
    }

    /// 全部标识符标记
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// 是否声明了默认值
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }

    /// 生成默认值
    pub fn default_value(&self) -> Option<Instance> {
        self.default.as_ref().map(|default| default())
    }
}

impl fmt::Debug for ParameterInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterInfo")
            .field("name", &self.name)
            .field("type_key", &self.type_key)
            .field("identifiers", &self.identifiers)
            .field("has_default", &self.has_default())
            .finish()
    }
}

/// 解析后的实参列表，缺失的参数为 `None`
#[derive(Clone, Default)]
pub struct Arguments {
    values: Vec<Option<Instance>>,
}

impl Arguments {
    /// 创建实参列表
    pub fn new(values: Vec<Option<Instance>>) -> Self {
        Self { values }
    }

    /// 参数个数
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 指定位置的参数是否缺失
    pub fn is_absent(&self, index: usize) -> bool {
        self.values.get(index).map_or(true, Option::is_none)
    }

    /// 获取指定位置的参数
    pub fn get<T: ?Sized + 'static>(&self, index: usize) -> Option<Arc<T>> {
        self.values
            .get(index)?
            .as_ref()
            .and_then(downcast_instance::<T>)
    }

    /// 获取指定位置的值参数，缺失时取零值
    pub fn value<T: Clone + Default + 'static>(&self, index: usize) -> T {
        self.get::<T>(index)
            .map(|value| (*value).clone())
            .unwrap_or_default()
    }

    /// 按目标类型转换指定位置的参数
    pub fn argument<A: FromArgument>(&self, index: usize) -> A {
        A::from_argument(self.get::<A::Target>(index))
    }
}

impl fmt::Debug for Arguments {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.values.iter().map(Option::is_some))
            .finish()
    }
}

/// 从解析结果转换为字段或参数值
///
/// `Option<Arc<T>>` 直接保留缺失状态；值类型在缺失时取 `Default::default()`。
pub trait FromArgument: Sized {
    /// 用于查找的类型
    type Target: ?Sized + 'static;

    /// 转换
    fn from_argument(value: Option<Arc<Self::Target>>) -> Self;
}

impl<T: ?Sized + 'static> FromArgument for Option<Arc<T>> {
    type Target = T;

    fn from_argument(value: Option<Arc<T>>) -> Self {
        value
    }
}

macro_rules! impl_from_argument_for_values {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromArgument for $ty {
                type Target = $ty;

                fn from_argument(value: Option<Arc<$ty>>) -> Self {
                    value.map(|value| (*value).clone()).unwrap_or_default()
                }
            }
        )*
    };
}

impl_from_argument_for_values!(
    i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, bool, char, String,
);

/// 构造函数类型
pub type ConstructFn<C> = Arc<dyn Fn(&Arguments) -> C + Send + Sync>;

/// 构造函数描述
pub struct Constructor<C> {
    parameters: Vec<ParameterInfo>,
    construct: ConstructFn<C>,
}

impl<C> Constructor<C> {
    /// 创建构造函数描述
    pub fn new<F>(parameters: Vec<ParameterInfo>, construct: F) -> Self
    where
        F: Fn(&Arguments) -> C + Send + Sync + 'static,
    {
        Self {
            parameters,
            construct: Arc::new(construct),
        }
    }

    /// 参数列表
    pub fn parameters(&self) -> &[ParameterInfo] {
        &self.parameters
    }

    /// 调用构造函数
    pub fn invoke(&self, arguments: &Arguments) -> C {
        (self.construct)(arguments)
    }
}

impl<C> Clone for Constructor<C> {
    fn clone(&self) -> Self {
        Self {
            parameters: self.parameters.clone(),
            construct: self.construct.clone(),
        }
    }
}

impl<C> fmt::Debug for Constructor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .field("construct", &"<function>")
            .finish()
    }
}

/// 可注入组件 trait
///
/// 声明类型自身的构造函数列表，按索引选择。可以手写实现，也可以使用
/// `inject-macros` 提供的 `#[derive(Injectable)]`。
pub trait Injectable: Send + Sync + Sized + 'static {
    /// 构造函数列表
    fn constructors() -> Vec<Constructor<Self>>;

    /// 可释放能力
    fn as_disposable(&self) -> Option<&dyn Disposable> {
        None
    }
}
