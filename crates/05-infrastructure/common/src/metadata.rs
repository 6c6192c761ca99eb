//! 元数据定义
//!
//! 提供类型标识、绑定键以及类型擦除后的实例表示

use crate::errors::{DependencyError, DependencyResult};
use crate::lifecycle::Disposable;
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// 类型标识
///
/// 相等性与哈希只取决于 [`TypeId`]，名称仅用于诊断输出。
/// trait 对象（例如 `dyn Logger`）同样可以作为类型标识。
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// 从类型获取类型标识
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// 类型ID
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// 完整类型名称
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// 获取简短的类型名称（不包含模块路径）
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        match base.rfind("::") {
            Some(pos) => &self.name[pos + 2..],
            None => self.name,
        }
    }

    /// 是否为指定类型
    pub fn is<T: ?Sized + 'static>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// 绑定键：(类型, 可选标识符)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BindingKey {
    /// 类型标识
    pub type_key: TypeKey,
    /// 标识符
    pub identifier: Option<String>,
}

impl BindingKey {
    /// 创建绑定键，标识符为空白字符串时返回配置错误
    pub fn new(type_key: TypeKey, identifier: Option<&str>) -> DependencyResult<Self> {
        validate_identifier(type_key, identifier)?;
        Ok(Self {
            type_key,
            identifier: identifier.map(str::to_string),
        })
    }

    /// 从类型创建绑定键
    pub fn of<T: ?Sized + 'static>(identifier: Option<&str>) -> DependencyResult<Self> {
        Self::new(TypeKey::of::<T>(), identifier)
    }

    /// 判断是否与查询的标识符一致
    pub fn identifier_matches(&self, identifier: Option<&str>) -> bool {
        self.identifier.as_deref() == identifier
    }
}

impl fmt::Display for BindingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identifier {
            Some(id) => write!(f, "{}[\"{}\"]", self.type_key, id),
            None => write!(f, "{}", self.type_key),
        }
    }
}

/// 校验标识符
pub fn validate_identifier(type_key: TypeKey, identifier: Option<&str>) -> DependencyResult<()> {
    match identifier {
        Some(id) if id.trim().is_empty() => Err(DependencyError::invalid_configuration(format!(
            "类型 {type_key} 的标识符不能为空"
        ))),
        _ => Ok(()),
    }
}

/// 类型擦除后的实例，内部保存 `Arc<T>`
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 擦除实例类型
pub fn erase<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Instance {
    Arc::new(value)
}

/// 还原实例类型
pub fn downcast_instance<T: ?Sized + 'static>(instance: &Instance) -> Option<Arc<T>> {
    instance.downcast_ref::<Arc<T>>().cloned()
}

/// 释放钩子
pub type DisposeHook = Arc<dyn Fn() + Send + Sync>;

/// 提供者产出的实例
///
/// 携带生成时捕获的释放能力（如果有）。
#[derive(Clone)]
pub struct ProvidedInstance {
    value: Instance,
    disposer: Option<DisposeHook>,
}

impl ProvidedInstance {
    /// 不可释放的实例
    pub fn new<T: ?Sized + Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            value: erase(value),
            disposer: None,
        }
    }

    /// 可释放的实例
    pub fn disposable<T: ?Sized + Disposable + Send + Sync + 'static>(value: Arc<T>) -> Self {
        let target = value.clone();
        Self {
            value: erase(value),
            disposer: Some(Arc::new(move || target.dispose())),
        }
    }

    /// 由已擦除的值和释放钩子组装
    pub fn from_parts(value: Instance, disposer: Option<DisposeHook>) -> Self {
        Self { value, disposer }
    }

    /// 擦除后的值
    pub fn value(&self) -> &Instance {
        &self.value
    }

    /// 还原为具体类型
    pub fn downcast<T: ?Sized + 'static>(&self) -> Option<Arc<T>> {
        downcast_instance::<T>(&self.value)
    }

    /// 是否具备释放能力
    pub fn is_disposable(&self) -> bool {
        self.disposer.is_some()
    }

    /// 释放钩子
    pub fn disposer(&self) -> Option<&DisposeHook> {
        self.disposer.as_ref()
    }

    /// 调用释放钩子
    pub fn dispose(&self) {
        if let Some(disposer) = &self.disposer {
            disposer();
        }
    }

    /// 判断两个实例是否指向同一对象
    pub fn same_instance(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for ProvidedInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvidedInstance")
            .field("disposable", &self.is_disposable())
            .finish_non_exhaustive()
    }
}
