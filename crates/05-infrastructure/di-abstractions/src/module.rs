//! 注入模块抽象接口

use crate::target::SharedObject;
use infrastructure_common::DependencyResult;
use std::any::Any;
use std::sync::Arc;

/// 注入模块 trait
///
/// 模块链在每次 Inject / Remove 时按顺序通知所有模块。
pub trait InjectionModule: Send + Sync {
    /// 模块名称
    fn module_name(&self) -> &str;

    /// 注入对象
    fn inject(&self, target: &SharedObject) -> DependencyResult<()>;

    /// 移除对象
    fn remove(&self, target: &SharedObject) -> DependencyResult<()>;

    /// 深拷贝模块
    ///
    /// 返回 `None` 表示模块持有指向宿主的身份相关引用，不能拷贝，由宿主重新构建。
    fn clone_module(&self) -> Option<Arc<dyn InjectionModule>>;

    /// 模块状态描述
    fn describe(&self) -> String;

    /// 转换为 `Any`
    fn as_any(&self) -> &dyn Any;
}
