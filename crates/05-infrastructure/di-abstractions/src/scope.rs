//! 上下文作用域抽象
//!
//! 上下文对象可以把运行时派生出的辅助对象注入到自己的作用域中，
//! 并在上下文结束时一次性移除它们。

use crate::target::{InjectionTarget, SharedObject};
use infrastructure_common::DependencyResult;
use std::fmt;
use std::sync::{Arc, Weak};

/// 上下文作用域操作
pub trait ContextScope: Send + Sync {
    /// 注入对象并记录到上下文下
    fn inject_for_context(&self, context: &SharedObject, object: SharedObject) -> DependencyResult<()>;

    /// 移除对象并从上下文记录中删除
    fn remove_from_context(&self, context: &SharedObject, object: &SharedObject) -> DependencyResult<()>;

    /// 移除上下文下记录的所有对象并删除该上下文的记录
    fn clear_context(&self, context: &SharedObject) -> DependencyResult<()>;
}

/// 作用域注入能力
///
/// 对象被注入时会收到绑定到 (自身, 跟踪器) 的 [`ScopeHandle`]。
pub trait ScopeAware: Send + Sync {
    /// 接收作用域句柄
    fn attach_scope(&self, handle: ScopeHandle);
}

/// 作用域句柄
///
/// 只持有弱引用，跟踪器或上下文被释放后所有操作返回 `Ok(false)`。
#[derive(Clone)]
pub struct ScopeHandle {
    context: Weak<dyn InjectionTarget>,
    scope: Weak<dyn ContextScope>,
}

impl ScopeHandle {
    /// 创建句柄
    pub fn new(context: &SharedObject, scope: Weak<dyn ContextScope>) -> Self {
        Self {
            context: Arc::downgrade(context),
            scope,
        }
    }

    fn upgrade(&self) -> Option<(SharedObject, Arc<dyn ContextScope>)> {
        Some((self.context.upgrade()?, self.scope.upgrade()?))
    }

    /// 句柄是否仍然有效
    pub fn is_alive(&self) -> bool {
        self.upgrade().is_some()
    }

    /// 注入对象到当前上下文
    pub fn inject(&self, object: SharedObject) -> DependencyResult<bool> {
        let Some((context, scope)) = self.upgrade() else {
            return Ok(false);
        };
        scope.inject_for_context(&context, object)?;
        Ok(true)
    }

    /// 从当前上下文移除对象
    pub fn remove(&self, object: &SharedObject) -> DependencyResult<bool> {
        let Some((context, scope)) = self.upgrade() else {
            return Ok(false);
        };
        scope.remove_from_context(&context, object)?;
        Ok(true)
    }

    /// 清空当前上下文
    pub fn clear(&self) -> DependencyResult<bool> {
        let Some((context, scope)) = self.upgrade() else {
            return Ok(false);
        };
        scope.clear_context(&context)?;
        Ok(true)
    }
}

impl fmt::Debug for ScopeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopeHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}
