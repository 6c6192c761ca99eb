//! 组件生命周期管理

use serde::{Deserialize, Serialize};

/// 组件生命周期类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifetime {
    /// 单例模式 - 首次解析后缓存，直到解绑或重新配置
    Singleton,
    /// 瞬时模式 - 每次解析都创建新实例
    #[default]
    Transient,
}

impl Lifetime {
    /// 从单例标记转换
    pub fn from_singleton(singleton: bool) -> Self {
        if singleton {
            Self::Singleton
        } else {
            Self::Transient
        }
    }

    /// 是否为单例
    pub fn is_singleton(self) -> bool {
        matches!(self, Self::Singleton)
    }
}

/// 可释放能力
///
/// 解绑或释放注册表时，提供者会对缓存的实例调用 [`Disposable::dispose`]。
pub trait Disposable: Send + Sync {
    /// 释放资源
    fn dispose(&self);
}

/// 提供者解析状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    /// 未配置
    Unconfigured,
    /// 已配置，尚未解析
    Configured,
    /// 解析中
    Resolving,
    /// 已解析并缓存
    Resolved,
}

impl std::fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Unconfigured => "未配置",
            Self::Configured => "已配置",
            Self::Resolving => "解析中",
            Self::Resolved => "已解析",
        };
        f.write_str(text)
    }
}
