//! 单个绑定的解析状态机
//!
//! 未配置 → (实例 | 构造函数 | 工厂) → 已配置 → 首次解析 → 解析中 → 已解析（单例）或直接返回（瞬时）。
//! 解析中标记是唯一的循环依赖检测手段。

use di_abstractions::ComponentResolver;
use infrastructure_common::{
    BindingKey, DependencyError, DependencyResult, Lifetime, ProvidedInstance, ResolutionState,
    TypeKey,
};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 工厂函数类型
pub type FactoryFn =
    Arc<dyn Fn(&dyn ComponentResolver) -> DependencyResult<ProvidedInstance> + Send + Sync>;

#[derive(Clone)]
enum ProviderSpec {
    Unconfigured,
    Instance,
    Constructor {
        component: TypeKey,
        index: usize,
        build: FactoryFn,
        lifetime: Lifetime,
    },
    Factory {
        build: FactoryFn,
        lifetime: Lifetime,
    },
}

#[derive(Clone)]
struct ProviderState {
    spec: ProviderSpec,
    resolved: bool,
    resolving: bool,
    cached: Option<ProvidedInstance>,
    /// 每次重新配置递增，用于识别解析期间发生的重新配置
    generation: u64,
}

impl ProviderState {
    fn reconfigure(&mut self, spec: ProviderSpec, cached: Option<ProvidedInstance>) {
        self.resolved = cached.is_some();
        self.cached = cached;
        self.spec = spec;
        self.resolving = false;
        self.generation = self.generation.wrapping_add(1);
    }
}

/// 实例提供者
pub struct Provider {
    key: BindingKey,
    state: Mutex<ProviderState>,
}

impl Provider {
    /// 创建未配置的提供者
    pub fn new(key: BindingKey) -> Self {
        Self {
            key,
            state: Mutex::new(ProviderState {
                spec: ProviderSpec::Unconfigured,
                resolved: false,
                resolving: false,
                cached: None,
                generation: 0,
            }),
        }
    }

    /// 绑定键
    pub fn key(&self) -> &BindingKey {
        &self.key
    }

    /// 绑定到固定实例，立即视为已解析的单例
    ///
    /// 之前缓存的值不会被释放，外部实例由调用方负责。
    pub fn to_instance(&self, instance: ProvidedInstance) {
        debug!("绑定 {} 配置为固定实例", self.key);
        self.state
            .lock()
            .reconfigure(ProviderSpec::Instance, Some(instance));
    }

    /// 绑定到构造函数
    pub fn to_constructor(&self, component: TypeKey, index: usize, build: FactoryFn, singleton: bool) {
        let lifetime = Lifetime::from_singleton(singleton);
        debug!(
            "绑定 {} 配置为构造函数 {}#{} ({:?})",
            self.key, component, index, lifetime
        );
        self.state.lock().reconfigure(
            ProviderSpec::Constructor {
                component,
                index,
                build,
                lifetime,
            },
            None,
        );
    }

    /// 绑定到工厂函数
    pub fn to_func(&self, build: FactoryFn, singleton: bool) {
        let lifetime = Lifetime::from_singleton(singleton);
        debug!("绑定 {} 配置为工厂函数 ({:?})", self.key, lifetime);
        self.state
            .lock()
            .reconfigure(ProviderSpec::Factory { build, lifetime }, None);
    }

    /// 当前状态
    pub fn state(&self) -> ResolutionState {
        let state = self.state.lock();
        if state.resolving {
            ResolutionState::Resolving
        } else if state.resolved {
            ResolutionState::Resolved
        } else if matches!(state.spec, ProviderSpec::Unconfigured) {
            ResolutionState::Unconfigured
        } else {
            ResolutionState::Configured
        }
    }

    /// 是否已解析
    pub fn is_resolved(&self) -> bool {
        self.state.lock().resolved
    }

    /// 是否为单例（固定实例视为单例）
    pub fn is_singleton(&self) -> bool {
        match &self.state.lock().spec {
            ProviderSpec::Unconfigured => false,
            ProviderSpec::Instance => true,
            ProviderSpec::Constructor { lifetime, .. } | ProviderSpec::Factory { lifetime, .. } => {
                lifetime.is_singleton()
            }
        }
    }

    /// 解析实例
    ///
    /// 已解析时直接返回缓存；正在解析时返回循环依赖错误。解析完成后如果本绑定在
    /// 解析过程中已被其他调用解析，则以后者的值为准。
    pub fn resolve(&self, resolver: &dyn ComponentResolver) -> DependencyResult<Option<ProvidedInstance>> {
        let (build, lifetime, generation) = {
            let mut state = self.state.lock();
            if state.resolved {
                return Ok(state.cached.clone());
            }
            if state.resolving {
                error!("检测到循环依赖: {}", self.key);
                return Err(DependencyError::CircularDependency {
                    type_name: self.key.type_key.name().to_string(),
                    identifier: self.key.identifier.clone(),
                });
            }
            let (build, lifetime) = match &state.spec {
                ProviderSpec::Unconfigured => {
                    warn!("绑定 {} 尚未配置, 返回空值", self.key);
                    return Ok(None);
                }
                ProviderSpec::Instance => return Ok(state.cached.clone()),
                ProviderSpec::Constructor {
                    build, lifetime, ..
                }
                | ProviderSpec::Factory { build, lifetime } => (build.clone(), *lifetime),
            };
            state.resolving = true;
            (build, lifetime, state.generation)
        };

        let produced = build(resolver);

        let mut state = self.state.lock();
        let reconfigured = state.generation != generation;
        if !reconfigured {
            state.resolving = false;
        }
        let produced = produced?;

        if state.resolved {
            debug!("绑定 {} 在解析期间已被解析, 使用后者的值", self.key);
            return Ok(state.cached.clone());
        }
        if !reconfigured && lifetime.is_singleton() {
            state.cached = Some(produced.clone());
            state.resolved = true;
        }
        Ok(Some(produced))
    }

    /// 释放缓存的实例
    pub fn dispose(&self) {
        let cached = {
            let mut state = self.state.lock();
            let cached = state.cached.take();
            state.reconfigure(ProviderSpec::Unconfigured, None);
            cached
        };
        if let Some(instance) = cached {
            debug!("释放绑定 {} 的缓存实例", self.key);
            instance.dispose();
        }
    }

    /// 状态描述
    pub fn describe(&self) -> String {
        let state = self.state.lock();
        let spec = match &state.spec {
            ProviderSpec::Unconfigured => "未配置".to_string(),
            ProviderSpec::Instance => "固定实例".to_string(),
            ProviderSpec::Constructor {
                component,
                index,
                lifetime,
                ..
            } => format!("构造函数 {component}#{index} ({lifetime:?})"),
            ProviderSpec::Factory { lifetime, .. } => format!("工厂函数 ({lifetime:?})"),
        };
        let status = if state.resolving {
            ResolutionState::Resolving
        } else if state.resolved {
            ResolutionState::Resolved
        } else if matches!(state.spec, ProviderSpec::Unconfigured) {
            ResolutionState::Unconfigured
        } else {
            ResolutionState::Configured
        };
        format!("{} -> {} [{}]", self.key, spec, status)
    }
}

impl Clone for Provider {
    /// 复制配置与缓存状态，克隆体继承已解析的单例
    fn clone(&self) -> Self {
        let mut state = self.state.lock().clone();
        state.resolving = false;
        Self {
            key: self.key.clone(),
            state: Mutex::new(state),
        }
    }
}

impl fmt::Debug for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
