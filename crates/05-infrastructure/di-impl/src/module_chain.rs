//! 注入模块链
//!
//! 按顺序把 Inject / Remove 广播给所有模块。默认包含两个模块：
//! 位于索引 0 的 [`ScopeTracker`] 和随后的 [`BindingRegistry`]。

use crate::composite::expand_composite;
use crate::registry::BindingRegistry;
use crate::scope_tracker::{InjectionHost, ScopeTracker};
use di_abstractions::{InjectionModule, SharedObject};
use infrastructure_common::{DependencyResult, InjectorConfig};
use parking_lot::Mutex;
use std::fmt::Write as _;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

fn module_ptr(module: &Arc<dyn InjectionModule>) -> *const () {
    Arc::as_ptr(module) as *const ()
}

/// 注入模块链
pub struct ModuleChain {
    registry: Arc<BindingRegistry>,
    scope_tracker: Option<Arc<ScopeTracker>>,
    modules: Mutex<Vec<Arc<dyn InjectionModule>>>,
}

impl ModuleChain {
    /// 创建模块链：作用域跟踪器在前，注册表在后
    pub fn new(registry: Arc<BindingRegistry>) -> Arc<Self> {
        Self::assemble(registry, true)
    }

    /// 创建不含作用域跟踪器的模块链
    pub fn without_scope_tracker(registry: Arc<BindingRegistry>) -> Arc<Self> {
        Self::assemble(registry, false)
    }

    /// 按配置创建模块链
    pub fn from_config(config: &InjectorConfig) -> Arc<Self> {
        let registry = Arc::new(BindingRegistry::from_config(config));
        Self::assemble(registry, config.enable_scope_tracker)
    }

    fn assemble(registry: Arc<BindingRegistry>, with_scope_tracker: bool) -> Arc<Self> {
        Arc::new_cyclic(|chain: &Weak<ModuleChain>| {
            let mut modules: Vec<Arc<dyn InjectionModule>> = Vec::new();
            let scope_tracker = with_scope_tracker.then(|| {
                let host: Weak<dyn InjectionHost> = chain.clone();
                let tracker = ScopeTracker::new(host);
                modules.push(tracker.clone());
                tracker
            });
            modules.push(registry.clone());
            debug!("创建模块链 {}: {} 个模块", registry.name(), modules.len());
            Self {
                registry,
                scope_tracker,
                modules: Mutex::new(modules),
            }
        })
    }

    /// 模块链使用的注册表
    pub fn registry(&self) -> &Arc<BindingRegistry> {
        &self.registry
    }

    /// 模块链的作用域跟踪器
    pub fn scope_tracker(&self) -> Option<&Arc<ScopeTracker>> {
        self.scope_tracker.as_ref()
    }

    /// 当前模块（按通知顺序）
    pub fn modules(&self) -> Vec<Arc<dyn InjectionModule>> {
        self.modules.lock().clone()
    }

    /// 追加模块
    pub fn add_module(&self, module: Arc<dyn InjectionModule>) {
        debug!("模块链追加模块 {}", module.module_name());
        self.modules.lock().push(module);
    }

    /// 在指定位置插入模块，索引超出范围时追加到末尾
    pub fn insert_module(&self, index: usize, module: Arc<dyn InjectionModule>) {
        let mut modules = self.modules.lock();
        let index = index.min(modules.len());
        debug!("模块链在位置 {} 插入模块 {}", index, module.module_name());
        modules.insert(index, module);
    }

    /// 移除模块；返回模块之前是否在链中
    pub fn remove_module(&self, module: &Arc<dyn InjectionModule>) -> bool {
        let mut modules = self.modules.lock();
        let before = modules.len();
        modules.retain(|existing| module_ptr(existing) != module_ptr(module));
        modules.len() != before
    }

    /// 注入对象；复合对象先展开，再逐个广播给所有模块
    pub fn inject(&self, object: &SharedObject) -> DependencyResult<()> {
        let modules = self.modules();
        for leaf in expand_composite(object) {
            for module in &modules {
                module.inject(&leaf)?;
            }
        }
        Ok(())
    }

    /// 移除对象；复合对象先展开，再逐个广播给所有模块
    pub fn remove(&self, object: &SharedObject) -> DependencyResult<()> {
        let modules = self.modules();
        for leaf in expand_composite(object) {
            for module in &modules {
                module.remove(&leaf)?;
            }
        }
        Ok(())
    }

    /// 深拷贝模块链
    ///
    /// 注册表与其他可拷贝模块逐个深拷贝；作用域跟踪器持有指向本链的引用，
    /// 在新链中重新创建并保持原来的位置；不支持拷贝的模块会被跳过。
    pub fn clone_chain(&self) -> Arc<Self> {
        let registry = Arc::new(BindingRegistry::clone(&self.registry));
        let registry_ptr = Arc::as_ptr(&self.registry) as *const ();
        let tracker_ptr = self
            .scope_tracker
            .as_ref()
            .map(|tracker| Arc::as_ptr(tracker) as *const ());
        let source = self.modules();

        Arc::new_cyclic(|chain: &Weak<ModuleChain>| {
            let mut scope_tracker = None;
            let mut modules: Vec<Arc<dyn InjectionModule>> = Vec::with_capacity(source.len());
            for module in &source {
                let ptr = module_ptr(module);
                if ptr == registry_ptr {
                    modules.push(registry.clone());
                } else if Some(ptr) == tracker_ptr {
                    let host: Weak<dyn InjectionHost> = chain.clone();
                    let tracker = ScopeTracker::new(host);
                    modules.push(tracker.clone());
                    scope_tracker = Some(tracker);
                } else {
                    match module.clone_module() {
                        Some(cloned) => modules.push(cloned),
                        None => warn!("模块 {} 不支持拷贝, 已跳过", module.module_name()),
                    }
                }
            }
            Self {
                registry,
                scope_tracker,
                modules: Mutex::new(modules),
            }
        })
    }

    /// 输出所有模块的状态，同时以 info 级别记录
    pub fn log(&self) -> String {
        let modules = self.modules();
        let mut out = format!("ModuleChain \"{}\": {} 个模块", self.registry.name(), modules.len());
        for (index, module) in modules.iter().enumerate() {
            let _ = write!(out, "\n[{}] {}", index, module.describe());
        }
        info!("{}", out);
        out
    }

    /// 释放作用域跟踪器与注册表
    pub fn dispose(&self) {
        if let Some(tracker) = &self.scope_tracker {
            tracker.dispose();
        }
        self.registry.dispose();
    }
}

impl InjectionHost for ModuleChain {
    fn inject(&self, object: &SharedObject) -> DependencyResult<()> {
        ModuleChain::inject(self, object)
    }

    fn remove(&self, object: &SharedObject) -> DependencyResult<()> {
        ModuleChain::remove(self, object)
    }
}

impl std::fmt::Debug for ModuleChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self
            .modules()
            .iter()
            .map(|module| module.module_name().to_string())
            .collect();
        f.debug_struct("ModuleChain")
            .field("registry", &self.registry.name())
            .field("modules", &names)
            .finish()
    }
}
