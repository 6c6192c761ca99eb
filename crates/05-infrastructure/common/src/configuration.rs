//! 配置相关的基础定义

use crate::conventions::MethodConvention;
use crate::errors::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// 查找选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LookupOptions {
    /// 是否允许按派生类型匹配
    pub include_derived_types: bool,
    /// 是否搜索聚合的注册表
    pub search_aggregated: bool,
}

impl LookupOptions {
    /// 仅精确匹配本地绑定
    pub const fn local_exact() -> Self {
        Self {
            include_derived_types: false,
            search_aggregated: false,
        }
    }

    /// 设置是否允许派生类型匹配
    pub const fn with_derived_types(mut self, include: bool) -> Self {
        self.include_derived_types = include;
        self
    }

    /// 设置是否搜索聚合注册表
    pub const fn with_aggregated(mut self, search: bool) -> Self {
        self.search_aggregated = search;
        self
    }
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self {
            include_derived_types: true,
            search_aggregated: true,
        }
    }
}

/// 注入器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// 根注册表名称
    pub name: String,
    /// 是否启用作用域跟踪模块
    pub enable_scope_tracker: bool,
    /// 默认查找选项
    pub lookup: LookupOptions,
    /// 注入方法命名模式
    pub injection_method_pattern: String,
    /// 构建完成后是否输出模块状态
    pub log_modules_on_build: bool,
}

impl Default for InjectorConfig {
    fn default() -> Self {
        Self {
            name: "root".to_string(),
            enable_scope_tracker: true,
            lookup: LookupOptions::default(),
            injection_method_pattern: MethodConvention::DEFAULT_PATTERN.to_string(),
            log_modules_on_build: false,
        }
    }
}

impl InjectorConfig {
    /// 从 TOML 文本解析
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text).map_err(ConfigError::parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文本解析
    pub fn from_json_str(text: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(text).map_err(ConfigError::parse_error)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> ConfigResult<()> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::validation_error("注册表名称不能为空"));
        }
        if self.injection_method_pattern.trim().is_empty() {
            return Err(ConfigError::validation_error("注入方法命名模式不能为空"));
        }
        if self.injection_method_pattern.matches('*').count() > 1 {
            return Err(ConfigError::validation_error(format!(
                "注入方法命名模式最多包含一个通配符: {}",
                self.injection_method_pattern
            )));
        }
        Ok(())
    }

    /// 注入方法命名约定
    pub fn method_convention(&self) -> MethodConvention {
        MethodConvention::new(self.injection_method_pattern.clone())
    }
}
