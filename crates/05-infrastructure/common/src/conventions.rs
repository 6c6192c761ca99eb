//! 约定规范定义
//!
//! 决定目标类型上的哪些方法属于注入方法

/// 注入方法命名约定
///
/// 模式支持单个 `*` 通配符，例如 `inject*`、`*_deps`。不含通配符时按全名匹配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodConvention {
    pattern: String,
}

impl MethodConvention {
    /// 默认模式
    pub const DEFAULT_PATTERN: &'static str = "inject*";

    /// 创建新的命名约定
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
        }
    }

    /// 模式
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// 检查方法名是否匹配此约定
    pub fn matches(&self, method_name: &str) -> bool {
        let pattern_parts: Vec<&str> = self.pattern.split('*').collect();

        match pattern_parts.as_slice() {
            [exact] => method_name == *exact,
            [prefix, suffix] => {
                method_name.len() >= prefix.len() + suffix.len()
                    && method_name.starts_with(prefix)
                    && method_name.ends_with(suffix)
            }
            _ => false,
        }
    }
}

impl Default for MethodConvention {
    fn default() -> Self {
        Self::new(Self::DEFAULT_PATTERN)
    }
}
