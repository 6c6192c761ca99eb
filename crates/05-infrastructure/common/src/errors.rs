//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建解析错误
    pub fn parse_error(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ParseError {
            source: Box::new(source),
        }
    }

    /// 创建验证错误
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("绑定配置无效: {message}")]
    InvalidConfiguration { message: String },

    #[error("组件未注册: {type_name}{}", format_identifier(.identifier))]
    ComponentNotRegistered {
        type_name: String,
        identifier: Option<String>,
    },

    #[error("检测到循环依赖: {type_name}{}", format_identifier(.identifier))]
    CircularDependency {
        type_name: String,
        identifier: Option<String>,
    },

    #[error("构造函数不存在: {type_name} 共声明 {available} 个构造函数, 请求索引 {index}")]
    ConstructorNotFound {
        type_name: String,
        index: usize,
        available: usize,
    },

    #[error("类型转换失败: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("组件创建失败: {type_name}, 原因: {source}")]
    ComponentCreationFailed {
        type_name: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("注入宿主已释放: {module}")]
    HostUnavailable { module: String },
}

impl DependencyError {
    /// 创建配置错误
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// 创建组件创建失败错误
    pub fn creation_failed(
        type_name: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ComponentCreationFailed {
            type_name: type_name.into(),
            source: source.into(),
        }
    }

    /// 是否为循环依赖错误
    pub fn is_circular(&self) -> bool {
        matches!(self, Self::CircularDependency { .. })
    }
}

fn format_identifier(identifier: &Option<String>) -> String {
    match identifier {
        Some(id) => format!(" (标识符: {id})"),
        None => String::new(),
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_dependency_message_names_identifier() {
        let err = DependencyError::CircularDependency {
            type_name: "ServiceA".to_string(),
            identifier: Some("primary".to_string()),
        };
        let message = err.to_string();
        assert!(message.contains("ServiceA"));
        assert!(message.contains("primary"));
        assert!(err.is_circular());

        let anonymous = DependencyError::CircularDependency {
            type_name: "ServiceB".to_string(),
            identifier: None,
        };
        assert!(!anonymous.to_string().contains("标识符"));
    }

    #[test]
    fn test_infrastructure_error_from_dependency_error() {
        let err: InfrastructureError = DependencyError::invalid_configuration("空标识符").into();
        assert!(matches!(err, InfrastructureError::DependencyError { .. }));
    }
}
