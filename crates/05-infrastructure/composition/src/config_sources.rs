//! 注入器配置源管理
//!
//! 按顺序叠加配置源：默认值 → 配置文件 → 环境变量，后加入的源覆盖先前的值。

use infrastructure_common::{ConfigError, ConfigResult, InjectorConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// 默认环境变量前缀，例如 `LORN_DI__NAME`、`LORN_DI__LOOKUP__SEARCH_AGGREGATED`
pub const DEFAULT_ENV_PREFIX: &str = "LORN_DI";

/// 环境变量层级分隔符
pub const ENV_SEPARATOR: &str = "__";

/// 配置源描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSourceDescriptor {
    /// 配置文件，格式由扩展名决定（toml / json）
    File { path: PathBuf, required: bool },
    /// 带前缀的环境变量
    Environment { prefix: String },
}

/// 注入器配置加载器
#[derive(Debug, Clone, Default)]
pub struct InjectorConfigLoader {
    sources: Vec<ConfigSourceDescriptor>,
}

impl InjectorConfigLoader {
    /// 创建不含任何配置源的加载器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加必需的配置文件
    pub fn add_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(ConfigSourceDescriptor::File {
            path: path.as_ref().to_path_buf(),
            required: true,
        });
        self
    }

    /// 添加可选的配置文件
    pub fn add_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        self.sources.push(ConfigSourceDescriptor::File {
            path: path.as_ref().to_path_buf(),
            required: false,
        });
        self
    }

    /// 添加环境变量配置源
    pub fn add_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.sources.push(ConfigSourceDescriptor::Environment {
            prefix: prefix.into(),
        });
        self
    }

    /// 已添加的配置源
    pub fn sources(&self) -> &[ConfigSourceDescriptor] {
        &self.sources
    }

    /// 加载并验证配置
    pub fn load(&self) -> ConfigResult<InjectorConfig> {
        let mut builder = config::Config::builder();
        for source in &self.sources {
            match source {
                ConfigSourceDescriptor::File { path, required } => {
                    if *required && !path.exists() {
                        return Err(ConfigError::FileNotFound {
                            path: path.display().to_string(),
                        });
                    }
                    debug!("添加配置文件: {}", path.display());
                    builder = builder.add_source(config::File::from(path.as_path()).required(*required));
                }
                ConfigSourceDescriptor::Environment { prefix } => {
                    debug!("添加环境变量配置源，前缀: {}", prefix);
                    builder = builder.add_source(
                        config::Environment::with_prefix(prefix)
                            .separator(ENV_SEPARATOR)
                            .try_parsing(true),
                    );
                }
            }
        }

        let settings = builder.build().map_err(ConfigError::parse_error)?;
        let config: InjectorConfig = settings
            .try_deserialize()
            .map_err(ConfigError::parse_error)?;
        config.validate()?;
        info!("注入器配置加载完成: {}", config.name);
        Ok(config)
    }
}
