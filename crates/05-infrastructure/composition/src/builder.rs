//! 注入器构建器

use crate::config_sources::InjectorConfigLoader;
use di_abstractions::InjectionModule;
use di_impl::{BindingRegistry, ModuleChain};
use infrastructure_common::{DependencyResult, InfrastructureError, InfrastructureResult, InjectorConfig};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

type Installer = Box<dyn FnOnce(&BindingRegistry) -> DependencyResult<()>>;

/// 注入器构建器
///
/// 使用建造者模式加载配置、初始化日志并组装模块链
pub struct InjectorBuilder {
    /// 配置加载器
    loader: InjectorConfigLoader,
    /// 显式指定的配置，优先于配置源
    config: Option<InjectorConfig>,
    /// 日志配置，未设置时不初始化日志
    logging: Option<LoggingConfig>,
    /// 绑定安装函数
    installers: Vec<Installer>,
    /// 额外的注入模块
    modules: Vec<Arc<dyn InjectionModule>>,
    /// 聚合的注册表
    aggregates: Vec<Arc<BindingRegistry>>,
}

impl InjectorBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            loader: InjectorConfigLoader::new(),
            config: None,
            logging: None,
            installers: Vec::new(),
            modules: Vec::new(),
            aggregates: Vec::new(),
        }
    }

    /// 直接使用指定配置，忽略所有配置源
    pub fn with_config(mut self, config: InjectorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// 添加配置文件（TOML 或 JSON）
    pub fn add_config_file<P: AsRef<Path>>(mut self, path: P) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(InfrastructureError::BootstrapFailed {
                message: format!("配置文件不存在: {}", path.display()),
            });
        }
        info!("添加配置文件: {}", path.display());
        self.loader = self.loader.add_file(path);
        Ok(self)
    }

    /// 添加可选的配置文件
    pub fn add_optional_config_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.loader = self.loader.add_optional_file(path);
        self
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.loader = self.loader.add_env_prefix(prefix);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 添加绑定安装函数，构建时按添加顺序在根注册表上执行
    pub fn configure<F>(mut self, installer: F) -> Self
    where
        F: FnOnce(&BindingRegistry) -> DependencyResult<()> + 'static,
    {
        self.installers.push(Box::new(installer));
        self
    }

    /// 追加注入模块
    pub fn add_module(mut self, module: Arc<dyn InjectionModule>) -> Self {
        self.modules.push(module);
        self
    }

    /// 聚合注册表，后添加的优先查找
    pub fn aggregate(mut self, registry: Arc<BindingRegistry>) -> Self {
        self.aggregates.push(registry);
        self
    }

    /// 构建模块链
    pub fn build(self) -> InfrastructureResult<Arc<ModuleChain>> {
        if let Some(logging) = &self.logging {
            init_logging(logging)?;
        }
        info!("开始构建注入器");

        let config = match self.config {
            Some(config) => {
                config.validate()?;
                config
            }
            None => self.loader.load()?,
        };

        let chain = ModuleChain::from_config(&config);
        let registry = chain.registry();
        for aggregate in self.aggregates {
            registry.aggregate(aggregate);
        }
        for installer in self.installers {
            installer(registry.as_ref())?;
        }
        for module in self.modules {
            chain.add_module(module);
        }

        if config.log_modules_on_build {
            chain.log();
        }
        info!("注入器构建完成: {} ({} 个绑定)", config.name, registry.len());
        Ok(chain)
    }
}

impl Default for InjectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 过滤指令（`RUST_LOG` 语法），设置后优先于日志级别
    pub filter: Option<String>,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            filter: None,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            filter: None,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            filter: None,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 设置日志级别
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = level;
        self
    }

    /// 设置过滤指令
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    fn env_filter(&self) -> InfrastructureResult<EnvFilter> {
        match &self.filter {
            Some(directives) => {
                EnvFilter::try_new(directives).map_err(|e| InfrastructureError::BootstrapFailed {
                    message: format!("日志过滤指令无效: {}", e),
                })
            }
            None => Ok(EnvFilter::default().add_directive(LevelFilter::from_level(self.level).into())),
        }
    }
}

/// 初始化日志系统
///
/// 返回是否安装了新的全局订阅者；已存在全局订阅者时保持原状并返回 `false`。
pub fn init_logging(config: &LoggingConfig) -> InfrastructureResult<bool> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter()?)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    let installed = if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    };

    match installed {
        Ok(()) => {
            info!("日志系统初始化完成");
            Ok(true)
        }
        Err(e) => {
            debug!("日志系统已初始化, 跳过: {}", e);
            Ok(false)
        }
    }
}
