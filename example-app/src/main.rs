//! # 示例应用程序
//!
//! 演示如何使用 Lorn ADSP 注入运行时：配置绑定、注入场景对象、
//! 在发射器上下文中派生对象，以及拷贝和释放模块链。

use anyhow::Context;
use clap::Parser;
use di_abstractions::{CompositeObject, ScopeAware, ScopeHandle, SharedObject};
use di_impl::ModuleChain;
use infrastructure_common::Disposable;
use infrastructure_composition::{InjectorBuilder, LoggingConfig, DEFAULT_ENV_PREFIX};
use inject_macros::{injection_target, Injectable};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn ADSP 注入运行时示例")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/injector.toml")]
    config: String,

    /// 日志级别
    #[arg(long, default_value = "info")]
    log_level: String,

    /// 发射器派生的子弹数量
    #[arg(long, default_value_t = 3)]
    bullets: usize,

    /// 是否以 JSON 格式输出日志
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut logging = LoggingConfig::default().with_level(parse_log_level(&args.log_level));
    logging.json_format = args.json;

    let chain = build_injector(&args, logging)?;
    info!("启动 Lorn ADSP 示例应用");

    demonstrate_scene(&chain)?;
    demonstrate_emitter(&chain, args.bullets)?;
    demonstrate_clone(&chain)?;

    chain.dispose();
    info!("应用已关闭");
    Ok(())
}

/// 构建注入器
fn build_injector(args: &Args, logging: LoggingConfig) -> anyhow::Result<Arc<ModuleChain>> {
    let mut builder = InjectorBuilder::new().with_logging(logging);

    if Path::new(&args.config).exists() {
        builder = builder
            .add_config_file(&args.config)
            .context("加载配置文件失败")?;
    } else {
        warn!("配置文件 {} 不存在，使用默认配置和环境变量", args.config);
    }

    let chain = builder
        .add_config_env_vars(DEFAULT_ENV_PREFIX)
        .configure(|registry| {
            registry
                .bind::<String>(Some("prefix"))?
                .to_instance(Arc::new("[demo]".to_string()));
            registry.bind::<f32>(Some("speed"))?.to_instance(Arc::new(12.5));
            registry.bind::<usize>(Some("capacity"))?.to_instance(Arc::new(64));
            registry
                .bind::<dyn Logger>(None)?
                .to_constructor::<ConsoleLogger>(|logger| logger, true);
            registry.bind::<BulletPool>(None)?.to_self(true);
            Ok(())
        })
        .build()
        .context("构建注入器失败")?;
    Ok(chain)
}

/// 演示复合对象注入
fn demonstrate_scene(chain: &ModuleChain) -> anyhow::Result<()> {
    info!("演示复合对象注入");

    let player = Arc::new(Actor::new("player"));
    let enemy = Arc::new(Actor::new("enemy"));
    let scene: SharedObject = Arc::new(Scene {
        actors: vec![player.clone(), enemy.clone()],
    });

    chain.inject(&scene)?;
    player.announce();
    enemy.announce();
    chain.remove(&scene)?;
    Ok(())
}

/// 演示上下文作用域
fn demonstrate_emitter(chain: &ModuleChain, bullets: usize) -> anyhow::Result<()> {
    info!("演示发射器上下文");

    let emitter = Arc::new(Emitter::default());
    let context: SharedObject = emitter.clone();
    chain.inject(&context)?;

    for _ in 0..bullets {
        emitter.fire()?;
    }
    if let Some(tracker) = chain.scope_tracker() {
        info!("发射器已记录 {} 个对象", tracker.tracked_objects(&context).len());
    }

    chain.remove(&context)?;
    if let Some(pool) = chain.registry().get::<BulletPool>(None)? {
        info!("对象池剩余占用: {}", pool.in_use.load(Ordering::SeqCst));
    }
    Ok(())
}

/// 演示模块链拷贝
fn demonstrate_clone(chain: &ModuleChain) -> anyhow::Result<()> {
    let cloned = chain.clone_chain();
    cloned
        .registry()
        .bind::<String>(Some("prefix"))?
        .to_instance(Arc::new("[clone]".to_string()));

    let actor = Arc::new(Actor::new("ghost"));
    let object: SharedObject = actor.clone();
    cloned.inject(&object)?;
    actor.announce();

    cloned.log();
    cloned.dispose();
    Ok(())
}

/// 解析日志级别
fn parse_log_level(level: &str) -> tracing::Level {
    match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    }
}

// 示例组件

/// 日志输出
trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

/// 控制台日志
#[derive(Injectable)]
struct ConsoleLogger {
    #[inject(id = "prefix", default = "[console]".to_string())]
    prefix: String,
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        info!("{} {}", self.prefix, message);
    }
}

/// 子弹对象池
#[derive(Injectable)]
#[inject(disposable)]
struct BulletPool {
    #[inject(id = "capacity", default = 16)]
    capacity: usize,
    #[inject(skip)]
    in_use: AtomicUsize,
}

impl BulletPool {
    fn acquire(&self) -> anyhow::Result<usize> {
        self.in_use
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |used| {
                (used < self.capacity).then_some(used + 1)
            })
            .map_err(|_| anyhow::anyhow!("对象池已满: {}", self.capacity))
    }

    fn release(&self) {
        self.in_use.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Disposable for BulletPool {
    fn dispose(&self) {
        info!("释放对象池, 剩余占用 {}", self.in_use.load(Ordering::SeqCst));
    }
}

/// 场景角色
struct Actor {
    name: &'static str,
    logger: Mutex<Option<Arc<dyn Logger>>>,
    speed: Mutex<f32>,
}

impl Actor {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            logger: Mutex::new(None),
            speed: Mutex::new(0.0),
        }
    }

    fn announce(&self) {
        let message = format!("{} 速度 {}", self.name, *self.speed.lock());
        match self.logger.lock().as_ref() {
            Some(logger) => logger.log(&message),
            None => warn!("{} 未注入日志", self.name),
        }
    }
}

#[injection_target]
impl Actor {
    fn inject_logger(&self, logger: Option<Arc<dyn Logger>>) {
        *self.logger.lock() = logger;
    }

    fn inject_speed(&self, #[inject(id = "speed", default = 1.0)] speed: f32) {
        *self.speed.lock() = speed;
    }
}

/// 场景
struct Scene {
    actors: Vec<Arc<Actor>>,
}

#[injection_target(composite)]
impl Scene {}

impl CompositeObject for Scene {
    fn constituents(&self) -> Vec<SharedObject> {
        self.actors
            .iter()
            .map(|actor| actor.clone() as SharedObject)
            .collect()
    }
}

/// 运行时派生的子弹
struct Bullet {
    pool: Mutex<Option<Arc<BulletPool>>>,
    slot: Mutex<Option<usize>>,
}

#[injection_target]
impl Bullet {
    fn inject_pool(&self, pool: Option<Arc<BulletPool>>) {
        let Some(pool) = pool else {
            return;
        };
        match pool.acquire() {
            Ok(slot) => *self.slot.lock() = Some(slot),
            Err(e) => warn!("子弹未占用对象池: {}", e),
        }
        *self.pool.lock() = Some(pool);
    }
}

impl Drop for Bullet {
    fn drop(&mut self) {
        if let (Some(pool), Some(_)) = (self.pool.lock().take(), self.slot.lock().take()) {
            pool.release();
        }
    }
}

/// 子弹发射器
#[derive(Default)]
struct Emitter {
    scope: Mutex<Option<ScopeHandle>>,
    fired: AtomicUsize,
}

impl Emitter {
    fn fire(&self) -> anyhow::Result<()> {
        let bullet: SharedObject = Arc::new(Bullet {
            pool: Mutex::new(None),
            slot: Mutex::new(None),
        });
        let handle = self.scope.lock().clone().context("发射器尚未注入")?;
        handle.inject(bullet)?;
        let fired = self.fired.fetch_add(1, Ordering::SeqCst) + 1;
        info!("发射第 {} 颗子弹", fired);
        Ok(())
    }
}

#[injection_target(scope_aware)]
impl Emitter {}

impl ScopeAware for Emitter {
    fn attach_scope(&self, handle: ScopeHandle) {
        *self.scope.lock() = Some(handle);
    }
}
