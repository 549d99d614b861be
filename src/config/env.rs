//! 环境变量配置加载

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

/// 外部命令超时配置
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Timeouts {
    /// git clone
    pub clone: Duration,
    /// docker build / compose up
    pub build: Duration,
    /// docker create / docker start
    pub start: Duration,
    /// 启动时的工具探测
    pub probe: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            clone: Duration::from_secs(constants::CLONE_TIMEOUT_SECS),
            build: Duration::from_secs(constants::BUILD_TIMEOUT_SECS),
            start: Duration::from_secs(constants::START_TIMEOUT_SECS),
            probe: Duration::from_secs(constants::PROBE_TIMEOUT_SECS),
        }
    }
}

/// 环境配置
#[derive(Clone, Debug)]
pub struct EnvConfig {
    /// 服务监听端口
    pub port: u16,
    /// 工作副本根目录
    pub repos_dir: PathBuf,
    /// 生成名称的前缀（`<prefix>-deploy-*`, `<prefix>-image-*`）
    pub name_prefix: String,
    /// 外部命令超时
    pub timeouts: Timeouts,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            port: constants::DEFAULT_PORT,
            repos_dir: PathBuf::from(constants::DEFAULT_REPOS_DIR),
            name_prefix: constants::DEFAULT_NAME_PREFIX.to_string(),
            timeouts: Timeouts::default(),
        }
    }
}

impl EnvConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Self {
        let port = parse_var("PORT").unwrap_or(constants::DEFAULT_PORT);

        let repos_dir = env::var("REPOS_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_REPOS_DIR));

        let name_prefix = env::var("DEPLOY_NAME_PREFIX")
            .ok()
            .filter(|v| is_valid_prefix(v))
            .unwrap_or_else(|| constants::DEFAULT_NAME_PREFIX.to_string());

        let timeouts = Timeouts {
            clone: secs_var("CLONE_TIMEOUT_SECS", constants::CLONE_TIMEOUT_SECS),
            build: secs_var("BUILD_TIMEOUT_SECS", constants::BUILD_TIMEOUT_SECS),
            start: secs_var("START_TIMEOUT_SECS", constants::START_TIMEOUT_SECS),
            probe: secs_var("PROBE_TIMEOUT_SECS", constants::PROBE_TIMEOUT_SECS),
        };

        Self {
            port,
            repos_dir,
            name_prefix,
            timeouts,
        }
    }
}

/// 解析环境变量，格式错误时记录警告并返回 None
fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    let raw = env::var(key).ok()?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key = key, value = %raw, "Invalid value in environment, using default");
            None
        }
    }
}

fn secs_var(key: &str, default: u64) -> Duration {
    let secs = parse_var::<u64>(key).filter(|s| *s > 0).unwrap_or(default);
    Duration::from_secs(secs)
}

/// compose 项目名只允许小写字母、数字、`-` 和 `_`
fn is_valid_prefix(prefix: &str) -> bool {
    !prefix.is_empty()
        && prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// 常量
pub mod constants {
    /// 默认监听端口
    pub const DEFAULT_PORT: u16 = 3000;

    /// 默认工作副本根目录
    pub const DEFAULT_REPOS_DIR: &str = "repos";

    /// 默认名称前缀
    pub const DEFAULT_NAME_PREFIX: &str = "zeph";

    /// git clone 超时（秒）
    pub const CLONE_TIMEOUT_SECS: u64 = 600;

    /// 构建超时（秒）
    pub const BUILD_TIMEOUT_SECS: u64 = 1800; // 30 分钟

    /// 容器创建/启动超时（秒）
    pub const START_TIMEOUT_SECS: u64 = 120;

    /// 工具探测超时（秒）
    pub const PROBE_TIMEOUT_SECS: u64 = 15;

    /// 版本号
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
}
