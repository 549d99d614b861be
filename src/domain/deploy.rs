//! 部署相关领域模型

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

/// 部署方式
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum DeployMethod {
    #[serde(rename = "docker-compose")]
    ComposeBased,
    #[serde(rename = "dockerfile")]
    DockerfileBased,
}

impl DeployMethod {
    /// 转换为字符串
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployMethod::ComposeBased => "docker-compose",
            DeployMethod::DockerfileBased => "dockerfile",
        }
    }
}

/// 仓库的本地工作副本
#[derive(Clone, Debug)]
pub struct WorkingCopy {
    /// 由仓库 URL 推导出的名称
    pub name: String,
    /// 工作副本目录
    pub path: PathBuf,
    /// 根目录下的条目数（不含 `.git`）
    pub entries: usize,
}

/// 选定的部署策略
#[derive(Clone, Debug)]
pub struct DeploymentStrategy {
    pub method: DeployMethod,
    /// 工作副本目录
    pub working_dir: PathBuf,
    /// 决定该策略的 manifest 文件
    pub manifest: PathBuf,
    /// 与 compose manifest 配套的 override 文件（仅 compose）
    pub override_manifest: Option<PathBuf>,
}

/// 阶段状态
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum StageStatus {
    Pending,
    Running,
    Success,
    Failed,
}

/// 部署阶段信息
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeployStage {
    /// 阶段标识 (e.g., "docker_build", "container_start")
    pub name: String,
    /// 开始时间
    pub started_at: Option<DateTime<Utc>>,
    /// 结束时间
    pub finished_at: Option<DateTime<Utc>>,
    /// 持续时间（毫秒）
    pub duration_ms: Option<i64>,
    /// 阶段状态
    pub status: StageStatus,
}

impl DeployStage {
    /// 创建新的待执行阶段
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            started_at: None,
            finished_at: None,
            duration_ms: None,
            status: StageStatus::Pending,
        }
    }

    /// 开始执行阶段
    pub fn start(&mut self) {
        self.started_at = Some(Utc::now());
        self.status = StageStatus::Running;
    }

    /// 完成阶段
    pub fn finish(&mut self, success: bool) {
        let now = Utc::now();
        self.finished_at = Some(now);
        self.status = if success {
            StageStatus::Success
        } else {
            StageStatus::Failed
        };
        if let Some(started) = self.started_at {
            self.duration_ms = Some((now - started).num_milliseconds());
        }
    }
}

/// 成功部署的描述
///
/// 构造后不再修改，返回给调用方，不做持久化
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentDescriptor {
    pub method: DeployMethod,
    /// 生成的唯一部署名称（容器名 / compose 项目名）
    pub name: String,
    /// 工作副本目录
    pub path: PathBuf,
    /// 部署耗时（毫秒）
    pub elapsed_ms: u64,
    /// compose 项目名（仅 compose 部署）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    /// 实际使用的 compose 命令（仅 compose 部署）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compose_command: Option<String>,
    /// 镜像名（仅 Dockerfile 部署）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_name: Option<String>,
    /// 容器 ID（仅 Dockerfile 部署）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub container_id: Option<String>,
    /// 各阶段耗时
    pub stages: Vec<DeployStage>,
}

impl DeploymentDescriptor {
    /// 指定阶段的耗时
    pub fn stage_duration_ms(&self, name: &str) -> Option<i64> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .and_then(|s| s.duration_ms)
    }
}
