//! 命令执行器
//!
//! 提供统一的外部命令执行接口，支持：
//! - 超时控制（超时后终止子进程）
//! - stdout/stderr 分离捕获
//! - 可替换的执行器（`ProcessRunner` trait），测试中使用脚本化实现

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, error};

/// 待执行的命令描述
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub args: Vec<String>,
    pub work_dir: Option<PathBuf>,
    pub envs: Vec<(String, String)>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            work_dir: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.work_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// 程序名 + 参数是否以给定前缀开头（如 `["docker", "build"]`）
    pub fn starts_with(&self, words: &[&str]) -> bool {
        let mut all = std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str));
        words.iter().all(|w| all.next() == Some(*w))
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// 命令执行错误
#[derive(Debug)]
pub enum CommandError {
    /// 命令启动失败（通常是可执行文件不存在）
    SpawnFailed(std::io::Error),
    /// 命令超时，子进程已被终止
    Timeout(Duration),
    /// 等待命令完成失败
    WaitFailed(std::io::Error),
}

impl CommandError {
    /// 可执行文件是否缺失
    pub fn is_missing_executable(&self) -> bool {
        matches!(self, CommandError::SpawnFailed(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandError::SpawnFailed(e) => write!(f, "Failed to spawn command: {}", e),
            CommandError::Timeout(d) => write!(f, "Command timed out after {}s", d.as_secs()),
            CommandError::WaitFailed(e) => write!(f, "Failed to wait for command: {}", e),
        }
    }
}

impl std::error::Error for CommandError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CommandError::SpawnFailed(e) | CommandError::WaitFailed(e) => Some(e),
            CommandError::Timeout(_) => None,
        }
    }
}

/// 命令执行结果
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// 退出码（被信号终止时为 None）
    pub code: Option<i32>,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub elapsed: Duration,
}

impl CommandOutput {
    /// 合并 stderr 与 stdout，用于错误诊断
    pub fn diagnostics(&self) -> String {
        let stderr = self.stderr.trim_end();
        let stdout = self.stdout.trim_end();
        match (stderr.is_empty(), stdout.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stderr.to_string(),
            (true, false) => stdout.to_string(),
            (false, false) => format!("{}\n{}", stderr, stdout),
        }
    }
}

/// 外部命令执行抽象
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError>;
}

/// 基于 `tokio::process` 的命令执行器
#[derive(Debug, Default, Clone, Copy)]
pub struct CommandRunner;

#[async_trait]
impl ProcessRunner for CommandRunner {
    async fn run(
        &self,
        spec: &CommandSpec,
        timeout: Duration,
    ) -> Result<CommandOutput, CommandError> {
        debug!(command = %spec, "Running command");

        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(ref dir) = spec.work_dir {
            command.current_dir(dir);
        }
        for (key, value) in &spec.envs {
            command.env(key, value);
        }

        let started = Instant::now();
        let child = command.spawn().map_err(CommandError::SpawnFailed)?;

        // 超时分支丢弃 future 时 child 随之 drop，kill_on_drop 负责终止进程
        tokio::select! {
            output = child.wait_with_output() => {
                let output = output.map_err(CommandError::WaitFailed)?;
                Ok(CommandOutput {
                    code: output.status.code(),
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                    stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                    elapsed: started.elapsed(),
                })
            }
            _ = tokio::time::sleep(timeout) => {
                error!(command = %spec, "Command timed out after {:?}", timeout);
                Err(CommandError::Timeout(timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_success() {
        let spec = CommandSpec::new("echo").arg("hello").current_dir("/tmp");
        let output = CommandRunner.run(&spec, Duration::from_secs(5)).await.unwrap();

        assert!(output.success);
        assert_eq!(output.code, Some(0));
        assert!(output.stdout.contains("hello"));
    }

    #[tokio::test]
    async fn test_run_not_found() {
        let spec = CommandSpec::new("nonexistent_command_12345");
        let result = CommandRunner.run(&spec, Duration::from_secs(5)).await;

        let err = result.unwrap_err();
        assert!(matches!(err, CommandError::SpawnFailed(_)));
        assert!(err.is_missing_executable());
    }

    #[tokio::test]
    async fn test_run_timeout() {
        let spec = CommandSpec::new("sleep").arg("5");
        let started = Instant::now();
        let result = CommandRunner.run(&spec, Duration::from_millis(100)).await;

        assert!(matches!(result, Err(CommandError::Timeout(_))));
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_run_passes_env_and_captures_failure() {
        let spec = CommandSpec::new("sh")
            .args(["-c", "echo \"$ZEPH_TEST_VAR\" >&2; exit 3"])
            .env("ZEPH_TEST_VAR", "from-env");
        let output = CommandRunner.run(&spec, Duration::from_secs(5)).await.unwrap();

        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.diagnostics(), "from-env");
    }

    #[test]
    fn test_spec_display_and_prefix() {
        let spec = CommandSpec::new("docker").args(["compose", "up", "-d"]);
        assert_eq!(spec.to_string(), "docker compose up -d");
        assert!(spec.starts_with(&["docker", "compose"]));
        assert!(!spec.starts_with(&["docker", "build"]));
    }
}
