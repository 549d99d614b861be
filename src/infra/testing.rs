//! 测试用的脚本化命令执行器

use async_trait::async_trait;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use super::command::{CommandError, CommandOutput, CommandSpec, ProcessRunner};

type Handler = dyn Fn(&CommandSpec) -> Result<CommandOutput, CommandError> + Send + Sync;

/// 记录所有调用（含超时），并由闭包决定每条命令的结果
pub struct ScriptedRunner {
    calls: Mutex<Vec<(CommandSpec, Duration)>>,
    handler: Box<Handler>,
}

impl ScriptedRunner {
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&CommandSpec) -> Result<CommandOutput, CommandError> + Send + Sync + 'static,
    {
        Self {
            calls: Mutex::new(Vec::new()),
            handler: Box::new(handler),
        }
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|(spec, _)| spec.clone())
            .collect()
    }

    /// 每次调用收到的超时，按调用顺序
    pub fn timeouts(&self) -> Vec<Duration> {
        self.calls.lock().unwrap().iter().map(|(_, t)| *t).collect()
    }

    /// 以给定前缀开头的调用次数
    pub fn count(&self, words: &[&str]) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(c, _)| c.starts_with(words))
            .count()
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec, timeout: Duration) -> Result<CommandOutput, CommandError> {
        self.calls.lock().unwrap().push((spec.clone(), timeout));
        (self.handler)(spec)
    }
}

pub fn ok(stdout: &str) -> Result<CommandOutput, CommandError> {
    Ok(CommandOutput {
        code: Some(0),
        success: true,
        stdout: stdout.to_string(),
        stderr: String::new(),
        elapsed: Duration::from_millis(1),
    })
}

pub fn fail(code: i32, stderr: &str) -> Result<CommandOutput, CommandError> {
    Ok(CommandOutput {
        code: Some(code),
        success: false,
        stdout: String::new(),
        stderr: stderr.to_string(),
        elapsed: Duration::from_millis(1),
    })
}

pub fn missing() -> Result<CommandOutput, CommandError> {
    Err(CommandError::SpawnFailed(std::io::Error::from(
        std::io::ErrorKind::NotFound,
    )))
}

/// 模拟 `git clone <url> <dir>`：创建目标目录、`.git` 和给定文件
pub fn simulate_clone(spec: &CommandSpec, files: &[&str]) -> Result<CommandOutput, CommandError> {
    let target = spec.args.last().expect("clone target");
    let dir = Path::new(target);
    std::fs::create_dir_all(dir.join(".git")).unwrap();
    for file in files {
        std::fs::write(dir.join(file), "# test\n").unwrap();
    }
    ok("")
}

/// 所有工具都正常工作的 handler，仓库内容为给定文件
pub fn healthy_host(
    files: &'static [&'static str],
) -> impl Fn(&CommandSpec) -> Result<CommandOutput, CommandError> + Send + Sync + 'static {
    move |spec| {
        if spec.starts_with(&["git", "clone"]) {
            simulate_clone(spec, files)
        } else if spec.starts_with(&["docker", "create"]) {
            ok("f00dfeed1234\n")
        } else {
            ok("")
        }
    }
}
