//! 基础设施模块
//!
//! 封装外部依赖（命令执行等）

pub mod command;

#[cfg(test)]
pub mod testing;

pub use command::{CommandError, CommandOutput, CommandRunner, CommandSpec, ProcessRunner};
