//! 服务层模块
//!
//! 包含核心业务逻辑：启动时的工具探测和部署编排

pub mod deploy;
pub mod probe;
