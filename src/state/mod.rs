//! 运行时状态模块
//!
//! 管理应用状态和工作副本锁

pub mod app_state;
pub mod workspace_locks;

pub use app_state::AppState;
pub use workspace_locks::WorkspaceLocks;
