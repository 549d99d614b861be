//! 领域模型模块
//!
//! 纯数据结构，不依赖 axum/tokio

pub mod action;
pub mod capability;
pub mod deploy;

// Re-exports for convenience
pub use action::{ActionRequest, ActionResponse, DEPLOY_ACTION};
pub use capability::{CapabilityMatrix, ComposeTool};
pub use deploy::{
    DeployMethod, DeployStage, DeploymentDescriptor, DeploymentStrategy, StageStatus, WorkingCopy,
};
