//! 外部工具能力矩阵

use serde::Serialize;

/// 可用的 compose 调用方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComposeTool {
    /// 独立二进制 `docker-compose`
    Standalone,
    /// Docker CLI 插件 `docker compose`
    Plugin,
}

impl ComposeTool {
    /// 要执行的程序
    pub fn program(&self) -> &'static str {
        match self {
            ComposeTool::Standalone => "docker-compose",
            ComposeTool::Plugin => "docker",
        }
    }

    /// 程序之后、子命令之前的固定参数
    pub fn base_args(&self) -> &'static [&'static str] {
        match self {
            ComposeTool::Standalone => &[],
            ComposeTool::Plugin => &["compose"],
        }
    }

    /// 完整命令（用于日志和响应）
    pub fn command(&self) -> &'static str {
        match self {
            ComposeTool::Standalone => "docker-compose",
            ComposeTool::Plugin => "docker compose",
        }
    }
}

/// 主机上外部工具的可用性
///
/// 启动时探测一次，之后只读，通过 `Arc` 注入到需要它的组件
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CapabilityMatrix {
    /// git 客户端可用
    pub version_control_available: bool,
    /// docker CLI 可用且 daemon 可达
    pub container_engine_available: bool,
    /// 可用的 compose 工具
    pub compose_tool: Option<ComposeTool>,
}

impl CapabilityMatrix {
    /// 所有工具均可用（compose 使用独立二进制）
    pub fn all_available() -> Self {
        Self {
            version_control_available: true,
            container_engine_available: true,
            compose_tool: Some(ComposeTool::Standalone),
        }
    }

    /// 所有工具均不可用
    pub fn none_available() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_tool_invocation() {
        assert_eq!(ComposeTool::Standalone.program(), "docker-compose");
        assert!(ComposeTool::Standalone.base_args().is_empty());
        assert_eq!(ComposeTool::Plugin.program(), "docker");
        assert_eq!(ComposeTool::Plugin.base_args(), &["compose"]);
        assert_eq!(ComposeTool::Plugin.command(), "docker compose");
    }

    #[test]
    fn test_matrix_serializes_tool_style() {
        let json = serde_json::to_value(CapabilityMatrix::all_available()).unwrap();
        assert_eq!(json["compose_tool"], "standalone");
        assert_eq!(json["version_control_available"], true);
    }
}
