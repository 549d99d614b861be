//! 动作请求与响应

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::deploy::DeploymentDescriptor;

/// 触发部署的动作名
pub const DEPLOY_ACTION: &str = "deploy";

/// 动作请求
///
/// 字段均为可选，缺失字段由编排器统一报告为 `InvalidRequest`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActionRequest {
    /// 任意 JSON 值都可作为动作名，非字符串按 JSON 文本回显
    #[serde(default, deserialize_with = "any_action")]
    pub action: Option<String>,
    pub link: Option<String>,
}

fn any_action<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(action)) => Some(action),
        Some(other) => Some(other.to_string()),
    })
}

impl ActionRequest {
    pub fn deploy(link: impl Into<String>) -> Self {
        Self {
            action: Some(DEPLOY_ACTION.to_string()),
            link: Some(link.into()),
        }
    }

    pub fn action(action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            link: None,
        }
    }
}

/// 成功响应
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    /// 部署描述（仅 deploy 动作）
    #[serde(flatten)]
    pub deployment: Option<DeploymentDescriptor>,
    /// 请求总耗时（毫秒，仅 deploy 动作）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_time: Option<u64>,
    pub request_id: String,
}

impl ActionResponse {
    /// 非 deploy 动作的原样回显
    pub fn acknowledged(request_id: String, action: String) -> Self {
        Self {
            success: true,
            message: "Action received".to_string(),
            action,
            link: None,
            deployment: None,
            total_time: None,
            request_id,
        }
    }

    /// deploy 成功
    pub fn deployed(
        request_id: String,
        link: String,
        deployment: DeploymentDescriptor,
        total_time: u64,
    ) -> Self {
        Self {
            success: true,
            message: "Deployment completed successfully".to_string(),
            action: DEPLOY_ACTION.to_string(),
            link: Some(link),
            deployment: Some(deployment),
            total_time: Some(total_time),
            request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_fields_are_optional() {
        let req: ActionRequest = serde_json::from_str("{}").unwrap();
        assert!(req.action.is_none());
        assert!(req.link.is_none());

        let req: ActionRequest =
            serde_json::from_str(r#"{"action":"deploy","link":"https://x/y.git","extra":1}"#)
                .unwrap();
        assert_eq!(req.action.as_deref(), Some("deploy"));
        assert_eq!(req.link.as_deref(), Some("https://x/y.git"));
    }

    #[test]
    fn test_non_string_action_is_kept_as_text() {
        let req: ActionRequest = serde_json::from_str(r#"{"action":42}"#).unwrap();
        assert_eq!(req.action.as_deref(), Some("42"));

        let req: ActionRequest = serde_json::from_str(r#"{"action":{"kind":"x"}}"#).unwrap();
        assert_eq!(req.action.as_deref(), Some(r#"{"kind":"x"}"#));

        let req: ActionRequest = serde_json::from_str(r#"{"action":null}"#).unwrap();
        assert!(req.action.is_none());
    }

    #[test]
    fn test_acknowledged_shape() {
        let resp = ActionResponse::acknowledged("req-1".to_string(), "noop".to_string());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["action"], "noop");
        assert_eq!(json["requestId"], "req-1");
        assert!(json.get("method").is_none());
        assert!(json.get("link").is_none());
    }
}
