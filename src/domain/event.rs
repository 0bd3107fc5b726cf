//! GitHub webhook 事件模型

use serde::Deserialize;

/// `X-GitHub-Event` 事件类型
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebhookKind {
    /// 代码推送
    Push,
    /// webhook 创建时的连通性检查
    Ping,
}

impl WebhookKind {
    /// 解析事件类型，仅支持 push 和 ping
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "push" => Some(WebhookKind::Push),
            "ping" => Some(WebhookKind::Ping),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WebhookKind::Push => "push",
            WebhookKind::Ping => "ping",
        }
    }
}

/// push 事件原始 payload（只保留用到的字段）
#[derive(Clone, Debug, Deserialize)]
pub struct PushPayload {
    #[serde(rename = "ref")]
    pub git_ref: String,
    pub repository: Repository,
    #[serde(default)]
    pub commits: Vec<Commit>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Repository {
    #[serde(default)]
    pub default_branch: String,
}

/// 单个提交的文件变更
///
/// `added`/`removed` 只接收不参与匹配
#[derive(Clone, Debug, Default, Deserialize)]
pub struct Commit {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub added: Vec<serde_json::Value>,
    #[serde(default)]
    pub removed: Vec<serde_json::Value>,
    #[serde(default)]
    pub modified: Vec<String>,
}

/// 解析后的 push 事件
#[derive(Clone, Debug, PartialEq)]
pub struct PushEvent {
    pub git_ref: String,
    pub default_branch: String,
    /// 所有提交中被修改的文件路径，保持首次出现的顺序、去重、去空白
    pub changed_paths: Vec<String>,
}

impl PushEvent {
    /// 从原始 JSON body 解析
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        let payload: PushPayload = serde_json::from_slice(body)?;
        Ok(payload.into())
    }
}

impl From<PushPayload> for PushEvent {
    fn from(payload: PushPayload) -> Self {
        let mut changed_paths: Vec<String> = Vec::new();
        for path in payload.commits.into_iter().flat_map(|c| c.modified) {
            if path.trim().is_empty() || changed_paths.contains(&path) {
                continue;
            }
            changed_paths.push(path);
        }

        Self {
            git_ref: payload.git_ref,
            default_branch: payload.repository.default_branch,
            changed_paths,
        }
    }
}
