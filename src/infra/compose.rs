//! Docker Compose 后端
//!
//! 通过 `docker compose` 命令停止/启动 stack，通过 `docker ps` 查询成员

use async_trait::async_trait;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::config::env::constants::{COMPOSE_PROJECT_LABEL, COMPOSE_SERVICE_LABEL};
use crate::domain::{Stack, StackMember};

use super::command::{CommandError, CommandRunner};

/// compose 操作错误
#[derive(Debug, Error)]
pub enum ComposeError {
    #[error("failed to stop compose stack: {0}")]
    Stop(#[source] CommandError),

    #[error("failed to start compose stack: {0}")]
    Start(#[source] CommandError),

    #[error("failed to list containers: {0}")]
    List(#[source] CommandError),

    #[error("docker is not available: {0}")]
    Unavailable(String),
}

/// stack 生命周期能力
///
/// 每次调用都是独立的外部进程，实现必须可以被并发调用
#[async_trait]
pub trait ComposeBackend: Send + Sync {
    /// 停止 stack（`down`）
    async fn stop(&self, stack: &Stack, cancel: &CancellationToken) -> Result<(), ComposeError>;

    /// 启动 stack（`up -d`）
    async fn start(&self, stack: &Stack, cancel: &CancellationToken) -> Result<(), ComposeError>;

    /// 列出属于该 stack 名称的容器
    async fn list_members(
        &self,
        stack_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StackMember>, ComposeError>;
}

/// 基于 docker CLI 的实现
#[derive(Clone, Debug)]
pub struct DockerCompose {
    /// `docker` 或 `docker-compose`
    program: &'static str,
    /// `["compose"]` 或空
    base_args: Vec<&'static str>,
}

impl DockerCompose {
    /// 检测 compose 命令并确认 docker daemon 可达
    pub async fn connect() -> Result<Self, ComposeError> {
        let cancel = CancellationToken::new();
        let compose = Self::detect(&cancel).await?;

        let version = CommandRunner::run_checked(
            "docker",
            &["version", "--format", "{{.Server.Version}}"],
            None,
            &cancel,
        )
        .await
        .map_err(|e| ComposeError::Unavailable(e.to_string()))?;

        tracing::info!(
            server_version = %String::from_utf8_lossy(&version.stdout).trim(),
            compose = %compose.display(),
            "Connected to Docker daemon"
        );

        Ok(compose)
    }

    /// 优先使用 `docker compose`，回退到 `docker-compose`
    async fn detect(cancel: &CancellationToken) -> Result<Self, ComposeError> {
        if CommandRunner::run_checked("docker", &["compose", "version"], None, cancel)
            .await
            .is_ok()
        {
            return Ok(Self {
                program: "docker",
                base_args: vec!["compose"],
            });
        }

        if CommandRunner::run_checked("docker-compose", &["version"], None, cancel)
            .await
            .is_ok()
        {
            return Ok(Self {
                program: "docker-compose",
                base_args: Vec::new(),
            });
        }

        Err(ComposeError::Unavailable(
            "neither `docker compose` nor `docker-compose` is installed".to_string(),
        ))
    }

    /// 用于日志的命令描述
    pub fn display(&self) -> String {
        std::iter::once(self.program)
            .chain(self.base_args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }

    async fn compose(
        &self,
        stack: &Stack,
        action: &[&str],
        cancel: &CancellationToken,
    ) -> Result<(), CommandError> {
        let compose_file = stack.compose_file.to_string_lossy();
        let mut args: Vec<&str> = self.base_args.iter().copied().collect();
        args.extend(["-f", &*compose_file]);
        args.extend(action);

        CommandRunner::run_checked(self.program, &args, Some(&stack.directory), cancel).await?;
        Ok(())
    }
}

#[async_trait]
impl ComposeBackend for DockerCompose {
    async fn stop(&self, stack: &Stack, cancel: &CancellationToken) -> Result<(), ComposeError> {
        self.compose(stack, &["down"], cancel)
            .await
            .map_err(ComposeError::Stop)
    }

    async fn start(&self, stack: &Stack, cancel: &CancellationToken) -> Result<(), ComposeError> {
        self.compose(stack, &["up", "-d"], cancel)
            .await
            .map_err(ComposeError::Start)
    }

    async fn list_members(
        &self,
        stack_name: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<StackMember>, ComposeError> {
        let filter = format!("label={}={}", COMPOSE_PROJECT_LABEL, stack_name);
        let format = format!(
            "{{{{.ID}}}}|{{{{.Names}}}}|{{{{.Label \"{}\"}}}}|{{{{.State}}}}|{{{{.Status}}}}",
            COMPOSE_SERVICE_LABEL
        );

        let output = CommandRunner::run_checked(
            "docker",
            &["ps", "-a", "--filter", &filter, "--format", &format],
            None,
            cancel,
        )
        .await
        .map_err(ComposeError::List)?;

        Ok(parse_ps_output(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// 解析 `docker ps --format` 输出
fn parse_ps_output(stdout: &str) -> Vec<StackMember> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            let parts: Vec<&str> = line.split('|').collect();
            let field = |i: usize| parts.get(i).unwrap_or(&"").trim().to_string();
            StackMember {
                id: field(0),
                name: field(1),
                service: field(2),
                state: field(3),
                status: field(4),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ps_output() {
        let stdout = "\
3f2a1b|web-app-1|app|running|Up 3 hours
9c8d7e|web-db-1|db|exited|Exited (0) 2 minutes ago

";
        let members = parse_ps_output(stdout);
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].id, "3f2a1b");
        assert_eq!(members[0].name, "web-app-1");
        assert_eq!(members[0].service, "app");
        assert_eq!(members[0].state, "running");
        assert_eq!(members[1].status, "Exited (0) 2 minutes ago");
    }

    #[test]
    fn test_parse_ps_output_short_line() {
        let members = parse_ps_output("abc|only-name\n");
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].name, "only-name");
        assert_eq!(members[0].service, "");
    }

    #[test]
    fn test_display_command() {
        let compose = DockerCompose {
            program: "docker",
            base_args: vec!["compose"],
        };
        assert_eq!(compose.display(), "docker compose");
    }
}
