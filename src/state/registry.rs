//! Stack 注册表
//!
//! 启动时由配置文件构建，之后整个进程只读共享

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::config::LoadedConfig;
use crate::domain::Stack;
use crate::infra::ComposeBackend;

/// 已配置的 stack 集合
#[derive(Clone, Debug)]
pub struct StackRegistry {
    /// 配置文件所在目录（git 工作目录）
    root: PathBuf,
    /// 按配置顺序排列
    stacks: Arc<[Stack]>,
}

impl StackRegistry {
    pub fn new(root: impl Into<PathBuf>, stacks: Vec<Stack>) -> Self {
        Self {
            root: root.into(),
            stacks: stacks.into(),
        }
    }

    /// 从配置构建，缺失的 compose 文件只告警
    pub fn from_config(config: &LoadedConfig) -> Self {
        let stacks: Vec<Stack> = config
            .stacks
            .iter()
            .map(|relative| {
                let stack = Stack::from_config(&config.root, relative);
                if !stack.exists {
                    tracing::warn!(
                        stack = %stack.name,
                        path = %stack.compose_file.display(),
                        "Stack compose file not found"
                    );
                }
                stack
            })
            .collect();

        Self::new(config.root.clone(), stacks)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn stacks(&self) -> &[Stack] {
        &self.stacks
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    /// 文件存在的 stack 数量
    pub fn existing_count(&self) -> usize {
        self.stacks.iter().filter(|s| s.exists).count()
    }

    /// 刷新所有 stack 的状态并记录日志
    pub async fn inventory(
        &self,
        compose: &dyn ComposeBackend,
        cancel: &CancellationToken,
    ) -> Vec<Stack> {
        let mut refreshed = Vec::with_capacity(self.stacks.len());
        for stack in self.stacks.iter() {
            let stack = refresh(stack, compose, cancel).await;
            if stack.exists {
                tracing::info!(
                    stack = %stack.name,
                    path = %stack.compose_file.display(),
                    members = stack.members.len(),
                    running = stack.running_count(),
                    "Stack found"
                );
            } else {
                tracing::warn!(stack = %stack.name, "Stack not found in filesystem");
            }
            refreshed.push(stack);
        }
        refreshed
    }
}

/// 重新读取 stack 的文件状态和运行成员
///
/// 查询失败时返回空成员列表
pub async fn refresh(stack: &Stack, compose: &dyn ComposeBackend, cancel: &CancellationToken) -> Stack {
    if !stack.compose_file.is_file() {
        return stack.refreshed(Vec::new());
    }

    match compose.list_members(&stack.name, cancel).await {
        Ok(members) => stack.refreshed(members),
        Err(e) => {
            tracing::warn!(stack = %stack.name, error = %e, "Failed to get services for stack");
            stack.refreshed(Vec::new())
        }
    }
}
