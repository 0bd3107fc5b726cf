//! Git 源码更新

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::command::{CommandError, CommandRunner};

/// 源码更新错误
#[derive(Debug, Error)]
#[error("failed to update git repository: {0}")]
pub struct UpdateError(#[from] pub CommandError);

/// 源码更新能力
#[async_trait]
pub trait SourceUpdater: Send + Sync {
    /// 将工作目录快进到上游最新版本
    async fn update(&self, dir: &Path, cancel: &CancellationToken) -> Result<(), UpdateError>;
}

/// `git pull --no-edit --ff-only`
///
/// 历史分叉时失败，而不是覆盖本地修改
#[derive(Clone, Debug, Default)]
pub struct GitUpdater;

#[async_trait]
impl SourceUpdater for GitUpdater {
    async fn update(&self, dir: &Path, cancel: &CancellationToken) -> Result<(), UpdateError> {
        let output = CommandRunner::run_checked(
            "git",
            &["pull", "--no-edit", "--ff-only"],
            Some(dir),
            cancel,
        )
        .await?;

        tracing::debug!(
            dir = %dir.display(),
            output = %String::from_utf8_lossy(&output.stdout).trim(),
            "git pull finished"
        );
        Ok(())
    }
}
