//! 命令执行器
//!
//! 提供统一的外部命令执行接口，支持：
//! - 取消支持（取消后不再等待结果，已启动的进程继续运行，输出照常读取）
//! - stdout/stderr 收集
//! - 非零退出码转换为错误

use std::path::Path;
use std::process::{Output, Stdio};
use thiserror::Error;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// 命令执行器
pub struct CommandRunner;

/// 命令执行错误
#[derive(Debug, Error)]
pub enum CommandError {
    /// 命令启动失败
    #[error("failed to spawn {program}: {source}")]
    SpawnFailed {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// 命令被取消
    #[error("command was cancelled")]
    Cancelled,

    /// 等待子进程的任务异常结束
    #[error("failed to wait for {program}: {source}")]
    WaitFailed {
        program: String,
        #[source]
        source: tokio::task::JoinError,
    },

    /// 命令以非零状态退出
    #[error("{program} exited with {status}: {output}")]
    Failed {
        program: String,
        status: String,
        output: String,
    },
}

impl CommandRunner {
    /// 执行命令并收集输出
    ///
    /// 取消令牌触发时立即返回 `Cancelled`，子进程继续运行直到自然结束
    pub async fn run(
        program: &str,
        args: &[&str],
        work_dir: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<Output, CommandError> {
        if cancel.is_cancelled() {
            return Err(CommandError::Cancelled);
        }

        let mut command = Command::new(program);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = work_dir {
            command.current_dir(dir);
        }

        debug!(program, ?args, ?work_dir, "Running command");

        let child = command.spawn().map_err(|source| CommandError::SpawnFailed {
            program: program.to_string(),
            source,
        })?;

        // 输出在独立任务中读取，调用方放弃等待后管道仍持续排空，
        // 子进程不会因 SIGPIPE 提前退出
        let mut wait = tokio::spawn(child.wait_with_output());

        tokio::select! {
            joined = &mut wait => {
                let result = joined.map_err(|source| CommandError::WaitFailed {
                    program: program.to_string(),
                    source,
                })?;
                return result.map_err(|source| CommandError::SpawnFailed {
                    program: program.to_string(),
                    source,
                });
            }
            _ = cancel.cancelled() => {}
        }

        warn!(program, "Command cancelled, leaving process to finish on its own");
        let program = program.to_string();
        tokio::spawn(async move {
            if let Ok(Ok(output)) = wait.await {
                debug!(program = %program, status = %output.status, "Cancelled command finished");
            }
        });
        Err(CommandError::Cancelled)
    }

    /// 执行命令，非零退出码视为失败
    pub async fn run_checked(
        program: &str,
        args: &[&str],
        work_dir: Option<&Path>,
        cancel: &CancellationToken,
    ) -> Result<Output, CommandError> {
        let output = Self::run(program, args, work_dir, cancel).await?;
        if output.status.success() {
            return Ok(output);
        }

        Err(CommandError::Failed {
            program: program.to_string(),
            status: output.status.to_string(),
            output: combined_output(&output),
        })
    }
}

/// 合并 stderr/stdout，便于写入日志
pub fn combined_output(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    [stderr.trim(), stdout.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_run_success() {
        let cancel = CancellationToken::new();
        let output = CommandRunner::run("echo", &["hello"], Some(&PathBuf::from("/tmp")), &cancel)
            .await
            .unwrap();

        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("hello"));
    }

    #[tokio::test]
    async fn test_run_not_found() {
        let cancel = CancellationToken::new();
        let result = CommandRunner::run("nonexistent_command_12345", &[], None, &cancel).await;

        assert!(matches!(result, Err(CommandError::SpawnFailed { .. })));
    }

    #[tokio::test]
    async fn test_run_checked_failure() {
        let cancel = CancellationToken::new();
        let result =
            CommandRunner::run_checked("sh", &["-c", "echo boom >&2; exit 3"], None, &cancel).await;

        match result {
            Err(CommandError::Failed { output, .. }) => assert_eq!(output, "boom"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_run_cancelled_before_start() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = CommandRunner::run("echo", &["hello"], None, &cancel).await;

        assert!(matches!(result, Err(CommandError::Cancelled)));
    }

    #[tokio::test]
    async fn test_cancelled_command_keeps_running() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");
        let script = format!(
            "sleep 1; echo progress >&2; echo more; touch {}",
            marker.display()
        );

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(200)).await;
            trigger.cancel();
        });

        let result = CommandRunner::run("sh", &["-c", &script], None, &cancel).await;
        assert!(matches!(result, Err(CommandError::Cancelled)));
        assert!(!marker.exists());

        // 进程写 stdout/stderr 后仍应正常结束
        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        assert!(marker.exists());
    }

    #[tokio::test]
    async fn test_dropped_call_keeps_running() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("done");
        let script = format!("sleep 1; echo progress >&2; touch {}", marker.display());
        let cancel = CancellationToken::new();

        let args = ["-c", script.as_str()];
        let call = CommandRunner::run("sh", &args, None, &cancel);
        let timed_out =
            tokio::time::timeout(std::time::Duration::from_millis(200), call).await;
        assert!(timed_out.is_err());

        for _ in 0..50 {
            if marker.exists() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        assert!(marker.exists());
    }
}
