//! 事件过滤
//!
//! 决定一个 push 事件是否需要处理。分支不匹配或没有修改的文件都不是错误，
//! 只是以 204 结束请求

use crate::domain::PushEvent;

/// 忽略原因
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// 推送的不是默认分支
    NotDefaultBranch,
    /// 没有被修改的文件
    NoChanges,
}

impl IgnoreReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::NotDefaultBranch => "push is not to the default branch",
            IgnoreReason::NoChanges => "push contains no modified files",
        }
    }
}

/// 过滤结果
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Process,
    Ignore(IgnoreReason),
}

/// 判断 push 事件是否需要处理
pub fn accept(event: &PushEvent) -> Decision {
    if !event.git_ref.ends_with(&event.default_branch) {
        return Decision::Ignore(IgnoreReason::NotDefaultBranch);
    }

    if event.changed_paths.iter().all(|p| p.trim().is_empty()) {
        return Decision::Ignore(IgnoreReason::NoChanges);
    }

    Decision::Process
}
