//! 测试替身：记录调用并可按 stack 注入失败

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::domain::{Stack, StackMember};
use crate::infra::{CommandError, ComposeBackend, ComposeError, SourceUpdater, UpdateError};

/// 跨替身共享的调用记录，用于断言调用顺序
#[derive(Clone, Debug, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, call: String) {
        self.0.lock().unwrap().push(call);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn failed(program: &str) -> CommandError {
    CommandError::Failed {
        program: program.to_string(),
        status: "exit status: 1".to_string(),
        output: "simulated failure".to_string(),
    }
}

#[derive(Debug, Default)]
pub struct RecordingCompose {
    log: CallLog,
    members: HashMap<String, Vec<StackMember>>,
    fail_stop: HashSet<String>,
    fail_start: HashSet<String>,
}

impl RecordingCompose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_log(log: CallLog) -> Self {
        Self {
            log,
            ..Self::default()
        }
    }

    pub fn with_members(mut self, stack: &str, members: Vec<StackMember>) -> Self {
        self.members.insert(stack.to_string(), members);
        self
    }

    pub fn failing_stop(mut self, stack: &str) -> Self {
        self.fail_stop.insert(stack.to_string());
        self
    }

    pub fn failing_start(mut self, stack: &str) -> Self {
        self.fail_start.insert(stack.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.entries()
    }
}

#[async_trait]
impl ComposeBackend for RecordingCompose {
    async fn stop(&self, stack: &Stack, _cancel: &CancellationToken) -> Result<(), ComposeError> {
        self.log.push(format!("stop:{}", stack.name));
        if self.fail_stop.contains(&stack.name) {
            return Err(ComposeError::Stop(failed("docker")));
        }
        Ok(())
    }

    async fn start(&self, stack: &Stack, _cancel: &CancellationToken) -> Result<(), ComposeError> {
        self.log.push(format!("start:{}", stack.name));
        if self.fail_start.contains(&stack.name) {
            return Err(ComposeError::Start(failed("docker")));
        }
        Ok(())
    }

    async fn list_members(
        &self,
        stack_name: &str,
        _cancel: &CancellationToken,
    ) -> Result<Vec<StackMember>, ComposeError> {
        self.log.push(format!("list:{}", stack_name));
        Ok(self.members.get(stack_name).cloned().unwrap_or_default())
    }
}

#[derive(Debug, Default)]
pub struct RecordingUpdater {
    log: CallLog,
    fail: bool,
}

impl RecordingUpdater {
    pub fn with_log(log: CallLog) -> Self {
        Self { log, fail: false }
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl SourceUpdater for RecordingUpdater {
    async fn update(&self, dir: &Path, _cancel: &CancellationToken) -> Result<(), UpdateError> {
        self.log.push(format!("update:{}", dir.display()));
        if self.fail {
            return Err(UpdateError(failed("git")));
        }
        Ok(())
    }
}
