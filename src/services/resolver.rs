//! 变更路径到 stack 的映射

use crate::domain::Stack;

/// 一次 push 需要重启的 stack，去重且保持首次匹配顺序
#[derive(Clone, Debug, Default)]
pub struct DeploymentPlan<'a> {
    stacks: Vec<&'a Stack>,
}

impl<'a> DeploymentPlan<'a> {
    pub fn stacks(&self) -> &[&'a Stack] {
        &self.stacks
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn names(&self) -> Vec<String> {
        self.stacks.iter().map(|s| s.name.clone()).collect()
    }

    fn push(&mut self, stack: &'a Stack) {
        if !self
            .stacks
            .iter()
            .any(|s| s.compose_file == stack.compose_file)
        {
            self.stacks.push(stack);
        }
    }
}

/// 计算受影响的 stack
///
/// 每个路径按配置顺序取第一个匹配的 stack；没有匹配的路径直接跳过
pub fn resolve<'a, S: AsRef<str>>(changed_paths: &[S], stacks: &'a [Stack]) -> DeploymentPlan<'a> {
    let mut plan = DeploymentPlan::default();

    for path in changed_paths.iter().map(|p| p.as_ref()) {
        if path.trim().is_empty() {
            continue;
        }

        if let Some(stack) = stacks.iter().find(|s| s.matches_path(path)) {
            plan.push(stack);
        }
    }

    plan
}
