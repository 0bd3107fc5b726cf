//! Stack 领域模型

use serde::Serialize;
use std::path::{Path, PathBuf};

/// 一个 docker compose stack
///
/// 启动时由配置构建，之后只读；`exists`/`members` 的刷新会产生新值而不是原地修改
#[derive(Clone, Debug, Serialize)]
pub struct Stack {
    /// compose 文件的绝对路径
    pub compose_file: PathBuf,
    /// stack 名称（compose 文件所在目录名）
    pub name: String,
    /// compose 文件所在目录
    pub directory: PathBuf,
    /// 上次检查时 compose 文件是否存在
    pub exists: bool,
    /// 上次查询时的运行成员
    pub members: Vec<StackMember>,
}

/// stack 的运行成员（容器）
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StackMember {
    pub id: String,
    pub name: String,
    /// `com.docker.compose.service` 标签
    pub service: String,
    pub state: String,
    pub status: String,
}

impl Stack {
    /// 根据配置目录和相对路径构建 stack，并检查文件是否存在
    pub fn from_config(root: &Path, relative: &str) -> Self {
        let compose_file = root.join(relative);
        let exists = compose_file.is_file();
        Self::new(compose_file, exists)
    }

    pub fn new(compose_file: PathBuf, exists: bool) -> Self {
        let name = stack_name(&compose_file);
        let directory = compose_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            compose_file,
            name,
            directory,
            exists,
            members: Vec::new(),
        }
    }

    /// 生成带有最新状态的新值
    pub fn refreshed(&self, members: Vec<StackMember>) -> Self {
        Self {
            exists: self.compose_file.is_file(),
            members,
            ..self.clone()
        }
    }

    /// compose 文件路径是否以变更路径结尾（按路径分量比较）
    pub fn matches_path(&self, changed: &str) -> bool {
        let changed = changed.trim_start_matches('/');
        !changed.is_empty() && self.compose_file.ends_with(changed)
    }

    /// 正在运行的成员数量
    pub fn running_count(&self) -> usize {
        self.members
            .iter()
            .filter(|m| m.state.eq_ignore_ascii_case("running"))
            .count()
    }
}

/// 从 compose 文件路径提取 stack 名称
pub fn stack_name(compose_file: &Path) -> String {
    compose_file
        .parent()
        .and_then(Path::file_name)
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
