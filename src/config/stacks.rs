//! Stack 配置文件
//!
//! `.restart-compose.yaml` 列出各个 compose 文件相对于配置目录的路径：
//!
//! ```yaml
//! stacks:
//!   - web/docker-compose.yml
//!   - monitoring/compose.yaml
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::env::constants::CONFIG_FILE_NAME;

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to get current working directory: {0}")]
    CurrentDir(#[source] std::io::Error),

    #[error("specified directory does not exist: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("configuration file .restart-compose.yaml not found in directory: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("no stacks configured in {}", .0.display())]
    Empty(PathBuf),
}

/// `.restart-compose.yaml` 内容
#[derive(Clone, Debug, Default, Deserialize)]
pub struct StacksFile {
    #[serde(default)]
    pub stacks: Vec<String>,
}

/// 已加载的配置
#[derive(Clone, Debug)]
pub struct LoadedConfig {
    /// 配置文件的绝对路径
    pub path: PathBuf,
    /// 配置文件所在目录，也是 git 仓库根目录
    pub root: PathBuf,
    /// 相对路径列表（已去掉空白项）
    pub stacks: Vec<String>,
}

/// 在指定目录（默认当前目录）中查找配置文件
pub fn find(dir: Option<&Path>) -> Result<PathBuf, ConfigError> {
    let search_dir = match dir {
        None => std::env::current_dir().map_err(ConfigError::CurrentDir)?,
        Some(dir) => {
            let dir = if dir.is_absolute() {
                dir.to_path_buf()
            } else {
                std::env::current_dir()
                    .map_err(ConfigError::CurrentDir)?
                    .join(dir)
            };
            if !dir.is_dir() {
                return Err(ConfigError::DirectoryNotFound(dir));
            }
            dir
        }
    };

    let path = search_dir.join(CONFIG_FILE_NAME);
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(search_dir));
    }

    Ok(path)
}

/// 读取并解析配置文件
pub fn load(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let file = parse(&data).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    let stacks: Vec<String> = file
        .stacks
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if stacks.is_empty() {
        return Err(ConfigError::Empty(path.to_path_buf()));
    }

    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    Ok(LoadedConfig {
        path: path.to_path_buf(),
        root,
        stacks,
    })
}

fn parse(data: &str) -> Result<StacksFile, serde_yaml::Error> {
    // 空文件解析为 null
    if data.trim().is_empty() {
        return Ok(StacksFile::default());
    }
    serde_yaml::from_str(data)
}
