// src/config/file.rs

use crate::{
    config::ExternalConfig,
    constants,
    error::{AppError, AppResult},
};
use anyhow::{Context, anyhow};
use log::{debug, info};
use std::{
    fs,
    path::{Path, PathBuf},
};

pub fn get_config_dir() -> AppResult<PathBuf> {
    let dir = dirs::home_dir()
        .ok_or_else(|| AppError::Other(anyhow!("无法获取用户主目录")))?
        .join(constants::CONFIG_DIR_NAME);
    Ok(dir)
}

pub(super) fn get_config_path() -> AppResult<PathBuf> {
    Ok(get_config_dir()?.join(constants::CONFIG_FILE_NAME))
}

fn read_config(path: &Path) -> AppResult<ExternalConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("读取配置文件 '{}' 失败", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("解析配置文件 '{}' 失败", path.display()))
        .map_err(AppError::from)
}

/// 读取配置文件。显式指定的路径必须存在；默认路径不存在时写入一份默认配置。
pub(crate) fn load_or_create_external_config(explicit: Option<&Path>) -> AppResult<ExternalConfig> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(AppError::Config(format!("配置文件 '{}' 不存在", path.display())));
        }
        debug!("使用命令行指定的配置文件: {}", path.display());
        return read_config(path);
    }

    let config_path = get_config_path()?;
    if config_path.is_file() {
        debug!("使用本地配置文件: {}", config_path.display());
        read_config(&config_path)
    } else {
        info!("配置文件 {:?} 不存在，将创建默认配置。", config_path);
        let config = ExternalConfig::default_app_config();

        if let Some(dir) = config_path.parent() {
            fs::create_dir_all(dir)?;
        }

        let json_content = serde_json::to_string_pretty(&config)?;
        fs::write(&config_path, json_content)?;

        Ok(config)
    }
}
