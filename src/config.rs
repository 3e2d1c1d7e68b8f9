//! 解码器配置
//!
//! 取代全局可执行文件路径常量：路径与缓冲策略在构造解码器时显式传入。

use crate::audio::ffmpeg_bridge;
use crate::constants::defaults;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 读取解码器stdout的缓冲策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadStrategy {
    /// 按探测时长 × 余量预分配，超出部分截断
    #[default]
    Preallocated,
    /// 读到EOF，缓冲区按需增长，不截断
    Growable,
}

/// 解码器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// FFmpeg可执行文件（裸文件名时经PATH查找）
    pub ffmpeg_path: PathBuf,

    /// 预分配长度余量（乘在探测时长上）
    pub length_margin: f64,

    pub read_strategy: ReadStrategy,

    /// 解码流读到EOF后是否检查子进程退出状态
    pub check_exit_status: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from(defaults::FFMPEG_BINARY),
            length_margin: defaults::LENGTH_MARGIN,
            read_strategy: ReadStrategy::default(),
            check_exit_status: true,
        }
    }
}

impl DecoderConfig {
    /// 默认配置，`FFAUDIO_FFMPEG` 环境变量可覆盖可执行文件路径
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(path) = std::env::var_os(defaults::FFMPEG_ENV_VAR).filter(|p| !p.is_empty()) {
            config.ffmpeg_path = PathBuf::from(path);
        }
        config
    }

    /// 探测常见安装位置，找不到时退回默认文件名
    pub fn detect() -> Self {
        let mut config = Self::from_env();
        if std::env::var_os(defaults::FFMPEG_ENV_VAR).is_none() {
            if let Some(path) = ffmpeg_bridge::locate_ffmpeg() {
                config.ffmpeg_path = path;
            }
        }
        config
    }

    pub fn with_ffmpeg_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.ffmpeg_path = path.into();
        self
    }

    /// 余量小于1.0（或非有限值）时按1.0处理
    pub fn with_length_margin(mut self, margin: f64) -> Self {
        self.length_margin = margin;
        self
    }

    pub fn with_read_strategy(mut self, strategy: ReadStrategy) -> Self {
        self.read_strategy = strategy;
        self
    }

    pub fn with_exit_status_check(mut self, check: bool) -> Self {
        self.check_exit_status = check;
        self
    }
}
