//! 常量和默认配置集中管理
//!
//! 将所有重要常量集中定义，避免"默认值漂移"和重复定义

/// 默认配置值
pub mod defaults {
    /// 默认解码器可执行文件（经PATH查找）
    #[cfg(target_os = "windows")]
    pub const FFMPEG_BINARY: &str = "ffmpeg.exe";

    /// 默认解码器可执行文件（经PATH查找）
    #[cfg(not(target_os = "windows"))]
    pub const FFMPEG_BINARY: &str = "ffmpeg";

    /// 覆盖解码器路径的环境变量
    pub const FFMPEG_ENV_VAR: &str = "FFAUDIO_FFMPEG";

    /// 长度估算余量
    ///
    /// 部分文件的时长由码率估算，可能短于真实长度，预分配时多留5%
    pub const LENGTH_MARGIN: f64 = 1.05;

    /// 解码失败时错误消息中保留的stderr尾部行数
    pub const STDERR_TAIL_LINES: usize = 5;
}

/// 诊断文本中的固定标记
pub mod markers {
    pub const NOT_FOUND: &str = "No such file or directory";
    pub const INVALID_DATA: &str = "Invalid data found";
    pub const DURATION: &str = "Duration";
    pub const STREAM: &str = "Stream";
    pub const FIELD_SEPARATOR: &str = ", ";
}

/// 格式限制
pub mod limits {
    /// 解码器原始PCM输出支持的位宽
    pub const SUPPORTED_BIT_WIDTHS: [u16; 5] = [8, 16, 24, 32, 64];

    /// 浮点样本支持的位宽（解码器只提供 f32/f64）
    pub const FLOAT_BIT_WIDTHS: [u16; 2] = [32, 64];
}
