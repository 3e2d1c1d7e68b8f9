//! 统一错误处理框架
//!
//! 探测与解码流程中所有失败路径共用的错误类型定义。
//! 每个错误在检测点立即返回，不重试、不降级为警告。

use std::fmt;
use std::io;

/// 音频探测/解码相关的统一错误类型
#[derive(Debug)]
pub enum AudioError {
    /// 输入文件不存在或不可访问（诊断文本中的 "No such file or directory"）
    NotFound(String),

    /// 文件存在但内容无法作为媒体解码（诊断文本中的 "Invalid data found"）
    InvalidData(String),

    /// 诊断文本与预期模式不符，消息中始终包含出错的原始文本片段
    ParseError(String),

    /// 请求的样本格式没有对应的解码器格式标记
    UnsupportedFormat(String),

    /// 解码子进程失败（非零退出、读取失败）
    DecodingError(String),

    /// 解码器可执行文件无法启动
    ResourceError(String),

    /// 预分配缓冲区失败
    OutOfMemory,

    /// 其他文件/管道I/O错误
    IoError(io::Error),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioError::NotFound(msg) => write!(f, "文件未找到 / not found: {msg}"),
            AudioError::InvalidData(msg) => write!(f, "无效数据 / invalid data: {msg}"),
            AudioError::ParseError(msg) => write!(f, "诊断文本解析失败 / parse error: {msg}"),
            AudioError::UnsupportedFormat(msg) => {
                write!(f, "不支持的样本格式 / unsupported format: {msg}")
            }
            AudioError::DecodingError(msg) => write!(f, "音频解码失败 / decoding error: {msg}"),
            AudioError::ResourceError(msg) => write!(f, "资源访问错误 / resource error: {msg}"),
            AudioError::OutOfMemory => write!(f, "内存不足 / out of memory"),
            AudioError::IoError(err) => write!(f, "文件I/O错误 / I/O error: {err}"),
        }
    }
}

impl std::error::Error for AudioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AudioError::IoError(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for AudioError {
    fn from(err: io::Error) -> Self {
        AudioError::IoError(err)
    }
}

/// 音频处理操作的标准Result类型
pub type AudioResult<T> = Result<T, AudioError>;

// ==================== 错误转换Helper函数 ====================
// 消除重复的 .map_err(|e| AudioError::XXX(format!(...))) 模式

/// 创建解析错误的helper函数
#[inline]
pub fn parse_error<E: fmt::Display>(context: &str, fragment: E) -> AudioError {
    AudioError::ParseError(format!("{context} '{fragment}'"))
}

/// 创建格式不支持错误的helper函数
#[inline]
pub fn unsupported_format<E: fmt::Display>(context: &str, detail: E) -> AudioError {
    AudioError::UnsupportedFormat(format!("{context}: {detail}"))
}

/// 创建解码错误的helper函数
#[inline]
pub fn decoding_error<E: fmt::Display>(context: &str, err: E) -> AudioError {
    AudioError::DecodingError(format!("{context}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_parse_error_embeds_fragment() {
        let err = parse_error("Unable to parse rate from", "44100 kHz");
        let msg = err.to_string();
        assert!(msg.contains("'44100 kHz'"), "{msg}");
        assert!(matches!(err, AudioError::ParseError(_)));
    }

    #[test]
    fn test_io_error_keeps_source() {
        let err: AudioError = io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed").into();
        assert!(err.source().is_some());
        assert!(err.to_string().contains("pipe closed"));
    }
}
