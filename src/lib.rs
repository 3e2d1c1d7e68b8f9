//! ffaudio-pipe
//!
//! 借助FFmpeg子进程把任意媒体文件中的音频解码为内存样本数组。
//!
//! ## 流程
//! - 探测：`ffmpeg -i <path>`，从stderr诊断文本中解析时长、采样率、编解码器、声道数
//! - 解码：`ffmpeg -i <path> -vn -f <fmt> -acodec pcm_<fmt> -`，按探测时长×1.05预分配缓冲区读取stdout
//! - 单声道返回一维数组，多声道返回 `(frames, channels)` 矩阵
//!
//! ```no_run
//! use ffaudio_pipe::{FfmpegDecoder, DecoderConfig, SampleBuffer};
//!
//! let decoder = FfmpegDecoder::new(DecoderConfig::from_env());
//! let decoded = decoder.decode::<i16>("song.flac")?;
//! println!("{:.2}s @ {} Hz", decoded.info.seconds, decoded.info.rate_hz);
//! if let SampleBuffer::Multi(frames) = &decoded.samples {
//!     println!("{:?}", frames.shape());
//! }
//! # Ok::<(), ffaudio_pipe::AudioError>(())
//! ```

pub mod audio;
pub mod config;
pub mod constants;
pub mod error;

// 重新导出核心类型
pub use audio::{
    ByteOrder, DecodedAudio, FfmpegDecoder, FormatTokens, I24, Sample, SampleBuffer,
    SampleFormat, SampleKind, Samples, StreamInfo, U24, decode, parse_diagnostics, probe,
};
pub use config::{DecoderConfig, ReadStrategy};
pub use error::{AudioError, AudioResult};
