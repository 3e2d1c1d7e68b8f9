//! 音频探测与解码模块
//!
//! 通过FFmpeg子进程完成两步流程：诊断文本探测流信息，再管道读取原始PCM。

mod buffer;
pub mod ffmpeg_bridge;
mod format;
pub mod diagnostics;
mod sample;

pub mod decoder;

pub use buffer::{DecodedAudio, SampleBuffer, Samples};
pub use decoder::{FfmpegDecoder, decode, estimate_buffer_bytes, probe};
pub use format::{ByteOrder, FormatTokens, SampleFormat, SampleKind};
pub use diagnostics::{StreamInfo, parse_diagnostics};
pub use sample::{I24, Sample, U24, samples_from_bytes};
