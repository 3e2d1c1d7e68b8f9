//! FFmpeg管道解码器
//!
//! 先探测流信息，再让FFmpeg丢弃视频、把原始交错PCM写到stdout，
//! 按探测时长估算的大小读入内存，最后重解释为目标样本类型并按声道重排。

use super::buffer::{DecodedAudio, SampleBuffer, Samples};
use super::ffmpeg_bridge::{self, FfmpegProcess};
use super::format::{ByteOrder, SampleFormat, SampleKind};
use super::diagnostics::{StreamInfo, run_probe};
use super::sample::{I24, Sample, U24, samples_from_bytes};
use crate::config::{DecoderConfig, ReadStrategy};
use crate::constants::defaults::STDERR_TAIL_LINES;
use crate::error::{self, AudioError, AudioResult};
use std::ffi::OsStr;
use std::io::{ErrorKind, Read};
use std::path::Path;

/// 基于FFmpeg子进程的音频解码器
///
/// 无内部状态，可重复调用；每次调用独占自己的子进程与缓冲区。
#[derive(Debug, Clone)]
pub struct FfmpegDecoder {
    config: DecoderConfig,
}

impl Default for FfmpegDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::from_env())
    }
}

impl FfmpegDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// 检测配置的FFmpeg是否可用
    pub fn is_available(&self) -> bool {
        ffmpeg_bridge::is_available(&self.config.ffmpeg_path)
    }

    /// 探测文件的时长、采样率、编解码器和声道数
    pub fn probe(&self, path: impl AsRef<Path>) -> AudioResult<StreamInfo> {
        run_probe(&self.config.ffmpeg_path, path.as_ref())
    }

    /// 以本机字节序解码为 `T` 类型样本
    pub fn decode<T: Sample>(&self, path: impl AsRef<Path>) -> AudioResult<DecodedAudio<T>> {
        self.decode_with_order(path, ByteOrder::Native)
    }

    /// 指定管道字节序解码为 `T` 类型样本
    ///
    /// 字节序只影响FFmpeg输出的线上格式，返回的样本始终为本机数值。
    pub fn decode_with_order<T: Sample>(
        &self,
        path: impl AsRef<Path>,
        byte_order: ByteOrder,
    ) -> AudioResult<DecodedAudio<T>> {
        let (info, bytes) = self.decode_bytes(path.as_ref(), &T::format(byte_order))?;
        let samples = samples_from_bytes::<T>(&bytes, byte_order);
        let samples = SampleBuffer::from_interleaved(samples, usize::from(info.channels));
        Ok(DecodedAudio { info, samples })
    }

    /// 按运行时给定的样本格式解码
    pub fn decode_format(
        &self,
        path: impl AsRef<Path>,
        format: SampleFormat,
    ) -> AudioResult<(StreamInfo, Samples)> {
        // 先校验，保证不支持的格式不会启动任何子进程
        format.tokens()?;
        let path = path.as_ref();
        let order = format.byte_order;
        let decoder = self;

        macro_rules! decode_as {
            ($variant:ident, $ty:ty) => {{
                let decoded = decoder.decode_with_order::<$ty>(path, order)?;
                (decoded.info, Samples::$variant(decoded.samples))
            }};
        }

        let decoded = match (format.kind, format.bits) {
            (SampleKind::Signed, 8) => decode_as!(I8, i8),
            (SampleKind::Unsigned, 8) => decode_as!(U8, u8),
            (SampleKind::Signed, 16) => decode_as!(I16, i16),
            (SampleKind::Unsigned, 16) => decode_as!(U16, u16),
            (SampleKind::Signed, 24) => decode_as!(I24, I24),
            (SampleKind::Unsigned, 24) => decode_as!(U24, U24),
            (SampleKind::Signed, 32) => decode_as!(I32, i32),
            (SampleKind::Unsigned, 32) => decode_as!(U32, u32),
            (SampleKind::Signed, 64) => decode_as!(I64, i64),
            (SampleKind::Unsigned, 64) => decode_as!(U64, u64),
            (SampleKind::Float, 32) => decode_as!(F32, f32),
            (SampleKind::Float, 64) => decode_as!(F64, f64),
            _ => {
                return Err(error::unsupported_format(
                    &format!("Cannot read audio into '{format}'"),
                    "no sample type for this kind and width",
                ));
            }
        };
        Ok(decoded)
    }

    /// 探测 + 启动解码 + 读取原始PCM字节
    fn decode_bytes(
        &self,
        path: &Path,
        format: &SampleFormat,
    ) -> AudioResult<(StreamInfo, Vec<u8>)> {
        let tokens = format.tokens()?;
        let info = self.probe(path)?;

        let args = [
            OsStr::new("-i"),
            path.as_os_str(),
            OsStr::new("-vn"), // 忽略视频
            OsStr::new("-f"),
            OsStr::new(&tokens.format),
            OsStr::new("-acodec"),
            OsStr::new(&tokens.codec),
            OsStr::new("-"), // 输出到stdout
        ];
        let mut process = FfmpegProcess::spawn(&self.config.ffmpeg_path, args)?;

        let estimate = estimate_buffer_bytes(&info, format.item_size(), self.config.length_margin);
        log::debug!(
            "{}: {:.3}s, {} Hz, {} ch → estimated {estimate} bytes of {}",
            path.display(),
            info.seconds,
            info.rate_hz,
            info.channels,
            tokens.format
        );

        let outcome = {
            let stdout = process.stdout()?;
            match self.config.read_strategy {
                ReadStrategy::Preallocated => read_preallocated(stdout, estimate),
                ReadStrategy::Growable => read_growable(stdout, estimate),
            }
        }?;

        if outcome.reached_eof {
            let (status, diagnostics) = process.finish()?;
            if !status.success() {
                let tail = stderr_tail(&diagnostics, STDERR_TAIL_LINES);
                if self.config.check_exit_status {
                    return Err(error::decoding_error(
                        &format!("FFmpeg exited with {status} while decoding {}", path.display()),
                        tail,
                    ));
                }
                log::warn!(
                    "FFmpeg exited with {status} while decoding {} (unchecked): {tail}",
                    path.display()
                );
            }
        } else {
            log::warn!(
                "{}: decoded audio exceeds the estimated {estimate} bytes, output truncated",
                path.display()
            );
            process.terminate();
            process.finish()?;
        }

        log::info!(
            "decoded {} ({} bytes, {} ch, {} Hz, {})",
            path.display(),
            outcome.bytes.len(),
            info.channels,
            info.rate_hz,
            tokens.format
        );
        Ok((info, outcome.bytes))
    }
}

/// 按探测结果估算需要预分配的字节数
///
/// `seconds × margin × rate × channels` 个样本（向下取整）× 每样本字节数。
/// 余量小于1.0或非有限值时按1.0处理。
pub fn estimate_buffer_bytes(info: &StreamInfo, item_size: usize, margin: f64) -> usize {
    let margin = if margin.is_finite() && margin >= 1.0 {
        margin
    } else {
        1.0
    };
    let samples = info.seconds * margin * f64::from(info.rate_hz) * f64::from(info.channels);
    if !samples.is_finite() || samples <= 0.0 {
        return 0;
    }
    (samples as usize).saturating_mul(item_size)
}

/// 一次读取的结果
#[derive(Debug)]
struct ReadOutcome {
    bytes: Vec<u8>,
    /// false 表示缓冲区写满时流中仍有数据（已截断）
    reached_eof: bool,
}

fn read_error(err: std::io::Error) -> AudioError {
    error::decoding_error("Failed to read from FFmpeg / FFmpeg读取失败", err)
}

/// 读满固定大小的缓冲区或读到EOF
fn read_preallocated<R: Read>(reader: &mut R, capacity: usize) -> AudioResult<ReadOutcome> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(capacity)
        .map_err(|_| AudioError::OutOfMemory)?;
    buffer.resize(capacity, 0);

    let mut filled = 0;
    while filled < capacity {
        match reader.read(&mut buffer[filled..]) {
            Ok(0) => {
                buffer.truncate(filled);
                return Ok(ReadOutcome {
                    bytes: buffer,
                    reached_eof: true,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        }
    }

    // 缓冲区已满：多读一个字节区分"恰好读完"与"被截断"
    let mut extra = [0u8; 1];
    let reached_eof = loop {
        match reader.read(&mut extra) {
            Ok(n) => break n == 0,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(read_error(e)),
        }
    };

    Ok(ReadOutcome {
        bytes: buffer,
        reached_eof,
    })
}

/// 读到EOF，估算值只作为初始容量
fn read_growable<R: Read>(reader: &mut R, capacity_hint: usize) -> AudioResult<ReadOutcome> {
    let mut bytes = Vec::new();
    // 估算值过大时放弃预留，交给增长策略
    let _ = bytes.try_reserve(capacity_hint);
    reader.read_to_end(&mut bytes).map_err(read_error)?;
    Ok(ReadOutcome {
        bytes,
        reached_eof: true,
    })
}

/// 取诊断文本最后几行非空内容
fn stderr_tail(diagnostics: &str, lines: usize) -> String {
    let tail: Vec<&str> = diagnostics
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();
    let start = tail.len().saturating_sub(lines);
    if tail.is_empty() {
        "(no diagnostic output)".to_string()
    } else {
        tail[start..].join(" | ")
    }
}

/// 使用默认配置探测文件
pub fn probe(path: impl AsRef<Path>) -> AudioResult<StreamInfo> {
    FfmpegDecoder::default().probe(path)
}

/// 使用默认配置以本机字节序解码
pub fn decode<T: Sample>(path: impl AsRef<Path>) -> AudioResult<DecodedAudio<T>> {
    FfmpegDecoder::default().decode(path)
}
