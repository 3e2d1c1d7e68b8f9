//! 解码器测试固件生成器
//!
//! - 诊断文本固件：从不同版本FFmpeg采集的 `ffmpeg -i` 输出
//! - 伪解码器脚本（仅unix）：按参数个数区分探测/解码调用，输出预设的诊断文本与PCM负载
//! - WAV固件：用hound生成，供真实FFmpeg端到端测试使用

#![allow(dead_code)]

use hound::{SampleFormat as WavSampleFormat, WavSpec, WavWriter};
use std::fs::create_dir_all;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

pub fn log(msg_zh: impl AsRef<str>, msg_en: impl AsRef<str>) {
    println!("{} / {}", msg_zh.as_ref(), msg_en.as_ref());
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// 每个测试进程独立的固件目录，避免多个测试二进制并发写同一文件
pub fn fixtures_dir() -> &'static PathBuf {
    static ROOT: OnceLock<PathBuf> = OnceLock::new();
    ROOT.get_or_init(|| {
        let path = std::env::temp_dir().join(format!("ffaudio-pipe-fixtures-{}", std::process::id()));
        create_dir_all(&path).expect("无法创建测试固件目录");
        path
    })
}

// ========== 诊断文本固件 ==========

/// FFmpeg 4.x，16位立体声WAV
pub const WAV_S16_STEREO_FF4: &str = "\
ffmpeg version 4.4.2-0ubuntu0.22.04.1 Copyright (c) 2000-2021 the FFmpeg developers
  built with gcc 11 (Ubuntu 11.2.0-19ubuntu1)
  libavutil      56. 70.100 / 56. 70.100
Guessed Channel Layout for Input Stream #0.0 : stereo
Input #0, wav, from 'tone.wav':
  Duration: 00:00:05.00, bitrate: 1411 kb/s
  Stream #0:0: Audio: pcm_s16le ([1][0][0][0] / 0x0001), 44100 Hz, stereo, s16, 1411 kb/s
At least one output file must be specified
";

/// FFmpeg 6.x，MP3单声道（时长由码率估算）
pub const MP3_MONO_FF6: &str = "\
ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers
  configuration: --enable-gpl --enable-libmp3lame
Input #0, mp3, from 'speech.mp3':
  Duration: 00:01:02.48, start: 0.025057, bitrate: 64 kb/s
  Stream #0:0: Audio: mp3, 22050 Hz, mono, fltp, 64 kb/s
At least one output file must be specified
";

/// FFmpeg 7.x，FLAC 5.1，带语言标记的流行
pub const FLAC_51_FF7: &str = "\
ffmpeg version 7.0.1 Copyright (c) 2000-2024 the FFmpeg developers
Input #0, flac, from 'surround.flac':
  Duration: 01:02:03.25, start: 0.000000, bitrate: 2304 kb/s
  Stream #0:0(eng): Audio: flac, 48000 Hz, 5.1(side), s32 (24 bit)
At least one output file must be specified
";

/// 无已知布局名时FFmpeg打印 "N channels"
pub const WAV_6CH_COUNT: &str = "\
Input #0, wav, from 'multi.wav':
  Duration: 00:00:00.50, bitrate: 4608 kb/s
  Stream #0:0: Audio: pcm_s16le ([1][0][0][0] / 0x0001), 48000 Hz, 6 channels, s16, 4608 kb/s
At least one output file must be specified
";

pub const MISSING_FILE: &str = "\
ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers
missing.wav: No such file or directory
";

pub const GARBAGE_FILE: &str = "\
ffmpeg version 6.1.1 Copyright (c) 2000-2023 the FFmpeg developers
[mp3 @ 0x55d0c8a4e300] Failed to read frame size: Could not seek to 1026.
garbage.mp3: Invalid data found when processing input
";

/// 视频文件：时长行后紧跟的是元数据块而不是Stream行
pub const METADATA_AFTER_DURATION: &str = "\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'clip.m4a':
  Metadata:
    major_brand     : M4A
  Duration: 00:03:20.05, start: 0.000000, bitrate: 129 kb/s
    Chapters:
    Chapter #0:0: start 0.000000, end 200.050000
  Stream #0:0(und): Audio: aac (LC) (mp4a / 0x6134706D), 44100 Hz, stereo, fltp, 127 kb/s
At least one output file must be specified
";

pub const NO_DURATION: &str = "\
Input #0, s16le, from 'raw.pcm':
  Stream #0:0: Audio: pcm_s16le, 44100 Hz, stereo, s16, 1411 kb/s
At least one output file must be specified
";

pub const DURATION_NA: &str = "\
Input #0, ogg, from 'live.ogg':
  Duration: N/A, start: 0.000000, bitrate: N/A
  Stream #0:0: Audio: vorbis, 44100 Hz, stereo, fltp, 128 kb/s
At least one output file must be specified
";

/// 构造最小诊断文本
pub fn diagnostics(duration: &str, stream_tail: &str) -> String {
    format!(
        "Input #0, wav, from 'fake.wav':\n  Duration: {duration}, bitrate: 256 kb/s\n  Stream #0:0: Audio: {stream_tail}\nAt least one output file must be specified\n"
    )
}

// ========== 伪解码器（unix shell脚本） ==========

/// 伪解码器场景
pub struct FakeDecoderScenario {
    pub name: &'static str,
    /// 探测调用（恰好两个参数 `-i <path>`）写到stderr的文本
    pub probe_diagnostics: String,
    /// 解码调用写到stdout的PCM负载
    pub payload: Vec<u8>,
    /// 解码调用写到stderr的文本
    pub decode_stderr: String,
    pub decode_exit_code: i32,
}

/// 已生成的伪解码器
#[derive(Debug, Clone)]
pub struct FakeDecoder {
    pub script: PathBuf,
    pub args_log: PathBuf,
}

impl FakeDecoder {
    /// 每次调用记录的参数行
    pub fn invocations(&self) -> Vec<String> {
        std::fs::read_to_string(&self.args_log)
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }
}

#[cfg(unix)]
fn write_fake_decoder(root: &Path, scenario: &FakeDecoderScenario) -> FakeDecoder {
    use std::os::unix::fs::PermissionsExt;

    let dir = root.join(scenario.name);
    create_dir_all(&dir).expect("无法创建伪解码器目录");

    let diagnostics = dir.join("diagnostics.txt");
    let payload = dir.join("payload.bin");
    let decode_stderr = dir.join("decode_stderr.txt");
    let args_log = dir.join("args.log");
    std::fs::write(&diagnostics, &scenario.probe_diagnostics).expect("写入诊断文本失败");
    std::fs::write(&payload, &scenario.payload).expect("写入PCM负载失败");
    std::fs::write(&decode_stderr, &scenario.decode_stderr).expect("写入stderr文本失败");

    let script = dir.join("ffmpeg");
    let body = format!(
        "#!/bin/sh\n\
         if [ \"$1\" = \"-version\" ]; then\n  echo 'ffmpeg version fake'\n  exit 0\nfi\n\
         echo \"$@\" >> '{args}'\n\
         if [ \"$#\" -eq 2 ]; then\n  cat '{diag}' >&2\n  exit 1\nfi\n\
         cat '{payload}'\n\
         cat '{stderr}' >&2\n\
         exit {code}\n",
        args = args_log.display(),
        diag = diagnostics.display(),
        payload = payload.display(),
        stderr = decode_stderr.display(),
        code = scenario.decode_exit_code,
    );
    std::fs::write(&script, body).expect("写入伪解码器脚本失败");
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755))
        .expect("设置脚本权限失败");

    FakeDecoder { script, args_log }
}

/// 一次性生成全部伪解码器
///
/// 所有脚本在任何子进程启动之前写完，避免并行测试中fork继承可写句柄导致 ETXTBSY。
#[cfg(unix)]
pub fn fake_decoders(scenarios: fn() -> Vec<FakeDecoderScenario>) -> &'static [(String, FakeDecoder)] {
    static DECODERS: OnceLock<Vec<(String, FakeDecoder)>> = OnceLock::new();
    DECODERS.get_or_init(|| {
        let root = fixtures_dir().join("fake_decoders");
        let generated: Vec<(String, FakeDecoder)> = scenarios()
            .iter()
            .map(|s| (s.name.to_string(), write_fake_decoder(&root, s)))
            .collect();
        log(
            format!("已生成 {} 个伪解码器", generated.len()),
            format!("Generated {} fake decoders", generated.len()),
        );
        generated
    })
}

// ========== 字节编码工具 ==========

pub fn s16le_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

pub fn s16be_bytes(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_be_bytes()).collect()
}

pub fn f32le_bytes(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

// ========== WAV固件（真实FFmpeg测试） ==========

/// 生成16位PCM WAV，样本值为 `frame * channels + channel`（便于校验交错顺序）
pub fn create_counting_wav(name: &str, channels: u16, sample_rate: u32, frames: u32) -> PathBuf {
    let path = fixtures_dir().join(name);
    let spec = WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: WavSampleFormat::Int,
    };
    let mut writer = WavWriter::create(&path, spec).expect("无法创建WAV固件");
    for frame in 0..frames {
        for channel in 0..channels {
            let value = (frame * channels as u32 + channel as u32) % 30000;
            writer.write_sample(value as i16).expect("无法写入样本");
        }
    }
    writer.finalize().expect("无法完成写入");
    log(
        format!("  生成 {name} ({channels} 声道, {frames} 帧)"),
        format!("  Generated {name} ({channels} ch, {frames} frames)"),
    );
    path
}

/// 伪装成音频的文本文件
pub fn create_fake_audio(name: &str) -> PathBuf {
    let path = fixtures_dir().join(name);
    std::fs::write(&path, b"This is not an audio file").expect("无法写入伪音频文件");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_helpers() {
        assert_eq!(s16le_bytes(&[1, -1]), vec![0x01, 0x00, 0xFF, 0xFF]);
        assert_eq!(s16be_bytes(&[1]), vec![0x00, 0x01]);
        assert_eq!(f32le_bytes(&[1.0]).len(), 4);
    }

    #[test]
    fn test_diagnostics_builder() {
        let text = diagnostics("00:00:01.00", "pcm_s16le, 8 Hz, mono, s16");
        assert!(text.contains("Duration: 00:00:01.00"));
        assert!(text.contains("Stream #0:0: Audio: pcm_s16le, 8 Hz, mono"));
    }
}
