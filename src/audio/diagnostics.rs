//! 诊断文本探测
//!
//! 以 `ffmpeg -i <path>` 触发解码器打印输入流信息（没有输出目标，解码器
//! 会在报错前先把元数据写到stderr），再从这段人类可读文本中提取
//! 时长、采样率、编解码器和声道数。
//!
//! 所有模式匹配集中在 [`parse_diagnostics`]，可直接用采集到的真实输出做回归测试。

use super::ffmpeg_bridge::FfmpegProcess;
use crate::constants::markers;
use crate::error::{self, AudioError, AudioResult};
use serde::{Deserialize, Serialize};
use std::ffi::OsStr;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// 探测得到的流信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// 时长（秒）。部分格式由码率估算，可能略短于真实长度
    pub seconds: f64,
    pub rate_hz: u32,
    /// 编解码器短名，如 `pcm_s16le`、`mp3`
    pub codec_name: String,
    pub channels: u16,
}

/// 具名声道布局 → 声道数
///
/// 括号后缀（`5.1(side)`、`7.1(wide)`）在查表前去掉。
const CHANNEL_LAYOUTS: [(&str, u16); 14] = [
    ("downmix", 2),
    ("2.1", 3),
    ("3.0", 3),
    ("4.0", 4),
    ("quad", 4),
    ("3.1", 4),
    ("5.0", 5),
    ("4.1", 5),
    ("5.1", 6),
    ("6.0", 6),
    ("hexagonal", 6),
    ("6.1", 7),
    ("7.1", 8),
    ("octagonal", 8),
];

/// 运行解码器探测文件
pub(crate) fn run_probe(ffmpeg: &Path, path: &Path) -> AudioResult<StreamInfo> {
    let mut process = FfmpegProcess::spawn(ffmpeg, [OsStr::new("-i"), path.as_os_str()])?;

    // 读一行stdout，等解码器把诊断信息刷到stderr
    let mut discarded = Vec::new();
    BufReader::new(process.stdout()?).read_until(b'\n', &mut discarded)?;
    process.terminate();

    let (_, diagnostics) = process.finish()?;
    parse_diagnostics(&diagnostics, path)
}

/// 从解码器诊断文本解析流信息
///
/// 按顺序检查：末行的文件不存在/无效数据标记 → `Duration` 行 → 紧随其后的
/// `Stream` 行（按 `", "` 切分为编解码器、采样率、声道三段）。
/// 任何一步失败立即返回，不返回部分结果。
pub fn parse_diagnostics(text: &str, path: &Path) -> AudioResult<StreamInfo> {
    let lines: Vec<&str> = text.trim_end().lines().collect();
    let Some(last_line) = lines.last() else {
        return Err(error::parse_error(
            &format!("Empty diagnostic output for {}", path.display()),
            "",
        ));
    };

    if last_line.contains(markers::NOT_FOUND) {
        return Err(AudioError::NotFound(format!(
            "{} not found! Wrong path?",
            path.display()
        )));
    }
    if last_line.contains(markers::INVALID_DATA) {
        return Err(AudioError::InvalidData(format!(
            "{} contains invalid data.",
            path.display()
        )));
    }

    let (duration_index, duration_line) = lines
        .iter()
        .enumerate()
        .find(|(_, line)| line.trim().starts_with(markers::DURATION))
        .ok_or_else(|| error::parse_error("No duration line found in", last_line))?;

    let seconds = find_timecode(duration_line)
        .ok_or_else(|| error::parse_error("Unable to parse duration from line", duration_line))?;

    let stream_line = lines
        .get(duration_index + 1)
        .map(|line| line.trim())
        .unwrap_or_default();
    if !stream_line.starts_with(markers::STREAM) {
        return Err(error::parse_error(
            "Unexpected line after duration line:",
            stream_line,
        ));
    }

    let fields: Vec<&str> = stream_line.split(markers::FIELD_SEPARATOR).collect();

    let codec_field = fields[0];
    let codec_name = parse_codec(codec_field)
        .ok_or_else(|| error::parse_error("Unable to parse codec from", codec_field))?;

    let rate_field = fields.get(1).copied().unwrap_or_default();
    let rate_hz = parse_rate(rate_field)
        .filter(|&rate| rate > 0)
        .ok_or_else(|| error::parse_error("Unable to parse rate from", rate_field))?;

    let channels_field = fields.get(2).copied().unwrap_or_default();
    let channels = parse_channels(channels_field)
        .filter(|&channels| channels > 0)
        .ok_or_else(|| error::parse_error("Unable to parse channels from", channels_field))?;

    Ok(StreamInfo {
        seconds,
        rate_hz,
        codec_name: codec_name.to_string(),
        channels,
    })
}

/// 在行内查找 `H+:MM:SS.f+` 并换算为秒
fn find_timecode(line: &str) -> Option<f64> {
    line.char_indices()
        .find_map(|(start, _)| match_timecode(&line[start..]))
}

fn match_timecode(text: &str) -> Option<f64> {
    let b = text.as_bytes();
    let digit = |i: usize| b.get(i).is_some_and(u8::is_ascii_digit);

    let hours_len = b.iter().take_while(|c| c.is_ascii_digit()).count();
    if hours_len == 0 {
        return None;
    }
    // 定位 ":MM:SS." 的各个偏移
    let h = hours_len;
    let shape_ok = b.get(h) == Some(&b':')
        && digit(h + 1)
        && digit(h + 2)
        && b.get(h + 3) == Some(&b':')
        && digit(h + 4)
        && digit(h + 5)
        && b.get(h + 6) == Some(&b'.');
    if !shape_ok {
        return None;
    }
    let fraction_len = b[h + 7..].iter().take_while(|c| c.is_ascii_digit()).count();
    if fraction_len == 0 {
        return None;
    }

    let hours: f64 = text[..h].parse().ok()?;
    let minutes: f64 = text[h + 1..h + 3].parse().ok()?;
    let seconds: f64 = text[h + 4..h + 7 + fraction_len].parse().ok()?;
    Some(hours * 3600.0 + minutes * 60.0 + seconds)
}

/// `Audio: <word>`，word为字母数字或下划线
fn parse_codec(field: &str) -> Option<&str> {
    let (_, after) = field.split_once("Audio: ")?;
    let end = after
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(after.len());
    (end > 0).then(|| &after[..end])
}

/// `<integer> Hz`
fn parse_rate(field: &str) -> Option<u32> {
    field.match_indices(" Hz").find_map(|(at, _)| {
        let prefix = &field[..at];
        let digits_start = prefix
            .rfind(|c: char| !c.is_ascii_digit())
            .map_or(0, |i| i + 1);
        let digits = &prefix[digits_start..];
        if digits.is_empty() {
            None
        } else {
            digits.parse().ok()
        }
    })
}

fn parse_channels(field: &str) -> Option<u16> {
    match field {
        "mono" => return Some(1),
        "stereo" => return Some(2),
        _ => {}
    }

    let token = field.split(' ').next().unwrap_or_default();
    if let Ok(count) = token.parse() {
        return Some(count);
    }

    let layout = token.split('(').next().unwrap_or_default();
    CHANNEL_LAYOUTS
        .iter()
        .find(|(name, _)| *name == layout)
        .map(|&(_, count)| count)
}
