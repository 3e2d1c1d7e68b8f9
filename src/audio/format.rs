//! 样本格式描述与解码器格式标记转换
//!
//! 将语义化的 [`SampleFormat`]（位宽、数值类型、字节序）翻译为解码器
//! 原始PCM输出所需的 `-f <token>` 与 `-acodec pcm_<token>` 参数。

use crate::constants::limits::{FLOAT_BIT_WIDTHS, SUPPORTED_BIT_WIDTHS};
use crate::error::{self, AudioError, AudioResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 样本数值类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleKind {
    Signed,
    Unsigned,
    Float,
}

impl SampleKind {
    /// 解码器格式标记中的类型字母
    pub fn letter(self) -> char {
        match self {
            SampleKind::Signed => 's',
            SampleKind::Unsigned => 'u',
            SampleKind::Float => 'f',
        }
    }
}

/// 样本字节序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    Little,
    Big,
    #[default]
    Native,
}

impl ByteOrder {
    /// 将 `Native` 解析为宿主机的实际字节序
    pub fn resolve(self) -> ByteOrder {
        match self {
            ByteOrder::Native if cfg!(target_endian = "little") => ByteOrder::Little,
            ByteOrder::Native => ByteOrder::Big,
            other => other,
        }
    }

    fn suffix(self) -> &'static str {
        match self.resolve() {
            ByteOrder::Big => "be",
            _ => "le",
        }
    }
}

/// 解码器格式标记对：原始PCM格式 + 对应编解码器
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatTokens {
    /// `-f` 参数，如 `s16le`
    pub format: String,
    /// `-acodec` 参数，如 `pcm_s16le`
    pub codec: String,
}

/// 期望的输出样本表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SampleFormat {
    /// 位宽（8/16/24/32/64）
    pub bits: u16,
    pub kind: SampleKind,
    #[serde(default)]
    pub byte_order: ByteOrder,
}

impl SampleFormat {
    pub fn new(bits: u16, kind: SampleKind, byte_order: ByteOrder) -> Self {
        Self {
            bits,
            kind,
            byte_order,
        }
    }

    /// 每个样本在管道中占用的字节数
    pub fn item_size(&self) -> usize {
        (self.bits / 8) as usize
    }

    /// 转换为解码器格式标记
    ///
    /// 位宽不在 {8,16,24,32,64} 内、或浮点位宽不是32/64时返回
    /// [`AudioError::UnsupportedFormat`]，消息中指明出错的属性。
    /// 8位格式没有字节序后缀（`s8`/`u8`），与解码器的命名一致。
    pub fn tokens(&self) -> AudioResult<FormatTokens> {
        if !SUPPORTED_BIT_WIDTHS.contains(&self.bits) {
            return Err(error::unsupported_format(
                &format!("Cannot read audio into '{self}'"),
                format!("unsupported item size {} bits", self.bits),
            ));
        }
        if self.kind == SampleKind::Float && !FLOAT_BIT_WIDTHS.contains(&self.bits) {
            return Err(error::unsupported_format(
                &format!("Cannot read audio into '{self}'"),
                format!("unsupported float width {} bits", self.bits),
            ));
        }

        let suffix = if self.bits == 8 {
            ""
        } else {
            self.byte_order.suffix()
        };
        let format = format!("{}{}{suffix}", self.kind.letter(), self.bits);
        let codec = format!("pcm_{format}");
        Ok(FormatTokens { format, codec })
    }
}

impl fmt::Display for SampleFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = match self.byte_order {
            ByteOrder::Little => "le",
            ByteOrder::Big => "be",
            ByteOrder::Native => "ne",
        };
        write!(f, "{}{}{order}", self.kind.letter(), self.bits)
    }
}

/// 拆分类型名与数字部分，数字原样返回
fn split_kind<'a>(body: &'a str, descriptor: &str) -> AudioResult<(SampleKind, &'a str)> {
    let named = [
        ("uint", SampleKind::Unsigned),
        ("int", SampleKind::Signed),
        ("float", SampleKind::Float),
    ];
    for (name, kind) in named {
        if let Some(rest) = body.strip_prefix(name) {
            return Ok((kind, rest));
        }
    }

    let mut chars = body.chars();
    let kind = match chars.next() {
        Some('s') | Some('i') => SampleKind::Signed,
        Some('u') => SampleKind::Unsigned,
        Some('f') => SampleKind::Float,
        Some(other) => {
            return Err(error::unsupported_format(
                &format!("Cannot read audio into '{descriptor}'"),
                format!("unsupported kind '{other}'"),
            ));
        }
        None => {
            return Err(error::unsupported_format("Empty sample format descriptor", "''"));
        }
    };
    Ok((kind, chars.as_str()))
}

fn parse_width(digits: &str, descriptor: &str) -> AudioResult<u16> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(error::unsupported_format(
            &format!("Cannot read audio into '{descriptor}'"),
            format!("unreadable width '{digits}'"),
        ));
    }
    digits.parse::<u16>().map_err(|e| {
        error::unsupported_format(&format!("Cannot read audio into '{descriptor}'"), e)
    })
}

impl FromStr for SampleFormat {
    type Err = AudioError;

    /// 解析格式描述字符串
    ///
    /// - 解码器标记：`s16le`、`f32be`、`u8`、`s24`（无后缀即本机字节序）
    /// - 类型名：`i16`、`int16`、`uint8`、`float64`（数字为位数）
    /// - 数组dtype：`<i2`、`>f4`、`=u1`、`|u1`（前缀为字节序，数字为字节数）
    fn from_str(s: &str) -> AudioResult<Self> {
        let descriptor = s.trim().to_ascii_lowercase();

        if let Some(prefix) = descriptor
            .chars()
            .next()
            .filter(|c| matches!(c, '<' | '>' | '=' | '|'))
        {
            let byte_order = match prefix {
                '<' => ByteOrder::Little,
                '>' => ByteOrder::Big,
                _ => ByteOrder::Native,
            };
            let (kind, digits) = split_kind(&descriptor[1..], &descriptor)?;
            let bytes = parse_width(digits, &descriptor)?;
            let bits = bytes.checked_mul(8).ok_or_else(|| {
                error::unsupported_format(
                    &format!("Cannot read audio into '{descriptor}'"),
                    format!("unsupported item size {bytes} bytes"),
                )
            })?;
            return Ok(SampleFormat::new(bits, kind, byte_order));
        }

        let (body, byte_order) = if let Some(body) = descriptor.strip_suffix("le") {
            (body, ByteOrder::Little)
        } else if let Some(body) = descriptor.strip_suffix("be") {
            (body, ByteOrder::Big)
        } else if let Some(body) = descriptor.strip_suffix("ne") {
            (body, ByteOrder::Native)
        } else {
            (descriptor.as_str(), ByteOrder::Native)
        };

        let (kind, digits) = split_kind(body, &descriptor)?;
        let bits = parse_width(digits, &descriptor)?;
        Ok(SampleFormat::new(bits, kind, byte_order))
    }
}
