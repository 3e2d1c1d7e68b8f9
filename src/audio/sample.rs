//! 样本元素类型
//!
//! [`Sample`] 描述一个内存样本类型在管道中的编码方式：数值类型、位宽、
//! 线上字节数以及从小端/大端字节的转换。24位数据没有原生Rust类型，
//! 由 [`I24`]/[`U24`] 承载（线上3字节，内存中扩展为32位）。

use super::format::{ByteOrder, SampleFormat, SampleKind};
use std::fmt::Debug;

/// 可从解码器原始PCM输出重建的样本类型
pub trait Sample: Copy + Default + Debug + PartialEq + Send + 'static {
    const KIND: SampleKind;
    /// 线上位宽
    const BITS: u16;
    /// 线上字节数
    const WIRE_BYTES: usize = (Self::BITS / 8) as usize;

    /// `bytes.len() == WIRE_BYTES`
    fn from_le_wire(bytes: &[u8]) -> Self;
    fn from_be_wire(bytes: &[u8]) -> Self;

    /// 该类型在给定字节序下对应的样本格式
    fn format(byte_order: ByteOrder) -> SampleFormat {
        SampleFormat::new(Self::BITS, Self::KIND, byte_order)
    }
}

macro_rules! impl_native_sample {
    ($($ty:ty => $kind:ident, $bits:literal;)*) => {
        $(
            impl Sample for $ty {
                const KIND: SampleKind = SampleKind::$kind;
                const BITS: u16 = $bits;

                #[inline]
                fn from_le_wire(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; $bits / 8];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(raw)
                }

                #[inline]
                fn from_be_wire(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; $bits / 8];
                    raw.copy_from_slice(bytes);
                    <$ty>::from_be_bytes(raw)
                }
            }
        )*
    };
}

impl_native_sample! {
    i8 => Signed, 8;
    u8 => Unsigned, 8;
    i16 => Signed, 16;
    u16 => Unsigned, 16;
    i32 => Signed, 32;
    u32 => Unsigned, 32;
    i64 => Signed, 64;
    u64 => Unsigned, 64;
    f32 => Float, 32;
    f64 => Float, 64;
}

/// 有符号24位样本（符号扩展到i32）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct I24(pub i32);

/// 无符号24位样本
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct U24(pub u32);

impl Sample for I24 {
    const KIND: SampleKind = SampleKind::Signed;
    const BITS: u16 = 24;

    #[inline]
    fn from_le_wire(bytes: &[u8]) -> Self {
        // 放到高24位再算术右移完成符号扩展
        I24(i32::from_le_bytes([0, bytes[0], bytes[1], bytes[2]]) >> 8)
    }

    #[inline]
    fn from_be_wire(bytes: &[u8]) -> Self {
        I24(i32::from_be_bytes([bytes[0], bytes[1], bytes[2], 0]) >> 8)
    }
}

impl Sample for U24 {
    const KIND: SampleKind = SampleKind::Unsigned;
    const BITS: u16 = 24;

    #[inline]
    fn from_le_wire(bytes: &[u8]) -> Self {
        U24(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], 0]))
    }

    #[inline]
    fn from_be_wire(bytes: &[u8]) -> Self {
        U24(u32::from_be_bytes([0, bytes[0], bytes[1], bytes[2]]))
    }
}

/// 将字节流按给定字节序重解释为样本序列
///
/// 末尾不足一个样本的字节被丢弃。`byte_order` 为 `Native` 时按宿主机字节序解析。
pub fn samples_from_bytes<T: Sample>(bytes: &[u8], byte_order: ByteOrder) -> Vec<T> {
    let chunks = bytes.chunks_exact(T::WIRE_BYTES);
    match byte_order.resolve() {
        ByteOrder::Big => chunks.map(T::from_be_wire).collect(),
        _ => chunks.map(T::from_le_wire).collect(),
    }
}
