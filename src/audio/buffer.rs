//! 解码结果缓冲区
//!
//! 单声道为一维样本序列，多声道为 `(frames, channels)` 行主序矩阵。

use super::diagnostics::StreamInfo;
use super::sample::{I24, Sample, U24};
use ndarray::{Array1, Array2, ArrayView1};

/// 解码后的样本数据，调用方独占所有权
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer<T> {
    Mono(Array1<T>),
    /// 形状 `(frames, channels)`
    Multi(Array2<T>),
}

impl<T: Sample> SampleBuffer<T> {
    /// 由交错样本构造
    ///
    /// `channels > 1` 时按帧重排；末尾不足一帧的样本被截断（不报错）。
    pub fn from_interleaved(mut samples: Vec<T>, channels: usize) -> Self {
        if channels <= 1 {
            return SampleBuffer::Mono(Array1::from_vec(samples));
        }

        let frames = samples.len() / channels;
        samples.truncate(frames * channels);
        // 长度已对齐到 frames * channels，形状必然匹配
        let matrix = Array2::from_shape_vec((frames, channels), samples)
            .unwrap_or_else(|_| Array2::default((0, channels)));
        SampleBuffer::Multi(matrix)
    }

    pub fn channels(&self) -> usize {
        match self {
            SampleBuffer::Mono(_) => 1,
            SampleBuffer::Multi(m) => m.ncols(),
        }
    }

    pub fn frames(&self) -> usize {
        match self {
            SampleBuffer::Mono(a) => a.len(),
            SampleBuffer::Multi(m) => m.nrows(),
        }
    }

    /// 样本总数（帧数 × 声道数）
    pub fn len(&self) -> usize {
        self.frames() * self.channels()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 数组维数：单声道1，多声道2
    pub fn ndim(&self) -> usize {
        match self {
            SampleBuffer::Mono(_) => 1,
            SampleBuffer::Multi(_) => 2,
        }
    }

    /// 单个声道的视图
    pub fn channel(&self, index: usize) -> Option<ArrayView1<'_, T>> {
        match self {
            SampleBuffer::Mono(a) if index == 0 => Some(a.view()),
            SampleBuffer::Multi(m) if index < m.ncols() => Some(m.column(index)),
            _ => None,
        }
    }

    /// 交错顺序的样本副本：`[L0, R0, L1, R1, ...]`
    pub fn to_interleaved(&self) -> Vec<T> {
        match self {
            SampleBuffer::Mono(a) => a.to_vec(),
            SampleBuffer::Multi(m) => m.iter().copied().collect(),
        }
    }
}

/// 类型化解码结果
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedAudio<T> {
    pub info: StreamInfo,
    pub samples: SampleBuffer<T>,
}

/// 运行时选择样本格式时的解码结果
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    I8(SampleBuffer<i8>),
    U8(SampleBuffer<u8>),
    I16(SampleBuffer<i16>),
    U16(SampleBuffer<u16>),
    I24(SampleBuffer<I24>),
    U24(SampleBuffer<U24>),
    I32(SampleBuffer<i32>),
    U32(SampleBuffer<u32>),
    I64(SampleBuffer<i64>),
    U64(SampleBuffer<u64>),
    F32(SampleBuffer<f32>),
    F64(SampleBuffer<f64>),
}

macro_rules! for_each_variant {
    ($self:expr, $buf:ident => $body:expr) => {
        match $self {
            Samples::I8($buf) => $body,
            Samples::U8($buf) => $body,
            Samples::I16($buf) => $body,
            Samples::U16($buf) => $body,
            Samples::I24($buf) => $body,
            Samples::U24($buf) => $body,
            Samples::I32($buf) => $body,
            Samples::U32($buf) => $body,
            Samples::I64($buf) => $body,
            Samples::U64($buf) => $body,
            Samples::F32($buf) => $body,
            Samples::F64($buf) => $body,
        }
    };
}

impl Samples {
    pub fn channels(&self) -> usize {
        for_each_variant!(self, b => b.channels())
    }

    pub fn frames(&self) -> usize {
        for_each_variant!(self, b => b.frames())
    }

    pub fn len(&self) -> usize {
        for_each_variant!(self, b => b.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn ndim(&self) -> usize {
        for_each_variant!(self, b => b.ndim())
    }
}
