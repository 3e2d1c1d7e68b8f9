//! FFmpeg桥接层
//!
//! 负责定位FFmpeg可执行文件、启动子进程并管理其管道：
//! stdout承载原始PCM，stderr由后台线程持续排空并收集为诊断文本。

use crate::constants::defaults::FFMPEG_BINARY;
use crate::error::{AudioError, AudioResult};
use std::ffi::OsStr;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdout, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};

/// FFmpeg安装指南（跨平台）
pub const FFMPEG_INSTALL_GUIDE: &str = r#"
FFmpeg is required to decode audio / 需要安装FFmpeg以解码音频

Installation / 安装方法:
  macOS:   brew install ffmpeg
  Windows: https://www.gyan.dev/ffmpeg/builds/ (推荐Full版本)
           或使用: winget install Gyan.FFmpeg
  Linux:
    - Ubuntu/Debian: sudo apt install ffmpeg
    - Fedora/RHEL:   sudo dnf install ffmpeg
    - Arch:          sudo pacman -S ffmpeg

Official site / 官方网站: https://ffmpeg.org/download.html
"#;

/// 检测给定的FFmpeg是否可运行
pub fn is_available(ffmpeg: &Path) -> bool {
    Command::new(ffmpeg)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// 查找FFmpeg可执行文件路径（跨平台）
pub fn locate_ffmpeg() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // Windows: 检查多个常见位置
        let mut candidates = vec![
            PathBuf::from(FFMPEG_BINARY), // PATH中
            PathBuf::from(r"C:\Program Files\ffmpeg\bin\ffmpeg.exe"),
            PathBuf::from(r"C:\ffmpeg\bin\ffmpeg.exe"),
        ];
        // 便携部署：与可执行文件同目录
        if let Some(dir) = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(dir.join(FFMPEG_BINARY));
        }

        candidates.into_iter().find(|p| is_available(p))
    }

    #[cfg(not(target_os = "windows"))]
    {
        // macOS/Linux: 直接使用PATH中的ffmpeg
        let path = PathBuf::from(FFMPEG_BINARY);
        is_available(&path).then_some(path)
    }
}

/// 运行中的FFmpeg子进程
///
/// Drop时终止并回收进程，提前返回的错误路径不会留下僵尸进程。
pub(crate) struct FfmpegProcess {
    child: Child,
    stdout: Option<ChildStdout>,
    stderr_drain: Option<JoinHandle<Vec<u8>>>,
    reaped: bool,
}

impl FfmpegProcess {
    /// 启动FFmpeg，stdout接管道，stderr交给后台线程排空
    pub(crate) fn spawn<I, S>(ffmpeg: &Path, args: I) -> AudioResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut command = Command::new(ffmpeg);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        log::debug!("spawning decoder: {command:?}");

        let mut child = command.spawn().map_err(|e| {
            AudioError::ResourceError(format!(
                "Failed to spawn FFmpeg '{}' / 无法启动FFmpeg: {e}\n{FFMPEG_INSTALL_GUIDE}",
                ffmpeg.display()
            ))
        })?;

        let stdout = child.stdout.take();
        let stderr_drain = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut diagnostics = Vec::new();
                // 读取失败时保留已收集的部分
                let _ = stderr.read_to_end(&mut diagnostics);
                diagnostics
            })
        });

        Ok(Self {
            child,
            stdout,
            stderr_drain,
            reaped: false,
        })
    }

    pub(crate) fn stdout(&mut self) -> AudioResult<&mut ChildStdout> {
        self.stdout.as_mut().ok_or_else(|| {
            AudioError::DecodingError(
                "FFmpeg stdout not available / FFmpeg标准输出不可用".to_string(),
            )
        })
    }

    /// 强制终止（进程可能已退出，忽略结果）
    pub(crate) fn terminate(&mut self) {
        let _ = self.child.kill();
    }

    /// 关闭stdout，等待退出并取回全部诊断文本
    pub(crate) fn finish(mut self) -> AudioResult<(ExitStatus, String)> {
        drop(self.stdout.take());
        let status = self.child.wait()?;
        self.reaped = true;

        let diagnostics = self
            .stderr_drain
            .take()
            .map(|handle| handle.join().unwrap_or_default())
            .unwrap_or_default();

        Ok((status, String::from_utf8_lossy(&diagnostics).into_owned()))
    }
}

impl Drop for FfmpegProcess {
    fn drop(&mut self) {
        // 确保FFmpeg进程被清理
        if !self.reaped {
            let _ = self.child.kill();
            let _ = self.child.wait();
        }
    }
}
