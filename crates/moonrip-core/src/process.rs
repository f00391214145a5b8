use std::{io, process::ExitStatus};

use tokio::{io::AsyncReadExt, process::Command};
use tracing::debug;

/// Everything a finished child process produced.
#[derive(Debug)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.status.success()
    }

    /// Trimmed stderr, or the exit status when the tool printed nothing.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            format!("exited with {}", self.status)
        } else {
            stderr.to_string()
        }
    }
}

/// Run `cmd` to completion, collecting stdout and handing every stderr line
/// to `on_line` as it arrives. Both `\n` and `\r` end a line, since ffmpeg
/// and yt-dlp redraw progress with carriage returns.
pub async fn run_streaming<F>(mut cmd: Command, mut on_line: F) -> io::Result<CapturedOutput>
where
    F: FnMut(&str),
{
    debug!(command = ?cmd.as_std(), "spawning");
    let mut child = cmd.spawn()?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| io::Error::other("child stdout was not piped"))?;
    let mut stderr = child
        .stderr
        .take()
        .ok_or_else(|| io::Error::other("child stderr was not piped"))?;

    let read_stdout = async {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await?;
        Ok::<_, io::Error>(buf)
    };

    let read_stderr = async {
        let mut captured = Vec::new();
        let mut line = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = stderr.read(&mut chunk).await?;
            if n == 0 {
                break;
            }
            captured.extend_from_slice(&chunk[..n]);
            for &byte in &chunk[..n] {
                if byte == b'\n' || byte == b'\r' {
                    if !line.is_empty() {
                        on_line(&String::from_utf8_lossy(&line));
                        line.clear();
                    }
                } else {
                    line.push(byte);
                }
            }
        }
        if !line.is_empty() {
            on_line(&String::from_utf8_lossy(&line));
        }
        Ok::<_, io::Error>(captured)
    };

    let (stdout, stderr) = tokio::try_join!(read_stdout, read_stderr)?;
    let status = child.wait().await?;

    Ok(CapturedOutput {
        status,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    })
}

/// Run `cmd` to completion without looking at its output as it streams.
pub async fn run_captured(cmd: Command) -> io::Result<CapturedOutput> {
    run_streaming(cmd, |_| {}).await
}
