//! Fake external tools for integration tests.
//!
//! Each fake is a POSIX shell script run as `sh <script> <args...>`, so the
//! scripts never need to be executable.

#![allow(dead_code)]

use std::{
    path::Path,
    sync::Mutex,
};

use moonrip_core::{ExternalTool, ProgressSink, Stage, Toolchain};

/// Writes `id.mp4` and a thumbnail into the `-o` template's directory and
/// prints the metadata line.
pub const FAKE_DOWNLOADER: &str = r#"
out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
dir=$(dirname "$out")
printf '[download]  50.0%% of 1.00MiB\n' >&2
printf '[download] 100.0%% of 1.00MiB\n' >&2
printf 'video' > "$dir/id.mp4"
printf 'thumb' > "$dir/id.jpg"
echo "id|Title|Artist|thumb.jpg"
"#;

/// Leaves a partial file in the working directory, then hangs.
pub const HANGING_DOWNLOADER: &str = r#"
out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
printf 'partial' > "$(dirname "$out")/id.mp4.part"
printf '[download]   1.0%% of 1.00MiB\n' >&2
exec sleep 30
"#;

/// Like [`FAKE_DOWNLOADER`] but also leaves an extracted `id.m4a`.
pub const FAKE_DOWNLOADER_WITH_AUDIO: &str = r#"
out=""
while [ "$#" -gt 0 ]; do
  if [ "$1" = "-o" ]; then
    out="$2"
    shift
  fi
  shift
done
dir=$(dirname "$out")
printf 'video' > "$dir/id.mp4"
printf 'audio' > "$dir/id.m4a"
echo "id|Title|NA|NA"
"#;

/// Exits cleanly without producing any media.
pub const EMPTY_DOWNLOADER: &str = r#"
echo "id|Title|Artist|thumb.jpg"
"#;

pub const FAILING_DOWNLOADER: &str = r#"
echo "ERROR: Unsupported URL" >&2
exit 1
"#;

pub const FAKE_PROBER: &str = "echo 30\n";

pub const BROKEN_PROBER: &str = "echo N/A\n";

/// Writes its last argument. Frame grabs (`-ss <t>` first) contain the
/// timestamp so tests can tell frames apart.
pub const FAKE_TRANSCODER: &str = r#"
ss=""
if [ "$1" = "-ss" ]; then
  ss="$2"
fi
for arg in "$@"; do
  out="$arg"
done
printf 'Duration: 00:00:30.00, start: 0.000000\n' >&2
printf 'size=       1kB time=00:00:15.00 bitrate=   1kbits/s\r' >&2
if [ -n "$ss" ]; then
  printf '%s' "$ss" > "$out"
else
  printf 'media' > "$out"
fi
"#;

pub const FAILING_TRANSCODER: &str = r#"
echo "boom: Invalid data found when processing input" >&2
exit 1
"#;

/// A tool that cannot be spawned; proves a stage never ran it.
pub fn missing_tool() -> ExternalTool {
    ExternalTool::new("/nonexistent/moonrip-test-tool")
}

pub fn script(dir: &Path, name: &str, body: &str) -> ExternalTool {
    let path = dir.join(format!("{name}.sh"));
    std::fs::write(&path, body).expect("failed to write fake tool");
    ExternalTool::with_args("sh", [path])
}

pub fn toolchain(dir: &Path, downloader: &str, prober: &str, transcoder: &str) -> Toolchain {
    Toolchain {
        downloader: script(dir, "yt-dlp", downloader),
        prober: script(dir, "ffprobe", prober),
        transcoder: script(dir, "ffmpeg", transcoder),
    }
}

pub fn fake_toolchain(dir: &Path) -> Toolchain {
    toolchain(dir, FAKE_DOWNLOADER, FAKE_PROBER, FAKE_TRANSCODER)
}

/// Records every progress event as text.
#[derive(Default)]
pub struct RecordingProgress {
    pub events: Mutex<Vec<String>>,
}

impl RecordingProgress {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn percentages(&self, stage: Stage) -> Vec<String> {
        let prefix = format!("progress {stage:?} ");
        self.events()
            .into_iter()
            .filter(|event| event.starts_with(&prefix))
            .collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn stage_started(&self, stage: Stage, _detail: &str) {
        self.events.lock().unwrap().push(format!("start {stage:?}"));
    }

    fn progress(&self, stage: Stage, percent: f64) {
        self.events
            .lock()
            .unwrap()
            .push(format!("progress {stage:?} {percent:.1}"));
    }

    fn stage_finished(&self, stage: Stage, _summary: &str) {
        self.events.lock().unwrap().push(format!("finish {stage:?}"));
    }
}
