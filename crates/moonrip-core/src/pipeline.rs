use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    convert::convert_audio,
    cover_art::select_cover_art,
    download::download_video,
    embed::embed_cover_art,
    error::Result,
    frames::extract_frames,
    input::RunRequest,
    progress::{ProgressSink, Stage},
    tools::Toolchain,
    types::{ScoredFrame, VideoInfo},
    vision::VisionModel,
    workdir::WorkDir,
};

/// What a successful run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub output_path: PathBuf,
    pub video: VideoInfo,
    pub cover: ScoredFrame,
}

/// Everything a run needs besides the request itself.
pub struct Pipeline<'a> {
    pub tools: &'a Toolchain,
    pub vision: &'a dyn VisionModel,
    pub progress: &'a dyn ProgressSink,
    /// Scratch directory; recreated at start, removed when the run ends.
    pub work_dir: PathBuf,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        tools: &'a Toolchain,
        vision: &'a dyn VisionModel,
        progress: &'a dyn ProgressSink,
        work_dir: impl AsRef<Path>,
    ) -> Self {
        Self {
            tools,
            vision,
            progress,
            work_dir: work_dir.as_ref().to_path_buf(),
        }
    }

    /// Download, convert, sample, score, embed.
    ///
    /// The working directory is removed on every exit path, including when
    /// the returned future is dropped mid-stage.
    pub async fn run(&self, request: &RunRequest) -> Result<RunOutcome> {
        let work = WorkDir::create(&self.work_dir)?;
        let progress = self.progress;

        progress.stage_started(Stage::Download, &request.url);
        let video = download_video(self.tools, &request.url, work.path(), progress).await?;
        progress.stage_finished(Stage::Download, &video.title);

        progress.stage_started(Stage::Convert, request.format.name());
        let audio_path = convert_audio(self.tools, &video, request.format, progress).await?;
        progress.stage_finished(Stage::Convert, &file_name(&audio_path));

        progress.stage_started(Stage::ExtractFrames, &request.frame_count.to_string());
        let frames =
            extract_frames(self.tools, &video.video_path, request.frame_count, progress).await?;
        progress.stage_finished(Stage::ExtractFrames, &format!("{} frames", frames.len()));

        progress.stage_started(
            Stage::SelectCover,
            request.prompt.as_deref().unwrap_or_default(),
        );
        let cover =
            select_cover_art(&frames, request.prompt.as_deref(), self.vision, progress).await?;
        progress.stage_finished(Stage::SelectCover, &cover.description);

        progress.stage_started(Stage::Embed, &request.output_dir.display().to_string());
        let output_path = embed_cover_art(
            self.tools,
            &audio_path,
            &cover.frame.path,
            Some(request.output_dir.as_path()),
        )
        .await?;
        progress.stage_finished(Stage::Embed, &output_path.display().to_string());

        info!(path = %output_path.display(), "run complete");
        drop(work);

        Ok(RunOutcome {
            output_path,
            video,
            cover,
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
