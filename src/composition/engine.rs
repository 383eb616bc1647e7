use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use tokio::task;
use tracing::{debug, info, warn};

use crate::{
    config::Config,
    error::{PanovidError, Result, VideoError},
    scroll::{AspectMode, ModeSelection, Window, WindowConfig},
    video::{EncodedVideo, FfmpegEncoder, Frame, FrameSink, PanoramaLoader, SourceImage, VideoOutputSpec},
};

/// Turns one panorama into one scrolling video per requested aspect mode
///
/// The pipeline for every mode is:
/// 1. Frame width - derived from the panorama height and the mode's ratio
/// 2. Windowing - full-height strips stepping `framejump` pixels to the right
/// 3. Cropping - strips copied out in parallel batches
/// 4. Encoding - frames written to FFmpeg strictly in scroll order
pub struct ScrollEngine {
    config: Config,
    pool: Arc<ThreadPool>,
}

/// Outcome of rendering one aspect mode
#[derive(Debug, Clone)]
pub struct RenderReport {
    pub mode: AspectMode,
    pub frame_width: u32,
    pub frame_count: usize,

    /// `None` when the panorama was too narrow to produce any frame
    pub output: Option<EncodedVideo>,
}

impl ScrollEngine {
    /// Create an engine, validating the configuration first
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(config.video.processing_threads)
            .thread_name(|i| format!("panovid-crop-{}", i))
            .build()
            .map_err(|e| PanovidError::generic(format!("Failed to build crop thread pool: {}", e)))?;

        Ok(Self {
            config,
            pool: Arc::new(pool),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Output file for `input` in the given mode.
    ///
    /// Only the last extension is stripped, so `alps.v2.jpg` becomes
    /// `alps.v2_portrait.mp4`. Files land next to the input unless
    /// `output_dir` is given.
    pub fn output_path(input: &Path, output_dir: Option<&Path>, mode: AspectMode, extension: &str) -> PathBuf {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "panorama".to_string());
        let file_name = format!("{}_{}.{}", stem, mode.name(), extension);

        match output_dir.or_else(|| input.parent()) {
            Some(dir) => dir.join(file_name),
            None => PathBuf::from(file_name),
        }
    }

    /// Window geometry and encoder settings for one mode
    pub fn plan(&self, image: &SourceImage, mode: AspectMode, output_path: PathBuf) -> Result<(WindowConfig, VideoOutputSpec)> {
        let frame_width = mode.frame_width(image.height());
        let windows = WindowConfig::new(self.config.scroll.framejump, frame_width)?;

        let spec = VideoOutputSpec {
            fps: self.config.scroll.fps,
            size: (frame_width, image.height()),
            path: output_path,
            codec: self.config.video.codec.clone(),
            fourcc: self.config.video.fourcc.clone(),
        };

        Ok((windows, spec))
    }

    /// Load `input` and render every mode in `selection`, in order.
    ///
    /// The first failing mode aborts the ones after it.
    pub async fn run(&self, input: &Path, output_dir: Option<&Path>, selection: ModeSelection) -> Result<Vec<RenderReport>> {
        info!("🎞️  Rendering {:?} from {:?}", selection, input);

        if !PanoramaLoader::is_supported(input) {
            warn!("Unrecognised image extension for {:?}, trying to decode anyway", input);
        }

        let image = Arc::new(PanoramaLoader::load(input).await?);

        let mut reports = Vec::with_capacity(selection.modes().len());
        for &mode in selection.modes() {
            let output_path = Self::output_path(input, output_dir, mode, &self.config.video.container);
            reports.push(self.render_mode(&image, mode, output_path).await?);
        }

        Ok(reports)
    }

    /// Render one mode of an already loaded panorama
    pub async fn render_mode(&self, image: &Arc<SourceImage>, mode: AspectMode, output_path: PathBuf) -> Result<RenderReport> {
        let (windows, spec) = self.plan(image, mode, output_path)?;
        let frame_count = windows.frame_count(image.width());

        info!("   {} mode: {}x{}, {} px step, {} frames",
              mode, spec.size.0, spec.size.1, windows.framejump(), frame_count);

        if frame_count == 0 {
            warn!("   Panorama is only {} px wide, {} frames need more than {} px; skipping {:?}",
                  image.width(), mode, windows.frame_width(), spec.path);
            return Ok(RenderReport {
                mode,
                frame_width: windows.frame_width(),
                frame_count: 0,
                output: None,
            });
        }

        let mut encoder = FfmpegEncoder::spawn(&self.config.video.ffmpeg_path, spec.clone())?;
        let written = self.stream_frames(Arc::clone(image), windows, &mut encoder).await?;

        let file_size = tokio::fs::metadata(&spec.path).await?.len();
        let encoded = EncodedVideo {
            path: spec.path.display().to_string(),
            duration: written as f64 / f64::from(spec.fps),
            frame_count: written,
            file_size,
        };

        info!("   ✅ {} video saved: {} ({} frames, {:.1}s, {:.1} MB)",
              mode, encoded.path, encoded.frame_count, encoded.duration,
              encoded.file_size as f64 / 1024.0 / 1024.0);

        Ok(RenderReport {
            mode,
            frame_width: windows.frame_width(),
            frame_count: written,
            output: Some(encoded),
        })
    }

    /// Crop every window of `image` and write it to `sink` in scroll order.
    ///
    /// The sink is finished even when a write fails. If both fail, the write
    /// error is returned unless the encoder had closed its input, in which
    /// case the finish error says why.
    pub async fn stream_frames<S: FrameSink>(&self, image: Arc<SourceImage>, windows: WindowConfig, sink: &mut S) -> Result<usize> {
        let write_result = self.write_batches(image, windows, sink).await;
        let finish_result = sink.finish().await;

        match (write_result, finish_result) {
            (Err(write_err @ PanovidError::Video(VideoError::EncoderClosed { .. })), Err(finish_err)) => {
                debug!("Encoder input closed early: {}", write_err);
                Err(finish_err)
            }
            (Err(write_err), Err(finish_err)) => {
                warn!("Encoder also failed to finish: {}", finish_err);
                Err(write_err)
            }
            (Err(e), Ok(())) | (Ok(()), Err(e)) => Err(e),
            (Ok(()), Ok(())) => Ok(sink.frames_written()),
        }
    }

    async fn write_batches<S: FrameSink>(&self, image: Arc<SourceImage>, windows: WindowConfig, sink: &mut S) -> Result<()> {
        let all_windows: Vec<Window> = windows.windows(image.width()).collect();

        for batch in all_windows.chunks(self.config.video.batch_size) {
            let frames = self.crop_batch(Arc::clone(&image), batch.to_vec()).await?;
            debug!("Cropped frames {}..{}", batch[0].index, batch[0].index + frames.len());

            for frame in &frames {
                sink.write_frame(frame).await?;
            }
        }

        Ok(())
    }

    async fn crop_batch(&self, image: Arc<SourceImage>, batch: Vec<Window>) -> Result<Vec<Frame>> {
        let pool = Arc::clone(&self.pool);

        task::spawn_blocking(move || {
            pool.install(|| batch.par_iter().map(|window| image.crop(window)).collect::<Vec<Frame>>())
        })
        .await
        .map_err(|e| PanovidError::generic(format!("Frame cropping task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::compositor::MemorySink;
    use image::{Rgb, RgbImage};
    use tempfile::tempdir;

    fn engine_with(framejump: u32, batch_size: usize) -> ScrollEngine {
        let mut config = Config::default();
        config.scroll.framejump = framejump;
        config.video.batch_size = batch_size;
        config.video.processing_threads = 2;
        ScrollEngine::new(config).unwrap()
    }

    /// Red channel holds the column index modulo 256
    fn panorama(width: u32, height: u32) -> SourceImage {
        SourceImage::new(RgbImage::from_fn(width, height, |x, _| Rgb([(x % 256) as u8, 0, 0])))
    }

    #[test]
    fn test_output_path_strips_last_extension() {
        let path = ScrollEngine::output_path(Path::new("shots/alps.v2.jpg"), None, AspectMode::Portrait, "mp4");
        assert_eq!(path, PathBuf::from("shots/alps.v2_portrait.mp4"));

        let path = ScrollEngine::output_path(Path::new("pano.png"), None, AspectMode::Landscape, "mp4");
        assert_eq!(path, PathBuf::from("pano_landscape.mp4"));

        let path = ScrollEngine::output_path(Path::new("raw/pano"), Some(Path::new("out")), AspectMode::Portrait, "mp4");
        assert_eq!(path, PathBuf::from("out/pano_portrait.mp4"));
    }

    #[test]
    fn test_zero_framejump_rejected() {
        let mut config = Config::default();
        config.scroll.framejump = 0;
        assert!(matches!(
            ScrollEngine::new(config),
            Err(PanovidError::Window(crate::error::WindowError::InvalidFramejump { value: 0 }))
        ));
    }

    #[test]
    fn test_plan_portrait_scenario() {
        let engine = engine_with(4, 64);
        let image = panorama(1000, 300);

        let (windows, spec) = engine.plan(&image, AspectMode::Portrait, PathBuf::from("pano_portrait.mp4")).unwrap();
        assert_eq!(windows.frame_width(), 168);
        assert_eq!(windows.frame_count(image.width()), 208);
        assert_eq!(spec.size, (168, 300));
        assert_eq!(spec.fps, 60);
        assert_eq!(spec.fourcc, "mp4v");
    }

    #[test]
    fn test_plan_landscape_scenario() {
        let engine = engine_with(4, 64);
        let image = panorama(1000, 300);

        let (windows, spec) = engine.plan(&image, AspectMode::Landscape, PathBuf::from("pano_landscape.mp4")).unwrap();
        assert_eq!(windows.frame_width(), 533);
        assert_eq!(windows.frame_count(image.width()), 117);
        assert_eq!(spec.size, (533, 300));
    }

    #[tokio::test]
    async fn test_stream_frames_in_scroll_order() {
        // Small batches force several crop rounds
        let engine = engine_with(4, 7);
        let image = Arc::new(panorama(1000, 300));
        let windows = WindowConfig::new(4, 168).unwrap();

        let mut sink = MemorySink::default();
        let written = engine.stream_frames(Arc::clone(&image), windows, &mut sink).await.unwrap();

        assert_eq!(written, 208);
        assert_eq!(sink.finish_calls, 1);
        for (i, frame) in sink.frames.iter().enumerate() {
            assert_eq!(frame.width(), 168);
            assert_eq!(frame.height(), 300);
            assert_eq!(frame.get_pixel(0, 0)[0], ((i * 4) % 256) as u8);
        }
    }

    #[tokio::test]
    async fn test_sink_finished_after_write_failure() {
        let engine = engine_with(4, 5);
        let image = Arc::new(panorama(200, 32));
        let windows = WindowConfig::new(4, 18).unwrap();

        let mut sink = MemorySink {
            fail_after: Some(12),
            ..Default::default()
        };
        let result = engine.stream_frames(image, windows, &mut sink).await;

        assert!(result.is_err());
        assert_eq!(sink.frames.len(), 12);
        assert_eq!(sink.finish_calls, 1);
    }

    #[tokio::test]
    async fn test_finish_error_explains_closed_input() {
        let engine = engine_with(4, 5);
        let image = Arc::new(panorama(200, 32));
        let windows = WindowConfig::new(4, 18).unwrap();

        let mut sink = MemorySink {
            close_after: Some(3),
            finish_failure: Some("Could not open output file".to_string()),
            ..Default::default()
        };
        let err = engine.stream_frames(image, windows, &mut sink).await.unwrap_err();

        assert!(matches!(err, PanovidError::Video(VideoError::EncodingFailed { .. })));
        assert!(err.to_string().contains("Could not open output file"));
        assert_eq!(sink.finish_calls, 1);
    }

    #[tokio::test]
    async fn test_other_write_errors_beat_finish_error() {
        let engine = engine_with(4, 5);
        let image = Arc::new(panorama(200, 32));
        let windows = WindowConfig::new(4, 18).unwrap();

        let mut sink = MemorySink {
            fail_after: Some(3),
            finish_failure: Some("trailer not written".to_string()),
            ..Default::default()
        };
        let err = engine.stream_frames(image, windows, &mut sink).await.unwrap_err();

        assert!(err.to_string().contains("disk full"));
    }

    #[tokio::test]
    async fn test_modes_do_not_share_frames() {
        let engine = engine_with(4, 64);
        let image = Arc::new(panorama(1000, 300));

        let mut portrait = MemorySink::default();
        let mut landscape = MemorySink::default();
        for (mode, sink) in [(AspectMode::Portrait, &mut portrait), (AspectMode::Landscape, &mut landscape)] {
            let (windows, _) = engine.plan(&image, mode, PathBuf::from("unused.mp4")).unwrap();
            engine.stream_frames(Arc::clone(&image), windows, sink).await.unwrap();
        }

        assert_eq!(portrait.frames.len(), 208);
        assert_eq!(landscape.frames.len(), 117);
        assert!(portrait.frames.iter().all(|f| f.width() == 168));
        assert!(landscape.frames.iter().all(|f| f.width() == 533));
    }

    #[tokio::test]
    async fn test_too_narrow_panorama_writes_nothing() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("narrow.png");
        // Landscape at height 90 needs 160 px, the image only has 150
        RgbImage::from_pixel(150, 90, Rgb([10, 20, 30])).save(&input).unwrap();

        let engine = engine_with(4, 64);
        let reports = engine.run(&input, None, ModeSelection::Landscape).await.unwrap();

        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].frame_width, 160);
        assert_eq!(reports[0].frame_count, 0);
        assert!(reports[0].output.is_none());
        assert!(!dir.path().join("narrow_landscape.mp4").exists());
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_encoding() {
        let dir = tempdir().unwrap();
        let engine = engine_with(4, 64);

        let result = engine.run(&dir.path().join("nope.jpg"), None, ModeSelection::Both).await;
        assert!(matches!(result, Err(PanovidError::Image(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_run_both_modes_end_to_end() {
        if !FfmpegEncoder::check_ffmpeg_available("ffmpeg").await {
            eprintln!("ffmpeg not on PATH, skipping");
            return;
        }

        let dir = tempdir().unwrap();
        let input = dir.path().join("pano.png");
        RgbImage::from_fn(400, 160, |x, y| Rgb([(x % 256) as u8, y as u8, 90]))
            .save(&input)
            .unwrap();

        let mut config = Config::default();
        config.scroll.framejump = 8;
        let engine = ScrollEngine::new(config).unwrap();
        let reports = engine.run(&input, None, ModeSelection::Both).await.unwrap();

        // portrait: 90 px wide, ceil(310 / 8) = 39; landscape: 284 px, ceil(116 / 8) = 15
        assert_eq!(reports[0].mode, AspectMode::Portrait);
        assert_eq!(reports[0].frame_count, 39);
        assert_eq!(reports[1].mode, AspectMode::Landscape);
        assert_eq!(reports[1].frame_count, 15);
        assert!(dir.path().join("pano_portrait.mp4").exists());
        assert!(dir.path().join("pano_landscape.mp4").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_run_both_modes_through_stand_in_encoder() {
        use crate::video::compositor::{stand_in_encoder, CAT_TO_OUTPUT};

        let dir = tempdir().unwrap();
        let input = dir.path().join("pano.png");
        let source = RgbImage::from_fn(400, 160, |x, y| Rgb([(x % 256) as u8, y as u8, 90]));
        source.save(&input).unwrap();

        let mut config = Config::default();
        config.scroll.framejump = 8;
        config.video.batch_size = 16;
        config.video.ffmpeg_path = stand_in_encoder(dir.path(), CAT_TO_OUTPUT).display().to_string();
        let engine = ScrollEngine::new(config).unwrap();
        let reports = engine.run(&input, None, ModeSelection::Both).await.unwrap();

        assert_eq!(reports.len(), 2);
        let portrait = std::fs::read(dir.path().join("pano_portrait.mp4")).unwrap();
        let landscape = std::fs::read(dir.path().join("pano_landscape.mp4")).unwrap();
        assert_eq!(portrait.len(), 39 * 90 * 160 * 3);
        assert_eq!(landscape.len(), 15 * 284 * 160 * 3);
        assert_eq!(reports[0].output.as_ref().unwrap().file_size, portrait.len() as u64);

        // Second portrait frame starts 8 columns in
        let frame_bytes = 90 * 160 * 3;
        let second: Vec<u8> = (0..160u32)
            .flat_map(|y| (8..98u32).flat_map(move |x| [(x % 256) as u8, y as u8, 90]))
            .collect();
        assert_eq!(&portrait[frame_bytes..2 * frame_bytes], second.as_slice());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_encoder_exiting_early_reports_its_stderr() {
        use crate::video::compositor::stand_in_encoder;

        let dir = tempdir().unwrap();
        let input = dir.path().join("pano.png");
        // 168x300 frames, each bigger than a pipe buffer
        RgbImage::from_pixel(1000, 300, Rgb([1, 2, 3])).save(&input).unwrap();

        let mut config = Config::default();
        config.video.ffmpeg_path = stand_in_encoder(dir.path(), "echo \"Could not open output\" >&2\nexit 1")
            .display()
            .to_string();
        let engine = ScrollEngine::new(config).unwrap();

        let err = engine.run(&input, None, ModeSelection::Portrait).await.unwrap_err();
        assert!(matches!(err, PanovidError::Video(VideoError::EncodingFailed { .. })));
        assert!(err.to_string().contains("Could not open output"));
    }
}
