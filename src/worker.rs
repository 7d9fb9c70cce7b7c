//! Background frame evaluation.
//!
//! A document is owned by one worker thread. The consumer requests frames
//! and receives finished scenes; the worker never starts a frame before
//! the previous result has been taken off the bounded result channel.

use std::sync::mpsc::{channel, sync_channel, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::config::Settings;
use crate::document::Document;
use crate::scene::{self, DrawGroup};
use crate::util::Vec3;

/// Commands sent from the consumer to the worker.
#[derive(Debug)]
pub enum WorkerCommand {
    /// Evaluate and collect the given frame as seen from `origin`.
    EvaluateFrame { frame: i32, origin: Vec3 },
    /// Stop the worker thread.
    Stop,
}

/// Results sent from the worker back to the consumer.
#[derive(Debug)]
pub enum WorkerResult {
    /// Frame data is ready.
    FrameReady { frame: i32, groups: Vec<DrawGroup> },
    /// Evaluation failed; the worker keeps running.
    Failed { frame: i32, error: String },
}

/// Handle to a worker thread that owns a document.
pub struct AnimationWorker {
    tx: Sender<WorkerCommand>,
    rx: Receiver<WorkerResult>,
    handle: Option<JoinHandle<()>>,
}

impl AnimationWorker {
    /// Spawn a worker evaluating `doc`.
    pub fn spawn(doc: Document, settings: Settings) -> Self {
        let (cmd_tx, cmd_rx) = channel::<WorkerCommand>();
        let (res_tx, res_rx) = sync_channel::<WorkerResult>(1);

        let handle = thread::spawn(move || {
            worker_loop(doc, settings, cmd_rx, res_tx);
        });

        Self { tx: cmd_tx, rx: res_rx, handle: Some(handle) }
    }

    /// Request a frame; older pending requests are dropped.
    pub fn request_frame(&self, frame: i32, origin: Vec3) {
        let _ = self.tx.send(WorkerCommand::EvaluateFrame { frame, origin });
    }

    /// Check for a ready result (non-blocking).
    pub fn try_recv(&self) -> Option<WorkerResult> {
        self.rx.try_recv().ok()
    }

    /// Wait up to `timeout` for a result.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResult> {
        match self.rx.recv_timeout(timeout) {
            Ok(result) => Some(result),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Stop the worker and wait for it to finish.
    pub fn stop(&mut self) {
        let _ = self.tx.send(WorkerCommand::Stop);
        // Unblock a worker waiting to hand over a frame.
        while self.rx.try_recv().is_ok() {}
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AnimationWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn worker_loop(
    mut doc: Document,
    settings: Settings,
    rx: Receiver<WorkerCommand>,
    tx: SyncSender<WorkerResult>,
) {
    while let Ok(cmd) = rx.recv() {
        match cmd {
            WorkerCommand::EvaluateFrame { frame, origin } => {
                let Some((frame, origin)) = drain_to_latest(&rx, frame, origin) else {
                    break;
                };

                let result = match scene::collect(&mut doc, frame, origin, &settings) {
                    Ok(groups) => WorkerResult::FrameReady { frame, groups },
                    Err(e) => {
                        tracing::warn!("frame {frame} failed: {e}");
                        WorkerResult::Failed { frame, error: e.to_string() }
                    }
                };

                if tx.send(result).is_err() {
                    break;
                }
            }
            WorkerCommand::Stop => break,
        }
    }
    tracing::debug!("animation worker stopped");
}

/// Drain queued requests and keep the newest; `None` if a stop was queued.
fn drain_to_latest(
    rx: &Receiver<WorkerCommand>,
    mut frame: i32,
    mut origin: Vec3,
) -> Option<(i32, Vec3)> {
    while let Ok(cmd) = rx.try_recv() {
        match cmd {
            WorkerCommand::EvaluateFrame { frame: f, origin: o } => {
                frame = f;
                origin = o;
            }
            WorkerCommand::Stop => return None,
        }
    }
    Some((frame, origin))
}

/// Frame clock for a looping animation.
#[derive(Clone, Debug)]
pub struct Playback {
    frame: i32,
    length: i32,
    delay: Duration,
    looping: bool,
    playing: bool,
}

impl Playback {
    /// Clock for `doc`, stopped at frame 0.
    pub fn new(doc: &Document, settings: &Settings) -> Self {
        Self {
            frame: 0,
            length: doc.animation_length().max(0),
            delay: frame_delay(doc.frame_rate(), settings),
            looping: settings.loop_playback,
            playing: false,
        }
    }

    /// Current frame.
    pub fn frame(&self) -> i32 {
        self.frame
    }

    /// Animation length in frames.
    pub fn length(&self) -> i32 {
        self.length
    }

    /// Time between frames.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Jump to `frame`, clamped to the animation.
    pub fn seek(&mut self, frame: i32) {
        self.frame = frame.clamp(0, (self.length - 1).max(0));
    }

    /// Step one frame while playing and return the new frame.
    ///
    /// Reaching the length wraps to 0, or stops on the last frame when
    /// looping is off.
    pub fn advance(&mut self) -> i32 {
        if !self.playing {
            return self.frame;
        }
        self.frame += 1;
        if self.frame >= self.length {
            if self.looping {
                self.frame = 0;
            } else {
                self.frame = (self.length - 1).max(0);
                self.playing = false;
            }
        }
        self.frame
    }
}

/// `1000 / fps` milliseconds, or the configured fallback when that is
/// below the minimum or the rate is unusable.
pub fn frame_delay(fps: f32, settings: &Settings) -> Duration {
    let fallback = Duration::from_millis(settings.fallback_frame_delay_ms);
    if !fps.is_finite() || fps <= 0.0 {
        return fallback;
    }
    let ms = (1000.0 / fps) as u64;
    if ms < settings.min_frame_delay_ms {
        return fallback;
    }
    Duration::from_millis(ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::RotationKeyFrame;
    use crate::format::Version;
    use crate::mesh::{Face, MeshNode, TextureVertex};
    use crate::util::Quat;

    fn doc() -> Document {
        let mut doc = Document::new(Version::V2_3);
        doc.header.frame_rate = 20.0;
        let mut m = MeshNode::new("root");
        m.textures = vec!["a.bmp".into()];
        m.texture_indexes = vec![0];
        m.vertices = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        m.texture_vertices = vec![TextureVertex::new(0.0, 0.0)];
        m.faces = vec![Face::new([0, 1, 2], [0, 0, 0], 0)];
        m.rotation_key_frames = vec![
            RotationKeyFrame { frame: 0, rotation: Quat::IDENTITY },
            RotationKeyFrame { frame: 4, rotation: Quat::from_rotation_z(1.0) },
        ];
        doc.meshes.push(m);
        doc.resolve_hierarchy().expect("links");
        doc
    }

    #[test]
    fn test_frame_delay() {
        let s = Settings::default();
        assert_eq!(frame_delay(20.0, &s), Duration::from_millis(50));
        assert_eq!(frame_delay(0.0, &s), Duration::from_millis(33));
        assert_eq!(frame_delay(1000.0, &s), Duration::from_millis(33));
        assert_eq!(frame_delay(f32::NAN, &s), Duration::from_millis(33));
    }

    #[test]
    fn test_playback_wraps() {
        let mut p = Playback::new(&doc(), &Settings::default());
        assert_eq!(p.length(), 4);
        assert_eq!(p.delay(), Duration::from_millis(50));

        assert_eq!(p.advance(), 0);
        p.play();
        let frames: Vec<i32> = (0..5).map(|_| p.advance()).collect();
        assert_eq!(frames, vec![1, 2, 3, 0, 1]);

        p.seek(99);
        assert_eq!(p.frame(), 3);
    }

    #[test]
    fn test_playback_stops_without_loop() {
        let settings = Settings { loop_playback: false, ..Settings::default() };
        let mut p = Playback::new(&doc(), &settings);
        p.play();
        for _ in 0..10 {
            p.advance();
        }
        assert_eq!(p.frame(), 3);
        assert!(!p.is_playing());
    }

    #[test]
    fn test_worker_round_trip() {
        let mut worker = AnimationWorker::spawn(doc(), Settings::default());
        worker.request_frame(2, Vec3::ZERO);

        match worker.recv_timeout(Duration::from_secs(10)) {
            Some(WorkerResult::FrameReady { frame, groups }) => {
                assert_eq!(frame, 2);
                assert_eq!(groups.len(), 1);
                assert_eq!(groups[0].triangle_count(), 1);
            }
            other => panic!("unexpected result: {other:?}"),
        }
        worker.stop();
    }
}
