//! Shared static audio: the white-noise buffer and the percussive sample.
//!
//! The noise buffer is generated synchronously on first initialization. The
//! percussive sample is decoded on a background thread and handed back over
//! a one-slot ring; the frame loop picks it up with [`BufferLibrary::poll`]
//! whenever it is ready. If loading fails the slot is marked unavailable for
//! the rest of the session and voices use the synthesized fallback.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use rand::Rng;
use rtrb::{Consumer, RingBuffer};
use tracing::{info, warn};

use crate::dsp::buffer::AudioBuffer;
use crate::error::EngineResult;

/// Length of the generated noise buffer.
pub const NOISE_SECONDS: f32 = 2.0;

#[derive(Default)]
enum PercussionSlot {
    #[default]
    Unrequested,
    Loading(Consumer<EngineResult<AudioBuffer>>),
    Ready(Arc<AudioBuffer>),
    Unavailable,
}

#[derive(Default)]
pub struct BufferLibrary {
    noise: Option<Arc<AudioBuffer>>,
    percussion: PercussionSlot,
}

impl BufferLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generate the noise buffer and start loading the percussive sample.
    ///
    /// Only the first call per library does anything.
    pub fn initialize(&mut self, sample_rate: f32, sample_path: Option<&Path>) {
        self.initialize_with_rng(sample_rate, sample_path, &mut rand::thread_rng());
    }

    pub fn initialize_with_rng<R: Rng + ?Sized>(
        &mut self,
        sample_rate: f32,
        sample_path: Option<&Path>,
        rng: &mut R,
    ) {
        if self.noise.is_some() {
            return;
        }
        self.noise = Some(Arc::new(AudioBuffer::noise(sample_rate, NOISE_SECONDS, rng)));

        if !matches!(self.percussion, PercussionSlot::Unrequested) {
            return;
        }
        self.percussion = match sample_path {
            Some(path) => spawn_loader(path.to_path_buf()),
            None => {
                info!("no percussive sample configured, using fallback kick");
                PercussionSlot::Unavailable
            }
        };
    }

    /// Pick up the percussive sample if the loader has finished.
    pub fn poll(&mut self) {
        let PercussionSlot::Loading(rx) = &mut self.percussion else {
            return;
        };

        let next = match rx.pop() {
            Ok(result) => settle(result),
            // The loader may push and exit between the two checks
            Err(_) if rx.is_abandoned() => match rx.pop() {
                Ok(result) => settle(result),
                Err(_) => {
                    warn!("sample loader exited without a result, using fallback kick");
                    PercussionSlot::Unavailable
                }
            },
            Err(_) => return,
        };
        self.percussion = next;
    }

    /// Install an already decoded sample, replacing any pending load.
    pub fn with_percussion(mut self, buffer: AudioBuffer) -> Self {
        self.percussion = PercussionSlot::Ready(Arc::new(buffer));
        self
    }

    pub fn noise(&self) -> Option<&Arc<AudioBuffer>> {
        self.noise.as_ref()
    }

    pub fn percussion(&self) -> Option<&Arc<AudioBuffer>> {
        match &self.percussion {
            PercussionSlot::Ready(buffer) => Some(buffer),
            _ => None,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.noise.is_some()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.percussion, PercussionSlot::Loading(_))
    }

    /// True once loading failed; the slot stays empty for the session.
    pub fn percussion_unavailable(&self) -> bool {
        matches!(self.percussion, PercussionSlot::Unavailable)
    }
}

fn settle(result: EngineResult<AudioBuffer>) -> PercussionSlot {
    match result {
        Ok(buffer) => {
            info!(
                frames = buffer.len(),
                sample_rate = buffer.sample_rate(),
                "percussive sample loaded"
            );
            PercussionSlot::Ready(Arc::new(buffer))
        }
        Err(err) => {
            warn!(error = %err, "percussive sample unavailable, using fallback kick");
            PercussionSlot::Unavailable
        }
    }
}

fn spawn_loader(path: PathBuf) -> PercussionSlot {
    let (mut tx, rx) = RingBuffer::<EngineResult<AudioBuffer>>::new(1);

    let spawned = thread::Builder::new()
        .name("sample-loader".into())
        .spawn(move || {
            let result = AudioBuffer::from_wav(&path);
            // The library may have been dropped already; nothing to report to
            let _ = tx.push(result);
        });

    match spawned {
        Ok(_) => PercussionSlot::Loading(rx),
        Err(err) => {
            warn!(error = %err, "could not start sample loader, using fallback kick");
            PercussionSlot::Unavailable
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};
    use std::time::{Duration, Instant};

    fn wait_for_load(library: &mut BufferLibrary) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while library.is_loading() && Instant::now() < deadline {
            library.poll();
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn write_wav(path: &Path, samples: &[i16]) {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22_050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
        for &s in samples {
            writer.write_sample(s).expect("write sample");
        }
        writer.finalize().expect("finalize wav");
    }

    #[test]
    fn noise_is_generated_once() {
        let mut library = BufferLibrary::new();
        let mut rng = StdRng::seed_from_u64(1);
        library.initialize_with_rng(48_000.0, None, &mut rng);

        let first = Arc::clone(library.noise().expect("noise"));
        assert_eq!(first.len(), 96_000);

        library.initialize(48_000.0, None);
        assert!(Arc::ptr_eq(&first, library.noise().expect("noise")));
    }

    #[test]
    fn missing_sample_falls_back_permanently() {
        let mut library = BufferLibrary::new();
        library.initialize(48_000.0, Some(Path::new("/definitely/not/here/kick.wav")));
        wait_for_load(&mut library);

        assert!(library.percussion().is_none());
        assert!(library.percussion_unavailable());

        // No retry on later polls
        library.poll();
        assert!(library.percussion_unavailable());
    }

    #[test]
    fn decodes_sample_in_background() {
        let path = std::env::temp_dir().join(format!("synesthesia-kick-{}.wav", std::process::id()));
        write_wav(&path, &[0, 8_192, 16_384, -16_384]);

        let mut library = BufferLibrary::new();
        library.initialize(48_000.0, Some(&path));
        wait_for_load(&mut library);
        let _ = std::fs::remove_file(&path);

        let kick = library.percussion().expect("sample should load");
        assert_eq!(kick.len(), 4);
        assert_eq!(kick.sample_rate(), 22_050.0);
    }

    #[test]
    fn no_path_means_no_sample() {
        let mut library = BufferLibrary::new();
        library.initialize(44_100.0, None);
        assert!(library.is_initialized());
        assert!(!library.is_loading());
        assert!(library.percussion().is_none());
    }

    #[test]
    fn preloaded_sample_is_ready() {
        let library = BufferLibrary::new().with_percussion(AudioBuffer::new(48_000.0, vec![0.5; 10]));
        assert_eq!(library.percussion().map(|b| b.len()), Some(10));
    }
}
