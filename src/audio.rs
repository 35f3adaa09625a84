//! Audio collaborator boundary.
//!
//! The game only asks for samples to start and stop; mixing and device
//! handling belong to whatever implements [`AudioEngine`]. [`RodioAudio`]
//! plays through the default output device, [`TracingAudio`] only logs.

use std::collections::{HashMap, HashSet};
use std::f32::consts::SQRT_2;
use std::io::Cursor;

use glam::Vec3;
use rodio::source::{ChannelVolume, Source};
use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, SpatialSink};

use crate::error::AudioError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundId {
    BackgroundLoop,
    BellDing,
    BoilingWater,
}

impl SoundId {
    pub const ALL: [SoundId; 3] = [SoundId::BackgroundLoop, SoundId::BellDing, SoundId::BoilingWater];

    /// WAV data shipped inside the binary.
    pub fn bundled(self) -> &'static [u8] {
        match self {
            SoundId::BackgroundLoop => include_bytes!("../assets/audio/faster-does-it.wav"),
            SoundId::BellDing => include_bytes!("../assets/audio/bell.wav"),
            SoundId::BoilingWater => include_bytes!("../assets/audio/boiling_water.wav"),
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            SoundId::BackgroundLoop => "faster-does-it.wav",
            SoundId::BellDing => "bell.wav",
            SoundId::BoilingWater => "boiling_water.wav",
        }
    }
}

/// Handle to a sample started by an [`AudioEngine`]. Stopping is always
/// explicit; dropping a handle leaves the sample playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayingSound(u64);

impl PlayingSound {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

pub trait AudioEngine {
    /// Fire-and-forget one-shot.
    fn play(&mut self, sound: SoundId, volume: f32) -> PlayingSound;

    /// Repeats until stopped. `pan` ranges from -1 (left) to 1 (right).
    fn play_looping(&mut self, sound: SoundId, volume: f32, pan: f32) -> PlayingSound;

    /// Looping sample emitted from a world position; loudness halves at
    /// `half_volume_radius` from the listener.
    fn play_positional(
        &mut self,
        sound: SoundId,
        volume: f32,
        position: Vec3,
        half_volume_radius: f32,
    ) -> PlayingSound;

    fn stop(&mut self, handle: PlayingSound);

    fn set_listener(&mut self, position: Vec3, right: Vec3, ramp: f32);
}

/// Engine used by the native host: no device output, every request is
/// reported through `tracing` so sessions can be followed from the log.
#[derive(Debug, Default)]
pub struct TracingAudio {
    next_id: u64,
    playing: HashSet<PlayingSound>,
}

impl TracingAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    fn start(&mut self, looping: bool) -> PlayingSound {
        self.next_id += 1;
        let handle = PlayingSound::new(self.next_id);
        if looping {
            self.playing.insert(handle);
        }
        handle
    }
}

impl AudioEngine for TracingAudio {
    fn play(&mut self, sound: SoundId, volume: f32) -> PlayingSound {
        let handle = self.start(false);
        tracing::debug!(sample = sound.file_name(), volume, handle = handle.id(), "play");
        handle
    }

    fn play_looping(&mut self, sound: SoundId, volume: f32, pan: f32) -> PlayingSound {
        let handle = self.start(true);
        tracing::debug!(sample = sound.file_name(), volume, pan, handle = handle.id(), "loop");
        handle
    }

    fn play_positional(
        &mut self,
        sound: SoundId,
        volume: f32,
        position: Vec3,
        half_volume_radius: f32,
    ) -> PlayingSound {
        let handle = self.start(true);
        tracing::debug!(
            sample = sound.file_name(),
            volume,
            ?position,
            half_volume_radius,
            handle = handle.id(),
            "play 3d"
        );
        handle
    }

    fn stop(&mut self, handle: PlayingSound) {
        if self.playing.remove(&handle) {
            tracing::debug!(handle = handle.id(), "stop");
        }
    }

    fn set_listener(&mut self, _position: Vec3, _right: Vec3, _ramp: f32) {}
}

/// Distance from the listener centre to each ear.
const EAR_OFFSET: f32 = 0.1;

fn decode(sound: SoundId) -> Result<Decoder<Cursor<&'static [u8]>>, AudioError> {
    Decoder::new(Cursor::new(sound.bundled())).map_err(|source| AudioError::Decode {
        sample: sound.file_name(),
        source,
    })
}

/// Linear pan: the far channel fades out, the near one stays at full level.
fn pan_gains(pan: f32) -> (f32, f32) {
    let pan = pan.clamp(-1.0, 1.0);
    ((1.0 - pan).min(1.0), (1.0 + pan).min(1.0))
}

/// rodio attenuates a spatial source by 1/d² per ear, capped at 1. Scaling
/// world distances by √2/r puts the half-level point at distance r.
fn spatial_scale(half_volume_radius: f32) -> f32 {
    SQRT_2 / half_volume_radius.max(f32::EPSILON)
}

fn ears(position: Vec3, right: Vec3) -> (Vec3, Vec3) {
    (position - right * EAR_OFFSET, position + right * EAR_OFFSET)
}

enum Voice {
    Flat(Sink),
    Spatial { sink: SpatialSink, scale: f32 },
}

/// Plays the bundled samples on the default output device.
///
/// Listener moves are applied immediately; rodio has no ramped ear
/// positions, so the ramp argument is ignored.
pub struct RodioAudio {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    next_id: u64,
    voices: HashMap<PlayingSound, Voice>,
    listener: (Vec3, Vec3),
}

impl RodioAudio {
    /// Open the default device and check every bundled sample decodes.
    pub fn new() -> Result<Self, AudioError> {
        let (stream, handle) = OutputStream::try_default()?;
        for sound in SoundId::ALL {
            decode(sound)?;
        }
        tracing::info!("audio output opened");
        Ok(Self {
            _stream: stream,
            handle,
            next_id: 0,
            voices: HashMap::new(),
            listener: (Vec3::ZERO, Vec3::Y),
        })
    }

    fn next_handle(&mut self) -> PlayingSound {
        self.next_id += 1;
        PlayingSound::new(self.next_id)
    }

    fn flat(&self, sound: SoundId, volume: f32, pan: f32, looping: bool) -> Result<Sink, AudioError> {
        let sink = Sink::try_new(&self.handle)?;
        sink.set_volume(volume);
        let (left, right) = pan_gains(pan);
        let source = ChannelVolume::new(decode(sound)?, vec![left, right]);
        if looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
        Ok(sink)
    }

    fn spatial(&self, sound: SoundId, volume: f32, position: Vec3, scale: f32) -> Result<SpatialSink, AudioError> {
        let (left, right) = ears(self.listener.0, self.listener.1);
        let sink = SpatialSink::try_new(
            &self.handle,
            (position * scale).to_array(),
            (left * scale).to_array(),
            (right * scale).to_array(),
        )?;
        sink.set_volume(volume);
        sink.append(decode(sound)?.repeat_infinite());
        Ok(sink)
    }
}

impl AudioEngine for RodioAudio {
    fn play(&mut self, sound: SoundId, volume: f32) -> PlayingSound {
        let handle = self.next_handle();
        match self.flat(sound, volume, 0.0, false) {
            Ok(sink) => sink.detach(),
            Err(e) => tracing::warn!(sample = sound.file_name(), error = %e, "one-shot not played"),
        }
        handle
    }

    fn play_looping(&mut self, sound: SoundId, volume: f32, pan: f32) -> PlayingSound {
        let handle = self.next_handle();
        match self.flat(sound, volume, pan, true) {
            Ok(sink) => {
                self.voices.insert(handle, Voice::Flat(sink));
            }
            Err(e) => tracing::warn!(sample = sound.file_name(), error = %e, "loop not played"),
        }
        handle
    }

    fn play_positional(
        &mut self,
        sound: SoundId,
        volume: f32,
        position: Vec3,
        half_volume_radius: f32,
    ) -> PlayingSound {
        let handle = self.next_handle();
        let scale = spatial_scale(half_volume_radius);
        match self.spatial(sound, volume, position, scale) {
            Ok(sink) => {
                self.voices.insert(handle, Voice::Spatial { sink, scale });
            }
            Err(e) => tracing::warn!(sample = sound.file_name(), error = %e, "positional sound not played"),
        }
        handle
    }

    fn stop(&mut self, handle: PlayingSound) {
        match self.voices.remove(&handle) {
            Some(Voice::Flat(sink)) => sink.stop(),
            Some(Voice::Spatial { sink, .. }) => sink.stop(),
            None => {}
        }
    }

    fn set_listener(&mut self, position: Vec3, right: Vec3, _ramp: f32) {
        self.listener = (position, right);
        let (left_ear, right_ear) = ears(position, right);
        for voice in self.voices.values() {
            if let Voice::Spatial { sink, scale } = voice {
                sink.set_left_ear_position((left_ear * *scale).to_array());
                sink.set_right_ear_position((right_ear * *scale).to_array());
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    pub enum AudioCall {
        Play(SoundId, PlayingSound),
        Loop(SoundId, PlayingSound),
        Positional(SoundId, Vec3, PlayingSound),
        Stop(PlayingSound),
    }

    /// Records every request into a log shared with the test body.
    #[derive(Debug, Default)]
    pub struct RecordingAudio {
        next_id: u64,
        pub log: Rc<RefCell<Vec<AudioCall>>>,
        pub listener: Rc<RefCell<Option<Vec3>>>,
    }

    impl RecordingAudio {
        fn next(&mut self) -> PlayingSound {
            self.next_id += 1;
            PlayingSound::new(self.next_id)
        }
    }

    impl AudioEngine for RecordingAudio {
        fn play(&mut self, sound: SoundId, _volume: f32) -> PlayingSound {
            let h = self.next();
            self.log.borrow_mut().push(AudioCall::Play(sound, h));
            h
        }

        fn play_looping(&mut self, sound: SoundId, _volume: f32, _pan: f32) -> PlayingSound {
            let h = self.next();
            self.log.borrow_mut().push(AudioCall::Loop(sound, h));
            h
        }

        fn play_positional(&mut self, sound: SoundId, _volume: f32, position: Vec3, _radius: f32) -> PlayingSound {
            let h = self.next();
            self.log.borrow_mut().push(AudioCall::Positional(sound, position, h));
            h
        }

        fn stop(&mut self, handle: PlayingSound) {
            self.log.borrow_mut().push(AudioCall::Stop(handle));
        }

        fn set_listener(&mut self, position: Vec3, _right: Vec3, _ramp: f32) {
            *self.listener.borrow_mut() = Some(position);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_audio_tracks_only_looping_handles() {
        let mut audio = TracingAudio::new();
        let bell = audio.play(SoundId::BellDing, 0.5);
        let boil = audio.play_positional(SoundId::BoilingWater, 1.0, Vec3::ZERO, 0.75);
        assert_ne!(bell, boil, "handles are unique");
        assert_eq!(audio.playing_count(), 1);

        audio.stop(boil);
        audio.stop(boil);
        assert_eq!(audio.playing_count(), 0);
    }

    #[test]
    fn test_bundled_samples_decode() {
        for sound in SoundId::ALL {
            let decoder = decode(sound).unwrap_or_else(|e| panic!("{}: {e}", sound.file_name()));
            assert!(decoder.sample_rate() > 0);
            assert_eq!(decoder.channels(), 1);
        }
    }

    #[test]
    fn test_pan_gains() {
        assert_eq!(pan_gains(0.0), (1.0, 1.0));
        assert_eq!(pan_gains(-1.0), (1.0, 0.0));
        assert_eq!(pan_gains(0.5), (0.5, 1.0));
        assert_eq!(pan_gains(3.0), (0.0, 1.0), "clamped");
    }

    #[test]
    fn test_spatial_scale_halves_level_at_radius() {
        let radius = 0.75;
        let d = radius * spatial_scale(radius);
        assert!((1.0 / (d * d) - 0.5).abs() < 1e-5);

        let (left, right) = ears(Vec3::new(1.0, 2.0, 0.0), Vec3::Y);
        assert_eq!(right - left, Vec3::Y * 2.0 * EAR_OFFSET);
    }
}
