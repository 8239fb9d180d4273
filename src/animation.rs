//! Assemble downloaded frames into a looping animated GIF.

use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};

use image::{
    codecs::gif::{GifEncoder, Repeat},
    Delay, Frame, RgbaImage,
};
use log::debug;

use crate::{errors::RadarLoopErr, fetch::FrameBytes, frame::FrameReference};

/// Encoding parameters for an animation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AnimationSettings {
    /// How long each frame is shown.
    pub frame_delay: Duration,
    /// How many times to play the loop, 0 for forever.
    pub loop_count: u16,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        AnimationSettings {
            frame_delay: Duration::from_millis(500),
            loop_count: 0,
        }
    }
}

impl AnimationSettings {
    fn repeat(&self) -> Repeat {
        match self.loop_count {
            0 => Repeat::Infinite,
            n => Repeat::Finite(n),
        }
    }
}

/// A finished animation held in memory.
#[derive(Clone, Debug)]
pub struct AnimationArtifact {
    frames: Vec<FrameReference>,
    settings: AnimationSettings,
    gif: Vec<u8>,
}

impl AnimationArtifact {
    /// The frames in the animation, in display order.
    pub fn frames(&self) -> &[FrameReference] {
        &self.frames
    }

    /// The settings used to encode it.
    pub fn settings(&self) -> AnimationSettings {
        self.settings
    }

    /// The encoded GIF.
    pub fn as_bytes(&self) -> &[u8] {
        &self.gif
    }

    /// Take the encoded GIF.
    pub fn into_bytes(self) -> Vec<u8> {
        self.gif
    }

    /// Write the GIF to `path`.
    ///
    /// The file is written beside the target and renamed into place, so a viewer never sees a
    /// partial animation.
    pub fn write_to(&self, path: &Path) -> Result<(), RadarLoopErr> {
        let mut tmp_name = path
            .file_name()
            .ok_or(RadarLoopErr::InvalidConfig("output path has no file name"))?
            .to_os_string();
        tmp_name.push(".part");
        let tmp_path: PathBuf = path.with_file_name(tmp_name);

        std::fs::write(&tmp_path, &self.gif)?;
        std::fs::rename(&tmp_path, path)?;

        Ok(())
    }
}

/// Decode every frame, checking they all share the size of the first one.
fn decode_frames(frames: &[FrameBytes]) -> Result<Vec<RgbaImage>, RadarLoopErr> {
    let mut images: Vec<RgbaImage> = Vec::with_capacity(frames.len());

    for frame in frames {
        let img = image::load_from_memory_with_format(frame.bytes(), frame.format())?.to_rgba8();
        debug!(
            "decoded {} ({} bytes, {}x{})",
            frame.reference(),
            frame.bytes().len(),
            img.width(),
            img.height()
        );

        if let Some(first) = images.first() {
            if first.dimensions() != img.dimensions() {
                return Err(RadarLoopErr::FrameSizeMismatch {
                    name: frame.reference().raw_filename().to_owned(),
                    expected: first.dimensions(),
                    found: img.dimensions(),
                });
            }
        }

        images.push(img);
    }

    Ok(images)
}

/// Encode `frames`, in order, as an animated GIF written to `out`.
///
/// Every frame is decoded and checked before anything is written.
pub fn encode<W: Write>(
    frames: &[FrameBytes],
    settings: &AnimationSettings,
    out: W,
) -> Result<(), RadarLoopErr> {
    if frames.is_empty() {
        return Err(RadarLoopErr::NoFrames);
    }

    let images = decode_frames(frames)?;
    let delay = Delay::from_saturating_duration(settings.frame_delay);

    let mut encoder = GifEncoder::new(out);
    encoder.set_repeat(settings.repeat())?;
    for img in images {
        encoder.encode_frame(Frame::from_parts(img, 0, 0, delay))?;
    }

    Ok(())
}

/// Encode `frames` into an in-memory artifact.
pub fn animate(
    frames: &[FrameBytes],
    settings: &AnimationSettings,
) -> Result<AnimationArtifact, RadarLoopErr> {
    let mut gif = vec![];
    encode(frames, settings, &mut gif)?;

    Ok(AnimationArtifact {
        frames: frames.iter().map(|f| f.reference().clone()).collect(),
        settings: *settings,
        gif,
    })
}

/*--------------------------------------------------------------------------------------------------
                                          Unit Tests
--------------------------------------------------------------------------------------------------*/
