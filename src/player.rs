use std::time::Duration;

use crate::{AnimationDecoder, Decoder, Frame};

/// An options struct for [`Player`]
#[derive(Clone, Debug)]
pub struct PlayerOptions {
    /// Delay used for frames that do not declare one. 100ms by default
    pub default_frame_delay: Duration,

    /// Start over after the last frame. True by default
    pub looping: bool,

    /// Playback speed multiplier. Negative and non-finite values stop time
    pub play_rate: f32,
}

impl Default for PlayerOptions {
    fn default() -> Self {
        Self {
            default_frame_delay: Duration::from_millis(100),
            looping: true,
            play_rate: 1.0,
        }
    }
}

/// Drives a decoder from a game/render loop
///
/// Feed the elapsed time into [`Player::tick`]. Whenever the current frame has
/// been shown long enough, the decoder is advanced and an owned [`Frame`] is
/// returned, ready to be sent to whatever uploads the texture.
///
/// ```no_run
/// use std::time::Duration;
/// use animated_texture::prelude::*;
///
/// let buffer = std::fs::read("./data/animated.gif").unwrap();
/// let decoder = Decoder::new(ImageFormat::Gif, buffer, &DecoderOptions::default()).unwrap();
/// let mut player = Player::new(decoder, PlayerOptions::default());
///
/// loop {
///     if let Some(frame) = player.tick(Duration::from_millis(16)) {
///         // upload frame.data() into a texture
///         # let _ = frame;
///     }
///     # break;
/// }
/// ```
pub struct Player<D: AnimationDecoder = Decoder> {
    decoder: D,
    options: PlayerOptions,
    animation_length: Duration,

    playing: bool,
    frame_time: Duration,
    frame_delay: Duration,
}

impl<D: AnimationDecoder> Player<D> {
    /// Wrap a loaded decoder. Playback starts immediately, see [`Player::stop`]
    pub fn new(decoder: D, mut options: PlayerOptions) -> Self {
        options.play_rate = sanitize_rate(options.play_rate);
        let animation_length =
            Duration::from_millis(decoder.duration(millis(options.default_frame_delay)) as u64);

        Self {
            decoder,
            options,
            animation_length,
            playing: true,
            frame_time: Duration::ZERO,
            frame_delay: Duration::ZERO,
        }
    }

    /// Accumulate `delta` (scaled by the play rate) and render the next frame when
    /// the current one has been shown for its delay
    ///
    /// The first tick after [`Player::new`] or [`Player::play_from_start`] always renders.
    pub fn tick(&mut self, delta: Duration) -> Option<Frame> {
        if !self.playing {
            return None;
        }

        self.frame_time = self
            .frame_time
            .saturating_add(scale(delta, self.options.play_rate));
        if self.frame_time < self.frame_delay {
            return None;
        }

        self.frame_time = Duration::ZERO;
        Some(self.render_next())
    }

    fn render_next(&mut self) -> Frame {
        let looping = self.options.looping;
        let cursor = self.decoder.frame_index();
        let delay_ms = self
            .decoder
            .advance(millis(self.options.default_frame_delay), looping);
        self.frame_delay = Duration::from_millis(delay_ms as u64);

        // a looping decoder has moved one past the frame it drew, possibly
        // restarting from a frozen end; a non-looping one stays on its last frame
        let index = if looping {
            let frame_count = self.decoder.frame_count().max(1);
            (self.decoder.frame_index() + frame_count - 1) % frame_count
        } else {
            cursor
        };

        self.decoder.frame_buffer().snapshot(index, self.frame_delay)
    }

    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Rewind the decoder and play
    pub fn play_from_start(&mut self) {
        self.frame_time = Duration::ZERO;
        self.frame_delay = Duration::ZERO;
        self.playing = true;
        self.decoder.reset();
    }

    pub fn stop(&mut self) {
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn set_looping(&mut self, looping: bool) {
        self.options.looping = looping;
    }

    pub fn set_play_rate(&mut self, play_rate: f32) {
        self.options.play_rate = sanitize_rate(play_rate);
    }

    pub fn options(&self) -> &PlayerOptions {
        &self.options
    }

    /// Length of one pass through the animation
    pub fn animation_length(&self) -> Duration {
        self.animation_length
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn into_decoder(self) -> D {
        self.decoder
    }
}

fn millis(duration: Duration) -> u32 {
    duration.as_millis().min(u32::MAX as u128) as u32
}

/// `delta * play_rate`, saturating at `Duration::MAX`
fn scale(delta: Duration, play_rate: f32) -> Duration {
    let secs = delta.as_secs_f64() * f64::from(play_rate);
    if secs >= u64::MAX as f64 {
        Duration::MAX
    } else {
        Duration::from_secs_f64(secs)
    }
}

fn sanitize_rate(play_rate: f32) -> f32 {
    if play_rate.is_finite() && play_rate > 0.0 {
        play_rate
    } else {
        0.0
    }
}
