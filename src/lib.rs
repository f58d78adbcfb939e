//! # Overview
//!
//! This crate decodes animated [GIF](https://en.wikipedia.org/wiki/GIF) and
//! [WebP](https://en.wikipedia.org/wiki/WebP) images into a sequence of
//! full-canvas RGBA frames, ready to be uploaded into a texture one frame at a time.
//!
//! GIF containers are parsed with the pure-Rust [gif](https://crates.io/crates/gif)
//! crate and composited here (disposal, transparency, timing). WebP animations are
//! decoded by the C-based [libwebp](https://developers.google.com/speed/webp/docs/container-api)
//! library by Google, interfaced through the [libwebp-sys2](https://crates.io/crates/libwebp-sys2)
//! crate.
//!
//! Both formats are exposed through the [`AnimationDecoder`] trait and the
//! [`Decoder`] enum, so a playback loop can drive either one the same way.
//!
//! # Usage
//! ```no_run
//! use animated_texture::prelude::*;
//!
//! let buffer = std::fs::read("./data/animated.webp").unwrap();
//! let mut decoder = Decoder::new(ImageFormat::WebP, buffer, &DecoderOptions::default()).unwrap();
//!
//! let total_ms = decoder.duration(100);
//! let delay_ms = decoder.advance(100, true);
//! let rgba = decoder.frame_buffer().data();
//! # let _ = (total_ms, delay_ms, rgba);
//! ```
//!
//! Have a look at [`Player`] for a ready-made playback driver.
mod canvas;
mod decoder;
mod frame;
mod gif_decoder;
mod player;
mod webp_decoder;
mod webp_features;

#[cfg(test)]
mod test_util;

pub use canvas::*;
pub use decoder::*;
pub use frame::*;
pub use gif_decoder::*;
pub use player::*;
pub use webp_decoder::*;
pub use webp_features::*;

pub mod prelude {
    pub use crate::{
        AnimationDecoder, Decoder, DecoderOptions, Frame, ImageFormat, Player, PlayerOptions,
    };
}

const PIXEL_BYTES: usize = 4;

/// Error type produced by `animated_texture` code
///
/// Only loading an animation can fail. Once a decoder exists, frame decoding
/// problems are logged and playback degrades instead of returning errors.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Error {
    /// Input buffer is empty
    #[error("input buffer is empty")]
    ZeroSizeBuffer,

    /// GIF container could not be parsed, message from the underlying parser
    #[error("gif decoding failed: {0}")]
    GifDecodeFailed(String),

    /// Container was parsed but holds no frames
    #[error("animation contains no frames")]
    NoFrames,

    /// Container declares a canvas with zero width or height
    #[error("animation canvas has zero area")]
    ZeroSizeCanvas,

    /// Container declares a too large canvas (`width`, `height`, max pixel count).
    /// See [`DecoderOptions::max_canvas_pixels`]
    #[error("canvas {0}x{1} exceeds {2} pixels")]
    TooLargeCanvas(u32, u32, usize),

    /// WebP bitstream features could not be read, libwebp status code
    #[error("invalid webp header, status {0}")]
    InvalidWebPHeader(i32),

    /// Initializing webp options failed, internal (memory allocation?) failure
    #[error("webp decoder options init failed")]
    OptionsInitFailed,

    /// Decoder init failed, input contains wrong bytes
    #[error("webp decoder could not parse input")]
    DecodeFailed,

    /// Decoder could not get metadata of webp stream. Corrupt data?
    #[error("webp decoder could not read animation info")]
    DecoderGetInfoFailed,
}
