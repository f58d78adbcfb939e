use std::{fmt::Debug, path::Path};

use crate::{Canvas, Error, GifDecoder, WebPDecoder};

pub(crate) const MAX_CANVAS_SIZE: usize = 3840 * 2160; // 4k

/// Container format of an animation, selected by the caller
///
/// The decoder never guesses the format from the content; pick it from the
/// file extension or the fetch metadata.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ImageFormat {
    Gif,
    WebP,
}

impl ImageFormat {
    /// Map a file extension (`"gif"`, `".WEBP"`, ...) to a format
    ///
    /// ```
    /// # use animated_texture::ImageFormat;
    /// assert_eq!(ImageFormat::from_extension(".GIF"), Some(ImageFormat::Gif));
    /// assert_eq!(ImageFormat::from_extension("webp"), Some(ImageFormat::WebP));
    /// assert_eq!(ImageFormat::from_extension("png"), None);
    /// ```
    pub fn from_extension(extension: &str) -> Option<Self> {
        let extension = extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("gif") {
            Some(ImageFormat::Gif)
        } else if extension.eq_ignore_ascii_case("webp") {
            Some(ImageFormat::WebP)
        } else {
            None
        }
    }

    /// Map the extension of `path` to a format
    pub fn from_path<P: AsRef<Path>>(path: P) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

/// Number of times the container asks the animation to be played
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum LoopCount {
    Infinite,
    Finite(u32),
}

/// An options struct for [`Decoder`]
///
/// For usage, see [`Decoder::new`]
#[derive(Clone, Debug)]
pub struct DecoderOptions {
    /// Largest accepted canvas, in pixels (`width * height`). Containers declaring
    /// a larger logical screen are rejected with [`Error::TooLargeCanvas`] before
    /// any canvas is allocated. 3840 * 2160 by default
    pub max_canvas_pixels: usize,
}

impl Default for DecoderOptions {
    fn default() -> Self {
        Self {
            max_canvas_pixels: MAX_CANVAS_SIZE,
        }
    }
}

impl DecoderOptions {
    pub(crate) fn check_canvas(&self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Err(Error::ZeroSizeCanvas);
        }

        // prevent too large allocations
        if width as usize * height as usize > self.max_canvas_pixels {
            return Err(Error::TooLargeCanvas(
                width,
                height,
                self.max_canvas_pixels,
            ));
        }

        Ok(())
    }
}

/// Frame-by-frame access to a loaded animation
///
/// An implementation owns one canvas of [`AnimationDecoder::dimensions`] and
/// updates it in place on every [`AnimationDecoder::advance`]. Loading happens
/// in the implementation's constructor, so every method here is total: decoding
/// problems after a successful load are logged and degrade playback instead of
/// failing.
///
/// Calls must not overlap. Copy the canvas (see [`Canvas::snapshot`]) before
/// giving it to anything that outlives the next `advance`.
pub trait AnimationDecoder {
    /// Composite the next frame onto the canvas and return how long it should be
    /// shown, in milliseconds
    ///
    /// `default_delay_ms` is used for frames without a delay and whenever the frame
    /// can not be decoded. When the last frame has been shown, playback starts over
    /// if `looping` is set, otherwise it stays on the last frame.
    fn advance(&mut self, default_delay_ms: u32, looping: bool) -> u32;

    /// Rewind to the first frame and forget loop and disposal state
    fn reset(&mut self);

    /// Read-only view of the current canvas
    fn frame_buffer(&self) -> &Canvas;

    /// Sum of all frame delays in milliseconds, `default_delay_ms` standing in for
    /// frames without a delay. Does not depend on the playback position
    fn duration(&self, default_delay_ms: u32) -> u32;

    /// True if any frame may contain transparent pixels
    fn supports_transparency(&self) -> bool;

    /// Number of frames in the container
    fn frame_count(&self) -> usize;

    /// Index of the frame the next `advance` will draw
    fn frame_index(&self) -> usize;

    /// How many times playback has run past the last frame since load or reset
    fn loops_completed(&self) -> u32;

    /// Repeat count declared by the container
    fn loop_count(&self) -> LoopCount;

    fn dimensions(&self) -> (u32, u32) {
        self.frame_buffer().dimensions()
    }

    fn width(&self) -> u32 {
        self.dimensions().0
    }

    fn height(&self) -> u32 {
        self.dimensions().1
    }
}

/// A loaded animation of either supported format
///
/// ```no_run
/// use animated_texture::prelude::*;
///
/// let path = "./data/animated.gif";
/// let format = ImageFormat::from_path(path).unwrap();
/// let buffer = std::fs::read(path).unwrap();
///
/// let mut decoder = Decoder::new(format, buffer, &DecoderOptions::default()).unwrap();
/// let (width, height) = decoder.dimensions();
///
/// for _ in 0..decoder.frame_count() {
///     let delay_ms = decoder.advance(100, false);
///     assert_eq!(decoder.frame_buffer().data().len(), (width * height * 4) as usize);
///     # let _ = delay_ms;
/// }
/// ```
pub enum Decoder {
    Gif(GifDecoder),
    WebP(WebPDecoder),
}

impl Decoder {
    /// Load an animation of `format` from an in-memory `buffer`
    ///
    /// Returns an [`Error`] when the buffer is empty or the container can not be
    /// parsed. No decoder exists in that case.
    pub fn new(
        format: ImageFormat,
        buffer: Vec<u8>,
        options: &DecoderOptions,
    ) -> Result<Self, Error> {
        if buffer.is_empty() {
            return Err(Error::ZeroSizeBuffer);
        }

        Ok(match format {
            ImageFormat::Gif => Decoder::Gif(GifDecoder::new_with_options(&buffer, options)?),
            ImageFormat::WebP => Decoder::WebP(WebPDecoder::new_with_options(buffer, options)?),
        })
    }

    pub fn format(&self) -> ImageFormat {
        match self {
            Decoder::Gif(_) => ImageFormat::Gif,
            Decoder::WebP(_) => ImageFormat::WebP,
        }
    }

    fn inner(&self) -> &dyn AnimationDecoder {
        match self {
            Decoder::Gif(decoder) => decoder,
            Decoder::WebP(decoder) => decoder,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn AnimationDecoder {
        match self {
            Decoder::Gif(decoder) => decoder,
            Decoder::WebP(decoder) => decoder,
        }
    }
}

impl AnimationDecoder for Decoder {
    fn advance(&mut self, default_delay_ms: u32, looping: bool) -> u32 {
        self.inner_mut().advance(default_delay_ms, looping)
    }

    fn reset(&mut self) {
        self.inner_mut().reset()
    }

    fn frame_buffer(&self) -> &Canvas {
        self.inner().frame_buffer()
    }

    fn duration(&self, default_delay_ms: u32) -> u32 {
        self.inner().duration(default_delay_ms)
    }

    fn supports_transparency(&self) -> bool {
        self.inner().supports_transparency()
    }

    fn frame_count(&self) -> usize {
        self.inner().frame_count()
    }

    fn frame_index(&self) -> usize {
        self.inner().frame_index()
    }

    fn loops_completed(&self) -> u32 {
        self.inner().loops_completed()
    }

    fn loop_count(&self) -> LoopCount {
        self.inner().loop_count()
    }
}

impl Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Decoder::Gif(decoder) => decoder.fmt(f),
            Decoder::WebP(decoder) => decoder.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{self, GifFrameSpec};

    #[test]
    fn test_format_from_path() {
        assert_eq!(ImageFormat::from_path("a/b/c.Gif"), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_path("anim.webp"), Some(ImageFormat::WebP));
        assert_eq!(ImageFormat::from_path("anim.gif.png"), None);
        assert_eq!(ImageFormat::from_path("gif"), None);
    }

    #[test]
    fn test_decoder_failure() {
        let options = DecoderOptions::default();

        for format in [ImageFormat::Gif, ImageFormat::WebP] {
            assert_eq!(
                Decoder::new(format, vec![], &options).unwrap_err(),
                Error::ZeroSizeBuffer
            );
            assert!(Decoder::new(format, vec![0x00, 0x01], &options).is_err());
            assert!(Decoder::new(format, b"not an image at all".to_vec(), &options).is_err());
        }
    }

    #[test]
    fn test_format_is_taken_from_caller() {
        let gif = test_util::encode_gif(2, 2, &test_util::PALETTE, &[GifFrameSpec::full(2, 2, 1)]);
        assert!(Decoder::new(ImageFormat::WebP, gif.clone(), &Default::default()).is_err());

        let decoder = Decoder::new(ImageFormat::Gif, gif, &Default::default()).unwrap();
        assert_eq!(decoder.format(), ImageFormat::Gif);
        assert_eq!(decoder.dimensions(), (2, 2));
    }

    #[test]
    fn test_dispatch_gif() {
        let gif = test_util::encode_gif(
            3,
            1,
            &test_util::PALETTE,
            &[
                GifFrameSpec::full(3, 1, 1).delay(4),
                GifFrameSpec::full(3, 1, 2).transparent(0),
            ],
        );
        let mut decoder = Decoder::new(ImageFormat::Gif, gif, &Default::default()).unwrap();

        assert_eq!(decoder.frame_count(), 2);
        assert_eq!(decoder.duration(100), 140);
        assert!(decoder.supports_transparency());

        assert_eq!(decoder.advance(100, true), 40);
        assert_eq!(decoder.frame_index(), 1);
        assert_eq!(decoder.advance(100, true), 100);
        assert_eq!(decoder.frame_index(), 0);
        assert_eq!(decoder.loops_completed(), 1);

        decoder.reset();
        assert_eq!(decoder.loops_completed(), 0);
    }

    #[test]
    fn test_dispatch_webp() {
        let webp = test_util::encode_webp(
            4,
            4,
            &[
                test_util::solid_rgba(4, 4, [255, 0, 0, 255]),
                test_util::solid_rgba(4, 4, [0, 255, 0, 255]),
            ],
            &[0, 60],
            150,
        );
        let mut decoder = Decoder::new(ImageFormat::WebP, webp, &Default::default()).unwrap();

        assert_eq!(decoder.format(), ImageFormat::WebP);
        assert_eq!(decoder.dimensions(), (4, 4));
        assert_eq!(decoder.frame_count(), 2);
        assert_eq!(decoder.duration(100), 150);
        assert_eq!(decoder.advance(100, false), 60);
        assert_eq!(decoder.frame_buffer().pixel(0, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_too_large_canvas() {
        let gif =
            test_util::encode_gif(64, 64, &test_util::PALETTE, &[GifFrameSpec::full(1, 1, 1)]);
        let options = DecoderOptions {
            max_canvas_pixels: 1000,
        };

        assert_eq!(
            Decoder::new(ImageFormat::Gif, gif, &options).unwrap_err(),
            Error::TooLargeCanvas(64, 64, 1000)
        );
    }
}
