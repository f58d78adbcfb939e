use std::{fmt::Debug, time::Duration};

#[cfg(feature = "image")]
use image::ImageBuffer;

/// An owned copy of an animation canvas, taken after a frame was composited
///
/// Frames are what a playback driver hands to a rendering consumer: they do not
/// borrow from the decoder, so the decoder can keep advancing while the frame is
/// uploaded elsewhere (possibly on another thread).
///
/// ```no_run
/// use animated_texture::prelude::*;
/// use std::time::Duration;
///
/// let buffer = std::fs::read("./data/animated.gif").unwrap();
/// let decoder = Decoder::new(ImageFormat::Gif, buffer, &Default::default()).unwrap();
/// let mut player = Player::new(decoder, PlayerOptions::default());
///
/// let frame = player.tick(Duration::from_millis(16)).unwrap();
/// let (width, height) = frame.dimensions();
/// assert_eq!(frame.data().len(), (width * height * 4) as usize);
/// ```
///
/// If `image` feature is enabled, frame can be converted into [`image::ImageBuffer`]:
/// ```no_run
/// # use animated_texture::prelude::*;
/// # use std::time::Duration;
/// #
/// # let buffer = std::fs::read("./data/animated.gif").unwrap();
/// # let decoder = Decoder::new(ImageFormat::Gif, buffer, &Default::default()).unwrap();
/// # let mut player = Player::new(decoder, PlayerOptions::default());
/// # let frame = player.tick(Duration::from_millis(16)).unwrap();
/// #
/// ##[cfg(feature = "image")]
/// let image = frame.into_image().unwrap();
/// // image.save("frame.png");
/// ```
#[derive(Clone)]
pub struct Frame {
    index: usize,
    delay: Duration,
    frame_data: Vec<u8>,
    dimensions: (u32, u32),
}

impl Frame {
    pub(crate) fn new_from_canvas(
        index: usize,
        delay: Duration,
        frame_data: Vec<u8>,
        dimensions: (u32, u32),
    ) -> Self {
        Self {
            index,
            delay,
            frame_data,
            dimensions,
        }
    }

    /// Get dimensions of the frame (`width`, `height`), always the canvas size
    pub fn dimensions(&self) -> (u32, u32) {
        self.dimensions
    }

    /// Index of the animation frame this snapshot shows
    pub fn index(&self) -> usize {
        self.index
    }

    /// How long this frame should stay on screen
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Get frame data, size `width` * `height` * 4, RGBA pixels
    pub fn data(&self) -> &[u8] {
        &self.frame_data
    }

    /// Take the RGBA pixel data out of the frame
    pub fn into_data(self) -> Vec<u8> {
        self.frame_data
    }

    /// Convert the frame to [`image::ImageBuffer`] in `Rgba<u8>` format
    ///
    /// Requires feature `image` to be enabled
    #[cfg(feature = "image")]
    pub fn into_image(self) -> Option<ImageBuffer<image::Rgba<u8>, Vec<u8>>> {
        ImageBuffer::from_vec(self.dimensions.0, self.dimensions.1, self.frame_data)
    }
}

impl Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame {{ index: {}, delay: {:?}, frame_data: {}b }}",
            self.index,
            self.delay,
            self.frame_data.len()
        )
    }
}
