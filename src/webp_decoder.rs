use std::{fmt::Debug, mem, pin::Pin, ptr, slice};

use libwebp_sys as webp;

use crate::{AnimationDecoder, Canvas, DecoderOptions, Error, LoopCount, WebPFeatures};

/// A decoder for webp animation data
///
/// Frames are decoded by libwebp's animation decoder, which already resolves
/// disposal and blending, so every [`AnimationDecoder::advance`] copies a fully
/// composited canvas. Frame delays are derived from the frame timestamps.
///
/// ```no_run
/// use animated_texture::prelude::*;
/// use animated_texture::WebPDecoder;
///
/// let buffer = std::fs::read("./data/animated.webp").unwrap();
/// let mut decoder = WebPDecoder::new(buffer).unwrap();
/// let total_ms = decoder.duration(100);
///
/// let mut played_ms = 0;
/// for _ in 0..decoder.frame_count() {
///     played_ms += decoder.advance(100, false);
/// }
/// assert_eq!(played_ms, total_ms);
/// ```
pub struct WebPDecoder {
    decoder_wr: DecoderWrapper,
    info: webp::WebPAnimInfo,
    features: WebPFeatures,
    canvas: Canvas,
    duration_ms: u32,

    prev_timestamp: i32,
    current_frame: usize,
    loops: u32,
    finished: bool,
}

impl WebPDecoder {
    /// Construct a new decoder from webp `buffer`
    ///
    /// Returns an [`Error`] in case of a decoding failure (e.g. malformed input)
    pub fn new(buffer: Vec<u8>) -> Result<Self, Error> {
        WebPDecoder::new_with_options(buffer, &Default::default())
    }

    /// Construct a new decoder from webp `buffer`, rejecting canvases larger than
    /// [`DecoderOptions::max_canvas_pixels`]
    pub fn new_with_options(buffer: Vec<u8>, options: &DecoderOptions) -> Result<Self, Error> {
        if buffer.is_empty() {
            return Err(Error::ZeroSizeBuffer);
        }

        let features = WebPFeatures::probe(&buffer)?;
        options.check_canvas(features.width, features.height)?;

        let mut decoder_options = Box::pin(unsafe {
            let mut options = mem::zeroed();

            if webp::WebPAnimDecoderOptionsInit(&mut options) != 1 {
                return Err(Error::OptionsInitFailed);
            }

            options
        });

        decoder_options.use_threads = 0;
        decoder_options.color_mode = webp::MODE_RGBA;

        let mut decoder_wr = DecoderWrapper::new(buffer, decoder_options)?;

        let info = unsafe {
            let mut info = mem::zeroed();
            if webp::WebPAnimDecoderGetInfo(decoder_wr.decoder, &mut info) != 1 {
                return Err(Error::DecoderGetInfoFailed);
            }
            info
        };

        options.check_canvas(info.canvas_width, info.canvas_height)?;
        if info.frame_count == 0 {
            return Err(Error::NoFrames);
        }

        let canvas = Canvas::new(info.canvas_width, info.canvas_height);
        let duration_ms = prescan_duration(&mut decoder_wr, canvas.data().len());

        let decoder = Self {
            decoder_wr,
            info,
            features,
            canvas,
            duration_ms,
            prev_timestamp: 0,
            current_frame: 0,
            loops: 0,
            finished: false,
        };

        log::trace!("WebP decoder initialized. {:?}", decoder);

        Ok(decoder)
    }

    /// Header features read before decoding
    pub fn features(&self) -> WebPFeatures {
        self.features
    }

    /// Container background color, `[r, g, b, a]`. libwebp only uses it as a hint
    pub fn background_color(&self) -> [u8; 4] {
        // stored as 0xAARRGGBB
        let [a, r, g, b] = self.info.bgcolor.to_be_bytes();
        [r, g, b, a]
    }

    fn rewind(&mut self) {
        self.decoder_wr.reset();
        self.prev_timestamp = 0;
        self.current_frame = 0;
        self.finished = false;
    }
}

impl AnimationDecoder for WebPDecoder {
    fn advance(&mut self, default_delay_ms: u32, looping: bool) -> u32 {
        if self.finished || !self.decoder_wr.has_more_frames() {
            if !looping {
                return default_delay_ms;
            }
            self.rewind();
        }

        let frame_size = self.canvas.data().len();
        let timestamp = match self.decoder_wr.next_frame(frame_size) {
            Some((data, timestamp)) => {
                if !self.canvas.copy_from(data) {
                    log::warn!(
                        "WebP frame {} is {}b, canvas expects {}b, keeping the previous one",
                        self.current_frame,
                        data.len(),
                        frame_size
                    );
                }
                timestamp
            }
            None => {
                log::error!(
                    "WebP frame {} could not be decoded, keeping the previous one",
                    self.current_frame
                );
                return default_delay_ms;
            }
        };

        log::trace!(
            "Decoded WebP frame {}, timestamp {}",
            self.current_frame,
            timestamp
        );

        let delay_ms = (timestamp - self.prev_timestamp).max(0) as u32;
        self.prev_timestamp = timestamp;
        self.current_frame += 1;

        if !self.decoder_wr.has_more_frames() {
            self.loops += 1;
            if looping {
                self.rewind();
            } else {
                self.current_frame -= 1;
                self.finished = true;
            }
        }

        delay_ms
    }

    fn reset(&mut self) {
        self.rewind();
        self.loops = 0;
    }

    fn frame_buffer(&self) -> &Canvas {
        &self.canvas
    }

    fn duration(&self, _default_delay_ms: u32) -> u32 {
        self.duration_ms
    }

    fn supports_transparency(&self) -> bool {
        self.features.has_alpha
    }

    fn frame_count(&self) -> usize {
        self.info.frame_count as usize
    }

    fn frame_index(&self) -> usize {
        self.current_frame
    }

    fn loops_completed(&self) -> u32 {
        self.loops
    }

    fn loop_count(&self) -> LoopCount {
        match self.info.loop_count {
            0 => LoopCount::Infinite,
            n => LoopCount::Finite(n),
        }
    }
}

impl Debug for WebPDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let info = &self.info;

        write!(f, "WebPDecoder {{ buffer: {}b, info: {{ w: {}, h: {}, loop_cnt: {}, bgcolor: 0x{:x}, frame_count: {} }}, alpha: {}, duration: {}ms }}", self.decoder_wr.buffer.len(), info.canvas_width, info.canvas_height, info.loop_count, info.bgcolor, info.frame_count, self.features.has_alpha, self.duration_ms)
    }
}

/// Drain every frame once to learn the timestamp of the last one, then rewind.
/// The container has no total duration field
fn prescan_duration(decoder_wr: &mut DecoderWrapper, frame_size: usize) -> u32 {
    let mut last_timestamp = 0;
    while decoder_wr.has_more_frames() {
        match decoder_wr.next_frame(frame_size) {
            Some((_, timestamp)) => last_timestamp = timestamp,
            None => break,
        }
    }
    decoder_wr.reset();

    last_timestamp.max(0) as u32
}

struct DecoderWrapper {
    decoder: *mut webp::WebPAnimDecoder,

    #[allow(dead_code)]
    data: Pin<Box<webp::WebPData>>,
    #[allow(dead_code)]
    options: Pin<Box<webp::WebPAnimDecoderOptions>>,
    // referenced by `data`, must outlive `decoder`
    buffer: Vec<u8>,
}

impl DecoderWrapper {
    fn new(
        buffer: Vec<u8>,
        options: Pin<Box<webp::WebPAnimDecoderOptions>>,
    ) -> Result<Self, Error> {
        // pin data (& options above) because decoder takes reference to them
        let data = Box::pin(webp::WebPData {
            bytes: buffer.as_ptr(),
            size: buffer.len(),
        });

        let decoder = unsafe { webp::WebPAnimDecoderNew(&*data, &*options) };
        if decoder.is_null() {
            return Err(Error::DecodeFailed);
        }

        Ok(Self {
            decoder,
            data,
            options,
            buffer,
        })
    }

    fn has_more_frames(&self) -> bool {
        let frames = unsafe { webp::WebPAnimDecoderHasMoreFrames(self.decoder) };
        frames > 0
    }

    fn reset(&mut self) {
        unsafe { webp::WebPAnimDecoderReset(self.decoder) };
    }

    /// Decode the next frame. The returned canvas (`frame_size` bytes) stays valid
    /// until the decoder is advanced, reset or dropped
    fn next_frame(&mut self, frame_size: usize) -> Option<(&[u8], i32)> {
        let mut output_buffer = ptr::null_mut();
        let mut timestamp: i32 = 0;

        if unsafe { webp::WebPAnimDecoderGetNext(self.decoder, &mut output_buffer, &mut timestamp) }
            != 1
        {
            // "False if any of the arguments are NULL, or if there is a parsing or decoding error, or if there are no more frames. Otherwise, returns true."
            log::warn!("webp::WebPAnimDecoderGetNext did not return success - frame parsing failed, parsing/decoding error?");
            return None;
        }

        if output_buffer.is_null() {
            log::error!("webp::WebPAnimDecoderGetNext returned null output ptr, can not decode a frame. This should not happen");
            return None;
        }

        let data = unsafe { slice::from_raw_parts(output_buffer as *const u8, frame_size) };
        Some((data, timestamp))
    }
}

/// SAFETY: the libwebp animation decoder has no thread affinity, and the wrapper
/// owns every buffer it points into. Moving it to another thread is safe as long
/// as it is not shared, so it is deliberately not `Sync`
unsafe impl Send for DecoderWrapper {}

impl Drop for DecoderWrapper {
    fn drop(&mut self) {
        unsafe { webp::WebPAnimDecoderDelete(self.decoder) };
    }
}
