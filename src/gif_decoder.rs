use std::fmt::Debug;

use crate::{
    canvas::OPAQUE_BLACK, AnimationDecoder, Canvas, DecoderOptions, Error, LoopCount, Rect, Rgba,
};

/// What happens to a frame's region before the next frame is drawn
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum DisposalMode {
    /// No disposal specified, the canvas is left as is
    Unspecified,
    /// Leave the frame in place. Until the animation loops, transparent pixels of
    /// later frames let the accumulated picture show through
    DoNotDispose,
    /// Restore the frame's region to the background color
    RestoreBackground,
    /// Restore the region to what it was before the frame was drawn. Treated like
    /// [`DisposalMode::Unspecified`]
    RestorePrevious,
}

impl Default for DisposalMode {
    fn default() -> Self {
        DisposalMode::Unspecified
    }
}

impl From<gif::DisposalMethod> for DisposalMode {
    fn from(method: gif::DisposalMethod) -> Self {
        match method {
            gif::DisposalMethod::Any => DisposalMode::Unspecified,
            gif::DisposalMethod::Keep => DisposalMode::DoNotDispose,
            gif::DisposalMethod::Background => DisposalMode::RestoreBackground,
            gif::DisposalMethod::Previous => DisposalMode::RestorePrevious,
        }
    }
}

/// Per-frame timing, transparency and disposal from a Graphics Control Extension
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct GraphicsControl {
    /// Delay in hundredths of a second
    pub delay_cs: u16,
    /// Palette index that is drawn as fully transparent
    pub transparent: Option<u8>,
    pub disposal: DisposalMode,
}

impl GraphicsControl {
    pub fn delay_ms(&self) -> u32 {
        u32::from(self.delay_cs) * 10
    }
}

/// One stored image of a GIF container, kept as palette indices
#[derive(Clone, Debug)]
pub struct GifFrame {
    /// Where the image is drawn on the canvas
    pub region: Rect,
    /// `region.width * region.height` palette indices, row-major
    pub indices: Vec<u8>,
    /// Local color table (RGB triplets), falls back to the global one when missing
    pub palette: Option<Vec<u8>>,
    pub control: Option<GraphicsControl>,
}

impl GifFrame {
    fn from_gif(frame: &gif::Frame<'_>) -> Self {
        let control = GraphicsControl {
            delay_cs: frame.delay,
            transparent: frame.transparent,
            disposal: frame.dispose.into(),
        };

        Self {
            region: Rect::new(
                u32::from(frame.left),
                u32::from(frame.top),
                u32::from(frame.width),
                u32::from(frame.height),
            ),
            indices: frame.buffer.to_vec(),
            palette: frame.palette.clone(),
            // the parser folds the extension into the frame; all-default means absent
            control: if control == GraphicsControl::default() {
                None
            } else {
                Some(control)
            },
        }
    }

    /// Control block of the frame, defaults when the frame has none
    pub fn control(&self) -> GraphicsControl {
        self.control.unwrap_or_default()
    }
}

struct PendingDisposal {
    mode: DisposalMode,
    region: Rect,
    transparent: bool,
}

/// A decoder and compositor for GIF animations
///
/// The whole container is parsed when the decoder is created. Each
/// [`AnimationDecoder::advance`] then draws one frame onto the canvas, applying
/// the previous frame's disposal and the current frame's transparency.
///
/// ```no_run
/// use animated_texture::prelude::*;
/// use animated_texture::GifDecoder;
///
/// let buffer = std::fs::read("./data/animated.gif").unwrap();
/// let mut decoder = GifDecoder::new(&buffer).unwrap();
///
/// let delay_ms = decoder.advance(100, true);
/// let rgba = decoder.frame_buffer().data();
/// # let _ = (delay_ms, rgba);
/// ```
pub struct GifDecoder {
    global_palette: Option<Vec<u8>>,
    background_index: Option<usize>,
    frames: Vec<GifFrame>,
    loop_count: LoopCount,
    canvas: Canvas,

    current_frame: usize,
    loops: u32,
    do_not_dispose: bool,
    pending: Option<PendingDisposal>,
    finished: bool,
}

impl GifDecoder {
    /// Parse a GIF container from `buffer`
    ///
    /// Returns an [`Error`] in case of a decoding failure (e.g. malformed input)
    pub fn new(buffer: &[u8]) -> Result<Self, Error> {
        GifDecoder::new_with_options(buffer, &Default::default())
    }

    /// Parse a GIF container from `buffer`, rejecting canvases larger than
    /// [`DecoderOptions::max_canvas_pixels`]
    pub fn new_with_options(buffer: &[u8], options: &DecoderOptions) -> Result<Self, Error> {
        if buffer.is_empty() {
            return Err(Error::ZeroSizeBuffer);
        }

        let mut decode_options = gif::DecodeOptions::new();
        decode_options.set_color_output(gif::ColorOutput::Indexed);

        let mut reader = decode_options
            .read_info(buffer)
            .map_err(|e| Error::GifDecodeFailed(e.to_string()))?;

        let (width, height) = (u32::from(reader.width()), u32::from(reader.height()));
        options.check_canvas(width, height)?;

        let global_palette = reader.global_palette().map(|palette| palette.to_vec());
        let background_index = reader.bg_color();

        let mut frames = Vec::new();
        loop {
            match reader.read_next_frame() {
                Ok(Some(frame)) => frames.push(GifFrame::from_gif(frame)),
                Ok(None) => break,
                Err(e) if !frames.is_empty() => {
                    log::warn!(
                        "GIF stream broken after {} frames, keeping those: {}",
                        frames.len(),
                        e
                    );
                    break;
                }
                Err(e) => return Err(Error::GifDecodeFailed(e.to_string())),
            }
        }

        let loop_count = match reader.repeat() {
            gif::Repeat::Infinite => LoopCount::Infinite,
            gif::Repeat::Finite(n) => LoopCount::Finite(u32::from(n)),
        };

        GifDecoder::from_frames(
            (width, height),
            global_palette,
            background_index,
            frames,
            loop_count,
        )
    }

    pub(crate) fn from_frames(
        dimensions: (u32, u32),
        global_palette: Option<Vec<u8>>,
        background_index: Option<usize>,
        frames: Vec<GifFrame>,
        loop_count: LoopCount,
    ) -> Result<Self, Error> {
        if frames.is_empty() {
            return Err(Error::NoFrames);
        }

        let mut decoder = Self {
            global_palette,
            background_index,
            frames,
            loop_count,
            canvas: Canvas::new(dimensions.0, dimensions.1),
            current_frame: 0,
            loops: 0,
            do_not_dispose: false,
            pending: None,
            finished: false,
        };

        let background = decoder.background_color(decoder.supports_transparency());
        decoder.canvas.fill(background);

        log::trace!("GIF decoder initialized. {:?}", decoder);

        Ok(decoder)
    }

    /// Parsed frames, in display order
    pub fn frames(&self) -> &[GifFrame] {
        &self.frames
    }

    /// Global background color, `alpha` 0 when `transparent`
    ///
    /// Opaque black when the container has no usable global color table entry.
    fn background_color(&self, transparent: bool) -> Rgba {
        let entry = self
            .background_index
            .and_then(|index| palette_entry(self.global_palette.as_deref()?, index));

        match entry {
            Some([r, g, b]) => [r, g, b, if transparent { 0 } else { 255 }],
            None => OPAQUE_BLACK,
        }
    }

    fn dispose_previous(&mut self) {
        let pending = match self.pending.take() {
            Some(pending) => pending,
            None => return,
        };

        match pending.mode {
            DisposalMode::Unspecified => {}
            DisposalMode::DoNotDispose => self.do_not_dispose = true,
            DisposalMode::RestoreBackground => {
                if !self.do_not_dispose {
                    let background = self.background_color(pending.transparent);
                    self.canvas.fill_rect(pending.region, background);
                }
            }
            // TODO: keep a copy of the region and restore it once the expected
            // output for RESTORE_PREVIOUS is settled
            DisposalMode::RestorePrevious => {}
        }
    }

    /// Check that frame `index` can be drawn, before anything touches the canvas
    fn check_frame(&self, index: usize) -> Result<(), &'static str> {
        let frame = &self.frames[index];

        if frame.palette.is_none() && self.global_palette.is_none() {
            return Err("frame has neither a local nor a global color table");
        }
        if frame.indices.len() < frame.region.width as usize * frame.region.height as usize {
            return Err("frame pixel data is shorter than its region");
        }

        Ok(())
    }

    /// Composite frame `index`. Callers run `check_frame` first
    fn draw_frame(&mut self, index: usize) -> GraphicsControl {
        let frame = &self.frames[index];
        let control = frame.control();

        let palette = frame
            .palette
            .as_deref()
            .or(self.global_palette.as_deref())
            .unwrap_or_default();

        let transparent = control.transparent;
        let visible = frame.region.clip(self.canvas.width(), self.canvas.height());

        for y in visible.top..visible.top + visible.height {
            let row = (y - frame.region.top) as usize * frame.region.width as usize;
            for x in visible.left..visible.left + visible.width {
                let c = frame.indices[row + (x - frame.region.left) as usize];
                let [r, g, b] = palette_entry(palette, c as usize).unwrap_or([0, 0, 0]);
                let is_transparent = Some(c) == transparent;

                if self.do_not_dispose {
                    if !is_transparent {
                        self.canvas.put_pixel(x, y, [r, g, b, 255]);
                    }
                } else {
                    let alpha = if is_transparent { 0 } else { 255 };
                    self.canvas.put_pixel(x, y, [r, g, b, alpha]);
                }
            }
        }

        control
    }

    fn next_frame(&mut self, looping: bool) {
        self.current_frame += 1;
        if self.current_frame >= self.frames.len() {
            self.do_not_dispose = false;
            self.loops += 1;

            if looping {
                self.current_frame = 0;
            } else {
                self.current_frame = self.frames.len() - 1;
                self.finished = true;
            }
        }
    }
}

impl AnimationDecoder for GifDecoder {
    fn advance(&mut self, default_delay_ms: u32, looping: bool) -> u32 {
        if self.finished {
            if !looping {
                return default_delay_ms;
            }
            // looping was switched on after the end was reached
            self.finished = false;
            self.current_frame = 0;
        }

        let index = self.current_frame;
        if let Err(reason) = self.check_frame(index) {
            // canvas and pending disposal stay as they are
            log::warn!("GIF frame {} skipped: {}", index, reason);
            self.next_frame(looping);
            return default_delay_ms;
        }

        let (region, has_transparency) = {
            let frame = &self.frames[index];
            (frame.region, frame.control().transparent.is_some())
        };

        self.dispose_previous();

        // first frame -- draw the background
        if index == 0 {
            let background = self.background_color(has_transparency);
            self.canvas.fill(background);
        }

        let control = self.draw_frame(index);
        self.pending = Some(PendingDisposal {
            mode: control.disposal,
            region,
            transparent: has_transparency,
        });

        self.next_frame(looping);

        match control.delay_ms() {
            0 => default_delay_ms,
            delay_ms => delay_ms,
        }
    }

    fn reset(&mut self) {
        self.current_frame = 0;
        self.loops = 0;
        self.do_not_dispose = false;
        self.pending = None;
        self.finished = false;
    }

    fn frame_buffer(&self) -> &Canvas {
        &self.canvas
    }

    fn duration(&self, default_delay_ms: u32) -> u32 {
        self.frames
            .iter()
            .map(|frame| match frame.control().delay_ms() {
                0 => default_delay_ms,
                delay_ms => delay_ms,
            })
            .fold(0, u32::saturating_add)
    }

    fn supports_transparency(&self) -> bool {
        self.frames
            .iter()
            .any(|frame| frame.control().transparent.is_some())
    }

    fn frame_count(&self) -> usize {
        self.frames.len()
    }

    fn frame_index(&self) -> usize {
        self.current_frame
    }

    fn loops_completed(&self) -> u32 {
        self.loops
    }

    fn loop_count(&self) -> LoopCount {
        self.loop_count
    }
}

impl Debug for GifDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (w, h) = self.canvas.dimensions();

        write!(
            f,
            "GifDecoder {{ w: {}, h: {}, frames: {}, bg_index: {:?}, global_palette: {}, loop_count: {:?} }}",
            w,
            h,
            self.frames.len(),
            self.background_index,
            self.global_palette.as_ref().map_or(0, |p| p.len() / 3),
            self.loop_count
        )
    }
}

fn palette_entry(palette: &[u8], index: usize) -> Option<[u8; 3]> {
    let entry = palette.get(index * 3..index * 3 + 3)?;
    Some([entry[0], entry[1], entry[2]])
}
