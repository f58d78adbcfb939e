//! Fixture builders for tests: GIFs through `gif::Encoder`, animated WebPs
//! through libwebp's `WebPAnimEncoder` (lossless, exact RGB under alpha)

use std::{borrow::Cow, mem, ptr, slice};

use image::{Rgba, RgbaImage};
use imageproc::{drawing, rect::Rect};
use libwebp_sys as webp;

/// black, red, green, blue
pub(crate) const PALETTE: [u8; 12] = [0, 0, 0, 255, 0, 0, 0, 255, 0, 0, 0, 255];

pub(crate) struct GifFrameSpec {
    left: u16,
    top: u16,
    width: u16,
    height: u16,
    indices: Vec<u8>,
    delay: u16,
    transparent: Option<u8>,
    dispose: gif::DisposalMethod,
    palette: Option<Vec<u8>>,
}

impl GifFrameSpec {
    /// A `width` x `height` image at the origin, every pixel `index`
    pub(crate) fn full(width: u16, height: u16, index: u8) -> Self {
        Self {
            left: 0,
            top: 0,
            width,
            height,
            indices: vec![index; width as usize * height as usize],
            delay: 0,
            transparent: None,
            dispose: gif::DisposalMethod::Any,
            palette: None,
        }
    }

    pub(crate) fn at(mut self, left: u16, top: u16) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    pub(crate) fn indices(mut self, indices: Vec<u8>) -> Self {
        self.indices = indices;
        self
    }

    pub(crate) fn delay(mut self, delay_cs: u16) -> Self {
        self.delay = delay_cs;
        self
    }

    pub(crate) fn transparent(mut self, index: u8) -> Self {
        self.transparent = Some(index);
        self
    }

    pub(crate) fn dispose(mut self, dispose: gif::DisposalMethod) -> Self {
        self.dispose = dispose;
        self
    }

    pub(crate) fn palette(mut self, palette: Vec<u8>) -> Self {
        self.palette = Some(palette);
        self
    }
}

pub(crate) fn encode_gif(
    width: u16,
    height: u16,
    global_palette: &[u8],
    frames: &[GifFrameSpec],
) -> Vec<u8> {
    encode_gif_with_repeat(width, height, global_palette, frames, gif::Repeat::Finite(0))
}

pub(crate) fn encode_gif_with_repeat(
    width: u16,
    height: u16,
    global_palette: &[u8],
    frames: &[GifFrameSpec],
    repeat: gif::Repeat,
) -> Vec<u8> {
    let mut output = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut output, width, height, global_palette).unwrap();
        // a zero NETSCAPE count means infinite, so leave the extension out
        match repeat {
            gif::Repeat::Finite(0) => {}
            repeat => encoder.set_repeat(repeat).unwrap(),
        }

        for spec in frames {
            let mut frame = gif::Frame::default();
            frame.left = spec.left;
            frame.top = spec.top;
            frame.width = spec.width;
            frame.height = spec.height;
            frame.delay = spec.delay;
            frame.transparent = spec.transparent;
            frame.dispose = spec.dispose;
            frame.palette = spec.palette.clone();
            frame.buffer = Cow::Borrowed(&spec.indices[..]);
            encoder.write_frame(&frame).unwrap();
        }
    }
    output
}

pub(crate) fn solid_rgba(width: u32, height: u32, color: [u8; 4]) -> Vec<u8> {
    RgbaImage::from_pixel(width, height, Rgba(color)).into_raw()
}

/// Solid red, green and blue frames. Every pixel changes between frames, so the
/// encoder never introduces transparency to blend unchanged areas
pub(crate) fn opaque_frames(width: u32, height: u32) -> Vec<Vec<u8>> {
    vec![
        solid_rgba(width, height, [255, 0, 0, 255]),
        solid_rgba(width, height, [0, 255, 0, 255]),
        solid_rgba(width, height, [0, 0, 255, 255]),
    ]
}

/// A `width` x `height` frame of `background` with a `size` x `size` square of
/// `color` at (`x`, `y`)
pub(crate) fn square_rgba(
    width: u32,
    height: u32,
    background: [u8; 4],
    (x, y): (i32, i32),
    size: u32,
    color: [u8; 4],
) -> Vec<u8> {
    let mut frame = RgbaImage::from_pixel(width, height, Rgba(background));
    drawing::draw_filled_rect_mut(&mut frame, Rect::at(x, y).of_size(size, size), Rgba(color));
    frame.into_raw()
}

/// Encode `frames` (RGBA, `width` * `height` * 4 each) starting at `timestamps`,
/// the last one lasting until `end_timestamp`
pub(crate) fn encode_webp(
    width: u32,
    height: u32,
    frames: &[Vec<u8>],
    timestamps: &[i32],
    end_timestamp: i32,
) -> Vec<u8> {
    assert_eq!(frames.len(), timestamps.len());

    unsafe {
        let mut enc_options = mem::zeroed();
        assert_eq!(webp::WebPAnimEncoderOptionsInit(&mut enc_options), 1);
        enc_options.anim_params.loop_count = 0;

        let encoder = webp::WebPAnimEncoderNew(width as i32, height as i32, &enc_options);
        assert!(!encoder.is_null());

        let mut config = mem::zeroed();
        assert!(webp::WebPConfigInit(&mut config) != 0);
        config.lossless = 1;
        config.exact = 1;
        assert!(webp::WebPValidateConfig(&config) != 0);

        for (data, timestamp) in frames.iter().zip(timestamps) {
            assert_eq!(data.len(), width as usize * height as usize * 4);

            let mut picture: webp::WebPPicture = mem::zeroed();
            assert!(webp::WebPPictureInit(&mut picture) != 0);
            picture.width = width as i32;
            picture.height = height as i32;
            picture.use_argb = 1;

            let stride = width as i32 * 4;
            assert!(webp::WebPPictureImportRGBA(&mut picture, data.as_ptr(), stride) != 0);
            assert!(webp::WebPAnimEncoderAdd(encoder, &mut picture, *timestamp, &config) != 0);
            webp::WebPPictureFree(&mut picture);
        }

        let flushed = webp::WebPAnimEncoderAdd(encoder, ptr::null_mut(), end_timestamp, ptr::null());
        assert!(flushed != 0);

        let mut data: webp::WebPData = mem::zeroed();
        webp::WebPDataInit(&mut data);
        assert!(webp::WebPAnimEncoderAssemble(encoder, &mut data) != 0);

        let output = slice::from_raw_parts(data.bytes, data.size).to_vec();

        webp::WebPDataClear(&mut data);
        webp::WebPAnimEncoderDelete(encoder);

        output
    }
}

/// Zero the bitstream of the last `VP8L` chunk in `webp`, keeping its 5 byte
/// header. The container still demuxes, but the frame no longer decodes
pub(crate) fn corrupt_last_vp8l(webp: &mut [u8]) {
    let chunk = webp
        .windows(4)
        .rposition(|fourcc| fourcc == b"VP8L")
        .expect("no VP8L chunk");
    let size = u32::from_le_bytes([
        webp[chunk + 4],
        webp[chunk + 5],
        webp[chunk + 6],
        webp[chunk + 7],
    ]) as usize;

    let payload = chunk + 8;
    for byte in &mut webp[payload + 5..payload + size] {
        *byte = 0;
    }
}
