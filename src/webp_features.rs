use std::mem;

use libwebp_sys as webp;

use crate::Error;

/// Static properties of a WebP file, read from its headers without decoding
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct WebPFeatures {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    pub has_animation: bool,
}

impl WebPFeatures {
    /// Read the bitstream features of `data` with libwebp's `WebPGetFeatures`
    ///
    /// Returns [`Error::InvalidWebPHeader`] with the libwebp status code when the
    /// headers can not be parsed
    ///
    /// ```
    /// # use animated_texture::{Error, WebPFeatures};
    /// assert!(matches!(
    ///     WebPFeatures::probe(b"RIFF\x24\x00\x00\x00WAVEfmt \x10\x00\x00\x00"),
    ///     Err(Error::InvalidWebPHeader(_))
    /// ));
    /// ```
    pub fn probe(data: &[u8]) -> Result<Self, Error> {
        let mut features: webp::WebPBitstreamFeatures = unsafe { mem::zeroed() };

        let status = unsafe { webp::WebPGetFeatures(data.as_ptr(), data.len(), &mut features) };
        if status != webp::VP8_STATUS_OK {
            return Err(Error::InvalidWebPHeader(status as i32));
        }

        Ok(Self {
            width: features.width.max(0) as u32,
            height: features.height.max(0) as u32,
            has_alpha: features.has_alpha != 0,
            has_animation: features.has_animation != 0,
        })
    }
}
