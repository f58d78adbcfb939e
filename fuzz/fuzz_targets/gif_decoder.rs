#![no_main]
use animated_texture::prelude::*;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut decoder = match Decoder::new(ImageFormat::Gif, data.to_vec(), &Default::default()) {
        Ok(dec) => dec,
        Err(_) => {
            return;
        }
    };

    // two passes, second one exercises the wrap around
    for _ in 0..decoder.frame_count() * 2 {
        decoder.advance(100, true);
    }
    let _ = decoder.duration(100);
});
