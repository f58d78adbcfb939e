use animated_texture::{prelude::*, WebPDecoder};
use log::{info, warn};

fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let options = DecoderOptions::default();

    print_err(0, Decoder::new(ImageFormat::Gif, vec![], &options));
    print_err(1, Decoder::new(ImageFormat::Gif, vec![0x00, 0x01], &options));
    print_err(2, Decoder::new(ImageFormat::Gif, b"GIF89a".to_vec(), &options));

    print_err(3, Decoder::new(ImageFormat::WebP, vec![], &options));
    print_err(4, Decoder::new(ImageFormat::WebP, vec![0x00, 0x01], &options));
    print_err(
        5,
        WebPDecoder::new(vec![
            0x2f, 0xff, 0xff, 0xff, 0x0b, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        ]),
    );

    // RIFF/WEBP/VP8X declaring a 65536 x 65536 canvas
    let mut huge = b"RIFF\x16\x00\x00\x00WEBPVP8X\x0a\x00\x00\x00".to_vec();
    huge.extend_from_slice(&[0x02, 0, 0, 0, 0xff, 0xff, 0x00, 0xff, 0xff, 0x00]);
    print_err(6, Decoder::new(ImageFormat::WebP, huge, &options));
}

fn print_err<A, B>(num: usize, result: Result<A, B>)
where
    B: std::fmt::Display,
{
    match result {
        Ok(_) => info!("Result {}: returned OK", num),
        Err(e) => {
            warn!("Result {}: {}", num, e);
        }
    }
}
