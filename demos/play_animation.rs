use std::time::Duration;

use animated_texture::prelude::*;
use log::info;

/// Usage: play_animation <file.gif|file.webp> [png output dir]
fn main() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = std::env::args().skip(1);
    let path = args.next().unwrap_or_else(|| "./data/animated.webp".to_string());
    let output_dir = args.next();

    let format = ImageFormat::from_path(&path).expect("file extension should be .gif or .webp");
    let buffer = std::fs::read(&path).unwrap();
    let decoder = Decoder::new(format, buffer, &DecoderOptions::default()).unwrap();

    info!(
        "Loaded {:?}, dimensions={:?}, frames={}, loop_count={:?}, transparency={}",
        decoder.format(),
        decoder.dimensions(),
        decoder.frame_count(),
        decoder.loop_count(),
        decoder.supports_transparency()
    );

    let mut player = Player::new(
        decoder,
        PlayerOptions {
            looping: false,
            ..Default::default()
        },
    );
    info!("Animation length {:?}", player.animation_length());

    // one pass, ticking at ~60fps
    let tick = Duration::from_millis(16);
    let frame_count = player.decoder().frame_count();
    let mut rendered = 0;
    while rendered < frame_count {
        let frame = match player.tick(tick) {
            Some(frame) => frame,
            None => continue,
        };
        rendered += 1;

        info!(
            "Frame {}, delay={:?}, data_len={}",
            frame.index(),
            frame.delay(),
            frame.data().len()
        );

        if let Some(dir) = &output_dir {
            let (width, height) = frame.dimensions();
            let output = format!("{}/frame_{:03}.png", dir, frame.index());
            image::RgbaImage::from_raw(width, height, frame.into_data())
                .unwrap()
                .save(&output)
                .unwrap();
            info!("\tsaved to {}", output);
        }
    }
}
