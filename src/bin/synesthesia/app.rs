//! Audio device setup and the frame loop

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use color_eyre::eyre::{eyre, Result as EyreResult, WrapErr};
use tracing::{error, info};

use synesthesia::{
    context::{lock_context, AudioContext, SharedContext},
    Engine, EngineConfig, FrameTicker, MAX_BLOCK_SIZE,
};

use super::sketch::Sketch;
use super::ui::SketchApp;

/// Open the default output device, start the engine at the device's rate and
/// run the interface until the user quits.
pub fn run(config: EngineConfig) -> EyreResult<()> {
    let host = cpal::default_host();
    let device = host
        .default_output_device()
        .ok_or_else(|| eyre!("no default output device available"))?;
    let stream_config = device
        .default_output_config()
        .wrap_err("failed to fetch default output config")?;

    let sample_rate = stream_config.sample_rate().0 as f32;
    let channels = stream_config.channels() as usize;
    info!(sample_rate, channels, "output device opened");

    let context = AudioContext::new(sample_rate, config.master_gain);
    let mut engine = Engine::with_context(config, context);
    let spectrum = engine.spectrum_reader();

    let stream = build_stream(&device, &stream_config.into(), engine.context(), channels)?;
    stream.play().wrap_err("failed to start output stream")?;

    engine.start();
    let ticker = FrameTicker::new(engine.config().frame_rate);
    let sketch = Sketch::new(engine.config().reference);

    let mut terminal = ratatui::init();
    let result = SketchApp::new(engine, spectrum, sketch, ticker).run(&mut terminal);
    ratatui::restore();
    result
}

fn build_stream(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    context: SharedContext,
    channels: usize,
) -> EyreResult<cpal::Stream> {
    let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _| {
            let mut context = lock_context(&context);
            let total_frames = data.len() / channels;
            let mut frames_written = 0;

            while frames_written < total_frames {
                let frames_to_render = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                let block = &mut render_buf[..frames_to_render];
                context.render(block);

                // Mono to all channels
                let out_off = frames_written * channels;
                for (i, &s) in block.iter().enumerate() {
                    for ch in 0..channels {
                        data[out_off + i * channels + ch] = s;
                    }
                }

                frames_written += frames_to_render;
            }
        },
        |err| error!(%err, "audio stream error"),
        None,
    )?;
    Ok(stream)
}
