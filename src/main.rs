mod demo;
mod util;

use log::{error, info};
use sdl2::keyboard::Keycode;
use vgacore::display::{Display, InputEvent, RenderTarget, VGA_HEIGHT, VGA_WIDTH};
use vgacore::{CpuFeatures, FramePipeline, IndexedSurface, RenderConfig, ScalerKind, TrueColorSurface};

use demo::{banked_palette, Assets, DemoScene};
use util::FpsCounter;

const DEFAULT_CONFIG: &str = "vgacore.json";

/// Frames between fps log lines
const FPS_LOG_INTERVAL: u64 = 300;

struct Options {
    config: Option<String>,
    shapes: Option<String>,
    scaler: Option<ScalerKind>,
    vsync: bool,
}

fn print_help() {
    println!("Usage: vgacore [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config FILE, -c FILE   Load render settings (default: built-in)");
    println!("  --shapes FILE            Draw sprites from a main shape archive");
    println!("  --scaler NAME, -s NAME   Scaler preset, e.g. \"6x\", \"Smooth 7x\", \"AA 3x\"");
    println!("  --no-vsync               Disable VSync for uncapped framerate");
    println!("  --help                   Show this help message");
}

fn parse_args() -> Result<Options, String> {
    let args: Vec<String> = std::env::args().collect();
    let mut options = Options {
        config: None,
        shapes: None,
        scaler: None,
        vsync: true,
    };

    let value = |i: usize| -> Result<String, String> {
        args.get(i + 1)
            .cloned()
            .ok_or_else(|| format!("{} expects a value", args[i]))
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--no-vsync" => options.vsync = false,
            "--config" | "-c" => {
                options.config = Some(value(i)?);
                i += 1;
            },
            "--shapes" => {
                options.shapes = Some(value(i)?);
                i += 1;
            },
            "--scaler" | "-s" => {
                let name = value(i)?;
                let scaler = ScalerKind::from_name(&name)
                    .ok_or_else(|| format!("Unknown scaler '{}'", name))?;
                options.scaler = Some(scaler);
                i += 1;
            },
            "--help" => {
                print_help();
                std::process::exit(0);
            },
            other => return Err(format!("Unknown option '{}', see --help", other)),
        }
        i += 1;
    }

    Ok(options)
}

fn main() -> Result<(), String> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let options = parse_args()?;

    let mut config = match &options.config {
        Some(path) => RenderConfig::load(path).map_err(|e| format!("{}: {}", path, e))?,
        None => RenderConfig::default(),
    };
    if let Some(scaler) = options.scaler {
        config.scaler = scaler;
    }
    config.vsync &= options.vsync;

    let assets = match &options.shapes {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path, e))?;
            Assets::from_archive(&bytes)
        },
        None => Assets::generated(),
    }
    .map_err(|e| e.to_string())?;
    let palette = banked_palette();

    let cpu = CpuFeatures::detect();
    let mut pipeline = FramePipeline::new(&cpu, &config);
    let presets = ScalerKind::presets();

    let (mut out_w, mut out_h) = pipeline.output_size(VGA_WIDTH, VGA_HEIGHT);
    let (mut display, texture_creator) =
        Display::with_options("vgacore", out_w as u32, out_h as u32, config.vsync)?;
    let mut target = RenderTarget::with_size(&texture_creator, out_w as u32, out_h as u32)?;

    let mut frame = vec![0u8; VGA_WIDTH * VGA_HEIGHT];
    let mut output = vec![0u32; out_w * out_h];
    let mut scene = DemoScene::new(VGA_WIDTH, VGA_HEIGHT);
    let mut fps_counter = FpsCounter::new(120);

    println!("=== vgacore ===");
    println!("Window: {}x{}", display.width(), display.height());
    println!("Controls:");
    println!("  Tab        - Next scaler preset");
    println!("  Backspace  - Previous scaler preset");
    println!("  S          - Save render settings");
    println!("  Escape     - Quit");

    'running: loop {
        let (dt, avg_fps) = fps_counter.tick();

        for event in display.poll_events() {
            match event {
                InputEvent::Quit | InputEvent::KeyDown(Keycode::Escape) => break 'running,
                InputEvent::KeyDown(key @ (Keycode::Tab | Keycode::Backspace)) => {
                    let current = presets
                        .iter()
                        .position(|&p| p == pipeline.scaler())
                        .unwrap_or(0);
                    let next = if key == Keycode::Tab {
                        (current + 1) % presets.len()
                    } else {
                        (current + presets.len() - 1) % presets.len()
                    };
                    pipeline.set_scaler(presets[next]);

                    (out_w, out_h) = pipeline.output_size(VGA_WIDTH, VGA_HEIGHT);
                    output.resize(out_w * out_h, 0);
                    target =
                        RenderTarget::with_size(&texture_creator, out_w as u32, out_h as u32)?;
                },
                InputEvent::KeyDown(Keycode::S) => {
                    config.scaler = pipeline.scaler();
                    let path = options.config.as_deref().unwrap_or(DEFAULT_CONFIG);
                    match config.save(path) {
                        Ok(()) => info!("Render settings saved to {}", path),
                        Err(e) => error!("Failed to save {}: {}", path, e),
                    }
                },
                _ => {},
            }
        }

        scene.update(dt.min(0.1));

        let mut indexed = IndexedSurface::packed(&mut frame, VGA_WIDTH, VGA_HEIGHT)
            .map_err(|e| e.to_string())?;
        scene.render(&assets, &mut indexed);

        let mut truecolor =
            TrueColorSurface::packed(&mut output, out_w, out_h).map_err(|e| e.to_string())?;
        pipeline.render(&indexed, &palette, &mut truecolor);

        display.present(&mut target, &output, out_w)?;

        if fps_counter.total_frames() % FPS_LOG_INTERVAL == 0 {
            let (min_fps, max_fps) = fps_counter.min_max_fps();
            info!(
                "{:.0} fps (min {:.0}, max {:.0}), {:.2} ms/frame, {}",
                avg_fps,
                min_fps,
                max_fps,
                fps_counter.avg_frame_time_ms(),
                pipeline.scaler().name()
            );
        }
    }

    Ok(())
}
