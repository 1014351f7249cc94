use std::sync::Arc;
use std::thread;

use clap::Parser;

use ledtoy_core::frame::{DISPLAY_ROWS, SharedFrame};
use ledtoy_core::game::GameId;
use ledtoy_core::toy::{GameToy, run_control_task};
use ledtoy_games::MenuGame;
use ledtoy_games::registry;
use sdl2::event::Event;
use sdl2::keyboard::Scancode;
use sdl2::pixels::PixelFormatEnum;

mod input;
mod matrix;

use input::{ButtonLatch, PadHandle};
use matrix::{LedMatrix, MATRIX_COLS};

/// Handheld LED-matrix game toy, simulated.
#[derive(Parser)]
#[command(name = "ledtoy")]
struct Args {
    /// Window pixels per LED
    #[arg(long, default_value_t = 16)]
    scale: u32,

    /// Skip the menu and launch this game directly
    #[arg(long)]
    game: Option<String>,

    /// List the installed games and exit
    #[arg(long)]
    list: bool,
}

fn main() {
    let args = Args::parse();

    let entries = registry::all();
    if args.list {
        for entry in &entries {
            println!("{}", entry.name);
        }
        return;
    }
    if entries.is_empty() {
        eprintln!("No games installed; nothing to select from");
        std::process::exit(1);
    }

    // Install every registered game plus the menu that lists them.
    let frame = SharedFrame::new();
    let mut toy = GameToy::new(frame.clone());
    let mut icons = Vec::new();
    for entry in &entries {
        toy.install(entry.id, (entry.create)());
        icons.push((entry.id, entry.icon));
    }
    toy.install(GameId::Menu, Box::new(MenuGame::new(icons)));

    if let Some(name) = &args.game {
        match registry::find(name) {
            Some(entry) => {
                toy.select(entry.id);
                toy.run();
            }
            None => {
                eprintln!("Unknown game: {name} (try --list)");
                std::process::exit(1);
            }
        }
    }

    // Control task: dispatch loop at the fixed control period.
    let latch = Arc::new(ButtonLatch::new());
    let pad = PadHandle(Arc::clone(&latch));
    thread::spawn(move || run_control_task(toy, pad));

    // Display task: SDL event pump + continuous matrix refresh. One
    // window pixel block per LED, one streaming texture reused for
    // every frame, VSync as the pacing source.
    let sdl_context = sdl2::init().expect("Failed to initialize SDL2");
    let sdl_video = sdl_context.video().expect("Failed to init SDL video");
    let window = sdl_video
        .window(
            "ledtoy",
            MATRIX_COLS as u32 * args.scale,
            DISPLAY_ROWS as u32 * args.scale,
        )
        .position_centered()
        .build()
        .expect("Failed to create window");
    let mut canvas = window
        .into_canvas()
        .accelerated()
        .present_vsync()
        .build()
        .expect("Failed to create canvas");
    let texture_creator = canvas.texture_creator();
    let mut texture = texture_creator
        .create_texture_streaming(
            PixelFormatEnum::RGB24,
            MATRIX_COLS as u32,
            DISPLAY_ROWS as u32,
        )
        .expect("Failed to create texture");
    let mut event_pump = sdl_context.event_pump().expect("Failed to get event pump");

    let mut matrix = LedMatrix::new();
    let mut rgb = [0u8; MATRIX_COLS * DISPLAY_ROWS * 3];

    'main: loop {
        for event in event_pump.poll_iter() {
            match event {
                Event::Quit { .. } => break 'main,

                Event::KeyDown {
                    scancode: Some(Scancode::Escape),
                    ..
                } => break 'main,

                Event::KeyDown {
                    scancode: Some(sc),
                    repeat: false,
                    ..
                } => {
                    if let Some(button) = input::button_for(sc) {
                        latch.press(button);
                    }
                }

                _ => {}
            }
        }

        matrix.refresh(&frame.snapshot());
        matrix.render_rgb(&mut rgb);
        texture
            .update(None, &rgb, MATRIX_COLS * 3)
            .expect("Failed to update texture");
        canvas.clear();
        canvas
            .copy(&texture, None, None)
            .expect("Failed to copy texture");
        canvas.present();
    }
}
