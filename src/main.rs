// What you SEE:
// • The input image, fitted into the window, with a ring under the mouse.
// • Hold Left Mouse: draw (or erase) a freehand line on top of the image.
// • D / E switch draw and erase. [ and ] change brush size. 1–5 pick a color.
// • C clears all drawing. S saves the flattened PNG. ESC closes without saving.

mod draw;

use clap::Parser;
use draw::{Drawer, draw_brush_outline};
use log::{error, info};
use minifb::Key;
use sketchpad::{
    BrushMode, Color, EditorConfig, Error, FrameBuffer, ImageSource, LayeredImageEditor,
    SessionHooks, Viewport,
};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

const COLOR_PRESETS: [(Key, Color); 5] = [
    (Key::Key1, Color::RED),
    (Key::Key2, Color::rgb(0x00, 0xC8, 0x53)),
    (Key::Key3, Color::rgb(0x29, 0x79, 0xFF)),
    (Key::Key4, Color::rgb(0xFF, 0xEB, 0x3B)),
    (Key::Key5, Color::rgb(0xFF, 0xFF, 0xFF)),
];

#[derive(Parser, Debug)]
#[command(name = "sketchpad", about = "Annotate an image with freehand drawing and save it as PNG")]
struct Args {
    /// Image to annotate (PNG, JPEG, WebP, ...)
    input: PathBuf,

    /// Where to write the result (default: <input>-annotated.png)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Editor config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window area the editor is fitted into
    #[arg(long, default_value_t = 1280)]
    width: u32,

    #[arg(long, default_value_t = 960)]
    height: u32,
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("image");
    input.with_file_name(format!("{stem}-annotated.png"))
}

fn status_line(editor: &LayeredImageEditor) -> String {
    let brush = editor.brush();
    let mode = match brush.mode {
        BrushMode::Draw => "DRAW",
        BrushMode::Erase => "ERASE",
    };
    format!("sketchpad | {mode} {}px {} | S save  C clear  ESC close", brush.size(), brush.color)
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => EditorConfig::load(path)?,
        None => EditorConfig::default(),
    };
    let viewport = Viewport::from_window(args.width, args.height, &config);
    let output = args.output.clone().unwrap_or_else(|| default_output(&args.input));
    let source = ImageSource::Bytes(std::fs::read(&args.input)?);

    /* --- Session hooks ---
       Visual: nothing on screen; they run once when the window goes away. */
    let hooks = SessionHooks::new(
        move |png| {
            let written = png
                .to_bytes()
                .and_then(|bytes| std::fs::write(&output, bytes).map_err(Error::from));
            match written {
                Ok(()) => info!("saved {}", output.display()),
                Err(e) => error!("could not write {}: {e}", output.display()),
            }
        },
        || info!("closed without saving"),
    );

    /* --- Decode off-thread, then open a window of the fitted size --- */
    let mut editor = LayeredImageEditor::new(config);
    editor.begin_load(source, viewport, hooks);
    while !editor.poll_load()? {
        thread::sleep(Duration::from_millis(10));
    }
    let Some((w, h)) = editor.size() else {
        return Err(Error::decode("editor did not open"));
    };
    let mut drawer = Drawer::new(&status_line(&editor), w as usize, h as usize)?;
    let mut screen = FrameBuffer::new(w as usize, h as usize);
    let mut shown_status = status_line(&editor);

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() && editor.is_active() {
        /* 1) Keys */
        if drawer.pressed_once(Key::Escape) {
            editor.close();
            break;
        }
        if drawer.pressed_once(Key::S) {
            editor.save()?;
            break;
        }
        if drawer.pressed_once(Key::D) {
            editor.set_brush_mode(BrushMode::Draw);
        }
        if drawer.pressed_once(Key::E) {
            editor.set_brush_mode(BrushMode::Erase);
        }
        if drawer.pressed_once(Key::C) {
            editor.clear_annotation();
        }
        if drawer.pressed_once(Key::LeftBracket) {
            editor.nudge_brush_size(-2);
        }
        if drawer.pressed_once(Key::RightBracket) {
            editor.nudge_brush_size(2);
        }
        for (key, color) in COLOR_PRESETS {
            if drawer.pressed_once(key) {
                editor.set_brush_color(color);
            }
        }

        /* 2) Mouse → stroke (draws straight into the annotation layer) */
        if let Some(event) = drawer.poll_pointer() {
            editor.handle_pointer(event);
        }

        /* 3) Compose what you see: background + annotation, then the brush ring */
        editor.render_into(&mut screen);
        if let Some(p) = drawer.mouse_pos() {
            let radius = editor.brush().radius().round() as i32;
            draw_brush_outline(&mut screen, p.x as i32, p.y as i32, radius, 0x00_FF_FF_FF);
        }

        /* 4) Present */
        let status = status_line(&editor);
        if status != shown_status {
            drawer.set_status(&status);
            shown_status = status;
        }
        drawer.present(&screen)?;
    }

    // Window closed with the title-bar button: same as ESC.
    if editor.is_active() {
        editor.close();
    }
    Ok(())
}
