use clap::Parser;
use crossterm::{
    cursor::{Hide, Show},
    event::{self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use orbitsite::config::Args;
use orbitsite::error::Result;
use orbitsite::logging;
use orbitsite::render::Renderer;
use orbitsite::terminal::{Browser, Flow};
use std::io::{self, stdout, BufWriter, Stdout, Write};
use std::time::{Duration, Instant};

fn run(args: &Args) -> Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(
        stdout,
        EnterAlternateScreen,
        Hide,
        Clear(ClearType::All),
        EnableMouseCapture,
        EnableFocusChange
    )?;

    let result = frame_loop(args, &mut stdout);
    let restored = restore(&mut stdout, terminal::disable_raw_mode);
    result.and(restored)
}

/// Undo the screen setup. Raw mode is switched off even when writing the
/// escape sequences fails; the first error wins.
fn restore<W: Write>(out: &mut W, disable_raw_mode: impl FnOnce() -> io::Result<()>) -> Result<()> {
    let screen = execute!(out, Show, LeaveAlternateScreen, DisableMouseCapture, DisableFocusChange);
    let raw = disable_raw_mode();
    screen?;
    raw?;
    Ok(())
}

fn frame_loop(args: &Args, stdout: &mut BufWriter<Stdout>) -> Result<()> {
    let frame_time = Duration::from_secs_f64(1.0 / args.fps.max(1) as f64);
    let mut browser = Browser::new(args.site_config(), args.touch, terminal::size()?);
    let mut renderer = Renderer::new(args.bg_color.unwrap_or((0, 0, 0)));
    let mut next_frame = Instant::now();

    loop {
        let timeout = next_frame.saturating_duration_since(Instant::now());
        if event::poll(timeout)? {
            let event = event::read()?;
            match browser.handle(&event, &renderer) {
                Flow::Quit => break,
                Flow::Redraw => execute!(stdout, Clear(ClearType::All))?,
                Flow::Continue => {}
            }
            continue;
        }

        if browser.advance() == Flow::Redraw {
            execute!(stdout, Clear(ClearType::All))?;
        }
        renderer.render(browser.site().page(), stdout)?;
        browser.refresh_hover(&renderer);

        // drop frames rather than trying to catch up
        next_frame += frame_time;
        let now = Instant::now();
        if next_frame < now {
            next_frame = now + frame_time;
        }
    }

    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = match &args.log_dir {
        Some(dir) => Some(logging::init(dir)?),
        None => None,
    };

    run(&args)
}
