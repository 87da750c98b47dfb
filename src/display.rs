use crate::frame::{FrameBuffer, CHIP8_SCREEN_HEIGHT, CHIP8_SCREEN_WIDTH};
use crate::machine::Machine;
use crossterm::{cursor, execute, terminal};
use std::io;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

/// Display is used by the front end to put the frame buffer on a screen. It
/// should abstract the implementation details, so a variety of kinds of
/// screen would work.
pub trait Display {
    fn draw(&mut self, frame: &FrameBuffer) -> io::Result<()>;
}

/// draw the machine's screen if it has changed, then mark it as consumed.
/// Returns whether anything was drawn.
pub fn present(display: &mut impl Display, machine: &mut Machine) -> io::Result<bool> {
    if !machine.frame_buffer.is_dirty() {
        return Ok(false);
    }
    display.draw(&machine.frame_buffer)?;
    machine.frame_buffer.clear_dirty();
    Ok(true)
}

// store useful metadata about the canvas
struct Resolution(usize, usize);

impl Resolution {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.0 - 1) as f64]
    }

    fn y_bounds(&self) -> [f64; 2] {
        [-1.0 * (self.1 - 1) as f64, 0.0]
    }

    /// canvas coords grow upwards, so rows are negated
    fn points(&self, frame: &FrameBuffer) -> Vec<(f64, f64)> {
        frame
            .lit_pixels()
            .map(|(x, y)| (x as f64, -1.0 * y as f64))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI and crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    resolution: Resolution,
}

impl MonoTermDisplay {
    pub fn new() -> io::Result<MonoTermDisplay> {
        let mut stdout = io::stdout();
        execute!(stdout, terminal::EnterAlternateScreen, cursor::Hide)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            resolution: Resolution(CHIP8_SCREEN_WIDTH, CHIP8_SCREEN_HEIGHT),
        })
    }
}

impl Drop for MonoTermDisplay {
    fn drop(&mut self) {
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen) {
            eprintln!("Warning: couldn't restore the terminal: {}", e);
        }
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        let coords = self.resolution.points(frame);
        let resolution = &self.resolution;

        // for now this assumes a 1:1 ratio between terminal, chip8 and the
        // internal TUI canvas
        self.terminal.draw(|f| {
            let size = Rect::new(0, 0, 2 + resolution.0 as u16, 2 + resolution.1 as u16);

            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(resolution.x_bounds())
                .y_bounds(resolution.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &coords,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, size);
        })?;
        Ok(())
    }
}

/// useful for testing and headless runs; remembers the last frame it was
/// given
#[derive(Default)]
pub struct NullDisplay {
    pub frames_drawn: usize,
    pub last_frame: Option<FrameBuffer>,
}

impl NullDisplay {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Display for NullDisplay {
    fn draw(&mut self, frame: &FrameBuffer) -> io::Result<()> {
        self.frames_drawn += 1;
        self.last_frame = Some(frame.clone());
        Ok(())
    }
}
