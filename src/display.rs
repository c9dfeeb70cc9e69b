use std::io;

use crossterm::terminal;
use tui::backend::CrosstermBackend;
use tui::layout::Rect;
use tui::style::{Color, Style};
use tui::symbols::Marker;
use tui::widgets::canvas::{Canvas, Points};
use tui::widgets::{Block, Borders};
use tui::Terminal;

use crate::framebuffer::{FRAME_BYTES, HEIGHT, WIDTH};

/// Display is the render sink: the interpreter hands it a whole packed frame
/// (row-major, 8 pixels per byte, leftmost pixel in the MSB) whenever the
/// picture changes. Implementations decide how to show it.
pub trait Display {
    fn draw(&mut self, frame: &[u8]) -> Result<(), io::Error>;

    /// how many bytes `draw` expects
    fn frame_len(&self) -> usize {
        FRAME_BYTES
    }
}

// frame dimensions, and how to turn packed bits into canvas coordinates
struct Geometry {
    width: usize,
    height: usize,
}

impl Geometry {
    fn x_bounds(&self) -> [f64; 2] {
        [0.0, (self.width - 1) as f64]
    }

    // canvas y grows upwards, frame rows grow downwards
    fn y_bounds(&self) -> [f64; 2] {
        [-((self.height - 1) as f64), 0.0]
    }

    fn lit_points(&self, frame: &[u8]) -> Vec<(f64, f64)> {
        let w = self.width;
        (0..self.width * self.height)
            .filter(|n| frame[n / 8] & (0x80 >> (n % 8)) != 0)
            .map(|n| ((n % w) as f64, -((n / w) as f64)))
            .collect()
    }
}

/// monochrome display in a terminal, rendered using TUI over crossterm
pub struct MonoTermDisplay {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    geometry: Geometry,
}

impl MonoTermDisplay {
    pub fn new() -> Result<MonoTermDisplay, io::Error> {
        let backend = CrosstermBackend::new(io::stdout());
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(MonoTermDisplay {
            terminal,
            geometry: Geometry {
                width: WIDTH,
                height: HEIGHT,
            },
        })
    }
}

impl Display for MonoTermDisplay {
    fn draw(&mut self, frame: &[u8]) -> Result<(), io::Error> {
        check_frame_len(frame, self.frame_len());

        let geometry = &self.geometry;
        let lit = geometry.lit_points(frame);
        // one terminal cell per pixel, plus the border
        let (cols, rows) = terminal::size()?;
        let area = Rect::new(
            0,
            0,
            (2 + geometry.width as u16).min(cols),
            (2 + geometry.height as u16).min(rows),
        );

        self.terminal.draw(|f| {
            let canvas = Canvas::default()
                .block(
                    Block::default()
                        .title("CHIP-8")
                        .borders(Borders::ALL)
                        .style(Style::default().bg(Color::Black)),
                )
                .x_bounds(geometry.x_bounds())
                .y_bounds(geometry.y_bounds())
                .marker(Marker::Block)
                .paint(|ctx| {
                    ctx.draw(&Points {
                        coords: &lit,
                        color: Color::White,
                    });
                });
            f.render_widget(canvas, area);
        })?;
        Ok(())
    }
}

fn check_frame_len(frame: &[u8], expected: usize) {
    assert_eq!(
        frame.len(),
        expected,
        "display must be given a whole frame to draw"
    );
}

/// keeps the last frame it was given; useful for testing and headless runs
#[derive(Default)]
pub struct DummyDisplay {
    pub frames_drawn: usize,
    pub last_frame: Vec<u8>,
}

impl DummyDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    /// pixel from the last frame drawn
    pub fn pixel(&self, row: usize, col: usize) -> bool {
        let n = row * WIDTH + col;
        self.last_frame
            .get(n / 8)
            .map_or(false, |b| b & (0x80 >> (n % 8)) != 0)
    }
}

impl Display for DummyDisplay {
    fn draw(&mut self, frame: &[u8]) -> Result<(), io::Error> {
        check_frame_len(frame, self.frame_len());
        self.frames_drawn += 1;
        self.last_frame = frame.to_vec();
        Ok(())
    }
}
