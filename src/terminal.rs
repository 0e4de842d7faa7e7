use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{poll, read, DisableMouseCapture, EnableMouseCapture, Event},
    execute, queue,
    style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor},
    terminal::{
        disable_raw_mode, enable_raw_mode, size, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use std::io::{self, stdout, Write};
use std::time::Duration;

/// Terminal abstraction for rendering
pub struct Terminal {
    width: u16,
    height: u16,
    buffer: Vec<Vec<Cell>>,
    alternate_screen: bool,
}

/// A single cell in the terminal buffer
#[derive(Clone, PartialEq)]
pub struct Cell {
    pub ch: char,
    pub fg: Option<Color>,
    pub bold: bool,
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: None,
            bold: false,
        }
    }
}

impl Terminal {
    /// Take over the terminal: raw mode, alternate screen, mouse wheel capture
    pub fn new(alternate_screen: bool) -> io::Result<Self> {
        let (width, height) = size()?;

        if alternate_screen {
            enable_raw_mode()?;
            execute!(stdout(), EnterAlternateScreen, EnableMouseCapture, Hide)?;
        }

        Ok(Self {
            width,
            height,
            buffer: blank_buffer(width, height),
            alternate_screen,
        })
    }

    /// Get terminal dimensions
    pub fn size(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Reallocate the buffer for a new terminal size
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.buffer = blank_buffer(width, height);
    }

    /// Clear the buffer
    pub fn clear(&mut self) {
        for row in &mut self.buffer {
            row.fill(Cell::default());
        }
    }

    /// Clear the actual terminal
    pub fn clear_screen(&self) -> io::Result<()> {
        execute!(stdout(), Clear(ClearType::All))?;
        Ok(())
    }

    /// Set a character at position with optional color
    pub fn set(&mut self, x: i32, y: i32, ch: char, fg: Option<Color>, bold: bool) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize][x as usize] = Cell { ch, fg, bold };
        }
    }

    /// Set a string starting at position
    pub fn set_str(&mut self, x: i32, y: i32, s: &str, fg: Option<Color>, bold: bool) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, ch, fg, bold);
        }
    }

    /// Render the entire buffer to screen
    pub fn present(&self) -> io::Result<()> {
        let mut out = stdout().lock();

        for (y, row) in self.buffer.iter().enumerate() {
            queue!(out, MoveTo(0, y as u16))?;

            for cell in row {
                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Bold))?;
                }

                if let Some(color) = cell.fg {
                    queue!(out, SetForegroundColor(color), Print(cell.ch), ResetColor)?;
                } else {
                    queue!(out, Print(cell.ch))?;
                }

                if cell.bold {
                    queue!(out, SetAttribute(Attribute::Reset))?;
                }
            }
        }

        out.flush()?;
        Ok(())
    }

    /// Next pending input or resize event (non-blocking)
    pub fn poll_event(&self) -> io::Result<Option<Event>> {
        if poll(Duration::from_millis(0))? {
            return Ok(Some(read()?));
        }
        Ok(None)
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        if self.alternate_screen {
            let _ = execute!(stdout(), Show, DisableMouseCapture, LeaveAlternateScreen);
            let _ = disable_raw_mode();
        }
    }
}

fn blank_buffer(width: u16, height: u16) -> Vec<Vec<Cell>> {
    vec![vec![Cell::default(); width as usize]; height as usize]
}
