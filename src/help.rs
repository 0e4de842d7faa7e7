use crate::terminal::Terminal;
use crossterm::style::Color;

pub const LIVE_HELP: &str = "\
SCROLLTORUS
wheel, j/k, Up/Down  Scroll
PgUp/PgDn            Scroll a screen
Home                 Back to top
Space                Pause
Shift+0-9            Color scheme
h / ?                Toggle help
q / Esc              Quit";

/// Top-left corner and size of a help box centered on the screen
pub fn help_box(width: u16, height: u16, help_text: &str) -> (usize, usize, usize, usize) {
    let lines = help_text.lines().count();
    let max_width = help_text.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let box_width = max_width + 4; // 2 chars padding each side
    let box_height = lines + 2; // border top/bottom

    let start_x = (width as usize).saturating_sub(box_width) / 2;
    let start_y = (height as usize).saturating_sub(box_height) / 2;
    (start_x, start_y, box_width, box_height)
}

/// Render a centered help overlay box with the provided text.
pub fn render_help_overlay(term: &mut Terminal, width: u16, height: u16, help_text: &str) {
    if help_text.is_empty() {
        return;
    }

    let (start_x, start_y, box_width, box_height) = help_box(width, height, help_text);
    let max_width = box_width - 4;

    let border_color = Color::White;
    let text_color = Color::Grey;

    // Draw top border: ┌─────┐
    term.set(start_x as i32, start_y as i32, '┌', Some(border_color), false);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, start_y as i32, '─', Some(border_color), false);
    }
    term.set((start_x + box_width - 1) as i32, start_y as i32, '┐', Some(border_color), false);

    // Draw content rows with side borders
    for (i, line) in help_text.lines().enumerate() {
        let y = start_y + 1 + i;
        term.set(start_x as i32, y as i32, '│', Some(border_color), false);

        let padding = max_width.saturating_sub(line.chars().count());
        let padded = format!(" {}{} ", line, " ".repeat(padding));
        term.set_str((start_x + 1) as i32, y as i32, &padded, Some(text_color), false);

        term.set((start_x + box_width - 1) as i32, y as i32, '│', Some(border_color), false);
    }

    // Draw bottom border: └─────┘
    let bottom_y = start_y + box_height - 1;
    term.set(start_x as i32, bottom_y as i32, '└', Some(border_color), false);
    for x in 1..box_width - 1 {
        term.set((start_x + x) as i32, bottom_y as i32, '─', Some(border_color), false);
    }
    term.set((start_x + box_width - 1) as i32, bottom_y as i32, '┘', Some(border_color), false);
}
