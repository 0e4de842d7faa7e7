//! Interactive terminal viewer: wheel and keyboard scrolling drive the torus

use crate::canvas::{luminance_char, GreyCanvas};
use crate::colors::ColorState;
use crate::config::LiveConfig;
use crate::driver::{FrameControl, FrameDriver, FrameHost, IntervalScheduler, StopToken};
use crate::help::{render_help_overlay, LIVE_HELP};
use crate::scroll::ScrollInput;
use crate::terminal::Terminal;
use crate::torus::FrameStats;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use crossterm::style::Color;
use std::io;

/// What a key press asks the viewer to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Continue,
    Quit,
}

/// Runtime state for interactive controls
pub struct LiveState {
    pub paused: bool,
    pub show_help: bool,
    pub colors: ColorState,
    pub scroll_step: f64,
    /// Screen is stale while paused (overlay toggled, terminal resized)
    pub needs_redraw: bool,
}

impl LiveState {
    pub fn new(color_scheme: u8, scroll_step: f32) -> Self {
        Self {
            paused: false,
            show_help: false,
            colors: ColorState::new(color_scheme),
            scroll_step: scroll_step as f64,
            needs_redraw: false,
        }
    }

    /// Apply a key press. `page` is the scroll distance for PageUp/PageDown.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers, input: &ScrollInput, page: f64) -> KeyAction {
        self.needs_redraw = true;
        if self.colors.handle_key(code) {
            return KeyAction::Continue;
        }
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return KeyAction::Quit,
            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return KeyAction::Quit,
            KeyCode::Char(' ') => self.paused = !self.paused,
            KeyCode::Char('h') | KeyCode::Char('?') => self.show_help = !self.show_help,
            KeyCode::Down | KeyCode::Char('j') => input.scroll_by(self.scroll_step),
            KeyCode::Up | KeyCode::Char('k') => input.scroll_by(-self.scroll_step),
            KeyCode::PageDown => input.scroll_by(page),
            KeyCode::PageUp => input.scroll_by(-page),
            KeyCode::Home => input.set(0.0),
            _ => {}
        }
        KeyAction::Continue
    }

    /// Render while running; while paused, redraw once per change
    pub fn frame_control(&mut self) -> FrameControl {
        if !self.paused {
            return FrameControl::Render;
        }
        if std::mem::take(&mut self.needs_redraw) {
            FrameControl::Redraw
        } else {
            FrameControl::Skip
        }
    }

    pub fn handle_mouse(&self, kind: MouseEventKind, input: &ScrollInput) {
        match kind {
            MouseEventKind::ScrollDown => input.scroll_by(self.scroll_step),
            MouseEventKind::ScrollUp => input.scroll_by(-self.scroll_step),
            _ => {}
        }
    }
}

/// Terminal-backed frame host
pub struct LiveHost {
    term: Terminal,
    canvas: GreyCanvas,
    input: ScrollInput,
    state: LiveState,
    status: String,
}

impl LiveHost {
    pub fn new(term: Terminal, input: ScrollInput, state: LiveState) -> Self {
        let (w, h) = term.size();
        Self {
            canvas: GreyCanvas::new(w as u32, h as u32),
            term,
            input,
            state,
            status: String::new(),
        }
    }

    fn apply_event(&mut self, event: Event, driver: &mut FrameDriver) -> io::Result<KeyAction> {
        match event {
            Event::Key(KeyEvent { code, modifiers, kind, .. }) if kind != KeyEventKind::Release => {
                // A terminal screenful of scrolling, in the same units as the wheel
                let page = self.term.size().1 as f64 * self.state.scroll_step / 2.0;
                return Ok(self.state.handle_key(code, modifiers, &self.input, page));
            }
            Event::Mouse(mouse) => self.state.handle_mouse(mouse.kind, &self.input),
            Event::Resize(width, height) => {
                self.term.resize(width, height);
                self.term.clear_screen()?;
                self.canvas.resize(width as u32, height as u32);
                driver.resize(width as u32, height as u32);
                self.state.needs_redraw = true;
            }
            _ => {}
        }
        Ok(KeyAction::Continue)
    }
}

impl FrameHost for LiveHost {
    type Canvas = GreyCanvas;

    fn begin_frame(&mut self, driver: &mut FrameDriver, stop: &StopToken) -> io::Result<FrameControl> {
        while let Some(event) = self.term.poll_event()? {
            if self.apply_event(event, driver)? == KeyAction::Quit {
                stop.stop();
                return Ok(FrameControl::Skip);
            }
        }

        let control = self.state.frame_control();
        if control == FrameControl::Skip {
            return Ok(control);
        }

        let scroll = driver.scroll_state();
        let rotation = driver.rotation();
        self.status = format!(
            " scroll {:>7.1} -> {:<7.1} A {:.2} B {:.2} {}",
            scroll.current,
            scroll.target,
            rotation.a,
            rotation.b,
            if self.state.paused { "[paused] " } else { "" }
        );
        Ok(control)
    }

    fn surface(&mut self) -> &mut GreyCanvas {
        &mut self.canvas
    }

    fn present(&mut self, _stats: &FrameStats) -> io::Result<()> {
        self.term.clear();
        for (x, y, grey) in self.canvas.painted() {
            let (color, bold) = self.state.colors.color_for(grey);
            self.term.set(x as i32, y as i32, luminance_char(grey), Some(color), bold);
        }

        let (width, height) = self.term.size();
        if height > 1 {
            self.term.set_str(0, height as i32 - 1, &self.status, Some(Color::DarkGrey), false);
        }
        if self.state.show_help {
            render_help_overlay(&mut self.term, width, height, LIVE_HELP);
        }

        self.term.present()
    }
}

/// Run the interactive viewer until the user quits
pub fn run(config: LiveConfig) -> io::Result<()> {
    let term = Terminal::new(true)?;
    term.clear_screen()?;
    let (width, height) = term.size();

    let input = ScrollInput::new();
    let mut driver = FrameDriver::new(config.torus, config.scroll, width as u32, height as u32)
        .with_cell_aspect(config.live.cell_aspect)
        .with_input(input.clone());
    let state = LiveState::new(config.live.color_scheme, config.live.scroll_step);
    let mut host = LiveHost::new(term, input, state);
    let mut scheduler = IntervalScheduler::from_fps(config.live.fps);
    let stop = StopToken::new();

    tracing::info!(
        width,
        height,
        fps = config.live.fps,
        interval_ms = scheduler.interval().as_secs_f64() * 1000.0,
        "starting live viewer"
    );
    let presented = driver.run(&mut scheduler, &mut host, &stop)?;
    tracing::info!(presented, ticks = driver.frames(), "live viewer stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: &mut LiveState, code: KeyCode, input: &ScrollInput) -> KeyAction {
        state.handle_key(code, KeyModifiers::NONE, input, 400.0)
    }

    #[test]
    fn arrows_and_vim_keys_scroll() {
        let mut state = LiveState::new(7, 40.0);
        let input = ScrollInput::new();
        press(&mut state, KeyCode::Down, &input);
        press(&mut state, KeyCode::Char('j'), &input);
        assert_eq!(input.get(), 80.0);
        press(&mut state, KeyCode::Char('k'), &input);
        assert_eq!(input.get(), 40.0);
        press(&mut state, KeyCode::Up, &input);
        press(&mut state, KeyCode::Up, &input);
        assert_eq!(input.get(), 0.0);
    }

    #[test]
    fn paging_and_home() {
        let mut state = LiveState::new(7, 40.0);
        let input = ScrollInput::new();
        press(&mut state, KeyCode::PageDown, &input);
        press(&mut state, KeyCode::PageDown, &input);
        assert_eq!(input.get(), 800.0);
        press(&mut state, KeyCode::PageUp, &input);
        assert_eq!(input.get(), 400.0);
        press(&mut state, KeyCode::Home, &input);
        assert_eq!(input.get(), 0.0);
    }

    #[test]
    fn quit_keys() {
        let mut state = LiveState::new(7, 40.0);
        let input = ScrollInput::new();
        assert_eq!(press(&mut state, KeyCode::Char('q'), &input), KeyAction::Quit);
        assert_eq!(press(&mut state, KeyCode::Esc, &input), KeyAction::Quit);
        assert_eq!(
            state.handle_key(KeyCode::Char('c'), KeyModifiers::CONTROL, &input, 1.0),
            KeyAction::Quit
        );
        assert_eq!(press(&mut state, KeyCode::Char('c'), &input), KeyAction::Continue);
    }

    #[test]
    fn toggles() {
        let mut state = LiveState::new(7, 40.0);
        let input = ScrollInput::new();
        press(&mut state, KeyCode::Char(' '), &input);
        assert!(state.paused);
        press(&mut state, KeyCode::Char('?'), &input);
        assert!(state.show_help);
        press(&mut state, KeyCode::Char('h'), &input);
        assert!(!state.show_help);
        press(&mut state, KeyCode::Char('$'), &input);
        assert_eq!(state.colors.scheme, 4);
        assert_eq!(input.get(), 0.0);
    }

    #[test]
    fn running_viewer_always_renders() {
        let mut state = LiveState::new(7, 40.0);
        let input = ScrollInput::new();
        press(&mut state, KeyCode::Char('?'), &input);
        assert_eq!(state.frame_control(), FrameControl::Render);
        assert_eq!(state.frame_control(), FrameControl::Render);
    }

    #[test]
    fn paused_viewer_redraws_once_per_change() {
        let mut state = LiveState::new(7, 40.0);
        let input = ScrollInput::new();
        press(&mut state, KeyCode::Char(' '), &input);
        assert_eq!(state.frame_control(), FrameControl::Redraw);
        assert_eq!(state.frame_control(), FrameControl::Skip);

        press(&mut state, KeyCode::Char('?'), &input);
        assert!(state.show_help);
        assert_eq!(state.frame_control(), FrameControl::Redraw);
        assert_eq!(state.frame_control(), FrameControl::Skip);

        press(&mut state, KeyCode::Char('!'), &input);
        assert_eq!(state.frame_control(), FrameControl::Redraw);

        // Resize events flag the screen the same way
        state.needs_redraw = true;
        assert_eq!(state.frame_control(), FrameControl::Redraw);
        assert_eq!(state.frame_control(), FrameControl::Skip);
    }

    #[test]
    fn wheel_scrolls_by_step() {
        let state = LiveState::new(7, 25.0);
        let input = ScrollInput::new();
        state.handle_mouse(MouseEventKind::ScrollDown, &input);
        state.handle_mouse(MouseEventKind::ScrollDown, &input);
        state.handle_mouse(MouseEventKind::ScrollUp, &input);
        state.handle_mouse(MouseEventKind::Moved, &input);
        assert_eq!(input.get(), 25.0);
    }
}
