use std::collections::HashMap;
use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use crossterm::{
    cursor::{Hide, Show},
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{
        self, EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    },
};
use log::{error, info, warn};

use crate::entities::Controls;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    TurnLeft,
    TurnRight,
    ThrustForward,
    ThrustBack,
    Fire,
}

impl Key {
    pub fn from_code(code: KeyCode) -> Option<Key> {
        match code {
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => Some(Key::TurnLeft),
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => Some(Key::TurnRight),
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => Some(Key::ThrustForward),
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => Some(Key::ThrustBack),
            KeyCode::Char(' ') => Some(Key::Fire),
            _ => None,
        }
    }
}

fn is_close_request(key_event: &KeyEvent) -> bool {
    match key_event.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key_event.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Where the game reads held keys and the quit signal from.
pub trait InputSource {
    /// Drains pending input for the given frame. Never blocks.
    fn poll(&mut self, frame: u64) -> io::Result<()>;

    fn is_key_held(&self, key: Key) -> bool;

    fn close_requested(&self) -> bool;

    fn controls(&self) -> Controls {
        Controls {
            turn_left: self.is_key_held(Key::TurnLeft),
            turn_right: self.is_key_held(Key::TurnRight),
            thrust_forward: self.is_key_held(Key::ThrustForward),
            thrust_back: self.is_key_held(Key::ThrustBack),
            fire: self.is_key_held(Key::Fire),
        }
    }
}

// --- Live terminal input ---

#[derive(Clone, Copy, Debug)]
struct Hold {
    last_seen: Instant,
    repeating: bool,
}

/// Terminals only report key presses unless the keyboard enhancement
/// protocol is active. Without release events a fresh press stays held for
/// `repeat_delay`, long enough for the OS auto-repeat to kick in; once
/// repeats arrive each one extends the hold by `hold_timeout`.
pub struct TerminalInput {
    held: HashMap<Key, Hold>,
    release_events: bool,
    hold_timeout: Duration,
    repeat_delay: Duration,
    close: bool,
}

impl TerminalInput {
    pub fn new(release_events: bool, hold_timeout: Duration, repeat_delay: Duration) -> Self {
        TerminalInput {
            held: HashMap::new(),
            release_events,
            hold_timeout,
            repeat_delay,
            close: false,
        }
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        let Event::Key(key_event) = event else {
            return;
        };
        if key_event.kind != KeyEventKind::Release && is_close_request(&key_event) {
            self.close = true;
            return;
        }
        let Some(key) = Key::from_code(key_event.code) else {
            return;
        };
        match key_event.kind {
            // Without enhancement, auto-repeat arrives as further presses.
            KeyEventKind::Press | KeyEventKind::Repeat => {
                let repeating = key_event.kind == KeyEventKind::Repeat;
                self.held
                    .entry(key)
                    .and_modify(|hold| *hold = Hold { last_seen: now, repeating: true })
                    .or_insert(Hold { last_seen: now, repeating });
            }
            KeyEventKind::Release => {
                self.held.remove(&key);
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if self.release_events {
            return;
        }
        let (hold_timeout, repeat_delay) = (self.hold_timeout, self.repeat_delay);
        self.held.retain(|_, hold| {
            let limit = if hold.repeating { hold_timeout } else { repeat_delay };
            now.duration_since(hold.last_seen) <= limit
        });
    }
}

impl InputSource for TerminalInput {
    fn poll(&mut self, _frame: u64) -> io::Result<()> {
        while event::poll(Duration::ZERO).map_err(|e| {
            error!("Failed to poll event: {}", e);
            e
        })? {
            let event = event::read().map_err(|e| {
                error!("Failed to read event: {}", e);
                e
            })?;
            self.handle_event(event, Instant::now());
        }
        self.expire(Instant::now());
        Ok(())
    }

    fn is_key_held(&self, key: Key) -> bool {
        self.held.contains_key(&key)
    }

    fn close_requested(&self) -> bool {
        self.close
    }
}

// --- SimulatedInput for headless runs ---

/// Scripted events keyed by frame number. A scripted key is held only
/// during the frame it fires on.
pub struct SimulatedInput {
    events: HashMap<u64, Vec<Event>>,
    held: Vec<Key>,
    close: bool,
}

impl SimulatedInput {
    pub fn new(events: HashMap<u64, Vec<Event>>) -> Self {
        SimulatedInput { events, held: Vec::new(), close: false }
    }

    /// Demo script for `--debug`: fly, turn and fire for a couple of seconds.
    pub fn demo() -> Self {
        let mut events: HashMap<u64, Vec<Event>> = HashMap::new();
        for frame in 0..120 {
            let mut frame_events = vec![Event::Key(KeyCode::Char(' ').into())];
            match frame {
                0..=29 => frame_events.push(Event::Key(KeyCode::Up.into())),
                30..=59 => frame_events.push(Event::Key(KeyCode::Right.into())),
                60..=89 => frame_events.push(Event::Key(KeyCode::Down.into())),
                _ => frame_events.push(Event::Key(KeyCode::Left.into())),
            }
            events.insert(frame, frame_events);
        }
        SimulatedInput::new(events)
    }
}

impl InputSource for SimulatedInput {
    fn poll(&mut self, frame: u64) -> io::Result<()> {
        self.held.clear();
        for event in self.events.remove(&frame).unwrap_or_default() {
            if let Event::Key(key_event) = event {
                if is_close_request(&key_event) {
                    self.close = true;
                } else if let Some(key) = Key::from_code(key_event.code) {
                    self.held.push(key);
                }
            }
        }
        Ok(())
    }

    fn is_key_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    fn close_requested(&self) -> bool {
        self.close
    }
}

// --- Terminal session guard ---

/// Raw mode, alternate screen and hidden cursor for the lifetime of the
/// guard. Dropping it restores the terminal, including during a panic.
pub struct TerminalSession {
    stdout: Stdout,
    enhanced_keyboard: bool,
}

impl TerminalSession {
    pub fn start() -> io::Result<Self> {
        info!("Attempting to enable raw mode.");
        enable_raw_mode().map_err(|e| {
            error!("Failed to enable raw mode: {}", e);
            e
        })?;

        let mut session = TerminalSession { stdout: io::stdout(), enhanced_keyboard: false };
        execute!(session.stdout, EnterAlternateScreen, Hide)?;

        session.enhanced_keyboard = matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if session.enhanced_keyboard {
            execute!(
                session.stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            info!("Keyboard enhancement enabled; using key release events.");
        } else {
            warn!("Terminal does not report key releases; emulating held keys with a timeout.");
        }
        Ok(session)
    }

    pub fn reports_key_release(&self) -> bool {
        self.enhanced_keyboard
    }

    pub fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size().map_err(|e| {
            error!("Failed to get terminal size: {}", e);
            e
        })
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.enhanced_keyboard {
            let _ = execute!(self.stdout, PopKeyboardEnhancementFlags);
        }
        if let Err(e) = execute!(self.stdout, Show, LeaveAlternateScreen) {
            error!("Failed to restore screen: {}", e);
        }
        if let Err(e) = disable_raw_mode() {
            error!("Failed to disable raw mode: {}", e);
        }
        info!("Terminal restored.");
    }
}
