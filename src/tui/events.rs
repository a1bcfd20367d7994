//! Terminal event handling.
//!
//! A reader thread polls crossterm and forwards key and resize events over a
//! channel, with a tick after every poll so the prompt loop can drain
//! finished history refreshes while the user is idle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};

use crate::search::KeyBinding;

/// Prompt events.
#[derive(Debug, Clone)]
pub enum Event {
    /// Poll interval elapsed.
    Tick,
    /// Key press event.
    Key(KeyEvent),
    /// Terminal resize.
    Resize(u16, u16),
}

/// Event handler using channels.
pub struct EventHandler {
    rx: mpsc::Receiver<Event>,
    stop: Arc<AtomicBool>,
}

impl EventHandler {
    /// Start the reader thread.
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let stop = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop);

        thread::spawn(move || {
            while !thread_stop.load(Ordering::Relaxed) {
                if event::poll(tick_rate).unwrap_or(false) {
                    let forwarded = match event::read() {
                        Ok(CrosstermEvent::Key(key)) => Some(Event::Key(key)),
                        Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                        _ => None,
                    };
                    if let Some(event) = forwarded {
                        if tx.send(event).is_err() {
                            break;
                        }
                    }
                }

                if tx.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, stop }
    }

    /// Get the next event.
    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        // The thread exits after its current poll, before reading more input.
        self.stop.store(true, Ordering::Relaxed);
    }
}

/// Keys the prompt loop handles itself.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    /// Abort the prompt.
    pub quit: Vec<KeyBinding>,
    /// End of input, honoured on an empty buffer.
    pub eof: Vec<KeyBinding>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: vec![KeyBinding::ctrl('c')],
            eof: vec![KeyBinding::ctrl('d')],
        }
    }
}

impl KeyBindings {
    /// Check if a key matches quit binding.
    pub fn is_quit(&self, key: &KeyEvent) -> bool {
        self.quit.iter().any(|k| k.matches(key))
    }

    /// Check if a key matches end-of-input binding.
    pub fn is_eof(&self, key: &KeyEvent) -> bool {
        self.eof.iter().any(|k| k.matches(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert!(bindings.is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(bindings.is_eof(&KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL)));
        assert!(!bindings.is_quit(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE)));
    }
}
