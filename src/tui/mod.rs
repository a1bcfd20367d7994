//! Interactive inline prompt.
//!
//! Wires the basic editor, reverse search and background history refresh to
//! a raw-mode terminal. Rendering is plain ANSI lines printed with crossterm
//! below the shell prompt.

mod app;
mod events;

pub use app::{run, PromptOptions};
pub use events::{Event, EventHandler, KeyBindings};
