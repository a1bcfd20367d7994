//! Interactive prompt main loop.
//!
//! Draws the editor inline below the cursor (no alternate screen), feeds it
//! keys, and drains finished history refreshes between events.

use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    cursor::{Hide, MoveToColumn, MoveUp, Show},
    event::{KeyEvent, KeyEventKind},
    queue,
    style::Print,
    terminal::{self, disable_raw_mode, enable_raw_mode, Clear, ClearType},
};
use tracing::debug;

use crate::editor::{BasicEditor, BorderStyle, Chrome, InputOutcome, LineEditor};
use crate::error::{Result, RewindError};
use crate::history::HistoryAggregator;
use crate::refresh::{ActiveSession, PromptHistory};
use crate::search::{SearchEditor, SearchKeys};

use super::events::{Event, EventHandler, KeyBindings};

const TICK_RATE: Duration = Duration::from_millis(50);
const FALLBACK_WIDTH: u16 = 80;

/// Everything the prompt needs to start.
#[derive(Debug)]
pub struct PromptOptions {
    /// Working directory whose sessions feed history.
    pub cwd: PathBuf,
    /// The active session.
    pub session: ActiveSession,
    /// History builder.
    pub aggregator: HistoryAggregator,
    /// Reverse search keys.
    pub keys: SearchKeys,
    /// Border colours.
    pub border: BorderStyle,
}

/// Run the prompt until the user submits a line or quits.
///
/// Must be called inside a tokio runtime context so the background history
/// pass can be spawned. Returns `None` on end of input and
/// [`RewindError::Interrupted`] on Ctrl+C.
pub fn run(options: PromptOptions) -> Result<Option<String>> {
    enable_raw_mode().map_err(|e| {
        RewindError::io(
            "Cannot start prompt - no interactive terminal available",
            e,
        )
    })?;

    let mut screen = InlineScreen::new(io::stdout());
    let result = run_loop(&mut screen, options);

    let cleared = screen.clear();
    disable_raw_mode().map_err(|e| RewindError::io("Failed to disable raw mode", e))?;
    cleared?;

    result
}

fn run_loop<W: Write>(screen: &mut InlineScreen<W>, options: PromptOptions) -> Result<Option<String>> {
    let PromptOptions {
        cwd,
        session,
        aggregator,
        keys,
        border,
    } = options;

    let mut editor = SearchEditor::new(BasicEditor::new(), keys, border);
    let mut history = PromptHistory::new(aggregator);
    history.on_session_start(&mut editor, &cwd, &session);

    let events = EventHandler::new(TICK_RATE);
    let bindings = KeyBindings::default();
    screen.draw(&editor.render(terminal_width(), Chrome::Normal))?;

    loop {
        let event = events
            .next()
            .map_err(|_| RewindError::terminal("Input stream closed"))?;

        match event {
            Event::Tick => {
                if history.apply_pending(&mut editor) == 0 {
                    continue;
                }
            }
            Event::Key(key) => {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                match exit_for(&editor, &bindings, &keys, &key) {
                    Some(Exit::Interrupt) => {
                        debug!("Prompt aborted");
                        return Err(RewindError::Interrupted);
                    }
                    Some(Exit::EndOfInput) => {
                        debug!("End of input");
                        return Ok(None);
                    }
                    None => {}
                }

                if let InputOutcome::Submitted(text) = editor.handle_input(key) {
                    if !text.trim().is_empty() {
                        return Ok(Some(text));
                    }
                }
                history.apply_pending(&mut editor);
            }
            Event::Resize(..) => {}
        }

        screen.draw(&editor.render(terminal_width(), Chrome::Normal))?;
    }
}

/// Ways a key can end the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Interrupt,
    EndOfInput,
}

fn exit_for(
    editor: &SearchEditor<BasicEditor>,
    bindings: &KeyBindings,
    keys: &SearchKeys,
    key: &KeyEvent,
) -> Option<Exit> {
    // A cancel key bound to Ctrl+C leaves search instead of quitting.
    let cancels_search = editor.is_searching() && keys.cancel.matches(key);
    if bindings.is_quit(key) && !cancels_search {
        return Some(Exit::Interrupt);
    }
    if bindings.is_eof(key) && !editor.is_searching() && editor.text().is_empty() {
        return Some(Exit::EndOfInput);
    }
    None
}

fn terminal_width() -> u16 {
    terminal::size().map_or(FALLBACK_WIDTH, |(w, _)| w.max(1))
}

/// Redraws a block of lines in place below the cursor.
struct InlineScreen<W: Write> {
    out: W,
    drawn: usize,
}

impl<W: Write> InlineScreen<W> {
    fn new(out: W) -> Self {
        Self { out, drawn: 0 }
    }

    fn rewind(&mut self) -> io::Result<()> {
        if self.drawn > 1 {
            let up = u16::try_from(self.drawn - 1).unwrap_or(u16::MAX);
            queue!(self.out, MoveUp(up))?;
        }
        queue!(self.out, MoveToColumn(0), Clear(ClearType::FromCursorDown))
    }

    fn write_lines(&mut self, lines: &[String]) -> io::Result<()> {
        queue!(self.out, Hide)?;
        self.rewind()?;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                queue!(self.out, Print("\r\n"))?;
            }
            queue!(self.out, Print(line))?;
        }
        self.out.flush()
    }

    fn draw(&mut self, lines: &[String]) -> Result<()> {
        let written = self.write_lines(lines);
        self.drawn = lines.len();
        written.map_err(|e| RewindError::io("Failed to draw prompt", e))
    }

    fn clear(&mut self) -> Result<()> {
        let written = self
            .rewind()
            .and_then(|()| queue!(self.out, Show))
            .and_then(|()| self.out.flush());
        self.drawn = 0;
        written.map_err(|e| RewindError::io("Failed to clear prompt", e))
    }
}
