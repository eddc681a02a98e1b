//! Terminal session state.
//!
//! Owns the scrollback, the live input buffer, the command history, and the
//! cursor-blink timer. The session never draws and never reads events; the
//! main loop feeds it keystrokes and clock readings, and the renderer reads
//! its state snapshots.
//!
//! The scrollback is a list of lines whose final element is always the
//! current prompt line. Submitting a command extends that line with the
//! echoed input, appends the output lines, and pushes a fresh prompt.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::debug;

use crate::core::command::{self, Effect};
use crate::history::CommandHistory;

/// Prompt marker shown at the start of every input line.
pub const PROMPT: &str = "system@core:~$ ";

/// Cursor blink half-period.
pub const BLINK_INTERVAL: Duration = Duration::from_millis(530);

/// Blinking-cursor timer, driven by the main-loop clock. Purely visual;
/// it never gates input handling.
#[derive(Debug)]
pub struct CursorBlink {
    visible: bool,
    last_toggle: Instant,
}

impl CursorBlink {
    pub fn new(now: Instant) -> Self {
        Self {
            visible: true,
            last_toggle: now,
        }
    }

    /// Flip visibility once the interval has elapsed. Returns true when
    /// the visibility changed and a redraw is warranted.
    pub fn tick(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_toggle) >= BLINK_INTERVAL {
            self.visible = !self.visible;
            self.last_toggle = now;
            true
        } else {
            false
        }
    }

    pub fn visible(&self) -> bool {
        self.visible
    }
}

/// The interactive terminal session.
pub struct TerminalSession {
    lines: Vec<String>,
    input: String,
    history: CommandHistory,
    blink: CursorBlink,
    rng: StdRng,
}

impl TerminalSession {
    /// Create a session with the banner pre-seeded into the scrollback.
    pub fn new(now: Instant) -> Self {
        Self::with_rng(now, StdRng::from_entropy())
    }

    /// As `new`, but with a caller-supplied RNG for deterministic tests.
    pub fn with_rng(now: Instant, rng: StdRng) -> Self {
        Self {
            lines: banner(),
            input: String::new(),
            history: CommandHistory::new(),
            blink: CursorBlink::new(now),
            rng,
        }
    }

    /// Scrollback lines, oldest first. The last line is the live prompt.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The in-progress input buffer (not yet part of the scrollback).
    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn cursor_visible(&self) -> bool {
        self.blink.visible()
    }

    /// Advance the blink timer. Returns true when a redraw is warranted.
    pub fn tick_cursor(&mut self, now: Instant) -> bool {
        self.blink.tick(now)
    }

    pub fn push_char(&mut self, ch: char) {
        self.input.push(ch);
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Submit the current input buffer.
    ///
    /// Empty or whitespace-only input clears the buffer and changes nothing
    /// else. Otherwise the input is normalized, dispatched, echoed into the
    /// scrollback with its output and a fresh prompt, and recorded in the
    /// history. `ClearScreen` is applied here; the remaining effects are
    /// returned for the shell to act on.
    pub fn submit(&mut self) -> Effect {
        let raw = std::mem::take(&mut self.input);
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Effect::None;
        }

        let normalized = trimmed.to_ascii_lowercase();
        let reply = command::dispatch(&normalized, &mut self.rng);
        debug!("dispatched '{}' -> {:?}", normalized, reply.effect);

        if reply.effect == Effect::ClearScreen {
            self.clear();
            return reply.effect;
        }

        // Echo onto the current prompt line, then output, then a fresh
        // prompt. Scrollback only ever grows outside of `clear`.
        if let Some(last) = self.lines.last_mut() {
            last.push_str(&normalized);
        }
        self.lines
            .extend(reply.text.lines().map(|line| line.to_string()));
        self.lines.push(PROMPT.to_string());
        self.history.record(&normalized, &reply.text);

        reply.effect
    }

    /// Reset the scrollback to the initial prompt and empty the history.
    pub fn clear(&mut self) {
        self.lines = vec![PROMPT.to_string()];
        self.history.clear();
    }
}

/// The fixed startup banner, stamped with a synthetic login time.
fn banner() -> Vec<String> {
    let login = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    vec![
        "AUTONOMOUS SYSTEM V1.0.0".to_string(),
        "=====================================".to_string(),
        format!("Last login: {}", login),
        "Connected to: Quantum Core Network".to_string(),
        "Security Protocol: ACTIVE".to_string(),
        "Neural Interface: STABLE".to_string(),
        String::new(),
        "Type 'help' for available commands".to_string(),
        String::new(),
        PROMPT.to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::command::FALLBACK;

    fn session() -> TerminalSession {
        TerminalSession::with_rng(Instant::now(), StdRng::seed_from_u64(1))
    }

    fn type_line(session: &mut TerminalSession, text: &str) -> Effect {
        for ch in text.chars() {
            session.push_char(ch);
        }
        session.submit()
    }

    #[test]
    fn initial_state() {
        let s = session();
        assert_eq!(s.lines().last().map(String::as_str), Some(PROMPT));
        assert!(s.lines()[0].contains("AUTONOMOUS SYSTEM"));
        assert!(s.input().is_empty());
        assert!(s.history().is_empty());
        assert!(s.cursor_visible());
    }

    #[test]
    fn typing_grows_buffer_without_touching_scrollback() {
        let mut s = session();
        let before = s.lines().len();
        s.push_char('h');
        s.push_char('i');
        assert_eq!(s.input(), "hi");
        assert_eq!(s.lines().len(), before);
        s.backspace();
        assert_eq!(s.input(), "h");
    }

    #[test]
    fn help_appends_echo_output_and_fresh_prompt() {
        let mut s = session();
        let before = s.lines().len();
        let effect = type_line(&mut s, "help");
        assert_eq!(effect, Effect::None);

        // Old prompt line carries the echo, last line is a fresh prompt.
        assert_eq!(s.lines()[before - 1], format!("{}help", PROMPT));
        assert_eq!(s.lines().last().map(String::as_str), Some(PROMPT));
        assert!(s.lines().iter().any(|l| l.contains("Available commands")));
        assert_eq!(s.history().len(), 1);
        assert_eq!(s.history().entries()[0].input, "help");
        assert!(s.input().is_empty());
    }

    #[test]
    fn mixed_case_and_whitespace_match_lowercase() {
        let mut a = session();
        let mut b = session();
        type_line(&mut a, "HELP  ");
        type_line(&mut b, "help");

        // Skip the banner's login line; the two sessions may have been
        // stamped across a second boundary.
        assert_eq!(a.lines().len(), b.lines().len());
        for (i, (x, y)) in a.lines().iter().zip(b.lines()).enumerate() {
            if i != 2 {
                assert_eq!(x, y);
            }
        }
        assert_eq!(a.history().entries(), b.history().entries());
    }

    #[test]
    fn empty_submit_is_a_no_op() {
        let mut s = session();
        let before = s.lines().to_vec();

        s.submit();
        assert_eq!(s.lines(), &before[..]);
        assert!(s.history().is_empty());

        type_line(&mut s, "   ");
        assert_eq!(s.lines(), &before[..]);
        assert!(s.history().is_empty());
        assert!(s.input().is_empty());
    }

    #[test]
    fn clear_resets_to_single_prompt() {
        let mut s = session();
        type_line(&mut s, "help");
        type_line(&mut s, "balance");
        assert!(s.history().len() > 0);

        let effect = type_line(&mut s, "clear");
        assert_eq!(effect, Effect::ClearScreen);
        assert_eq!(s.lines(), &[PROMPT.to_string()]);
        assert!(s.history().is_empty());
    }

    #[test]
    fn unknown_command_appends_fallback() {
        let mut s = session();
        type_line(&mut s, "frobnicate");
        assert!(s.lines().iter().any(|l| l == FALLBACK));
        assert_eq!(s.lines().last().map(String::as_str), Some(PROMPT));
        assert_eq!(s.history().entries()[0].output, FALLBACK);
    }

    #[test]
    fn exit_signals_close_and_still_echoes() {
        let mut s = session();
        let before = s.lines().len();
        let effect = type_line(&mut s, "exit");
        assert_eq!(effect, Effect::CloseTerminal);
        assert_eq!(s.lines()[before - 1], format!("{}exit", PROMPT));
        assert_eq!(s.lines().last().map(String::as_str), Some(PROMPT));
        assert_eq!(s.history().len(), 1);
    }

    #[test]
    fn scrollback_only_grows_between_clears() {
        let mut s = session();
        let mut last = s.lines().len();
        for cmd in ["help", "nodes", "frobnicate", "hack"] {
            type_line(&mut s, cmd);
            assert!(s.lines().len() > last);
            last = s.lines().len();
        }
    }

    #[test]
    fn cursor_blinks_on_its_own_clock() {
        let start = Instant::now();
        let mut blink = CursorBlink::new(start);
        assert!(blink.visible());
        assert!(!blink.tick(start + Duration::from_millis(100)));
        assert!(blink.visible());
        assert!(blink.tick(start + BLINK_INTERVAL));
        assert!(!blink.visible());
        assert!(blink.tick(start + BLINK_INTERVAL + BLINK_INTERVAL));
        assert!(blink.visible());
    }
}
