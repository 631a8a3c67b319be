use crossterm::event::{KeyCode, KeyEvent, poll, read};
use std::io;
use std::sync::mpsc;
use std::time::Duration;

/// The keyboard side of the host I/O port.
///
/// [`check_input_available`](KeyboardInputProvider::check_input_available) is
/// the non-blocking probe behind KBSR reads; a `true` result latches the key
/// so the following [`get_input_character`](KeyboardInputProvider::get_input_character)
/// returns it without blocking. GETC and IN call `get_input_character`
/// directly and block until a key arrives.
pub trait KeyboardInputProvider {
    /// Non-blocking probe for a pending keystroke.
    ///
    /// # Errors
    /// - reading host input events fails
    fn check_input_available(&mut self) -> io::Result<bool>;
    /// Blocking read of one input byte.
    ///
    /// # Errors
    /// - reading host input events fails or input is closed
    fn get_input_character(&mut self) -> io::Result<u8>;
}

/// Reads keystrokes from the controlling terminal via crossterm events.
pub struct TerminalInputProvider {
    available_char: Option<u8>,
}
impl TerminalInputProvider {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            available_char: None,
        }
    }
}
impl Default for TerminalInputProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[expect(
    clippy::cast_possible_truncation,
    reason = "LC-3 input is byte-wide ASCII; wider chars truncate like the original"
)]
fn key_event_byte(event: KeyEvent) -> Option<u8> {
    match event.code {
        KeyCode::Char(c) => Some(c as u8),
        KeyCode::Enter => Some(b'\n'),
        _ => None,
    }
}

impl KeyboardInputProvider for TerminalInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.available_char.is_some() {
            return Ok(true);
        }
        if poll(Duration::from_secs(0))?
            && let Some(event) = read()?.as_key_event()
            && let Some(c) = key_event_byte(event)
        {
            self.available_char = Some(c);
            return Ok(true);
        }
        Ok(false)
    }
    fn get_input_character(&mut self) -> io::Result<u8> {
        if let Some(c) = self.available_char.take() {
            return Ok(c);
        }
        loop {
            if let Some(event) = read()?.as_key_event()
                && let Some(c) = key_event_byte(event)
            {
                return Ok(c);
            }
        }
    }
}

/// Feeds keystrokes from an in-process channel.
///
/// Used by the test double and by embedders that script their input.
pub struct ChannelInputProvider {
    receiver: mpsc::Receiver<u8>,
    available_char: Option<u8>,
}
impl ChannelInputProvider {
    #[must_use]
    pub const fn new(receiver: mpsc::Receiver<u8>) -> Self {
        Self {
            receiver,
            available_char: None,
        }
    }
}
impl KeyboardInputProvider for ChannelInputProvider {
    fn check_input_available(&mut self) -> io::Result<bool> {
        if self.available_char.is_some() {
            return Ok(true);
        }
        match self.receiver.try_recv() {
            Ok(c) => {
                self.available_char = Some(c);
                Ok(true)
            }
            Err(mpsc::TryRecvError::Empty | mpsc::TryRecvError::Disconnected) => Ok(false),
        }
    }
    fn get_input_character(&mut self) -> io::Result<u8> {
        if let Some(c) = self.available_char.take() {
            return Ok(c);
        }
        self.receiver.recv().map_err(|_| {
            io::Error::new(io::ErrorKind::UnexpectedEof, "keyboard input channel closed")
        })
    }
}
