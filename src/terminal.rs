//! Host terminal adapter: raw-mode switching and buffered output.
//!
//! The emulator core never touches terminal state itself; the binary takes a
//! [`RawLock`] around `execute()` so keystrokes reach the keyboard device
//! unbuffered and without echo.

use std::io::{Write, stdin};
use std::os::fd::{AsRawFd, RawFd};
use termios::{ECHO, Termios};

/// Restores the previous terminal attributes on drop.
pub struct RawLock {
    fd: RawFd,
    termios_orig: Termios,
}

impl Drop for RawLock {
    fn drop(&mut self) {
        // terminal stays in raw mode but no means to repair
        let _ = termios::tcsetattr(self.fd, termios::TCSAFLUSH, &self.termios_orig);
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum EchoOptions {
    EchoOn,
    EchoOff,
}

/// Switches stdin to raw mode until the returned [`RawLock`] is dropped.
///
/// # Errors
/// - reading or writing the termios attributes fails
pub fn set_terminal_raw(eo: EchoOptions) -> Result<RawLock, std::io::Error> {
    let fd = stdin().as_raw_fd();
    let termios_orig = termios::Termios::from_fd(fd)?;
    let mut termios_raw = termios_orig;
    // https://man7.org/linux/man-pages/man3/termios.3.html
    termios::cfmakeraw(&mut termios_raw);
    // c_lflag ECHO needed if we want to echo characters back after all
    if eo == EchoOptions::EchoOn {
        termios_raw.c_lflag |= ECHO;
    }
    termios::tcsetattr(fd, termios::TCSAFLUSH, &termios_raw)?;
    Ok(RawLock { fd, termios_orig })
}

/// Writes `message` and flushes, so trap output appears before the next
/// blocking keyboard read.
///
/// # Errors
/// - the underlying write or flush fails
pub fn print(out: &mut impl Write, message: &str) -> Result<(), std::io::Error> {
    out.write_all(message.as_bytes())?;
    out.flush()
}
