use crate::errors::{ExecutionError, LoadImageError};
use crate::hardware::keyboard::KeyboardInputProvider;
use byteorder::{BigEndian, ReadBytesExt};
use log::debug;
use std::io::{ErrorKind, Read};
use std::ops::Index;

/// Number of addressable 16-bit words.
pub const MEMORY_SIZE: usize = 1 << 16;

/// Addresses of the memory mapped device registers.
pub enum MemoryMappedIOLocations {
    /// Keyboard status: bit 15 set iff a key is ready
    Kbsr = 0xFE00,
    /// Keyboard data: latched keystroke in the low byte
    Kbdr = 0xFE02,
}

const KEY_READY: u16 = 1 << 15;

/// An abstraction for the LC-3 memory including the keyboard device but
/// excluding registers.
///
/// Reading [`MemoryMappedIOLocations::Kbsr`] re-polls the keyboard: that read
/// is the point at which a pending keystroke is consumed and latched into
/// KBDR. All other addresses are plain storage.
pub struct Memory<K> {
    /// Index equals memory address
    data: Vec<u16>,
    keyboard: K,
}

impl<K: KeyboardInputProvider> Memory<K> {
    pub fn new(keyboard: K) -> Self {
        Self {
            data: vec![0x0u16; MEMORY_SIZE],
            keyboard,
        }
    }

    /// Places an object image into memory: a big-endian origin word followed
    /// by big-endian data words stored from `origin` upwards. Returns the
    /// origin.
    ///
    /// Words past the top of the address space are dropped, as is a trailing
    /// odd byte. Later images overwrite earlier ones where they overlap.
    ///
    /// # Errors
    /// - the stream ends before a complete origin word
    /// - the stream fails with a real read error
    pub fn load_image(&mut self, mut reader: impl Read) -> Result<u16, LoadImageError> {
        let origin = read_image_word(&mut reader)?.ok_or(LoadImageError::MissingOrigin)?;
        let mut address = usize::from(origin);
        while address < MEMORY_SIZE {
            let Some(word) = read_image_word(&mut reader)? else {
                break;
            };
            self.data[address] = word;
            address += 1;
        }
        debug!(
            "loaded image at {origin:#06X}, {} words",
            address - usize::from(origin)
        );
        Ok(origin)
    }

    /// Reads one word, consuming a pending keystroke if `address` is KBSR.
    ///
    /// # Errors
    /// - polling or reading the host keyboard fails
    pub fn read(&mut self, address: u16) -> Result<u16, ExecutionError> {
        if address == MemoryMappedIOLocations::Kbsr as u16 {
            if self.keyboard.check_input_available()? {
                self.data[MemoryMappedIOLocations::Kbsr as usize] = KEY_READY;
                self.data[MemoryMappedIOLocations::Kbdr as usize] =
                    u16::from(self.keyboard.get_input_character()?);
            } else {
                self.data[MemoryMappedIOLocations::Kbsr as usize] = 0;
            }
        }
        Ok(self.data[usize::from(address)])
    }

    /// Plain store; writes to KBSR/KBDR have no device semantics.
    pub fn write(&mut self, address: u16, value: u16) {
        self.data[usize::from(address)] = value;
    }

    pub fn keyboard_mut(&mut self) -> &mut K {
        &mut self.keyboard
    }
}

/// Raw access without the KBSR side effect, used by the string traps.
impl<K> Index<u16> for Memory<K> {
    type Output = u16;
    fn index(&self, address: u16) -> &u16 {
        &self.data[usize::from(address)]
    }
}

fn read_image_word(reader: &mut impl Read) -> Result<Option<u16>, LoadImageError> {
    match reader.read_u16::<BigEndian>() {
        Ok(word) => Ok(Some(word)),
        // end of stream; also covers a trailing odd byte, which the format discards
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => Ok(None),
        Err(e) => Err(LoadImageError::ImageStreamNotReadable(e.to_string())),
    }
}
