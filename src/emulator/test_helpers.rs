//! Test double: an emulator wired to an in-process keyboard channel and an
//! in-memory output sink.
use crate::emulator::Emulator;
use crate::errors::ExecutionError;
use crate::hardware::keyboard::ChannelInputProvider;
use crate::hardware::memory::Memory;
use crate::hardware::registers::Registers;
use std::io;
use std::io::Write;
use std::sync::mpsc;

pub struct StringWriter {
    vec: Vec<u8>,
}
impl Write for StringWriter {
    fn write(&mut self, data: &[u8]) -> Result<usize, io::Error> {
        self.vec.write(data)
    }
    fn flush(&mut self) -> Result<(), io::Error> {
        Ok(())
    }
}
impl StringWriter {
    pub fn new() -> Self {
        let vec = Vec::<u8>::with_capacity(120);
        Self { vec }
    }
    pub fn get_string(&self) -> String {
        String::from_utf8(self.vec.clone()).unwrap()
    }
}

pub struct FakeEmulator {
    inner: Emulator<ChannelInputProvider, StringWriter>,
    keyboard_input_sender: mpsc::Sender<u8>,
}
impl FakeEmulator {
    /// Builds a machine with `words` placed from `0x3000`, routed through the
    /// object-image loader.
    pub fn new(words: &[u16]) -> Self {
        let mut image = Vec::with_capacity(2 + words.len() * 2);
        image.extend_from_slice(&0x3000u16.to_be_bytes());
        for word in words {
            image.extend_from_slice(&word.to_be_bytes());
        }
        let (keyboard_input_sender, receiver) = mpsc::channel();
        let mut inner = Emulator::new(ChannelInputProvider::new(receiver), StringWriter::new());
        inner
            .load_image(image.as_slice())
            .expect("loading the test image cannot fail");
        Self {
            inner,
            keyboard_input_sender,
        }
    }
    /// Queues keystrokes for the machine to consume.
    pub fn add_stdin_input(&mut self, input: &[u8]) -> &mut Self {
        for b in input {
            self.keyboard_input_sender
                .send(*b)
                .expect("test keyboard channel is open");
        }
        self
    }
    pub fn get_parts(
        &mut self,
    ) -> (
        &mut Registers,
        &mut Memory<ChannelInputProvider>,
        &mut StringWriter,
    ) {
        (
            &mut self.inner.registers,
            &mut self.inner.memory,
            &mut self.inner.output,
        )
    }
    pub fn execute(&mut self) -> Result<(), ExecutionError> {
        self.inner.execute()
    }
    pub fn reset_registers(&mut self) {
        self.inner.reset_registers();
    }
    pub fn registers(&self) -> &Registers {
        self.inner.registers()
    }
    pub fn output(&self) -> String {
        self.inner.output.get_string()
    }
}
