use std::io::{self, Write};

/// Receives the values printed by `PRN`, in execution order.
pub trait OutputSink {
    fn emit(&mut self, value: u8) -> io::Result<()>;
}

impl OutputSink for Vec<u8> {
    fn emit(&mut self, value: u8) -> io::Result<()> {
        self.push(value);
        Ok(())
    }
}

/// Writes each value as a decimal line.
pub struct LineSink<W: Write> {
    writer: W,
}

impl<W: Write> LineSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> OutputSink for LineSink<W> {
    fn emit(&mut self, value: u8) -> io::Result<()> {
        writeln!(self.writer, "{value}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_sink_writes_decimal_lines() {
        let mut sink = LineSink::new(Vec::new());
        sink.emit(8).unwrap();
        sink.emit(255).unwrap();
        assert_eq!(sink.into_inner(), b"8\n255\n");
    }
}
