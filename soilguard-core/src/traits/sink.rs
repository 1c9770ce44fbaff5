//! Line-Oriented Output Stream
//!
//! The node writes whole lines only: banner text, data lines and
//! diagnostics. The sink adds the terminator. Sinks decide for themselves
//! whether to buffer or drop when nobody is listening; the node logs a
//! failed write and moves on.

/// Destination for report and diagnostic lines
pub trait LineSink {
    /// Transport error type
    type Error: core::fmt::Debug;

    /// Whether a reader is attached
    ///
    /// Polled by the startup guard only. Defaults to always ready, for
    /// transports that cannot tell.
    fn is_ready(&self) -> bool {
        true
    }

    /// Write one line; the implementation appends the newline
    fn write_line(&mut self, line: &str) -> Result<(), Self::Error>;
}

impl<T: LineSink + ?Sized> LineSink for &mut T {
    type Error = T::Error;

    fn is_ready(&self) -> bool {
        T::is_ready(self)
    }

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        T::write_line(self, line)
    }
}

/// Adapts any `std::io::Write` into a newline-terminated sink (requires std)
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct WriteSink<W: std::io::Write> {
    inner: W,
}

#[cfg(feature = "std")]
impl<W: std::io::Write> WriteSink<W> {
    /// Wrap a writer
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    /// Recover the writer
    pub fn into_inner(self) -> W {
        self.inner
    }
}

#[cfg(feature = "std")]
impl<W: std::io::Write> LineSink for WriteSink<W> {
    type Error = std::io::Error;

    fn write_line(&mut self, line: &str) -> Result<(), Self::Error> {
        self.inner.write_all(line.as_bytes())?;
        self.inner.write_all(b"\n")?;
        self.inner.flush()
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn write_sink_terminates_lines() {
        let mut sink = WriteSink::new(Vec::new());
        sink.write_line("1000,512,600").unwrap();
        sink.write_line("DATA,512,70").unwrap();

        let written = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(written, "1000,512,600\nDATA,512,70\n");
    }
}
