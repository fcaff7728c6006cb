// Diagnostics sink: fire-and-forget screen evidence at failure points.
// Strictly outside the control path - a sink failure must never change
// driver behavior.

use log::warn;

/// Something that can persist a capture under the given filename.
pub trait CaptureSink {
    fn capture(&self, filename: &str) -> Result<(), Box<dyn std::error::Error>>;
}

/// Discards every capture request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullCapture;

impl CaptureSink for NullCapture {
    fn capture(&self, _filename: &str) -> Result<(), Box<dyn std::error::Error>> {
        Ok(())
    }
}

/// Invoke the sink, swallowing any failure.
pub fn capture_quiet<C: CaptureSink + ?Sized>(sink: &C, filename: &str) {
    if let Err(err) = sink.capture(filename) {
        warn!("capture '{}' failed (ignored): {}", filename, err);
    }
}
