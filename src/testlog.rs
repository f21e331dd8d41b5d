//! Test-only capture of the tracing channel

use std::io;
use std::sync::{Arc, Mutex};
use tracing_subscriber::fmt::MakeWriter;

/// Collects everything the fmt subscriber writes during a test.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl io::Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Capture {
    type Writer = Capture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a capturing subscriber installed on this thread and return
/// everything it logged.
pub fn capture_logs<F: FnOnce()>(f: F) -> String {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(capture.clone())
        .finish();
    tracing::subscriber::with_default(subscriber, f);
    let buffer = capture.0.lock().unwrap();
    String::from_utf8_lossy(&buffer).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_returns_what_was_logged() {
        let logged = capture_logs(|| {
            tracing::error!("first event");
            tracing::warn!("second event");
        });
        assert!(logged.contains("first event"));
        assert!(logged.contains("second event"));
    }

    #[test]
    fn capture_is_scoped_to_the_closure() {
        let logged = capture_logs(|| {
            tracing::error!("inside");
        });
        tracing::error!("outside");
        assert_eq!(logged.matches("inside").count(), 1);
        assert!(!logged.contains("outside"));
    }
}
