#![allow(dead_code)]

use config_init::error::Result;
use config_init::FromConfigFile;
use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex};

/// Config type that accepts any file
#[derive(Debug)]
pub struct Config;

impl FromConfigFile for Config {
    fn from_file<R: Read>(_reader: R) -> Result<Self> {
        Ok(Self)
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber capturing log output, returning both
pub fn capture_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
    let buffer = LogBuffer::default();
    let writer = buffer.clone();

    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();

    (result, logs)
}
