//! Logging and tracing utilities

use regex::Regex;
use std::borrow::Cow;
use std::io::{self, Write};
use std::sync::OnceLock;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        // Telegram bot tokens look like "bot123456789:AAExample-Secret_0"
        // inside request URLs.
        #[allow(clippy::unwrap_used)]
        Regex::new(r"bot(\d+):[A-Za-z0-9_-]+").unwrap()
    })
}

/// Replace any Telegram bot token in `line` with a redacted marker.
pub fn redact_bot_token(line: &str) -> Cow<'_, str> {
    token_pattern().replace_all(line, "bot$1:[REDACTED]")
}

/// Writer wrapper that redacts bot tokens before forwarding to the inner
/// writer.
pub struct RedactingWriter<W> {
    inner: W,
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let text = String::from_utf8_lossy(buf);
        self.inner.write_all(redact_bot_token(&text).as_bytes())?;
        // Report the original length; redaction may change it.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// `MakeWriter` that wraps every produced writer in [`RedactingWriter`].
#[derive(Debug, Clone, Default)]
pub struct RedactingMakeWriter<M> {
    inner: M,
}

impl<M> RedactingMakeWriter<M> {
    pub fn new(inner: M) -> Self {
        Self { inner }
    }
}

impl<'a, M> MakeWriter<'a> for RedactingMakeWriter<M>
where
    M: MakeWriter<'a>,
{
    type Writer = RedactingWriter<M::Writer>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            inner: self.inner.make_writer(),
        }
    }
}

/// Initialize the tracing subscriber.
///
/// Filter defaults to `info` and can be overridden with `RUST_LOG`. All
/// output passes through the token-redacting writer.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(RedactingMakeWriter::new(io::stdout)),
        )
        .init();
}
