//! Rolling Logger
//!
//! A `tracing` layer that keeps the most recent formatted log lines in a
//! circular buffer and forwards every line to an optional sink (the browser
//! console in the app, a plain vector in tests).

use std::collections::VecDeque;
use std::fmt::{self, Write as _};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

/// Default number of lines kept in memory
pub const DEFAULT_CAPACITY: usize = 500;

/// Receives every formatted line as it is logged
pub type Sink = Arc<dyn Fn(Level, &str) + Send + Sync>;

// ========================
// Ring Buffer
// ========================

/// Shared handle to the most recent log lines
#[derive(Clone)]
pub struct LogBuffer {
    lines: Arc<Mutex<VecDeque<String>>>,
    capacity: usize,
}

impl LogBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            lines: Arc::new(Mutex::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<String>> {
        self.lines.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append a line, evicting the oldest once full
    pub fn push(&self, line: String) {
        if self.capacity == 0 {
            return;
        }
        let mut lines = self.lock();
        while lines.len() >= self.capacity {
            lines.pop_front();
        }
        lines.push_back(line);
    }

    /// Snapshot of buffered lines, oldest first
    pub fn recent_lines(&self) -> Vec<String> {
        self.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBuffer")
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}

// ========================
// Layer
// ========================

/// Collects `message` first, then `key=value` pairs for the remaining fields
#[derive(Default)]
struct LineVisitor {
    message: String,
    fields: String,
}

impl Visit for LineVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            let _ = write!(self.fields, " {}={}", field.name(), value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _ = write!(self.message, "{:?}", value);
        } else {
            let _ = write!(self.fields, " {}={:?}", field.name(), value);
        }
    }
}

impl LineVisitor {
    fn finish(self) -> String {
        let mut line = self.message;
        line.push_str(&self.fields);
        line
    }
}

/// Tracing layer writing into a [`LogBuffer`]
pub struct RollingLayer {
    buffer: LogBuffer,
    sink: Option<Sink>,
}

impl<S: Subscriber> Layer<S> for RollingLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let mut visitor = LineVisitor::default();
        event.record(&mut visitor);

        let line = format!(
            "{} {:>5} {}: {}",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            meta.level(),
            meta.target(),
            visitor.finish()
        );

        if let Some(sink) = &self.sink {
            sink(*meta.level(), &line);
        }
        self.buffer.push(line);
    }
}

// ========================
// Builder
// ========================

/// Configures and installs the rolling layer
pub struct RollingLogger {
    capacity: usize,
    level: LevelFilter,
    sink: Option<Sink>,
}

impl Default for RollingLogger {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            level: LevelFilter::INFO,
            sink: None,
        }
    }
}

impl RollingLogger {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    pub fn sink<F>(mut self, sink: F) -> Self
    where
        F: Fn(Level, &str) + Send + Sync + 'static,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Build the layer without installing it
    pub fn build(self) -> (RollingLayer, LogBuffer, LevelFilter) {
        let buffer = LogBuffer::new(self.capacity);
        let layer = RollingLayer {
            buffer: buffer.clone(),
            sink: self.sink,
        };
        (layer, buffer, self.level)
    }

    /// Install as the global default subscriber.
    ///
    /// A second call leaves the first subscriber in place and still returns
    /// a (detached) buffer.
    pub fn init(self) -> LogBuffer {
        let (layer, buffer, level) = self.build();
        let _ = tracing_subscriber::registry()
            .with(layer.with_filter(level))
            .try_init();
        buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(
        capacity: usize,
        level: LevelFilter,
    ) -> (impl Subscriber + Send + Sync + 'static, LogBuffer, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let (layer, buffer, level) = RollingLogger::builder()
            .capacity(capacity)
            .level(level)
            .sink(move |_, line| sink_seen.lock().unwrap().push(line.to_string()))
            .build();
        let subscriber = tracing_subscriber::registry().with(layer.with_filter(level));
        (subscriber, buffer, seen)
    }

    #[test]
    fn test_buffer_evicts_oldest() {
        let buffer = LogBuffer::new(2);
        buffer.push("a".into());
        buffer.push("b".into());
        buffer.push("c".into());
        assert_eq!(buffer.recent_lines(), vec!["b".to_string(), "c".to_string()]);
    }

    #[test]
    fn test_zero_capacity_keeps_nothing() {
        let buffer = LogBuffer::new(0);
        buffer.push("a".into());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_layer_formats_message_and_fields() {
        let (subscriber, buffer, seen) = capture(10, LevelFilter::DEBUG);
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(code = "4001", "business failure");
        });

        let lines = buffer.recent_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO"));
        assert!(lines[0].ends_with("business failure code=4001"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_level_filter_drops_debug() {
        let (subscriber, buffer, seen) = capture(10, LevelFilter::INFO);
        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("hidden");
            tracing::warn!("shown");
        });

        assert_eq!(buffer.len(), 1);
        assert!(buffer.recent_lines()[0].contains("shown"));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
