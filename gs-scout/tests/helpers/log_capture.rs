//! Tracing capture for asserting on pipeline diagnostics

use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;

/// Captured event: level, message and `key=value` fields
#[derive(Debug, Clone)]
pub struct LogRecord {
    pub level: Level,
    pub message: String,
    pub fields: Vec<(String, String)>,
}

impl LogRecord {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Clone, Default)]
pub struct LogCapture {
    records: Arc<Mutex<Vec<LogRecord>>>,
}

impl LogCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread-local subscriber until the guard drops
    ///
    /// `#[tokio::test]` runs on a current-thread runtime, so every event of
    /// the test body is seen.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Records whose message contains `pattern`
    pub fn matching(&self, pattern: &str) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.message.contains(pattern))
            .collect()
    }

    pub fn assert_contains(&self, pattern: &str) {
        assert!(
            !self.matching(pattern).is_empty(),
            "Expected log matching '{}', but none found. All logs:\n{}",
            pattern,
            self.records()
                .iter()
                .map(|r| r.message.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        );
    }
}

impl<S> tracing_subscriber::Layer<S> for LogCapture
where
    S: tracing::Subscriber,
{
    fn on_event(
        &self,
        event: &tracing::Event<'_>,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        use tracing::field::{Field, Visit};

        #[derive(Default)]
        struct Collector {
            message: String,
            fields: Vec<(String, String)>,
        }

        impl Visit for Collector {
            fn record_str(&mut self, field: &Field, value: &str) {
                if field.name() == "message" {
                    self.message = value.to_string();
                } else {
                    self.fields.push((field.name().to_string(), value.to_string()));
                }
            }

            fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
                let rendered = format!("{:?}", value);
                if field.name() == "message" {
                    self.message = rendered;
                } else {
                    self.fields.push((field.name().to_string(), rendered));
                }
            }
        }

        let mut collector = Collector::default();
        event.record(&mut collector);

        self.records.lock().unwrap().push(LogRecord {
            level: *event.metadata().level(),
            message: collector.message,
            fields: collector.fields,
        });
    }
}
