#![allow(dead_code)]

pub mod temp_files {
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Write `content` to a fresh temporary file with the given extension.
    ///
    /// The file is removed when the returned handle is dropped.
    pub fn create_temp_file(content: &str, ext: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("trierouter_test_")
            .suffix(&format!(".{ext}"))
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    /// Temporary route table file
    pub fn create_temp_table(content: &str) -> NamedTempFile {
        create_temp_file(content, "toml")
    }
}

pub mod log_capture {
    use parking_lot::Mutex;
    use std::fmt;
    use std::sync::Arc;
    use tracing::field::{Field, Visit};
    use tracing::{Event, Level, Subscriber};
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
    use trierouter::Logger;

    /// One recorded `tracing` event.
    #[derive(Debug, Clone)]
    pub struct CapturedEvent {
        pub level: Level,
        pub message: String,
        pub fields: Vec<(String, String)>,
    }

    impl CapturedEvent {
        pub fn field(&self, name: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    /// Layer that records every event it sees.
    #[derive(Clone, Default)]
    pub struct LogCapture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    impl LogCapture {
        pub fn new() -> Self {
            Self::default()
        }

        /// A logger that sends events to this capture.
        pub fn logger(&self) -> Logger {
            Logger::from_subscriber(tracing_subscriber::registry().with(self.clone()))
        }

        pub fn events(&self) -> Vec<CapturedEvent> {
            self.events.lock().clone()
        }

        pub fn messages(&self) -> Vec<String> {
            self.events.lock().iter().map(|e| e.message.clone()).collect()
        }

        pub fn find(&self, message: &str) -> Option<CapturedEvent> {
            self.events
                .lock()
                .iter()
                .find(|e| e.message == message)
                .cloned()
        }

        pub fn count(&self, message: &str) -> usize {
            self.events
                .lock()
                .iter()
                .filter(|e| e.message == message)
                .count()
        }

        pub fn clear(&self) {
            self.events.lock().clear();
        }
    }

    struct FieldVisitor<'a> {
        message: &'a mut String,
        fields: &'a mut Vec<(String, String)>,
    }

    impl Visit for FieldVisitor<'_> {
        fn record_str(&mut self, field: &Field, value: &str) {
            if field.name() == "message" {
                *self.message = value.to_string();
            } else {
                self.fields.push((field.name().to_string(), value.to_string()));
            }
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            let value = format!("{value:?}");
            if field.name() == "message" {
                *self.message = value;
            } else {
                self.fields.push((field.name().to_string(), value));
            }
        }
    }

    impl<S: Subscriber> Layer<S> for LogCapture {
        fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
            let mut message = String::new();
            let mut fields = Vec::new();
            event.record(&mut FieldVisitor {
                message: &mut message,
                fields: &mut fields,
            });
            self.events.lock().push(CapturedEvent {
                level: *event.metadata().level(),
                message,
                fields,
            });
        }
    }
}
