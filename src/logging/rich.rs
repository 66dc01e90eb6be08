use std::sync::Arc;

use crate::errors::StreamError;
use crate::inspect::{Inspect, Shape, PREVIEW_LEN};
use crate::operator::{Emitter, Handler, Operator};
use crate::sink::{default_sink, Level, LogRecord, LogSink};

use super::format::{paint, Color};

/// Maps up to this many entries are printed on a single line.
const INLINE_MAP_LEN: usize = 3;

/// Formats each value according to its [`Shape`], with optional ANSI colors.
///
/// | shape    | line                                                       |
/// |----------|------------------------------------------------------------|
/// | mapping  | `Map: {k: v}`, or a header and up to 5 `  - k: v` lines     |
/// | sequence | `<Kind>: [a, b, ...]`, at most 5 items                      |
/// | number   | `Number: v (type)`, green / red / blue by sign              |
/// | other    | `Value: v (type)`                                           |
///
/// Completion is logged at [`Level::Success`] with the number of items seen.
#[derive(Clone)]
pub struct RichLogger {
    name: String,
    colorize: bool,
    show_type: bool,
    sink: Arc<dyn LogSink>,
}

impl RichLogger {
    pub fn new(name: impl Into<String>) -> Self {
        RichLogger {
            name: name.into(),
            colorize: true,
            show_type: true,
            sink: default_sink(),
        }
    }

    #[must_use]
    pub fn colorize(mut self, enabled: bool) -> Self {
        self.colorize = enabled;
        self
    }

    /// Whether number and generic value lines end with the value's type.
    #[must_use]
    pub fn show_type(mut self, enabled: bool) -> Self {
        self.show_type = enabled;
        self
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }
}

pub struct RichHandler {
    config: RichLogger,
    count: u64,
}

impl RichHandler {
    fn paint(&self, text: &str, color: Color) -> String {
        paint(text, color, self.config.colorize)
    }

    fn tag(&self) -> String {
        self.paint(&format!("[{}]", self.config.name), Color::Yellow)
    }

    fn type_suffix<T: Inspect + ?Sized>(&self, value: &T) -> String {
        if self.config.show_type {
            format!(" {}", self.paint(&format!("({})", value.type_name()), Color::Dim))
        } else {
            String::new()
        }
    }

    fn format<T: Inspect + ?Sized>(&self, value: &T) -> (&'static str, String) {
        let tag = self.tag();
        match value.shape() {
            Shape::Mapping { len, head } if len <= INLINE_MAP_LEN => {
                let entries: Vec<String> = head
                    .iter()
                    .map(|(k, v)| format!("{}: {v}", self.paint(k, Color::Blue)))
                    .collect();
                ("mapping", format!("{tag} Map: {{{}}}", entries.join(", ")))
            }
            Shape::Mapping { len, head } => {
                let mut msg = format!("{tag} Map ({len} items):");
                for (k, v) in &head {
                    msg.push_str(&format!("\n  - {}: {v}", self.paint(k, Color::Blue)));
                }
                if len > PREVIEW_LEN {
                    msg.push_str(&format!("\n  ... and {} more items", len - PREVIEW_LEN));
                }
                ("mapping", msg)
            }
            Shape::Sequence { kind, len, head } => {
                let mut items = head.join(", ");
                if len > PREVIEW_LEN {
                    items.push_str(&format!(
                        "... ({} more, {len} total)",
                        len - PREVIEW_LEN
                    ));
                }
                let items = self.paint(&format!("[{items}]"), Color::Magenta);
                ("sequence", format!("{tag} {kind}: {items}"))
            }
            Shape::Number(n) => {
                let color = match n.signum() {
                    1 => Color::Green,
                    -1 => Color::Red,
                    _ => Color::Blue,
                };
                (
                    "number",
                    format!(
                        "{tag} Number: {}{}",
                        self.paint(&value.render(), color),
                        self.type_suffix(value)
                    ),
                )
            }
            Shape::Text(_) | Shape::Other(_) => (
                "other",
                format!(
                    "{tag} Value: {}{}",
                    value.render(),
                    self.type_suffix(value)
                ),
            ),
        }
    }

    fn emit(&self, level: Level, shape: &str, message: String) {
        self.config.sink.emit(
            LogRecord::new(level, &*self.config.name, message)
                .with_field("shape", shape)
                .with_field("count", self.count),
        );
    }
}

impl<T: Inspect + 'static> Handler<T> for RichHandler {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        self.count += 1;
        let (shape, message) = self.format(&value);
        self.emit(Level::Info, shape, message);
        downstream.next(value);
    }

    fn on_error(&mut self, error: &StreamError) {
        let message = format!(
            "{} {}",
            self.tag(),
            self.paint(
                &format!("ERROR: {}: {}", error.kind(), error.message()),
                Color::Red
            )
        );
        self.emit(Level::Error, "error", message);
    }

    fn on_completed(&mut self) {
        let message = format!(
            "{} {} after {} items",
            self.tag(),
            self.paint("COMPLETED", Color::Green),
            self.count
        );
        self.emit(Level::Success, "completed", message);
    }
}

impl<T: Inspect + 'static> Operator<T> for RichLogger {
    type Output = T;
    type Handler = RichHandler;

    fn handler(&self) -> Self::Handler {
        RichHandler {
            config: self.clone(),
            count: 0,
        }
    }
}
