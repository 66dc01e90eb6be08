use std::sync::Arc;

use crate::errors::{ConfigError, StreamError};
use crate::inspect::{Inspect, Number, Shape};
use crate::operator::{Emitter, Handler, Operator};
use crate::sink::{default_sink, Level, LogRecord, LogSink};

/// Timeline width used by [`MarbleLogger::new`].
pub const DEFAULT_WIDTH: usize = 40;

const LABEL_WIDTH: usize = 15;

/// Draws the stream as an ASCII marble diagram, one line per event.
///
/// The timeline has a fixed number of columns. Event number `k` (counting from
/// zero) is drawn in column `k % width`, so once the timeline is full every new
/// event overwrites the oldest one and the most recent event always sits in
/// column `(events - 1) % width`.
///
/// ```text
///          source: 123-------------------------------------
///          source: 123|------------------------------------ (COMPLETED)
/// ```
///
/// Symbols: numbers in `-9..=9` print as the digit of their magnitude, text as
/// its first letter upper-cased, errors as `X`, completion as `|`, and anything
/// else as `•`.
#[derive(Clone)]
pub struct MarbleLogger {
    name: String,
    width: usize,
    sink: Arc<dyn LogSink>,
}

impl MarbleLogger {
    pub fn new(name: impl Into<String>) -> Self {
        MarbleLogger {
            name: name.into(),
            width: DEFAULT_WIDTH,
            sink: default_sink(),
        }
    }

    /// Sets the number of timeline columns.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroWidth`] if `width` is zero.
    pub fn with_width(mut self, width: usize) -> Result<Self, ConfigError> {
        if width == 0 {
            return Err(ConfigError::ZeroWidth);
        }
        self.width = width;
        Ok(self)
    }

    #[must_use]
    pub fn with_sink(mut self, sink: impl LogSink + 'static) -> Self {
        self.sink = Arc::new(sink);
        self
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }
}

/// The symbol a value is drawn with.
pub fn marble_symbol<T: Inspect + ?Sized>(value: &T) -> char {
    let digit = |magnitude: u32| char::from_digit(magnitude, 10);
    let symbol = match value.shape() {
        Shape::Number(Number::Int(i)) if (-9..=9).contains(&i) => digit(i.unsigned_abs() as u32),
        Shape::Number(Number::Float(f)) if (-9.0..=9.0).contains(&f) => {
            digit(f.trunc().abs() as u32)
        }
        Shape::Text(s) => s.chars().next().and_then(|c| c.to_uppercase().next()),
        _ => None,
    };
    symbol.unwrap_or('•')
}

pub struct MarbleHandler {
    config: MarbleLogger,
    slots: Vec<char>,
    events: usize,
}

impl MarbleHandler {
    fn line(&self) -> String {
        let timeline: String = self.slots.iter().collect();
        format!(
            "{:>width$}: {timeline}",
            self.config.name,
            width = LABEL_WIDTH
        )
    }

    fn emit(&self, event: &str, suffix: Option<String>) {
        let mut message = self.line();
        if let Some(suffix) = suffix {
            message.push_str(&format!(" ({suffix})"));
        }
        self.config.sink.emit(
            LogRecord::new(Level::Info, &*self.config.name, message)
                .with_field("event", event)
                .with_field("events", self.events),
        );
    }

    fn push(&mut self, symbol: char) {
        let column = self.events % self.config.width;
        self.slots[column] = symbol;
        self.events += 1;
    }
}

impl<T: Inspect + 'static> Handler<T> for MarbleHandler {
    type Output = T;

    fn on_next(&mut self, value: T, downstream: &mut Emitter<'_, T>) {
        self.push(marble_symbol(&value));
        self.emit("on_next", None);
        downstream.next(value);
    }

    fn on_error(&mut self, error: &StreamError) {
        self.push('X');
        self.emit("on_error", Some(format!("ERROR: {}", error.kind())));
    }

    fn on_completed(&mut self) {
        self.push('|');
        self.emit("on_completed", Some("COMPLETED".to_string()));
    }
}

impl<T: Inspect + 'static> Operator<T> for MarbleLogger {
    type Output = T;
    type Handler = MarbleHandler;

    /// Builds the handler and logs the empty `(START)` timeline.
    fn handler(&self) -> Self::Handler {
        let handler = MarbleHandler {
            config: self.clone(),
            slots: vec!['-'; self.width],
            events: 0,
        };
        handler.emit("start", Some("START".to_string()));
        handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observable::{Observable, ObservableExt};
    use crate::sink::MemorySink;
    use crate::subscription::subscribe::{Subscribeable, Subscriber};

    #[test]
    fn symbols_by_shape() {
        assert_eq!(marble_symbol(&7u8), '7');
        assert_eq!(marble_symbol(&-3i64), '3');
        assert_eq!(marble_symbol(&4.9f64), '4');
        assert_eq!(marble_symbol(&10), '•');
        assert_eq!(marble_symbol("apple"), 'A');
        assert_eq!(marble_symbol(""), '•');
        assert_eq!(marble_symbol(&vec![1]), '•');
    }

    #[test]
    fn zero_width_is_rejected() {
        assert!(matches!(
            MarbleLogger::new("m").with_width(0),
            Err(ConfigError::ZeroWidth)
        ));
    }

    #[test]
    fn draws_start_values_and_completion() {
        let sink = MemorySink::new();
        let logger = MarbleLogger::new("nums")
            .with_width(6)
            .expect("valid width")
            .with_sink(sink.clone());

        Observable::from_iter(vec![1, 2, 3])
            .pipe(logger)
            .subscribe(Subscriber::on_next(|_| {}));

        assert_eq!(
            sink.messages(),
            vec![
                "           nums: ------ (START)",
                "           nums: 1-----",
                "           nums: 12----",
                "           nums: 123---",
                "           nums: 123|-- (COMPLETED)",
            ]
        );
    }

    #[test]
    fn error_suffix_names_the_kind() {
        let sink = MemorySink::new();
        Observable::from_iter(vec!["9", "x"])
            .try_map(|s: &str| s.parse::<u8>())
            .pipe(MarbleLogger::new("parse").with_sink(sink.clone()))
            .subscribe(Subscriber::on_next(|_| {}));

        let last = sink.messages().pop().unwrap_or_default();
        assert!(last.starts_with("          parse: 9X---"));
        assert!(last.ends_with(" (ERROR: ParseIntError)"));
    }
}
