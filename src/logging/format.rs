//! Text helpers shared by the logging operators.

use crate::inspect::{Inspect, Shape, PREVIEW_LEN};
use crate::sink::{contained, Level, LogRecord, LogSink};

use super::Formatter;

/// Longest text the default formatter prints before truncating.
pub const MAX_TEXT_LEN: usize = 100;

/// The formatter [`CounterLogger`](super::CounterLogger) uses when none is
/// configured.
///
/// Maps and sequences longer than [`PREVIEW_LEN`] show their first entries and a
/// note with the omitted and total counts. Anything else is rendered in full and
/// cut to [`MAX_TEXT_LEN`] characters.
///
/// ```
/// use rxr_opkit::logging::default_format;
///
/// assert_eq!(default_format(&vec![1, 2, 3]), "[1, 2, 3]");
/// assert_eq!(
///     default_format(&(1..=8).collect::<Vec<u8>>()),
///     "[1, 2, 3, 4, 5] ... (3 more, 8 items)"
/// );
/// ```
pub fn default_format<T: Inspect + ?Sized>(value: &T) -> String {
    match value.shape() {
        Shape::Mapping { len, head } if len > PREVIEW_LEN => {
            let entries: Vec<String> = head.iter().map(|(k, v)| format!("{k}: {v}")).collect();
            format!(
                "{{{}}} ... ({} more, {} items)",
                entries.join(", "),
                len - PREVIEW_LEN,
                len
            )
        }
        Shape::Sequence { len, head, .. } if len > PREVIEW_LEN => format!(
            "[{}] ... ({} more, {} items)",
            head.join(", "),
            len - PREVIEW_LEN,
            len
        ),
        _ => truncate(&value.render(), MAX_TEXT_LEN),
    }
}

/// Cuts `text` to `max` characters, the last three being `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// Formats `value` with `formatter`, or [`default_format`] when there is none.
///
/// A formatter that fails or panics is reported at debug level and yields
/// `None`.
pub(crate) fn format_value<T: Inspect>(
    formatter: Option<&Formatter<T>>,
    value: &T,
    sink: &dyn LogSink,
    operator: &str,
) -> Option<String> {
    let Some(f) = formatter else {
        return Some(default_format(value));
    };
    match contained(sink, operator, "formatter", || f(value))? {
        Ok(text) => Some(text),
        Err(e) => {
            sink.emit(
                LogRecord::new(Level::Debug, operator, format!("formatter failed: {e}"))
                    .with_field("side_effect", "formatter"),
            );
            None
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Color {
    Yellow,
    Blue,
    Magenta,
    Green,
    Red,
    Dim,
}

impl Color {
    fn code(self) -> &'static str {
        match self {
            Color::Yellow => "33",
            Color::Blue => "34",
            Color::Magenta => "35",
            Color::Green => "32",
            Color::Red => "31",
            Color::Dim => "2",
        }
    }
}

/// Wraps `text` in ANSI color codes when `enabled`.
pub(crate) fn paint(text: &str, color: Color, enabled: bool) -> String {
    if enabled {
        format!("\x1b[{}m{text}\x1b[0m", color.code())
    } else {
        text.to_string()
    }
}
