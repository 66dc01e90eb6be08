//! Shape-aware views of emitted values.
//!
//! Logging operators never transform what flows through them, but several of them
//! render values differently depending on what the value looks like: a map is
//! printed key by key, a long sequence is summarized, a small number becomes a
//! marble. [`Inspect`] exposes that view as a closed set of [`Shape`]s so the
//! operators can `match` on it.
//!
//! Implementations are provided for the standard scalar, string, sequence and map
//! types. Custom types implement the trait by picking the closest shape:
//!
//! ```
//! use rxr_opkit::inspect::{Inspect, Shape};
//!
//! struct Reading {
//!     sensor: &'static str,
//!     celsius: f64,
//! }
//!
//! impl Inspect for Reading {
//!     fn shape(&self) -> Shape<'_> {
//!         Shape::Other(self.render())
//!     }
//!
//!     fn type_name(&self) -> &'static str {
//!         "Reading"
//!     }
//!
//!     fn render(&self) -> String {
//!         format!("{}={}C", self.sensor, self.celsius)
//!     }
//! }
//!
//! let r = Reading { sensor: "t1", celsius: 21.5 };
//! assert_eq!(r.render(), "t1=21.5C");
//! ```

use std::{
    collections::{BTreeMap, HashMap, VecDeque},
    sync::Arc,
};

/// Number of entries a collection shape carries for previews.
pub const PREVIEW_LEN: usize = 5;

/// A numeric value, widened so every primitive fits.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Number {
    Int(i128),
    Float(f64),
}

impl Number {
    /// Sign of the number: `1`, `-1` or `0`. `NaN` counts as zero.
    #[must_use]
    pub fn signum(self) -> i8 {
        match self {
            Number::Int(i) => i.signum() as i8,
            Number::Float(f) if f > 0.0 => 1,
            Number::Float(f) if f < 0.0 => -1,
            Number::Float(_) => 0,
        }
    }
}

/// The recognized categories of a value.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape<'a> {
    /// Key/value collection. `head` holds up to [`PREVIEW_LEN`] rendered entries.
    Mapping {
        len: usize,
        head: Vec<(String, String)>,
    },
    /// Ordered collection. `head` holds up to [`PREVIEW_LEN`] rendered items.
    Sequence {
        kind: &'static str,
        len: usize,
        head: Vec<String>,
    },
    Number(Number),
    Text(&'a str),
    /// Anything else, already rendered.
    Other(String),
}

/// Read-only, shape-aware access to a value for logging purposes.
pub trait Inspect {
    /// The category this value falls into.
    fn shape(&self) -> Shape<'_>;

    /// Short name of the value's type, e.g. `i32`, `String`, `Vec`.
    fn type_name(&self) -> &'static str;

    /// Full text representation of the value.
    fn render(&self) -> String;
}

/// Renders a value as an element of a collection: text is quoted, everything
/// else uses [`Inspect::render`].
pub fn render_item<T: Inspect + ?Sized>(value: &T) -> String {
    match value.shape() {
        Shape::Text(s) => format!("{s:?}"),
        _ => value.render(),
    }
}

fn sequence_shape<'a, T, I>(kind: &'static str, len: usize, items: I) -> Shape<'a>
where
    T: Inspect + 'a,
    I: Iterator<Item = &'a T>,
{
    Shape::Sequence {
        kind,
        len,
        head: items.take(PREVIEW_LEN).map(render_item).collect(),
    }
}

fn render_sequence<'a, T, I>(items: I) -> String
where
    T: Inspect + 'a,
    I: Iterator<Item = &'a T>,
{
    let items: Vec<String> = items.map(render_item).collect();
    format!("[{}]", items.join(", "))
}

fn mapping_shape<'a, K, V, I>(len: usize, entries: I) -> Shape<'a>
where
    K: Inspect + 'a,
    V: Inspect + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    Shape::Mapping {
        len,
        head: entries
            .take(PREVIEW_LEN)
            .map(|(k, v)| (render_item(k), render_item(v)))
            .collect(),
    }
}

fn render_mapping<'a, K, V, I>(entries: I) -> String
where
    K: Inspect + 'a,
    V: Inspect + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let entries: Vec<String> = entries
        .map(|(k, v)| format!("{}: {}", render_item(k), render_item(v)))
        .collect();
    format!("{{{}}}", entries.join(", "))
}

macro_rules! inspect_int {
    ($($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn shape(&self) -> Shape<'_> {
                    Shape::Number(Number::Int(i128::from(*self)))
                }

                fn type_name(&self) -> &'static str {
                    stringify!($t)
                }

                fn render(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

inspect_int!(i8, i16, i32, i64, i128, u8, u16, u32, u64);

impl Inspect for isize {
    fn shape(&self) -> Shape<'_> {
        Shape::Number(Number::Int(*self as i128))
    }

    fn type_name(&self) -> &'static str {
        "isize"
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Inspect for usize {
    fn shape(&self) -> Shape<'_> {
        Shape::Number(Number::Int(*self as i128))
    }

    fn type_name(&self) -> &'static str {
        "usize"
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

macro_rules! inspect_float {
    ($($t:ty),*) => {
        $(
            impl Inspect for $t {
                fn shape(&self) -> Shape<'_> {
                    Shape::Number(Number::Float(f64::from(*self)))
                }

                fn type_name(&self) -> &'static str {
                    stringify!($t)
                }

                // Debug keeps the trailing `.0` on whole floats.
                fn render(&self) -> String {
                    format!("{self:?}")
                }
            }
        )*
    };
}

inspect_float!(f32, f64);

impl Inspect for bool {
    fn shape(&self) -> Shape<'_> {
        Shape::Other(self.to_string())
    }

    fn type_name(&self) -> &'static str {
        "bool"
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Inspect for char {
    fn shape(&self) -> Shape<'_> {
        Shape::Other(self.to_string())
    }

    fn type_name(&self) -> &'static str {
        "char"
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Inspect for () {
    fn shape(&self) -> Shape<'_> {
        Shape::Other("()".to_string())
    }

    fn type_name(&self) -> &'static str {
        "()"
    }

    fn render(&self) -> String {
        "()".to_string()
    }
}

impl Inspect for str {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }

    fn type_name(&self) -> &'static str {
        "str"
    }

    fn render(&self) -> String {
        self.to_string()
    }
}

impl Inspect for String {
    fn shape(&self) -> Shape<'_> {
        Shape::Text(self)
    }

    fn type_name(&self) -> &'static str {
        "String"
    }

    fn render(&self) -> String {
        self.clone()
    }
}

impl<T: Inspect> Inspect for Option<T> {
    fn shape(&self) -> Shape<'_> {
        match self {
            Some(v) => v.shape(),
            None => Shape::Other("None".to_string()),
        }
    }

    fn type_name(&self) -> &'static str {
        "Option"
    }

    fn render(&self) -> String {
        match self {
            Some(v) => format!("Some({})", render_item(v)),
            None => "None".to_string(),
        }
    }
}

impl<T: Inspect> Inspect for [T] {
    fn shape(&self) -> Shape<'_> {
        sequence_shape("Slice", self.len(), self.iter())
    }

    fn type_name(&self) -> &'static str {
        "Slice"
    }

    fn render(&self) -> String {
        render_sequence(self.iter())
    }
}

impl<T: Inspect, const N: usize> Inspect for [T; N] {
    fn shape(&self) -> Shape<'_> {
        sequence_shape("Array", N, self.iter())
    }

    fn type_name(&self) -> &'static str {
        "Array"
    }

    fn render(&self) -> String {
        render_sequence(self.iter())
    }
}

impl<T: Inspect> Inspect for Vec<T> {
    fn shape(&self) -> Shape<'_> {
        sequence_shape("Vec", self.len(), self.iter())
    }

    fn type_name(&self) -> &'static str {
        "Vec"
    }

    fn render(&self) -> String {
        render_sequence(self.iter())
    }
}

impl<T: Inspect> Inspect for VecDeque<T> {
    fn shape(&self) -> Shape<'_> {
        sequence_shape("VecDeque", self.len(), self.iter())
    }

    fn type_name(&self) -> &'static str {
        "VecDeque"
    }

    fn render(&self) -> String {
        render_sequence(self.iter())
    }
}

impl<K: Inspect, V: Inspect, S> Inspect for HashMap<K, V, S> {
    fn shape(&self) -> Shape<'_> {
        mapping_shape(self.len(), self.iter())
    }

    fn type_name(&self) -> &'static str {
        "HashMap"
    }

    fn render(&self) -> String {
        render_mapping(self.iter())
    }
}

impl<K: Inspect, V: Inspect> Inspect for BTreeMap<K, V> {
    fn shape(&self) -> Shape<'_> {
        mapping_shape(self.len(), self.iter())
    }

    fn type_name(&self) -> &'static str {
        "BTreeMap"
    }

    fn render(&self) -> String {
        render_mapping(self.iter())
    }
}

impl<T: Inspect + ?Sized> Inspect for &T {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn render(&self) -> String {
        (**self).render()
    }
}

impl<T: Inspect + ?Sized> Inspect for Box<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn render(&self) -> String {
        (**self).render()
    }
}

impl<T: Inspect + ?Sized> Inspect for Arc<T> {
    fn shape(&self) -> Shape<'_> {
        (**self).shape()
    }

    fn type_name(&self) -> &'static str {
        (**self).type_name()
    }

    fn render(&self) -> String {
        (**self).render()
    }
}
