//! Helpers for building [`std::fmt`] implementations out of closures.
use std::fmt::{Debug, Display, Formatter, Result};

struct WithFormatter<F>(F);

impl<F: Fn(&mut Formatter<'_>) -> Result> Display for WithFormatter<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        (self.0)(f)
    }
}

impl<F: Fn(&mut Formatter<'_>) -> Result> Debug for WithFormatter<F> {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        (self.0)(f)
    }
}

/// Wraps a closure writing to a [`Formatter`] into a value implementing [`Display`] and [`Debug`].
pub(crate) fn fmt_closure<F: Fn(&mut Formatter<'_>) -> Result>(closure: F) -> impl Display + Debug {
    WithFormatter(closure)
}

/// Formats the items of a freshly created iterator as a debug list.
pub(crate) fn fmt_list<I: IntoIterator<Item = impl Debug>>(
    get_iter: impl Fn() -> I,
) -> impl Display + Debug {
    fmt_closure(move |f| f.debug_list().entries(get_iter()).finish())
}
