//! Collects failures from a batch of concurrent units without letting one failure cancel its siblings.
//!
//! Every unit gets its own [`ErrorReporter`]. Once the caller has joined all units, [`ErrorCollector::finish`] drains the channel, which closes only after the last reporter is dropped, so no failure is lost to a unit that finished late.

use std::{
    error::Error,
    fmt::{self, Debug, Display},
    slice,
};

use tokio::sync::mpsc;

/// A single failure wrapping every failure reported by a batch of concurrent units.
///
/// No failure is dropped or ranked above another; [`Display`] lists all of them in the order they were reported.
#[derive(Debug)]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    /// The underlying failures, in the order they were reported.
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Consumes the aggregate and returns the underlying failures.
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }

    /// The number of underlying failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Whether there are no underlying failures. An aggregate built by [`ErrorCollector::finish`] is never empty.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Iterates over the underlying failures.
    pub fn iter(&self) -> slice::Iter<'_, E> {
        self.errors.iter()
    }
}

impl<'a, E> IntoIterator for &'a AggregateError<E> {
    type Item = &'a E;
    type IntoIter = slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<E: Display> Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, err) in self.errors.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        write!(f, "]")
    }
}

impl<E> Error for AggregateError<E> where E: Error {}

/// Hands out [`ErrorReporter`]s to concurrent units and merges whatever they report.
#[derive(Debug)]
pub struct ErrorCollector<E> {
    tx: mpsc::UnboundedSender<E>,
    rx: mpsc::UnboundedReceiver<E>,
}

impl<E> Default for ErrorCollector<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> ErrorCollector<E> {
    /// Creates an [`ErrorCollector`] with an unbounded channel.
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Creates a reporter for one concurrent unit.
    pub fn reporter(&self) -> ErrorReporter<E> {
        ErrorReporter {
            tx: self.tx.clone(),
        }
    }

    /// Waits for every outstanding [`ErrorReporter`] to be dropped and merges what was reported.
    ///
    /// Call this after joining the units. A reporter that is still alive keeps this future pending.
    ///
    /// # Errors
    ///
    /// Returns an [`AggregateError`] holding every reported failure if there was at least one.
    pub async fn finish(self) -> Result<(), AggregateError<E>> {
        let Self { tx, mut rx } = self;
        drop(tx);

        let mut errors = Vec::new();
        while let Some(err) = rx.recv().await {
            errors.push(err);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AggregateError { errors })
        }
    }
}

/// The sending half given to one concurrent unit.
#[derive(Debug)]
pub struct ErrorReporter<E> {
    tx: mpsc::UnboundedSender<E>,
}

impl<E> Clone for ErrorReporter<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<E> ErrorReporter<E> {
    /// Reports a failure. Never blocks.
    pub fn report(&self, err: E) {
        // Only fails if the collector was dropped without finishing, in which case nobody is listening.
        drop(self.tx.send(err));
    }
}
