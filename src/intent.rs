#[cfg(test)]
#[path = "intent_test.rs"]
mod intent_test;

/// A one-shot request slot: the producer files a request, the consumer takes
/// it exactly once. A newer request replaces one that was never consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Intake<T> {
    pending: Option<T>,
}

impl<T> Default for Intake<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> Intake<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// File a request, replacing any unconsumed one.
    pub fn request(&mut self, value: T) {
        self.pending = Some(value);
    }

    /// Take the pending request, leaving the slot empty.
    pub fn consume(&mut self) -> Option<T> {
        self.pending.take()
    }

    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
