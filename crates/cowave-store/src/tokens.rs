use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Issues monotonically increasing request tokens.
///
/// Callers take a token before dispatching a `*Loading` action and attach it
/// to the matching completion; the reducer uses it to discard responses that
/// a newer load for the same slot has since superseded.
#[derive(Debug, Clone, Default)]
pub struct RequestTokens {
    next: Arc<AtomicU64>,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed) + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase() {
        let tokens = RequestTokens::new();
        let a = tokens.next();
        let b = tokens.next();
        assert!(b > a);
    }

    #[test]
    fn clones_share_the_sequence() {
        let tokens = RequestTokens::new();
        let clone = tokens.clone();
        let a = tokens.next();
        let b = clone.next();
        assert!(b > a);
    }
}
