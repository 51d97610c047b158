use crate::generator::Generator;
use std::sync::atomic::{AtomicU64, Ordering};

/// Sequential identifier generator.
///
/// Produces ids like "bk000000", "bk000001", etc. Ids are unique within a
/// single instance; processes sharing a database need distinct prefixes.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self::with_offset(prefix, 0)
    }

    /// Creates a generator whose first id is `offset`.
    ///
    /// Useful for resuming from a known state.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
            prefix: prefix.into(),
        }
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> String {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}{:06}", self.prefix, count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn produces_sequential_ids() {
        let generator = SeqGenerator::with_prefix("bk");

        assert_eq!(generator.generate(), "bk000000");
        assert_eq!(generator.generate(), "bk000001");
        assert_eq!(generator.generate(), "bk000002");
    }

    #[test]
    fn starts_from_offset() {
        let generator = SeqGenerator::with_offset("rm", 1000);

        assert_eq!(generator.generate(), "rm001000");
        assert_eq!(generator.generate(), "rm001001");
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SeqGenerator>();
    }

    #[test]
    fn clone_preserves_counter_state() {
        let generator = SeqGenerator::with_prefix("bk");
        generator.generate();
        generator.generate();

        let cloned = generator.clone();

        assert_eq!(generator.generate(), "bk000002");
        assert_eq!(cloned.generate(), "bk000002");
    }
}
