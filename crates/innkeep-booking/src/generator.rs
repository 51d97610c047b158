pub mod seq;
pub mod ulid;

/// Trait for generating record identifiers.
///
/// Implementations are pure generators that don't interact with storage.
/// Each call must return a value never returned before by the same
/// generator; the repositories reject duplicates.
pub trait Generator: Send + Sync + 'static {
    fn generate(&self) -> String;
}
