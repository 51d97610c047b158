use crate::generator::Generator;
use ulid::Ulid;

/// Generates prefixed ULIDs, e.g. `bk_01HZX3J4Q9M8V7W6T5S4R3P2N1`.
///
/// ULIDs sort by creation time and need no coordination between processes.
#[derive(Debug, Clone)]
pub struct UlidGenerator {
    prefix: String,
}

impl UlidGenerator {
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Generator for UlidGenerator {
    fn generate(&self) -> String {
        format!("{}_{}", self.prefix, Ulid::new())
    }
}
