//! ID generation utilities.

use ulid::Ulid;

/// Length of a ULID in its canonical string form.
pub const ID_LENGTH: usize = 26;

/// ID generator for store documents.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs sort by creation time, so documents keyed by them list in
    /// insertion order without a secondary index.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Whether `id` has the shape of an ID produced by [`Self::generate`].
    ///
    /// Path parameters are checked with this before they reach a store, so a
    /// malformed id resolves to "not found" instead of a database error.
    #[must_use]
    pub fn is_well_formed(id: &str) -> bool {
        id.len() == ID_LENGTH && Ulid::from_string(id).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ulid() {
        let id_gen = IdGenerator::new();
        let id1 = id_gen.generate();
        let id2 = id_gen.generate();

        assert_eq!(id1.len(), ID_LENGTH);
        assert_eq!(id2.len(), ID_LENGTH);
        assert_ne!(id1, id2);
        assert_eq!(id1, id1.to_lowercase());
    }

    #[test]
    fn test_generated_ids_are_well_formed() {
        let id_gen = IdGenerator::new();
        assert!(IdGenerator::is_well_formed(&id_gen.generate()));
    }

    #[test]
    fn test_malformed_ids_rejected() {
        assert!(!IdGenerator::is_well_formed(""));
        assert!(!IdGenerator::is_well_formed("not-an-id"));
        assert!(!IdGenerator::is_well_formed("64f0c2a9e4b0a1b2c3d4e5f6"));
        // Right length, but 'u' is outside the Crockford alphabet.
        assert!(!IdGenerator::is_well_formed("uuuuuuuuuuuuuuuuuuuuuuuuuu"));
    }
}
