//! Random table aliases for key/value joins.

use std::collections::HashSet;

use rand::{rngs::SmallRng, Rng, SeedableRng};
use tracing::trace;

pub const ALIAS_PREFIX: &str = "m_";
pub const DEFAULT_ALIAS_LENGTH: usize = 8;
pub const MIN_ALIAS_LENGTH: usize = 3;

const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";

/// Issues aliases of the form `m_` followed by lowercase letters.
///
/// Every alias issued by one generator is distinct.
pub struct AliasGenerator {
    rng: SmallRng,
    length: usize,
    issued: HashSet<String>,
}

impl AliasGenerator {
    pub fn new(length: usize) -> Self {
        Self::with_rng(SmallRng::from_entropy(), length)
    }

    /// Deterministic generator, for reproducible SQL text.
    pub fn seeded(length: usize, seed: u64) -> Self {
        Self::with_rng(SmallRng::seed_from_u64(seed), length)
    }

    fn with_rng(rng: SmallRng, length: usize) -> Self {
        Self {
            rng,
            length: length.max(MIN_ALIAS_LENGTH),
            issued: HashSet::new(),
        }
    }

    pub fn next_alias(&mut self) -> String {
        loop {
            let letters: String = (0..self.length)
                .map(|_| ALPHABET[self.rng.gen_range(0..ALPHABET.len())] as char)
                .collect();
            let alias = format!("{ALIAS_PREFIX}{letters}");
            if self.issued.insert(alias.clone()) {
                trace!("issued join alias {alias}");
                return alias;
            }
        }
    }

    pub fn issued(&self) -> usize {
        self.issued.len()
    }
}

impl Default for AliasGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ALIAS_LENGTH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_shape() {
        let mut aliases = AliasGenerator::default();
        let alias = aliases.next_alias();
        assert!(alias.starts_with(ALIAS_PREFIX));
        assert_eq!(alias.len(), ALIAS_PREFIX.len() + DEFAULT_ALIAS_LENGTH);
        assert!(alias[ALIAS_PREFIX.len()..]
            .chars()
            .all(|c| c.is_ascii_lowercase()));
    }

    #[test]
    fn test_minimum_length() {
        let mut aliases = AliasGenerator::new(1);
        assert_eq!(aliases.next_alias().len(), ALIAS_PREFIX.len() + MIN_ALIAS_LENGTH);
    }

    #[test]
    fn test_aliases_are_distinct() {
        // 26^3 combinations, so a few thousand draws will certainly collide
        // at least once without the issued set.
        let mut aliases = AliasGenerator::seeded(3, 42);
        let drawn: HashSet<String> = (0..5000).map(|_| aliases.next_alias()).collect();
        assert_eq!(drawn.len(), 5000);
        assert_eq!(aliases.issued(), 5000);
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = AliasGenerator::seeded(8, 7);
        let mut b = AliasGenerator::seeded(8, 7);
        assert_eq!(a.next_alias(), b.next_alias());
    }
}
