// src/utils/random.rs
//! Randomness collaborator and credential id formatting.

use rand::Rng;
use uuid::Builder;

/// Source of 128-bit random values for credential ids.
pub trait RandomSource: Send {
    fn next_u128(&mut self) -> u128;
}

/// Draws from the thread-local CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_u128(&mut self) -> u128 {
        rand::thread_rng().gen()
    }
}

/// Replays a fixed sequence of values, cycling when exhausted.
///
/// For hosts that inject their own entropy and for deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedRandomSource {
    values: Vec<u128>,
    next: usize,
}

impl FixedRandomSource {
    /// An empty `values` list yields zero on every draw.
    pub fn new(values: Vec<u128>) -> Self {
        FixedRandomSource { values, next: 0 }
    }
}

impl RandomSource for FixedRandomSource {
    fn next_u128(&mut self) -> u128 {
        if self.values.is_empty() {
            return 0;
        }
        let value = self.values[self.next % self.values.len()];
        self.next = self.next.wrapping_add(1);
        value
    }
}

/// Formats 128 random bits as a canonical version-4 UUID string.
///
/// The version and variant bits are overwritten, leaving 122 random bits.
pub fn credential_id(random: u128) -> String {
    Builder::from_random_bytes(random.to_be_bytes())
        .into_uuid()
        .hyphenated()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_id_is_canonical_v4() {
        let id = credential_id(0);
        assert_eq!(id, "00000000-0000-4000-8000-000000000000");

        let parsed = uuid::Uuid::parse_str(&credential_id(u128::MAX)).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
    }

    #[test]
    fn test_fixed_source_cycles() {
        let mut source = FixedRandomSource::new(vec![1, 2]);
        let drawn: Vec<u128> = (0..5).map(|_| source.next_u128()).collect();
        assert_eq!(drawn, vec![1, 2, 1, 2, 1]);

        assert_eq!(FixedRandomSource::new(Vec::new()).next_u128(), 0);
    }

    #[test]
    fn test_thread_rng_ids_differ() {
        let mut source = ThreadRngSource;
        assert_ne!(
            credential_id(source.next_u128()),
            credential_id(source.next_u128())
        );
    }
}
