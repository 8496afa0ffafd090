//! Generation of request IDs.
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Largest integer that survives a round trip through an IEEE 754 double, which is how many
/// JSON implementations represent numbers.
pub const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Source of the IDs assigned to outgoing requests.
///
/// Responses are correlated with requests by the HTTP exchange they arrive on, so IDs don't have to
/// be unique for correctness.  They do show up in server logs, which is why the default is random.
pub trait IdGenerator: Send + Sync + 'static {
    fn next_id(&self) -> u64;
}

impl<F> IdGenerator for F
where
    F: Fn() -> u64 + Send + Sync + 'static,
{
    fn next_id(&self) -> u64 {
        self()
    }
}

/// Random IDs in `1..=MAX_SAFE_INTEGER`
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> u64 {
        rand::random_range(1..=MAX_SAFE_INTEGER)
    }
}

/// Monotonically increasing IDs, starting from 1
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

/// Selects one of the built-in [`IdGenerator`]s from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    #[default]
    Random,
    Sequential,
}

impl IdStrategy {
    pub(crate) fn generator(self) -> Box<dyn IdGenerator> {
        match self {
            IdStrategy::Random => Box::new(RandomIds),
            IdStrategy::Sequential => Box::new(SequentialIds::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn random_ids_are_in_safe_range() {
        for _ in 0..1000 {
            let id = RandomIds.next_id();
            assert!((1..=MAX_SAFE_INTEGER).contains(&id));
        }
    }

    #[test]
    fn sequential_ids_increase() {
        let ids = SequentialIds::new();
        let first: Vec<_> = (0..5).map(|_| ids.next_id()).collect();
        assert_eq!(first, [1, 2, 3, 4, 5]);

        let ids = SequentialIds::starting_at(100);
        assert_eq!(ids.next_id(), 100);
        assert_eq!(ids.next_id(), 101);
    }

    #[test]
    fn closures_are_generators() {
        let fixed = || 7u64;
        assert_eq!(fixed.next_id(), 7);
    }

    #[test]
    fn strategy_from_string() {
        assert_eq!("random".parse::<IdStrategy>().unwrap(), IdStrategy::Random);
        assert_eq!("sequential".parse::<IdStrategy>().unwrap(), IdStrategy::Sequential);
        assert_eq!(IdStrategy::Sequential.to_string(), "sequential");

        let generator = IdStrategy::Sequential.generator();
        assert_eq!(generator.next_id(), 1);
        assert_eq!(generator.next_id(), 2);
    }
}
