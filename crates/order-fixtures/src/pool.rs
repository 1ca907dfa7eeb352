//! Shrinking candidate pool used to attribute orders to users.
//!
//! Each order draws a user id uniformly from the pool. While the pool is
//! still large, a drawn id is retired with some probability, so users that
//! were drawn early tend to drop out and the remaining ones soak up later
//! orders. The result is an approximately geometric spread of order counts
//! per user instead of a flat one.

use rand::Rng;

use crate::error::SettingsError;

/// Pool size at or above which drawn ids may be retired.
pub const DEFAULT_RETENTION_FLOOR: usize = 150;

/// Numerator of the default retirement probability (one half).
const DEFAULT_REMOVAL_NUMERATOR: u32 = 1;

/// Denominator of the default retirement probability.
const DEFAULT_REMOVAL_DENOMINATOR: u32 = 2;

/// Controls how quickly the candidate pool shrinks.
///
/// # Example
///
/// ```
/// use order_fixtures::SkewPolicy;
///
/// let policy = SkewPolicy::default();
/// assert_eq!(policy.retention_floor(), 150);
/// assert!(SkewPolicy::new(150, 3, 2).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkewPolicy {
    retention_floor: usize,
    removal_numerator: u32,
    removal_denominator: u32,
}

impl SkewPolicy {
    /// Builds a policy retiring drawn ids with probability
    /// `removal_numerator / removal_denominator` while the pool holds at
    /// least `retention_floor` entries.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidSkewPolicy`] when the ratio is not a
    /// probability.
    pub fn new(
        retention_floor: usize,
        removal_numerator: u32,
        removal_denominator: u32,
    ) -> Result<Self, SettingsError> {
        if removal_denominator == 0 || removal_numerator > removal_denominator {
            return Err(SettingsError::InvalidSkewPolicy {
                numerator: removal_numerator,
                denominator: removal_denominator,
            });
        }
        Ok(Self {
            retention_floor,
            removal_numerator,
            removal_denominator,
        })
    }

    /// Returns the policy with a different retention floor.
    #[must_use]
    pub const fn with_retention_floor(self, retention_floor: usize) -> Self {
        Self {
            retention_floor,
            ..self
        }
    }

    /// Returns the pool size at or above which retirement applies.
    #[must_use]
    pub const fn retention_floor(&self) -> usize {
        self.retention_floor
    }

    /// Returns the retirement probability as `(numerator, denominator)`.
    #[must_use]
    pub const fn removal_ratio(&self) -> (u32, u32) {
        (self.removal_numerator, self.removal_denominator)
    }
}

impl Default for SkewPolicy {
    fn default() -> Self {
        Self {
            retention_floor: DEFAULT_RETENTION_FLOOR,
            removal_numerator: DEFAULT_REMOVAL_NUMERATOR,
            removal_denominator: DEFAULT_REMOVAL_DENOMINATOR,
        }
    }
}

/// Working copy of user ids that shrinks as orders are attributed.
///
/// The pool owns its ids; callers hand it a copy of the user id list at the
/// start of a generation run and keep drawing from the same instance until
/// the run ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    ids: Vec<u64>,
    policy: SkewPolicy,
}

impl CandidatePool {
    /// Creates a pool over `ids`.
    #[must_use]
    pub const fn new(ids: Vec<u64>, policy: SkewPolicy) -> Self {
        Self { ids, policy }
    }

    /// Draws one id uniformly and applies the retirement step.
    ///
    /// Returns `None` when the pool is empty. When the pool holds at least
    /// the retention floor, the drawn entry is removed with the policy's
    /// probability. Only that single entry is removed, so other occurrences
    /// of the same id stay eligible.
    ///
    /// # Example
    ///
    /// ```
    /// use order_fixtures::{CandidatePool, SkewPolicy};
    /// use rand::SeedableRng;
    /// use rand_chacha::ChaCha8Rng;
    ///
    /// let mut rng = ChaCha8Rng::seed_from_u64(1);
    /// let mut pool = CandidatePool::new(vec![7, 8, 9], SkewPolicy::default());
    ///
    /// let drawn = pool.draw(&mut rng);
    /// assert!(matches!(drawn, Some(7..=9)));
    /// // Below the retention floor nothing is retired.
    /// assert_eq!(pool.len(), 3);
    /// ```
    pub fn draw<R>(&mut self, rng: &mut R) -> Option<u64>
    where
        R: Rng,
    {
        if self.ids.is_empty() {
            return None;
        }
        let index = rng.random_range(0..self.ids.len());
        let id = self.ids.get(index).copied()?;

        if self.ids.len() >= self.policy.retention_floor {
            let (numerator, denominator) = self.policy.removal_ratio();
            if rng.random_ratio(numerator, denominator) {
                self.ids.remove(index);
            }
        }
        Some(id)
    }

    /// Returns the number of ids still eligible.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` when no ids remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the remaining ids in pool order.
    #[must_use]
    pub fn as_slice(&self) -> &[u64] {
        &self.ids
    }

    /// Returns the policy driving this pool.
    #[must_use]
    pub const fn policy(&self) -> SkewPolicy {
        self.policy
    }

    /// Consumes the pool, returning the remaining ids.
    #[must_use]
    pub fn into_ids(self) -> Vec<u64> {
        self.ids
    }
}
