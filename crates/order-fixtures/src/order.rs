//! Synthetic order generation.
//!
//! Orders are attributed to users through a [`CandidatePool`] that shrinks
//! over the course of one generation run. Quantities, prices and purchase
//! times are drawn independently for every order.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, SubsecRound, TimeDelta, Utc};
use mockable::Clock;
use rand::Rng;
use serde::{Serialize, Serializer};

use crate::pool::{CandidatePool, SkewPolicy};

/// Smallest quantity an order can carry.
pub const MIN_ORDER_QTY: u32 = 1;

/// Largest quantity an order can carry.
pub const MAX_ORDER_QTY: u32 = 10;

/// Smallest per-unit price, in whole currency units.
pub const MIN_UNIT_PRICE: u32 = 25;

/// Largest per-unit price, in whole currency units.
pub const MAX_UNIT_PRICE: u32 = 125;

/// Width of the purchase window ending at generation time.
pub const ORDER_WINDOW_DAYS: i64 = 2 * 365;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1_000;

const CENTS_PER_UNIT: u64 = 100;

/// A monetary amount held as integer cents.
///
/// Displays and serializes with exactly two decimal places, so the value
/// lands in the output file as a quoted string such as `"125.00"`.
///
/// # Example
///
/// ```
/// use order_fixtures::Subtotal;
///
/// let subtotal = Subtotal::from_units(125);
/// assert_eq!(subtotal.to_string(), "125.00");
/// assert_eq!(Subtotal::from_cents(1_205).to_string(), "12.05");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Subtotal {
    cents: u64,
}

impl Subtotal {
    /// Creates a subtotal from integer cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Creates a subtotal from whole currency units.
    #[must_use]
    pub const fn from_units(units: u64) -> Self {
        Self {
            cents: units.saturating_mul(CENTS_PER_UNIT),
        }
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.cents
    }
}

impl fmt::Display for Subtotal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let units = self.cents.div_euclid(CENTS_PER_UNIT);
        let cents = self.cents.rem_euclid(CENTS_PER_UNIT);
        write!(f, "{units}.{cents:02}")
    }
}

impl Serialize for Subtotal {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

/// A generated order record.
///
/// Field order matters: it is the column order of the written file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    id: u64,
    user_id: Option<u64>,
    order_qty: u32,
    subtotal: Subtotal,
    date: DateTime<Utc>,
    timestamp: i64,
}

impl Order {
    /// Builds an order, deriving `timestamp` from `date`.
    ///
    /// `date` is truncated to millisecond precision so the two fields always
    /// describe the same instant.
    #[must_use]
    pub fn new(
        id: u64,
        user_id: Option<u64>,
        order_qty: u32,
        subtotal: Subtotal,
        date: DateTime<Utc>,
    ) -> Self {
        let instant = date.trunc_subsecs(3);
        Self {
            id,
            user_id,
            order_qty,
            subtotal,
            date: instant,
            timestamp: instant.timestamp_millis(),
        }
    }

    /// Returns the sequential order id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Returns the purchasing user's id, if one was available.
    #[must_use]
    pub const fn user_id(&self) -> Option<u64> {
        self.user_id
    }

    /// Returns the ordered quantity.
    #[must_use]
    pub const fn order_qty(&self) -> u32 {
        self.order_qty
    }

    /// Returns the order subtotal.
    #[must_use]
    pub const fn subtotal(&self) -> Subtotal {
        self.subtotal
    }

    /// Returns the purchase instant.
    #[must_use]
    pub const fn date(&self) -> DateTime<Utc> {
        self.date
    }

    /// Returns the purchase instant as epoch milliseconds.
    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }
}

/// Produces batches of [`Order`] records attributed to a user id list.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use order_fixtures::OrderGenerator;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(9);
/// let mut generator = OrderGenerator::new(Arc::new(DefaultClock));
/// generator.set_user_id_list(vec![1, 2, 3]);
///
/// let orders = generator.generate(&mut rng, 4);
/// assert_eq!(orders.len(), 4);
/// assert!(orders.iter().all(|order| order.user_id().is_some()));
/// ```
pub struct OrderGenerator {
    clock: Arc<dyn Clock>,
    policy: SkewPolicy,
    user_ids: Vec<u64>,
    orders: Vec<Order>,
    remaining_pool: Vec<u64>,
}

impl fmt::Debug for OrderGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderGenerator")
            .field("policy", &self.policy)
            .field("user_ids", &self.user_ids.len())
            .field("orders", &self.orders.len())
            .field("remaining_pool", &self.remaining_pool.len())
            .finish_non_exhaustive()
    }
}

impl OrderGenerator {
    /// Creates a generator reading the current time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            policy: SkewPolicy::default(),
            user_ids: Vec::new(),
            orders: Vec::new(),
            remaining_pool: Vec::new(),
        }
    }

    /// Replaces the skew policy applied to the candidate pool.
    #[must_use]
    pub fn with_policy(mut self, policy: SkewPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the user ids that later calls to [`Self::generate`] draw from.
    pub fn set_user_id_list(&mut self, user_ids: Vec<u64>) {
        self.user_ids = user_ids;
    }

    /// Generates exactly `count` orders with ids `1..=count`.
    ///
    /// Every call starts from a fresh copy of the user id list and shrinks
    /// it in place for the rest of the call. When the list is empty, orders
    /// are still produced but carry no user id; see
    /// [`Self::unassigned_count`]. The current time is read once and bounds
    /// the purchase window for the whole batch.
    pub fn generate<R>(&mut self, rng: &mut R, count: usize) -> &[Order]
    where
        R: Rng,
    {
        let window_end = self.clock.utc().trunc_subsecs(3);
        let mut pool = CandidatePool::new(self.user_ids.clone(), self.policy);
        let mut orders = Vec::with_capacity(count);

        for id in (1..).take(count) {
            orders.push(generate_single_order(rng, &mut pool, window_end, id));
        }

        self.orders = orders;
        self.remaining_pool = pool.into_ids();
        &self.orders
    }

    /// Returns the most recently generated orders.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Consumes the generator, returning its orders.
    #[must_use]
    pub fn into_orders(self) -> Vec<Order> {
        self.orders
    }

    /// Returns the candidate ids left over after the last run.
    #[must_use]
    pub fn remaining_pool(&self) -> &[u64] {
        &self.remaining_pool
    }

    /// Returns how many orders in the last run have no user id.
    #[must_use]
    pub fn unassigned_count(&self) -> usize {
        self.orders
            .iter()
            .filter(|order| order.user_id.is_none())
            .count()
    }
}

fn generate_single_order<R>(
    rng: &mut R,
    pool: &mut CandidatePool,
    window_end: DateTime<Utc>,
    id: u64,
) -> Order
where
    R: Rng,
{
    let order_qty = rng.random_range(MIN_ORDER_QTY..=MAX_ORDER_QTY);
    let unit_price = rng.random_range(MIN_UNIT_PRICE..=MAX_UNIT_PRICE);
    let subtotal = Subtotal::from_units(u64::from(order_qty) * u64::from(unit_price));
    let user_id = pool.draw(rng);
    let date = random_date(rng, window_end);

    Order::new(id, user_id, order_qty, subtotal, date)
}

/// Draws an instant uniformly from `[window_end - window, window_end]`.
fn random_date<R>(rng: &mut R, window_end: DateTime<Utc>) -> DateTime<Utc>
where
    R: Rng,
{
    let offset_ms = rng.random_range(0..=ORDER_WINDOW_DAYS * MILLIS_PER_DAY);
    window_end - TimeDelta::milliseconds(offset_ms)
}
