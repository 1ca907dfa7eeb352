//! End-to-end fixture generation.
//!
//! Generates users, attributes orders to their ids and writes the orders
//! file, logging a summary of each stage.

use std::collections::BTreeMap;
use std::sync::Arc;

use camino::Utf8PathBuf;
use mockable::Clock;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::config::OrderFixturesSettings;
use crate::error::PipelineError;
use crate::order::{Order, OrderGenerator};
use crate::record_writer::{RecordWriter, split_output_path};
use crate::user::UserGenerator;

/// Result of a completed pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    /// Users generated.
    pub user_count: usize,
    /// Orders generated and written.
    pub order_count: usize,
    /// Orders written without a user id.
    pub unassigned_orders: usize,
    /// Users that received at least one order.
    pub ordering_users: usize,
    /// File the orders were written to.
    pub output_path: Utf8PathBuf,
    /// Size of the written file in bytes.
    pub bytes_written: usize,
}

/// Runs the full pipeline: users, orders, then the orders file.
///
/// # Errors
///
/// Returns [`PipelineError::Settings`] when the settings are rejected and
/// [`PipelineError::Write`] when the output cannot be written.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
///
/// use mockable::DefaultClock;
/// use order_fixtures::{OrderFixturesSettings, run_pipeline};
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let settings = OrderFixturesSettings {
///     user_count: 10,
///     order_count: 50,
///     ..OrderFixturesSettings::default()
/// };
/// let mut rng = ChaCha8Rng::seed_from_u64(1);
/// let outcome = run_pipeline(&settings, Arc::new(DefaultClock), &mut rng)
///     .expect("pipeline runs");
/// assert_eq!(outcome.order_count, 50);
/// ```
pub fn run_pipeline<R>(
    settings: &OrderFixturesSettings,
    clock: Arc<dyn Clock>,
    rng: &mut R,
) -> Result<PipelineOutcome, PipelineError>
where
    R: Rng,
{
    settings.validate()?;
    let output_path = settings.output_path();
    let (output_dir, file_name) = split_output_path(&output_path)?;

    let mut users = UserGenerator::new();
    let user_count = users.generate(rng, settings.user_count).len();
    info!(user_count, "users generated");

    let mut orders = OrderGenerator::new(clock).with_policy(settings.skew_policy());
    orders.set_user_id_list(users.id_list());
    let order_count = orders.generate(rng, settings.order_count).len();
    let unassigned_orders = orders.unassigned_count();
    info!(
        order_count,
        remaining_pool = orders.remaining_pool().len(),
        "orders generated"
    );
    if unassigned_orders > 0 {
        warn!(
            unassigned_orders,
            "candidate pool was empty; orders written without a user id"
        );
    }

    let histogram = order_count_histogram(orders.orders());
    log_skew_summary(&histogram);

    let writer = RecordWriter::open_ambient(&output_dir)?;
    let summary = writer.write(&file_name, orders.orders())?;
    info!(
        path = %output_path,
        rows = summary.rows,
        bytes = summary.bytes,
        "orders file written"
    );

    Ok(PipelineOutcome {
        user_count,
        order_count,
        unassigned_orders,
        ordering_users: histogram.len(),
        output_path,
        bytes_written: summary.bytes,
    })
}

/// Counts orders per user id, ignoring orders without one.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use order_fixtures::{Order, Subtotal, order_count_histogram};
///
/// let now = Utc::now();
/// let orders = [
///     Order::new(1, Some(7), 1, Subtotal::from_units(25), now),
///     Order::new(2, Some(7), 1, Subtotal::from_units(25), now),
///     Order::new(3, None, 1, Subtotal::from_units(25), now),
/// ];
///
/// let histogram = order_count_histogram(&orders);
/// assert_eq!(histogram.get(&7), Some(&2));
/// assert_eq!(histogram.len(), 1);
/// ```
#[must_use]
pub fn order_count_histogram(orders: &[Order]) -> BTreeMap<u64, usize> {
    let mut histogram = BTreeMap::new();
    for user_id in orders.iter().filter_map(Order::user_id) {
        *histogram.entry(user_id).or_insert(0) += 1;
    }
    histogram
}

fn log_skew_summary(histogram: &BTreeMap<u64, usize>) {
    let mut counts: Vec<usize> = histogram.values().copied().collect();
    counts.sort_unstable();
    let Some(max_orders) = counts.last().copied() else {
        return;
    };
    let median_orders = counts.get(counts.len().div_euclid(2)).copied().unwrap_or(0);
    let single_order_users = counts.iter().filter(|count| **count == 1).count();
    debug!(
        ordering_users = counts.len(),
        median_orders,
        max_orders,
        single_order_users,
        "order distribution"
    );
}
