//! Synthetic user and order fixtures with a skewed order distribution.
//!
//! This crate generates a population of fictitious users and a larger set
//! of purchase orders attributed to them, then writes the orders to a
//! delimited text file. Orders are attributed through a candidate pool that
//! shrinks during the run, so most users end up with a handful of orders
//! while a minority place many.
//!
//! # Overview
//!
//! - [`UserGenerator`] builds users with sequential ids, pooled names and
//!   random emails
//! - [`OrderGenerator`] builds orders against a [`CandidatePool`] governed
//!   by a [`SkewPolicy`]
//! - [`RecordWriter`] writes uniform records atomically in the fixture
//!   format
//! - [`run_pipeline`] wires the three together from
//!   [`OrderFixturesSettings`]
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use mockable::DefaultClock;
//! use order_fixtures::{OrderGenerator, UserGenerator, render_records};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let mut users = UserGenerator::new();
//! users.generate(&mut rng, 20);
//!
//! let mut orders = OrderGenerator::new(Arc::new(DefaultClock));
//! orders.set_user_id_list(users.id_list());
//! orders.generate(&mut rng, 100);
//!
//! let text = render_records(orders.orders()).expect("orders render");
//! assert!(text.starts_with(
//!     "\"id\", \"userId\", \"orderQty\", \"subtotal\", \"date\", \"timestamp\",\n"
//! ));
//! assert_eq!(text.lines().count(), 101);
//! ```

mod atomic_io;
mod config;
mod error;
mod order;
mod pipeline;
mod pool;
mod record_writer;
mod user;

pub use config::{
    DEFAULT_ORDER_COUNT, DEFAULT_OUTPUT_PATH, DEFAULT_USER_COUNT, OrderFixturesSettings,
};
pub use error::{PipelineError, SettingsError, WriteError};
pub use order::{
    MAX_ORDER_QTY, MAX_UNIT_PRICE, MIN_ORDER_QTY, MIN_UNIT_PRICE, ORDER_WINDOW_DAYS, Order,
    OrderGenerator, Subtotal,
};
pub use pipeline::{PipelineOutcome, order_count_histogram, run_pipeline};
pub use pool::{CandidatePool, DEFAULT_RETENTION_FLOOR, SkewPolicy};
pub use record_writer::{RecordWriter, WriteSummary, render_records, split_output_path};
pub use user::{FIRST_NAMES, LAST_NAMES, User, UserGenerator};
