//! Synthetic user generation.
//!
//! Users carry sequential identifiers, a first and last name drawn from
//! fixed pools, and a throwaway email address made of random lowercase
//! letter runs. The generator keeps the last batch so the order stage can
//! take its identifier list.

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;

/// First names available to generated users.
pub const FIRST_NAMES: [&str; 20] = [
    "martin", "nicholas", "josh", "harold", "john", "george", "james", "chris", "howard", "walter",
    "genie", "susan", "meagan", "jessica", "britney", "molly", "jane", "lita", "katie", "lynn",
];

/// Last names available to generated users.
pub const LAST_NAMES: [&str; 5] = ["sweeny", "fried", "aitkins", "hoffmann", "whatever"];

/// Longest run of letters in the local part and the domain of an email.
const EMAIL_SEGMENT_MAX: usize = 12;

/// Longest run of letters in the top-level domain of an email.
const EMAIL_TLD_MAX: usize = 4;

/// A generated user record.
///
/// # Example
///
/// ```
/// use order_fixtures::UserGenerator;
/// use rand::SeedableRng;
/// use rand_chacha::ChaCha8Rng;
///
/// let mut rng = ChaCha8Rng::seed_from_u64(7);
/// let mut generator = UserGenerator::new();
/// let users = generator.generate(&mut rng, 2);
///
/// assert_eq!(users.first().map(|user| user.id), Some(1));
/// assert!(users.iter().all(|user| user.email.contains('@')));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Sequential identifier starting at 1.
    pub id: u64,
    /// Given name from [`FIRST_NAMES`].
    pub first_name: String,
    /// Family name from [`LAST_NAMES`].
    pub last_name: String,
    /// Synthetic address of the form `letters@letters.letters`.
    pub email: String,
}

/// Produces batches of [`User`] records.
#[derive(Debug, Clone, Default)]
pub struct UserGenerator {
    users: Vec<User>,
}

impl UserGenerator {
    /// Creates a generator with no users.
    #[must_use]
    pub const fn new() -> Self {
        Self { users: Vec::new() }
    }

    /// Generates exactly `count` users with ids `1..=count`.
    ///
    /// The new batch replaces whatever the generator held before. A `count`
    /// of zero yields an empty slice.
    pub fn generate<R>(&mut self, rng: &mut R, count: usize) -> &[User]
    where
        R: Rng,
    {
        let mut users = Vec::with_capacity(count);
        for id in (1..).take(count) {
            users.push(generate_single_user(rng, id));
        }
        self.users = users;
        &self.users
    }

    /// Returns the most recently generated users.
    #[must_use]
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Returns the user ids in creation order.
    #[must_use]
    pub fn id_list(&self) -> Vec<u64> {
        self.users.iter().map(|user| user.id).collect()
    }

    /// Consumes the generator, returning its users.
    #[must_use]
    pub fn into_users(self) -> Vec<User> {
        self.users
    }
}

fn generate_single_user<R>(rng: &mut R, id: u64) -> User
where
    R: Rng,
{
    User {
        id,
        first_name: pick(rng, &FIRST_NAMES).to_owned(),
        last_name: pick(rng, &LAST_NAMES).to_owned(),
        email: make_email(rng),
    }
}

fn pick<R>(rng: &mut R, pool: &[&'static str]) -> &'static str
where
    R: Rng,
{
    // Both pools are non-empty constants.
    pool.choose(rng).copied().unwrap_or_default()
}

/// Builds `local@domain.tld` from three random-length letter runs.
fn make_email<R>(rng: &mut R) -> String
where
    R: Rng,
{
    let local_len = rng.random_range(0..=EMAIL_SEGMENT_MAX);
    let domain_len = rng.random_range(0..=EMAIL_SEGMENT_MAX);
    let tld_len = rng.random_range(0..=EMAIL_TLD_MAX);

    let mut email = String::with_capacity(local_len + domain_len + tld_len + 2);
    push_letters(rng, &mut email, local_len);
    email.push('@');
    push_letters(rng, &mut email, domain_len);
    email.push('.');
    push_letters(rng, &mut email, tld_len);
    email
}

fn push_letters<R>(rng: &mut R, out: &mut String, len: usize)
where
    R: Rng,
{
    out.extend((0..len).map(|_| char::from(rng.random_range(b'a'..=b'z'))));
}
