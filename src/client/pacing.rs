//! Request pacing: randomized politeness delays and user-agent rotation
//!
//! Selection is expressed as pure functions over an `Rng` so that a fixed
//! seed reproduces the exact same sequence of delays and headers.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::sync::Mutex;
use std::time::Duration;

/// Built-in pool of desktop browser identifiers
pub const DEFAULT_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/93.0.4577.82 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/87.0.4280.141 Safari/537.36 Edg/87.0.664.75",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/70.0.3538.102 Safari/537.36 Edge/18.18363",
];

/// Draws a delay uniformly from `[min, max]`
pub fn choose_delay<R: Rng + ?Sized>(rng: &mut R, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}

/// Picks a user agent uniformly from `pool`
pub fn choose_user_agent<'a, R: Rng + ?Sized>(rng: &mut R, pool: &'a [String]) -> Option<&'a str> {
    pool.choose(rng).map(String::as_str)
}

/// One draw for one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draw {
    pub delay: Duration,
    pub user_agent: String,
}

/// Seedable source of per-request delays and user agents
///
/// The generator sits behind a std mutex held only for the duration of a draw,
/// never across an await point.
pub struct Pacing {
    rng: Mutex<StdRng>,
    min_delay: Duration,
    max_delay: Duration,
    user_agents: Vec<String>,
}

impl Pacing {
    pub fn new(
        seed: Option<u64>,
        min_delay: Duration,
        max_delay: Duration,
        user_agents: Vec<String>,
    ) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let user_agents = if user_agents.is_empty() {
            DEFAULT_USER_AGENTS.iter().map(|ua| ua.to_string()).collect()
        } else {
            user_agents
        };

        Self {
            rng: Mutex::new(rng),
            min_delay,
            max_delay,
            user_agents,
        }
    }

    /// Draws the delay and user agent for the next request
    pub fn draw(&self) -> Draw {
        let mut rng = match self.rng.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let delay = choose_delay(&mut *rng, self.min_delay, self.max_delay);
        let user_agent = choose_user_agent(&mut *rng, &self.user_agents)
            .unwrap_or(DEFAULT_USER_AGENTS[0])
            .to_string();
        Draw { delay, user_agent }
    }
}
