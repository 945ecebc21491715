//! Client module for reading remote content politely
//!
//! This module contains:
//! - The `Fetch` capability and its reqwest implementation
//! - Seedable pacing (politeness delays and user-agent rotation)
//! - The `RateAwareClient` that every stage visits locators through

mod fetcher;
mod pacing;
mod rate_aware;

pub use fetcher::{Fetch, FetchFailure, HttpFetcher};
pub use pacing::{choose_delay, choose_user_agent, Draw, Pacing, DEFAULT_USER_AGENTS};
pub use rate_aware::{ErrorHook, RateAwareClient, ThrottleHook};
