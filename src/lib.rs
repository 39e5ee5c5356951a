//! NeuroEase core library
//!
//! Rating aggregation for community and personal coping strategies, an
//! expiring offline cache, and the reachability hook used to sync when the
//! network comes back.

mod atomic_file;
pub mod cache;
pub mod cli;
pub mod connectivity;
pub mod error;
pub mod logging;
pub mod rating;
pub mod store;
