//! # Fulcrum
//!
//! Command-line front end for the beam-and-ball balancing task.
//!
//! ## Binaries
//!
//! -   **`run_trained_policy`** loads a saved policy (or falls back to a
//!     random one) and evaluates it episode by episode, printing per-episode
//!     and aggregate statistics.
//! -   **`smoke_test`** wires the simulator, a tiny actor-critic and one
//!     optimiser step together to check the pipeline end to end.
//!
//! ## Crates
//!
//! -   `physics` is the simulator binding.
//! -   `ml` holds the policies.
//! -   [`rl`] adapts the simulator to the evaluation interface and hosts both
//!     drivers.
//!
//! Logs go to stderr and are filtered by `RUST_LOG` (default `warn`); the
//! reports go to stdout.

pub mod cli;
pub mod logging;
