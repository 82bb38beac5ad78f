//! Headless battle runner for CI, replay verification and balance work.
//!
//! Wraps [`skirmish_core`] with the file IO the engine deliberately leaves
//! out: loading rosters, configs and scenarios from RON, writing JSON
//! reports and bincode replay records, and running seed sweeps in parallel.
//!
//! # Example
//!
//! ```bash
//! # Check a roster and a scenario
//! cargo run -p skirmish_headless -- validate --roster assets/data/heroes.ron \
//!     --scenario assets/scenarios/skirmish_3v3.ron
//!
//! # Simulate and keep a replay record
//! cargo run -p skirmish_headless -- simulate --scenario assets/scenarios/skirmish_3v3.ron \
//!     --record out/skirmish.bin
//!
//! # Re-run a record and compare digests
//! cargo run -p skirmish_headless -- verify --record out/skirmish.bin
//!
//! # Balance sweep over 1000 seeds
//! cargo run -p skirmish_headless -- batch --scenario assets/scenarios/standard_5v5.ron --count 1000
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod batch;
pub mod error;
pub mod loader;
pub mod report;
pub mod scenario;

pub use batch::{run_batch, BatchConfig, BatchProgress, BatchResults, BatchSummary, GameOutcome};
pub use error::{HeadlessError, Result};
pub use report::{render_text, BattleReport};
pub use scenario::Scenario;
