//! podtune-core — policy and configuration types for the podtune controller.
//!
//! Holds everything the control loop needs that does not touch the network:
//!
//! ```text
//! RuleSet            ← intent.yaml, loaded once
//!   └── resolve()    → target limit for a session count
//!
//! ControllerConfig   ← podtune.toml (optional), defaults otherwise
//!   ├── prometheus   → query address, expression, timeout
//!   ├── target       → namespace, selector, container, resource
//!   ├── kubernetes   → API timeout
//!   └── loop         → interval, cadence, dry-run
//! ```

pub mod config;
pub mod error;
pub mod rules;

pub use config::{Cadence, ControllerConfig, parse_duration};
pub use error::{ConfigError, ConfigResult, RuleError, RuleResult};
pub use rules::{Rule, RuleSet};
