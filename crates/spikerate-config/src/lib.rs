//! Spikerate Config - selection and settings persistence
//!
//! Persists the two pieces of external configuration the rate estimator
//! reads: the electrode enable/disable selection and the per-stream
//! processing settings. Both are stored as TOML.
//!
//! - [`SelectionFile`] - electrode enable flags, keyed by stable string
//!   identifier so a selection survives electrode reordering across sessions
//! - [`ProcessorSettings`] / [`StreamSettings`] - the host's stream set,
//!   sample rates, time constants, and output channels, with validation at
//!   load time
//! - [`ConfigError`] - file, parse, and validation errors
//!
//! # Example
//!
//! ```rust
//! use spikerate_config::{ProcessorSettings, StreamSettings};
//!
//! let settings = ProcessorSettings::new(16).with_stream(StreamSettings {
//!     id: 0,
//!     sample_rate_hz: 30000.0,
//!     time_const_ms: 1000.0,
//!     output_channel: Some(3),
//!     electrodes: vec!["TT1".into(), "TT2".into()],
//! });
//!
//! let processor = settings.build_processor().unwrap();
//! assert_eq!(processor.num_output_channels(), 16);
//! ```

pub mod error;
pub mod selection;
pub mod settings;

pub use error::ConfigError;
pub use selection::{ElectrodeEntry, SelectionFile};
pub use settings::{ProcessorSettings, StreamSettings};
