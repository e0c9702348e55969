//! Spikerate Core - sample-accurate mean spike rate estimation
//!
//! Estimates the mean spike firing rate of each data stream by combining an
//! exponentially weighted moving average over time (with an adjustable time
//! constant) with an average across the stream's enabled electrodes, and
//! writes the estimate sample-by-sample onto a selected continuous output
//! channel, overwriting its contents.
//!
//! # Core Abstractions
//!
//! - [`SpikeRateProcessor`] - multi-stream estimator driving the
//!   begin/spike/end block protocol
//! - [`StreamState`] / [`StreamConfig`] - per-stream state and validated
//!   configuration
//! - [`ElectrodeSet`] - enable/disable selection keyed by stable string ids
//! - [`ewma`] - the pure decay/impulse recurrence math
//! - [`ParameterInfo`] - introspection over the stream-scoped parameters
//!
//! # Block protocol
//!
//! For every processing block the host calls
//! [`begin_block`](SpikeRateProcessor::begin_block) (recomputes the decay
//! factor and impulse amplitude from current configuration), delivers the
//! block's spikes through [`handle_spike`](SpikeRateProcessor::handle_spike)
//! in non-decreasing sample order, and finalizes with
//! [`end_block`](SpikeRateProcessor::end_block). Only the running mean
//! survives from one block to the next, which is what gives the estimate its
//! long-run convergence to the true rate in events per second.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible (with `alloc`). Disable the default
//! `std` feature:
//!
//! ```toml
//! [dependencies]
//! spikerate-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Design Principles
//!
//! - **Real-time safe**: no allocation during steady-state block processing
//! - **Validated configuration**: non-finite decay factors and amplitudes
//!   cannot reach the recurrence
//! - **Independent streams**: each stream owns its state and its output
//!   channel slice; no cross-stream synchronization

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod electrodes;
pub mod error;
pub mod ewma;
pub mod params;
pub mod processor;
pub mod stream;

// Re-export main types at crate root
pub use electrodes::{ElectrodeId, ElectrodeSet};
pub use error::ConfigError;
pub use params::{ParamDescriptor, ParamUnit, ParameterInfo, stream_param};
pub use processor::{BlockStart, SkipReason, SpikeRateProcessor, SpikeRef, StreamDescriptor};
pub use stream::{StreamConfig, StreamId, StreamState};
