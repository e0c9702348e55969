//! Block-by-block spike rate estimation across multiple streams.
//!
//! [`SpikeRateProcessor`] owns one [`StreamState`] per stream and the shared
//! electrode selection, and exposes the host-driven block protocol:
//!
//! 1. [`begin_block`](SpikeRateProcessor::begin_block): recompute the decay
//!    factor and impulse amplitude from current configuration and reset the
//!    write cursor, or skip the stream for this block.
//! 2. zero or more [`handle_spike`](SpikeRateProcessor::handle_spike) calls,
//!    in non-decreasing sample order, each catching the output up to the
//!    spike's sample and adding its impulse.
//! 3. [`end_block`](SpikeRateProcessor::end_block): fill the remaining
//!    samples to the end of the block.
//!
//! Every sample of a valid block is written exactly once and decayed exactly
//! once. Streams are independent: each one owns its state and its slice of
//! the output buffer, so distinct streams may be processed in any order.

use alloc::collections::{BTreeMap, BTreeSet};
use alloc::vec::Vec;

use crate::electrodes::{ElectrodeId, ElectrodeSet};
use crate::error::ConfigError;
use crate::ewma;
use crate::stream::{ActiveBlock, StreamId, StreamState};

/// A stream as declared by the host when the stream set changes.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Stream identifier, unique within one sync.
    pub id: StreamId,
    /// Sample rate of the stream's continuous channels. All of the stream's
    /// spike sources must share this rate; per-source rates are not
    /// supported and are rejected here rather than silently mis-averaged.
    pub sample_rate_hz: f64,
    /// Stable identifiers of the stream's spike sources.
    pub electrodes: Vec<ElectrodeId>,
}

/// Why a stream was skipped for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The block contained no samples.
    EmptyBlock,
    /// No output channel assigned, or the index is outside the channel space.
    NoOutputChannel,
    /// Every electrode of the stream is disabled.
    NoEnabledElectrodes,
}

impl core::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EmptyBlock => f.write_str("empty block"),
            Self::NoOutputChannel => f.write_str("no valid output channel"),
            Self::NoEnabledElectrodes => f.write_str("no enabled electrodes"),
        }
    }
}

/// Outcome of [`SpikeRateProcessor::begin_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockStart {
    /// The block is active; spikes may be delivered and the block must be
    /// finalized with `end_block`.
    Started,
    /// The stream sits this block out: no state mutation, no output writes.
    Skipped(SkipReason),
}

impl BlockStart {
    /// `true` when the block was started.
    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started)
    }
}

/// One spike event, delivered inside a block.
#[derive(Debug, Clone, Copy)]
pub struct SpikeRef<'a> {
    /// The electrode the spike was detected on. Identifies the owning stream.
    pub electrode: &'a ElectrodeId,
    /// Sample index of the spike within the current block.
    pub sample_pos: usize,
}

/// Multi-stream mean spike rate estimator.
///
/// Combines an exponentially weighted moving average over time with an
/// average across enabled electrodes, and writes the estimate sample-by-sample
/// over a caller-owned output channel.
///
/// # Example
///
/// ```rust
/// use spikerate_core::{
///     ElectrodeId, SpikeRateProcessor, SpikeRef, StreamDescriptor, StreamId,
/// };
///
/// let mut processor = SpikeRateProcessor::new();
/// processor.set_num_output_channels(1);
/// processor
///     .sync_streams(&[StreamDescriptor {
///         id: StreamId(0),
///         sample_rate_hz: 1000.0,
///         electrodes: vec![ElectrodeId::from("TT1")],
///     }])
///     .unwrap();
/// processor.set_output_channel(StreamId(0), Some(0)).unwrap();
/// processor.electrodes_mut().set_enabled("TT1", true);
///
/// let mut out = [0.0f32; 5];
/// assert!(processor.begin_block(StreamId(0), out.len()).unwrap().is_started());
/// processor.handle_spike(
///     &SpikeRef { electrode: &ElectrodeId::from("TT1"), sample_pos: 0 },
///     &mut out,
/// );
/// processor.end_block(StreamId(0), &mut out).unwrap();
/// assert_eq!(out[0], 1.0); // one spike at 1 s time constant
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpikeRateProcessor {
    streams: BTreeMap<StreamId, StreamState>,
    /// Reverse lookup from electrode to owning stream, rebuilt on sync.
    electrode_streams: BTreeMap<ElectrodeId, StreamId>,
    electrodes: ElectrodeSet,
    num_output_channels: usize,
}

impl SpikeRateProcessor {
    /// Create a processor with no streams and an empty channel space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the global continuous-channel space used to validate each
    /// stream's output channel at block start.
    pub fn set_num_output_channels(&mut self, num_channels: usize) {
        self.num_output_channels = num_channels;
    }

    /// Current size of the global continuous-channel space.
    pub fn num_output_channels(&self) -> usize {
        self.num_output_channels
    }

    /// Rebuild the stream table after the host's stream set changed.
    ///
    /// Surviving streams keep their configuration and running mean, removed
    /// streams are dropped, and new streams start with default configuration
    /// and a mean of zero. Any in-flight block is discarded. The electrode
    /// selection is reconciled against the union of declared electrodes.
    ///
    /// Fails without mutating anything if a stream id appears twice or a
    /// sample rate is not a positive finite value.
    pub fn sync_streams(&mut self, descriptors: &[StreamDescriptor]) -> Result<(), ConfigError> {
        let mut seen = BTreeSet::new();
        for desc in descriptors {
            if !(desc.sample_rate_hz.is_finite() && desc.sample_rate_hz > 0.0) {
                return Err(ConfigError::NonPositiveSampleRate(desc.sample_rate_hz));
            }
            if !seen.insert(desc.id) {
                return Err(ConfigError::DuplicateStream(desc.id));
            }
        }

        let mut next = BTreeMap::new();
        for desc in descriptors {
            let mut state = self
                .streams
                .remove(&desc.id)
                .unwrap_or_else(|| StreamState::new(desc.sample_rate_hz));
            state.sample_rate_hz = desc.sample_rate_hz;
            state.electrodes = desc.electrodes.clone();
            state.block = None;
            next.insert(desc.id, state);
        }
        self.streams = next;

        self.electrode_streams.clear();
        for desc in descriptors {
            for electrode in &desc.electrodes {
                self.electrode_streams.insert(electrode.clone(), desc.id);
            }
        }
        self.electrodes
            .sync(descriptors.iter().flat_map(|d| d.electrodes.iter()));

        #[cfg(feature = "tracing")]
        tracing::debug!(
            streams = self.streams.len(),
            electrodes = self.electrodes.len(),
            "stream set synced"
        );
        Ok(())
    }

    /// State of one stream, if known.
    pub fn stream(&self, id: StreamId) -> Option<&StreamState> {
        self.streams.get(&id)
    }

    /// Ids of all known streams, in order.
    pub fn stream_ids(&self) -> impl Iterator<Item = StreamId> + '_ {
        self.streams.keys().copied()
    }

    /// The shared electrode selection.
    pub fn electrodes(&self) -> &ElectrodeSet {
        &self.electrodes
    }

    /// Mutable access to the electrode selection. Changes take effect at the
    /// next block start.
    pub fn electrodes_mut(&mut self) -> &mut ElectrodeSet {
        &mut self.electrodes
    }

    /// Owning stream of an electrode, if it was declared in the last sync.
    pub fn stream_of(&self, electrode: &ElectrodeId) -> Option<StreamId> {
        self.electrode_streams.get(electrode).copied()
    }

    /// Set a stream's decay time constant in milliseconds. Takes effect at
    /// the next block start; the running mean is untouched.
    pub fn set_time_const_ms(&mut self, id: StreamId, time_const_ms: f64) -> Result<(), ConfigError> {
        let state = self
            .streams
            .get_mut(&id)
            .ok_or(ConfigError::UnknownStream(id))?;
        state.config.set_time_const_ms(time_const_ms)
    }

    /// Assign or clear a stream's output channel. Takes effect at the next
    /// block start.
    pub fn set_output_channel(
        &mut self,
        id: StreamId,
        channel: Option<usize>,
    ) -> Result<(), ConfigError> {
        let state = self
            .streams
            .get_mut(&id)
            .ok_or(ConfigError::UnknownStream(id))?;
        state.config.set_output_channel(channel);
        Ok(())
    }

    /// Begin a block of `block_len` samples for one stream.
    ///
    /// Recomputes the decay factor and impulse amplitude from the current
    /// time constant, sample rate, and enabled-electrode count, and resets
    /// the write cursor to zero. Returns [`BlockStart::Skipped`], with no
    /// state mutation and no output writes for the whole block, when the
    /// block is empty, the output channel is unassigned or out of range, or
    /// no electrode of the stream is enabled.
    pub fn begin_block(&mut self, id: StreamId, block_len: usize) -> Result<BlockStart, ConfigError> {
        let num_channels = self.num_output_channels;
        let state = self
            .streams
            .get_mut(&id)
            .ok_or(ConfigError::UnknownStream(id))?;
        state.block = None;

        let skip = if block_len == 0 {
            Some(SkipReason::EmptyBlock)
        } else if !state
            .config
            .output_channel()
            .is_some_and(|chan| chan < num_channels)
        {
            Some(SkipReason::NoOutputChannel)
        } else {
            None
        };
        if let Some(reason) = skip {
            #[cfg(feature = "tracing")]
            tracing::trace!(stream = %id, %reason, "block skipped");
            return Ok(BlockStart::Skipped(reason));
        }

        let enabled = self.electrodes.enabled_count(&state.electrodes);
        if enabled == 0 {
            #[cfg(feature = "tracing")]
            tracing::trace!(stream = %id, reason = %SkipReason::NoEnabledElectrodes, "block skipped");
            return Ok(BlockStart::Skipped(SkipReason::NoEnabledElectrodes));
        }

        let time_const_ms = state.config.time_const_ms();
        state.block = Some(ActiveBlock {
            len: block_len,
            decay_per_sample: ewma::decay_per_sample(time_const_ms, state.sample_rate_hz),
            impulse_amplitude: ewma::impulse_amplitude(time_const_ms, enabled),
            cursor: 0,
        });
        Ok(BlockStart::Started)
    }

    /// Deliver one spike event into the owning stream's current block.
    ///
    /// `out` is the caller-owned slice of the stream's output channel for
    /// this block. The mean is written and decayed for every sample from the
    /// write cursor up to (not including) the spike's sample, then the
    /// impulse is added, so the spike is visible starting at its own sample.
    ///
    /// Spikes from disabled or undeclared electrodes, and spikes for streams
    /// with no active block, are ignored without any state change.
    ///
    /// # Panics
    ///
    /// Panics if `sample_pos` lies behind the write cursor (spikes must be
    /// delivered in non-decreasing sample order) or at/after the end of the
    /// block. Out-of-order delivery is a host contract violation, never
    /// clamped.
    pub fn handle_spike(&mut self, spike: &SpikeRef<'_>, out: &mut [f32]) {
        if !self.electrodes.is_enabled(spike.electrode) {
            return;
        }
        let Some(&stream_id) = self.electrode_streams.get(spike.electrode) else {
            return;
        };
        let Some(state) = self.streams.get_mut(&stream_id) else {
            return;
        };
        let StreamState { mean, block, .. } = state;
        let Some(block) = block.as_mut() else {
            // stream skipped this block, or no block in flight
            return;
        };

        assert!(
            spike.sample_pos >= block.cursor,
            "spike at sample {} arrived behind the write cursor {}; \
             spikes must be delivered in non-decreasing sample order",
            spike.sample_pos,
            block.cursor,
        );
        assert!(
            spike.sample_pos < block.len,
            "spike at sample {} outside block of {} samples",
            spike.sample_pos,
            block.len,
        );

        fill_to(mean, block, spike.sample_pos, out);
        *mean = ewma::impulse(*mean, block.impulse_amplitude);
    }

    /// Finalize the stream's current block, filling every remaining sample.
    ///
    /// A no-op for streams whose block was skipped. After this call the
    /// stream has no block in flight and the mean carries over to the next
    /// block.
    pub fn end_block(&mut self, id: StreamId, out: &mut [f32]) -> Result<(), ConfigError> {
        let state = self
            .streams
            .get_mut(&id)
            .ok_or(ConfigError::UnknownStream(id))?;
        let StreamState { mean, block, .. } = state;
        let Some(mut active) = block.take() else {
            return Ok(());
        };
        let len = active.len;
        fill_to(mean, &mut active, len, out);
        Ok(())
    }
}

/// Write the mean and apply one decay step for each sample in
/// `[block.cursor, target)`, then move the cursor to `target`.
fn fill_to(mean: &mut f64, block: &mut ActiveBlock, target: usize, out: &mut [f32]) {
    debug_assert!(
        out.len() >= block.len,
        "output slice of {} samples shorter than block of {}",
        out.len(),
        block.len,
    );
    for samp in block.cursor..target {
        out[samp] = *mean as f32;
        *mean = ewma::step(*mean, block.decay_per_sample);
    }
    block.cursor = target;
}
