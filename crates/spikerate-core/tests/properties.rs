//! Property-based tests for the spike rate recurrence.
//!
//! Checks that the incremental block protocol is equivalent to a naive
//! sample-by-sample replay for any ordered spike sequence, and that derived
//! constants stay in their documented ranges over the whole valid
//! configuration space.

use proptest::prelude::*;
use spikerate_core::{
    ElectrodeId, SpikeRateProcessor, SpikeRef, StreamDescriptor, StreamId, ewma,
};

fn make_processor(sample_rate_hz: f64, time_const_ms: f64) -> SpikeRateProcessor {
    let mut processor = SpikeRateProcessor::new();
    processor.set_num_output_channels(1);
    processor
        .sync_streams(&[StreamDescriptor {
            id: StreamId(0),
            sample_rate_hz,
            electrodes: vec![ElectrodeId::from("e0")],
        }])
        .unwrap();
    processor.set_output_channel(StreamId(0), Some(0)).unwrap();
    processor.set_time_const_ms(StreamId(0), time_const_ms).unwrap();
    processor.electrodes_mut().set_enabled("e0", true);
    processor
}

/// Replay the recurrence sample-by-sample: all impulses landing on a sample
/// are applied before that sample is written, then one decay step follows.
fn naive_replay(
    positions: &[usize],
    block_len: usize,
    time_const_ms: f64,
    sample_rate_hz: f64,
) -> Vec<f32> {
    let decay = ewma::decay_per_sample(time_const_ms, sample_rate_hz);
    let amplitude = ewma::impulse_amplitude(time_const_ms, 1);
    let mut expected = vec![0.0f32; block_len];
    let mut mean = 0.0f64;
    let mut next = 0;
    for samp in 0..block_len {
        while next < positions.len() && positions[next] == samp {
            mean = ewma::impulse(mean, amplitude);
            next += 1;
        }
        expected[samp] = mean as f32;
        mean = ewma::step(mean, decay);
    }
    expected
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Any non-decreasing spike sequence processed through the block protocol
    /// equals the naive sample-by-sample replay.
    #[test]
    fn block_protocol_matches_naive_replay(
        block_len in 1usize..512,
        raw_positions in prop::collection::vec(0usize..512, 0..24),
        time_const_ms in 10.0f64..5000.0,
        sample_rate_hz in 100.0f64..48000.0,
    ) {
        let mut positions: Vec<usize> =
            raw_positions.iter().map(|p| p % block_len).collect();
        positions.sort_unstable();

        let mut processor = make_processor(sample_rate_hz, time_const_ms);
        let mut out = vec![f32::NAN; block_len];
        prop_assert!(processor.begin_block(StreamId(0), block_len).unwrap().is_started());
        let electrode = ElectrodeId::from("e0");
        for &pos in &positions {
            processor.handle_spike(&SpikeRef { electrode: &electrode, sample_pos: pos }, &mut out);
        }
        processor.end_block(StreamId(0), &mut out).unwrap();

        let expected = naive_replay(&positions, block_len, time_const_ms, sample_rate_hz);
        for (i, (&got, &want)) in out.iter().zip(expected.iter()).enumerate() {
            prop_assert!(
                (f64::from(got) - f64::from(want)).abs() < 1e-4,
                "sample {} diverged: got {}, naive replay {}",
                i, got, want
            );
        }
    }

    /// The derived decay factor stays strictly inside (0, 1) and the impulse
    /// amplitude stays positive across the valid configuration space.
    #[test]
    fn derived_constants_stay_in_range(
        time_const_ms in 0.001f64..1.0e6,
        sample_rate_hz in 1.0f64..1.0e6,
        electrodes in 1usize..256,
    ) {
        let decay = ewma::decay_per_sample(time_const_ms, sample_rate_hz);
        prop_assert!(
            decay > 0.0 && decay < 1.0,
            "decay {} out of (0,1) for tc={} ms, sr={} Hz",
            decay, time_const_ms, sample_rate_hz
        );

        let amplitude = ewma::impulse_amplitude(time_const_ms, electrodes);
        prop_assert!(
            amplitude > 0.0 && amplitude.is_finite(),
            "amplitude {} invalid for tc={} ms, n={}",
            amplitude, time_const_ms, electrodes
        );
    }

    /// Every sample of a valid block is written (no gaps, no NaN survivors),
    /// for any split of the block into spike catch-up and tail fill.
    #[test]
    fn every_sample_is_written_exactly_once(
        block_len in 1usize..256,
        raw_positions in prop::collection::vec(0usize..256, 0..8),
    ) {
        let mut positions: Vec<usize> =
            raw_positions.iter().map(|p| p % block_len).collect();
        positions.sort_unstable();

        let mut processor = make_processor(1000.0, 1000.0);
        let mut out = vec![f32::NAN; block_len];
        processor.begin_block(StreamId(0), block_len).unwrap();
        let electrode = ElectrodeId::from("e0");
        for &pos in &positions {
            processor.handle_spike(&SpikeRef { electrode: &electrode, sample_pos: pos }, &mut out);
        }
        processor.end_block(StreamId(0), &mut out).unwrap();

        for (i, &sample) in out.iter().enumerate() {
            prop_assert!(sample.is_finite(), "sample {} was never written", i);
        }
    }
}
