//! Minimal demo: estimate the rate of a steady 10 Hz spike train.
//!
//! Run with: cargo run -p spikerate-core --example rate_demo
#![allow(missing_docs)]

use spikerate_core::{ElectrodeId, SpikeRateProcessor, SpikeRef, StreamDescriptor, StreamId};

fn main() {
    let sample_rate = 1000.0;
    let block_size = 250;
    let spike_interval = 100; // one spike every 100 ms -> 10 Hz

    let mut processor = SpikeRateProcessor::new();
    processor.set_num_output_channels(1);
    processor
        .sync_streams(&[StreamDescriptor {
            id: StreamId(0),
            sample_rate_hz: sample_rate,
            electrodes: vec![ElectrodeId::from("TT1")],
        }])
        .expect("valid stream set");
    processor.set_output_channel(StreamId(0), Some(0)).expect("stream exists");
    processor.electrodes_mut().set_enabled("TT1", true);

    let electrode = ElectrodeId::from("TT1");
    let mut out = vec![0.0f32; block_size];

    println!("block  first-sample  mean-at-end (Hz)");
    for block in 0..40 {
        processor
            .begin_block(StreamId(0), block_size)
            .expect("stream exists");

        let block_start = block * block_size;
        for pos in 0..block_size {
            if (block_start + pos) % spike_interval == 0 {
                processor.handle_spike(
                    &SpikeRef {
                        electrode: &electrode,
                        sample_pos: pos,
                    },
                    &mut out,
                );
            }
        }

        processor.end_block(StreamId(0), &mut out).expect("stream exists");

        if block % 4 == 0 {
            let mean = processor.stream(StreamId(0)).expect("stream exists").mean();
            println!("{block:>5}  {:>12.4}  {mean:>15.4}", out[0]);
        }
    }

    println!("\nsteady 10 Hz input settles near a 10 Hz estimate");
}
