//! Offline spike-file processing command.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use spikerate_config::{ProcessorSettings, SelectionFile};
use spikerate_core::{ElectrodeId, SpikeRef, StreamId};

#[derive(Args)]
pub struct ProcessArgs {
    /// Session settings (TOML)
    #[arg(value_name = "SETTINGS")]
    settings: PathBuf,

    /// Spike event file, one JSON object per line:
    /// {"electrode": "TT1", "sample": 123}
    #[arg(value_name = "EVENTS")]
    events: PathBuf,

    /// Output CSV file (sample index plus one rate column per stream)
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Electrode selection TOML; every declared electrode is enabled when omitted
    #[arg(short, long)]
    selection: Option<PathBuf>,

    /// Processing block size in samples
    #[arg(long, default_value = "1024")]
    block_size: usize,

    /// Total samples to process (defaults to just past the last event)
    #[arg(long)]
    num_samples: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct EventRecord {
    electrode: String,
    sample: u64,
}

/// Read a JSON-lines event file, enforcing non-decreasing sample order.
///
/// The file merges all streams into one absolute-sample timeline, so a sorted
/// file guarantees the per-stream in-block ordering the processor requires.
/// An unsorted file is an input error, reported with its line number.
fn read_events(path: &Path) -> anyhow::Result<Vec<EventRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open event file '{}'", path.display()))?;

    let mut events = Vec::new();
    let mut last_sample = 0u64;
    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record: EventRecord = serde_json::from_str(&line)
            .with_context(|| format!("invalid event on line {}", index + 1))?;
        if record.sample < last_sample {
            bail!(
                "event file is not sorted: sample {} on line {} follows sample {}",
                record.sample,
                index + 1,
                last_sample
            );
        }
        last_sample = record.sample;
        events.push(record);
    }
    Ok(events)
}

pub fn run(args: ProcessArgs) -> anyhow::Result<()> {
    if args.block_size == 0 {
        bail!("block size must be at least 1");
    }

    let settings = ProcessorSettings::load(&args.settings)?;
    let mut processor = settings.build_processor()?;

    match &args.selection {
        Some(path) => SelectionFile::load(path)?.apply_to(processor.electrodes_mut()),
        None => {
            // offline default: every declared electrode contributes
            for stream in &settings.streams {
                for id in &stream.electrodes {
                    processor.electrodes_mut().set_enabled(id.as_str(), true);
                }
            }
        }
    }

    println!("Reading {}...", args.events.display());
    let events = read_events(&args.events)?;

    let num_samples = match args.num_samples {
        Some(n) => n,
        None => match events.last() {
            Some(last) => last.sample as usize + 1,
            None => bail!("event file is empty; pass --num-samples to process silence"),
        },
    };

    // electrode -> owning stream, stream -> output channel
    let mut electrode_streams: HashMap<String, StreamId> = HashMap::new();
    let mut stream_channels: HashMap<StreamId, usize> = HashMap::new();
    for stream in &settings.streams {
        let id = StreamId(stream.id);
        for electrode in &stream.electrodes {
            electrode_streams.insert(electrode.clone(), id);
        }
        if let Some(channel) = stream.output_channel {
            stream_channels.insert(id, channel);
        }
    }

    let stream_ids: Vec<StreamId> = processor.stream_ids().collect();
    let mut columns: Vec<(StreamId, usize)> = stream_channels
        .iter()
        .map(|(&id, &channel)| (id, channel))
        .collect();
    columns.sort_unstable();

    let output_file = File::create(&args.output)
        .with_context(|| format!("failed to create '{}'", args.output.display()))?;
    let mut writer = BufWriter::new(output_file);
    write!(writer, "sample")?;
    for (id, _) in &columns {
        write!(writer, ",stream_{id}")?;
    }
    writeln!(writer)?;

    let num_blocks = num_samples.div_ceil(args.block_size);
    let progress = ProgressBar::new(num_blocks as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{bar:40.cyan/blue} {pos}/{len} blocks")?
            .progress_chars("=>-"),
    );

    let mut channels = vec![vec![0.0f32; args.block_size]; settings.num_output_channels];
    let mut scratch = vec![0.0f32; args.block_size];
    let mut event_index = 0;
    let mut delivered = 0usize;

    for block in 0..num_blocks {
        let block_start = block * args.block_size;
        let len = args.block_size.min(num_samples - block_start);

        for channel in &mut channels {
            channel[..len].fill(0.0);
        }
        for &id in &stream_ids {
            processor.begin_block(id, len)?;
        }

        while event_index < events.len() && (events[event_index].sample as usize) < block_start + len
        {
            let event = &events[event_index];
            event_index += 1;
            let Some(&stream_id) = electrode_streams.get(&event.electrode) else {
                tracing::warn!(electrode = %event.electrode, "spike from undeclared electrode ignored");
                continue;
            };
            let out = match stream_channels.get(&stream_id) {
                Some(&channel) => &mut channels[channel],
                None => &mut scratch,
            };
            let electrode = ElectrodeId::from(event.electrode.as_str());
            processor.handle_spike(
                &SpikeRef {
                    electrode: &electrode,
                    sample_pos: event.sample as usize - block_start,
                },
                out,
            );
            delivered += 1;
        }

        for &id in &stream_ids {
            let out = match stream_channels.get(&id) {
                Some(&channel) => &mut channels[channel],
                None => &mut scratch,
            };
            processor.end_block(id, out)?;
        }

        for samp in 0..len {
            write!(writer, "{}", block_start + samp)?;
            for &(_, channel) in &columns {
                write!(writer, ",{}", channels[channel][samp])?;
            }
            writeln!(writer)?;
        }
        progress.inc(1);
    }
    progress.finish_and_clear();

    if event_index < events.len() {
        tracing::warn!(
            skipped = events.len() - event_index,
            "events past --num-samples were not processed"
        );
    }

    println!(
        "Processed {} samples in {} blocks ({} of {} events delivered)",
        num_samples,
        num_blocks,
        delivered,
        events.len()
    );
    println!("Wrote {}", args.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(path: &Path, content: &str) {
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn events_parse_and_enforce_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        write_file(
            &path,
            r#"{"electrode": "TT1", "sample": 10}

{"electrode": "TT2", "sample": 10}
{"electrode": "TT1", "sample": 250}
"#,
        );

        let events = read_events(&path).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].electrode, "TT1");
        assert_eq!(events[2].sample, 250);
    }

    #[test]
    fn unsorted_event_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("events.jsonl");
        write_file(
            &path,
            "{\"electrode\": \"TT1\", \"sample\": 100}\n{\"electrode\": \"TT1\", \"sample\": 99}\n",
        );

        let err = read_events(&path).unwrap_err();
        assert!(err.to_string().contains("not sorted"), "got: {err}");
    }

    #[test]
    fn end_to_end_run_writes_a_rate_trace() {
        let dir = TempDir::new().unwrap();
        let settings_path = dir.path().join("session.toml");
        let events_path = dir.path().join("events.jsonl");
        let output_path = dir.path().join("rates.csv");

        write_file(
            &settings_path,
            r#"
num_output_channels = 1

[[streams]]
id = 0
sample_rate_hz = 1000.0
time_const_ms = 1000.0
output_channel = 0
electrodes = ["TT1"]
"#,
        );
        write_file(&events_path, "{\"electrode\": \"TT1\", \"sample\": 0}\n");

        run(ProcessArgs {
            settings: settings_path,
            events: events_path,
            output: output_path.clone(),
            selection: None,
            block_size: 4,
            num_samples: Some(8),
        })
        .unwrap();

        let csv = std::fs::read_to_string(&output_path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("sample,stream_0"));
        let first = lines.next().unwrap();
        assert_eq!(first, "0,1");
        // 8 samples across 2 blocks, each written once
        assert_eq!(csv.lines().count(), 9);
    }
}
