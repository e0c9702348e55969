//! Processor settings file format.
//!
//! Describes the host side of a processing session (the stream set, sample
//! rates, per-stream parameters, and the size of the continuous-channel
//! space) so an offline harness can reconstruct a configured processor.

use serde::{Deserialize, Serialize};
use std::path::Path;

use spikerate_core::{
    ElectrodeId, SpikeRateProcessor, StreamConfig, StreamDescriptor, StreamId,
};

use crate::error::ConfigError;

fn default_time_const_ms() -> f64 {
    StreamConfig::DEFAULT_TIME_CONST_MS
}

/// Persisted configuration of one stream.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StreamSettings {
    /// Stream identifier.
    pub id: u16,

    /// Sample rate shared by the stream's channels and spike sources.
    pub sample_rate_hz: f64,

    /// Decay time constant in milliseconds (defaults to 1000).
    #[serde(default = "default_time_const_ms")]
    pub time_const_ms: f64,

    /// Global continuous-channel index the rate is written to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_channel: Option<usize>,

    /// Stable identifiers of the stream's spike sources.
    #[serde(default)]
    pub electrodes: Vec<String>,
}

impl StreamSettings {
    /// The stream as a core descriptor.
    pub fn descriptor(&self) -> StreamDescriptor {
        StreamDescriptor {
            id: StreamId(self.id),
            sample_rate_hz: self.sample_rate_hz,
            electrodes: self
                .electrodes
                .iter()
                .map(|id| ElectrodeId::from(id.as_str()))
                .collect(),
        }
    }
}

/// Complete processing session settings.
///
/// # TOML Format
///
/// ```toml
/// num_output_channels = 16
///
/// [[streams]]
/// id = 0
/// sample_rate_hz = 30000.0
/// time_const_ms = 1000.0
/// output_channel = 3
/// electrodes = ["TT1", "TT2"]
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessorSettings {
    /// Size of the global continuous-channel space.
    pub num_output_channels: usize,

    /// The host's stream set.
    #[serde(default)]
    pub streams: Vec<StreamSettings>,
}

impl ProcessorSettings {
    /// Create settings with an empty stream set.
    pub fn new(num_output_channels: usize) -> Self {
        Self {
            num_output_channels,
            streams: Vec::new(),
        }
    }

    /// Add a stream.
    pub fn with_stream(mut self, stream: StreamSettings) -> Self {
        self.streams.push(stream);
        self
    }

    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Ok(toml::from_str(&content)?)
    }

    /// Load settings from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Save the settings to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Convert the settings to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Look up one stream's settings.
    pub fn stream(&self, id: u16) -> Option<&StreamSettings> {
        self.streams.iter().find(|s| s.id == id)
    }

    /// Construct and configure a processor from these settings.
    ///
    /// Every value passes through the core's configuration-time validation:
    /// duplicate stream ids, non-positive sample rates, and non-positive time
    /// constants are rejected here, before any block is processed.
    pub fn build_processor(&self) -> Result<SpikeRateProcessor, ConfigError> {
        let mut processor = SpikeRateProcessor::new();
        processor.set_num_output_channels(self.num_output_channels);

        let descriptors: Vec<StreamDescriptor> =
            self.streams.iter().map(StreamSettings::descriptor).collect();
        processor.sync_streams(&descriptors)?;

        for stream in &self.streams {
            let id = StreamId(stream.id);
            processor.set_time_const_ms(id, stream.time_const_ms)?;
            processor.set_output_channel(id, stream.output_channel)?;
        }
        Ok(processor)
    }

    /// Validate without building.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.build_processor().map(|_| ())
    }
}
