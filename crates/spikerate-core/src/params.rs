//! Parameter introspection for the stream-scoped settings.
//!
//! Hosts discover and drive the two per-stream parameters (time constant and
//! output channel) through [`ParameterInfo`] without knowing the concrete
//! type, the same way a UI auto-generates controls or a save layer snapshots
//! values. Index-based access; indices are stable for the lifetime of the
//! value.

use crate::stream::StreamConfig;

/// Physical unit of a parameter, for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamUnit {
    /// Milliseconds.
    Milliseconds,
    /// Index into the global continuous-channel space.
    ChannelIndex,
}

/// Metadata describing one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Full display name.
    pub name: &'static str,
    /// Abbreviated name for narrow layouts.
    pub short_name: &'static str,
    /// Unit for display.
    pub unit: ParamUnit,
    /// Minimum plain value.
    pub min: f64,
    /// Maximum plain value.
    pub max: f64,
    /// Default plain value.
    pub default: f64,
    /// Step size for stepped controls.
    pub step: f64,
}

/// Trait for values that expose introspectable parameters.
pub trait ParameterInfo {
    /// Number of parameters. Valid indices are `0..param_count()`.
    fn param_count(&self) -> usize;

    /// Descriptor for the parameter at `index`, or `None` out of range.
    fn param_info(&self, index: usize) -> Option<ParamDescriptor>;

    /// Current plain value of the parameter at `index` (0.0 out of range).
    fn get_param(&self, index: usize) -> f64;

    /// Set the parameter at `index`. Invalid values and out-of-range indices
    /// leave the value unchanged.
    fn set_param(&mut self, index: usize, value: f64);
}

/// Parameter indices for [`StreamConfig`].
pub mod stream_param {
    /// Decay time constant in milliseconds.
    pub const TIME_CONST: usize = 0;
    /// Output channel index; negative means unassigned.
    pub const OUTPUT_CHANNEL: usize = 1;
}

impl ParameterInfo for StreamConfig {
    fn param_count(&self) -> usize {
        2
    }

    fn param_info(&self, index: usize) -> Option<ParamDescriptor> {
        match index {
            stream_param::TIME_CONST => Some(ParamDescriptor {
                name: "Time Constant",
                short_name: "Tau",
                unit: ParamUnit::Milliseconds,
                min: 1.0,
                max: f64::MAX,
                default: StreamConfig::DEFAULT_TIME_CONST_MS,
                step: 0.001,
            }),
            stream_param::OUTPUT_CHANNEL => Some(ParamDescriptor {
                name: "Output",
                short_name: "Out",
                unit: ParamUnit::ChannelIndex,
                min: -1.0,
                max: f64::MAX,
                default: -1.0,
                step: 1.0,
            }),
            _ => None,
        }
    }

    fn get_param(&self, index: usize) -> f64 {
        match index {
            stream_param::TIME_CONST => self.time_const_ms(),
            stream_param::OUTPUT_CHANNEL => {
                self.output_channel().map_or(-1.0, |chan| chan as f64)
            }
            _ => 0.0,
        }
    }

    fn set_param(&mut self, index: usize, value: f64) {
        match index {
            stream_param::TIME_CONST => {
                // invalid values are rejected, keeping the previous setting
                let _ = self.set_time_const_ms(value);
            }
            stream_param::OUTPUT_CHANNEL => {
                if value < 0.0 || !value.is_finite() {
                    self.set_output_channel(None);
                } else {
                    self.set_output_channel(Some(value as usize));
                }
            }
            _ => {}
        }
    }
}
