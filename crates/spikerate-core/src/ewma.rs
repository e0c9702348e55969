//! Recurrence math for the exponentially weighted spike rate estimate.
//!
//! The estimate is a per-sample recurrence: every sample the mean is
//! multiplied by a decay factor derived from the configured time constant,
//! and every spike adds a fixed impulse amplitude. All functions here are
//! pure and allocation-free, suitable for `no_std`.
//!
//! # Amplitude normalization
//!
//! The impulse amplitude is chosen so that under a steady spiking process the
//! time-average of the mean converges to the true firing rate in events per
//! second, independent of the time constant: normalizing by the time constant
//! in seconds makes each spike's total area under the decay curve equal 1.
//! Dividing further by the number of enabled electrodes turns the summed
//! per-electrode rates into an across-electrode average.

use libm::exp;

/// Per-sample decay factor for a given time constant and sample rate.
///
/// Computes `exp(-1 / (time_const_sec * sample_rate_hz))`. The time constant
/// is the time for a spike's influence to decay to 1/e of its initial value.
///
/// Callers must ensure `time_const_ms > 0` and `sample_rate_hz > 0`; both are
/// validated when configuration is set, so the recurrence never sees a
/// non-finite factor.
///
/// # Example
/// ```rust
/// use spikerate_core::ewma::decay_per_sample;
///
/// // 1 s time constant at 1 kHz: exp(-1/1000)
/// let decay = decay_per_sample(1000.0, 1000.0);
/// assert!((decay - 0.999000).abs() < 1e-6);
/// ```
#[inline]
pub fn decay_per_sample(time_const_ms: f64, sample_rate_hz: f64) -> f64 {
    debug_assert!(time_const_ms > 0.0, "time constant must be positive");
    debug_assert!(sample_rate_hz > 0.0, "sample rate must be positive");
    let time_const_samples = time_const_ms / 1000.0 * sample_rate_hz;
    exp(-1.0 / time_const_samples)
}

/// Initial amplitude of a single spike's contribution to the mean.
///
/// `1 / (time_const_sec * active_electrodes)`. With this normalization the
/// long-run average of the mean equals the per-electrode firing rate in Hz
/// rather than the sum across electrodes.
///
/// Callers must ensure `active_electrodes >= 1`; streams with no enabled
/// electrodes are skipped before amplitude is derived.
///
/// # Example
/// ```rust
/// use spikerate_core::ewma::impulse_amplitude;
///
/// // 1 s time constant, one electrode: each spike adds 1.0
/// assert!((impulse_amplitude(1000.0, 1) - 1.0).abs() < 1e-12);
/// // four electrodes share the same total weight
/// assert!((impulse_amplitude(1000.0, 4) - 0.25).abs() < 1e-12);
/// ```
#[inline]
pub fn impulse_amplitude(time_const_ms: f64, active_electrodes: usize) -> f64 {
    debug_assert!(time_const_ms > 0.0, "time constant must be positive");
    debug_assert!(active_electrodes > 0, "amplitude requires an enabled electrode");
    1.0 / (time_const_ms / 1000.0 * active_electrodes as f64)
}

/// Advance the mean by one sample of decay.
#[inline]
pub fn step(mean: f64, decay: f64) -> f64 {
    mean * decay
}

/// Add one spike's contribution to the mean.
#[inline]
pub fn impulse(mean: f64, amplitude: f64) -> f64 {
    mean + amplitude
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decay_is_strictly_inside_unit_interval() {
        for &(tc, sr) in &[(1.0, 1000.0), (1000.0, 30000.0), (5000.0, 44100.0)] {
            let d = decay_per_sample(tc, sr);
            assert!(d > 0.0 && d < 1.0, "decay {d} out of (0,1) for tc={tc} sr={sr}");
        }
    }

    #[test]
    fn decay_matches_reference_value() {
        // 1000 ms at 1000 Hz: exp(-1/1000)
        let d = decay_per_sample(1000.0, 1000.0);
        assert!((d - (-1.0f64 / 1000.0).exp()).abs() < 1e-15);
    }

    #[test]
    fn longer_time_constant_decays_slower() {
        let fast = decay_per_sample(100.0, 30000.0);
        let slow = decay_per_sample(2000.0, 30000.0);
        assert!(slow > fast, "slow {slow} should exceed fast {fast}");
    }

    #[test]
    fn amplitude_scales_inversely_with_electrode_count() {
        let one = impulse_amplitude(500.0, 1);
        let five = impulse_amplitude(500.0, 5);
        assert!((one / five - 5.0).abs() < 1e-12);
    }

    #[test]
    fn step_and_impulse_compose() {
        let mut mean = 0.0;
        mean = impulse(mean, 1.0);
        mean = step(mean, 0.999);
        mean = step(mean, 0.999);
        assert!((mean - 0.998001).abs() < 1e-12);
    }
}
