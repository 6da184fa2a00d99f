//! Range checks for every numeric setting the DSA815 accepts.
//!
//! All checks are purely local. A value is validated before any SCPI text is
//! produced, so a rejected request never reaches the transport.

use crate::error::{InstrumentError, Result};

/// Frequency range shared by start/stop/center/span, in Hz.
pub const FREQUENCY_HZ: (f64, f64) = (0.0, 3.2e9);
/// Resolution bandwidth range, in Hz.
pub const RBW_HZ: (f64, f64) = (10.0, 1e6);
/// Video bandwidth range, in Hz.
pub const VBW_HZ: (f64, f64) = (1.0, 3e6);
/// Tracking generator output amplitude range, in dBm.
pub const TG_AMPLITUDE_DBM: (f64, f64) = (-40.0, 0.0);
/// Input attenuation range, in dB.
pub const ATTENUATION_DB: (f64, f64) = (0.0, 30.0);
/// Sweep time range, in seconds.
pub const SWEEP_TIME_S: (f64, f64) = (20e-6, 3200.0);
/// Sweep count range.
pub const SWEEP_COUNT: (u32, u32) = (1, 9999);

fn in_range(parameter: &'static str, value: f64, (min, max): (f64, f64)) -> Result<f64> {
    // NaN fails both comparisons and is rejected here as well.
    if value >= min && value <= max {
        Ok(value)
    } else {
        Err(InstrumentError::OutOfRange {
            parameter,
            value,
            min,
            max,
        })
    }
}

/// Validate a frequency in Hz; `parameter` names which one for error reporting.
pub fn frequency(parameter: &'static str, hz: f64) -> Result<f64> {
    in_range(parameter, hz, FREQUENCY_HZ)
}

pub fn resolution_bandwidth(hz: f64) -> Result<f64> {
    in_range("resolution bandwidth", hz, RBW_HZ)
}

pub fn video_bandwidth(hz: f64) -> Result<f64> {
    in_range("video bandwidth", hz, VBW_HZ)
}

pub fn tg_amplitude(dbm: f64) -> Result<f64> {
    in_range("TG amplitude", dbm, TG_AMPLITUDE_DBM)
}

/// Validate the input attenuation. The instrument only takes whole dB steps,
/// so the range is checked first and then the value must be integral.
pub fn attenuation(db: f64) -> Result<u8> {
    in_range("input attenuation", db, ATTENUATION_DB)?;
    if db.fract() != 0.0 {
        return Err(InstrumentError::InvalidType {
            parameter: "input attenuation",
            value: db,
        });
    }
    Ok(db as u8)
}

pub fn sweep_time(seconds: f64) -> Result<f64> {
    in_range("sweep time", seconds, SWEEP_TIME_S)
}

pub fn sweep_count(count: u32) -> Result<u32> {
    let (min, max) = SWEEP_COUNT;
    if (min..=max).contains(&count) {
        Ok(count)
    } else {
        Err(InstrumentError::OutOfRange {
            parameter: "sweep count",
            value: count as f64,
            min: min as f64,
            max: max as f64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frequency_bounds() {
        assert_eq!(frequency("center frequency", 0.0).unwrap(), 0.0);
        assert_eq!(frequency("center frequency", 3.2e9).unwrap(), 3.2e9);
        assert!(matches!(
            frequency("center frequency", -1.0),
            Err(InstrumentError::OutOfRange { parameter: "center frequency", .. })
        ));
        assert!(frequency("span", 3.2e9 + 1.0).is_err());
        assert!(frequency("span", f64::NAN).is_err());
    }

    #[test]
    fn bandwidth_bounds() {
        assert!(resolution_bandwidth(10.0).is_ok());
        assert!(resolution_bandwidth(1e6).is_ok());
        assert!(resolution_bandwidth(9.9).is_err());
        assert!(video_bandwidth(1.0).is_ok());
        assert!(video_bandwidth(3e6).is_ok());
        assert!(video_bandwidth(3e6 + 1.0).is_err());
    }

    #[test]
    fn tg_amplitude_bounds() {
        assert!(tg_amplitude(-40.0).is_ok());
        assert!(tg_amplitude(0.0).is_ok());
        assert!(tg_amplitude(0.5).is_err());
        assert!(tg_amplitude(-40.1).is_err());
    }

    #[test]
    fn attenuation_boundaries_accepted() {
        assert_eq!(attenuation(0.0).unwrap(), 0);
        assert_eq!(attenuation(30.0).unwrap(), 30);
    }

    #[test]
    fn attenuation_out_of_range_rejected() {
        assert!(matches!(
            attenuation(-1.0),
            Err(InstrumentError::OutOfRange { .. })
        ));
        assert!(matches!(
            attenuation(31.0),
            Err(InstrumentError::OutOfRange { .. })
        ));
    }

    #[test]
    fn attenuation_fraction_rejected() {
        assert!(matches!(
            attenuation(15.5),
            Err(InstrumentError::InvalidType { value, .. }) if value == 15.5
        ));
    }

    #[test]
    fn sweep_bounds() {
        assert!(sweep_time(20e-6).is_ok());
        assert!(sweep_time(3200.0).is_ok());
        assert!(sweep_time(19e-6).is_err());
        assert!(sweep_time(3201.0).is_err());
        assert!(sweep_count(1).is_ok());
        assert!(sweep_count(9999).is_ok());
        assert!(sweep_count(0).is_err());
        assert!(sweep_count(10000).is_err());
    }
}
