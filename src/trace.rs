//! Sweep data types and trace payload parsing.

use crate::error::{InstrumentError, Result};

/// One sample of a completed sweep.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SweepPoint {
    pub frequency_hz: f64,
    pub amplitude_dbm: f64,
}

/// A completed sweep: amplitude versus frequency, in index order.
///
/// Built fresh for every measurement and owned by the caller. The frequency
/// axis is synthesized client-side, the instrument only reports the span
/// endpoints and the point count.
#[derive(Debug, Clone)]
pub struct Sweep {
    pub start_hz: f64,
    pub stop_hz: f64,
    pub points: Vec<SweepPoint>,
}

impl Sweep {
    /// Pair a synthesized frequency axis with parsed amplitudes.
    pub fn new(start_hz: f64, stop_hz: f64, amplitudes: Vec<f64>) -> Self {
        let axis = frequency_axis(start_hz, stop_hz, amplitudes.len());
        let points = axis
            .into_iter()
            .zip(amplitudes)
            .map(|(frequency_hz, amplitude_dbm)| SweepPoint {
                frequency_hz,
                amplitude_dbm,
            })
            .collect();
        Sweep {
            start_hz,
            stop_hz,
            points,
        }
    }
}

/// `n` evenly spaced samples from `start` to `stop`, both ends included.
pub fn frequency_axis(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Split a comma-separated ASCII payload, stripping the header prefix that
/// the ASCII data format glues to the first amplitude with whitespace
/// (e.g. `"#9000002345 -42.5"`).
fn tokens(payload: &str) -> Result<Vec<&str>> {
    let payload = payload.trim();
    if payload.is_empty() {
        return Err(InstrumentError::MalformedTraceData(
            "empty trace payload".into(),
        ));
    }
    let mut tokens: Vec<&str> = payload.split(',').map(str::trim).collect();
    if let Some(first) = tokens.first_mut() {
        if let Some(last_piece) = first.split_whitespace().last() {
            *first = last_piece;
        }
    }
    Ok(tokens)
}

fn parse_tokens(tokens: &[&str]) -> Result<Vec<f64>> {
    tokens
        .iter()
        .enumerate()
        .map(|(i, token)| {
            token.parse::<f64>().map_err(|_| {
                InstrumentError::MalformedTraceData(format!(
                    "non-numeric token {token:?} at position {i}"
                ))
            })
        })
        .collect()
}

/// Parse a trace payload into amplitudes without a length check.
pub fn parse_amplitudes(payload: &str) -> Result<Vec<f64>> {
    parse_tokens(&tokens(payload)?)
}

/// Parse a trace payload that must carry exactly `expected_points`
/// amplitudes. A single surplus leading token is treated as a header and
/// dropped; any other count mismatch is malformed data.
pub fn parse_amplitudes_expecting(payload: &str, expected_points: usize) -> Result<Vec<f64>> {
    if expected_points == 0 {
        return Err(InstrumentError::MalformedTraceData(
            "instrument reported a sweep of 0 points".into(),
        ));
    }
    let mut tokens = tokens(payload)?;
    if tokens.len() == expected_points + 1 {
        tokens.remove(0);
    }
    if tokens.len() != expected_points {
        return Err(InstrumentError::MalformedTraceData(format!(
            "expected {expected_points} amplitudes, payload contained {}",
            tokens.len()
        )));
    }
    parse_tokens(&tokens)
}
