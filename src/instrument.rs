use std::collections::BTreeMap;
use std::time::Duration;

use tracing::debug;

use crate::error::{InstrumentError, Result};
use crate::limits;
use crate::scpi::{self, cmd};
use crate::trace::{self, Sweep};
use crate::transport::{Transport, Vxi11Transport};
use crate::types::{DataFormat, Trace, TraceLabel, TraceMode};

/// Poll budget for one sweep-completion wait before giving up.
pub const DEFAULT_MAX_STATUS_POLLS: usize = 10_000;

/// Bit 3 of `:STATus:OPERation:CONDition?` is set while a sweep is running.
const SWEEP_RUNNING: u32 = 1 << 3;

const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Control client for a Rigol DSA815 spectrum analyzer.
///
/// Owns one exclusive session to the instrument. All operations are direct
/// request/response round trips on the calling task; nothing is cached, every
/// getter re-queries the instrument, and every validated setter returns the
/// value the instrument actually accepted (which may differ from the request
/// if the firmware clamps or quantizes it).
pub struct Dsa815<T: Transport> {
    transport: Option<T>,
    max_status_polls: usize,
    settle_delay: Duration,
}

impl Dsa815<Vxi11Transport> {
    pub async fn connect(host: &str, resource: &str) -> Result<Self> {
        Ok(Self::with_transport(
            Vxi11Transport::connect(host, resource).await?,
        ))
    }

    pub async fn connect_with_timeout(
        host: &str,
        resource: &str,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self::with_transport(
            Vxi11Transport::connect_with_timeout(host, resource, timeout).await?,
        ))
    }
}

impl<T: Transport> Dsa815<T> {
    /// Wrap an already-open transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Some(transport),
            max_status_polls: DEFAULT_MAX_STATUS_POLLS,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Bound the sweep-completion wait; `wait_sweep_complete` fails with
    /// [`InstrumentError::Timeout`] once the budget is exhausted.
    pub fn set_max_status_polls(&mut self, polls: usize) {
        self.max_status_polls = polls;
    }

    /// Inter-command pacing used while fetching sweep data. Zero disables it.
    pub fn set_settle_delay(&mut self, delay: Duration) {
        self.settle_delay = delay;
    }

    /// Close the session. Safe to call repeatedly; every call after the first
    /// is a no-op.
    pub async fn close(&mut self) -> Result<()> {
        if let Some(mut link) = self.transport.take() {
            link.close().await?;
        }
        Ok(())
    }

    pub async fn idn(&mut self) -> Result<String> {
        self.query(&scpi::query(cmd::IDENTIFY)).await
    }

    // ---- Tracking generator ----

    pub async fn set_tg_enabled(&mut self, on: bool) -> Result<()> {
        self.write(&scpi::set(cmd::TG_STATE, on as u8)).await
    }

    /// Set the TG output amplitude in dBm and return the accepted value.
    pub async fn set_tg_amplitude(&mut self, dbm: f64) -> Result<f64> {
        let dbm = limits::tg_amplitude(dbm)?;
        self.set_and_confirm_f64(cmd::TG_AMPLITUDE, dbm).await
    }

    pub async fn tg_amplitude(&mut self) -> Result<f64> {
        self.query_f64(cmd::TG_AMPLITUDE).await
    }

    // ---- Frequency ----

    /// Program the sweep limits and return the accepted (start, stop) pair.
    pub async fn set_freq_limits(&mut self, start_hz: f64, stop_hz: f64) -> Result<(f64, f64)> {
        let start_hz = limits::frequency("start frequency", start_hz)?;
        let stop_hz = limits::frequency("stop frequency", stop_hz)?;
        let start = self.set_and_confirm_f64(cmd::FREQ_START, start_hz).await?;
        let stop = self.set_and_confirm_f64(cmd::FREQ_STOP, stop_hz).await?;
        Ok((start, stop))
    }

    pub async fn set_center_frequency(&mut self, hz: f64) -> Result<f64> {
        let hz = limits::frequency("center frequency", hz)?;
        self.set_and_confirm_f64(cmd::FREQ_CENTER, hz).await
    }

    pub async fn center_frequency(&mut self) -> Result<f64> {
        self.query_f64(cmd::FREQ_CENTER).await
    }

    pub async fn set_span(&mut self, hz: f64) -> Result<f64> {
        let hz = limits::frequency("span", hz)?;
        self.set_and_confirm_f64(cmd::FREQ_SPAN, hz).await
    }

    pub async fn span(&mut self) -> Result<f64> {
        self.query_f64(cmd::FREQ_SPAN).await
    }

    // ---- Bandwidth ----

    pub async fn set_rbw(&mut self, hz: f64) -> Result<f64> {
        let hz = limits::resolution_bandwidth(hz)?;
        self.set_and_confirm_f64(cmd::RBW, hz).await
    }

    pub async fn rbw(&mut self) -> Result<f64> {
        self.query_f64(cmd::RBW).await
    }

    pub async fn set_vbw(&mut self, hz: f64) -> Result<f64> {
        let hz = limits::video_bandwidth(hz)?;
        self.set_and_confirm_f64(cmd::VBW, hz).await
    }

    pub async fn vbw(&mut self) -> Result<f64> {
        self.query_f64(cmd::VBW).await
    }

    // ---- RF front end ----

    /// Enable or disable the RF preamp and return the state the instrument
    /// reports afterwards.
    pub async fn set_preamp_enabled(&mut self, on: bool) -> Result<bool> {
        self.write(&scpi::set(cmd::PREAMP_STATE, on as u8)).await?;
        let state = self.query_bool01(cmd::PREAMP_STATE).await?;
        debug!("RF preamp is {}", if state { "enabled" } else { "disabled" });
        Ok(state)
    }

    /// Set the input attenuation in whole dB and return the accepted value.
    pub async fn set_input_attenuation(&mut self, db: f64) -> Result<u8> {
        let db = limits::attenuation(db)?;
        self.write(&scpi::set(cmd::ATTENUATION, db)).await?;
        let accepted = self.query_u32(cmd::ATTENUATION).await?;
        debug!("attenuator accepted {} dB", accepted);
        Ok(accepted as u8)
    }

    pub async fn input_attenuation(&mut self) -> Result<u8> {
        Ok(self.query_u32(cmd::ATTENUATION).await? as u8)
    }

    // ---- Trace ----

    pub async fn set_trace_mode(&mut self, trace: Trace, mode: TraceMode) -> Result<TraceMode> {
        let stem = scpi::trace_mode_stem(trace);
        self.write(&scpi::set(&stem, mode.as_scpi())).await?;
        let readback = self.query(&scpi::query(&stem)).await?;
        TraceMode::from_scpi(&readback)
    }

    pub async fn trace_mode(&mut self, trace: Trace) -> Result<TraceMode> {
        let readback = self.query(&scpi::query(&scpi::trace_mode_stem(trace))).await?;
        TraceMode::from_scpi(&readback)
    }

    // ---- Sweep ----

    pub async fn set_sweep_time(&mut self, seconds: f64) -> Result<f64> {
        let seconds = limits::sweep_time(seconds)?;
        self.set_and_confirm_f64(cmd::SWEEP_TIME, seconds).await
    }

    pub async fn sweep_time(&mut self) -> Result<f64> {
        self.query_f64(cmd::SWEEP_TIME).await
    }

    pub async fn set_sweep_count(&mut self, count: u32) -> Result<u32> {
        let count = limits::sweep_count(count)?;
        self.write(&scpi::set(cmd::SWEEP_COUNT, count)).await?;
        let accepted = self.query_u32(cmd::SWEEP_COUNT).await?;
        debug!("sweep count accepted as {}", accepted);
        Ok(accepted)
    }

    pub async fn sweep_count(&mut self) -> Result<u32> {
        self.query_u32(cmd::SWEEP_COUNT).await
    }

    pub async fn sweep_points(&mut self) -> Result<u32> {
        self.query_u32(cmd::SWEEP_POINTS).await
    }

    // ---- Data format ----

    pub async fn set_format(&mut self, format: DataFormat) -> Result<()> {
        self.write(&scpi::set(cmd::TRACE_FORMAT, format.as_scpi())).await
    }

    pub async fn format(&mut self) -> Result<DataFormat> {
        let readback = self.query(&scpi::query(cmd::TRACE_FORMAT)).await?;
        DataFormat::from_scpi(&readback)
    }

    // ---- Measurement ----

    /// Arm a single sweep, trigger it, and block until it completes.
    pub async fn initiate_measurement(&mut self) -> Result<()> {
        self.write(&scpi::set(cmd::INITIATE_CONTINUOUS, "OFF")).await?;
        self.write(cmd::INITIATE).await?;
        self.wait_sweep_complete().await
    }

    /// Poll the operation-condition register until the sweep-running bit
    /// clears, one status query per iteration with no inter-poll delay.
    ///
    /// The register is re-read every iteration. A transport fault mid-poll
    /// propagates immediately; if the bit never clears within the configured
    /// poll budget the wait fails with [`InstrumentError::Timeout`] instead
    /// of hanging on a sweep that will never finish.
    pub async fn wait_sweep_complete(&mut self) -> Result<()> {
        for _ in 0..self.max_status_polls {
            let condition = self.query_u32(cmd::OPERATION_CONDITION).await?;
            if condition & SWEEP_RUNNING == 0 {
                return Ok(());
            }
        }
        Err(InstrumentError::Timeout {
            polls: self.max_status_polls,
        })
    }

    /// Run one sweep on trace 1 and return its amplitudes in dBm.
    ///
    /// Forces WRITe mode and ASCII data format, triggers a single sweep,
    /// waits for completion, and parses the payload. Use [`Self::sweep_data`]
    /// when the frequency axis is needed as well.
    pub async fn measure_trace(&mut self) -> Result<Vec<f64>> {
        self.write(&scpi::set(cmd::INITIATE_CONTINUOUS, "OFF")).await?;
        self.write(&scpi::set(&scpi::trace_mode_stem(Trace::Tr1), TraceMode::Write.as_scpi()))
            .await?;
        self.write(&scpi::set(cmd::TRACE_FORMAT, DataFormat::Ascii.as_scpi()))
            .await?;
        self.write(cmd::INITIATE).await?;
        self.wait_sweep_complete().await?;

        let payload = self.query(&scpi::trace_data_query(TraceLabel::Trace1)).await?;
        trace::parse_amplitudes(&payload)
    }

    /// Fetch the most recent sweep from trace 1, pairing each amplitude with
    /// a synthesized frequency axis between the instrument's start and stop
    /// frequencies.
    pub async fn sweep_data(&mut self) -> Result<Sweep> {
        let start_hz = self.query_f64(cmd::FREQ_START).await?;
        self.settle().await;
        let stop_hz = self.query_f64(cmd::FREQ_STOP).await?;
        self.settle().await;
        let points = self.query_u32(cmd::SWEEP_POINTS).await? as usize;
        self.settle().await;

        // The payload arrives as its own response after the data query.
        self.write(&scpi::trace_data_query(TraceLabel::Trace1)).await?;
        let payload = self.read().await?;

        let amplitudes = trace::parse_amplitudes_expecting(&payload, points)?;
        Ok(Sweep::new(start_hz, stop_hz, amplitudes))
    }

    // ---- Instrument mass storage ----

    pub async fn delete_file(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::set(cmd::FILE_DELETE, path)).await
    }

    /// Disk name/type/capacity report, parsed from the instrument's
    /// `key: value` lines.
    pub async fn disk_info(&mut self) -> Result<BTreeMap<String, String>> {
        let report = self.query(&scpi::query(cmd::DISK_INFO)).await?;
        Ok(parse_key_values(&report))
    }

    pub async fn load_setup(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::set(cmd::LOAD_SETUP, path)).await
    }

    pub async fn load_state(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::set(cmd::LOAD_STATE, path)).await
    }

    pub async fn save_results(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::set(cmd::STORE_RESULTS, path)).await
    }

    pub async fn save_trace(&mut self, label: TraceLabel, path: &str) -> Result<()> {
        self.write(&scpi::store_trace(label, path)).await
    }

    /// Load a stored trace file into trace 1 and return its raw payload.
    ///
    /// The instrument does not answer the follow-up data query when the file
    /// is missing, so a link fault here is reported as
    /// [`InstrumentError::FileNotFound`].
    pub async fn load_trace(&mut self, path: &str) -> Result<String> {
        let fetch = async {
            self.write(&scpi::set(cmd::LOAD_TRACE, path)).await?;
            self.query(&scpi::trace_data_query(TraceLabel::Trace1)).await
        };
        fetch.await.map_err(|e| match e {
            InstrumentError::Communication(_) => InstrumentError::FileNotFound {
                path: path.to_string(),
            },
            other => other,
        })
    }

    pub async fn save_screenshot(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::set(cmd::STORE_SCREEN, path)).await
    }

    pub async fn save_setup(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::set(cmd::STORE_SETUP, path)).await
    }

    pub async fn save_state(&mut self, path: &str) -> Result<()> {
        self.write(&scpi::store_state(path)).await
    }

    // ---- Helpers ----

    fn link(&mut self) -> Result<&mut T> {
        self.transport.as_mut().ok_or(InstrumentError::NotConnected)
    }

    async fn write(&mut self, command: &str) -> Result<()> {
        self.link()?.write(command).await
    }

    async fn query(&mut self, command: &str) -> Result<String> {
        self.link()?.query(command).await
    }

    async fn read(&mut self) -> Result<String> {
        self.link()?.read().await
    }

    async fn settle(&mut self) {
        if !self.settle_delay.is_zero() {
            tokio::time::sleep(self.settle_delay).await;
        }
    }

    async fn set_and_confirm_f64(&mut self, stem: &'static str, value: f64) -> Result<f64> {
        self.write(&scpi::set(stem, value)).await?;
        let accepted = self.query_f64(stem).await?;
        debug!("{} accepted as {}", stem, accepted);
        Ok(accepted)
    }

    async fn query_f64(&mut self, stem: &str) -> Result<f64> {
        let command = scpi::query(stem);
        let response = self.query(&command).await?;
        parse_number(&command, &response, "a number")
    }

    async fn query_u32(&mut self, stem: &str) -> Result<u32> {
        let command = scpi::query(stem);
        let response = self.query(&command).await?;
        parse_number(&command, &response, "an integer")
    }

    async fn query_bool01(&mut self, stem: &str) -> Result<bool> {
        let command = scpi::query(stem);
        let response = self.query(&command).await?;
        match response.trim() {
            "1" => Ok(true),
            "0" => Ok(false),
            _ => Err(InstrumentError::MalformedResponse {
                command,
                response,
                expected: "0 or 1",
            }),
        }
    }
}

fn parse_number<N: std::str::FromStr>(
    command: &str,
    response: &str,
    expected: &'static str,
) -> Result<N> {
    response
        .trim()
        .parse::<N>()
        .map_err(|_| InstrumentError::MalformedResponse {
            command: command.to_string(),
            response: response.to_string(),
            expected,
        })
}

fn parse_key_values(report: &str) -> BTreeMap<String, String> {
    report
        .lines()
        .filter_map(|line| {
            line.split_once(':')
                .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}
