//! Facade tests against a scripted transport.
//!
//! The script records every write and query the facade issues and serves
//! canned responses in order, so each test can assert on the exact SCPI
//! traffic as well as the parsed result.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use dsa815_control::{
    DataFormat, Dsa815, InstrumentError, Trace, TraceLabel, TraceMode, Transport,
};

#[derive(Default)]
struct Script {
    responses: VecDeque<String>,
    default_response: Option<String>,
    fail_queries: bool,
    writes: Vec<String>,
    queries: Vec<String>,
    reads: usize,
    closes: u32,
}

impl Script {
    fn next_response(&mut self) -> dsa815_control::Result<String> {
        if let Some(response) = self.responses.pop_front() {
            Ok(response)
        } else if let Some(default) = &self.default_response {
            Ok(default.clone())
        } else {
            Err(InstrumentError::Communication("script exhausted".into()))
        }
    }
}

#[derive(Clone, Default)]
struct ScriptedTransport(Rc<RefCell<Script>>);

impl ScriptedTransport {
    fn with_responses(responses: &[&str]) -> Self {
        let transport = Self::default();
        transport.0.borrow_mut().responses = responses.iter().map(|r| r.to_string()).collect();
        transport
    }
}

impl Transport for ScriptedTransport {
    async fn write(&mut self, command: &str) -> dsa815_control::Result<()> {
        self.0.borrow_mut().writes.push(command.to_string());
        Ok(())
    }

    async fn query(&mut self, command: &str) -> dsa815_control::Result<String> {
        let mut script = self.0.borrow_mut();
        script.queries.push(command.to_string());
        if script.fail_queries {
            return Err(InstrumentError::Communication("simulated timeout".into()));
        }
        script.next_response()
    }

    async fn read(&mut self) -> dsa815_control::Result<String> {
        let mut script = self.0.borrow_mut();
        script.reads += 1;
        script.next_response()
    }

    async fn close(&mut self) -> dsa815_control::Result<()> {
        self.0.borrow_mut().closes += 1;
        Ok(())
    }
}

fn facade(transport: &ScriptedTransport) -> Dsa815<ScriptedTransport> {
    let mut inst = Dsa815::with_transport(transport.clone());
    inst.set_settle_delay(Duration::ZERO);
    inst
}

#[tokio::test]
async fn rejected_setters_send_nothing() {
    let transport = ScriptedTransport::default();
    let mut inst = facade(&transport);

    assert!(matches!(
        inst.set_center_frequency(-1.0).await,
        Err(InstrumentError::OutOfRange { .. })
    ));
    assert!(matches!(
        inst.set_tg_amplitude(0.5).await,
        Err(InstrumentError::OutOfRange { .. })
    ));
    assert!(matches!(
        inst.set_input_attenuation(31.0).await,
        Err(InstrumentError::OutOfRange { .. })
    ));
    assert!(matches!(
        inst.set_input_attenuation(15.5).await,
        Err(InstrumentError::InvalidType { .. })
    ));
    assert!(matches!(
        inst.set_sweep_count(0).await,
        Err(InstrumentError::OutOfRange { .. })
    ));

    let script = transport.0.borrow();
    assert!(script.writes.is_empty(), "writes: {:?}", script.writes);
    assert!(script.queries.is_empty(), "queries: {:?}", script.queries);
}

#[tokio::test]
async fn accepted_setter_writes_once_then_reads_back() {
    let transport = ScriptedTransport::with_responses(&["80000000"]);
    let mut inst = facade(&transport);

    let accepted = inst.set_center_frequency(80e6).await.unwrap();
    assert_eq!(accepted, 80e6);

    let script = transport.0.borrow();
    assert_eq!(script.writes, vec![":SENSe:FREQuency:CENTer 80000000"]);
    assert_eq!(script.queries, vec![":SENSe:FREQuency:CENTer?"]);
}

#[tokio::test]
async fn setter_returns_the_clamped_value() {
    // The instrument quantizes RBW to 1-3-10 steps; the accepted value wins.
    let transport = ScriptedTransport::with_responses(&["100"]);
    let mut inst = facade(&transport);

    let accepted = inst.set_rbw(120.0).await.unwrap();
    assert_eq!(accepted, 100.0);
}

#[tokio::test]
async fn attenuation_boundaries_round_trip() {
    let transport = ScriptedTransport::with_responses(&["0", "30"]);
    let mut inst = facade(&transport);

    assert_eq!(inst.set_input_attenuation(0.0).await.unwrap(), 0);
    assert_eq!(inst.set_input_attenuation(30.0).await.unwrap(), 30);

    let script = transport.0.borrow();
    assert_eq!(
        script.writes,
        vec![
            ":SENSe:POWer:RF:ATTenuation 0",
            ":SENSe:POWer:RF:ATTenuation 30"
        ]
    );
}

#[tokio::test]
async fn trace_mode_readback_is_parsed() {
    let transport = ScriptedTransport::with_responses(&["MAXH"]);
    let mut inst = facade(&transport);

    let mode = inst.set_trace_mode(Trace::Tr2, TraceMode::MaxHold).await.unwrap();
    assert_eq!(mode, TraceMode::MaxHold);

    let script = transport.0.borrow();
    assert_eq!(script.writes, vec![":TRACe2:MODE MAXHold"]);
    assert_eq!(script.queries, vec![":TRACe2:MODE?"]);
}

#[tokio::test]
async fn poller_stops_on_the_query_that_clears_the_bit() {
    let transport = ScriptedTransport::with_responses(&["8", "8", "8", "0"]);
    let mut inst = facade(&transport);

    inst.wait_sweep_complete().await.unwrap();

    let script = transport.0.borrow();
    assert_eq!(script.queries.len(), 4);
    assert!(script
        .queries
        .iter()
        .all(|q| q == ":STATus:OPERation:CONDition?"));
}

#[tokio::test]
async fn poller_times_out_when_the_bit_never_clears() {
    let transport = ScriptedTransport::default();
    transport.0.borrow_mut().default_response = Some("8".to_string());
    let mut inst = facade(&transport);
    inst.set_max_status_polls(25);

    let err = inst.wait_sweep_complete().await.unwrap_err();
    assert!(matches!(err, InstrumentError::Timeout { polls: 25 }));
    assert_eq!(transport.0.borrow().queries.len(), 25);
}

#[tokio::test]
async fn poller_rejects_a_non_numeric_status_reply() {
    let transport = ScriptedTransport::with_responses(&["garbage"]);
    let mut inst = facade(&transport);

    assert!(matches!(
        inst.wait_sweep_complete().await,
        Err(InstrumentError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn poller_propagates_a_transport_fault() {
    let transport = ScriptedTransport::default();
    transport.0.borrow_mut().fail_queries = true;
    let mut inst = facade(&transport);

    assert!(matches!(
        inst.wait_sweep_complete().await,
        Err(InstrumentError::Communication(_))
    ));
    assert_eq!(transport.0.borrow().queries.len(), 1);
}

#[tokio::test]
async fn sweep_data_pairs_axis_with_amplitudes() {
    let transport = ScriptedTransport::with_responses(&[
        "79935000",
        "80065000",
        "3",
        "1,-42.5,-10.0,-55.3",
    ]);
    let mut inst = facade(&transport);

    let sweep = inst.sweep_data().await.unwrap();
    assert_eq!(sweep.start_hz, 79.935e6);
    assert_eq!(sweep.stop_hz, 80.065e6);
    let pairs: Vec<(f64, f64)> = sweep
        .points
        .iter()
        .map(|p| (p.frequency_hz, p.amplitude_dbm))
        .collect();
    assert_eq!(
        pairs,
        vec![(79.935e6, -42.5), (80.0e6, -10.0), (80.065e6, -55.3)]
    );

    let script = transport.0.borrow();
    assert_eq!(script.writes, vec![":TRACe:DATA? TRACE1"]);
    assert_eq!(script.reads, 1);
}

#[tokio::test]
async fn sweep_data_rejects_a_bad_token() {
    let transport =
        ScriptedTransport::with_responses(&["79935000", "80065000", "3", "-42.5,oops,-55.3"]);
    let mut inst = facade(&transport);

    match inst.sweep_data().await.unwrap_err() {
        InstrumentError::MalformedTraceData(detail) => {
            assert!(detail.contains("\"oops\""), "{detail}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn measure_trace_arms_triggers_polls_and_parses() {
    let transport =
        ScriptedTransport::with_responses(&["8", "0", "#9000000031 -42.5, -10.0, -55.3"]);
    let mut inst = facade(&transport);

    let amplitudes = inst.measure_trace().await.unwrap();
    assert_eq!(amplitudes, vec![-42.5, -10.0, -55.3]);

    let script = transport.0.borrow();
    assert_eq!(
        script.writes,
        vec![
            ":INITiate:CONTinuous OFF",
            ":TRACe1:MODE WRITe",
            ":FORMat:TRACe:DATA ASCii",
            ":INITiate:IMMediate",
        ]
    );
    assert_eq!(
        script.queries,
        vec![
            ":STATus:OPERation:CONDition?",
            ":STATus:OPERation:CONDition?",
            ":TRACe:DATA? TRACE1",
        ]
    );
}

#[tokio::test]
async fn format_and_file_commands_use_the_documented_forms() {
    let transport = ScriptedTransport::default();
    let mut inst = facade(&transport);

    inst.set_format(DataFormat::Real32).await.unwrap();
    inst.save_trace(TraceLabel::Trace1, "D:\\Trace1.trc").await.unwrap();
    inst.save_state("D:\\state.sta").await.unwrap();
    inst.delete_file("E:\\old.trc").await.unwrap();

    let script = transport.0.borrow();
    assert_eq!(
        script.writes,
        vec![
            ":FORMat:TRACe:DATA REAL,32",
            ":MMEMory:STORe:TRACe TRACE1,D:\\Trace1.trc",
            ":MMEMory:STORe:STATe 1,D:\\state.sta",
            ":MMEMory:DELete E:\\old.trc",
        ]
    );
}

#[tokio::test]
async fn disk_info_parses_the_report() {
    let transport = ScriptedTransport::with_responses(&[
        "Disk Name: Local\nType: FLASH\nFile System: FAT32\nUsed: 5MB\nTotal: 64MB",
    ]);
    let mut inst = facade(&transport);

    let info = inst.disk_info().await.unwrap();
    assert_eq!(info["Disk Name"], "Local");
    assert_eq!(info["Total"], "64MB");
}

#[tokio::test]
async fn load_trace_maps_a_link_fault_to_file_not_found() {
    let transport = ScriptedTransport::default();
    transport.0.borrow_mut().fail_queries = true;
    let mut inst = facade(&transport);

    match inst.load_trace("D:\\missing.trc").await.unwrap_err() {
        InstrumentError::FileNotFound { path } => assert_eq!(path, "D:\\missing.trc"),
        other => panic!("unexpected error: {other}"),
    }
    // The load command itself still went out before the fault.
    assert_eq!(
        transport.0.borrow().writes,
        vec![":MMEMory:LOAD:TRACe D:\\missing.trc"]
    );
}

#[tokio::test]
async fn close_is_idempotent() {
    let transport = ScriptedTransport::default();
    let mut inst = facade(&transport);

    inst.close().await.unwrap();
    inst.close().await.unwrap();
    assert_eq!(transport.0.borrow().closes, 1);

    assert!(matches!(
        inst.idn().await,
        Err(InstrumentError::NotConnected)
    ));
}
