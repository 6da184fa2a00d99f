//! Configure the analyzer, run one sweep, and dump it to a local CSV file.
//!
//! Mirrors a typical bench workflow: attenuate, tune, narrow the filters,
//! trigger a single sweep, then fetch amplitude-versus-frequency data.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dsa815_control::{Dsa815, TraceLabel};
use tokio::time::timeout;

#[derive(Parser)]
#[command(about = "Run a single sweep on a Rigol DSA815 and save it as CSV")]
struct Args {
    /// Instrument host name or IP address
    #[arg(long, default_value = "192.168.0.230")]
    host: String,

    /// VXI-11 resource name
    #[arg(long, default_value = "inst0")]
    resource: String,

    /// Center frequency in Hz
    #[arg(long, default_value_t = 80e6)]
    center: f64,

    /// Span in Hz
    #[arg(long, default_value_t = 130e3)]
    span: f64,

    /// Resolution bandwidth in Hz
    #[arg(long, default_value_t = 100.0)]
    rbw: f64,

    /// Video bandwidth in Hz
    #[arg(long, default_value_t = 100.0)]
    vbw: f64,

    /// Input attenuation in dB
    #[arg(long, default_value_t = 30.0)]
    attenuation: f64,

    /// Sweep time in seconds
    #[arg(long, default_value_t = 5.0)]
    sweep_time: f64,

    /// Local CSV output path
    #[arg(long, default_value = "sweep.csv")]
    output: String,

    /// Also store the trace on the instrument at this path
    #[arg(long)]
    store_trace: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args = Args::parse();

    let mut inst = timeout(
        Duration::from_secs(5),
        Dsa815::connect(&args.host, &args.resource),
    )
    .await
    .context("connecting to the DSA815 timed out")??;

    println!("Connected: {}", inst.idn().await?.trim());

    inst.set_input_attenuation(args.attenuation).await?;
    inst.set_center_frequency(args.center).await?;
    inst.set_span(args.span).await?;
    inst.set_rbw(args.rbw).await?;
    inst.set_vbw(args.vbw).await?;
    inst.set_sweep_count(1).await?;
    inst.set_sweep_time(args.sweep_time).await?;

    println!("Sweeping...");
    inst.initiate_measurement().await?;

    let sweep = inst.sweep_data().await?;
    let mut csv = String::from("frequency_hz,amplitude_dbm\n");
    for point in &sweep.points {
        csv.push_str(&format!("{},{}\n", point.frequency_hz, point.amplitude_dbm));
    }
    std::fs::write(&args.output, csv)
        .with_context(|| format!("writing sweep to {}", args.output))?;
    println!("{} points written to {}", sweep.points.len(), args.output);

    if let Some(path) = &args.store_trace {
        inst.save_trace(TraceLabel::Trace1, path).await?;
        println!("Trace stored on the instrument at {path}");
    }

    inst.close().await?;
    Ok(())
}
