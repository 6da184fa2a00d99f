use std::time::Duration;

use anyhow::Result;
use dsa815_control::Dsa815;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let host = args.get(1).map(String::as_str).unwrap_or("192.168.0.230");
    let resource = args.get(2).map(String::as_str).unwrap_or("inst0");

    let mut inst = match timeout(Duration::from_secs(5), Dsa815::connect(host, resource)).await {
        Ok(Ok(client)) => client,
        Ok(Err(e)) => return Err(e.into()),
        Err(_) => {
            eprintln!("Connecting to the DSA815 timed out (5 s); check power and network.");
            return Ok(());
        }
    };

    let idn = inst.idn().await?;
    println!("IDN: {}", idn.trim());

    let center = inst.set_center_frequency(80e6).await?;
    println!("Center frequency : {:.0} Hz", center);
    let span = inst.set_span(130e3).await?;
    println!("Span             : {:.0} Hz", span);
    let rbw = inst.set_rbw(100.0).await?;
    println!("RBW              : {:.0} Hz", rbw);
    let vbw = inst.set_vbw(100.0).await?;
    println!("VBW              : {:.0} Hz", vbw);
    let atten = inst.set_input_attenuation(10.0).await?;
    println!("Input attenuation: {} dB", atten);

    for (key, value) in inst.disk_info().await? {
        println!("Disk {key}: {value}");
    }

    inst.close().await?;
    Ok(())
}
