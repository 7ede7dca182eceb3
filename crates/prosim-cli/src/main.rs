//! Demo driver for the queueing engine.
//!
//! Runs the simulator for a short window, pauses to print a status
//! snapshot, resumes, and stops. Usage:
//!
//! ```text
//! prosim-cli [lifo|per] [seconds]
//! ```

use std::time::Duration;

use prosim_core::{ProcessorSimulator, StorageKind};
use tokio::time::sleep;

fn parse_kind(arg: Option<&str>) -> StorageKind {
    match arg {
        Some("lifo") => StorageKind::Lifo,
        _ => StorageKind::Per,
    }
}

async fn print_status(sim: &ProcessorSimulator) {
    let status = sim.status().await;
    match serde_json::to_string_pretty(&status) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("status serialization failed: {e}"),
    }
}

#[tokio::main]
async fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let kind = parse_kind(args.get(1).map(String::as_str));
    let seconds: u64 = args
        .get(2)
        .and_then(|s| s.parse().ok())
        .unwrap_or(3);

    let sim = ProcessorSimulator::new();
    if let Err(e) = sim.initialize(kind).await {
        eprintln!("initialize failed: {e}");
        return;
    }

    // A mildly overloaded system so both disciplines have visible queues.
    sim.change_lambda(4.0).expect("valid lambda");
    sim.change_mu(2.0).expect("valid mu");
    sim.change_tau(0.1).expect("valid tau");

    log::info!("running {kind:?} for {seconds}s");
    sim.start().await.expect("start after initialize");
    sleep(Duration::from_secs(seconds)).await;

    sim.pause().await.expect("pause while running");
    println!("--- paused ---");
    print_status(&sim).await;

    // Resume for the same window, then shut down.
    sim.start().await.expect("resume from pause");
    sleep(Duration::from_secs(seconds)).await;

    sim.pause().await.expect("pause before final snapshot");
    println!("--- final ---");
    print_status(&sim).await;

    sim.stop().await.expect("stop from paused");
}
