//! Relay node demo
//!
//! Run with: cargo run --example relay_node [LOG_NODE_ADDR]
//!
//! Examples:
//!   cargo run --example relay_node                  # local sink on 127.0.0.1:4510
//!   cargo run --example relay_node 10.0.0.7:4510    # forward to a remote logging node
//!
//! Without an address the demo starts its own logging sink so the whole
//! pipeline (producer → bus → relay → TCP → sink) runs in one process.

use std::net::SocketAddr;
use std::time::Duration;

use telemetry_relay::bus::{InProcessBus, TelemetrySample, SAMPLE_SIZE};
use telemetry_relay::relay::{RelayConfig, TelemetryRelay};
use telemetry_relay::status::TracingSignal;
use telemetry_relay::transport::{TcpTransport, TransportConfig};
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 4510;

/// Parse a logging node address ("host:port", "ip" or "localhost")
fn parse_node_addr(arg: &str) -> Result<SocketAddr, String> {
    let normalized = arg.replace("localhost", "127.0.0.1");

    if let Ok(addr) = normalized.parse::<SocketAddr>() {
        return Ok(addr);
    }

    if let Ok(ip) = normalized.parse::<std::net::IpAddr>() {
        return Ok(SocketAddr::new(ip, DEFAULT_PORT));
    }

    Err(format!(
        "Invalid node address: '{}'. Expected format: IP:PORT or IP or 'localhost'",
        arg
    ))
}

fn print_usage() {
    eprintln!("Usage: relay_node [LOG_NODE_ADDR]");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  LOG_NODE_ADDR    Logging node to forward to (default: local sink)");
}

/// Stand-in for the logging node: prints every packet it receives
async fn run_sink(listener: TcpListener) {
    loop {
        let (mut socket, peer) = match listener.accept().await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(error = %e, "Sink accept failed");
                continue;
            }
        };

        let mut packet = Vec::with_capacity(SAMPLE_SIZE);
        match socket.read_to_end(&mut packet).await {
            Ok(_) => println!("[sink] {} bytes from {}: {:02x?}", packet.len(), peer, packet),
            Err(e) => tracing::warn!(error = %e, "Sink read failed"),
        }
    }
}

/// Stand-in for the aggregator: publishes a counter sample every 250 ms
async fn run_producer(bus: InProcessBus) {
    let mut ticker = tokio::time::interval(Duration::from_millis(250));
    let mut counter: u32 = 0;

    loop {
        ticker.tick().await;
        counter = counter.wrapping_add(1);

        let mut payload = [0u8; SAMPLE_SIZE];
        payload[..4].copy_from_slice(&counter.to_le_bytes());
        let receivers = bus.publish(TelemetrySample::new(1, payload)).await;

        tracing::debug!(counter = counter, receivers = receivers, "Sample published");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("telemetry_relay=debug".parse()?)
                .add_directive("relay_node=debug".parse()?),
        )
        .init();

    let destination = match args.get(1) {
        Some(arg) => match parse_node_addr(arg) {
            Ok(addr) => addr,
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        },
        None => {
            let listener = TcpListener::bind(("127.0.0.1", DEFAULT_PORT)).await?;
            let addr = listener.local_addr()?;
            tokio::spawn(run_sink(listener));
            println!("Local logging sink on {}", addr);
            addr
        }
    };

    let bus = InProcessBus::new();
    tokio::spawn(run_producer(bus.clone()));

    let relay = TelemetryRelay::new(
        bus,
        TcpTransport::new(TransportConfig::default()),
        TracingSignal,
        RelayConfig::with_destination(destination),
    );
    let stats = relay.stats();

    println!("Relaying telemetry to {} (Ctrl+C to stop)", destination);

    let result = relay
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    if let Err(e) = result {
        eprintln!("Relay error: {}", e);
    }

    let snapshot = stats.snapshot();
    println!(
        "Stats: read={} sent={} dropped={} lagged={}",
        snapshot.samples_read,
        snapshot.sent,
        snapshot.dropped(),
        snapshot.lagged_samples
    );

    Ok(())
}
