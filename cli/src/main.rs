mod platform;

use std::io::{stdin, BufRead};
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use hce::apdu::Handler;
use hce::{codec, manager, LifecycleEvent, Manager, Responder, Session};

use crate::platform::Simulator;

#[derive(Debug, thiserror::Error)]
enum Error {
    #[error("Could not start emulation: {0}")]
    Manager(#[from] manager::Error),

    #[error("Invalid APDU: {0}")]
    Apdu(#[from] codec::Error),

    #[error("Could not read from stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not serialize the event: {0}")]
    Json(#[from] serde_json::Error),
}

type Result<T> = std::result::Result<T, Error>;

/// Emulates a card and answers APDUs as a contactless reader would send them.
///
/// APDUs are hex text, colons and spaces allowed. When none is given as an argument,
/// they are read from stdin, one per line.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Identifier of the emulated card, e.g. 04:A2:B3:C4.
    #[arg(long)]
    uid: Option<String>,

    /// Payload returned to SELECT and READ BINARY, in hex text.
    #[arg(long)]
    data: Option<String>,

    /// Card technology, accepted for compatibility with host apps.
    #[arg(long)]
    technology: Option<String>,

    /// Drops the link with the reason code after the exchange.
    #[arg(long, value_name = "REASON", conflicts_with = "stop")]
    deactivate: Option<i32>,

    /// Stops the emulation after the exchange.
    #[arg(long)]
    stop: bool,

    /// Prints lifecycle events as JSON lines.
    #[arg(long)]
    events: bool,

    /// APDUs to send.
    apdus: Vec<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    debug!("{:?}", cli);

    let session = Arc::new(Session::new());
    let events = cli.events.then(|| session.subscribe());
    let manager = Manager::new(Arc::clone(&session), Simulator);
    let responder = Responder::new(Arc::clone(&session));

    manager.start_emulation(
        cli.uid.as_deref(),
        cli.data.as_deref(),
        cli.technology.as_deref(),
    )?;
    print_events(events.as_ref())?;

    if cli.apdus.is_empty() {
        info!("Reading APDUs from stdin");

        for line in stdin().lock().lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            exchange(&responder, line)?;
        }
    } else {
        for apdu in &cli.apdus {
            exchange(&responder, apdu)?;
        }
    }

    if let Some(reason) = cli.deactivate {
        session.deactivate(reason);
    } else if cli.stop {
        manager.stop_emulation();
    }
    print_events(events.as_ref())?;

    Ok(())
}

fn exchange(responder: &Responder, apdu: &str) -> Result<()> {
    let command = codec::decode(apdu)?;
    let response = responder.handle(&command);

    println!(
        "{} -> {}",
        hex::encode_upper(&command),
        hex::encode_upper(&response)
    );

    Ok(())
}

fn print_events(events: Option<&Receiver<LifecycleEvent>>) -> Result<()> {
    if let Some(events) = events {
        for event in events.try_iter() {
            println!("{}", serde_json::to_string(&event)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli() {
        Cli::command().debug_assert();

        let cli = Cli::try_parse_from([
            "hce",
            "--uid",
            "04:A2:B3:C4",
            "--deactivate",
            "1",
            "00A4040007F0010203040506",
            "FF CA 00 00 00",
        ])
        .unwrap();

        assert_eq!(Some("04:A2:B3:C4".to_string()), cli.uid);
        assert_eq!(Some(1), cli.deactivate);
        assert_eq!(2, cli.apdus.len());
        assert!(Cli::try_parse_from(["hce", "--deactivate", "1", "--stop"]).is_err());
    }
}
