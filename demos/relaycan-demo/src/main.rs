//! Wire a Master and a Slave over the simulated loopback controller and print
//! the bus traffic until the requested number of command cycles completes.

use anyhow::{bail, Context, Result};
use clap::Parser;
use embedded_can::{Frame as _, Id};
use relaycan::wire::{COMMAND_STD_ID, STATUS_STD_ID};
use relaycan::{MasterNode, OperationCommand, OperationStatus, ProtocolConfig, SlaveNode};
use relaycan_sim::SimCan;
use relaycan_transport::{BusFrame, CanController};
use std::time::Duration;

#[derive(Parser)]
#[command(about = "relaycan Master/Slave demo on the loopback simulator")]
struct Args {
    /// Command rate in Hz.
    #[arg(long, default_value_t = 1)]
    command_hz: u32,
    /// Status rate in Hz; must be an integer multiple of the command rate.
    #[arg(long, default_value_t = 10)]
    status_hz: u32,
    /// Number of command cycles to observe before exiting.
    #[arg(long, default_value_t = 4)]
    cycles: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = ProtocolConfig {
        command_hz: args.command_hz,
        status_hz: args.status_hz,
        ..ProtocolConfig::default()
    };
    config.validate().context("invalid frequency configuration")?;

    let can = SimCan::new();
    let tap = can.tap();
    let (controller, irq) = CanController::new(can.clone());
    can.bind_interrupts(irq.clone());

    let slave = SlaveNode::new(config.clone(), controller.clone(), &irq)
        .context("slave initialization failed")?;
    let master =
        MasterNode::new(config.clone(), controller, &irq).context("master initialization failed")?;
    let _slave = slave.spawn().context("spawn slave")?;
    let _master = master.spawn().context("spawn master")?;

    // Generous bound: a cycle takes one command period plus scheduling slack.
    let frame_timeout = Duration::from_millis(1000 / u64::from(args.command_hz) + 2000);

    let mut commands_seen = 0;
    while commands_seen < args.cycles {
        let frame = tap
            .recv_timeout(frame_timeout)
            .context("bus went silent")?;
        if frame_std_id(&frame) == Some(COMMAND_STD_ID) {
            commands_seen += 1;
        }
        print_frame(&frame)?;
    }
    Ok(())
}

fn frame_std_id(frame: &BusFrame) -> Option<u16> {
    match frame.id() {
        Id::Standard(id) => Some(id.as_raw()),
        Id::Extended(_) => None,
    }
}

fn print_frame(frame: &BusFrame) -> Result<()> {
    match frame_std_id(frame) {
        Some(COMMAND_STD_ID) => {
            let command = OperationCommand::decode(frame.data())?;
            println!("-> 0x{COMMAND_STD_ID:03X} command {command:?}");
        }
        Some(STATUS_STD_ID) => {
            let status = OperationStatus::decode(frame.data())?;
            let state = if status.on { "ON" } else { "OFF" };
            println!("<- 0x{STATUS_STD_ID:03X} status {state} value {}", status.value);
        }
        Some(other) => bail!("unexpected identifier 0x{other:03X} on the bus"),
        None => bail!("unexpected extended identifier on the bus"),
    }
    Ok(())
}
