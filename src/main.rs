// Copyright (C) 2026 The ufpflash developers
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

// Unified Flashing Platform host utility
mod protocol;
mod session;
mod status;
mod usb;

use clap::{Parser, Subcommand};
use clap_num::maybe_hex;

use session::Session;
use usb::UsbChannel;

#[derive(Parser)]
#[command(name = "ufpflash")]
#[command(about = "Talk to a device in Unified Flashing Platform USB mode", long_about = None)]
#[command(disable_help_subcommand = true)]
struct Cli {
    /// USB vendor id of the target device
    #[arg(long, value_parser = maybe_hex::<u16>, default_value = "0x045E")]
    vid: u16,

    /// USB product id of the target device
    #[arg(long, value_parser = maybe_hex::<u16>, default_value = "0x066B")]
    pid: u16,

    /// Enable debug output
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Perform the hello handshake only
    Hello,
    /// Perform the hello handshake, then reboot the device
    Reboot,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if cli.debug { "debug" } else { "info" }),
    )
    .init();

    println!("Looking for device {:04x}:{:04x}", cli.vid, cli.pid);

    let channel = match UsbChannel::open(cli.vid, cli.pid) {
        Ok(channel) => channel,
        Err(e) => {
            eprintln!("Failed to open device: {}", e);
            std::process::exit(1);
        }
    };

    let mut session = Session::new(Box::new(channel));

    if let Err(e) = session.hello() {
        eprintln!("Fatal error, device did not answer properly to the hello message: {}", e);
        std::process::exit(1);
    }
    println!("Device answered the hello message");

    match cli.command {
        Commands::Hello => {}
        Commands::Reboot => match session.reboot() {
            Ok(status) if status.is_ok() => {
                println!("Reboot accepted");
            }
            Ok(status) => {
                eprintln!("Device rejected the reboot request: {}", status);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Reboot exchange failed: {}", e);
                std::process::exit(1);
            }
        },
    }
}
