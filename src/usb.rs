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

use std::fmt;
use std::time::Duration;

use rusb::{DeviceHandle, GlobalContext};

/// Bulk OUT endpoint carrying command payloads
pub const ENDPOINT_OUT: u8 = 0x01;

/// Bulk IN endpoint carrying responses
pub const ENDPOINT_IN: u8 = 0x81;

/// Timeout applied to every bulk transfer
pub const TRANSFER_TIMEOUT: Duration = Duration::from_millis(1000);

// ============================================================================
// BulkChannel Trait
// ============================================================================

/// Trait for bulk-endpoint operations needed by the flashing protocol
pub trait BulkChannel: Send {
    /// Write `buf` to the OUT endpoint, returning the bytes transferred.
    fn send(&mut self, buf: &[u8]) -> Result<usize, ChannelError>;

    /// Read one transfer from the IN endpoint into `buf`, returning the
    /// bytes transferred.
    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError>;
}

// ============================================================================
// Channel Errors
// ============================================================================

/// Channel-level failures, kept distinct from device-reported status codes
#[derive(Debug)]
pub enum ChannelError {
    NotFound,
    Timeout,
    Stall,
    Disconnected,
    Usb(rusb::Error),
}

impl fmt::Display for ChannelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelError::NotFound => write!(f, "no device with a matching vendor/product id"),
            ChannelError::Timeout => write!(f, "bulk transfer timed out"),
            ChannelError::Stall => write!(f, "endpoint stalled"),
            ChannelError::Disconnected => write!(f, "device disconnected"),
            ChannelError::Usb(e) => write!(f, "USB error: {}", e),
        }
    }
}

impl std::error::Error for ChannelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ChannelError::Usb(e) => Some(e),
            _ => None,
        }
    }
}

impl From<rusb::Error> for ChannelError {
    fn from(err: rusb::Error) -> Self {
        match err {
            rusb::Error::Timeout => ChannelError::Timeout,
            rusb::Error::Pipe => ChannelError::Stall,
            rusb::Error::NoDevice => ChannelError::Disconnected,
            other => ChannelError::Usb(other),
        }
    }
}

// ============================================================================
// Real USB Channel Implementation
// ============================================================================

/// Bulk channel bound to an opened flashing-mode device
pub struct UsbChannel {
    handle: DeviceHandle<GlobalContext>,
}

impl UsbChannel {
    /// Open the first device matching `vid`/`pid` and claim its interface.
    pub fn open(vid: u16, pid: u16) -> Result<Self, ChannelError> {
        for device in rusb::devices()?.iter() {
            let descriptor = match device.device_descriptor() {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    log::debug!("skipping device without a readable descriptor: {}", e);
                    continue;
                }
            };

            if descriptor.vendor_id() != vid || descriptor.product_id() != pid {
                continue;
            }

            log::debug!(
                "found {:04x}:{:04x} on bus {} address {}",
                vid,
                pid,
                device.bus_number(),
                device.address()
            );

            let mut handle = device.open()?;
            // No-op on platforms without kernel driver support
            let _ = handle.set_auto_detach_kernel_driver(true);
            handle.claim_interface(0)?;
            return Ok(UsbChannel { handle });
        }

        Err(ChannelError::NotFound)
    }
}

impl BulkChannel for UsbChannel {
    fn send(&mut self, buf: &[u8]) -> Result<usize, ChannelError> {
        let written = self
            .handle
            .write_bulk(ENDPOINT_OUT, buf, TRANSFER_TIMEOUT)?;
        Ok(written)
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        let read = self.handle.read_bulk(ENDPOINT_IN, buf, TRANSFER_TIMEOUT)?;
        Ok(read)
    }
}

impl Drop for UsbChannel {
    fn drop(&mut self) {
        // Claimed in open()
        let _ = self.handle.release_interface(0);
    }
}

// ============================================================================
// Mock Channel for Testing
// ============================================================================

#[cfg(test)]
pub struct MockChannel {
    // Transfers to return on reads (None = timeout)
    responses: Vec<Option<Vec<u8>>>,
    response_pos: usize,
    // Track what was written
    write_log: Vec<u8>,
    // Expected writes for verification
    expected_writes: Vec<u8>,
}

#[cfg(test)]
impl MockChannel {
    pub fn new(responses: Vec<Option<Vec<u8>>>, expected_writes: Vec<u8>) -> Self {
        MockChannel {
            responses,
            response_pos: 0,
            write_log: Vec::new(),
            expected_writes,
        }
    }
}

#[cfg(test)]
impl BulkChannel for MockChannel {
    fn send(&mut self, buf: &[u8]) -> Result<usize, ChannelError> {
        self.write_log.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, ChannelError> {
        // Out of responses = timeout
        let Some(slot) = self.responses.get(self.response_pos) else {
            return Err(ChannelError::Timeout);
        };
        self.response_pos += 1;

        match slot {
            None => Err(ChannelError::Timeout),
            Some(transfer) => {
                let count = transfer.len().min(buf.len());
                buf[..count].copy_from_slice(&transfer[..count]);
                Ok(count)
            }
        }
    }
}

#[cfg(test)]
impl Drop for MockChannel {
    fn drop(&mut self) {
        assert_eq!(
            self.response_pos,
            self.responses.len(),
            "MockChannel dropped with {} unconsumed responses",
            self.responses.len() - self.response_pos
        );

        assert_eq!(
            &self.write_log,
            &self.expected_writes,
            "MockChannel write log mismatch!\nExpected {} bytes:\n{:02X?}\nGot {} bytes:\n{:02X?}",
            self.expected_writes.len(),
            self.expected_writes,
            self.write_log.len(),
            self.write_log
        );
    }
}
