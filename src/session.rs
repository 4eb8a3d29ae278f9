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

use crate::protocol::{HELLO, REBOOT, RESPONSE_CAPACITY, STATUS_FRAME_LEN, STATUS_OFFSET};
use crate::status::Status;
use crate::usb::{BulkChannel, ChannelError};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug)]
pub enum SessionError {
    Channel(ChannelError),
    HandshakeMismatch {
        sent: &'static [u8],
        received: Vec<u8>,
    },
    ShortResponse {
        len: usize,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Channel(e) => write!(f, "channel error: {}", e),
            SessionError::HandshakeMismatch { sent, received } => write!(
                f,
                "device did not echo {} (received {} bytes: {:02X?})",
                String::from_utf8_lossy(sent),
                received.len(),
                received
            ),
            SessionError::ShortResponse { len } => {
                write!(f, "response too short for a status frame: {} bytes", len)
            }
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Channel(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ChannelError> for SessionError {
    fn from(err: ChannelError) -> Self {
        SessionError::Channel(err)
    }
}

// ============================================================================
// Session
// ============================================================================

/// Drives command/response exchanges against an opened bulk channel.
///
/// The channel is exclusively owned for the lifetime of the session and
/// only one command/response pair is ever in flight. No operation retries;
/// every failure is surfaced to the caller after a single attempt.
pub struct Session {
    channel: Box<dyn BulkChannel>,
}

impl Session {
    pub fn new(channel: Box<dyn BulkChannel>) -> Self {
        Session { channel }
    }

    /// Send a command signature as the sole payload of one OUT transfer.
    pub fn command(&mut self, signature: &'static [u8]) -> Result<(), SessionError> {
        let written = self.channel.send(signature)?;
        log::debug!(
            "sent {} bytes: {}",
            written,
            String::from_utf8_lossy(signature)
        );
        Ok(())
    }

    /// Read a single response transfer into `buf`.
    pub fn read_response<'a>(&mut self, buf: &'a mut [u8]) -> Result<&'a [u8], SessionError> {
        let received = self.channel.receive(buf)?;
        log::debug!("received {} bytes: {}", received, hex_dump(&buf[..received]));
        Ok(&buf[..received])
    }

    /// Send `signature` and return the raw bytes of its response.
    ///
    /// Works for any of the enumerated signatures; how the response is to
    /// be interpreted is command-specific.
    pub fn exchange<'a>(
        &mut self,
        signature: &'static [u8],
        buf: &'a mut [u8],
    ) -> Result<&'a [u8], SessionError> {
        self.command(signature)?;
        self.read_response(buf)
    }

    /// Perform the hello handshake.
    ///
    /// The device must echo the hello signature byte for byte; any
    /// mismatch or truncation is fatal and no further command may be sent
    /// over this session.
    pub fn hello(&mut self) -> Result<(), SessionError> {
        let mut buf = [0u8; RESPONSE_CAPACITY];
        let echo = self.exchange(HELLO, &mut buf)?;

        if echo != HELLO {
            return Err(SessionError::HandshakeMismatch {
                sent: HELLO,
                received: echo.to_vec(),
            });
        }
        Ok(())
    }

    /// Request a reboot and decode the status frame of the reply.
    pub fn reboot(&mut self) -> Result<Status, SessionError> {
        let mut buf = [0u8; RESPONSE_CAPACITY];
        let frame = self.exchange(REBOOT, &mut buf)?;
        status_frame(frame)
    }
}

/// Decode the big-endian 16-bit status at bytes 6-7 of a status frame.
///
/// This layout is the documented rule for the status-frame responses
/// exercised here; commands with a different response shape need their own
/// parsing rule.
pub fn status_frame(frame: &[u8]) -> Result<Status, SessionError> {
    if frame.len() < STATUS_FRAME_LEN {
        return Err(SessionError::ShortResponse { len: frame.len() });
    }
    let code = u16::from_be_bytes([frame[STATUS_OFFSET], frame[STATUS_OFFSET + 1]]);
    Ok(Status::new(code))
}

fn hex_dump(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

// ============================================================================
// Tests
// ============================================================================
