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

//! Unified Flashing Platform command signatures and frame constants

#![allow(dead_code)]

// ============================================================================
// Prefix classes (not commands on their own)
// ============================================================================

/// Shared prefix of every command signature
pub const PREFIX: &[u8] = b"NOK";

/// Prefix of all extended messages
pub const EXTENDED_PREFIX: &[u8] = b"NOKX";

/// Prefix of the common extended command set
pub const COMMON_EXTENDED_PREFIX: &[u8] = b"NOKXC";

/// Prefix of the UFP extended command set
pub const UFP_EXTENDED_PREFIX: &[u8] = b"NOKXF";

// ============================================================================
// Base commands
// ============================================================================

/// Begin a flash operation
pub const FLASH: &[u8] = b"NOKF";

/// Hello - identify the device and establish the protocol
pub const HELLO: &[u8] = b"NOKI";

/// Expose storage as USB mass storage
pub const MASS_STORAGE: &[u8] = b"NOKM";

/// End a telemetry session
pub const TELEMETRY_END: &[u8] = b"NOKN";

/// Reboot the device
pub const REBOOT: &[u8] = b"NOKR";

/// Start a telemetry session
pub const TELEMETRY_START: &[u8] = b"NOKS";

/// Read the GUID partition table
pub const GET_GPT: &[u8] = b"NOKT";

/// Query device information
pub const INFO_QUERY: &[u8] = b"NOKV";

/// Power the device off
pub const SHUTDOWN: &[u8] = b"NOKZ";

// ============================================================================
// Common extended commands
// ============================================================================

/// Switch the device to another mode
pub const SWITCH_MODE: &[u8] = b"NOKXCB";

/// Clear the device screen
pub const CLEAR_SCREEN: &[u8] = b"NOKXCC";

/// List directory entries on the device
pub const GET_DIRECTORY_ENTRIES: &[u8] = b"NOKXCD";

/// Echo a payload back
pub const ECHO: &[u8] = b"NOKXCE";

/// Read a file from the device
pub const GET_FILE: &[u8] = b"NOKXCF";

/// Show a custom message on the device screen
pub const DISPLAY_CUSTOM_MESSAGE: &[u8] = b"NOKXCM";

/// Write a file to the device
pub const PUT_FILE: &[u8] = b"NOKXCP";

/// Run benchmark tests
pub const BENCHMARK_TESTS: &[u8] = b"NOKXCT";

// ============================================================================
// UFP extended commands
// ============================================================================

/// Enter asynchronous flash mode
pub const ASYNC_FLASH_MODE: &[u8] = b"NOKXFF";

/// Unlock the device
pub const UNLOCK: &[u8] = b"NOKXFI";

/// Relock the device
pub const RELOCK: &[u8] = b"NOKXFO";

/// Read a device parameter
pub const READ_PARAM: &[u8] = b"NOKXFR";

/// Begin a secure flash operation
pub const SECURE_FLASH: &[u8] = b"NOKXFS";

/// Read collected telemetry
pub const TELEMETRY_READ: &[u8] = b"NOKXFT";

/// Write a device parameter
pub const WRITE_PARAM: &[u8] = b"NOKXFW";

/// Retrieve device logs
pub const GET_LOGS: &[u8] = b"NOKXFX";

// ============================================================================
// Response frame layout
// ============================================================================

/// Capacity of the buffer a single response transfer is read into
pub const RESPONSE_CAPACITY: usize = 2048;

/// Offset of the big-endian 16-bit status code in a status frame
pub const STATUS_OFFSET: usize = 6;

/// Minimum length of a response carrying a status code
pub const STATUS_FRAME_LEN: usize = 8;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const BASE_COMMANDS: [&[u8]; 9] = [
        FLASH,
        HELLO,
        MASS_STORAGE,
        TELEMETRY_END,
        REBOOT,
        TELEMETRY_START,
        GET_GPT,
        INFO_QUERY,
        SHUTDOWN,
    ];

    const COMMON_EXTENDED_COMMANDS: [&[u8]; 8] = [
        SWITCH_MODE,
        CLEAR_SCREEN,
        GET_DIRECTORY_ENTRIES,
        ECHO,
        GET_FILE,
        DISPLAY_CUSTOM_MESSAGE,
        PUT_FILE,
        BENCHMARK_TESTS,
    ];

    const UFP_EXTENDED_COMMANDS: [&[u8]; 8] = [
        ASYNC_FLASH_MODE,
        UNLOCK,
        RELOCK,
        READ_PARAM,
        SECURE_FLASH,
        TELEMETRY_READ,
        WRITE_PARAM,
        GET_LOGS,
    ];

    fn assert_extends_by_one(commands: &[&[u8]], prefix: &[u8]) {
        for command in commands {
            assert!(
                command.starts_with(prefix),
                "{:?} does not extend {:?}",
                command,
                prefix
            );
            assert_eq!(
                command.len(),
                prefix.len() + 1,
                "{:?} must extend {:?} by exactly one byte",
                command,
                prefix
            );
        }
    }

    #[test]
    fn base_commands_extend_prefix_by_one_byte() {
        assert_extends_by_one(&BASE_COMMANDS, PREFIX);
    }

    #[test]
    fn common_extended_commands_extend_their_prefix_by_one_byte() {
        assert_extends_by_one(&COMMON_EXTENDED_COMMANDS, COMMON_EXTENDED_PREFIX);
    }

    #[test]
    fn ufp_extended_commands_extend_their_prefix_by_one_byte() {
        assert_extends_by_one(&UFP_EXTENDED_COMMANDS, UFP_EXTENDED_PREFIX);
    }

    #[test]
    fn extension_prefixes_build_on_each_other() {
        assert_eq!(EXTENDED_PREFIX, [PREFIX, b"X".as_slice()].concat());
        assert_eq!(
            COMMON_EXTENDED_PREFIX,
            [EXTENDED_PREFIX, b"C".as_slice()].concat()
        );
        assert_eq!(
            UFP_EXTENDED_PREFIX,
            [EXTENDED_PREFIX, b"F".as_slice()].concat()
        );
    }

    #[test]
    fn signatures_are_ascii_and_null_free() {
        let prefixes = [PREFIX, EXTENDED_PREFIX, COMMON_EXTENDED_PREFIX, UFP_EXTENDED_PREFIX];
        let all = BASE_COMMANDS
            .iter()
            .chain(COMMON_EXTENDED_COMMANDS.iter())
            .chain(UFP_EXTENDED_COMMANDS.iter())
            .chain(prefixes.iter());

        for signature in all {
            assert!(signature.len() >= 3 && signature.len() <= 7);
            for byte in signature.iter() {
                assert!(byte.is_ascii(), "{:?} is not pure ASCII", signature);
                assert_ne!(*byte, 0, "{:?} contains an interior null", signature);
            }
        }
    }

    #[test]
    fn signatures_differ_in_final_byte_within_class() {
        for class in [
            BASE_COMMANDS.as_slice(),
            COMMON_EXTENDED_COMMANDS.as_slice(),
            UFP_EXTENDED_COMMANDS.as_slice(),
        ] {
            let mut last_bytes: Vec<u8> = class.iter().map(|c| *c.last().unwrap()).collect();
            last_bytes.sort_unstable();
            last_bytes.dedup();
            assert_eq!(
                last_bytes.len(),
                class.len(),
                "two commands in the same class share a final byte"
            );
        }
    }
}
