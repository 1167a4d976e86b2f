//! Bus router: maps a 32-bit address to one of eight 16 MiB regions and
//! dispatches a read or write of 8/16/32 bits to that region's handler.
//!
//! Region selection and the memory-backed read/write routines mirror the
//! donor C implementation's `busRead`/`busWrite`/`busReadMemory`/
//! `busWriteMemory` (`original_source/bus.c`), re-expressed as an
//! exhaustively-matched enum instead of a function-pointer table.

use crate::primitives::{align_address, format_sign_extend, format_width_bits, sign_extend};

/// Which of the eight 16 MiB pages an address falls into, selected by
/// address bits 26..24.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BusRegion {
    Vip,
    Vsu,
    HwControl,
    Reserved,
    CartExpansion,
    Wram,
    CartRam,
    CartRom,
}

impl BusRegion {
    pub(crate) fn for_address(address: u32) -> Self {
        match (address >> 24) & 7 {
            0 => Self::Vip,
            1 => Self::Vsu,
            2 => Self::HwControl,
            3 => Self::Reserved,
            4 => Self::CartExpansion,
            5 => Self::Wram,
            6 => Self::CartRam,
            7 => Self::CartRom,
            _ => unreachable!("address >> 24 & 7 is in 0..=7"),
        }
    }
}

/// A single encodes both width and sign-extension: low seven bits are width
/// in bits (8, 16, 32); the high bit set means sign-extend the loaded value
/// to 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusAccess {
    pub address: u32,
    pub format: u8,
}

impl BusAccess {
    pub fn new(address: u32, format: u8) -> Self {
        Self { address, format }
    }

    /// Whether `format` names a supported access width (8, 16, or 32 bits).
    pub fn is_valid_format(&self) -> bool {
        matches!(format_width_bits(self.format), 8 | 16 | 32)
    }

    /// The address naturally aligned down to this access's width.
    pub fn aligned_address(&self) -> u32 {
        align_address(self.address, format_width_bits(self.format))
    }
}

/// Read `width_bits` worth of little-endian data out of `data`, mirroring
/// `offset = address & (size - 1)` against a power-of-two-sized buffer, with
/// optional sign extension to 32 bits.
fn read_memory(data: &[u8], size: u32, address: u32, format: u8) -> i32 {
    let offset = (address & (size - 1)) as usize;
    let width = format_width_bits(format);
    let raw: u32 = match width {
        8 => data[offset] as u32,
        16 => (data[offset] as u32) | ((data[offset + 1] as u32) << 8),
        32 => {
            (data[offset] as u32)
                | ((data[offset + 1] as u32) << 8)
                | ((data[offset + 2] as u32) << 16)
                | ((data[offset + 3] as u32) << 24)
        }
        _ => 0,
    };
    if format_sign_extend(format) && width < 32 {
        sign_extend(raw, width)
    } else {
        raw as i32
    }
}

/// Write `width_bits` worth of little-endian data into `data`.
fn write_memory(data: &mut [u8], size: u32, address: u32, format: u8, value: i32) {
    let offset = (address & (size - 1)) as usize;
    let width = format_width_bits(format);
    let value = value as u32;
    data[offset] = (value & 0xFF) as u8;
    if width != 8 {
        data[offset + 1] = ((value >> 8) & 0xFF) as u8;
        if width == 32 {
            data[offset + 2] = ((value >> 16) & 0xFF) as u8;
            data[offset + 3] = ((value >> 24) & 0xFF) as u8;
        }
    }
}

/// The memory buffers a bus access may route to. Borrowed from [`crate::Context`]
/// for the duration of a single access so routing stays a free function
/// rather than a method with internal aliasing concerns.
pub(crate) struct BusMemories<'a> {
    pub wram: &'a mut [u8; 0x1_0000],
    pub cart_rom: &'a [u8],
    pub cart_ram: Option<&'a mut [u8]>,
}

/// Route and perform a bus read. `access.format` must already be validated.
pub(crate) fn read(memories: &BusMemories<'_>, access: BusAccess) -> i32 {
    match BusRegion::for_address(access.address) {
        BusRegion::Vip | BusRegion::Vsu | BusRegion::HwControl | BusRegion::Reserved | BusRegion::CartExpansion => 0,
        BusRegion::Wram => read_memory(memories.wram.as_slice(), 0x1_0000, access.address, access.format),
        BusRegion::CartRam => match memories.cart_ram.as_deref() {
            Some(ram) if !ram.is_empty() => read_memory(ram, ram.len() as u32, access.address, access.format),
            _ => 0,
        },
        BusRegion::CartRom => read_memory(memories.cart_rom, memories.cart_rom.len() as u32, access.address, access.format),
    }
}

/// Route and perform a bus write. `access.format` must already be validated.
/// Writes to ROM and unimplemented regions are silently ignored.
pub(crate) fn write(memories: &mut BusMemories<'_>, access: BusAccess, value: i32) {
    match BusRegion::for_address(access.address) {
        BusRegion::Vip | BusRegion::Vsu | BusRegion::HwControl | BusRegion::Reserved | BusRegion::CartExpansion => {}
        BusRegion::Wram => write_memory(memories.wram.as_mut_slice(), 0x1_0000, access.address, access.format, value),
        BusRegion::CartRam => {
            if let Some(ram) = memories.cart_ram.as_deref_mut()
                && !ram.is_empty()
            {
                let size = ram.len() as u32;
                write_memory(ram, size, access.address, access.format, value);
            }
        }
        BusRegion::CartRom => {}
    }
}

/// Read-only variant of [`read`] that needs no mutable borrows at all, used
/// by [`crate::Context::fetch`] to decode instruction half-words without
/// going through the debug-hooked, `&mut self` bus entry points.
pub(crate) fn peek(wram: &[u8; 0x1_0000], cart_rom: &[u8], cart_ram: Option<&[u8]>, address: u32, format: u8) -> i32 {
    match BusRegion::for_address(address) {
        BusRegion::Vip | BusRegion::Vsu | BusRegion::HwControl | BusRegion::Reserved | BusRegion::CartExpansion => 0,
        BusRegion::Wram => read_memory(wram, 0x1_0000, address, format),
        BusRegion::CartRam => match cart_ram {
            Some(ram) if !ram.is_empty() => read_memory(ram, ram.len() as u32, address, format),
            _ => 0,
        },
        BusRegion::CartRom => read_memory(cart_rom, cart_rom.len() as u32, address, format),
    }
}

/// Format constant for an unsigned 8-bit access (`VUE_U8`).
pub const FORMAT_U8: u8 = 0x08;
/// Format constant for a sign-extended 8-bit access (`VUE_S8`).
pub const FORMAT_S8: u8 = 0x88;
/// Format constant for an unsigned 16-bit access (`VUE_U16`).
pub const FORMAT_U16: u8 = 0x10;
/// Format constant for a sign-extended 16-bit access (`VUE_S16`).
pub const FORMAT_S16: u8 = 0x90;
/// Format constant for a 32-bit access (`VUE_32`, no sign extension needed).
pub const FORMAT_32: u8 = 0x20;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_routing_by_high_byte() {
        assert_eq!(BusRegion::for_address(0x0000_0000), BusRegion::Vip);
        assert_eq!(BusRegion::for_address(0x0100_0000), BusRegion::Vsu);
        assert_eq!(BusRegion::for_address(0x0200_0000), BusRegion::HwControl);
        assert_eq!(BusRegion::for_address(0x0300_0000), BusRegion::Reserved);
        assert_eq!(BusRegion::for_address(0x0400_0000), BusRegion::CartExpansion);
        assert_eq!(BusRegion::for_address(0x0500_0000), BusRegion::Wram);
        assert_eq!(BusRegion::for_address(0x0600_0000), BusRegion::CartRam);
        assert_eq!(BusRegion::for_address(0x0700_0000), BusRegion::CartRom);
        // Region selection ignores bits above 26..24.
        assert_eq!(BusRegion::for_address(0xFF00_0000), BusRegion::Vip);
    }

    #[test]
    fn wram_round_trip_little_endian() {
        let mut wram = Box::new([0u8; 0x1_0000]);
        let rom = [0u8; 1024];
        let mut memories = BusMemories {
            wram: &mut wram,
            cart_rom: &rom,
            cart_ram: None,
        };
        write(
            &mut memories,
            BusAccess::new(0x0500_0100, FORMAT_32),
            0xDEAD_BEEFu32 as i32,
        );
        assert_eq!(memories.wram[0x100], 0xEF);
        assert_eq!(memories.wram[0x101], 0xBE);
        assert_eq!(memories.wram[0x102], 0xAD);
        assert_eq!(memories.wram[0x103], 0xDE);
        let value = read(&memories, BusAccess::new(0x0500_0100, FORMAT_32));
        assert_eq!(value as u32, 0xDEAD_BEEF);
    }

    #[test]
    fn rom_writes_are_ignored() {
        let mut wram = Box::new([0u8; 0x1_0000]);
        let rom = [0xAAu8; 1024];
        let mut memories = BusMemories {
            wram: &mut wram,
            cart_rom: &rom,
            cart_ram: None,
        };
        write(&mut memories, BusAccess::new(0x0700_0000, FORMAT_U8), 0x55);
        assert_eq!(memories.cart_rom[0], 0xAA);
    }

    #[test]
    fn unmapped_reads_are_zero_regardless_of_format() {
        let mut wram = Box::new([0u8; 0x1_0000]);
        let rom = [0u8; 1024];
        let memories = BusMemories {
            wram: &mut wram,
            cart_rom: &rom,
            cart_ram: None,
        };
        for fmt in [FORMAT_U8, FORMAT_S8, FORMAT_U16, FORMAT_S16, FORMAT_32] {
            assert_eq!(read(&memories, BusAccess::new(0x0000_1234, fmt)), 0);
            assert_eq!(read(&memories, BusAccess::new(0x0400_1234, fmt)), 0);
        }
    }

    #[test]
    fn empty_cart_ram_reads_zero_and_ignores_writes() {
        let mut wram = Box::new([0u8; 0x1_0000]);
        let rom = [0u8; 1024];
        let mut ram: [u8; 0] = [];
        let mut memories = BusMemories {
            wram: &mut wram,
            cart_rom: &rom,
            cart_ram: Some(&mut ram),
        };
        write(&mut memories, BusAccess::new(0x0600_0000, FORMAT_U8), 0x7F);
        assert_eq!(read(&memories, BusAccess::new(0x0600_0000, FORMAT_U8)), 0);
    }

    #[test]
    fn sign_extension_applies_on_read() {
        let mut wram = Box::new([0u8; 0x1_0000]);
        let rom = [0u8; 1024];
        let mut memories = BusMemories {
            wram: &mut wram,
            cart_rom: &rom,
            cart_ram: None,
        };
        write(&mut memories, BusAccess::new(0x0500_0000, FORMAT_U8), 0xFF);
        assert_eq!(read(&memories, BusAccess::new(0x0500_0000, FORMAT_U8)), 0xFF);
        assert_eq!(read(&memories, BusAccess::new(0x0500_0000, FORMAT_S8)), -1);
    }
}
