//! Opcode lookup tables. `OPCODE_TABLE` is keyed by the 6-bit primary opcode
//! (`original_source/instructiondefs.c`'s `OPDEFS[]`); `BITSTRING_TABLE` and
//! `FLOAT_EXT_TABLE` are the two sub-opcode tables it fans out to
//! (`BITSTRINGDEFS[]`, `FLOATENDODEFS[]`).
//!
//! Opcode 31 (the bit-string family) and opcode 62 (the FPU/extension family)
//! carry a placeholder [`InstructionId::Illegal`] here; the real id is
//! resolved from the matching sub-table once the sub-opcode field has been
//! decoded.

use super::{Format, InstructionId};

#[derive(Debug, Clone, Copy)]
pub(crate) struct OpDef {
    pub format: Format,
    pub sign_extend: bool,
    pub id: InstructionId,
}

const fn op(format: Format, sign_extend: bool, id: InstructionId) -> OpDef {
    OpDef {
        format,
        sign_extend,
        id,
    }
}

/// Indexed by the 6-bit opcode extracted from the first half-word's top bits.
pub(crate) const OPCODE_TABLE: [OpDef; 64] = [
    /* 0  */ op(Format::I, false, InstructionId::MovReg),
    /* 1  */ op(Format::I, false, InstructionId::AddReg),
    /* 2  */ op(Format::I, false, InstructionId::Sub),
    /* 3  */ op(Format::I, false, InstructionId::CmpReg),
    /* 4  */ op(Format::I, false, InstructionId::ShlReg),
    /* 5  */ op(Format::I, false, InstructionId::ShrReg),
    /* 6  */ op(Format::I, false, InstructionId::Jmp),
    /* 7  */ op(Format::I, false, InstructionId::SarReg),
    /* 8  */ op(Format::I, false, InstructionId::Mul),
    /* 9  */ op(Format::I, false, InstructionId::Div),
    /* 10 */ op(Format::I, false, InstructionId::Mulu),
    /* 11 */ op(Format::I, false, InstructionId::Divu),
    /* 12 */ op(Format::I, false, InstructionId::Or),
    /* 13 */ op(Format::I, false, InstructionId::And),
    /* 14 */ op(Format::I, false, InstructionId::Xor),
    /* 15 */ op(Format::I, false, InstructionId::Not),
    /* 16 */ op(Format::II, true, InstructionId::MovImm),
    /* 17 */ op(Format::II, true, InstructionId::AddImm),
    /* 18 */ op(Format::II, false, InstructionId::Setf),
    /* 19 */ op(Format::II, true, InstructionId::CmpImm),
    /* 20 */ op(Format::II, false, InstructionId::ShlImm),
    /* 21 */ op(Format::II, false, InstructionId::ShrImm),
    /* 22 */ op(Format::II, false, InstructionId::Cli),
    /* 23 */ op(Format::II, false, InstructionId::SarImm),
    /* 24 */ op(Format::II, false, InstructionId::Trap),
    /* 25 */ op(Format::II, false, InstructionId::Reti),
    /* 26 */ op(Format::II, false, InstructionId::Halt),
    /* 27 */ op(Format::II, false, InstructionId::Illegal),
    /* 28 */ op(Format::II, false, InstructionId::Ldsr),
    /* 29 */ op(Format::II, false, InstructionId::Stsr),
    /* 30 */ op(Format::II, false, InstructionId::Sei),
    /* 31 */ op(Format::II, false, InstructionId::Illegal), // bit-string dispatch
    /* 32 */ op(Format::III, false, InstructionId::Bcond),
    /* 33 */ op(Format::III, false, InstructionId::Bcond),
    /* 34 */ op(Format::III, false, InstructionId::Bcond),
    /* 35 */ op(Format::III, false, InstructionId::Bcond),
    /* 36 */ op(Format::III, false, InstructionId::Bcond),
    /* 37 */ op(Format::III, false, InstructionId::Bcond),
    /* 38 */ op(Format::III, false, InstructionId::Bcond),
    /* 39 */ op(Format::III, false, InstructionId::Bcond),
    /* 40 */ op(Format::V, true, InstructionId::Movea),
    /* 41 */ op(Format::V, true, InstructionId::AddI),
    /* 42 */ op(Format::IV, false, InstructionId::Jr),
    /* 43 */ op(Format::IV, false, InstructionId::Jal),
    /* 44 */ op(Format::V, false, InstructionId::Ori),
    /* 45 */ op(Format::V, false, InstructionId::Andi),
    /* 46 */ op(Format::V, false, InstructionId::Xori),
    /* 47 */ op(Format::V, false, InstructionId::Movhi),
    /* 48 */ op(Format::VI, false, InstructionId::LdB),
    /* 49 */ op(Format::VI, false, InstructionId::LdH),
    /* 50 */ op(Format::VI, false, InstructionId::Illegal), // reserved
    /* 51 */ op(Format::VI, false, InstructionId::LdW),
    /* 52 */ op(Format::VI, false, InstructionId::StB),
    /* 53 */ op(Format::VI, false, InstructionId::StH),
    /* 54 */ op(Format::VI, false, InstructionId::Illegal), // reserved
    /* 55 */ op(Format::VI, false, InstructionId::StW),
    /* 56 */ op(Format::VI, false, InstructionId::InB),
    /* 57 */ op(Format::VI, false, InstructionId::InH),
    /* 58 */ op(Format::VI, false, InstructionId::Caxi),
    /* 59 */ op(Format::VI, false, InstructionId::InW),
    /* 60 */ op(Format::VI, false, InstructionId::OutB),
    /* 61 */ op(Format::VI, false, InstructionId::OutH),
    /* 62 */ op(Format::VII, false, InstructionId::Illegal), // float/ext dispatch
    /* 63 */ op(Format::VI, false, InstructionId::OutW),
];

/// Indexed by the low 4 bits of a format-II word whose opcode is 31.
/// Slots 4..=7 are unused in the real ISA and decode as illegal.
pub(crate) const BITSTRING_TABLE: [InstructionId; 16] = [
    InstructionId::BitString { sub: 0 },  // SCH0BSU
    InstructionId::BitString { sub: 1 },  // SCH0BSD
    InstructionId::BitString { sub: 2 },  // SCH1BSU
    InstructionId::BitString { sub: 3 },  // SCH1BSD
    InstructionId::Illegal,
    InstructionId::Illegal,
    InstructionId::Illegal,
    InstructionId::Illegal,
    InstructionId::BitString { sub: 8 },  // ORBSU
    InstructionId::BitString { sub: 9 },  // ANDBSU
    InstructionId::BitString { sub: 10 }, // XORBSU
    InstructionId::BitString { sub: 11 }, // MOVBSU
    InstructionId::BitString { sub: 12 }, // ORNBSU
    InstructionId::BitString { sub: 13 }, // ANDNBSU
    InstructionId::BitString { sub: 14 }, // XORNBSU
    InstructionId::BitString { sub: 15 }, // NOTBSU
];

/// Indexed by the 6-bit format-VII sub-opcode. Only REV/XB/XH/MPYHW execute
/// for real; the remaining slots are true floating-point ops, out of scope
/// per the spec's Non-goals, and decode as illegal (matching the donor's own
/// stubbing of this table).
pub(crate) const FLOAT_EXT_TABLE: [InstructionId; 13] = [
    InstructionId::Illegal,         // 0  CMPF.S
    InstructionId::Illegal,         // 1  reserved
    InstructionId::Illegal,         // 2  CVT.WS
    InstructionId::Illegal,         // 3  CVT.SW
    InstructionId::Illegal,         // 4  ADDF.S
    InstructionId::Illegal,         // 5  SUBF.S
    InstructionId::Illegal,         // 6  MULF.S
    InstructionId::Illegal,         // 7  DIVF.S
    InstructionId::Xb,              // 8  XB
    InstructionId::Xh,              // 9  XH
    InstructionId::Rev,             // 10 REV
    InstructionId::Illegal,         // 11 TRNC.SW
    InstructionId::Mpyhw,           // 12 MPYHW
];

/// Look up the bit-string instruction named by the low 4 bits of a format-II
/// word whose opcode is 31.
pub(crate) fn bitstring_lookup(low_bits: u32) -> InstructionId {
    BITSTRING_TABLE[(low_bits & 0xF) as usize]
}

/// Look up the float/extension instruction named by a format-VII sub-opcode.
/// Sub-opcodes outside the defined table (13..=63) are illegal.
pub(crate) fn float_ext_lookup(subopcode: u8) -> InstructionId {
    FLOAT_EXT_TABLE
        .get(subopcode as usize)
        .copied()
        .unwrap_or(InstructionId::Illegal)
}
