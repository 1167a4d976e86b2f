//! Per-format field extraction. Each function reads `instr.bits` (already
//! assembled per [`super::Format`]'s width) and fills in the descriptor
//! fields that format defines. Mirrors the donor's `cpfFormatI`..`cpfFormatVII`
//! one-function-per-format split (`original_source/instructions.c`).

use super::{Format, Instruction};
use crate::primitives::sign_extend;

pub(crate) fn decode_format(format: Format, instr: &mut Instruction) {
    match format {
        Format::I => decode_i(instr),
        Format::II => decode_ii(instr),
        Format::III => decode_iii(instr),
        Format::IV => decode_iv(instr),
        Format::V => decode_v(instr),
        Format::VI => decode_vi(instr),
        Format::VII => decode_vii(instr),
    }
}

/// Register-register: `reg1@0..4, reg2@5..9`.
fn decode_i(instr: &mut Instruction) {
    instr.reg1 = (instr.bits & 0x1F) as u8;
    instr.reg2 = (instr.bits >> 5 & 0x1F) as u8;
}

/// Register + 5-bit immediate (or sub-opcode carrier): `imm@0..4, reg2@5..9`.
fn decode_ii(instr: &mut Instruction) {
    let imm = instr.bits & 0x1F;
    instr.imm_or_disp = if instr.sign_extend {
        sign_extend(imm, 5)
    } else {
        imm as i32
    };
    instr.reg2 = (instr.bits >> 5 & 0x1F) as u8;
}

/// Conditional branch: `disp@0..8 (sign-extend 9), cond@9..12`.
fn decode_iii(instr: &mut Instruction) {
    let disp = instr.bits & 0x1FF;
    instr.condition = (instr.bits >> 9 & 0xF) as u8;
    instr.imm_or_disp = sign_extend(disp, 9);
}

/// Long jump: `disp@0..25 (sign-extend 26)`.
fn decode_iv(instr: &mut Instruction) {
    let disp = instr.bits & 0x03FF_FFFF;
    instr.imm_or_disp = sign_extend(disp, 26);
}

/// 3-operand with 16-bit immediate: `imm@0..15, reg1@16..20, reg2@21..25`.
fn decode_v(instr: &mut Instruction) {
    let imm = instr.bits & 0xFFFF;
    instr.imm_or_disp = if instr.sign_extend {
        sign_extend(imm, 16)
    } else {
        imm as i32
    };
    instr.reg1 = (instr.bits >> 16 & 0x1F) as u8;
    instr.reg2 = (instr.bits >> 21 & 0x1F) as u8;
}

/// Load/store with displacement: `disp@0..15 (sign-extend 16), reg1@16..20, reg2@21..25`.
fn decode_vi(instr: &mut Instruction) {
    let disp = instr.bits & 0xFFFF;
    instr.imm_or_disp = sign_extend(disp, 16);
    instr.reg1 = (instr.bits >> 16 & 0x1F) as u8;
    instr.reg2 = (instr.bits >> 21 & 0x1F) as u8;
}

/// FPU/extension: `subopcode@10..15, reg1@16..20, reg2@21..25`.
fn decode_vii(instr: &mut Instruction) {
    instr.subopcode = (instr.bits >> 10 & 0x3F) as u8;
    instr.reg1 = (instr.bits >> 16 & 0x1F) as u8;
    instr.reg2 = (instr.bits >> 21 & 0x1F) as u8;
}
