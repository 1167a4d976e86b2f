//! The sixteen V810 branch condition codes, evaluated against the PSW.

use crate::psw::Psw;

/// Evaluate a 4-bit condition code against the current PSW, per spec.md
/// §4.5's table.
pub fn evaluate_condition(condition: u8, psw: &Psw) -> bool {
    match condition & 0xF {
        0x0 => psw.ov,              // V
        0x1 => psw.cy,              // C / L
        0x2 => psw.z,               // Z / E
        0x3 => psw.cy || psw.z,     // NH
        0x4 => psw.s,               // N
        0x5 => true,                // T (always)
        0x6 => psw.s ^ psw.ov,      // LT
        0x7 => (psw.s ^ psw.ov) || psw.z, // LE
        0x8 => !psw.ov,             // NV
        0x9 => !psw.cy,             // NC / NL
        0xA => !psw.z,              // NZ / NE
        0xB => !(psw.cy || psw.z),  // H
        0xC => !psw.s,              // P
        0xD => false,               // F (never)
        0xE => !(psw.s ^ psw.ov),   // GE
        0xF => !((psw.s ^ psw.ov) || psw.z), // GT
        _ => unreachable!("condition & 0xF is in 0..=15"),
    }
}
