//! Exception entry's three-way branch (fatal/duplexed/regular) and the
//! RETI round trip, driven through `Context::emulate` and the PSW direct-poke
//! entry point (`set_system_register`). Programs are seeded into the ROM
//! buffer at the reset vector, same technique as `alu_test.rs`.

use vb810_core::{Context, ContextConfig};

const RESET_VECTOR: u32 = 0xFFFF_FFF0;
const PSW_ID: u8 = 6;
const ECR_ID: u8 = 5;

fn seed_at(rom: &mut [u8], address: u32, halfwords: &[u16]) {
    let base = (address & (rom.len() as u32 - 1)) as usize;
    for (i, hw) in halfwords.iter().enumerate() {
        let offset = base + i * 2;
        rom[offset] = (*hw & 0xFF) as u8;
        rom[offset + 1] = (*hw >> 8) as u8;
    }
}

fn trap(vector4: u16) -> u16 {
    (24u16 << 10) | (vector4 & 0xF)
}

const RETI: u16 = 25u16 << 10;

#[test]
fn fatal_exception_halts_without_touching_pc_resolution() {
    // Default post-reset PSW has np=1 (duplexed-of-duplexed / fatal mode);
    // a TRAP taken straight off reset must halt rather than vector anywhere.
    let mut rom = [0u8; 1024];
    seed_at(&mut rom, RESET_VECTOR, &[trap(5)]);
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    assert!(!ctx.halted());

    let mut budget = 15i64; // TRAP's cycle cost
    ctx.emulate(&mut budget);

    assert!(ctx.halted());
    assert_eq!(ctx.pc(), RESET_VECTOR.wrapping_add(2));
}

#[test]
fn duplexed_exception_jumps_to_the_fixed_duplex_vector() {
    // ep=1, np=0: a second exception while one is already in flight must
    // always land at 0xFFFFFFD0, regardless of which exception it is.
    let mut rom = [0u8; 1024];
    seed_at(&mut rom, RESET_VECTOR, &[trap(5)]);
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    ctx.set_system_register(PSW_ID, 0x4000); // ep=1, np=0, everything else clear

    let mut budget = 15i64;
    ctx.emulate(&mut budget);

    assert_eq!(ctx.pc(), 0xFFFF_FFD0);
    let psw = ctx.get_system_register(PSW_ID);
    assert_ne!(psw & (1 << 15), 0); // np now set
}

#[test]
fn regular_exception_vectors_by_cause_and_reti_restores_pc_and_psw() {
    // np=0, ep=0: the common case. TRAP 5 vectors to 0xFFFFFFA0, where a
    // seeded RETI hands control straight back.
    let mut rom = [0u8; 1024];
    seed_at(&mut rom, RESET_VECTOR, &[trap(5)]);
    seed_at(&mut rom, 0xFFFF_FFA0, &[RETI]);
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    ctx.set_system_register(PSW_ID, 0); // np=0, ep=0

    let mut budget = 15i64; // TRAP
    ctx.emulate(&mut budget);
    assert_eq!(ctx.pc(), 0xFFFF_FFA0);
    assert_eq!(ctx.get_system_register(ECR_ID) & 0xFFFF, 0xFFA5);
    assert_ne!(ctx.get_system_register(PSW_ID) & (1 << 14), 0); // ep now set

    let mut budget = 10i64; // RETI
    ctx.emulate(&mut budget);
    assert_eq!(ctx.pc(), RESET_VECTOR.wrapping_add(2));
    assert_eq!(ctx.get_system_register(PSW_ID) & (1 << 14), 0); // ep cleared again
}

#[test]
fn illegal_opcode_raises_the_illegal_instruction_vector() {
    let mut rom = [0u8; 1024];
    // opcode 27 is unconditionally Illegal in the primary opcode table.
    let illegal_bits = 27u16 << 10;
    seed_at(&mut rom, RESET_VECTOR, &[illegal_bits]);
    let mut ctx = Context::new(ContextConfig { rom: &rom, sram: None }).unwrap();
    ctx.set_system_register(PSW_ID, 0);

    let mut budget = 1i64; // Illegal's cycle cost
    ctx.emulate(&mut budget);

    assert_eq!(ctx.get_system_register(ECR_ID) & 0xFFFF, 0xFF90);
    assert_eq!(ctx.pc(), 0xFFFF_FF90);
}
