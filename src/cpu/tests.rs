use crate::{
    bus::Bus,
    cpu::{
        cpu::CPU,
        flags::{
            FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE,
            FLAG_OVERFLOW, FLAG_UNUSED, FLAG_ZERO,
        },
        opcodes::{self, AddressingMode, Mnemonic},
    },
    error::{Access, BusError, CpuError},
};

/// Flat 64 KiB of RAM, except $5000-$5FFF which faults like the console's unmapped hole.
struct TestBus {
    mem: [u8; 65536],
    nmi: bool,
}

impl TestBus {
    fn new() -> Self {
        Self {
            mem: [0; 65536],
            nmi: false,
        }
    }

    fn check(addr: u16, access: Access) -> Result<(), BusError> {
        if (0x5000..0x6000).contains(&addr) {
            return Err(BusError::Unmapped {
                address: addr,
                access,
            });
        }
        Ok(())
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> Result<u8, BusError> {
        Self::check(addr, Access::Read)?;
        Ok(self.mem[addr as usize])
    }

    fn write(&mut self, addr: u16, data: u8) -> Result<(), BusError> {
        Self::check(addr, Access::Write)?;
        self.mem[addr as usize] = data;
        Ok(())
    }

    fn poll_nmi(&mut self) -> bool {
        std::mem::take(&mut self.nmi)
    }
}

/// Load `program` at `origin`, point the reset vector at it and reset.
fn boot_at(origin: u16, program: &[u8]) -> (CPU, TestBus) {
    let mut bus = TestBus::new();
    let start = origin as usize;
    bus.mem[start..start + program.len()].copy_from_slice(program);
    bus.mem[0xFFFC] = origin as u8;
    bus.mem[0xFFFD] = (origin >> 8) as u8;

    let mut cpu = CPU::new();
    cpu.reset(&mut bus).unwrap();
    (cpu, bus)
}

fn boot(program: &[u8]) -> (CPU, TestBus) {
    boot_at(0x8000, program)
}

fn run(cpu: &mut CPU, bus: &mut TestBus, steps: usize) {
    for _ in 0..steps {
        cpu.step(bus).unwrap();
    }
}

/// Cycles spent by the next instruction.
fn cycles_of(cpu: &mut CPU, bus: &mut TestBus) -> u64 {
    let before = cpu.cycles;
    cpu.step(bus).unwrap();
    cpu.cycles - before
}

#[test]
fn reset_loads_vector_and_power_on_state() {
    let (cpu, _) = boot(&[0xEA]);
    assert_eq!(cpu.pc, 0x8000);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.status, 0x24);
    assert_eq!(cpu.cycles, 7);
    assert_eq!(cpu.current_opcode(), None);
}

#[test]
fn lda_immediate_loads_value() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x42]); // LDA #$42
    cpu.step(&mut bus).unwrap();

    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cpu.cycles, 9);
}

#[test]
fn lda_sets_zero_flag() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x00]); // LDA #$00
    cpu.step(&mut bus).unwrap();
    assert!(cpu.status & FLAG_ZERO != 0);
    assert!(cpu.status & FLAG_NEGATIVE == 0);
}

#[test]
fn lda_sets_negative_flag() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x80]); // LDA #$80
    cpu.step(&mut bus).unwrap();
    assert!(cpu.status & FLAG_NEGATIVE != 0);
    assert!(cpu.status & FLAG_ZERO == 0);
}

#[test]
fn tax_transfers_a_to_x() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x05, 0xAA]); // LDA #$05; TAX
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.x, 0x05);
}

#[test]
fn sta_writes_to_memory() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x37, 0x8D, 0x00, 0x02]); // LDA #$37; STA $0200
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.mem[0x0200], 0x37);
}

#[test]
fn jmp_changes_program_counter() {
    let (mut cpu, mut bus) = boot(&[0x4C, 0x34, 0x12]); // JMP $1234
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn jmp_indirect_wraps_within_page() {
    let (mut cpu, mut bus) = boot(&[0x6C, 0xFF, 0x02]); // JMP ($02FF)
    bus.mem[0x02FF] = 0x34;
    bus.mem[0x0200] = 0x12;
    bus.mem[0x0300] = 0x56;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn lda_indirect_x_wraps_pointer_in_page_zero() {
    // LDX #1; LDA ($FE,X); LDX #5; LDA ($FD,X)
    let (mut cpu, mut bus) = boot(&[0xA2, 0x01, 0xA1, 0xFE, 0xA2, 0x05, 0xA1, 0xFD]);
    // Pointer at $FF: high byte comes from $00, not $0100.
    bus.mem[0x00FF] = 0x34;
    bus.mem[0x0000] = 0x12;
    bus.mem[0x0100] = 0x03;
    bus.mem[0x1234] = 0x77;
    bus.mem[0x0334] = 0x99;
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.a, 0x77);

    // $FD + 5 wraps to $02.
    bus.mem[0x0002] = 0x78;
    bus.mem[0x0003] = 0x06;
    bus.mem[0x0678] = 0x42;
    bus.mem[0x0102] = 0x00;
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.a, 0x42);
}

#[test]
fn lda_indirect_y_pointer_wraps_in_page_zero() {
    // LDY #1; LDA ($FF),Y
    let (mut cpu, mut bus) = boot(&[0xA0, 0x01, 0xB1, 0xFF]);
    bus.mem[0x00FF] = 0x00;
    bus.mem[0x0000] = 0x02;
    bus.mem[0x0100] = 0x03;
    bus.mem[0x0201] = 0x55;
    bus.mem[0x0301] = 0x99;
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.a, 0x55);
}

#[test]
fn inx_increments_x() {
    let (mut cpu, mut bus) = boot(&[0xE8]); // INX
    cpu.x = 0xFF;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.x, 0x00);
    assert!(cpu.status & FLAG_ZERO != 0);
}

#[test]
fn dex_sets_zero_flag() {
    let (mut cpu, mut bus) = boot(&[0xA2, 0x01, 0xCA]); // LDX #$01; DEX
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.x, 0);
    assert!(cpu.status & FLAG_ZERO != 0);
}

#[test]
fn bne_loops_until_zero() {
    // LDX #$03; loop: DEX; BNE loop
    let (mut cpu, mut bus) = boot(&[0xA2, 0x03, 0xCA, 0xD0, 0xFD]);
    run(&mut cpu, &mut bus, 7);
    assert_eq!(cpu.x, 0);
    assert_eq!(cpu.pc, 0x8005);
}

#[test]
fn zero_page_x_wraps_within_page_zero() {
    let (mut cpu, mut bus) = boot(&[0xA2, 0x01, 0xB5, 0xFF]); // LDX #$01; LDA $FF,X
    bus.mem[0x0000] = 0x99;
    bus.mem[0x0100] = 0x11;
    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.a, 0x99);
}

#[test]
fn adc_sets_overflow_on_signed_wrap() {
    let (mut cpu, mut bus) = boot(&[0x18, 0xA9, 0x50, 0x69, 0x50]); // CLC; LDA #$50; ADC #$50
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.a, 0xA0);
    assert!(cpu.status & FLAG_OVERFLOW != 0);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
    assert!(cpu.status & FLAG_CARRY == 0);
    assert!(cpu.status & FLAG_ZERO == 0);
}

#[test]
fn adc_ignores_decimal_mode() {
    // SED; CLC; LDA #9; ADC #1
    let (mut cpu, mut bus) = boot(&[0xF8, 0x18, 0xA9, 0x09, 0x69, 0x01]);
    run(&mut cpu, &mut bus, 4);
    assert_eq!(cpu.a, 0x0A);
    assert!(cpu.status & FLAG_DECIMAL != 0);
}

#[test]
fn sbc_borrows_through_carry() {
    let (mut cpu, mut bus) = boot(&[0x38, 0xA9, 0x00, 0xE9, 0x01]); // SEC; LDA #0; SBC #1
    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.a, 0xFF);
    assert!(cpu.status & FLAG_CARRY == 0);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
}

#[test]
fn cmp_smaller_register_clears_carry() {
    let (mut cpu, mut bus) = boot(&[0xA9, 0x10, 0xC9, 0x20]); // LDA #$10; CMP #$20
    run(&mut cpu, &mut bus, 2);
    assert!(cpu.status & FLAG_CARRY == 0);
    assert!(cpu.status & FLAG_ZERO == 0);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
    assert_eq!(cpu.a, 0x10);
}

#[test]
fn jsr_and_rts_work() {
    let mut program = vec![0x20, 0x10, 0x80]; // JSR $8010
    program.resize(0x10, 0xEA);
    program.push(0x60); // RTS
    let (mut cpu, mut bus) = boot(&program);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x8010);
    assert_eq!(cpu.sp, 0xFB);
    // Return address minus one, high byte first.
    assert_eq!(bus.mem[0x01FD], 0x80);
    assert_eq!(bus.mem[0x01FC], 0x02);

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x8003);
    assert_eq!(cpu.sp, 0xFD);
}

#[test]
fn pha_and_pla_round_trip() {
    for value in [0x00, 0x01, 0x7F, 0x80, 0xFF] {
        // LDA #value; PHA; LDA #$55; PLA
        let (mut cpu, mut bus) = boot(&[0xA9, value, 0x48, 0xA9, 0x55, 0x68]);
        run(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.sp, 0xFC, "{value:02X}");
        assert_eq!(bus.mem[0x01FD], value);
        run(&mut cpu, &mut bus, 2);
        assert_eq!(cpu.a, value);
        assert_eq!(cpu.sp, 0xFD);
        assert_eq!(cpu.status & FLAG_ZERO != 0, value == 0, "{value:02X}");
        assert_eq!(cpu.status & FLAG_NEGATIVE != 0, value & 0x80 != 0, "{value:02X}");
    }
}

#[test]
fn php_pushes_break_and_plp_drops_it() {
    // SEC; SED; PHP; CLC; CLD; PLP
    let (mut cpu, mut bus) = boot(&[0x38, 0xF8, 0x08, 0x18, 0xD8, 0x28]);
    run(&mut cpu, &mut bus, 3);
    assert_eq!(bus.mem[0x01FD], 0x24 | FLAG_CARRY | FLAG_DECIMAL | FLAG_BREAK);

    run(&mut cpu, &mut bus, 3);
    assert_eq!(cpu.status, 0x24 | FLAG_CARRY | FLAG_DECIMAL);
    assert!(cpu.status & FLAG_UNUSED != 0);
}

#[test]
fn brk_jumps_to_irq_vector() {
    let (mut cpu, mut bus) = boot(&[0x00]); // BRK
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x90;

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x9000);
    assert_eq!(cpu.sp, 0xFA);
    assert_eq!(cpu.cycles, 14);
    // PC+2 and P with B set.
    assert_eq!(bus.mem[0x01FD], 0x80);
    assert_eq!(bus.mem[0x01FC], 0x02);
    assert_eq!(bus.mem[0x01FB], 0x34);
    assert!(cpu.status & FLAG_INTERRUPT_DISABLE != 0);
}

#[test]
fn rti_returns_from_brk_with_break_cleared() {
    let (mut cpu, mut bus) = boot(&[0x00]); // BRK
    bus.mem[0xFFFE] = 0x00;
    bus.mem[0xFFFF] = 0x90;
    bus.mem[0x9000] = 0x40; // RTI

    run(&mut cpu, &mut bus, 2);
    assert_eq!(cpu.pc, 0x8002);
    assert_eq!(cpu.sp, 0xFD);
    assert_eq!(cpu.status, 0x24);
}

#[test]
fn nmi_is_serviced_before_the_next_instruction() {
    let (mut cpu, mut bus) = boot(&[0xEA]);
    bus.mem[0xFFFA] = 0x00;
    bus.mem[0xFFFB] = 0x91;
    bus.mem[0x9100] = 0xEA; // NOP in the handler
    bus.nmi = true;

    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.pc, 0x9101);
    assert_eq!(cpu.cycles, 7 + 7 + 2);
    assert_eq!(bus.mem[0x01FD], 0x80);
    assert_eq!(bus.mem[0x01FC], 0x00);
    // B clear, R set.
    assert_eq!(bus.mem[0x01FB], 0x24);
    assert!(!bus.nmi);
}

#[test]
fn jam_opcode_is_reported_as_illegal() {
    let (mut cpu, mut bus) = boot(&[0xEA, 0x02]);
    cpu.step(&mut bus).unwrap();
    let err = cpu.step(&mut bus).unwrap_err();
    assert_eq!(
        err,
        CpuError::IllegalOpcode {
            opcode: 0x02,
            pc: 0x8001
        }
    );
    assert_eq!(cpu.current_opcode(), Some(0x02));
}

#[test]
fn bus_errors_propagate() {
    let (mut cpu, mut bus) = boot(&[0xAD, 0x00, 0x50]); // LDA $5000
    let err = cpu.step(&mut bus).unwrap_err();
    assert_eq!(
        err,
        CpuError::Bus(BusError::Unmapped {
            address: 0x5000,
            access: Access::Read
        })
    );
}

#[test]
fn page_crossing_reads_cost_a_cycle() {
    // LDX #$01; LDA $80FF,X; LDA $8000,X
    let (mut cpu, mut bus) = boot(&[0xA2, 0x01, 0xBD, 0xFF, 0x80, 0xBD, 0x00, 0x80]);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cycles_of(&mut cpu, &mut bus), 5);
    assert_eq!(cycles_of(&mut cpu, &mut bus), 4);
}

#[test]
fn indirect_y_crossing_a_page_costs_a_cycle() {
    let (mut cpu, mut bus) = boot(&[0xA0, 0x01, 0xB1, 0x10]); // LDY #1; LDA ($10),Y
    bus.mem[0x10] = 0xFF;
    bus.mem[0x11] = 0x02;
    bus.mem[0x0300] = 0x77;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cycles_of(&mut cpu, &mut bus), 6);
    assert_eq!(cpu.a, 0x77);
}

#[test]
fn indexed_stores_have_fixed_cost() {
    let (mut cpu, mut bus) = boot(&[0xA2, 0x01, 0x9D, 0xFF, 0x02]); // LDX #1; STA $02FF,X
    cpu.step(&mut bus).unwrap();
    assert_eq!(cycles_of(&mut cpu, &mut bus), 5);
}

#[test]
fn branch_cycles_depend_on_outcome_and_page() {
    // Not taken: LDA #0 sets Z, BNE falls through.
    let (mut cpu, mut bus) = boot(&[0xA9, 0x00, 0xD0, 0x02]);
    cpu.step(&mut bus).unwrap();
    assert_eq!(cycles_of(&mut cpu, &mut bus), 2);

    // Taken, same page.
    let (mut cpu, mut bus) = boot(&[0xD0, 0x02]);
    assert_eq!(cycles_of(&mut cpu, &mut bus), 3);
    assert_eq!(cpu.pc, 0x8004);

    // Taken across a page: $80FD + 2 + 5 = $8104.
    let (mut cpu, mut bus) = boot_at(0x80FD, &[0xD0, 0x05]);
    assert_eq!(cycles_of(&mut cpu, &mut bus), 4);
    assert_eq!(cpu.pc, 0x8104);
}

#[test]
fn lax_loads_a_and_x() {
    let (mut cpu, mut bus) = boot(&[0xA7, 0x10]); // LAX $10
    bus.mem[0x10] = 0x8F;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x8F);
    assert_eq!(cpu.x, 0x8F);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
}

#[test]
fn sax_stores_a_and_x() {
    let (mut cpu, mut bus) = boot(&[0x87, 0x20]); // SAX $20
    cpu.a = 0xF0;
    cpu.x = 0x3C;
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.mem[0x20], 0x30);
}

#[test]
fn dcp_decrements_then_compares() {
    let (mut cpu, mut bus) = boot(&[0xC7, 0x10]); // DCP $10
    bus.mem[0x10] = 0x05;
    cpu.a = 0x04;
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.mem[0x10], 0x04);
    assert!(cpu.status & FLAG_ZERO != 0);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn isc_increments_then_subtracts() {
    let (mut cpu, mut bus) = boot(&[0x38, 0xE7, 0x10]); // SEC; ISC $10
    bus.mem[0x10] = 0x0F;
    cpu.a = 0x20;
    run(&mut cpu, &mut bus, 2);
    assert_eq!(bus.mem[0x10], 0x10);
    assert_eq!(cpu.a, 0x10);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn slo_shifts_then_ors() {
    let (mut cpu, mut bus) = boot(&[0x07, 0x10]); // SLO $10
    bus.mem[0x10] = 0x81;
    cpu.a = 0x01;
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.mem[0x10], 0x02);
    assert_eq!(cpu.a, 0x03);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn anc_copies_negative_into_carry() {
    let (mut cpu, mut bus) = boot(&[0x0B, 0x80]); // ANC #$80
    cpu.a = 0xFF;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x80);
    assert!(cpu.status & FLAG_CARRY != 0);
    assert!(cpu.status & FLAG_NEGATIVE != 0);
}

#[test]
fn alr_ands_then_shifts_right() {
    let (mut cpu, mut bus) = boot(&[0x4B, 0x03]); // ALR #$03
    cpu.a = 0xFF;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x01);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn arr_takes_carry_and_overflow_from_bits_6_and_5() {
    let (mut cpu, mut bus) = boot(&[0x6B, 0xFF]); // ARR #$FF
    cpu.a = 0xFF;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x7F);
    assert!(cpu.status & FLAG_CARRY != 0);
    assert!(cpu.status & FLAG_OVERFLOW == 0);
}

#[test]
fn sbx_subtracts_from_a_and_x() {
    let (mut cpu, mut bus) = boot(&[0xCB, 0x02]); // SBX #$02
    cpu.a = 0x0F;
    cpu.x = 0xF3;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.x, 0x01);
    assert!(cpu.status & FLAG_CARRY != 0);
}

#[test]
fn las_ands_memory_with_stack_pointer() {
    let (mut cpu, mut bus) = boot(&[0xBB, 0x00, 0x02]); // LAS $0200,Y
    bus.mem[0x0200] = 0x0F;
    cpu.step(&mut bus).unwrap();
    assert_eq!(cpu.a, 0x0D);
    assert_eq!(cpu.x, 0x0D);
    assert_eq!(cpu.sp, 0x0D);
}

#[test]
fn shx_masks_with_high_byte_plus_one() {
    let (mut cpu, mut bus) = boot(&[0x9E, 0x00, 0x02]); // SHX $0200,Y
    cpu.x = 0xFF;
    cpu.step(&mut bus).unwrap();
    assert_eq!(bus.mem[0x0200], 0x03);
}

#[test]
fn every_defined_opcode_advances_pc_by_its_length() {
    for (byte, entry) in opcodes::OPCODES.iter().enumerate() {
        let Some(op) = entry else { continue };
        let control_flow = matches!(
            op.mnemonic,
            Mnemonic::Jmp | Mnemonic::Jsr | Mnemonic::Rts | Mnemonic::Rti | Mnemonic::Brk
        ) || op.mode == AddressingMode::Relative;
        if control_flow {
            continue;
        }

        let (mut cpu, mut bus) = boot(&[byte as u8, 0x10, 0x02]);
        let before = cpu.cycles;
        cpu.step(&mut bus)
            .unwrap_or_else(|e| panic!("${byte:02X} failed: {e}"));
        assert_eq!(
            cpu.pc,
            0x8001 + op.mode.operand_len(),
            "${byte:02X} {}",
            op.mnemonic
        );
        assert!(cpu.cycles - before >= op.cycles as u64, "${byte:02X}");
    }
}
