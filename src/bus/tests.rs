use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::test_utils::{build_mapper_rom, nrom_cartridge};

fn bus_with_program(prg: &[u8]) -> Bus {
    let mut bus = Bus::new();
    bus.attach_cartridge(nrom_cartridge(prg));
    bus
}

#[test]
fn ram_is_mirrored_every_2k() {
    let mut bus = Bus::new();
    bus.write(0x0001, 0x42);
    assert_eq!(bus.read(0x0801), 0x42);
    assert_eq!(bus.read(0x1001), 0x42);
    assert_eq!(bus.read(0x1801), 0x42);
    bus.write(0x1FFF, 0x99);
    assert_eq!(bus.read(0x07FF), 0x99);
}

#[test]
fn ppu_registers_mirror_every_eight_bytes() {
    let mut bus = Bus::new();
    // $3456 & 7 == 6: PPUADDR
    bus.write(0x3456, 0x21);
    bus.write(0x2006, 0x08);
    bus.write(0x2007, 0x5A);
    bus.write(0x2006, 0x21);
    bus.write(0x200E, 0x08);
    let _ = bus.read(0x2007);
    assert_eq!(bus.read(0x3FFF), 0x5A);
}

#[test]
fn cartridge_space_reads_prg() {
    let mut bus = bus_with_program(&[0xA9, 0x10]);
    assert_eq!(bus.read(0x8000), 0xA9);
    assert_eq!(bus.read(0xC001), 0x10);
    assert_eq!(bus.read_word(0xFFFC), 0x8000);
}

#[test]
fn open_bus_tracks_the_last_value() {
    let mut bus = Bus::new();
    bus.write(0x0000, 0x7E);
    assert_eq!(bus.read(0x4000), 0x7E);
    assert_eq!(bus.read(0x4018), 0x7E);
    let _ = bus.read(0x0000);
    assert_eq!(bus.open_bus(), 0x7E);
    // Unmapped cartridge space without a cartridge
    assert_eq!(bus.read(0x5000), 0x7E);
}

#[test]
fn controller_reads_return_the_bare_serial_bit() {
    let mut bus = Bus::new();
    bus.controller_mut(0).expect("pad").set_state_mask(0b1000_0001);
    bus.write(0x4016, 1);
    bus.write(0x4016, 0);
    // A stale high byte on the bus must not leak into the pad bits.
    bus.write(0x0000, 0x40);
    let reads: Vec<u8> = (0..9).map(|_| bus.read(0x4016)).collect();
    assert_eq!(reads, vec![1, 0, 0, 0, 0, 0, 0, 1, 1]);
    assert_eq!(bus.peek(0x4016), 1);
    assert_eq!(bus.open_bus(), 1);
}

#[test]
fn strobe_latches_both_pads() {
    let mut bus = Bus::new();
    bus.controller_mut(0).expect("pad").set_state_mask(0b1000_0000);
    bus.controller_mut(1).expect("pad").set_state_mask(0b0000_0001);
    bus.write(0x4016, 1);
    bus.write(0x4016, 0);
    let first: Vec<u8> = (0..8).map(|_| bus.read(0x4016) & 1).collect();
    let second: Vec<u8> = (0..8).map(|_| bus.read(0x4017) & 1).collect();
    assert_eq!(first, vec![0, 0, 0, 0, 0, 0, 0, 1]);
    assert_eq!(second, vec![1, 0, 0, 0, 0, 0, 0, 0]);
    assert_eq!(bus.read(0x4016) & 1, 1);
}

#[test]
fn peek_has_no_side_effects() {
    let mut bus = Bus::new();
    bus.controller_mut(0).expect("pad").set_state_mask(0xFF);
    bus.write(0x4016, 1);
    bus.write(0x4016, 0);
    let open = bus.open_bus();
    for _ in 0..20 {
        assert_eq!(bus.peek(0x4016) & 1, 1);
    }
    assert_eq!(bus.open_bus(), open);
    let reads: u32 = (0..8).map(|_| (bus.read(0x4016) & 1) as u32).sum();
    assert_eq!(reads, 8);
}

#[test]
fn oam_dma_copies_a_page() {
    let mut bus = Bus::new();
    for i in 0..256u16 {
        bus.write(0x0200 + i, i as u8);
    }
    bus.write(0x2003, 0x00);
    bus.write(0x4014, 0x02);
    assert!(bus.oam_dma_pending());
    let page = bus.take_oam_dma_page();
    assert_eq!(page, Some(0x02));
    bus.run_oam_dma(0x02);
    assert!(!bus.oam_dma_pending());
    for i in 0..256usize {
        assert_eq!(bus.ppu().oam()[i], i as u8);
    }
}

#[test]
fn oam_dma_starts_at_oamaddr() {
    let mut bus = Bus::new();
    bus.write(0x0300, 0xAB);
    bus.write(0x2003, 0x10);
    bus.run_oam_dma(0x03);
    assert_eq!(bus.ppu().oam()[0x10], 0xAB);
}

#[test]
fn dmc_dma_reads_through_the_cartridge() {
    let mut bus = bus_with_program(&[]);
    bus.write(0x4012, 0x00);
    bus.write(0x4013, 0x00);
    bus.write(0x4015, 0x10);
    assert!(bus.dmc_dma_pending());
    assert_eq!(bus.service_dmc_dma(), 0xC000);
    assert!(!bus.dmc_dma_pending());
}

#[test]
fn irq_line_merges_apu_and_cartridge() {
    let mut bus = Bus::new();
    assert!(!bus.irq_line());
    for _ in 0..(14916 * 2) {
        bus.clock_apu();
    }
    assert!(bus.irq_line());
    let _ = bus.read(0x4015);
    assert!(!bus.irq_line());
}

#[test]
fn mapper_writes_reach_the_cartridge() {
    let cart = Cartridge::from_ines_bytes(&build_mapper_rom(2, 4, 0, 0)).expect("parse");
    let mut bus = Bus::new();
    bus.attach_cartridge(cart);
    assert_eq!(bus.read(0x8000), 0);
    bus.write(0x8000, 2);
    // 16 KiB bank 2 begins with 8 KiB page 4
    assert_eq!(bus.read(0x8000), 4);
}

#[test]
fn nmi_line_follows_vblank_and_ctrl() {
    let mut bus = Bus::new();
    bus.write(0x2000, 0x80);
    bus.ppu_mut()._test_set_position(241, 1);
    bus.clock_ppu();
    assert!(bus.nmi_line());
    let _ = bus.read(0x2002);
    assert!(!bus.nmi_line());
}

#[test]
fn reset_clears_ram_and_pending_dma() {
    let mut bus = Bus::new();
    bus.write(0x0010, 0x55);
    bus.write(0x4014, 0x02);
    bus.reset();
    assert_eq!(bus.read(0x0010), 0);
    assert!(!bus.oam_dma_pending());
}
