//! Whole-frame rendering: background pass, then sprites.
//!
//! The frame is drawn in one pass at the end of the active period, from the register state
//! at that moment. Mid-frame scroll splits are therefore not visible.

use crate::{
    bits,
    cartridge::Cartridge,
    ppu::{
        palette::rgba,
        ppu::{PPU, SCREEN_HEIGHT, SCREEN_WIDTH},
        registers::{MaskRegister, StatusRegister},
    },
};

/// Visible 8-pixel columns per line, one extra to cover fine X scroll.
const COLUMNS: usize = SCREEN_WIDTH / 8 + 1;
const MAX_SPRITES_PER_LINE: usize = 8;

/// One OAM entry.
#[derive(Debug, Clone, Copy)]
struct Sprite {
    index: usize,
    y: u8,
    tile: u8,
    attr: u8,
    x: u8,
}

impl Sprite {
    fn flip_v(&self) -> bool {
        self.attr & 0x80 != 0
    }

    fn flip_h(&self) -> bool {
        self.attr & 0x40 != 0
    }

    fn behind_background(&self) -> bool {
        self.attr & 0x20 != 0
    }

    fn palette(&self) -> u8 {
        self.attr & 0x03
    }
}

/// Low and high bit-planes of one 8-pixel pattern row.
fn pattern_row(cart: &Cartridge, table: u16, tile: u8, row: u16) -> (u8, u8) {
    let addr = table + (tile as u16) * 16 + row;
    (cart.read(addr), cart.read(addr + 8))
}

/// 2-bit pixel value at column `col` (0 = leftmost) of a pattern row.
fn pixel(planes: (u8, u8), col: u8) -> u8 {
    let bit = 7 - col;
    (((planes.1 >> bit) & 1) << 1) | ((planes.0 >> bit) & 1)
}

impl PPU {
    /// Render a full frame into the RGBA framebuffer.
    pub fn render(&mut self, cart: &Cartridge) {
        // Opaque background pixels, for sprite priority and sprite-0 hit.
        let mut bg_opaque = vec![false; SCREEN_WIDTH * SCREEN_HEIGHT];

        for y in 0..SCREEN_HEIGHT {
            self.render_background_line(cart, y, &mut bg_opaque);
        }
        if self.mask.contains(MaskRegister::SHOW_SPRITES) {
            self.render_sprites(cart, &bg_opaque);
        }
        self.update_sprite_overflow();
    }

    fn put_pixel(&mut self, x: usize, y: usize, palette_entry: usize) {
        let mut color = self.palette[palette_entry];
        if self.mask.contains(MaskRegister::GRAYSCALE) {
            color &= 0x30;
        }
        let i = (y * SCREEN_WIDTH + x) * 4;
        self.frame[i..i + 4].copy_from_slice(&rgba(color));
    }

    fn render_background_line(&mut self, cart: &Cartridge, y: usize, bg_opaque: &mut [bool]) {
        if !self.mask.contains(MaskRegister::SHOW_BACKGROUND) {
            for x in 0..SCREEN_WIDTH {
                self.put_pixel(x, y, 0);
            }
            return;
        }

        let select = self.ctrl.nametable_select() as usize;
        let pattern_table = self.ctrl.background_pattern_addr();
        let mirroring = cart.mirroring();

        // Position in the 512×480 plane of four logical nametables.
        let world_x = (select & 1) * 256 + self.scroll_x as usize;
        let world_y = ((select >> 1) * 240 + self.scroll_y as usize + y) % 480;
        let fine_x = world_x % 8;
        let nt_row = world_y / 240;
        let tile_y = (world_y % 240) / 8;
        let fine_y = (world_y % 8) as u16;

        for column in 0..COLUMNS {
            let tile_x_world = (world_x / 8 + column) % 64;
            let nt_col = tile_x_world / 32;
            let tile_x = bits::narrow((tile_x_world % 32) as u16);
            let nametable = 0x2000 + ((nt_row * 2 + nt_col) as u16) * 0x400;

            let name_addr = nametable + (tile_y as u16) * 32 + tile_x as u16;
            let tile = self
                .vram
                .read(Self::map_nametable_addr(name_addr, mirroring));

            let attr_addr = nametable + 0x3C0 + (tile_y as u16 / 4) * 8 + tile_x as u16 / 4;
            let attr = self
                .vram
                .read(Self::map_nametable_addr(attr_addr, mirroring));
            // Quadrant within the 32×32 attribute area: bit 1 of the tile X/Y.
            let shift = ((tile_y as u8 & 0x02) << 1) | (tile_x & 0x02);
            let palette = ((attr >> shift) & 0x03) as usize;

            let planes = pattern_row(cart, pattern_table, tile, fine_y);
            for col in 0..8u8 {
                let Some(x) = (column * 8 + col as usize).checked_sub(fine_x) else {
                    continue;
                };
                if x >= SCREEN_WIDTH {
                    break;
                }
                let mut value = pixel(planes, col);
                if x < 8 && !self.mask.contains(MaskRegister::BACKGROUND_LEFT) {
                    value = 0;
                }
                let entry = if value == 0 {
                    0
                } else {
                    bg_opaque[y * SCREEN_WIDTH + x] = true;
                    palette * 4 + value as usize
                };
                self.put_pixel(x, y, entry);
            }
        }
    }

    fn sprites(&self) -> impl DoubleEndedIterator<Item = Sprite> + '_ {
        self.oam.chunks_exact(4).enumerate().map(|(index, e)| Sprite {
            index,
            y: e[0],
            tile: e[1],
            attr: e[2],
            x: e[3],
        })
    }

    /// Draw all 64 sprites, highest OAM index first so lower indices end up on top.
    fn render_sprites(&mut self, cart: &Cartridge, bg_opaque: &[bool]) {
        let height = self.ctrl.sprite_height();
        let sprites: Vec<Sprite> = self.sprites().rev().collect();

        for sprite in sprites {
            for row in 0..height {
                let y = sprite.y as usize + row as usize;
                if y >= SCREEN_HEIGHT {
                    break;
                }
                let src_row = if sprite.flip_v() { height - 1 - row } else { row };
                let planes = if height == 8 {
                    pattern_row(cart, self.ctrl.sprite_pattern_addr(), sprite.tile, src_row)
                } else {
                    // 8x16: bit 0 picks the table, the pair starts at the even tile.
                    let table = (sprite.tile & 1) as u16 * 0x1000;
                    let top = sprite.tile & 0xFE;
                    let tile = if src_row < 8 { top } else { top + 1 };
                    pattern_row(cart, table, tile, src_row % 8)
                };

                for col in 0..8u8 {
                    let x = sprite.x as usize + col as usize;
                    if x >= SCREEN_WIDTH {
                        break;
                    }
                    if x < 8 && !self.mask.contains(MaskRegister::SPRITES_LEFT) {
                        continue;
                    }
                    let value = pixel(planes, if sprite.flip_h() { 7 - col } else { col });
                    if value == 0 {
                        continue;
                    }
                    let behind = bg_opaque[y * SCREEN_WIDTH + x];
                    if sprite.index == 0 && behind && x != 255 {
                        self.status.insert(StatusRegister::SPRITE_ZERO_HIT);
                    }
                    if sprite.behind_background() && behind {
                        continue;
                    }
                    let entry = 0x10 + sprite.palette() as usize * 4 + value as usize;
                    self.put_pixel(x, y, entry);
                }
            }
        }
    }

    /// Flag overflow when more than eight sprites share a visible line.
    fn update_sprite_overflow(&mut self) {
        if !self.mask.intersects(MaskRegister::SHOW_BACKGROUND | MaskRegister::SHOW_SPRITES) {
            return;
        }
        let height = self.ctrl.sprite_height() as usize;
        let mut per_line = [0usize; SCREEN_HEIGHT];
        for sprite in self.sprites() {
            let top = sprite.y as usize;
            for count in per_line.iter_mut().skip(top).take(height) {
                *count += 1;
            }
        }
        if per_line.iter().any(|&n| n > MAX_SPRITES_PER_LINE) {
            self.status.insert(StatusRegister::SPRITE_OVERFLOW);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::ppu::OAM_LEN;

    /// NROM-128 with CHR RAM, so tests can write pattern data through $2007.
    fn cart() -> Cartridge {
        let mut data = vec![b'N', b'E', b'S', 0x1A, 1, 0, 0, 0];
        data.resize(16 + 16 * 1024, 0);
        Cartridge::from_bytes(&data).unwrap()
    }

    fn poke(ppu: &mut PPU, cart: &mut Cartridge, addr: u16, data: &[u8]) {
        ppu.write_addr(bits::hi(addr));
        ppu.write_addr(bits::lo(addr));
        for &byte in data {
            ppu.write_data(cart, byte);
        }
    }

    fn pixel_at(ppu: &PPU, x: usize, y: usize) -> [u8; 4] {
        let i = (y * SCREEN_WIDTH + x) * 4;
        ppu.frame_buffer()[i..i + 4].try_into().unwrap()
    }

    /// Tile 1 = solid color 1; tile 2 = solid color 3.
    fn setup(ppu: &mut PPU, cart: &mut Cartridge) {
        poke(ppu, cart, 0x0010, &[0xFF; 8]);
        poke(ppu, cart, 0x0020, &[0xFF; 16]);
        poke(ppu, cart, 0x3F00, &[0x0F, 0x16, 0x27, 0x30]);
        poke(ppu, cart, 0x3F11, &[0x21, 0x22, 0x2A]);
    }

    #[test]
    fn blank_background_shows_backdrop() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 100, 100), rgba(0x0F));
    }

    #[test]
    fn solid_tile_uses_palette_entry() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        poke(&mut ppu, &mut cart, 0x2000, &[0x01]);
        ppu.write_mask(0x0A);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 0, 0), rgba(0x16));
        assert_eq!(pixel_at(&ppu, 7, 7), rgba(0x16));
        assert_eq!(pixel_at(&ppu, 8, 0), rgba(0x0F));
    }

    #[test]
    fn left_column_clipping() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        poke(&mut ppu, &mut cart, 0x2000, &[0x01]);
        ppu.write_mask(0x08);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 0, 0), rgba(0x0F));
    }

    #[test]
    fn attribute_selects_palette_per_quadrant() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        poke(&mut ppu, &mut cart, 0x3F05, &[0x1A]);
        // Tile at (2, 0) is in the top-right quadrant: attribute bits 2-3.
        poke(&mut ppu, &mut cart, 0x2002, &[0x01]);
        poke(&mut ppu, &mut cart, 0x23C0, &[0b0000_0100]);
        ppu.write_mask(0x0A);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 16, 0), rgba(0x1A));
    }

    #[test]
    fn horizontal_scroll_shifts_background() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        poke(&mut ppu, &mut cart, 0x2001, &[0x01]);
        ppu.write_mask(0x0A);
        ppu.write_scroll(4);
        ppu.write_scroll(0);
        ppu.render(&cart);
        // Tile 1 now starts at x = 4.
        assert_eq!(pixel_at(&ppu, 3, 0), rgba(0x0F));
        assert_eq!(pixel_at(&ppu, 4, 0), rgba(0x16));
        assert_eq!(pixel_at(&ppu, 11, 0), rgba(0x16));
        assert_eq!(pixel_at(&ppu, 12, 0), rgba(0x0F));
    }

    #[test]
    fn sprite_draws_with_its_palette_and_flip() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        // Tile 3: only the leftmost pixel of each row, color 1.
        poke(&mut ppu, &mut cart, 0x0030, &[0x80; 8]);
        let mut page = [0xF0u8; OAM_LEN];
        page[0..4].copy_from_slice(&[20, 3, 0x40, 30]); // flipped horizontally
        ppu.oam_dma(&page);
        ppu.write_mask(0x1E);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 37, 20), rgba(0x21));
        assert_eq!(pixel_at(&ppu, 30, 20), rgba(0x0F));
    }

    #[test]
    fn lower_oam_index_wins() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        let mut page = [0xF0u8; OAM_LEN];
        page[0..4].copy_from_slice(&[50, 1, 0x00, 50]);
        page[4..8].copy_from_slice(&[50, 2, 0x00, 50]);
        ppu.oam_dma(&page);
        ppu.write_mask(0x1E);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 50, 50), rgba(0x21));
    }

    #[test]
    fn sprite_zero_hit_and_background_priority() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        // Background tile 2 at nametable (4, 4) covers (32..40, 32..40).
        poke(&mut ppu, &mut cart, 0x2084, &[0x02]);
        let mut page = [0xF0u8; OAM_LEN];
        page[0..4].copy_from_slice(&[32, 1, 0x20, 32]); // behind background
        ppu.oam_dma(&page);
        ppu.write_mask(0x1E);
        ppu.render(&cart);
        assert!(ppu.status().contains(StatusRegister::SPRITE_ZERO_HIT));
        assert_eq!(pixel_at(&ppu, 33, 33), rgba(0x30));

        ppu.set_vblank(true);
        ppu.set_vblank(false);
        assert!(!ppu.status().contains(StatusRegister::SPRITE_ZERO_HIT));
    }

    #[test]
    fn nine_sprites_on_a_line_overflow() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        let mut page = [0xF0u8; OAM_LEN];
        for i in 0..9 {
            page[i * 4..i * 4 + 4].copy_from_slice(&[100, 1, 0, (i * 10) as u8]);
        }
        ppu.oam_dma(&page);
        ppu.write_mask(0x18);
        ppu.render(&cart);
        assert!(ppu.status().contains(StatusRegister::SPRITE_OVERFLOW));
    }

    #[test]
    fn tall_sprites_take_table_from_tile_bit_zero() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        // Tile pair 0x02/0x03 in table 0x0000: bottom half (tile 3) is solid color 1.
        poke(&mut ppu, &mut cart, 0x0030, &[0xFF; 8]);
        let mut page = [0xF0u8; OAM_LEN];
        page[0..4].copy_from_slice(&[60, 0x02, 0x00, 60]);
        ppu.oam_dma(&page);
        ppu.write_ctrl(0x20);
        ppu.write_mask(0x1E);
        ppu.render(&cart);
        // Tile 2 is solid color 3 on top, tile 3 solid color 1 below.
        assert_eq!(pixel_at(&ppu, 60, 60), rgba(0x2A));
        assert_eq!(pixel_at(&ppu, 60, 68), rgba(0x21));
    }

    #[test]
    fn grayscale_masks_color() {
        let mut cart = cart();
        let mut ppu = PPU::new();
        setup(&mut ppu, &mut cart);
        ppu.write_mask(0x01);
        ppu.render(&cart);
        assert_eq!(pixel_at(&ppu, 0, 0), rgba(0x00));
    }
}
