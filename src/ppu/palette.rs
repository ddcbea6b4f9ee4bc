#![doc = r#"
PPU palette module

Responsibilities
- Master NTSC color table (64 RGB entries) expanded into 8 emphasis variants, giving the
  64x8 RGBA lookup the pixel multiplexer indexes with `emphasis * 64 + color`.
- Palette RAM ($3F00-$3F1F, mirrored through $3FFF) with the sprite-backdrop aliases
  $3F10/$3F14/$3F18/$3F1C -> $3F00/$3F04/$3F08/$3F0C.

Notes
- Emphasis bits (mask bits 5..7 = R, G, B) attenuate the channels that are not emphasized.
  The attenuation factor is an approximation of the composite signal, not a model of it.
"#]

/// 2C02 master palette (RGB).
const NTSC_PALETTE: [[u8; 3]; 64] = [
    [84, 84, 84],
    [0, 30, 116],
    [8, 16, 144],
    [48, 0, 136],
    [68, 0, 100],
    [92, 0, 48],
    [84, 4, 0],
    [60, 24, 0],
    [32, 42, 0],
    [8, 58, 0],
    [0, 64, 0],
    [0, 60, 0],
    [0, 50, 60],
    [0, 0, 0],
    [0, 0, 0],
    [0, 0, 0],
    [152, 150, 152],
    [8, 76, 196],
    [48, 50, 236],
    [92, 30, 228],
    [136, 20, 176],
    [160, 20, 100],
    [152, 34, 32],
    [120, 60, 0],
    [84, 90, 0],
    [40, 114, 0],
    [8, 124, 0],
    [0, 118, 40],
    [0, 102, 120],
    [0, 0, 0],
    [0, 0, 0],
    [0, 0, 0],
    [236, 238, 236],
    [76, 154, 236],
    [120, 124, 236],
    [176, 98, 236],
    [228, 84, 236],
    [236, 88, 180],
    [236, 106, 100],
    [212, 136, 32],
    [160, 170, 0],
    [116, 196, 0],
    [76, 208, 32],
    [56, 204, 108],
    [56, 180, 204],
    [60, 60, 60],
    [0, 0, 0],
    [0, 0, 0],
    [236, 238, 236],
    [168, 204, 236],
    [188, 188, 236],
    [212, 178, 236],
    [236, 174, 236],
    [236, 174, 212],
    [236, 180, 176],
    [228, 196, 144],
    [204, 210, 120],
    [180, 222, 120],
    [168, 226, 144],
    [152, 226, 180],
    [160, 214, 228],
    [160, 162, 160],
    [0, 0, 0],
    [0, 0, 0],
];

const DEEMPHASIS: f32 = 0.816;

/// RGBA lookup of 8 emphasis variants x 64 colors.
pub(crate) type ColorTable = [[u8; 4]; 512];

/// Build the emphasis-expanded RGBA table.
pub(crate) fn build_color_table() -> Box<ColorTable> {
    let mut table = Box::new([[0u8; 4]; 512]);
    for emphasis in 0..8usize {
        // Bit 0 = red, bit 1 = green, bit 2 = blue.
        let scale = |channel: usize| -> f32 {
            if emphasis != 0 && emphasis & (1 << channel) == 0 {
                DEEMPHASIS
            } else {
                1.0
            }
        };
        for (color, rgb) in NTSC_PALETTE.iter().enumerate() {
            let entry = &mut table[emphasis * 64 + color];
            for channel in 0..3 {
                entry[channel] = (rgb[channel] as f32 * scale(channel)).round() as u8;
            }
            entry[3] = 0xFF;
        }
    }
    table
}

/// Index into the 32-byte palette RAM for any address in $3F00-$3FFF.
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let idx = (addr & 0x1F) as usize;
    if idx >= 0x10 && idx & 0x03 == 0 {
        idx - 0x10
    } else {
        idx
    }
}
