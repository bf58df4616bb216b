//! HT1621 six-digit 7-segment LCD driver (3-wire serial bus).
//!
//! The glass shows the line label and accumulated volume, e.g.
//! `V1:166.7ml` rendered as far as six digits allow.  Character glyphs
//! the glass cannot form (`:`) are skipped and a `.` folds into the
//! previous digit's decimal-point segment.
//!
//! Generic over `embedded-hal` [`OutputPin`]s so the bit-banged bus works
//! against real GPIO (via [`SysOutputPin`](crate::drivers::hw_init::SysOutputPin))
//! and against recording pins in tests.  Data is latched on the rising
//! WR edge; the HT1621 tolerates bus clocks well above what bit-banging
//! with a 4 µs settle produces.

use embedded_hal::digital::OutputPin;

use crate::app::ports::DisplayPort;
use crate::drivers::hw_init::delay_us;

const DIGITS: usize = 6;

// Command IDs (sent after the 0b100 command prefix).
const CMD_SYS_DIS: u8 = 0x00;
const CMD_SYS_EN: u8 = 0x01;
const CMD_LCD_ON: u8 = 0x03;
const CMD_RC_256K: u8 = 0x18;
/// 1/3 bias, 4 commons.
const CMD_BIAS_THIRD_4COM: u8 = 0x29;

const BUS_SETTLE_US: u32 = 4;

// Segment masks, DP is the high bit.
const SEG_DP: u8 = 0x80;

/// 7-segment glyphs for the characters the glass can form.
/// Layout: 0b0GFEDCBA.
fn glyph(c: char) -> Option<u8> {
    let seg = match c {
        '0' => 0x3F,
        '1' => 0x06,
        '2' => 0x5B,
        '3' => 0x4F,
        '4' => 0x66,
        '5' => 0x6D,
        '6' => 0x7D,
        '7' => 0x07,
        '8' => 0x7F,
        '9' => 0x6F,
        '-' => 0x40,
        ' ' => 0x00,
        // Label / unit letters, best-effort on seven segments.
        'V' | 'U' | 'v' | 'u' => 0x3E,
        'l' | 'L' => 0x38,
        'm' | 'n' => 0x54,
        _ => return None,
    };
    Some(seg)
}

/// Render `text` into the six digit cells, left to right.
/// Unformable characters are dropped, `.` folds into the previous cell,
/// and anything past six cells is discarded.
fn layout(text: &str) -> [u8; DIGITS] {
    let mut cells = [0u8; DIGITS];
    let mut used = 0;
    for c in text.chars() {
        if c == '.' {
            if used > 0 {
                cells[used - 1] |= SEG_DP;
            }
            continue;
        }
        if used == DIGITS {
            break;
        }
        if let Some(seg) = glyph(c) {
            cells[used] = seg;
            used += 1;
        }
    }
    cells
}

pub struct Ht1621<Cs, Wr, Data> {
    cs: Cs,
    wr: Wr,
    data: Data,
}

impl<Cs: OutputPin, Wr: OutputPin, Data: OutputPin> Ht1621<Cs, Wr, Data> {
    pub fn new(cs: Cs, wr: Wr, data: Data) -> Self {
        Self { cs, wr, data }
    }

    /// Power-on sequence: oscillator, bias, system enable, LCD on.
    pub fn begin(&mut self) {
        self.cs.set_high().ok();
        self.wr.set_high().ok();
        self.command(CMD_SYS_DIS);
        self.command(CMD_RC_256K);
        self.command(CMD_BIAS_THIRD_4COM);
        self.command(CMD_SYS_EN);
        self.command(CMD_LCD_ON);
        self.clear_ram();
    }

    /// Blank every digit.
    pub fn clear_ram(&mut self) {
        self.write_cells([0u8; DIGITS]);
    }

    /// Render and show `text`.
    pub fn print(&mut self, text: &str) {
        self.write_cells(layout(text));
    }

    fn write_cells(&mut self, cells: [u8; DIGITS]) {
        // Each digit occupies two 4-bit RAM addresses; the address
        // auto-increments, so one burst per digit is enough.
        for (i, seg) in cells.iter().enumerate() {
            self.write_mem((i * 2) as u8, *seg);
        }
    }

    /// 100 prefix + 8 command bits + trailing don't-care bit.
    fn command(&mut self, cmd: u8) {
        self.cs.set_low().ok();
        self.write_bits(0b100, 3);
        self.write_bits(u16::from(cmd) << 1, 9);
        self.cs.set_high().ok();
    }

    /// 101 prefix + 6 address bits + 8 segment bits (two nibbles).
    fn write_mem(&mut self, addr: u8, seg: u8) {
        self.cs.set_low().ok();
        self.write_bits(0b101, 3);
        self.write_bits(u16::from(addr), 6);
        self.write_bits(u16::from(seg), 8);
        self.cs.set_high().ok();
    }

    /// Shift out `count` bits MSB-first; the HT1621 samples DATA on the
    /// rising WR edge.
    fn write_bits(&mut self, bits: u16, count: u8) {
        for i in (0..count).rev() {
            self.wr.set_low().ok();
            if (bits >> i) & 1 == 1 {
                self.data.set_high().ok();
            } else {
                self.data.set_low().ok();
            }
            delay_us(BUS_SETTLE_US);
            self.wr.set_high().ok();
            delay_us(BUS_SETTLE_US);
        }
    }
}

impl<Cs: OutputPin, Wr: OutputPin, Data: OutputPin> DisplayPort for Ht1621<Cs, Wr, Data> {
    fn clear(&mut self) {
        self.clear_ram();
    }

    fn show(&mut self, text: &str) {
        self.print(text);
    }
}
