//! Wire-level tests of the 5in79 driver against mocked SPI and control pins.
//!
//! Every test spells out the complete expected command/data stream,
//! including the quadrant split over the two controllers.

use embedded_hal_mock::eh1::delay::NoopDelay;
use embedded_hal_mock::eh1::digital::{Mock as PinMock, State, Transaction as PinTransaction};
use embedded_hal_mock::eh1::spi::{Mock as SpiMock, Transaction as SpiTransaction};

use epd_gdey::epd5in79::{Epd5in79, HEIGHT, WIDTH};
use epd_gdey::prelude::*;

/// RAM bytes of one quadrant window (half width, half height)
const QUADRANT_BYTES: usize = (WIDTH as usize / 2 + 7) / 8 * (HEIGHT as usize / 2);

/// Expected traffic of a test run, kept in lockstep for all mocks.
#[derive(Default)]
struct Expectations {
    spi: Vec<SpiTransaction<u8>>,
    dc: Vec<PinTransaction>,
    busy: Vec<PinTransaction>,
}

impl Expectations {
    fn cmd(&mut self, code: u8) {
        self.dc.push(PinTransaction::set(State::Low));
        self.spi.push(SpiTransaction::transaction_start());
        self.spi.push(SpiTransaction::write_vec(vec![code]));
        self.spi.push(SpiTransaction::transaction_end());
    }

    fn data(&mut self, bytes: &[u8]) {
        self.dc.push(PinTransaction::set(State::High));
        self.spi.push(SpiTransaction::transaction_start());
        self.spi.push(SpiTransaction::write_vec(bytes.to_vec()));
        self.spi.push(SpiTransaction::transaction_end());
    }

    fn cmd_data(&mut self, code: u8, bytes: &[u8]) {
        self.cmd(code);
        self.data(bytes);
    }

    /// A RAM fill leaves the value as single byte writes
    fn fill(&mut self, value: u8, count: usize) {
        self.dc.push(PinTransaction::set(State::High));
        for _ in 0..count {
            self.spi.push(SpiTransaction::transaction_start());
            self.spi.push(SpiTransaction::write_vec(vec![value]));
            self.spi.push(SpiTransaction::transaction_end());
        }
    }

    fn idle_poll(&mut self) {
        self.busy.push(PinTransaction::get(State::Low));
    }

    /// Window programming of one controller. The driver uses entry mode
    /// 0x03 (both incrementing) and 0x02 (X decrementing, mirrored half).
    fn window(&mut self, slave: bool, mode: u8, x: u32, y: u32, w: u32, h: u32) {
        let target = if slave { 0x80 } else { 0x00 };
        let x_first = (x / 8) as u8;
        let x_last = ((x + w - 1) / 8) as u8;
        let y_first = [(y % 256) as u8, (y / 256) as u8];
        let y_last = [((y + h - 1) % 256) as u8, ((y + h - 1) / 256) as u8];
        self.cmd_data(0x11 | target, &[mode]);
        if mode == 0x03 {
            self.cmd_data(0x44 | target, &[x_first, x_last]);
        } else {
            self.cmd_data(0x44 | target, &[x_last, x_first]);
        }
        self.cmd_data(
            0x45 | target,
            &[y_first[0], y_first[1], y_last[0], y_last[1]],
        );
        if mode == 0x03 {
            self.cmd_data(0x4E | target, &[x_first]);
        } else {
            self.cmd_data(0x4E | target, &[x_last]);
        }
        self.cmd_data(0x4F | target, &[y_first[0], y_first[1]]);
    }

    /// Black/white init as run by `new` and `wake_up`
    fn init_display(&mut self) {
        self.cmd(0x12);
        self.cmd_data(0x18, &[0x80]);
        self.cmd_data(0x22, &[0xB1]);
        self.cmd(0x20);
        self.cmd_data(0x1A, &[0x64, 0x00]);
        self.cmd_data(0x22, &[0x91]);
        self.cmd(0x20);
    }

    /// Full refresh: both full half windows, then the fast full sequence
    fn full_refresh(&mut self) {
        self.full_refresh_commands();
        self.idle_poll();
    }

    /// The command stream of a full refresh, without the busy poll
    fn full_refresh_commands(&mut self) {
        self.window(true, 0x03, 0, 0, WIDTH / 2, HEIGHT);
        self.window(false, 0x03, 0, 0, WIDTH / 2, HEIGHT);
        self.cmd_data(0x21, &[0x40, 0x10]);
        self.cmd_data(0x1A, &[0x64, 0x00]);
        self.cmd_data(0x22, &[0xD7]);
        self.cmd(0x20);
    }

    /// The differential refresh sequence, no window programming
    fn partial_refresh(&mut self) {
        self.cmd_data(0x3C, &[0x80]);
        self.cmd_data(0x21, &[0x00, 0x10]);
        self.cmd_data(0x22, &[0xFF]);
        self.cmd(0x20);
        self.idle_poll();
    }

    /// Fills one RAM plane of both controllers quadrant by quadrant
    fn plane_fill(&mut self, write_command: u8, value: u8) {
        self.window(true, 0x03, 0, 0, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command | 0x80);
        self.fill(value, QUADRANT_BYTES);
        self.window(false, 0x02, 0, 0, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command);
        self.fill(value, QUADRANT_BYTES);
        self.window(true, 0x03, 0, HEIGHT / 2, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command | 0x80);
        self.fill(value, QUADRANT_BYTES);
        self.window(false, 0x02, 0, HEIGHT / 2, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command);
        self.fill(value, QUADRANT_BYTES);
    }

    /// A full frame of one uniform value written row by row into a plane
    fn plane_rows(&mut self, write_command: u8, value: u8) {
        let row = [value; (WIDTH as usize / 2 + 7) / 8];
        self.window(true, 0x03, 0, 0, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command | 0x80);
        for _ in 0..HEIGHT / 2 {
            self.data(&row);
        }
        self.window(false, 0x02, 0, 0, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command);
        for _ in 0..HEIGHT / 2 {
            self.data(&row);
        }
        self.window(true, 0x03, 0, HEIGHT / 2, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command | 0x80);
        for _ in 0..HEIGHT / 2 {
            self.data(&row);
        }
        self.window(false, 0x02, 0, HEIGHT / 2, WIDTH / 2, HEIGHT / 2);
        self.cmd(write_command);
        for _ in 0..HEIGHT / 2 {
            self.data(&row);
        }
    }

    /// Greyscale init as run by the first four-level write: soft start,
    /// waveform table with its analog values, both planes zeroed
    fn grey_init(&mut self) {
        self.cmd(0x12);
        self.cmd_data(0x0C, &[0x8B, 0x9C, 0xA4, 0x0F]);
        self.cmd_data(0x21, &[0x00, 0x00]);
        self.cmd_data(0x3C, &[0x03]);
        self.window(false, 0x03, 0, 0, WIDTH / 2, HEIGHT);
        self.window(true, 0x03, 0, 0, WIDTH / 2, HEIGHT);
        self.cmd_data(0x32, &GREY_LUT[..227]);
        self.cmd(0x3F);
        self.cmd_data(0x03, &GREY_LUT[228..229]);
        self.cmd_data(0x04, &GREY_LUT[229..232]);
        self.cmd_data(0x2C, &GREY_LUT[232..]);
        self.plane_fill(0x24, 0x00);
        self.plane_fill(0x26, 0x00);
    }
}

fn reset_pulse() -> Vec<PinTransaction> {
    vec![
        PinTransaction::set(State::High),
        PinTransaction::set(State::Low),
        PinTransaction::set(State::High),
    ]
}

#[test]
fn region_refresh_before_any_full_refresh_upgrades() {
    let mut e = Expectations::default();
    e.init_display();
    e.full_refresh();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.refresh_area(&mut spi, &mut delay, 10, 10, 50, 50).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn first_write_clears_to_background_then_region_refresh() {
    let mut e = Expectations::default();
    e.init_display();

    // the first image write on a virgin device settles the panel first:
    // both planes filled white, one full refresh
    e.plane_fill(0x26, 0xFF);
    e.plane_fill(0x24, 0xFF);
    e.full_refresh();

    // the 16x16 image lands in the upper left quadrant of the slave,
    // 2 bytes per row
    e.window(true, 0x03, 0, 0, 16, 16);
    e.cmd(0xA4);
    for _ in 0..16 {
        e.data(&[0x00, 0x00]);
    }

    e.partial_refresh();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();

    let black = [0x00u8; 32];
    epd.write_image(&mut spi, &mut delay, &Bitmap::new(&black, 16, 16), 0, 0)
        .unwrap();
    epd.refresh_area(&mut spi, &mut delay, 0, 0, 16, 16).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn region_refresh_outside_the_panel_is_a_no_op() {
    let mut e = Expectations::default();
    e.init_display();
    e.full_refresh();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.refresh(&mut spi, &mut delay, false).unwrap();

    // entirely left of the panel, and entirely right of it
    epd.refresh_area(&mut spi, &mut delay, -64, 0, 32, 32).unwrap();
    epd.refresh_area(&mut spi, &mut delay, 800, 0, 8, 8).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn fast_mode_reinitializes_before_the_full_refresh() {
    let mut e = Expectations::default();
    e.init_display();
    // the fast path runs the plain init again right before the update,
    // without pulsing reset
    e.init_display();
    e.full_refresh();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.set_refresh_mode(RefreshMode::Fast);
    epd.refresh(&mut spi, &mut delay, false).unwrap();
    // fast is a one-shot request, the reinit drops back to full
    assert_eq!(epd.refresh_mode(), RefreshMode::Full);

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn forced_full_upgrades_the_region_refresh() {
    let mut e = Expectations::default();
    e.init_display();
    e.full_refresh();
    // the region request comes out as a second full refresh, with no
    // reinit in between
    e.full_refresh();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.refresh(&mut spi, &mut delay, false).unwrap();
    epd.set_refresh_mode(RefreshMode::ForcedFull);
    epd.refresh_area(&mut spi, &mut delay, 10, 10, 50, 50).unwrap();
    assert_eq!(epd.refresh_mode(), RefreshMode::Full);

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn a_stuck_busy_line_gives_up_after_the_refresh_bound() {
    let mut e = Expectations::default();
    e.init_display();
    e.full_refresh_commands();
    // four poll sleeps of 550ms reach the 2200ms ceiling of a full
    // refresh, the fifth poll returns without seeing the line drop
    for _ in 0..5 {
        e.busy.push(PinTransaction::get(State::High));
    }

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd =
        Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, Some(550_000)).unwrap();
    epd.refresh(&mut spi, &mut delay, false).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn clear_screen_sends_the_same_transcript_every_time() {
    let mut e = Expectations::default();
    e.init_display();
    // the fill paths carry no state between calls, so both rounds come
    // out byte-identical: previous plane, current plane, full refresh
    for _ in 0..2 {
        e.plane_fill(0x26, 0xFF);
        e.plane_fill(0x24, 0xFF);
        e.full_refresh();
    }

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.clear_screen(&mut spi, &mut delay, 0xFF).unwrap();
    epd.clear_screen(&mut spi, &mut delay, 0xFF).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn part_writes_align_the_window_to_byte_boundaries() {
    let mut e = Expectations::default();
    e.init_display();
    e.plane_fill(0x26, 0xFF);
    e.plane_fill(0x24, 0xFF);
    e.full_refresh();

    // source column 10 drops to 8, panel column 13 drops to 8, and the
    // 11 pixel width rounds up to two bytes
    e.window(true, 0x03, 8, 5, 16, 4);
    e.cmd(0xA4);
    e.data(&[9, 10]);
    e.data(&[13, 14]);
    e.data(&[17, 18]);
    e.data(&[21, 22]);

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.clear_screen(&mut spi, &mut delay, 0xFF).unwrap();

    // a 32x8 bitmap numbering its bytes row-major, 4 bytes per row
    let numbered: Vec<u8> = (0..32).collect();
    let bitmap = Bitmap::new(&numbered, 32, 8);
    epd.write_image_part(&mut spi, &mut delay, &bitmap, 10, 2, 13, 5, 11, 4)
        .unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn write_image_again_repeats_the_image_into_the_previous_plane() {
    let mut e = Expectations::default();
    e.init_display();
    e.plane_fill(0x26, 0xFF);
    e.plane_fill(0x24, 0xFF);
    e.full_refresh();

    // previous plane first, then the current one, same bytes
    for write_command in [0xA6, 0xA4] {
        e.window(true, 0x03, 0, 0, 16, 16);
        e.cmd(write_command);
        for _ in 0..16 {
            e.data(&[0x5A, 0x5A]);
        }
    }

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.clear_screen(&mut spi, &mut delay, 0xFF).unwrap();

    let pattern = [0x5A; 32];
    epd.write_image_again(&mut spi, &mut delay, &Bitmap::new(&pattern, 16, 16), 0, 0)
        .unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn update_and_display_frame_writes_shows_then_rewrites() {
    let mut e = Expectations::default();
    e.init_display();
    // the virgin write settles the panel before any image data
    e.plane_fill(0x26, 0xFF);
    e.plane_fill(0x24, 0xFF);
    e.full_refresh();
    // the frame lands in the current plane and goes on the glass
    e.plane_rows(0x24, 0xFF);
    e.full_refresh();
    // then both planes get the frame again as the new reference
    e.plane_rows(0x26, 0xFF);
    e.plane_rows(0x24, 0xFF);

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();

    let frame = vec![0xFF; (WIDTH as usize + 7) / 8 * HEIGHT as usize];
    epd.update_and_display_frame(&mut spi, &frame, &mut delay)
        .unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn draw_image_part_refreshes_and_rewrites_the_window() {
    let mut e = Expectations::default();
    e.init_display();
    e.plane_fill(0x26, 0xFF);
    e.plane_fill(0x24, 0xFF);
    e.full_refresh();

    // the window goes to the current plane, on the glass, then to both
    // planes again
    e.window(true, 0x03, 8, 5, 16, 4);
    e.cmd(0xA4);
    e.data(&[9, 10]);
    e.data(&[13, 14]);
    e.data(&[17, 18]);
    e.data(&[21, 22]);
    e.partial_refresh();
    for write_command in [0xA6, 0xA4] {
        e.window(true, 0x03, 8, 5, 16, 4);
        e.cmd(write_command);
        e.data(&[9, 10]);
        e.data(&[13, 14]);
        e.data(&[17, 18]);
        e.data(&[21, 22]);
    }

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.clear_screen(&mut spi, &mut delay, 0xFF).unwrap();

    let numbered: Vec<u8> = (0..32).collect();
    let bitmap = Bitmap::new(&numbered, 32, 8);
    epd.draw_image_part(&mut spi, &mut delay, &bitmap, 10, 2, 13, 5, 11, 4)
        .unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn hibernate_sends_deep_sleep_to_the_master() {
    let mut e = Expectations::default();
    e.init_display();
    e.cmd_data(0x10, &[0x01]);
    // waking up pulses reset and runs the plain init again
    e.init_display();

    let mut rst_expectations = reset_pulse();
    rst_expectations.extend(reset_pulse());

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&rst_expectations);
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();
    epd.hibernate(&mut spi, &mut delay).unwrap();
    epd.wake_up(&mut spi, &mut delay).unwrap();
    assert_eq!(epd.refresh_mode(), RefreshMode::Full);

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

// Waveform table of the four-level mode, same bytes the driver loads
const GREY_LUT: [u8; 233] = [
    0x01, 0x0A, 0x1B, 0x0F, 0x03, 0x01, 0x01, //
    0x05, 0x0A, 0x01, 0x0A, 0x01, 0x01, 0x01, //
    0x05, 0x08, 0x03, 0x02, 0x04, 0x01, 0x01, //
    0x01, 0x04, 0x04, 0x02, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x0A, 0x1B, 0x0F, 0x03, 0x01, 0x01, //
    0x05, 0x4A, 0x01, 0x8A, 0x01, 0x01, 0x01, //
    0x05, 0x48, 0x03, 0x82, 0x84, 0x01, 0x01, //
    0x01, 0x84, 0x84, 0x82, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x0A, 0x1B, 0x8F, 0x03, 0x01, 0x01, //
    0x05, 0x4A, 0x01, 0x8A, 0x01, 0x01, 0x01, //
    0x05, 0x48, 0x83, 0x82, 0x04, 0x01, 0x01, //
    0x01, 0x04, 0x04, 0x02, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x8A, 0x1B, 0x8F, 0x03, 0x01, 0x01, //
    0x05, 0x4A, 0x01, 0x8A, 0x01, 0x01, 0x01, //
    0x05, 0x48, 0x83, 0x02, 0x04, 0x01, 0x01, //
    0x01, 0x04, 0x04, 0x02, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x8A, 0x9B, 0x8F, 0x03, 0x01, 0x01, //
    0x05, 0x4A, 0x01, 0x8A, 0x01, 0x01, 0x01, //
    0x05, 0x48, 0x03, 0x42, 0x04, 0x01, 0x01, //
    0x01, 0x04, 0x04, 0x42, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x01, 0x00, 0x00, 0x00, 0x00, 0x01, 0x01, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, //
    0x02, 0x00, 0x00, 0x07, 0x17, 0x41, 0xA8, //
    0x32, 0x30,
];

#[test]
fn grey_write_loads_waveform_and_splits_planes() {
    let mut e = Expectations::default();
    e.init_display();

    // the first grey write swaps the controllers over to the four-level
    // waveform and zeroes both planes
    e.grey_init();

    // one row of the source holds white, black, light grey, dark grey,
    // dark grey, light grey, black, white at two bits per pixel; the
    // planes leave complemented, one bit per pixel
    e.window(true, 0x03, 0, 0, 8, 8);
    e.cmd(0xA6);
    for _ in 0..8 {
        e.data(&[0x5A]);
    }
    e.window(true, 0x03, 0, 0, 8, 8);
    e.cmd(0xA4);
    for _ in 0..8 {
        e.data(&[0x66]);
    }

    // the four-level refresh runs without window programming
    e.cmd_data(0x21, &[0x88, 0x10]);
    e.cmd_data(0x22, &[0xCF]);
    e.cmd(0x20);
    e.idle_poll();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();

    let grey = [0xC9u8, 0x63].repeat(8);
    epd.write_grey_image(
        &mut spi,
        &mut delay,
        &GreyBitmap::new(&grey, 8, 8, Bpp::Two),
        0,
        0,
    )
    .unwrap();
    assert_eq!(epd.refresh_mode(), RefreshMode::Grey);
    epd.refresh_area(&mut spi, &mut delay, 0, 0, 8, 8).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn grey_part_write_aligns_to_pixel_groups() {
    let mut e = Expectations::default();
    e.init_display();
    e.grey_init();

    // source column 5 drops to 4, panel column 11 drops to 8, and the
    // 7 pixel width rounds up to one RAM byte per row; the rows read
    // source bytes 5..7 and 9..11 of the numbered bitmap
    e.window(true, 0x03, 8, 2, 8, 2);
    e.cmd(0xA6);
    e.data(&[0xFE]);
    e.data(&[0xDC]);
    e.window(true, 0x03, 8, 2, 8, 2);
    e.cmd(0xA4);
    e.data(&[0xCD]);
    e.data(&[0xEF]);

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let rst = PinMock::new(&reset_pulse());
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();
    let mut rst_done = rst.clone();

    let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None).unwrap();

    // a 16x4 bitmap numbering its bytes row-major, 4 bytes per row
    let numbered: Vec<u8> = (0..16).collect();
    let bitmap = GreyBitmap::new(&numbered, 16, 4, Bpp::Two);
    epd.write_grey_image_part(&mut spi, &mut delay, &bitmap, 5, 1, 11, 2, 7, 2)
        .unwrap();
    assert_eq!(epd.refresh_mode(), RefreshMode::Grey);

    spi.done();
    busy_done.done();
    dc_done.done();
    rst_done.done();
}

#[test]
fn hibernate_without_reset_line_skips_deep_sleep() {
    let mut e = Expectations::default();
    e.init_display();

    let mut spi = SpiMock::new(&e.spi);
    let mut delay = NoopDelay::new();
    let busy = PinMock::new(&e.busy);
    let dc = PinMock::new(&e.dc);
    let mut busy_done = busy.clone();
    let mut dc_done = dc.clone();

    let mut epd =
        Epd5in79::new(&mut spi, busy, dc, None::<PinMock>, &mut delay, None).unwrap();
    epd.hibernate(&mut spi, &mut delay).unwrap();

    spi.done();
    busy_done.done();
    dc_done.done();
}
