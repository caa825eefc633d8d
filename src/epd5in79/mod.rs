//! A driver for the 5.79" GDEY0579T93 e-paper panel from Good Display via SPI
//!
//! The panel is split into two 396 pixel wide halves, each driven by its own
//! SSD1683 controller on the shared bus. Plain commands address the master
//! controller on the right half, the same command with the top bit set goes
//! to the slave on the left half. The right half is mounted gate-mirrored,
//! so its RAM X axis runs against the panel X axis.
//!
//! Besides black/white with differential updates the panel supports a
//! 4-level greyscale mode with a vendor waveform, see [`GreyscaleDisplay`].
//!
//! # References
//! - [GDEY0579T93](https://www.good-display.com/product/439.html)
//! - [SSD1683](https://v4.cecdn.yun300.cn/100001_1909185148/SSD1683.PDF)

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

mod command;
mod constants;
mod packing;
mod quadrants;

use self::command::{
    BorderWaveForm, BorderWaveFormFixLevel, BorderWaveFormGs, BorderWaveFormVbd, Command,
    Controller, DataEntryMode, DeepSleep, Plane, Targeted, UpdateSequence,
};
use self::constants::grey_waveform;
use self::packing::{pack_grey_row, pack_mono_row};
use self::quadrants::{clip_to_panel, partition, Clipped};
use crate::color::Color;
use crate::interface::DisplayInterface;
use crate::rect::Rect;
use crate::traits::{
    Bitmap, EpaperDisplay, GreyBitmap, GreyscaleDisplay, InternalEpdAdditions, Panel, RefreshMode,
};

/// Width of the display
pub const WIDTH: u32 = 792;
/// Height of the display
pub const HEIGHT: u32 = 272;
/// Default background color
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::White;

const IS_BUSY_LOW: bool = false;
const SINGLE_BYTE_WRITE: bool = false;

// Nominal waveform durations, these bound the busy polling
const POWER_ON_TIME_MS: u32 = 100;
const POWER_OFF_TIME_MS: u32 = 300;
const FULL_REFRESH_TIME_MS: u32 = 2200;
const PARTIAL_REFRESH_TIME_MS: u32 = 450;

/// One RAM row of one controller half
const HALF_WIDTH_BYTES: usize = ((WIDTH / 2 + 7) / 8) as usize;

/// Full size black/white buffer for use with the 5in79 EPD
#[cfg(feature = "graphics")]
pub type Display5in79 = crate::graphics::Display<
    WIDTH,
    HEIGHT,
    { crate::buffer_len(WIDTH as usize, HEIGHT as usize) },
    Color,
>;

/// Full size 4-level greyscale buffer for use with the 5in79 EPD
#[cfg(feature = "graphics")]
pub type Display5in79Grey = crate::graphics::Display<
    WIDTH,
    HEIGHT,
    { crate::graphics::line_bytes(WIDTH, 2) * HEIGHT as usize },
    crate::color::Grey4,
>;

/// Epd5in79 driver
///
/// Writes take panel coordinates, the split into the four controller
/// windows (two controllers, upper and lower half each) happens internally.
/// Pixel data lands in the controller RAM planes only; [`refresh`] and the
/// `draw_*` operations put them on the glass.
///
/// [`refresh`]: Epd5in79::refresh
pub struct Epd5in79<SPI, BUSY, DC, RST, DELAY> {
    /// Connection interface
    interface: DisplayInterface<SPI, BUSY, DC, RST, DELAY, SINGLE_BYTE_WRITE>,
    /// Background color
    background_color: Color,
    /// The flow the next refresh takes
    refresh_mode: RefreshMode,
    /// RAM has never been written since power-up
    initial_write: bool,
    /// No full refresh has happened yet
    initial_refresh: bool,
    /// Black/white init sequence has run
    init_display_done: bool,
    /// Greyscale init sequence has run
    init_4g_done: bool,
    /// Deep sleep entered, the next init must pulse reset
    hibernating: bool,
    power_is_on: bool,
}

impl<SPI, BUSY, DC, RST, DELAY> InternalEpdAdditions<SPI, BUSY, DC, RST, DELAY>
    for Epd5in79<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn init(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.interface.reset(delay, 10_000, 10_000);
        self.hibernating = false;
        self.init_display(spi, delay)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> EpaperDisplay<SPI, BUSY, DC, RST, DELAY>
    for Epd5in79<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    type DisplayColor = Color;

    const PANEL: Panel = Panel::Gdey0579T93;

    fn new(
        spi: &mut SPI,
        busy: BUSY,
        dc: DC,
        rst: Option<RST>,
        delay: &mut DELAY,
        delay_us: Option<u32>,
    ) -> Result<Self, SPI::Error> {
        let interface = DisplayInterface::new(busy, dc, rst, delay_us);

        let mut epd = Epd5in79 {
            interface,
            background_color: DEFAULT_BACKGROUND_COLOR,
            refresh_mode: RefreshMode::Full,
            initial_write: true,
            initial_refresh: true,
            init_display_done: false,
            init_4g_done: false,
            hibernating: false,
            power_is_on: false,
        };
        epd.init(spi, delay)?;

        Ok(epd)
    }

    fn sleep(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.hibernate(spi, delay)
    }

    fn wake_up(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.init(spi, delay)
    }

    fn set_background_color(&mut self, color: Color) {
        self.background_color = color;
    }

    fn background_color(&self) -> &Color {
        &self.background_color
    }

    fn width(&self) -> u32 {
        WIDTH
    }

    fn height(&self) -> u32 {
        HEIGHT
    }

    fn update_frame(
        &mut self,
        spi: &mut SPI,
        buffer: &[u8],
        delay: &mut DELAY,
    ) -> Result<(), SPI::Error> {
        self.write_image(spi, delay, &Bitmap::new(buffer, WIDTH, HEIGHT), 0, 0)
    }

    fn update_partial_frame(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        buffer: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        let bitmap = Bitmap::new(buffer, width, height);
        self.write_image(spi, delay, &bitmap, x as i32, y as i32)
    }

    fn display_frame(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.refresh(spi, delay, false)
    }

    fn update_and_display_frame(
        &mut self,
        spi: &mut SPI,
        buffer: &[u8],
        delay: &mut DELAY,
    ) -> Result<(), SPI::Error> {
        let bitmap = Bitmap::new(buffer, WIDTH, HEIGHT);
        self.write_image(spi, delay, &bitmap, 0, 0)?;
        self.refresh(spi, delay, false)?;
        self.write_image_again(spi, delay, &bitmap, 0, 0)
    }

    fn clear_frame(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        let fill = self.background_color.get_byte_value();
        self.write_screen_buffer(spi, delay, fill)
    }

    fn wait_until_idle(&mut self, _spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.interface
            .wait_until_idle(delay, IS_BUSY_LOW, FULL_REFRESH_TIME_MS);
        Ok(())
    }

    fn is_busy(&mut self) -> bool {
        self.interface.is_busy(IS_BUSY_LOW)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> GreyscaleDisplay<SPI, BUSY, DC, RST, DELAY>
    for Epd5in79<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    fn write_grey_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &GreyBitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        let ppb = bitmap.bpp.pixels_per_byte();
        // push the origin down to a controller byte boundary
        let x = x - (x.unsigned_abs() % 8) as i32;
        let w = (bitmap.width + 7) / 8 * 8;
        // source rows are padded to the byte-aligned width
        let stride = (w + ppb - 1) / ppb;
        let clip = match clip_to_panel(x, y, w, bitmap.height) {
            Some(clip) => clip,
            None => return Ok(()),
        };
        if !self.init_4g_done {
            self.init_4g(spi, delay)?;
        }
        self.write_grey_clipped(spi, delay, Plane::Previous, bitmap, stride, clip, 0, 0)?;
        self.write_grey_clipped(spi, delay, Plane::Current, bitmap, stride, clip, 0, 0)
    }

    fn write_grey_image_part(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &GreyBitmap,
        x_part: u32,
        y_part: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        let ppb = bitmap.bpp.pixels_per_byte();
        if x_part >= bitmap.width || y_part >= bitmap.height {
            return Ok(());
        }
        let stride = (bitmap.width + ppb - 1) / ppb;
        let x_part = x_part - x_part % ppb;
        let width = width.min(bitmap.width - x_part);
        let height = height.min(bitmap.height - y_part);
        let x = x - x % (ppb as i32);
        let width = (width + ppb - 1) / ppb * ppb;
        let clip = match clip_to_panel(x, y, width, height) {
            Some(clip) => clip,
            None => return Ok(()),
        };
        if !self.init_4g_done {
            self.init_4g(spi, delay)?;
        }
        self.write_grey_clipped(spi, delay, Plane::Previous, bitmap, stride, clip, x_part, y_part)?;
        self.write_grey_clipped(spi, delay, Plane::Current, bitmap, stride, clip, x_part, y_part)
    }

    fn draw_grey_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &GreyBitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        self.write_grey_image(spi, delay, bitmap, x, y)?;
        self.refresh_area(spi, delay, x, y, bitmap.width, bitmap.height)
    }

    fn draw_grey_image_part(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &GreyBitmap,
        x_part: u32,
        y_part: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        self.write_grey_image_part(spi, delay, bitmap, x_part, y_part, x, y, width, height)?;
        self.refresh_area(spi, delay, x, y, width, height)
    }

    fn draw_grey_levels(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        if !self.init_4g_done {
            self.init_4g(spi, delay)?;
        }
        // band values per plane, top to bottom: black, dark grey, light
        // grey, white; the greyscale update reads RAM inverted
        const CURRENT: [u8; 4] = [0x00, 0xFF, 0x00, 0xFF];
        const PREVIOUS: [u8; 4] = [0x00, 0x00, 0xFF, 0xFF];
        let band = HEIGHT / 4;
        for (i, value) in CURRENT.iter().enumerate() {
            let area = Rect::new(0, i as u32 * band, WIDTH, band);
            self.fill_area(spi, delay, area, Plane::Current, *value)?;
        }
        for (i, value) in PREVIOUS.iter().enumerate() {
            let area = Rect::new(0, i as u32 * band, WIDTH, band);
            self.fill_area(spi, delay, area, Plane::Previous, *value)?;
        }
        self.update_4g(spi, delay)
    }
}

impl<SPI, BUSY, DC, RST, DELAY> Epd5in79<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Fills both RAM planes with `value` and runs a full refresh.
    ///
    /// `0xFF` is white, `0x00` black.
    pub fn clear_screen(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        value: u8,
    ) -> Result<(), SPI::Error> {
        if !self.init_display_done {
            self.init_display(spi, delay)?;
        }
        self.fill_plane(spi, delay, Plane::Previous, value)?;
        self.fill_plane(spi, delay, Plane::Current, value)?;
        self.refresh(spi, delay, false)?;
        self.initial_write = false;
        Ok(())
    }

    /// Fills the current RAM plane with `value`, without refreshing.
    ///
    /// On a virgin device this redirects to [`clear_screen`], the panel
    /// needs one settled image before differential updates.
    ///
    /// [`clear_screen`]: Epd5in79::clear_screen
    pub fn write_screen_buffer(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        value: u8,
    ) -> Result<(), SPI::Error> {
        if self.initial_write {
            return self.clear_screen(spi, delay, value);
        }
        if !self.init_display_done {
            self.init_display(spi, delay)?;
        }
        self.fill_plane(spi, delay, Plane::Current, value)
    }

    /// Fills both RAM planes with `value`, without refreshing.
    pub fn write_screen_buffer_again(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        value: u8,
    ) -> Result<(), SPI::Error> {
        if !self.init_display_done {
            self.init_display(spi, delay)?;
        }
        self.fill_plane(spi, delay, Plane::Current, value)?;
        self.fill_plane(spi, delay, Plane::Previous, value)
    }

    /// Writes a monochrome bitmap into the current plane at `(x, y)`.
    ///
    /// `x` is rounded down to a byte boundary, the width up. In `Grey` mode
    /// the previous plane is written first.
    pub fn write_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        if self.refresh_mode == RefreshMode::Grey {
            self.write_image_plane(spi, delay, Plane::Previous, bitmap, x, y)?;
        }
        self.write_image_plane(spi, delay, Plane::Current, bitmap, x, y)
    }

    /// Writes a monochrome bitmap into both planes ahead of a full refresh,
    /// so that the following differential updates start from it.
    pub fn write_image_for_full_refresh(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        self.write_image_plane(spi, delay, Plane::Previous, bitmap, x, y)?;
        self.write_image_plane(spi, delay, Plane::Current, bitmap, x, y)
    }

    /// Writes a monochrome bitmap into both planes, previous first.
    ///
    /// Call with the same image after a refresh to keep the reference
    /// plane in step.
    pub fn write_image_again(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        self.write_image_plane(spi, delay, Plane::Previous, bitmap, x, y)?;
        self.write_image_plane(spi, delay, Plane::Current, bitmap, x, y)
    }

    /// Writes the window at `(x_part, y_part)` sized `width` x `height` out
    /// of a larger monochrome bitmap to the panel position `(x, y)`.
    ///
    /// `x_part` and `x` are rounded down to byte boundaries, the width up.
    #[allow(clippy::too_many_arguments)]
    pub fn write_image_part(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x_part: u32,
        y_part: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        if self.refresh_mode == RefreshMode::Grey {
            self.write_image_part_plane(
                spi,
                delay,
                Plane::Previous,
                bitmap,
                x_part,
                y_part,
                x,
                y,
                width,
                height,
            )?;
        }
        self.write_image_part_plane(
            spi,
            delay,
            Plane::Current,
            bitmap,
            x_part,
            y_part,
            x,
            y,
            width,
            height,
        )
    }

    /// Writes a window of a larger monochrome bitmap into both planes,
    /// previous first.
    #[allow(clippy::too_many_arguments)]
    pub fn write_image_part_again(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x_part: u32,
        y_part: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        self.write_image_part_plane(
            spi,
            delay,
            Plane::Previous,
            bitmap,
            x_part,
            y_part,
            x,
            y,
            width,
            height,
        )?;
        self.write_image_part_plane(
            spi,
            delay,
            Plane::Current,
            bitmap,
            x_part,
            y_part,
            x,
            y,
            width,
            height,
        )
    }

    /// Writes a monochrome bitmap and refreshes the covered region.
    pub fn draw_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        self.write_image(spi, delay, bitmap, x, y)?;
        self.refresh_area(spi, delay, x, y, bitmap.width, bitmap.height)?;
        self.write_image_again(spi, delay, bitmap, x, y)
    }

    /// Writes a window of a larger monochrome bitmap and refreshes the
    /// covered region.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_part(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &Bitmap,
        x_part: u32,
        y_part: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        self.write_image_part(spi, delay, bitmap, x_part, y_part, x, y, width, height)?;
        self.refresh_area(spi, delay, x, y, width, height)?;
        self.write_image_part_again(spi, delay, bitmap, x_part, y_part, x, y, width, height)
    }

    /// Puts the RAM content on the glass.
    ///
    /// `partial` requests the differential waveform; the first refresh of a
    /// device runs full regardless.
    pub fn refresh(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        partial: bool,
    ) -> Result<(), SPI::Error> {
        if partial {
            return self.refresh_area(spi, delay, 0, 0, WIDTH, HEIGHT);
        }
        if self.refresh_mode == RefreshMode::ForcedFull {
            self.refresh_mode = RefreshMode::Full;
        }
        if self.refresh_mode == RefreshMode::Fast {
            self.init_display(spi, delay)?;
        }
        if self.refresh_mode == RefreshMode::Grey {
            self.update_4g(spi, delay)?;
        } else {
            self.set_full_ram_area(spi, delay, Controller::Slave)?;
            self.set_full_ram_area(spi, delay, Controller::Master)?;
            self.update_full(spi, delay)?;
        }
        self.initial_refresh = false;
        Ok(())
    }

    /// Refreshes the panel for a changed region with the differential
    /// waveform.
    ///
    /// The update itself always scans the whole panel from RAM, an empty
    /// region (after clipping) turns the call into a no-op. Before the
    /// first full refresh, and in `ForcedFull` mode, the request upgrades
    /// to a full refresh.
    pub fn refresh_area(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        if self.initial_refresh || self.refresh_mode == RefreshMode::ForcedFull {
            return self.refresh(spi, delay, false);
        }
        if clip_to_panel(x, y, width, height).is_none() {
            return Ok(());
        }
        if self.refresh_mode == RefreshMode::Grey {
            self.update_4g(spi, delay)
        } else {
            self.update_part(spi, delay)
        }
    }

    /// Requests the flow of the next refresh.
    ///
    /// `Fast` makes the next full refresh re-initialize the panel first,
    /// `ForcedFull` upgrades region refreshes until the next full refresh.
    /// Greyscale mode is entered through the greyscale writes instead.
    pub fn set_refresh_mode(&mut self, mode: RefreshMode) {
        self.refresh_mode = mode;
    }

    /// The flow the next refresh takes
    pub fn refresh_mode(&self) -> RefreshMode {
        self.refresh_mode
    }

    /// Runs the power-on sequence unless the driving rails are already up.
    ///
    /// The update sequences raise and drop the rails on their own, this is
    /// only useful around raw command use.
    pub fn power_on(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        if !self.power_is_on {
            self.update_sequence(
                spi,
                UpdateSequence::new().enable_clock().enable_analog().load_temp(),
            )?;
            self.command(spi, Command::MasterActivation)?;
            self.interface
                .wait_until_idle(delay, IS_BUSY_LOW, POWER_ON_TIME_MS);
        }
        self.power_is_on = true;
        Ok(())
    }

    /// Drops the panel driving voltages if they are up.
    pub fn power_off(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        if self.power_is_on {
            self.update_sequence(
                spi,
                UpdateSequence::new().enable_clock().disable_analog().disable_clock(),
            )?;
            self.command(spi, Command::MasterActivation)?;
            self.interface
                .wait_until_idle(delay, IS_BUSY_LOW, POWER_OFF_TIME_MS);
        }
        self.power_is_on = false;
        Ok(())
    }

    /// Powers off and puts both controllers into deep sleep.
    ///
    /// Without a reset line the deep sleep command is skipped, the device
    /// could never be woken again.
    pub fn hibernate(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.power_off(spi, delay)?;
        if self.interface.has_rst() {
            self.cmd_with_data(spi, Command::DeepSleepMode, &[DeepSleep::Mode1 as u8])?;
            self.hibernating = true;
            self.init_display_done = false;
            self.init_4g_done = false;
        }
        Ok(())
    }

    fn write_image_plane(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        plane: Plane,
        bitmap: &Bitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error> {
        // push the origin down to a controller byte boundary
        let x = x - (x.unsigned_abs() % 8) as i32;
        let w = (bitmap.width + 7) / 8 * 8;
        let clip = match clip_to_panel(x, y, w, bitmap.height) {
            Some(clip) => clip,
            None => return Ok(()),
        };
        if !self.init_display_done {
            self.init_display(spi, delay)?;
        }
        if self.initial_write {
            let fill = self.background_color.get_byte_value();
            self.clear_screen(spi, delay, fill)?;
        }
        self.write_clipped(spi, delay, plane, bitmap, clip, 0, 0)
    }

    #[allow(clippy::too_many_arguments)]
    fn write_image_part_plane(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        plane: Plane,
        bitmap: &Bitmap,
        x_part: u32,
        y_part: u32,
        x: i32,
        y: i32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error> {
        if x_part >= bitmap.width || y_part >= bitmap.height {
            return Ok(());
        }
        let x_part = x_part - x_part % 8;
        let width = width.min(bitmap.width - x_part);
        let height = height.min(bitmap.height - y_part);
        let x = x - x % 8;
        let width = (width + 7) / 8 * 8;
        let clip = match clip_to_panel(x, y, width, height) {
            Some(clip) => clip,
            None => return Ok(()),
        };
        if !self.init_display_done {
            self.init_display(spi, delay)?;
        }
        if self.initial_write {
            let fill = self.background_color.get_byte_value();
            self.clear_screen(spi, delay, fill)?;
        }
        self.write_clipped(spi, delay, plane, bitmap, clip, x_part, y_part)
    }

    /// Streams the clipped area row by row into one RAM plane, split over
    /// the controller windows. `x_part`/`y_part` offset the source reads.
    #[allow(clippy::too_many_arguments)]
    fn write_clipped(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        plane: Plane,
        bitmap: &Bitmap,
        clip: Clipped,
        x_part: u32,
        y_part: u32,
    ) -> Result<(), SPI::Error> {
        let mut row = [0u8; HALF_WIDTH_BYTES];
        for sub in partition(Rect::new(clip.x, clip.y, clip.w, clip.h))
            .into_iter()
            .flatten()
        {
            self.set_ram_area(spi, delay, sub.controller, sub.mode, sub.x, sub.y, sub.w, sub.h)?;
            self.interface
                .cmd(spi, Targeted(plane.write_command(), sub.controller))?;
            let src_x = x_part + clip.src_x + sub.src_x;
            for i in 0..sub.h {
                let src_y = y_part + clip.src_y + sub.src_y + i;
                let data = pack_mono_row(&mut row, bitmap, src_x, src_y, sub.w);
                self.interface.data(spi, data)?;
            }
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_grey_clipped(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        plane: Plane,
        bitmap: &GreyBitmap,
        stride: u32,
        clip: Clipped,
        x_part: u32,
        y_part: u32,
    ) -> Result<(), SPI::Error> {
        let ppb = bitmap.bpp.pixels_per_byte();
        let mut row = [0u8; HALF_WIDTH_BYTES];
        for sub in partition(Rect::new(clip.x, clip.y, clip.w, clip.h))
            .into_iter()
            .flatten()
        {
            self.set_ram_area(spi, delay, sub.controller, sub.mode, sub.x, sub.y, sub.w, sub.h)?;
            self.interface
                .cmd(spi, Targeted(plane.write_command(), sub.controller))?;
            let base = x_part / ppb + (clip.src_x + sub.src_x) / ppb;
            for i in 0..sub.h {
                let src_y = y_part + clip.src_y + sub.src_y + i;
                let data = pack_grey_row(&mut row, bitmap, plane, stride, base, src_y, sub.w);
                self.interface.data(spi, data)?;
            }
        }
        Ok(())
    }

    fn fill_plane(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        plane: Plane,
        value: u8,
    ) -> Result<(), SPI::Error> {
        self.fill_area(spi, delay, Rect::new(0, 0, WIDTH, HEIGHT), plane, value)
    }

    /// Fills `area` of one RAM plane with a repeated byte. `area.x` must
    /// lie on a byte boundary.
    fn fill_area(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        area: Rect,
        plane: Plane,
        value: u8,
    ) -> Result<(), SPI::Error> {
        for sub in partition(area).into_iter().flatten() {
            self.set_ram_area(spi, delay, sub.controller, sub.mode, sub.x, sub.y, sub.w, sub.h)?;
            self.interface
                .cmd(spi, Targeted(plane.write_command(), sub.controller))?;
            self.interface
                .data_x_times(spi, value, (sub.w + 7) / 8 * sub.h)?;
        }
        Ok(())
    }

    /// Black/white init, see the reference init code of the vendor.
    fn init_display(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        if self.hibernating {
            self.interface.reset(delay, 10_000, 10_000);
            self.hibernating = false;
        }
        self.command(spi, Command::SwReset)?;
        delay.delay_ms(10);

        // internal temperature sensor
        self.cmd_with_data(spi, Command::TemperatureSensorSelection, &[0x80])?;
        self.update_sequence(
            spi,
            UpdateSequence::new()
                .enable_clock()
                .load_temp()
                .load_lut()
                .disable_clock(),
        )?;
        self.command(spi, Command::MasterActivation)?;
        delay.delay_ms(10);

        // nominal temperature, reload the waveform for it
        self.cmd_with_data(spi, Command::TemperatureSensorControlWrite, &[0x64, 0x00])?;
        self.update_sequence(
            spi,
            UpdateSequence::new().enable_clock().load_lut().disable_clock(),
        )?;
        self.command(spi, Command::MasterActivation)?;
        delay.delay_ms(10);

        self.init_display_done = true;
        self.init_4g_done = false;
        self.refresh_mode = RefreshMode::Full;
        Ok(())
    }

    /// Greyscale init: soft start, custom waveform and its analog values,
    /// both planes cleared.
    fn init_4g(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        if self.hibernating {
            self.interface.reset(delay, 10_000, 10_000);
            self.hibernating = false;
        }
        delay.delay_ms(10);
        self.command(spi, Command::SwReset)?;
        delay.delay_ms(10);

        self.cmd_with_data(spi, Command::BoosterSoftStartControl, &[0x8B, 0x9C, 0xA4, 0x0F])?;
        self.cmd_with_data(spi, Command::DisplayUpdateControl1, &[0x00, 0x00])?;
        self.set_border_waveform(
            spi,
            BorderWaveForm {
                vbd: BorderWaveFormVbd::Gs,
                fix_level: BorderWaveFormFixLevel::Vss,
                gs_trans: BorderWaveFormGs::Lut3,
            },
        )?;
        self.set_full_ram_area(spi, delay, Controller::Master)?;
        self.set_full_ram_area(spi, delay, Controller::Slave)?;

        let waveform = grey_waveform();
        self.cmd_with_data(spi, Command::WriteLutRegister, waveform.lut)?;
        // the end option keeps its power-on default
        self.command(spi, Command::EndOption)?;
        self.cmd_with_data(spi, Command::GateDrivingVoltageCtrl, waveform.gate_voltage)?;
        self.cmd_with_data(spi, Command::SourceDrivingVoltageCtrl, waveform.source_voltage)?;
        self.cmd_with_data(spi, Command::WriteVcomRegister, waveform.vcom)?;

        self.fill_plane(spi, delay, Plane::Current, 0x00)?;
        self.fill_plane(spi, delay, Plane::Previous, 0x00)?;

        self.initial_write = false;
        self.init_display_done = false;
        self.init_4g_done = true;
        self.refresh_mode = RefreshMode::Grey;
        Ok(())
    }

    fn update_full(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        // current plane only, the previous plane is bypassed as zero
        self.cmd_with_data(spi, Command::DisplayUpdateControl1, &[0x40, 0x10])?;
        if cfg!(feature = "low-temperature") {
            self.update_sequence(
                spi,
                UpdateSequence::new()
                    .enable_clock()
                    .enable_analog()
                    .load_temp()
                    .load_lut()
                    .display()
                    .disable_analog()
                    .disable_clock(),
            )?;
        } else {
            // the fast full waveform is tuned for the nominal temperature
            self.cmd_with_data(spi, Command::TemperatureSensorControlWrite, &[0x64, 0x00])?;
            self.update_sequence(
                spi,
                UpdateSequence::new()
                    .enable_clock()
                    .enable_analog()
                    .load_lut()
                    .display()
                    .disable_analog()
                    .disable_clock(),
            )?;
        }
        self.command(spi, Command::MasterActivation)?;
        self.interface
            .wait_until_idle(delay, IS_BUSY_LOW, FULL_REFRESH_TIME_MS);
        self.power_is_on = false;
        Ok(())
    }

    fn update_4g(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        // both planes, read inverted
        self.cmd_with_data(spi, Command::DisplayUpdateControl1, &[0x88, 0x10])?;
        self.update_sequence(
            spi,
            UpdateSequence::new()
                .enable_clock()
                .enable_analog()
                .display_mode_2()
                .display()
                .disable_analog()
                .disable_clock(),
        )?;
        self.command(spi, Command::MasterActivation)?;
        self.interface
            .wait_until_idle(delay, IS_BUSY_LOW, FULL_REFRESH_TIME_MS);
        self.power_is_on = false;
        Ok(())
    }

    fn update_part(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error> {
        self.set_border_waveform(
            spi,
            BorderWaveForm {
                vbd: BorderWaveFormVbd::Vcom,
                fix_level: BorderWaveFormFixLevel::Vss,
                gs_trans: BorderWaveFormGs::Lut0,
            },
        )?;
        self.cmd_with_data(spi, Command::DisplayUpdateControl1, &[0x00, 0x10])?;
        self.update_sequence(
            spi,
            UpdateSequence::new()
                .enable_clock()
                .enable_analog()
                .load_temp()
                .load_lut()
                .display_mode_2()
                .display()
                .disable_analog()
                .disable_clock(),
        )?;
        self.command(spi, Command::MasterActivation)?;
        self.interface
            .wait_until_idle(delay, IS_BUSY_LOW, PARTIAL_REFRESH_TIME_MS);
        self.power_is_on = false;
        Ok(())
    }

    fn set_full_ram_area(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        controller: Controller,
    ) -> Result<(), SPI::Error> {
        self.set_ram_area(
            spi,
            delay,
            controller,
            DataEntryMode::XIncrYIncr,
            0,
            0,
            WIDTH / 2,
            HEIGHT,
        )
    }

    /// Programs the RAM window and the address counters of one controller.
    ///
    /// `x` and `y` are in that controller's RAM coordinates. The counters
    /// start at the edge the entry mode walks away from.
    #[allow(clippy::too_many_arguments)]
    fn set_ram_area(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        controller: Controller,
        mode: DataEntryMode,
        x: u32,
        y: u32,
        w: u32,
        h: u32,
    ) -> Result<(), SPI::Error> {
        let cmd = |c| Targeted(c, controller);
        self.interface
            .cmd_with_data(spi, cmd(Command::DataEntryModeSetting), &[mode as u8])?;
        let x_first = (x / 8) as u8;
        let x_last = ((x + w - 1) / 8) as u8;
        let y_first = [(y % 256) as u8, (y / 256) as u8];
        let y_last = [((y + h - 1) % 256) as u8, ((y + h - 1) / 256) as u8];
        match mode {
            DataEntryMode::XDecrYDecr => {
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamXAddressStartEndPosition),
                    &[x_last, x_first],
                )?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressStartEndPosition),
                    &[y_last[0], y_last[1], y_first[0], y_first[1]],
                )?;
                self.interface
                    .cmd_with_data(spi, cmd(Command::SetRamXAddressCounter), &[x_last])?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressCounter),
                    &[y_last[0], y_last[1]],
                )?;
            }
            DataEntryMode::XIncrYDecr => {
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamXAddressStartEndPosition),
                    &[x_first, x_last],
                )?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressStartEndPosition),
                    &[y_last[0], y_last[1], y_first[0], y_first[1]],
                )?;
                self.interface
                    .cmd_with_data(spi, cmd(Command::SetRamXAddressCounter), &[x_first])?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressCounter),
                    &[y_last[0], y_last[1]],
                )?;
            }
            DataEntryMode::XDecrYIncr => {
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamXAddressStartEndPosition),
                    &[x_last, x_first],
                )?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressStartEndPosition),
                    &[y_first[0], y_first[1], y_last[0], y_last[1]],
                )?;
                self.interface
                    .cmd_with_data(spi, cmd(Command::SetRamXAddressCounter), &[x_last])?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressCounter),
                    &[y_first[0], y_first[1]],
                )?;
            }
            DataEntryMode::XIncrYIncr => {
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamXAddressStartEndPosition),
                    &[x_first, x_last],
                )?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressStartEndPosition),
                    &[y_first[0], y_first[1], y_last[0], y_last[1]],
                )?;
                self.interface
                    .cmd_with_data(spi, cmd(Command::SetRamXAddressCounter), &[x_first])?;
                self.interface.cmd_with_data(
                    spi,
                    cmd(Command::SetRamYAddressCounter),
                    &[y_first[0], y_first[1]],
                )?;
            }
        }
        // address settle time
        delay.delay_ms(2);
        Ok(())
    }

    fn command(&mut self, spi: &mut SPI, command: Command) -> Result<(), SPI::Error> {
        self.interface.cmd(spi, command)
    }

    fn cmd_with_data(
        &mut self,
        spi: &mut SPI,
        command: Command,
        data: &[u8],
    ) -> Result<(), SPI::Error> {
        self.interface.cmd_with_data(spi, command, data)
    }

    fn update_sequence(
        &mut self,
        spi: &mut SPI,
        sequence: UpdateSequence,
    ) -> Result<(), SPI::Error> {
        self.cmd_with_data(spi, Command::DisplayUpdateControl2, &[sequence.0])
    }

    fn set_border_waveform(
        &mut self,
        spi: &mut SPI,
        waveform: BorderWaveForm,
    ) -> Result<(), SPI::Error> {
        self.cmd_with_data(spi, Command::BorderWaveformControl, &[waveform.to_u8()])
    }
}
