//! Traits and shared types of the panel drivers

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

/// All commands need to have this trait which gives the address of the command
/// which needs to be send via SPI with activated CommandsPin (Data/Command Pin in CommandMode)
pub(crate) trait Command: Copy {
    fn address(self) -> u8;
}

/// The refresh flow the driver is currently set up for.
///
/// `Full` and `Grey` follow the write operations automatically; `Fast` and
/// `ForcedFull` are requested by the caller through
/// [`set_refresh_mode`](crate::epd5in79::Epd5in79::set_refresh_mode).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefreshMode {
    /// Black/white waveform loaded, differential updates allowed
    Full,
    /// 4-level greyscale waveform loaded
    Grey,
    /// The next full refresh re-initializes the panel first (use after
    /// longer pauses or temperature changes)
    Fast,
    /// Every refresh request is upgraded to a full refresh
    ForcedFull,
}

/// The supported panel models
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Panel {
    /// 5.79" 792x272 black/white panel from Good Display, two cascaded
    /// SSD1683 controllers
    Gdey0579T93,
}

/// Static description of a panel model
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capabilities {
    /// Horizontal resolution in pixels
    pub width: u32,
    /// Vertical resolution in pixels
    pub height: u32,
    /// Differential updates of a window are supported
    pub has_partial_update: bool,
    /// Differential updates are fast enough for interactive use
    pub has_fast_partial_update: bool,
    /// A 4-level greyscale waveform is available
    pub has_greyscale: bool,
}

impl Panel {
    /// Looks up the static capabilities of a panel model
    pub const fn capabilities(self) -> Capabilities {
        match self {
            Panel::Gdey0579T93 => Capabilities {
                width: crate::epd5in79::WIDTH,
                height: crate::epd5in79::HEIGHT,
                has_partial_update: true,
                has_fast_partial_update: true,
                has_greyscale: true,
            },
        }
    }
}

/// Pixel depth of a packed greyscale source bitmap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bpp {
    /// 4 pixels per byte
    Two,
    /// 2 pixels per byte
    Four,
    /// 1 pixel per byte
    Eight,
}

impl Bpp {
    pub(crate) const fn bits(self) -> u32 {
        match self {
            Bpp::Two => 2,
            Bpp::Four => 4,
            Bpp::Eight => 8,
        }
    }

    pub(crate) const fn pixels_per_byte(self) -> u32 {
        8 / self.bits()
    }

    /// Mask selecting the top pixel of a byte
    pub(crate) const fn mask(self) -> u8 {
        match self {
            Bpp::Two => 0xC0,
            Bpp::Four => 0xF0,
            Bpp::Eight => 0xFF,
        }
    }

    /// Smallest value still mapped to light grey instead of dark grey
    pub(crate) const fn light_grey_min(self) -> u8 {
        match self {
            Bpp::Two => 0x80,
            Bpp::Four | Bpp::Eight => 0xA0,
        }
    }
}

/// A borrowed monochrome source bitmap.
///
/// Row-major, 8 pixels per byte, MSB first, 1 = white. The row stride is the
/// width rounded up to whole bytes.
#[derive(Clone, Copy, Debug)]
pub struct Bitmap<'a> {
    /// Packed pixel data
    pub data: &'a [u8],
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Complement every data byte while packing (for 0 = white sources)
    pub invert: bool,
    /// Read the rows bottom-up (for bottom-up file formats)
    pub mirror_y: bool,
}

impl<'a> Bitmap<'a> {
    /// A descriptor with both flags off.
    ///
    /// Debug builds check that `data` covers the declared geometry.
    pub fn new(data: &'a [u8], width: u32, height: u32) -> Self {
        debug_assert!(data.len() >= (width as usize + 7) / 8 * height as usize);
        Bitmap {
            data,
            width,
            height,
            invert: false,
            mirror_y: false,
        }
    }

    /// Complement the data while packing
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// Read the rows bottom-up
    pub fn mirrored(mut self) -> Self {
        self.mirror_y = true;
        self
    }
}

/// A borrowed greyscale source bitmap.
///
/// Row-major with [`Bpp`] pixels packed MSB first; the row stride is the
/// width rounded up to whole bytes. Larger pixel values are lighter,
/// full-scale is white.
#[derive(Clone, Copy, Debug)]
pub struct GreyBitmap<'a> {
    /// Packed pixel data
    pub data: &'a [u8],
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel depth of `data`
    pub bpp: Bpp,
    /// Complement every data byte while packing
    pub invert: bool,
    /// Read the rows bottom-up (for bottom-up file formats)
    pub mirror_y: bool,
}

impl<'a> GreyBitmap<'a> {
    /// A descriptor with both flags off.
    ///
    /// Debug builds check that `data` covers the declared geometry.
    pub fn new(data: &'a [u8], width: u32, height: u32, bpp: Bpp) -> Self {
        let ppb = bpp.pixels_per_byte() as usize;
        debug_assert!(data.len() >= (width as usize + ppb - 1) / ppb * height as usize);
        GreyBitmap {
            data,
            width,
            height,
            bpp,
            invert: false,
            mirror_y: false,
        }
    }

    /// Complement the data while packing
    pub fn inverted(mut self) -> Self {
        self.invert = true;
        self
    }

    /// Read the rows bottom-up
    pub fn mirrored(mut self) -> Self {
        self.mirror_y = true;
        self
    }
}

/// All the functions to interact with the panel drivers
///
/// This trait includes all public functions to use the panels
///
/// # Example
///
///```rust,no_run
/// # use embedded_hal_mock::eh1::{
/// #     delay::NoopDelay as Delay,
/// #     digital::Mock as Pin,
/// #     spi::Mock as Spi,
/// # };
/// # let mut spi = Spi::new(&[]);
/// # let busy = Pin::new(&[]);
/// # let dc = Pin::new(&[]);
/// # let rst = Pin::new(&[]);
/// # let mut delay = Delay::new();
///use embedded_graphics::{
///    prelude::*,
///    primitives::{Line, PrimitiveStyle},
///};
///use epd_gdey::{epd5in79::{Display5in79, Epd5in79}, prelude::*};
///
///// Setup EPD
///let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None)?;
///
///// Use display graphics from embedded-graphics
///let mut display = Display5in79::default();
///
///// Use embedded graphics for drawing a line
///let _ = Line::new(Point::new(0, 120), Point::new(0, 200))
///    .into_styled(PrimitiveStyle::with_stroke(Color::Black, 1))
///    .draw(&mut display);
///
///// Display updated frame
///epd.update_frame(&mut spi, display.buffer(), &mut delay)?;
///epd.display_frame(&mut spi, &mut delay)?;
///
///// Set the EPD to sleep
///epd.sleep(&mut spi, &mut delay)?;
/// # Ok::<(), embedded_hal::spi::ErrorKind>(())
///```
pub trait EpaperDisplay<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
    Self: Sized,
{
    /// The native color type of the panel
    type DisplayColor;

    /// The panel model this driver controls
    const PANEL: Panel;

    /// Creates a new driver from a SPI peripheral, a busy pin, a
    /// data/command pin and an optional reset pin, then initializes the
    /// panel.
    ///
    /// Without a reset pin the panel cannot leave deep sleep again, so
    /// [`sleep`](EpaperDisplay::sleep) degrades to power-off only.
    ///
    /// `delay_us` sets the busy poll interval (default 10 ms).
    fn new(
        spi: &mut SPI,
        busy: BUSY,
        dc: DC,
        rst: Option<RST>,
        delay: &mut DELAY,
        delay_us: Option<u32>,
    ) -> Result<Self, SPI::Error>;

    /// Lets the device enter deep sleep mode to save power.
    ///
    /// Use [`wake_up`](EpaperDisplay::wake_up) to awake it again.
    fn sleep(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;

    /// Wakes the device up from sleep and re-initializes it
    fn wake_up(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;

    /// Sets the backgroundcolor for various commands such as [`clear_frame`](EpaperDisplay::clear_frame)
    fn set_background_color(&mut self, color: Self::DisplayColor);

    /// Get current background color
    fn background_color(&self) -> &Self::DisplayColor;

    /// Get the width of the display
    fn width(&self) -> u32;

    /// Get the height of the display
    fn height(&self) -> u32;

    /// Transmit a full frame to the SRAM of the EPD
    fn update_frame(
        &mut self,
        spi: &mut SPI,
        buffer: &[u8],
        delay: &mut DELAY,
    ) -> Result<(), SPI::Error>;

    /// Transmits partial data to the SRAM of the EPD.
    ///
    /// `x` is rounded down, `width` up to whole bytes.
    #[allow(clippy::too_many_arguments)]
    fn update_partial_frame(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        buffer: &[u8],
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    ) -> Result<(), SPI::Error>;

    /// Displays the frame data from SRAM
    fn display_frame(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;

    /// Transmit a full frame to the SRAM of the EPD and display it
    fn update_and_display_frame(
        &mut self,
        spi: &mut SPI,
        buffer: &[u8],
        delay: &mut DELAY,
    ) -> Result<(), SPI::Error>;

    /// Clears the frame to the background color on the display
    fn clear_frame(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;

    /// Waits until the display stops signalling busy, bounded by the
    /// longest waveform duration of the panel
    fn wait_until_idle(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;

    /// Checks if the display is busy transmitting data
    ///
    /// This is normally handled by the more complicated commands themselves,
    /// but in the case you send data and commands directly you might need to check
    /// if the device is still busy
    fn is_busy(&mut self) -> bool;
}

/// The greyscale operations of panels whose controller carries a 4-level
/// waveform ([`Capabilities::has_greyscale`]).
///
/// The first greyscale write loads the greyscale waveform and clears both
/// RAM planes; a later plain init (full refresh in `Fast` mode, wake up)
/// returns to black/white mode.
pub trait GreyscaleDisplay<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Writes a greyscale bitmap into both RAM planes at `(x, y)`
    fn write_grey_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &GreyBitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error>;

    /// Writes the window at `(x_part, y_part)` sized `width` x `height` out
    /// of a larger greyscale bitmap to the panel position `(x, y)`
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<(), SPI::Error>;

    /// Writes a greyscale bitmap and refreshes the covered region
    fn draw_grey_image(
        &mut self,
        spi: &mut SPI,
        delay: &mut DELAY,
        bitmap: &GreyBitmap,
        x: i32,
        y: i32,
    ) -> Result<(), SPI::Error>;

    /// Writes part of a greyscale bitmap and refreshes the covered region
    #[allow(clippy::too_many_arguments)]
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
    ) -> Result<(), SPI::Error>;

    /// Paints four horizontal bands in the four grey levels (black, dark
    /// grey, light grey, white) and refreshes. Useful to judge the waveform
    /// of a new batch of panels.
    fn draw_grey_levels(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;
}

/// Internal trait for the init sequences. (Loosely) based on
/// the init code of the vendor reference implementations.
pub(crate) trait InternalEpdAdditions<SPI, BUSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// This initialises the EPD and powers it up
    ///
    /// This function is already called from
    ///  - [new()](EpaperDisplay::new())
    ///  - [`wake_up`](EpaperDisplay::wake_up)
    ///
    /// This function calls reset internally,
    /// so you don't need to call reset yourself when trying to wake your device up
    /// after setting it to sleep.
    fn init(&mut self, spi: &mut SPI, delay: &mut DELAY) -> Result<(), SPI::Error>;
}
