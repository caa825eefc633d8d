//! A driver for dual-controller SPI ePaper panels from Good Display (GDEY series)
//!
//! Built on [`embedded-hal`] 1.0 traits. The supported panels are wide e-ink
//! modules driven by two cascaded controllers which share one SPI bus: a
//! command byte with bit 7 clear addresses the master chip (the half of the
//! panel away from the connector), the same command with bit 7 set addresses
//! the slave chip. The driver hides the split and presents one seamless
//! coordinate space.
//!
//! [`embedded-hal`]: https://docs.rs/embedded-hal
//!
//! # Requirements
//!
//! ### SPI
//!
//! - MISO is not connected/available
//! - SPI_MODE_0 is used (CPHL = 0, CPOL = 0)
//! - 8 bits per word, MSB first
//!
//! ### Other
//!
//! - Full frame buffers need to be of size `width / 8 * height`; the
//!   [`buffer_len`] helper computes this
//! - The busy pin of these panels is active high
//!
//! # Examples
//!
//! ```rust,no_run
//! # use embedded_hal_mock::eh1::{
//! #     delay::NoopDelay as Delay,
//! #     digital::Mock as Pin,
//! #     spi::Mock as Spi,
//! # };
//! # let mut spi = Spi::new(&[]);
//! # let busy = Pin::new(&[]);
//! # let dc = Pin::new(&[]);
//! # let rst = Pin::new(&[]);
//! # let mut delay = Delay::new();
//! use embedded_graphics::{
//!     mono_font::{ascii::FONT_6X10, MonoTextStyle},
//!     prelude::*,
//!     text::Text,
//! };
//! use epd_gdey::{epd5in79::{Display5in79, Epd5in79}, prelude::*};
//!
//! let mut epd = Epd5in79::new(&mut spi, busy, dc, Some(rst), &mut delay, None)?;
//!
//! let mut display = Display5in79::default();
//! let style = MonoTextStyle::new(&FONT_6X10, Color::Black);
//! let _ = Text::new("Hello Rust!", Point::new(20, 30), style).draw(&mut display);
//!
//! epd.update_frame(&mut spi, display.buffer(), &mut delay)?;
//! epd.display_frame(&mut spi, &mut delay)?;
//!
//! epd.sleep(&mut spi, &mut delay)?;
//! # Ok::<(), embedded_hal::spi::ErrorKind>(())
//! ```
#![no_std]
#![deny(missing_docs)]

#[cfg(feature = "graphics")]
pub mod graphics;

pub mod traits;

pub mod color;

/// Interface for the physical connection between display and the controlling device
mod interface;

pub(crate) mod rect;

pub mod epd5in79;

/// Includes everything which is needed to use this driver
pub mod prelude {
    pub use crate::color::Color;
    #[cfg(feature = "graphics")]
    pub use crate::color::Grey4;
    pub use crate::traits::{
        Bitmap, Bpp, Capabilities, EpaperDisplay, GreyBitmap, GreyscaleDisplay, Panel, RefreshMode,
    };

    #[cfg(feature = "graphics")]
    pub use crate::graphics::{Display, DisplayRotation, VarDisplay};

    pub use crate::SPI_MODE;
}

use embedded_hal::spi::{Mode, Phase, Polarity};

/// SPI mode - the panels expect MODE 0
pub const SPI_MODE: Mode = Mode {
    phase: Phase::CaptureOnFirstTransition,
    polarity: Polarity::IdleLow,
};

/// Computes the needed buffer length for a full 1bpp frame.
/// Takes `width` and `height` of the display as parameters.
pub const fn buffer_len(width: usize, height: usize) -> usize {
    (width + 7) / 8 * height
}
