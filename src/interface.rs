use core::marker::PhantomData;

use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

use crate::traits::Command;

/// The connection interface between the driving device and a panel
///
/// Both controllers of a dual-chip panel sit behind the same interface; the
/// chip select happens inside the command byte, not on a pin.
///
/// SINGLE_BYTE_WRITE defines if a data block is written bytewise
/// or blockwise to the spi device
pub(crate) struct DisplayInterface<SPI, BUSY, DC, RST, DELAY, const SINGLE_BYTE_WRITE: bool> {
    /// SPI
    _spi: PhantomData<SPI>,
    /// DELAY
    _delay: PhantomData<DELAY>,
    /// High while the panel drives a waveform
    busy: BUSY,
    /// Data/Command control pin (High for data, Low for command)
    dc: DC,
    /// Pin for resetting, not wired out on every board
    rst: Option<RST>,
    /// Number of microseconds the idle loop sleeps between busy polls
    delay_us: u32,
}

impl<SPI, BUSY, DC, RST, DELAY, const SINGLE_BYTE_WRITE: bool>
    DisplayInterface<SPI, BUSY, DC, RST, DELAY, SINGLE_BYTE_WRITE>
where
    SPI: SpiDevice,
    BUSY: InputPin,
    DC: OutputPin,
    RST: OutputPin,
    DELAY: DelayNs,
{
    /// Creates a new `DisplayInterface` struct
    ///
    /// If no delay is given, a default delay of 10ms is used.
    pub fn new(busy: BUSY, dc: DC, rst: Option<RST>, delay_us: Option<u32>) -> Self {
        let delay_us = delay_us.unwrap_or(10_000);
        DisplayInterface {
            _spi: PhantomData,
            _delay: PhantomData,
            busy,
            dc,
            rst,
            delay_us,
        }
    }

    /// Basic function for sending [Commands](Command).
    ///
    /// Enables direct interaction with the device with the help of [data()](DisplayInterface::data())
    pub(crate) fn cmd<T: Command>(&mut self, spi: &mut SPI, command: T) -> Result<(), SPI::Error> {
        // low for commands
        let _ = self.dc.set_low();

        // Transfer the command over spi
        self.write(spi, &[command.address()])
    }

    /// Basic function for sending an array of u8-values of data over spi
    ///
    /// Enables direct interaction with the device with the help of [cmd()](DisplayInterface::cmd())
    pub(crate) fn data(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), SPI::Error> {
        // high for data
        let _ = self.dc.set_high();

        if SINGLE_BYTE_WRITE {
            for val in data.iter().copied() {
                // Transfer data one u8 at a time over spi
                self.write(spi, &[val])?;
            }
        } else {
            self.write(spi, data)?;
        }

        Ok(())
    }

    /// Basic function for sending [Commands](Command) and the data belonging to it.
    pub(crate) fn cmd_with_data<T: Command>(
        &mut self,
        spi: &mut SPI,
        command: T,
        data: &[u8],
    ) -> Result<(), SPI::Error> {
        self.cmd(spi, command)?;
        self.data(spi, data)
    }

    /// Basic function for sending the same byte of data (one u8) multiple times over spi
    pub(crate) fn data_x_times(
        &mut self,
        spi: &mut SPI,
        val: u8,
        repetitions: u32,
    ) -> Result<(), SPI::Error> {
        // high for data
        let _ = self.dc.set_high();
        // Transfer data (u8) over spi
        for _ in 0..repetitions {
            self.write(spi, &[val])?;
        }
        Ok(())
    }

    // spi write helper/abstraction function
    fn write(&mut self, spi: &mut SPI, data: &[u8]) -> Result<(), SPI::Error> {
        // transfer spi data
        // Be careful!! Linux has a default limit of 4096 bytes per spi transfer
        // see https://raspberrypi.stackexchange.com/questions/65595/spi-transfer-fails-with-buffer-size-greater-than-4096
        if cfg!(target_os = "linux") {
            for data_chunk in data.chunks(4096) {
                spi.write(data_chunk)?;
            }
        } else {
            spi.write(data)?;
        }
        Ok(())
    }

    /// Waits until the device isn't busy anymore, but no longer than `timeout_ms`.
    ///
    /// The timeout covers a stuck busy line (or a panel still in deep sleep);
    /// the refresh sequences pass the nominal waveform duration of the panel.
    /// Running into the bound is not treated as an error, the next command
    /// simply finds the panel busy.
    ///
    /// is_busy_low
    ///
    ///  - TRUE for devices which pull busy low while driving
    ///  - FALSE for devices with an active high busy line (this panel family)
    pub(crate) fn wait_until_idle(&mut self, delay: &mut DELAY, is_busy_low: bool, timeout_ms: u32) {
        let mut waited_us: u32 = 0;
        while self.is_busy(is_busy_low) {
            if waited_us >= timeout_ms.saturating_mul(1_000) {
                return;
            }
            delay.delay_us(self.delay_us);
            waited_us = waited_us.saturating_add(self.delay_us.max(1));
        }
    }

    /// Checks if device is still busy
    ///
    /// This is normally handled by the more complicated commands themselves,
    /// but in the case you send data and commands directly you might need to check
    /// if the device is still busy
    pub(crate) fn is_busy(&mut self, is_busy_low: bool) -> bool {
        (is_busy_low && self.busy.is_low().unwrap_or(false))
            || (!is_busy_low && self.busy.is_high().unwrap_or(false))
    }

    /// Whether a reset line is wired up.
    ///
    /// Deep sleep must not be entered without one, the panel could then only
    /// be recovered by a power cycle.
    pub(crate) fn has_rst(&self) -> bool {
        self.rst.is_some()
    }

    /// Resets the device.
    ///
    /// Often used to awake the module from deep sleep.
    ///
    /// Both controllers share the reset line. The pin has to stay low for
    /// around 10ms, shorter pulses leave the slave in an undefined state.
    pub(crate) fn reset(&mut self, delay: &mut DELAY, initial_delay: u32, duration: u32) {
        if let Some(rst) = self.rst.as_mut() {
            let _ = rst.set_high();
            delay.delay_us(initial_delay);

            let _ = rst.set_low();
            delay.delay_us(duration);
            let _ = rst.set_high();
            delay.delay_us(duration);
        }
    }
}
