//! SPI commands for the two cascaded SSD1683 controllers of the 5.79" panel.
//!
//! The panel wires both controllers to a single chip select. A command byte
//! with the top bit clear is executed by the master, with the top bit set by
//! the slave. Waveform, power and refresh commands go to the master only; the
//! slave follows through the cascade option of `DisplayUpdateControl1`.

use bit_field::BitField;

use crate::traits;

#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum Command {
    GateDrivingVoltageCtrl = 0x03,
    SourceDrivingVoltageCtrl = 0x04,
    BoosterSoftStartControl = 0x0C,
    /// After this command is transmitted, the chip enters the deep-sleep
    /// mode to save power. Only a hardware reset brings it back.
    DeepSleepMode = 0x10,
    /// Define data entry sequence
    DataEntryModeSetting = 0x11,
    /// Resets the commands and parameters to their S/W Reset default values
    SwReset = 0x12,
    /// Temperature sensor selection (internal/external)
    TemperatureSensorSelection = 0x18,
    /// Write to temperature register
    TemperatureSensorControlWrite = 0x1A,
    /// Activate display update sequence
    MasterActivation = 0x20,
    DisplayUpdateControl1 = 0x21,
    DisplayUpdateControl2 = 0x22,
    /// Write the image onto the current plane
    WriteRam = 0x24,
    /// Write the image onto the previous plane, used as the reference of
    /// differential refreshes
    WriteRamRed = 0x26,
    WriteVcomRegister = 0x2C,
    WriteLutRegister = 0x32,
    EndOption = 0x3F,
    BorderWaveformControl = 0x3C,
    SetRamXAddressStartEndPosition = 0x44,
    SetRamYAddressStartEndPosition = 0x45,
    SetRamXAddressCounter = 0x4E,
    SetRamYAddressCounter = 0x4F,
}

impl traits::Command for Command {
    /// Returns the address of the command
    fn address(self) -> u8 {
        self as u8
    }
}

/// One of the two cascaded controllers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Controller {
    /// Drives the right half of the panel with a mirrored gate layout, and
    /// executes the waveform for both chips.
    Master,
    /// Drives the left half of the panel.
    Slave,
}

impl Controller {
    pub(crate) const fn address_bit(self) -> u8 {
        match self {
            Controller::Master => 0x00,
            Controller::Slave => 0x80,
        }
    }
}

/// A command routed to one specific controller of the pair.
#[derive(Copy, Clone)]
pub(crate) struct Targeted(pub Command, pub Controller);

impl traits::Command for Targeted {
    fn address(self) -> u8 {
        (self.0 as u8) | self.1.address_bit()
    }
}

/// The two image RAM planes of each controller.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Plane {
    /// Holds the frame shown by the next refresh.
    Current,
    /// Holds the frame shown by the last refresh.
    Previous,
}

impl Plane {
    pub(crate) const fn write_command(self) -> Command {
        match self {
            Plane::Current => Command::WriteRam,
            Plane::Previous => Command::WriteRamRed,
        }
    }
}

/// Address counter direction for `DataEntryModeSetting`.
///
/// The discriminant is the data byte of the command. The direction also
/// decides in which order the RAM window commands expect their start and
/// end addresses.
#[allow(dead_code)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum DataEntryMode {
    XDecrYDecr = 0x0,
    XIncrYDecr = 0x1,
    XDecrYIncr = 0x2,
    XIncrYIncr = 0x3,
}

/// Update sequence for `DisplayUpdateControl2`, started by `MasterActivation`.
///
/// [7|6|5|4|3|2|1|0]
///  | | | | | | | `--- disable clock signal
///  | | | | | | `----- disable analog
///  | | | | | `------- display with display mode 1
///  | | | | `--------- display with display mode 2
///  | | | `----------- load LUT
///  | | `------------- load temperature value
///  | `--------------- enable analog
///  `----------------- enable clock signal
pub(crate) struct UpdateSequence(pub u8);

#[allow(dead_code)]
impl UpdateSequence {
    pub fn new() -> UpdateSequence {
        UpdateSequence(0x00)
    }

    pub fn disable_clock(mut self) -> Self {
        self.0.set_bit(0, true);
        self
    }

    pub fn disable_analog(mut self) -> Self {
        self.0.set_bit(1, true);
        self
    }

    pub fn display(mut self) -> Self {
        self.0.set_bit(2, true);
        self
    }

    pub fn display_mode_2(mut self) -> Self {
        self.0.set_bit(3, true);
        self
    }

    pub fn load_lut(mut self) -> Self {
        self.0.set_bit(4, true);
        self
    }

    pub fn load_temp(mut self) -> Self {
        self.0.set_bit(5, true);
        self
    }

    pub fn enable_analog(mut self) -> Self {
        self.0.set_bit(6, true);
        self
    }

    pub fn enable_clock(mut self) -> Self {
        self.0.set_bit(7, true);
        self
    }
}

pub(crate) struct BorderWaveForm {
    pub vbd: BorderWaveFormVbd,
    pub fix_level: BorderWaveFormFixLevel,
    pub gs_trans: BorderWaveFormGs,
}

impl BorderWaveForm {
    pub(crate) fn to_u8(&self) -> u8 {
        *0u8.set_bits(6..8, self.vbd as u8)
            .set_bits(4..6, self.fix_level as u8)
            .set_bits(0..2, self.gs_trans as u8)
    }
}

#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum BorderWaveFormVbd {
    Gs = 0x0,
    FixLevel = 0x1,
    Vcom = 0x2,
    Hiz = 0x3,
}

#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum BorderWaveFormFixLevel {
    Vss = 0x0,
    Vsh1 = 0x1,
    Vsl = 0x2,
    Vsh2 = 0x3,
}

#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum BorderWaveFormGs {
    Lut0 = 0x0,
    Lut1 = 0x1,
    Lut2 = 0x2,
    Lut3 = 0x3,
}

/// Deep sleep mode for `DeepSleepMode`.
#[allow(dead_code)]
#[derive(Copy, Clone)]
pub(crate) enum DeepSleep {
    /// Sleeps with access to RAM and the controller registers.
    Normal = 0x00,
    /// Sleeps without access to RAM but keeps its content.
    Mode1 = 0x01,
    /// Sleeps without access to RAM and loses its content.
    Mode2 = 0x03,
}
