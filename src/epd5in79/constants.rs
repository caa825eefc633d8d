//! Vendor waveform data of the GDEY0579T93 panel revision.

// 4-level greyscale waveform with its analog tail. [0..227] is the LUT
// proper, the tail carries the matching analog values: gate voltage at
// [228], source voltages at [229..=231], VCOM at [232].
const LUT_4G: [u8; 233] = [
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

/// The register slices of one revision's greyscale waveform.
///
/// An alternate panel revision substitutes its own table here without any
/// change to the write or refresh paths.
pub(crate) struct GreyWaveform {
    /// Data of `WriteLutRegister`
    pub lut: &'static [u8],
    /// Data of `GateDrivingVoltageCtrl` (VGH)
    pub gate_voltage: &'static [u8],
    /// Data of `SourceDrivingVoltageCtrl` (VSH1, VSH2, VSL)
    pub source_voltage: &'static [u8],
    /// Data of `WriteVcomRegister`
    pub vcom: &'static [u8],
}

/// Greyscale waveform of the GDEY0579T93 boards.
pub(crate) fn grey_waveform() -> GreyWaveform {
    GreyWaveform {
        lut: &LUT_4G[..227],
        gate_voltage: &LUT_4G[228..229],
        source_voltage: &LUT_4G[229..232],
        vcom: &LUT_4G[232..],
    }
}
