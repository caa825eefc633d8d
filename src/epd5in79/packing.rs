//! Packing of source bitmap rows into the RAM byte stream of a controller.
//!
//! Monochrome sources are forwarded byte for byte. Greyscale sources are
//! reduced to one bit per plane and pixel: together the two RAM planes
//! select one of the four waveform columns of the greyscale LUT.

use super::command::Plane;
use crate::traits::{Bitmap, GreyBitmap};

/// Packs one controller row out of a monochrome bitmap into `out`.
///
/// `w` pixels starting at pixel `src_x` of logical row `src_y`; `out` gets
/// `(w + 7) / 8` bytes. `src_x` is read at byte granularity, a sub-byte
/// phase is dropped. The bitmap data must cover every addressed row.
pub(crate) fn pack_mono_row<'a>(
    out: &'a mut [u8],
    bitmap: &Bitmap,
    src_x: u32,
    src_y: u32,
    w: u32,
) -> &'a [u8] {
    let stride = (bitmap.width + 7) / 8;
    let row = if bitmap.mirror_y {
        bitmap.height - 1 - src_y
    } else {
        src_y
    };
    let bytes = ((w + 7) / 8) as usize;
    for (n, chunk) in out[..bytes].iter_mut().enumerate() {
        let idx = (src_x + 8 * n as u32) / 8 + row * stride;
        let mut data = bitmap.data[idx as usize];
        if bitmap.invert {
            data = !data;
        }
        *chunk = data;
    }
    &out[..bytes]
}

/// Packs one controller row of the differential bit stream of `plane` out
/// of a greyscale bitmap into `out`.
///
/// `w` pixels of logical row `src_y`, starting at source byte
/// `src_byte_base` of the row; rows are `stride` source bytes apart. Each
/// output byte consumes 8 pixels and is complemented, the greyscale update
/// interprets RAM inverted. Source bytes past the end of the data are read
/// as black.
pub(crate) fn pack_grey_row<'a>(
    out: &'a mut [u8],
    bitmap: &GreyBitmap,
    plane: Plane,
    stride: u32,
    src_byte_base: u32,
    src_y: u32,
    w: u32,
) -> &'a [u8] {
    let ppb = bitmap.bpp.pixels_per_byte();
    let bits = bitmap.bpp.bits();
    let mask = bitmap.bpp.mask();
    let grey1 = bitmap.bpp.light_grey_min();
    let row = if bitmap.mirror_y {
        bitmap.height - 1 - src_y
    } else {
        src_y
    };
    let mut n = 0;
    for j in (0..w / ppb).step_by(bits as usize) {
        let mut out_byte = 0u8;
        for k in 0..bits {
            let idx = src_byte_base + j + k + row * stride;
            let mut in_byte = bitmap.data.get(idx as usize).copied().unwrap_or(0);
            if bitmap.invert {
                in_byte = !in_byte;
            }
            for _ in 0..ppb {
                out_byte <<= 1;
                let value = in_byte & mask;
                if value == mask {
                    out_byte |= 0x01; // white
                } else if value == 0x00 {
                    // black
                } else if value >= grey1 {
                    // light grey
                    if plane == Plane::Previous {
                        out_byte |= 0x01;
                    }
                } else {
                    // dark grey
                    if plane == Plane::Current {
                        out_byte |= 0x01;
                    }
                }
                in_byte = in_byte.checked_shl(bits).unwrap_or(0);
            }
        }
        out[n] = !out_byte;
        n += 1;
    }
    &out[..n]
}
