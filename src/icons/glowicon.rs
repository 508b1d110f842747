//! GlowIcon (IFF `FORM ICON`) renderer (§4.2.2).
//!
//! Ported from `examples/original_source/src/amiwb/icons/icon_glowicon.c`:
//! a `FACE` chunk carries geometry/flags, up to two `IMAG` chunks carry
//! per-state pixel data and an optional palette, both pixel and palette
//! data may be bit-aligned RLE compressed with the same control scheme.

use super::parser::{read_be16, read_iff_id, BitReader};
use super::{Argb, DecodedIcon, GlowIconKind};
use crate::error::IconDecodeError;

type Result<T> = std::result::Result<T, IconDecodeError>;

#[derive(Clone, Copy)]
struct Face {
    width: u32,
    height: u32,
    flags: u8,
}

struct ImagHeader {
    transparent_index: u8,
    num_colors: u32,
    has_transparent: bool,
    has_palette: bool,
    image_compressed: bool,
    palette_compressed: bool,
    depth: u8,
    image_size: u32,
    palette_size: u32,
}

pub(super) fn decode(data: &[u8], kind: GlowIconKind) -> Result<DecodedIcon> {
    if matches!(kind, GlowIconKind::ToolTypes) {
        return Err(IconDecodeError::ToolTypesUnsupported);
    }

    let form_pos = find_form(data).ok_or(IconDecodeError::UnknownMagic)?;
    let form_size = super::parser::read_be32(data, form_pos + 4)?;
    let form_end = (form_pos + 8 + form_size as usize).min(data.len());

    let mut cursor = form_pos + 8 + 4; // past "FORM" <size> "ICON"
    let mut face: Option<Face> = None;
    let mut images: Vec<Argb> = Vec::new();
    let mut first_palette: Option<Vec<(u8, u8, u8, u8)>> = None;

    while cursor + 8 <= form_end {
        let tag = read_iff_id(data, cursor)?;
        let chunk_size = super::parser::read_be32(data, cursor + 4)? as usize;
        let payload_start = cursor + 8;
        if payload_start + chunk_size > form_end {
            break;
        }

        match &tag {
            b"FACE" if chunk_size >= 6 => {
                let width = data[payload_start] as u32 + 1;
                let height = data[payload_start + 1] as u32 + 1;
                let flags = data[payload_start + 2];
                face = Some(Face { width, height, flags });
            }
            b"IMAG" if images.len() < 2 => {
                if let Some(f) = face {
                    match decode_imag(data, payload_start, chunk_size, f, &first_palette) {
                        Ok((img, palette)) => {
                            if images.is_empty() {
                                first_palette = Some(palette);
                            }
                            images.push(img);
                        }
                        Err(e) => {
                            // preserve any earlier successfully decoded
                            // state (§4.2.2: only fail outright if zero
                            // states decoded).
                            if images.is_empty() {
                                return Err(e);
                            }
                            break;
                        }
                    }
                }
            }
            _ => {}
        }

        let advance = chunk_size + (chunk_size % 2);
        cursor = payload_start + advance;
    }

    let mut iter = images.into_iter();
    let normal = iter.next().ok_or(IconDecodeError::DataOverrun)?;
    let selected = iter.next().unwrap_or_else(|| normal.darkened());

    Ok(DecodedIcon { normal, selected })
}

fn find_form(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"FORM").and_then(|pos| {
        let type_pos = pos + 8;
        if type_pos + 4 <= data.len() && &data[type_pos..type_pos + 4] == b"ICON" {
            Some(pos)
        } else {
            None
        }
    })
}

fn decode_imag(
    data: &[u8],
    offset: usize,
    chunk_size: usize,
    face: Face,
    reuse_palette: &Option<Vec<(u8, u8, u8, u8)>>,
) -> Result<(Argb, Vec<(u8, u8, u8, u8)>)> {
    if chunk_size < 10 {
        return Err(IconDecodeError::DataOverrun);
    }
    let header = ImagHeader {
        transparent_index: data[offset],
        num_colors: data[offset + 1] as u32 + 1,
        has_transparent: data[offset + 2] & 1 != 0,
        has_palette: data[offset + 2] & 2 != 0,
        image_compressed: data[offset + 3] != 0,
        palette_compressed: data[offset + 4] != 0,
        depth: data[offset + 5],
        image_size: read_be16(data, offset + 6)? as u32 + 1,
        palette_size: read_be16(data, offset + 8)? as u32 + 1,
    };

    if header.depth == 0 || header.depth > 8 {
        return Err(IconDecodeError::DepthOutOfRange { depth: header.depth });
    }

    let pixel_data_start = offset + 10;
    let pixel_count = (face.width * face.height) as usize;

    // Uncompressed images are a flat one-byte-per-pixel memcpy, never a
    // depth-bit-packed field, regardless of `depth` (icon_glowicon.c:118-121).
    let indices = if header.image_compressed {
        unpack_rle(data, pixel_data_start, header.depth as u32, pixel_count)?
    } else {
        unpack_raw(data, pixel_data_start, 8, pixel_count)?
    };

    let palette_size = if header.has_palette { header.palette_size } else { 0 };
    // The palette always starts at the chunk's declared image byte count,
    // not wherever decoding happened to stop consuming bits.
    let palette_data_start = pixel_data_start + header.image_size as usize;

    let palette: Vec<(u8, u8, u8, u8)> = if palette_size > 0 {
        let raw = if header.palette_compressed {
            unpack_rle(data, palette_data_start, 8, (palette_size as usize) * 3)?
        } else {
            unpack_raw(data, palette_data_start, 8, (palette_size as usize) * 3)?
        };
        raw.values
            .chunks(3)
            .map(|c| (0xFF, c[0] as u8, c.get(1).copied().unwrap_or(0) as u8, c.get(2).copied().unwrap_or(0) as u8))
            .collect()
    } else if let Some(reused) = reuse_palette {
        reused.clone()
    } else {
        grayscale_ramp(header.num_colors.max(1))
    };

    let mut out_palette = palette;
    if header.has_transparent {
        if let Some(slot) = out_palette.get_mut(header.transparent_index as usize) {
            *slot = (0x00, 0x00, 0x00, 0x00);
        }
    }

    let mut img = Argb::new(face.width, face.height);
    for y in 0..face.height {
        for x in 0..face.width {
            let idx = indices.values[(y * face.width + x) as usize] as usize;
            let color = out_palette.get(idx).copied().unwrap_or((0xFF, 0, 0, 0));
            img.set(x, y, color);
        }
    }
    let _ = face.flags;

    Ok((img, out_palette))
}

struct Unpacked {
    values: Vec<u32>,
    bits_consumed: usize,
}

fn grayscale_ramp(n: u32) -> Vec<(u8, u8, u8, u8)> {
    (0..n)
        .map(|i| {
            let level = if n <= 1 { 0 } else { (i * 255 / (n - 1)) as u8 };
            (0xFF, level, level, level)
        })
        .collect()
}

fn unpack_raw(data: &[u8], start: usize, field_bits: u32, count: usize) -> Result<Unpacked> {
    let mut reader = BitReader::new(data, start);
    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_bits(field_bits)?);
    }
    Ok(Unpacked { values, bits_consumed: reader.bit_pos() - start * 8 })
}

/// Control-byte RLE per §4.2.2: `ctrl > 128` repeats the next value
/// `257 - ctrl` times, `ctrl < 128` copies the next `ctrl + 1` values
/// literally, `ctrl == 128` is a no-op.
fn unpack_rle(data: &[u8], start: usize, field_bits: u32, count: usize) -> Result<Unpacked> {
    let mut reader = BitReader::new(data, start);
    let mut values = Vec::with_capacity(count);

    while values.len() < count {
        let ctrl = reader.read_bits(8)?;
        if ctrl == 128 {
            continue;
        } else if ctrl > 128 {
            let repeat = 257 - ctrl;
            let value = reader.read_bits(field_bits)?;
            for _ in 0..repeat {
                if values.len() >= count {
                    break;
                }
                values.push(value);
            }
        } else {
            let run = ctrl + 1;
            for _ in 0..run {
                if values.len() >= count {
                    break;
                }
                values.push(reader.read_bits(field_bits)?);
            }
        }
    }

    Ok(Unpacked { values, bits_consumed: reader.bit_pos() - start * 8 })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rle_repeat_branch_expands_correctly() {
        // ctrl = 253 -> repeat (257-253)=4 times, field_bits=4, value=0b1010
        let data = [0b1111_1101u8, 0b1010_0000u8, 0];
        let unpacked = unpack_rle(&data, 0, 4, 4).unwrap();
        assert_eq!(unpacked.values, vec![0b1010; 4]);
    }

    #[test]
    fn rle_copy_branch_reads_literal_run() {
        // ctrl = 2 -> copy next 3 values literally, field_bits=8
        let data = [2u8, 10, 20, 30, 0];
        let unpacked = unpack_rle(&data, 0, 8, 3).unwrap();
        assert_eq!(unpacked.values, vec![10, 20, 30]);
    }

    #[test]
    fn rle_skip_byte_consumes_no_values() {
        let data = [128u8, 2, 10, 20, 30, 0];
        let unpacked = unpack_rle(&data, 0, 8, 3).unwrap();
        assert_eq!(unpacked.values, vec![10, 20, 30]);
    }

    #[test]
    fn grayscale_ramp_spans_full_range() {
        let ramp = grayscale_ramp(2);
        assert_eq!(ramp[0], (0xFF, 0, 0, 0));
        assert_eq!(ramp[1], (0xFF, 255, 255, 255));
    }

    #[test]
    fn uncompressed_imag_reads_one_byte_per_pixel_regardless_of_depth() {
        // depth=4 would pack two pixels per byte if read as a bit field;
        // the uncompressed path must instead read one raw byte per pixel.
        let pixels = [3u8, 1, 2, 0];
        let unpacked = unpack_raw(&pixels, 0, 8, pixels.len()).unwrap();
        assert_eq!(unpacked.values, vec![3, 1, 2, 0]);
    }

    #[test]
    fn decode_imag_locates_palette_at_declared_image_size_not_consumed_bits() {
        // header: transparent_index=0, num_colors-1=1, flags=0b10 (has_palette),
        // image_compressed=0, palette_compressed=0, depth=8,
        // image_size-1=3 (declared 4 bytes), palette_size-1=0 (1 color).
        let mut data = vec![0u8, 1, 0b10, 0, 0, 8, 0, 3, 0, 0];
        // 4 declared pixel bytes (only first 2 used by a 2x1 face, the rest
        // is padding the declared size still accounts for); both pixels
        // index the lone palette entry.
        data.extend_from_slice(&[0, 0, 0, 0]);
        // palette: one RGB triple living right at offset+image_size.
        data.extend_from_slice(&[10, 20, 30]);

        let face = Face { width: 2, height: 1, flags: 0 };
        let (img, palette) = decode_imag(&data, 0, data.len(), face, &None).unwrap();
        assert_eq!(palette, vec![(0xFF, 10, 20, 30)]);
        assert_eq!(img.get(0, 0), (0xFF, 10, 20, 30));
    }
}
