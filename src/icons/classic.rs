//! Classic planar DiskObject renderer (§4.2.1).
//!
//! Ported from `examples/original_source/src/amiwb/icons/icon_core.c`. Two
//! palettes, selected by the `userData` byte at offset `0x2C`: OS1.3
//! (4-color, 2 bitplanes, index 0 transparent) and OS3/MagicWB (8-color,
//! no default transparency). Icons carrying `DrawerData` (type byte at
//! `0x30` is DISK or DRAWER) push every field 56 bytes later, so the
//! Gadget header sits at `0x86` instead of `0x4E`; the two offsets below
//! are load-bearing constants from the original format, not tunables
//! (see DESIGN.md).

use super::{parser::{read_be16, read_be32}, Argb, DecodedIcon};
use crate::error::IconDecodeError;

type Result<T> = std::result::Result<T, IconDecodeError>;

/// `do_Type` byte in the classic `DiskObject` header.
const ICON_TYPE_OFFSET: usize = 0x30;
const ICON_TYPE_DISK: u8 = 1;
const ICON_TYPE_DRAWER: u8 = 2;

/// Gadget width/height/depth triple for an icon with no `DrawerData`.
const GADGET_HEADER_OFFSET: usize = 0x4E;
/// Same triple, 56 bytes later, for an icon whose header carries
/// `DrawerData` (the original's `header_offset = 78 + 56`).
const GADGET_HEADER_OFFSET_DRAWER: usize = 0x86;
/// An Image structure, when present, is 20 bytes; its bitmap data follows
/// immediately.
const IMAGE_STRUCT_SIZE: usize = 20;

/// Fixed fallback offset of a second (selected-state) bitmap in plain
/// OS1.3 icons (no `DrawerData`, depth == 2) that don't carry an Image
/// structure of their own. This is a hard-coded corpus quirk, not a
/// derivable layout rule; do not generalize without more fixtures (§9).
const OS13_SECOND_BITMAP_OFFSET: usize = 0x2B4;
/// `do_Gadget.UserData` low byte that selects the OS3/MagicWB palette.
const USER_DATA_OS3: u8 = 1;

/// OS1.3: transparent, black, white, "AmiWB blue" — a deliberate deviation
/// from the historical WB1.3 palette, preserved exactly (§4.2.1).
const OS13_PALETTE: [(u8, u8, u8, u8); 4] = [
    (0x00, 0x00, 0x00, 0x00),
    (0xFF, 0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF, 0xFF),
    (0xFF, 0x48, 0x6F, 0xB0),
];

/// OS3/MagicWB 8-color palette, no transparent entry.
const OS3_PALETTE: [(u8, u8, u8, u8); 8] = [
    (0xFF, 0xA0, 0xA2, 0xA0),
    (0xFF, 0x00, 0x00, 0x00),
    (0xFF, 0xFF, 0xFF, 0xFF),
    (0xFF, 0x66, 0x66, 0xBB),
    (0xFF, 0x99, 0x99, 0x99),
    (0xFF, 0xBB, 0xBB, 0xBB),
    (0xFF, 0xBB, 0xAA, 0x99),
    (0xFF, 0xFF, 0xAA, 0x22),
];

pub fn decode(data: &[u8], user_data: u8) -> Result<DecodedIcon> {
    let palette: &[(u8, u8, u8, u8)] = if user_data == USER_DATA_OS3 { &OS3_PALETTE } else { &OS13_PALETTE };

    let has_drawer_data = data
        .get(ICON_TYPE_OFFSET)
        .map(|&t| t == ICON_TYPE_DISK || t == ICON_TYPE_DRAWER)
        .unwrap_or(false);
    let header_offset = if has_drawer_data { GADGET_HEADER_OFFSET_DRAWER } else { GADGET_HEADER_OFFSET };

    if header_offset + 10 > data.len() {
        return Err(IconDecodeError::DataOverrun);
    }
    let width = read_be16(data, header_offset + 4)? as i32;
    let height = read_be16(data, header_offset + 6)? as i32;
    let depth = read_be16(data, header_offset + 8)? as u8;

    if width <= 0 || height <= 0 || width > 256 || height > 256 {
        return Err(IconDecodeError::DimensionsOutOfRange { width, height });
    }
    if depth == 0 || depth > 8 {
        return Err(IconDecodeError::DepthOutOfRange { depth });
    }

    // A bare OS1.3 icon with no DrawerData has no Image structure at all;
    // the bitmap starts right at the Gadget header. Every other case (any
    // DrawerData, or an OS3/MagicWB icon) has a 20-byte Image structure to
    // skip first.
    let bitmap_start = if !has_drawer_data && user_data != USER_DATA_OS3 {
        GADGET_HEADER_OFFSET
    } else {
        header_offset + IMAGE_STRUCT_SIZE
    };

    let normal = decode_one_image(data, bitmap_start, width as u32, height as u32, depth, palette)?;
    let first_img_size = plane_bytes(width as u32, height as u32) * depth as usize;

    let selected = decode_selected(data, bitmap_start, first_img_size, width as u32, height as u32, user_data, depth, has_drawer_data, palette)
        .unwrap_or_else(|| normal.darkened());

    Ok(DecodedIcon { normal, selected })
}

fn plane_bytes(width: u32, height: u32) -> usize {
    (((width + 15) / 16) * 2) as usize * height as usize
}

fn decode_one_image(
    data: &[u8],
    data_offset: usize,
    width: u32,
    height: u32,
    depth: u8,
    palette: &[(u8, u8, u8, u8)],
) -> Result<Argb> {
    let plane_bytes = plane_bytes(width, height);
    let row_bytes = plane_bytes as u32 / height.max(1);
    let total_bytes = plane_bytes * depth as usize;

    if data_offset + total_bytes > data.len() {
        return Err(IconDecodeError::DataOverrun);
    }

    let mut img = Argb::new(width, height);
    for y in 0..height {
        for x in 0..width {
            let byte_in_row = (x / 8) as usize;
            let bit = 7 - (x % 8);
            let mut index: u32 = 0;
            for plane in 0..depth as usize {
                let plane_offset = data_offset + plane * plane_bytes;
                let byte = data[plane_offset + y as usize * row_bytes as usize + byte_in_row];
                let bitval = (byte >> bit) & 1;
                index |= (bitval as u32) << plane;
            }
            let color = palette.get(index as usize).copied().unwrap_or((0xFF, 0, 0, 0));
            img.set(x, y, color);
        }
    }

    Ok(img)
}

/// Locates and decodes a second (selected-state) bitmap, following the
/// original's two special-cased OS1.3 layouts. Returns `None` whenever
/// the original would have fallen through to the darkened-normal default.
#[allow(clippy::too_many_arguments)]
fn decode_selected(
    data: &[u8],
    bitmap_start: usize,
    first_img_size: usize,
    width: u32,
    height: u32,
    user_data: u8,
    depth: u8,
    has_drawer_data: bool,
    palette: &[(u8, u8, u8, u8)],
) -> Option<Argb> {
    if user_data == USER_DATA_OS3 {
        return None;
    }

    if has_drawer_data {
        // Second Image structure (or raw bitmap, if the bytes there don't
        // look like a valid Image header) immediately follows the first
        // image's bitmap data.
        let selected_offset = bitmap_start + first_img_size;
        if selected_offset + IMAGE_STRUCT_SIZE <= data.len() {
            let sel_width = read_be16(data, selected_offset + 4).ok()?;
            let sel_height = read_be16(data, selected_offset + 6).ok()?;
            let sel_depth = read_be16(data, selected_offset + 8).ok()? as u8;
            let has_data = read_be32(data, selected_offset + 10).ok()?;
            if sel_width > 0 && sel_width <= 256 && sel_height > 0 && sel_height <= 256 && sel_depth > 0 && sel_depth <= 8 && has_data != 0 {
                let sel_bitmap = selected_offset + IMAGE_STRUCT_SIZE;
                return decode_one_image(data, sel_bitmap, sel_width as u32, sel_height as u32, sel_depth, palette).ok();
            }
            return decode_one_image(data, selected_offset, width, height, depth, palette).ok();
        }
        None
    } else if depth == 2 {
        // Plain OS1.3 icon, no Image structure: the second bitmap (if any)
        // lives at the fixed corpus offset below.
        if OS13_SECOND_BITMAP_OFFSET + first_img_size <= data.len() {
            decode_one_image(data, OS13_SECOND_BITMAP_OFFSET, width, height, depth, palette).ok()
        } else {
            None
        }
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_icon(width: u16, height: u16, depth: u8, plane_fill: u8) -> Vec<u8> {
        let row_bytes = ((width as u32 + 15) / 16) * 2;
        let plane_bytes = row_bytes as usize * height as usize;
        let mut data = vec![0u8; GADGET_HEADER_OFFSET + plane_bytes * depth as usize];
        data[GADGET_HEADER_OFFSET + 4] = (width >> 8) as u8;
        data[GADGET_HEADER_OFFSET + 5] = width as u8;
        data[GADGET_HEADER_OFFSET + 6] = (height >> 8) as u8;
        data[GADGET_HEADER_OFFSET + 7] = height as u8;
        data[GADGET_HEADER_OFFSET + 8] = 0;
        data[GADGET_HEADER_OFFSET + 9] = depth;
        for b in data[GADGET_HEADER_OFFSET..].iter_mut() {
            *b = plane_fill;
        }
        // re-stamp the header after the fill loop clobbered it
        data[GADGET_HEADER_OFFSET + 4] = (width >> 8) as u8;
        data[GADGET_HEADER_OFFSET + 5] = width as u8;
        data[GADGET_HEADER_OFFSET + 6] = (height >> 8) as u8;
        data[GADGET_HEADER_OFFSET + 7] = height as u8;
        data[GADGET_HEADER_OFFSET + 8] = 0;
        data[GADGET_HEADER_OFFSET + 9] = depth;
        data
    }

    #[test]
    fn decodes_os13_index_zero_as_transparent() {
        let data = make_icon(16, 16, 2, 0x00);
        let decoded = decode(&data, 0).unwrap();
        assert_eq!(decoded.normal.get(0, 0), (0x00, 0x00, 0x00, 0x00));
    }

    #[test]
    fn decodes_os3_with_no_transparency() {
        let data = make_icon(16, 16, 3, 0x00);
        let decoded = decode(&data, 1).unwrap();
        assert_eq!(decoded.normal.get(0, 0), OS3_PALETTE[0]);
    }

    #[test]
    fn rejects_oversized_dimensions() {
        let mut data = make_icon(16, 16, 2, 0);
        data[GADGET_HEADER_OFFSET + 4] = 0x02; // width = 0x0210 = 528
        let err = decode(&data, 0).unwrap_err();
        assert!(matches!(err, IconDecodeError::DimensionsOutOfRange { .. }));
    }

    #[test]
    fn selected_state_is_darkened_normal_when_no_second_bitmap_present() {
        let data = make_icon(8, 8, 3, 0xFF);
        let decoded = decode(&data, 1).unwrap();
        assert_eq!(decoded.selected, decoded.normal.darkened());
    }

    #[test]
    fn drawer_icon_uses_the_0x86_header_offset() {
        let mut data = vec![0u8; GADGET_HEADER_OFFSET_DRAWER + 200];
        data[ICON_TYPE_OFFSET] = ICON_TYPE_DRAWER;
        data[GADGET_HEADER_OFFSET_DRAWER + 4] = 0;
        data[GADGET_HEADER_OFFSET_DRAWER + 5] = 8;
        data[GADGET_HEADER_OFFSET_DRAWER + 6] = 0;
        data[GADGET_HEADER_OFFSET_DRAWER + 7] = 8;
        data[GADGET_HEADER_OFFSET_DRAWER + 8] = 0;
        data[GADGET_HEADER_OFFSET_DRAWER + 9] = 2;
        let decoded = decode(&data, 0).unwrap();
        assert_eq!((decoded.normal.width, decoded.normal.height), (8, 8));
    }
}
