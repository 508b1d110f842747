//! Modern AICON PNG-container renderer (§4.2.3).
//!
//! Ported from `examples/original_source/src/amiwb/icons/icon_aicon.c`:
//! fixed header + directory of `(type, offset, size)` triples pointing at
//! PNG byte ranges. PNG decoding itself is delegated to the `image` crate
//! (see DESIGN.md for why this enrichment dependency was chosen).

use super::{Argb, DecodedIcon};
use crate::error::IconDecodeError;

type Result<T> = std::result::Result<T, IconDecodeError>;

const SUPPORTED_VERSION: u8 = 1;
const SECTION_PNG_NORMAL: u32 = 1;
const SECTION_PNG_SELECTED: u32 = 2;
const SECTION_METADATA: u32 = 3;

struct DirEntry {
    section_type: u32,
    offset: u32,
    size: u32,
}

pub fn decode(data: &[u8]) -> Result<DecodedIcon> {
    if data.len() < 7 {
        return Err(IconDecodeError::TooSmall);
    }
    if &data[0..5] != b"AICON" {
        return Err(IconDecodeError::UnknownMagic);
    }
    let version = data[5];
    if version != SUPPORTED_VERSION {
        return Err(IconDecodeError::UnsupportedAiconVersion);
    }
    let section_count = data[6] as usize;

    let dir_start = 7;
    let entry_size = 12; // u32 type + u32 offset + u32 size
    let dir_end = dir_start + section_count * entry_size;
    if dir_end > data.len() {
        return Err(IconDecodeError::AiconOutOfBounds);
    }

    let mut entries = Vec::with_capacity(section_count);
    for i in 0..section_count {
        let base = dir_start + i * entry_size;
        let section_type = read_u32_le(data, base)?;
        let offset = read_u32_le(data, base + 4)?;
        let size = read_u32_le(data, base + 8)?;
        let end = (offset as usize).checked_add(size as usize).ok_or(IconDecodeError::AiconOutOfBounds)?;
        if end > data.len() {
            return Err(IconDecodeError::AiconOutOfBounds);
        }
        entries.push(DirEntry { section_type, offset, size });
    }

    let normal_entry = entries
        .iter()
        .find(|e| e.section_type == SECTION_PNG_NORMAL)
        .ok_or(IconDecodeError::AiconOutOfBounds)?;
    let normal = decode_png_section(data, normal_entry)?;

    let selected = match entries.iter().find(|e| e.section_type == SECTION_PNG_SELECTED) {
        Some(e) => decode_png_section(data, e)?,
        None => normal.darkened(),
    };

    // METADATA sections carry a position hint only; parsed for
    // completeness but otherwise inert (§4.2.3).
    let _ = entries.iter().find(|e| e.section_type == SECTION_METADATA);

    Ok(DecodedIcon { normal, selected })
}

fn read_u32_le(data: &[u8], offset: usize) -> Result<u32> {
    if offset + 4 > data.len() {
        return Err(IconDecodeError::AiconOutOfBounds);
    }
    Ok(u32::from_le_bytes([data[offset], data[offset + 1], data[offset + 2], data[offset + 3]]))
}

fn decode_png_section(data: &[u8], entry: &DirEntry) -> Result<Argb> {
    let slice = &data[entry.offset as usize..(entry.offset + entry.size) as usize];
    let decoded = image::load_from_memory_with_format(slice, image::ImageFormat::Png)
        .map_err(|e| IconDecodeError::Png(e.to_string()))?
        .to_rgba8();

    let (width, height) = decoded.dimensions();
    let mut img = Argb::new(width, height);
    for (x, y, px) in decoded.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        img.set(x, y, (a, r, g, b));
    }
    Ok(img)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_magic() {
        let data = b"NOPE\x00\x01\x00".to_vec();
        assert!(matches!(decode(&data), Err(IconDecodeError::UnknownMagic)));
    }

    #[test]
    fn rejects_unsupported_version() {
        let mut data = b"AICON".to_vec();
        data.push(9); // version
        data.push(0); // section count
        assert!(matches!(decode(&data), Err(IconDecodeError::UnsupportedAiconVersion)));
    }

    #[test]
    fn rejects_out_of_bounds_directory_entry() {
        let mut data = b"AICON".to_vec();
        data.push(SUPPORTED_VERSION);
        data.push(1); // one section
        // type=1, offset=1000, size=10 (well past end)
        data.extend_from_slice(&1u32.to_le_bytes());
        data.extend_from_slice(&1000u32.to_le_bytes());
        data.extend_from_slice(&10u32.to_le_bytes());
        assert!(matches!(decode(&data), Err(IconDecodeError::AiconOutOfBounds)));
    }
}
