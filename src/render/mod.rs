//! Render surfaces, wallpaper cache, and widget drawing (§4.3–§4.5).

pub mod surfaces;
pub mod wallpaper;
pub mod widgets;

/// Checker-pattern fill used for title bars; two variants distinguish the
/// active canvas from everything else (§4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckerVariant {
    Active,
    Inactive,
}

impl CheckerVariant {
    pub fn colors(&self) -> ((u8, u8, u8), (u8, u8, u8)) {
        match self {
            CheckerVariant::Active => ((0x48, 0x6F, 0xB0), (0x00, 0x00, 0x00)),
            CheckerVariant::Inactive => ((0x99, 0x99, 0x99), (0x00, 0x00, 0x00)),
        }
    }
}
