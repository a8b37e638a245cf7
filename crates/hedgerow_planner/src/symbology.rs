//! Display colours for planting positions.
//!
//! Colours are plain sRGB triples so any renderer can use them. Species colours are
//! derived from a hash of the name and stay the same across runs and platforms.
use crate::species::PlantType;

/// Fixed colour per plant type: trees green, shrubs blue, unassigned red.
pub fn type_color(plant_type: PlantType) -> [u8; 3] {
    match plant_type {
        PlantType::Tree => [34, 139, 34],
        PlantType::Shrub => [30, 100, 200],
        PlantType::Unassigned => [220, 30, 30],
    }
}

/// Stable colour for a species name. Channels stay within `40..=215` so points read
/// on both light and dark backgrounds.
pub fn species_color(species: &str) -> [u8; 3] {
    let hash = mix_u64(fnv1a(species.as_bytes()));
    let channel = |shift: u32| 40 + ((hash >> shift) & 0xFF) as u8 % 176;
    [channel(0), channel(16), channel(32)]
}

#[inline]
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xCBF29CE484222325, |h, &b| {
        (h ^ b as u64).wrapping_mul(0x100000001B3)
    })
}

#[inline]
fn mix_u64(mut x: u64) -> u64 {
    x ^= x >> 30;
    x = x.wrapping_mul(0xBF58476D1CE4E5B9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94D049BB133111EB);
    x ^ (x >> 31)
}
