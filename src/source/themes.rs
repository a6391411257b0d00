//! Preset themes offered on the theme picker.

use crate::core::rng::DeterministicRng;

/// Themes suggested to the player. Any other non-blank theme is accepted.
pub const PRESET_THEMES: &[&str] = &[
    "Ocean Life",
    "British Birds",
    "Farm Animals",
    "Space Exploration",
    "Periodic Table Elements",
    "Cooking Terms",
    "Mythical Creatures",
    "UK 60s Music Bands",
    "Types of Pasta",
    "Capital Cities",
    "British Wildflowers",
    "Musical Instruments",
    "Weather Phenomena",
    "In the Kitchen",
    "Shapes",
    "Colors",
    "Fruits",
    "Vegetables",
    "British Woodland Wildlife",
    "African Animals",
    "Famous Artists",
    "Constellations",
    "Types of Cheese",
    "Classic Cars",
];

/// How many presets the picker shows at once.
pub const SUGGESTION_COUNT: usize = 8;

/// Pick `count` distinct presets in random order.
pub fn suggest_themes(rng: &mut DeterministicRng, count: usize) -> Vec<&'static str> {
    let mut themes = PRESET_THEMES.to_vec();
    rng.shuffle(&mut themes);
    themes.truncate(count);
    themes
}
