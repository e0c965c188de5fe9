// src/output/palette.rs

use owo_colors::AnsiColors;

/// Colours cycled through by runner index.
pub const PALETTE: [AnsiColors; 6] = [
    AnsiColors::Magenta,
    AnsiColors::Blue,
    AnsiColors::Yellow,
    AnsiColors::Cyan,
    AnsiColors::Green,
    AnsiColors::Red,
];

/// Colour for the runner at `index`. Depends only on the index, so a script
/// keeps its colour across restarts and repeated runs.
pub fn color_for(index: usize) -> AnsiColors {
    PALETTE[index % PALETTE.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycles_through_palette() {
        assert_eq!(color_for(0), AnsiColors::Magenta);
        assert_eq!(color_for(5), AnsiColors::Red);
        assert_eq!(color_for(6), AnsiColors::Magenta);
        assert_eq!(color_for(13), AnsiColors::Blue);
    }

    #[test]
    fn is_stable_for_an_index() {
        for i in 0..32 {
            assert_eq!(color_for(i), color_for(i));
            assert_eq!(color_for(i), PALETTE[i % 6]);
        }
    }
}
