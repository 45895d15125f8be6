//! Draw-order position ⇄ pick color.
//!
//! Item `i` is filled with red `i + 1` in the pick pass; red `0` is the
//! cleared background. Positions therefore fit in `1..=254` with `255` left
//! unused, which caps the board at [`MAX_ITEMS`].

use pinboard_engine::paint::Color;

/// Largest number of items the pick pass can tell apart.
pub const MAX_ITEMS: usize = 254;

/// Opaque pick color for draw-order position `index`, or `None` when the
/// position does not fit the encoding.
pub fn encode(index: usize) -> Option<Color> {
    if index >= MAX_ITEMS {
        return None;
    }
    Some(Color::from_rgba8(index as u8 + 1, 0, 0, 255))
}

/// Draw-order position named by a read-back red channel, given `count`
/// items on the board.
///
/// `0 < red <= count` maps to `red - 1`; anything else is background.
pub fn decode(red: u8, count: usize) -> Option<usize> {
    let r = red as usize;
    (r > 0 && r <= count).then(|| r - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_puts_position_plus_one_in_red() {
        assert_eq!(encode(0).unwrap().to_premul_rgba8(), [1, 0, 0, 255]);
        assert_eq!(encode(41).unwrap().to_premul_rgba8(), [42, 0, 0, 255]);
        assert_eq!(encode(MAX_ITEMS - 1).unwrap().to_premul_rgba8(), [254, 0, 0, 255]);
    }

    #[test]
    fn encode_rejects_positions_past_cap() {
        assert!(encode(MAX_ITEMS).is_none());
        assert!(encode(usize::MAX).is_none());
    }

    #[test]
    fn decode_maps_in_range_red_to_position() {
        for count in 1..=5 {
            for r in 1..=count as u8 {
                assert_eq!(decode(r, count), Some(r as usize - 1));
            }
        }
    }

    #[test]
    fn decode_treats_zero_and_overflow_as_background() {
        assert_eq!(decode(0, 3), None);
        assert_eq!(decode(4, 3), None);
        assert_eq!(decode(255, 3), None);
        assert_eq!(decode(1, 0), None);
    }

    #[test]
    fn every_position_survives_the_round_trip() {
        for i in 0..MAX_ITEMS {
            let [r, ..] = encode(i).unwrap().to_premul_rgba8();
            assert_eq!(decode(r, MAX_ITEMS), Some(i));
        }
    }
}
