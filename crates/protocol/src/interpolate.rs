//! Inline color escapes for marquee text
//!
//! `{#rrggbb}` inside a message switches the text color from that point on.
//! The display consumes the 4-byte form `0xE0 r g b`.

use crate::color::Rgb;

/// Marker byte that starts an inline color change
pub const COLOR_ESCAPE: u8 = 0xE0;

const SEQUENCE_LEN: usize = 9; // {#rrggbb}

/// Replace every well-formed `{#rrggbb}` with `COLOR_ESCAPE r g b`.
/// Anything that only looks similar is copied through untouched.
pub fn interpolate(input: &str) -> Vec<u8> {
    let mut input = input.as_bytes();
    let mut output = Vec::with_capacity(input.len());

    while !input.is_empty() {
        let Some(pos) = input.iter().position(|&b| b == b'{') else {
            output.extend_from_slice(input);
            break;
        };

        output.extend_from_slice(&input[..pos]);
        input = &input[pos..];

        match parse_sequence(input) {
            Some(color) => {
                output.extend_from_slice(&[COLOR_ESCAPE, color.r, color.g, color.b]);
                input = &input[SEQUENCE_LEN..];
            }
            None => {
                output.push(b'{');
                input = &input[1..];
            }
        }
    }

    output
}

fn parse_sequence(input: &[u8]) -> Option<Rgb> {
    if input.len() < SEQUENCE_LEN || input[1] != b'#' || input[8] != b'}' {
        return None;
    }
    let digits = std::str::from_utf8(&input[2..8]).ok()?;
    Rgb::from_hex_digits(digits).ok()
}
