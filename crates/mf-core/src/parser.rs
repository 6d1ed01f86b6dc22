//! Color parsing for values coming from color pickers and stored overlays.
//!
//! Built on `winnow` 0.7. Accepts `#hex`, `rgb()` / `rgba()` and a handful
//! of named colors. Anything else is rejected with a message.

use crate::model::Color;
use winnow::ascii::{Caseless, digit1, multispace0};
use winnow::combinator::{alt, opt, preceded};
use winnow::error::{ContextError, ErrMode};
use winnow::prelude::*;
use winnow::token::take_while;

/// Parse a CSS-style color string.
pub fn parse_color(input: &str) -> Result<Color, String> {
    let mut rest = input.trim();
    let color = alt((hex_color, rgb_function, named_color))
        .parse_next(&mut rest)
        .map_err(|e| format!("invalid color {input:?}: {e}"))?;
    if !rest.trim().is_empty() {
        return Err(format!("invalid color {input:?}: unexpected {rest:?}"));
    }
    Ok(color)
}

fn backtrack() -> ErrMode<ContextError> {
    ErrMode::Backtrack(ContextError::new())
}

fn hex_color(input: &mut &str) -> ModalResult<Color> {
    let _ = '#'.parse_next(input)?;
    let digits: &str = take_while(3..=8, |c: char| c.is_ascii_hexdigit()).parse_next(input)?;
    Color::from_hex(digits).ok_or_else(backtrack)
}

fn rgb_function(input: &mut &str) -> ModalResult<Color> {
    let _ = alt((Caseless("rgba("), Caseless("rgb("))).parse_next(input)?;
    let r = channel.parse_next(input)?;
    comma.parse_next(input)?;
    let g = channel.parse_next(input)?;
    comma.parse_next(input)?;
    let b = channel.parse_next(input)?;
    let a = opt(preceded(comma, alpha)).parse_next(input)?;
    let _ = multispace0.parse_next(input)?;
    let _ = ')'.parse_next(input)?;
    Ok(Color::rgba(r, g, b, a.unwrap_or(255)))
}

fn channel(input: &mut &str) -> ModalResult<u8> {
    let _ = multispace0.parse_next(input)?;
    let digits: &str = digit1.parse_next(input)?;
    digits
        .parse::<u16>()
        .ok()
        .and_then(|v| u8::try_from(v).ok())
        .ok_or_else(backtrack)
}

fn comma(input: &mut &str) -> ModalResult<()> {
    let _ = multispace0.parse_next(input)?;
    let _ = ','.parse_next(input)?;
    Ok(())
}

/// CSS alpha in `0.0..=1.0`, scaled to 0..=255.
fn alpha(input: &mut &str) -> ModalResult<u8> {
    let _ = multispace0.parse_next(input)?;
    let number: &str =
        take_while(1.., |c: char| c.is_ascii_digit() || c == '.').parse_next(input)?;
    let value = number.parse::<f32>().map_err(|_| backtrack())?;
    Ok((value.clamp(0.0, 1.0) * 255.0).round() as u8)
}

fn named_color(input: &mut &str) -> ModalResult<Color> {
    alt((
        Caseless("white").value(Color::WHITE),
        Caseless("black").value(Color::BLACK),
        Caseless("red").value(Color::rgb(255, 0, 0)),
        Caseless("yellow").value(Color::rgb(255, 255, 0)),
        Caseless("blue").value(Color::rgb(0, 0, 255)),
        Caseless("green").value(Color::rgb(0, 128, 0)),
        Caseless("transparent").value(Color::rgba(0, 0, 0, 0)),
    ))
    .parse_next(input)
}
