//! Color tokens from the match page → RGB.

/// Used for anything that is not a 3- or 6-digit hex token.
pub const NEUTRAL_GRAY: Rgb = Rgb(128, 128, 128);

pub const TRANSPARENT: &str = "transparent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#RGB` / `#RRGGBB`, leading `#` optional, case-insensitive.
    pub fn from_token(token: Option<&str>) -> Self {
        token.and_then(parse_hex).unwrap_or(NEUTRAL_GRAY)
    }

    pub fn css(&self) -> String {
        format!("rgb({}, {}, {})", self.0, self.1, self.2)
    }
}

fn parse_hex(token: &str) -> Option<Rgb> {
    let hex = token.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);
    if !hex.is_ascii() {
        return None;
    }
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
}

/// `transparent` swatches get no inline background at all.
pub fn is_transparent(token: Option<&str>) -> bool {
    token == Some(TRANSPARENT)
}
