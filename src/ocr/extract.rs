use crate::error::RaidError;

/// Artifact Tesseract emits at line boundaries of the damage zone
const LINE_BREAK_ARTIFACT: &str = "\n\u{c},";

/// Cleans raw damage OCR output: trims whitespace and removes the
/// form-feed/comma artifact.
pub fn clean_damage_text(raw: &str) -> String {
    raw.trim().replace(LINE_BREAK_ARTIFACT, "")
}

/// Parses a recognized damage string.
///
/// Every `,` is dropped wherever OCR put it; what remains must be ASCII digits.
pub fn parse_damage(text: &str) -> Result<u64, RaidError> {
    let parse_error = || RaidError::DamageParse {
        text: text.to_string(),
    };

    let digits = text.trim().replace(',', "");
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(parse_error());
    }

    digits.parse::<u64>().map_err(|_| parse_error())
}
