//! Answer checking for choice and spoken input.
//!
//! Spoken answers arrive as whatever text the recognizer produced. Matching
//! is a best-effort heuristic, not a numeral parser: rules are tried in a
//! fixed order and the first hit wins.
//!
//! 1. exact match against the decimal form of the target
//! 2. a single-digit ideograph equal to a single-digit target
//! 3. the Chinese reading of a two-digit target (`十三`, `四十`, `七十二`)
//! 4. the decimal digits of the target anywhere in the text
//!
//! Rules 2-4 are containment checks, so `我说三` matches 3 and `1234`
//! matches 23. Targets above 99 are only reachable through rules 1 and 4.

use crate::model::Question;

/// Ideographs for the digits 0-9, indexed by value.
pub const DIGIT_IDEOGRAPHS: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

const TEN: char = '十';

/// Correct iff the chosen value is the target.
#[must_use]
pub fn check_choice(question: &Question, chosen: u32) -> bool {
    question.target() == chosen
}

/// Correct iff the transcript names the target under the matching rules.
#[must_use]
pub fn check_spoken(question: &Question, spoken: &str) -> bool {
    spoken_matches(question.target(), spoken)
}

/// Matching rules on a bare target value.
#[must_use]
pub fn spoken_matches(target: u32, spoken: &str) -> bool {
    let text = normalize(spoken);
    if text.is_empty() {
        return false;
    }
    let digits = target.to_string();

    if text == digits {
        return true;
    }

    if let Some(glyph) = digit_ideograph(target) {
        if text.contains(glyph) {
            return true;
        }
    }

    if let Some(reading) = two_digit_reading(target) {
        if text.contains(reading.as_str()) {
            return true;
        }
    }

    text.contains(digits.as_str())
}

fn normalize(spoken: &str) -> String {
    spoken.trim().to_lowercase()
}

/// Ideograph for a single-digit value.
#[must_use]
pub fn digit_ideograph(value: u32) -> Option<char> {
    usize::try_from(value)
        .ok()
        .and_then(|idx| DIGIT_IDEOGRAPHS.get(idx))
        .copied()
}

/// Expected Chinese reading for 10-99, `None` outside that range.
///
/// Teens read as `十` plus the ones digit (`十` alone for 10); 20-99 read as
/// the tens digit, `十`, then the ones digit unless it is zero.
#[must_use]
pub fn two_digit_reading(value: u32) -> Option<String> {
    if !(10..=99).contains(&value) {
        return None;
    }
    let tens = value / 10;
    let ones = value % 10;

    let mut reading = String::new();
    if tens > 1 {
        reading.push(digit_ideograph(tens)?);
    }
    reading.push(TEN);
    if ones > 0 {
        reading.push(digit_ideograph(ones)?);
    }
    Some(reading)
}
