//! Input classification for inbound chat tokens.
//!
//! Grammar, checked in this order on the trimmed, lowercased text:
//! exact language code (`ch`/`he`/`ta`), consumption shorthand
//! (`[xyz]+` with an optional trailing integer cost), exact activity id
//! (1-5), otherwise unrecognized.

use crate::catalog::{ConsumptionKind, LanguageCode};

/// A classified inbound token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// An activity habit id in 1..=5.
    Activity(u8),
    /// A consumption entry: kind, dose count, optional cost in rubles.
    Consumption {
        kind: ConsumptionKind,
        count: u32,
        cost: u32,
    },
    /// A language-learning session.
    Language(LanguageCode),
    /// Anything else.
    Unrecognized,
}

/// Classify a raw message into one of the accepted token families.
pub fn classify(text: &str) -> Input {
    let text = text.trim().to_lowercase();

    if let Some(code) = LanguageCode::from_code(&text) {
        return Input::Language(code);
    }

    if let Some(parsed) = parse_consumption(&text) {
        return parsed;
    }

    // Digits only: `parse` alone would also take a leading sign.
    if !text.is_empty() && text.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(id) = text.parse::<u8>() {
            if (1..=5).contains(&id) {
                return Input::Activity(id);
            }
        }
    }

    Input::Unrecognized
}

/// Parse consumption shorthand: one or more letters from {x, y, z},
/// optionally followed by whitespace and a decimal cost.
///
/// When a token mixes letter classes (e.g. "xyz"), the kind is decided by
/// a fixed x-then-y-then-z check and the count only counts the chosen
/// letter. Deliberately kept for compatibility with the recorded data.
fn parse_consumption(text: &str) -> Option<Input> {
    let mut parts = text.split_whitespace();
    let letters = parts.next()?;
    if letters.is_empty() || !letters.chars().all(|c| matches!(c, 'x' | 'y' | 'z')) {
        return None;
    }

    let cost = match parts.next() {
        None => 0,
        Some(digits) => {
            if parts.next().is_some() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            digits.parse::<u32>().ok()?
        }
    };

    let kind = ['x', 'y', 'z']
        .into_iter()
        .find(|&c| letters.contains(c))
        .and_then(ConsumptionKind::from_letter)?;
    let count = letters.chars().filter(|&c| c == kind.letter()).count() as u32;

    Some(Input::Consumption { kind, count, cost })
}

/// Whether a token looks like an attempted consumption entry: it starts
/// with one of the consumption letters. Used to pick the corrective reply
/// when classification fails.
pub fn looks_like_consumption(text: &str) -> bool {
    text.trim()
        .to_lowercase()
        .starts_with(['x', 'y', 'z'])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activity_ids() {
        for id in 1..=5u8 {
            assert_eq!(classify(&id.to_string()), Input::Activity(id));
        }
        assert_eq!(classify("0"), Input::Unrecognized);
        assert_eq!(classify("6"), Input::Unrecognized);
        assert_eq!(classify("150"), Input::Unrecognized);
    }

    #[test]
    fn test_signed_numbers_are_not_activity_ids() {
        assert_eq!(classify("+1"), Input::Unrecognized);
        assert_eq!(classify("-2"), Input::Unrecognized);
    }

    #[test]
    fn test_consumption_with_cost() {
        assert_eq!(
            classify("xx 150"),
            Input::Consumption {
                kind: ConsumptionKind::Coffee,
                count: 2,
                cost: 150
            }
        );
        assert_eq!(
            classify("zzz 200"),
            Input::Consumption {
                kind: ConsumptionKind::Flour,
                count: 3,
                cost: 200
            }
        );
    }

    #[test]
    fn test_consumption_without_cost() {
        assert_eq!(
            classify("y"),
            Input::Consumption {
                kind: ConsumptionKind::Sugar,
                count: 1,
                cost: 0
            }
        );
    }

    #[test]
    fn test_mixed_letters_tie_break() {
        // x beats y beats z; count only counts the chosen letter.
        assert_eq!(
            classify("xyz"),
            Input::Consumption {
                kind: ConsumptionKind::Coffee,
                count: 1,
                cost: 0
            }
        );
        assert_eq!(
            classify("zyy"),
            Input::Consumption {
                kind: ConsumptionKind::Sugar,
                count: 2,
                cost: 0
            }
        );
    }

    #[test]
    fn test_language_codes() {
        assert_eq!(classify("ch"), Input::Language(LanguageCode::Chinese));
        assert_eq!(classify("he"), Input::Language(LanguageCode::Hebrew));
        assert_eq!(classify("ta"), Input::Language(LanguageCode::Tatar));
    }

    #[test]
    fn test_trims_and_lowercases() {
        assert_eq!(classify("  CH "), Input::Language(LanguageCode::Chinese));
        assert_eq!(
            classify("XX 50"),
            Input::Consumption {
                kind: ConsumptionKind::Coffee,
                count: 2,
                cost: 50
            }
        );
    }

    #[test]
    fn test_unrecognized() {
        assert_eq!(classify("abc"), Input::Unrecognized);
        assert_eq!(classify(""), Input::Unrecognized);
        assert_eq!(classify("xa"), Input::Unrecognized);
        assert_eq!(classify("x 1 2"), Input::Unrecognized);
        assert_eq!(classify("x -5"), Input::Unrecognized);
        assert_eq!(classify("x abc"), Input::Unrecognized);
    }

    #[test]
    fn test_looks_like_consumption() {
        assert!(looks_like_consumption("xq"));
        assert!(looks_like_consumption(" z??"));
        assert!(!looks_like_consumption("abc"));
        assert!(!looks_like_consumption("1"));
    }
}
