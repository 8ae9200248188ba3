//! Ordered-list marker classification.

use vellum_ast::{ListNumberDelim, ListNumberStyle};

fn roman_digit(c: char) -> Option<i32> {
    let v = match c.to_ascii_lowercase() {
        'i' => 1,
        'v' => 5,
        'x' => 10,
        'l' => 50,
        'c' => 100,
        'd' => 500,
        'm' => 1000,
        _ => return None,
    };
    Some(v)
}

/// Value of a roman numeral (subtractive notation, case-uniform input).
/// Rejects the empty string and non-numeral characters; mixed-order inputs
/// such as `ic` still sum, matching the reader's permissive heritage.
pub(crate) fn roman_to_int(s: &str) -> Option<i32> {
    if s.is_empty() {
        return None;
    }
    let digits: Option<Vec<i32>> = s.chars().map(roman_digit).collect();
    let digits = digits?;
    let mut total = 0;
    for (i, &d) in digits.iter().enumerate() {
        if digits[i + 1..].iter().any(|&next| next > d) {
            total -= d;
        } else {
            total += d;
        }
    }
    Some(total)
}

/// Value of a single alphabetic marker (`a` = 1 .. `z` = 26).
pub(crate) fn alpha_to_int(c: char) -> i32 {
    (c.to_ascii_lowercase() as i32) - ('a' as i32) + 1
}

/// Single-letter roman numerals, the values `{1,5,10,50,100,500,1000}`.
/// Markers like `I.` or `V.` are ambiguous with initials, so with a period
/// delimiter they demand a wide separator after the marker.
fn is_single_letter_roman(token: &str) -> bool {
    let mut chars = token.chars();
    matches!(
        (chars.next().map(|c| roman_digit(c).is_some()), chars.next()),
        (Some(true), None)
    )
}

/// Whether the separator after this marker must be a tab or two or more
/// spaces: upper-alpha markers and single-letter upper-roman markers with a
/// period delimiter read like initials or section numbers otherwise.
pub(crate) fn requires_wide_separator(
    style: ListNumberStyle,
    delim: ListNumberDelim,
    token: &str,
) -> bool {
    delim == ListNumberDelim::Period
        && (style == ListNumberStyle::UpperAlpha
            || (style == ListNumberStyle::UpperRoman && is_single_letter_roman(token)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("i", 1)]
    #[case("iv", 4)]
    #[case("ix", 9)]
    #[case("xiv", 14)]
    #[case("mcmxiv", 1914)]
    #[case("MMVIII", 2008)]
    fn roman_values(#[case] input: &str, #[case] expected: i32) {
        assert_eq!(roman_to_int(input), Some(expected));
    }

    #[test]
    fn roman_rejects_empty_and_garbage() {
        assert_eq!(roman_to_int(""), None);
        assert_eq!(roman_to_int("xyz"), None);
    }

    #[test]
    fn alpha_values() {
        assert_eq!(alpha_to_int('a'), 1);
        assert_eq!(alpha_to_int('Z'), 26);
    }

    #[rstest]
    #[case(ListNumberStyle::UpperAlpha, ListNumberDelim::Period, "B", true)]
    #[case(ListNumberStyle::UpperRoman, ListNumberDelim::Period, "I", true)]
    #[case(ListNumberStyle::UpperRoman, ListNumberDelim::Period, "M", true)]
    #[case(ListNumberStyle::UpperRoman, ListNumberDelim::Period, "II", false)]
    #[case(ListNumberStyle::UpperAlpha, ListNumberDelim::OneParen, "B", false)]
    #[case(ListNumberStyle::LowerAlpha, ListNumberDelim::Period, "b", false)]
    #[case(ListNumberStyle::Decimal, ListNumberDelim::Period, "4", false)]
    fn wide_separator_rule(
        #[case] style: ListNumberStyle,
        #[case] delim: ListNumberDelim,
        #[case] token: &str,
        #[case] expected: bool,
    ) {
        assert_eq!(requires_wide_separator(style, delim, token), expected);
    }
}
