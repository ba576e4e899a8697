//! Charset shorthand expansion (`a-z0-9_` style).

/// Expand a charset shorthand into its characters.
///
/// A three-character window `X-Y` expands to every code point from `X` to `Y`
/// inclusive; any other character is kept literally. Repeated characters are
/// preserved so callers can weight a draw (`"aaab"` favours `a`).
pub fn expand_charset(definition: &str) -> Vec<char> {
    let chars: Vec<char> = definition.chars().collect();
    let mut expanded = Vec::with_capacity(chars.len());
    let mut idx = 0;

    while idx < chars.len() {
        if idx + 2 < chars.len() && chars[idx + 1] == '-' {
            let start = chars[idx] as u32;
            let end = chars[idx + 2] as u32;
            expanded.extend((start..=end).filter_map(char::from_u32));
            idx += 3;
        } else {
            expanded.push(chars[idx]);
            idx += 1;
        }
    }

    expanded
}

/// Same as [`expand_charset`], collected into a `String`.
pub fn expand_charset_string(definition: &str) -> String {
    expand_charset(definition).into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_ranges_in_order() {
        assert_eq!(expand_charset_string("a-c1-3"), "abc123");
    }

    #[test]
    fn lone_dash_is_literal() {
        assert_eq!(expand_charset("-"), vec!['-']);
        assert_eq!(expand_charset_string("a-"), "a-");
        assert_eq!(expand_charset_string("-a"), "-a");
    }

    #[test]
    fn keeps_duplicates_for_weighting() {
        assert_eq!(expand_charset_string("aaab"), "aaab");
        assert_eq!(expand_charset_string("a-ba"), "aba");
    }

    #[test]
    fn reversed_range_is_empty() {
        assert_eq!(expand_charset_string("z-a"), "");
        assert_eq!(expand_charset_string("z-a_"), "_");
    }

    #[test]
    fn dash_can_bound_a_range() {
        assert_eq!(expand_charset_string("+--"), "+,-");
    }
}
