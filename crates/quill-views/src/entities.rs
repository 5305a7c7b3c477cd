//! HTML entity decoding for server-supplied titles.

use std::borrow::Cow;

const MAX_ENTITY_LEN: usize = 10;

/// Decode named and numeric HTML entities.
///
/// Unknown or malformed entities are left as written.
#[must_use]
pub fn decode_entities(input: &str) -> Cow<'_, str> {
    if !input.contains('&') {
        return Cow::Borrowed(input);
    }

    let mut decoded = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        decoded.push_str(&rest[..start]);
        let candidate = &rest[start + 1..];
        let entity = candidate
            .find(';')
            .filter(|end| *end <= MAX_ENTITY_LEN)
            .and_then(|end| decode_one(&candidate[..end]).map(|ch| (ch, end)));
        match entity {
            Some((ch, end)) => {
                decoded.push(ch);
                rest = &candidate[end + 1..];
            }
            None => {
                decoded.push('&');
                rest = candidate;
            }
        }
    }
    decoded.push_str(rest);
    Cow::Owned(decoded)
}

fn decode_one(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        let code = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "hellip" => '…',
        "ndash" => '–',
        "mdash" => '—',
        "lsquo" => '‘',
        "rsquo" => '’',
        "ldquo" => '“',
        "rdquo" => '”',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_borrowed() {
        assert!(matches!(decode_entities("Hello"), Cow::Borrowed("Hello")));
    }

    #[test]
    fn named_and_numeric_entities_decode() {
        assert_eq!(
            decode_entities("Tom &amp; Jerry&#8217;s &#x201C;Day&#x201D; &hellip;"),
            "Tom & Jerry’s “Day” …"
        );
    }

    #[test]
    fn malformed_entities_are_preserved() {
        assert_eq!(decode_entities("R&D &unknown; & &#xZZ;"), "R&D &unknown; & &#xZZ;");
        assert_eq!(decode_entities("trailing &amp"), "trailing &amp");
    }
}
