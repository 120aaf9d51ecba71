/// Prefixes every candidate of a `srcset` value with `image_base`.
///
/// Candidates are split on `,`, trimmed, prefixed and joined again with a
/// bare `,`. An empty base returns the input unchanged.
pub fn corrected_srcset(srcset: &str, image_base: &str) -> String {
    if image_base.is_empty() {
        return srcset.to_string();
    }

    let mut corrected = String::with_capacity(srcset.len() + image_base.len() * 4);
    for (index, entry) in srcset.split(',').enumerate() {
        if index > 0 {
            corrected.push(',');
        }
        corrected.push_str(image_base);
        corrected.push_str(entry.trim());
    }
    corrected
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefixes_each_trimmed_entry() {
        assert_eq!(
            corrected_srcset("a.jpg 1x, b.jpg 2x", "/base/"),
            "/base/a.jpg 1x,/base/b.jpg 2x"
        );
    }

    #[test]
    fn single_entry_has_no_separator() {
        assert_eq!(corrected_srcset(" photo.jpg ", "img/"), "img/photo.jpg");
    }

    #[test]
    fn empty_base_keeps_input() {
        assert_eq!(corrected_srcset("a.jpg 1x, b.jpg 2x", ""), "a.jpg 1x, b.jpg 2x");
    }

    #[test]
    fn rewriting_parts_matches_rewriting_whole() {
        let whole = corrected_srcset("a.jpg 1x, b.jpg 2x, c.jpg 3x", "/b/");
        let parts = format!(
            "{},{}",
            corrected_srcset("a.jpg 1x", "/b/"),
            corrected_srcset("b.jpg 2x, c.jpg 3x", "/b/")
        );
        assert_eq!(whole, parts);
    }
}
