use regex::Regex;
use scraper::Selector;

use crate::detector::error::DetectorError;

/// All first-group captures of `re` in `input`, in match order.
#[inline]
pub fn capture_group_1_all<'a>(re: &'a Regex, input: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    re.captures_iter(input)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Undoes the escaping script authors and JSON serializers apply to URLs.
pub fn unescape_script_url(raw: &str) -> String {
    raw.trim()
        .replace("\\/", "/")
        .replace("\\u0026", "&")
        .replace("\\u002F", "/")
        .replace("\\u002f", "/")
        .replace("\\u003D", "=")
        .replace("\\u003d", "=")
        .replace("&amp;", "&")
}

/// Parses a list of CSS selectors, failing on the first invalid one.
pub fn parse_selectors<S: AsRef<str>>(selectors: &[S]) -> Result<Vec<Selector>, DetectorError> {
    selectors
        .iter()
        .map(|s| {
            Selector::parse(s.as_ref()).map_err(|e| DetectorError::InvalidSelector {
                selector: s.as_ref().to_string(),
                message: format!("{e:?}"),
            })
        })
        .collect()
}
