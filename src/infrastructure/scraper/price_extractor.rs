//! Price extraction from product page HTML

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::domain::history::MAX_PRICE;

/// Attribute match for one element
#[derive(Debug, Clone, Copy)]
pub enum Selector {
    /// `class` attribute contains this token
    Class(&'static str),
    /// `id` attribute equals this value
    Id(&'static str),
}

/// Tried in order. Only the first element matching a selector is read; if its
/// text is not a price, the next selector is tried.
pub const PRICE_SELECTORS: [Selector; 4] = [
    Selector::Class("a-price-whole"),
    Selector::Id("priceblock_ourprice"),
    Selector::Id("priceblock_dealprice"),
    Selector::Class("a-offscreen"),
];

/// First positive price found by [`PRICE_SELECTORS`]
pub fn extract_price(html: &str) -> Option<Decimal> {
    PRICE_SELECTORS
        .iter()
        .filter_map(|sel| sel.find_text(html))
        .find_map(|text| parse_price(&text))
}

/// Converts a price string such as `$1,299.90` to a decimal.
///
/// Everything except digits and dots is dropped; when several dots remain,
/// only the last one is the decimal point. Zero and anything above
/// [`MAX_PRICE`] are not prices.
pub fn parse_price(text: &str) -> Option<Decimal> {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();

    let mut normalized = match digits.rsplit_once('.') {
        Some((int, frac)) if int.contains('.') => format!("{}.{}", int.replace('.', ""), frac),
        _ => digits.clone(),
    };
    if normalized.ends_with('.') {
        normalized.pop();
    }
    if normalized.starts_with('.') {
        normalized.insert(0, '0');
    }
    if normalized.is_empty() {
        return None;
    }

    Decimal::from_str(&normalized)
        .ok()
        .filter(|p| *p > Decimal::ZERO && *p <= MAX_PRICE)
}

impl Selector {
    fn matches(&self, open_tag: &str) -> bool {
        match self {
            Selector::Class(token) => attr_value(open_tag, "class")
                .map_or(false, |v| v.split_whitespace().any(|c| c.eq_ignore_ascii_case(token))),
            Selector::Id(id) => attr_value(open_tag, "id").map_or(false, |v| v.eq_ignore_ascii_case(id)),
        }
    }

    /// Visible text of the first matching element
    pub fn find_text(&self, html: &str) -> Option<String> {
        let lc = html.to_ascii_lowercase();
        let mut from = 0;

        while let Some(rel) = lc[from..].find('<') {
            let start = from + rel;
            let open_end = lc[start..].find('>')? + start;
            let open_tag = &html[start + 1..open_end];
            from = open_end + 1;

            if open_tag.starts_with('/') || open_tag.starts_with('!') {
                continue;
            }
            let name = tag_name(&lc[start + 1..open_end]);
            if name.is_empty() || !self.matches(open_tag) {
                continue;
            }
            if open_tag.ends_with('/') {
                return Some(String::new());
            }

            let end = matching_close(&lc, name, open_end + 1)?;
            return Some(strip_tags(&html[open_end + 1..end]));
        }
        None
    }
}

fn tag_name(open_tag: &str) -> &str {
    let end = open_tag
        .find(|c: char| c.is_ascii_whitespace() || c == '/')
        .unwrap_or(open_tag.len());
    &open_tag[..end]
}

/// Value of `attr` inside an opening tag, quotes removed
fn attr_value<'a>(open_tag: &'a str, attr: &str) -> Option<&'a str> {
    let lc = open_tag.to_ascii_lowercase();
    let pat = format!("{}=", attr);
    let mut from = 0;

    while let Some(rel) = lc[from..].find(&pat) {
        let at = from + rel;
        from = at + pat.len();
        let boundary = lc[..at].chars().last().map_or(false, |c| c.is_ascii_whitespace());
        if !boundary {
            continue;
        }

        let rest = &open_tag[at + pat.len()..];
        return match rest.chars().next()? {
            q @ ('"' | '\'') => {
                let close = rest[1..].find(q)?;
                Some(&rest[1..1 + close])
            }
            _ => {
                let end = rest.find(|c: char| c.is_ascii_whitespace() || c == '/').unwrap_or(rest.len());
                Some(&rest[..end])
            }
        };
    }
    None
}

/// Offset of the close tag balancing an element named `name` opened before `from`
fn matching_close(lc: &str, name: &str, from: usize) -> Option<usize> {
    let open_pat = format!("<{}", name);
    let close_pat = format!("</{}", name);
    let mut depth = 1usize;
    let mut pos = from;

    while let Some(rel) = lc[pos..].find('<') {
        let at = pos + rel;
        let rest = &lc[at..];
        if is_tag(rest, &close_pat) {
            depth -= 1;
            if depth == 0 {
                return Some(at);
            }
        } else if is_tag(rest, &open_pat) {
            let self_closing = rest.find('>').map_or(false, |e| rest[..e].ends_with('/'));
            if !self_closing {
                depth += 1;
            }
        }
        pos = at + 1;
    }
    None
}

fn is_tag(rest: &str, pat: &str) -> bool {
    rest.starts_with(pat)
        && rest[pat.len()..]
            .chars()
            .next()
            .map_or(false, |c| c == '>' || c == '/' || c.is_ascii_whitespace())
}

fn strip_tags(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    out.replace("&nbsp;", " ").split_whitespace().collect::<Vec<_>>().join(" ")
}
