//! Common building blocks shared by the layouts.
//!
//! Escaping, date formatting, scoped styles and the letterhead / signature /
//! footer fragments every official document carries.

use chrono::{Datelike, NaiveDate};

use crate::config::SchoolProfile;

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

fn month_name(date: NaiveDate) -> &'static str {
    MONTHS[(date.month0() as usize).min(MONTHS.len() - 1)]
}

/// Format a date the way it is printed on documents (e.g. "April 9, 2025").
pub fn format_long_date(date: NaiveDate) -> String {
    format!("{} {}, {}", month_name(date), date.day(), date.year())
}

/// "1st", "2nd", "23rd", "11th".
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Closing line of certificates, e.g. "Issued this 9th day of April, 2025".
pub fn issue_phrase(date: NaiveDate) -> String {
    format!(
        "Issued this {} day of {}, {}",
        ordinal(date.day()),
        month_name(date),
        date.year()
    )
}

/// Escape text for inclusion in HTML content or attribute values.
pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Sanitize a string for use in filenames.
pub fn sanitize_filename(name: &str, fallback: &str) -> String {
    let mut result = String::new();
    let mut last_dash = false;

    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            result.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if (ch.is_whitespace() || ch == '-' || ch == '_' || ch == ',')
            && !last_dash
            && !result.is_empty()
        {
            result.push('-');
            last_dash = true;
        }
    }

    let trimmed = result.trim_matches('-');
    if trimmed.is_empty() {
        fallback.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Prefix every selector with the layout's root class so one document's
/// rules never leak into another.
///
/// An empty selector targets the root element itself.
pub fn scoped_style(scope: &str, rules: &[(&str, &str)]) -> String {
    let mut css = String::new();
    for (selector, declarations) in rules {
        let selectors = if selector.trim().is_empty() {
            format!(".{}", scope)
        } else {
            selector
                .split(',')
                .map(|part| format!(".{} {}", scope, part.trim()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        css.push_str(&format!("{} {{ {} }}\n", selectors, declarations));
    }
    format!("<style>\n{}</style>", css)
}

/// Rules every layout shares: letterhead, signatures, footer.
pub fn base_rules() -> Vec<(&'static str, &'static str)> {
    vec![
        ("", "font-family: 'Times New Roman', serif; font-size: 12pt; color: #000; box-sizing: border-box; padding: 0.5in 0.75in;"),
        (".letterhead", "text-align: center; margin-bottom: 12pt;"),
        (".letterhead img", "max-width: 100%; height: auto;"),
        (".school-name", "font-size: 16pt; font-weight: bold; text-transform: uppercase;"),
        (".school-address", "font-size: 10pt;"),
        (".doc-title", "text-align: center; font-size: 15pt; font-weight: bold; text-transform: uppercase; letter-spacing: 1pt; margin: 14pt 0;"),
        (".signatures", "display: flex; justify-content: space-between; margin-top: 36pt;"),
        (".signature", "text-align: center; min-width: 2.5in;"),
        (".signature .name", "font-weight: bold; text-transform: uppercase; border-top: 1px solid #000; padding-top: 2pt;"),
        (".signature .position", "font-size: 10pt;"),
        (".doc-footer", "text-align: center; margin-top: 18pt;"),
        (".doc-footer img", "max-width: 100%; height: auto;"),
        ("table", "width: 100%; border-collapse: collapse;"),
        ("th, td", "padding: 2pt 4pt; vertical-align: top;"),
    ]
}

/// Wrap a page body in its scoped root element.
pub fn document_shell(
    scope: &str,
    code: &str,
    page: u8,
    style: &str,
    body: &str,
) -> String {
    format!(
        r#"<div class="doc {scope}" data-document="{code}" data-page="{page}">
{style}
{body}
</div>"#,
        scope = scope,
        code = escape_html(code),
        page = page,
        style = style,
        body = body
    )
}

pub fn letterhead(school: &SchoolProfile) -> String {
    format!(
        r#"<header class="letterhead">
<img src="assets/letterhead.png" alt="{name}" />
<div class="school-name">{name}</div>
<div class="school-address">{address}</div>
</header>"#,
        name = escape_html(&school.name),
        address = escape_html(&school.address)
    )
}

pub fn title_block(title: &str) -> String {
    format!(r#"<h1 class="doc-title">{}</h1>"#, escape_html(title))
}

pub fn signature(name: &str, position: &str) -> String {
    format!(
        r#"<div class="signature"><div class="name">{}</div><div class="position">{}</div></div>"#,
        escape_html(name),
        escape_html(position)
    )
}

/// Registrar signature, plus the school head when `with_head` is set.
pub fn signatures(school: &SchoolProfile, with_head: bool) -> String {
    let mut blocks = String::new();
    if with_head {
        blocks.push_str(&signature(&school.head_name, &school.head_title));
    }
    blocks.push_str(&signature(&school.registrar_name, &school.registrar_title));
    format!(r#"<div class="signatures">{}</div>"#, blocks)
}

pub fn footer() -> String {
    r#"<footer class="doc-footer"><img src="assets/footer.png" alt="" /></footer>"#.to_string()
}

/// A two-column label/value table row.
pub fn field_row(label: &str, value: &str) -> String {
    format!(
        r#"<tr><th class="label">{}</th><td class="value">{}</td></tr>"#,
        escape_html(label),
        escape_html(value)
    )
}
