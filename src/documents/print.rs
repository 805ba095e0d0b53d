//! Compiles document pages into one self-contained print document.

use lazy_static::lazy_static;
use regex::{Captures, Regex};

use super::common::{escape_html, sanitize_filename};
use super::kind::DocumentType;

/// Forces the browser to start the next page.
pub const PAGE_BREAK: &str =
    r#"<div class="page-break" style="page-break-after: always; break-after: page;"></div>"#;

lazy_static! {
    /// Relative references to the fixed asset set, in attributes or CSS `url()`.
    static ref ASSET_REFERENCE: Option<Regex> = compile_pattern(
        r#"(?P<prefix>(?:src|href)="|url\(['"]?)(?:\./|\.\./|/)?(?:static/)?assets/(?P<file>(?:letterhead|footer|logo|seal)\.(?:png|jpe?g|svg))"#
    );
}

fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            log::error!("invalid asset pattern: {}", e);
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintDocument {
    pub html: String,
    pub filename: String,
    pub page_count: usize,
}

pub struct PrintCompiler {
    public_base_url: String,
}

impl PrintCompiler {
    pub fn new(public_base_url: impl Into<String>) -> Self {
        Self {
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Point letterhead, footer, logo and seal references at the public
    /// asset route so the print window can load them.
    pub fn rewrite_asset_urls(&self, markup: &str) -> String {
        match ASSET_REFERENCE.as_ref() {
            Some(pattern) => pattern
                .replace_all(markup, |caps: &Captures<'_>| {
                    format!("{}{}/assets/{}", &caps["prefix"], self.public_base_url, &caps["file"])
                })
                .into_owned(),
            None => markup.to_string(),
        }
    }

    /// Print rules: fixed sheet size, zero margins, bordered and centred
    /// grade and unit columns.
    fn print_rules(document_type: &DocumentType) -> String {
        format!(
            r#"@page {{ size: {size}; margin: 0; }}
html, body {{ margin: 0; padding: 0; background: #fff; }}
body {{ -webkit-print-color-adjust: exact; print-color-adjust: exact; }}
.sheet {{ width: {width}in; min-height: {height}in; margin: 0 auto; overflow: hidden; }}
th.col-grade, td.col-grade, th.col-units, td.col-units {{ border: 1px solid #000; text-align: center; vertical-align: middle; width: 0.7in; }}
.page-break {{ height: 0; }}
@media print {{ .sheet {{ margin: 0; }} }}"#,
            size = document_type.page_size().css(),
            width = document_type.page_size().width_in,
            height = document_type.page_size().height_in,
        )
    }

    /// Build the print document from pages already resolved against their
    /// snapshots. Pages are joined with an explicit page break.
    pub fn compile(
        &self,
        document_type: &DocumentType,
        student_name: &str,
        pages: &[String],
    ) -> PrintDocument {
        let sheets = pages
            .iter()
            .map(|page| format!("<section class=\"sheet\">\n{}\n</section>", self.rewrite_asset_urls(page)))
            .collect::<Vec<_>>()
            .join(&format!("\n{}\n", PAGE_BREAK));

        let title = format!("{} - {}", document_type.title(), student_name);
        let html = format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8" />
<title>{title}</title>
<style>
{rules}
</style>
</head>
<body>
{sheets}
</body>
</html>"#,
            title = escape_html(&title),
            rules = Self::print_rules(document_type),
            sheets = sheets,
        );

        PrintDocument {
            html,
            filename: format!(
                "{}.html",
                sanitize_filename(&format!("{} {}", student_name, document_type.code()), "document")
            ),
            page_count: pages.len(),
        }
    }
}
