use chrono::Datelike;

use crate::documents::common::{
    base_rules, document_shell, escape_html, letterhead, ordinal, scoped_style, signatures,
};
use crate::documents::RenderContext;
use crate::records::aggregator::NOT_AVAILABLE;

pub fn render(ctx: &RenderContext<'_>) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let student = ctx.student;

    let mut rules = base_rules();
    rules.extend([
        ("", "padding: 0.6in 0.9in; text-align: center; border: 6px double #6b4f1d;"),
        (".letterhead img", "max-height: 1in;"),
        (".logo", "height: 1.1in;"),
        (".preamble", "font-style: italic; font-size: 13pt; margin: 10pt 0;"),
        (".graduate", "font-family: 'Old English Text MT', serif; font-size: 30pt; margin: 8pt 0;"),
        (".degree", "font-size: 18pt; font-weight: bold; text-transform: uppercase;"),
        (".honors", "font-size: 14pt; font-style: italic; margin-top: 4pt;"),
        (".given", "margin-top: 12pt; font-size: 12pt;"),
        (".seal", "height: 1.2in; margin-top: 6pt;"),
    ]);

    let degree = if student.major == NOT_AVAILABLE {
        escape_html(&student.course)
    } else {
        format!(
            "{}<br/>Major in {}",
            escape_html(&student.course),
            escape_html(&student.major)
        )
    };
    let honors = if student.honors == NOT_AVAILABLE {
        String::new()
    } else {
        format!(r#"<div class="honors">{}</div>"#, escape_html(&student.honors))
    };

    let given = ctx.issue_date;
    let body = format!(
        r#"<img class="logo" src="assets/logo.png" alt="" />
{letterhead}
<p class="preamble">The Board of Trustees, upon the recommendation of the Faculty, confers upon</p>
<div class="graduate">{name}</div>
<p class="preamble">the degree of</p>
<div class="degree">{degree}</div>
{honors}
<p class="given">with all the rights, privileges and honors thereunto appertaining. Given at {address} this {day} day of {month} in the year of our Lord {year}. Graduated {graduation}.</p>
<img class="seal" src="assets/seal.png" alt="School seal" />
{signatures}"#,
        letterhead = letterhead(ctx.school),
        name = escape_html(&student.full_name),
        degree = degree,
        honors = honors,
        address = escape_html(&ctx.school.address),
        day = ordinal(given.day()),
        month = given.format("%B"),
        year = given.year(),
        graduation = escape_html(&student.graduation_date),
        signatures = signatures(ctx.school, true),
    );

    document_shell(&scope, doc.code(), ctx.page, &scoped_style(&scope, &rules), &body)
}
