//! Transfer papers and the permanent record.

use super::transcript::personal_data;
use super::{capitalize, graded_subject_table};
use crate::documents::common::{
    base_rules, document_shell, escape_html, footer, format_long_date, issue_phrase, letterhead,
    scoped_style, signatures, title_block,
};
use crate::documents::RenderContext;

const TRANSFER_RULES: [(&str, &str); 5] = [
    (".salutation", "font-weight: bold; margin: 18pt 0 12pt;"),
    (".body p", "text-indent: 0.5in; text-align: justify; line-height: 1.6;"),
    (".cut", "border-top: 1px dashed #000; margin: 24pt 0 8pt; text-align: center; font-size: 8pt;"),
    (".slip p", "margin: 4pt 0;"),
    (".blank", "display: inline-block; min-width: 3in; border-bottom: 1px solid #000;"),
];

/// Letter body plus the tear-off slip the receiving school sends back.
fn transfer_document(ctx: &RenderContext<'_>, paragraphs: &[String]) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let student = ctx.student;
    let mut rules = base_rules();
    rules.extend(TRANSFER_RULES);

    let body_text = paragraphs
        .iter()
        .map(|paragraph| format!("<p>{}</p>", paragraph))
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        r#"{letterhead}
{title}
<p class="salutation">TO WHOM IT MAY CONCERN:</p>
<div class="body">
{body_text}
<p>{issued}.</p>
</div>
{signatures}
<div class="cut">cut here</div>
<div class="slip">
<p><strong>REQUEST FOR TRANSCRIPT OF RECORDS</strong></p>
<p>The Registrar<br/>{school}<br/>{address}</p>
<p>Please send the Official Transcript of Records of <strong>{name}</strong>, who is temporarily enrolled in our school.</p>
<p>Name of School: <span class="blank"></span></p>
<p>Address: <span class="blank"></span></p>
<p>Registrar: <span class="blank"></span></p>
</div>
{footer}"#,
        letterhead = letterhead(ctx.school),
        title = title_block(doc.title()),
        body_text = body_text,
        issued = issue_phrase(ctx.issue_date),
        signatures = signatures(ctx.school, false),
        school = escape_html(&ctx.school.name),
        address = escape_html(&ctx.school.address),
        name = escape_html(&student.full_name),
        footer = footer(),
    );
    document_shell(&scope, doc.code(), ctx.page, &scoped_style(&scope, &rules), &body)
}

pub fn honorable_dismissal(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    transfer_document(
        ctx,
        &[
            format!(
                "This is to certify that <strong>{}</strong>, a student of the {} program, is hereby granted honorable dismissal effective {}.",
                escape_html(&s.full_name),
                escape_html(&s.course),
                format_long_date(ctx.issue_date)
            ),
            format!(
                "{} {} no pending obligation with this institution and {} eligible for transfer to any school. {} Official Transcript of Records will be forwarded upon receipt of the request below.",
                capitalize(s.pronoun()),
                s.agree("has", "have"),
                s.agree("is", "are"),
                capitalize(s.possessive())
            ),
        ],
    )
}

pub fn transfer_credential(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    transfer_document(
        ctx,
        &[
            format!(
                "This is to certify that <strong>{}</strong> was enrolled in this institution in the {} program, {} of School Year {}.",
                escape_html(&s.full_name),
                escape_html(&s.course),
                escape_html(&s.semester),
                escape_html(&s.school_year)
            ),
            format!(
                "{} {} entitled to transfer credentials and {} records may be released to the school indicated below.",
                capitalize(s.pronoun()),
                s.agree("is", "are"),
                s.possessive()
            ),
        ],
    )
}

pub fn form137(ctx: &RenderContext<'_>) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let s = ctx.student;
    let mut rules = base_rules();
    rules.extend([
        ("", "font-size: 10.5pt;"),
        (".section", "font-weight: bold; text-transform: uppercase; border-bottom: 2px solid #000; margin: 8pt 0 4pt;"),
        (".personal th.label", "text-align: left; font-weight: normal; width: 1.8in;"),
        (".personal td.value", "font-weight: bold; border-bottom: 1px solid #999;"),
        (".subjects thead th", "border-top: 1px solid #000; border-bottom: 1px solid #000;"),
        (".subjects tfoot td", "border-top: 1px solid #000; font-weight: bold;"),
    ]);

    let body = format!(
        r#"{letterhead}
{title}
<div class="section">Learner's Information</div>
{personal}
<div class="section">Scholastic Record &middot; {year_level}, {semester} {school_year}</div>
{table}
<p class="remarks"><strong>Remarks:</strong> {remarks}</p>
<p>{issued}.</p>
{signatures}
{footer}"#,
        letterhead = letterhead(ctx.school),
        title = title_block(doc.title()),
        personal = personal_data(s),
        year_level = escape_html(&s.year_level),
        semester = escape_html(&s.semester),
        school_year = escape_html(&s.school_year),
        table = graded_subject_table(s.subject_list(), "Total Units"),
        remarks = escape_html(&s.remarks),
        issued = issue_phrase(ctx.issue_date),
        signatures = signatures(ctx.school, true),
        footer = footer(),
    );
    document_shell(&scope, doc.code(), ctx.page, &scoped_style(&scope, &rules), &body)
}
