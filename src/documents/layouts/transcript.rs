//! Official Transcript of Records, two long-bond pages.
//!
//! Page 1 carries the personal data and the academic record; page 2 is the
//! curriculum continuation for the student's program, the grading legend
//! and the certification.

use super::graded_subject_table;
use crate::documents::common::{
    base_rules, document_shell, escape_html, field_row, footer, issue_phrase, letterhead,
    scoped_style, signatures, title_block,
};
use crate::documents::curriculum::{self, Curriculum};
use crate::documents::RenderContext;
use crate::records::StudentViewModel;

const RULES: [(&str, &str); 12] = [
    (".personal", "margin-bottom: 10pt; font-size: 10.5pt;"),
    (".personal th.label", "text-align: left; font-weight: normal; width: 1.8in; white-space: nowrap;"),
    (".personal td.value", "font-weight: bold; border-bottom: 1px solid #999;"),
    (".section", "font-weight: bold; text-transform: uppercase; border-bottom: 2px solid #000; margin: 8pt 0 4pt;"),
    (".term", "font-weight: bold; font-style: italic; margin: 4pt 0;"),
    (".subjects", "font-size: 10pt;"),
    (".subjects thead th", "border-top: 1px solid #000; border-bottom: 1px solid #000;"),
    (".subjects tfoot td", "border-top: 1px solid #000; font-weight: bold;"),
    (".remarks", "margin-top: 8pt;"),
    (".continued", "text-align: right; font-style: italic; font-size: 9pt;"),
    (".legend td", "font-size: 9pt; padding: 0 4pt;"),
    (".seal", "width: 1.1in; float: left;"),
];

/// Personal data rows, shared with the permanent record.
pub(crate) fn personal_data(student: &StudentViewModel) -> String {
    let rows = [
        ("Name", &student.full_name_last_first),
        ("Student No.", &student.id_number),
        ("Date of Birth", &student.birth_date),
        ("Place of Birth", &student.birth_place),
        ("Sex", &student.gender),
        ("Civil Status", &student.civil_status_display),
        ("Nationality", &student.nationality),
        ("Religion", &student.religion),
        ("Father", &student.father_name),
        ("Mother", &student.mother_name),
        ("Permanent Address", &student.permanent_address),
        ("Elementary", &student.elementary_school),
        ("Year Graduated", &student.elementary_year),
        ("Secondary", &student.secondary_school),
        ("Year Graduated", &student.secondary_year),
        ("Previous School", &student.previous_school),
        ("Date of Admission", &student.admission_date),
    ];
    let body: String = rows
        .iter()
        .map(|(label, value)| field_row(label, value))
        .collect::<Vec<_>>()
        .join("\n");
    format!("<table class=\"personal\">\n{}\n</table>", body)
}

fn academic_record(student: &StudentViewModel) -> String {
    format!(
        r#"<div class="section">Academic Record</div>
<div class="term">{course} &middot; {year_level}, {semester} {school_year}</div>
{table}"#,
        course = escape_html(&student.course),
        year_level = escape_html(&student.year_level),
        semester = escape_html(&student.semester),
        school_year = escape_html(&student.school_year),
        table = graded_subject_table(student.subject_list(), "Total Units Earned"),
    )
}

fn page_one(ctx: &RenderContext<'_>) -> String {
    let student = ctx.student;
    format!(
        r#"{letterhead}
{title}
<div class="section">Personal Data</div>
{personal}
{record}
<p class="remarks"><strong>Remarks:</strong> {remarks}</p>
<p class="continued">Continued on page 2</p>
{footer}"#,
        letterhead = letterhead(ctx.school),
        title = title_block(ctx.request.document_type.title()),
        personal = personal_data(student),
        record = academic_record(student),
        remarks = escape_html(&student.remarks),
        footer = footer(),
    )
}

fn curriculum_tables(curriculum: &Curriculum) -> String {
    let mut html = format!(
        r#"<div class="section">Curriculum: {}</div>"#,
        escape_html(curriculum.program)
    );
    for term in curriculum.terms {
        html.push_str(&format!(
            "\n<div class=\"term\">{}, {}</div>\n<table class=\"subjects\">\n<tbody>\n",
            term.year_level, term.semester
        ));
        for subject in term.subjects {
            html.push_str(&format!(
                r#"<tr><td class="code">{}</td><td class="title">{}</td><td class="col-units">{}</td><td class="col-grade"></td></tr>"#,
                escape_html(subject.code),
                escape_html(subject.title),
                subject.units
            ));
            html.push('\n');
        }
        html.push_str(&format!(
            r#"</tbody>
<tfoot><tr><td colspan="2" class="total-label">Total</td><td class="col-units">{}</td><td class="col-grade"></td></tr></tfoot>
</table>"#,
            term.total_units()
        ));
    }
    html
}

fn grading_legend() -> &'static str {
    r#"<div class="section">Grading System</div>
<table class="legend">
<tr><td>1.00</td><td>Excellent</td><td>2.25</td><td>Good</td><td>5.00</td><td>Failed</td></tr>
<tr><td>1.25 - 1.50</td><td>Very Good</td><td>2.50 - 2.75</td><td>Satisfactory</td><td>INC</td><td>Incomplete</td></tr>
<tr><td>1.75 - 2.00</td><td>Above Average</td><td>3.00</td><td>Passed</td><td>DRP</td><td>Dropped</td></tr>
</table>"#
}

fn page_two(ctx: &RenderContext<'_>) -> String {
    let student = ctx.student;
    let continuation = match curriculum::for_program(&student.course) {
        Some(curriculum) => curriculum_tables(curriculum),
        None => format!(
            r#"<div class="section">Curriculum</div>
<p class="no-curriculum">Curriculum for {} is not on file. Nothing follows.</p>"#,
            escape_html(&student.course)
        ),
    };

    format!(
        r#"{letterhead}
<p class="term">{name} &middot; {id_number}</p>
{continuation}
{legend}
<p class="certification">I hereby certify that the foregoing records of <strong>{full_name}</strong> have been verified by me and that true copies of the official records substantiating the same are kept in the files of this institution. {issued}.</p>
<img class="seal" src="assets/seal.png" alt="School seal" />
{signatures}
<p class="remarks"><em>Not valid without the school seal.</em></p>
{footer}"#,
        letterhead = letterhead(ctx.school),
        name = escape_html(&student.full_name_last_first),
        id_number = escape_html(&student.id_number),
        continuation = continuation,
        legend = grading_legend(),
        full_name = escape_html(&student.full_name),
        issued = issue_phrase(ctx.issue_date),
        signatures = signatures(ctx.school, true),
        footer = footer(),
    )
}

pub fn render(ctx: &RenderContext<'_>) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let mut rules = base_rules();
    rules.extend(RULES);

    let body = if ctx.page >= 2 {
        page_two(ctx)
    } else {
        page_one(ctx)
    };
    document_shell(&scope, doc.code(), ctx.page, &scoped_style(&scope, &rules), &body)
}
