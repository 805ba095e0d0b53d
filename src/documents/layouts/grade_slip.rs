//! Grade slip: one term's subjects with the lecture/laboratory unit split.

use super::grade_text;
use crate::documents::common::{
    base_rules, document_shell, escape_html, format_long_date, letterhead, scoped_style,
    signatures, title_block,
};
use crate::documents::RenderContext;

/// Lecture and laboratory units of a subject. Four or more units means a
/// three-unit lecture plus the remainder as laboratory.
pub fn split_units(units: u32) -> (u32, u32) {
    if units >= 4 {
        (3, units - 3)
    } else {
        (units, 0)
    }
}

pub fn render(ctx: &RenderContext<'_>) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let student = ctx.student;

    let mut rules = base_rules();
    rules.extend([
        ("", "padding: 0.35in 0.5in; font-size: 10pt;"),
        (".letterhead img", "max-height: 0.6in;"),
        (".doc-title", "font-size: 12pt; margin: 6pt 0;"),
        (".info", "margin-bottom: 6pt;"),
        (".info td", "padding: 1pt 4pt;"),
        (".info .label", "font-weight: bold; white-space: nowrap;"),
        (".subjects th", "border-bottom: 1px solid #000; font-size: 9pt;"),
        (".subjects tfoot td", "border-top: 1px solid #000; font-weight: bold;"),
        (".signatures", "margin-top: 18pt;"),
    ]);

    let mut rows = String::new();
    let (mut lec_total, mut lab_total) = (0, 0);
    for subject in student.subject_list() {
        let (lec, lab) = split_units(subject.units);
        lec_total += lec;
        lab_total += lab;
        rows.push_str(&format!(
            r#"<tr><td class="code">{}</td><td class="title">{}</td><td class="col-units lec">{}</td><td class="col-units lab">{}</td><td class="col-units">{}</td><td class="col-grade">{}</td></tr>"#,
            escape_html(&subject.code),
            escape_html(&subject.title),
            lec,
            lab,
            subject.units,
            grade_text(subject)
        ));
        rows.push('\n');
    }
    if student.subject_list().is_empty() {
        rows.push_str(r#"<tr><td colspan="6" class="empty">No enrolled subjects</td></tr>"#);
        rows.push('\n');
    }

    let body = format!(
        r#"{letterhead}
{title}
<table class="info">
<tr><td class="label">Name:</td><td>{name}</td><td class="label">ID No.:</td><td>{id_number}</td></tr>
<tr><td class="label">Course:</td><td>{course}</td><td class="label">Year Level:</td><td>{year_level}</td></tr>
<tr><td class="label">Semester:</td><td>{semester}</td><td class="label">School Year:</td><td>{school_year}</td></tr>
</table>
<table class="subjects">
<thead><tr><th class="code">Code</th><th class="title">Descriptive Title</th><th class="col-units">Lec</th><th class="col-units">Lab</th><th class="col-units">Units</th><th class="col-grade">Grade</th></tr></thead>
<tbody>
{rows}</tbody>
<tfoot><tr><td colspan="2" class="total-label">Total</td><td class="col-units lec-total">{lec_total}</td><td class="col-units lab-total">{lab_total}</td><td class="col-units total-units">{total}</td><td class="col-grade"></td></tr></tfoot>
</table>
<p class="issued">Date issued: {issued}</p>
{signatures}"#,
        letterhead = letterhead(ctx.school),
        title = title_block(doc.title()),
        name = escape_html(&student.full_name_last_first),
        id_number = escape_html(&student.id_number),
        course = escape_html(&student.course),
        year_level = escape_html(&student.year_level),
        semester = escape_html(&student.semester),
        school_year = escape_html(&student.school_year),
        rows = rows,
        lec_total = lec_total,
        lab_total = lab_total,
        total = student.total_units(),
        issued = format_long_date(ctx.issue_date),
        signatures = signatures(ctx.school, false),
    );

    document_shell(&scope, doc.code(), ctx.page, &scoped_style(&scope, &rules), &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_units() {
        assert_eq!(split_units(3), (3, 0));
        assert_eq!(split_units(5), (3, 2));
        assert_eq!(split_units(4), (3, 1));
        assert_eq!(split_units(2), (2, 0));
        assert_eq!(split_units(0), (0, 0));
    }
}
