//! Single-page certifications issued over the registrar's signature.
//!
//! They share one frame (letterhead, salutation, body paragraphs, purpose
//! line, issue date, signature) and differ in their body text and in the
//! optional subject table.

use rust_decimal::Decimal;

use super::{capitalize, graded_subject_table};
use crate::documents::common::{
    base_rules, document_shell, escape_html, footer, issue_phrase, letterhead, scoped_style,
    signatures, title_block,
};
use crate::documents::RenderContext;
use crate::records::aggregator::NOT_AVAILABLE;
use crate::records::StudentViewModel;

const CERTIFICATE_RULES: [(&str, &str); 7] = [
    (".salutation", "font-weight: bold; margin: 18pt 0 12pt;"),
    (".body p", "text-indent: 0.5in; text-align: justify; line-height: 1.6;"),
    (".body strong", "text-transform: uppercase;"),
    (".subjects", "margin: 8pt 0; font-size: 10.5pt;"),
    (".subjects thead th", "border-bottom: 1px solid #000;"),
    (".subjects tfoot td", "border-top: 1px solid #000; font-weight: bold;"),
    (".seal", "width: 1in;"),
];

fn purpose_line(ctx: &RenderContext<'_>) -> String {
    let purpose = ctx.request.purpose.trim();
    let purpose = if purpose.is_empty() {
        "whatever legal purpose it may serve".to_string()
    } else {
        format!("{} purposes", escape_html(purpose))
    };
    format!(
        "This certification is issued upon the request of {} for {}.",
        escape_html(&ctx.student.addressed_name()),
        purpose
    )
}

fn name(student: &StudentViewModel) -> String {
    format!("<strong>{}</strong>", escape_html(&student.full_name))
}

fn program(student: &StudentViewModel) -> String {
    if student.major == NOT_AVAILABLE {
        escape_html(&student.course)
    } else {
        format!(
            "{} major in {}",
            escape_html(&student.course),
            escape_html(&student.major)
        )
    }
}

fn term(student: &StudentViewModel) -> String {
    format!(
        "{} of School Year {}",
        escape_html(&student.semester),
        escape_html(&student.school_year)
    )
}

/// Common certificate frame.
fn certificate(ctx: &RenderContext<'_>, paragraphs: &[String], extra: &str) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let mut rules = base_rules();
    rules.extend(CERTIFICATE_RULES);

    let body_text: String = paragraphs
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
{extra}
<p>{purpose}</p>
<p>{issued}.</p>
</div>
<img class="seal" src="assets/seal.png" alt="School seal" />
{signatures}
{footer}"#,
        letterhead = letterhead(ctx.school),
        title = title_block(doc.title()),
        body_text = body_text,
        extra = extra,
        purpose = purpose_line(ctx),
        issued = issue_phrase(ctx.issue_date),
        signatures = signatures(ctx.school, false),
        footer = footer(),
    );
    document_shell(&scope, doc.code(), ctx.page, &scoped_style(&scope, &rules), &body)
}

pub fn enrollment(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    certificate(
        ctx,
        &[format!(
            "This is to certify that {}, with student number {}, is officially enrolled as a {} student in the {} program for the {}.",
            name(s),
            escape_html(&s.id_number),
            escape_html(&s.year_level),
            program(s),
            term(s)
        )],
        "",
    )
}

pub fn grades(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    certificate(
        ctx,
        &[format!(
            "This is to certify that {} obtained the following grades in the {} program during the {}:",
            name(s),
            program(s),
            term(s)
        )],
        &graded_subject_table(s.subject_list(), "Total Units"),
    )
}

pub fn good_moral(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    certificate(
        ctx,
        &[
            format!(
                "This is to certify that {} is a bona fide student of this institution enrolled in the {} program.",
                name(s),
                program(s)
            ),
            format!(
                "During {} stay in this institution, {} {} not been subject to any disciplinary action and {} known to be a person of good moral character.",
                s.possessive(),
                s.pronoun(),
                s.agree("has", "have"),
                s.agree("is", "are")
            ),
        ],
        "",
    )
}

pub fn graduation(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    let honors = if s.honors == NOT_AVAILABLE {
        String::new()
    } else {
        format!(" with the honor <em>{}</em>", escape_html(&s.honors))
    };
    certificate(
        ctx,
        &[format!(
            "This is to certify that {} has completed all the academic requirements for the degree of {} and graduated on {}{}.",
            name(s),
            program(s),
            escape_html(&s.graduation_date),
            honors
        )],
        "",
    )
}

pub fn units_earned(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    certificate(
        ctx,
        &[format!(
            "This is to certify that {} has earned a total of <span class=\"total-units\">{}</span> academic units in the {} program as of the {}, as follows:",
            name(s),
            s.total_units(),
            program(s),
            term(s)
        )],
        &graded_subject_table(s.subject_list(), "Total Units Earned"),
    )
}

fn format_balance(balance: Option<Decimal>) -> String {
    match balance {
        Some(amount) => format!("PHP {}", amount.round_dp(2)),
        None => NOT_AVAILABLE.to_string(),
    }
}

pub fn registration(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    let mut rows = String::new();
    for subject in s.subject_list() {
        rows.push_str(&format!(
            r#"<tr><td class="code">{}</td><td class="title">{}</td><td class="col-units">{}</td><td class="schedule">{}</td><td class="instructor">{}</td></tr>"#,
            escape_html(&subject.code),
            escape_html(&subject.title),
            subject.units,
            escape_html(subject.schedule.as_deref().unwrap_or("TBA")),
            escape_html(subject.instructor.as_deref().unwrap_or("TBA")),
        ));
        rows.push('\n');
    }
    let table = format!(
        r#"<table class="subjects">
<thead><tr><th class="code">Code</th><th class="title">Descriptive Title</th><th class="col-units">Units</th><th>Schedule</th><th>Instructor</th></tr></thead>
<tbody>
{rows}</tbody>
<tfoot><tr><td colspan="2" class="total-label">Total Units</td><td class="col-units total-units">{total}</td><td colspan="2"></td></tr></tfoot>
</table>
<p class="assessment">Outstanding balance: <strong>{balance}</strong></p>"#,
        rows = rows,
        total = s.total_units(),
        balance = escape_html(&format_balance(s.balance)),
    );
    certificate(
        ctx,
        &[format!(
            "This is to certify that {} ({}) is registered as a {} student in the {} program for the {} with the following subjects:",
            name(s),
            escape_html(&s.id_number),
            escape_html(&s.year_level),
            program(s),
            term(s)
        )],
        &table,
    )
}

pub fn medium_of_instruction(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    certificate(
        ctx,
        &[
            format!(
                "This is to certify that {} is a student of this institution in the {} program.",
                name(s),
                program(s)
            ),
            format!(
                "{} further certifies that English is the medium of instruction in all of {} courses.",
                escape_html(&ctx.school.name),
                s.possessive()
            ),
        ],
        "",
    )
}

pub fn cav(ctx: &RenderContext<'_>) -> String {
    let s = ctx.student;
    let status = if s.graduation_date == NOT_AVAILABLE {
        format!("was admitted on {}", escape_html(&s.admission_date))
    } else {
        format!(
            "was admitted on {} and graduated on {}",
            escape_html(&s.admission_date),
            escape_html(&s.graduation_date)
        )
    };
    certificate(
        ctx,
        &[
            format!(
                "This is to certify, authenticate and verify that {} {} in the {} program of this institution.",
                name(s),
                status,
                program(s)
            ),
            format!(
                "{} scholastic records attached hereto are true copies of the originals on file with the Office of the Registrar.",
                capitalize(s.possessive())
            ),
        ],
        "",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchoolProfile;
    use crate::documents::DocumentType;
    use crate::records::aggregator::merge;
    use crate::records::model::StudentIdentity;
    use crate::requests::{DocumentRequest, InitiatedBy};
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn good_moral_for(gender: Option<&str>) -> String {
        let id = Uuid::new_v4();
        let identity = StudentIdentity {
            id,
            first_name: Some("Sam".to_string()),
            last_name: Some("Rivera".to_string()),
            gender: gender.map(str::to_string),
            ..Default::default()
        };
        let student = merge(id, Some(&identity), None, None, None, vec![]);
        let request = DocumentRequest::new(
            id,
            DocumentType::GoodMoral,
            "Employment".to_string(),
            InitiatedBy::Student,
        );
        let school = SchoolProfile::default();
        good_moral(&RenderContext {
            student: &student,
            request: &request,
            page: 1,
            issue_date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
            school: &school,
        })
    }

    #[test]
    fn test_good_moral_verbs_follow_pronoun() {
        let unknown = good_moral_for(None);
        assert!(unknown.contains("they have not been subject"));
        assert!(unknown.contains("and are known"));

        let female = good_moral_for(Some("Female"));
        assert!(female.contains("she has not been subject"));
        assert!(female.contains("and is known"));
    }

    #[test]
    fn test_balance_formatting() {
        assert_eq!(format_balance(Some(Decimal::new(150050, 2))), "PHP 1500.50");
        assert_eq!(format_balance(None), "N/A");
    }
}
