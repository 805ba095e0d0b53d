//! Hand-built layouts, one per document type.
//!
//! Grade and unit cells always carry the `col-grade` / `col-units` classes;
//! the print compiler styles those columns.

pub mod certificates;
pub mod credentials;
pub mod diploma;
pub mod grade_slip;
pub mod placeholder;
pub mod transcript;

use super::common::escape_html;
use crate::records::model::SubjectRecord;

/// Grade cell text; an ungraded subject stays blank for the registrar.
pub(crate) fn grade_text(subject: &SubjectRecord) -> String {
    subject
        .grade
        .as_deref()
        .map(escape_html)
        .unwrap_or_default()
}

/// Code | Title | Units | Grade table with a total row.
pub(crate) fn graded_subject_table(subjects: &[SubjectRecord], total_label: &str) -> String {
    let mut rows = String::new();
    for subject in subjects {
        rows.push_str(&format!(
            r#"<tr><td class="code">{}</td><td class="title">{}</td><td class="col-units">{}</td><td class="col-grade">{}</td></tr>"#,
            escape_html(&subject.code),
            escape_html(&subject.title),
            subject.units,
            grade_text(subject)
        ));
        rows.push('\n');
    }
    if subjects.is_empty() {
        rows.push_str(r#"<tr><td colspan="4" class="empty">No subjects on record</td></tr>"#);
        rows.push('\n');
    }
    let total: u32 = subjects.iter().map(|s| s.units).sum();
    format!(
        r#"<table class="subjects">
<thead><tr><th class="code">Code</th><th class="title">Descriptive Title</th><th class="col-units">Units</th><th class="col-grade">Grade</th></tr></thead>
<tbody>
{rows}</tbody>
<tfoot><tr><td colspan="2" class="total-label">{label}</td><td class="col-units total-units">{total}</td><td class="col-grade"></td></tr></tfoot>
</table>"#,
        rows = rows,
        label = escape_html(total_label),
        total = total
    )
}

pub(crate) fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
