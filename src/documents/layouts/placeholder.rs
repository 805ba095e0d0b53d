use crate::documents::common::{document_shell, escape_html, scoped_style};
use crate::documents::RenderContext;

/// Shown for document types without a layout so staff can see why nothing
/// rendered.
pub fn render(ctx: &RenderContext<'_>) -> String {
    let doc = &ctx.request.document_type;
    let scope = doc.scope_class();
    let style = scoped_style(
        &scope,
        &[
            ("", "padding: 1in; font-family: sans-serif; text-align: center; color: #7a1f1f;"),
            (".notice", "border: 2px dashed #7a1f1f; padding: 24pt; font-size: 14pt;"),
        ],
    );
    let body = format!(
        r#"<div class="notice"><p><strong>Template not available</strong></p><p>No layout is registered for &quot;{}&quot;. Please contact the registrar's office.</p></div>"#,
        escape_html(doc.code())
    );
    document_shell(&scope, doc.code(), ctx.page, &style, &body)
}
