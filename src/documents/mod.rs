//! Document rendering: per-type layouts, pagination and print compilation.
//!
//! Each document type has its own hand-built layout (see [`layouts`]). The
//! [`TemplateResolver`] maps a [`DocumentType`] to its layout, the
//! [`PaginationController`] decides whether a page comes from an edited
//! snapshot or a fresh render, and the [`PrintCompiler`] turns the pages
//! into one self-contained HTML print document.

pub mod common;
pub mod curriculum;
pub mod kind;
pub mod layouts;
pub mod pagination;
pub mod print;
pub mod resolver;

pub use kind::{DocumentKey, DocumentType, PageSize};
pub use pagination::{clamp_page, PageSource, PageView, PaginationController};
pub use print::{PrintCompiler, PrintDocument};
pub use resolver::{LayoutFn, RenderContext, TemplateResolver};
