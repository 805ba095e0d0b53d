//! Lifecycle and rendering counters, exposed on `/metrics/lifecycle`.
//!
//! HTTP request metrics come from the actix Prometheus middleware on `/metrics`.

use actix_web::{HttpResponse, Responder};
use lazy_static::lazy_static;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

lazy_static! {
    static ref REGISTRY: Registry = Registry::new();
    static ref TRANSITIONS_TOTAL: Option<IntCounterVec> = register(
        "registrar_transitions_total",
        "Lifecycle operations by action and outcome",
        &["action", "outcome"],
    );
    static ref DOCUMENTS_RENDERED_TOTAL: Option<IntCounterVec> = register(
        "registrar_documents_rendered_total",
        "Document pages generated by the template resolver",
        &["document_type"],
    );
    static ref PRINTS_TOTAL: Option<IntCounterVec> = register(
        "registrar_prints_total",
        "Compiled print documents by kind (first or reprint)",
        &["kind"],
    );
}

fn register(name: &str, help: &str, labels: &[&str]) -> Option<IntCounterVec> {
    let counter = IntCounterVec::new(Opts::new(name, help), labels)
        .and_then(|counter| {
            REGISTRY.register(Box::new(counter.clone()))?;
            Ok(counter)
        });
    match counter {
        Ok(counter) => Some(counter),
        Err(e) => {
            log::error!("failed to register metric {}: {}", name, e);
            None
        }
    }
}

pub fn record_transition(action: &str, outcome: &str) {
    if let Some(counter) = TRANSITIONS_TOTAL.as_ref() {
        counter.with_label_values(&[action, outcome]).inc();
    }
}

pub fn record_render(document_type: &str) {
    if let Some(counter) = DOCUMENTS_RENDERED_TOTAL.as_ref() {
        counter.with_label_values(&[document_type]).inc();
    }
}

pub fn record_print(reprint: bool) {
    if let Some(counter) = PRINTS_TOTAL.as_ref() {
        let kind = if reprint { "reprint" } else { "first" };
        counter.with_label_values(&[kind]).inc();
    }
}

pub fn transition_count(action: &str, outcome: &str) -> u64 {
    TRANSITIONS_TOTAL
        .as_ref()
        .map(|counter| counter.with_label_values(&[action, outcome]).get())
        .unwrap_or(0)
}

/// Render the lifecycle counters in Prometheus text format.
pub fn encode() -> Result<String, String> {
    let encoder = TextEncoder::new();
    let families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&families, &mut buffer)
        .map_err(|e| e.to_string())?;
    String::from_utf8(buffer).map_err(|e| e.to_string())
}

pub async fn lifecycle_metrics() -> impl Responder {
    match encode() {
        Ok(body) => HttpResponse::Ok()
            .content_type("text/plain; version=0.0.4")
            .body(body),
        Err(e) => {
            log::error!("Failed to encode lifecycle metrics: {}", e);
            HttpResponse::InternalServerError().finish()
        }
    }
}
