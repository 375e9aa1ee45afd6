use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};
use service::errors::ServiceError;

// Prometheus metrics (default registry)
pub static RECORD_OPS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "dose_registry_record_ops_total",
        "Record operations by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register record_ops_total")
});

fn outcome(err: &ServiceError) -> &'static str {
    match err {
        ServiceError::NotFound(_) => "not_found",
        ServiceError::Storage(_) => "storage_error",
        e if e.is_validation() => "rejected",
        _ => "error",
    }
}

/// Count one finished record operation.
pub fn observe<T>(op: &str, result: &Result<T, ServiceError>) {
    let label = match result {
        Ok(_) => "ok",
        Err(e) => outcome(e),
    };
    RECORD_OPS_TOTAL.with_label_values(&[op, label]).inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, format!("metrics encode error: {e}"));
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_outcome() {
        let ok: Result<(), ServiceError> = Ok(());
        let miss: Result<(), ServiceError> = Err(ServiceError::not_found("record"));
        let before_ok = RECORD_OPS_TOTAL.with_label_values(&["probe", "ok"]).get();
        observe("probe", &ok);
        observe("probe", &miss);
        assert_eq!(RECORD_OPS_TOTAL.with_label_values(&["probe", "ok"]).get(), before_ok + 1);
        assert!(RECORD_OPS_TOTAL.with_label_values(&["probe", "not_found"]).get() >= 1);

        let (status, text) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(text.contains("dose_registry_record_ops_total"));
    }
}
