use once_cell::sync::Lazy;
use prometheus::{register_int_counter, IntCounter};

// Prometheus metrics (default registry)
pub static RECORDS_CREATED_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bike_registry_records_created_total",
        "Total records accepted by the store"
    )
    .expect("register records_created_total")
});

pub static VALIDATION_REJECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bike_registry_validation_rejections_total",
        "Total create requests rejected for invalid fields"
    )
    .expect("register validation_rejections_total")
});

pub static STORAGE_ERRORS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "bike_registry_storage_errors_total",
        "Total store operations that failed for infrastructure reasons"
    )
    .expect("register storage_errors_total")
});

/// Force registration so `/metrics` lists every series from the first scrape.
pub fn init() {
    Lazy::force(&RECORDS_CREATED_TOTAL);
    Lazy::force(&VALIDATION_REJECTIONS_TOTAL);
    Lazy::force(&STORAGE_ERRORS_TOTAL);
}
