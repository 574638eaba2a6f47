use once_cell::sync::Lazy;
use opentelemetry::{
    global,
    metrics::{Counter, Histogram},
    KeyValue,
};
use opentelemetry_sdk::metrics::SdkMeterProvider;
use prometheus::{Encoder, Registry, TextEncoder};

pub static METRICS: Lazy<TablemapMetrics> = Lazy::new(TablemapMetrics::init);

pub struct TablemapMetrics {
    pub registry: Registry,
    pub statements_generated: Counter<u64>,
    pub statements_executed: Counter<u64>,
    pub execute_duration: Histogram<f64>,
}

impl TablemapMetrics {
    pub fn init() -> Self {
        let registry = Registry::new();
        match opentelemetry_prometheus::exporter()
            .with_registry(registry.clone())
            .build()
        {
            Ok(exporter) => {
                let provider = SdkMeterProvider::builder().with_reader(exporter).build();
                global::set_meter_provider(provider);
            }
            Err(e) => log::warn!("Failed to build prometheus exporter: {e}"),
        }
        let meter = global::meter("tablemap");

        let statements_generated = meter
            .u64_counter("tablemap_statements_generated_total")
            .with_description("Statements built by the mapper")
            .build();

        let statements_executed = meter
            .u64_counter("tablemap_statements_executed_total")
            .with_description("Statements handed to the executor")
            .build();

        let execute_duration = meter
            .f64_histogram("tablemap_execute_duration_seconds")
            .with_description("Duration of executor calls")
            .build();

        Self {
            registry,
            statements_generated,
            statements_executed,
            execute_duration,
        }
    }

    pub fn record_generated(&self, operation: &'static str, count: usize) {
        self.statements_generated
            .add(count as u64, &[KeyValue::new("operation", operation)]);
    }

    pub fn record_execute(&self, elapsed: std::time::Duration) {
        self.statements_executed.add(1, &[]);
        self.execute_duration.record(elapsed.as_secs_f64(), &[]);
    }

    /// Current metrics in the Prometheus text format
    pub fn gather(&self) -> String {
        let mut buffer = Vec::new();
        if let Err(e) = TextEncoder::new().encode(&self.registry.gather(), &mut buffer) {
            log::warn!("Failed to encode metrics: {e}");
        }
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
