use prometheus::{Encoder, GaugeVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    pub assignments_total: IntCounterVec,
    pub transitions_total: IntCounterVec,
    pub shipments_by_status: GaugeVec,
    pub tracking_collisions_total: IntCounter,
}

impl Metrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let assignments_total = IntCounterVec::new(
            Opts::new("assignments_total", "Resource assignment attempts by outcome"),
            &["outcome"],
        )
        .expect("valid assignments_total metric");

        let transitions_total = IntCounterVec::new(
            Opts::new(
                "transitions_total",
                "Shipment status transitions by target status",
            ),
            &["status"],
        )
        .expect("valid transitions_total metric");

        let shipments_by_status = GaugeVec::new(
            Opts::new("shipments_by_status", "Current number of shipments per status"),
            &["status"],
        )
        .expect("valid shipments_by_status metric");

        let tracking_collisions_total = IntCounter::new(
            "tracking_collisions_total",
            "Tracking number generation collisions",
        )
        .expect("valid tracking_collisions_total metric");

        registry
            .register(Box::new(assignments_total.clone()))
            .expect("register assignments_total");
        registry
            .register(Box::new(transitions_total.clone()))
            .expect("register transitions_total");
        registry
            .register(Box::new(shipments_by_status.clone()))
            .expect("register shipments_by_status");
        registry
            .register(Box::new(tracking_collisions_total.clone()))
            .expect("register tracking_collisions_total");

        Self {
            registry,
            assignments_total,
            transitions_total,
            shipments_by_status,
            tracking_collisions_total,
        }
    }

    pub fn encode(&self) -> Result<String, String> {
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        TextEncoder::new()
            .encode(&metric_families, &mut buffer)
            .map_err(|err| format!("failed to encode metrics: {err}"))?;

        String::from_utf8(buffer).map_err(|err| format!("metrics are not valid utf8: {err}"))
    }
}
