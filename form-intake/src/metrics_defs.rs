use shared::metrics_defs::{MetricDef, MetricType};

pub const SUBMISSIONS: MetricDef = MetricDef {
    name: "form.submissions",
    metric_type: MetricType::Counter,
    description: "Form submissions received. Tagged with outcome (teapot, invalid_method, redirected, error, unreadable_body).",
};

pub const REQUEST_DURATION: MetricDef = MetricDef {
    name: "request.duration",
    metric_type: MetricType::Histogram,
    description: "Request duration in seconds, including the spreadsheet append. Tagged with status.",
};

pub const ALL_METRICS: &[MetricDef] = &[SUBMISSIONS, REQUEST_DURATION];
