// Observability: structured logging setup and pipeline metrics

pub mod metrics;

pub use metrics::{init_metrics, render_metrics};

pub use crate::logging::init_logging;
