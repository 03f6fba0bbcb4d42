pub mod answer;
pub mod app;
pub mod metrics;
