pub mod admission;
pub mod aggregator;

pub use admission::{AdmissionError, AdmissionGate, GateConfig, QueueEntry, RequestId, SlotGuard};
pub use aggregator::{AggregatorError, PortfolioAggregator};
