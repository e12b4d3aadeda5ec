// AwardBench Schemas
//
// Decision: This crate is the source of truth for the benchmark-result record
// Decision: No runtime logic beyond validation - only type definitions and serialization
// Decision: Validation hands out a borrowed witness; renderers accept only the witness

pub mod benchmark;
pub mod validation;

// Re-exports for convenience
pub use benchmark::{BenchmarkResult, MetricDescriptor, ModelEntry};
pub use validation::{Validated, ValidationError};
