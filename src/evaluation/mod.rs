//! Stored evaluation periods.
//!
//! [`EvaluationService`] keeps one [`EvaluationBook`](crate::calculation::EvaluationBook)
//! per period in an [`EvaluationStore`](crate::store::EvaluationStore) and
//! reprices enrolled employees when an approved attendance change moves their
//! work rate.

mod service;

pub use service::EvaluationService;
