//! Deal domain - alert criteria evaluated per product and cycle

mod deal_evaluator;

pub use deal_evaluator::DealEvaluator;
