/// Bounded-concurrency batch evaluation
pub mod dispatch;
/// Multi-step noisy forward evaluation
pub mod forward;
/// Target image and quadratic loss
pub mod loss;
/// Cost callback and optimizer traits
pub mod optimizer;
/// Candidate parameter sets
pub mod parameters;
