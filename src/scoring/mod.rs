mod errors;
mod report;
mod scorer;
#[cfg(test)]
mod tests;

pub use errors::ScoreError;
pub use report::{GroupRisk, ScoredTable};
pub use scorer::{score, Score};
