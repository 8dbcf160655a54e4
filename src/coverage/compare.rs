use super::{CoverageError, Percentage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    /// True when the PR lowered coverage
    pub decreased: bool,
    /// PR coverage minus base coverage, rounded to two decimals
    pub diff: Percentage,
}

/// Compares base and PR coverage given as text.
///
/// `decreased` is a strict negative check on the rounded diff, so a drift
/// below 0.005 points counts as unchanged.
pub fn compare(base: &str, pr: &str) -> Result<Comparison, CoverageError> {
    Ok(Comparison::between(base.parse()?, pr.parse()?))
}

impl Comparison {
    pub fn between(base: Percentage, pr: Percentage) -> Self {
        let diff = Percentage::new(pr.value() - base.value()).rounded();
        Self {
            decreased: diff.is_negative(),
            diff,
        }
    }
}
