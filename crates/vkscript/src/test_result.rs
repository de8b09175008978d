//! Per-script and per-command test outcomes
//!
//! Commands report individual outcomes which are merged into one overall
//! result per script. Skips come from unmet device requirements.

use std::fmt;

/// Outcome of a single command or a whole script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestResult {
    /// Every executed check succeeded
    Pass,
    /// At least one check or setup step failed
    Fail,
    /// The test could not run (missing feature, extension or format)
    Skip,
}

impl TestResult {
    /// Combine two outcomes into one.
    ///
    /// `Fail` absorbs everything; `Pass` wins over `Skip`; two skips stay
    /// a skip. The operation is associative and commutative.
    pub fn merge(self, other: TestResult) -> TestResult {
        match (self, other) {
            (TestResult::Fail, _) | (_, TestResult::Fail) => TestResult::Fail,
            (TestResult::Pass, _) | (_, TestResult::Pass) => TestResult::Pass,
            (TestResult::Skip, TestResult::Skip) => TestResult::Skip,
        }
    }
}

impl fmt::Display for TestResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestResult::Pass => "pass",
            TestResult::Fail => "fail",
            TestResult::Skip => "skip",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::TestResult::{Fail, Pass, Skip};

    #[test]
    fn test_fail_absorbs() {
        for r in [Pass, Fail, Skip] {
            assert_eq!(Fail.merge(r), Fail);
            assert_eq!(r.merge(Fail), Fail);
        }
    }

    #[test]
    fn test_pass_beats_skip() {
        assert_eq!(Skip.merge(Pass), Pass);
        assert_eq!(Pass.merge(Skip), Pass);
        assert_eq!(Skip.merge(Skip), Skip);
        assert_eq!(Pass.merge(Pass), Pass);
    }

    #[test]
    fn test_merge_is_associative() {
        let all = [Pass, Fail, Skip];
        for a in all {
            for b in all {
                for c in all {
                    assert_eq!(a.merge(b).merge(c), a.merge(b.merge(c)));
                }
            }
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Pass.to_string(), "pass");
        assert_eq!(Fail.to_string(), "fail");
        assert_eq!(Skip.to_string(), "skip");
    }
}
