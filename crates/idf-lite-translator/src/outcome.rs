// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation results

use crate::diagnostics::{LogLevel, LogMessage};
use idf_lite_model::IdfError;
use serde::Serialize;

/// Overall result of a translation run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success,
    SuccessWithWarnings,
    Failure,
}

impl Outcome {
    /// Process exit code: 0 unless the run failed
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Success | Outcome::SuccessWithWarnings => 0,
            Outcome::Failure => 1,
        }
    }
}

/// Output of a translation run with its diagnostics
#[derive(Debug)]
pub struct TranslationResult<T> {
    pub outcome: Outcome,
    /// Translated output; `None` on failure
    pub output: Option<T>,
    /// Non-fatal messages collected during the run
    pub warnings: Vec<LogMessage>,
    /// The error that stopped the run
    pub error: Option<IdfError>,
}

impl<T> TranslationResult<T> {
    /// Successful run; the outcome reflects whether warnings were recorded
    pub fn success(output: T, warnings: Vec<LogMessage>) -> Self {
        let outcome = if warnings.iter().any(|m| m.level >= LogLevel::Warn) {
            Outcome::SuccessWithWarnings
        } else {
            Outcome::Success
        };
        Self {
            outcome,
            output: Some(output),
            warnings,
            error: None,
        }
    }

    /// Failed run
    pub fn failure(error: IdfError, warnings: Vec<LogMessage>) -> Self {
        Self {
            outcome: Outcome::Failure,
            output: None,
            warnings,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome != Outcome::Failure
    }

    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    /// Convert the output, keeping outcome and diagnostics
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> TranslationResult<U> {
        TranslationResult {
            outcome: self.outcome,
            output: self.output.map(f),
            warnings: self.warnings,
            error: self.error,
        }
    }

    /// Convert into a plain `Result`, dropping warnings
    pub fn into_result(self) -> idf_lite_model::Result<T> {
        match (self.output, self.error) {
            (_, Some(error)) => Err(error),
            (Some(output), None) => Ok(output),
            (None, None) => Err(IdfError::other("translation produced no output")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warning() -> LogMessage {
        LogMessage {
            level: LogLevel::Warn,
            component: "test".to_string(),
            message: "dangling schedule".to_string(),
        }
    }

    #[test]
    fn test_outcome_from_warnings() {
        let clean = TranslationResult::success(1, Vec::new());
        assert_eq!(clean.outcome, Outcome::Success);
        assert_eq!(clean.exit_code(), 0);

        let noisy = TranslationResult::success(1, vec![warning()]);
        assert_eq!(noisy.outcome, Outcome::SuccessWithWarnings);
        assert_eq!(noisy.exit_code(), 0);
    }

    #[test]
    fn test_failure() {
        let failed: TranslationResult<String> =
            TranslationResult::failure(IdfError::other("boom"), vec![warning()]);
        assert_eq!(failed.exit_code(), 1);
        assert!(!failed.is_success());
        assert_eq!(failed.warnings.len(), 1);
        assert!(failed.into_result().is_err());
    }

    #[test]
    fn test_map_keeps_diagnostics() {
        let result = TranslationResult::success(21, vec![warning()]).map(|n| n * 2);
        assert_eq!(result.output, Some(42));
        assert_eq!(result.outcome, Outcome::SuccessWithWarnings);
    }
}
