use serde::Serialize;

use super::error::PredictionError;
use super::request::PredictionRequest;
use super::salary::Salary;
use super::service::PredictionService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerState {
    Idle,
    Predicting,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Success { salary: Salary, formatted: String },
    Failure { message: String },
}

impl PredictionOutcome {
    pub fn from_result(result: Result<Salary, PredictionError>) -> Self {
        match result {
            Ok(salary) => PredictionOutcome::Success {
                formatted: salary.to_string(),
                salary,
            },
            Err(e) => PredictionOutcome::Failure {
                message: e.to_string(),
            },
        }
    }

    /// Only a successful prediction gets the celebratory acknowledgement.
    pub fn celebrate(&self) -> bool {
        matches!(self, PredictionOutcome::Success { .. })
    }
}

/// One user's predict interaction. Every submission returns to `Idle`,
/// whatever the model did.
#[derive(Debug)]
pub struct PredictionSession {
    state: HandlerState,
}

impl Default for PredictionSession {
    fn default() -> Self {
        Self::new()
    }
}

impl PredictionSession {
    pub fn new() -> Self {
        Self {
            state: HandlerState::Idle,
        }
    }

    pub fn state(&self) -> HandlerState {
        self.state
    }

    /// Runs one prediction. An invalid request is reported the same way as
    /// a model failure so the form stays usable.
    pub fn submit(
        &mut self,
        service: &PredictionService,
        request: Result<PredictionRequest, PredictionError>,
    ) -> PredictionOutcome {
        self.state = HandlerState::Predicting;
        let result = request.and_then(|r| service.predict(&r));
        self.state = HandlerState::Idle;
        PredictionOutcome::from_result(result)
    }
}
