use tracing::{error, info, info_span, warn};
use uuid::Uuid;

use super::error::PredictionError;
use super::model::ModelProvider;
use super::request::{Country, Department, PredictionRequest};
use super::salary::Salary;

/// Turns a validated request into a salary estimate via the external model.
pub struct PredictionService {
    provider: ModelProvider,
}

impl PredictionService {
    pub fn new(provider: ModelProvider) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &ModelProvider {
        &self.provider
    }

    /// Loads the model if needed. Used at startup and by views that must
    /// know whether predictions can be served at all.
    pub fn ensure_model(&self) -> Result<(), PredictionError> {
        self.provider.get().map(|_| ()).map_err(PredictionError::from)
    }

    pub fn predict(&self, request: &PredictionRequest) -> Result<Salary, PredictionError> {
        let request_id = Uuid::new_v4();
        let span = info_span!("predict", %request_id);
        let _guard = span.enter();

        let model = self.provider.get().map_err(|e| {
            error!(error = %e, "Model is not available.");
            PredictionError::from(e)
        })?;

        let record = request.to_record();
        info!(
            record = %serde_json::to_string(&record).unwrap_or_default(),
            "Invoking model."
        );

        let amount = model.predict(&record).map_err(|e| {
            warn!(error = %e, "Model rejected the record.");
            PredictionError::from(e)
        })?;

        if !amount.is_finite() {
            warn!(amount, "Model returned a non-finite value.");
            return Err(PredictionError::Model(format!(
                "model returned a non-finite value ({amount})"
            )));
        }

        info!(amount, "Prediction successful.");
        Ok(Salary::new(amount))
    }

    /// Validates raw field values before predicting.
    pub fn predict_fields(
        &self,
        years: u32,
        job_rate: f64,
        overtime_hours: u32,
        department: &str,
        country: &str,
    ) -> Result<Salary, PredictionError> {
        let department: Department = department.parse()?;
        let country: Country = country.parse()?;
        let request = PredictionRequest::new(years, job_rate, overtime_hours, department, country)?;
        self.predict(&request)
    }
}
