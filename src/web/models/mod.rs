use serde::{Deserialize, Serialize};

use crate::prediction::request::{JOB_RATE_RANGE, OVERTIME_HOURS_RANGE, YEARS_RANGE};
use crate::prediction::{Country, Department, PredictionError, PredictionOutcome, PredictionRequest};

/// Which view the page shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    #[serde(rename = "single")]
    SinglePrediction,
    #[serde(rename = "about")]
    AboutApp,
}

impl Mode {
    pub const ALL: [Mode; 2] = [Mode::SinglePrediction, Mode::AboutApp];

    pub fn value(&self) -> &'static str {
        match self {
            Mode::SinglePrediction => "single",
            Mode::AboutApp => "about",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Mode::SinglePrediction => "Single Prediction",
            Mode::AboutApp => "About App",
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ModeQuery {
    pub mode: Option<Mode>,
}

/// Raw form submission. Kept as text so a malformed number is reported
/// next to the form instead of rejected by the extractor. A field left out
/// of the body arrives empty and is rejected by `to_request`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionForm {
    #[serde(default)]
    pub years: String,
    #[serde(default)]
    pub job_rate: String,
    #[serde(default)]
    pub overtime_hours: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub country: String,
}

fn required<'a>(value: &'a str, label: &str) -> Result<&'a str, PredictionError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(PredictionError::InvalidInput(format!("{label} is required")));
    }
    Ok(value)
}

/// Values the form starts with before the user edits anything.
impl Default for PredictionForm {
    fn default() -> Self {
        Self {
            years: "1".to_string(),
            job_rate: "3.0".to_string(),
            overtime_hours: "20".to_string(),
            department: Department::ALL[0].as_str().to_string(),
            country: Country::ALL[0].as_str().to_string(),
        }
    }
}

impl PredictionForm {
    pub fn to_request(&self) -> Result<PredictionRequest, PredictionError> {
        let years = required(&self.years, "Years at company")?;
        let job_rate = required(&self.job_rate, "Job rate")?;
        let overtime_hours = required(&self.overtime_hours, "Overtime hours")?;
        let department = required(&self.department, "Department")?;
        let country = required(&self.country, "Country")?;

        let years = years.parse::<u32>().map_err(|_| {
            PredictionError::InvalidInput(format!(
                "Years at company must be a whole number, got '{years}'"
            ))
        })?;
        let job_rate = job_rate.parse::<f64>().map_err(|_| {
            PredictionError::InvalidInput(format!("Job rate must be a number, got '{job_rate}'"))
        })?;
        let overtime_hours = overtime_hours.parse::<u32>().map_err(|_| {
            PredictionError::InvalidInput(format!(
                "Overtime hours must be a whole number, got '{overtime_hours}'"
            ))
        })?;
        let department: Department = department.parse()?;
        let country: Country = country.parse()?;

        PredictionRequest::new(years, job_rate, overtime_hours, department, country)
    }
}

#[derive(Debug, Deserialize)]
pub struct PredictApiRequest {
    pub years: u32,
    pub job_rate: f64,
    pub overtime_hours: u32,
    pub department: String,
    pub country: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PredictApiResponse {
    pub salary: f64,
    pub formatted: String,
}

#[derive(Debug, Serialize)]
pub struct ModeLink {
    pub value: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct InputLimits {
    pub years_min: u32,
    pub years_max: u32,
    pub job_rate_min: f64,
    pub job_rate_max: f64,
    pub overtime_min: u32,
    pub overtime_max: u32,
}

impl Default for InputLimits {
    fn default() -> Self {
        Self {
            years_min: *YEARS_RANGE.start(),
            years_max: *YEARS_RANGE.end(),
            job_rate_min: *JOB_RATE_RANGE.start(),
            job_rate_max: *JOB_RATE_RANGE.end(),
            overtime_min: *OVERTIME_HOURS_RANGE.start(),
            overtime_max: *OVERTIME_HOURS_RANGE.end(),
        }
    }
}

/// Everything the page templates read.
#[derive(Debug, Serialize)]
pub struct PageContext {
    pub mode: &'static str,
    pub modes: Vec<ModeLink>,
    pub form: PredictionForm,
    pub limits: InputLimits,
    pub departments: Vec<&'static str>,
    pub countries: Vec<&'static str>,
    pub outcome: Option<PredictionOutcome>,
    pub celebrate: bool,
    pub model_error: Option<String>,
}

impl PageContext {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode: mode.value(),
            modes: Mode::ALL
                .iter()
                .map(|m| ModeLink {
                    value: m.value(),
                    label: m.label(),
                })
                .collect(),
            form: PredictionForm::default(),
            limits: InputLimits::default(),
            departments: Department::ALL.iter().map(Department::as_str).collect(),
            countries: Country::ALL.iter().map(Country::as_str).collect(),
            outcome: None,
            celebrate: false,
            model_error: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(years: &str, job_rate: &str, overtime: &str) -> PredictionForm {
        PredictionForm {
            years: years.to_string(),
            job_rate: job_rate.to_string(),
            overtime_hours: overtime.to_string(),
            ..PredictionForm::default()
        }
    }

    #[test]
    fn test_default_form_is_a_valid_request() {
        let request = PredictionForm::default().to_request().unwrap();
        assert_eq!(request.years(), 1);
        assert_eq!(request.job_rate(), 3.0);
        assert_eq!(request.overtime_hours(), 20);
        assert_eq!(request.department(), Department::QualityControl);
        assert_eq!(request.country(), Country::Egypt);
    }

    #[test]
    fn test_malformed_numbers_are_invalid_input() {
        for bad in [form("-1", "3", "20"), form("1", "abc", "20"), form("1", "3", "2.5"), form("", "3", "20")] {
            assert!(matches!(bad.to_request(), Err(PredictionError::InvalidInput(_))), "{bad:?}");
        }
        assert!(form(" 50 ", "10", "300").to_request().is_ok());
    }

    #[test]
    fn test_missing_fields_are_not_filled_in() {
        let partial: PredictionForm = serde_json::from_value(serde_json::json!({ "years": "7" })).unwrap();
        assert_eq!(partial.job_rate, "");
        assert_eq!(partial.country, "");
        assert_eq!(
            partial.to_request(),
            Err(PredictionError::InvalidInput("Job rate is required".to_string()))
        );

        let no_country = PredictionForm {
            country: "  ".to_string(),
            ..PredictionForm::default()
        };
        assert_eq!(
            no_country.to_request(),
            Err(PredictionError::InvalidInput("Country is required".to_string()))
        );
    }

    #[test]
    fn test_mode_query_values() {
        let about: ModeQuery = serde_json::from_value(serde_json::json!({ "mode": "about" })).unwrap();
        assert_eq!(about.mode, Some(Mode::AboutApp));
        assert_eq!(Mode::default().label(), "Single Prediction");
    }
}
