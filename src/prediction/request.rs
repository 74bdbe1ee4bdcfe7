use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use super::error::PredictionError;
use super::model::{FeatureValue, ModelRecord};

pub const YEARS_RANGE: RangeInclusive<u32> = 0..=50;
pub const JOB_RATE_RANGE: RangeInclusive<f64> = 0.0..=10.0;
pub const OVERTIME_HOURS_RANGE: RangeInclusive<u32> = 0..=300;

// Record keys expected by the exported model.
pub const FIELD_YEARS: &str = "Years";
pub const FIELD_JOB_RATE: &str = "Job Rate";
pub const FIELD_OVERTIME_HOURS: &str = "Overtime Hours";
pub const FIELD_DEPARTMENT: &str = "Department";
pub const FIELD_COUNTRY: &str = "Country";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "Quality Control")]
    QualityControl,
    #[serde(rename = "Major Mfg Projects")]
    MajorMfgProjects,
    #[serde(rename = "Manufacturing")]
    Manufacturing,
}

impl Department {
    pub const ALL: [Department; 3] = [
        Department::QualityControl,
        Department::MajorMfgProjects,
        Department::Manufacturing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Department::QualityControl => "Quality Control",
            Department::MajorMfgProjects => "Major Mfg Projects",
            Department::Manufacturing => "Manufacturing",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == label)
            .ok_or_else(|| PredictionError::InvalidInput(format!("Unknown department: '{label}'")))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Country {
    #[serde(rename = "Egypt")]
    Egypt,
    #[serde(rename = "Saudi Arabia")]
    SaudiArabia,
    #[serde(rename = "United Arab Emirates")]
    UnitedArabEmirates,
}

impl Country {
    pub const ALL: [Country; 3] = [
        Country::Egypt,
        Country::SaudiArabia,
        Country::UnitedArabEmirates,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Country::Egypt => "Egypt",
            Country::SaudiArabia => "Saudi Arabia",
            Country::UnitedArabEmirates => "United Arab Emirates",
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Country {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Country::ALL
            .into_iter()
            .find(|c| c.as_str() == label)
            .ok_or_else(|| PredictionError::InvalidInput(format!("Unknown country: '{label}'")))
    }
}

/// One salary estimate request. Only constructible with all five fields in
/// range, and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionRequest {
    years: u32,
    job_rate: f64,
    overtime_hours: u32,
    department: Department,
    country: Country,
}

impl PredictionRequest {
    pub fn new(
        years: u32,
        job_rate: f64,
        overtime_hours: u32,
        department: Department,
        country: Country,
    ) -> Result<Self, PredictionError> {
        if !YEARS_RANGE.contains(&years) {
            return Err(PredictionError::InvalidInput(format!(
                "Years at company must be between {} and {}, got {years}",
                YEARS_RANGE.start(),
                YEARS_RANGE.end()
            )));
        }
        if !job_rate.is_finite() || !JOB_RATE_RANGE.contains(&job_rate) {
            return Err(PredictionError::InvalidInput(format!(
                "Job rate must be between {:.1} and {:.1}, got {job_rate}",
                JOB_RATE_RANGE.start(),
                JOB_RATE_RANGE.end()
            )));
        }
        if !OVERTIME_HOURS_RANGE.contains(&overtime_hours) {
            return Err(PredictionError::InvalidInput(format!(
                "Overtime hours must be between {} and {}, got {overtime_hours}",
                OVERTIME_HOURS_RANGE.start(),
                OVERTIME_HOURS_RANGE.end()
            )));
        }

        Ok(Self {
            years,
            job_rate,
            overtime_hours,
            department,
            country,
        })
    }

    pub fn years(&self) -> u32 {
        self.years
    }

    pub fn job_rate(&self) -> f64 {
        self.job_rate
    }

    pub fn overtime_hours(&self) -> u32 {
        self.overtime_hours
    }

    pub fn department(&self) -> Department {
        self.department
    }

    pub fn country(&self) -> Country {
        self.country
    }

    /// The single-row record handed to the model.
    pub fn to_record(&self) -> ModelRecord {
        let mut record = ModelRecord::new();
        record.insert(FIELD_YEARS, FeatureValue::Integer(i64::from(self.years)));
        record.insert(FIELD_JOB_RATE, FeatureValue::Float(self.job_rate));
        record.insert(
            FIELD_OVERTIME_HOURS,
            FeatureValue::Integer(i64::from(self.overtime_hours)),
        );
        record.insert(FIELD_DEPARTMENT, FeatureValue::Text(self.department.as_str().to_string()));
        record.insert(FIELD_COUNTRY, FeatureValue::Text(self.country.as_str().to_string()));
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries_are_accepted() {
        for (years, job_rate, overtime) in [(0, 0.0, 0), (50, 10.0, 300)] {
            let request = PredictionRequest::new(
                years,
                job_rate,
                overtime,
                Department::Manufacturing,
                Country::Egypt,
            );
            assert!(request.is_ok(), "{years}/{job_rate}/{overtime} should be accepted");
        }
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let cases = [(51, 3.0, 20), (1, 10.5, 20), (1, -0.1, 20), (1, f64::NAN, 20), (1, 3.0, 301)];
        for (years, job_rate, overtime) in cases {
            let result = PredictionRequest::new(
                years,
                job_rate,
                overtime,
                Department::QualityControl,
                Country::SaudiArabia,
            );
            assert!(
                matches!(result, Err(PredictionError::InvalidInput(_))),
                "{years}/{job_rate}/{overtime} should be rejected"
            );
        }
    }

    #[test]
    fn test_categories_parse_only_exact_labels() {
        assert_eq!("Major Mfg Projects".parse::<Department>().unwrap(), Department::MajorMfgProjects);
        assert_eq!(" United Arab Emirates ".parse::<Country>().unwrap(), Country::UnitedArabEmirates);

        let err = "Finance".parse::<Department>().unwrap_err();
        assert_eq!(err, PredictionError::InvalidInput("Unknown department: 'Finance'".to_string()));
        assert!("egypt".parse::<Country>().is_err());
    }

    #[test]
    fn test_record_uses_model_field_names() {
        let request =
            PredictionRequest::new(1, 3.0, 20, Department::Manufacturing, Country::Egypt).unwrap();
        let record = request.to_record();

        assert_eq!(
            record.names().collect::<Vec<_>>(),
            vec!["Years", "Job Rate", "Overtime Hours", "Department", "Country"]
        );
        assert_eq!(record.get("Years"), Some(&FeatureValue::Integer(1)));
        assert_eq!(record.get("Job Rate"), Some(&FeatureValue::Float(3.0)));
        assert_eq!(record.get("Overtime Hours"), Some(&FeatureValue::Integer(20)));
        assert_eq!(
            record.get("Department"),
            Some(&FeatureValue::Text("Manufacturing".to_string()))
        );
        assert_eq!(record.get("Country"), Some(&FeatureValue::Text("Egypt".to_string())));
    }
}
