pub mod error;
pub mod model;
pub mod request;
pub mod salary;
pub mod service;
pub mod session;

pub use error::PredictionError;
pub use model::{ModelError, ModelProvider, SalaryModel};
pub use request::{Country, Department, PredictionRequest};
pub use salary::Salary;
pub use service::PredictionService;
pub use session::{HandlerState, PredictionOutcome, PredictionSession};
