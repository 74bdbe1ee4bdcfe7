use axum::{
    Form, Json, Router,
    extract::{Query, State},
    response::Html,
    routing::{get, post},
};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::prediction::{PredictionOutcome, PredictionSession};
use crate::web::{
    AppState,
    error::AppError,
    models::{Mode, ModeQuery, PageContext, PredictApiRequest, PredictApiResponse, PredictionForm},
    views::{self, ABOUT_TEMPLATE, PREDICT_TEMPLATE},
};

pub fn create_page_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/about", get(about))
        .route("/predict", post(predict_form))
}

pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new().route("/predict", post(predict_json))
}

fn render_mode(app_state: &AppState, mode: Mode) -> Result<Html<String>, AppError> {
    let mut page = PageContext::new(mode);
    let template = match mode {
        Mode::AboutApp => ABOUT_TEMPLATE,
        Mode::SinglePrediction => {
            page.model_error = app_state.service.ensure_model().err().map(|e| e.to_string());
            PREDICT_TEMPLATE
        }
    };
    Ok(Html(views::render(&app_state.templates, template, &page)?))
}

async fn index(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<ModeQuery>,
) -> Result<Html<String>, AppError> {
    render_mode(&app_state, query.mode.unwrap_or_default())
}

async fn about(State(app_state): State<Arc<AppState>>) -> Result<Html<String>, AppError> {
    render_mode(&app_state, Mode::AboutApp)
}

async fn predict_form(
    State(app_state): State<Arc<AppState>>,
    Form(form): Form<PredictionForm>,
) -> Result<Html<String>, AppError> {
    debug!(form = ?form, "Received prediction form.");

    // One load attempt per submit; a missing model short-circuits the session.
    let model_error = app_state.service.ensure_model().err();
    let outcome = match &model_error {
        Some(e) => PredictionOutcome::from_result(Err(e.clone())),
        None => PredictionSession::new().submit(&app_state.service, form.to_request()),
    };
    if let PredictionOutcome::Failure { message } = &outcome {
        warn!(error = %message, "Prediction failed.");
    }

    let mut page = PageContext::new(Mode::SinglePrediction);
    page.model_error = model_error.map(|e| e.to_string());
    page.celebrate = outcome.celebrate();
    page.outcome = Some(outcome);
    page.form = form;

    Ok(Html(views::render(&app_state.templates, PREDICT_TEMPLATE, &page)?))
}

async fn predict_json(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<PredictApiRequest>,
) -> Result<Json<PredictApiResponse>, AppError> {
    let salary = app_state.service.predict_fields(
        payload.years,
        payload.job_rate,
        payload.overtime_hours,
        &payload.department,
        &payload.country,
    )?;

    Ok(Json(PredictApiResponse {
        salary: salary.amount(),
        formatted: salary.to_string(),
    }))
}
