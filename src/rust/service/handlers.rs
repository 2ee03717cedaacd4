use std::sync::Arc;

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};

use super::error::ApiError;
use super::scoring::{self, Categorization, ScoringMode};
use super::AppState;
use crate::forecast::{self, RiskLevel, Timeframe};
use crate::sms::{self, TransactionDetails};

pub const MAX_TEXT_CHARS: usize = 500;
pub const MAX_MERCHANT_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizeRequest {
    pub text: Option<String>,
    pub merchant: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictRequest {
    pub user_id: String,
    #[serde(default = "default_timeframe")]
    pub timeframe: String,
}

fn default_timeframe() -> String {
    Timeframe::Month.as_str().to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictResponse {
    pub timeframe: String,
    pub predicted_amount: u64,
    pub confidence: f64,
    pub risk_level: RiskLevel,
    pub factors: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    pub model_path: String,
    pub labels: Vec<String>,
    pub vocabulary_size: usize,
    pub scoring: ScoringMode,
}

/// Returns the trimmed text, or a validation error when it is missing or too long.
fn required_text(text: Option<&str>) -> Result<&str, ApiError> {
    let text = text.map(str::trim).unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::Validation("text must not be empty".into()));
    }
    if text.chars().count() > MAX_TEXT_CHARS {
        return Err(ApiError::Validation(format!(
            "text must be at most {} characters",
            MAX_TEXT_CHARS
        )));
    }
    Ok(text)
}

pub async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": "UPI SMS Classifier API running!" }))
}

/// Categorize a single SMS
pub async fn categorize_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CategorizeRequest>, JsonRejection>,
) -> Result<Json<Categorization>, ApiError> {
    let Json(request) = payload?;
    let text = required_text(request.text.as_deref())?;
    if let Some(merchant) = &request.merchant {
        if merchant.chars().count() > MAX_MERCHANT_CHARS {
            return Err(ApiError::Validation(format!(
                "merchant must be at most {} characters",
                MAX_MERCHANT_CHARS
            )));
        }
    }

    let result = scoring::categorize(&state.classifier, text, state.scoring, &mut rand::rng())?;
    log::debug!(
        "Categorized as {} ({:.2}) for user {:?}",
        result.category,
        result.confidence,
        request.user_id
    );
    Ok(Json(result))
}

/// Synthetic spending forecast
pub async fn predict_handler(
    payload: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    let Json(request) = payload?;
    let timeframe = Timeframe::parse_lenient(&request.timeframe);
    let result = forecast::forecast(timeframe, &mut rand::rng());

    Ok(Json(PredictResponse {
        timeframe: request.timeframe,
        predicted_amount: result.predicted_amount,
        confidence: result.confidence,
        risk_level: result.risk_level,
        factors: result.factors,
    }))
}

/// Extract transaction details from an SMS
pub async fn parse_handler(
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<TransactionDetails>, ApiError> {
    let Json(request) = payload?;
    let text = required_text(request.text.as_deref())?;
    Ok(Json(sms::parse_sms(text)))
}

pub async fn info_handler(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let info = state.classifier.info();
    Json(InfoResponse {
        model_path: state.model_path.display().to_string(),
        labels: info.class_labels,
        vocabulary_size: info.vocabulary_size,
        scoring: state.scoring,
    })
}
