//! Conversion and download endpoints

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::header,
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use complendar_core::source::{fetch_csv, spreadsheet_export_url};
use complendar_core::{GuessedHeaders, SkippedRow, convert_csv};

use crate::routes::AppError;
use crate::state::AppState;

const FILE_PREFIX: &str = "complendar_";
const FILE_SUFFIX: &str = ".ics";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/convert", post(convert))
        .route("/download/{file}", get(download))
}

/// Request body for a conversion
#[derive(Deserialize)]
pub struct ConvertRequest {
    pub link: String,
}

/// Where to download the calendar, plus what was guessed on the way
#[derive(Serialize)]
pub struct ConvertResponse {
    pub file: String,
    pub guessed_headers: GuessedHeaders,
    pub event_count: usize,
    pub skipped_count: usize,
    pub skipped: Vec<SkippedRow>,
}

/// POST /api/convert - Convert a shared Google Sheet into a downloadable calendar
async fn convert(
    State(state): State<AppState>,
    payload: Result<Json<ConvertRequest>, JsonRejection>,
) -> Result<Json<ConvertResponse>, AppError> {
    let Json(request) = payload.map_err(|e| AppError::bad_request(anyhow!(e.body_text())))?;

    let url = spreadsheet_export_url(&request.link).map_err(AppError::bad_request)?;
    let csv = fetch_csv(&url).await.map_err(AppError::bad_request)?;

    let report = convert_csv(&csv, state.config());
    let (Some(document), Some(guessed_headers)) = (report.document, report.guessed_headers) else {
        let message = report.error.unwrap_or_else(|| "Conversion failed".to_string());
        return Err(AppError::bad_request(anyhow!(message)));
    };

    let filename = format!("{FILE_PREFIX}{}{FILE_SUFFIX}", Uuid::new_v4().simple());
    tokio::fs::write(state.output_dir().join(&filename), document).await?;
    tracing::info!(%filename, events = report.event_count, "calendar ready");

    Ok(Json(ConvertResponse {
        file: format!("/download/{filename}"),
        guessed_headers,
        event_count: report.event_count,
        skipped_count: report.skipped_count,
        skipped: report.skipped,
    }))
}

/// GET /download/{file} - Serve a calendar produced by /api/convert
async fn download(
    State(state): State<AppState>,
    Path(file): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Only names we generate, so the path can't leave the output directory
    if !is_generated_name(&file) {
        return Err(AppError::not_found(anyhow!("No such calendar: {file}")));
    }

    let bytes = match tokio::fs::read(state.output_dir().join(&file)).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::not_found(anyhow!("No such calendar: {file}")));
        }
        Err(e) => return Err(e.into()),
    };

    let headers = [
        (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{file}\"")),
    ];
    Ok((headers, bytes))
}

fn is_generated_name(file: &str) -> bool {
    file.strip_prefix(FILE_PREFIX)
        .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
        .is_some_and(|id| id.len() == 32 && id.chars().all(|c| c.is_ascii_hexdigit()))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use complendar_core::ComplendarConfig;

    use super::*;

    fn test_state(dir: &std::path::Path) -> AppState {
        AppState::new(ComplendarConfig::default(), dir.to_path_buf())
    }

    #[test]
    fn test_generated_names() {
        let name = format!("complendar_{}.ics", Uuid::new_v4().simple());
        assert!(is_generated_name(&name));

        assert!(!is_generated_name("complendar_.ics"));
        assert!(!is_generated_name("../etc/passwd"));
        assert!(!is_generated_name("complendar_../../secret.ics"));
        assert!(!is_generated_name("other_0123456789abcdef0123456789abcdef.ics"));
    }

    #[tokio::test]
    async fn test_download_existing_calendar() {
        let dir = tempfile::tempdir().unwrap();
        let name = format!("complendar_{}.ics", Uuid::new_v4().simple());
        std::fs::write(dir.path().join(&name), "BEGIN:VCALENDAR\r\nEND:VCALENDAR\r\n").unwrap();

        let response = download(State(test_state(dir.path())), Path(name.clone()))
            .await
            .map(IntoResponse::into_response)
            .unwrap_or_else(IntoResponse::into_response);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/calendar; charset=utf-8"
        );
        assert!(
            response.headers()[header::CONTENT_DISPOSITION]
                .to_str()
                .unwrap()
                .contains(&name)
        );
    }

    #[tokio::test]
    async fn test_download_unknown_calendar_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path());

        for file in [
            format!("complendar_{}.ics", Uuid::new_v4().simple()),
            "..%2Fsecret".to_string(),
        ] {
            let response = download(State(state.clone()), Path(file))
                .await
                .map(IntoResponse::into_response)
                .unwrap_or_else(IntoResponse::into_response);
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_convert_rejects_non_sheet_links() {
        let dir = tempfile::tempdir().unwrap();
        let request = Json(ConvertRequest {
            link: "https://example.com/birthdays.csv".to_string(),
        });

        let response = convert(State(test_state(dir.path())), Ok(request))
            .await
            .map(IntoResponse::into_response)
            .unwrap_or_else(IntoResponse::into_response);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
