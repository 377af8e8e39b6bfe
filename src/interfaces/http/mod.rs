use crate::application::BulkSheetGenerator;
use crate::domain::error::AppError;
use crate::domain::survey::{GenerationConfig, NegativeAsinScope, OutputLocale};
use crate::infrastructure::bulksheet_writer::{BulkSheetWriter, OutputFormat};
use crate::infrastructure::config::Settings;
use crate::infrastructure::survey::SurveyReader;
use actix_cors::Cors;
use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{dev::Server, get, post, web, App, HttpResponse, HttpServer, Responder, Scope};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::{Arc, Mutex};

const MAX_LOG_ENTRIES: usize = 100;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: String,
    pub source: String,
    pub message: String,
}

pub struct HttpState {
    pub settings: Settings,
    pub logs: Arc<Mutex<Vec<LogEntry>>>,
}

/// Per-request overrides of the configured generation settings
#[derive(Debug, Default, Deserialize)]
pub struct ConvertQuery {
    pub format: Option<OutputFormat>,
    pub locale: Option<OutputLocale>,
    pub negative_asin: Option<NegativeAsinScope>,
}

impl ConvertQuery {
    fn apply(&self, mut config: GenerationConfig) -> GenerationConfig {
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        if let Some(scope) = self.negative_asin {
            config.negative_asin_scope = scope;
        }
        config
    }
}

fn error_response(logs: &Mutex<Vec<LogEntry>>, source: &str, err: AppError) -> HttpResponse {
    add_log(logs, "ERROR", source, &err.to_string());

    match err {
        AppError::DuplicateKeywords(report) => HttpResponse::UnprocessableEntity().json(json!({
            "error": "duplicate_keywords",
            "message": report.to_string(),
            "duplicates": report.duplicates,
        })),
        AppError::UnreadableInput(msg) => HttpResponse::BadRequest().json(json!({
            "error": "unreadable_input",
            "message": msg,
        })),
        AppError::MissingColumn(msg) => HttpResponse::BadRequest().json(json!({
            "error": "missing_column",
            "message": msg,
        })),
        AppError::ValidationError(msg) => HttpResponse::BadRequest().json(json!({
            "error": "validation_error",
            "message": msg,
        })),
        other => HttpResponse::InternalServerError().json(json!({
            "error": "internal",
            "message": other.to_string(),
        })),
    }
}

#[post("/convert")]
async fn convert(
    data: web::Data<HttpState>,
    query: web::Query<ConvertQuery>,
    body: web::Bytes,
) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "Convert",
        &format!("Received survey ({} bytes)", body.len()),
    );

    let config = query.apply(data.settings.generation.clone());
    let format = query.format.unwrap_or_default();

    let result = web::block(move || {
        let table = SurveyReader::new().read_sniffed(&body)?;
        let sheet = BulkSheetGenerator::new(config)?.generate(&table)?;
        let bytes = BulkSheetWriter::new(format).write_to_bytes(&sheet)?;
        Ok::<_, AppError>((sheet.rows.len(), bytes))
    })
    .await;

    match result {
        Ok(Ok((rows, bytes))) => {
            add_log(
                &data.logs,
                "INFO",
                "Convert",
                &format!("Generated {} rows as {}", rows, format),
            );
            let file_name = format!(
                "{}.{}",
                data.settings.server.download_file_name,
                format.extension()
            );
            HttpResponse::Ok()
                .content_type(format.content_type())
                .insert_header(ContentDisposition {
                    disposition: DispositionType::Attachment,
                    parameters: vec![DispositionParam::Filename(file_name)],
                })
                .body(bytes)
        }
        Ok(Err(e)) => error_response(&data.logs, "Convert", e),
        Err(e) => error_response(&data.logs, "Convert", AppError::Internal(e.to_string())),
    }
}

#[post("/check")]
async fn check(data: web::Data<HttpState>, body: web::Bytes) -> impl Responder {
    add_log(
        &data.logs,
        "INFO",
        "Check",
        &format!("Received survey ({} bytes)", body.len()),
    );

    let config = data.settings.generation.clone();
    let result = web::block(move || {
        let table = SurveyReader::new().read_sniffed(&body)?;
        BulkSheetGenerator::new(config)?.plan(&table)
    })
    .await;

    match result {
        Ok(Ok(plan)) => {
            if !plan.duplicates.is_empty() {
                add_log(
                    &data.logs,
                    "WARN",
                    "Check",
                    &format!("Duplicate keywords: {}", plan.duplicates),
                );
            }
            HttpResponse::Ok().json(plan)
        }
        Ok(Err(e)) => error_response(&data.logs, "Check", e),
        Err(e) => error_response(&data.logs, "Check", AppError::Internal(e.to_string())),
    }
}

#[get("/logs")]
async fn get_logs(data: web::Data<HttpState>) -> impl Responder {
    let logs = data.logs.lock().unwrap_or_else(|e| e.into_inner());
    HttpResponse::Ok().json(&*logs)
}

#[get("/health")]
async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn add_log_entry(
    logs: &Mutex<Vec<LogEntry>>,
    level: &str,
    source: &str,
    message: &str,
) -> LogEntry {
    let entry = LogEntry {
        time: Local::now().format("%H:%M:%S").to_string(),
        level: level.to_string(),
        source: source.to_string(),
        message: message.to_string(),
    };
    let mut logs = logs.lock().unwrap_or_else(|e| e.into_inner());
    logs.push(entry.clone());
    if logs.len() > MAX_LOG_ENTRIES {
        logs.remove(0);
    }
    entry
}

pub fn add_log(logs: &Mutex<Vec<LogEntry>>, level: &str, source: &str, message: &str) {
    add_log_entry(logs, level, source, message);
}

fn api_scope() -> Scope {
    web::scope("/api")
        .service(convert)
        .service(check)
        .service(get_logs)
        .service(health)
}

pub fn start_server(settings: Settings, logs: Arc<Mutex<Vec<LogEntry>>>) -> std::io::Result<Server> {
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let max_upload_bytes = settings.server.max_upload_bytes;
    let state = web::Data::new(HttpState { settings, logs });

    let server = HttpServer::new(move || {
        let cors = Cors::permissive(); // Allow all origins for local tool

        App::new()
            .wrap(cors)
            .app_data(state.clone())
            .app_data(web::PayloadConfig::new(max_upload_bytes))
            .service(api_scope())
    })
    .bind((host.as_str(), port))?
    .run();

    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;

    fn state() -> web::Data<HttpState> {
        web::Data::new(HttpState {
            settings: Settings::default(),
            logs: Arc::new(Mutex::new(Vec::new())),
        })
    }

    const SURVEY: &str = "广告活动名称,CPC,SKU,广告组默认竞价,预算,备注,国家,host精准\n\
                          Host-Exact-EU,0.7,SKU-H,0.8,20,,,usb hub\n\
                          Host-Broad-EU,0.4,SKU-B,0.5,10,,,docking station\n";

    const DUPLICATED: &str = "广告活动名称,CPC,SKU,广告组默认竞价,预算,备注,国家,host精准\n\
                              Host-Exact-EU,0.7,SKU-H,0.8,20,,,usb hub\n\
                              Host-Broad-EU,0.4,SKU-B,0.5,10,,,usb hub\n";

    #[actix_web::test]
    async fn test_convert_returns_attachment() {
        let app = actix_test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/convert?format=csv&locale=en")
            .set_payload(SURVEY)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        let disposition = resp
            .headers()
            .get("content-disposition")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(disposition.contains("bulk-upload.csv"));

        let body = actix_test::read_body(resp).await;
        let text = String::from_utf8_lossy(&body);
        assert!(text.contains("Host-Exact-EU"));
        assert!(text.contains("usb hub"));
    }

    #[actix_web::test]
    async fn test_convert_query_overrides_locale_and_negative_asin_scope() {
        let survey = "广告活动名称,CPC,SKU,广告组默认竞价,预算,备注,国家,host精准,否定ASIN\n\
                      Host-Exact-EU,0.7,SKU-H,0.8,20,,,usb hub,B0NEG\n";
        let app = actix_test::init_service(App::new().app_data(state()).service(api_scope())).await;

        let req = actix_test::TestRequest::post()
            .uri("/api/convert?format=csv&locale=zh&negative_asin=all-campaigns")
            .set_payload(survey)
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        let text = String::from_utf8_lossy(&body);
        let negative_rows: Vec<&str> = text.lines().filter(|l| l.contains("否定商品定向")).collect();
        assert_eq!(negative_rows.len(), 1);
        assert!(negative_rows[0].contains("Host-Exact-EU"));
        assert!(negative_rows[0].contains("B0NEG"));
        assert!(text.contains("关键词"));

        // default scope keeps negative targets to product-target campaigns
        let req = actix_test::TestRequest::post()
            .uri("/api/convert?format=csv&locale=zh")
            .set_payload(survey)
            .to_request();
        let body = actix_test::call_and_read_body(&app, req).await;
        assert!(!String::from_utf8_lossy(&body).contains("否定商品定向"));
    }

    #[actix_web::test]
    async fn test_convert_rejects_duplicates() {
        let app = actix_test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/convert")
            .set_payload(DUPLICATED)
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "duplicate_keywords");
        assert_eq!(body["duplicates"][0]["value"], "usb hub");
        assert_eq!(body["duplicates"][0]["column_letter"], "H");
        assert_eq!(body["duplicates"][0]["count"], 2);
    }

    #[actix_web::test]
    async fn test_convert_missing_campaign_column() {
        let app = actix_test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/convert")
            .set_payload("name,sku\nx,y\n")
            .to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: serde_json::Value = actix_test::read_body_json(resp).await;
        assert_eq!(body["error"], "missing_column");
    }

    #[actix_web::test]
    async fn test_convert_empty_body_is_bad_request() {
        let app = actix_test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = actix_test::TestRequest::post().uri("/api/convert").to_request();
        let resp = actix_test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_check_reports_plan() {
        let app = actix_test::init_service(App::new().app_data(state()).service(api_scope())).await;
        let req = actix_test::TestRequest::post()
            .uri("/api/check")
            .set_payload(DUPLICATED)
            .to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["campaigns"].as_array().map(Vec::len), Some(2));
        assert_eq!(body["campaigns"][0]["classification"]["match_type"], "exact");
        assert_eq!(body["duplicates"]["duplicates"][0]["value"], "usb hub");
    }

    #[actix_web::test]
    async fn test_health_and_logs() {
        let state = state();
        let app = actix_test::init_service(App::new().app_data(state.clone()).service(api_scope())).await;

        let req = actix_test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = actix_test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "ok");

        let req = actix_test::TestRequest::post()
            .uri("/api/convert")
            .set_payload(SURVEY)
            .to_request();
        actix_test::call_service(&app, req).await;

        let req = actix_test::TestRequest::get().uri("/api/logs").to_request();
        let logs: Vec<LogEntry> = actix_test::call_and_read_body_json(&app, req).await;
        assert!(logs.iter().any(|l| l.source == "Convert"));
    }

    #[test]
    fn test_log_ring_is_bounded() {
        let logs = Mutex::new(Vec::new());
        for i in 0..(MAX_LOG_ENTRIES + 5) {
            add_log(&logs, "INFO", "Test", &format!("entry {}", i));
        }
        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), MAX_LOG_ENTRIES);
        assert_eq!(logs[0].message, "entry 5");
    }
}
