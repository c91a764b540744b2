use actix_web::{HttpResponse, Result as ActixResult, web};

use crate::models::{ApiResponse, AppStartTime, HealthResponse};

pub async fn health(start_time: web::Data<AppStartTime>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(ApiResponse::success(
        HealthResponse {
            status: "ok".to_string(),
            uptime_seconds: start_time.uptime_seconds(),
        },
        "OK",
    )))
}

pub fn configure_health_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/api/v1/health", web::get().to(health));
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test};

    #[actix_web::test]
    async fn test_health_reports_uptime() {
        let start = AppStartTime {
            start_datetime: chrono::Utc::now() - chrono::Duration::seconds(42),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(start))
                .configure(configure_health_routes),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["data"]["status"], "ok");
        assert!(body["data"]["uptime_seconds"].as_i64().unwrap() >= 42);
    }
}
