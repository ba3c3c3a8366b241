use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use exponentiator::config::clamp_compound_pct;

use crate::state::AppState;

pub const NOT_APPLICABLE: &str = "Not applicable";

/// Body of `POST /` and `POST /withdraw`. Every field is optional and an
/// empty body means all defaults.
#[derive(Debug, Default, Deserialize)]
pub struct TriggerRequest {
    #[serde(default)]
    pub compound_pct: Option<i64>,
    #[serde(default)]
    pub withdraw_interval_in_hours: Option<i64>,
}

impl TriggerRequest {
    pub fn parse(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    /// Defaults to 100; negatives become 0 and are rejected downstream.
    pub fn compound_pct(&self) -> u32 {
        clamp_compound_pct(self.compound_pct.unwrap_or(100))
    }

    pub fn withdraw_interval_hours(&self) -> Option<u64> {
        self.withdraw_interval_in_hours
            .map(|hours| u64::try_from(hours).unwrap_or(0))
    }
}

#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "ok",
        "service": state.service_name,
    }))
}

#[post("/")]
pub async fn check(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    trigger(&state, &body, false).await
}

#[post("/withdraw")]
pub async fn withdraw(state: web::Data<AppState>, body: web::Bytes) -> HttpResponse {
    trigger(&state, &body, true).await
}

async fn trigger(state: &AppState, body: &[u8], with_withdraw: bool) -> HttpResponse {
    let request = match TriggerRequest::parse(body) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "rejected malformed trigger body");
            return HttpResponse::BadRequest().json(serde_json::json!({
                "error": format!("invalid request body: {e}"),
            }));
        }
    };
    let compound_pct = request.compound_pct();

    let mut app = state.exponentiator.lock().await;

    let check_results = match app.execute_check(compound_pct).await {
        Ok(status) => status,
        Err(e) => {
            tracing::error!(error = %e, "check failed");
            format!("Failed: {e}")
        }
    };

    let withdraw_results = match (with_withdraw, request.withdraw_interval_hours()) {
        (true, Some(hours)) => match app.execute_withdraw(compound_pct, hours).await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!(error = %e, "withdraw failed");
                format!("Failed: {e}")
            }
        },
        _ => NOT_APPLICABLE.to_string(),
    };
    drop(app);

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(render_page(&state.service_name, &check_results, &withdraw_results))
}

pub fn render_page(service_name: &str, check_results: &str, withdraw_results: &str) -> String {
    format!(
        "<html><head><title>Exponentiator</title></head><body>\
         <p>{}<br/><br/>check results : {}<br/>withdraw results: {}</p>\
         </body></html>",
        escape_html(service_name),
        escape_html(check_results),
        escape_html(withdraw_results),
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
