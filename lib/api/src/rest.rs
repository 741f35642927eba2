use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use serde::Deserialize;
use std::sync::Arc;
use tasador_core::{Error, Row, Table, TableRole};
use tasador_io::report_to_bytes;
use tasador_matching::{MatchConfig, PricingEngine, PricingReport, Strategy};
use tracing::{info, warn};

const XLSX_CONTENT_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Deserialize)]
pub struct PriceRequest {
    pub reference: Vec<Row>,
    pub query: Vec<Row>,
    /// Parsed case-insensitively; defaults to lexical
    pub strategy: Option<String>,
    pub threshold: Option<f64>,
    pub exact_code_match: Option<bool>,
}

impl PriceRequest {
    fn config(&self) -> Result<MatchConfig, Error> {
        let strategy = match self.strategy.as_deref() {
            Some(name) => name.parse::<Strategy>()?,
            None => Strategy::default(),
        };
        let mut config = MatchConfig::new(strategy).with_exact_code_match(self.exact_code_match.unwrap_or(false));
        if let Some(threshold) = self.threshold {
            config = config.with_threshold(threshold);
        }
        Ok(config)
    }
}

pub struct RestApi;

impl RestApi {
    pub async fn start(engine: Arc<PricingEngine>, port: u16) -> std::io::Result<()> {
        info!(port, "Starting REST server");
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(engine.clone()))
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register the routes; the app must carry `web::Data<Arc<PricingEngine>>`
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .route("/price", web::post().to(price))
        .route("/price/xlsx", web::post().to(price_xlsx));
}

async fn health() -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "status": "ok"
    })))
}

async fn price(
    engine: web::Data<Arc<PricingEngine>>,
    req: web::Json<PriceRequest>,
) -> ActixResult<HttpResponse> {
    match run_pricing(engine, req.into_inner()).await {
        Ok(report) => Ok(HttpResponse::Ok().json(report)),
        Err(resp) => Ok(resp),
    }
}

/// Same as `/price`, answered with the result workbook
async fn price_xlsx(
    engine: web::Data<Arc<PricingEngine>>,
    req: web::Json<PriceRequest>,
) -> ActixResult<HttpResponse> {
    let report = match run_pricing(engine, req.into_inner()).await {
        Ok(report) => report,
        Err(resp) => return Ok(resp),
    };

    match report_to_bytes(&report) {
        Ok(bytes) => Ok(HttpResponse::Ok()
            .content_type(XLSX_CONTENT_TYPE)
            .insert_header(("Content-Disposition", "attachment; filename=\"resultado.xlsx\""))
            .body(bytes)),
        Err(e) => {
            warn!(error = %e, "Failed to build result workbook");
            Ok(internal_error(&e))
        }
    }
}

async fn run_pricing(
    engine: web::Data<Arc<PricingEngine>>,
    req: PriceRequest,
) -> Result<PricingReport, HttpResponse> {
    let config = req.config().map_err(|e| bad_request(&e))?;
    let reference = Table::with_rows(TableRole::Reference, req.reference);
    let query = Table::with_rows(TableRole::Query, req.query);

    // matching is CPU bound and may load the embedding model
    let engine = engine.get_ref().clone();
    let outcome = web::block(move || engine.run(&reference, &query, &config)).await;

    match outcome {
        Ok(Ok(report)) => Ok(report),
        Ok(Err(e)) if e.is_configuration() => Err(bad_request(&e)),
        Ok(Err(e)) => {
            warn!(error = %e, "Pricing request failed");
            Err(internal_error(&e))
        }
        Err(e) => Err(internal_error(&e)),
    }
}

fn bad_request(e: &Error) -> HttpResponse {
    HttpResponse::BadRequest().json(serde_json::json!({
        "error": e.to_string()
    }))
}

fn internal_error(e: &dyn std::fmt::Display) -> HttpResponse {
    HttpResponse::InternalServerError().json(serde_json::json!({
        "error": e.to_string()
    }))
}
