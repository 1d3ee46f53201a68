use actix_web::{web, HttpResponse};
use log::error;
use super::AppState;
use crate::error::SlpError;
use crate::models::{AdapterStatus, FilterRequest, StatusResponse};

// Handles GET /slp as a liveness probe for the SLP adapter
#[actix_web::get("/slp")]
pub async fn get_status() -> HttpResponse {
    HttpResponse::Ok().json(StatusResponse {
        status: AdapterStatus { success: true },
    })
}

// Handles POST /slp/filterAndSortSlpTxs, splitting a block's TXIDs into SLP and non-SLP
#[actix_web::post("/slp/filterAndSortSlpTxs")]
pub async fn filter_and_sort_slp_txs(
    body: web::Json<FilterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, SlpError> {
    let filtered = state
        .classifier
        .filter_and_sort_slp_txs(&body.into_inner())
        .await
        .map_err(|e| {
            error!("Error in POST /slp/filterAndSortSlpTxs: {}", e);
            e
        })?;

    Ok(HttpResponse::Ok().json(filtered))
}
