use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::{DrawService, RedemptionService, TicketService};
use crate::utils::validation_errors_to_app_error;
use actix_web::{web, HttpResponse};
use bid_lotto_shared::{
    CheckTicketRequest, RedeemRequest, TicketResponse, TicketStatus, UpdateTicketRequest, ERROR_ADMIN_ONLY,
};
use tracing::debug;
use validator::Validate;

/// All tickets
pub async fn list_tickets(ticket_service: web::Data<TicketService>) -> Result<HttpResponse, AppError> {
    let tickets: Vec<TicketResponse> = ticket_service.list_all().await?.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(tickets))
}

/// Tickets in one status, given by name (`available`) or code (`0`)
pub async fn list_tickets_by_status(
    status: web::Path<String>,
    ticket_service: web::Data<TicketService>,
) -> Result<HttpResponse, AppError> {
    let status: TicketStatus = status.parse().map_err(AppError::Validation)?;

    let tickets: Vec<TicketResponse> = ticket_service
        .list_by_status(status)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(tickets))
}

pub async fn get_ticket(
    ticket_id: web::Path<i64>,
    ticket_service: web::Data<TicketService>,
) -> Result<HttpResponse, AppError> {
    let ticket = ticket_service.get_by_id(*ticket_id).await?;
    Ok(HttpResponse::Ok().json(TicketResponse::from(ticket)))
}

/// Admin: merge fields onto a ticket
pub async fn update_ticket(
    user: AuthenticatedUser,
    ticket_id: web::Path<i64>,
    request: web::Json<UpdateTicketRequest>,
    ticket_service: web::Data<TicketService>,
) -> Result<HttpResponse, AppError> {
    if !user.is_admin() {
        return Err(AppError::Authorization(ERROR_ADMIN_ONLY.to_string()));
    }
    request.validate().map_err(validation_errors_to_app_error)?;

    let ticket = ticket_service.update_fields(*ticket_id, request.into_inner()).await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Lotto updated successfully",
        "lotto": TicketResponse::from(ticket),
    })))
}

/// Whether a number won, optionally on a given draw date
pub async fn check_ticket(
    request: web::Json<CheckTicketRequest>,
    draw_service: web::Data<DrawService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    let result = draw_service.check(&request.number, request.date.as_deref()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// Claim the prize of an owned, winning ticket
pub async fn redeem_ticket(
    user: AuthenticatedUser,
    request: web::Json<RedeemRequest>,
    redemption_service: web::Data<RedemptionService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    debug!("User {} redeeming ticket {}", user.user_id, request.number);

    let result = redemption_service.redeem(user.user_id, &request.number).await?;
    Ok(HttpResponse::Ok().json(result))
}
