use crate::error::AppError;
use crate::middleware::AuthenticatedUser;
use crate::services::{AdminService, DrawService, TicketService};
use crate::utils::validation_errors_to_app_error;
use actix_web::{web, HttpResponse};
use bid_lotto_shared::{
    DrawPrizeResponse, DrawRequest, DrawResponse, DrawStrategy, GenerateTicketsRequest, GenerateTicketsResponse,
    SUCCESS_RESET,
};
use tracing::info;
use validator::Validate;

/// Replace the ticket inventory
pub async fn generate_lotto(
    user: AuthenticatedUser,
    request: web::Json<GenerateTicketsRequest>,
    ticket_service: web::Data<TicketService>,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    info!("Admin {} generating {} tickets", user.user_id, request.count);

    let tickets = ticket_service
        .generate(request.count, request.price, request.expired_date)
        .await?;
    let numbers: Vec<String> = tickets.into_iter().map(|ticket| ticket.number).collect();

    Ok(HttpResponse::Created().json(GenerateTicketsResponse {
        message: format!("Generated {} lottos", numbers.len()),
        count: numbers.len(),
        numbers,
    }))
}

/// Draw winners with the requested or configured strategy
pub async fn draw_random_number(
    user: AuthenticatedUser,
    request: web::Json<DrawRequest>,
    draw_service: web::Data<DrawService>,
) -> Result<HttpResponse, AppError> {
    run_draw(user, request.into_inner(), None, &draw_service).await
}

/// Draw winners from the current inventory
pub async fn draw_random_from_lottos(
    user: AuthenticatedUser,
    request: web::Json<DrawRequest>,
    draw_service: web::Data<DrawService>,
) -> Result<HttpResponse, AppError> {
    run_draw(user, request.into_inner(), Some(DrawStrategy::FromInventory), &draw_service).await
}

async fn run_draw(
    user: AuthenticatedUser,
    request: DrawRequest,
    forced: Option<DrawStrategy>,
    draw_service: &DrawService,
) -> Result<HttpResponse, AppError> {
    request.validate().map_err(validation_errors_to_app_error)?;

    let strategy = forced.or(request.strategy);
    info!(
        "Admin {} drawing {} prize(s) with {}",
        user.user_id,
        request.reward_points.len(),
        strategy.unwrap_or(draw_service.default_strategy())
    );

    let outcome = draw_service.draw(&request.reward_points, strategy).await?;
    let prizes: Vec<DrawPrizeResponse> = outcome.prizes.into_iter().map(Into::into).collect();

    Ok(HttpResponse::Ok().json(DrawResponse {
        message: format!("Drew {} prize(s)", prizes.len()),
        strategy: outcome.strategy,
        prizes,
        orders_closed: outcome.orders_closed,
    }))
}

/// Current prize table
pub async fn list_prizes(draw_service: web::Data<DrawService>) -> Result<HttpResponse, AppError> {
    let prizes: Vec<DrawPrizeResponse> = draw_service
        .current_prizes()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(HttpResponse::Ok().json(prizes))
}

/// Wipe everything but admin accounts
pub async fn reset(user: AuthenticatedUser, admin_service: web::Data<AdminService>) -> Result<HttpResponse, AppError> {
    info!("Admin {} requested a full reset", user.user_id);

    let summary = admin_service.reset().await?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": SUCCESS_RESET,
        "deleted": summary,
    })))
}
