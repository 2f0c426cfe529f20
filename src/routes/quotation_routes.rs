use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::{
    controllers::QuotationController,
    dto::{
        api_response::ApiResponse,
        pagination::Paginated,
        quotation_dto::{
            CreateQuotationRequest, EstimateQuery, PaginationQuery, PriceEstimate,
            QuickQuoteQuery, QuickQuoteResponse, QuotationResponse, WhatsAppMessage,
        },
    },
    middleware::{auth_middleware, optional_auth_middleware, AuthenticatedUser},
    models::Service,
    state::AppState,
    utils::errors::AppError,
};

pub fn create_quotation_router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/services", get(list_services))
        .route("/quick-quote", get(quick_quote))
        .route("/estimate", get(estimate))
        .route("/:id", get(get_quotation))
        .route("/:id/whatsapp", get(whatsapp_message));

    let optional_auth = Router::new()
        .route("/", post(create_quotation))
        .route("/:id/accept", post(accept_quotation))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            optional_auth_middleware,
        ));

    let authenticated = Router::new()
        .route("/user/quotations", get(list_user_quotations))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware));

    public.merge(optional_auth).merge(authenticated)
}

fn user_id(user: Option<Extension<AuthenticatedUser>>) -> Option<Uuid> {
    user.map(|Extension(user)| user.user_id)
}

async fn list_services(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Service>>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.list_services().await?;
    Ok(Json(response))
}

async fn quick_quote(
    State(state): State<AppState>,
    Query(query): Query<QuickQuoteQuery>,
) -> Result<Json<ApiResponse<QuickQuoteResponse>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.quick_quote(query).await?;
    Ok(Json(response))
}

async fn estimate(
    State(state): State<AppState>,
    Query(query): Query<EstimateQuery>,
) -> Result<Json<ApiResponse<PriceEstimate>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.estimate(query).await?;
    Ok(Json(response))
}

async fn create_quotation(
    State(state): State<AppState>,
    user: Option<Extension<AuthenticatedUser>>,
    Json(request): Json<CreateQuotationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<QuotationResponse>>), AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.create(user_id(user), request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn get_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<QuotationResponse>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_user_quotations(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ApiResponse<Paginated<QuotationResponse>>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.list_for_user(user.user_id, query).await?;
    Ok(Json(response))
}

async fn accept_quotation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    user: Option<Extension<AuthenticatedUser>>,
) -> Result<Json<ApiResponse<QuotationResponse>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.accept(id, user_id(user)).await?;
    Ok(Json(response))
}

async fn whatsapp_message(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<WhatsAppMessage>>, AppError> {
    let controller = QuotationController::new(&state);
    let response = controller.whatsapp(id).await?;
    Ok(Json(response))
}
