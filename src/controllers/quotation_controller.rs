use std::sync::Arc;

use uuid::Uuid;

use crate::{
    dto::{
        api_response::ApiResponse,
        pagination::Paginated,
        quotation_dto::{
            CreateQuotationRequest, EstimateQuery, PaginationQuery, PriceEstimate,
            QuickQuoteQuery, QuickQuoteResponse, QuotationResponse, WhatsAppMessage,
        },
    },
    models::Service,
    services::{PricingService, QuotationService},
    state::AppState,
    utils::errors::AppError,
};

pub struct QuotationController {
    quotations: Arc<QuotationService>,
    pricing: Arc<PricingService>,
}

impl QuotationController {
    pub fn new(state: &AppState) -> Self {
        Self {
            quotations: state.quotations.clone(),
            pricing: state.pricing.clone(),
        }
    }

    pub async fn list_services(&self) -> Result<ApiResponse<Vec<Service>>, AppError> {
        let services = self.pricing.list_services().await?;
        Ok(ApiResponse::success(services))
    }

    pub async fn quick_quote(
        &self,
        query: QuickQuoteQuery,
    ) -> Result<ApiResponse<QuickQuoteResponse>, AppError> {
        let quote = self.quotations.quick_quote(query).await?;
        Ok(ApiResponse::success(quote))
    }

    pub async fn estimate(
        &self,
        query: EstimateQuery,
    ) -> Result<ApiResponse<PriceEstimate>, AppError> {
        let estimate = self.quotations.estimate(query).await?;
        Ok(ApiResponse::success(estimate))
    }

    pub async fn create(
        &self,
        user_id: Option<Uuid>,
        request: CreateQuotationRequest,
    ) -> Result<ApiResponse<QuotationResponse>, AppError> {
        let quotation = self.quotations.create(request, user_id).await?;
        Ok(ApiResponse::success_with_message(
            quotation,
            "Cotización creada exitosamente",
        ))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<ApiResponse<QuotationResponse>, AppError> {
        let quotation = self.quotations.get(id).await?;
        Ok(ApiResponse::success(quotation))
    }

    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        query: PaginationQuery,
    ) -> Result<ApiResponse<Paginated<QuotationResponse>>, AppError> {
        let page = self
            .quotations
            .list_for_user(user_id, query.page, query.limit)
            .await?;
        Ok(ApiResponse::success(page))
    }

    pub async fn accept(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> Result<ApiResponse<QuotationResponse>, AppError> {
        let quotation = self.quotations.accept(id, user_id).await?;
        Ok(ApiResponse::success_with_message(
            quotation,
            "Cotización aceptada exitosamente",
        ))
    }

    pub async fn whatsapp(&self, id: Uuid) -> Result<ApiResponse<WhatsAppMessage>, AppError> {
        let message = self.quotations.whatsapp_message(id).await?;
        Ok(ApiResponse::success(message))
    }
}
