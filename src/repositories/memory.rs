//! Repositorios en memoria
//!
//! Misma semántica que las implementaciones PostgreSQL (orden, unicidad de
//! slug, transiciones condicionales) sobre `tokio::sync::RwLock`. Cada
//! transición de estado se hace bajo el lock de escritura, que cumple el
//! papel del `UPDATE ... WHERE status = 'PENDING'`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{QuotationRepository, ServiceRepository, ZoneRepository};
use crate::{
    models::{FareRuleRow, Quotation, QuotationStatus, Service, Zone, ZoneFilters},
    utils::errors::{conflict_error, AppResult},
};

#[derive(Default)]
pub struct InMemoryServiceRepository {
    services: RwLock<Vec<Service>>,
    rules: RwLock<Vec<FareRuleRow>>,
}

impl InMemoryServiceRepository {
    pub fn new(services: Vec<Service>, rules: Vec<FareRuleRow>) -> Self {
        Self {
            services: RwLock::new(services),
            rules: RwLock::new(rules),
        }
    }

    pub async fn add_rule(&self, rule: FareRuleRow) {
        self.rules.write().await.push(rule);
    }
}

#[async_trait]
impl ServiceRepository for InMemoryServiceRepository {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Service>> {
        Ok(self.services.read().await.iter().find(|s| s.id == id).cloned())
    }

    async fn list_active(&self) -> AppResult<Vec<Service>> {
        let mut services: Vec<Service> = self
            .services
            .read()
            .await
            .iter()
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        services.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        Ok(services)
    }

    async fn active_rules_for_service(&self, service_id: Uuid) -> AppResult<Vec<FareRuleRow>> {
        let mut rules: Vec<FareRuleRow> = self
            .rules
            .read()
            .await
            .iter()
            .filter(|r| r.service_id == service_id && r.is_active)
            .cloned()
            .collect();
        rules.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        Ok(rules)
    }
}

#[derive(Default)]
pub struct InMemoryZoneRepository {
    zones: RwLock<Vec<Zone>>,
}

impl InMemoryZoneRepository {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self {
            zones: RwLock::new(zones),
        }
    }
}

fn matches_filters(zone: &Zone, filters: &ZoneFilters) -> bool {
    let active_ok = filters.is_active.map_or(true, |active| zone.is_active == active);
    let search_ok = filters.search.as_ref().map_or(true, |term| {
        let term = term.to_lowercase();
        zone.name.to_lowercase().contains(&term) || zone.slug.to_lowercase().contains(&term)
    });
    active_ok && search_ok
}

#[async_trait]
impl ZoneRepository for InMemoryZoneRepository {
    async fn list_active(&self) -> AppResult<Vec<Zone>> {
        let mut zones: Vec<Zone> = self
            .zones
            .read()
            .await
            .iter()
            .filter(|z| z.is_active)
            .cloned()
            .collect();
        zones.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(zones)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Zone>> {
        Ok(self.zones.read().await.iter().find(|z| z.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Zone>> {
        Ok(self.zones.read().await.iter().find(|z| z.slug == slug).cloned())
    }

    async fn insert(&self, zone: &Zone) -> AppResult<Zone> {
        let mut zones = self.zones.write().await;
        if zones.iter().any(|z| z.slug == zone.slug) {
            return Err(conflict_error("Zona", "slug", &zone.slug));
        }
        zones.push(zone.clone());
        Ok(zone.clone())
    }

    async fn update(&self, zone: &Zone) -> AppResult<Zone> {
        let mut zones = self.zones.write().await;
        if zones.iter().any(|z| z.slug == zone.slug && z.id != zone.id) {
            return Err(conflict_error("Zona", "slug", &zone.slug));
        }
        match zones.iter_mut().find(|z| z.id == zone.id) {
            Some(existing) => {
                *existing = zone.clone();
                Ok(zone.clone())
            }
            None => Err(sqlx::Error::RowNotFound.into()),
        }
    }

    async fn search(
        &self,
        filters: &ZoneFilters,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Zone>, i64)> {
        let mut matching: Vec<Zone> = self
            .zones
            .read()
            .await
            .iter()
            .filter(|z| matches_filters(z, filters))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }
}

#[derive(Default)]
pub struct InMemoryQuotationRepository {
    quotations: RwLock<Vec<Quotation>>,
}

impl InMemoryQuotationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl QuotationRepository for InMemoryQuotationRepository {
    async fn insert(&self, quotation: &Quotation) -> AppResult<Quotation> {
        self.quotations.write().await.push(quotation.clone());
        Ok(quotation.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quotation>> {
        Ok(self
            .quotations
            .read()
            .await
            .iter()
            .find(|q| q.id == id)
            .cloned())
    }

    async fn list_by_user(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> AppResult<(Vec<Quotation>, i64)> {
        let mut owned: Vec<Quotation> = self
            .quotations
            .read()
            .await
            .iter()
            .filter(|q| q.user_id == Some(user_id))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = owned.len() as i64;
        let page = owned
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect();
        Ok((page, total))
    }

    async fn mark_expired(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<bool> {
        let mut quotations = self.quotations.write().await;
        match quotations.iter_mut().find(|q| q.id == id) {
            Some(q) if q.needs_expiry(now) => {
                q.status = QuotationStatus::Expired;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_accepted(&self, id: Uuid, now: DateTime<Utc>) -> AppResult<Option<Quotation>> {
        let mut quotations = self.quotations.write().await;
        match quotations.iter_mut().find(|q| q.id == id) {
            Some(q) if q.status == QuotationStatus::Pending && !q.is_overdue(now) => {
                q.status = QuotationStatus::Accepted;
                q.accepted_at = Some(now);
                Ok(Some(q.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let mut quotations = self.quotations.write().await;
        let mut expired = 0;
        for q in quotations.iter_mut().filter(|q| q.needs_expiry(now)) {
            q.status = QuotationStatus::Expired;
            expired += 1;
        }
        Ok(expired)
    }
}
