//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::{env, str::FromStr, time::Duration};

use anyhow::{anyhow, bail, Context, Result};
use chrono::FixedOffset;

const DEV_JWT_SECRET: &str = "dev-secret-change-me";

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub cors_origins: Vec<String>,
    pub mapbox_token: Option<String>,
    pub route_provider_timeout: Duration,
    pub quotation_ttl_minutes: i64,
    pub expiry_sweep_interval: Option<Duration>,
    /// Zona horaria del negocio para evaluar franjas y días de las reglas
    pub pricing_utc_offset: FixedOffset,
    pub currency: String,
    pub whatsapp_business_number: String,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            database_url: None,
            redis_url: None,
            jwt_secret: DEV_JWT_SECRET.to_string(),
            cors_origins: vec!["*".to_string()],
            mapbox_token: None,
            route_provider_timeout: Duration::from_millis(3000),
            quotation_ttl_minutes: 30,
            expiry_sweep_interval: Some(Duration::from_secs(300)),
            pricing_utc_offset: FixedOffset::west_opt(3 * 3600)
                .expect("UTC-3 es un offset válido"),
            currency: "ARS".to_string(),
            whatsapp_business_number: "+1234567890".to_string(),
        }
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow!("{} must be a valid value ({}): {}", key, raw, e)),
        _ => Ok(default),
    }
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl EnvironmentConfig {
    /// Cargar desde variables de entorno
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Cargar desde una fuente arbitraria de claves
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let environment = non_empty(&lookup, "ENVIRONMENT").unwrap_or(defaults.environment);
        let jwt_secret = match non_empty(&lookup, "JWT_SECRET") {
            Some(secret) => secret,
            None if environment == "production" => bail!("JWT_SECRET must be set in production"),
            None => defaults.jwt_secret,
        };

        let offset_minutes: i32 = parse_var(&lookup, "PRICING_UTC_OFFSET_MINUTES", -180)?;
        let pricing_utc_offset = FixedOffset::east_opt(offset_minutes * 60).with_context(|| {
            format!("PRICING_UTC_OFFSET_MINUTES out of range: {}", offset_minutes)
        })?;

        let sweep_secs: u64 = parse_var(&lookup, "EXPIRY_SWEEP_INTERVAL_SECS", 300)?;
        let quotation_ttl_minutes: i64 = parse_var(&lookup, "QUOTATION_TTL_MINUTES", 30)?;
        if quotation_ttl_minutes <= 0 {
            bail!("QUOTATION_TTL_MINUTES must be positive");
        }

        Ok(Self {
            port: parse_var(&lookup, "PORT", defaults.port)?,
            host: non_empty(&lookup, "HOST").unwrap_or(defaults.host),
            database_url: non_empty(&lookup, "DATABASE_URL"),
            redis_url: non_empty(&lookup, "REDIS_URL"),
            jwt_secret,
            cors_origins: non_empty(&lookup, "CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.cors_origins),
            mapbox_token: non_empty(&lookup, "MAPBOX_TOKEN"),
            route_provider_timeout: Duration::from_millis(parse_var(
                &lookup,
                "ROUTE_PROVIDER_TIMEOUT_MS",
                3000u64,
            )?),
            quotation_ttl_minutes,
            expiry_sweep_interval: (sweep_secs > 0).then(|| Duration::from_secs(sweep_secs)),
            pricing_utc_offset,
            currency: non_empty(&lookup, "CURRENCY").unwrap_or(defaults.currency),
            whatsapp_business_number: non_empty(&lookup, "WHATSAPP_BUSINESS_NUMBER")
                .unwrap_or(defaults.whatsapp_business_number),
            environment,
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la URL del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn quotation_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.quotation_ttl_minutes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EnvironmentConfig::from_lookup(lookup(&[])).unwrap();
        assert!(config.is_development());
        assert_eq!(config.port, 3000);
        assert_eq!(config.quotation_ttl_minutes, 30);
        assert_eq!(config.pricing_utc_offset.local_minus_utc(), -3 * 3600);
        assert_eq!(config.expiry_sweep_interval, Some(Duration::from_secs(300)));
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = EnvironmentConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("CORS_ORIGINS", "https://a.com, https://b.com"),
            ("EXPIRY_SWEEP_INTERVAL_SECS", "0"),
            ("PRICING_UTC_OFFSET_MINUTES", "60"),
        ]))
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cors_origins, vec!["https://a.com", "https://b.com"]);
        assert_eq!(config.expiry_sweep_interval, None);
        assert_eq!(config.pricing_utc_offset.local_minus_utc(), 3600);
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert!(EnvironmentConfig::from_lookup(lookup(&[("PORT", "abc")])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup(&[("QUOTATION_TTL_MINUTES", "0")])).is_err());
        assert!(EnvironmentConfig::from_lookup(lookup(&[("ENVIRONMENT", "production")])).is_err());
    }
}
