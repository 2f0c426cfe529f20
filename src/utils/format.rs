//! Formateo de montos, distancias y tiempos para las respuestas

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};

/// Redondeo monetario a centavos (redondeo bancario)
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Formato es-AR: `$ 4.000,00`. Para monedas distintas de ARS se antepone el código.
pub fn format_price(amount: Decimal, currency: &str) -> String {
    let rounded = round_money(amount);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let symbol = if currency.eq_ignore_ascii_case("ARS") {
        "$"
    } else {
        currency
    };
    let sign = if negative { "-" } else { "" };
    format!("{}{} {},{}", sign, symbol, grouped, frac_part)
}

/// Tiempo restante en minutos (`"N minutos"`, nunca negativo), o `"Expirada"`
/// si la cotización ya está en estado EXPIRED
pub fn expires_in(expires_at: DateTime<Utc>, now: DateTime<Utc>, expired: bool) -> String {
    if expired {
        return "Expirada".to_string();
    }
    let seconds = (expires_at - now).num_seconds().max(0);
    format!("{} minutos", (seconds + 30) / 60)
}

pub fn distance_text(meters: i64) -> String {
    format!("{:.1} km", meters as f64 / 1000.0)
}

pub fn duration_text(seconds: i64) -> String {
    format!("{} mins", (seconds.max(0) + 30) / 60)
}
