//! Geometría de zonas
//!
//! Pertenencia de un punto a un polígono (regla par-impar) y distancia
//! ortodrómica para la estimación local de rutas.

use crate::models::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Ray casting con regla par-impar sobre el plano (lng = x, lat = y).
///
/// Total para cualquier cantidad de vértices: con menos de 3 devuelve `false`.
/// El último vértice se une con el primero; el polígono no necesita estar
/// cerrado ni ser convexo.
///
/// Puntos sobre el borde: cada arista se trata como semiabierta en latitud
/// (incluye su extremo inferior, excluye el superior) y el cruce exige que el
/// rayo hacia el este corte estrictamente la arista. En consecuencia un punto
/// sobre un borde inferior o izquierdo cuenta como dentro y uno sobre un borde
/// superior o derecho como fuera. El resultado es siempre el mismo para la
/// misma entrada.
pub fn contains(point: &GeoPoint, polygon: &[GeoPoint]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = (point.lng, point.lat);
    let mut inside = false;
    let mut j = polygon.len() - 1;

    for i in 0..polygon.len() {
        let (xi, yi) = (polygon[i].lng, polygon[i].lat);
        let (xj, yj) = (polygon[j].lng, polygon[j].lat);

        if (yi > y) != (yj > y) {
            let x_cross = (xj - xi) * (y - yi) / (yj - yi) + xi;
            if x < x_cross {
                inside = !inside;
            }
        }
        j = i;
    }

    inside
}

/// Distancia ortodrómica (haversine) en kilómetros
pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}
