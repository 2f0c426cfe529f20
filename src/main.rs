use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use privatelimo_backend::{
    cache::{CacheConfig, RedisClient},
    config::EnvironmentConfig,
    database::{connect_and_migrate, seed},
    routes::create_router,
    services::{MapboxDirectionsProvider, RouteProvider, RouteService},
    state::{AppState, Repositories},
    utils::clock::{Clock, SystemClock},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (el facade `log` se redirige a tracing)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("🚗 PrivateLimo - Motor de cotizaciones");
    info!("======================================");

    let config = EnvironmentConfig::from_env()?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // Persistencia: PostgreSQL si hay DATABASE_URL, si no memoria
    let repositories = match &config.database_url {
        Some(url) => {
            let pool = connect_and_migrate(url).await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                e
            })?;
            if seed::seed_if_empty(&pool, seed::demo_catalog(clock.now())).await? {
                info!("🌱 Catálogo de demostración cargado");
            }
            Repositories::postgres(pool)
        }
        None => {
            warn!("⚠️ DATABASE_URL no definida, usando almacenamiento en memoria");
            Repositories::in_memory(seed::demo_catalog(clock.now()))
        }
    };

    // Redis opcional
    let cache = match &config.redis_url {
        Some(url) => match RedisClient::new(CacheConfig::new(url.clone())).await {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("⚠️ Redis no disponible, continuando sin cache: {}", e);
                None
            }
        },
        None => None,
    };

    // Proveedor de rutas opcional
    let provider: Option<Arc<dyn RouteProvider>> = match &config.mapbox_token {
        Some(token) => match MapboxDirectionsProvider::new(token.clone()) {
            Ok(provider) => Some(Arc::new(provider)),
            Err(e) => {
                warn!("⚠️ No se pudo crear el cliente de Mapbox: {}", e);
                None
            }
        },
        None => {
            info!("📐 MAPBOX_TOKEN no definido, distancias por estimación geométrica");
            None
        }
    };
    let routes = RouteService::new(provider, config.route_provider_timeout, cache.clone());

    let sweep_interval = config.expiry_sweep_interval;
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    let state = AppState::new(config, repositories, routes, cache, clock);

    if let Some(every) = sweep_interval {
        info!("⌛ Barrido de expiración cada {:?}", every);
        state.quotations.clone().spawn_expiry_sweeper(every);
    }

    let app = create_router(state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   GET  /quotations/services | /quick-quote | /estimate");
    info!("   POST /quotations");
    info!("   GET  /quotations/user/quotations");
    info!("   GET  /quotations/:id | /quotations/:id/whatsapp");
    info!("   POST /quotations/:id/accept");
    info!("   GET  /zones/geojson | /zones/check-point | /zones/surcharge");
    info!("   *    /zones, /zones/:id (ADMIN)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
