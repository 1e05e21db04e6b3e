use crate::{
    axum_http::{default_routers, routers},
    config::config_model::DotEnvyConfig,
    usecases::{
        availability::AvailabilityUseCase, bookings::BookingUseCase, dispatch::Dispatcher,
        payments::PaymentUseCase, rate_admin::RateAdminUseCase, rate_resolver::RateResolver,
        reservations::ReservationUseCase,
    },
};
use anyhow::Result;
use axum::{
    Router,
    http::{
        HeaderName, Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::get,
};
use staydesk::{
    infra::db::{
        postgres::postgres_connection::PgPoolSquad,
        repositories::{
            availability::AvailabilityPostgres, bookings::BookingPostgres, guests::GuestPostgres,
            notifications::NotificationPostgres, payments::PaymentPostgres, rates::RatePostgres,
            rooms::RoomPostgres,
        },
    },
    notifications::{EmailSender, email_client::HttpEmailClient},
    payments::gateway_client::GatewayClient,
};
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{error, info};

use super::routers::payments::CALLBACK_TOKEN_HEADER;

/// Builds the application router and the dispatcher whose side effects must be
/// drained on shutdown.
pub fn build_router(
    config: &DotEnvyConfig,
    db_pool: Arc<PgPoolSquad>,
) -> Result<(Router, Arc<Dispatcher>)> {
    let room_repo = Arc::new(RoomPostgres::new(Arc::clone(&db_pool)));
    let availability_repo = Arc::new(AvailabilityPostgres::new(Arc::clone(&db_pool)));
    let booking_repo = Arc::new(BookingPostgres::new(Arc::clone(&db_pool)));
    let guest_repo = Arc::new(GuestPostgres::new(Arc::clone(&db_pool)));
    let payment_repo = Arc::new(PaymentPostgres::new(Arc::clone(&db_pool)));
    let rate_repo = Arc::new(RatePostgres::new(Arc::clone(&db_pool)));
    let notification_repo = Arc::new(NotificationPostgres::new(Arc::clone(&db_pool)));

    let email: Option<Arc<dyn EmailSender + Send + Sync>> = match &config.email {
        Some(email) => Some(Arc::new(HttpEmailClient::new(
            email.api_url.clone(),
            email.api_key.clone(),
            email.from_address.clone(),
        )?)),
        None => {
            info!("E-mail is not configured, confirmations and receipts are skipped");
            None
        }
    };
    let dispatcher = Arc::new(Dispatcher::new(notification_repo, email));

    let gateway = &config.payment_gateway;
    let gateway_client = Arc::new(GatewayClient::new(
        gateway.base_url.clone(),
        gateway.secret_key.clone(),
        gateway.success_redirect_url.clone(),
        gateway.failure_redirect_url.clone(),
        gateway.invoice_duration_secs,
        Duration::from_secs(gateway.request_timeout_secs),
    )?);

    let reservations = ReservationUseCase::new(
        Arc::clone(&room_repo),
        Arc::clone(&availability_repo),
        Arc::clone(&booking_repo),
        Arc::clone(&guest_repo),
        Arc::clone(&payment_repo),
        gateway_client,
        Arc::new(RateResolver::standard(Arc::clone(&rate_repo))),
        Arc::clone(&dispatcher),
    );
    let availability = AvailabilityUseCase::new(availability_repo, Arc::clone(&room_repo));
    let bookings = BookingUseCase::new(
        Arc::clone(&booking_repo),
        Arc::clone(&payment_repo),
        Arc::clone(&room_repo),
        Arc::clone(&dispatcher),
    );
    let payments = PaymentUseCase::new(
        booking_repo,
        payment_repo,
        guest_repo,
        Arc::clone(&dispatcher),
        gateway.callback_token.clone(),
    );
    let rates = RateAdminUseCase::new(rate_repo, room_repo);

    let app = Router::new()
        .fallback(default_routers::not_found)
        .nest(
            "/api/v1/reservations",
            routers::reservations::routes(Arc::new(reservations)),
        )
        .nest(
            "/api/v1/rooms",
            routers::availability::routes(Arc::new(availability)),
        )
        .nest("/api/v1/bookings", routers::bookings::routes(Arc::new(bookings)))
        .nest("/api/v1/payments", routers::payments::routes(Arc::new(payments)))
        .nest("/api/v1/rates", routers::rates::routes(Arc::new(rates)))
        .route("/api/v1/health-check", get(default_routers::health_check))
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.backend_server.timeout,
        )))
        .layer(RequestBodyLimitLayer::new(
            (config.backend_server.body_limit * 1024 * 1024).try_into()?,
        ))
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PATCH,
                    Method::PUT,
                    Method::DELETE,
                ])
                .allow_headers([
                    AUTHORIZATION,
                    CONTENT_TYPE,
                    HeaderName::from_static(CALLBACK_TOKEN_HEADER),
                ])
                .allow_origin(Any),
        )
        .layer(TraceLayer::new_for_http());

    Ok((app, dispatcher))
}

pub async fn start(config: Arc<DotEnvyConfig>, db_pool: Arc<PgPoolSquad>) -> Result<()> {
    let (app, dispatcher) = build_router(&config, db_pool)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.backend_server.port));
    let listener = TcpListener::bind(addr).await?;

    info!(
        stage = %config.stage,
        "Server is running on port {}",
        config.backend_server.port
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Waiting for pending notifications and e-mails");
    dispatcher.drain().await;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = ?err, "Failed to install CTRL+C signal handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = ?err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received ctrl+C signal"),
        _ = terminate => info!("Received terminate signal"),
    }
}
