//! Server construction and route wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::{AdapterStates, build_states};

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

#[cfg(debug_assertions)]
use catalog_backend::doc::ApiDoc;
use catalog_backend::inbound::http::delta_sync::{
    car_brands_delta, car_models_delta, categories_delta, full_delta, orders_delta,
    product_brands_delta, products_delta,
};
use catalog_backend::inbound::http::health::{HealthState, live, ready};
use catalog_backend::inbound::http::notifications::{
    notify_order_status, report_admin_activity, send_promotion,
};
use catalog_backend::inbound::http::state::HttpState;
use catalog_backend::inbound::ws::notifications_socket;
use catalog_backend::inbound::ws::state::WsState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    ws_state: web::Data<WsState>,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        ws_state,
    } = deps;

    let api = web::scope("/api/v1")
        .service(products_delta)
        .service(categories_delta)
        .service(car_brands_delta)
        .service(car_models_delta)
        .service(product_brands_delta)
        .service(orders_delta)
        .service(full_delta)
        .service(send_promotion)
        .service(notify_order_status)
        .service(report_admin_activity);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .app_data(ws_state)
        .service(api)
        .service(notifications_socket)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The returned [`Server`] must be awaited to drive the listener. Readiness
/// is flipped once the socket is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let AdapterStates { http, ws } = build_states(&config);
    let http_state = web::Data::new(http);
    let ws_state = web::Data::new(ws);

    let server = HttpServer::new(move || {
        build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            ws_state: ws_state.clone(),
        })
    })
    .bind(config.bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
