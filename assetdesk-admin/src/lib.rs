mod api;
mod auth;

use std::net::SocketAddr;

use anyhow::{Context, Result};
use assetdesk_common::version::assetdesk_version;
use assetdesk_core::Services;
use poem::listener::TcpListener;
use poem::{EndpointExt, Route, Server};
use poem_openapi::OpenApiService;
use tracing::*;

pub use auth::inject_request_authorization;

pub struct AdminServer {
    services: Services,
}

impl AdminServer {
    pub fn new(services: &Services) -> Self {
        AdminServer {
            services: services.clone(),
        }
    }

    pub async fn run(self, address: SocketAddr) -> Result<()> {
        let api_service = OpenApiService::new(api::get(), "Assetdesk Admin", assetdesk_version())
            .server("/api");
        let ui = api_service.stoplight_elements();
        let spec = api_service.spec_endpoint();

        let app = Route::new()
            .nest("/api-docs", ui)
            .at("/openapi.json", spec)
            .nest("/api", api_service.around(inject_request_authorization))
            .data(self.services.db.clone())
            .data(self.services.config.clone());

        info!(?address, "Listening");
        Server::new(TcpListener::bind(address))
            .run(app)
            .await
            .context("Failed to start admin server")
    }
}
