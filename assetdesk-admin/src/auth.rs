use std::sync::Arc;

use assetdesk_common::api::{RequestAuthorization, TOKEN_HEADER};
use assetdesk_common::AssetdeskConfig;
use poem::http::StatusCode;
use poem::web::Data;
use poem::{Endpoint, EndpointExt, FromRequest, Request};
use tokio::sync::Mutex;
use tracing::*;

/// Resolves the API token header to an actor and attaches it to the request
/// as [`RequestAuthorization`]. Requests without a known token are rejected.
pub async fn inject_request_authorization<E: Endpoint + 'static>(
    ep: Arc<E>,
    req: Request,
) -> poem::Result<E::Output> {
    let config = Data::<&Arc<Mutex<AssetdeskConfig>>>::from_request_without_body(&req).await?;

    let actor = match req.headers().get(TOKEN_HEADER) {
        Some(token) => {
            let token = token.to_str().map_err(poem::error::BadRequest)?;
            config
                .lock()
                .await
                .actor_for_token(token)
                .map(ToOwned::to_owned)
        }
        None => None,
    };

    let Some(actor) = actor else {
        debug!(path = %req.uri().path(), "Rejected request without a valid API token");
        return Err(poem::Error::from_status(StatusCode::UNAUTHORIZED));
    };

    ep.data(RequestAuthorization { actor }).call(req).await
}

#[cfg(test)]
mod tests {
    use assetdesk_common::{ApiTokenConfig, AssetdeskConfigStore, Secret};
    use poem::handler;

    use super::*;

    #[handler]
    fn whoami(auth: Data<&RequestAuthorization>) -> String {
        auth.actor().to_owned()
    }

    fn config() -> Arc<Mutex<AssetdeskConfig>> {
        Arc::new(Mutex::new(AssetdeskConfig {
            store: AssetdeskConfigStore {
                api_tokens: vec![ApiTokenConfig {
                    actor: "alice".into(),
                    token: Secret::new("t0ken".into()),
                }],
                ..Default::default()
            },
            paths_relative_to: ".".into(),
        }))
    }

    #[tokio::test]
    async fn known_token_injects_actor() {
        let ep = whoami
            .around(inject_request_authorization)
            .data(config());
        let resp = ep
            .call(Request::builder().header(TOKEN_HEADER, "t0ken").finish())
            .await
            .unwrap();
        assert_eq!(resp.into_body().into_string().await.unwrap(), "alice");
    }

    #[tokio::test]
    async fn missing_or_unknown_token_is_unauthorized() {
        let ep = whoami
            .around(inject_request_authorization)
            .data(config());

        let err = ep.call(Request::builder().finish()).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        let err = ep
            .call(Request::builder().header(TOKEN_HEADER, "nope").finish())
            .await
            .unwrap_err();
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }
}
