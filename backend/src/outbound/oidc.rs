//! OpenID Connect identity adapter.
//!
//! Implements the `IdentityProvider` port over a discovered provider using
//! the authorization-code flow. Discovery runs once at startup; the adapter
//! then mints authorization URLs and exchanges callback codes.

use async_trait::async_trait;
use openidconnect::core::{
    CoreAuthDisplay, CoreAuthenticationFlow, CoreClaimName, CoreClaimType, CoreClient,
    CoreClientAuthMethod, CoreGrantType, CoreJsonWebKey, CoreJsonWebKeyType, CoreJsonWebKeyUse,
    CoreJweContentEncryptionAlgorithm, CoreJweKeyManagementAlgorithm, CoreJwsSigningAlgorithm,
    CoreResponseMode, CoreResponseType, CoreSubjectIdentifierType,
};
use openidconnect::reqwest::async_http_client;
use openidconnect::{
    AdditionalProviderMetadata, AuthorizationCode, ClientId, ClientSecret, CsrfToken, IssuerUrl,
    Nonce, ProviderMetadata, RedirectUrl, Scope, TokenResponse,
};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::ports::{AuthenticatedUser, IdentityError, IdentityProvider, LoginAttempt};

/// Discovery metadata extension carrying the optional RP-initiated logout
/// endpoint, which the core metadata type does not parse.
#[derive(Clone, Debug, Deserialize, Serialize)]
struct EndSessionMetadata {
    end_session_endpoint: Option<Url>,
}

impl AdditionalProviderMetadata for EndSessionMetadata {}

type EndSessionProviderMetadata = ProviderMetadata<
    EndSessionMetadata,
    CoreAuthDisplay,
    CoreClientAuthMethod,
    CoreClaimName,
    CoreClaimType,
    CoreGrantType,
    CoreJweContentEncryptionAlgorithm,
    CoreJweKeyManagementAlgorithm,
    CoreJwsSigningAlgorithm,
    CoreJsonWebKeyType,
    CoreJsonWebKeyUse,
    CoreJsonWebKey,
    CoreResponseMode,
    CoreResponseType,
    CoreSubjectIdentifierType,
>;

/// Identity adapter over a discovered OpenID Connect provider.
pub struct OidcIdentityProvider {
    client: CoreClient,
    end_session_endpoint: Option<Url>,
    post_logout_redirect: Url,
}

impl OidcIdentityProvider {
    /// Discover the provider and build the relying-party client.
    ///
    /// `redirect_url` is this service's `/callback` endpoint;
    /// `post_logout_redirect` is where the provider should send the browser
    /// after an RP-initiated logout.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::Unavailable`] when the issuer URL is invalid
    /// or discovery fails.
    pub async fn discover(
        issuer_url: &str,
        client_id: String,
        client_secret: String,
        redirect_url: Url,
        post_logout_redirect: Url,
    ) -> Result<Self, IdentityError> {
        let issuer = IssuerUrl::new(issuer_url.to_owned())
            .map_err(|err| IdentityError::unavailable(format!("invalid issuer URL: {err}")))?;
        let metadata = EndSessionProviderMetadata::discover_async(issuer, async_http_client)
            .await
            .map_err(|err| IdentityError::unavailable(format!("discovery failed: {err}")))?;
        let end_session_endpoint = metadata.additional_metadata().end_session_endpoint.clone();

        let client = CoreClient::from_provider_metadata(
            metadata,
            ClientId::new(client_id),
            Some(ClientSecret::new(client_secret)),
        )
        .set_redirect_uri(RedirectUrl::from_url(redirect_url));

        Ok(Self {
            client,
            end_session_endpoint,
            post_logout_redirect,
        })
    }
}

#[async_trait]
impl IdentityProvider for OidcIdentityProvider {
    fn begin_login(&self) -> LoginAttempt {
        let (authorize_url, csrf_state, nonce) = self
            .client
            .authorize_url(
                CoreAuthenticationFlow::AuthorizationCode,
                CsrfToken::new_random,
                Nonce::new_random,
            )
            .add_scope(Scope::new("openid".to_owned()))
            .add_scope(Scope::new("profile".to_owned()))
            .url();

        LoginAttempt {
            authorize_url,
            csrf_state: csrf_state.secret().clone(),
            nonce: nonce.secret().clone(),
        }
    }

    async fn complete_login(
        &self,
        code: &str,
        expected_nonce: &str,
    ) -> Result<AuthenticatedUser, IdentityError> {
        let token_response = self
            .client
            .exchange_code(AuthorizationCode::new(code.to_owned()))
            .request_async(async_http_client)
            .await
            .map_err(|err| IdentityError::code_exchange(err.to_string()))?;

        let id_token = token_response.id_token().ok_or_else(|| {
            IdentityError::token_verification("provider response carried no ID token")
        })?;
        let nonce = Nonce::new(expected_nonce.to_owned());
        let claims = id_token
            .claims(&self.client.id_token_verifier(), &nonce)
            .map_err(|err| IdentityError::token_verification(err.to_string()))?;

        let name = claims
            .name()
            .and_then(|localized| localized.get(None))
            .map(|name| name.as_str().to_owned());

        Ok(AuthenticatedUser {
            subject: claims.subject().as_str().to_owned(),
            name,
        })
    }

    fn logout_url(&self) -> Option<Url> {
        self.end_session_endpoint.clone().map(|mut url| {
            url.query_pairs_mut().append_pair(
                "post_logout_redirect_uri",
                self.post_logout_redirect.as_str(),
            );
            url
        })
    }
}
