//! Card based authentication flow
//!
//! Card handle, PIN check and certificate come from the card session; the
//! composer for the requested flow turns the challenge into a signing input
//! whose SHA-256 digest the card signs.

use authenticator_connector::{
    load_ca_chain, AuthSignParameter, CardData, CardSession, CardType, ConnectorClient,
    ConnectorTransport, Error as ConnectorError, HttpTransport,
};
use authenticator_jws::{FlowType, JwsComposer, SignedAssertion};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::sync::Arc;

use crate::config::Config;
use crate::error::{Error, Result};

/// Build a card session from configuration, talking to the real connector.
pub async fn connect(config: &Config) -> Result<CardSession> {
    let transport = Arc::new(HttpTransport::new(config.connector.request_timeout()));
    connect_with(config, transport).await
}

/// Build a card session over the given transport.
pub async fn connect_with(
    config: &Config,
    transport: Arc<dyn ConnectorTransport>,
) -> Result<CardSession> {
    let ca_chain = match &config.connector.ca_directory {
        Some(dir) => load_ca_chain(dir)?,
        None => Vec::new(),
    };

    let mut client = ConnectorClient::new(
        config.connector.entry_options(),
        config.context.clone(),
        transport,
    )
    .with_ca_chain(ca_chain)
    .with_sds_path(config.connector.sds_path.clone());

    if config.connector.discover_services {
        client.discover_services_or_default().await;
    }

    Ok(CardSession::new(client, config.signing.crypt))
}

/// One user's authentication session with a selected card type.
pub struct AuthFlow {
    session: CardSession,
    card_type: CardType,
}

impl AuthFlow {
    pub fn new(session: CardSession, card_type: CardType) -> Self {
        Self { session, card_type }
    }

    pub fn card_type(&self) -> CardType {
        self.card_type
    }

    pub fn session(&self) -> &CardSession {
        &self.session
    }

    /// Sign an IDP challenge and return the compact-serializable assertion.
    ///
    /// A card type other than the current one switches the session first.
    pub async fn sign_challenge(
        &mut self,
        card_type: CardType,
        flow: FlowType,
        challenge: &str,
    ) -> Result<SignedAssertion> {
        if card_type != self.card_type {
            self.switch_card_type(card_type);
        }

        let had_handle = self.session.card(card_type).is_some();
        if !had_handle {
            self.session.get_card_handle(card_type).await?;
        }

        // A cached handle may be stale after the card was re-inserted.
        // Re-acquire once; the signing step itself is never repeated.
        let certificate = match self.verified_certificate(card_type).await {
            Err(Error::Connector(e @ ConnectorError::Connector { .. })) if had_handle => {
                tracing::warn!(%card_type, error = %e, "Cached card handle rejected, re-acquiring");
                self.session.forget(card_type);
                self.session.get_card_handle(card_type).await?;
                self.verified_certificate(card_type).await?
            }
            result => result?,
        };

        let crypt = self.session.crypt();
        let composer = flow.composer(certificate, challenge, crypt);

        let digest = composer.digest()?;
        let params = AuthSignParameter::new(crypt, STANDARD.encode(digest));

        let signature = self.session.sign(card_type, &params, flow).await?;
        let assertion = composer.compose(STANDARD.decode(signature)?)?;

        tracing::info!(%card_type, %flow, alg = composer.algorithm().alg, "Challenge signed");
        Ok(assertion)
    }

    /// Certificate of a card whose PIN is verified.
    async fn verified_certificate(&mut self, card_type: CardType) -> Result<String> {
        if !self.session.check_pin_status(card_type).await? {
            let status = self
                .session
                .card(card_type)
                .and_then(|card| card.pin_status.as_ref())
                .map(|status| status.to_string())
                .unwrap_or_default();
            return Err(ConnectorError::PinNotVerified { card_type, status }.into());
        }
        Ok(self.session.certificate(card_type).await?)
    }

    /// Card handle, PIN status and certificate of `card_type`.
    ///
    /// A failing PIN query is logged; the card data is still returned.
    pub async fn inspect_card(&mut self, card_type: CardType) -> Result<CardData> {
        if card_type != self.card_type {
            self.switch_card_type(card_type);
        }

        self.session.get_card_handle(card_type).await?;
        if let Err(e) = self.session.check_pin_status(card_type).await {
            tracing::warn!(%card_type, error = %e, "PIN status unavailable");
        }
        self.session.certificate(card_type).await?;

        self.session
            .card(card_type)
            .cloned()
            .ok_or_else(|| ConnectorError::MissingCardHandle { card_type }.into())
    }

    pub fn logout(&mut self) {
        tracing::info!(card_type = %self.card_type, "Logout, clearing card session");
        self.session.reset();
    }

    pub fn switch_card_type(&mut self, card_type: CardType) {
        tracing::info!(from = %self.card_type, to = %card_type, "Switching card type");
        self.session.reset();
        self.card_type = card_type;
    }
}
