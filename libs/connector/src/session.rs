//! Card session manager
//!
//! Caches what the connector reported per card type for one authentication
//! session. Only [`CardSession::get_card_handle`] may run without a cached
//! handle; the other operations fail with [`Error::MissingCardHandle`]
//! instead of acquiring one implicitly.

use std::collections::HashMap;

use crate::client::ConnectorClient;
use crate::error::{Error, Result};
use crate::models::{AuthSignParameter, CardData, CardType, Crypt, FlowType};
use crate::signer::sign_challenge;
use crate::soap::response::{extract_cards, extract_certificate, extract_pin_status};
use crate::soap::{
    parse_response, GetCardsRequest, GetPinStatusRequest, ReadCardCertificateRequest, SoapAction,
};

/// Reference of the authentication certificate on HBA and SMC-B.
pub const AUTH_CERT_REF: &str = "C.AUT";

/// Progress of a card type within the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SessionState {
    Unacquired,
    HandleAcquired,
    PinVerified,
    CertificateLoaded,
}

pub struct CardSession {
    client: ConnectorClient,
    crypt: Crypt,
    cards: HashMap<CardType, CardData>,
}

impl CardSession {
    pub fn new(client: ConnectorClient, crypt: Crypt) -> Self {
        Self {
            client,
            crypt,
            cards: HashMap::new(),
        }
    }

    pub fn client(&self) -> &ConnectorClient {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut ConnectorClient {
        &mut self.client
    }

    pub fn crypt(&self) -> Crypt {
        self.crypt
    }

    pub fn card(&self, card_type: CardType) -> Option<&CardData> {
        self.cards.get(&card_type)
    }

    pub fn state(&self, card_type: CardType) -> SessionState {
        match self.cards.get(&card_type) {
            None => SessionState::Unacquired,
            Some(card) if card.certificate.is_some() => SessionState::CertificateLoaded,
            Some(card) if card.pin_status.as_ref().is_some_and(|p| p.is_verified()) => {
                SessionState::PinVerified
            }
            Some(_) => SessionState::HandleAcquired,
        }
    }

    /// Forget every cached card.
    pub fn reset(&mut self) {
        self.cards.clear();
    }

    /// Forget the cached card of one type, e.g. after its handle went stale.
    pub fn forget(&mut self, card_type: CardType) -> Option<CardData> {
        self.cards.remove(&card_type)
    }

    /// Ask the connector for the inserted card of `card_type`.
    ///
    /// Exactly one matching card is required. Cards of other types in the
    /// response are ignored. A handle that did not change keeps the cached
    /// PIN status and certificate.
    pub async fn get_card_handle(&mut self, card_type: CardType) -> Result<&CardData> {
        let request = GetCardsRequest {
            context: self.client.context(),
            card_type,
        };
        let response = self.client.call(&request).await?;
        let mut matching: Vec<CardData> = parse_response(&response, extract_cards)?
            .into_iter()
            .filter(|card| card.card_type == card_type)
            .collect();

        let mut card = match matching.len() {
            0 => return Err(Error::CardNotFound { card_type }),
            1 => matching.remove(0),
            count => {
                tracing::warn!(%card_type, count, "More than one card of the requested type");
                return Err(Error::MultipleCardsFound { card_type, count });
            }
        };

        if let Some(previous) = self.cards.remove(&card_type) {
            if previous.card_handle == card.card_handle {
                card.pin_status = previous.pin_status;
                card.certificate = previous.certificate;
            }
        }

        tracing::info!(
            %card_type,
            ct_id = %card.ct_id,
            slot = %card.slot_nr,
            "Card handle acquired"
        );
        Ok(&*self.cards.entry(card_type).or_insert(card))
    }

    fn cached_handle(&self, card_type: CardType) -> Result<String> {
        self.cards
            .get(&card_type)
            .map(|card| card.card_handle.clone())
            .ok_or(Error::MissingCardHandle { card_type })
    }

    fn cached_card_mut(&mut self, card_type: CardType) -> Result<&mut CardData> {
        self.cards
            .get_mut(&card_type)
            .ok_or(Error::MissingCardHandle { card_type })
    }

    /// Whether the card's PIN is verified. The raw status is cached either way.
    pub async fn check_pin_status(&mut self, card_type: CardType) -> Result<bool> {
        let card_handle = self.cached_handle(card_type)?;
        let request = GetPinStatusRequest {
            context: self.client.context(),
            card_handle: &card_handle,
            pin_type: card_type.pin_type(),
        };
        let response = self.client.call(&request).await?;
        let status = parse_response(&response, extract_pin_status)?;

        tracing::info!(%card_type, pin_status = %status, "PIN status");
        let verified = status.is_verified();
        self.cached_card_mut(card_type)?.pin_status = Some(status);
        Ok(verified)
    }

    /// Read the authentication certificate; does not need a verified PIN.
    pub async fn get_card_certificate(&mut self, card_type: CardType) -> Result<String> {
        let card_handle = self.cached_handle(card_type)?;
        let request = ReadCardCertificateRequest {
            context: self.client.context(),
            card_handle: &card_handle,
            cert_ref: AUTH_CERT_REF,
            crypt: self.crypt,
        };
        let response = self.client.call(&request).await?;
        let certificate = parse_response(&response, extract_certificate)?;

        tracing::debug!(%card_type, "Certificate loaded");
        self.cached_card_mut(card_type)?.certificate = Some(certificate.clone());
        Ok(certificate)
    }

    /// Cached certificate, read from the card on first use.
    pub async fn certificate(&mut self, card_type: CardType) -> Result<String> {
        if let Some(certificate) = self
            .cards
            .get(&card_type)
            .and_then(|card| card.certificate.clone())
        {
            return Ok(certificate);
        }
        self.get_card_certificate(card_type).await
    }

    /// Have the card sign `params.base64_data` for `flow`.
    pub async fn sign(
        &self,
        card_type: CardType,
        params: &AuthSignParameter,
        flow: FlowType,
    ) -> Result<String> {
        let card_handle = self.cached_handle(card_type)?;
        let endpoint = self.client.endpoint_for(SoapAction::ExternalAuthenticate)?;
        sign_challenge(
            &self.client,
            self.client.context(),
            &endpoint,
            &card_handle,
            params,
            flow,
        )
        .await
    }
}
