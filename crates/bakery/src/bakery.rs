//! The Bakery: mint, attenuate, discharge and verify tokens.
//!
//! A bakery owns no token state. Every operation takes token values in and
//! hands new token values back; the only shared state lives behind the root
//! key store and the third-party registry.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use tracing::{debug, info, instrument, warn};

use bakery_core::{
    decode_all, encode_all, Encoding, KeyId, Macaroon, RootKey, SecureRandom, ThirdPartyCaveat,
};
use bakery_discharge::{DischargeAuthority, DischargeRequest, DischargeResponse, Discharger};
use bakery_seal::{EnvelopeNonce, KeyPair, ThirdPartyCaveatId};
use bakery_store::{RootKeyStore, ThirdPartyRegistry};

use crate::caveat::{Caveat, TokenCaveat, LOCAL_LOCATION};
use crate::condition::Condition;
use crate::error::{BakeryError, Result};
use crate::verifier::CaveatVerifier;

/// Default root key length in bytes.
pub const DEFAULT_ROOT_KEY_SIZE: usize = 32;

/// Default cap on discharge tokens gathered by one resolution.
pub const DEFAULT_MAX_DISCHARGES: usize = 100;

/// Configuration for a [`Bakery`].
#[derive(Clone)]
pub struct BakeryConfig {
    /// Location stamped on minted tokens and answered for as an authority.
    pub location: String,
    /// Where root keys are allocated and looked up.
    pub root_key_store: Arc<dyn RootKeyStore>,
    /// Keys of discharge authorities, this bakery's own pair included.
    pub third_party_registry: Arc<dyn ThirdPartyRegistry>,
    /// Source of every key and nonce.
    pub rng: SecureRandom,
    /// Length of root keys and caveat root keys.
    pub root_key_size: usize,
    /// First-party caveats prepended to every minted token.
    pub default_caveats: Vec<Condition>,
    /// Verifiers applied on every verification.
    pub default_verifiers: Vec<CaveatVerifier>,
    /// Upper bound on discharge tokens gathered by `discharge_all` or accepted by `verify`.
    pub max_discharges: usize,
}

impl BakeryConfig {
    /// Configuration with defaults for everything but the collaborators.
    pub fn new(
        location: impl Into<String>,
        root_key_store: Arc<dyn RootKeyStore>,
        third_party_registry: Arc<dyn ThirdPartyRegistry>,
    ) -> Self {
        Self {
            location: location.into(),
            root_key_store,
            third_party_registry,
            rng: SecureRandom::os(),
            root_key_size: DEFAULT_ROOT_KEY_SIZE,
            default_caveats: Vec::new(),
            default_verifiers: Vec::new(),
            max_discharges: DEFAULT_MAX_DISCHARGES,
        }
    }
}

impl fmt::Debug for BakeryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BakeryConfig")
            .field("location", &self.location)
            .field("rng", &self.rng)
            .field("root_key_size", &self.root_key_size)
            .field("default_caveats", &self.default_caveats)
            .field("default_verifiers", &self.default_verifiers.len())
            .field("max_discharges", &self.max_discharges)
            .finish_non_exhaustive()
    }
}

/// Token factory and verifier for one location.
#[derive(Debug)]
pub struct Bakery {
    config: BakeryConfig,
}

impl Bakery {
    /// Create a bakery from its configuration.
    pub fn new(config: BakeryConfig) -> Self {
        Self { config }
    }

    /// This bakery's location.
    pub fn location(&self) -> &str {
        &self.config.location
    }

    /// The configuration in use.
    pub fn config(&self) -> &BakeryConfig {
        &self.config
    }

    fn resolve_location<'a>(&'a self, location: &'a str) -> &'a str {
        if location == LOCAL_LOCATION {
            &self.config.location
        } else {
            location
        }
    }

    async fn key_pair_for(&self, location: &str) -> Result<KeyPair> {
        self.config
            .third_party_registry
            .private_key_for(location)
            .await?
            .ok_or_else(|| BakeryError::UnknownLocation(location.to_string()))
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Minting and Attenuation
    // ─────────────────────────────────────────────────────────────────────────

    /// Mint a token at this bakery's location.
    pub async fn mint(&self, caveats: &[Caveat]) -> Result<Macaroon> {
        self.mint_at(&self.config.location, caveats).await
    }

    /// Mint a token carrying `location` as its location hint.
    ///
    /// Only first-party caveats are accepted here. Delegation is added
    /// afterwards with [`attenuate`](Self::attenuate).
    #[instrument(skip_all, fields(location = %location))]
    pub async fn mint_at(&self, location: &str, caveats: &[Caveat]) -> Result<Macaroon> {
        if let Some(Caveat::ThirdParty { location: target, .. }) =
            caveats.iter().find(|c| c.is_third_party())
        {
            return Err(BakeryError::UnsupportedCaveat(format!(
                "third-party caveat for {target} cannot be added at mint"
            )));
        }

        let (key_id, root_key) = self
            .config
            .root_key_store
            .generate(self.config.root_key_size)
            .await?;

        let mut token = Macaroon::create(location, &root_key, key_id.as_bytes());
        for condition in self
            .config
            .default_caveats
            .iter()
            .chain(caveats.iter().map(Caveat::condition))
        {
            token = token.add_first_party_caveat(condition.to_bytes());
        }

        info!(key_id = %key_id, caveats = token.caveats().len(), "minted token");
        Ok(token)
    }

    /// Append one caveat to `token`.
    ///
    /// A third-party caveat gets a fresh caveat root key, sealed together
    /// with its condition for the authority at the caveat location.
    #[instrument(skip_all, fields(location = %self.config.location))]
    pub async fn attenuate(&self, token: &Macaroon, caveat: &Caveat) -> Result<Macaroon> {
        let (location, condition) = match caveat {
            Caveat::FirstParty(condition) => {
                return Ok(token.add_first_party_caveat(condition.to_bytes()));
            }
            Caveat::ThirdParty {
                location,
                condition,
            } => (self.resolve_location(location), condition),
        };

        let recipient = self
            .config
            .third_party_registry
            .public_key_for(location)
            .await?
            .ok_or_else(|| BakeryError::UnknownLocation(location.to_string()))?;
        let own = self.key_pair_for(&self.config.location).await?;

        let rng = &self.config.rng;
        let caveat_key = RootKey::from_bytes(rng.vec(self.config.root_key_size));
        let caveat_id = ThirdPartyCaveatId::seal(
            &recipient,
            &own,
            EnvelopeNonce::generate(rng),
            &caveat_key,
            &condition.to_bytes(),
        )?;

        debug!(target_location = %location, "added third-party caveat");
        Ok(token.add_third_party_caveat(location, &caveat_key, caveat_id.to_bytes(), &rng.bytes())?)
    }

    /// Append several caveats in order.
    pub async fn attenuate_all(&self, token: &Macaroon, caveats: &[Caveat]) -> Result<Macaroon> {
        let mut token = token.clone();
        for caveat in caveats {
            token = self.attenuate(&token, caveat).await?;
        }
        Ok(token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Discharge
    // ─────────────────────────────────────────────────────────────────────────

    /// Discharge a caveat addressed to this node.
    ///
    /// Opens the caveat identifier, checks the sealed condition against
    /// `value` and mints an unbound discharge token under the recovered
    /// caveat root key.
    #[instrument(skip_all, fields(location = %caveat.location))]
    pub async fn discharge(&self, caveat: &ThirdPartyCaveat, value: &str) -> Result<Macaroon> {
        let location = self.resolve_location(&caveat.location);
        let own = self.key_pair_for(location).await?;

        let opened = ThirdPartyCaveatId::from_bytes(&caveat.identifier)?.open(&own)?;
        let condition = Condition::from_bytes(&opened.predicate)?;

        if !condition.is_satisfied_by(value) {
            debug!(key = condition.key(), "condition not satisfied");
            return Err(BakeryError::DischargeDenied);
        }

        debug!(key = condition.key(), "discharged caveat");
        Ok(Macaroon::create(
            location,
            &opened.root_key,
            caveat.identifier.clone(),
        ))
    }

    /// Gather and bind every discharge token `tokens` needs.
    ///
    /// `tokens[0]` is the root token; any further tokens are unbound
    /// discharges already in hand. Outstanding caveats are resolved in
    /// rounds, each round concurrently, until no caveat at any depth is
    /// missing a discharge. Each caveat identifier is requested at most
    /// once. Returns `[root, bound discharges...]`.
    #[instrument(skip_all, fields(tokens = tokens.len()))]
    pub async fn discharge_all(
        &self,
        tokens: &[Macaroon],
        discharger: &dyn Discharger,
    ) -> Result<Vec<Macaroon>> {
        let (root, supplied) = tokens.split_first().ok_or(BakeryError::NoTokens)?;

        let mut discharges: Vec<Macaroon> = supplied.to_vec();
        let mut seen: HashSet<Vec<u8>> = discharges
            .iter()
            .map(|d| d.identifier().to_vec())
            .collect();

        let mut pending = Vec::new();
        for token in tokens {
            queue_missing(token, &mut seen, &mut pending);
        }

        let mut round = 0usize;
        while !pending.is_empty() {
            round += 1;
            if discharges.len() + pending.len() > self.config.max_discharges {
                return Err(BakeryError::DischargeLimit(self.config.max_discharges));
            }
            debug!(round, outstanding = pending.len(), "resolving discharges");

            let batch = std::mem::take(&mut pending);
            let resolved = try_join_all(batch.iter().map(|caveat| resolve(discharger, caveat))).await?;

            for discharge in resolved {
                queue_missing(&discharge, &mut seen, &mut pending);
                discharges.push(discharge);
            }
        }

        let mut bound = Vec::with_capacity(discharges.len() + 1);
        bound.push(root.clone());
        bound.extend(discharges.iter().map(|d| d.bind(root)));

        info!(discharges = bound.len() - 1, rounds = round, "discharged token");
        Ok(bound)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Verification
    // ─────────────────────────────────────────────────────────────────────────

    /// Verify `[root, bound discharges...]`.
    ///
    /// A first-party caveat is satisfied when any default or supplied
    /// verifier accepts its condition. At most `max_discharges` discharges
    /// are accepted. An unknown key id still runs the full verification,
    /// under a placeholder key, before it is reported.
    #[instrument(skip_all, fields(tokens = tokens.len()))]
    pub async fn verify(&self, tokens: &[Macaroon], verifiers: &[CaveatVerifier]) -> Result<()> {
        let (root, discharges) = tokens.split_first().ok_or(BakeryError::NoTokens)?;
        if discharges.len() > self.config.max_discharges {
            warn!(discharges = discharges.len(), "too many discharges presented");
            return Err(BakeryError::DischargeLimit(self.config.max_discharges));
        }

        let key_id = KeyId::from_bytes(root.identifier());
        let stored = self.config.root_key_store.get(&key_id).await?;
        let known = stored.is_some();
        let root_key =
            stored.unwrap_or_else(|| RootKey::from_bytes(vec![0; self.config.root_key_size]));

        let checker = |predicate: &[u8]| match Condition::from_bytes(predicate) {
            Ok(condition) => self
                .config
                .default_verifiers
                .iter()
                .chain(verifiers)
                .any(|v| v.verify(&condition)),
            Err(_) => false,
        };

        match (known, root.verify(&root_key, discharges, checker)) {
            (true, Ok(())) => {
                debug!(key_id = %key_id, "token verified");
                Ok(())
            }
            (true, Err(e)) => {
                warn!(key_id = %key_id, error = %e, "token rejected");
                Err(BakeryError::Verification(e))
            }
            (false, _) => {
                warn!(key_id = %key_id, "unknown root key id");
                Err(BakeryError::UnknownKeyId(key_id))
            }
        }
    }

    /// Verify, accepting only conditions whose canonical text is listed.
    pub async fn verify_exact(&self, tokens: &[Macaroon], exact: &[&str]) -> Result<()> {
        let verifiers: Vec<CaveatVerifier> =
            exact.iter().map(|text| CaveatVerifier::exact(*text)).collect();
        self.verify(tokens, &verifiers).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Serialization
    // ─────────────────────────────────────────────────────────────────────────

    /// Serialize one token.
    pub fn serialize(&self, token: &Macaroon) -> Result<Vec<u8>> {
        token.to_bytes().map_err(BakeryError::Serialization)
    }

    /// Deserialize one token.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<Macaroon> {
        Macaroon::from_bytes(bytes).map_err(BakeryError::Serialization)
    }

    /// Serialize `[root, discharges...]` into one bearer string.
    pub fn serialize_all(&self, tokens: &[Macaroon], encoding: Encoding) -> Result<String> {
        if tokens.is_empty() {
            return Err(BakeryError::NoTokens);
        }
        encode_all(tokens, encoding).map_err(BakeryError::Serialization)
    }

    /// Parse a bearer string, JSON or base64.
    pub fn deserialize_all(&self, text: &str) -> Result<Vec<Macaroon>> {
        decode_all(text).map_err(BakeryError::Serialization)
    }

    /// The caveats of `token` in application order.
    pub fn caveats_of(token: &Macaroon) -> Result<Vec<TokenCaveat>> {
        token
            .caveats()
            .iter()
            .map(|packet| TokenCaveat::from_packet(packet).map_err(BakeryError::from))
            .collect()
    }
}

fn queue_missing(token: &Macaroon, seen: &mut HashSet<Vec<u8>>, pending: &mut Vec<ThirdPartyCaveat>) {
    for caveat in token.third_party_caveats() {
        if seen.insert(caveat.identifier.clone()) {
            pending.push(caveat);
        }
    }
}

async fn resolve(discharger: &dyn Discharger, caveat: &ThirdPartyCaveat) -> Result<Macaroon> {
    let discharge = discharger.get_discharge(caveat).await?;
    if discharge.identifier() != caveat.identifier.as_slice() {
        return Err(BakeryError::InvalidDischarge(format!(
            "token from {} does not match the requested caveat",
            caveat.location
        )));
    }
    Ok(discharge)
}

#[async_trait]
impl DischargeAuthority for Bakery {
    fn location(&self) -> &str {
        &self.config.location
    }

    async fn handle(&self, request: DischargeRequest) -> DischargeResponse {
        let token = match self.discharge(&request.caveat, &request.value).await {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "discharge refused");
                return DischargeResponse::Denied;
            }
        };

        DischargeResponse::discharged(&token).unwrap_or_else(|e| {
            warn!(error = %e, "cannot encode discharge token");
            DischargeResponse::Denied
        })
    }
}
