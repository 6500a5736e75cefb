//! Multi-party delegation through real discharge exchanges.
//!
//! TS is the target service, FS a first-party discharger that attenuates
//! TS tokens, AS the authorization service caveats are delegated to.

use std::sync::Arc;

use bakery::discharge::{discharger_fn, DischargeError, Discharger};
use bakery::{
    Bakery, BakeryError, Caveat, CaveatVerifier, Condition, Encoding, Macaroon, ThirdPartyCaveat,
    TokenCaveat,
};
use bakery_testkit::{init_tracing, ThreePartyFixture, AUTH_LOCATION, DISCHARGER_LOCATION, TARGET_LOCATION};

fn cond(text: &str) -> Condition {
    Condition::parse(text).unwrap()
}

/// Resolver that asks `authority` directly, presenting `value`.
fn direct(authority: Arc<Bakery>, value: &'static str) -> impl Discharger {
    discharger_fn(move |caveat: ThirdPartyCaveat| {
        let authority = authority.clone();
        async move {
            authority
                .discharge(&caveat, value)
                .await
                .map_err(DischargeError::from)
        }
    })
}

async fn nested_discharge(
    auth: &Bakery,
    fs: &Bakery,
    caveat: &ThirdPartyCaveat,
) -> bakery::Result<Macaroon> {
    if caveat.location != AUTH_LOCATION {
        return fs.discharge(caveat, "5").await;
    }
    let discharge = auth.discharge(caveat, "bob").await?;
    auth.attenuate(
        &discharge,
        &Caveat::third_party(DISCHARGER_LOCATION, cond("level >= 3")),
    )
    .await
}

async fn delegated_token(fixture: &ThreePartyFixture) -> Macaroon {
    let token = fixture.target.mint(&[]).await.unwrap();
    fixture
        .discharger
        .attenuate(&token, &Caveat::third_party(AUTH_LOCATION, cond("user = bob")))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_three_party_discharge_with_closure() {
    init_tracing();
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;

    let tokens = fixture
        .target
        .discharge_all(&[token.clone()], &direct(fixture.auth.clone(), "bob"))
        .await
        .unwrap();

    assert!(tokens.len() >= 2);
    assert_eq!(tokens[0], token);
    for discharge in &tokens[1..] {
        assert_eq!(discharge.location(), AUTH_LOCATION);
        assert_ne!(discharge.signature(), token.signature());
    }
    fixture.target.verify(&tokens, &[]).await.unwrap();
}

#[tokio::test]
async fn test_three_party_discharge_over_network() {
    init_tracing();
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;

    let tokens = fixture
        .target
        .discharge_all(&[token], &fixture.network.discharger("bob"))
        .await
        .unwrap();
    assert_eq!(tokens.len(), 2);
    fixture.target.verify(&tokens, &[]).await.unwrap();
}

#[tokio::test]
async fn test_network_denial_propagates() {
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;

    let result = fixture
        .target
        .discharge_all(&[token], &fixture.network.discharger("alice"))
        .await;
    assert!(matches!(
        result,
        Err(BakeryError::Discharge(DischargeError::Denied))
    ));
}

#[tokio::test]
async fn test_discharge_does_not_verify_for_other_root() {
    let fixture = ThreePartyFixture::new().await;
    let first = delegated_token(&fixture).await;
    let second = delegated_token(&fixture).await;

    let caveat = &first.third_party_caveats()[0];
    let discharge = fixture.auth.discharge(caveat, "bob").await.unwrap();

    let rebound = vec![first.clone(), discharge.bind(&second)];
    assert!(fixture.target.verify(&rebound, &[]).await.is_err());

    let stolen = vec![second.clone(), discharge.bind(&first)];
    assert!(fixture.target.verify(&stolen, &[]).await.is_err());

    let proper = vec![first.clone(), discharge.bind(&first)];
    fixture.target.verify(&proper, &[]).await.unwrap();
}

#[tokio::test]
async fn test_missing_discharge_fails_verification() {
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;

    let result = fixture.target.verify(&[token], &[]).await;
    let err = result.unwrap_err();
    assert!(matches!(err, BakeryError::Verification(_)));
    assert_eq!(err.public().to_string(), "not authorized");
}

#[tokio::test]
async fn test_unbound_discharge_fails_verification() {
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;
    let discharge = fixture
        .auth
        .discharge(&token.third_party_caveats()[0], "bob")
        .await
        .unwrap();

    assert!(fixture.target.verify(&[token, discharge], &[]).await.is_err());
}

#[tokio::test]
async fn test_nested_third_party_caveats() {
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;

    // AS answers with a discharge that itself delegates to FS.
    let auth = fixture.auth.clone();
    let fs = fixture.discharger.clone();
    let resolver = discharger_fn(move |caveat: ThirdPartyCaveat| {
        let auth = auth.clone();
        let fs = fs.clone();
        async move {
            nested_discharge(&auth, &fs, &caveat)
                .await
                .map_err(DischargeError::from)
        }
    });

    let tokens = fixture.target.discharge_all(&[token], &resolver).await.unwrap();
    assert_eq!(tokens.len(), 3);
    assert_eq!(tokens[2].location(), DISCHARGER_LOCATION);
    fixture.target.verify(&tokens, &[]).await.unwrap();

    // Dropping the inner discharge breaks the chain.
    assert!(fixture.target.verify(&tokens[..2], &[]).await.is_err());
}

#[tokio::test]
async fn test_supplied_discharges_are_not_requested_again() {
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;
    let discharge = fixture
        .auth
        .discharge(&token.third_party_caveats()[0], "bob")
        .await
        .unwrap();

    let refuse = discharger_fn(|_caveat| async { Err::<Macaroon, _>(DischargeError::Denied) });
    let tokens = fixture
        .target
        .discharge_all(&[token, discharge], &refuse)
        .await
        .unwrap();
    assert_eq!(tokens.len(), 2);
    fixture.target.verify(&tokens, &[]).await.unwrap();
}

#[tokio::test]
async fn test_first_and_third_party_mixed() {
    let fixture = ThreePartyFixture::new().await;
    let token = fixture
        .target
        .mint(&[Caveat::first_party(cond("account = 3735928559"))])
        .await
        .unwrap();
    let token = fixture
        .discharger
        .attenuate_all(
            &token,
            &[
                Caveat::third_party(AUTH_LOCATION, cond("user = bob")),
                Caveat::first_party(cond("time < 2030")),
            ],
        )
        .await
        .unwrap();

    let caveats = Bakery::caveats_of(&token).unwrap();
    assert_eq!(caveats.len(), 3);
    assert_eq!(caveats[0], TokenCaveat::FirstParty(cond("account = 3735928559")));
    assert_eq!(caveats[1], Caveat::third_party(AUTH_LOCATION, cond("user = bob")));
    assert_eq!(caveats[2], Caveat::first_party(cond("time < 2030")));

    let tokens = fixture
        .target
        .discharge_all(&[token], &fixture.network.discharger("bob"))
        .await
        .unwrap();

    let verifiers = [
        CaveatVerifier::exact("account = 3735928559"),
        CaveatVerifier::satisfied_by("time", "2026"),
    ];
    fixture.target.verify(&tokens, &verifiers).await.unwrap();
    assert!(fixture.target.verify(&tokens, &verifiers[..1]).await.is_err());
}

#[tokio::test]
async fn test_local_caveat_discharged_by_target() {
    let fixture = ThreePartyFixture::new().await;
    let token = fixture.target.mint(&[]).await.unwrap();
    let token = fixture
        .target
        .attenuate(&token, &Caveat::local(cond("role = admin")))
        .await
        .unwrap();
    assert_eq!(token.third_party_caveats()[0].location, TARGET_LOCATION);

    let tokens = fixture
        .target
        .discharge_all(&[token], &fixture.network.discharger("admin"))
        .await
        .unwrap();
    fixture.target.verify(&tokens, &[]).await.unwrap();
}

#[tokio::test]
async fn test_bearer_string_roundtrip() {
    let fixture = ThreePartyFixture::new().await;
    let token = delegated_token(&fixture).await;
    let tokens = fixture
        .target
        .discharge_all(&[token], &fixture.network.discharger("bob"))
        .await
        .unwrap();

    for encoding in [Encoding::Json, Encoding::Base64] {
        let text = fixture.target.serialize_all(&tokens, encoding).unwrap();
        let decoded = fixture.target.deserialize_all(&text).unwrap();
        assert_eq!(decoded, tokens);
        fixture.target.verify(&decoded, &[]).await.unwrap();
    }
}

#[tokio::test]
async fn test_concurrent_mints_get_distinct_keys() {
    let fixture = ThreePartyFixture::new().await;

    let mut handles = Vec::new();
    for _ in 0..16 {
        let target = fixture.target.clone();
        handles.push(tokio::spawn(async move { target.mint(&[]).await.unwrap() }));
    }

    let mut ids = std::collections::HashSet::new();
    for handle in handles {
        let token = handle.await.unwrap();
        assert!(ids.insert(token.identifier().to_vec()));
        fixture.target.verify(&[token], &[]).await.unwrap();
    }
}
