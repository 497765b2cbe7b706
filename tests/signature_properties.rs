//! Property tests for the signing protocol

use cardhook::signature::{X_API_KEY, X_ENDPOINT, X_SIGNATURE, X_TIMESTAMP};
use cardhook::{
    Credential, InMemoryCredentialStore, ResponseSigner, SharedSecret, SignatureVerifier,
    VerificationError,
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use proptest::prelude::*;
use std::sync::Arc;

const API_KEY: &str = "partner";

fn components(secret: &[u8]) -> (ResponseSigner, SignatureVerifier) {
    let store = Arc::new(
        InMemoryCredentialStore::new()
            .with_credential(Credential::new(API_KEY, &STANDARD.encode(secret)).unwrap()),
    );
    (ResponseSigner::new(store.clone()), SignatureVerifier::new(store))
}

fn headers<'a>(
    timestamp: &'a str,
    endpoint: &'a str,
    signature: &'a str,
) -> [(&'static str, &'a str); 4] {
    [
        (X_ENDPOINT, endpoint),
        (X_TIMESTAMP, timestamp),
        (X_SIGNATURE, signature),
        (X_API_KEY, API_KEY),
    ]
}

proptest! {
    #[test]
    fn signed_requests_verify(
        secret in prop::collection::vec(any::<u8>(), 1..64),
        timestamp in "[0-9]{1,12}",
        endpoint in "/[a-z/]{0,32}",
        body in prop::collection::vec(any::<u8>(), 0..512),
    ) {
        let (signer, verifier) = components(&secret);
        let signature = signer.sign(API_KEY, &timestamp, &endpoint, Some(&body[..])).unwrap();

        let context = verifier.verify(&headers(&timestamp, &endpoint, &signature)[..], &body);
        prop_assert!(context.is_ok());
    }

    #[test]
    fn any_body_bit_flip_is_rejected(
        secret in prop::collection::vec(any::<u8>(), 1..64),
        body in prop::collection::vec(any::<u8>(), 1..256),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let (signer, verifier) = components(&secret);
        let signature = signer.sign(API_KEY, "1", "/e", Some(&body[..])).unwrap();

        let mut tampered = body.clone();
        tampered[index.index(body.len())] ^= 1 << bit;

        prop_assert_eq!(
            verifier.verify(&headers("1", "/e", &signature)[..], &tampered),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn different_secrets_disagree(
        a in prop::collection::vec(any::<u8>(), 32),
        b in prop::collection::vec(any::<u8>(), 32),
        body in prop::collection::vec(any::<u8>(), 0..128),
    ) {
        prop_assume!(a != b);
        let (signer, _) = components(&a);
        let (_, verifier) = components(&b);
        let signature = signer.sign(API_KEY, "1", "/e", Some(&body[..])).unwrap();

        prop_assert_eq!(
            verifier.verify(&headers("1", "/e", &signature)[..], &body),
            Err(VerificationError::SignatureMismatch)
        );
    }

    #[test]
    fn shared_secret_base64_round_trip(secret in prop::collection::vec(any::<u8>(), 1..64)) {
        let encoded = STANDARD.encode(&secret);
        prop_assert!(SharedSecret::from_base64(&encoded).is_ok());
    }
}
