use crate::*;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use stark_zk_primitives::challenge::short_string;
use stark_zk_primitives::{
    CipherBackend, Ciphertext, Felt, Point, ProtocolConfig, Scalar, SecretKey, She,
};

fn key(x: u64) -> SecretKey {
    SecretKey::from_scalar(Scalar::from(x)).expect("non-zero key")
}

fn seeded(x: u64, seed: u8) -> Prover<ChaCha20Rng> {
    Prover::with_rng(key(x), ChaCha20Rng::from_seed([seed; 32]))
}

/// Echoes its payload back together with the prefix it was given.
struct Echo;

impl ProofStrategy for Echo {
    fn prefix(&self, ctx: &PrefixContext<'_>, _: &ProofRequest) -> Result<Felt, ProverError> {
        Ok(ctx.config.domain)
    }

    fn prove(
        &self,
        ctx: &mut ProofContext<'_>,
        request: &ProofRequest,
    ) -> Result<ProofBundle, ProverError> {
        let ProofRequest::Custom(payload) = request else {
            return Err(ProverError::MismatchedRequest("echo expects a custom payload"));
        };
        Ok(ProofBundle::Custom(serde_json::json!({
            "payload": payload,
            "y": ctx.public_key.to_hex(true),
        })))
    }
}

// ---------- Registry and dispatch ----------

#[test]
fn built_ins_are_registered() {
    let prover = seeded(12345, 1);
    let names: Vec<&str> = prover.strategies().collect();
    assert_eq!(names, vec!["expost", "fund", "transfer", "withdraw", "withdraw_all"]);
    assert_eq!(prover.public_key(), &Point::generator().mul(&Scalar::from(12345u64)));
}

#[test]
fn operation_kind_names_round_trip() {
    for kind in OperationKind::ALL {
        assert_eq!(kind.name().parse::<OperationKind>().unwrap(), kind);
        assert_eq!(kind.to_string(), kind.name());
    }
    assert!(matches!(
        "mint".parse::<OperationKind>(),
        Err(ProverError::UnknownProofType(name)) if name == "mint"
    ));
}

#[test]
fn unknown_proof_type_is_rejected() {
    let mut prover = seeded(12345, 1);
    let err = prover
        .prove("mint", &ProofRequest::Fund(FundParams { nonce: 1 }))
        .unwrap_err();
    assert!(matches!(err, ProverError::UnknownProofType(name) if name == "mint"));
}

#[test]
fn request_for_another_operation_is_rejected() {
    let mut prover = seeded(12345, 1);
    let err = prover
        .prove("withdraw", &ProofRequest::Fund(FundParams { nonce: 1 }))
        .unwrap_err();
    assert!(matches!(err, ProverError::MismatchedRequest(_)));
}

#[test]
fn custom_strategy_dispatch_and_replacement() {
    let mut prover = seeded(12345, 1);
    assert!(prover.register("echo", Box::new(Echo)).is_none());

    let request = ProofRequest::Custom(serde_json::json!({ "n": 7 }));
    let ProofBundle::Custom(out) = prover.prove("echo", &request).unwrap() else {
        panic!("expected a custom bundle");
    };
    assert_eq!(out["payload"]["n"], 7);
    assert_eq!(prover.prefix("echo", &request).unwrap(), prover.config().domain);

    // Replacing a built-in hands back the previous strategy.
    let previous = prover.register("fund", Box::new(Echo));
    assert!(previous.is_some());
    assert!(matches!(
        prover.fund(FundParams { nonce: 1 }),
        Err(ProverError::MismatchedRequest(_))
    ));
}

#[test]
fn prefix_matches_proof_inputs() {
    let mut prover = seeded(12345, 1);
    let request = ProofRequest::Fund(FundParams { nonce: 123 });
    let prefix = prover.prefix("fund", &request).unwrap();
    let out = prover.fund(FundParams { nonce: 123 }).unwrap();
    assert_eq!(prefix, out.inputs.prefix(prover.config()));
}

#[test]
fn prefix_is_available_on_a_shared_prover() {
    let prover = seeded(12345, 1);
    let request = ProofRequest::Fund(FundParams { nonce: 123 });
    let first = prover.prefix("fund", &request).unwrap();
    let again = prover.prefix("fund", &request).unwrap();
    assert_eq!(first, again);
    assert!(matches!(
        prover.prefix("mint", &request),
        Err(ProverError::UnknownProofType(_))
    ));
}

#[test]
fn bundle_serde_carries_any_custom_payload() {
    for payload in [
        serde_json::json!("0xdeadbeef"),
        serde_json::json!([1, 2, 3]),
        serde_json::json!(null),
        serde_json::json!({ "type": "inner", "n": 7 }),
    ] {
        let bundle = ProofBundle::Custom(payload.clone());
        let json = serde_json::to_value(&bundle).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["bundle"], payload);
        let back: ProofBundle = serde_json::from_value(json).unwrap();
        assert_eq!(back, bundle);
    }
}

#[test]
fn bundle_serde_uses_tagged_layout() {
    let mut prover = seeded(12345, 1);
    let bundle = prover.prove("fund", &ProofRequest::Fund(FundParams { nonce: 9 })).unwrap();
    let json = serde_json::to_value(&bundle).unwrap();
    assert_eq!(json["type"], "fund");
    assert_eq!(json["bundle"]["inputs"]["nonce"], 9);
    let back: ProofBundle = serde_json::from_value(json).unwrap();
    assert_eq!(back, bundle);
}

#[test]
fn request_serde_uses_tagged_layout() {
    let request = ProofRequest::Fund(FundParams { nonce: 123 });
    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["type"], "fund");
    assert_eq!(json["params"]["nonce"], 123);
    let back: ProofRequest = serde_json::from_value(json).unwrap();
    assert_eq!(back, request);
}

// ---------- Determinism ----------

#[test]
fn seeded_rng_gives_identical_proofs() {
    let a = seeded(12345, 9).fund(FundParams { nonce: 5 }).unwrap();
    let b = seeded(12345, 9).fund(FundParams { nonce: 5 }).unwrap();
    assert_eq!(a, b);
}

#[test]
fn fresh_nonces_differ_between_proofs() {
    let mut prover = Prover::new(key(12345));
    let a = prover.fund(FundParams { nonce: 5 }).unwrap();
    let b = prover.fund(FundParams { nonce: 5 }).unwrap();
    assert_eq!(a.inputs, b.inputs);
    assert_ne!(a.proof.a, b.proof.a);
    assert_ne!(a.proof.s, b.proof.s);
}

#[test]
fn domain_changes_the_proof() {
    let config =
        ProtocolConfig::new(short_string("other-chain"), ProtocolConfig::default().auditor_key);
    let a = seeded(12345, 9).fund(FundParams { nonce: 5 }).unwrap();
    let b = seeded(12345, 9).with_config(config).fund(FundParams { nonce: 5 }).unwrap();
    assert_eq!(a.proof.a, b.proof.a);
    assert_ne!(a.proof.s, b.proof.s);
}

// ---------- Witness checks ----------

#[test]
fn withdraw_all_rejects_wrong_amount() {
    let mut prover = seeded(12345, 2);
    let balance = She.cipher_balance(prover.public_key(), 42, &Scalar::from(12345u64));
    let params = WithdrawAllParams {
        balance,
        nonce: 1,
        to: Felt::from(9u64),
        amount: 43,
    };
    assert!(matches!(prover.withdraw_all(params), Err(ProverError::InvalidInput(_))));
}

#[test]
fn withdraw_rejects_overdraft_and_wrong_balance() {
    let mut prover = seeded(12345, 3);
    let balance = She.cipher_balance(prover.public_key(), 100, &Scalar::from(77u64));

    let overdraft = WithdrawParams {
        initial_balance: 100,
        amount: 101,
        balance: balance.clone(),
        to: Felt::from(9u64),
        nonce: 1,
    };
    assert!(matches!(prover.withdraw(overdraft), Err(ProverError::Overflow(_))));

    let wrong = WithdrawParams {
        initial_balance: 99,
        amount: 10,
        balance,
        to: Felt::from(9u64),
        nonce: 1,
    };
    assert!(matches!(prover.withdraw(wrong), Err(ProverError::InvalidInput(_))));
}

#[test]
fn transfer_rejects_identity_recipient() {
    let mut prover = seeded(12345, 4);
    let balance = She.cipher_balance(prover.public_key(), 100, &Scalar::from(77u64));
    let params = TransferParams {
        recipient: Point::identity(),
        initial_balance: 100,
        amount: 10,
        balance,
        nonce: 1,
    };
    assert!(matches!(prover.transfer(params), Err(ProverError::Primitive(_))));
}

#[test]
fn transfer_ciphertexts_decrypt_for_each_party() {
    let mut prover = seeded(12345, 5);
    let recipient = key(999);
    let balance = She.cipher_balance(prover.public_key(), 500, &Scalar::from(31u64));
    let out = prover
        .transfer(TransferParams {
            recipient: recipient.public_key(),
            initial_balance: 500,
            amount: 120,
            balance,
            nonce: 8,
        })
        .unwrap();

    let to_self = Ciphertext::new(out.inputs.l.clone(), out.inputs.r.clone());
    let to_recipient = Ciphertext::new(out.inputs.l_bar.clone(), out.inputs.r.clone());
    assert_eq!(She.decipher_balance(&Scalar::from(12345u64), &to_self).unwrap(), 120);
    assert_eq!(She.decipher_balance(&recipient.scalar(), &to_recipient).unwrap(), 120);
}

// ---------- Stealth addresses ----------

#[test]
fn stealth_round_trip() {
    let mut rng = ChaCha20Rng::from_seed([11u8; 32]);
    let scheme = StealthScheme::default();
    let spend = SecretKey::random(&mut rng);
    let view = SecretKey::random(&mut rng);

    let created = scheme
        .create(&spend.public_key(), &view.public_key(), &mut rng)
        .unwrap();
    assert_eq!(created.ephemeral_key, Point::generator().mul(&created.r));
    assert!(scheme.check_ownership(
        &view,
        &spend.public_key(),
        &created.ephemeral_key,
        &created.address
    ));

    let derived = scheme
        .derive_private_key(&spend, &view, &created.ephemeral_key)
        .unwrap();
    assert_eq!(derived.public_key(), created.address);
}

#[test]
fn stealth_wrong_view_key_does_not_match() {
    let mut rng = ChaCha20Rng::from_seed([12u8; 32]);
    let scheme = StealthScheme::default();
    let spend = SecretKey::random(&mut rng);
    let view = SecretKey::random(&mut rng);
    let created = scheme
        .create(&spend.public_key(), &view.public_key(), &mut rng)
        .unwrap();

    let stranger = SecretKey::random(&mut rng);
    let (r, address) = (&created.ephemeral_key, &created.address);
    assert!(!scheme.check_ownership(&stranger, &spend.public_key(), r, address));
    assert!(!scheme.check_ownership(&view, &stranger.public_key(), r, address));
}

#[test]
fn stealth_tag_mismatch_does_not_match() {
    let mut rng = ChaCha20Rng::from_seed([13u8; 32]);
    let sender = StealthScheme::new(short_string("wallet-a"));
    let recipient = StealthScheme::new(short_string("wallet-b"));
    let spend = SecretKey::random(&mut rng);
    let view = SecretKey::random(&mut rng);
    let created = sender
        .create(&spend.public_key(), &view.public_key(), &mut rng)
        .unwrap();
    assert!(!recipient.check_ownership(
        &view,
        &spend.public_key(),
        &created.ephemeral_key,
        &created.address
    ));
}

#[test]
fn stealth_zero_derived_key_is_rejected() {
    let mut rng = ChaCha20Rng::from_seed([14u8; 32]);
    let scheme = StealthScheme::default();
    let view = SecretKey::random(&mut rng);
    let r = Scalar::from(4242u64);
    let ephemeral_key = Point::generator().mul(&r);

    // Spend secret chosen as -k so that x + k == 0.
    let k = scheme.tweak(&view.public_key().mul(&r));
    let spend = SecretKey::from_scalar(-k).unwrap();
    assert!(matches!(
        scheme.derive_private_key(&spend, &view, &ephemeral_key),
        Err(ProverError::DegenerateKey)
    ));
}

#[test]
fn stealth_scan_finds_owned_announcements() {
    let mut rng = ChaCha20Rng::from_seed([15u8; 32]);
    let scheme = StealthScheme::default();
    let spend = SecretKey::random(&mut rng);
    let view = SecretKey::random(&mut rng);
    let other_spend = SecretKey::random(&mut rng);
    let other_view = SecretKey::random(&mut rng);

    let mut announcements = Vec::new();
    for i in 0..5 {
        let created = if i % 2 == 0 {
            scheme.create(&spend.public_key(), &view.public_key(), &mut rng)
        } else {
            scheme.create(&other_spend.public_key(), &other_view.public_key(), &mut rng)
        }
        .unwrap();
        announcements.push(Announcement::from(&created));
    }

    assert_eq!(scheme.scan(&view, &spend.public_key(), &announcements), vec![0, 2, 4]);
    assert_eq!(scheme.scan(&other_view, &other_spend.public_key(), &announcements), vec![1, 3]);
}

#[test]
fn stealth_rejects_identity_keys() {
    let mut rng = ChaCha20Rng::from_seed([16u8; 32]);
    let scheme = StealthScheme::default();
    let view = SecretKey::random(&mut rng);
    assert!(scheme
        .create(&Point::identity(), &view.public_key(), &mut rng)
        .is_err());
}
