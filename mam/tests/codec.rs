mod common;

use common::*;
use iota_mam::*;
use iota_trinary::num::trit_sum;
use iota_trinary::trytes::trits_from_trytes;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn modes() -> Vec<Mode> {
    vec![
        Mode::Public,
        Mode::Private,
        Mode::Restricted("SHAREDSECRET".parse().unwrap()),
    ]
}

#[test]
fn every_mode_round_trips() {
    init_tracing();
    let payload = trits_from_trytes("THE9QUICK9BROWN9FOX").unwrap();
    for security in [Security::LOW, Security::MEDIUM, Security::HIGH] {
        for mode in modes() {
            let state = ChannelState::with_window(seed(), security, 2, 3, 2)
                .unwrap()
                .with_mode(mode.clone());
            let (published, next) = state.publish(&payload).unwrap();
            assert_eq!(published.address, mode.address(&published.root));

            let message = decode(&published.payload, mode.side_key(), &published.root).unwrap();
            assert_eq!(message.payload, payload, "{mode} at {security}");
            assert_eq!(&message.next_root, next.root());
        }
    }
}

#[test]
fn high_security_windows_publish_and_decode() {
    init_tracing();
    let state = ChannelState::with_window(seed(), Security::HIGH, 0, 2, 1).unwrap();
    let payload = trits_from_trytes("HIGH").unwrap();
    let (published, next) = state.publish(&payload).unwrap();
    assert_eq!(next.security(), Security::HIGH);

    let message = decode(&published.payload, None, &published.root).unwrap();
    assert_eq!(message.payload, payload);
    assert_eq!(&message.next_root, next.root());
}

#[test]
fn single_trit_flips_are_detected() {
    init_tracing();
    let state = ChannelState::with_window(seed(), Security::LOW, 0, 3, 1).unwrap();
    let payload = trits_from_trytes(&"TAMPERPROOF".repeat(30)).unwrap();
    let (published, _) = state.publish(&payload).unwrap();

    let mut rng = StdRng::seed_from_u64(0x4d414d);
    for _ in 0..64 {
        let mut blob = published.payload.clone();
        let at = rng.gen_range(0..blob.len());
        blob[at] = trit_sum(blob[at], rng.gen_range(1..=2));
        let result = decode(&blob, None, &published.root);
        assert!(
            matches!(result, Err(MamError::AuthenticationFailed(_))),
            "flip at {at} of {} went unnoticed",
            blob.len()
        );
    }
}

#[test]
fn messages_only_open_under_their_own_root() {
    let state = ChannelState::init(seed(), Security::LOW, 0).unwrap();
    let (first, state) = state.publish(&trits_from_trytes("FIRST").unwrap()).unwrap();
    let (second, _) = state.publish(&trits_from_trytes("SECOND").unwrap()).unwrap();

    assert!(decode(&first.payload, None, &second.root)
        .unwrap_err()
        .is_authentication_failure());
    assert!(decode(&second.payload, None, &first.root)
        .unwrap_err()
        .is_authentication_failure());
}

#[test]
fn side_keys_discriminate() {
    let key: SideKey = "ALICE".parse().unwrap();
    let state = ChannelState::init(seed(), Security::LOW, 11)
        .unwrap()
        .with_mode(Mode::Restricted(key.clone()));
    let (published, _) = state.publish(&trits_from_trytes("HI").unwrap()).unwrap();

    for other in ["BOB", "ALICF", "ALICE9A"] {
        let other: SideKey = other.parse().unwrap();
        assert!(decode(&published.payload, Some(&other), &published.root).is_err());
    }
    // Trailing nines pad to the same key.
    let padded: SideKey = "ALICE999".parse().unwrap();
    assert!(decode(&published.payload, Some(&padded), &published.root).is_ok());
    assert!(decode(&published.payload, Some(&key), &published.root).is_ok());
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(4))]

    #[test]
    fn arbitrary_payloads_round_trip(payload in "[9A-Z]{0,120}", start in 0usize..1000) {
        let payload = trits_from_trytes(&payload).unwrap();
        let state = ChannelState::init(seed(), Security::LOW, start).unwrap();
        let (published, _) = state.publish(&payload).unwrap();
        let message = decode(&published.payload, None, &published.root).unwrap();
        prop_assert_eq!(message.payload, payload);
        prop_assert_eq!(published.leaf_index, start);
    }
}
