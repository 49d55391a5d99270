// Pairing flow against fake discovery and link factory.

mod support;

use std::sync::atomic::Ordering;

use pretty_assertions::assert_eq;

use mowerlink_core::pairing::{PairingInput, pair_device};
use mowerlink_core::{DeviceLink, LinkError, ResponseResult};

use support::{ADDRESS, FakeDiscovery, FakeFactory, FakeLink};

fn input(pin: Option<&str>) -> PairingInput {
    PairingInput {
        address: ADDRESS.to_lowercase(),
        pin: pin.map(str::to_owned),
    }
}

#[tokio::test]
async fn pairing_happy_path_produces_a_profile_record() {
    let link = FakeLink::new();
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link.clone());

    let paired = pair_device(discovery.as_ref(), &factory, &input(Some("1234")))
        .await
        .expect("pairing succeeds");

    assert_eq!(paired.address.as_str(), ADDRESS);
    assert_eq!(paired.pin, Some(1234));
    assert_ne!(paired.channel_id, 0);
    assert_eq!(paired.title, "Husqvarna Automower 305");

    // The factory saw the same identity the record carries.
    let settings = factory.created_settings().expect("factory was used");
    assert_eq!(settings.channel_id, paired.channel_id);
    assert_eq!(settings.pin, Some(1234));

    // The verification session is not left open.
    assert_eq!(link.disconnect_calls.load(Ordering::SeqCst), 1);
    assert!(!link.is_connected());
}

#[tokio::test]
async fn pairing_without_pin_is_allowed() {
    let link = FakeLink::new();
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link);

    let paired = pair_device(discovery.as_ref(), &factory, &input(None))
        .await
        .expect("pairing succeeds");

    assert_eq!(paired.pin, None);
}

#[tokio::test]
async fn malformed_address_never_touches_the_radio() {
    let link = FakeLink::new();
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link);

    let err = pair_device(
        discovery.as_ref(),
        &factory,
        &PairingInput {
            address: "garbage".into(),
            pin: None,
        },
    )
    .await
    .expect_err("pairing fails");

    assert_eq!(err.form_key(), "invalid_address_format");
    assert_eq!(discovery.resolve_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn unresolvable_device_maps_to_device_not_found() {
    let link = FakeLink::new();
    let discovery = FakeDiscovery::empty();
    let factory = FakeFactory::new(link);

    let err = pair_device(discovery.as_ref(), &factory, &input(None))
        .await
        .expect_err("pairing fails");

    assert_eq!(err.form_key(), "device_not_found");
}

#[tokio::test]
async fn link_failure_maps_to_cannot_connect() {
    let link = FakeLink::new();
    link.update_plan(|plan| plan.connect_error = true);
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link);

    let err = pair_device(discovery.as_ref(), &factory, &input(None))
        .await
        .expect_err("pairing fails");

    assert_eq!(err.form_key(), "cannot_connect");
}

#[tokio::test]
async fn rejected_pin_maps_to_invalid_auth() {
    let link = FakeLink::new();
    link.update_plan(|plan| plan.connect_result = ResponseResult::InvalidPin);
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link);

    let err = pair_device(discovery.as_ref(), &factory, &input(Some("0000")))
        .await
        .expect_err("pairing fails");

    assert_eq!(err.form_key(), "invalid_auth");
}

#[tokio::test]
async fn non_auth_rejection_maps_to_cannot_connect() {
    let link = FakeLink::new();
    link.update_plan(|plan| plan.connect_result = ResponseResult::Busy);
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link);

    let err = pair_device(discovery.as_ref(), &factory, &input(None))
        .await
        .expect_err("pairing fails");

    assert_eq!(err.form_key(), "cannot_connect");
}

#[tokio::test]
async fn session_errors_map_to_the_exception_key() {
    let link = FakeLink::new();
    link.update_plan(|plan| {
        plan.identity_error = Some(|| LinkError::Session {
            message: "malformed identity frame".into(),
        });
    });
    let discovery = FakeDiscovery::resolving();
    let factory = FakeFactory::new(link.clone());

    let err = pair_device(discovery.as_ref(), &factory, &input(None))
        .await
        .expect_err("pairing fails");

    assert_eq!(err.form_key(), "exception");
    // Even the failing path releases the session.
    assert!(!link.is_connected());
}
