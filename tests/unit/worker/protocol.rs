use super::*;

use serde_json::json;

#[test]
fn envelopes_carry_the_shared_signature() {
    let env = Envelope::new(SessionId(3), Request::Shutdown);
    assert_eq!(env.signature, SIGNATURE);
    assert_eq!(env.session, SessionId(3));
    assert!(env.validate().is_ok());
}

#[test]
fn foreign_signatures_fail_closed() {
    let mut env = Envelope::new(SessionId(1), Request::Shutdown);
    env.signature = "someone-else".to_string();

    let err = env.validate().unwrap_err();
    assert!(matches!(err, ToonletterError::Protocol(_)));
    assert!(err.to_string().contains("someone-else"));
}

#[test]
fn progress_commands_keep_the_wire_shape() {
    let env = Envelope::new(
        SessionId(2),
        ProgressCommand::Action(ProgressAction::Start),
    );
    let value = serde_json::to_value(&env).unwrap();

    assert_eq!(value["type"], "ProgressAction");
    assert_eq!(value["value"], "start");
    assert_eq!(value["signature"], SIGNATURE);
    assert_eq!(value["session"], 2);

    let back: Envelope<ProgressCommand> = serde_json::from_value(value).unwrap();
    assert_eq!(back, env);
}

#[test]
fn responses_round_trip_through_json() {
    let env = Envelope::new(
        SessionId(5),
        Response::Error {
            reason: "nope".to_string(),
        },
    );
    let value = serde_json::to_value(&env).unwrap();
    assert_eq!(value["type"], "Error");

    let back: Envelope<Response> = serde_json::from_value(value).unwrap();
    assert_eq!(back, env);
}

#[test]
fn raw_validation_accepts_well_formed_messages() {
    let msg = json!({
        "session": 1,
        "signature": SIGNATURE,
        "timestamp_ms": 0,
        "type": "Progress",
        "value": "loading",
    });
    assert!(validate_raw(&msg).is_ok());
}

#[test]
fn raw_validation_rejects_structural_defects() {
    assert!(validate_raw(&json!("just a string")).is_err());
    assert!(validate_raw(&json!({ "type": "Progress", "value": null })).is_err());

    let wrong_signature = json!({
        "signature": "other",
        "type": "Progress",
        "value": null,
    });
    assert!(
        validate_raw(&wrong_signature)
            .unwrap_err()
            .to_string()
            .contains("signature")
    );

    let no_type = json!({ "signature": SIGNATURE, "value": null });
    assert!(
        validate_raw(&no_type)
            .unwrap_err()
            .to_string()
            .contains("type")
    );

    let unknown_type = json!({
        "signature": SIGNATURE,
        "type": "FormatFile",
        "value": null,
    });
    assert!(
        validate_raw(&unknown_type)
            .unwrap_err()
            .to_string()
            .contains("unexpected message type")
    );

    let no_value = json!({ "signature": SIGNATURE, "type": "Progress" });
    assert!(
        validate_raw(&no_value)
            .unwrap_err()
            .to_string()
            .contains("value")
    );
}

#[test]
fn every_documented_type_tag_is_recognized() {
    for kind in RECOGNIZED_TYPES {
        let msg = json!({
            "signature": SIGNATURE,
            "type": kind,
            "value": null,
        });
        assert!(validate_raw(&msg).is_ok(), "{kind} should be recognized");
    }
}
