use super::*;

fn leaf(name: &str, left: i32, top: i32) -> LayerNode {
    let bounds = LayerBounds {
        left,
        top,
        width: 2,
        height: 1,
    };
    LayerNode::raster(name, bounds, vec![7u8; 8]).unwrap()
}

fn sample_model() -> DocumentModel {
    let group_bounds = LayerBounds {
        left: 1,
        top: 2,
        width: 3,
        height: 2,
    };
    DocumentModel {
        width: 4,
        height: 2,
        composite: CompositeImage {
            width: 4,
            height: 2,
            rgba8: (0u8..32).collect(),
        },
        children: vec![
            leaf("배경", 0, 0),
            LayerNode::group("대사", group_bounds, vec![leaf("line1", 1, 2)]),
        ],
    }
}

#[test]
fn round_trips_a_nested_tree() {
    let model = sample_model();
    let bytes = LyrCodec.encode(&model, EncodeVariant::Standard).unwrap();
    let decoded = LyrCodec.decode(&bytes).unwrap();
    assert_eq!(decoded, model);
}

#[test]
fn bad_magic_is_rejected_with_a_reason() {
    let err = LyrCodec.decode(b"PNG\x0dwhatever").unwrap_err();
    assert!(err.to_string().contains("bad magic"), "{err}");
}

#[test]
fn truncated_bytes_name_the_missing_field() {
    let bytes = LyrCodec
        .encode(&sample_model(), EncodeVariant::Standard)
        .unwrap();

    // Cut inside the composite pixel block.
    let err = LyrCodec.decode(&bytes[..20]).unwrap_err();
    assert!(matches!(err, ToonletterError::Decode(_)));
    assert!(err.to_string().contains("truncated"), "{err}");

    // Cut inside the layer tree.
    let err = LyrCodec.decode(&bytes[..bytes.len() - 3]).unwrap_err();
    assert!(err.to_string().contains("truncated"), "{err}");
}

#[test]
fn unknown_version_and_variant_are_rejected() {
    let mut bytes = LyrCodec
        .encode(&sample_model(), EncodeVariant::Standard)
        .unwrap();

    bytes[4] = 9; // version low byte
    assert!(
        LyrCodec
            .decode(&bytes)
            .unwrap_err()
            .to_string()
            .contains("version")
    );

    bytes[4] = 1;
    bytes[6] = 7; // variant tag
    assert!(
        LyrCodec
            .decode(&bytes)
            .unwrap_err()
            .to_string()
            .contains("variant")
    );
}

#[test]
fn absurd_layer_bounds_are_a_decode_error_not_a_crash() {
    // Hand-built container claiming a u32::MAX x u32::MAX raster layer in a
    // 1x1 document; the pixel size multiply must not be trusted.
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"LYRD");
    bytes.extend_from_slice(&1u16.to_le_bytes());
    bytes.push(0); // Standard variant
    bytes.extend_from_slice(&1u32.to_le_bytes()); // document width
    bytes.extend_from_slice(&1u32.to_le_bytes()); // document height
    bytes.extend_from_slice(&[0u8; 4]); // composite pixels
    bytes.extend_from_slice(&1u32.to_le_bytes()); // layer count
    bytes.extend_from_slice(&1u32.to_le_bytes()); // name length
    bytes.push(b'a');
    bytes.extend_from_slice(&0i32.to_le_bytes()); // left
    bytes.extend_from_slice(&0i32.to_le_bytes()); // top
    bytes.extend_from_slice(&u32::MAX.to_le_bytes()); // claimed width
    bytes.extend_from_slice(&u32::MAX.to_le_bytes()); // claimed height
    bytes.push(0); // raster kind

    let err = LyrCodec.decode(&bytes).unwrap_err();
    assert!(matches!(err, ToonletterError::Decode(_)), "{err}");
    assert!(err.to_string().contains("overflow"), "{err}");
}

#[test]
fn encode_enforces_the_variant_dimension_ceiling() {
    let mut model = sample_model();
    model.width = 40_000;
    model.composite.width = 40_000;
    model.composite.rgba8 = vec![0u8; 40_000 * 2 * 4];
    model.children.clear();

    let err = LyrCodec.encode(&model, EncodeVariant::Standard).unwrap_err();
    assert!(matches!(err, ToonletterError::Encode(_)));
    assert!(err.to_string().contains("30000"), "{err}");

    assert!(LyrCodec.encode(&model, EncodeVariant::Large).is_ok());
}

#[test]
fn variant_for_extension_is_case_insensitive() {
    assert_eq!(EncodeVariant::for_extension("lyr"), Some(EncodeVariant::Standard));
    assert_eq!(EncodeVariant::for_extension("LYRB"), Some(EncodeVariant::Large));
    assert_eq!(EncodeVariant::for_extension("png"), None);
}

#[test]
fn decode_failures_are_decode_errors_not_validation() {
    // A structurally readable container whose composite is inconsistent
    // cannot be produced by encode, so corrupt the width after encoding.
    let model = sample_model();
    let mut bytes = LyrCodec.encode(&model, EncodeVariant::Standard).unwrap();
    // width field sits after magic(4) + version(2) + variant(1)
    bytes[7..11].copy_from_slice(&8u32.to_le_bytes());

    let err = LyrCodec.decode(&bytes).unwrap_err();
    assert!(matches!(err, ToonletterError::Decode(_)), "{err}");
}
