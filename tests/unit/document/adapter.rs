use super::*;

fn leaf(name: &str, left: i32, top: i32) -> LayerNode {
    let bounds = LayerBounds {
        left,
        top,
        width: 2,
        height: 1,
    };
    LayerNode::raster(name, bounds, vec![9u8; 8]).unwrap()
}

fn sample_model(with_dialogue: bool) -> DocumentModel {
    let mut children = vec![leaf("배경", 0, 0)];
    if with_dialogue {
        let group_bounds = LayerBounds {
            left: 5,
            top: 6,
            width: 10,
            height: 8,
        };
        children.push(LayerNode::group(
            "대사",
            group_bounds,
            vec![leaf("line1", 100, 50), leaf("line2", 120, 80)],
        ));
    }
    DocumentModel {
        width: 4,
        height: 2,
        composite: CompositeImage {
            width: 4,
            height: 2,
            rgba8: vec![1u8; 32],
        },
        children,
    }
}

fn encoded(with_dialogue: bool) -> Vec<u8> {
    LyrCodec
        .encode(&sample_model(with_dialogue), EncodeVariant::Standard)
        .unwrap()
}

#[test]
fn decode_extracts_the_dialogue_seed_in_order() {
    let adapter = CodecAdapter::default();
    let decoded = adapter.decode(&encoded(true)).unwrap();

    assert_eq!(decoded.dialogue.boxes.len(), 2);
    assert_eq!(decoded.dialogue.boxes[0].name, "line1");
    assert_eq!(decoded.dialogue.boxes[0].left, 100);
    assert_eq!(decoded.dialogue.boxes[0].top, 50);
    assert_eq!(decoded.dialogue.boxes[1].name, "line2");

    let group = decoded.dialogue.group.expect("group kept for passthrough");
    assert_eq!(group.name, "대사");
}

#[test]
fn missing_dialogue_group_is_not_an_error() {
    let adapter = CodecAdapter::default();
    let decoded = adapter.decode(&encoded(false)).unwrap();

    assert!(decoded.dialogue.boxes.is_empty());
    assert!(decoded.dialogue.group.is_none());
}

#[test]
fn group_detection_honors_the_configured_name() {
    let adapter = CodecAdapter::new(
        Box::new(LyrCodec),
        AdapterConfig {
            dialogue_group: "dialogue".to_string(),
        },
    );
    // A "대사" group no longer matches under the custom name.
    let decoded = adapter.decode(&encoded(true)).unwrap();
    assert!(decoded.dialogue.boxes.is_empty());
}

#[test]
fn raster_layer_with_dialogue_name_is_ignored() {
    let mut model = sample_model(false);
    model.children.push(leaf("대사", 0, 0));
    let bytes = LyrCodec.encode(&model, EncodeVariant::Standard).unwrap();

    let decoded = CodecAdapter::default().decode(&bytes).unwrap();
    assert!(decoded.dialogue.group.is_none());
}

#[test]
fn export_with_no_balloons_leaves_the_document_unchanged() {
    let adapter = CodecAdapter::default();
    let decoded = adapter.decode(&encoded(true)).unwrap();

    let bytes = adapter
        .encode_with_export_group(
            &decoded.model,
            vec![],
            decoded.dialogue.group.as_ref(),
            EncodeVariant::Standard,
        )
        .unwrap();
    let round = adapter.decode(&bytes).unwrap();
    assert_eq!(round.model, decoded.model);
}

#[test]
fn export_splices_a_named_group_on_top() {
    let adapter = CodecAdapter::default();
    let decoded = adapter.decode(&encoded(true)).unwrap();
    let before = decoded.model.children.len();

    let balloons = vec![leaf("hello", 40, 20)];
    let bytes = adapter
        .encode_with_export_group(
            &decoded.model,
            balloons,
            decoded.dialogue.group.as_ref(),
            EncodeVariant::Standard,
        )
        .unwrap();

    let round = adapter.decode(&bytes).unwrap();
    let spliced = round.model.children.last().unwrap();
    assert_eq!(round.model.children.len(), before + 1);
    assert_eq!(spliced.name, EXPORT_GROUP_NAME);
    assert_eq!(spliced.children().map(<[LayerNode]>::len), Some(1));
    // Bounds carried over from the detected dialogue group.
    assert_eq!(spliced.bounds, decoded.dialogue.group.unwrap().bounds);

    // The input model is never mutated by the splice.
    assert_eq!(decoded.model.children.len(), before);
}

#[test]
fn flat_image_decodes_as_a_single_background_layer() {
    let mut png = Vec::new();
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
    img.write_to(
        &mut std::io::Cursor::new(&mut png),
        image::ImageFormat::Png,
    )
    .unwrap();

    let decoded = CodecAdapter::default().decode_flat_image(&png).unwrap();
    assert_eq!(decoded.model.width, 3);
    assert_eq!(decoded.model.height, 2);
    assert_eq!(decoded.model.layer_count(), 1);
    assert_eq!(decoded.model.children[0].name, "Background");
    assert!(decoded.dialogue.boxes.is_empty());
}
