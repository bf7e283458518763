use super::*;

fn bounds(width: u32, height: u32) -> LayerBounds {
    LayerBounds {
        left: 0,
        top: 0,
        width,
        height,
    }
}

fn model_2x2() -> DocumentModel {
    DocumentModel {
        width: 2,
        height: 2,
        composite: CompositeImage {
            width: 2,
            height: 2,
            rgba8: vec![0u8; 16],
        },
        children: vec![LayerNode::raster("bg", bounds(2, 2), vec![0u8; 16]).unwrap()],
    }
}

#[test]
fn raster_constructor_checks_byte_length() {
    assert!(LayerNode::raster("ok", bounds(2, 1), vec![0u8; 8]).is_ok());

    let err = LayerNode::raster("bad", bounds(2, 1), vec![0u8; 7]).unwrap_err();
    assert!(matches!(err, ToonletterError::Validation(_)));
}

#[test]
fn overflowing_bounds_cannot_build_a_raster_leaf() {
    let huge = LayerBounds {
        left: 0,
        top: 0,
        width: u32::MAX,
        height: u32::MAX,
    };
    let err = LayerNode::raster("x", huge, vec![0u8; 4]).unwrap_err();
    assert!(matches!(err, ToonletterError::Validation(_)));
}

#[test]
fn node_count_walks_the_tree() {
    let leaf = |name: &str| LayerNode::raster(name, bounds(1, 1), vec![0u8; 4]).unwrap();
    let inner = LayerNode::group("inner", bounds(0, 0), vec![leaf("a"), leaf("b")]);
    let outer = LayerNode::group("outer", bounds(0, 0), vec![inner, leaf("c")]);

    assert_eq!(outer.node_count(), 5);
    assert_eq!(leaf("d").node_count(), 1);
}

#[test]
fn children_is_none_for_raster_leaves() {
    let leaf = LayerNode::raster("a", bounds(1, 1), vec![0u8; 4]).unwrap();
    assert!(leaf.children().is_none());

    let group = LayerNode::group("g", bounds(0, 0), vec![leaf]);
    assert_eq!(group.children().map(<[LayerNode]>::len), Some(1));
}

#[test]
fn validate_rejects_mismatched_composite() {
    let mut model = model_2x2();
    assert!(model.validate().is_ok());

    model.composite.width = 3;
    assert!(model.validate().is_err());

    let mut model = model_2x2();
    model.composite.rgba8.pop();
    assert!(model.validate().is_err());

    let mut model = model_2x2();
    model.width = 0;
    assert!(model.validate().is_err());
}

#[test]
fn with_children_leaves_the_original_untouched() {
    let model = model_2x2();
    let replaced = model.with_children(vec![]);

    assert_eq!(model.layer_count(), 1);
    assert_eq!(replaced.layer_count(), 0);
    assert_eq!(replaced.width, model.width);
    assert_eq!(replaced.composite, model.composite);
}
