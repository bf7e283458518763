use super::*;

#[test]
fn anchors_scale_linearly_into_viewport_space() {
    // A 1000 px document rendered at 500 px: everything halves.
    let anchor = TextGroupBox {
        name: "line1".to_string(),
        left: 100,
        top: 50,
    };
    let scale = viewport_scale(500.0, 1000);
    let g = to_viewport(&anchor, scale, Size::new(400.0, 300.0));

    assert_eq!(g.left, 50.0);
    assert_eq!(g.top, 25.0);
    assert_eq!(g.width, 400.0);
    assert_eq!(g.height, 300.0);
}

#[test]
fn positions_round_trip_under_reciprocal_scales() {
    let anchor = TextGroupBox {
        name: "x".to_string(),
        left: 360,
        top: 144,
    };
    let forward = viewport_scale(540.0, 720);
    let back = document_scale(540.0, 720);

    let g = to_viewport(&anchor, forward, Size::new(1.0, 1.0));
    let d = to_document(g, back);
    assert!((d.left - 360.0).abs() < 1e-9);
    assert!((d.top - 144.0).abs() < 1e-9);
}

#[test]
fn to_document_scales_every_field() {
    let g = BoxGeometry {
        left: 10.0,
        top: 20.0,
        width: 100.0,
        height: 50.0,
    };
    let d = to_document(g, 2.0);
    assert_eq!(d.left, 20.0);
    assert_eq!(d.top, 40.0);
    assert_eq!(d.width, 200.0);
    assert_eq!(d.height, 100.0);
}

#[test]
fn default_size_picks_by_viewport_width_and_counter_scales() {
    // Viewport narrower than the document: 200x150 at inverse scale 2.
    let narrow = default_balloon_size(500.0, 1000);
    assert_eq!(narrow, Size::new(400.0, 300.0));

    // Viewport wider than the document: 400x300 at inverse scale 0.5.
    let wide = default_balloon_size(2000.0, 1000);
    assert_eq!(wide, Size::new(200.0, 150.0));
}
