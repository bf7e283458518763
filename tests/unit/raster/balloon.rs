use super::*;

use crate::overlay::engine::BoxId;

fn balloon(text: &str, left: f64, top: f64, width: f64, height: f64) -> OverlayBox {
    OverlayBox {
        id: BoxId(0),
        left,
        top,
        width,
        height,
        text: text.to_string(),
    }
}

#[test]
fn surface_dimensions_follow_the_export_scale() {
    let raster = BalloonRaster::new();
    let b = balloon("", 40.0, 20.0, 100.0, 80.0);

    let out = raster.rasterize(&b, 2.0).unwrap();
    // Width picks up the fixed slack; height does not.
    assert_eq!(out.width, 215);
    assert_eq!(out.height, 160);
    assert_eq!(out.left, 80.0);
    assert_eq!(out.top, 40.0);
    assert_eq!(out.rgba8.len(), 215 * 160 * 4);
}

#[test]
fn tiny_boxes_still_produce_a_surface() {
    let raster = BalloonRaster::new();
    let b = balloon("", 0.0, 0.0, 0.1, 0.1);

    let out = raster.rasterize(&b, 0.1).unwrap();
    assert!(out.width >= 1);
    assert!(out.height >= 1);
}

#[test]
fn balloon_fill_is_white_inside_the_border() {
    let raster = BalloonRaster::new();
    let b = balloon("", 0.0, 0.0, 60.0, 40.0);

    let out = raster.rasterize(&b, 1.0).unwrap();
    // Sample the center pixel, well clear of the 5 px border.
    let cx = (out.width / 2) as usize;
    let cy = (out.height / 2) as usize;
    let idx = (cy * out.width as usize + cx) * 4;
    assert_eq!(&out.rgba8[idx..idx + 4], &[255, 255, 255, 255]);
}

#[test]
fn into_layer_rounds_document_positions() {
    let layer = RasterizedBalloon {
        name: "hi".to_string(),
        left: 10.6,
        top: 3.2,
        width: 2,
        height: 1,
        rgba8: vec![0u8; 8],
    }
    .into_layer()
    .unwrap();

    assert_eq!(layer.name, "hi");
    assert_eq!(layer.bounds.left, 11);
    assert_eq!(layer.bounds.top, 3);
}

#[test]
fn rasterize_all_keeps_input_order() {
    let raster = BalloonRaster::new();
    let boxes = vec![
        balloon("one", 0.0, 0.0, 50.0, 40.0),
        balloon("two", 10.0, 10.0, 50.0, 40.0),
        balloon("three", 20.0, 20.0, 50.0, 40.0),
    ];

    let out = raster.rasterize_all(&boxes, 1.0).unwrap();
    let names: Vec<_> = out.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, vec!["one", "two", "three"]);
}

#[test]
fn wrap_breaks_greedily_at_the_surface_width() {
    // Advance estimate: 30 px * 0.55 = 16.5 px per glyph.
    let lines = wrap_words("hello world", 300.0);
    assert_eq!(lines, vec!["hello world"]);

    let lines = wrap_words("hello world", 100.0);
    assert_eq!(lines, vec!["hello", "world"]);
}

#[test]
fn single_word_never_splits() {
    let lines = wrap_words("supercalifragilistic", 10.0);
    assert_eq!(lines, vec!["supercalifragilistic"]);
}

#[test]
fn svg_text_uses_the_line_grid_and_escapes_markup() {
    let svg = balloon_svg("a <b> & \"c\"", 400, 200);
    assert!(svg.contains("y=\"50\""));
    assert!(svg.contains("&lt;b&gt;"));
    assert!(svg.contains("&amp;"));
    assert!(svg.contains("&quot;c&quot;"));
    assert!(!svg.contains("<b>"));

    // Non-final wrapped lines indent at 10, the last at 20.
    let svg = balloon_svg("hello world", 100, 200);
    assert!(svg.contains("x=\"10\" y=\"50\""));
    assert!(svg.contains("x=\"20\" y=\"80\""));
}

#[test]
fn blank_text_renders_no_text_element() {
    let svg = balloon_svg("   ", 100, 100);
    assert!(!svg.contains("<text"));
}
