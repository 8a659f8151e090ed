#![cfg(feature = "cairo-backend")]

use cairo::{Context, Format, ImageSurface};
use serde_json::json;
use trade_overlay::OverlayError;
use trade_overlay::api::{LayoutStyle, build_panel_layout, estimate_text_width_px, line_height_px};
use trade_overlay::compositor::{OverlayCompositor, decode_png};
use trade_overlay::core::{TradeRecord, Viewport};
use trade_overlay::render::{
    CairoContextRenderer, CairoRenderer, Color, FontWeight, RectPrimitive, RenderFrame, Renderer,
    TextBlockPrimitive, TextPrimitive,
};

fn solid_chart(width: i32, height: i32, color: Color) -> ImageSurface {
    let surface = ImageSurface::create(Format::ARgb32, width, height).expect("surface");
    {
        let context = Context::new(&surface).expect("context");
        context.set_source_rgb(color.red, color.green, color.blue);
        context.paint().expect("paint");
    }
    surface
}

fn pixel_argb(surface: &mut ImageSurface, x: usize, y: usize) -> u32 {
    surface.flush();
    let stride = usize::try_from(surface.stride()).expect("stride");
    let data = surface.data().expect("surface data");
    let offset = y * stride + x * 4;
    u32::from_ne_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

#[test]
fn cairo_renderer_rejects_invalid_surface_size() {
    let err = CairoRenderer::new(0, 480).expect_err("invalid width must fail");
    assert!(matches!(err, OverlayError::InvalidData(_)));
}

#[test]
fn cairo_renderer_draws_rects_texts_and_blocks() {
    let mut renderer = CairoRenderer::new(400, 200).expect("renderer");
    let color = Color::rgb(0.8, 0.8, 0.8);
    let frame = RenderFrame::new(Viewport::new(400, 200))
        .with_rect(RectPrimitive::new(10.0, 10.0, 120.0, 80.0, color).with_corner_radius(8.0))
        .with_text(TextPrimitive::new("Order Volume", 20.0, 20.0, 14.0, color).bold())
        .with_text(TextPrimitive::new("", 20.0, 40.0, 14.0, color))
        .with_text_block(TextBlockPrimitive::new(
            vec!["{".to_owned(), "  \"a\": 1".to_owned(), "}".to_owned()],
            150.0,
            20.0,
            14.0,
            19.6,
            color,
        ));

    renderer.render(&frame).expect("render");
    let stats = renderer.last_stats();
    assert_eq!(stats.rects_drawn, 1);
    assert_eq!(stats.texts_drawn, 2);
    assert_eq!(stats.text_block_lines_drawn, 3);
    assert!(!renderer.encode_png().expect("png").is_empty());
}

#[test]
fn cairo_renderer_can_draw_on_external_context() {
    let mut renderer = CairoRenderer::new(300, 120).expect("renderer");
    let frame = RenderFrame::new(Viewport::new(300, 120)).with_rect(RectPrimitive::new(
        0.0,
        0.0,
        50.0,
        50.0,
        Color::rgb(0.0, 1.0, 0.0),
    ));

    let surface = ImageSurface::create(Format::ARgb32, 300, 120).expect("surface");
    let context = Context::new(&surface).expect("context");
    renderer
        .render_on_cairo_context(&context, &frame)
        .expect("render on context");
    assert_eq!(renderer.last_stats().rects_drawn, 1);
}

#[test]
fn canvas_size_follows_chart_and_layout_dimensions() {
    let compositor = OverlayCompositor::new(20, Color::rgb(0.0, 0.0, 0.0));

    let tall_chart = compositor.canvas_size(Viewport::new(800, 600), Viewport::new(500, 300));
    assert_eq!(tall_chart, Viewport::new(1320, 640));

    let tall_layout = compositor.canvas_size(Viewport::new(800, 200), Viewport::new(500, 900));
    assert_eq!(tall_layout, Viewport::new(1320, 900));
}

#[test]
fn compose_places_chart_at_margin_beside_panels() {
    let style = LayoutStyle::default();
    let record = TradeRecord::from_value(&json!({
        "currentMarketStructure": "BULLISH",
        "orderVolume": 100
    }))
    .expect("record");
    let layout = build_panel_layout(&record, &style).expect("layout");
    let chart = solid_chart(100, 60, Color::rgb(1.0, 0.0, 0.0));

    let compositor = OverlayCompositor::from_style(&style, 20);
    let renderer = compositor.compose(&chart, &layout).expect("compose");
    let stats = renderer.last_stats();
    assert_eq!(stats.rects_drawn, layout.frame.rects.len());
    assert_eq!(stats.texts_drawn, layout.frame.texts.len());

    let expected = compositor.canvas_size(Viewport::new(100, 60), layout.viewport());
    let mut surface = renderer.into_surface();
    assert_eq!(surface.width(), i32::try_from(expected.width).expect("width"));
    assert_eq!(surface.height(), i32::try_from(expected.height).expect("height"));

    assert_eq!(pixel_argb(&mut surface, 50, 50), 0xFFFF_0000, "chart pixel");
    let corner = pixel_argb(&mut surface, 2, 2);
    assert_ne!(corner, 0xFFFF_0000, "margin keeps the background");
    assert_eq!(corner >> 24, 0xFF, "background is opaque");
}

#[test]
fn encoded_composite_round_trips_through_decoder() {
    let style = LayoutStyle::default();
    let record = TradeRecord::from_value(&json!({})).expect("record");
    let layout = build_panel_layout(&record, &style).expect("layout");
    let chart = solid_chart(64, 32, Color::rgb(0.0, 0.0, 1.0));

    let png = OverlayCompositor::from_style(&style, 10)
        .compose(&chart, &layout)
        .expect("compose")
        .encode_png()
        .expect("encode");
    let decoded = decode_png(&png).expect("decode");
    assert_eq!(
        u32::try_from(decoded.width()).expect("width"),
        64 + layout.viewport().width + 10
    );
}

#[test]
fn decode_png_rejects_garbage_bytes() {
    let err = decode_png(b"definitely not a png").expect_err("must fail");
    assert!(matches!(err, OverlayError::Backend(_)));
}

#[test]
fn pango_text_fits_line_height_and_width_estimate() {
    let renderer = CairoRenderer::new(64, 64).expect("renderer");
    let samples = [
        ("Limit Price: 1.08450", 14.0, FontWeight::Regular),
        ("  \"session\": \"London\",", 14.0, FontWeight::Regular),
        ("Stop Loss Pips: 25", 14.0, FontWeight::Regular),
        ("11th Preceding Candle", 14.0, FontWeight::Bold),
        ("Trade Setup Details", 18.0, FontWeight::Bold),
        ("Remaining Details (JSON)", 14.0, FontWeight::Bold),
    ];

    for (text, size, weight) in samples {
        let (width, height) = renderer
            .text_extents_px(text, size, weight)
            .expect("extents");
        assert!(height > 0.0, "`{text}` has no height");
        assert!(
            height <= line_height_px(size),
            "`{text}` is {height}px tall at {size}px"
        );
        assert!(
            width <= estimate_text_width_px(text, size, weight),
            "`{text}` is {width}px wide at {size}px"
        );
    }
}

#[test]
fn rendered_layout_text_stays_inside_panels_and_canvas() {
    let style = LayoutStyle::default();
    let candle = json!({"isIndecisive": true, "open": 1.08415, "close": 1.08432, "high": 1.085, "low": 1.0838});
    let record = TradeRecord::from_value(&json!({
        "currentMarketStructure": "BEARISH",
        "orderVolume": "12.4K",
        "indecisionCandle": candle.clone(),
        "imbalances": {"1": {"bids": ["1.08410", "1.08405"], "asks": ["1.08440"]}},
        "M5": candle,
        "limitOrder": {"limitPrice": 1.0845, "takeProfitPips": 55},
        "session": {"name": "London", "notes": ["sweep of the Asia session high"]}
    }))
    .expect("record");
    let layout = build_panel_layout(&record, &style).expect("layout");
    let renderer = CairoRenderer::new(64, 64).expect("renderer");

    for text in &layout.frame.texts {
        let (width, height) = renderer
            .text_extents_px(&text.text, text.font_size_px, text.weight)
            .expect("extents");
        assert!(text.x + width <= layout.width, "`{}` overflows the canvas", text.text);
        assert!(text.y + height <= layout.height, "`{}` overflows the canvas", text.text);

        let owner = layout.frame.rects.iter().find(|rect| {
            text.x >= rect.x && text.x < rect.right() && text.y >= rect.y && text.y < rect.bottom()
        });
        if let Some(rect) = owner {
            assert!(
                text.y + height <= rect.bottom() + 1e-9,
                "`{}` spills below its panel",
                text.text
            );
        }
    }

    for block in &layout.frame.text_blocks {
        for line in &block.lines {
            let (width, _) = renderer
                .text_extents_px(line, block.font_size_px, FontWeight::Regular)
                .expect("extents");
            assert!(block.x + width <= layout.width, "`{line}` overflows the canvas");
        }
    }
}
