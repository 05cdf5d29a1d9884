mod common;

use common::count;
use vt_arcade::core::{DemoHost, GameHost, IndexedFrame};
use vt_arcade::term::{RendererConfig, SixelEncoder, SixelRenderer};
use vt_arcade::types::{SOURCE_HEIGHT, SOURCE_WIDTH};

const BANDS: usize = (SOURCE_HEIGHT + 5) / 6;

fn red_frame() -> IndexedFrame {
    let mut frame = IndexedFrame::new();
    frame.clear(5);
    frame.set_color(5, 255, 0, 0);
    frame
}

#[test]
fn first_frame_carries_palette_and_one_run_per_band() {
    let frame = red_frame();
    let mut renderer = SixelRenderer::new(Vec::new(), 400, 640, RendererConfig::default());
    renderer.render_frame(frame.view()).unwrap();
    let out = renderer.into_inner();

    assert!(out.starts_with(b"\x1bP;1q\"2;1"));
    assert!(out.ends_with(b"\x1b\\"));
    assert_eq!(count(&out, b"#6;2;100;0;0"), 1);
    assert_eq!(count(&out, b"#1;2;0;0;0"), 1);
    // One declaration per register.
    assert_eq!(count(&out, b";2;"), 256);
    assert_eq!(count(&out, b"#6!640"), BANDS);
    assert_eq!(count(&out, b"$"), 0);
}

#[test]
fn unchanged_palette_is_not_resent() {
    let frame = red_frame();
    let mut renderer = SixelRenderer::new(Vec::new(), 200, 320, RendererConfig::default());
    renderer.render_frame(frame.view()).unwrap();
    let first_len = renderer.get_ref().len();
    renderer.render_frame(frame.view()).unwrap();

    let out = renderer.into_inner();
    let second = &out[first_len..];
    assert_eq!(count(second, b";2;"), 0);
    assert_eq!(count(second, b"#6!320~"), BANDS - 1);
    assert!(first_len > second.len());
}

#[test]
fn output_size_barely_depends_on_scale() {
    let mut frame = IndexedFrame::new();
    for x in 0..SOURCE_WIDTH {
        frame.fill_rect(x, 0, 1, SOURCE_HEIGHT, (x / 8 % 16) as u8);
    }

    let small = SixelEncoder::new(200, 320).encode(frame.view()).len();
    let large = SixelEncoder::new(1200, 1920).encode(frame.view()).len();

    assert!(large > small);
    assert!(large <= small + small / 4, "scale 6 grew output from {small} to {large}");
}

#[test]
fn demo_frames_round_out_to_complete_sequences() {
    let mut host = DemoHost::new();
    let mut encoder = SixelEncoder::new(600, 960);
    assert_eq!(encoder.scale(), 3);

    for _ in 0..4 {
        host.step();
        let bytes = encoder.encode(host.frame());
        assert!(bytes.starts_with(b"\x1bP;1q\"3;1"));
        assert!(bytes.ends_with(b"\x1b\\"));
        assert_eq!(count(bytes, b"-"), BANDS - 1);
    }
}
