use std::path::{Path, PathBuf};

use image::{DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

use rememe::{
    Color, DEFAULT_CLUSTER_AMOUNT, DEFAULT_CLUSTER_RANGE, FileCodec, ImageCodec, Region,
    RememeError, SubstitutionEngine,
};

const GRAY: Rgba<u8> = Rgba([90, 90, 90, 255]);
const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

fn write(dir: &TempDir, name: &str, image: DynamicImage) -> PathBuf {
    let path = dir.path().join(name);
    FileCodec.save(&image, &path).expect("Error Saving File.");
    path
}

fn meme_template(side: u32) -> RgbaImage {
    RgbaImage::from_fn(100, 100, |x, y| {
        let inside = (30..30 + side).contains(&x) && (30..30 + side).contains(&y);
        if inside { WHITE } else { GRAY }
    })
}

fn fixtures(dir: &TempDir) -> (PathBuf, PathBuf) {
    let template = write(dir, "template.png", DynamicImage::ImageRgba8(meme_template(40)));
    let substitute = write(dir, "red.png", DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, RED)));
    (template, substitute)
}

#[test]
fn white_placeholder_is_replaced_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let (template, substitute) = fixtures(&dir);
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();

    let output = engine.substitute(&template, &substitute, 0, None).unwrap();

    let record = engine.last_substitution().unwrap();
    assert_eq!(record.region, Region::new(30, 30, 40, 40, 1600));
    assert_eq!(record.coverage(), 0.16);
    assert_eq!(output.get_pixel(0, 0), GRAY);
    assert_eq!(output.get_pixel(50, 50), RED);
    assert!(engine.validate_last_substitution(0.1, 0.9).unwrap());
}

#[test]
fn default_clustering_finds_a_dominant_white_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    // White covers 64% of the canvas, so it outweighs the gray frame.
    let big = RgbaImage::from_fn(100, 100, |x, y| {
        if (10..90).contains(&x) && (10..90).contains(&y) { WHITE } else { GRAY }
    });
    let template = write(&dir, "big.png", DynamicImage::ImageRgba8(big));
    let substitute = write(&dir, "red.png", DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, RED)));
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();

    engine
        .substitute(&template, &substitute, DEFAULT_CLUSTER_AMOUNT, None)
        .unwrap();

    let record = engine.last_substitution().unwrap();
    assert_eq!(record.dominant_color, Color::WHITE);
    assert_eq!(record.region, Region::new(10, 10, 80, 80, 6400));
}

#[test]
fn lossy_template_is_still_matched_within_tolerance() {
    let dir = tempfile::tempdir().unwrap();
    let rgb = RgbImage::from_fn(100, 100, |x, y| {
        let inside = (32..72).contains(&x) && (32..72).contains(&y);
        if inside { Rgb([255, 255, 255]) } else { Rgb([90, 90, 90]) }
    });
    let template = write(&dir, "template.jpg", DynamicImage::ImageRgb8(rgb));
    let substitute = write(&dir, "red.png", DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, RED)));
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();

    engine.substitute(&template, &substitute, 0, None).unwrap();

    let region = engine.last_substitution().unwrap().region;
    for (found, expected) in [(region.x, 32), (region.y, 32), (region.width, 40), (region.height, 40)] {
        assert!(found.abs_diff(expected) <= 2, "{region:?}");
    }
    assert!(engine.validate_last_substitution(0.1, 0.9).unwrap());
}

#[test]
fn foolproof_sweep_returns_first_valid_output() {
    let dir = tempfile::tempdir().unwrap();
    let (template, substitute) = fixtures(&dir);
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();

    let output = engine
        .substitute_until_valid(&template, &substitute, DEFAULT_CLUSTER_RANGE)
        .unwrap()
        .expect("white placeholder should validate on the first attempt");

    assert_eq!(output.get_pixel(50, 50), RED);
    assert_eq!(engine.last_substitution().unwrap().dominant_color, Color::WHITE);
}

#[test]
fn foolproof_sweep_gives_up_on_a_template_without_a_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    // Every attempt detects the whole canvas, which is never a valid placeholder.
    let template = write(&dir, "flat.png", DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 50, GRAY)));
    let substitute = write(&dir, "red.png", DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, RED)));
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();

    let found = engine
        .substitute_until_valid(&template, &substitute, DEFAULT_CLUSTER_RANGE)
        .unwrap();

    assert!(found.is_none());
    assert_eq!(engine.last_substitution().unwrap().coverage(), 1.0);
}

#[test]
fn unreadable_inputs_surface_as_load_errors() {
    let dir = tempfile::tempdir().unwrap();
    let (template, _) = fixtures(&dir);
    let missing = dir.path().join("missing.png");
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();

    match engine.substitute(&template, &missing, 0, None) {
        Err(RememeError::ImageLoad { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected a load error, got {other:?}"),
    }
    assert!(engine.last_substitution().is_none());
}

#[test]
fn output_round_trips_through_the_codec() {
    let dir = tempfile::tempdir().unwrap();
    let (template, substitute) = fixtures(&dir);
    let mut engine: SubstitutionEngine = SubstitutionEngine::default();
    let output = engine.substitute(&template, &substitute, 0, None).unwrap();

    let out_path: &Path = &dir.path().join("out.png");
    FileCodec.save(&output, out_path).unwrap();
    let reloaded = FileCodec.load(out_path).unwrap();

    assert_eq!(reloaded.to_rgba8(), output.to_rgba8());
}
