use std::fs;
use std::io::Cursor;

use image::{ImageFormat, Rgba, RgbaImage};
use pixel_canvas::command::Command;
use pixel_canvas::config::EditorConfig;
use pixel_canvas::file_io::{self, IMPORT_CANVAS_SIZE, MAX_DIMENSION, PROJECT_MAGIC};
use pixel_canvas::{CanvasError, Color, EditorState, LayerStack, PixelBuffer, ResizePolicy};

// Helper: three layers with distinct pixels and metadata, second layer active
fn create_test_stack() -> LayerStack {
    let mut stack = LayerStack::blank(5, 3, 3).unwrap();
    let ids: Vec<_> = stack.layers().iter().map(|l| l.id).collect();
    for (i, id) in ids.iter().enumerate() {
        let layer = stack.layer_mut(*id).unwrap();
        for x in 0..5 {
            layer
                .buffer_mut()
                .set(x, i as u32, Color::rgba(x as u8 * 50, i as u8 * 100, 9, 128 + x as u8))
                .unwrap();
        }
    }
    stack.rename(ids[0], "Sketch ✏").unwrap();
    stack.set_visible(ids[1], false).unwrap();
    stack.set_opacity(ids[2], 0.25).unwrap();
    stack.set_active(ids[1]).unwrap();
    stack
}

#[test]
fn test_project_round_trip_is_exact() {
    let stack = create_test_stack();
    let loaded = file_io::load_project(&file_io::save_project(&stack)).unwrap();
    assert_eq!(loaded, stack);
    assert_eq!(loaded.active_index(), 1);
    assert_eq!(loaded.layers()[0].name, "Sketch ✏");
    assert!(!loaded.layers()[1].visible);
    assert_eq!(loaded.layers()[2].opacity(), 0.25);
}

#[test]
fn test_single_layer_round_trip() {
    let stack = LayerStack::new(1, 1).unwrap();
    assert_eq!(file_io::load_project(&file_io::save_project(&stack)).unwrap(), stack);
}

fn assert_corrupt(bytes: &[u8]) {
    let result = file_io::load_project(bytes);
    assert!(matches!(result, Err(CanvasError::CorruptFile(_))), "{result:?}");
}

#[test]
fn test_corrupt_projects_are_rejected() {
    let good = file_io::save_project(&create_test_stack());

    let mut bad_magic = good.clone();
    bad_magic[0] = b'X';
    assert_corrupt(&bad_magic);

    let mut bad_version = good.clone();
    bad_version[8] = 2;
    assert_corrupt(&bad_version);

    let mut zero_width = good.clone();
    zero_width[10..14].copy_from_slice(&0u32.to_le_bytes());
    assert_corrupt(&zero_width);

    let mut huge = good.clone();
    huge[14..18].copy_from_slice(&100_000u32.to_le_bytes());
    assert_corrupt(&huge);

    let mut no_layers = good.clone();
    no_layers[18..22].copy_from_slice(&0u32.to_le_bytes());
    assert_corrupt(&no_layers);

    let mut bad_active = good.clone();
    bad_active[22..26].copy_from_slice(&3u32.to_le_bytes());
    assert_corrupt(&bad_active);

    // first layer: name length at 26, name "Sketch ✏" is 10 bytes
    let visibility_at = 26 + 4 + 10;
    let mut bad_visibility = good.clone();
    bad_visibility[visibility_at] = 2;
    assert_corrupt(&bad_visibility);

    let mut bad_opacity = good.clone();
    bad_opacity[visibility_at + 1..visibility_at + 5].copy_from_slice(&1.5f32.to_le_bytes());
    assert_corrupt(&bad_opacity);

    let mut nan_opacity = good.clone();
    nan_opacity[visibility_at + 1..visibility_at + 5].copy_from_slice(&f32::NAN.to_le_bytes());
    assert_corrupt(&nan_opacity);

    let mut bad_name = good.clone();
    bad_name[30] = 0xff;
    assert_corrupt(&bad_name);

    assert_corrupt(&good[..good.len() - 1]);
    assert_corrupt(&good[..PROJECT_MAGIC.len()]);
    assert_corrupt(&[]);

    let mut trailing = good.clone();
    trailing.push(0);
    assert_corrupt(&trailing);
}

#[test]
fn test_png_export_decodes_to_composite() {
    let stack = create_test_stack();
    let png = file_io::export_png(&stack).unwrap();
    assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

    let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
    assert_eq!(decoded.dimensions(), (5, 3));
    assert_eq!(decoded.as_raw().as_slice(), stack.composite().as_raw());
}

#[test]
fn test_load_image_makes_single_layer() {
    let mut buffer = PixelBuffer::new(2, 2);
    buffer.set(1, 1, Color::rgba(1, 2, 3, 4)).unwrap();
    let stack = LayerStack::from_layers(2, 2, vec![pixel_canvas::Layer::with_buffer("x", buffer.clone())], 0)
        .unwrap();
    let png = file_io::export_png(&stack).unwrap();

    let loaded = file_io::load_image(&png).unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded.size(), (2, 2));
    assert_eq!(loaded.active_layer().buffer(), &buffer);

    assert!(matches!(
        file_io::load_image(b"not an image"),
        Err(CanvasError::CorruptFile(_))
    ));
}

#[test]
fn test_save_and_open_paths() {
    let dir = tempfile::tempdir().unwrap();
    let stack = create_test_stack();

    let project = dir.path().join("drawing.canvas");
    file_io::save_path(&stack, &project).unwrap();
    assert_eq!(file_io::open_path(&project).unwrap(), stack);

    // a square power-of-two canvas comes back at its own size
    let mut square = create_test_stack();
    square.resize(4, 4, ResizePolicy::CropOrPad).unwrap();
    let png = dir.path().join("drawing.png");
    file_io::save_path(&square, &png).unwrap();
    let flat = file_io::open_path(&png).unwrap();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat.composite(), square.composite());
}

fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

#[test]
fn test_odd_sized_images_are_resampled_on_import() {
    let mut photo = RgbaImage::from_pixel(200, 100, Rgba([10, 20, 30, 255]));
    photo.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
    let stack = file_io::load_image(&encode_png(&photo)).unwrap();
    assert_eq!(stack.size(), (IMPORT_CANVAS_SIZE, IMPORT_CANVAS_SIZE));
    let buffer = stack.active_layer().buffer();
    assert_eq!(buffer.get(0, 0).unwrap(), Color::rgb(255, 0, 0));
    assert_eq!(buffer.get(63, 63).unwrap(), Color::rgb(10, 20, 30));

    let strip = RgbaImage::new(MAX_DIMENSION + 1, 1);
    let stack = file_io::load_image(&encode_png(&strip)).unwrap();
    assert_eq!(stack.size(), (IMPORT_CANVAS_SIZE, IMPORT_CANVAS_SIZE));
    assert_eq!(file_io::load_project(&file_io::save_project(&stack)).unwrap(), stack);
}

#[test]
fn test_invisible_imported_pixels_become_transparent() {
    let mut image = RgbaImage::from_pixel(2, 2, Rgba([40, 50, 60, 255]));
    image.put_pixel(1, 0, Rgba([200, 100, 50, 0]));
    let stack = file_io::load_image(&encode_png(&image)).unwrap();
    assert_eq!(stack.size(), (2, 2));
    let buffer = stack.active_layer().buffer();
    assert_eq!(buffer.get(1, 0).unwrap(), Color::TRANSPARENT);
    assert_eq!(&stack.composite(), buffer);
}

#[test]
fn test_oversized_resize_is_rejected_before_saving() {
    let mut state = EditorState::with_stack(create_test_stack(), EditorConfig::default());
    let before = state.stack().clone();
    let result = state.execute(Command::Resize {
        width: MAX_DIMENSION + 1,
        height: 1,
        policy: ResizePolicy::NearestNeighbor,
    });
    assert!(matches!(result, Err(CanvasError::InvalidDimensions { .. })));
    assert_eq!(state.stack(), &before);

    // the largest accepted size still round-trips
    state
        .execute(Command::Resize {
            width: MAX_DIMENSION,
            height: 1,
            policy: ResizePolicy::NearestNeighbor,
        })
        .unwrap();
    let bytes = file_io::save_project(state.stack());
    assert_eq!(&file_io::load_project(&bytes).unwrap(), state.stack());
}

#[test]
fn test_unsupported_paths_write_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let stack = create_test_stack();

    let text = dir.path().join("notes.txt");
    assert!(matches!(
        file_io::save_path(&stack, &text),
        Err(CanvasError::UnsupportedFormat(_))
    ));
    assert!(!text.exists());

    let jpeg = dir.path().join("photo.jpg");
    assert!(matches!(
        file_io::save_path(&stack, &jpeg),
        Err(CanvasError::UnsupportedFormat(_))
    ));
    assert!(!jpeg.exists());

    assert!(matches!(
        file_io::open_path(&dir.path().join("missing.canvas")),
        Err(CanvasError::Io(_))
    ));
}

#[test]
fn test_failed_open_leaves_editor_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.canvas");
    fs::write(&broken, b"PXCANVAS\x01\x00garbage").unwrap();

    let mut state = EditorState::with_stack(create_test_stack(), EditorConfig::default());
    let before = state.stack().clone();
    assert!(matches!(state.open(&broken), Err(CanvasError::CorruptFile(_))));
    assert_eq!(state.stack(), &before);

    let good = dir.path().join("good.canvas");
    state.save(&good).unwrap();
    state.new_canvas().unwrap();
    assert_eq!(state.stack().len(), 4);
    state.open(&good).unwrap();
    assert_eq!(state.stack(), &before);
    assert!(!state.history().can_undo());
}
