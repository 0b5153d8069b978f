//! Behaviour of the field placement designer through its public API.

use docboard_shared::{
    parse_layout_json, BackgroundMetrics, Designer, FieldDescriptor, FieldKind, Point, SavedField,
    Size,
};

fn half_size_designer() -> Designer {
    let mut designer = Designer::default();
    designer.set_surface(Size::new(500.0, 700.0));
    designer.set_background(BackgroundMetrics {
        rendered: Size::new(500.0, 700.0),
        natural: Some(Size::new(1000.0, 1400.0)),
    });
    designer
}

fn saved(key: &str, x: i64, y: i64, w: i64, h: i64) -> SavedField {
    SavedField {
        key: key.to_string(),
        label: key.to_string(),
        kind: FieldKind::Text,
        x,
        y,
        w: Some(w),
        h: Some(h),
        font_size: Some(18),
    }
}

#[test]
fn valid_drop_adds_one_field_and_selects_it() {
    let mut designer = half_size_designer();
    let first = designer
        .accept_drop(
            &FieldDescriptor::new("nome", "Nome", FieldKind::Text),
            Point::new(40.0, 60.0),
        )
        .unwrap();
    assert_eq!(designer.fields().len(), 1);
    assert_eq!(designer.selected(), Some(first));

    let second = designer
        .accept_drop(
            &FieldDescriptor::new("nome", "Nome", FieldKind::Text),
            Point::new(80.0, 60.0),
        )
        .unwrap();
    assert_eq!(designer.fields().len(), 2);
    assert_ne!(first, second);
    assert_eq!(designer.selected(), Some(second));
}

#[test]
fn drop_without_key_changes_nothing() {
    let mut designer = half_size_designer();
    let existing = designer
        .accept_drop(
            &FieldDescriptor::new("cpf", "CPF", FieldKind::Text),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    let result = designer.accept_drop(
        &FieldDescriptor::new("", "Nothing", FieldKind::Image),
        Point::new(10.0, 10.0),
    );
    assert_eq!(result, None);
    assert_eq!(designer.fields().len(), 1);
    assert_eq!(designer.selected(), Some(existing));
}

#[test]
fn drag_sequences_stay_on_the_surface() {
    let mut designer = half_size_designer();
    let id = designer
        .accept_drop(
            &FieldDescriptor::new("foto", "Foto", FieldKind::Image),
            Point::new(200.0, 200.0),
        )
        .unwrap();
    assert!(designer.begin_drag(id, Point::new(210.0, 220.0)));
    let pointer_path = [
        Point::new(-300.0, -50.0),
        Point::new(900.0, 350.0),
        Point::new(480.0, 900.0),
        Point::new(250.0, 250.0),
        Point::new(-1.0, 1000.0),
    ];
    for pointer in pointer_path {
        designer.update_drag(pointer);
        let field = designer.field(id).unwrap();
        assert!(field.position.x >= 0.0);
        assert!(field.position.y >= 0.0);
        assert!(field.right() <= 500.0);
        assert!(field.bottom() <= 700.0);
        assert_eq!(field.size, Size::new(140.0, 100.0));
    }
    designer.end_drag();
    let resting = designer.field(id).unwrap().position;
    assert!(!designer.update_drag(Point::new(0.0, 0.0)));
    assert_eq!(designer.field(id).unwrap().position, resting);
}

#[test]
fn update_without_drag_is_a_no_op() {
    let mut designer = half_size_designer();
    let id = designer
        .accept_drop(
            &FieldDescriptor::new("rg", "RG", FieldKind::Text),
            Point::new(30.0, 30.0),
        )
        .unwrap();
    assert!(!designer.update_drag(Point::new(100.0, 100.0)));
    assert_eq!(designer.field(id).unwrap().position, Point::new(30.0, 30.0));
}

#[test]
fn load_serialize_load_keeps_layout() {
    let layout = vec![
        saved("nome", 200, 200, 160, 30),
        saved("cpf", 401, 999, 321, 61),
        saved("cep", 0, 1370, 90, 30),
    ];
    let mut designer = half_size_designer();
    designer.load_layout(&layout);
    let serialized = designer.serialize();

    let mut reloaded = half_size_designer();
    assert_eq!(reloaded.load_layout(&serialized), layout.len());
    let again = reloaded.serialize();

    assert_eq!(again.len(), layout.len());
    for (original, round_tripped) in layout.iter().zip(&again) {
        assert_eq!(original.key, round_tripped.key);
        assert!((original.x - round_tripped.x).abs() <= 1);
        assert!((original.y - round_tripped.y).abs() <= 1);
        assert!((original.w.unwrap() - round_tripped.w.unwrap()).abs() <= 1);
        assert!((original.h.unwrap() - round_tripped.h.unwrap()).abs() <= 1);
    }
}

#[test]
fn load_scales_into_surface_pixels() {
    let mut designer = half_size_designer();
    designer.load_layout(&[saved("nome", 200, 200, 160, 30)]);
    let field = &designer.fields()[0];
    assert_eq!(field.position, Point::new(100.0, 100.0));
    assert_eq!(field.size, Size::new(80.0, 15.0));
    assert_eq!(field.font_size, 9);
}

#[test]
fn load_fills_missing_sizes_from_kind_defaults() {
    let layout = parse_layout_json(
        r#"[{"key": "foto", "label": "Foto", "type": "image", "x": 0, "y": 0},
            {"key": "nome", "label": "Nome", "x": 10, "y": 10, "w": null, "h": null}]"#,
    )
    .unwrap();
    let mut designer = Designer::default();
    designer.set_surface(Size::new(800.0, 600.0));
    designer.load_layout(&layout);
    assert_eq!(designer.fields()[0].size, Size::new(140.0, 100.0));
    assert_eq!(designer.fields()[1].size, Size::new(160.0, 30.0));
    assert_eq!(designer.fields()[1].font_size, 18);
}

#[test]
fn apply_without_selection_never_mutates() {
    let mut designer = half_size_designer();
    designer.load_layout(&[saved("nome", 200, 200, 160, 30)]);
    let before = designer.fields().to_vec();
    assert!(!designer.apply_size_or_font(Some(30.0), Some(50.0), Some(50.0)));
    assert_eq!(designer.fields(), before.as_slice());
}

#[test]
fn apply_ignores_rejected_values_individually() {
    let mut designer = half_size_designer();
    let id = designer
        .accept_drop(
            &FieldDescriptor::new("nome", "Nome", FieldKind::Text),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    assert!(!designer.apply_size_or_font(Some(0.0), None, None));
    assert_eq!(designer.field(id).unwrap().font_size, 18);

    assert!(designer.apply_size_or_font(Some(24.0), Some(-5.0), Some(45.0)));
    let field = designer.field(id).unwrap();
    assert_eq!(field.font_size, 24);
    assert_eq!(field.size, Size::new(160.0, 45.0));

    assert!(!designer.apply_size_or_font(Some(f64::NAN), Some(0.0), None));
    assert_eq!(designer.field(id).unwrap().size, Size::new(160.0, 45.0));
}

#[test]
fn doubled_image_scales_serialized_box() {
    let mut designer = half_size_designer();
    let id = designer
        .accept_drop(
            &FieldDescriptor::new("nome", "Nome", FieldKind::Text),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    designer.apply_size_or_font(None, Some(80.0), Some(15.0));
    designer.begin_drag(id, Point::new(0.0, 0.0));
    designer.update_drag(Point::new(100.0, 100.0));
    designer.end_drag();

    let saved = designer.serialize();
    assert_eq!(saved.len(), 1);
    assert_eq!(
        (saved[0].x, saved[0].y, saved[0].w, saved[0].h),
        (200, 200, Some(160), Some(30))
    );
    assert_eq!(saved[0].font_size, Some(36));
}

#[test]
fn empty_layout_loads_to_empty_surface() {
    let mut designer = half_size_designer();
    assert_eq!(designer.load_layout_json("[]"), Ok(0));
    assert!(designer.fields().is_empty());
    assert_eq!(designer.load_layout_json(""), Ok(0));
    assert!(designer.serialize().is_empty());
}

#[test]
fn loading_clears_selection() {
    let mut designer = half_size_designer();
    designer
        .accept_drop(
            &FieldDescriptor::new("nome", "Nome", FieldKind::Text),
            Point::new(0.0, 0.0),
        )
        .unwrap();
    designer.load_layout(&[saved("cpf", 10, 10, 100, 20)]);
    assert_eq!(designer.selected(), None);
    assert_eq!(designer.fields()[0].key, "cpf");
}

#[test]
fn font_size_survives_repeated_saves_at_uneven_scale() {
    let scan = |designer: &mut Designer| {
        designer.set_surface(Size::new(800.0, 1131.0));
        designer.set_background(BackgroundMetrics {
            rendered: Size::new(800.0, 1131.0),
            natural: Some(Size::new(2480.0, 3508.0)),
        });
    };
    let mut layout: Vec<SavedField> = [11, 14, 17, 23]
        .into_iter()
        .map(|font| SavedField {
            font_size: Some(font),
            ..saved(&format!("f{font}"), 100, 100, 300, 90)
        })
        .collect();
    let original = layout.clone();
    for _ in 0..3 {
        let mut designer = Designer::default();
        scan(&mut designer);
        designer.load_layout(&layout);
        layout = designer.serialize();
    }
    let fonts: Vec<_> = layout.iter().map(|field| field.font_size).collect();
    let expected: Vec<_> = original.iter().map(|field| field.font_size).collect();
    assert_eq!(fonts, expected);
}
