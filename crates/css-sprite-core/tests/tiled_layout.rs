use css_sprite_core::prelude::*;

fn squares(n: usize, w: u32, h: u32) -> Vec<ImageGeometry> {
    (0..n)
        .map(|i| ImageGeometry::named(format!("t{}", i), w, h))
        .collect()
}

fn tiled(arrange_by: ArrangeBy, row_nums: u32) -> LayoutSettings {
    LayoutSettings::builder()
        .build_method(BuildMethod::Tiled)
        .arrange_by(arrange_by)
        .row_nums(row_nums)
        .with_spacing(4, 6)
        .build()
}

#[test]
fn rows_wrap_after_row_nums() {
    let out = compute_layout(&tiled(ArrangeBy::Rows, 3), &squares(5, 10, 20)).expect("layout");
    let offsets: Vec<(u32, u32)> = out.iter().map(|p| (p.offset_x, p.offset_y)).collect();
    assert_eq!(offsets, vec![(0, 0), (14, 0), (28, 0), (0, 26), (14, 26)]);
    assert_eq!(out[3].background_position, "0 -26px");
    assert_eq!(out[4].background_position, "-14px -26px");
}

#[test]
fn columns_wrap_after_row_nums() {
    let out = compute_layout(&tiled(ArrangeBy::Columns, 2), &squares(5, 10, 20)).expect("layout");
    let offsets: Vec<(u32, u32)> = out.iter().map(|p| (p.offset_x, p.offset_y)).collect();
    assert_eq!(offsets, vec![(0, 0), (0, 26), (14, 0), (14, 26), (28, 0)]);
    assert_eq!(out[2].background_position, "-14px 0");
}

#[test]
fn cells_use_largest_image() {
    let images = vec![
        ImageGeometry::named("small", 8, 8),
        ImageGeometry::named("wide", 30, 4),
        ImageGeometry::named("tall", 6, 25),
        ImageGeometry::named("next", 8, 8),
    ];
    let settings = LayoutSettings::builder()
        .build_method(BuildMethod::Tiled)
        .row_nums(3)
        .build();
    let out = compute_layout(&settings, &images).expect("layout");
    assert_eq!(out[1].offset_x, 30);
    assert_eq!(out[2].offset_x, 60);
    assert_eq!((out[3].offset_x, out[3].offset_y), (0, 25));
    // width/height still describe the image, not the cell
    assert_eq!(out[1].width, "30px");
    assert_eq!(out[1].height, "4px");
}

#[test]
fn offset_spacing_is_ignored_when_tiled() {
    let mut settings = tiled(ArrangeBy::Rows, 2);
    let base = compute_layout(&settings, &squares(4, 10, 10)).expect("layout");
    settings.offset_spacing = 100;
    let spaced = compute_layout(&settings, &squares(4, 10, 10)).expect("layout");
    assert_eq!(base, spaced);
}

#[test]
fn one_per_column_lays_out_a_single_row() {
    let out = compute_layout(&tiled(ArrangeBy::Columns, 1), &squares(3, 10, 10)).expect("layout");
    let offsets: Vec<(u32, u32)> = out.iter().map(|p| (p.offset_x, p.offset_y)).collect();
    assert_eq!(offsets, vec![(0, 0), (14, 0), (28, 0)]);
}

#[test]
fn zero_row_nums_is_rejected_before_placement() {
    let settings = tiled(ArrangeBy::Rows, 0);
    let mut placed = 0;
    let err = build_layout(&settings, &squares(3, 10, 10), |_, _| {
        placed += 1;
        Ok(())
    })
    .unwrap_err();
    assert!(matches!(err, SpriteError::InvalidRowNums(0)));
    assert!(err.is_configuration());
    assert_eq!(placed, 0);
}

#[test]
fn zero_row_nums_is_fine_for_strips() {
    let settings = LayoutSettings::builder().row_nums(0).build();
    assert!(compute_layout(&settings, &squares(2, 4, 4)).is_ok());
}
