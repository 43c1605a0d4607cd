use deli_base::Vec2;

#[test]
fn test_new_and_zero() {
    let v = Vec2::new(3.0_f32, 4.0);
    assert_eq!(v.x, 3.0);
    assert_eq!(v.y, 4.0);
    assert_eq!(Vec2::<f32>::zero(), Vec2::new(0.0, 0.0));
}

#[test]
fn test_arithmetic() {
    let a = Vec2::new(1.0_f32, 2.0);
    let b = Vec2::new(3.0_f32, 5.0);
    assert_eq!(a + b, Vec2::new(4.0, 7.0));
    assert_eq!(b - a, Vec2::new(2.0, 3.0));
    assert_eq!(a * 2.0, Vec2::new(2.0, 4.0));
}

#[test]
fn test_to_pixel_rounds() {
    assert_eq!(Vec2::new(99.6_f32, 50.4).to_pixel(), Vec2::new(100, 50));
    assert_eq!(Vec2::new(-0.6_f32, 0.5).to_pixel(), Vec2::new(-1, 1));
}
