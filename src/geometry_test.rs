#![allow(clippy::float_cmp)]

use super::*;

// --- Aabb edges ---

#[test]
fn aabb_edges() {
    let b = Aabb::new(10.0, 20.0, 100.0, 50.0);
    assert_eq!(b.left(), 10.0);
    assert_eq!(b.right(), 110.0);
    assert_eq!(b.top(), 20.0);
    assert_eq!(b.bottom(), 70.0);
}

#[test]
fn aabb_center() {
    let b = Aabb::new(0.0, 0.0, 400.0, 200.0);
    assert_eq!(b.center(), Point::new(200.0, 100.0));
}

#[test]
fn aabb_at_uses_origin_and_size() {
    let b = Aabb::at(Point::new(5.0, 6.0), Size::new(7.0, 8.0));
    assert_eq!(b, Aabb::new(5.0, 6.0, 7.0, 8.0));
}

#[test]
fn aabb_spanning_normalizes_order() {
    let b = Aabb::spanning(Point::new(100.0, 10.0), Point::new(20.0, 90.0));
    assert_eq!(b, Aabb::new(20.0, 10.0, 80.0, 80.0));
}

// --- overlaps ---

#[test]
fn overlapping_boxes_overlap() {
    let a = Aabb::new(0.0, 0.0, 100.0, 100.0);
    let b = Aabb::new(50.0, 50.0, 100.0, 100.0);
    assert!(overlaps(&a, &b, 0.0));
    assert!(overlaps(&b, &a, 0.0));
}

#[test]
fn separated_boxes_clear_without_padding() {
    let a = Aabb::new(0.0, 0.0, 100.0, 100.0);
    let b = Aabb::new(150.0, 0.0, 100.0, 100.0);
    assert!(!overlaps(&a, &b, 0.0));
}

#[test]
fn padding_turns_near_miss_into_overlap() {
    let a = Aabb::new(0.0, 0.0, 100.0, 100.0);
    let b = Aabb::new(150.0, 0.0, 100.0, 100.0);
    assert!(overlaps(&a, &b, 60.0));
    assert!(!overlaps(&a, &b, 40.0));
}

#[test]
fn touching_at_padded_edge_counts_as_overlap() {
    let a = Aabb::new(0.0, 0.0, 100.0, 100.0);
    let b = Aabb::new(180.0, 0.0, 100.0, 100.0);
    assert!(overlaps(&a, &b, 80.0));
}

#[test]
fn vertical_separation_clears() {
    let a = Aabb::new(0.0, 0.0, 100.0, 100.0);
    let b = Aabb::new(0.0, 300.0, 100.0, 100.0);
    assert!(!overlaps(&a, &b, 80.0));
    assert!(!overlaps(&b, &a, 80.0));
}

#[test]
fn containment_overlaps() {
    let outer = Aabb::new(0.0, 0.0, 500.0, 500.0);
    let inner = Aabb::new(100.0, 100.0, 10.0, 10.0);
    assert!(overlaps(&outer, &inner, 0.0));
    assert!(overlaps(&inner, &outer, 0.0));
}
