use proptest::num::f32::NORMAL;
use proptest::prelude::*;
use tread_geom::{BlockPos, Vec3};

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

fn bounded_f32() -> impl Strategy<Value = f32> {
    NORMAL.prop_filter("bounded", |v| v.is_finite() && v.abs() <= 1e6)
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (bounded_f32(), bounded_f32(), bounded_f32()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn coord() -> impl Strategy<Value = i32> {
    -100_000i32..=100_000
}

fn arb_pos() -> impl Strategy<Value = BlockPos> {
    (coord(), coord(), coord()).prop_map(|(x, y, z)| BlockPos::new(x, y, z))
}

proptest! {
    // a + b == b + a
    #[test]
    fn vec3_add_commutative(a in arb_vec3(), b in arb_vec3()) {
        let l = a + b;
        let r = b + a;
        prop_assert!(approx(l.x, r.x, 1e-5) && approx(l.y, r.y, 1e-5) && approx(l.z, r.z, 1e-5));
    }

    // Length is non-negative and scales with |s|
    #[test]
    fn vec3_length_scales(a in arb_vec3(), s in -100.0f32..100.0) {
        let la = a.length();
        prop_assert!(la >= 0.0);
        let ls = (a * s).length();
        let expect = la * s.abs();
        prop_assert!((ls - expect).abs() <= 1e-3 * expect.max(1.0));
    }

    // The containing cell holds the point: cell <= p < cell + 1 on each axis
    #[test]
    fn containing_cell_holds_point(p in arb_vec3()) {
        let c = BlockPos::containing(p);
        prop_assert!(c.x as f32 <= p.x && p.x < c.x as f32 + 1.0);
        prop_assert!(c.y as f32 <= p.y && p.y < c.y as f32 + 1.0);
        prop_assert!(c.z as f32 <= p.z && p.z < c.z as f32 + 1.0);
    }

    // Triangle inequality for the grid metric
    #[test]
    fn manhattan_triangle_inequality(a in arb_pos(), b in arb_pos(), c in arb_pos()) {
        prop_assert!(a.manhattan(c) <= a.manhattan(b) + b.manhattan(c));
    }

    // Euclidean distance never exceeds Manhattan distance
    #[test]
    fn euclid_bounded_by_manhattan(a in arb_pos(), b in arb_pos()) {
        let m = a.manhattan(b) as f32;
        prop_assert!(a.distance(b) <= m * (1.0 + 1e-5) + 1e-3);
    }

    // A block's top center maps back to the cell above it
    #[test]
    fn top_center_lies_above_block(a in arb_pos()) {
        prop_assert_eq!(BlockPos::containing(a.top_center()), a.offset(0, 1, 0));
    }
}
