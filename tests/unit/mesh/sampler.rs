use super::*;

const EPS: f64 = 1e-9;

fn window() -> ReadWindow {
    ReadWindow::for_cursor(10, 256)
}

fn sampler(n: usize, mode: WarpMode) -> WarpedMeshSampler {
    WarpedMeshSampler::new(Rect::new(0.0, 0.0, 640.0, 480.0), n, mode)
}

#[test]
fn triangle_fold_shape() {
    assert_eq!(triangle_fold(0.0), 0.0);
    assert!((triangle_fold(0.25) - 0.25).abs() < EPS);
    assert_eq!(triangle_fold(1.0), 1.0);
    assert!((triangle_fold(1.5) - 0.5).abs() < EPS);
    assert!((triangle_fold(-0.25) - 0.25).abs() < EPS);
    assert!((triangle_fold(2.25) - 0.25).abs() < EPS);
    for i in -400..400 {
        let s = f64::from(i) * 0.01;
        let v = triangle_fold(s);
        assert!((0.0..=1.0).contains(&v));
    }
}

#[test]
fn fold_is_continuous_across_period_boundary() {
    let w = window();
    let below = remap_depth(triangle_fold(2.0 - 1e-7), w);
    let at = remap_depth(triangle_fold(0.0), w);
    let after = remap_depth(triangle_fold(2.0 + 1e-7), w);
    assert!((below - at).abs() < 1e-6);
    assert!((after - at).abs() < 1e-6);

    // Dense walk over several periods never jumps by more than the step allows.
    let span = 1.0 + w.newest - w.oldest;
    let step = 1e-3;
    let mut prev = remap_depth(triangle_fold(-3.0), w);
    let mut s = -3.0;
    while s < 3.0 {
        s += step;
        let d = remap_depth(triangle_fold(s), w);
        assert!((d - prev).abs() <= span * step + 1e-9);
        prev = d;
    }
}

#[test]
fn depth_spans_oldest_to_newest_over_one_wrap() {
    let w = window();
    assert!((remap_depth(0.0, w) - w.oldest).abs() < EPS);
    assert!((remap_depth(1.0, w) - (1.0 + w.newest)).abs() < EPS);
    // newest + 1 addresses the same layer as newest on a repeating axis.
    assert!(((remap_depth(1.0, w) - 1.0) - w.newest).abs() < EPS);
}

#[test]
fn unrotated_fold_is_a_left_to_right_sweep() {
    let s = sampler(5, WarpMode::Fold);
    let w = window();
    for c in 0..5 {
        let t = c as f64 / 4.0;
        for u in [0.0, 0.3, 1.0] {
            let d = s.depth_at(t, u, w, 0.0);
            assert!((d - remap_depth(t, w)).abs() < EPS);
        }
    }
}

#[test]
fn half_turn_mirrors_the_sweep() {
    let s = sampler(5, WarpMode::Fold);
    let w = window();
    let d = s.depth_at(0.0, 0.5, w, std::f64::consts::PI);
    assert!((d - remap_depth(1.0, w)).abs() < 1e-9);
    let d = s.depth_at(1.0, 0.5, w, std::f64::consts::PI);
    assert!((d - remap_depth(0.0, w)).abs() < 1e-9);
}

#[test]
fn quarter_turn_sweeps_along_the_other_axis() {
    let s = sampler(5, WarpMode::Fold);
    let w = window();
    let q = std::f64::consts::FRAC_PI_2;
    let top = s.depth_at(0.3, 0.0, w, q);
    let bottom = s.depth_at(0.3, 1.0, w, q);
    // Constant along t, varies along u.
    assert!((s.depth_at(0.9, 0.0, w, q) - top).abs() < 1e-9);
    assert!((top - bottom).abs() > 0.5);
}

#[test]
fn fold_stays_in_range_under_rotation_but_linear_escapes() {
    let w = window();
    let fold = sampler(9, WarpMode::Fold);
    let linear = sampler(9, WarpMode::Linear);
    let angle = std::f64::consts::FRAC_PI_4;
    let mut linear_escaped = false;
    for strip in fold.generate(w, angle) {
        for v in &strip.vertices {
            assert!(v.sample.depth >= w.oldest - EPS);
            assert!(v.sample.depth <= 1.0 + w.newest + EPS);
        }
    }
    for strip in linear.generate(w, angle) {
        for v in &strip.vertices {
            if v.sample.depth < w.oldest || v.sample.depth > 1.0 + w.newest {
                linear_escaped = true;
            }
        }
    }
    assert!(linear_escaped);
}

#[test]
fn linear_without_rotation_matches_fold() {
    let w = window();
    let a: Vec<_> = sampler(4, WarpMode::Fold).generate(w, 0.0).collect();
    let b: Vec<_> = sampler(4, WarpMode::Linear).generate(w, 0.0).collect();
    assert_eq!(a, b);
}

#[test]
fn strips_cover_the_region_in_strip_order() {
    let s = WarpedMeshSampler::new(Rect::new(10.0, 20.0, 110.0, 70.0), 3, WarpMode::Fold);
    let rows = s.generate(window(), 0.3);
    assert_eq!(rows.len(), 2);
    let strips: Vec<_> = rows.collect();
    assert_eq!(strips.len(), 2);

    let first = &strips[0];
    assert_eq!(first.row, 0);
    assert_eq!(first.vertices.len(), 6);
    assert_eq!(first.vertices[0].position, Point::new(10.0, 20.0));
    assert_eq!(first.vertices[1].position, Point::new(10.0, 45.0));
    assert_eq!(first.vertices[2].position, Point::new(60.0, 20.0));
    assert_eq!(first.vertices[5].position, Point::new(110.0, 45.0));
    assert_eq!(first.vertices[5].sample.s, 1.0);
    assert_eq!(first.vertices[5].sample.t, 0.5);

    let last = &strips[1];
    assert_eq!(last.vertices[5].position, Point::new(110.0, 70.0));
    assert_eq!(last.vertices[5].sample.t, 1.0);
    assert_eq!(first.triangles().count(), 4);
}

#[test]
fn adjacent_strips_share_their_edge() {
    let strips: Vec<_> = sampler(6, WarpMode::Fold).generate(window(), 1.1).collect();
    for pair in strips.windows(2) {
        for c in 0..6 {
            assert_eq!(pair[0].vertices[2 * c + 1], pair[1].vertices[2 * c]);
        }
    }
}

#[test]
fn fewer_than_two_vertices_yields_nothing() {
    assert_eq!(sampler(1, WarpMode::Fold).generate(window(), 0.0).count(), 0);
    assert_eq!(sampler(0, WarpMode::Fold).generate(window(), 0.0).count(), 0);
    assert_eq!(sampler(2, WarpMode::Fold).generate(window(), 0.0).count(), 1);
}
