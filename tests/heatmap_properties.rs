use gaze_capture_lib::heatmap::{HeatKernel, HeatmapBuffer, Quadrant, Texel};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};

const SIZE: usize = 128;

fn buffer(size: usize) -> HeatmapBuffer {
    HeatmapBuffer::new(size, size, HeatKernel::default(), None)
}

fn random_points(rng: &mut StdRng, count: usize) -> Vec<(f32, f32)> {
    (0..count)
        .map(|_| (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect()
}

fn alphas(heatmap: &HeatmapBuffer) -> Vec<f32> {
    heatmap.texels().iter().map(|t| t.alpha).collect()
}

#[test]
fn alpha_never_decreases_between_clears() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut heatmap = buffer(SIZE);
    let mut previous = alphas(&heatmap);

    for (u, v) in random_points(&mut rng, 40) {
        heatmap.accumulate(u, v);
        let current = alphas(&heatmap);
        for (before, after) in previous.iter().zip(&current) {
            assert!(after >= before);
            assert!((0.0..=1.0).contains(after));
        }
        previous = current;
    }
}

#[test]
fn saturates_at_one() {
    let mut heatmap = buffer(SIZE);
    for _ in 0..200 {
        heatmap.accumulate(0.5, 0.5);
    }
    assert_eq!(heatmap.alpha(SIZE / 2, SIZE / 2), 1.0);
}

#[test]
fn clear_is_idempotent() {
    let mut heatmap = buffer(SIZE);
    heatmap.accumulate(0.3, 0.6);
    heatmap.clear();
    let once: Vec<Texel> = heatmap.texels().to_vec();
    heatmap.clear();

    assert_eq!(heatmap.texels(), &once[..]);
    assert!(heatmap.texels().iter().all(|t| *t == Texel::CLEAR));
    assert!(heatmap.never_painted());
}

#[test]
fn update_order_does_not_matter() {
    let mut rng = StdRng::seed_from_u64(42);
    let mut points = random_points(&mut rng, 25);
    // Overlapping updates on the origin texel, where all four sweeps meet.
    points.extend([(0.0, 0.0), (0.0, 0.0), (0.5, 0.5), (0.5, 0.5)]);

    let mut forward = buffer(SIZE);
    for &(u, v) in &points {
        forward.accumulate(u, v);
    }

    points.shuffle(&mut rng);
    let mut shuffled = buffer(SIZE);
    for &(u, v) in &points {
        shuffled.accumulate(u, v);
    }

    for (a, b) in alphas(&forward).iter().zip(alphas(&shuffled)) {
        assert!((a - b).abs() < 1e-5, "{a} vs {b}");
    }
}

#[test]
fn propagation_is_independent_of_resolution() {
    let mut small = buffer(1024);
    let mut large = buffer(2048);

    let small_visits = small.accumulate(0.5, 0.5);
    let large_visits = large.accumulate(0.5, 0.5);

    assert_eq!(small_visits, large_visits);
    assert!(small_visits < 3024, "visited {small_visits}");
    assert!(small_visits > 4 * 25);
}

#[test]
fn sweeps_stop_well_before_the_edge() {
    let mut heatmap = buffer(1024);
    let center = heatmap.texel_center(0.5, 0.5).unwrap();
    for quadrant in Quadrant::ALL {
        let visited = heatmap.sweep(center, quadrant);
        assert!(visited > 0);
        assert!(visited < 1024);
    }

    assert!(heatmap.alpha(512 + 25, 512) > 0.0);
    assert_eq!(heatmap.alpha(512 + 26, 512), 0.0);
    assert_eq!(heatmap.alpha(512 - 26, 512), 0.0);
    assert_eq!(heatmap.alpha(512, 512 + 27), 0.0);
    assert_eq!(heatmap.alpha(0, 0), 0.0);
    assert_eq!(heatmap.alpha(1023, 1023), 0.0);
}
