use rand::rngs::StdRng;
use rand::SeedableRng;
use rl::BoxSpace;

#[test]
fn clip_clamps_each_dimension() {
    let space = BoxSpace::new(vec![-1.0, 0.0], vec![1.0, 10.0]);
    assert_eq!(space.clip(&[-3.0, 4.0]), vec![-1.0, 4.0]);
    assert_eq!(space.clip(&[0.5, 12.0]), vec![0.5, 10.0]);
}

#[test]
fn clip_drops_extra_elements() {
    let space = BoxSpace::uniform(-1.0, 1.0, 1);
    assert_eq!(space.clip(&[2.0, 9.0]), vec![1.0]);
}

#[test]
fn samples_stay_inside_the_box() {
    let space = BoxSpace::new(vec![-1.0, 2.0], vec![1.0, 3.0]);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..100 {
        let x = space.sample(&mut rng);
        assert_eq!(x.len(), 2);
        assert_eq!(space.clip(&x), x);
    }
}

#[test]
#[should_panic(expected = "low must not exceed high")]
fn inverted_bounds_panic() {
    let _ = BoxSpace::new(vec![1.0], vec![-1.0]);
}
