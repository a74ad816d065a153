use city_traffic::simulation::{Coord, LightId, SimId, TrafficLight};

fn light(signal: bool, period: u32) -> TrafficLight {
    TrafficLight::new(LightId(SimId(0)), Coord::new(0, 0), signal, period)
}

#[test]
fn test_light_counts_down_then_flips() {
    let period = 5;
    let mut light = light(false, period);
    assert_eq!(light.remaining_ticks(), period);

    for tick in 1..period as u64 {
        light.tick(tick);
        assert!(!light.signal(), "flipped early on tick {}", tick);
        assert_eq!(light.remaining_ticks(), period - tick as u32);
    }

    light.tick(period as u64);
    assert!(light.signal());
    assert_eq!(light.remaining_ticks(), period);
}

#[test]
fn test_light_flips_every_period() {
    let mut light = light(true, 3);
    let mut flips = Vec::new();
    let mut previous = light.signal();
    for tick in 1..=12 {
        light.tick(tick);
        if light.signal() != previous {
            flips.push(tick);
            previous = light.signal();
        }
        assert!((1..=3).contains(&light.remaining_ticks()));
    }
    assert_eq!(flips, vec![3, 6, 9, 12]);
    assert!(light.signal());
}

#[test]
fn test_lights_with_same_period_stay_in_step() {
    let mut red = light(false, 4);
    let mut green = light(true, 4);
    for tick in 1..=20 {
        red.tick(tick);
        green.tick(tick);
        assert_ne!(red.signal(), green.signal());
        assert_eq!(red.remaining_ticks(), green.remaining_ticks());
    }
}

#[test]
fn test_period_one_flips_every_tick() {
    let mut light = light(false, 1);
    for tick in 1..=4 {
        light.tick(tick);
        assert_eq!(light.signal(), tick % 2 == 1);
        assert_eq!(light.remaining_ticks(), 1);
    }
}

#[test]
fn test_zero_period_is_clamped() {
    let light = light(false, 0);
    assert_eq!(light.period(), 1);
}
