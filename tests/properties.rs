//! Property tests for the simulation and animation loop

use std::cell::Cell;
use std::rc::Rc;

use fidget_fx::consts::IMPRINT_CAP;
use fidget_fx::sim::{
    Bounds, BurstSpawner, Drag, EdgePolicy, Fade, ForceParams, Gravity, PressureConfig,
    PressureField,
};
use fidget_fx::{AnimationDriver, ManualScheduler, ParticleSystem, SpawnParams};
use glam::Vec2;
use proptest::prelude::*;

fn any_dt() -> impl Strategy<Value = f32> {
    prop_oneof![
        8 => 0.0f32..0.05,
        1 => Just(f32::NAN),
        1 => Just(f32::INFINITY),
        1 => -1.0f32..0.0,
        1 => 0.05f32..5.0,
    ]
}

prop_compose! {
    fn any_spawn()(
        x in -100.0f32..900.0,
        y in -100.0f32..700.0,
        vx in -2000.0f32..2000.0,
        vy in -2000.0f32..2000.0,
        gravity in -1000.0f32..1000.0,
        drag in 0.0f32..10.0,
        lifetime in 0.01f32..3.0,
        size in 0.0f32..40.0,
    ) -> SpawnParams {
        SpawnParams {
            pos: Vec2::new(x, y),
            vel: Vec2::new(vx, vy),
            size,
            lifetime,
            fade: Fade::Linear,
            forces: ForceParams {
                gravity: Gravity::Constant(gravity),
                drag: Drag::Exponential(drag),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

fn any_edge() -> impl Strategy<Value = EdgePolicy> {
    prop_oneof![
        Just(EdgePolicy::Cull { margin: 20.0 }),
        Just(EdgePolicy::Wrap),
        (0.0f32..1.0).prop_map(|restitution| EdgePolicy::Bounce { restitution }),
    ]
}

proptest! {
    #[test]
    fn test_state_stays_finite(
        seed in any::<u64>(),
        spawns in prop::collection::vec(any_spawn(), 1..40),
        dts in prop::collection::vec(any_dt(), 1..80),
        edge in any_edge(),
    ) {
        let mut system = ParticleSystem::new(seed).with_bounds(Bounds::new(800.0, 600.0, edge));
        for params in spawns {
            system.spawn(params);
        }
        for dt in dts {
            system.tick(dt);
            for p in system.live_particles() {
                prop_assert!(p.pos.is_finite() && p.vel.is_finite());
                prop_assert!(p.age >= 0.0 && p.age <= p.lifetime);
                prop_assert!((0.0..=1.0).contains(&p.opacity));
            }
        }
    }

    #[test]
    fn test_population_never_exceeds_capacity(
        capacity in 1usize..64,
        spawns in prop::collection::vec(any_spawn(), 0..200),
    ) {
        let mut system = ParticleSystem::with_capacity(1, capacity);
        for params in spawns {
            system.spawn(params);
            prop_assert!(system.len() <= capacity);
        }
    }

    #[test]
    fn test_imprints_never_exceed_cap(
        moves in prop::collection::vec((0.0f32..800.0, 0.0f32..600.0, any::<bool>(), 0.0f32..0.05), 1..300),
    ) {
        let mut system = ParticleSystem::new(5)
            .with_pressure(PressureField::new(PressureConfig::default()));
        for (x, y, down, dt) in moves {
            if down {
                system.input_mut().pointer_down(Vec2::new(x, y));
            } else {
                system.input_mut().pointer_move(Vec2::new(x, y));
            }
            system.tick(dt);
            prop_assert!(system.pressure().len() <= IMPRINT_CAP);
        }
    }

    #[test]
    fn test_age_is_monotonic(
        spawns in prop::collection::vec(any_spawn(), 1..20),
        dts in prop::collection::vec(0.0f32..0.05, 1..60),
    ) {
        let mut system = ParticleSystem::new(3);
        for params in spawns {
            system.spawn(params);
        }
        for dt in dts {
            let before: Vec<_> = system.live_particles().iter().map(|p| (p.id, p.age)).collect();
            system.tick(dt);
            for (id, age) in before {
                if let Some(p) = system.get(id) {
                    prop_assert!(p.age >= age);
                }
            }
        }
    }

    #[test]
    fn test_burst_count_non_decreasing(a in 0.0f32..2000.0, b in 0.0f32..2000.0) {
        let burst = BurstSpawner::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(burst.count_for(lo) <= burst.count_for(hi));
        prop_assert!(burst.count_for(hi) <= burst.max_count);
        prop_assert!(burst.count_for(lo) >= burst.min_count);
    }

    #[test]
    fn test_fades_reach_zero(start in 0.0f32..0.99, u1 in 0.0f32..1.0, u2 in 0.0f32..1.0) {
        for fade in [Fade::Linear, Fade::EaseIn { start }] {
            prop_assert!(fade.opacity(1.0).abs() < 1e-6);
            let (lo, hi) = if u1 <= u2 { (u1, u2) } else { (u2, u1) };
            prop_assert!(fade.opacity(lo) >= fade.opacity(hi));
        }
    }

    #[test]
    fn test_stop_is_final(ops in prop::collection::vec(0u8..4, 1..40)) {
        let scheduler = ManualScheduler::new();
        let driver = AnimationDriver::new(scheduler.clone());
        let calls = Rc::new(Cell::new(0u32));
        let mut now = 0.0;

        for op in ops {
            match op {
                0 => {
                    let calls = Rc::clone(&calls);
                    driver.start(move |_dt| calls.set(calls.get() + 1));
                }
                1 => driver.stop(),
                2 => {
                    driver.stop();
                    driver.stop();
                }
                _ => {
                    now += 16.0;
                    scheduler.pump(now);
                }
            }
            // Never more than one frame in flight
            prop_assert!(scheduler.pending() <= 1);
        }

        driver.stop();
        let seen = calls.get();
        for _ in 0..3 {
            now += 16.0;
            scheduler.pump(now);
        }
        prop_assert_eq!(calls.get(), seen);
        prop_assert!(!driver.is_running());
    }
}
