//! Property tests: integrator invariants, spatial hash coverage, terrain
//! query ranges.

use glam::Vec3;
use proptest::prelude::*;
use sim::{Body, ForceProvider, Heightfield, HillParams, SpatialHash};

struct NoForce;
impl ForceProvider for NoForce {
    fn force(&self, _t: f32, _body: &Body) -> (Vec3, Vec3) {
        (Vec3::ZERO, Vec3::ZERO)
    }
}

fn small_vec3() -> impl Strategy<Value = Vec3> {
    (-10.0f32..10.0, -10.0f32..10.0, -10.0f32..10.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #[test]
    fn prop_zero_force_conserves_momentum(
        p in small_vec3(),
        momentum in small_vec3(),
        angular in small_vec3(),
        mass in 0.5f32..10.0,
        steps in 1usize..200,
    ) {
        let mut body = Body::new(p, 1.0, mass);
        body.momentum = momentum;
        body.angular_momentum = angular;

        let spinning = body.angular_velocity().length() >= 0.05;
        for _ in 0..steps {
            body.advance(0.0, 1.0 / 60.0, &NoForce);
        }

        prop_assert!((body.momentum - momentum).length() < 1e-4);
        if spinning {
            // Above the sleep threshold angular momentum is untouched.
            prop_assert!((body.angular_momentum - angular).length() < 1e-3);
        } else {
            prop_assert_eq!(body.angular_momentum, Vec3::ZERO);
        }
        prop_assert!((body.orientation.length() - 1.0).abs() < 1e-4);
        prop_assert!(body.position.is_finite());
    }

    #[test]
    fn prop_hash_neighborhood_covers_cell_radius(
        points in prop::collection::vec(
            (-50.0f32..50.0, -50.0f32..50.0).prop_map(|(x, z)| Vec3::new(x, 0.0, z)),
            0..60,
        ),
        qx in -50.0f32..50.0,
        qz in -50.0f32..50.0,
        cell_size in 2.0f32..8.0,
    ) {
        let hash = SpatialHash::build(&points, cell_size);
        let query = Vec3::new(qx, 0.0, qz);
        let found = hash.query_neighborhood(query);

        // Any point within one cell size of the query must be reachable
        // through the 3x3 neighborhood.
        for (i, p) in points.iter().enumerate() {
            let dx = p.x - query.x;
            let dz = p.z - query.z;
            if dx * dx + dz * dz < cell_size * cell_size {
                prop_assert!(
                    found.contains(&i),
                    "point {i} at distance {} missed by neighborhood query",
                    (dx * dx + dz * dz).sqrt(),
                );
            }
        }
        prop_assert_eq!(hash.len(), points.len());
    }

    #[test]
    fn prop_terrain_queries_in_range(
        x in -140.0f32..140.0,
        z in -140.0f32..140.0,
        seed in 0u64..32,
    ) {
        let field = Heightfield::generate(&HillParams {
            rows: 40,
            cols: 40,
            num_hills: 30,
            seed,
            ..Default::default()
        });

        let h = field.height_at(x, z);
        prop_assert!((0.0..=field.scalar_y).contains(&h));

        let n = field.normal_at(x, z);
        prop_assert!((n.length() - 1.0).abs() < 1e-4);
        prop_assert!(n.y > 0.0);

        let m = field.material_at(x, z);
        prop_assert!((-1.0..=1.0).contains(&m));
    }
}
