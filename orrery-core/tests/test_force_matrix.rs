//! Unit tests for the pairwise force model

use glam::DVec3;
use orrery_core::force::{compute_force_matrix, pairwise_force, total_force};
use orrery_core::tests::test_helpers::{approx_eq_rel, si_point_masses, vec_approx_eq};
use orrery_core::units::G_SI;
use orrery_core::{PhysicsError, PointMass};
use proptest::prelude::*;

#[test]
fn test_force_between_two_point_masses() {
    let bodies = si_point_masses();
    let force = pairwise_force(&bodies[0], &bodies[1], G_SI, 0, 1).unwrap();

    // Earth pulled toward the Moon along +x
    assert!(approx_eq_rel(force.x, 1.3076e15, 1e-3), "got {}", force.x);
    assert_eq!(force.y, 0.0);
    assert_eq!(force.z, 0.0);
}

#[test]
fn test_force_matrix_antisymmetric() {
    let bodies = si_point_masses();
    let forces = compute_force_matrix(&bodies, G_SI).unwrap();

    for i in 0..bodies.len() {
        for j in 0..bodies.len() {
            assert_eq!(forces.get(i, j).unwrap(), -forces.get(j, i).unwrap());
        }
        assert_eq!(forces.get(i, i).unwrap(), DVec3::ZERO);
    }
}

#[test]
fn test_force_matrix_components_match_cells() {
    let bodies = si_point_masses();
    let forces = compute_force_matrix(&bodies, G_SI).unwrap();
    let f = forces.get(2, 1).unwrap();

    assert_eq!(forces.component(0, 2, 1).unwrap(), f.x);
    assert_eq!(forces.component(1, 2, 1).unwrap(), f.y);
    assert_eq!(forces.component(2, 2, 1).unwrap(), f.z);
    assert!(forces.component(3, 2, 1).is_err());
}

#[test]
fn test_total_force_sums_row() {
    let bodies = si_point_masses();
    let forces = compute_force_matrix(&bodies, G_SI).unwrap();

    let expected = forces.get(0, 1).unwrap() + forces.get(0, 2).unwrap();
    let total = total_force(&forces, 0).unwrap();
    assert!(vec_approx_eq(total, expected, 1e-6 * expected.length()));
}

#[test]
fn test_net_force_over_all_bodies_vanishes() {
    let bodies = si_point_masses();
    let forces = compute_force_matrix(&bodies, G_SI).unwrap();

    let net: DVec3 = (0..bodies.len()).map(|i| forces.total_force(i).unwrap()).sum();
    let scale = forces.total_force(0).unwrap().length();
    assert!(net.length() <= 1e-12 * scale);
}

#[test]
fn test_total_force_out_of_range() {
    let bodies = si_point_masses();
    let forces = compute_force_matrix(&bodies, G_SI).unwrap();

    assert_eq!(
        total_force(&forces, 3),
        Err(PhysicsError::BodyIndexOutOfRange { index: 3, len: 3 })
    );
}

#[test]
fn test_coincident_bodies_are_rejected() {
    let bodies = vec![
        PointMass::new(1.0, DVec3::new(1.0, 2.0, 3.0)),
        PointMass::new(1.0, DVec3::new(5.0, 0.0, 0.0)),
        PointMass::new(2.0, DVec3::new(1.0, 2.0, 3.0)),
    ];

    assert_eq!(
        compute_force_matrix(&bodies, 1.0),
        Err(PhysicsError::CoincidentBodies { first: 0, second: 2 })
    );
}

#[test]
fn test_non_positive_mass_is_rejected() {
    let zero = vec![
        PointMass::new(1.0, DVec3::ZERO),
        PointMass::new(0.0, DVec3::X),
    ];
    assert_eq!(
        compute_force_matrix(&zero, 1.0),
        Err(PhysicsError::NonPositiveMass { index: 1, mass: 0.0 })
    );

    let negative = vec![PointMass::new(-2.0, DVec3::ZERO)];
    assert!(matches!(
        compute_force_matrix(&negative, 1.0),
        Err(PhysicsError::NonPositiveMass { index: 0, .. })
    ));
}

#[test]
fn test_single_body_has_no_force() {
    let bodies = vec![PointMass::new(1.0, DVec3::new(0.3, 0.2, 0.1))];
    let forces = compute_force_matrix(&bodies, 1.0).unwrap();

    assert_eq!(forces.len(), 1);
    assert_eq!(forces.total_force(0).unwrap(), DVec3::ZERO);
}

fn point_mass() -> impl Strategy<Value = PointMass> {
    (0.1f64..10.0, -10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0)
        .prop_map(|(m, x, y, z)| PointMass::new(m, DVec3::new(x, y, z)))
}

proptest! {
    #[test]
    fn prop_force_matrix_antisymmetric(bodies in prop::collection::vec(point_mass(), 2..10)) {
        let forces = match compute_force_matrix(&bodies, 1.0) {
            Ok(forces) => forces,
            // coincident draws are not interesting here
            Err(_) => return Ok(()),
        };
        for i in 0..bodies.len() {
            prop_assert_eq!(forces.get(i, i).unwrap(), DVec3::ZERO);
            for j in (i + 1)..bodies.len() {
                prop_assert_eq!(forces.get(i, j).unwrap(), -forces.get(j, i).unwrap());
            }
        }
    }
}
