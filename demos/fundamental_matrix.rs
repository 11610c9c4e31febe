//! Example: Fundamental matrix estimation from point correspondences
//!
//! Two pinhole cameras observe a random point cloud; a share of the
//! correspondences is replaced by random matches and LO-RANSAC recovers the
//! epipolar geometry.

use loransac::*;
use nalgebra::{Matrix3, Matrix3x4, Rotation3, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Fundamental Matrix Estimation Example ===\n");

    let n_points = 120;
    let n_outliers = 40;
    let n_total = n_points + n_outliers;

    let k = Matrix3::new(500.0, 0.0, 320.0, 0.0, 500.0, 240.0, 0.0, 0.0, 1.0);
    let mut second = Matrix3x4::zeros();
    second
        .fixed_view_mut::<3, 3>(0, 0)
        .copy_from(&Rotation3::from_euler_angles(0.02, -0.15, 0.01).into_inner());
    second.set_column(3, &Vector3::new(-1.0, 0.0, 0.1));
    let second = k * second;

    let mut rng = StdRng::seed_from_u64(42);
    let mut points1 = Vec::with_capacity(n_total);
    let mut points2 = Vec::with_capacity(n_total);

    for _ in 0..n_points {
        let world = Vector3::new(
            rng.gen_range(-2.0..2.0),
            rng.gen_range(-1.5..1.5),
            rng.gen_range(4.0..10.0),
        );
        let p1 = k * world;
        let p2 = second * world.push(1.0);
        // Half a pixel of detection noise.
        points1.push(Vector2::new(
            p1.x / p1.z + rng.gen_range(-0.5..0.5),
            p1.y / p1.z + rng.gen_range(-0.5..0.5),
        ));
        points2.push(Vector2::new(
            p2.x / p2.z + rng.gen_range(-0.5..0.5),
            p2.y / p2.z + rng.gen_range(-0.5..0.5),
        ));
    }

    for _ in 0..n_outliers {
        points1.push(Vector2::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0)));
        points2.push(Vector2::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0)));
    }

    println!("Generated {} inliers and {} outliers\n", n_points, n_outliers);

    let options = RansacOptions {
        max_error: 2.0,
        ..RansacOptions::default()
    };
    let report = estimate_fundamental_matrix(&points1, &points2, &options)?;

    let Some(model) = report.model else {
        println!("Estimation failed after {} trials", report.num_trials);
        return Ok(());
    };

    println!("Estimation results:");
    println!(
        "  Found {} inliers out of {} points",
        report.support.num_inliers, n_total
    );
    println!(
        "  Inlier ratio: {:.2}%",
        100.0 * report.support.inlier_ratio(n_total)
    );
    println!("  Trials: {}", report.num_trials);

    let recovered = report.inlier_mask[..n_points].iter().filter(|&&m| m).count();
    println!("  True inliers recovered: {}/{}", recovered, n_points);

    println!("\nEstimated fundamental matrix:");
    for i in 0..3 {
        println!(
            "  [{:12.4e}, {:12.4e}, {:12.4e}]",
            model.f[(i, 0)],
            model.f[(i, 1)],
            model.f[(i, 2)]
        );
    }

    Ok(())
}
