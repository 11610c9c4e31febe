//! Example: Aligning two reconstructions with a similarity transform
//!
//! The same camera trajectory is known in two frames that differ by scale,
//! rotation and translation. Matching camera centres (a few of them wrong)
//! give the transform, which is then stored, loaded, and used to move every
//! pose into the reference frame.

use loransac::*;
use nalgebra::{UnitQuaternion, Vector3};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Reconstruction Alignment Example ===\n");

    let reference_from_local = SimilarityTransform3::new(
        0.25,
        UnitQuaternion::from_euler_angles(0.0, 0.0, 1.2),
        Vector3::new(100.0, -40.0, 3.0),
    );

    // Local trajectory: a spiral around the scene.
    let local: Vec<CameraPose> = (0..40)
        .map(|i| {
            let t = i as f64 * 0.2;
            let center = Vector3::new(8.0 * t.cos(), 8.0 * t.sin(), 0.5 * t);
            let rotation = UnitQuaternion::from_euler_angles(0.0, 0.0, t);
            CameraPose::new(rotation, -(rotation * center))
        })
        .collect();

    let src: Vec<_> = local.iter().map(CameraPose::projection_center).collect();
    let mut tgt: Vec<_> = src
        .iter()
        .map(|c| reference_from_local.transform_point(c))
        .collect();
    // Mismatched registrations.
    for c in tgt.iter_mut().step_by(7) {
        *c += Vector3::new(5.0, -3.0, 2.0);
    }

    let options = RansacOptions {
        max_error: 0.05,
        ..RansacOptions::default()
    };
    let report = estimate_similarity_transform(&src, &tgt, &options)?;
    let Some(transform) = report.model else {
        println!("Alignment failed after {} trials", report.num_trials);
        return Ok(());
    };

    println!(
        "Estimated transform from {} / {} centres in {} trials",
        report.support.num_inliers,
        src.len(),
        report.num_trials
    );
    println!("  Scale: {:.6}", transform.scale());
    println!("  Rotation angle: {:.6} rad", transform.rotation().angle());
    println!("  Translation: {:?}", transform.translation().as_slice());

    let path = std::env::temp_dir().join("loransac_alignment.txt");
    transform.to_file(&path)?;
    let loaded = SimilarityTransform3::from_file(&path)?;
    println!("\nStored transform in {}", path.display());
    println!("  Round trip exact: {}", loaded == transform);

    let mut aligned = local.clone();
    align_poses(&loaded, &mut aligned);
    let worst = aligned
        .iter()
        .zip(&src)
        .map(|(pose, c)| {
            (pose.projection_center() - reference_from_local.transform_point(c)).norm()
        })
        .fold(0.0, f64::max);
    println!("  Largest centre error after alignment: {:.3e}", worst);

    Ok(())
}
