use momentdb::{CommonDatabase, CommonParameters, Moment, MomentObject, ObjectKind};
use nalgebra as na;

/// Vertices of a planar target seen at a given in-plane rotation, scale and offset.
fn target(angle: f64, scale: f64, offset: (f64, f64)) -> Vec<na::Point2<f64>> {
    let rotation = na::Rotation2::new(angle);
    [(-0.1, -0.1), (0.12, -0.08), (0.1, 0.1), (-0.06, 0.14)]
        .iter()
        .map(|&(x, y)| {
            let p = rotation * na::Point2::new(x, y) * scale;
            na::Point2::new(p.x + offset.0, p.y + offset.1)
        })
        .collect()
}

fn main() -> Result<(), momentdb::Error> {
    tracing_subscriber::fmt::init();

    // Desired pose: target centered, 0.5 m away
    let desired = target(0.0, 1.0, (0.0, 0.0));
    let desired = MomentObject::from_points(3, ObjectKind::DensePolygon, &desired)?;
    let parameters = CommonParameters::from_reference(&desired, 0.5)?;
    println!("Parameters: {:?}", parameters);

    let mut db = CommonDatabase::new(parameters);

    // Current poses, converging towards the desired one
    for (step, &(angle, scale, offset)) in [
        (2.4, 0.6, (0.08, -0.05)),
        (1.2, 0.8, (0.04, -0.02)),
        (0.3, 0.95, (0.01, 0.0)),
        (0.0, 1.0, (0.0, 0.0)),
    ]
    .iter()
    .enumerate()
    {
        let vertices = target(angle, scale, offset);
        let object = MomentObject::from_points(3, ObjectKind::DensePolygon, &vertices)?;
        db.update_all(&object)?;

        let gravity = db.gravity_normalized()?;
        println!(
            "step {step}: xn = {:.4}, yn = {:.4}, an = {:.4}, alpha = {:.4}",
            gravity.xn(),
            gravity.yn(),
            db.area_normalized()?.value(),
            db.alpha()?.value()
        );
        println!("  c-invariants: {:?}", db.c_invariant()?.values());
    }

    Ok(())
}
