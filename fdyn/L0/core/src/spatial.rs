//! Screw-theory primitives on 6D twists and wrenches.
//!
//! Layout is angular-first throughout:
//! - twists `[ω, v]` (angular velocity, linear velocity)
//! - wrenches `[m, f]` (moment, force)
//!
//! For a rigid transform `aTb` (frame `b` expressed in `a`), the adjoint
//! `Ad(aTb)` maps a twist written in `b` to the same twist written in `a`, and
//! `Ad(aTb)ᵀ` maps a wrench written in `a` to the same wrench written in `b`.
//!
//! Functions here are pure math with no robot state.

use nalgebra::{
    Isometry3, Matrix3, Matrix6, Point3, Translation3, UnitQuaternion, Vector3, Vector6,
};

/// 6D spatial vector: `[angular (3), linear (3)]`.
pub type SpatialVector = Vector6<f64>;

/// Below this rotation angle the SE(3) exponential switches to its series form.
const SMALL_ANGLE: f64 = 1e-4;

#[inline]
fn angular(x: &SpatialVector) -> Vector3<f64> {
    Vector3::new(x[0], x[1], x[2])
}

#[inline]
fn linear(x: &SpatialVector) -> Vector3<f64> {
    Vector3::new(x[3], x[4], x[5])
}

#[inline]
fn stack(top: &Vector3<f64>, bottom: &Vector3<f64>) -> SpatialVector {
    SpatialVector::new(top.x, top.y, top.z, bottom.x, bottom.y, bottom.z)
}

/// Skew-symmetric cross-product matrix: `skew(v) * u == v × u`.
#[must_use]
pub fn skew(v: &Vector3<f64>) -> Matrix3<f64> {
    Matrix3::new(0.0, -v.z, v.y, v.z, 0.0, -v.x, -v.y, v.x, 0.0)
}

/// Adjoint of a rigid transform: `Ad_T = [[R, 0], [[p]×R, R]]`.
#[must_use]
pub fn adjoint_map(t: &Isometry3<f64>) -> Matrix6<f64> {
    let r = t.rotation.to_rotation_matrix().into_inner();
    let p = t.translation.vector;
    let mut ad = Matrix6::zeros();
    ad.fixed_view_mut::<3, 3>(0, 0).copy_from(&r);
    ad.fixed_view_mut::<3, 3>(3, 3).copy_from(&r);
    ad.fixed_view_mut::<3, 3>(3, 0).copy_from(&(skew(&p) * r));
    ad
}

/// Lie bracket operator of a twist: `ad(V) = [[[ω]×, 0], [[v]×, [ω]×]]`.
#[must_use]
pub fn ad(twist: &SpatialVector) -> Matrix6<f64> {
    let w = skew(&angular(twist));
    let v = skew(&linear(twist));
    let mut m = Matrix6::zeros();
    m.fixed_view_mut::<3, 3>(0, 0).copy_from(&w);
    m.fixed_view_mut::<3, 3>(3, 3).copy_from(&w);
    m.fixed_view_mut::<3, 3>(3, 0).copy_from(&v);
    m
}

/// Spatial cross product for motion vectors: `v × s`, equal to `ad(v) * s`.
#[allow(clippy::inline_always)]
#[inline(always)]
#[must_use]
pub fn spatial_cross_motion(v: SpatialVector, s: SpatialVector) -> SpatialVector {
    let w = angular(&v);
    let s_ang = angular(&s);
    stack(
        &w.cross(&s_ang),
        &(w.cross(&linear(&s)) + linear(&v).cross(&s_ang)),
    )
}

/// Spatial cross product for force vectors: `v ×* f`, equal to `-ad(v)ᵀ * f`.
#[allow(clippy::inline_always)]
#[inline(always)]
#[must_use]
pub fn spatial_cross_force(v: SpatialVector, f: SpatialVector) -> SpatialVector {
    let w = angular(&v);
    let f_lin = linear(&f);
    stack(
        &(w.cross(&angular(&f)) + linear(&v).cross(&f_lin)),
        &w.cross(&f_lin),
    )
}

/// Spatial inertia about the center of mass: `G = diag(I, m·1₃)`.
#[must_use]
pub fn generalized_mass_matrix(inertia: &Matrix3<f64>, mass: f64) -> Matrix6<f64> {
    let mut g = Matrix6::zeros();
    g.fixed_view_mut::<3, 3>(0, 0).copy_from(inertia);
    g.fixed_view_mut::<3, 3>(3, 3)
        .copy_from(&(Matrix3::identity() * mass));
    g
}

/// Screw axis of a pure rotation about `direction` through `point`:
/// `[ω, p × ω]` with `ω` normalized.
#[must_use]
pub fn unit_twist(direction: &Vector3<f64>, point: &Point3<f64>) -> SpatialVector {
    let w = direction.normalize();
    stack(&w, &point.coords.cross(&w))
}

/// SE(3) exponential of a twist `ξ = [ω, v]` scaled by the joint variable.
///
/// With `θ = |ω|`:
/// - `R = exp([ω]×)`
/// - `p = (I + (1 − cos θ)/θ² [ω]× + (θ − sin θ)/θ³ [ω]×²) v`
///
/// For `ω = 0` this is the pure translation `p = v`.
#[must_use]
pub fn exp_twist(xi: &SpatialVector) -> Isometry3<f64> {
    let w = angular(xi);
    let v = linear(xi);
    let theta = w.norm();

    let (a, b) = if theta < SMALL_ANGLE {
        let t2 = theta * theta;
        (0.5 - t2 / 24.0, 1.0 / 6.0 - t2 / 120.0)
    } else {
        let t2 = theta * theta;
        ((1.0 - theta.cos()) / t2, (theta - theta.sin()) / (t2 * theta))
    };

    let wx = skew(&w);
    let p = (Matrix3::identity() + wx * a + wx * wx * b) * v;
    Isometry3::from_parts(Translation3::from(p), UnitQuaternion::from_scaled_axis(w))
}

/// Express a twist given in frame `b` in frame `a`.
#[must_use]
pub fn transform_twist(a_t_b: &Isometry3<f64>, twist: &SpatialVector) -> SpatialVector {
    let w = a_t_b.rotation * angular(twist);
    let v = a_t_b.rotation * linear(twist) + a_t_b.translation.vector.cross(&w);
    stack(&w, &v)
}

/// Express a wrench given in frame `a` in frame `b`: `Ad(aTb)ᵀ · F`.
#[must_use]
pub fn transform_wrench(a_t_b: &Isometry3<f64>, wrench: &SpatialVector) -> SpatialVector {
    let inv = a_t_b.rotation.inverse();
    let m = angular(wrench);
    let f = linear(wrench);
    let p = a_t_b.translation.vector;
    stack(&(inv * (m + f.cross(&p))), &(inv * f))
}
