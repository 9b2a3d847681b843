//! Rigid links.

use nalgebra::{Isometry3, Matrix3, Matrix6};

use fdyn_types::{JointId, LinkId, MassProperties};

use crate::spatial::generalized_mass_matrix;

/// A rigid link of a robot.
///
/// Poses are the rest configuration. Dynamics are written in the link's
/// center-of-mass frame, so the link also caches its inertia expressed in that
/// frame and its 6×6 spatial inertia.
#[derive(Debug, Clone)]
pub struct Link {
    pub(crate) id: LinkId,
    pub(crate) name: String,
    pub(crate) mass_properties: MassProperties,
    pub(crate) w_t_l: Isometry3<f64>,
    pub(crate) l_t_com: Isometry3<f64>,
    pub(crate) w_t_com: Isometry3<f64>,
    pub(crate) inertia_com: Matrix3<f64>,
    pub(crate) spatial_inertia: Matrix6<f64>,
    pub(crate) joints: Vec<JointId>,
}

impl Link {
    pub(crate) fn new(
        id: LinkId,
        name: String,
        mass_properties: MassProperties,
        w_t_l: Isometry3<f64>,
        l_t_com: Isometry3<f64>,
    ) -> Self {
        let r = l_t_com.rotation.to_rotation_matrix().into_inner();
        let inertia_com = r.transpose() * mass_properties.inertia * r;
        let spatial_inertia = generalized_mass_matrix(&inertia_com, mass_properties.mass);
        Self {
            id,
            name,
            mass_properties,
            w_t_l,
            l_t_com,
            w_t_com: w_t_l * l_t_com,
            inertia_com,
            spatial_inertia,
            joints: Vec::new(),
        }
    }

    /// Link name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Dense index of this link.
    #[must_use]
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Mass in kg.
    #[must_use]
    pub fn mass(&self) -> f64 {
        self.mass_properties.mass
    }

    /// Inertia about the COM, in link-frame axes.
    #[must_use]
    pub fn inertia(&self) -> &Matrix3<f64> {
        &self.mass_properties.inertia
    }

    /// Inertia about the COM, in COM-frame axes: `R_lcomᵀ · I · R_lcom`.
    #[must_use]
    pub fn inertia_com(&self) -> &Matrix3<f64> {
        &self.inertia_com
    }

    /// Mass and inertia as given.
    #[must_use]
    pub fn mass_properties(&self) -> &MassProperties {
        &self.mass_properties
    }

    /// Spatial inertia `G = diag(I_com, m·1₃)` in the COM frame.
    #[must_use]
    pub fn spatial_inertia(&self) -> &Matrix6<f64> {
        &self.spatial_inertia
    }

    /// Link frame in the world at rest.
    #[must_use]
    pub fn w_t_l(&self) -> &Isometry3<f64> {
        &self.w_t_l
    }

    /// COM frame in the link frame.
    #[must_use]
    pub fn l_t_com(&self) -> &Isometry3<f64> {
        &self.l_t_com
    }

    /// COM frame in the world at rest: `wTl ∘ lTcom`.
    #[must_use]
    pub fn w_t_com(&self) -> &Isometry3<f64> {
        &self.w_t_com
    }

    /// Joints attached to this link, as parent or child.
    #[must_use]
    pub fn joints(&self) -> &[JointId] {
        &self.joints
    }
}
