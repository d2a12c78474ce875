//! Orientation: which geometric role each logical axis plays.
//!
//! Each non-default variant names the roles of logical X, Y and Z in order, so
//! [`Orientation::Yxz`] puts logical X on the vertical and logical Y on the horizontal
//! (a horizontal bar chart) without touching any data binding.

use glam::DMat3;
use vantage_core::math::permutation_matrix;

use crate::axis::AxisRole;

/// Axis role permutation of a coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    /// Inherit; resolves to [`Orientation::Xyz`] on non-embedded systems.
    #[default]
    Default,
    Xyz,
    /// Horizontal: logical X and Y swap roles.
    Yxz,
    Xzy,
    Zyx,
    Yzx,
    Zxy,
}

impl Orientation {
    /// The six explicit permutations.
    pub const PERMUTATIONS: [Orientation; 6] = [
        Orientation::Xyz,
        Orientation::Yxz,
        Orientation::Xzy,
        Orientation::Zyx,
        Orientation::Yzx,
        Orientation::Zxy,
    ];

    /// Replace [`Orientation::Default`] with the identity permutation.
    pub fn resolve(self) -> Self {
        match self {
            Self::Default => Self::Xyz,
            other => other,
        }
    }

    /// Geometric roles of logical X, Y and Z.
    pub fn roles(self) -> [AxisRole; 3] {
        use AxisRole::*;
        match self {
            Self::Default | Self::Xyz => [X, Y, Z],
            Self::Yxz => [Y, X, Z],
            Self::Xzy => [X, Z, Y],
            Self::Zyx => [Z, Y, X],
            Self::Yzx => [Y, Z, X],
            Self::Zxy => [Z, X, Y],
        }
    }

    /// Role of one logical axis.
    pub fn role_of(self, logical: AxisRole) -> AxisRole {
        self.roles()[logical.index()]
    }

    /// Logical axis that plays `role`.
    pub fn logical_for(self, role: AxisRole) -> AxisRole {
        self.inverse().role_of(role)
    }

    /// The permutation with the given roles, if `roles` is a permutation.
    pub fn from_roles(roles: [AxisRole; 3]) -> Option<Self> {
        Self::PERMUTATIONS
            .into_iter()
            .find(|orientation| orientation.roles() == roles)
    }

    /// The permutation undoing this one.
    pub fn inverse(self) -> Self {
        let mut roles = [AxisRole::X; 3];
        for (logical, role) in self.roles().into_iter().enumerate() {
            roles[role.index()] = AxisRole::ALL[logical];
        }
        Self::from_roles(roles).unwrap_or(Self::Xyz)
    }

    /// Apply `self`, then `next`: logical axis `i` gets `next.role_of(self.role_of(i))`.
    pub fn compose(self, next: Orientation) -> Self {
        let roles = self.roles().map(|role| next.role_of(role));
        Self::from_roles(roles).unwrap_or(Self::Xyz)
    }

    /// Linear part of the LCS → parent frame step (a permutation matrix).
    pub fn matrix(self) -> DMat3 {
        permutation_matrix(self.roles().map(AxisRole::index))
    }
}
