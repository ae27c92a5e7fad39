use crate::{Point3i, PointN};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Either the X, Y, or Z axis.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(Deserialize, Serialize))]
pub enum Axis3 {
    X = 0,
    Y = 1,
    Z = 2,
}

impl Axis3 {
    pub const ALL: [Axis3; 3] = [Axis3::X, Axis3::Y, Axis3::Z];

    /// The index for a point's component on this axis.
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn get_unit_vector(&self) -> Point3i {
        match self {
            Axis3::X => PointN([1, 0, 0]),
            Axis3::Y => PointN([0, 1, 0]),
            Axis3::Z => PointN([0, 0, 1]),
        }
    }

    /// The `(horizontal, vertical)` axes of a 2D texture page whose normal is `self`.
    ///
    /// These follow the usual image orientation for each of the three orthogonal views, so they are not a cyclic
    /// permutation.
    pub fn plane_axes(&self) -> (Axis3, Axis3) {
        match self {
            Axis3::X => (Axis3::Z, Axis3::Y),
            Axis3::Y => (Axis3::X, Axis3::Z),
            Axis3::Z => (Axis3::X, Axis3::Y),
        }
    }

    /// Returns `true` iff `other` is one of the page plane axes of `self`.
    pub fn spans(&self, other: Axis3) -> bool {
        *self != other
    }
}

// ████████╗███████╗███████╗████████╗███████╗
// ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝
//    ██║   █████╗  ███████╗   ██║   ███████╗
//    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║
//    ██║   ███████╗███████║   ██║   ███████║
//    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝
