pub mod menger;
pub mod pipeline;
pub mod resample;

pub use menger::{menger_radius_m, turn_direction, RADIUS_CAP_M};
pub use pipeline::{compute_curvature_points, CurvaturePoint};
pub use resample::{path_length_m, resample};
