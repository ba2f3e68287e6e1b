pub mod color;
pub mod color_clusterer;
pub mod compositor;
pub mod region;
pub mod region_detector;
pub mod utils;
pub mod validator;
