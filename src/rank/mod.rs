pub mod bitdepth;
pub mod footprint;
pub mod histogram;
pub mod mean;
pub mod structuring_element;
