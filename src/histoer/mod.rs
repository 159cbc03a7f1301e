pub mod histo1d;
pub mod histo2d;

pub use histo1d::histogram1d::Histogram;
pub use histo2d::clusterizer::Clusterizer;
pub use histo2d::histogram2d::Histogram2D;
