mod fmp;

pub use fmp::FmpAdapter;
