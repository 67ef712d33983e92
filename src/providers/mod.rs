pub mod bcra;
pub mod bluelytics;
pub mod util;

pub use bcra::BcraInflationProvider;
pub use bluelytics::BluelyticsProvider;
