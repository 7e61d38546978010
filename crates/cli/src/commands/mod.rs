mod intercept;
mod resolve;

pub use intercept::run as intercept;
pub use resolve::run as resolve;
