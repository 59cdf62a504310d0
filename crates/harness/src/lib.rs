pub mod fixtures;
pub mod session;

pub use session::TestSession;
