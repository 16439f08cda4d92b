pub mod merge;
pub mod response;
pub mod selection;
pub mod upload;

pub use merge::*;
pub use response::*;
pub use selection::*;
pub use upload::*;
