mod summary;
mod timeline;

pub use summary::*;
pub use timeline::*;
