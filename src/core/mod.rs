pub mod id;
pub mod record;
pub mod stream;

pub use id::*;
pub use record::*;
pub use stream::*;
