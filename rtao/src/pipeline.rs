mod buffers;
mod pass;
mod passes;

pub use self::buffers::*;
pub use self::pass::*;
pub use self::passes::*;
