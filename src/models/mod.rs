mod sweet;

pub use sweet::*;
