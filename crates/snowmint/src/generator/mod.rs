mod mutex;
mod snowflake;
mod status;

pub use mutex::*;
pub use snowflake::*;
pub use status::*;
