// Not every helper is used in every test, so we allow dead code
#![allow(unused_imports, dead_code)]

mod localstack_setup;
pub use localstack_setup::*;
mod test_setup;
pub use test_setup::*;
mod utils;
pub use utils::*;
