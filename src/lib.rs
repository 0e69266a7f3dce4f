mod constants;
mod error;
mod follower;
mod meshnavigator;
mod navigationstate;
mod navigationsystem;
mod outcome;
mod pathcache;
mod position;
mod regionplanner;
mod request;
mod traits;

pub use constants::*;
pub use error::*;
pub use navigationstate::*;
pub use navigationsystem::*;
pub use outcome::*;
pub use pathcache::*;
pub use position::*;
pub use request::*;
pub use traits::*;
