pub mod calendar;
pub mod chore;
pub mod conversation;
pub mod expense;
pub mod group;
pub mod inventory;
pub mod list;
pub mod profile;
pub mod property;
pub mod review;
pub mod store;
pub mod user;

pub use calendar::*;
pub use chore::*;
pub use conversation::*;
pub use expense::*;
pub use group::*;
pub use inventory::*;
pub use list::*;
pub use profile::*;
pub use property::*;
pub use review::*;
pub use store::*;
pub use user::*;
