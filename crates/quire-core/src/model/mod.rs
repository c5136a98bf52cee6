//! Position-bearing records and the kinds that own them.

pub mod ids;
pub mod item;
pub mod kind;
pub mod user;

pub use ids::{ActorId, ItemId, ParentId, SectionId};
pub use item::{GroupKey, OrderedItem, ParentRef};
pub use kind::{ItemKind, ORDER_COLUMN, ParentKind, SectionKind};
pub use user::Role;
