//! `SeaORM` Entity prelude

pub use super::categories::Entity as Categories;
pub use super::order_items::Entity as OrderItems;
pub use super::orders::Entity as Orders;
pub use super::products::Entity as Products;
pub use super::profiles::Entity as Profiles;
pub use super::reviews::Entity as Reviews;
pub use super::users::Entity as Users;
pub use super::wishlist_items::Entity as WishlistItems;
