//! Record shapes shared by the scenarios.

use relmap::{Shape, Type};

/// `BigMak` owning many `Pickle`s.
pub fn big_mak() -> Shape {
    Shape::new("BigMak")
        .scalar("Id", Type::I32)
        .collection("Pickles", "Pickle")
}

pub fn pickle() -> Shape {
    Shape::new("Pickle")
        .scalar("Id", Type::I32)
        .reference("BigMak", "BigMak")
}

/// `Order` and `OrderDetails` refer to each other once. `OrderDetails`
/// carries the `OrderId` property.
pub fn order() -> Shape {
    Shape::new("Order")
        .scalar("Id", Type::I32)
        .reference("Details", "OrderDetails")
}

pub fn order_details() -> Shape {
    Shape::new("OrderDetails")
        .scalar("Id", Type::I32)
        .scalar("OrderId", Type::I32)
        .reference("Order", "Order")
}

/// An `Employee` with a `Manager` and direct `Reports`.
pub fn employee() -> Shape {
    Shape::new("Employee")
        .scalar("Id", Type::I32)
        .scalar("Name", Type::String)
        .reference("Manager", "Employee")
        .collection("Reports", "Employee")
}

/// A record with a key and no navigations.
pub fn plain(name: &str) -> Shape {
    Shape::new(name).scalar("Id", Type::I32)
}
