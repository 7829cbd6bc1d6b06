//! Cart - per-session shopping cart owned by the shop front-end.

use thiserror::Error;

use crate::bus::Publisher;
use crate::inventory::Item;
use crate::orders::{Order, OrderPublisher};

/// Error type for cart operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CartError {
    /// Quantity is zero or more than the warehouse has.
    #[error("cannot put {requested} x {name} in the cart, {available} available")]
    InvalidQuantity {
        name: String,
        requested: u32,
        available: u32,
    },
    #[error("the cart is empty")]
    Empty,
    /// A required customer field is blank.
    #[error("missing customer {0}")]
    MissingField(&'static str),
    #[error("the order could not be published")]
    PublishFailed,
}

/// Customer details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub address: String,
    pub email: String,
    pub phone: String,
    pub payment_method: String,
}

impl CustomerDetails {
    fn validate(&self) -> Result<(), CartError> {
        let fields = [
            ("name", &self.name),
            ("address", &self.address),
            ("email", &self.email),
            ("phone", &self.phone),
            ("payment method", &self.payment_method),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((field, _)) => Err(CartError::MissingField(field)),
            None => Ok(()),
        }
    }
}

/// Items a customer intends to order, one line per name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cart {
    lines: Vec<Item>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `quantity` of an inventory item, merging with an existing line.
    ///
    /// The line total may not exceed the stock the item was listed with.
    pub fn add(&mut self, listed: &Item, quantity: u32) -> Result<(), CartError> {
        let in_cart = self.quantity_of(&listed.name);
        let requested = in_cart.saturating_add(quantity);

        if quantity == 0 || requested > listed.quantity {
            return Err(CartError::InvalidQuantity {
                name: listed.name.clone(),
                requested,
                available: listed.quantity,
            });
        }

        match self.lines.iter_mut().find(|l| l.name == listed.name) {
            Some(line) => line.quantity = requested,
            None => self
                .lines
                .push(Item::new(listed.name.clone(), listed.price, quantity)),
        }
        Ok(())
    }

    /// Remove a line. Returns it if it was in the cart.
    pub fn remove(&mut self, name: &str) -> Option<Item> {
        let index = self.lines.iter().position(|l| l.name == name)?;
        Some(self.lines.remove(index))
    }

    pub fn lines(&self) -> &[Item] {
        &self.lines
    }

    pub fn quantity_of(&self, name: &str) -> u32 {
        self.lines
            .iter()
            .find(|l| l.name == name)
            .map_or(0, |l| l.quantity)
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.lines
            .iter()
            .map(|l| l.price * f64::from(l.quantity))
            .sum()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Build the order for this cart. The cart is left untouched.
    pub fn checkout(&self, customer: &CustomerDetails) -> Result<Order, CartError> {
        if self.is_empty() {
            return Err(CartError::Empty);
        }
        customer.validate()?;

        Ok(Order {
            name: customer.name.clone(),
            address: customer.address.clone(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
            payment_method: customer.payment_method.clone(),
            sweets: self.lines.clone(),
        })
    }

    /// Check out and publish the order; the cart is emptied only if publishing succeeded.
    pub fn place_order<P: Publisher>(
        &mut self,
        customer: &CustomerDetails,
        publisher: &OrderPublisher<P>,
    ) -> Result<Order, CartError> {
        let order = self.checkout(customer)?;
        if !publisher.publish_order(&order) {
            return Err(CartError::PublishFailed);
        }
        self.clear();
        Ok(order)
    }
}
