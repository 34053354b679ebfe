use crate::actor_framework::Entity;
use crate::domain::{now_millis, Order, OrderCreate, OrderStatus, DEFAULT_ESTIMATED_MINUTES};
use crate::store::keys;
use super::actions::OrderAction;
use super::error::OrderError;

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Action = OrderAction;
    type ActionResult = Order;
    type Error = OrderError;

    const STORE_KEY: &'static str = keys::USER_ORDERS;

    fn id(&self) -> &String {
        &self.id
    }

    /// Creates a new Order from a cart snapshot.
    ///
    /// # Notes
    /// The order starts as `pending` with the default preparation estimate.
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, OrderError> {
        if params.items.is_empty() {
            return Err(OrderError::EmptyCart);
        }
        if params.total == 0 {
            return Err(OrderError::ValidationError("order total must be positive".to_string()));
        }

        Ok(Self {
            id,
            restaurant_name: params.restaurant_name,
            items: params.items,
            total: params.total,
            status: OrderStatus::Pending,
            estimated_time: DEFAULT_ESTIMATED_MINUTES,
            timestamp: now_millis(),
        })
    }

    /// Handles vendor status updates and returns the updated order.
    ///
    /// # Errors
    /// Delivered orders cannot advance, and a status can never move backwards.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, OrderError> {
        let target = match action {
            OrderAction::Advance => self
                .status
                .next()
                .ok_or_else(|| OrderError::AlreadyDelivered(self.id.clone()))?,
            OrderAction::AdvanceTo(status) if status > self.status => status,
            OrderAction::AdvanceTo(status) => {
                return Err(OrderError::InvalidTransition { from: self.status, to: status });
            }
        };

        self.status = target;
        Ok(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order() -> Order {
        Order::from_create_params(
            "order_1".into(),
            OrderCreate {
                restaurant_name: "Mama Put".into(),
                items: vec!["1x Amala".into()],
                total: 1200,
            },
        )
        .unwrap()
    }

    #[test]
    fn new_orders_are_pending() {
        let order = order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.estimated_time, 30);
    }

    #[test]
    fn empty_snapshot_is_rejected() {
        let params = OrderCreate { restaurant_name: String::new(), items: vec![], total: 0 };
        assert_eq!(Order::from_create_params("x".into(), params), Err(OrderError::EmptyCart));
    }

    #[test]
    fn vendor_moves_order_forward_only() {
        let mut order = order();
        assert_eq!(order.handle_action(OrderAction::Advance).unwrap().status, OrderStatus::Confirmed);
        assert_eq!(
            order.handle_action(OrderAction::AdvanceTo(OrderStatus::Ready)).unwrap().status,
            OrderStatus::Ready
        );

        let backwards = order.handle_action(OrderAction::AdvanceTo(OrderStatus::Preparing));
        assert_eq!(
            backwards,
            Err(OrderError::InvalidTransition { from: OrderStatus::Ready, to: OrderStatus::Preparing })
        );
        assert_eq!(order.status, OrderStatus::Ready);

        order.handle_action(OrderAction::Advance).unwrap();
        assert_eq!(
            order.handle_action(OrderAction::Advance),
            Err(OrderError::AlreadyDelivered("order_1".into()))
        );
    }
}
