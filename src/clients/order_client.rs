use tracing::{debug, info, instrument};

use crate::actor_framework::ResourceClient;
use crate::domain::{Order, OrderCreate, OrderStatus};
use crate::order_actor::{OrderAction, OrderError};

/// Client for the order log.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
}

impl OrderClient {
    pub fn new(inner: ResourceClient<Order>) -> Self {
        Self { inner }
    }

    /// Stores a new `pending` order and returns it.
    #[instrument(skip(self), fields(total = params.total))]
    pub async fn create_order(&self, params: OrderCreate) -> Result<Order, OrderError> {
        debug!("Sending request");
        let id = self.inner.create(params).await?;
        self.inner
            .get(id.clone())
            .await?
            .ok_or(OrderError::NotFound(id))
    }

    /// Vendor action: moves the order to its next status.
    #[instrument(skip(self))]
    pub async fn advance_order(&self, id: String) -> Result<Order, OrderError> {
        let order = self.inner.perform_action(id, OrderAction::Advance).await?;
        info!(status = %order.status, "Order advanced");
        Ok(order)
    }

    /// Vendor action: jumps forward to `status`.
    #[instrument(skip(self))]
    pub async fn update_status(&self, id: String, status: OrderStatus) -> Result<Order, OrderError> {
        let order = self.inner.perform_action(id, OrderAction::AdvanceTo(status)).await?;
        info!(status = %order.status, "Order status updated");
        Ok(order)
    }
}

impl_resource_reads!(OrderClient, Order, OrderError, order);
