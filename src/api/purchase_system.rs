//! `PurchaseSystem` aggregate service.
//!
//! Orders mirror catalog items (select orders with atomic options) and
//! aggregates (composite orders for recipes, menus, carts). The backend
//! owns the least-cost optimization; the client only wires ids through.

use std::collections::BTreeMap;
use std::sync::Arc;

use larder_api_types::purchase_system::{
    AssociateRequest, AtomicOrderCreateRequest, AtomicOrderCreatedResponse,
    AtomicOrderDeleteRequest, AtomicOrderUpdateRequest, CompositeMemberRequest,
    CompositeOrderCreatedResponse, CompositeOrderRequest, CompositeSubOrderRequest,
    OptimalPurchaseRequest, OptimalPurchaseResponse, OrderByAssociateResponse, OrderCostResponse,
    OrderRef, SelectOrderCreatedResponse, SubOrderScaleRequest,
};
use tracing::warn;

use crate::rpc::{ApiError, RpcClient};

pub struct PurchaseSystemApi {
    rpc: Arc<RpcClient>,
}

impl PurchaseSystemApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    pub async fn create_select_order(&self, associate_id: &str) -> Result<String, ApiError> {
        let request = AssociateRequest {
            associate_id: associate_id.to_owned(),
        };
        let response: SelectOrderCreatedResponse = self
            .rpc
            .call("PurchaseSystem/createSelectOrder", &request)
            .await
            .inspect_err(|error| warn!(associate_id, %error, "create select order failed"))?;
        Ok(response.select_order)
    }

    pub async fn create_atomic_order(
        &self,
        select_order: &str,
        associate_id: &str,
        quantity: f64,
        units: &str,
        price: f64,
    ) -> Result<String, ApiError> {
        let request = AtomicOrderCreateRequest {
            select_order: select_order.to_owned(),
            associate_id: associate_id.to_owned(),
            quantity,
            units: units.to_owned(),
            price,
        };
        let response: AtomicOrderCreatedResponse = self
            .rpc
            .call("PurchaseSystem/createAtomicOrder", &request)
            .await
            .inspect_err(|error| warn!(select_order, %error, "create atomic order failed"))?;
        Ok(response.atomic_order)
    }

    pub async fn delete_atomic_order(
        &self,
        select_order: &str,
        atomic_order: &str,
    ) -> Result<(), ApiError> {
        let request = AtomicOrderDeleteRequest {
            select_order: select_order.to_owned(),
            atomic_order: atomic_order.to_owned(),
        };
        self.rpc
            .call_ack("PurchaseSystem/deleteAtomicOrder", &request)
            .await
            .inspect_err(|error| warn!(select_order, atomic_order, %error, "delete atomic order failed"))
    }

    pub async fn update_atomic_order(
        &self,
        request: &AtomicOrderUpdateRequest,
    ) -> Result<(), ApiError> {
        self.rpc
            .call_ack("PurchaseSystem/updateAtomicOrder", request)
            .await
            .inspect_err(|error| {
                warn!(atomic_order = %request.atomic_order, %error, "update atomic order failed");
            })
    }

    pub async fn create_composite_order(&self, associate_id: &str) -> Result<String, ApiError> {
        let request = AssociateRequest {
            associate_id: associate_id.to_owned(),
        };
        let response: CompositeOrderCreatedResponse = self
            .rpc
            .call("PurchaseSystem/createCompositeOrder", &request)
            .await
            .inspect_err(|error| warn!(associate_id, %error, "create composite order failed"))?;
        Ok(response.composite_order)
    }

    pub async fn add_select_order(
        &self,
        composite_order: &str,
        select_order: &str,
        scale_factor: f64,
    ) -> Result<(), ApiError> {
        let request = CompositeMemberRequest {
            composite_order: composite_order.to_owned(),
            select_order: select_order.to_owned(),
            scale_factor: Some(scale_factor),
        };
        self.rpc
            .call_ack("PurchaseSystem/addSelectOrderToCompositeOrder", &request)
            .await
            .inspect_err(|error| warn!(composite_order, select_order, %error, "add select order failed"))
    }

    pub async fn remove_select_order(
        &self,
        composite_order: &str,
        select_order: &str,
    ) -> Result<(), ApiError> {
        let request = CompositeMemberRequest {
            composite_order: composite_order.to_owned(),
            select_order: select_order.to_owned(),
            scale_factor: None,
        };
        self.rpc
            .call_ack("PurchaseSystem/removeSelectOrderFromCompositeOrder", &request)
            .await
            .inspect_err(|error| warn!(composite_order, select_order, %error, "remove select order failed"))
    }

    pub async fn add_composite_sub_order(
        &self,
        parent_order: &str,
        child_order: &str,
    ) -> Result<(), ApiError> {
        let request = CompositeSubOrderRequest {
            parent_order: parent_order.to_owned(),
            child_order: child_order.to_owned(),
        };
        self.rpc
            .call_ack("PurchaseSystem/addCompositeSubOrder", &request)
            .await
            .inspect_err(|error| warn!(parent_order, child_order, %error, "add sub order failed"))
    }

    pub async fn remove_composite_sub_order(
        &self,
        parent_order: &str,
        child_order: &str,
    ) -> Result<(), ApiError> {
        let request = CompositeSubOrderRequest {
            parent_order: parent_order.to_owned(),
            child_order: child_order.to_owned(),
        };
        self.rpc
            .call_ack("PurchaseSystem/removeCompositeSubOrder", &request)
            .await
            .inspect_err(|error| warn!(parent_order, child_order, %error, "remove sub order failed"))
    }

    pub async fn update_sub_order_scale_factor(
        &self,
        parent_order: &str,
        child_order: &str,
        new_scale_factor: f64,
    ) -> Result<(), ApiError> {
        let request = SubOrderScaleRequest {
            parent_order: parent_order.to_owned(),
            child_order: child_order.to_owned(),
            new_scale_factor,
        };
        self.rpc
            .call_ack("PurchaseSystem/updateSubOrderScaleFactor", &request)
            .await
            .inspect_err(|error| warn!(parent_order, child_order, %error, "update sub order scale failed"))
    }

    /// Deletes a composite order; the backend recursively cleans up its
    /// children.
    pub async fn delete_composite_order(&self, composite_order: &str) -> Result<(), ApiError> {
        let request = CompositeOrderRequest {
            composite_order: composite_order.to_owned(),
        };
        self.rpc
            .call_ack("PurchaseSystem/deleteCompositeOrder", &request)
            .await
            .inspect_err(|error| warn!(composite_order, %error, "delete composite order failed"))
    }

    pub async fn calculate_optimal_purchase(
        &self,
        composite_orders: &[String],
    ) -> Result<(), ApiError> {
        let request = OptimalPurchaseRequest {
            composite_orders: composite_orders.to_vec(),
        };
        self.rpc
            .call_ack("PurchaseSystem/calculateOptimalPurchase", &request)
            .await
            .inspect_err(|error| warn!(%error, "calculate optimal purchase failed"))
    }

    /// Marks a root composite order and all descendants as purchased.
    pub async fn purchase_order(&self, composite_order: &str) -> Result<(), ApiError> {
        let request = CompositeOrderRequest {
            composite_order: composite_order.to_owned(),
        };
        self.rpc
            .call_ack("PurchaseSystem/purchaseOrder", &request)
            .await
            .inspect_err(|error| warn!(composite_order, %error, "purchase order failed"))
    }

    pub async fn order_by_associate_id(
        &self,
        associate_id: &str,
    ) -> Result<Option<OrderRef>, ApiError> {
        let request = AssociateRequest {
            associate_id: associate_id.to_owned(),
        };
        let response: OrderByAssociateResponse = self
            .rpc
            .call("PurchaseSystem/_getOrderByAssociateID", &request)
            .await
            .inspect_err(|error| warn!(associate_id, %error, "order lookup failed"))?;
        Ok(response.order)
    }

    pub async fn optimal_purchase(
        &self,
        composite_order: &str,
    ) -> Result<BTreeMap<String, f64>, ApiError> {
        let request = CompositeOrderRequest {
            composite_order: composite_order.to_owned(),
        };
        let response: OptimalPurchaseResponse = self
            .rpc
            .call("PurchaseSystem/_getOptimalPurchase", &request)
            .await
            .inspect_err(|error| warn!(composite_order, %error, "optimal purchase lookup failed"))?;
        Ok(response.optimal_purchase)
    }

    pub async fn order_cost(&self, composite_order: &str) -> Result<Option<f64>, ApiError> {
        let request = CompositeOrderRequest {
            composite_order: composite_order.to_owned(),
        };
        let response: OrderCostResponse = self
            .rpc
            .call("PurchaseSystem/_getOrderCost", &request)
            .await
            .inspect_err(|error| warn!(composite_order, %error, "order cost lookup failed"))?;
        Ok(response.total_cost)
    }
}
