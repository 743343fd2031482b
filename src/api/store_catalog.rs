//! `StoreCatalog` aggregate service.

use std::sync::Arc;

use larder_api_types::EmptyRequest;
use larder_api_types::store_catalog::{
    AllItemsResponse, ItemCreateRequest, ItemCreatedResponse, ItemLookupResponse, ItemNameRequest,
    ItemNamesResponse, ItemPurchaseOptionsResponse, ItemRequest, NameRequest,
    PurchaseOptionAddRequest, PurchaseOptionCreatedResponse, PurchaseOptionDetailsResponse,
    PurchaseOptionRemoveRequest, PurchaseOptionRequest, PurchaseOptionUpdateRequest,
};
use tracing::warn;

use crate::rpc::{ApiError, RpcClient};

pub struct StoreCatalogApi {
    rpc: Arc<RpcClient>,
}

impl StoreCatalogApi {
    pub fn new(rpc: Arc<RpcClient>) -> Self {
        Self { rpc }
    }

    /// Returns the new item's id.
    pub async fn create_item(&self, primary_name: &str) -> Result<String, ApiError> {
        let request = ItemCreateRequest {
            primary_name: primary_name.to_owned(),
        };
        let response: ItemCreatedResponse = self
            .rpc
            .call("StoreCatalog/createItem", &request)
            .await
            .inspect_err(|error| warn!(primary_name, %error, "create item failed"))?;
        Ok(response.item)
    }

    pub async fn delete_item(&self, item: &str) -> Result<(), ApiError> {
        let request = ItemRequest {
            item: item.to_owned(),
        };
        self.rpc
            .call_ack("StoreCatalog/deleteItem", &request)
            .await
            .inspect_err(|error| warn!(item, %error, "delete item failed"))
    }

    /// Returns the new purchase option's id.
    pub async fn add_purchase_option(
        &self,
        item: &str,
        quantity: f64,
        units: &str,
        price: f64,
        store: &str,
    ) -> Result<String, ApiError> {
        let request = PurchaseOptionAddRequest {
            item: item.to_owned(),
            quantity,
            units: units.to_owned(),
            price,
            store: store.to_owned(),
        };
        let response: PurchaseOptionCreatedResponse = self
            .rpc
            .call("StoreCatalog/addPurchaseOption", &request)
            .await
            .inspect_err(|error| warn!(item, %error, "add purchase option failed"))?;
        Ok(response.purchase_option)
    }

    pub async fn update_purchase_option_quantity(
        &self,
        purchase_option: &str,
        quantity: f64,
    ) -> Result<(), ApiError> {
        self.update_purchase_option(PurchaseOptionUpdateRequest {
            purchase_option: purchase_option.to_owned(),
            quantity: Some(quantity),
            ..Default::default()
        })
        .await
    }

    pub async fn update_purchase_option_units(
        &self,
        purchase_option: &str,
        units: &str,
    ) -> Result<(), ApiError> {
        self.update_purchase_option(PurchaseOptionUpdateRequest {
            purchase_option: purchase_option.to_owned(),
            units: Some(units.to_owned()),
            ..Default::default()
        })
        .await
    }

    pub async fn update_purchase_option_price(
        &self,
        purchase_option: &str,
        price: f64,
    ) -> Result<(), ApiError> {
        self.update_purchase_option(PurchaseOptionUpdateRequest {
            purchase_option: purchase_option.to_owned(),
            price: Some(price),
            ..Default::default()
        })
        .await
    }

    pub async fn update_purchase_option_store(
        &self,
        purchase_option: &str,
        store: &str,
    ) -> Result<(), ApiError> {
        self.update_purchase_option(PurchaseOptionUpdateRequest {
            purchase_option: purchase_option.to_owned(),
            store: Some(store.to_owned()),
            ..Default::default()
        })
        .await
    }

    async fn update_purchase_option(
        &self,
        request: PurchaseOptionUpdateRequest,
    ) -> Result<(), ApiError> {
        self.rpc
            .call_ack("StoreCatalog/updatePurchaseOption", &request)
            .await
            .inspect_err(|error| {
                warn!(purchase_option = %request.purchase_option, %error, "update purchase option failed");
            })
    }

    pub async fn remove_purchase_option(
        &self,
        item: &str,
        purchase_option: &str,
    ) -> Result<(), ApiError> {
        let request = PurchaseOptionRemoveRequest {
            item: item.to_owned(),
            purchase_option: purchase_option.to_owned(),
        };
        self.rpc
            .call_ack("StoreCatalog/removePurchaseOption", &request)
            .await
            .inspect_err(|error| warn!(item, purchase_option, %error, "remove purchase option failed"))
    }

    pub async fn confirm_purchase_option(&self, purchase_option: &str) -> Result<(), ApiError> {
        let request = PurchaseOptionRequest {
            purchase_option: purchase_option.to_owned(),
        };
        self.rpc
            .call_ack("StoreCatalog/confirmPurchaseOption", &request)
            .await
            .inspect_err(|error| warn!(purchase_option, %error, "confirm purchase option failed"))
    }

    /// Replaces an item's primary display name.
    pub async fn update_item_name(&self, item: &str, name: &str) -> Result<(), ApiError> {
        let request = ItemNameRequest {
            item: item.to_owned(),
            name: name.to_owned(),
        };
        self.rpc
            .call_ack("StoreCatalog/updateItemName", &request)
            .await
            .inspect_err(|error| warn!(item, name, %error, "update item name failed"))
    }

    pub async fn add_item_name(&self, item: &str, name: &str) -> Result<(), ApiError> {
        let request = ItemNameRequest {
            item: item.to_owned(),
            name: name.to_owned(),
        };
        self.rpc
            .call_ack("StoreCatalog/addItemName", &request)
            .await
            .inspect_err(|error| warn!(item, name, %error, "add item name failed"))
    }

    pub async fn remove_item_name(&self, item: &str, name: &str) -> Result<(), ApiError> {
        let request = ItemNameRequest {
            item: item.to_owned(),
            name: name.to_owned(),
        };
        self.rpc
            .call_ack("StoreCatalog/removeItemName", &request)
            .await
            .inspect_err(|error| warn!(item, name, %error, "remove item name failed"))
    }

    pub async fn all_items(&self) -> Result<Vec<String>, ApiError> {
        let response: AllItemsResponse = self
            .rpc
            .call("StoreCatalog/_getAllItems", &EmptyRequest::default())
            .await
            .inspect_err(|error| warn!(%error, "catalog item list lookup failed"))?;
        Ok(response.items)
    }

    pub async fn item_by_name(&self, name: &str) -> Result<Option<String>, ApiError> {
        let request = NameRequest {
            name: name.to_owned(),
        };
        let response: ItemLookupResponse = self
            .rpc
            .call("StoreCatalog/_getItemByName", &request)
            .await
            .inspect_err(|error| warn!(name, %error, "item by name lookup failed"))?;
        Ok(response.item)
    }

    pub async fn item_by_purchase_option(
        &self,
        purchase_option: &str,
    ) -> Result<Option<String>, ApiError> {
        let request = PurchaseOptionRequest {
            purchase_option: purchase_option.to_owned(),
        };
        let response: ItemLookupResponse = self
            .rpc
            .call("StoreCatalog/_getItemByPurchaseOption", &request)
            .await
            .inspect_err(|error| warn!(purchase_option, %error, "item by option lookup failed"))?;
        Ok(response.item)
    }

    /// Primary display name plus alternative names for an item.
    pub async fn item_names(&self, item: &str) -> Result<ItemNamesResponse, ApiError> {
        let request = ItemRequest {
            item: item.to_owned(),
        };
        self.rpc
            .call("StoreCatalog/_getItemNames", &request)
            .await
            .inspect_err(|error| warn!(item, %error, "item names lookup failed"))
    }

    pub async fn item_purchase_options(&self, item: &str) -> Result<Vec<String>, ApiError> {
        let request = ItemRequest {
            item: item.to_owned(),
        };
        let response: ItemPurchaseOptionsResponse = self
            .rpc
            .call("StoreCatalog/_getItemPurchaseOptions", &request)
            .await
            .inspect_err(|error| warn!(item, %error, "item purchase options lookup failed"))?;
        Ok(response.purchase_options)
    }

    pub async fn purchase_option_details(
        &self,
        purchase_option: &str,
    ) -> Result<PurchaseOptionDetailsResponse, ApiError> {
        let request = PurchaseOptionRequest {
            purchase_option: purchase_option.to_owned(),
        };
        self.rpc
            .call("StoreCatalog/_getPurchaseOptionDetails", &request)
            .await
            .inspect_err(|error| warn!(purchase_option, %error, "purchase option details lookup failed"))
    }
}
