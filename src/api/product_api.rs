// ==========================================
// MES 后端 - 产品管理 API
// ==========================================

use std::sync::Arc;

use serde::Deserialize;

use crate::api::error::ApiResult;
use crate::api::input::{non_empty_string, require_text};
use crate::domain::product::{Product, PRODUCT_STATUS_ACTIVE};
use crate::repository::error::RepositoryError;
use crate::repository::product_repo::{ProductDraft, ProductRepository};

pub struct ProductApi {
    product_repo: Arc<ProductRepository>,
}

impl ProductApi {
    pub fn new(product_repo: Arc<ProductRepository>) -> Self {
        Self { product_repo }
    }

    pub fn list_products(&self) -> ApiResult<Vec<Product>> {
        Ok(self.product_repo.list_all()?)
    }

    pub fn get_product(&self, product_id: i64) -> ApiResult<Product> {
        self.product_repo
            .find_by_id(product_id)?
            .ok_or_else(|| RepositoryError::not_found("Product", product_id).into())
    }

    pub fn create_product(&self, input: ProductInput) -> ApiResult<i64> {
        let draft = input.into_draft()?;
        let id = self.product_repo.insert(&draft)?;
        tracing::info!(product_id = id, name = %draft.name, "产品已创建");
        Ok(id)
    }

    pub fn update_product(&self, product_id: i64, input: ProductInput) -> ApiResult<()> {
        let draft = input.into_draft()?;
        if self.product_repo.update(product_id, &draft)? == 0 {
            return Err(RepositoryError::not_found("Product", product_id).into());
        }
        Ok(())
    }

    pub fn delete_product(&self, product_id: i64) -> ApiResult<()> {
        if self.product_repo.delete(product_id)? == 0 {
            return Err(RepositoryError::not_found("Product", product_id).into());
        }
        tracing::info!(product_id, "产品已删除");
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductInput {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "non_empty_string")]
    pub status: Option<String>,
}

impl ProductInput {
    fn into_draft(self) -> ApiResult<ProductDraft> {
        Ok(ProductDraft {
            name: require_text("name", &self.name)?,
            description: self.description,
            status: self
                .status
                .unwrap_or_else(|| PRODUCT_STATUS_ACTIVE.to_string()),
        })
    }
}
