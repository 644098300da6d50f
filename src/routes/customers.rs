// ABOUTME: Staff customer and pet management routes
// ABOUTME: Deleting a customer is admin-only; pets are deactivated rather than deleted
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Salon Server contributors

use crate::auth::AuthResult;
use crate::database::{CustomerInput, CustomerSearch, PetInput};
use crate::errors::{AppError, AppResult};
use crate::middleware::{require_admin, staff_only};
use crate::models::{Customer, Pet};
use crate::resources::ServerResources;
use crate::validation::{parse_uuid, Validate};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{middleware, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// A customer with their pets
#[derive(Debug, Serialize)]
pub struct CustomerDetail {
    /// Customer record
    pub customer: Customer,
    /// All pets, inactive included
    pub pets: Vec<Pet>,
}

/// Customer routes implementation
pub struct CustomerRoutes;

impl CustomerRoutes {
    /// Create the customer and pet routes behind the staff guard
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/admin/customers",
                get(Self::handle_search).post(Self::handle_create),
            )
            .route(
                "/api/admin/customers/:id",
                get(Self::handle_get)
                    .put(Self::handle_update)
                    .delete(Self::handle_delete),
            )
            .route(
                "/api/admin/customers/:id/pets",
                get(Self::handle_list_pets).post(Self::handle_create_pet),
            )
            .route(
                "/api/admin/pets/:id",
                put(Self::handle_update_pet).delete(Self::handle_deactivate_pet),
            )
            .layer(middleware::from_fn_with_state(resources.clone(), staff_only))
            .with_state(resources)
    }

    async fn load(resources: &ServerResources, id: &str) -> AppResult<Customer> {
        let id = parse_uuid("id", id)?;
        resources
            .database
            .get_customer(id)
            .await?
            .ok_or_else(|| AppError::not_found("Customer"))
    }

    async fn handle_search(
        State(resources): State<Arc<ServerResources>>,
        Query(search): Query<CustomerSearch>,
    ) -> AppResult<Json<Vec<Customer>>> {
        Ok(Json(resources.database.search_customers(&search).await?))
    }

    async fn handle_create(
        State(resources): State<Arc<ServerResources>>,
        Json(input): Json<CustomerInput>,
    ) -> Result<Response, AppError> {
        input.validate()?;
        let customer = resources.database.create_customer(&input).await?;
        info!(customer.id = %customer.id, "Customer created");
        Ok((StatusCode::CREATED, Json(customer)).into_response())
    }

    async fn handle_get(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<CustomerDetail>> {
        let customer = Self::load(&resources, &id).await?;
        let pets = resources.database.list_pets_for_customer(customer.id).await?;
        Ok(Json(CustomerDetail { customer, pets }))
    }

    async fn handle_update(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(input): Json<CustomerInput>,
    ) -> AppResult<Json<Customer>> {
        let id = parse_uuid("id", &id)?;
        input.validate()?;
        Ok(Json(resources.database.update_customer(id, &input).await?))
    }

    async fn handle_delete(
        State(resources): State<Arc<ServerResources>>,
        Extension(auth): Extension<AuthResult>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        require_admin(&auth)?;
        let id = parse_uuid("id", &id)?;
        resources.database.delete_customer(id).await?;
        info!(customer.id = %id, actor = %auth.email, "Customer deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    async fn handle_list_pets(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> AppResult<Json<Vec<Pet>>> {
        let customer = Self::load(&resources, &id).await?;
        Ok(Json(
            resources.database.list_pets_for_customer(customer.id).await?,
        ))
    }

    async fn handle_create_pet(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(input): Json<PetInput>,
    ) -> Result<Response, AppError> {
        input.validate()?;
        let customer = Self::load(&resources, &id).await?;
        let pet = resources.database.create_pet(customer.id, &input).await?;
        Ok((StatusCode::CREATED, Json(pet)).into_response())
    }

    async fn handle_update_pet(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
        Json(input): Json<PetInput>,
    ) -> AppResult<Json<Pet>> {
        let id = parse_uuid("id", &id)?;
        input.validate()?;
        Ok(Json(resources.database.update_pet(id, &input).await?))
    }

    async fn handle_deactivate_pet(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = parse_uuid("id", &id)?;
        resources.database.deactivate_pet(id).await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
