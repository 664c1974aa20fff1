//! `/api/pets`: listings, favorites and the adoption workflow.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use serde_json::{json, Value};

use domains::{ApplicationId, Page, PetId};
use services::{PetDetails, UserDirectory, DEFAULT_PET_LIMIT};

use crate::dto::{
    ApplicationEntryView, ApplicationView, ApplyRequest, CreatePetRequest, FavoriteView,
    PageQuery, PetSearchQuery, PetView, ReviewRequest, UpdatePetRequest,
};
use crate::envelope::{ApiResponse, Pagination};
use crate::web::error::ApiResult;
use crate::web::extract::{ApiJson, ApiPath, ApiQuery, CurrentUser, MaybeUser, Payload};
use crate::web::uploads::{keep_if_ok, store_uploads};
use crate::web::AppState;

const IMAGES_FIELD: &str = "images";

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pets).post(create_pet))
        .route("/featured", get(featured_pets))
        .route("/search", get(search_pets))
        .route("/my-pets/list", get(my_pets))
        .route("/favorites/list", get(my_favorites))
        .route("/applications/received", get(applications_received))
        .route("/applications/mine", get(my_applications))
        .route("/{id}", get(get_pet).put(update_pet).delete(delete_pet))
        .route("/{id}/favorite", post(toggle_favorite))
        .route("/{id}/apply", post(apply))
        .route("/{id}/applications/{application_id}", put(review_application))
        .route(
            "/{id}/applications/{application_id}/withdraw",
            post(withdraw_application),
        )
}

fn pet_page(page: &Page<PetDetails>) -> Value {
    json!({
        "pets": PetView::page(page),
        "pagination": Pagination::from(page),
    })
}

async fn list_pets(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .pets
        .list_available(query.request(DEFAULT_PET_LIMIT))
        .await?;
    Ok(ApiResponse::ok(pet_page(&page)))
}

async fn featured_pets(State(state): State<AppState>) -> ApiResult<ApiResponse<Value>> {
    let pets = state.services.pets.featured().await?;
    Ok(ApiResponse::ok(json!({
        "pets": pets.iter().map(PetView::from).collect::<Vec<_>>(),
    })))
}

async fn search_pets(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<PetSearchQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .pets
        .search(query.filter()?, query.page(DEFAULT_PET_LIMIT))
        .await?;
    Ok(ApiResponse::ok(pet_page(&page)))
}

async fn get_pet(
    State(state): State<AppState>,
    viewer: MaybeUser,
    ApiPath(id): ApiPath<PetId>,
) -> ApiResult<ApiResponse<Value>> {
    let actor = viewer.actor();
    let details = state.services.pets.get(id, actor.as_ref()).await?;
    Ok(ApiResponse::ok(json!({ "pet": PetView::from(&details) })))
}

async fn create_pet(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Payload<CreatePetRequest>,
) -> ApiResult<impl IntoResponse> {
    let uploaded = store_uploads(&state, payload.files, IMAGES_FIELD).await?;
    let new_pet = payload.data.into_new_pet(uploaded.clone());
    let result = state.services.pets.create(&user.actor(), new_pet).await;
    let details = keep_if_ok(&state, &uploaded, result).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "pet created successfully",
            json!({ "pet": PetView::from(&details) }),
        ),
    ))
}

async fn update_pet(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PetId>,
    payload: Payload<UpdatePetRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let uploaded = store_uploads(&state, payload.files, IMAGES_FIELD).await?;
    let update = payload.data.into_update(uploaded.clone());
    let result = state.services.pets.update(&user.actor(), id, update).await;
    let details = keep_if_ok(&state, &uploaded, result).await?;
    Ok(ApiResponse::with_message(
        "pet updated successfully",
        json!({ "pet": PetView::from(&details) }),
    ))
}

/// Hard delete. The pet's image files are released afterwards.
async fn delete_pet(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PetId>,
) -> ApiResult<ApiResponse<()>> {
    let pet = state.services.pets.delete(&user.actor(), id).await?;
    for image in &pet.images {
        if let Err(err) = state.media.remove(image).await {
            tracing::warn!(pet_id = %id, path = %image, error = %err, "failed to remove pet image");
        }
    }
    Ok(ApiResponse::message("pet deleted successfully"))
}

async fn toggle_favorite(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PetId>,
) -> ApiResult<ApiResponse<FavoriteView>> {
    let toggle = state.services.pets.toggle_favorite(&user.actor(), id).await?;
    let message = if toggle.is_favorited {
        "pet added to favorites"
    } else {
        "pet removed from favorites"
    };
    Ok(ApiResponse::with_message(message, FavoriteView::from(toggle)))
}

async fn apply(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath(id): ApiPath<PetId>,
    ApiJson(body): ApiJson<ApplyRequest>,
) -> ApiResult<impl IntoResponse> {
    let application = state
        .services
        .pets
        .apply(&user.actor(), id, &body.message)
        .await?;
    let users: UserDirectory = std::iter::once(user.0.summary()).collect();
    Ok((
        StatusCode::CREATED,
        ApiResponse::with_message(
            "application submitted successfully",
            json!({ "application": ApplicationView::build(&application, &users) }),
        ),
    ))
}

async fn review_application(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, application_id)): ApiPath<(PetId, ApplicationId)>,
    ApiJson(body): ApiJson<ReviewRequest>,
) -> ApiResult<ApiResponse<Value>> {
    let outcome = state
        .services
        .pets
        .review_application(&user.actor(), id, application_id, body.status)
        .await?;
    Ok(ApiResponse::with_message(
        format!("application {}", outcome.application.status.as_str()),
        json!({
            "application": ApplicationView::build(&outcome.application, &UserDirectory::default()),
            "petStatus": outcome.pet.status,
        }),
    ))
}

async fn withdraw_application(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiPath((id, application_id)): ApiPath<(PetId, ApplicationId)>,
) -> ApiResult<ApiResponse<Value>> {
    let application = state
        .services
        .pets
        .withdraw_application(&user.actor(), id, application_id)
        .await?;
    let users: UserDirectory = std::iter::once(user.0.summary()).collect();
    Ok(ApiResponse::with_message(
        "application withdrawn",
        json!({ "application": ApplicationView::build(&application, &users) }),
    ))
}

async fn my_pets(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .pets
        .my_pets(&user.actor(), query.request(DEFAULT_PET_LIMIT))
        .await?;
    Ok(ApiResponse::ok(pet_page(&page)))
}

async fn my_favorites(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiQuery(query): ApiQuery<PageQuery>,
) -> ApiResult<ApiResponse<Value>> {
    let page = state
        .services
        .pets
        .favorites(&user.actor(), query.request(DEFAULT_PET_LIMIT))
        .await?;
    Ok(ApiResponse::ok(pet_page(&page)))
}

async fn applications_received(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Value>> {
    let entries = state.services.pets.applications_received(&user.actor()).await?;
    Ok(ApiResponse::ok(json!({
        "applications": entries.iter().map(ApplicationEntryView::from).collect::<Vec<_>>(),
    })))
}

async fn my_applications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<ApiResponse<Value>> {
    let entries = state.services.pets.my_applications(&user.actor()).await?;
    Ok(ApiResponse::ok(json!({
        "applications": entries.iter().map(ApplicationEntryView::from).collect::<Vec<_>>(),
    })))
}
