use std::sync::Arc;

use axum::{
    Router,
    extract::{
        FromRef, FromRequest, FromRequestParts, Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};

use crate::{
    Result, WorkToHomeError,
    auth::{AuthUser, Authenticator},
    config::SearchConfig,
    models::{
        CommuteRecord, Coordinate, Favorite, FavoriteId, FavoriteUpdate, Housing, HousingFilter,
        HousingId, ProfileUpdate, RouteType, User, UserId,
    },
    repository::Repositories,
    services::{
        CommuteService, FavoriteService, FavoriteWithHousing, HousingService, NearbyHousing, Page,
        PageRequest, UserService,
    },
};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub commutes: CommuteService,
    pub housing: HousingService,
    pub favorites: FavoriteService,
    pub users: UserService,
    pub authenticator: Arc<dyn Authenticator>,
}

impl AppState {
    #[must_use]
    pub fn new(
        repos: Repositories,
        search: SearchConfig,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            commutes: CommuteService::new(repos.clone()),
            housing: HousingService::new(repos.clone(), search),
            favorites: FavoriteService::new(repos.clone()),
            users: UserService::new(repos),
            authenticator,
        }
    }
}

impl FromRef<AppState> for Arc<dyn Authenticator> {
    fn from_ref(state: &AppState) -> Self {
        state.authenticator.clone()
    }
}

impl IntoResponse for WorkToHomeError {
    fn into_response(self) -> Response {
        let status = match &self {
            WorkToHomeError::MissingLocation { .. } | WorkToHomeError::Validation { .. } => {
                StatusCode::BAD_REQUEST
            }
            WorkToHomeError::NotFound { .. } => StatusCode::NOT_FOUND,
            WorkToHomeError::Conflict { .. } => StatusCode::CONFLICT,
            WorkToHomeError::Unauthorized => StatusCode::UNAUTHORIZED,
            WorkToHomeError::Config { .. }
            | WorkToHomeError::Storage { .. }
            | WorkToHomeError::Io { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!("Request failed: {self}");
        }

        (status, Json(json!({ "error": self.user_message() }))).into_response()
    }
}

impl From<JsonRejection> for WorkToHomeError {
    fn from(rejection: JsonRejection) -> Self {
        WorkToHomeError::validation(rejection.body_text())
    }
}

impl From<PathRejection> for WorkToHomeError {
    fn from(rejection: PathRejection) -> Self {
        WorkToHomeError::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for WorkToHomeError {
    fn from(rejection: QueryRejection) -> Self {
        WorkToHomeError::validation(rejection.body_text())
    }
}

/// JSON request body; malformed bodies are rejected as `{"error": ...}`
#[derive(FromRequest)]
#[from_request(via(Json), rejection(WorkToHomeError))]
pub struct ApiJson<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(WorkToHomeError))]
pub struct ApiPath<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(WorkToHomeError))]
pub struct ApiQuery<T>(pub T);

#[derive(Serialize, Deserialize)]
pub struct ApiCommute {
    pub id: uuid::Uuid,
    pub user_id: UserId,
    pub housing_id: HousingId,
    pub distance_miles: f64,
    pub duration_minutes: u32,
    pub route_type: RouteType,
    pub fuel_cost: Option<f64>,
    pub parking_cost: Option<f64>,
    pub total_commute_cost: Option<f64>,
    pub calculated_at: DateTime<Utc>,
}

impl From<&CommuteRecord> for ApiCommute {
    fn from(record: &CommuteRecord) -> Self {
        Self {
            id: record.id,
            user_id: record.user_id,
            housing_id: record.housing_id,
            distance_miles: record.estimate.distance_miles,
            duration_minutes: record.estimate.duration_minutes,
            route_type: record.estimate.route_type,
            fuel_cost: record.estimate.fuel_cost,
            parking_cost: record.estimate.parking_cost,
            total_commute_cost: record.estimate.total_cost,
            calculated_at: record.calculated_at,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiHousing {
    pub id: HousingId,
    pub title: String,
    pub description: Option<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: f64,
    pub longitude: f64,
    pub price: u32,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub square_feet: Option<u32>,
    pub property_type: Option<String>,
    pub available_date: Option<NaiveDate>,
    pub images: Vec<String>,
    pub amenities: Vec<String>,
    pub pet_friendly: bool,
    pub parking_available: bool,
    pub furnished: bool,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_miles: Option<f64>,
}

impl From<&Housing> for ApiHousing {
    fn from(housing: &Housing) -> Self {
        Self {
            id: housing.id,
            title: housing.title.clone(),
            description: housing.description.clone(),
            address: housing.address.clone(),
            city: housing.city.clone(),
            state: housing.state.clone(),
            zip_code: housing.zip_code.clone(),
            latitude: housing.location.latitude,
            longitude: housing.location.longitude,
            price: housing.price,
            bedrooms: housing.bedrooms,
            bathrooms: housing.bathrooms,
            square_feet: housing.square_feet,
            property_type: housing.property_type.clone(),
            available_date: housing.available_date,
            images: housing.images.clone(),
            amenities: housing.amenities.clone(),
            pet_friendly: housing.pet_friendly,
            parking_available: housing.parking_available,
            furnished: housing.furnished,
            source: housing.source.clone(),
            created_at: housing.created_at,
            updated_at: housing.updated_at,
            distance_miles: None,
        }
    }
}

impl From<&NearbyHousing> for ApiHousing {
    fn from(nearby: &NearbyHousing) -> Self {
        Self {
            distance_miles: Some(nearby.distance_miles),
            ..ApiHousing::from(&nearby.housing)
        }
    }
}

/// A listing as shown in the favorites list
#[derive(Serialize)]
pub struct ApiFavoriteListing {
    #[serde(flatten)]
    pub housing: ApiHousing,
    pub favorite_id: FavoriteId,
    pub notes: Option<String>,
    pub priority: u8,
    pub visit_date: Option<NaiveDate>,
}

impl From<&FavoriteWithHousing> for ApiFavoriteListing {
    fn from(entry: &FavoriteWithHousing) -> Self {
        Self {
            housing: ApiHousing::from(&entry.housing),
            favorite_id: entry.favorite.id,
            notes: entry.favorite.notes.clone(),
            priority: entry.favorite.priority,
            visit_date: entry.favorite.visit_date,
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct ApiUser {
    pub id: UserId,
    pub email: String,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub work_address: Option<String>,
    pub work_lat: Option<f64>,
    pub work_lng: Option<f64>,
    pub max_commute_time: Option<u32>,
    pub budget_min: Option<u32>,
    pub budget_max: Option<u32>,
    pub preferred_areas: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&User> for ApiUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            work_address: user.work_address.clone(),
            work_lat: user.work_location.map(|l| l.latitude),
            work_lng: user.work_location.map(|l| l.longitude),
            max_commute_time: user.max_commute_time,
            budget_min: user.budget_min,
            budget_max: user.budget_max,
            preferred_areas: user.preferred_areas.clone(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ApiPagination {
    pub page: u32,
    pub per_page: u32,
    pub total: usize,
    pub pages: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl<T> From<&Page<T>> for ApiPagination {
    fn from(page: &Page<T>) -> Self {
        Self {
            page: page.page,
            per_page: page.per_page,
            total: page.total,
            pages: page.pages,
            has_next: page.has_next,
            has_prev: page.has_prev,
        }
    }
}

/// Absent field is `None`, explicit `null` is `Some(None)`
fn double_option<'de, T, D>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `PUT /users/me`, using the same flat `work_lat`/`work_lng` as
/// [`ApiUser`]. Send `null` to clear a field.
#[derive(Deserialize, Default)]
pub struct ApiProfileUpdate {
    #[serde(default, deserialize_with = "double_option")]
    pub first_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub last_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_address: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_lat: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub work_lng: Option<Option<f64>>,
    #[serde(default, deserialize_with = "double_option")]
    pub max_commute_time: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget_min: Option<Option<u32>>,
    #[serde(default, deserialize_with = "double_option")]
    pub budget_max: Option<Option<u32>>,
    pub preferred_areas: Option<Vec<String>>,
}

impl TryFrom<ApiProfileUpdate> for ProfileUpdate {
    type Error = WorkToHomeError;

    fn try_from(update: ApiProfileUpdate) -> Result<Self> {
        let work_location = match (update.work_lat, update.work_lng) {
            (None, None) => None,
            (Some(Some(lat)), Some(Some(lng))) => Some(Some(Coordinate::new(lat, lng))),
            (Some(None), Some(None)) => Some(None),
            _ => {
                return Err(WorkToHomeError::validation(
                    "work_lat and work_lng must be set or cleared together",
                ));
            }
        };

        Ok(ProfileUpdate {
            first_name: update.first_name,
            last_name: update.last_name,
            work_address: update.work_address,
            work_location,
            max_commute_time: update.max_commute_time,
            budget_min: update.budget_min,
            budget_max: update.budget_max,
            preferred_areas: update.preferred_areas,
        })
    }
}

#[derive(Deserialize)]
pub struct CalculateRequest {
    pub housing_id: Option<HousingId>,
    pub route_type: Option<String>,
}

#[derive(Deserialize)]
pub struct AddFavoriteRequest {
    pub housing_id: Option<HousingId>,
    pub notes: Option<String>,
    pub priority: Option<u8>,
}

/// Query string of `/housing/search`
#[derive(Deserialize, Default)]
pub struct SearchParams {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub min_price: Option<u32>,
    pub max_price: Option<u32>,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<f32>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pet_friendly: Option<bool>,
    pub parking_available: Option<bool>,
}

impl SearchParams {
    fn split(self) -> (HousingFilter, PageRequest) {
        (
            HousingFilter {
                min_price: self.min_price,
                max_price: self.max_price,
                bedrooms: self.bedrooms,
                bathrooms: self.bathrooms,
                property_type: self.property_type,
                city: self.city,
                state: self.state,
                pet_friendly: self.pet_friendly,
                parking_available: self.parking_available,
            },
            PageRequest {
                page: self.page,
                per_page: self.per_page,
            },
        )
    }
}

/// Query string of `/housing/nearby`
#[derive(Deserialize, Default)]
pub struct NearbyParams {
    pub radius: Option<f64>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/commute/calculate", post(calculate_commute))
        .route("/commute/history", get(commute_history))
        .route("/housing/search", get(search_housing))
        .route("/housing/nearby", get(nearby_housing))
        .route("/housing/favorites", get(list_favorites).post(add_favorite))
        .route(
            "/housing/favorites/{favorite_id}",
            put(update_favorite).delete(remove_favorite),
        )
        .route("/housing/{housing_id}", get(get_housing))
        .route("/users/me", get(get_profile).put(update_profile))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "version": crate::VERSION }))
}

async fn calculate_commute(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<CalculateRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let housing_id = request
        .housing_id
        .ok_or_else(|| WorkToHomeError::validation("Housing ID is required"))?;
    let route_type = match request.route_type.as_deref() {
        Some(raw) => raw.parse::<RouteType>()?,
        None => RouteType::default(),
    };

    let record = state
        .commutes
        .calculate(user_id, housing_id, route_type)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Commute calculated successfully",
            "commute": ApiCommute::from(&record),
        })),
    ))
}

async fn commute_history(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>> {
    let history = state.commutes.history(user_id).await?;
    let commutes: Vec<ApiCommute> = history.iter().map(ApiCommute::from).collect();
    Ok(Json(json!({ "commutes": commutes })))
}

async fn search_housing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Value>> {
    let (filter, page) = params.split();
    let result = state.housing.search(user_id, &filter, page).await?;
    let housing: Vec<ApiHousing> = result.items.iter().map(ApiHousing::from).collect();

    Ok(Json(json!({
        "housing": housing,
        "pagination": ApiPagination::from(&result),
    })))
}

async fn nearby_housing(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiQuery(params): ApiQuery<NearbyParams>,
) -> Result<Json<Value>> {
    let page = PageRequest {
        page: params.page,
        per_page: params.per_page,
    };
    let result = state.housing.nearby(user_id, params.radius, page).await?;
    let housing: Vec<ApiHousing> = result.items.iter().map(ApiHousing::from).collect();

    Ok(Json(json!({
        "housing": housing,
        "pagination": ApiPagination::from(&result),
    })))
}

async fn get_housing(
    State(state): State<AppState>,
    AuthUser(_user_id): AuthUser,
    ApiPath(housing_id): ApiPath<HousingId>,
) -> Result<Json<ApiHousing>> {
    let housing = state.housing.get(housing_id).await?;
    Ok(Json(ApiHousing::from(&housing)))
}

async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Value>> {
    let favorites = state.favorites.list(user_id).await?;
    let favorites: Vec<ApiFavoriteListing> =
        favorites.iter().map(ApiFavoriteListing::from).collect();
    Ok(Json(json!({ "favorites": favorites })))
}

async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(request): ApiJson<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<Value>)> {
    let housing_id = request
        .housing_id
        .ok_or_else(|| WorkToHomeError::validation("Housing ID is required"))?;

    let favorite: Favorite = state
        .favorites
        .add(user_id, housing_id, request.notes, request.priority)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Added to favorites", "favorite": favorite })),
    ))
}

async fn update_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(favorite_id): ApiPath<FavoriteId>,
    ApiJson(update): ApiJson<FavoriteUpdate>,
) -> Result<Json<Value>> {
    let favorite = state
        .favorites
        .update(user_id, favorite_id, update)
        .await?;
    Ok(Json(
        json!({ "message": "Favorite updated", "favorite": favorite }),
    ))
}

async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiPath(favorite_id): ApiPath<FavoriteId>,
) -> Result<Json<Value>> {
    state.favorites.remove(user_id, favorite_id).await?;
    Ok(Json(json!({ "message": "Removed from favorites" })))
}

async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ApiUser>> {
    let user = state.users.profile(user_id).await?;
    Ok(Json(ApiUser::from(&user)))
}

async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    ApiJson(update): ApiJson<ApiProfileUpdate>,
) -> Result<Json<ApiUser>> {
    let user = state
        .users
        .update_profile(user_id, ProfileUpdate::try_from(update)?)
        .await?;
    Ok(Json(ApiUser::from(&user)))
}
