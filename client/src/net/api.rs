//! Typed endpoints for the hotel admin backend.
//!
//! Every call is described as an [`ApiRequest`] and handed to the shared
//! [`Pipeline`], so credential attachment and the refresh-and-retry path
//! apply uniformly. Response envelopes (`{ data }`, `{ results }`) are
//! stripped here; callers see records.
//!
//! ERROR HANDLING
//! ==============
//! Methods return the pipeline's [`ApiError`] unchanged. Decoding failures
//! surface as [`ApiError::Decode`].

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::Arc;

use records::{BookingStats, BookingStatus, DailySpecial, LoginResponse, MenuItem, RoomBooking, StatusResponse};
use serde_json::json;

use super::error::ApiError;
use super::pipeline::{ApiResponse, Pipeline};
use super::request::{ApiRequest, MultipartBody};

const DEFAULT_RECENT_LIMIT: u32 = 5;

// =============================================================================
// QUERY AND FORM TYPES
// =============================================================================

/// Filters accepted by `GET /room-bookings/`. Unset fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BookingQuery {
    pub limit: Option<u32>,
    /// Backend ordering key, e.g. `"-booking_date"`.
    pub ordering: Option<String>,
    pub search: Option<String>,
    /// Inclusive lower bound on check-in (`YYYY-MM-DD`).
    pub check_in_after: Option<String>,
    /// Inclusive upper bound on check-in (`YYYY-MM-DD`).
    pub check_in_before: Option<String>,
    pub status: Option<BookingStatus>,
}

impl BookingQuery {
    fn apply(&self, mut request: ApiRequest) -> ApiRequest {
        if let Some(limit) = self.limit {
            request = request.query("limit", limit);
        }
        let text = [
            ("ordering", self.ordering.as_deref()),
            ("search", self.search.as_deref()),
            ("check_in_after", self.check_in_after.as_deref()),
            ("check_in_before", self.check_in_before.as_deref()),
            ("status", self.status.map(BookingStatus::as_str)),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                request = request.query(key, value);
            }
        }
        request
    }
}

/// An image attached to a menu form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// Editable fields of a menu item or daily special.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MenuItemForm {
    pub name: String,
    pub description: String,
    /// Decimal price as entered, e.g. `"12.50"`.
    pub price: String,
    pub image: Option<ImageUpload>,
    pub is_vegetarian: Option<bool>,
    pub is_available: Option<bool>,
    pub category: Option<String>,
}

impl MenuItemForm {
    /// Multipart body with unset optional fields omitted.
    #[must_use]
    pub fn to_multipart(&self) -> MultipartBody {
        let mut body = MultipartBody::new()
            .text("name", self.name.as_str())
            .text("description", self.description.as_str())
            .text("price", self.price.as_str())
            .text_opt("is_vegetarian", self.is_vegetarian.map(|v| v.to_string()))
            .text_opt("is_available", self.is_available.map(|v| v.to_string()))
            .text_opt("category", self.category.clone());
        if let Some(image) = &self.image {
            body = body.file("image", &image.file_name, &image.mime, image.bytes.clone());
        }
        body
    }

    /// Special form: the item fields plus the target `date`, created inactive.
    fn to_special_multipart(&self, date: &str) -> MultipartBody {
        self.to_multipart().text("date", date).text("is_active", "false")
    }
}

// =============================================================================
// CLIENT
// =============================================================================

/// Typed facade over the shared pipeline. Cloning shares the pipeline.
#[derive(Clone, Debug)]
pub struct ApiClient {
    pipeline: Arc<Pipeline>,
}

impl ApiClient {
    #[must_use]
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self { pipeline }
    }

    #[must_use]
    pub fn pipeline(&self) -> &Arc<Pipeline> {
        &self.pipeline
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.pipeline.send(&request).await
    }

    // ----- auth -----

    /// `POST /auth/login/`. A rejected login does not enter the refresh path.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`]; the backend body is kept on it.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let request = ApiRequest::post("/auth/login/")
            .json(json!({ "email": email, "password": password }))
            .without_refresh();
        self.send(request).await?.json()
    }

    /// `GET /auth/status/`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn auth_status(&self) -> Result<StatusResponse, ApiError> {
        self.send(ApiRequest::get("/auth/status/")).await?.json()
    }

    /// `POST /auth/logout/` with an explicit credential, never refreshed.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`]; callers treat it as best-effort.
    pub async fn logout(&self, access: Option<String>, refresh: Option<String>) -> Result<(), ApiError> {
        let mut request = ApiRequest::post("/auth/logout/")
            .json(json!({ "refresh": refresh }))
            .without_refresh();
        if let Some(access) = access {
            request = request.bearer(access);
        }
        self.send(request).await.map(|_| ())
    }

    // ----- bookings -----

    /// `GET /room-bookings/` with optional filters.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn list_bookings(&self, query: &BookingQuery) -> Result<Vec<RoomBooking>, ApiError> {
        self.send(query.apply(ApiRequest::get("/room-bookings/"))).await?.list()
    }

    /// `GET /room-bookings/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown ids.
    pub async fn get_booking(&self, id: i64) -> Result<RoomBooking, ApiError> {
        self.send(ApiRequest::get(format!("/room-bookings/{id}/"))).await?.data()
    }

    /// `GET /room-bookings/{reference}/`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] for unknown references.
    pub async fn get_booking_by_reference(&self, reference: &str) -> Result<RoomBooking, ApiError> {
        self.send(ApiRequest::get(format!("/room-bookings/{}/", reference.trim())))
            .await?
            .data()
    }

    /// `PATCH /room-bookings/{id}/` with `{ status }`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn update_booking_status(&self, id: i64, status: BookingStatus) -> Result<RoomBooking, ApiError> {
        let request = ApiRequest::patch(format!("/room-bookings/{id}/")).json(json!({ "status": status.as_str() }));
        self.send(request).await?.data()
    }

    /// `DELETE /room-bookings/{id}/`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn delete_booking(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("/room-bookings/{id}/"))).await.map(|_| ())
    }

    /// `GET /room-bookings/stats/`.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn booking_stats(&self) -> Result<BookingStats, ApiError> {
        self.send(ApiRequest::get("/room-bookings/stats/")).await?.data()
    }

    /// Newest bookings first; `None` means the default of five.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn recent_bookings(&self, limit: Option<u32>) -> Result<Vec<RoomBooking>, ApiError> {
        let query = BookingQuery {
            limit: Some(limit.unwrap_or(DEFAULT_RECENT_LIMIT)),
            ordering: Some("-booking_date".to_owned()),
            ..BookingQuery::default()
        };
        self.list_bookings(&query).await
    }

    /// Backend full-text search.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn search_bookings(&self, search: &str) -> Result<Vec<RoomBooking>, ApiError> {
        let query = BookingQuery { search: Some(search.to_owned()), ..BookingQuery::default() };
        self.list_bookings(&query).await
    }

    /// Bookings whose check-in falls between `start` and `end` (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn bookings_by_date_range(&self, start: &str, end: &str) -> Result<Vec<RoomBooking>, ApiError> {
        let query = BookingQuery {
            check_in_after: Some(start.to_owned()),
            check_in_before: Some(end.to_owned()),
            ..BookingQuery::default()
        };
        self.list_bookings(&query).await
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn bookings_by_status(&self, status: BookingStatus) -> Result<Vec<RoomBooking>, ApiError> {
        let query = BookingQuery { status: Some(status), ..BookingQuery::default() };
        self.list_bookings(&query).await
    }

    // ----- menu items -----

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn list_menu_items(&self) -> Result<Vec<MenuItem>, ApiError> {
        self.send(ApiRequest::get("/menu/items/")).await?.list()
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn get_menu_item(&self, id: i64) -> Result<MenuItem, ApiError> {
        self.send(ApiRequest::get(format!("/menu/items/{id}/"))).await?.data()
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects the form.
    pub async fn create_menu_item(&self, form: &MenuItemForm) -> Result<MenuItem, ApiError> {
        let request = ApiRequest::post("/menu/items/").multipart(form.to_multipart());
        self.send(request).await?.data()
    }

    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects the form.
    pub async fn update_menu_item(&self, id: i64, form: &MenuItemForm) -> Result<MenuItem, ApiError> {
        let request = ApiRequest::patch(format!("/menu/items/{id}/")).multipart(form.to_multipart());
        self.send(request).await?.data()
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn delete_menu_item(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("/menu/items/{id}/"))).await.map(|_| ())
    }

    // ----- daily specials -----

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn list_daily_specials(&self) -> Result<Vec<DailySpecial>, ApiError> {
        self.send(ApiRequest::get("/menu/daily-specials/")).await?.list()
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn get_daily_special(&self, id: i64) -> Result<DailySpecial, ApiError> {
        self.send(ApiRequest::get(format!("/menu/daily-specials/{id}/"))).await?.data()
    }

    /// Create a special for `date`; new specials start inactive.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects the form.
    pub async fn create_daily_special(&self, form: &MenuItemForm, date: &str) -> Result<DailySpecial, ApiError> {
        let request = ApiRequest::post("/menu/daily-specials/").multipart(form.to_special_multipart(date));
        self.send(request).await?.data()
    }

    /// Resubmit a special's form. The form carries `is_active=false`, so an
    /// edited special must be activated again.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] when the backend rejects the form.
    pub async fn update_daily_special(
        &self,
        id: i64,
        form: &MenuItemForm,
        date: &str,
    ) -> Result<DailySpecial, ApiError> {
        let request =
            ApiRequest::patch(format!("/menu/daily-specials/{id}/")).multipart(form.to_special_multipart(date));
        self.send(request).await?.data()
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn delete_daily_special(&self, id: i64) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(format!("/menu/daily-specials/{id}/")))
            .await
            .map(|_| ())
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn activate_daily_special(&self, id: i64) -> Result<DailySpecial, ApiError> {
        self.special_action(id, "activate").await
    }

    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn deactivate_daily_special(&self, id: i64) -> Result<DailySpecial, ApiError> {
        self.special_action(id, "deactivate").await
    }

    /// Flip visibility: active specials are deactivated and vice versa.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`].
    pub async fn toggle_daily_special(&self, special: &DailySpecial) -> Result<DailySpecial, ApiError> {
        self.special_action(special.id, special.toggle_action()).await
    }

    async fn special_action(&self, id: i64, action: &str) -> Result<DailySpecial, ApiError> {
        self.send(ApiRequest::post(format!("/menu/daily-specials/{id}/{action}/")))
            .await?
            .data()
    }
}
