//! Request DTOs for the API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use std::borrow::Cow;

use serde::Deserialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::cache::Namespace;
use crate::models::vehicle::{
    normalize_ids, ImagePatch, NewImage, NewVehicle, PageRequest, VehicleFilter, VehiclePatch,
};

const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_IMAGE_POSITION: i32 = 1;

// == Field Checks ==
/// Rejects empty and whitespace-only text.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message(Cow::Borrowed("is required")));
    }
    Ok(())
}

/// Accepts absolute `http`/`https` URLs with a parseable host.
fn http_url(value: &str) -> Result<(), ValidationError> {
    let http = value.starts_with("http://") || value.starts_with("https://");
    if http && value.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url").with_message(Cow::Borrowed("must be a valid http(s) URL")))
    }
}

// == Create Vehicle ==
/// Request body for POST /api/vehicles
///
/// Required text fields default to empty so a missing one is reported with
/// the other field errors rather than as a parse failure.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "exceeds maximum length of 100 characters")
    )]
    pub model: String,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub price: f64,
    #[serde(default)]
    pub description: Option<String>,
    pub mileage: u32,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub fuel_type: String,
    #[serde(default)]
    #[validate(custom(function = "not_blank"))]
    pub transmission: String,
    #[serde(default)]
    #[validate(custom(function = "http_url"))]
    pub image_url: Option<String>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    #[validate(range(min = 1900, max = 2100, message = "must be between 1900 and 2100"))]
    pub year: Option<u16>,
    #[serde(default)]
    pub brand_id: Option<u32>,
    #[serde(default)]
    pub color_id: Option<u32>,
    #[serde(default)]
    pub category_id: Option<u32>,
    /// Ids of the optional-equipment rows to attach
    #[serde(default)]
    pub optionals: Vec<u32>,
}

impl CreateVehicleRequest {
    pub fn into_new_vehicle(self) -> NewVehicle {
        NewVehicle {
            model: self.model,
            price: self.price,
            description: self.description,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            image_url: self.image_url,
            available: self.available.unwrap_or(true),
            year: self.year,
            brand_id: self.brand_id,
            color_id: self.color_id,
            category_id: self.category_id,
            optional_ids: normalize_ids(self.optionals),
        }
    }
}

// == Update Vehicle ==
/// Request body for PUT /api/vehicles/:id.
///
/// Absent fields are left as is. For nullable columns an explicit `null`
/// clears the value. `optionals` replaces the whole set.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateVehicleRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "exceeds maximum length of 100 characters")
    )]
    pub model: Option<String>,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub price: Option<f64>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub description: Option<Option<String>>,
    pub mileage: Option<u32>,
    #[validate(custom(function = "not_blank"))]
    pub fuel_type: Option<String>,
    #[validate(custom(function = "not_blank"))]
    pub transmission: Option<String>,
    #[serde(with = "::serde_with::rust::double_option")]
    #[validate(custom(function = "http_url"))]
    pub image_url: Option<Option<String>>,
    pub available: Option<bool>,
    #[serde(with = "::serde_with::rust::double_option")]
    #[validate(range(min = 1900, max = 2100, message = "must be between 1900 and 2100"))]
    pub year: Option<Option<u16>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub brand_id: Option<Option<u32>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub color_id: Option<Option<u32>>,
    #[serde(with = "::serde_with::rust::double_option")]
    pub category_id: Option<Option<u32>>,
    pub optionals: Option<Vec<u32>>,
}

impl UpdateVehicleRequest {
    pub fn into_patch(self) -> VehiclePatch {
        VehiclePatch {
            model: self.model,
            price: self.price,
            description: self.description,
            mileage: self.mileage,
            fuel_type: self.fuel_type,
            transmission: self.transmission,
            image_url: self.image_url,
            available: self.available,
            year: self.year,
            brand_id: self.brand_id,
            color_id: self.color_id,
            category_id: self.category_id,
            optional_ids: self.optionals,
        }
    }
}

// == Images ==
/// Request body for POST /api/images
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateImageRequest {
    pub vehicle_id: u32,
    #[validate(custom(function = "http_url"))]
    pub url: String,
    /// Gallery position, defaults to 1
    #[serde(default)]
    pub position: Option<i32>,
}

impl CreateImageRequest {
    pub fn into_new_image(self) -> NewImage {
        NewImage {
            vehicle_id: self.vehicle_id,
            url: self.url,
            position: self.position.unwrap_or(DEFAULT_IMAGE_POSITION),
        }
    }
}

/// Request body for PUT /api/images/:id
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UpdateImageRequest {
    #[validate(custom(function = "http_url"))]
    pub url: Option<String>,
    pub position: Option<i32>,
}

impl UpdateImageRequest {
    pub fn into_patch(self) -> ImagePatch {
        ImagePatch {
            url: self.url,
            position: self.position,
        }
    }
}

// == Vehicle Search ==
/// Query string for GET /api/vehicles/search
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VehicleSearchQuery {
    pub brand_id: Option<u32>,
    pub color_id: Option<u32>,
    pub category_id: Option<u32>,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub min_price: Option<f64>,
    #[validate(range(min = 0.0, message = "must be a non-negative number"))]
    pub max_price: Option<f64>,
    #[validate(range(min = 1, message = "must be a positive integer"))]
    pub page: Option<u32>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<u32>,
}

impl VehicleSearchQuery {
    /// Page and size with defaults applied.
    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn filter(&self) -> VehicleFilter {
        VehicleFilter {
            brand_id: self.brand_id,
            color_id: self.color_id,
            category_id: self.category_id,
            min_price: self.min_price,
            max_price: self.max_price,
        }
    }

    /// Cache key for this search.
    ///
    /// Built from a sorted JSON object of the filters that are set plus the
    /// effective page and limit, so `?limit=10&color_id=1` and
    /// `?color_id=1` map to the same entry.
    pub fn cache_key(&self) -> String {
        let page = self.page_request();
        let mut canonical = Map::new();

        let mut put = |name: &str, value: Option<Value>| {
            if let Some(value) = value {
                canonical.insert(name.to_string(), value);
            }
        };
        put("brand_id", self.brand_id.map(Value::from));
        put("color_id", self.color_id.map(Value::from));
        put("category_id", self.category_id.map(Value::from));
        put("min_price", self.min_price.map(Value::from));
        put("max_price", self.max_price.map(Value::from));
        put("page", Some(Value::from(page.page)));
        put("limit", Some(Value::from(page.limit)));

        Namespace::Vehicles.key(&format!("search:{}", Value::Object(canonical)))
    }
}

// == Lookups ==
/// Request body for POST /api/lookups/:kind
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateLookupRequest {
    #[serde(default)]
    #[validate(
        custom(function = "not_blank"),
        length(max = 100, message = "exceeds maximum length of 100 characters")
    )]
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    fn messages<T: Validate>(req: &T) -> Vec<String> {
        match req.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => match AppError::from(errors) {
                AppError::Validation(messages) => messages,
                other => panic!("Expected Validation error, got {:?}", other),
            },
        }
    }

    fn valid_create() -> CreateVehicleRequest {
        serde_json::from_str(
            r#"{"model":"Onix","price":72000.5,"mileage":0,"fuel_type":"flex","transmission":"automatic"}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_create_request_deserialize_defaults() {
        let req = valid_create();
        assert_eq!(req.model, "Onix");
        assert!(req.available.is_none());
        assert!(req.optionals.is_empty());
        assert!(req.validate().is_ok());
        assert!(req.into_new_vehicle().available);
    }

    #[test]
    fn test_create_request_collects_all_errors() {
        let req: CreateVehicleRequest = serde_json::from_str(
            r#"{"price":-1,"mileage":10,"image_url":"ftp://x","year":1800}"#,
        )
        .unwrap();

        let errors = messages(&req);
        assert_eq!(errors.len(), 6, "{:?}", errors);
        assert!(errors.iter().any(|e| e == "model is required"));
        assert!(errors.iter().any(|e| e == "image_url must be a valid http(s) URL"));
        assert!(errors.iter().any(|e| e == "year must be between 1900 and 2100"));
    }

    #[test]
    fn test_create_request_model_too_long() {
        let mut req = valid_create();
        req.model = "x".repeat(101);
        assert_eq!(
            messages(&req),
            vec!["model exceeds maximum length of 100 characters".to_string()]
        );
    }

    #[test]
    fn test_blank_text_is_required() {
        let mut req = valid_create();
        req.fuel_type = "   ".to_string();
        assert_eq!(messages(&req), vec!["fuel_type is required".to_string()]);
    }

    #[test]
    fn test_image_url_rejects_malformed_hosts() {
        for url in ["http://::::", "https://%", "http://exa mple.com", "https://", "cdn/a.jpg"] {
            let mut req = valid_create();
            req.image_url = Some(url.to_string());
            assert_eq!(messages(&req).len(), 1, "{} should be rejected", url);
        }

        let mut req = valid_create();
        req.image_url = Some("https://cdn.example.com/cars/onix.jpg".to_string());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_optionals_are_normalized() {
        let mut req = valid_create();
        req.optionals = vec![3, 1, 3];
        assert_eq!(req.into_new_vehicle().optional_ids, vec![1, 3]);
    }

    #[test]
    fn test_update_request_only_checks_supplied_fields() {
        let empty: UpdateVehicleRequest = serde_json::from_str("{}").unwrap();
        assert!(empty.validate().is_ok());

        let blank_model: UpdateVehicleRequest = serde_json::from_str(r#"{"model":"  "}"#).unwrap();
        assert_eq!(messages(&blank_model), vec!["model is required".to_string()]);

        let bad_url: UpdateVehicleRequest =
            serde_json::from_str(r#"{"image_url":"http://::::"}"#).unwrap();
        assert_eq!(messages(&bad_url).len(), 1);
    }

    #[test]
    fn test_update_request_distinguishes_null_from_absent() {
        let req: UpdateVehicleRequest =
            serde_json::from_str(r#"{"year":null,"brand_id":4,"optionals":[]}"#).unwrap();
        assert!(req.validate().is_ok());

        let patch = req.into_patch();
        assert_eq!(patch.year, Some(None));
        assert_eq!(patch.brand_id, Some(Some(4)));
        assert_eq!(patch.color_id, None);
        assert_eq!(patch.description, None);
        assert_eq!(patch.optional_ids, Some(vec![]));
    }

    #[test]
    fn test_image_requests() {
        let req: CreateImageRequest =
            serde_json::from_str(r#"{"vehicle_id":1,"url":"https://cdn.example.com/1.jpg"}"#)
                .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.into_new_image().position, 1);

        let bad: UpdateImageRequest = serde_json::from_str(r#"{"url":"not a url"}"#).unwrap();
        assert_eq!(messages(&bad), vec!["url must be a valid http(s) URL".to_string()]);
    }

    #[test]
    fn test_search_defaults() {
        let query = VehicleSearchQuery::default();
        assert_eq!(query.page_request(), PageRequest { page: 1, limit: 10 });
        assert!(query.validate().is_ok());
    }

    #[test]
    fn test_search_rejects_bad_paging() {
        let query = VehicleSearchQuery {
            page: Some(0),
            limit: Some(101),
            min_price: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            messages(&query),
            vec![
                "limit must be between 1 and 100".to_string(),
                "min_price must be a non-negative number".to_string(),
                "page must be a positive integer".to_string(),
            ]
        );
    }

    #[test]
    fn test_search_cache_key_is_canonical() {
        let implicit = VehicleSearchQuery {
            color_id: Some(1),
            ..Default::default()
        };
        let explicit = VehicleSearchQuery {
            color_id: Some(1),
            page: Some(1),
            limit: Some(10),
            ..Default::default()
        };

        assert_eq!(implicit.cache_key(), explicit.cache_key());
        assert_eq!(
            implicit.cache_key(),
            r#"vehicles:search:{"color_id":1,"limit":10,"page":1}"#
        );
    }

    #[test]
    fn test_search_cache_key_differs_per_filter() {
        let red = VehicleSearchQuery {
            color_id: Some(1),
            ..Default::default()
        };
        let blue = VehicleSearchQuery {
            color_id: Some(2),
            ..Default::default()
        };
        assert_ne!(red.cache_key(), blue.cache_key());
    }

    #[test]
    fn test_lookup_request_validation() {
        let req = CreateLookupRequest { name: String::new() };
        assert_eq!(messages(&req), vec!["name is required".to_string()]);

        let req = CreateLookupRequest {
            name: "Prata".to_string(),
        };
        assert!(req.validate().is_ok());
    }
}
