use crate::{models::User, utils::image::serialize_base64};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::{Validate, ValidationError};

/// Kind of dwelling a landlord lists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum PropertyType {
    House,
    Apartment,
    Condo,
    Townhouse,
    Duplex,
    Studio,
    Loft,
    Bungalow,
    Cabin,
    #[serde(rename = "Mobile Home")]
    #[sqlx(rename = "Mobile Home")]
    MobileHome,
    Other,
}

impl PropertyType {
    pub const ALL: [PropertyType; 11] = [
        PropertyType::House,
        PropertyType::Apartment,
        PropertyType::Condo,
        PropertyType::Townhouse,
        PropertyType::Duplex,
        PropertyType::Studio,
        PropertyType::Loft,
        PropertyType::Bungalow,
        PropertyType::Cabin,
        PropertyType::MobileHome,
        PropertyType::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::House => "House",
            PropertyType::Apartment => "Apartment",
            PropertyType::Condo => "Condo",
            PropertyType::Townhouse => "Townhouse",
            PropertyType::Duplex => "Duplex",
            PropertyType::Studio => "Studio",
            PropertyType::Loft => "Loft",
            PropertyType::Bungalow => "Bungalow",
            PropertyType::Cabin => "Cabin",
            PropertyType::MobileHome => "Mobile Home",
            PropertyType::Other => "Other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }
}

/// Property types arrive as text so an unknown name is reported with the
/// request's other violations.
fn known_property_type(value: &str) -> Result<(), ValidationError> {
    if PropertyType::parse(value).is_some() {
        return Ok(());
    }
    let names: Vec<&str> = PropertyType::ALL.iter().map(PropertyType::as_str).collect();
    let mut err = ValidationError::new("property_type");
    err.message = Some(format!("Property type must be one of: {}", names.join(", ")).into());
    Err(err)
}

/// Database property record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub property_description: String,
    pub bedrooms: i64,
    pub price: i64,
    pub property_type: PropertyType,
    pub availability: bool,
    pub landlord_id: i64,
    #[serde(serialize_with = "serialize_base64")]
    pub exterior_image: Vec<u8>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Database property image record
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: i64,
    pub property_id: i64,
    pub label: String,
    #[serde(serialize_with = "serialize_base64")]
    pub image: Vec<u8>,
    pub description: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Property together with its gallery
#[derive(Debug, Serialize)]
pub struct PropertyWithImages {
    #[serde(flatten)]
    pub property: Property,
    pub images: Vec<PropertyImage>,
}

/// Landlord shown next to a search result
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LandlordCard {
    pub id: i64,
    /// Initial and surname, e.g. "J. Doe"
    pub name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl From<&User> for LandlordCard {
    fn from(user: &User) -> Self {
        let initial = user.first_name.chars().next().map(String::from).unwrap_or_default();
        Self {
            id: user.id,
            name: format!("{}. {}", initial, user.last_name),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
        }
    }
}

/// Search result for prospective tenants
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyListing {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub price: i64,
    pub bedrooms: i64,
    pub property_type: PropertyType,
    pub availability: bool,
    pub description: String,
    #[serde(serialize_with = "serialize_base64")]
    pub exterior_image: Vec<u8>,
    pub landlord: Option<LandlordCard>,
}

impl PropertyListing {
    pub fn new(property: Property, landlord: Option<&User>) -> Self {
        Self {
            id: property.id,
            name: property.name,
            address: property.address,
            city: property.city,
            price: property.price,
            bedrooms: property.bedrooms,
            property_type: property.property_type,
            availability: property.availability,
            description: property.property_description,
            exterior_image: property.exterior_image,
            landlord: landlord.map(LandlordCard::from),
        }
    }
}

/// Short property card embedded in group views
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyCard {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "serialize_base64")]
    pub exterior_image: Vec<u8>,
    pub address: String,
    pub city: String,
}

impl From<Property> for PropertyCard {
    fn from(property: Property) -> Self {
        Self {
            id: property.id,
            name: property.name,
            exterior_image: property.exterior_image,
            address: property.address,
            city: property.city,
        }
    }
}

/// Property details shown to group members
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDetails {
    pub id: i64,
    pub name: String,
    #[serde(serialize_with = "serialize_base64")]
    pub exterior_image: Vec<u8>,
    pub address: String,
    pub city: String,
    pub property_description: String,
    pub bedrooms: i64,
    pub price: i64,
}

impl From<Property> for PropertyDetails {
    fn from(property: Property) -> Self {
        Self {
            id: property.id,
            name: property.name,
            exterior_image: property.exterior_image,
            address: property.address,
            city: property.city,
            property_description: property.property_description,
            bedrooms: property.bedrooms,
            price: property.price,
        }
    }
}

/// Tenant-side search filters
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PropertySearch {
    pub max_price: Option<i64>,
    pub city: Option<String>,
    /// "Any" disables the filter
    pub property_type: Option<String>,
    /// Minimum number of bedrooms
    pub bedrooms: Option<i64>,
}

/// Gallery entry supplied on property creation
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NewPropertyImage {
    pub label: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Property creation request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePropertyRequest {
    #[validate(
        required(message = "Name is required"),
        length(min = 1, message = "Name is required")
    )]
    pub name: Option<String>,
    #[validate(
        required(message = "Address is required"),
        length(min = 1, message = "Address is required")
    )]
    pub address: Option<String>,
    #[validate(
        required(message = "City is required"),
        length(min = 1, message = "City is required")
    )]
    pub city: Option<String>,
    pub property_description: Option<String>,
    #[validate(
        required(message = "Bedrooms is required"),
        range(min = 0, message = "Bedrooms cannot be negative")
    )]
    pub bedrooms: Option<i64>,
    #[validate(
        required(message = "Price is required"),
        range(min = 0, message = "Price cannot be negative")
    )]
    pub price: Option<i64>,
    #[validate(
        required(message = "Property type is required"),
        custom(function = "known_property_type")
    )]
    pub property_type: Option<String>,
    pub availability: Option<bool>,
    #[validate(required(message = "Exterior image is required"))]
    pub exterior_image: Option<String>,
    #[serde(default)]
    pub images: Vec<NewPropertyImage>,
}

/// Property update; absent fields stay as they are
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdatePropertyRequest {
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
    #[validate(length(min = 1, message = "Address cannot be empty"))]
    pub address: Option<String>,
    #[validate(length(min = 1, message = "City cannot be empty"))]
    pub city: Option<String>,
    pub property_description: Option<String>,
    #[validate(range(min = 0, message = "Bedrooms cannot be negative"))]
    pub bedrooms: Option<i64>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: Option<i64>,
    #[validate(custom(function = "known_property_type"))]
    pub property_type: Option<String>,
    pub availability: Option<bool>,
    pub exterior_image: Option<String>,
}

/// Gallery upload request
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct UploadImageRequest {
    #[validate(
        required(message = "Label is required"),
        length(min = 1, message = "Label is required")
    )]
    pub label: Option<String>,
    #[validate(
        required(message = "Image is required"),
        length(min = 1, message = "Image is required")
    )]
    pub image: Option<String>,
    pub description: Option<String>,
}

/// Gallery entry update; absent fields stay as they are
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateImageRequest {
    pub label: Option<String>,
    pub image: Option<String>,
    pub description: Option<String>,
}
