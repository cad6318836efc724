use crate::{
    auth::AuthUser,
    db::{
        properties::{NewProperty, PropertyRepository},
        users::UserRepository,
    },
    handlers::{non_empty, required},
    models::{
        CreatePropertyRequest, Property, PropertyImage, PropertyListing, PropertySearch,
        PropertyType, PropertyWithImages, UpdateImageRequest, UpdatePropertyRequest, UploadImageRequest,
    },
    state::AppState,
    utils::{
        db_error, image::decode_image, validate_request, ApiError, ApiJson, ApiPath, ApiQuery,
        ApiResult, Empty, Envelope,
    },
};
use axum::{extract::State, Extension};
use sqlx::SqliteConnection;

fn property_type(value: &str) -> ApiResult<PropertyType> {
    PropertyType::parse(value)
        .ok_or_else(|| {
            ApiError::validation_error("Invalid property type")
                .with_error(format!("Unknown property type: {value}"))
        })
}

fn decode(value: &str) -> ApiResult<Vec<u8>> {
    decode_image(value)
        .map_err(|_| ApiError::validation_error("Invalid image format").with_error("Image must be valid base64"))
}

/// Property `id` if the caller owns it; admins reach every property
async fn owned_property(conn: &mut SqliteConnection, id: i64, auth_user: &AuthUser) -> ApiResult<Property> {
    let property = if auth_user.is_admin() {
        PropertyRepository::find_by_id(conn, id).await?
    } else {
        PropertyRepository::find_owned(conn, id, auth_user.user_id).await?
    };
    property.ok_or_else(|| ApiError::not_found_error("Property not found"))
}

async fn with_images(conn: &mut SqliteConnection, property: Property) -> ApiResult<PropertyWithImages> {
    let images = PropertyRepository::images(conn, property.id).await?;
    Ok(PropertyWithImages { property, images })
}

/// The landlord's own properties with their galleries
pub async fn list_properties(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Envelope<Vec<PropertyWithImages>>> {
    let mut conn = state.db.acquire().await?;
    let properties = PropertyRepository::list_by_landlord(&mut conn, auth_user.user_id).await?;
    let properties = non_empty(properties, "No properties found")?;

    let mut listed = Vec::with_capacity(properties.len());
    for property in properties {
        listed.push(with_images(&mut conn, property).await?);
    }

    Ok(Envelope::ok(format!("{} property(ies) found", listed.len()), listed))
}

/// Available properties for prospective tenants
pub async fn search_properties(
    State(state): State<AppState>,
    ApiQuery(search): ApiQuery<PropertySearch>,
) -> ApiResult<Envelope<Vec<PropertyListing>>> {
    let mut conn = state.db.acquire().await?;
    let properties = PropertyRepository::search(&mut conn, &search)
        .await
        .map_err(db_error("Unable to search properties"))?;
    let properties = non_empty(properties, "No properties found matching your criteria")?;

    let mut listings = Vec::with_capacity(properties.len());
    for property in properties {
        let landlord = UserRepository::find_by_id(&mut conn, property.landlord_id).await?;
        listings.push(PropertyListing::new(property, landlord.as_ref()));
    }

    Ok(Envelope::ok(format!("{} property(ies) found", listings.len()), listings))
}

pub async fn get_property(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<PropertyWithImages>>> {
    let mut conn = state.db.acquire().await?;
    let property = owned_property(&mut conn, id, &auth_user).await?;

    Ok(Envelope::ok("Property found", vec![with_images(&mut conn, property).await?]))
}

/// List a new property, optionally with gallery images
pub async fn create_property(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiJson(request): ApiJson<CreatePropertyRequest>,
) -> ApiResult<Envelope<Vec<PropertyWithImages>>> {
    validate_request(&request, "Unable to create property due to validation error(s)")?;

    let exterior_image = decode(&required(request.exterior_image, "Exterior image")?)?;
    let name = required(request.name, "Name")?;
    let address = required(request.address, "Address")?;
    let city = required(request.city, "City")?;
    let description = request.property_description.unwrap_or_default();
    let kind = property_type(&required(request.property_type, "Property type")?)?;

    let mut tx = state.db.begin().await?;
    let id = PropertyRepository::insert(
        &mut tx,
        &NewProperty {
            landlord_id: auth_user.user_id,
            name: &name,
            address: &address,
            city: &city,
            description: &description,
            bedrooms: required(request.bedrooms, "Bedrooms")?,
            price: required(request.price, "Price")?,
            property_type: kind,
            availability: request.availability.unwrap_or(true),
            exterior_image: &exterior_image,
        },
    )
    .await
    .map_err(db_error("Unable to create property"))?;

    for image in request.images {
        let (Some(label), Some(data)) = (image.label, image.image) else {
            tracing::debug!("Skipping gallery entry without label or image");
            continue;
        };
        let Ok(bytes) = decode_image(&data) else {
            tracing::debug!("Skipping gallery entry {:?} with invalid image data", label);
            continue;
        };
        PropertyRepository::insert_image(&mut tx, id, &label, &bytes, image.description.as_deref())
            .await
            .map_err(db_error("Unable to store property image"))?;
    }

    let property = PropertyRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to create property"))?;
    let created = with_images(&mut tx, property).await?;
    tx.commit().await.map_err(db_error("Unable to create property"))?;

    Ok(Envelope::created("Property created successfully", vec![created]))
}

pub async fn update_property(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UpdatePropertyRequest>,
) -> ApiResult<Envelope<Vec<Property>>> {
    validate_request(&request, "Unable to update property due to validation error(s)")?;

    let mut tx = state.db.begin().await?;
    let mut property = owned_property(&mut tx, id, &auth_user).await?;

    if let Some(name) = request.name {
        property.name = name;
    }
    if let Some(address) = request.address {
        property.address = address;
    }
    if let Some(city) = request.city {
        property.city = city;
    }
    if let Some(description) = request.property_description {
        property.property_description = description;
    }
    if let Some(bedrooms) = request.bedrooms {
        property.bedrooms = bedrooms;
    }
    if let Some(price) = request.price {
        property.price = price;
    }
    if let Some(kind) = request.property_type.as_deref() {
        property.property_type = property_type(kind)?;
    }
    if let Some(availability) = request.availability {
        property.availability = availability;
    }
    if let Some(image) = request.exterior_image {
        property.exterior_image = decode(&image)?;
    }

    PropertyRepository::update(&mut tx, &property)
        .await
        .map_err(db_error("Unable to update property"))?;
    let property = PropertyRepository::find_by_id(&mut tx, id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Property not found"))?;
    tx.commit().await.map_err(db_error("Unable to update property"))?;

    Ok(Envelope::ok("Property updated successfully", vec![property]))
}

pub async fn delete_property(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Empty> {
    let mut tx = state.db.begin().await?;
    owned_property(&mut tx, id, &auth_user).await?;
    PropertyRepository::delete(&mut tx, id)
        .await
        .map_err(db_error("Unable to delete property"))?;
    tx.commit().await.map_err(db_error("Unable to delete property"))?;

    Ok(Empty::done("Property deleted successfully"))
}

/// Gallery of any property
pub async fn list_images(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> ApiResult<Envelope<Vec<PropertyImage>>> {
    let mut conn = state.db.acquire().await?;
    let images = PropertyRepository::images(&mut conn, id).await?;
    let images = non_empty(images, format!("No images found for property {id}"))?;

    Ok(Envelope::ok(format!("{} image(s) found", images.len()), images))
}

pub async fn upload_image(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(request): ApiJson<UploadImageRequest>,
) -> ApiResult<Envelope<Vec<PropertyImage>>> {
    validate_request(&request, "Unable to upload image due to validation error(s)")?;
    let label = required(request.label, "Label")?;
    let bytes = decode(&required(request.image, "Image")?)?;

    let mut tx = state.db.begin().await?;
    owned_property(&mut tx, id, &auth_user).await?;
    let image_id = PropertyRepository::insert_image(&mut tx, id, &label, &bytes, request.description.as_deref())
        .await
        .map_err(db_error("Unable to upload image"))?;
    let image = PropertyRepository::find_image(&mut tx, id, image_id)
        .await?
        .ok_or_else(|| ApiError::internal_error("Unable to upload image"))?;
    tx.commit().await.map_err(db_error("Unable to upload image"))?;

    Ok(Envelope::created("Image uploaded successfully", vec![image]))
}

pub async fn update_image(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((id, image_id)): ApiPath<(i64, i64)>,
    ApiJson(request): ApiJson<UpdateImageRequest>,
) -> ApiResult<Envelope<Vec<PropertyImage>>> {
    let mut tx = state.db.begin().await?;
    owned_property(&mut tx, id, &auth_user).await?;
    let mut image = PropertyRepository::find_image(&mut tx, id, image_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Image not found"))?;

    if let Some(label) = request.label.filter(|label| !label.is_empty()) {
        image.label = label;
    }
    if let Some(data) = request.image {
        image.image = decode(&data)?;
    }
    if let Some(description) = request.description {
        image.description = Some(description);
    }

    PropertyRepository::update_image(&mut tx, &image)
        .await
        .map_err(db_error("Unable to update image"))?;
    tx.commit().await.map_err(db_error("Unable to update image"))?;

    Ok(Envelope::ok("Image updated successfully", vec![image]))
}

pub async fn delete_image(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    ApiPath((id, image_id)): ApiPath<(i64, i64)>,
) -> ApiResult<Empty> {
    let mut tx = state.db.begin().await?;
    owned_property(&mut tx, id, &auth_user).await?;
    PropertyRepository::find_image(&mut tx, id, image_id)
        .await?
        .ok_or_else(|| ApiError::not_found_error("Image not found"))?;
    PropertyRepository::delete_image(&mut tx, image_id)
        .await
        .map_err(db_error("Unable to delete image"))?;
    tx.commit().await.map_err(db_error("Unable to delete image"))?;

    Ok(Empty::done("Image deleted successfully"))
}
