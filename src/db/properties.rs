use crate::models::{Property, PropertyImage, PropertySearch, PropertyType};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

const COLUMNS: &str = "id, name, address, city, property_description, bedrooms, price, property_type, \
                       availability, landlord_id, exterior_image, created_at, updated_at";

const IMAGE_COLUMNS: &str = "id, property_id, label, image, description, created_at, updated_at";

/// Fields written when a property is listed
#[derive(Debug)]
pub struct NewProperty<'a> {
    pub landlord_id: i64,
    pub name: &'a str,
    pub address: &'a str,
    pub city: &'a str,
    pub description: &'a str,
    pub bedrooms: i64,
    pub price: i64,
    pub property_type: PropertyType,
    pub availability: bool,
    pub exterior_image: &'a [u8],
}

/// Property and gallery queries
pub struct PropertyRepository;

impl PropertyRepository {
    pub async fn insert(conn: &mut SqliteConnection, property: &NewProperty<'_>) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            r#"INSERT INTO properties
                   (landlord_id, name, address, city, property_description, bedrooms, price,
                    property_type, availability, exterior_image)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(property.landlord_id)
        .bind(property.name)
        .bind(property.address)
        .bind(property.city)
        .bind(property.description)
        .bind(property.bedrooms)
        .bind(property.price)
        .bind(property.property_type)
        .bind(property.availability)
        .bind(property.exterior_image)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    pub async fn find_by_id(conn: &mut SqliteConnection, id: i64) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {COLUMNS} FROM properties WHERE id = ?"))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Property `id` if it belongs to `landlord_id`
    pub async fn find_owned(
        conn: &mut SqliteConnection,
        id: i64,
        landlord_id: i64,
    ) -> Result<Option<Property>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM properties WHERE id = ? AND landlord_id = ?"
        ))
        .bind(id)
        .bind(landlord_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn list_by_landlord(
        conn: &mut SqliteConnection,
        landlord_id: i64,
    ) -> Result<Vec<Property>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM properties WHERE landlord_id = ? ORDER BY id"
        ))
        .bind(landlord_id)
        .fetch_all(&mut *conn)
        .await
    }

    /// Available properties matching the tenant's filters
    pub async fn search(
        conn: &mut SqliteConnection,
        search: &PropertySearch,
    ) -> Result<Vec<Property>, sqlx::Error> {
        let mut query = QueryBuilder::<Sqlite>::new(format!(
            "SELECT {COLUMNS} FROM properties WHERE availability = 1"
        ));

        if let Some(max_price) = search.max_price {
            query.push(" AND price <= ").push_bind(max_price);
        }
        if let Some(city) = search.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            // Plain substring match; `%` and `_` in the filter are literal.
            query
                .push(" AND instr(LOWER(city), ")
                .push_bind(city.to_lowercase())
                .push(") > 0");
        }
        if let Some(kind) = search.property_type.as_deref().filter(|t| *t != "Any" && !t.is_empty()) {
            query.push(" AND property_type = ").push_bind(kind.to_string());
        }
        if let Some(bedrooms) = search.bedrooms {
            query.push(" AND bedrooms >= ").push_bind(bedrooms);
        }
        query.push(" ORDER BY id");

        query.build_query_as::<Property>().fetch_all(&mut *conn).await
    }

    /// Writes every column of an already-modified record
    pub async fn update(conn: &mut SqliteConnection, property: &Property) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE properties
               SET name = ?, address = ?, city = ?, property_description = ?, bedrooms = ?,
                   price = ?, property_type = ?, availability = ?, exterior_image = ?,
                   updated_at = CURRENT_TIMESTAMP
               WHERE id = ?"#,
        )
        .bind(&property.name)
        .bind(&property.address)
        .bind(&property.city)
        .bind(&property.property_description)
        .bind(property.bedrooms)
        .bind(property.price)
        .bind(property.property_type)
        .bind(property.availability)
        .bind(&property.exterior_image)
        .bind(property.id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    /// Deletes the property together with its gallery
    pub async fn delete(conn: &mut SqliteConnection, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM property_images WHERE property_id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;
        sqlx::query("DELETE FROM properties WHERE id = ?")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    pub async fn images(conn: &mut SqliteConnection, property_id: i64) -> Result<Vec<PropertyImage>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM property_images WHERE property_id = ? ORDER BY id"
        ))
        .bind(property_id)
        .fetch_all(&mut *conn)
        .await
    }

    pub async fn insert_image(
        conn: &mut SqliteConnection,
        property_id: i64,
        label: &str,
        image: &[u8],
        description: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO property_images (property_id, label, image, description) VALUES (?, ?, ?, ?)",
        )
        .bind(property_id)
        .bind(label)
        .bind(image)
        .bind(description)
        .execute(&mut *conn)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Image `image_id` if it belongs to `property_id`
    pub async fn find_image(
        conn: &mut SqliteConnection,
        property_id: i64,
        image_id: i64,
    ) -> Result<Option<PropertyImage>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {IMAGE_COLUMNS} FROM property_images WHERE id = ? AND property_id = ?"
        ))
        .bind(image_id)
        .bind(property_id)
        .fetch_optional(&mut *conn)
        .await
    }

    pub async fn update_image(conn: &mut SqliteConnection, image: &PropertyImage) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"UPDATE property_images
               SET label = ?, image = ?, description = ?, updated_at = CURRENT_TIMESTAMP
               WHERE id = ?"#,
        )
        .bind(&image.label)
        .bind(&image.image)
        .bind(&image.description)
        .bind(image.id)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }

    pub async fn delete_image(conn: &mut SqliteConnection, image_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM property_images WHERE id = ?")
            .bind(image_id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }
}
