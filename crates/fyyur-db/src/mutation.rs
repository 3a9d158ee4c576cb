//! Write side of the catalog.
//!
//! Venue and artist writes touch the entity row and its genre rows; each
//! runs in a single transaction so an entity is never left behind without the
//! genres that were submitted with it.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};

use crate::entities::{artist, show, venue};
use crate::error::{CatalogError, CatalogResult};
use crate::form;
use crate::genre::{clear_genres, insert_genres, normalize_genres, OwnerKind};

/// A submitted venue form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct VenueInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub image_link: Option<String>,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub facebook_link: Option<String>,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "form::checkbox")]
    pub seeking_talent: Option<bool>,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub seeking_description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl VenueInput {
    /// Defaults presented by an empty "new venue" form.
    pub fn blank() -> Self {
        Self {
            seeking_talent: Some(true),
            ..Default::default()
        }
    }
}

/// A submitted artist form.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ArtistInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub image_link: Option<String>,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub facebook_link: Option<String>,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "form::checkbox")]
    pub seeking_venue: Option<bool>,
    #[serde(default, deserialize_with = "form::optional_text")]
    pub seeking_description: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
}

impl ArtistInput {
    /// Defaults presented by an empty "new artist" form.
    pub fn blank() -> Self {
        Self {
            seeking_venue: Some(true),
            ..Default::default()
        }
    }
}

/// A submitted show form.
#[derive(Debug, Clone, Deserialize)]
pub struct ShowInput {
    pub venue_id: i32,
    pub artist_id: i32,
    #[serde(deserialize_with = "form::start_time")]
    pub start_time: DateTime<Utc>,
}

/// Outcome of a venue deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueRemoval {
    pub venue_id: i32,
    pub shows_removed: u64,
    pub genres_removed: u64,
}

fn require_name(name: &str) -> CatalogResult<()> {
    if name.trim().is_empty() {
        return Err(CatalogError::Validation("name is required".into()));
    }
    Ok(())
}

/// POST /venues/create
pub async fn create_venue<C: TransactionTrait>(
    db: &C,
    input: VenueInput,
) -> CatalogResult<venue::Model> {
    require_name(&input.name)?;
    let genres = normalize_genres(&input.genres)?;

    let txn = db.begin().await?;
    let created = venue::ActiveModel {
        name: Set(input.name),
        city: Set(input.city),
        state: Set(input.state),
        address: Set(input.address),
        phone: Set(input.phone),
        image_link: Set(input.image_link),
        facebook_link: Set(input.facebook_link.unwrap_or_default()),
        website: Set(input.website),
        seeking_talent: Set(input.seeking_talent.unwrap_or(true)),
        seeking_description: Set(Some(input.seeking_description.unwrap_or_default())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_genres(&txn, OwnerKind::Venue, created.id, &genres).await?;
    txn.commit().await?;

    tracing::info!(venue_id = created.id, name = %created.name, "venue listed");
    Ok(created)
}

/// POST /venues/{id}/edit
///
/// Every scalar field is overwritten; omitted text fields become empty and an
/// omitted checkbox becomes false. The genre set is replaced only when the
/// submission carries at least one genre.
pub async fn update_venue<C: TransactionTrait>(
    db: &C,
    venue_id: i32,
    input: VenueInput,
) -> CatalogResult<venue::Model> {
    require_name(&input.name)?;
    let genres = normalize_genres(&input.genres)?;

    let txn = db.begin().await?;
    let existing = venue::Entity::find_by_id(venue_id)
        .one(&txn)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "venue",
            id: venue_id,
        })?;

    let mut active: venue::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.city = Set(input.city);
    active.state = Set(input.state);
    active.address = Set(input.address);
    active.phone = Set(input.phone);
    active.image_link = Set(input.image_link);
    active.facebook_link = Set(input.facebook_link.unwrap_or_default());
    active.website = Set(input.website);
    active.seeking_talent = Set(input.seeking_talent.unwrap_or(false));
    active.seeking_description = Set(input.seeking_description);
    let updated = active.update(&txn).await?;

    if !genres.is_empty() {
        clear_genres(&txn, OwnerKind::Venue, venue_id).await?;
        insert_genres(&txn, OwnerKind::Venue, venue_id, &genres).await?;
    }
    txn.commit().await?;

    tracing::info!(venue_id, "venue updated");
    Ok(updated)
}

/// DELETE /venues/{id}
///
/// Removes the venue together with its genre pairs and its shows.
pub async fn delete_venue<C: TransactionTrait>(
    db: &C,
    venue_id: i32,
) -> CatalogResult<VenueRemoval> {
    let txn = db.begin().await?;
    venue::Entity::find_by_id(venue_id)
        .one(&txn)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "venue",
            id: venue_id,
        })?;

    let shows_removed = show::Entity::delete_many()
        .filter(show::Column::VenueId.eq(venue_id))
        .exec(&txn)
        .await?
        .rows_affected;
    let genres_removed = clear_genres(&txn, OwnerKind::Venue, venue_id).await?;
    venue::Entity::delete_by_id(venue_id).exec(&txn).await?;
    txn.commit().await?;

    tracing::info!(venue_id, shows_removed, genres_removed, "venue deleted");
    Ok(VenueRemoval {
        venue_id,
        shows_removed,
        genres_removed,
    })
}

/// POST /artists/create
pub async fn create_artist<C: TransactionTrait>(
    db: &C,
    input: ArtistInput,
) -> CatalogResult<artist::Model> {
    require_name(&input.name)?;
    let genres = normalize_genres(&input.genres)?;

    let txn = db.begin().await?;
    let created = artist::ActiveModel {
        name: Set(input.name),
        city: Set(input.city),
        state: Set(input.state),
        phone: Set(input.phone),
        image_link: Set(input.image_link),
        facebook_link: Set(input.facebook_link),
        website: Set(input.website),
        seeking_venue: Set(input.seeking_venue.unwrap_or(true)),
        seeking_description: Set(input.seeking_description),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    insert_genres(&txn, OwnerKind::Artist, created.id, &genres).await?;
    txn.commit().await?;

    tracing::info!(artist_id = created.id, name = %created.name, "artist listed");
    Ok(created)
}

/// POST /artists/{id}/edit
///
/// Same full-replace contract as [`update_venue`].
pub async fn update_artist<C: TransactionTrait>(
    db: &C,
    artist_id: i32,
    input: ArtistInput,
) -> CatalogResult<artist::Model> {
    require_name(&input.name)?;
    let genres = normalize_genres(&input.genres)?;

    let txn = db.begin().await?;
    let existing = artist::Entity::find_by_id(artist_id)
        .one(&txn)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "artist",
            id: artist_id,
        })?;

    let mut active: artist::ActiveModel = existing.into();
    active.name = Set(input.name);
    active.city = Set(input.city);
    active.state = Set(input.state);
    active.phone = Set(input.phone);
    active.image_link = Set(input.image_link);
    active.facebook_link = Set(input.facebook_link);
    active.website = Set(input.website);
    active.seeking_venue = Set(input.seeking_venue.unwrap_or(false));
    active.seeking_description = Set(input.seeking_description);
    let updated = active.update(&txn).await?;

    if !genres.is_empty() {
        clear_genres(&txn, OwnerKind::Artist, artist_id).await?;
        insert_genres(&txn, OwnerKind::Artist, artist_id, &genres).await?;
    }
    txn.commit().await?;

    tracing::info!(artist_id, "artist updated");
    Ok(updated)
}

/// POST /shows/create
///
/// The venue and artist ids are stored as given; a show pointing at a
/// missing entity is reported when it is read.
pub async fn create_show<C: ConnectionTrait>(
    db: &C,
    input: ShowInput,
) -> CatalogResult<show::Model> {
    let created = show::ActiveModel {
        start_time: Set(input.start_time),
        venue_id: Set(input.venue_id),
        artist_id: Set(input.artist_id),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(
        show_id = created.id,
        venue_id = created.venue_id,
        artist_id = created.artist_id,
        "show listed"
    );
    Ok(created)
}
