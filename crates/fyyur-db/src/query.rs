//! Read side of the catalog: listings, search and detail views.
//!
//! Every function takes the caller's notion of "now" so upcoming/past splits
//! are reproducible. Listing and search counts treat a show as upcoming when
//! it starts strictly after `now`; detail views put a show starting exactly at
//! `now` in the upcoming bucket.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::sea_query::{BinOper, Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use serde::Serialize;

use crate::entities::{artist, show, venue};
use crate::error::{CatalogError, CatalogResult};
use crate::genre::{genres_of, upcoming_show_counts, OwnerKind};

/// Image shown for venues and artists that have no `image_link`.
pub const PLACEHOLDER_IMAGE_LINK: &str = "/static/img/placeholder.png";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpcomingSummary {
    pub id: i32,
    pub name: String,
    pub num_upcoming_shows: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityArea {
    pub city: String,
    pub state: String,
    pub venues: Vec<UpcomingSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResults {
    pub count: usize,
    pub data: Vec<UpcomingSummary>,
}

/// A show as seen from its venue's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistAppearance {
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: DateTime<Utc>,
}

/// A show as seen from its artist's page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueAppearance {
    pub venue_id: i32,
    pub venue_name: String,
    pub venue_image_link: String,
    pub start_time: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub address: String,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub facebook_link: String,
    pub seeking_talent: bool,
    pub seeking_description: String,
    pub image_link: String,
    pub past_shows: Vec<ArtistAppearance>,
    pub upcoming_shows: Vec<ArtistAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistDetail {
    pub id: i32,
    pub name: String,
    pub genres: Vec<String>,
    pub city: String,
    pub state: String,
    pub phone: String,
    pub website: Option<String>,
    pub facebook_link: Option<String>,
    pub seeking_venue: bool,
    pub seeking_description: String,
    pub image_link: String,
    pub past_shows: Vec<VenueAppearance>,
    pub upcoming_shows: Vec<VenueAppearance>,
    pub past_shows_count: usize,
    pub upcoming_shows_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShowListing {
    pub id: i32,
    pub venue_id: i32,
    pub venue_name: String,
    pub artist_id: i32,
    pub artist_name: String,
    pub artist_image_link: String,
    pub start_time: DateTime<Utc>,
}

/// A stored venue with its genres, used to prefill the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VenueEdit {
    #[serde(flatten)]
    pub venue: venue::Model,
    pub genres: Vec<String>,
}

/// A stored artist with its genres, used to prefill the edit form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistEdit {
    #[serde(flatten)]
    pub artist: artist::Model,
    pub genres: Vec<String>,
}

fn image_or_placeholder(image_link: Option<String>) -> String {
    image_link.unwrap_or_else(|| PLACEHOLDER_IMAGE_LINK.to_string())
}

/// Case-insensitive substring match on a name column. LIKE wildcards in the
/// term are matched literally; an empty term matches everything.
/// The term and the column both go through the database's `LOWER`.
fn name_contains(column: impl IntoColumnRef, term: &str) -> SimpleExpr {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    let pattern = SimpleExpr::Binary(
        Box::new(Func::lower(Expr::val(format!("%{escaped}%"))).into()),
        BinOper::Escape,
        Box::new(SimpleExpr::Constant('\\'.into())),
    );
    Expr::expr(Func::lower(Expr::col(column))).binary(BinOper::Like, pattern)
}

/// Group city-sorted venues into areas. A new area starts whenever the city
/// differs from the previous venue's; the area takes its state from its first
/// venue.
fn group_by_city(venues: Vec<venue::Model>, counts: &HashMap<i32, u64>) -> Vec<CityArea> {
    let mut areas: Vec<CityArea> = Vec::new();
    for v in venues {
        let entry = UpcomingSummary {
            id: v.id,
            num_upcoming_shows: counts.get(&v.id).copied().unwrap_or(0),
            name: v.name,
        };
        if let Some(area) = areas.last_mut().filter(|a| a.city == v.city) {
            area.venues.push(entry);
            continue;
        }
        areas.push(CityArea {
            city: v.city,
            state: v.state,
            venues: vec![entry],
        });
    }
    areas
}

/// Split shows into (past, upcoming). Upcoming includes `start_time == now`.
fn split_by_start(
    shows: Vec<show::Model>,
    now: DateTime<Utc>,
) -> (Vec<show::Model>, Vec<show::Model>) {
    shows.into_iter().partition(|s| s.start_time < now)
}

/// GET /venues
pub async fn list_venues_by_city<C: ConnectionTrait>(
    db: &C,
    now: DateTime<Utc>,
) -> CatalogResult<Vec<CityArea>> {
    let venues = venue::Entity::find()
        .order_by_asc(venue::Column::City)
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?;

    let ids: Vec<i32> = venues.iter().map(|v| v.id).collect();
    let counts = upcoming_show_counts(db, OwnerKind::Venue, &ids, now).await?;

    Ok(group_by_city(venues, &counts))
}

/// GET /artists
pub async fn list_artists<C: ConnectionTrait>(db: &C) -> CatalogResult<Vec<ArtistSummary>> {
    let artists = artist::Entity::find()
        .order_by_asc(artist::Column::Name)
        .order_by_asc(artist::Column::Id)
        .all(db)
        .await?;

    Ok(artists
        .into_iter()
        .map(|a| ArtistSummary {
            id: a.id,
            name: a.name,
        })
        .collect())
}

fn search_results(matches: Vec<(i32, String)>, counts: &HashMap<i32, u64>) -> SearchResults {
    let data: Vec<UpcomingSummary> = matches
        .into_iter()
        .map(|(id, name)| UpcomingSummary {
            id,
            name,
            num_upcoming_shows: counts.get(&id).copied().unwrap_or(0),
        })
        .collect();
    SearchResults {
        count: data.len(),
        data,
    }
}

/// POST /venues/search
pub async fn search_venues<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: DateTime<Utc>,
) -> CatalogResult<SearchResults> {
    let matches: Vec<(i32, String)> = venue::Entity::find()
        .filter(name_contains(venue::Column::Name, term))
        .order_by_asc(venue::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|v| (v.id, v.name))
        .collect();

    let ids: Vec<i32> = matches.iter().map(|(id, _)| *id).collect();
    let counts = upcoming_show_counts(db, OwnerKind::Venue, &ids, now).await?;

    Ok(search_results(matches, &counts))
}

/// POST /artists/search
pub async fn search_artists<C: ConnectionTrait>(
    db: &C,
    term: &str,
    now: DateTime<Utc>,
) -> CatalogResult<SearchResults> {
    let matches: Vec<(i32, String)> = artist::Entity::find()
        .filter(name_contains(artist::Column::Name, term))
        .order_by_asc(artist::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();

    let ids: Vec<i32> = matches.iter().map(|(id, _)| *id).collect();
    let counts = upcoming_show_counts(db, OwnerKind::Artist, &ids, now).await?;

    Ok(search_results(matches, &counts))
}

async fn venues_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> CatalogResult<HashMap<i32, venue::Model>> {
    let ids: Vec<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let venues = venue::Entity::find()
        .filter(venue::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(venues.into_iter().map(|v| (v.id, v)).collect())
}

async fn artists_by_id<C: ConnectionTrait>(
    db: &C,
    ids: impl IntoIterator<Item = i32>,
) -> CatalogResult<HashMap<i32, artist::Model>> {
    let ids: Vec<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let artists = artist::Entity::find()
        .filter(artist::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(artists.into_iter().map(|a| (a.id, a)).collect())
}

async fn shows_of<C: ConnectionTrait>(
    db: &C,
    owner: OwnerKind,
    owner_id: i32,
) -> CatalogResult<Vec<show::Model>> {
    Ok(show::Entity::find()
        .filter(owner.show_column().eq(owner_id))
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?)
}

/// GET /venues/{id}
pub async fn venue_detail<C: ConnectionTrait>(
    db: &C,
    venue_id: i32,
    now: DateTime<Utc>,
) -> CatalogResult<VenueDetail> {
    let venue = venue::Entity::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "venue",
            id: venue_id,
        })?;

    let genres = genres_of(db, OwnerKind::Venue, venue_id).await?;
    let shows = shows_of(db, OwnerKind::Venue, venue_id).await?;
    let artists = artists_by_id(db, shows.iter().map(|s| s.artist_id)).await?;

    let appearance = |s: show::Model| -> CatalogResult<ArtistAppearance> {
        let artist = artists
            .get(&s.artist_id)
            .ok_or(CatalogError::DanglingReference {
                show_id: s.id,
                entity: "artist",
                id: s.artist_id,
            })?;
        Ok(ArtistAppearance {
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_image_link: image_or_placeholder(artist.image_link.clone()),
            start_time: s.start_time,
        })
    };

    let (past, upcoming) = split_by_start(shows, now);
    let past_shows = past
        .into_iter()
        .map(&appearance)
        .collect::<CatalogResult<Vec<_>>>()?;
    let upcoming_shows = upcoming
        .into_iter()
        .map(&appearance)
        .collect::<CatalogResult<Vec<_>>>()?;

    Ok(VenueDetail {
        id: venue.id,
        name: venue.name,
        genres,
        address: venue.address,
        city: venue.city,
        state: venue.state,
        phone: venue.phone,
        website: venue.website,
        facebook_link: venue.facebook_link,
        seeking_talent: venue.seeking_talent,
        seeking_description: venue.seeking_description.unwrap_or_default(),
        image_link: image_or_placeholder(venue.image_link),
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

/// GET /artists/{id}
pub async fn artist_detail<C: ConnectionTrait>(
    db: &C,
    artist_id: i32,
    now: DateTime<Utc>,
) -> CatalogResult<ArtistDetail> {
    let artist = artist::Entity::find_by_id(artist_id)
        .one(db)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "artist",
            id: artist_id,
        })?;

    let genres = genres_of(db, OwnerKind::Artist, artist_id).await?;
    let shows = shows_of(db, OwnerKind::Artist, artist_id).await?;
    let venues = venues_by_id(db, shows.iter().map(|s| s.venue_id)).await?;

    let appearance = |s: show::Model| -> CatalogResult<VenueAppearance> {
        let venue = venues
            .get(&s.venue_id)
            .ok_or(CatalogError::DanglingReference {
                show_id: s.id,
                entity: "venue",
                id: s.venue_id,
            })?;
        Ok(VenueAppearance {
            venue_id: venue.id,
            venue_name: venue.name.clone(),
            venue_image_link: image_or_placeholder(venue.image_link.clone()),
            start_time: s.start_time,
        })
    };

    let (past, upcoming) = split_by_start(shows, now);
    let past_shows = past
        .into_iter()
        .map(&appearance)
        .collect::<CatalogResult<Vec<_>>>()?;
    let upcoming_shows = upcoming
        .into_iter()
        .map(&appearance)
        .collect::<CatalogResult<Vec<_>>>()?;

    Ok(ArtistDetail {
        id: artist.id,
        name: artist.name,
        genres,
        city: artist.city,
        state: artist.state,
        phone: artist.phone,
        website: artist.website,
        facebook_link: artist.facebook_link,
        seeking_venue: artist.seeking_venue,
        seeking_description: artist.seeking_description.unwrap_or_default(),
        image_link: image_or_placeholder(artist.image_link),
        past_shows_count: past_shows.len(),
        upcoming_shows_count: upcoming_shows.len(),
        past_shows,
        upcoming_shows,
    })
}

/// GET /shows
pub async fn list_shows<C: ConnectionTrait>(db: &C) -> CatalogResult<Vec<ShowListing>> {
    let shows = show::Entity::find()
        .order_by_asc(show::Column::StartTime)
        .order_by_asc(show::Column::Id)
        .all(db)
        .await?;

    let venues = venues_by_id(db, shows.iter().map(|s| s.venue_id)).await?;
    let artists = artists_by_id(db, shows.iter().map(|s| s.artist_id)).await?;

    shows
        .into_iter()
        .map(|s| {
            let venue = venues
                .get(&s.venue_id)
                .ok_or(CatalogError::DanglingReference {
                    show_id: s.id,
                    entity: "venue",
                    id: s.venue_id,
                })?;
            let artist = artists
                .get(&s.artist_id)
                .ok_or(CatalogError::DanglingReference {
                    show_id: s.id,
                    entity: "artist",
                    id: s.artist_id,
                })?;
            Ok(ShowListing {
                id: s.id,
                venue_id: venue.id,
                venue_name: venue.name.clone(),
                artist_id: artist.id,
                artist_name: artist.name.clone(),
                artist_image_link: image_or_placeholder(artist.image_link.clone()),
                start_time: s.start_time,
            })
        })
        .collect()
}

/// GET /venues/{id}/edit
pub async fn venue_for_edit<C: ConnectionTrait>(db: &C, venue_id: i32) -> CatalogResult<VenueEdit> {
    let venue = venue::Entity::find_by_id(venue_id)
        .one(db)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "venue",
            id: venue_id,
        })?;
    let genres = genres_of(db, OwnerKind::Venue, venue_id).await?;
    Ok(VenueEdit { venue, genres })
}

/// GET /artists/{id}/edit
pub async fn artist_for_edit<C: ConnectionTrait>(
    db: &C,
    artist_id: i32,
) -> CatalogResult<ArtistEdit> {
    let artist = artist::Entity::find_by_id(artist_id)
        .one(db)
        .await?
        .ok_or(CatalogError::NotFound {
            entity: "artist",
            id: artist_id,
        })?;
    let genres = genres_of(db, OwnerKind::Artist, artist_id).await?;
    Ok(ArtistEdit { artist, genres })
}
