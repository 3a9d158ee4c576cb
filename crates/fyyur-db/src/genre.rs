//! Genre tagging and per-owner show counts.
//!
//! Venues and artists each have their own composite-keyed genre table and
//! their own side of the `shows` table. [`OwnerKind`] selects which pair of
//! tables an operation touches so the venue and artist services share one
//! code path.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entities::{artist_genre, show, venue_genre};
use crate::error::{CatalogError, CatalogResult};

/// Longest genre name the genre tables accept.
pub const MAX_GENRE_LEN: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OwnerKind {
    Venue,
    Artist,
}

impl OwnerKind {
    pub fn label(self) -> &'static str {
        match self {
            OwnerKind::Venue => "venue",
            OwnerKind::Artist => "artist",
        }
    }

    /// The `shows` column pointing at this kind of owner.
    pub fn show_column(self) -> show::Column {
        match self {
            OwnerKind::Venue => show::Column::VenueId,
            OwnerKind::Artist => show::Column::ArtistId,
        }
    }
}

/// Trim, drop blanks and de-duplicate a submitted genre list, keeping the
/// first occurrence of each name.
pub fn normalize_genres(raw: &[String]) -> CatalogResult<Vec<String>> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for genre in raw {
        let genre = genre.trim();
        if genre.is_empty() {
            continue;
        }
        if genre.chars().count() > MAX_GENRE_LEN {
            return Err(CatalogError::Validation(format!(
                "genre '{genre}' is longer than {MAX_GENRE_LEN} characters"
            )));
        }
        if !out.iter().any(|existing| existing == genre) {
            out.push(genre.to_string());
        }
    }
    Ok(out)
}

/// Genre names tagged on an owner, sorted by name.
pub async fn genres_of<C: ConnectionTrait>(
    db: &C,
    owner: OwnerKind,
    owner_id: i32,
) -> Result<Vec<String>, DbErr> {
    let names = match owner {
        OwnerKind::Venue => venue_genre::Entity::find()
            .filter(venue_genre::Column::VenueId.eq(owner_id))
            .order_by_asc(venue_genre::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect(),
        OwnerKind::Artist => artist_genre::Entity::find()
            .filter(artist_genre::Column::ArtistId.eq(owner_id))
            .order_by_asc(artist_genre::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(|g| g.name)
            .collect(),
    };
    Ok(names)
}

/// Insert one genre pair per name. Names must already be normalized.
pub async fn insert_genres<C: ConnectionTrait>(
    db: &C,
    owner: OwnerKind,
    owner_id: i32,
    genres: &[String],
) -> Result<(), DbErr> {
    if genres.is_empty() {
        return Ok(());
    }

    match owner {
        OwnerKind::Venue => {
            let rows = genres.iter().map(|name| venue_genre::ActiveModel {
                name: Set(name.clone()),
                venue_id: Set(owner_id),
            });
            venue_genre::Entity::insert_many(rows)
                .exec_without_returning(db)
                .await?;
        }
        OwnerKind::Artist => {
            let rows = genres.iter().map(|name| artist_genre::ActiveModel {
                name: Set(name.clone()),
                artist_id: Set(owner_id),
            });
            artist_genre::Entity::insert_many(rows)
                .exec_without_returning(db)
                .await?;
        }
    }
    Ok(())
}

/// Remove every genre pair for an owner, returning how many were removed.
pub async fn clear_genres<C: ConnectionTrait>(
    db: &C,
    owner: OwnerKind,
    owner_id: i32,
) -> Result<u64, DbErr> {
    let result = match owner {
        OwnerKind::Venue => venue_genre::Entity::delete_many()
            .filter(venue_genre::Column::VenueId.eq(owner_id))
            .exec(db)
            .await?,
        OwnerKind::Artist => artist_genre::Entity::delete_many()
            .filter(artist_genre::Column::ArtistId.eq(owner_id))
            .exec(db)
            .await?,
    };
    Ok(result.rows_affected)
}

#[derive(Debug, FromQueryResult)]
struct UpcomingShowRow {
    owner_id: i32,
}

/// Count, per owner id, the shows starting strictly after `now`.
///
/// Owners without such shows are absent from the map.
pub async fn upcoming_show_counts<C: ConnectionTrait>(
    db: &C,
    owner: OwnerKind,
    owner_ids: &[i32],
    now: DateTime<Utc>,
) -> Result<HashMap<i32, u64>, DbErr> {
    if owner_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let column = owner.show_column();
    let rows = show::Entity::find()
        .select_only()
        .column_as(column, "owner_id")
        .filter(column.is_in(owner_ids.iter().copied()))
        .filter(show::Column::StartTime.gt(now))
        .into_model::<UpcomingShowRow>()
        .all(db)
        .await?;

    let mut counts: HashMap<i32, u64> = HashMap::new();
    for row in rows {
        *counts.entry(row.owner_id).or_default() += 1;
    }
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{artist, venue};
    use crate::test_support::{fixed_now, memory_db};
    use chrono::Duration;
    use sea_orm::ActiveModelTrait;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_normalize_genres_trims_and_dedups() {
        let out = normalize_genres(&names(&[" Jazz ", "Folk", "", "Jazz", "  "])).unwrap();
        assert_eq!(out, names(&["Jazz", "Folk"]));
    }

    #[test]
    fn test_normalize_genres_rejects_long_names() {
        let err = normalize_genres(&names(&["An Extremely Long Genre Name"])).unwrap_err();
        assert!(matches!(err, CatalogError::Validation(_)));
    }

    #[test]
    fn test_normalize_genres_accepts_twenty_chars() {
        let exact = "x".repeat(MAX_GENRE_LEN);
        assert_eq!(normalize_genres(&[exact.clone()]).unwrap(), vec![exact]);
    }

    #[test]
    fn test_owner_kind_columns() {
        assert!(matches!(OwnerKind::Venue.show_column(), show::Column::VenueId));
        assert!(matches!(OwnerKind::Artist.show_column(), show::Column::ArtistId));
        assert_eq!(OwnerKind::Venue.label(), "venue");
        assert_eq!(OwnerKind::Artist.label(), "artist");
    }

    async fn seed_venue(db: &sea_orm::DatabaseConnection) -> i32 {
        venue::ActiveModel {
            name: Set("The Musical Hop".into()),
            city: Set("San Francisco".into()),
            state: Set("CA".into()),
            address: Set("1015 Folsom Street".into()),
            phone: Set("123-123-1234".into()),
            facebook_link: Set(String::new()),
            seeking_talent: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    async fn seed_artist(db: &sea_orm::DatabaseConnection) -> i32 {
        artist::ActiveModel {
            name: Set("Guns N Petals".into()),
            city: Set("San Francisco".into()),
            state: Set("CA".into()),
            phone: Set("326-123-5000".into()),
            seeking_venue: Set(true),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn test_insert_and_clear_genres() {
        let db = memory_db().await;
        let venue_id = seed_venue(&db).await;

        insert_genres(&db, OwnerKind::Venue, venue_id, &names(&["Swing", "Jazz"]))
            .await
            .unwrap();
        assert_eq!(
            genres_of(&db, OwnerKind::Venue, venue_id).await.unwrap(),
            names(&["Jazz", "Swing"])
        );

        let removed = clear_genres(&db, OwnerKind::Venue, venue_id).await.unwrap();
        assert_eq!(removed, 2);
        assert!(genres_of(&db, OwnerKind::Venue, venue_id)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_genre_pair_is_rejected_by_store() {
        let db = memory_db().await;
        let artist_id = seed_artist(&db).await;

        insert_genres(&db, OwnerKind::Artist, artist_id, &names(&["Rock n Roll"]))
            .await
            .unwrap();
        let again =
            insert_genres(&db, OwnerKind::Artist, artist_id, &names(&["Rock n Roll"])).await;
        assert!(again.is_err());
    }

    #[tokio::test]
    async fn test_upcoming_counts_are_strictly_after_now() {
        let db = memory_db().await;
        let venue_id = seed_venue(&db).await;
        let artist_id = seed_artist(&db).await;
        let now = fixed_now();

        for offset in [-1, 0, 1, 2] {
            show::ActiveModel {
                start_time: Set(now + Duration::hours(offset)),
                venue_id: Set(venue_id),
                artist_id: Set(artist_id),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }

        let by_venue = upcoming_show_counts(&db, OwnerKind::Venue, &[venue_id], now)
            .await
            .unwrap();
        assert_eq!(by_venue.get(&venue_id), Some(&2));

        let by_artist = upcoming_show_counts(&db, OwnerKind::Artist, &[artist_id, 999], now)
            .await
            .unwrap();
        assert_eq!(by_artist.get(&artist_id), Some(&2));
        assert!(by_artist.get(&999).is_none());
    }

    #[tokio::test]
    async fn test_upcoming_counts_empty_ids() {
        let db = memory_db().await;
        let counts = upcoming_show_counts(&db, OwnerKind::Venue, &[], fixed_now())
            .await
            .unwrap();
        assert!(counts.is_empty());
    }
}
