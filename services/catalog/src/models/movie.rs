//! Movie models

use serde::{Deserialize, Deserializer, Serialize, de};
use sqlx::FromRow;
use std::{fmt, str::FromStr};

use crate::{
    resource::{Resource, ResourceKind},
    validation::{FieldRule, FieldValues, Schema, ValidationErrors},
};

/// First year a motion picture could have been shot
pub const FIRST_FILM_YEAR: i64 = 1888;

static MOVIE_SCHEMA: Schema = Schema {
    key: "title",
    fields: &[
        FieldRule::text("title").required(),
        FieldRule::text("director").required(),
        FieldRule::integer_above("year", FIRST_FILM_YEAR),
        FieldRule::boolean("color"),
        FieldRule::integer_above("duration", 0),
    ],
};

/// Movie entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub director: String,
    pub year: Option<i32>,
    pub color: Option<bool>,
    /// Running time in minutes
    pub duration: Option<i32>,
}

/// New movie creation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMovie {
    pub title: String,
    pub director: String,
    pub year: Option<i32>,
    pub color: Option<bool>,
    pub duration: Option<i32>,
}

/// Movie update payload
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MovieChanges {
    pub title: Option<String>,
    pub director: Option<String>,
    pub year: Option<i32>,
    pub color: Option<bool>,
    pub duration: Option<i32>,
}

impl MovieChanges {
    /// Overlay the submitted fields onto `movie`
    pub fn apply_to(self, mut movie: Movie) -> Movie {
        if let Some(title) = self.title {
            movie.title = title;
        }
        if let Some(director) = self.director {
            movie.director = director;
        }
        if let Some(year) = self.year {
            movie.year = Some(year);
        }
        if let Some(color) = self.color {
            movie.color = Some(color);
        }
        if let Some(duration) = self.duration {
            movie.duration = Some(duration);
        }
        movie
    }
}

/// Query parameters for movie listing
///
/// A parameter given with an empty value (`?color=`) is treated as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieFilters {
    /// Only colour (or only black and white) movies
    #[serde(default, deserialize_with = "empty_as_none")]
    pub color: Option<bool>,
    /// Upper bound on the running time, inclusive
    #[serde(default, deserialize_with = "empty_as_none")]
    pub max_duration: Option<i32>,
}

fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) if !raw.is_empty() => raw.parse().map(Some).map_err(de::Error::custom),
        _ => Ok(None),
    }
}

impl Resource for Movie {
    const KIND: ResourceKind = ResourceKind::Movie;

    type Record = Movie;
    type Draft = NewMovie;
    type Changes = MovieChanges;
    type Filters = MovieFilters;

    fn schema() -> &'static Schema {
        &MOVIE_SCHEMA
    }

    fn draft(mut values: FieldValues) -> Result<NewMovie, ValidationErrors> {
        Ok(NewMovie {
            title: values.required_text("title")?,
            director: values.required_text("director")?,
            year: values.integer("year"),
            color: values.boolean("color"),
            duration: values.integer("duration"),
        })
    }

    fn changes(mut values: FieldValues) -> MovieChanges {
        MovieChanges {
            title: values.text("title"),
            director: values.text("director"),
            year: values.integer("year"),
            color: values.boolean("color"),
            duration: values.integer("duration"),
        }
    }

    fn merge(record: Movie, changes: MovieChanges) -> Movie {
        changes.apply_to(record)
    }

    fn build(id: i64, draft: NewMovie) -> Movie {
        Movie {
            id,
            title: draft.title,
            director: draft.director,
            year: draft.year,
            color: draft.color,
            duration: draft.duration,
        }
    }

    fn id(record: &Movie) -> i64 {
        record.id
    }

    fn key(record: &Movie) -> &str {
        &record.title
    }

    fn draft_key(draft: &NewMovie) -> &str {
        &draft.title
    }

    fn matches(record: &Movie, filters: &MovieFilters) -> bool {
        let color_matches = filters.color.is_none_or(|color| record.color == Some(color));
        // A movie without a known duration never satisfies an upper bound
        let duration_matches = filters
            .max_duration
            .is_none_or(|max| record.duration.is_some_and(|duration| duration <= max));
        color_matches && duration_matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ErrorCode, Mode, Payload, validate};
    use serde_json::json;

    fn payload(value: serde_json::Value) -> Payload {
        value.as_object().cloned().unwrap()
    }

    fn heat() -> Movie {
        Movie {
            id: 1,
            title: "Heat".to_string(),
            director: "Michael Mann".to_string(),
            year: Some(1995),
            color: Some(true),
            duration: Some(170),
        }
    }

    #[test]
    fn year_must_follow_the_first_film() {
        let body = payload(json!({ "title": "Roundhay", "director": "Le Prince", "year": 1888 }));

        let errors = validate(Movie::schema(), &body, Mode::Create).unwrap_err();
        assert_eq!(errors.fields(), vec!["year"]);
        assert_eq!(errors.errors()[0].code, ErrorCode::IntegerRange);
    }

    #[test]
    fn draft_carries_every_validated_field() {
        let body = payload(json!({
            "title": "Alien",
            "director": "Ridley Scott",
            "year": 1979,
            "color": true,
            "duration": 117
        }));

        let values = validate(Movie::schema(), &body, Mode::Create).unwrap();
        let draft = Movie::draft(values).unwrap();
        assert_eq!(
            draft,
            NewMovie {
                title: "Alien".to_string(),
                director: "Ridley Scott".to_string(),
                year: Some(1979),
                color: Some(true),
                duration: Some(117),
            }
        );
    }

    #[test]
    fn merge_only_touches_submitted_fields() {
        let changes = MovieChanges {
            duration: Some(171),
            ..MovieChanges::default()
        };

        let merged = Movie::merge(heat(), changes);
        assert_eq!(merged.duration, Some(171));
        assert_eq!(merged.title, "Heat");
        assert_eq!(merged.year, Some(1995));
    }

    #[test]
    fn empty_filter_values_are_ignored() {
        let filters: MovieFilters =
            serde_json::from_value(json!({ "color": "", "max_duration": "90" })).unwrap();
        assert_eq!(filters.color, None);
        assert_eq!(filters.max_duration, Some(90));

        let filters: MovieFilters = serde_json::from_value(json!({})).unwrap();
        assert_eq!(filters.color, None);
        assert_eq!(filters.max_duration, None);

        assert!(serde_json::from_value::<MovieFilters>(json!({ "color": "maybe" })).is_err());
    }

    #[test]
    fn filters_combine_conjunctively() {
        let movie = heat();

        assert!(Movie::matches(&movie, &MovieFilters::default()));
        assert!(Movie::matches(
            &movie,
            &MovieFilters {
                color: Some(true),
                max_duration: Some(170)
            }
        ));
        assert!(!Movie::matches(
            &movie,
            &MovieFilters {
                color: Some(true),
                max_duration: Some(90)
            }
        ));
        assert!(!Movie::matches(
            &movie,
            &MovieFilters {
                color: Some(false),
                max_duration: None
            }
        ));
    }

    #[test]
    fn unknown_duration_fails_a_duration_bound() {
        let movie = Movie {
            duration: None,
            ..heat()
        };
        let filters = MovieFilters {
            color: None,
            max_duration: Some(500),
        };
        assert!(!Movie::matches(&movie, &filters));
    }
}
