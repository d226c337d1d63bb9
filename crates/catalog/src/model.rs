use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NewAuthor {
    pub name: String,
}

/// The fixed set of genres a book can belong to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Fiction,
    #[serde(rename = "Non-Fiction")]
    NonFiction,
    Science,
    History,
}

impl Genre {
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non-Fiction",
            Genre::Science => "Science",
            Genre::History => "History",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown genre: {0}")]
pub struct ParseGenreError(String);

impl FromStr for Genre {
    type Err = ParseGenreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Fiction" => Ok(Genre::Fiction),
            "Non-Fiction" => Ok(Genre::NonFiction),
            "Science" => Ok(Genre::Science),
            "History" => Ok(Genre::History),
            other => Err(ParseGenreError(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub genre: Genre,
    pub published_year: i32,
    pub author_id: i64,
}

impl<'r> FromRow<'r, SqliteRow> for Book {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let genre: String = row.try_get("genre")?;
        let genre = genre.parse().map_err(|e: ParseGenreError| sqlx::Error::ColumnDecode {
            index: "genre".to_string(),
            source: Box::new(e),
        })?;

        Ok(Book {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            genre,
            published_year: row.try_get("published_year")?,
            author_id: row.try_get("author_id")?,
        })
    }
}

/// Payload for creating a book, also the element type of a bulk import
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct NewBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    pub genre: Genre,
    pub published_year: i32,
    pub author_id: i64,
}

/// Partial update; `None` fields are left untouched
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
pub struct BookUpdate {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    pub genre: Option<Genre>,
    pub published_year: Option<i32>,
    pub author_id: Option<i64>,
}

impl BookUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genre.is_none()
            && self.published_year.is_none()
            && self.author_id.is_none()
    }
}

/// Optional listing filters, combined with AND
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    /// Case-insensitive substring of the title
    pub title: Option<String>,
    pub genre: Option<Genre>,
    pub published_year_from: Option<i32>,
    pub published_year_to: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 10,
            offset: 0,
        }
    }
}

/// Columns a listing may be ordered by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Id,
    Title,
    PublishedYear,
    AuthorId,
}

impl SortField {
    /// Unknown names fall back to `Id`.
    pub fn parse_or_default(name: &str) -> Self {
        match name {
            "id" => SortField::Id,
            "title" => SortField::Title,
            "published_year" => SortField::PublishedYear,
            "author_id" => SortField::AuthorId,
            _ => SortField::Id,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Id => "id",
            SortField::Title => "title",
            SortField::PublishedYear => "published_year",
            SortField::AuthorId => "author_id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only a case-insensitive `desc` sorts descending.
    pub fn parse_or_default(name: &str) -> Self {
        if name.eq_ignore_ascii_case("desc") {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookSort {
    pub field: SortField,
    pub order: SortOrder,
}

impl BookSort {
    pub fn parse(sort_by: Option<&str>, sort_order: Option<&str>) -> Self {
        Self {
            field: sort_by.map(SortField::parse_or_default).unwrap_or_default(),
            order: sort_order.map(SortOrder::parse_or_default).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_wire_names() {
        assert_eq!(Genre::NonFiction.to_string(), "Non-Fiction");
        assert_eq!("Science".parse::<Genre>().unwrap(), Genre::Science);
        assert!("science".parse::<Genre>().is_err());
        assert!("Poetry".parse::<Genre>().is_err());
    }

    #[test]
    fn test_sort_field_falls_back_to_id() {
        assert_eq!(SortField::parse_or_default("title"), SortField::Title);
        assert_eq!(SortField::parse_or_default("published_year"), SortField::PublishedYear);
        assert_eq!(SortField::parse_or_default("unknown"), SortField::Id);
        assert_eq!(SortField::parse_or_default("id; DROP TABLE books"), SortField::Id);
        assert_eq!(SortField::AuthorId.column(), "author_id");
    }

    #[test]
    fn test_sort_order_defaults_to_ascending() {
        assert_eq!(SortOrder::parse_or_default("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default("DESC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse_or_default("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse_or_default("banana"), SortOrder::Asc);
        assert_eq!(BookSort::parse(None, None), BookSort::default());
    }

    #[test]
    fn test_empty_update() {
        assert!(BookUpdate::default().is_empty());
        let update = BookUpdate {
            published_year: Some(2001),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }

    #[test]
    fn test_new_book_rejects_empty_title() {
        let book = NewBook {
            title: String::new(),
            genre: Genre::Fiction,
            published_year: 1949,
            author_id: 1,
        };
        assert!(book.validate().is_err());
    }
}
