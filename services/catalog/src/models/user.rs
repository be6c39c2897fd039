//! User model and related functionality

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::{
    resource::{Resource, ResourceKind},
    validation::{FieldRule, FieldValues, Schema, ValidationErrors},
};

static USER_SCHEMA: Schema = Schema {
    key: "email",
    fields: &[
        FieldRule::email("email").required(),
        FieldRule::text("firstname").required(),
        FieldRule::text("lastname").required(),
        FieldRule::text("city").nullable(),
        FieldRule::text("language").nullable(),
    ],
};

/// User entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub city: Option<String>,
    pub language: Option<String>,
}

/// New user creation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub city: Option<String>,
    pub language: Option<String>,
}

/// User update payload
///
/// `city` and `language` use a nested option so an explicit `null` clears the
/// stored value while an absent field leaves it alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub city: Option<Option<String>>,
    pub language: Option<Option<String>>,
}

impl UserChanges {
    /// Overlay the submitted fields onto `user`
    pub fn apply_to(self, mut user: User) -> User {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(firstname) = self.firstname {
            user.firstname = firstname;
        }
        if let Some(lastname) = self.lastname {
            user.lastname = lastname;
        }
        if let Some(city) = self.city {
            user.city = city;
        }
        if let Some(language) = self.language {
            user.language = language;
        }
        user
    }
}

/// Query parameters for user listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFilters {
    pub language: Option<String>,
}

impl UserFilters {
    /// The language filter, if one was given with a non-empty value
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|language| !language.is_empty())
    }
}

impl Resource for User {
    const KIND: ResourceKind = ResourceKind::User;

    type Record = User;
    type Draft = NewUser;
    type Changes = UserChanges;
    type Filters = UserFilters;

    fn schema() -> &'static Schema {
        &USER_SCHEMA
    }

    fn draft(mut values: FieldValues) -> Result<NewUser, ValidationErrors> {
        Ok(NewUser {
            email: values.required_text("email")?,
            firstname: values.required_text("firstname")?,
            lastname: values.required_text("lastname")?,
            city: values.nullable_text("city").flatten(),
            language: values.nullable_text("language").flatten(),
        })
    }

    fn changes(mut values: FieldValues) -> UserChanges {
        UserChanges {
            email: values.text("email"),
            firstname: values.text("firstname"),
            lastname: values.text("lastname"),
            city: values.nullable_text("city"),
            language: values.nullable_text("language"),
        }
    }

    fn merge(record: User, changes: UserChanges) -> User {
        changes.apply_to(record)
    }

    fn build(id: i64, draft: NewUser) -> User {
        User {
            id,
            email: draft.email,
            firstname: draft.firstname,
            lastname: draft.lastname,
            city: draft.city,
            language: draft.language,
        }
    }

    fn id(record: &User) -> i64 {
        record.id
    }

    fn key(record: &User) -> &str {
        &record.email
    }

    fn draft_key(draft: &NewUser) -> &str {
        &draft.email
    }

    fn matches(record: &User, filters: &UserFilters) -> bool {
        filters
            .language()
            .is_none_or(|language| record.language.as_deref() == Some(language))
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

    fn ada() -> User {
        User {
            id: 7,
            email: "ada@example.com".to_string(),
            firstname: "Ada".to_string(),
            lastname: "Lovelace".to_string(),
            city: Some("London".to_string()),
            language: Some("English".to_string()),
        }
    }

    #[test]
    fn create_requires_identity_fields() {
        let body = payload(json!({ "city": "Paris" }));

        let errors = validate(User::schema(), &body, Mode::Create).unwrap_err();
        assert_eq!(errors.fields(), vec!["email", "firstname", "lastname"]);
        assert!(errors.errors().iter().all(|e| e.code == ErrorCode::Required));
    }

    #[test]
    fn city_and_language_accept_null_and_empty() {
        let body = payload(json!({
            "email": "grace@example.com",
            "firstname": "Grace",
            "lastname": "Hopper",
            "city": null,
            "language": ""
        }));

        let values = validate(User::schema(), &body, Mode::Create).unwrap();
        let draft = User::draft(values).unwrap();
        assert_eq!(draft.city, None);
        assert_eq!(draft.language.as_deref(), Some(""));
    }

    #[test]
    fn email_shape_is_enforced() {
        let body = payload(json!({ "email": "grace.example.com" }));

        let errors = validate(User::schema(), &body, Mode::Update).unwrap_err();
        assert_eq!(errors.errors()[0].code, ErrorCode::EmailFormat);
    }

    #[test]
    fn partial_update_keeps_other_fields() {
        let body = payload(json!({ "city": "Paris" }));

        let values = validate(User::schema(), &body, Mode::Update).unwrap();
        let merged = User::merge(ada(), User::changes(values));

        assert_eq!(
            merged,
            User {
                city: Some("Paris".to_string()),
                ..ada()
            }
        );
    }

    #[test]
    fn explicit_null_clears_city() {
        let body = payload(json!({ "city": null }));

        let values = validate(User::schema(), &body, Mode::Update).unwrap();
        let merged = User::merge(ada(), User::changes(values));
        assert_eq!(merged.city, None);
        assert_eq!(merged.language.as_deref(), Some("English"));
    }

    #[test]
    fn empty_language_filter_is_ignored() {
        let filters = UserFilters {
            language: Some(String::new()),
        };
        assert_eq!(filters.language(), None);
        assert!(User::matches(&ada(), &filters));

        let filters = UserFilters {
            language: Some("French".to_string()),
        };
        assert!(!User::matches(&ada(), &filters));
    }
}
