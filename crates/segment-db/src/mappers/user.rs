//! User model -> entity mapper

use segment_core::entities::User;
use segment_core::error::DomainError;
use segment_core::value_objects::Sex;

use crate::models::UserModel;

impl TryFrom<UserModel> for User {
    type Error = DomainError;

    fn try_from(model: UserModel) -> Result<Self, Self::Error> {
        let sex = Sex::try_from(model.sex).map_err(|e| {
            DomainError::DatabaseError(format!("corrupt row in users (id = {}): {e}", model.id))
        })?;

        Ok(User {
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            sex,
            age: model.age,
            is_deleted: model.is_deleted,
            created_at: model.created_at,
        })
    }
}

/// Convert a batch of rows, failing on the first corrupt one
pub fn users_from_models(models: Vec<UserModel>) -> Result<Vec<User>, DomainError> {
    models.into_iter().map(User::try_from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn model(sex: i16) -> UserModel {
        UserModel {
            id: 5,
            first_name: "Ann".to_string(),
            last_name: "Lee".to_string(),
            sex,
            age: 30,
            is_deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_maps_valid_row() {
        let user = User::try_from(model(1)).unwrap();
        assert_eq!(user.id, 5);
        assert_eq!(user.sex, Sex::Female);
    }

    #[test]
    fn test_rejects_unknown_sex_code() {
        let err = User::try_from(model(9)).unwrap_err();
        assert!(matches!(err, DomainError::DatabaseError(_)));
    }
}
