//! MongoDB configuration.

use serde::Deserialize;

use super::error::ValidationError;

/// MongoDB configuration (`MONGO_` prefix).
#[derive(Debug, Clone, Deserialize)]
pub struct MongoSettings {
    /// Mongo connection URI.
    pub uri: String,

    pub db_name: String,

    #[serde(default = "default_collection")]
    pub collection_name: String,
}

impl MongoSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.uri.is_empty() {
            return Err(ValidationError::MissingRequired("MONGO_URI"));
        }
        if !self.uri.starts_with("mongodb://") && !self.uri.starts_with("mongodb+srv://") {
            return Err(ValidationError::InvalidMongoUri);
        }
        if self.db_name.is_empty() {
            return Err(ValidationError::MissingRequired("MONGO_DB_NAME"));
        }
        Ok(())
    }
}

fn default_collection() -> String {
    "calculations".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_rejects_bad_scheme() {
        let settings = MongoSettings {
            uri: "postgres://nope".to_string(),
            db_name: "parcels".to_string(),
            collection_name: default_collection(),
        };
        assert_eq!(settings.validate(), Err(ValidationError::InvalidMongoUri));
    }

    #[test]
    fn validation_accepts_srv_uri() {
        let settings = MongoSettings {
            uri: "mongodb+srv://cluster.example.com".to_string(),
            db_name: "parcels".to_string(),
            collection_name: default_collection(),
        };
        assert!(settings.validate().is_ok());
    }
}
