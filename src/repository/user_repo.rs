use crate::model::user::{User, UserUpdate};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId, Document};
use mongodb::options::IndexOptions;
use mongodb::{Database, IndexModel};
use tracing::{error, info};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn update(&self, id: ObjectId, update: UserUpdate) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()>;
    async fn count(&self) -> RepositoryResult<u64>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        MongoUserRepository {
            collection: db.collection::<User>(collection_name),
        }
    }

    /// Create the unique index on `email`. The check-then-insert lookup in the
    /// service only produces a friendlier message; this index is the actual
    /// uniqueness guarantee, and a lost race maps E11000 to AlreadyExists.
    pub async fn ensure_indexes(&self) -> RepositoryResult<()> {
        let index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection
            .create_index(index, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to create email index: {}", e)))?;
        info!("Unique email index ensured on user collection");
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[tracing::instrument(skip(self, user), fields(email = %user.email))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = chrono::Utc::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        match self.collection.insert_one(user.clone(), None).await {
            Ok(_) => Ok(user),
            Err(e) => {
                error!("Failed to insert user: {}", e);
                Err(RepositoryError::from(e))
            }
        }
    }

    #[tracing::instrument(skip(self, update), fields(id = %id))]
    async fn update(&self, id: ObjectId, update: UserUpdate) -> RepositoryResult<User> {
        let mut set = Document::new();
        if let Some(name) = update.name {
            set.insert("name", name);
        }
        if let Some(roll_number) = update.roll_number {
            set.insert("rollNumber", roll_number);
        }
        if let Some(department) = update.department {
            set.insert("department", department);
        }
        if let Some(course) = update.course {
            set.insert("course", course);
        }
        if let Some(father_name) = update.father_name {
            set.insert("fatherName", father_name);
        }
        if let Some(date_of_birth) = update.date_of_birth {
            set.insert("dateOfBirth", date_of_birth);
        }
        set.insert("updatedAt", chrono::Utc::now().to_rfc3339());

        let filter = doc! { "_id": id };
        let result = self
            .collection
            .update_one(filter.clone(), doc! { "$set": set }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update user: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No user found to update for ID: {}",
                id
            )));
        }
        let updated = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to reload user: {}", e)))?;
        updated.ok_or_else(|| RepositoryError::not_found(format!("No user found for ID: {}", id)))
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let filter = doc! { "email": email };
        let user = self.collection.find_one(filter, None).await.map_err(|e| {
            RepositoryError::database(format!("Failed to find user by email: {}", e))
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        let filter = doc! { "_id": id };
        let user = self
            .collection
            .find_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))?;
        Ok(user)
    }

    #[tracing::instrument(skip(self), fields(id = %id))]
    async fn delete(&self, id: ObjectId) -> RepositoryResult<()> {
        let filter = doc! { "_id": id };
        let result = self
            .collection
            .delete_one(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!(
                "No user found to delete for ID: {}",
                id
            )));
        }
        Ok(())
    }

    async fn count(&self) -> RepositoryResult<u64> {
        self.collection
            .count_documents(None, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count users: {}", e)))
    }
}
